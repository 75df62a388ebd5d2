use axum::response::Html;
use serde::Serialize;
use tera::{Context, Tera};

use crate::error::AppError;
use crate::models::Item;

/// Template registry. Templates are compiled in so the binary renders the
/// same views regardless of working directory.
pub fn templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("base.html", include_str!("../templates/base.html")),
        ("home.html", include_str!("../templates/home.html")),
        ("about.html", include_str!("../templates/about.html")),
        ("login.html", include_str!("../templates/login.html")),
        ("register.html", include_str!("../templates/register.html")),
        ("list.html", include_str!("../templates/list.html")),
    ])?;
    Ok(tera)
}

pub fn render(tera: &Tera, name: &str, ctx: &Context) -> Result<Html<String>, AppError> {
    Ok(Html(tera.render(name, ctx)?))
}

/// Item as handed to the list template; the ObjectId becomes its hex form
/// so delete forms can post it back.
#[derive(Serialize)]
pub struct ItemView {
    pub id: String,
    pub name: String,
}

impl From<&Item> for ItemView {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.to_hex(),
            name: item.name.clone(),
        }
    }
}

pub fn list_context(title: &str, items: &[Item]) -> Context {
    let mut ctx = Context::new();
    ctx.insert("list_title", title);
    ctx.insert("items", &items.iter().map(ItemView::from).collect::<Vec<_>>());
    ctx
}
