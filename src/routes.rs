use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use tera::Context;

use crate::auth;
use crate::crypto;
use crate::error::AppError;
use crate::models::{Item, User, DEFAULT_LIST_NAME};
use crate::oauth::OauthError;
use crate::state::AppState;
use crate::views::{list_context, render};

/// Normalize a list name the way its URL segment is displayed: first
/// character uppercased, the rest lowercased. Idempotent.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Where a mutation on the given list redirects back to.
pub fn list_path(name: &str) -> String {
    if name == DEFAULT_LIST_NAME {
        "/list".to_string()
    } else {
        format!("/{name}")
    }
}

// --- static pages ---

pub async fn home(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render(&state.templates, "home.html", &Context::new())
}

pub async fn about(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render(&state.templates, "about.html", &Context::new())
}

pub async fn login_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render(&state.templates, "login.html", &Context::new())
}

pub async fn register_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render(&state.templates, "register.html", &Context::new())
}

// --- local accounts ---

#[derive(Deserialize)]
pub struct Credentials {
    username: String,
    password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Form(creds): Form<Credentials>,
) -> Result<Response, AppError> {
    if creds.username.is_empty() || creds.password.is_empty() {
        return form_error(&state, "register.html", "Username and password are required.");
    }

    if state
        .store
        .find_user_by_username(&creds.username)
        .await?
        .is_some()
    {
        log::warn!("registration refused, username {} taken", creds.username);
        return form_error(&state, "register.html", "That username is already taken.");
    }

    let hash = crypto::hash_password(&creds.password).await?;
    let user = User::local(&creds.username, &hash);
    state.store.insert_user(&user).await?;
    log::info!("registered user {}", user.username);

    Ok(signed_in_response(&state, user.id).await)
}

pub async fn login(
    State(state): State<AppState>,
    Form(creds): Form<Credentials>,
) -> Result<Response, AppError> {
    // Always verify against some hash so unknown usernames take as long
    // as wrong passwords.
    let mut password_to_verify = crypto::dummy_hash().to_string();
    let mut found = None;

    if let Some(user) = state.store.find_user_by_username(&creds.username).await? {
        if let Some(hash) = &user.password_hash {
            password_to_verify = hash.clone();
            found = Some(user);
        }
    }

    let password_valid = crypto::verify_password(&creds.password, &password_to_verify)
        .await
        .unwrap_or(false);

    if let (true, Some(user)) = (password_valid, found) {
        return Ok(signed_in_response(&state, user.id).await);
    }

    log::warn!("failed sign-in attempt for {}", creds.username);
    form_error(&state, "login.html", "Invalid username or password.")
}

pub async fn logout(headers: HeaderMap, State(state): State<AppState>) -> Response {
    auth::destroy_session(&headers, &state.sessions).await;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        header::SET_COOKIE,
        auth::clear_session_cookie().parse().unwrap(),
    );
    (response_headers, Redirect::to("/")).into_response()
}

// --- Google sign-in ---

pub async fn google_auth(State(state): State<AppState>) -> Redirect {
    let Some(google) = &state.google else {
        log::warn!("google sign-in requested but OAuth is not configured");
        return Redirect::to("/login");
    };

    let token = crypto::random_token();
    state.issue_oauth_state(token.clone()).await;
    Redirect::to(&google.authorize_url(&token))
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, AppError> {
    let subject = match verify_callback(&state, query).await {
        Ok(subject) => subject,
        Err(err) => {
            log::warn!("google sign-in failed: {err}");
            return Ok(Redirect::to("/login").into_response());
        }
    };

    let user = state.store.find_or_create_google_user(&subject).await?;
    log::info!("google sign-in for {}", user.username);
    Ok(signed_in_response(&state, user.id).await)
}

async fn verify_callback(state: &AppState, query: CallbackQuery) -> Result<String, OauthError> {
    let google = state.google.as_ref().ok_or(OauthError::StateMismatch)?;

    if let Some(error) = query.error {
        log::warn!("provider returned error: {error}");
        return Err(OauthError::MissingCode);
    }

    let issued = match query.state {
        Some(token) => state.take_oauth_state(&token).await,
        None => false,
    };
    if !issued {
        return Err(OauthError::StateMismatch);
    }

    let code = query.code.ok_or(OauthError::MissingCode)?;
    google.fetch_subject(&code).await
}

// --- lists and items ---

pub async fn default_list(
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Html<String>, AppError> {
    let user = auth::require_session(&headers, &state.sessions, &state.store).await?;
    log::debug!("{} viewed {DEFAULT_LIST_NAME}", user.username);

    let list = state.store.ensure_list(DEFAULT_LIST_NAME).await?;
    render(
        &state.templates,
        "list.html",
        &list_context(&list.name, &list.items),
    )
}

pub async fn named_list(
    headers: HeaderMap,
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> Result<Html<String>, AppError> {
    let user = auth::require_session(&headers, &state.sessions, &state.store).await?;

    let name = capitalize(&name);
    log::debug!("{} viewed list {name}", user.username);
    let list = state.store.ensure_list(&name).await?;
    render(
        &state.templates,
        "list.html",
        &list_context(&list.name, &list.items),
    )
}

#[derive(Deserialize)]
pub struct NewItemForm {
    new_item: String,
    list: String,
}

pub async fn add_item(
    headers: HeaderMap,
    State(state): State<AppState>,
    Form(form): Form<NewItemForm>,
) -> Result<Redirect, AppError> {
    let user = auth::require_session(&headers, &state.sessions, &state.store).await?;

    let name = capitalize(&form.list);
    let item = Item::new(&form.new_item);

    // A list deleted out-of-band or named directly in the form still gets
    // created, consistent with the GET path.
    state.store.ensure_list(&name).await?;
    state.store.push_item(&name, &item).await?;
    log::info!("{} added an item to {name}", user.username);

    Ok(Redirect::to(&list_path(&name)))
}

#[derive(Deserialize)]
pub struct DeleteForm {
    checkbox: String,
    list_name: String,
}

pub async fn delete_item(
    headers: HeaderMap,
    State(state): State<AppState>,
    Form(form): Form<DeleteForm>,
) -> Result<Redirect, AppError> {
    let user = auth::require_session(&headers, &state.sessions, &state.store).await?;

    let name = capitalize(&form.list_name);
    let item_id = ObjectId::parse_str(&form.checkbox)?;
    state.store.pull_item(&name, &item_id).await?;
    log::info!("{} removed an item from {name}", user.username);

    Ok(Redirect::to(&list_path(&name)))
}

// --- helpers ---

async fn signed_in_response(state: &AppState, user_id: ObjectId) -> Response {
    let session_id = auth::create_session(user_id, &state.sessions).await;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        auth::session_cookie(&session_id).parse().unwrap(),
    );
    (headers, Redirect::to("/list")).into_response()
}

fn form_error(state: &AppState, template: &str, message: &str) -> Result<Response, AppError> {
    let mut ctx = Context::new();
    ctx.insert("error", message);
    Ok(render(&state.templates, template, &ctx)?.into_response())
}
