use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// The name of the default list shown at `/list`. It is stored as an
/// ordinary list document so the default and named lists share one shape.
pub const DEFAULT_LIST_NAME: &str = "Today";

pub const PLACEHOLDER_ITEMS: [&str; 3] = [
    "Welcome to your todolist!",
    "Hit the + button to add a new item.",
    "<-- Hit this to delete an item.",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub username: String,
    /// Absent for accounts created through Google sign-in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_id: Option<String>,
}

impl User {
    pub fn local(username: &str, password_hash: &str) -> Self {
        Self {
            id: ObjectId::new(),
            username: username.to_string(),
            password_hash: Some(password_hash.to_string()),
            google_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
}

impl Item {
    pub fn new(name: &str) -> Self {
        Self {
            id: ObjectId::new(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoList {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub items: Vec<Item>,
}

/// Fresh placeholder items for a newly created list. Each call assigns new
/// ids so seeded lists never share embedded documents.
pub fn default_items() -> Vec<Item> {
    PLACEHOLDER_ITEMS.iter().map(|name| Item::new(name)).collect()
}
