use mongodb::{
    bson::{doc, oid::ObjectId, to_bson},
    options::ReturnDocument,
    Client, Collection,
};

use crate::error::AppError;
use crate::models::{default_items, Item, TodoList, User};

/// Typed handles onto the two document collections. Connection setup is
/// lazy: the first query opens the socket.
#[derive(Clone)]
pub struct Store {
    users: Collection<User>,
    lists: Collection<TodoList>,
}

impl Store {
    pub async fn connect(url: &str, db_name: &str) -> Result<Self, mongodb::error::Error> {
        let client = Client::with_uri_str(url).await?;
        let db = client.database(db_name);
        Ok(Self {
            users: db.collection("users"),
            lists: db.collection("lists"),
        })
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.find_one(doc! { "username": username }).await?)
    }

    pub async fn find_user_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError> {
        Ok(self.users.find_one(doc! { "_id": *id }).await?)
    }

    pub async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        self.users.insert_one(user).await?;
        Ok(())
    }

    /// Find-or-create on the external identity id. Repeated sign-ins with
    /// the same id always resolve to the same user document.
    pub async fn find_or_create_google_user(&self, google_id: &str) -> Result<User, AppError> {
        let username = format!("google-{google_id}");
        let user = self
            .users
            .find_one_and_update(
                doc! { "google_id": google_id },
                doc! { "$setOnInsert": {
                    "_id": ObjectId::new(),
                    "username": username,
                    "google_id": google_id,
                } },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?;
        // With upsert and return-after the document always exists.
        user.ok_or(AppError::UpsertMissing)
    }

    /// Look up a list by name, creating it with fresh placeholder items if
    /// absent. A single upsert, so concurrent first visits seed once.
    pub async fn ensure_list(&self, name: &str) -> Result<TodoList, AppError> {
        let list = self
            .lists
            .find_one_and_update(
                doc! { "name": name },
                doc! { "$setOnInsert": {
                    "_id": ObjectId::new(),
                    "name": name,
                    "items": to_bson(&default_items())?,
                } },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?;
        list.ok_or(AppError::UpsertMissing)
    }

    pub async fn push_item(&self, list_name: &str, item: &Item) -> Result<(), AppError> {
        let updated = self
            .lists
            .update_one(
                doc! { "name": list_name },
                doc! { "$push": { "items": to_bson(item)? } },
            )
            .await?;
        if updated.matched_count == 0 {
            return Err(AppError::ListNotFound(list_name.to_string()));
        }
        Ok(())
    }

    pub async fn pull_item(&self, list_name: &str, item_id: &ObjectId) -> Result<(), AppError> {
        let updated = self
            .lists
            .update_one(
                doc! { "name": list_name },
                doc! { "$pull": { "items": { "_id": *item_id } } },
            )
            .await?;
        if updated.matched_count == 0 {
            return Err(AppError::ListNotFound(list_name.to_string()));
        }
        Ok(())
    }
}
