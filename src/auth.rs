use std::{collections::HashMap, sync::Arc};

use axum::http::{header, HeaderMap};
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::User;
use crate::store::Store;

pub type SessionMap = Arc<RwLock<HashMap<String, ObjectId>>>;

pub async fn create_session(user_id: ObjectId, sessions: &SessionMap) -> String {
    let session_id = Uuid::new_v4().to_string();
    sessions.write().await.insert(session_id.clone(), user_id);
    session_id
}

pub async fn destroy_session(headers: &HeaderMap, sessions: &SessionMap) {
    if let Some(session_id) = extract_session_id(headers) {
        sessions.write().await.remove(&session_id);
    }
}

/// Resolve the session cookie to the signed-in user, or fail with
/// `Unauthenticated` (which renders as a redirect to `/login`).
pub async fn require_session(
    headers: &HeaderMap,
    sessions: &SessionMap,
    store: &Store,
) -> Result<User, AppError> {
    let session_id = extract_session_id(headers).ok_or(AppError::Unauthenticated)?;

    let user_id = {
        let sessions = sessions.read().await;
        sessions
            .get(&session_id)
            .copied()
            .ok_or(AppError::Unauthenticated)?
    };

    store
        .find_user_by_id(&user_id)
        .await?
        .ok_or(AppError::Unauthenticated)
}

pub fn extract_session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|cookie_str| {
            cookie_str
                .split(';')
                .find(|cookie| cookie.trim().starts_with("session_id="))
                .map(|cookie| {
                    cookie
                        .trim()
                        .strip_prefix("session_id=")
                        .unwrap_or("")
                        .to_string()
                })
        })
}

// SameSite=Lax so the cookie survives the top-level redirect back from the
// OAuth provider.
pub fn session_cookie(session_id: &str) -> String {
    format!("session_id={session_id}; HttpOnly; Path=/; SameSite=Lax")
}

pub fn clear_session_cookie() -> String {
    "session_id=; HttpOnly; Path=/; Max-Age=0; SameSite=Lax".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, value.parse().unwrap());
        headers
    }

    #[test]
    fn extracts_session_id_among_other_cookies() {
        let headers = headers_with_cookie("theme=dark; session_id=abc-123; lang=en");
        assert_eq!(extract_session_id(&headers).as_deref(), Some("abc-123"));
    }

    #[test]
    fn no_cookie_header_means_no_session() {
        assert_eq!(extract_session_id(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn create_then_destroy_session() {
        let sessions: SessionMap = Arc::new(RwLock::new(HashMap::new()));
        let user_id = ObjectId::new();

        let session_id = create_session(user_id, &sessions).await;
        assert_eq!(sessions.read().await.get(&session_id), Some(&user_id));

        let headers = headers_with_cookie(&format!("session_id={session_id}"));
        destroy_session(&headers, &sessions).await;
        assert!(sessions.read().await.is_empty());
    }
}
