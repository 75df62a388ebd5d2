use std::sync::OnceLock;

use rand::{distributions::Alphanumeric, Rng};

/// Structurally valid bcrypt hash to verify against when a username is
/// unknown, so sign-in pays the full bcrypt cost either way. Computed once
/// on first use.
pub fn dummy_hash() -> &'static str {
    static DUMMY_HASH: OnceLock<String> = OnceLock::new();
    DUMMY_HASH.get_or_init(|| {
        bcrypt::hash("dummy", bcrypt::DEFAULT_COST).expect("hashing a fixed input cannot fail")
    })
}

/// Random token for OAuth state parameters.
pub fn random_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

pub async fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await
        .unwrap()
}

pub async fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .unwrap()
}
