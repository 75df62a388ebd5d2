use std::{env, fmt::Display, str::FromStr};

use log::{info, warn};

/// Credentials for the Google OAuth 2.0 flow. Absent when the environment
/// does not provide a client id/secret pair; `/auth/google` then falls back
/// to the local sign-in page.
#[derive(Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
}

#[derive(Clone)]
pub struct Config {
    pub bind_addr: String,
    pub mongodb_url: String,
    pub mongodb_db: String,
    pub google: Option<GoogleConfig>,
}

impl Config {
    pub fn load() -> Self {
        Self {
            bind_addr: try_load("BIND_ADDR", "0.0.0.0:5000"),
            mongodb_url: try_load("MONGODB_URL", "mongodb://localhost:27017"),
            mongodb_db: try_load("MONGODB_DB", "todolist"),
            google: GoogleConfig::from_env(),
        }
    }
}

impl GoogleConfig {
    fn from_env() -> Option<Self> {
        let client_id = env::var("GOOGLE_CLIENT_ID").ok()?;
        let client_secret = env::var("GOOGLE_CLIENT_SECRET").ok()?;
        let callback_url = try_load(
            "GOOGLE_CALLBACK_URL",
            "http://localhost:5000/auth/google/callback",
        );
        Some(Self {
            client_id,
            client_secret,
            callback_url,
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
