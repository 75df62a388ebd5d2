use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tera::Tera;
use tokio::sync::RwLock;

use crate::auth::SessionMap;
use crate::config::Config;
use crate::oauth::GoogleOauth;
use crate::store::Store;

pub type AppState = Arc<AppData>;

/// How long a `/auth/google` redirect may take before its state token is
/// no longer accepted. Keeps abandoned sign-ins from accumulating.
const OAUTH_STATE_TTL: Duration = Duration::from_secs(10 * 60);

/// Everything a handler needs, built once at startup and shared. Replaces
/// any process-wide singletons.
pub struct AppData {
    pub store: Store,
    pub sessions: SessionMap,
    /// Outstanding OAuth `state` tokens awaiting the provider callback,
    /// with their issue times.
    oauth_states: RwLock<HashMap<String, Instant>>,
    pub google: Option<GoogleOauth>,
    pub templates: Tera,
}

impl AppData {
    pub fn new(store: Store, config: &Config) -> Result<AppState, tera::Error> {
        Ok(Arc::new(Self {
            store,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            oauth_states: RwLock::new(HashMap::new()),
            google: config.google.clone().map(GoogleOauth::new),
            templates: crate::views::templates()?,
        }))
    }

    /// Record a freshly issued state token, dropping any that have expired.
    pub async fn issue_oauth_state(&self, token: String) {
        let mut states = self.oauth_states.write().await;
        states.retain(|_, issued| issued.elapsed() < OAUTH_STATE_TTL);
        states.insert(token, Instant::now());
    }

    /// Redeem a callback state token. Valid once, and only before expiry.
    pub async fn take_oauth_state(&self, token: &str) -> bool {
        match self.oauth_states.write().await.remove(token) {
            Some(issued) => issued.elapsed() < OAUTH_STATE_TTL,
            None => false,
        }
    }
}
