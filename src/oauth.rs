use serde::Deserialize;
use thiserror::Error;

use crate::config::GoogleConfig;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

#[derive(Error, Debug)]
pub enum OauthError {
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider sent no authorization code")]
    MissingCode,

    #[error("state parameter missing or not issued by this server")]
    StateMismatch,
}

/// Google OAuth 2.0 authorization-code client. Only the profile scope is
/// requested; the subject id is the sole claim used.
pub struct GoogleOauth {
    config: GoogleConfig,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct UserInfo {
    sub: String,
}

impl GoogleOauth {
    pub fn new(config: GoogleConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn authorize_url(&self, state: &str) -> String {
        let query = serde_urlencoded::to_string([
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", self.config.callback_url.as_str()),
            ("response_type", "code"),
            ("scope", "openid profile"),
            ("state", state),
        ])
        .expect("static query pairs always encode");
        format!("{AUTHORIZE_URL}?{query}")
    }

    /// Exchange the callback code for the authenticated subject id.
    pub async fn fetch_subject(&self, code: &str) -> Result<String, OauthError> {
        let token: TokenResponse = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.callback_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let info: UserInfo = self
            .http
            .get(USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(info.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GoogleOauth {
        GoogleOauth::new(GoogleConfig {
            client_id: "id-123".into(),
            client_secret: "secret".into(),
            callback_url: "http://localhost:5000/auth/google/callback".into(),
        })
    }

    #[test]
    fn authorize_url_carries_all_parameters() {
        let url = client().authorize_url("st4te");
        assert!(url.starts_with(AUTHORIZE_URL));
        assert!(url.contains("client_id=id-123"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("state=st4te"));
        assert!(url.contains("scope=openid+profile"));
        // The callback URL must be percent-encoded.
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A5000%2Fauth%2Fgoogle%2Fcallback"));
    }
}
