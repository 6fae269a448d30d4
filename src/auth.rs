use crate::copernicus::CLIENT_ID;
use crate::error::AuthError;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use url::Url;

pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Bearer token for the content endpoint. Not refreshed; one per batch.
#[derive(Clone)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

pub struct TokenProvider {
    client: Client,
    endpoint: Url,
}

impl TokenProvider {
    pub fn new(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    /// Password grant against the identity provider. A single attempt.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<AuthToken, AuthError> {
        let form = [
            ("client_id", CLIENT_ID),
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
            ("grant_type", "password"),
        ];
        let response = self
            .client
            .post(self.endpoint.clone())
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Rejected { status });
        }

        let body: TokenResponse = response.json().await?;
        body.access_token
            .filter(|token| !token.is_empty())
            .map(AuthToken)
            .ok_or(AuthError::MissingToken)
    }
}
