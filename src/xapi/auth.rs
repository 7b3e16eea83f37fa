use super::{TOKEN_ENDPOINT, XapiClient};
use crate::error::{Pbx2faError, Result};
use indicatif::ProgressBar;
use reqwest::header::ACCEPT;
use std::fmt;

/// Bearer token returned by the PBX. Lives for one run only.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Exchange the API client credentials for a bearer token.
///
/// One attempt, no retry. A non-success status yields [`Pbx2faError::AuthError`]
/// carrying the status and raw body; a success body without a string
/// `access_token` yields [`Pbx2faError::TokenNotFound`].
///
/// The two diagnostic lines are printed through `progress` so an active
/// spinner is not torn; pass `ProgressBar::hidden()` when there is none.
pub async fn acquire_token(
    client: &XapiClient,
    client_id: &str,
    client_secret: &str,
    progress: &ProgressBar,
) -> Result<AccessToken> {
    let url = client.url(TOKEN_ENDPOINT);
    let params = [
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("grant_type", "client_credentials"),
    ];

    progress.suspend(|| println!("Sending authentication request to {}", client.base_address()));
    tracing::debug!("POST {}", url);

    let response = client
        .http()
        .post(&url)
        .header(ACCEPT, "application/json")
        .form(&params)
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;
    progress.suspend(|| println!("Authentication response: {}", status));

    if !status.is_success() {
        return Err(Pbx2faError::AuthError {
            status: status.as_u16(),
            body,
        });
    }

    let json: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
        tracing::debug!("Token response is not JSON: {}", e);
        Pbx2faError::TokenNotFound
    })?;
    json.get("access_token")
        .and_then(|t| t.as_str())
        .map(AccessToken::new)
        .ok_or(Pbx2faError::TokenNotFound)
}
