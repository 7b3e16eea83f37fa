use super::{XAPI_BASE, XapiClient};
use super::auth::AccessToken;
use crate::error::{Pbx2faError, enhance_xapi_error};
use reqwest::header::ACCEPT;
use serde::Serialize;

/// PATCH body for a single user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserUpdate {
    #[serde(rename = "Id")]
    pub id: u32,
    #[serde(rename = "Require2FA")]
    pub require_2fa: bool,
}

impl UserUpdate {
    pub fn new(id: u32, require_2fa: bool) -> Self {
        Self { id, require_2fa }
    }

    /// `Users({id})` resource path under the XAPI root
    pub fn endpoint(&self) -> String {
        format!("{}/Users({})", XAPI_BASE, self.id)
    }
}

/// Result of one user update. Failures stay local to the user.
#[derive(Debug)]
pub enum UpdateOutcome {
    Updated {
        user_id: u32,
        status: u16,
        body: String,
    },
    Failed {
        user_id: u32,
        /// `None` when the request never got a response
        status: Option<u16>,
        message: String,
    },
}

/// Send the PATCH for one user. Never returns an error: anything that goes wrong
/// is folded into [`UpdateOutcome::Failed`].
pub async fn update_user(
    client: &XapiClient,
    token: &AccessToken,
    update: UserUpdate,
) -> UpdateOutcome {
    let url = client.url(&update.endpoint());
    tracing::debug!("PATCH {} Require2FA={}", url, update.require_2fa);

    let response = client
        .http()
        .patch(&url)
        .bearer_auth(token.secret())
        .header(ACCEPT, "application/json")
        .json(&update)
        .send()
        .await;

    let resp = match response {
        Ok(resp) => resp,
        Err(e) => {
            return UpdateOutcome::Failed {
                user_id: update.id,
                status: None,
                message: Pbx2faError::HttpError(e).to_string(),
            };
        }
    };

    let status = resp.status();
    let body = match resp.text().await {
        Ok(body) => body,
        Err(e) => {
            return UpdateOutcome::Failed {
                user_id: update.id,
                status: Some(status.as_u16()),
                message: Pbx2faError::HttpError(e).to_string(),
            };
        }
    };
    tracing::debug!("PATCH {} -> {}", url, status);

    if !status.is_success() {
        let err = Pbx2faError::XapiError {
            status: status.as_u16(),
            message: enhance_xapi_error(status.as_u16(), &body),
        };
        return UpdateOutcome::Failed {
            user_id: update.id,
            status: Some(status.as_u16()),
            message: err.to_string(),
        };
    }

    UpdateOutcome::Updated {
        user_id: update.id,
        status: status.as_u16(),
        body,
    }
}
