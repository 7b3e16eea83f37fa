use thiserror::Error;

/// Exit code for configuration problems (bad flag, bad id list, unreadable file).
pub const EXIT_CONFIG: i32 = 1;
/// Exit code when the token exchange fails and no user was touched.
pub const EXIT_AUTH: i32 = 2;

#[derive(Error, Debug)]
pub enum Pbx2faError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid value for Enable2FA3CX: '{0}' (expected 'true' or 'false')")]
    InvalidTwoFactorFlag(String),

    #[error("Invalid user id in UsersToChange: '{0}'")]
    InvalidUserId(String),

    #[error("Authentication failed: {status} - {body}")]
    AuthError { status: u16, body: String },

    #[error("Authentication failed: access token not found in token response")]
    TokenNotFound,

    #[error("XAPI error: HTTP {status}: {message}")]
    XapiError { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Pbx2faError>;

pub use Pbx2faError as Error;

impl Pbx2faError {
    /// True for failures of the token exchange, including transport errors.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Pbx2faError::AuthError { .. } | Pbx2faError::TokenNotFound | Pbx2faError::HttpError(_)
        )
    }

    /// Process exit code for an error that ends the run.
    pub fn exit_code(&self) -> i32 {
        if self.is_auth_failure() {
            EXIT_AUTH
        } else {
            EXIT_CONFIG
        }
    }
}

/// Parse an XAPI error response and provide helpful context
pub fn enhance_xapi_error(status: u16, error_response: &str) -> String {
    let hint = match status {
        401 => "\n💡 Hint: The access token was rejected. Check the API client in the 3CX admin console.",
        403 => "\n💡 Hint: The API client needs the System Owner role to change user settings.",
        404 => "\n💡 Hint: No user with this id exists on the PBX.",
        _ => "",
    };

    // 3CX returns OData-style bodies: {"error": {"code": "...", "message": "..."}}
    if let Ok(error_json) = serde_json::from_str::<serde_json::Value>(error_response) {
        if let Some(error_obj) = error_json.get("error") {
            let code = error_obj
                .get("code")
                .and_then(|c| c.as_str())
                .filter(|c| !c.is_empty())
                .unwrap_or("Unknown");
            let message = error_obj
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("No message");

            return format!("{}: {}{}", code, message, hint);
        }
    }

    if error_response.trim().is_empty() {
        return format!("(empty response body){}", hint);
    }

    format!("{}{}", error_response, hint)
}
