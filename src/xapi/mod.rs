pub mod auth;
pub mod users;

use crate::error::Result;
use reqwest::Client;

/// Path of the OAuth2 token endpoint relative to the PBX base address
pub const TOKEN_ENDPOINT: &str = "/connect/token";
/// Root of the 3CX configuration API
pub const XAPI_BASE: &str = "/xapi/v1";

/// HTTP client bound to one PBX
///
/// Holds a single `reqwest::Client` so the token request and every user update
/// share the transport's connection pool. No timeout is set beyond reqwest's defaults.
#[derive(Clone)]
pub struct XapiClient {
    client: Client,
    base_address: String,
}

impl XapiClient {
    pub fn new(base_address: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("pbx2fa/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_address: base_address.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_address(&self) -> &str {
        &self.base_address
    }

    /// Join an endpoint path onto the base address
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_address, endpoint.trim_start_matches('/'))
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }
}
