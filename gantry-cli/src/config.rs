//! Configuration module
//!
//! Connection settings shared by every command.

use gantry_client::ApiClient;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the API
    pub api_url: String,
    /// Session token; empty means unauthenticated
    pub session_token: String,
    /// Acting user, handed to the live poller
    pub user: String,
}

impl Config {
    /// Build an API client from these settings
    pub fn client(&self) -> ApiClient {
        if self.session_token.is_empty() {
            ApiClient::new(&self.api_url)
        } else {
            ApiClient::with_session(&self.api_url, &self.session_token)
        }
    }
}
