//! Gantry HTTP Client
//!
//! A type-safe HTTP client for the Gantry CI/CD API.
//!
//! The API addresses pipeline builds by (project key, application name,
//! pipeline name, build number, optional environment) and workflow runs by
//! (project key, workflow name, run number). Every method issues exactly one
//! HTTP request, performs no retry and caches nothing; a non-2xx response
//! surfaces as [`ClientError::ApiError`].
//!
//! # Example
//!
//! ```no_run
//! use gantry_client::ApiClient;
//!
//! #[tokio::main]
//! async fn main() -> gantry_client::Result<()> {
//!     let client = ApiClient::with_session("https://api.example.com", "session-token");
//!
//!     let history = client
//!         .build_history("PROJ", "my-app", "deploy", &Default::default())
//!         .await?;
//!     println!("{} builds", history.len());
//!     Ok(())
//! }
//! ```

pub mod error;

mod builds;
mod runs;

pub use builds::HistoryFilter;
pub use error::{ClientError, Result};

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Name of the header carrying the session credential.
const SESSION_HEADER: &str = "Session-Token";

/// HTTP client for the Gantry API
///
/// Methods are grouped by resource:
/// - Pipeline builds (stop, restart, run, rollback, history, commits, delete)
/// - Workflow runs and node runs (fetch, history, raw snapshots)
/// - Pipeline definitions (get, list, delete)
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Base URL of the API (e.g., "https://api.example.com")
    base_url: String,
    /// HTTP client instance
    client: Client,
    /// Session credential sent with every request, when present
    session_token: Option<String>,
}

impl ApiClient {
    /// Create a new unauthenticated client
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            session_token: None,
        }
    }

    /// Create a client that authenticates with a session token
    pub fn with_session(base_url: impl Into<String>, session_token: impl Into<String>) -> Self {
        let mut client = Self::new(base_url);
        client.session_token = Some(session_token.into());
        client
    }

    /// Create a client with a custom HTTP client
    ///
    /// This allows configuring timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            session_token: None,
        }
    }

    /// Get the base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Attach a session token to an existing client
    pub fn set_session_token(&mut self, token: impl Into<String>) {
        self.session_token = Some(token.into());
    }

    // =============================================================================
    // Request / Response plumbing
    // =============================================================================

    /// Build a request for an API path, attaching the session header.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "api request");
        let builder = self.client.request(method, &url);
        match &self.session_token {
            Some(token) => builder.header(SESSION_HEADER, token),
            None => builder,
        }
    }

    /// Handle an API response and deserialize JSON
    ///
    /// Checks the status code and returns an error if the request failed,
    /// or deserializes the response body if successful.
    pub(crate) async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response that returns no useful body
    /// (stop and delete operations).
    pub(crate) async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }

    /// Handle an API response whose body is relayed as raw text
    /// (the poller transports serialized snapshots without decoding them).
    pub(crate) async fn handle_text_response(&self, response: reqwest::Response) -> Result<String> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response.text().await.map_err(ClientError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ApiClient::new("https://api.example.com");
        assert_eq!(client.base_url(), "https://api.example.com");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = ApiClient::new("https://api.example.com/");
        assert_eq!(client.base_url(), "https://api.example.com");
    }

    #[test]
    fn test_session_token_is_stored() {
        let client = ApiClient::with_session("https://api.example.com", "tok");
        assert_eq!(client.session_token.as_deref(), Some("tok"));

        let mut anon = ApiClient::new("https://api.example.com");
        assert!(anon.session_token.is_none());
        anon.set_session_token("later");
        assert_eq!(anon.session_token.as_deref(), Some("later"));
    }
}
