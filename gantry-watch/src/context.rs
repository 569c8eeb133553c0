//! Activation context
//!
//! The monitor never reads ambient state: the identity of the watched node
//! run and the acting session are passed in explicitly.

use anyhow::Result;

/// The acting user's session, as handed to the poller on activation.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user: String,
    pub session_token: String,
    /// Base URL of the API (e.g., "https://api.example.com")
    pub api_url: String,
}

impl SessionContext {
    pub fn new(
        user: impl Into<String>,
        session_token: impl Into<String>,
        api_url: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            session_token: session_token.into(),
            api_url: api_url.into(),
        }
    }

    /// Validates the session settings
    pub fn validate(&self) -> Result<()> {
        if self.api_url.is_empty() {
            anyhow::bail!("api_url cannot be empty");
        }
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            anyhow::bail!("api_url must start with http:// or https://");
        }
        Ok(())
    }
}

/// Route parameters as they arrive: any of the four identifying values may
/// still be absent while a navigation is resolving.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    pub project_key: Option<String>,
    pub workflow_name: Option<String>,
    pub number: Option<i64>,
    pub node_run_id: Option<i64>,
}

impl RouteParams {
    pub fn new(
        project_key: impl Into<String>,
        workflow_name: impl Into<String>,
        number: i64,
        node_run_id: i64,
    ) -> Self {
        Self {
            project_key: Some(project_key.into()),
            workflow_name: Some(workflow_name.into()),
            number: Some(number),
            node_run_id: Some(node_run_id),
        }
    }

    /// A complete context, if all four values are simultaneously available.
    pub fn resolve(&self) -> Option<RunContext> {
        Some(RunContext {
            project_key: self.project_key.clone().filter(|k| !k.is_empty())?,
            workflow_name: self.workflow_name.clone().filter(|w| !w.is_empty())?,
            number: self.number?,
            node_run_id: self.node_run_id?,
        })
    }
}

/// Fully resolved identity of a watched node run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub project_key: String,
    pub workflow_name: String,
    /// Workflow run number.
    pub number: i64,
    pub node_run_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_requires_all_four_values() {
        let mut params = RouteParams {
            project_key: Some("PROJ".to_string()),
            workflow_name: Some("deploy".to_string()),
            number: Some(4),
            node_run_id: None,
        };
        assert!(params.resolve().is_none());

        params.node_run_id = Some(12);
        let ctx = params.resolve().unwrap();
        assert_eq!(ctx.project_key, "PROJ");
        assert_eq!(ctx.number, 4);
    }

    #[test]
    fn test_empty_strings_do_not_resolve() {
        let params = RouteParams {
            project_key: Some(String::new()),
            workflow_name: Some("deploy".to_string()),
            number: Some(4),
            node_run_id: Some(12),
        };
        assert!(params.resolve().is_none());
    }

    #[test]
    fn test_session_validation() {
        assert!(SessionContext::new("ada", "tok", "https://api.example.com")
            .validate()
            .is_ok());
        assert!(SessionContext::new("ada", "tok", "api.example.com")
            .validate()
            .is_err());
        assert!(SessionContext::new("ada", "tok", "").validate().is_err());
    }
}
