//! Pipeline-build API endpoints
//!
//! Lifecycle operations on a single build resource addressed by
//! (project key, application name, pipeline name, build number), most of
//! them scoped by environment through the `envName` query parameter.

use reqwest::Method;

use crate::ApiClient;
use crate::error::Result;
use gantry_core::domain::build::{Application, Commit, PipelineBuild};
use gantry_core::dto::PipelineRunRequest;

/// Server-side filters for [`ApiClient::build_history`].
///
/// Filters pass through verbatim: empty strings are sent as empty query
/// values, never omitted.
#[derive(Debug, Clone)]
pub struct HistoryFilter {
    pub env_name: String,
    pub limit: u32,
    pub status: String,
    pub branch_name: String,
}

impl Default for HistoryFilter {
    fn default() -> Self {
        Self {
            env_name: String::new(),
            limit: 20,
            status: String::new(),
            branch_name: String::new(),
        }
    }
}

impl HistoryFilter {
    /// Query pairs in the order the API documents them.
    pub fn to_query(&self) -> [(&'static str, String); 4] {
        [
            ("envName", self.env_name.clone()),
            ("limit", self.limit.to_string()),
            ("status", self.status.clone()),
            ("branchName", self.branch_name.clone()),
        ]
    }
}

impl ApiClient {
    // =============================================================================
    // Build lifecycle
    // =============================================================================

    /// Stop a running build
    ///
    /// # Arguments
    /// * `key` - Project unique key
    /// * `app_name` - Application name
    /// * `pip_name` - Pipeline name
    /// * `build_number` - Build to stop
    /// * `env_name` - Environment name
    pub async fn stop_build(
        &self,
        key: &str,
        app_name: &str,
        pip_name: &str,
        build_number: i64,
        env_name: &str,
    ) -> Result<()> {
        let path = format!(
            "/project/{}/application/{}/pipeline/{}/build/{}/stop",
            key, app_name, pip_name, build_number
        );
        let response = self
            .request(Method::POST, &path)
            .query(&[("envName", env_name)])
            .send()
            .await?;

        self.handle_empty_response(response).await
    }

    /// Restart a build
    ///
    /// # Returns
    /// The restarted build record
    pub async fn restart_build(
        &self,
        key: &str,
        app_name: &str,
        pip_name: &str,
        build_number: i64,
        env_name: &str,
    ) -> Result<PipelineBuild> {
        let path = format!(
            "/project/{}/application/{}/pipeline/{}/build/{}/restart",
            key, app_name, pip_name, build_number
        );
        let response = self
            .request(Method::POST, &path)
            .query(&[("envName", env_name)])
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Run a pipeline
    ///
    /// The run request carries branch, parameters and parent linkage; this
    /// layer does not interpret it.
    ///
    /// # Returns
    /// The new build record
    pub async fn run_pipeline(
        &self,
        key: &str,
        app_name: &str,
        pip_name: &str,
        req: &PipelineRunRequest,
    ) -> Result<PipelineBuild> {
        let path = format!(
            "/project/{}/application/{}/pipeline/{}/run",
            key, app_name, pip_name
        );
        let response = self.request(Method::POST, &path).json(req).send().await?;

        self.handle_response(response).await
    }

    /// Roll the application back to the previous successful version
    ///
    /// # Returns
    /// The new build record created by the rollback
    pub async fn rollback(
        &self,
        key: &str,
        app_name: &str,
        pip_name: &str,
        req: &PipelineRunRequest,
    ) -> Result<PipelineBuild> {
        let path = format!(
            "/project/{}/application/{}/pipeline/{}/rollback",
            key, app_name, pip_name
        );
        let response = self.request(Method::POST, &path).json(req).send().await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Build queries
    // =============================================================================

    /// Get build history, filtered server-side
    ///
    /// # Returns
    /// Builds ordered by the server, newest first
    pub async fn build_history(
        &self,
        key: &str,
        app_name: &str,
        pip_name: &str,
        filter: &HistoryFilter,
    ) -> Result<Vec<PipelineBuild>> {
        let path = format!(
            "/project/{}/application/{}/pipeline/{}/history",
            key, app_name, pip_name
        );
        let response = self
            .request(Method::GET, &path)
            .query(&filter.to_query())
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get commits between the given hash and HEAD (server-resolved)
    pub async fn commits(
        &self,
        key: &str,
        app_name: &str,
        pip_name: &str,
        env_name: &str,
        hash: &str,
    ) -> Result<Vec<Commit>> {
        let path = format!(
            "/project/{}/application/{}/pipeline/{}/commits",
            key, app_name, pip_name
        );
        let response = self
            .request(Method::GET, &path)
            .query(&[("envName", env_name), ("hash", hash)])
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List applications that reference the given pipeline
    pub async fn applications_using_pipeline(
        &self,
        key: &str,
        pip_name: &str,
    ) -> Result<Vec<Application>> {
        let path = format!("/project/{}/pipeline/{}/application", key, pip_name);
        let response = self.request(Method::GET, &path).send().await?;

        self.handle_response(response).await
    }

    /// List builds triggered as children of the given build
    pub async fn triggered_builds(
        &self,
        key: &str,
        app_name: &str,
        pip_name: &str,
        build_number: i64,
    ) -> Result<Vec<PipelineBuild>> {
        let path = format!(
            "/project/{}/application/{}/pipeline/{}/build/{}/triggered",
            key, app_name, pip_name, build_number
        );
        let response = self.request(Method::GET, &path).send().await?;

        self.handle_response(response).await
    }

    /// Delete a build
    pub async fn delete_build(
        &self,
        key: &str,
        app_name: &str,
        pip_name: &str,
        build_number: i64,
        env_name: &str,
    ) -> Result<()> {
        let path = format!(
            "/project/{}/application/{}/pipeline/{}/build/{}",
            key, app_name, pip_name, build_number
        );
        let response = self
            .request(Method::DELETE, &path)
            .query(&[("envName", env_name)])
            .send()
            .await?;

        self.handle_empty_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_filter_keeps_empty_values() {
        let filter = HistoryFilter {
            env_name: String::new(),
            limit: 50,
            status: String::new(),
            branch_name: String::new(),
        };
        let query = filter.to_query();
        assert_eq!(query[0], ("envName", String::new()));
        assert_eq!(query[1], ("limit", "50".to_string()));
        assert_eq!(query[2], ("status", String::new()));
        assert_eq!(query[3], ("branchName", String::new()));
    }

    #[test]
    fn test_history_filter_default_limit() {
        assert_eq!(HistoryFilter::default().limit, 20);
    }
}
