//! Workflow-run and pipeline API endpoints
//!
//! Workflow runs are read-only from this client's point of view: the live
//! monitor fetches a run once per activation and follows one of its node
//! runs through the poller.

use reqwest::Method;

use crate::ApiClient;
use crate::error::Result;
use gantry_core::domain::build::Pipeline;
use gantry_core::domain::run::{WorkflowNodeRun, WorkflowRun};

impl ApiClient {
    // =============================================================================
    // Workflow runs
    // =============================================================================

    /// Get a workflow run by number
    pub async fn workflow_run(
        &self,
        key: &str,
        workflow_name: &str,
        num: i64,
    ) -> Result<WorkflowRun> {
        let path = format!("/project/{}/workflows/{}/runs/{}", key, workflow_name, num);
        let response = self.request(Method::GET, &path).send().await?;

        self.handle_response(response).await
    }

    /// Get a node run within a workflow run
    pub async fn node_run(
        &self,
        key: &str,
        workflow_name: &str,
        num: i64,
        node_run_id: i64,
    ) -> Result<WorkflowNodeRun> {
        let path = format!(
            "/project/{}/workflows/{}/runs/{}/nodes/{}",
            key, workflow_name, num, node_run_id
        );
        let response = self.request(Method::GET, &path).send().await?;

        self.handle_response(response).await
    }

    /// Get a node run as its raw serialized payload
    ///
    /// The poller relays this text unchanged; consumers deserialize it.
    pub async fn node_run_text(
        &self,
        key: &str,
        workflow_name: &str,
        num: i64,
        node_run_id: i64,
    ) -> Result<String> {
        let path = format!(
            "/project/{}/workflows/{}/runs/{}/nodes/{}",
            key, workflow_name, num, node_run_id
        );
        let response = self.request(Method::GET, &path).send().await?;

        self.handle_text_response(response).await
    }

    /// Get prior runs of the same logical node
    ///
    /// # Arguments
    /// * `workflow_node_id` - The node's identifier in the workflow
    ///   definition, shared by all of its runs
    pub async fn node_run_history(
        &self,
        key: &str,
        workflow_name: &str,
        num: i64,
        workflow_node_id: i64,
    ) -> Result<Vec<WorkflowNodeRun>> {
        let path = format!(
            "/project/{}/workflows/{}/runs/{}/nodes/{}/history",
            key, workflow_name, num, workflow_node_id
        );
        let response = self.request(Method::GET, &path).send().await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Pipeline definitions
    // =============================================================================

    /// Get a pipeline definition
    pub async fn pipeline(&self, key: &str, name: &str) -> Result<Pipeline> {
        let path = format!("/project/{}/pipeline/{}", key, name);
        let response = self.request(Method::GET, &path).send().await?;

        self.handle_response(response).await
    }

    /// List the project's pipelines
    pub async fn pipelines(&self, key: &str) -> Result<Vec<Pipeline>> {
        let path = format!("/project/{}/pipeline", key);
        let response = self.request(Method::GET, &path).send().await?;

        self.handle_response(response).await
    }

    /// Delete a pipeline definition
    pub async fn delete_pipeline(&self, key: &str, name: &str) -> Result<()> {
        let path = format!("/project/{}/pipeline/{}", key, name);
        let response = self.request(Method::DELETE, &path).send().await?;

        self.handle_empty_response(response).await
    }
}
