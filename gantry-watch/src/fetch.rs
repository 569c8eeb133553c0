//! Fetch seams between the monitor and the API
//!
//! The monitor's one-shot lookups and the poller's snapshot fetch go through
//! these traits so tests can substitute scripted fakes for the HTTP client.

use async_trait::async_trait;

use crate::context::RunContext;
use gantry_client::{ApiClient, Result};
use gantry_core::domain::run::{WorkflowNodeRun, WorkflowRun};

/// One-shot lookups issued by the monitor during an activation.
#[async_trait]
pub trait RunFetcher: Send + Sync {
    /// Fetch the parent workflow run.
    async fn workflow_run(&self, ctx: &RunContext) -> Result<WorkflowRun>;

    /// Fetch prior runs of the same logical node.
    async fn node_run_history(
        &self,
        ctx: &RunContext,
        workflow_node_id: i64,
    ) -> Result<Vec<WorkflowNodeRun>>;
}

/// Source of serialized node-run snapshots for the poller.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch the watched node run as its raw serialized payload.
    async fn node_run_snapshot(&self, ctx: &RunContext) -> Result<String>;
}

#[async_trait]
impl RunFetcher for ApiClient {
    async fn workflow_run(&self, ctx: &RunContext) -> Result<WorkflowRun> {
        self.workflow_run(&ctx.project_key, &ctx.workflow_name, ctx.number)
            .await
    }

    async fn node_run_history(
        &self,
        ctx: &RunContext,
        workflow_node_id: i64,
    ) -> Result<Vec<WorkflowNodeRun>> {
        self.node_run_history(
            &ctx.project_key,
            &ctx.workflow_name,
            ctx.number,
            workflow_node_id,
        )
        .await
    }
}

#[async_trait]
impl SnapshotSource for ApiClient {
    async fn node_run_snapshot(&self, ctx: &RunContext) -> Result<String> {
        self.node_run_text(
            &ctx.project_key,
            &ctx.workflow_name,
            ctx.number,
            ctx.node_run_id,
        )
        .await
    }
}
