//! Workflow run domain types
//!
//! A workflow run is one numbered execution of a workflow definition; each
//! node of its graph executes as a node run. Both are fetched fresh from the
//! API on navigation and owned by the view that requested them.

use serde::{Deserialize, Serialize};

use crate::domain::status::PipelineStatus;
use crate::domain::variable::Variable;

/// One execution instance of a workflow definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub id: i64,
    /// Run number, sequential per workflow.
    pub num: i64,
    pub workflow_name: String,
    pub project_key: String,
    pub status: PipelineStatus,
    pub start: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub last_modified: Option<chrono::DateTime<chrono::Utc>>,
    /// Node runs of this execution, flattened from the run graph.
    #[serde(default)]
    pub node_runs: Vec<WorkflowNodeRun>,
}

/// One node's execution within a workflow run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowNodeRun {
    pub id: i64,
    pub workflow_run_id: i64,
    /// Identifier of the logical node in the workflow definition; prior runs
    /// of the same node share it, which is what history lookups key on.
    pub workflow_node_id: i64,
    /// Run number of the owning workflow run.
    pub num: i64,
    #[serde(default)]
    pub subnumber: i64,
    pub status: PipelineStatus,
    pub start: chrono::DateTime<chrono::Utc>,
    /// Absent until the node run reaches a terminal status.
    #[serde(default)]
    pub done: Option<chrono::DateTime<chrono::Utc>>,
    /// Variables the engine resolved for this execution.
    #[serde(default)]
    pub build_parameters: Vec<Variable>,
}

impl WorkflowNodeRun {
    /// Elapsed time between start and done, if the run has finished.
    pub fn elapsed(&self) -> Option<chrono::Duration> {
        self.done.map(|done| done - self.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_run(status: PipelineStatus, done: Option<&str>) -> WorkflowNodeRun {
        WorkflowNodeRun {
            id: 7,
            workflow_run_id: 1,
            workflow_node_id: 3,
            num: 42,
            subnumber: 0,
            status,
            start: "2024-05-01T10:00:00Z".parse().unwrap(),
            done: done.map(|d| d.parse().unwrap()),
            build_parameters: Vec::new(),
        }
    }

    #[test]
    fn test_elapsed_requires_done() {
        assert!(node_run(PipelineStatus::Building, None).elapsed().is_none());

        let run = node_run(PipelineStatus::Success, Some("2024-05-01T10:03:30Z"));
        assert_eq!(run.elapsed().unwrap().num_seconds(), 210);
    }

    #[test]
    fn test_node_run_deserializes_with_sparse_payload() {
        // The poller relays whatever the API sends; optional fields default.
        let payload = r#"{
            "id": 12,
            "workflow_run_id": 4,
            "workflow_node_id": 9,
            "num": 3,
            "status": "Building",
            "start": "2024-05-01T10:00:00Z"
        }"#;
        let run: WorkflowNodeRun = serde_json::from_str(payload).unwrap();
        assert_eq!(run.status, PipelineStatus::Building);
        assert!(run.done.is_none());
        assert!(run.build_parameters.is_empty());
    }
}
