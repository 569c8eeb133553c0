//! Run request payload
//!
//! Carried opaquely by the client: the server interprets parameters, branch
//! selection and parent linkage.

use serde::{Deserialize, Serialize};

use crate::domain::variable::Variable;

/// Request body for running or rolling back a pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineRunRequest {
    #[serde(default)]
    pub params: Vec<Variable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_name: Option<String>,
    /// Build number of the parent build that triggered this run, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_build_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_application_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_pipeline_id: Option<i64>,
}

impl PipelineRunRequest {
    /// Request with a single branch parameter, the common manual-run case.
    pub fn for_branch(branch: impl Into<String>) -> Self {
        Self {
            params: vec![Variable::new("git.branch", branch)],
            ..Self::default()
        }
    }
}
