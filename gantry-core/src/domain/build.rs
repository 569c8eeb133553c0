//! Pipeline build domain types
//!
//! A pipeline build is one numbered execution of a pipeline attached to an
//! application, optionally scoped by environment.

use serde::{Deserialize, Serialize};

use crate::domain::status::PipelineStatus;

/// One execution of an application pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineBuild {
    pub id: i64,
    pub build_number: i64,
    #[serde(default)]
    pub version: i64,
    pub status: PipelineStatus,
    pub start: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub done: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub pipeline_name: String,
    #[serde(default)]
    pub application_name: String,
    #[serde(default)]
    pub environment_name: String,
    #[serde(default)]
    pub branch: Option<String>,
}

/// A version-control commit reported between a build's hash and HEAD.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub author: CommitAuthor,
    /// Unix timestamp of authorship, as the VCS reports it.
    #[serde(default)]
    pub author_timestamp: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommitAuthor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// An application that references a pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub repository_fullname: Option<String>,
}

/// A pipeline definition, as listed per project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    pub name: String,
    #[serde(default)]
    pub project_key: String,
    #[serde(rename = "type", default)]
    pub pipeline_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_deserializes_without_optional_fields() {
        let payload = r#"{
            "id": 5,
            "build_number": 17,
            "status": "Success",
            "start": "2024-05-01T09:00:00Z"
        }"#;
        let build: PipelineBuild = serde_json::from_str(payload).unwrap();
        assert_eq!(build.build_number, 17);
        assert_eq!(build.version, 0);
        assert!(build.branch.is_none());
    }
}
