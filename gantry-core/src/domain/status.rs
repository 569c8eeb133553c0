//! Pipeline status domain type

use serde::{Deserialize, Serialize};

/// Execution status of a pipeline build, workflow run or node run.
///
/// Serialized variant names match the API's wire values (`"Waiting"`,
/// `"Building"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStatus {
    Waiting,
    Building,
    Success,
    Fail,
    Disabled,
    Skipped,
}

impl PipelineStatus {
    /// True once no further execution updates can occur for this status.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Success | Self::Fail | Self::Disabled | Self::Skipped
        )
    }

    /// True while the run is still queued or executing.
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }

    /// Wire value as sent by the API.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "Waiting",
            Self::Building => "Building",
            Self::Success => "Success",
            Self::Fail => "Fail",
            Self::Disabled => "Disabled",
            Self::Skipped => "Skipped",
        }
    }
}

impl std::fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(PipelineStatus::Success.is_terminal());
        assert!(PipelineStatus::Fail.is_terminal());
        assert!(PipelineStatus::Disabled.is_terminal());
        assert!(PipelineStatus::Skipped.is_terminal());
        assert!(!PipelineStatus::Waiting.is_terminal());
        assert!(!PipelineStatus::Building.is_terminal());
    }

    #[test]
    fn test_wire_values_round_trip() {
        let status: PipelineStatus = serde_json::from_str("\"Building\"").unwrap();
        assert_eq!(status, PipelineStatus::Building);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"Building\"");
    }
}
