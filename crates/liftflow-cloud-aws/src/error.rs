//! GameLift provider error types

use crate::model::FleetEvent;
use liftflow_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameLiftError {
    /// The service answered with `NotFoundException`
    #[error("GameLift resource not found: {0}")]
    NotFound(String),

    #[error("GameLift API error: {0}")]
    Api(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Fleet provisioning ended in a terminal status other than the target,
    /// with the failure events recorded for the fleet
    #[error("{cause}{}", format_events(.events))]
    ProvisioningFailed {
        fleet_id: String,
        cause: CloudError,
        events: Vec<FleetEvent>,
    },

    #[error("Cloud error: {0}")]
    Cloud(#[from] CloudError),

    #[error("Project error: {0}")]
    Project(#[from] liftflow_core::ProjectError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GameLiftError {
    /// Whether a waiter gave up because the fleet settled in the wrong status
    pub fn is_unexpected_status(&self) -> bool {
        matches!(self, GameLiftError::Cloud(e) if e.is_unexpected_status())
    }
}

fn format_events(events: &[FleetEvent]) -> String {
    let mut out = String::from("\nFailure events:");
    for event in events {
        out.push_str("\n  - ");
        out.push_str(&event.to_string());
    }
    out
}

impl From<GameLiftError> for CloudError {
    fn from(err: GameLiftError) -> Self {
        match err {
            GameLiftError::Cloud(e) => e,
            GameLiftError::NotFound(what) => CloudError::ResourceNotFound(what),
            GameLiftError::InvalidConfig(msg) => CloudError::InvalidConfig(msg),
            other => CloudError::ApiError(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, GameLiftError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventCode;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_provisioning_failed_lists_events() {
        let err = GameLiftError::ProvisioningFailed {
            fleet_id: "fleet-1".to_string(),
            cause: CloudError::UnexpectedStatus {
                resource: "fleet fleet-1".to_string(),
                status: "ERROR".to_string(),
                expected: "ACTIVE".to_string(),
            },
            events: vec![FleetEvent {
                event_id: "e-1".to_string(),
                resource_id: "fleet-1".to_string(),
                event_code: EventCode::ServerProcessCrashed,
                message: "server process exited with code 1".to_string(),
                event_time: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            }],
        };

        let message = err.to_string();
        assert!(message.starts_with("Unexpected status for fleet fleet-1: ERROR"));
        assert!(message.contains("Failure events:"));
        assert!(message.contains("SERVER_PROCESS_CRASHED"));
        assert!(message.contains("server process exited with code 1"));
        assert!(message.contains("2024-05-01T12:00:00"));
    }

    #[test]
    fn test_into_cloud_error() {
        let err: CloudError = GameLiftError::NotFound("fleet-1".to_string()).into();
        assert!(matches!(err, CloudError::ResourceNotFound(_)));

        let err: CloudError = GameLiftError::Cloud(CloudError::Inconsistent {
            resource: "fleet fleet-1".to_string(),
            found: 2,
        })
        .into();
        assert!(matches!(err, CloudError::Inconsistent { found: 2, .. }));
    }
}
