//! GameLift records as the provider sees them
//!
//! These mirror the subset of the service's data types LiftFlow reads. The
//! SDK types are converted into these at the [`crate::api::GameLiftApi`]
//! boundary so fleet logic and tests never touch SDK builders.

use chrono::{DateTime, Utc};
use liftflow_cloud::{Provisioned, ResourceStatus};
use liftflow_core::{ProtectionPolicy, ResourceCreationLimitPolicy, RoutingStrategyType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fleet lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FleetStatus {
    New,
    Downloading,
    Validating,
    Building,
    Activating,
    Active,
    Deleting,
    Error,
    Terminated,
    /// A status string this version does not know
    Unknown,
}

impl FleetStatus {
    /// Statuses a fleet walks through while it is being created
    pub const CREATE_PENDING: [FleetStatus; 5] = [
        FleetStatus::Activating,
        FleetStatus::Building,
        FleetStatus::Downloading,
        FleetStatus::New,
        FleetStatus::Validating,
    ];

    /// Statuses a fleet may report between the delete call and disappearing
    pub const DELETE_PENDING: [FleetStatus; 4] = [
        FleetStatus::Active,
        FleetStatus::Deleting,
        FleetStatus::Error,
        FleetStatus::Terminated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FleetStatus::New => "NEW",
            FleetStatus::Downloading => "DOWNLOADING",
            FleetStatus::Validating => "VALIDATING",
            FleetStatus::Building => "BUILDING",
            FleetStatus::Activating => "ACTIVATING",
            FleetStatus::Active => "ACTIVE",
            FleetStatus::Deleting => "DELETING",
            FleetStatus::Error => "ERROR",
            FleetStatus::Terminated => "TERMINATED",
            FleetStatus::Unknown => "UNKNOWN",
        }
    }

    pub fn resource_status(&self) -> ResourceStatus {
        match self {
            FleetStatus::New
            | FleetStatus::Downloading
            | FleetStatus::Validating
            | FleetStatus::Building
            | FleetStatus::Activating => ResourceStatus::Creating,
            FleetStatus::Active => ResourceStatus::Running,
            FleetStatus::Deleting => ResourceStatus::Deleting,
            FleetStatus::Terminated => ResourceStatus::Deleted,
            FleetStatus::Error => ResourceStatus::Error,
            FleetStatus::Unknown => ResourceStatus::Unknown,
        }
    }
}

impl fmt::Display for FleetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for FleetStatus {
    fn from(s: &str) -> Self {
        match s {
            "NEW" => FleetStatus::New,
            "DOWNLOADING" => FleetStatus::Downloading,
            "VALIDATING" => FleetStatus::Validating,
            "BUILDING" => FleetStatus::Building,
            "ACTIVATING" => FleetStatus::Activating,
            "ACTIVE" => FleetStatus::Active,
            "DELETING" => FleetStatus::Deleting,
            "ERROR" => FleetStatus::Error,
            "TERMINATED" => FleetStatus::Terminated,
            _ => FleetStatus::Unknown,
        }
    }
}

/// Result of `DescribeFleetAttributes` for one fleet
#[derive(Debug, Clone, PartialEq)]
pub struct FleetAttributes {
    pub fleet_id: String,
    pub fleet_arn: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub build_id: Option<String>,
    pub instance_type: Option<String>,
    pub status: FleetStatus,
    pub operating_system: Option<String>,
    pub server_launch_path: Option<String>,
    pub server_launch_parameters: Option<String>,
    pub log_paths: Vec<String>,
    pub metric_groups: Vec<String>,
    pub new_game_session_protection_policy: Option<ProtectionPolicy>,
    pub resource_creation_limit_policy: Option<ResourceCreationLimitPolicy>,
    pub creation_time: Option<DateTime<Utc>>,
}

impl FleetAttributes {
    pub fn new(fleet_id: impl Into<String>, status: FleetStatus) -> Self {
        Self {
            fleet_id: fleet_id.into(),
            fleet_arn: None,
            name: None,
            description: None,
            build_id: None,
            instance_type: None,
            status,
            operating_system: None,
            server_launch_path: None,
            server_launch_parameters: None,
            log_paths: Vec::new(),
            metric_groups: Vec::new(),
            new_game_session_protection_policy: None,
            resource_creation_limit_policy: None,
            creation_time: None,
        }
    }
}

impl Provisioned for FleetAttributes {
    type Status = FleetStatus;

    fn status(&self) -> FleetStatus {
        self.status
    }
}

/// Mutable fleet attributes; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FleetAttributesUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub metric_groups: Option<Vec<String>>,
    pub new_game_session_protection_policy: Option<ProtectionPolicy>,
    pub resource_creation_limit_policy: Option<ResourceCreationLimitPolicy>,
}

impl FleetAttributesUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Event codes that indicate a fleet failed to provision
///
/// Any other code the service reports is kept verbatim in
/// [`EventCode::Other`] and is not treated as a failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventCode {
    FleetStateError,
    FleetInitializationFailed,
    FleetBinaryDownloadFailed,
    FleetValidationLaunchPathNotFound,
    FleetValidationExecutableRuntimeFailure,
    FleetValidationTimedOut,
    FleetActivationFailed,
    FleetActivationFailedNoInstances,
    ServerProcessInvalidPath,
    ServerProcessSdkInitializationTimeout,
    ServerProcessProcessReadyTimeout,
    ServerProcessCrashed,
    ServerProcessTerminatedUnhealthy,
    ServerProcessForceTerminated,
    ServerProcessProcessExitTimeout,
    GameSessionActivationTimeout,
    FleetVpcPeeringFailed,
    Other(String),
}

impl EventCode {
    pub const FAILURES: [EventCode; 17] = [
        EventCode::FleetStateError,
        EventCode::FleetInitializationFailed,
        EventCode::FleetBinaryDownloadFailed,
        EventCode::FleetValidationLaunchPathNotFound,
        EventCode::FleetValidationExecutableRuntimeFailure,
        EventCode::FleetValidationTimedOut,
        EventCode::FleetActivationFailed,
        EventCode::FleetActivationFailedNoInstances,
        EventCode::ServerProcessInvalidPath,
        EventCode::ServerProcessSdkInitializationTimeout,
        EventCode::ServerProcessProcessReadyTimeout,
        EventCode::ServerProcessCrashed,
        EventCode::ServerProcessTerminatedUnhealthy,
        EventCode::ServerProcessForceTerminated,
        EventCode::ServerProcessProcessExitTimeout,
        EventCode::GameSessionActivationTimeout,
        EventCode::FleetVpcPeeringFailed,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            EventCode::FleetStateError => "FLEET_STATE_ERROR",
            EventCode::FleetInitializationFailed => "FLEET_INITIALIZATION_FAILED",
            EventCode::FleetBinaryDownloadFailed => "FLEET_BINARY_DOWNLOAD_FAILED",
            EventCode::FleetValidationLaunchPathNotFound => {
                "FLEET_VALIDATION_LAUNCH_PATH_NOT_FOUND"
            }
            EventCode::FleetValidationExecutableRuntimeFailure => {
                "FLEET_VALIDATION_EXECUTABLE_RUNTIME_FAILURE"
            }
            EventCode::FleetValidationTimedOut => "FLEET_VALIDATION_TIMED_OUT",
            EventCode::FleetActivationFailed => "FLEET_ACTIVATION_FAILED",
            EventCode::FleetActivationFailedNoInstances => "FLEET_ACTIVATION_FAILED_NO_INSTANCES",
            EventCode::ServerProcessInvalidPath => "SERVER_PROCESS_INVALID_PATH",
            EventCode::ServerProcessSdkInitializationTimeout => {
                "SERVER_PROCESS_SDK_INITIALIZATION_TIMEOUT"
            }
            EventCode::ServerProcessProcessReadyTimeout => "SERVER_PROCESS_PROCESS_READY_TIMEOUT",
            EventCode::ServerProcessCrashed => "SERVER_PROCESS_CRASHED",
            EventCode::ServerProcessTerminatedUnhealthy => "SERVER_PROCESS_TERMINATED_UNHEALTHY",
            EventCode::ServerProcessForceTerminated => "SERVER_PROCESS_FORCE_TERMINATED",
            EventCode::ServerProcessProcessExitTimeout => "SERVER_PROCESS_PROCESS_EXIT_TIMEOUT",
            EventCode::GameSessionActivationTimeout => "GAME_SESSION_ACTIVATION_TIMEOUT",
            EventCode::FleetVpcPeeringFailed => "FLEET_VPC_PEERING_FAILED",
            EventCode::Other(code) => code,
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, EventCode::Other(_))
    }
}

impl From<&str> for EventCode {
    fn from(s: &str) -> Self {
        EventCode::FAILURES
            .into_iter()
            .find(|code| code.as_str() == s)
            .unwrap_or_else(|| EventCode::Other(s.to_string()))
    }
}

impl fmt::Display for EventCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a fleet's event log
#[derive(Debug, Clone, PartialEq)]
pub struct FleetEvent {
    pub event_id: String,
    pub resource_id: String,
    pub event_code: EventCode,
    pub message: String,
    pub event_time: DateTime<Utc>,
}

impl fmt::Display for FleetEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {}",
            self.event_time.to_rfc3339(),
            self.event_code,
            self.message
        )
    }
}

/// One page of `DescribeFleetEvents`
#[derive(Debug, Clone, Default)]
pub struct EventPage {
    pub events: Vec<FleetEvent>,
    /// Continuation token; `None` on the last page
    pub next_token: Option<String>,
}

/// Routing strategy as the service stores it (fleet names already resolved)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasRouting {
    pub kind: RoutingStrategyType,
    pub fleet_id: Option<String>,
    pub message: Option<String>,
}

/// Fields sent with `CreateAlias` and `UpdateAlias`
#[derive(Debug, Clone, PartialEq)]
pub struct AliasInput {
    pub name: String,
    pub description: Option<String>,
    pub routing: AliasRouting,
}

/// Result of `DescribeAlias`
#[derive(Debug, Clone, PartialEq)]
pub struct Alias {
    pub alias_id: String,
    pub alias_arn: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub routing: AliasRouting,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fleet_status_round_trip() {
        for status in [
            FleetStatus::New,
            FleetStatus::Downloading,
            FleetStatus::Validating,
            FleetStatus::Building,
            FleetStatus::Activating,
            FleetStatus::Active,
            FleetStatus::Deleting,
            FleetStatus::Error,
            FleetStatus::Terminated,
        ] {
            assert_eq!(FleetStatus::from(status.as_str()), status);
        }
        assert_eq!(FleetStatus::from("SOMETHING_NEW"), FleetStatus::Unknown);
    }

    #[test]
    fn test_create_pending_excludes_settled_statuses() {
        for settled in [FleetStatus::Active, FleetStatus::Error, FleetStatus::Terminated] {
            assert!(!FleetStatus::CREATE_PENDING.contains(&settled));
        }
        // a deleted fleet may still report any settled status before it disappears
        assert!(FleetStatus::DELETE_PENDING.contains(&FleetStatus::Active));
    }

    #[test]
    fn test_event_code_allow_list() {
        assert_eq!(EventCode::FAILURES.len(), 17);
        for code in EventCode::FAILURES {
            assert!(code.is_failure());
            assert_eq!(EventCode::from(code.as_str()), code);
        }

        let info = EventCode::from("FLEET_STATE_DOWNLOADING");
        assert!(!info.is_failure());
        assert_eq!(info.as_str(), "FLEET_STATE_DOWNLOADING");
    }

    #[test]
    fn test_update_is_empty() {
        assert!(FleetAttributesUpdate::default().is_empty());
        let update = FleetAttributesUpdate {
            name: Some("renamed".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
