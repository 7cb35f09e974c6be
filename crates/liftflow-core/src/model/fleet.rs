//! Fleet resource model
//!
//! A fleet is a managed group of instances running one game-server build.
//! Field names follow the GameLift `CreateFleet` request so the resource
//! serializes into the same shape that is stored in state.

use liftflow_cloud::DEFAULT_TIMEOUT;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Desired configuration of a GameLift fleet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetResource {
    /// Fleet name as shown by GameLift (defaults to the logical name)
    pub name: String,

    /// Build to deploy on the fleet
    pub build_id: String,

    /// EC2 instance type (c5.large, ...)
    pub ec2_instance_type: String,

    pub description: Option<String>,

    /// Inbound port ranges opened on every instance
    pub ec2_inbound_permissions: Vec<IpPermission>,

    /// Paths GameLift uploads to the log store after a session
    pub log_paths: Vec<String>,

    /// CloudWatch metric groups
    pub metric_groups: Vec<String>,

    pub new_game_session_protection_policy: ProtectionPolicy,

    pub peer_vpc_aws_account_id: Option<String>,

    pub peer_vpc_id: Option<String>,

    pub resource_creation_limit_policy: Option<ResourceCreationLimitPolicy>,

    pub runtime_configuration: Option<RuntimeConfiguration>,

    /// Legacy single-process launch path
    pub server_launch_path: Option<String>,

    /// Legacy single-process launch parameters
    pub server_launch_parameters: Option<String>,

    /// Wait bounds for create and delete
    pub timeouts: Timeouts,
}

impl FleetResource {
    pub fn new(
        name: impl Into<String>,
        build_id: impl Into<String>,
        ec2_instance_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            build_id: build_id.into(),
            ec2_instance_type: ec2_instance_type.into(),
            ..Default::default()
        }
    }
}

/// Inbound permission for a port range
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IpPermission {
    pub from_port: i32,
    pub to_port: i32,
    /// CIDR block, e.g. "0.0.0.0/0"
    pub ip_range: String,
    pub protocol: IpProtocol,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IpProtocol {
    #[default]
    Tcp,
    Udp,
}

impl IpProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            IpProtocol::Tcp => "TCP",
            IpProtocol::Udp => "UDP",
        }
    }
}

impl std::str::FromStr for IpProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TCP" => Ok(IpProtocol::Tcp),
            "UDP" => Ok(IpProtocol::Udp),
            other => Err(format!("unknown protocol '{}': must be TCP or UDP", other)),
        }
    }
}

/// Whether active game sessions protect an instance from scale-down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtectionPolicy {
    #[default]
    NoProtection,
    FullProtection,
}

impl ProtectionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtectionPolicy::NoProtection => "NoProtection",
            ProtectionPolicy::FullProtection => "FullProtection",
        }
    }
}

impl std::str::FromStr for ProtectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NoProtection" => Ok(ProtectionPolicy::NoProtection),
            "FullProtection" => Ok(ProtectionPolicy::FullProtection),
            other => Err(format!(
                "unknown protection policy '{}': must be NoProtection or FullProtection",
                other
            )),
        }
    }
}

/// Limits on game sessions a single player can create
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceCreationLimitPolicy {
    pub new_game_sessions_per_creator: Option<i32>,
    pub policy_period_in_minutes: Option<i32>,
}

/// Server processes to run on each instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfiguration {
    pub game_session_activation_timeout_seconds: Option<i32>,
    pub max_concurrent_game_session_activations: Option<i32>,
    pub server_processes: Vec<ServerProcess>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerProcess {
    pub launch_path: String,
    #[serde(default)]
    pub parameters: Option<String>,
    #[serde(default = "default_concurrent_executions")]
    pub concurrent_executions: i32,
}

fn default_concurrent_executions() -> i32 {
    1
}

impl ServerProcess {
    pub fn new(launch_path: impl Into<String>) -> Self {
        Self {
            launch_path: launch_path.into(),
            parameters: None,
            concurrent_executions: default_concurrent_executions(),
        }
    }
}

/// Wait bounds in seconds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub create: Option<u64>,
    pub delete: Option<u64>,
}

impl Timeouts {
    pub fn create_timeout(&self) -> Duration {
        self.create
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn delete_timeout(&self) -> Duration {
        self.delete
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }
}
