//! Alias resource model

use serde::{Deserialize, Serialize};

/// Desired configuration of a GameLift alias
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AliasResource {
    /// Alias name as shown by GameLift (defaults to the logical name)
    pub name: String,

    pub description: Option<String>,

    pub routing_strategy: RoutingStrategy,
}

impl AliasResource {
    /// Logical name of the fleet this alias points at, if it references one
    /// from the same project
    pub fn fleet_dependency(&self) -> Option<&str> {
        match &self.routing_strategy.fleet {
            Some(FleetRef::Name(name)) => Some(name.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingStrategy {
    #[serde(rename = "type")]
    pub kind: RoutingStrategyType,

    /// Target fleet (SIMPLE only)
    pub fleet: Option<FleetRef>,

    /// Message returned to clients (TERMINAL only)
    pub message: Option<String>,
}

impl RoutingStrategy {
    pub fn simple(fleet: FleetRef) -> Self {
        Self {
            kind: RoutingStrategyType::Simple,
            fleet: Some(fleet),
            message: None,
        }
    }

    pub fn terminal(message: impl Into<String>) -> Self {
        Self {
            kind: RoutingStrategyType::Terminal,
            fleet: None,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoutingStrategyType {
    /// Route to a fleet
    #[default]
    Simple,
    /// Reject with a message
    Terminal,
}

impl RoutingStrategyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingStrategyType::Simple => "SIMPLE",
            RoutingStrategyType::Terminal => "TERMINAL",
        }
    }
}

impl std::str::FromStr for RoutingStrategyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SIMPLE" => Ok(RoutingStrategyType::Simple),
            "TERMINAL" => Ok(RoutingStrategyType::Terminal),
            other => Err(format!(
                "unknown routing strategy '{}': must be SIMPLE or TERMINAL",
                other
            )),
        }
    }
}

/// How an alias names its fleet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FleetRef {
    /// A literal GameLift fleet ID
    Id(String),
    /// A fleet declared in the same project, resolved through state
    Name(String),
}
