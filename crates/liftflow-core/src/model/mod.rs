//! Project model
//!
//! The parsed form of a `liftflow.kdl` file: provider settings plus the
//! fleets and aliases to reconcile.

mod alias;
mod cloud;
mod fleet;

pub use alias::{AliasResource, FleetRef, RoutingStrategy, RoutingStrategyType};
pub use cloud::{AWS_PROVIDER, ProviderConfig};
pub use fleet::{
    FleetResource, IpPermission, IpProtocol, ProtectionPolicy, ResourceCreationLimitPolicy,
    RuntimeConfiguration, ServerProcess, Timeouts,
};

use crate::error::Result;
use liftflow_cloud::{ResourceConfig, ResourceSet};
use std::collections::BTreeMap;

/// Resource type names used in plans and state
pub const FLEET: &str = "fleet";
pub const ALIAS: &str = "alias";

/// A whole project file
#[derive(Debug, Clone, Default)]
pub struct Project {
    pub name: String,
    pub providers: BTreeMap<String, ProviderConfig>,
    pub fleets: BTreeMap<String, FleetResource>,
    pub aliases: BTreeMap<String, AliasResource>,
}

impl Project {
    /// Settings for the named provider, or defaults when the project
    /// declares no provider block for it
    pub fn provider(&self, name: &str) -> ProviderConfig {
        self.providers
            .get(name)
            .cloned()
            .unwrap_or_else(|| ProviderConfig::new(name))
    }

    /// Desired state handed to a provider's plan
    pub fn resource_set(&self) -> Result<ResourceSet> {
        let mut set = ResourceSet::new();
        for (name, fleet) in &self.fleets {
            set.add(ResourceConfig::new(
                FLEET,
                name,
                AWS_PROVIDER,
                serde_json::to_value(fleet)?,
            ));
        }
        for (name, alias) in &self.aliases {
            set.add(ResourceConfig::new(
                ALIAS,
                name,
                AWS_PROVIDER,
                serde_json::to_value(alias)?,
            ));
        }
        Ok(set)
    }
}
