//! Cloud provider settings
//!
//! Provider blocks carry connection settings only; the resources themselves
//! live in [`super::FleetResource`] and [`super::AliasResource`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Name of the only provider LiftFlow ships with
pub const AWS_PROVIDER: &str = "aws";

/// Cloud provider settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider name ("aws")
    pub name: String,

    /// Region (us-west-2, ap-northeast-1, ...)
    pub region: Option<String>,

    /// Named profile from the shared credentials file
    pub profile: Option<String>,

    /// Endpoint override, e.g. for a local mock of the control plane
    pub endpoint_url: Option<String>,

    /// Provider-specific extra settings
    pub config: HashMap<String, String>,
}

impl ProviderConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}
