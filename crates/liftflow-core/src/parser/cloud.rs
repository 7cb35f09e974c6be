//! Provider node parsing

use super::{first_string, node_name};
use crate::error::Result;
use crate::model::ProviderConfig;
use kdl::KdlNode;

/// Parse a `provider` node
pub fn parse_provider(node: &KdlNode) -> Result<(String, ProviderConfig)> {
    let name = node_name(node, "provider")?;

    let mut provider = ProviderConfig::new(name.clone());

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "region" => provider.region = first_string(child),
                "profile" => provider.profile = first_string(child),
                "endpoint_url" | "endpoint-url" | "endpoint" => {
                    provider.endpoint_url = first_string(child)
                }
                // anything else is kept as an extra setting
                other => {
                    if let Some(value) = first_string(child) {
                        provider.config.insert(other.to_string(), value);
                    }
                }
            }
        }
    }

    Ok((name, provider))
}
