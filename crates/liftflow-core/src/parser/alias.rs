//! Alias node parsing

use super::{first_string, node_name, required_string};
use crate::error::{ProjectError, Result};
use crate::model::{AliasResource, FleetRef, RoutingStrategy};
use kdl::KdlNode;

/// Parse an `alias` node
///
/// ```kdl
/// alias "live" {
///     routing-strategy "SIMPLE" {
///         fleet "game"
///     }
/// }
/// ```
pub fn parse_alias(node: &KdlNode) -> Result<(String, AliasResource)> {
    let name = node_name(node, "alias")?;

    let mut alias = AliasResource {
        name: name.clone(),
        ..Default::default()
    };
    let mut has_strategy = false;

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "name" => alias.name = required_string(child)?,
                "description" => alias.description = first_string(child),
                "routing_strategy" | "routing-strategy" => {
                    alias.routing_strategy = parse_routing_strategy(child)?;
                    has_strategy = true;
                }
                other => {
                    tracing::warn!("Ignoring unknown alias setting '{}' in {}", other, name);
                }
            }
        }
    }

    if !has_strategy {
        return Err(ProjectError::InvalidConfig(format!(
            "alias '{}' requires a routing-strategy",
            name
        )));
    }

    Ok((name, alias))
}

fn parse_routing_strategy(node: &KdlNode) -> Result<RoutingStrategy> {
    let kind = required_string(node)?
        .parse()
        .map_err(ProjectError::InvalidConfig)?;

    let mut strategy = RoutingStrategy {
        kind,
        ..Default::default()
    };

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "fleet" => strategy.fleet = Some(FleetRef::Name(required_string(child)?)),
                "fleet_id" | "fleet-id" => {
                    strategy.fleet = Some(FleetRef::Id(required_string(child)?))
                }
                "message" => strategy.message = first_string(child),
                other => {
                    tracing::warn!("Ignoring unknown routing-strategy setting '{}'", other);
                }
            }
        }
    }

    Ok(strategy)
}
