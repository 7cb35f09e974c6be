//! Alias lifecycle
//!
//! Aliases are created and updated synchronously, so no waiting is involved.
//! A SIMPLE alias may name a fleet from the same project; the name is
//! resolved to the fleet ID recorded in state when the request is built.

use crate::api::GameLiftApi;
use crate::error::{GameLiftError, Result};
use crate::model::{Alias, AliasInput, AliasRouting};
use liftflow_core::{AliasResource, FleetRef, RoutingStrategy};

/// Resolve a routing strategy, looking up project fleet names with `fleet_id_for`
pub fn resolve_routing<F>(strategy: &RoutingStrategy, fleet_id_for: F) -> Result<AliasRouting>
where
    F: Fn(&str) -> Option<String>,
{
    let fleet_id = match &strategy.fleet {
        Some(FleetRef::Id(id)) => Some(id.clone()),
        Some(FleetRef::Name(name)) => Some(fleet_id_for(name).ok_or_else(|| {
            GameLiftError::InvalidConfig(format!("fleet '{}' has not been created yet", name))
        })?),
        None => None,
    };

    Ok(AliasRouting {
        kind: strategy.kind,
        fleet_id,
        message: strategy.message.clone(),
    })
}

/// Build the request for `CreateAlias` / `UpdateAlias`
pub fn alias_input<F>(alias: &AliasResource, fleet_id_for: F) -> Result<AliasInput>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(AliasInput {
        name: alias.name.clone(),
        description: alias.description.clone(),
        routing: resolve_routing(&alias.routing_strategy, fleet_id_for)?,
    })
}

/// Attributes that differ between two alias specs
pub fn changed_fields(current: &AliasResource, desired: &AliasResource) -> Vec<String> {
    let mut changes = Vec::new();
    if current.name != desired.name {
        changes.push("name".to_string());
    }
    if current.description != desired.description {
        changes.push("description".to_string());
    }
    let (from, to) = (&current.routing_strategy, &desired.routing_strategy);
    if from.kind != to.kind {
        changes.push("routing_strategy.type".to_string());
    }
    if from.fleet != to.fleet {
        changes.push("routing_strategy.fleet".to_string());
    }
    if from.message != to.message {
        changes.push("routing_strategy.message".to_string());
    }
    changes
}

/// Carry what `DescribeAlias` reports over the last applied spec.
///
/// While the alias still routes to the fleet ID it was applied with, the
/// applied fleet reference is kept as written. Any other fleet ID shows up
/// as a literal [`FleetRef::Id`].
pub fn observed_spec(
    remote: &Alias,
    last_applied: &AliasResource,
    applied_fleet_id: Option<&str>,
) -> AliasResource {
    let fleet = if remote.routing.fleet_id.as_deref() == applied_fleet_id {
        last_applied.routing_strategy.fleet.clone()
    } else {
        remote.routing.fleet_id.clone().map(FleetRef::Id)
    };

    AliasResource {
        name: remote.name.clone(),
        description: remote.description.clone().filter(|d| !d.is_empty()),
        routing_strategy: RoutingStrategy {
            kind: remote.routing.kind,
            fleet,
            message: remote.routing.message.clone(),
        },
    }
}

pub struct AliasManager<'a> {
    api: &'a dyn GameLiftApi,
}

impl<'a> AliasManager<'a> {
    pub fn new(api: &'a dyn GameLiftApi) -> Self {
        Self { api }
    }

    pub async fn create(&self, input: &AliasInput) -> Result<Alias> {
        tracing::info!(
            "Creating alias: {} ({})",
            input.name,
            input.routing.kind.as_str()
        );
        let alias = self.api.create_alias(input).await?;
        tracing::info!("Alias {} created as {}", input.name, alias.alias_id);
        Ok(alias)
    }

    /// Current alias, or `None` when it no longer exists
    pub async fn read(&self, alias_id: &str) -> Result<Option<Alias>> {
        match self.api.describe_alias(alias_id).await {
            Ok(alias) => Ok(Some(alias)),
            Err(GameLiftError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// An alias without a description clears the remote one
    pub async fn update(&self, alias_id: &str, input: &AliasInput) -> Result<Alias> {
        tracing::info!("Updating alias: {} ({})", input.name, alias_id);
        let mut input = input.clone();
        if input.description.is_none() {
            input.description = Some(String::new());
        }
        self.api.update_alias(alias_id, &input).await
    }

    pub async fn delete(&self, alias_id: &str) -> Result<()> {
        tracing::info!("Deleting alias: {}", alias_id);
        match self.api.delete_alias(alias_id).await {
            Err(GameLiftError::NotFound(_)) => {
                tracing::info!("Alias {} is already gone", alias_id);
                Ok(())
            }
            other => other,
        }
    }
}
