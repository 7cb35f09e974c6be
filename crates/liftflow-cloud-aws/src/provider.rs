//! Amazon GameLift provider implementation

use crate::alias::{self, AliasManager};
use crate::api::GameLiftApi;
use crate::error::{GameLiftError, Result};
use crate::fleet::{self, FleetDiff, FleetManager};
use crate::model::{Alias, FleetAttributes};
use crate::sdk::SdkGameLift;
use async_trait::async_trait;
use liftflow_cloud::{
    Action, ActionType, ApplyResult, CloudError, CloudProvider, Plan, PollConfig, ProviderState,
    ResourceSet, ResourceState, ResourceStatus,
};
use liftflow_core::{ALIAS, AliasResource, FLEET, FleetResource, ProviderConfig};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

/// State attribute holding the last applied (or last observed) spec
pub const SPEC_ATTR: &str = "spec";
/// State attribute holding the remote ARN
pub const ARN_ATTR: &str = "arn";
/// State attribute holding the raw remote status
pub const STATUS_ATTR: &str = "status";
/// State attribute holding the fleet ID an alias was applied with
pub const FLEET_ID_ATTR: &str = "fleet_id";

fn key(resource_type: &str, name: &str) -> String {
    format!("{}:{}", resource_type, name)
}

/// Amazon GameLift provider
pub struct GameLiftProvider {
    api: Arc<dyn GameLiftApi>,
    poll: PollConfig,
}

impl GameLiftProvider {
    pub fn new(api: Arc<dyn GameLiftApi>) -> Self {
        Self {
            api,
            poll: PollConfig::default(),
        }
    }

    /// Provider backed by the AWS SDK, configured from the project's
    /// provider block
    pub async fn from_config(config: &ProviderConfig) -> Self {
        Self::new(Arc::new(SdkGameLift::from_provider(config).await))
    }

    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn api(&self) -> &dyn GameLiftApi {
        self.api.as_ref()
    }

    fn fleets(&self) -> FleetManager<'_> {
        FleetManager::new(self.api.as_ref()).with_poll(self.poll.clone())
    }

    fn aliases(&self) -> AliasManager<'_> {
        AliasManager::new(self.api.as_ref())
    }

    async fn refresh_fleet(&self, current: &ResourceState) -> Result<Option<ResourceState>> {
        let Some(attrs) = self.fleets().read(&current.id).await? else {
            return Ok(None);
        };

        let mut refreshed = current.clone();
        record_fleet(&mut refreshed, &attrs);
        if current.is_tainted() {
            refreshed.set_status(ResourceStatus::Error);
        }
        if let Some(applied) = current.get_attribute::<FleetResource>(SPEC_ATTR) {
            let observed = fleet::observed_spec(&attrs, &applied);
            refreshed.set_attribute(SPEC_ATTR, serde_json::to_value(&observed)?);
        }
        Ok(Some(refreshed))
    }

    async fn refresh_alias(&self, current: &ResourceState) -> Result<Option<ResourceState>> {
        let Some(remote) = self.aliases().read(&current.id).await? else {
            return Ok(None);
        };

        let mut refreshed = current.clone();
        record_alias(&mut refreshed, &remote);
        if let Some(applied) = current.get_attribute::<AliasResource>(SPEC_ATTR) {
            let applied_fleet_id = current.get_attribute::<String>(FLEET_ID_ATTR);
            let observed = alias::observed_spec(&remote, &applied, applied_fleet_id.as_deref());
            refreshed.set_attribute(SPEC_ATTR, serde_json::to_value(&observed)?);
        }
        Ok(Some(refreshed))
    }

    fn plan_fleet(
        &self,
        name: &str,
        spec: &FleetResource,
        current: Option<&ResourceState>,
    ) -> Result<Action> {
        let Some(existing) = current else {
            return Ok(Action::new(
                ActionType::Create,
                FLEET,
                name,
                format!(
                    "Create fleet {} (build {}, {})",
                    spec.name, spec.build_id, spec.ec2_instance_type
                ),
            ));
        };

        if existing.is_tainted() {
            return Ok(Action::new(
                ActionType::Replace,
                FLEET,
                name,
                format!("Replace fleet {} ({} failed to provision)", name, existing.id),
            )
            .with_changes(vec!["tainted".to_string()])
            .with_detail("fleet_id", serde_json::json!(existing.id)));
        }

        let applied = applied_spec::<FleetResource>(FLEET, name, existing)?;
        let diff = FleetDiff::between(&applied, spec);
        let action = if diff.is_empty() {
            Action::new(
                ActionType::NoOp,
                FLEET,
                name,
                format!("Fleet {} is up to date", name),
            )
        } else if diff.requires_replace() {
            Action::new(
                ActionType::Replace,
                FLEET,
                name,
                format!(
                    "Replace fleet {} ({} cannot change in place)",
                    name,
                    diff.replace.join(", ")
                ),
            )
            .with_changes(diff.fields())
        } else {
            Action::new(
                ActionType::Update,
                FLEET,
                name,
                format!("Update fleet {}", name),
            )
            .with_changes(diff.fields())
        };
        Ok(action.with_detail("fleet_id", serde_json::json!(existing.id)))
    }

    fn plan_alias(
        &self,
        name: &str,
        spec: &AliasResource,
        current: Option<&ResourceState>,
        rebuilt_fleets: &HashSet<String>,
    ) -> Result<Action> {
        let mut action = match current {
            None => Action::new(
                ActionType::Create,
                ALIAS,
                name,
                format!(
                    "Create alias {} ({})",
                    spec.name,
                    spec.routing_strategy.kind.as_str()
                ),
            ),
            Some(existing) => {
                let applied = applied_spec::<AliasResource>(ALIAS, name, existing)?;
                let mut changes = alias::changed_fields(&applied, spec);
                let fleet_rebuilt = spec
                    .fleet_dependency()
                    .is_some_and(|fleet| rebuilt_fleets.contains(fleet));
                let fleet_change = "routing_strategy.fleet".to_string();
                if fleet_rebuilt && !changes.contains(&fleet_change) {
                    changes.push(fleet_change);
                }

                let action = if changes.is_empty() {
                    Action::new(
                        ActionType::NoOp,
                        ALIAS,
                        name,
                        format!("Alias {} is up to date", name),
                    )
                } else {
                    Action::new(
                        ActionType::Update,
                        ALIAS,
                        name,
                        format!("Update alias {}", name),
                    )
                    .with_changes(changes)
                };
                action.with_detail("alias_id", serde_json::json!(existing.id))
            }
        };

        if let Some(fleet) = spec.fleet_dependency() {
            action = action.with_dependency(key(FLEET, fleet));
        }
        Ok(action)
    }

    async fn apply_action(
        &self,
        action: &Action,
        desired: &ResourceSet,
        state: &mut ProviderState,
    ) -> Result<String> {
        match (action.resource_type.as_str(), action.action_type) {
            (FLEET, ActionType::Create) => {
                let spec = desired_spec::<FleetResource>(desired, action)?;
                self.create_fleet(&action.key(), &spec, state).await
            }
            (FLEET, ActionType::Update) => {
                let spec = desired_spec::<FleetResource>(desired, action)?;
                self.update_fleet(&action.key(), &spec, state).await
            }
            (FLEET, ActionType::Replace) => {
                let spec = desired_spec::<FleetResource>(desired, action)?;
                self.delete_fleet(&action.key(), state).await?;
                self.create_fleet(&action.key(), &spec, state).await
            }
            (FLEET, ActionType::Delete) => self.delete_fleet(&action.key(), state).await,
            (ALIAS, ActionType::Create | ActionType::Update) => {
                let spec = desired_spec::<AliasResource>(desired, action)?;
                self.upsert_alias(&action.key(), &spec, state).await
            }
            (ALIAS, ActionType::Replace) => {
                let spec = desired_spec::<AliasResource>(desired, action)?;
                self.delete_alias(&action.key(), state).await?;
                self.upsert_alias(&action.key(), &spec, state).await
            }
            (ALIAS, ActionType::Delete) => self.delete_alias(&action.key(), state).await,
            (_, ActionType::NoOp) => Ok(String::new()),
            (other, _) => Err(GameLiftError::InvalidConfig(format!(
                "unsupported resource type '{}'",
                other
            ))),
        }
    }

    async fn create_fleet(
        &self,
        key: &str,
        spec: &FleetResource,
        state: &mut ProviderState,
    ) -> Result<String> {
        let fleets = self.fleets();
        let created = fleets.start_create(spec).await?;

        // Record the fleet before waiting so a failed wait leaves it tainted
        // instead of orphaned
        let mut entry = ResourceState::new(created.fleet_id.clone(), FLEET)
            .with_status(ResourceStatus::Creating)
            .with_attribute(SPEC_ATTR, serde_json::to_value(spec)?);
        record_fleet(&mut entry, &created);
        entry.set_status(ResourceStatus::Creating);
        state.add(key.to_string(), entry);

        match fleets
            .wait_active(&created.fleet_id, spec.timeouts.create_timeout())
            .await
        {
            Ok(attrs) => {
                if let Some(entry) = state.get_mut(key) {
                    record_fleet(entry, &attrs);
                }
                Ok(format!("Created fleet {} ({})", spec.name, created.fleet_id))
            }
            Err(e) => {
                if let Some(entry) = state.get_mut(key) {
                    entry.set_status(ResourceStatus::Error);
                }
                Err(e)
            }
        }
    }

    async fn update_fleet(
        &self,
        key: &str,
        spec: &FleetResource,
        state: &mut ProviderState,
    ) -> Result<String> {
        let entry = state
            .get_mut(key)
            .ok_or_else(|| GameLiftError::NotFound(format!("{} is not in state", key)))?;
        let applied = applied_spec::<FleetResource>(FLEET, key, entry)?;

        let attrs = self.fleets().update(&entry.id, &applied, spec).await?;
        record_fleet(entry, &attrs);
        entry.set_attribute(SPEC_ATTR, serde_json::to_value(spec)?);
        Ok(format!("Updated fleet {} ({})", spec.name, entry.id))
    }

    async fn delete_fleet(&self, key: &str, state: &mut ProviderState) -> Result<String> {
        let entry = state
            .get_mut(key)
            .ok_or_else(|| GameLiftError::NotFound(format!("{} is not in state", key)))?;
        let timeout = entry
            .get_attribute::<FleetResource>(SPEC_ATTR)
            .map(|spec| spec.timeouts.delete_timeout())
            .unwrap_or(liftflow_cloud::DEFAULT_TIMEOUT);
        let fleet_id = entry.id.clone();
        entry.set_status(ResourceStatus::Deleting);

        self.fleets().delete(&fleet_id, timeout).await?;
        state.remove(key);
        Ok(format!("Deleted fleet {}", fleet_id))
    }

    async fn upsert_alias(
        &self,
        key: &str,
        spec: &AliasResource,
        state: &mut ProviderState,
    ) -> Result<String> {
        let input = alias::alias_input(spec, |fleet| fleet_id_in(state, fleet))?;
        let aliases = self.aliases();

        let existing = state.get(key).map(|entry| entry.id.clone());
        let (alias, verb) = match existing {
            Some(alias_id) => (aliases.update(&alias_id, &input).await?, "Updated"),
            None => (aliases.create(&input).await?, "Created"),
        };

        let mut entry = state
            .remove(key)
            .unwrap_or_else(|| ResourceState::new(alias.alias_id.clone(), ALIAS));
        entry.id = alias.alias_id.clone();
        record_alias(&mut entry, &alias);
        entry.set_attribute(SPEC_ATTR, serde_json::to_value(spec)?);
        match &input.routing.fleet_id {
            Some(fleet_id) => entry.set_attribute(FLEET_ID_ATTR, serde_json::json!(fleet_id)),
            None => {
                entry.attributes.remove(FLEET_ID_ATTR);
            }
        }
        state.add(key.to_string(), entry);

        Ok(format!("{} alias {} ({})", verb, spec.name, alias.alias_id))
    }

    async fn delete_alias(&self, key: &str, state: &mut ProviderState) -> Result<String> {
        let alias_id = state
            .get(key)
            .map(|entry| entry.id.clone())
            .ok_or_else(|| GameLiftError::NotFound(format!("{} is not in state", key)))?;

        self.aliases().delete(&alias_id).await?;
        state.remove(key);
        Ok(format!("Deleted alias {}", alias_id))
    }
}

/// Resource keys in teardown order: aliases before the fleets they route to
fn teardown_order(state: &ProviderState) -> Vec<String> {
    let mut keys = state.keys_of_type(ALIAS);
    keys.extend(state.keys_of_type(FLEET));
    let others: Vec<String> = state
        .iter()
        .map(|(key, _)| key.clone())
        .filter(|key| !keys.contains(key))
        .collect();
    keys.extend(others);
    keys
}

fn fleet_id_in(state: &ProviderState, fleet: &str) -> Option<String> {
    state
        .get(&key(FLEET, fleet))
        .filter(|entry| !entry.is_tainted())
        .map(|entry| entry.id.clone())
}

fn record_fleet(entry: &mut ResourceState, attrs: &FleetAttributes) {
    entry.set_status(attrs.status.resource_status());
    entry.set_attribute(STATUS_ATTR, serde_json::json!(attrs.status.as_str()));
    if let Some(arn) = &attrs.fleet_arn {
        entry.set_attribute(ARN_ATTR, serde_json::json!(arn));
    }
}

fn record_alias(entry: &mut ResourceState, alias: &Alias) {
    entry.set_status(ResourceStatus::Running);
    if let Some(arn) = &alias.alias_arn {
        entry.set_attribute(ARN_ATTR, serde_json::json!(arn));
    }
}

fn applied_spec<T: serde::de::DeserializeOwned>(
    resource_type: &str,
    name: &str,
    entry: &ResourceState,
) -> Result<T> {
    entry.get_attribute::<T>(SPEC_ATTR).ok_or_else(|| {
        CloudError::StateError(format!(
            "{} {} ({}) has no recorded configuration",
            resource_type, name, entry.id
        ))
        .into()
    })
}

fn desired_spec<T: serde::de::DeserializeOwned>(
    desired: &ResourceSet,
    action: &Action,
) -> Result<T> {
    let config = desired.get_by_key(&action.key()).ok_or_else(|| {
        GameLiftError::InvalidConfig(format!("{} is not declared in the project", action.key()))
    })?;
    Ok(config.spec()?)
}

#[async_trait]
impl CloudProvider for GameLiftProvider {
    fn name(&self) -> &str {
        liftflow_core::AWS_PROVIDER
    }

    fn display_name(&self) -> &str {
        "Amazon GameLift"
    }

    async fn refresh(&self, known: &ProviderState) -> liftflow_cloud::Result<ProviderState> {
        let mut refreshed = ProviderState::new();

        for (key, current) in known.iter() {
            let observed = match current.resource_type.as_str() {
                FLEET => self.refresh_fleet(current).await?,
                ALIAS => self.refresh_alias(current).await?,
                other => {
                    tracing::warn!("Keeping {} with unknown resource type '{}'", key, other);
                    Some(current.clone())
                }
            };

            match observed {
                Some(state) => refreshed.add(key.clone(), state),
                None => tracing::warn!(
                    "{} ({}) no longer exists; removing it from state",
                    key,
                    current.id
                ),
            }
        }

        Ok(refreshed)
    }

    async fn plan(
        &self,
        desired: &ResourceSet,
        current: &ProviderState,
    ) -> liftflow_cloud::Result<Plan> {
        let mut fleet_actions = Vec::new();
        let mut rebuilt_fleets = HashSet::new();
        for resource in desired.by_type(FLEET) {
            let spec: FleetResource = resource.spec()?;
            let action = self.plan_fleet(&resource.id, &spec, current.get(&resource.key()))?;
            if matches!(action.action_type, ActionType::Create | ActionType::Replace) {
                rebuilt_fleets.insert(resource.id.clone());
            }
            fleet_actions.push(action);
        }

        let mut alias_actions = Vec::new();
        for resource in desired.by_type(ALIAS) {
            let spec: AliasResource = resource.spec()?;
            alias_actions.push(self.plan_alias(
                &resource.id,
                &spec,
                current.get(&resource.key()),
                &rebuilt_fleets,
            )?);
        }

        let mut alias_deletes = Vec::new();
        let mut fleet_deletes = Vec::new();
        for (key, existing) in current.iter() {
            if desired.get_by_key(key).is_some() {
                continue;
            }
            let name = key
                .split_once(':')
                .map(|(_, name)| name)
                .unwrap_or(key.as_str());
            let action = Action::new(
                ActionType::Delete,
                existing.resource_type.clone(),
                name,
                format!("Delete {} {} ({})", existing.resource_type, name, existing.id),
            );
            if existing.resource_type == ALIAS {
                alias_deletes.push(action);
            } else {
                fleet_deletes.push(action);
            }
        }

        // Free alias references first and retire fleets last, so every alias
        // can be moved off a fleet before it goes away
        let mut actions = alias_deletes;
        actions.extend(fleet_actions);
        actions.extend(alias_actions);
        actions.extend(fleet_deletes);

        Ok(Plan::new(actions))
    }

    async fn apply(
        &self,
        plan: &Plan,
        desired: &ResourceSet,
        state: &mut ProviderState,
    ) -> liftflow_cloud::Result<ApplyResult> {
        let mut result = ApplyResult::new();
        let start = Instant::now();
        let mut failed: HashSet<String> = HashSet::new();

        for action in &plan.actions {
            if action.action_type == ActionType::NoOp {
                continue;
            }

            if let Some(dependency) = action.depends_on.iter().find(|d| failed.contains(*d)) {
                tracing::warn!("Skipping {}: {} failed", action.key(), dependency);
                result.add_failure(
                    action.id.clone(),
                    format!("skipped because {} failed", dependency),
                );
                failed.insert(action.key());
                continue;
            }

            tracing::info!("{}", action.description);
            match self.apply_action(action, desired, state).await {
                Ok(message) => result.add_success(action.id.clone(), message),
                Err(e) => {
                    tracing::error!("{} failed: {}", action.key(), e);
                    result.add_failure(action.id.clone(), e.to_string());
                    failed.insert(action.key());
                }
            }
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }

    async fn destroy(&self, key: &str, state: &mut ProviderState) -> liftflow_cloud::Result<()> {
        let resource_type = state
            .get(key)
            .map(|entry| entry.resource_type.clone())
            .ok_or_else(|| CloudError::ResourceNotFound(key.to_string()))?;

        match resource_type.as_str() {
            FLEET => self.delete_fleet(key, state).await?,
            ALIAS => self.delete_alias(key, state).await?,
            other => {
                return Err(CloudError::InvalidConfig(format!(
                    "unsupported resource type '{}'",
                    other
                )));
            }
        };
        Ok(())
    }

    async fn destroy_all(&self, state: &mut ProviderState) -> liftflow_cloud::Result<ApplyResult> {
        let mut result = ApplyResult::new();
        let start = Instant::now();

        for key in teardown_order(state) {
            let action_id = format!("{}-{}", ActionType::Delete, key.replace(':', "-"));
            match self.destroy(&key, state).await {
                Ok(()) => result.add_success(action_id, format!("Destroyed {}", key)),
                Err(e) => {
                    tracing::error!("Failed to destroy {}: {}", key, e);
                    result.add_failure(action_id, e.to_string());
                }
            }
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }
}
