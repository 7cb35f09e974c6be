//! In-memory GameLift used by unit tests

use crate::api::GameLiftApi;
use crate::error::{GameLiftError, Result};
use crate::model::{
    Alias, AliasInput, EventCode, EventPage, FleetAttributes, FleetAttributesUpdate, FleetEvent,
    FleetStatus,
};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use liftflow_core::{FleetResource, IpPermission, RuntimeConfiguration};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

pub fn event(id: &str, code: &str, message: &str) -> FleetEvent {
    FleetEvent {
        event_id: id.to_string(),
        resource_id: "fleet-1".to_string(),
        event_code: EventCode::from(code),
        message: message.to_string(),
        event_time: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    }
}

pub fn fleet_with_status(id: &str, status: FleetStatus) -> FleetAttributes {
    FleetAttributes::new(id, status)
}

#[derive(Default)]
struct Inner {
    calls: Vec<String>,
    next_id: usize,
    /// Fleets that exist remotely, with the status a describe reports
    fleets: HashMap<String, FleetAttributes>,
    aliases: HashMap<String, Alias>,
    /// Scripted describe responses, consumed before falling back to `fleets`
    describe_script: VecDeque<Result<Vec<FleetAttributes>>>,
    event_pages: VecDeque<Result<EventPage>>,
    event_tokens: Vec<Option<String>>,
    failures: HashMap<&'static str, VecDeque<GameLiftError>>,
    settle_status: Option<FleetStatus>,
    attribute_updates: Vec<(String, FleetAttributesUpdate)>,
    port_updates: Vec<(String, Vec<IpPermission>, Vec<IpPermission>)>,
    runtime_updates: Vec<(String, RuntimeConfiguration)>,
}

/// Scripted [`GameLiftApi`]
///
/// Created fleets settle in ACTIVE unless [`FakeGameLift::settle_in`] says
/// otherwise; deleted fleets disappear immediately.
#[derive(Default)]
pub struct FakeGameLift {
    inner: Mutex<Inner>,
}

impl FakeGameLift {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    fn record(&self, call: &'static str) -> Option<GameLiftError> {
        let mut inner = self.lock();
        inner.calls.push(call.to_string());
        inner.failures.get_mut(call).and_then(VecDeque::pop_front)
    }

    /// Number of times an operation was called
    pub fn calls(&self, operation: &str) -> usize {
        self.lock().calls.iter().filter(|c| *c == operation).count()
    }

    /// Every call in order
    pub fn call_log(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Fail the next call to `operation` with `err`
    pub fn fail_next(&self, operation: &'static str, err: GameLiftError) {
        self.lock()
            .failures
            .entry(operation)
            .or_default()
            .push_back(err);
    }

    /// Status that created fleets report once they exist
    pub fn settle_in(&self, status: FleetStatus) {
        self.lock().settle_status = Some(status);
    }

    pub fn push_describe(&self, response: Result<Vec<FleetAttributes>>) {
        self.lock().describe_script.push_back(response);
    }

    /// Script one single-record describe response per status
    pub fn push_statuses(&self, fleet_id: &str, statuses: &[FleetStatus]) {
        for status in statuses {
            self.push_describe(Ok(vec![fleet_with_status(fleet_id, *status)]));
        }
    }

    pub fn push_event_page(&self, page: Result<EventPage>) {
        self.lock().event_pages.push_back(page);
    }

    pub fn event_tokens(&self) -> Vec<Option<String>> {
        self.lock().event_tokens.clone()
    }

    pub fn insert_fleet(&self, attrs: FleetAttributes) {
        self.lock().fleets.insert(attrs.fleet_id.clone(), attrs);
    }

    pub fn has_fleet(&self, fleet_id: &str) -> bool {
        self.lock().fleets.contains_key(fleet_id)
    }

    pub fn insert_alias(&self, alias: Alias) {
        self.lock().aliases.insert(alias.alias_id.clone(), alias);
    }

    pub fn alias(&self, alias_id: &str) -> Option<Alias> {
        self.lock().aliases.get(alias_id).cloned()
    }

    pub fn attribute_updates(&self) -> Vec<(String, FleetAttributesUpdate)> {
        self.lock().attribute_updates.clone()
    }

    pub fn port_updates(&self) -> Vec<(String, Vec<IpPermission>, Vec<IpPermission>)> {
        self.lock().port_updates.clone()
    }

    pub fn runtime_updates(&self) -> Vec<(String, RuntimeConfiguration)> {
        self.lock().runtime_updates.clone()
    }
}

#[async_trait]
impl GameLiftApi for FakeGameLift {
    async fn create_fleet(&self, fleet: &FleetResource) -> Result<FleetAttributes> {
        if let Some(err) = self.record("CreateFleet") {
            return Err(err);
        }
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = format!("fleet-{}", inner.next_id);

        let mut attrs = FleetAttributes::new(&id, FleetStatus::New);
        attrs.fleet_arn = Some(format!("arn:aws:gamelift:us-west-2::fleet/{}", id));
        attrs.name = Some(fleet.name.clone());
        attrs.description = fleet.description.clone();
        attrs.build_id = Some(fleet.build_id.clone());
        attrs.instance_type = Some(fleet.ec2_instance_type.clone());
        attrs.server_launch_path = fleet.server_launch_path.clone();
        attrs.server_launch_parameters = fleet.server_launch_parameters.clone();
        attrs.log_paths = fleet.log_paths.clone();
        attrs.metric_groups = fleet.metric_groups.clone();
        attrs.new_game_session_protection_policy = Some(fleet.new_game_session_protection_policy);
        attrs.resource_creation_limit_policy = fleet.resource_creation_limit_policy.clone();

        let mut stored = attrs.clone();
        stored.status = inner.settle_status.unwrap_or(FleetStatus::Active);
        inner.fleets.insert(id, stored);
        Ok(attrs)
    }

    async fn describe_fleet_attributes(&self, fleet_ids: &[String]) -> Result<Vec<FleetAttributes>> {
        self.record("DescribeFleetAttributes");
        let mut inner = self.lock();
        if let Some(response) = inner.describe_script.pop_front() {
            return response;
        }
        let found: Vec<_> = fleet_ids
            .iter()
            .filter_map(|id| inner.fleets.get(id).cloned())
            .collect();
        if found.is_empty() {
            Err(GameLiftError::NotFound(format!("fleets {:?}", fleet_ids)))
        } else {
            Ok(found)
        }
    }

    async fn update_fleet_attributes(
        &self,
        fleet_id: &str,
        update: &FleetAttributesUpdate,
    ) -> Result<()> {
        if let Some(err) = self.record("UpdateFleetAttributes") {
            return Err(err);
        }
        let mut inner = self.lock();
        inner
            .attribute_updates
            .push((fleet_id.to_string(), update.clone()));
        if let Some(fleet) = inner.fleets.get_mut(fleet_id) {
            if let Some(name) = &update.name {
                fleet.name = Some(name.clone());
            }
            if let Some(description) = &update.description {
                fleet.description = Some(description.clone());
            }
            if let Some(groups) = &update.metric_groups {
                fleet.metric_groups = groups.clone();
            }
            if let Some(policy) = update.new_game_session_protection_policy {
                fleet.new_game_session_protection_policy = Some(policy);
            }
            if let Some(limits) = &update.resource_creation_limit_policy {
                fleet.resource_creation_limit_policy = Some(limits.clone());
            }
        }
        Ok(())
    }

    async fn update_fleet_port_settings(
        &self,
        fleet_id: &str,
        authorize: &[IpPermission],
        revoke: &[IpPermission],
    ) -> Result<()> {
        if let Some(err) = self.record("UpdateFleetPortSettings") {
            return Err(err);
        }
        self.lock().port_updates.push((
            fleet_id.to_string(),
            authorize.to_vec(),
            revoke.to_vec(),
        ));
        Ok(())
    }

    async fn update_runtime_configuration(
        &self,
        fleet_id: &str,
        runtime: &RuntimeConfiguration,
    ) -> Result<()> {
        if let Some(err) = self.record("UpdateRuntimeConfiguration") {
            return Err(err);
        }
        self.lock()
            .runtime_updates
            .push((fleet_id.to_string(), runtime.clone()));
        Ok(())
    }

    async fn delete_fleet(&self, fleet_id: &str) -> Result<()> {
        if let Some(err) = self.record("DeleteFleet") {
            return Err(err);
        }
        match self.lock().fleets.remove(fleet_id) {
            Some(_) => Ok(()),
            None => Err(GameLiftError::NotFound(format!("fleet {}", fleet_id))),
        }
    }

    async fn describe_fleet_events(
        &self,
        _fleet_id: &str,
        next_token: Option<&str>,
    ) -> Result<EventPage> {
        self.record("DescribeFleetEvents");
        let mut inner = self.lock();
        inner.event_tokens.push(next_token.map(str::to_string));
        inner.event_pages.pop_front().unwrap_or_else(|| Ok(EventPage::default()))
    }

    async fn create_alias(&self, input: &AliasInput) -> Result<Alias> {
        if let Some(err) = self.record("CreateAlias") {
            return Err(err);
        }
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = format!("alias-{}", inner.next_id);
        let alias = Alias {
            alias_id: id.clone(),
            alias_arn: Some(format!("arn:aws:gamelift:us-west-2::alias/{}", id)),
            name: input.name.clone(),
            description: input.description.clone(),
            routing: input.routing.clone(),
        };
        inner.aliases.insert(id, alias.clone());
        Ok(alias)
    }

    async fn describe_alias(&self, alias_id: &str) -> Result<Alias> {
        if let Some(err) = self.record("DescribeAlias") {
            return Err(err);
        }
        self.lock()
            .aliases
            .get(alias_id)
            .cloned()
            .ok_or_else(|| GameLiftError::NotFound(format!("alias {}", alias_id)))
    }

    async fn update_alias(&self, alias_id: &str, input: &AliasInput) -> Result<Alias> {
        if let Some(err) = self.record("UpdateAlias") {
            return Err(err);
        }
        let mut inner = self.lock();
        let alias = inner
            .aliases
            .get_mut(alias_id)
            .ok_or_else(|| GameLiftError::NotFound(format!("alias {}", alias_id)))?;
        alias.name = input.name.clone();
        alias.description = input.description.clone();
        alias.routing = input.routing.clone();
        Ok(alias.clone())
    }

    async fn delete_alias(&self, alias_id: &str) -> Result<()> {
        if let Some(err) = self.record("DeleteAlias") {
            return Err(err);
        }
        match self.lock().aliases.remove(alias_id) {
            Some(_) => Ok(()),
            None => Err(GameLiftError::NotFound(format!("alias {}", alias_id))),
        }
    }
}
