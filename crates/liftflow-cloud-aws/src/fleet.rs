//! Fleet lifecycle
//!
//! `CreateFleet` and `DeleteFleet` return as soon as GameLift accepts the
//! request. The fleet then provisions (or tears down) in the background, so
//! both operations wait on [`StateChange`] before reporting success.

use crate::api::GameLiftApi;
use crate::diagnostics::fleet_failures;
use crate::error::{GameLiftError, Result};
use crate::model::{FleetAttributes, FleetAttributesUpdate, FleetStatus};
use liftflow_cloud::{CloudError, Observation, PollConfig, StateChange, WaitTarget};
use liftflow_core::{FleetResource, IpPermission, ResourceCreationLimitPolicy};
use std::collections::BTreeSet;
use std::time::Duration;

/// Attributes that GameLift cannot change on an existing fleet
const IMMUTABLE: [&str; 7] = [
    "build_id",
    "ec2_instance_type",
    "server_launch_path",
    "server_launch_parameters",
    "log_paths",
    "peer_vpc_aws_account_id",
    "peer_vpc_id",
];

/// How a desired fleet differs from the last known one
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FleetDiff {
    /// Changed attributes that force a new fleet
    pub replace: Vec<&'static str>,
    /// Changed attributes that can be updated in place
    pub update: Vec<&'static str>,
}

impl FleetDiff {
    pub fn between(current: &FleetResource, desired: &FleetResource) -> Self {
        let mut diff = FleetDiff::default();
        let mut changed = |field: &'static str, differs: bool| {
            if !differs {
                return;
            }
            if IMMUTABLE.contains(&field) {
                diff.replace.push(field);
            } else {
                diff.update.push(field);
            }
        };

        changed("name", current.name != desired.name);
        changed("build_id", current.build_id != desired.build_id);
        changed(
            "ec2_instance_type",
            current.ec2_instance_type != desired.ec2_instance_type,
        );
        changed("description", current.description != desired.description);
        changed(
            "ec2_inbound_permissions",
            permission_set(&current.ec2_inbound_permissions)
                != permission_set(&desired.ec2_inbound_permissions),
        );
        changed("log_paths", current.log_paths != desired.log_paths);
        changed("metric_groups", current.metric_groups != desired.metric_groups);
        changed(
            "new_game_session_protection_policy",
            current.new_game_session_protection_policy
                != desired.new_game_session_protection_policy,
        );
        changed(
            "peer_vpc_aws_account_id",
            current.peer_vpc_aws_account_id != desired.peer_vpc_aws_account_id,
        );
        changed("peer_vpc_id", current.peer_vpc_id != desired.peer_vpc_id);
        changed(
            "resource_creation_limit_policy",
            current.resource_creation_limit_policy != desired.resource_creation_limit_policy,
        );
        changed(
            "runtime_configuration",
            current.runtime_configuration != desired.runtime_configuration,
        );
        changed(
            "server_launch_path",
            current.server_launch_path != desired.server_launch_path,
        );
        changed(
            "server_launch_parameters",
            current.server_launch_parameters != desired.server_launch_parameters,
        );

        // the runtime configuration can be changed but not removed
        if current.runtime_configuration.is_some() && desired.runtime_configuration.is_none() {
            diff.update.retain(|f| *f != "runtime_configuration");
            diff.replace.push("runtime_configuration");
        }

        diff
    }

    pub fn is_empty(&self) -> bool {
        self.replace.is_empty() && self.update.is_empty()
    }

    pub fn requires_replace(&self) -> bool {
        !self.replace.is_empty()
    }

    /// Every changed attribute, replacing ones first
    pub fn fields(&self) -> Vec<String> {
        self.replace
            .iter()
            .chain(self.update.iter())
            .map(|f| f.to_string())
            .collect()
    }
}

fn permission_set(permissions: &[IpPermission]) -> BTreeSet<&IpPermission> {
    permissions.iter().collect()
}

/// Carry what `DescribeFleetAttributes` reports over the last applied spec.
///
/// Inbound permissions, the runtime configuration and VPC peering are not
/// part of the describe output and keep their last applied values. A
/// creation limit policy the project never set is left unset, since
/// GameLift reports a zero policy for those fleets.
pub fn observed_spec(attrs: &FleetAttributes, last_applied: &FleetResource) -> FleetResource {
    let mut spec = last_applied.clone();
    if let Some(name) = &attrs.name {
        spec.name = name.clone();
    }
    if let Some(build_id) = &attrs.build_id {
        spec.build_id = build_id.clone();
    }
    if let Some(instance_type) = &attrs.instance_type {
        spec.ec2_instance_type = instance_type.clone();
    }
    spec.description = attrs.description.clone().filter(|d| !d.is_empty());
    spec.server_launch_path = attrs.server_launch_path.clone();
    spec.server_launch_parameters = attrs.server_launch_parameters.clone();
    spec.log_paths = attrs.log_paths.clone();
    spec.metric_groups = attrs.metric_groups.clone();
    if let Some(policy) = attrs.new_game_session_protection_policy {
        spec.new_game_session_protection_policy = policy;
    }
    if last_applied.resource_creation_limit_policy.is_some() {
        spec.resource_creation_limit_policy = attrs.resource_creation_limit_policy.clone();
    }
    spec
}

async fn observe(api: &dyn GameLiftApi, ids: &[String]) -> Result<Observation<FleetAttributes>> {
    match api.describe_fleet_attributes(ids).await {
        Ok(records) => Ok(Observation::Records(records)),
        Err(GameLiftError::NotFound(_)) => Ok(Observation::NotFound),
        Err(e) => Err(e),
    }
}

/// Fleet operations against a [`GameLiftApi`]
pub struct FleetManager<'a> {
    api: &'a dyn GameLiftApi,
    poll: PollConfig,
}

impl<'a> FleetManager<'a> {
    pub fn new(api: &'a dyn GameLiftApi) -> Self {
        Self {
            api,
            poll: PollConfig::default(),
        }
    }

    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Create a fleet and wait until it is ACTIVE
    pub async fn create(&self, spec: &FleetResource) -> Result<FleetAttributes> {
        let created = self.start_create(spec).await?;
        self.wait_active(&created.fleet_id, spec.timeouts.create_timeout())
            .await
    }

    /// Issue `CreateFleet` without waiting
    pub async fn start_create(&self, spec: &FleetResource) -> Result<FleetAttributes> {
        tracing::info!("Creating fleet: {} (build {})", spec.name, spec.build_id);
        let created = self.api.create_fleet(spec).await?;
        tracing::info!(
            "Fleet {} accepted as {} ({})",
            spec.name,
            created.fleet_id,
            created.status
        );
        Ok(created)
    }

    /// Wait for a new fleet to become ACTIVE.
    ///
    /// When it settles in any other status, the fleet's failure events are
    /// read once and attached to the error.
    pub async fn wait_active(&self, fleet_id: &str, timeout: Duration) -> Result<FleetAttributes> {
        let change = StateChange::new(
            format!("fleet {}", fleet_id),
            FleetStatus::CREATE_PENDING.to_vec(),
            WaitTarget::Status(FleetStatus::Active),
            timeout,
        )
        .with_poll(self.poll.clone());

        let ids = [fleet_id.to_string()];
        let ids: &[String] = &ids;
        let api = self.api;

        match change.wait(move || observe(api, ids)).await {
            Ok(Some(attrs)) => {
                tracing::info!("Fleet {} is ACTIVE", fleet_id);
                Ok(attrs)
            }
            Ok(None) => Err(GameLiftError::Api(format!(
                "fleet {} became ACTIVE without a record",
                fleet_id
            ))),
            Err(GameLiftError::Cloud(cause)) if cause.is_unexpected_status() => {
                Err(self.with_diagnostics(fleet_id, cause).await)
            }
            Err(e) => Err(e),
        }
    }

    async fn with_diagnostics(&self, fleet_id: &str, cause: CloudError) -> GameLiftError {
        match fleet_failures(self.api, fleet_id).await {
            Ok(events) if events.is_empty() => {
                tracing::debug!("No failure events recorded for fleet {}", fleet_id);
                GameLiftError::Cloud(cause)
            }
            Ok(events) => GameLiftError::ProvisioningFailed {
                fleet_id: fleet_id.to_string(),
                cause,
                events,
            },
            Err(e) => {
                tracing::warn!("Could not read events for fleet {}: {}", fleet_id, e);
                GameLiftError::Cloud(cause)
            }
        }
    }

    /// Current attributes, or `None` when the fleet no longer exists
    pub async fn read(&self, fleet_id: &str) -> Result<Option<FleetAttributes>> {
        let ids = [fleet_id.to_string()];
        match observe(self.api, &ids).await? {
            Observation::NotFound => Ok(None),
            Observation::Records(mut records) => match records.len() {
                0 => Ok(None),
                1 => Ok(records.pop()),
                found => Err(CloudError::Inconsistent {
                    resource: format!("fleet {}", fleet_id),
                    found,
                }
                .into()),
            },
        }
    }

    /// Apply in-place changes from `current` to `desired`
    pub async fn update(
        &self,
        fleet_id: &str,
        current: &FleetResource,
        desired: &FleetResource,
    ) -> Result<FleetAttributes> {
        let attributes = attributes_update(current, desired);
        if !attributes.is_empty() {
            tracing::info!("Updating attributes of fleet {}", fleet_id);
            self.api
                .update_fleet_attributes(fleet_id, &attributes)
                .await?;
        }

        let current_rules = permission_set(&current.ec2_inbound_permissions);
        let desired_rules = permission_set(&desired.ec2_inbound_permissions);
        let authorize: Vec<IpPermission> = desired_rules
            .difference(&current_rules)
            .map(|p| (*p).clone())
            .collect();
        let revoke: Vec<IpPermission> = current_rules
            .difference(&desired_rules)
            .map(|p| (*p).clone())
            .collect();
        if !authorize.is_empty() || !revoke.is_empty() {
            tracing::info!(
                "Updating port settings of fleet {} (+{} -{})",
                fleet_id,
                authorize.len(),
                revoke.len()
            );
            self.api
                .update_fleet_port_settings(fleet_id, &authorize, &revoke)
                .await?;
        }

        if current.runtime_configuration != desired.runtime_configuration
            && let Some(runtime) = &desired.runtime_configuration
        {
            tracing::info!("Updating runtime configuration of fleet {}", fleet_id);
            self.api
                .update_runtime_configuration(fleet_id, runtime)
                .await?;
        }

        self.read(fleet_id)
            .await?
            .ok_or_else(|| GameLiftError::NotFound(format!("fleet {}", fleet_id)))
    }

    /// Delete a fleet and wait until it is gone
    pub async fn delete(&self, fleet_id: &str, timeout: Duration) -> Result<()> {
        tracing::info!("Deleting fleet: {}", fleet_id);
        match self.api.delete_fleet(fleet_id).await {
            Ok(()) => {}
            Err(GameLiftError::NotFound(_)) => {
                tracing::info!("Fleet {} is already gone", fleet_id);
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        let change = StateChange::new(
            format!("fleet {}", fleet_id),
            FleetStatus::DELETE_PENDING.to_vec(),
            WaitTarget::Gone,
            timeout,
        )
        .with_poll(self.poll.clone());

        let ids = [fleet_id.to_string()];
        let ids: &[String] = &ids;
        let api = self.api;
        change.wait(move || observe(api, ids)).await?;

        tracing::info!("Fleet {} deleted", fleet_id);
        Ok(())
    }
}

/// Only changed attributes are sent. GameLift keeps any attribute a request
/// omits, so removed optional attributes are sent as their cleared value.
fn attributes_update(current: &FleetResource, desired: &FleetResource) -> FleetAttributesUpdate {
    fn changed<T: Clone + PartialEq>(current: &T, desired: &T) -> Option<T> {
        (current != desired).then(|| desired.clone())
    }

    FleetAttributesUpdate {
        name: changed(&current.name, &desired.name),
        description: changed(&current.description, &desired.description)
            .map(Option::unwrap_or_default),
        metric_groups: changed(&current.metric_groups, &desired.metric_groups),
        new_game_session_protection_policy: changed(
            &current.new_game_session_protection_policy,
            &desired.new_game_session_protection_policy,
        ),
        // zero limits are what GameLift reports for a fleet without a policy
        resource_creation_limit_policy: changed(
            &current.resource_creation_limit_policy,
            &desired.resource_creation_limit_policy,
        )
        .map(|policy| policy.unwrap_or_else(no_limit_policy)),
    }
}

fn no_limit_policy() -> ResourceCreationLimitPolicy {
    ResourceCreationLimitPolicy {
        new_game_sessions_per_creator: Some(0),
        policy_period_in_minutes: Some(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventPage;
    use crate::testing::{FakeGameLift, event, fleet_with_status};
    use liftflow_core::{IpProtocol, ProtectionPolicy, RuntimeConfiguration, ServerProcess};

    use FleetStatus::*;

    fn spec() -> FleetResource {
        let mut fleet = FleetResource::new("game", "build-1", "c5.large");
        fleet.server_launch_path = Some("/local/game/server".to_string());
        fleet
    }

    fn manager(api: &FakeGameLift) -> FleetManager<'_> {
        FleetManager::new(api).with_poll(PollConfig::fixed(Duration::from_secs(10)))
    }

    fn permission(port: i32) -> IpPermission {
        IpPermission {
            from_port: port,
            to_port: port,
            ip_range: "0.0.0.0/0".to_string(),
            protocol: IpProtocol::Udp,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_succeeds_after_pending_statuses() {
        let fake = FakeGameLift::new();
        fake.push_statuses("fleet-1", &[New, Building, Activating, Active]);

        let attrs = manager(&fake).create(&spec()).await.unwrap();

        assert_eq!(attrs.status, Active);
        assert_eq!(fake.calls("CreateFleet"), 1);
        assert_eq!(fake.calls("DescribeFleetAttributes"), 4);
        assert_eq!(fake.calls("DescribeFleetEvents"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_stops_at_first_match() {
        let fake = FakeGameLift::new();
        fake.push_statuses("fleet-1", &[New, Active, Error]);

        manager(&fake).create(&spec()).await.unwrap();
        assert_eq!(fake.calls("DescribeFleetAttributes"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_mismatch_attaches_failure_events() {
        let fake = FakeGameLift::new();
        fake.push_statuses("fleet-1", &[New, Error]);
        fake.push_event_page(Ok(EventPage {
            events: vec![
                event("e-1", "FLEET_CREATED", "created"),
                event(
                    "e-2",
                    "FLEET_VALIDATION_LAUNCH_PATH_NOT_FOUND",
                    "launch path /local/game/server not found",
                ),
            ],
            next_token: None,
        }));

        let err = manager(&fake).create(&spec()).await.unwrap_err();

        assert_eq!(fake.calls("DescribeFleetAttributes"), 2);
        assert_eq!(fake.calls("DescribeFleetEvents"), 1);
        match &err {
            GameLiftError::ProvisioningFailed {
                fleet_id, events, ..
            } => {
                assert_eq!(fleet_id, "fleet-1");
                assert_eq!(events.len(), 1);
            }
            other => panic!("expected ProvisioningFailed, got {:?}", other),
        }
        let message = err.to_string();
        assert!(message.contains("ERROR"));
        assert!(message.contains("FLEET_VALIDATION_LAUNCH_PATH_NOT_FOUND"));
        assert!(message.contains("launch path /local/game/server not found"));
        assert!(!message.contains("FLEET_CREATED"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_mismatch_reads_every_event_page_once() {
        let fake = FakeGameLift::new();
        fake.push_statuses("fleet-1", &[Terminated]);
        for i in 0..3 {
            fake.push_event_page(Ok(EventPage {
                events: vec![event(&format!("e-{}", i), "SERVER_PROCESS_CRASHED", "crash")],
                next_token: (i < 2).then(|| format!("t{}", i)),
            }));
        }

        let err = manager(&fake).create(&spec()).await.unwrap_err();
        assert_eq!(fake.calls("DescribeFleetEvents"), 3);
        match err {
            GameLiftError::ProvisioningFailed { events, .. } => assert_eq!(events.len(), 3),
            other => panic!("expected ProvisioningFailed, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_mismatch_without_events_returns_status_error() {
        let fake = FakeGameLift::new();
        fake.push_statuses("fleet-1", &[Error]);

        let err = manager(&fake).create(&spec()).await.unwrap_err();
        assert_eq!(fake.calls("DescribeFleetEvents"), 1);
        assert!(err.is_unexpected_status());
    }

    #[tokio::test(start_paused = true)]
    async fn test_diagnostics_failure_keeps_original_error() {
        let fake = FakeGameLift::new();
        fake.push_statuses("fleet-1", &[New, Error]);
        fake.push_event_page(Err(GameLiftError::Api("AccessDenied".to_string())));

        let err = manager(&fake).create(&spec()).await.unwrap_err();

        assert_eq!(fake.calls("DescribeFleetEvents"), 1);
        assert!(err.is_unexpected_status());
        assert!(!err.to_string().contains("AccessDenied"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_times_out_without_diagnostics() {
        let fake = FakeGameLift::new();
        fake.settle_in(Activating);
        let mut fleet = spec();
        fleet.timeouts.create = Some(60);

        let started = tokio::time::Instant::now();
        let err = manager(&fake).create(&fleet).await.unwrap_err();

        assert!(matches!(
            err,
            GameLiftError::Cloud(CloudError::Timeout { .. })
        ));
        assert_eq!(started.elapsed(), Duration::from_secs(60));
        // polls at 0s, 10s, ... 50s; none at the deadline
        assert_eq!(fake.calls("DescribeFleetAttributes"), 6);
        assert_eq!(fake.calls("DescribeFleetEvents"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_during_create_is_pending() {
        let fake = FakeGameLift::new();
        fake.push_describe(Err(GameLiftError::NotFound("fleet-1".to_string())));
        fake.push_describe(Err(GameLiftError::NotFound("fleet-1".to_string())));
        fake.push_statuses("fleet-1", &[Active]);

        let attrs = manager(&fake).create(&spec()).await.unwrap();
        assert_eq!(attrs.fleet_id, "fleet-1");
        assert_eq!(fake.calls("DescribeFleetAttributes"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_with_wrong_record_count_is_fatal() {
        for records in [
            vec![],
            vec![
                fleet_with_status("fleet-1", Active),
                fleet_with_status("fleet-1", Active),
            ],
        ] {
            let found = records.len();
            let fake = FakeGameLift::new();
            fake.push_describe(Ok(records));

            let err = manager(&fake).create(&spec()).await.unwrap_err();

            assert_eq!(fake.calls("DescribeFleetAttributes"), 1);
            assert_eq!(fake.calls("DescribeFleetEvents"), 0);
            match err {
                GameLiftError::Cloud(CloudError::Inconsistent { found: n, .. }) => {
                    assert_eq!(n, found)
                }
                other => panic!("expected Inconsistent, got {:?}", other),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_error_is_propagated_unchanged() {
        let fake = FakeGameLift::new();
        fake.push_statuses("fleet-1", &[New]);
        fake.push_describe(Err(GameLiftError::Api("ThrottlingException".to_string())));

        let err = manager(&fake).create(&spec()).await.unwrap_err();

        assert!(matches!(&err, GameLiftError::Api(m) if m == "ThrottlingException"));
        assert_eq!(fake.calls("DescribeFleetAttributes"), 2);
        assert_eq!(fake.calls("DescribeFleetEvents"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_waits_until_gone() {
        let fake = FakeGameLift::new();
        fake.insert_fleet(fleet_with_status("fleet-7", Active));
        fake.push_statuses("fleet-7", &[Deleting, Deleting, Terminated]);

        manager(&fake)
            .delete("fleet-7", Duration::from_secs(900))
            .await
            .unwrap();

        assert_eq!(fake.calls("DeleteFleet"), 1);
        // three scripted statuses, then not found
        assert_eq!(fake.calls("DescribeFleetAttributes"), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_empty_result_means_gone() {
        let fake = FakeGameLift::new();
        fake.insert_fleet(fleet_with_status("fleet-7", Active));
        fake.push_describe(Ok(vec![]));

        manager(&fake)
            .delete("fleet-7", Duration::from_secs(900))
            .await
            .unwrap();
        assert_eq!(fake.calls("DescribeFleetAttributes"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_of_missing_fleet_succeeds() {
        let fake = FakeGameLift::new();

        manager(&fake)
            .delete("fleet-404", Duration::from_secs(900))
            .await
            .unwrap();
        assert_eq!(fake.calls("DescribeFleetAttributes"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_unexpected_status_fails() {
        let fake = FakeGameLift::new();
        fake.insert_fleet(fleet_with_status("fleet-7", Active));
        fake.push_statuses("fleet-7", &[Activating]);

        let err = manager(&fake)
            .delete("fleet-7", Duration::from_secs(900))
            .await
            .unwrap_err();
        assert!(err.is_unexpected_status());
        assert_eq!(fake.calls("DescribeFleetEvents"), 0);
    }

    #[tokio::test]
    async fn test_read() {
        let fake = FakeGameLift::new();
        fake.insert_fleet(fleet_with_status("fleet-1", Active));
        let manager = manager(&fake);

        assert!(manager.read("fleet-1").await.unwrap().is_some());
        assert!(manager.read("fleet-2").await.unwrap().is_none());

        fake.push_describe(Ok(vec![
            fleet_with_status("fleet-1", Active),
            fleet_with_status("fleet-1", Active),
        ]));
        assert!(manager.read("fleet-1").await.is_err());
    }

    #[tokio::test]
    async fn test_update_sends_only_changed_settings() {
        let fake = FakeGameLift::new();
        fake.insert_fleet(fleet_with_status("fleet-1", Active));

        let mut current = spec();
        current.ec2_inbound_permissions = vec![permission(7777), permission(7778)];
        let mut desired = current.clone();
        desired.description = Some("prod".to_string());
        desired.new_game_session_protection_policy = ProtectionPolicy::FullProtection;
        desired.ec2_inbound_permissions = vec![permission(7778), permission(7779)];

        manager(&fake)
            .update("fleet-1", &current, &desired)
            .await
            .unwrap();

        let updates = fake.attribute_updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].1.description.as_deref(), Some("prod"));
        assert_eq!(
            updates[0].1.new_game_session_protection_policy,
            Some(ProtectionPolicy::FullProtection)
        );
        assert!(updates[0].1.name.is_none());

        let ports = fake.port_updates();
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].1, vec![permission(7779)]);
        assert_eq!(ports[0].2, vec![permission(7777)]);

        assert!(fake.runtime_updates().is_empty());
    }

    #[tokio::test]
    async fn test_update_clears_removed_description() {
        let fake = FakeGameLift::new();
        let mut current = spec();
        current.description = Some("old".to_string());
        let desired = spec();

        let mut remote = fleet_with_status("fleet-1", Active);
        remote.description = current.description.clone();
        remote.server_launch_path = current.server_launch_path.clone();
        fake.insert_fleet(remote);

        let attrs = manager(&fake)
            .update("fleet-1", &current, &desired)
            .await
            .unwrap();

        let updates = fake.attribute_updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].1.description.as_deref(), Some(""));

        // the cleared description reads back as unset, so nothing is left to plan
        let observed = observed_spec(&attrs, &desired);
        assert_eq!(observed.description, None);
        assert!(FleetDiff::between(&observed, &desired).is_empty());
    }

    #[tokio::test]
    async fn test_update_resets_removed_limit_policy() {
        let fake = FakeGameLift::new();
        let mut current = spec();
        current.resource_creation_limit_policy = Some(ResourceCreationLimitPolicy {
            new_game_sessions_per_creator: Some(3),
            policy_period_in_minutes: Some(15),
        });
        let desired = spec();

        let mut remote = fleet_with_status("fleet-1", Active);
        remote.resource_creation_limit_policy = current.resource_creation_limit_policy.clone();
        remote.server_launch_path = current.server_launch_path.clone();
        fake.insert_fleet(remote);

        let attrs = manager(&fake)
            .update("fleet-1", &current, &desired)
            .await
            .unwrap();

        let updates = fake.attribute_updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(
            updates[0].1.resource_creation_limit_policy,
            Some(no_limit_policy())
        );
        assert_eq!(attrs.resource_creation_limit_policy, Some(no_limit_policy()));
        assert!(FleetDiff::between(&observed_spec(&attrs, &desired), &desired).is_empty());
    }

    #[tokio::test]
    async fn test_update_runtime_configuration_only() {
        let fake = FakeGameLift::new();
        fake.insert_fleet(fleet_with_status("fleet-1", Active));

        let current = spec();
        let mut desired = current.clone();
        desired.runtime_configuration = Some(RuntimeConfiguration {
            server_processes: vec![ServerProcess::new("/local/game/server")],
            ..Default::default()
        });

        manager(&fake)
            .update("fleet-1", &current, &desired)
            .await
            .unwrap();

        assert_eq!(fake.calls("UpdateFleetAttributes"), 0);
        assert_eq!(fake.calls("UpdateFleetPortSettings"), 0);
        assert_eq!(fake.runtime_updates().len(), 1);
    }

    #[test]
    fn test_diff_classifies_fields() {
        let current = spec();

        assert!(FleetDiff::between(&current, &current).is_empty());

        let mut desired = current.clone();
        desired.description = Some("new".to_string());
        desired.metric_groups = vec!["prod".to_string()];
        let diff = FleetDiff::between(&current, &desired);
        assert!(!diff.requires_replace());
        assert_eq!(diff.update, vec!["description", "metric_groups"]);

        desired.build_id = "build-2".to_string();
        let diff = FleetDiff::between(&current, &desired);
        assert!(diff.requires_replace());
        assert_eq!(diff.fields()[0], "build_id");
    }

    #[test]
    fn test_diff_ignores_permission_order() {
        let mut current = spec();
        current.ec2_inbound_permissions = vec![permission(1), permission(2)];
        let mut desired = current.clone();
        desired.ec2_inbound_permissions.reverse();
        assert!(FleetDiff::between(&current, &desired).is_empty());
    }

    #[test]
    fn test_diff_runtime_removal_replaces() {
        let mut current = spec();
        current.runtime_configuration = Some(RuntimeConfiguration::default());
        let desired = spec();
        let diff = FleetDiff::between(&current, &desired);
        assert_eq!(diff.replace, vec!["runtime_configuration"]);
        assert!(diff.update.is_empty());
    }

    #[test]
    fn test_observed_spec_picks_up_drift() {
        let applied = spec();
        let mut attrs = fleet_with_status("fleet-1", Active);
        attrs.name = Some("renamed-in-console".to_string());
        attrs.build_id = Some("build-1".to_string());
        attrs.server_launch_path = applied.server_launch_path.clone();

        let observed = observed_spec(&attrs, &applied);
        assert_eq!(observed.name, "renamed-in-console");
        assert_eq!(observed.build_id, "build-1");
        assert_eq!(observed.ec2_instance_type, "c5.large");
        assert_eq!(FleetDiff::between(&observed, &applied).update, vec!["name"]);
    }
}
