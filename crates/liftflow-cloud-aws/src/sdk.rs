//! [`GameLiftApi`] on top of `aws-sdk-gamelift`

use crate::api::GameLiftApi;
use crate::error::{GameLiftError, Result};
use crate::model::{
    Alias, AliasInput, AliasRouting, EventCode, EventPage, FleetAttributes,
    FleetAttributesUpdate, FleetEvent, FleetStatus,
};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_gamelift::Client;
use aws_sdk_gamelift::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_gamelift::primitives::DateTime as SdkDateTime;
use aws_sdk_gamelift::types as sdk;
use chrono::{DateTime, Utc};
use liftflow_core::{
    FleetResource, IpPermission, ProviderConfig, ResourceCreationLimitPolicy,
    RuntimeConfiguration, ServerProcess,
};

/// GameLift client backed by the AWS SDK
pub struct SdkGameLift {
    client: Client,
}

impl SdkGameLift {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the default credential chain, overridden by the
    /// project's provider block
    pub async fn from_provider(config: &ProviderConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        tracing::debug!(
            region = ?sdk_config.region(),
            "Loaded AWS configuration for GameLift"
        );
        Self::new(Client::new(&sdk_config))
    }
}

fn api_error<E, R>(operation: &str, err: SdkError<E, R>) -> GameLiftError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    if err.code() == Some("NotFoundException") {
        let message = err.message().unwrap_or(operation).to_string();
        return GameLiftError::NotFound(message);
    }
    GameLiftError::Api(format!("{}: {}", operation, DisplayErrorContext(&err)))
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() { None } else { Some(items) }
}

fn to_chrono(time: &SdkDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(time.secs(), time.subsec_nanos())
}

fn ip_permission(permission: &IpPermission) -> sdk::IpPermission {
    sdk::IpPermission::builder()
        .from_port(permission.from_port)
        .to_port(permission.to_port)
        .ip_range(&permission.ip_range)
        .protocol(sdk::IpProtocol::from(permission.protocol.as_str()))
        .build()
}

fn ip_permissions(permissions: &[IpPermission]) -> Vec<sdk::IpPermission> {
    permissions.iter().map(ip_permission).collect()
}

fn server_process(process: &ServerProcess) -> sdk::ServerProcess {
    sdk::ServerProcess::builder()
        .launch_path(&process.launch_path)
        .set_parameters(process.parameters.clone())
        .concurrent_executions(process.concurrent_executions)
        .build()
}

fn runtime_configuration(runtime: &RuntimeConfiguration) -> sdk::RuntimeConfiguration {
    let processes = runtime
        .server_processes
        .iter()
        .map(server_process)
        .collect::<Vec<_>>();

    sdk::RuntimeConfiguration::builder()
        .set_server_processes(non_empty(processes))
        .set_game_session_activation_timeout_seconds(
            runtime.game_session_activation_timeout_seconds,
        )
        .set_max_concurrent_game_session_activations(
            runtime.max_concurrent_game_session_activations,
        )
        .build()
}

fn limit_policy(policy: &ResourceCreationLimitPolicy) -> sdk::ResourceCreationLimitPolicy {
    sdk::ResourceCreationLimitPolicy::builder()
        .set_new_game_sessions_per_creator(policy.new_game_sessions_per_creator)
        .set_policy_period_in_minutes(policy.policy_period_in_minutes)
        .build()
}

fn fleet_attributes(attrs: &sdk::FleetAttributes) -> Result<FleetAttributes> {
    let fleet_id = attrs
        .fleet_id()
        .ok_or_else(|| GameLiftError::Api("fleet attributes without a fleet ID".to_string()))?;

    let status = match attrs.status() {
        Some(status) => {
            let parsed = FleetStatus::from(status.as_str());
            if parsed == FleetStatus::Unknown {
                tracing::warn!("Fleet {} reports unknown status {}", fleet_id, status.as_str());
            }
            parsed
        }
        None => FleetStatus::Unknown,
    };

    let mut out = FleetAttributes::new(fleet_id, status);
    out.fleet_arn = attrs.fleet_arn().map(str::to_string);
    out.name = attrs.name().map(str::to_string);
    out.description = attrs.description().map(str::to_string);
    out.build_id = attrs.build_id().map(str::to_string);
    out.instance_type = attrs.instance_type().map(|t| t.as_str().to_string());
    out.operating_system = attrs.operating_system().map(|os| os.as_str().to_string());
    out.server_launch_path = attrs.server_launch_path().map(str::to_string);
    out.server_launch_parameters = attrs.server_launch_parameters().map(str::to_string);
    out.log_paths = attrs.log_paths().to_vec();
    out.metric_groups = attrs.metric_groups().to_vec();
    out.new_game_session_protection_policy = attrs
        .new_game_session_protection_policy()
        .and_then(|p| p.as_str().parse().ok());
    out.resource_creation_limit_policy =
        attrs
            .resource_creation_limit_policy()
            .map(|p| ResourceCreationLimitPolicy {
                new_game_sessions_per_creator: p.new_game_sessions_per_creator(),
                policy_period_in_minutes: p.policy_period_in_minutes(),
            });
    out.creation_time = attrs.creation_time().and_then(to_chrono);
    Ok(out)
}

fn fleet_event(event: &sdk::Event) -> FleetEvent {
    FleetEvent {
        event_id: event.event_id().unwrap_or_default().to_string(),
        resource_id: event.resource_id().unwrap_or_default().to_string(),
        event_code: event
            .event_code()
            .map(|code| EventCode::from(code.as_str()))
            .unwrap_or_else(|| EventCode::Other(String::new())),
        message: event.message().unwrap_or_default().to_string(),
        event_time: event
            .event_time()
            .and_then(to_chrono)
            .unwrap_or_default(),
    }
}

fn routing_strategy(routing: &AliasRouting) -> sdk::RoutingStrategy {
    sdk::RoutingStrategy::builder()
        .r#type(sdk::RoutingStrategyType::from(routing.kind.as_str()))
        .set_fleet_id(routing.fleet_id.clone())
        .set_message(routing.message.clone())
        .build()
}

fn alias(alias: &sdk::Alias) -> Result<Alias> {
    let alias_id = alias
        .alias_id()
        .ok_or_else(|| GameLiftError::Api("alias without an alias ID".to_string()))?;
    let strategy = alias
        .routing_strategy()
        .ok_or_else(|| GameLiftError::Api(format!("alias {} has no routing strategy", alias_id)))?;
    let kind = strategy
        .r#type()
        .map(|t| t.as_str())
        .unwrap_or("SIMPLE")
        .parse()
        .map_err(GameLiftError::Api)?;

    Ok(Alias {
        alias_id: alias_id.to_string(),
        alias_arn: alias.alias_arn().map(str::to_string),
        name: alias.name().unwrap_or_default().to_string(),
        description: alias.description().map(str::to_string),
        routing: AliasRouting {
            kind,
            fleet_id: strategy.fleet_id().map(str::to_string),
            message: strategy.message().map(str::to_string),
        },
    })
}

#[async_trait]
impl GameLiftApi for SdkGameLift {
    async fn create_fleet(&self, fleet: &FleetResource) -> Result<FleetAttributes> {
        let runtime = fleet
            .runtime_configuration
            .as_ref()
            .map(runtime_configuration);

        let output = self
            .client
            .create_fleet()
            .name(&fleet.name)
            .build_id(&fleet.build_id)
            .ec2_instance_type(sdk::Ec2InstanceType::from(fleet.ec2_instance_type.as_str()))
            .set_description(fleet.description.clone())
            .set_ec2_inbound_permissions(non_empty(ip_permissions(&fleet.ec2_inbound_permissions)))
            .set_log_paths(non_empty(fleet.log_paths.clone()))
            .set_metric_groups(non_empty(fleet.metric_groups.clone()))
            .new_game_session_protection_policy(sdk::ProtectionPolicy::from(
                fleet.new_game_session_protection_policy.as_str(),
            ))
            .set_peer_vpc_aws_account_id(fleet.peer_vpc_aws_account_id.clone())
            .set_peer_vpc_id(fleet.peer_vpc_id.clone())
            .set_resource_creation_limit_policy(
                fleet.resource_creation_limit_policy.as_ref().map(limit_policy),
            )
            .set_runtime_configuration(runtime)
            .set_server_launch_path(fleet.server_launch_path.clone())
            .set_server_launch_parameters(fleet.server_launch_parameters.clone())
            .send()
            .await
            .map_err(|e| api_error("CreateFleet", e))?;

        let attrs = output.fleet_attributes().ok_or_else(|| {
            GameLiftError::Api("CreateFleet returned no fleet attributes".to_string())
        })?;
        fleet_attributes(attrs)
    }

    async fn describe_fleet_attributes(&self, fleet_ids: &[String]) -> Result<Vec<FleetAttributes>> {
        let output = self
            .client
            .describe_fleet_attributes()
            .set_fleet_ids(Some(fleet_ids.to_vec()))
            .send()
            .await
            .map_err(|e| api_error("DescribeFleetAttributes", e))?;

        output
            .fleet_attributes()
            .iter()
            .map(fleet_attributes)
            .collect()
    }

    async fn update_fleet_attributes(
        &self,
        fleet_id: &str,
        update: &FleetAttributesUpdate,
    ) -> Result<()> {
        self.client
            .update_fleet_attributes()
            .fleet_id(fleet_id)
            .set_name(update.name.clone())
            .set_description(update.description.clone())
            .set_metric_groups(update.metric_groups.clone())
            .set_new_game_session_protection_policy(
                update
                    .new_game_session_protection_policy
                    .map(|p| sdk::ProtectionPolicy::from(p.as_str())),
            )
            .set_resource_creation_limit_policy(
                update.resource_creation_limit_policy.as_ref().map(limit_policy),
            )
            .send()
            .await
            .map_err(|e| api_error("UpdateFleetAttributes", e))?;
        Ok(())
    }

    async fn update_fleet_port_settings(
        &self,
        fleet_id: &str,
        authorize: &[IpPermission],
        revoke: &[IpPermission],
    ) -> Result<()> {
        self.client
            .update_fleet_port_settings()
            .fleet_id(fleet_id)
            .set_inbound_permission_authorizations(non_empty(ip_permissions(authorize)))
            .set_inbound_permission_revocations(non_empty(ip_permissions(revoke)))
            .send()
            .await
            .map_err(|e| api_error("UpdateFleetPortSettings", e))?;
        Ok(())
    }

    async fn update_runtime_configuration(
        &self,
        fleet_id: &str,
        runtime: &RuntimeConfiguration,
    ) -> Result<()> {
        self.client
            .update_runtime_configuration()
            .fleet_id(fleet_id)
            .runtime_configuration(runtime_configuration(runtime))
            .send()
            .await
            .map_err(|e| api_error("UpdateRuntimeConfiguration", e))?;
        Ok(())
    }

    async fn delete_fleet(&self, fleet_id: &str) -> Result<()> {
        self.client
            .delete_fleet()
            .fleet_id(fleet_id)
            .send()
            .await
            .map_err(|e| api_error("DeleteFleet", e))?;
        Ok(())
    }

    async fn describe_fleet_events(
        &self,
        fleet_id: &str,
        next_token: Option<&str>,
    ) -> Result<EventPage> {
        let output = self
            .client
            .describe_fleet_events()
            .fleet_id(fleet_id)
            .set_next_token(next_token.map(str::to_string))
            .send()
            .await
            .map_err(|e| api_error("DescribeFleetEvents", e))?;

        Ok(EventPage {
            events: output.events().iter().map(fleet_event).collect(),
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn create_alias(&self, input: &AliasInput) -> Result<Alias> {
        let output = self
            .client
            .create_alias()
            .name(&input.name)
            .set_description(input.description.clone())
            .routing_strategy(routing_strategy(&input.routing))
            .send()
            .await
            .map_err(|e| api_error("CreateAlias", e))?;

        let created = output
            .alias()
            .ok_or_else(|| GameLiftError::Api("CreateAlias returned no alias".to_string()))?;
        alias(created)
    }

    async fn describe_alias(&self, alias_id: &str) -> Result<Alias> {
        let output = self
            .client
            .describe_alias()
            .alias_id(alias_id)
            .send()
            .await
            .map_err(|e| api_error("DescribeAlias", e))?;

        let found = output
            .alias()
            .ok_or_else(|| GameLiftError::NotFound(format!("alias {}", alias_id)))?;
        alias(found)
    }

    async fn update_alias(&self, alias_id: &str, input: &AliasInput) -> Result<Alias> {
        let output = self
            .client
            .update_alias()
            .alias_id(alias_id)
            .name(&input.name)
            .set_description(input.description.clone())
            .routing_strategy(routing_strategy(&input.routing))
            .send()
            .await
            .map_err(|e| api_error("UpdateAlias", e))?;

        let updated = output
            .alias()
            .ok_or_else(|| GameLiftError::Api("UpdateAlias returned no alias".to_string()))?;
        alias(updated)
    }

    async fn delete_alias(&self, alias_id: &str) -> Result<()> {
        self.client
            .delete_alias()
            .alias_id(alias_id)
            .send()
            .await
            .map_err(|e| api_error("DeleteAlias", e))?;
        Ok(())
    }
}
