//! The GameLift control-plane calls LiftFlow makes
//!
//! Everything the provider sends to GameLift goes through [`GameLiftApi`].
//! [`crate::sdk::SdkGameLift`] is the real implementation; tests script
//! responses with an in-memory fake.

use crate::error::Result;
use crate::model::{Alias, AliasInput, EventPage, FleetAttributes, FleetAttributesUpdate};
use async_trait::async_trait;
use liftflow_core::{FleetResource, IpPermission, RuntimeConfiguration};

/// GameLift operations used by the provider
///
/// Implementations return [`crate::GameLiftError::NotFound`] when the
/// service reports `NotFoundException`, and must not retry on their own.
#[async_trait]
pub trait GameLiftApi: Send + Sync {
    /// `CreateFleet`; returns the attributes of the new fleet
    async fn create_fleet(&self, fleet: &FleetResource) -> Result<FleetAttributes>;

    /// `DescribeFleetAttributes` for the given IDs
    async fn describe_fleet_attributes(&self, fleet_ids: &[String]) -> Result<Vec<FleetAttributes>>;

    async fn update_fleet_attributes(
        &self,
        fleet_id: &str,
        update: &FleetAttributesUpdate,
    ) -> Result<()>;

    /// `UpdateFleetPortSettings`
    async fn update_fleet_port_settings(
        &self,
        fleet_id: &str,
        authorize: &[IpPermission],
        revoke: &[IpPermission],
    ) -> Result<()>;

    async fn update_runtime_configuration(
        &self,
        fleet_id: &str,
        runtime: &RuntimeConfiguration,
    ) -> Result<()>;

    async fn delete_fleet(&self, fleet_id: &str) -> Result<()>;

    /// One page of `DescribeFleetEvents`, starting at `next_token`
    async fn describe_fleet_events(
        &self,
        fleet_id: &str,
        next_token: Option<&str>,
    ) -> Result<EventPage>;

    async fn create_alias(&self, input: &AliasInput) -> Result<Alias>;

    async fn describe_alias(&self, alias_id: &str) -> Result<Alias>;

    async fn update_alias(&self, alias_id: &str, input: &AliasInput) -> Result<Alias>;

    async fn delete_alias(&self, alias_id: &str) -> Result<()>;
}
