//! Amazon GameLift provider for LiftFlow
//!
//! Manages GameLift fleets and aliases declared in a LiftFlow project.
//! Fleet creation and deletion are asynchronous on the service side, so the
//! provider waits for every fleet to settle and, when provisioning fails,
//! reports the failure events GameLift recorded for the fleet.
//!
//! # Example
//!
//! ```ignore
//! use liftflow_cloud::{CloudProvider, ProviderState};
//! use liftflow_cloud_aws::GameLiftProvider;
//!
//! let project = liftflow_core::load_project("liftflow.kdl")?;
//! let provider = GameLiftProvider::from_config(&project.provider("aws")).await;
//!
//! let desired = project.resource_set()?;
//! let mut state = ProviderState::new();
//! let plan = provider.plan(&desired, &state).await?;
//! let result = provider.apply(&plan, &desired, &mut state).await?;
//! ```

pub mod alias;
pub mod api;
pub mod diagnostics;
pub mod error;
pub mod fleet;
pub mod model;
pub mod provider;
pub mod sdk;

#[cfg(test)]
mod testing;

pub use api::GameLiftApi;
pub use diagnostics::fleet_failures;
pub use error::{GameLiftError, Result};
pub use fleet::{FleetDiff, FleetManager};
pub use model::{EventCode, FleetAttributes, FleetEvent, FleetStatus};
pub use provider::GameLiftProvider;
pub use sdk::SdkGameLift;
