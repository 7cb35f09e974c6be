//! LiftFlow Cloud Infrastructure
//!
//! This crate provides the provider abstraction LiftFlow uses to reconcile
//! declared game-server infrastructure with a remote control plane.
//!
//! # Supported Providers
//!
//! - **Amazon GameLift**: Fleets, Aliases (via the AWS SDK)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  LiftFlow CLI                    │
//! │            (liftflow plan/apply/destroy)         │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               liftflow-cloud                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │          Provider Abstraction             │   │
//! │  │  trait CloudProvider { ... }              │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │   Waiters    │  │  State Mgmt  │            │
//! │  └──────────────┘  └──────────────┘            │
//! └───────┬─────────────────────────────────────────┘
//!         │
//! ┌───────▼───────┐
//! │   gamelift    │
//! │   provider    │
//! └───────────────┘
//! ```

pub mod action;
pub mod error;
pub mod provider;
pub mod state;
pub mod waiter;

// Re-exports
pub use action::{Action, ActionResult, ActionType, ApplyResult, Plan, PlanSummary};
pub use error::{CloudError, Result};
pub use provider::{CloudProvider, ResourceConfig, ResourceSet};
pub use state::{
    GlobalState, ProviderState, ResourceState, ResourceStatus, StateLock, StateManager,
};
pub use waiter::{
    DEFAULT_TIMEOUT, Observation, PollConfig, PollState, Provisioned, StateChange, WaitTarget,
};
