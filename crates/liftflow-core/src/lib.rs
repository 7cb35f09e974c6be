//! Project model and KDL parsing for LiftFlow
//!
//! A project file declares GameLift fleets and aliases:
//!
//! ```kdl
//! project "space-game"
//!
//! provider "aws" {
//!     region "us-west-2"
//! }
//!
//! fleet "game" {
//!     build-id "build-1111"
//!     ec2-instance-type "c5.large"
//!     runtime-configuration {
//!         server-process "/local/game/server"
//!     }
//! }
//!
//! alias "live" {
//!     routing-strategy "SIMPLE" {
//!         fleet "game"
//!     }
//! }
//! ```

pub mod error;
pub mod loader;
pub mod model;
pub mod parser;
pub mod validate;

pub use error::{ProjectError, Result};
pub use loader::load_project;
pub use model::*;
pub use parser::{parse_kdl_file, parse_kdl_string};
pub use validate::validate_project;
