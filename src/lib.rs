//! rddlgym - Simulation loop and trajectory recording for RDDL domains
//!
//! A compiled RDDL model is wrapped in an [`env::RddlEnv`] that validates
//! actions and advances the state one timestep at a time. A
//! [`runner::Runner`] drives a [`runner::Planner`] against the environment
//! and records every transition in a [`trajectory::Trajectory`].

pub mod config;
pub mod env;
pub mod error;
pub mod fluent;
pub mod logging;
pub mod model;
pub mod registry;
pub mod runner;
pub mod trajectory;

#[cfg(test)]
mod test_utils;

pub use config::{LogConfig, RunnerConfig};
pub use env::{RddlEnv, StepResult};
pub use error::{RddlError, Result};
pub use fluent::{DictSpace, FluentDescriptor, FluentKind, FluentMap};
pub use model::{CompiledModel, ModelCompiler};
pub use registry::DomainRegistry;
pub use runner::{Planner, Runner};
pub use trajectory::{Trajectory, Transition};

/// Identifier type used for runs and their trajectories.
pub type Id = String;

/// Generates a new unique identifier (UUID v4).
pub fn generate_id() -> Id {
    uuid::Uuid::new_v4().to_string()
}
