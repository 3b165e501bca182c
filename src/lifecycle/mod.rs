//! # System Lifecycle
//!
//! Wiring for running the orchestrator against the simulated management
//! plane: spawn the plane actor, hand its client to an [`Orchestrator`],
//! and shut both down cleanly.
//!
//! - [`DeploymentSystem`] - owns the plane task and the orchestrator.
//! - [`setup_tracing`] - initializes the global `tracing` subscriber.
//!
//! [`Orchestrator`]: crate::orchestrator::Orchestrator

pub mod deployment_system;
pub mod tracing;

pub use self::deployment_system::*;
pub use self::tracing::*;
