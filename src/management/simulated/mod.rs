//! # Simulated Management Plane
//!
//! An in-process stand-in for the cloud management API, built as an actor:
//!
//! - [`PlaneActor`] owns every resource group, deployment and resource and
//!   processes requests sequentially, so its state needs no locks.
//! - [`PlaneClient`] is the cheap-to-clone handle that implements
//!   [`ResourceManager`](crate::management::ResourceManager) by sending
//!   [`PlaneRequest`]s and awaiting the `oneshot` reply.
//!
//! Submitted deployments and the compute resources declared in their
//! templates advance one step along
//! [`SimulationConfig::state_script`](crate::config::SimulationConfig) each
//! time they are read, which is enough to drive the orchestrator's pollers
//! end to end.
//!
//! ```rust,ignore
//! let (actor, client) = PlaneActor::new(SimulationConfig::default());
//! let handle = tokio::spawn(actor.run());
//! let orchestrator = Orchestrator::new(client.clone(), OrchestratorConfig::default());
//! // ...
//! drop(orchestrator);
//! drop(client);
//! handle.await?;
//! ```

pub mod actor;
pub mod client;
pub mod message;

pub use actor::PlaneActor;
pub use client::PlaneClient;
pub use message::{PlaneRequest, PlaneStats, Response};
