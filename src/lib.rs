//! # ARM Orchestrator
//!
//! > **Create a resource group, deploy a template, wait for the VM.**
//!
//! This crate drives a template deployment against a cloud management API
//! and waits until a target compute resource reaches a terminal
//! provisioning state. It owns the control flow only; credentials and
//! transport live behind the [`ResourceManager`](management::ResourceManager)
//! trait.
//!
//! ## Control Flow
//!
//! ```text
//! caller
//!   └─ ensure_resource_group      create-if-absent
//!   └─ start_deployment           submit-if-not-running
//!   └─ wait_for_resource_provisioning
//!        ├─ phase A: existence poll   (every 5 s)
//!        └─ phase B: state poll       (every 5000 ms) -> Succeeded?
//! ```
//!
//! ## Module Tour
//!
//! ### 1. The Core ([`orchestrator`], [`provisioning`])
//! - [`Orchestrator`](orchestrator::Orchestrator) holds the resource-group
//!   guard, the submission guard and the two-phase poller.
//! - [`ProvisioningState`](provisioning::ProvisioningState) and
//!   [`classify`](provisioning::classify) bucket raw state strings into
//!   running / ended / succeeded / unknown.
//!
//! ### 2. The Capability ([`management`])
//! - [`ResourceManager`](management::ResourceManager) is the async trait the
//!   core talks to.
//! - [`management::simulated`] is an in-process plane, built as a Tokio
//!   actor, that walks deployments through a scripted state sequence.
//!
//! ### 3. Support ([`clock`], [`config`], [`template`], [`error`])
//! - The poller sleeps through an injected [`Clock`](clock::Clock), so tests
//!   run on virtual time with [`ManualClock`](clock::ManualClock).
//! - [`OrchestratorConfig`](config::OrchestratorConfig) sets the cadence, an
//!   optional deadline and attempt cap, and resource addressing.
//!
//! ### 4. Wiring ([`lifecycle`])
//! - [`DeploymentSystem`](lifecycle::DeploymentSystem) spawns the simulated
//!   plane and shuts it down.
//! - [`setup_tracing`](lifecycle::setup_tracing) configures logging.
//!
//! ## Testing
//!
//! Unit tests script the management API with
//! [`MockResourceManager`](mock::MockResourceManager); integration tests in
//! `tests/` run the full flow against the simulated plane.
//!
//! ```bash
//! cargo test
//! RUST_LOG=debug cargo run -- --template azuredeploy.json
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod management;
pub mod mock;
pub mod model;
pub mod orchestrator;
pub mod provisioning;
pub mod template;
