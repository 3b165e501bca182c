//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter driven
//! by `RUST_LOG`.
//!
//! ```bash
//! # Guard decisions and terminal states
//! RUST_LOG=info arm-orchestrator --template azuredeploy.json
//!
//! # Every poll, request payloads, plane traffic
//! RUST_LOG=debug arm-orchestrator --template azuredeploy.json
//!
//! # Only the orchestrator
//! RUST_LOG=arm_orchestrator::orchestrator=debug arm-orchestrator --template azuredeploy.json
//! ```
//!
//! Orchestrator operations run inside spans carrying their arguments, so a
//! poll line reads like:
//!
//! ```text
//! INFO start_deployment{resource_group=rg1 deployment=d1}: Deployment submitted
//! DEBUG wait_for_resource_provisioning{resource_group="rg1" resource_name="vm1" resource_type="virtualMachines"}: Still provisioning attempts=2 state=Creating
//! INFO wait_for_resource_provisioning{...}: Provisioning finished state=Succeeded
//! ```
//!
//! Requests start with a `debug!(?request, ...)` line holding the full
//! payload; later lines carry only identifiers and states.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
