//! # Deployment Orchestration
//!
//! [`Orchestrator`] composes the three steps of getting a compute resource
//! provisioned:
//!
//! 1. **Resource group guard** ([`Orchestrator::ensure_resource_group`]) -
//!    create the group if it is missing.
//! 2. **Submission guard** ([`Orchestrator::start_deployment`]) - submit the
//!    template unless a deployment of the same name is still running.
//! 3. **Provisioning poller** ([`Orchestrator::wait_for_resource_provisioning`]) -
//!    wait for the resource to exist, then for its provisioning state to
//!    reach a terminal value.
//!
//! ## Races
//!
//! Every guard is a check followed by an act. The management API offers no
//! atomic create-if-absent, so two callers targeting the same names can both
//! pass the check. The orchestrator does not lock around this window; run
//! one orchestration per resource group/deployment name.
//!
//! ## Failures
//!
//! Nothing is rolled back. If submission fails after the group was created,
//! the group stays.

mod deployment;
mod poller;
mod resource_group;

use crate::clock::{Clock, TokioClock};
use crate::config::OrchestratorConfig;
use crate::management::ResourceManager;
use tokio::sync::watch;

/// Drives a deployment against a [`ResourceManager`].
pub struct Orchestrator<M, C = TokioClock> {
    manager: M,
    clock: C,
    config: OrchestratorConfig,
    cancel: Option<watch::Receiver<bool>>,
}

impl<M: ResourceManager> Orchestrator<M, TokioClock> {
    pub fn new(manager: M, config: OrchestratorConfig) -> Self {
        Self::with_clock(manager, TokioClock, config)
    }
}

impl<M: ResourceManager, C: Clock> Orchestrator<M, C> {
    pub fn with_clock(manager: M, clock: C, config: OrchestratorConfig) -> Self {
        Self {
            manager,
            clock,
            config,
            cancel: None,
        }
    }

    /// Polling stops with [`Cancelled`](crate::error::OrchestratorError::Cancelled)
    /// once `true` is sent on the paired sender.
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn manager(&self) -> &M {
        &self.manager
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }
}
