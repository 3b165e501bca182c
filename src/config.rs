//! # Configuration
//!
//! [`OrchestratorConfig`] carries the polling cadence, the optional deadline
//! and the generic-resource addressing constants. Defaults reproduce the
//! historic behaviour: 5 s between existence checks, 5000 ms between state
//! fetches, `Microsoft.Compute` at API version `2016-04-30-preview`, and no
//! deadline at all.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_PROVIDER_NAMESPACE: &str = "Microsoft.Compute";
pub const DEFAULT_API_VERSION: &str = "2016-04-30-preview";
pub const DEFAULT_EXISTENCE_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_PROVISIONING_POLL_DELAY: Duration = Duration::from_millis(5000);

/// Settings for the orchestrator and its poller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Sleep between generic-resource existence checks.
    pub existence_poll_interval: Duration,
    /// Sleep between provisioning-state fetches.
    pub provisioning_poll_delay: Duration,
    /// Upper bound on the whole wait (both phases). `None` waits forever.
    pub max_wait: Option<Duration>,
    /// Upper bound on poll attempts per phase. `None` means no cap.
    pub max_attempts: Option<u32>,
    pub provider_namespace: String,
    pub api_version: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            existence_poll_interval: DEFAULT_EXISTENCE_POLL_INTERVAL,
            provisioning_poll_delay: DEFAULT_PROVISIONING_POLL_DELAY,
            max_wait: None,
            max_attempts: None,
            provider_namespace: DEFAULT_PROVIDER_NAMESPACE.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

impl OrchestratorConfig {
    pub fn with_existence_poll_interval(mut self, interval: Duration) -> Self {
        self.existence_poll_interval = interval;
        self
    }

    pub fn with_provisioning_poll_delay(mut self, delay: Duration) -> Self {
        self.provisioning_poll_delay = delay;
        self
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_provider_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.provider_namespace = namespace.into();
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }
}

/// Behaviour of the in-process simulated management plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// States a deployment or resource walks through, one step per read.
    pub state_script: Vec<String>,
    /// Existence checks that report `false` before a deployed resource appears.
    pub resource_visibility_delay: u32,
    /// Request channel capacity.
    pub buffer_size: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            state_script: ["Accepted", "Creating", "Running", "Succeeded"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            resource_visibility_delay: 2,
            buffer_size: 32,
        }
    }
}

impl SimulationConfig {
    pub fn with_state_script<I, S>(mut self, script: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state_script = script.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_resource_visibility_delay(mut self, checks: u32) -> Self {
        self.resource_visibility_delay = checks;
        self
    }
}
