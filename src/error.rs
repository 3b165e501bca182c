//! # Orchestrator Errors
//!
//! Two layers of errors live here:
//!
//! - [`ManagementApiError`] - anything the management capability reports
//!   (auth, network, throttling, conflicts). The orchestrator never catches
//!   these; they reach the caller unmodified.
//! - [`OrchestratorError`] - everything the orchestration core itself can
//!   fail with, wrapping [`ManagementApiError`] transparently.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors reported by a [`ResourceManager`](crate::management::ResourceManager).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ManagementApiError {
    /// The addressed resource does not exist.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The request itself was rejected (malformed template, missing field).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The request conflicts with the current state of the resource.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The caller was throttled by the management API.
    #[error("Request throttled: {0}")]
    Throttled(String),

    /// Credentials were rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The request failed on the wire.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The management endpoint is not reachable (e.g. the plane shut down).
    #[error("Management API unavailable: {0}")]
    Unavailable(String),
}

/// Which polling loop an error was raised from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    /// Waiting for the resource to exist.
    Existence,
    /// Waiting for the provisioning state to reach a terminal value.
    Provisioning,
}

impl std::fmt::Display for PollPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollPhase::Existence => write!(f, "existence"),
            PollPhase::Provisioning => write!(f, "provisioning"),
        }
    }
}

/// Errors that can occur while orchestrating a deployment.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The template file could not be read.
    #[error("Failed to read template {}: {source}", path.display())]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The template file is not a valid JSON document.
    #[error("Failed to parse template {}: {source}", path.display())]
    TemplateParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The management capability failed.
    #[error(transparent)]
    ManagementApi(#[from] ManagementApiError),

    /// A resource was fetched but carried no string `provisioningState`.
    #[error("Resource {resource} has no provisioningState property")]
    MissingProvisioningState { resource: String },

    /// A polling loop ran past its configured deadline or attempt cap.
    #[error("Gave up waiting in {phase} phase after {attempts} attempts ({elapsed:?})")]
    DeadlineExceeded {
        phase: PollPhase,
        elapsed: Duration,
        attempts: u32,
    },

    /// The caller cancelled the orchestration.
    #[error("Cancelled during {phase} phase")]
    Cancelled { phase: PollPhase },
}

pub type Result<T, E = OrchestratorError> = std::result::Result<T, E>;
