//! Deployment DTOs.

use crate::provisioning::ProvisioningState;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How the management API reconciles a template against existing resources.
///
/// Only `Incremental` is ever submitted: resources missing from the
/// template are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentMode {
    #[default]
    Incremental,
}

/// A deployment as read back from the management API.
#[derive(Debug, Clone, PartialEq)]
pub struct Deployment {
    pub resource_group: String,
    pub name: String,
    pub provisioning_state: ProvisioningState,
}

/// Everything needed to submit a deployment.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentDefinition {
    pub resource_group: String,
    pub name: String,
    pub location: String,
    /// Serialized template document.
    pub template: String,
    pub parameters: serde_json::Value,
    pub mode: DeploymentMode,
}

/// Input to [`Orchestrator::start_deployment`](crate::orchestrator::Orchestrator::start_deployment).
#[derive(Debug, Clone)]
pub struct DeploymentRequest {
    pub resource_group: String,
    pub location: String,
    pub deployment_name: String,
    pub template_path: PathBuf,
    pub parameters: serde_json::Value,
}

impl DeploymentRequest {
    /// A request with an empty parameter object.
    pub fn new(
        resource_group: impl Into<String>,
        location: impl Into<String>,
        deployment_name: impl Into<String>,
        template_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            resource_group: resource_group.into(),
            location: location.into(),
            deployment_name: deployment_name.into(),
            template_path: template_path.into(),
            parameters: serde_json::Value::Object(Default::default()),
        }
    }

    pub fn with_parameters(mut self, parameters: serde_json::Value) -> Self {
        self.parameters = parameters;
        self
    }
}
