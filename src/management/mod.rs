//! # Cloud Resource Management Capability
//!
//! The orchestrator only talks to the cloud through [`ResourceManager`].
//! Credential acquisition and HTTP transport belong to whoever implements
//! it; the orchestration core never sees them.
//!
//! This module ships two implementations:
//!
//! - [`simulated`] - an in-process management plane running as a Tokio actor,
//!   used by integration tests and the demo binary.
//! - [`crate::mock::MockResourceManager`] - scripted expectations for unit tests.

pub mod simulated;

use crate::error::ManagementApiError;
use crate::model::{Deployment, DeploymentDefinition, GenericResource, GenericResourceId};
use async_trait::async_trait;

/// Resource-group, deployment and generic-resource operations.
///
/// Every method is a single request against the management API. None of
/// them retry; failures surface as [`ManagementApiError`].
#[async_trait]
pub trait ResourceManager: Send + Sync {
    async fn resource_group_exists(&self, name: &str) -> Result<bool, ManagementApiError>;

    async fn create_resource_group(
        &self,
        name: &str,
        location: &str,
    ) -> Result<(), ManagementApiError>;

    async fn delete_resource_group(&self, name: &str) -> Result<(), ManagementApiError>;

    async fn deployment_exists(
        &self,
        resource_group: &str,
        deployment: &str,
    ) -> Result<bool, ManagementApiError>;

    async fn get_deployment(
        &self,
        resource_group: &str,
        deployment: &str,
    ) -> Result<Deployment, ManagementApiError>;

    /// Begins a deployment and returns without waiting for it to finish.
    async fn submit_deployment(
        &self,
        definition: DeploymentDefinition,
    ) -> Result<(), ManagementApiError>;

    async fn generic_resource_exists(
        &self,
        id: &GenericResourceId,
    ) -> Result<bool, ManagementApiError>;

    async fn get_generic_resource(
        &self,
        id: &GenericResourceId,
    ) -> Result<GenericResource, ManagementApiError>;
}
