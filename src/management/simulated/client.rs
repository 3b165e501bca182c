//! Handle for talking to a running [`PlaneActor`](super::PlaneActor).

use super::message::{PlaneRequest, PlaneStats, Response};
use crate::error::ManagementApiError;
use crate::management::ResourceManager;
use crate::model::{Deployment, DeploymentDefinition, GenericResource, GenericResourceId};
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

/// Cloneable sender half of the simulated plane.
#[derive(Clone, Debug)]
pub struct PlaneClient {
    sender: mpsc::Sender<PlaneRequest>,
}

impl PlaneClient {
    pub fn new(sender: mpsc::Sender<PlaneRequest>) -> Self {
        Self { sender }
    }

    /// Sends a request built around a fresh reply channel and waits for the answer.
    async fn call<T>(
        &self,
        build: impl FnOnce(Response<T>) -> PlaneRequest,
    ) -> Result<T, ManagementApiError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| ManagementApiError::Unavailable("plane closed".into()))?;
        response
            .await
            .map_err(|_| ManagementApiError::Unavailable("plane dropped response".into()))?
    }

    pub async fn stats(&self) -> Result<PlaneStats, ManagementApiError> {
        self.call(|respond_to| PlaneRequest::Stats { respond_to }).await
    }
}

#[async_trait]
impl ResourceManager for PlaneClient {
    async fn resource_group_exists(&self, name: &str) -> Result<bool, ManagementApiError> {
        let name = name.to_string();
        self.call(|respond_to| PlaneRequest::ResourceGroupExists { name, respond_to })
            .await
    }

    async fn create_resource_group(
        &self,
        name: &str,
        location: &str,
    ) -> Result<(), ManagementApiError> {
        let (name, location) = (name.to_string(), location.to_string());
        self.call(|respond_to| PlaneRequest::CreateResourceGroup {
            name,
            location,
            respond_to,
        })
        .await
    }

    async fn delete_resource_group(&self, name: &str) -> Result<(), ManagementApiError> {
        let name = name.to_string();
        self.call(|respond_to| PlaneRequest::DeleteResourceGroup { name, respond_to })
            .await
    }

    async fn deployment_exists(
        &self,
        resource_group: &str,
        deployment: &str,
    ) -> Result<bool, ManagementApiError> {
        let (resource_group, deployment) = (resource_group.to_string(), deployment.to_string());
        self.call(|respond_to| PlaneRequest::DeploymentExists {
            resource_group,
            deployment,
            respond_to,
        })
        .await
    }

    async fn get_deployment(
        &self,
        resource_group: &str,
        deployment: &str,
    ) -> Result<Deployment, ManagementApiError> {
        let (resource_group, deployment) = (resource_group.to_string(), deployment.to_string());
        self.call(|respond_to| PlaneRequest::GetDeployment {
            resource_group,
            deployment,
            respond_to,
        })
        .await
    }

    async fn submit_deployment(
        &self,
        definition: DeploymentDefinition,
    ) -> Result<(), ManagementApiError> {
        self.call(|respond_to| PlaneRequest::SubmitDeployment {
            definition,
            respond_to,
        })
        .await
    }

    async fn generic_resource_exists(
        &self,
        id: &GenericResourceId,
    ) -> Result<bool, ManagementApiError> {
        let id = id.clone();
        self.call(|respond_to| PlaneRequest::GenericResourceExists { id, respond_to })
            .await
    }

    async fn get_generic_resource(
        &self,
        id: &GenericResourceId,
    ) -> Result<GenericResource, ManagementApiError> {
        let id = id.clone();
        self.call(|respond_to| PlaneRequest::GetGenericResource { id, respond_to })
            .await
    }
}
