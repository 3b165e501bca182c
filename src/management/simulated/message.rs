//! Requests understood by the simulated plane.

use crate::error::ManagementApiError;
use crate::model::{Deployment, DeploymentDefinition, GenericResource, GenericResourceId};
use tokio::sync::oneshot;

/// One-shot reply channel carried by every request.
pub type Response<T> = oneshot::Sender<Result<T, ManagementApiError>>;

/// Counters exposed for assertions and the demo summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaneStats {
    pub resource_groups: usize,
    pub deployments: usize,
    pub resources: usize,
    pub submissions: usize,
    pub resource_group_creates: usize,
}

/// Every operation of the management capability, as a message.
#[derive(Debug)]
pub enum PlaneRequest {
    ResourceGroupExists {
        name: String,
        respond_to: Response<bool>,
    },
    CreateResourceGroup {
        name: String,
        location: String,
        respond_to: Response<()>,
    },
    DeleteResourceGroup {
        name: String,
        respond_to: Response<()>,
    },
    DeploymentExists {
        resource_group: String,
        deployment: String,
        respond_to: Response<bool>,
    },
    GetDeployment {
        resource_group: String,
        deployment: String,
        respond_to: Response<Deployment>,
    },
    SubmitDeployment {
        definition: DeploymentDefinition,
        respond_to: Response<()>,
    },
    GenericResourceExists {
        id: GenericResourceId,
        respond_to: Response<bool>,
    },
    GetGenericResource {
        id: GenericResourceId,
        respond_to: Response<GenericResource>,
    },
    Stats {
        respond_to: Response<PlaneStats>,
    },
}
