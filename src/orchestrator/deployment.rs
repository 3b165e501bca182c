use super::Orchestrator;
use crate::clock::Clock;
use crate::error::Result;
use crate::management::ResourceManager;
use crate::model::{DeploymentDefinition, DeploymentMode, DeploymentRequest};
use crate::provisioning::StateClass;
use crate::template::load_template;
use tracing::{debug, info, instrument, warn};

impl<M: ResourceManager, C: Clock> Orchestrator<M, C> {
    /// Submits the deployment unless one with the same name is still running.
    ///
    /// Steps, in order:
    /// 1. load the template (fails fast before touching the API),
    /// 2. ensure the resource group exists,
    /// 3. if a deployment named `deployment_name` exists and is in a running
    ///    state, return `false`,
    /// 4. otherwise begin an incremental deployment and return `true`
    ///    without waiting for it.
    #[instrument(
        skip(self, request),
        fields(
            resource_group = %request.resource_group,
            deployment = %request.deployment_name,
        )
    )]
    pub async fn start_deployment(&self, request: &DeploymentRequest) -> Result<bool> {
        debug!(?request, "start_deployment called");
        let template = load_template(&request.template_path).await?;

        self.ensure_resource_group(&request.resource_group, &request.location)
            .await?;

        if self
            .manager
            .deployment_exists(&request.resource_group, &request.deployment_name)
            .await?
        {
            let existing = self
                .manager
                .get_deployment(&request.resource_group, &request.deployment_name)
                .await?;
            let state = &existing.provisioning_state;
            match state.class() {
                StateClass::Running => {
                    info!(%state, "Deployment still running, not resubmitting");
                    return Ok(false);
                }
                StateClass::Unknown => {
                    warn!(%state, "Existing deployment in unrecognized state, resubmitting");
                }
                StateClass::Ended | StateClass::Succeeded => {
                    debug!(%state, "Existing deployment finished, resubmitting");
                }
            }
        }

        let definition = DeploymentDefinition {
            resource_group: request.resource_group.clone(),
            name: request.deployment_name.clone(),
            location: request.location.clone(),
            template,
            parameters: request.parameters.clone(),
            mode: DeploymentMode::Incremental,
        };
        self.manager.submit_deployment(definition).await?;
        info!("Deployment submitted");
        Ok(true)
    }
}
