//! The actor half of the simulated plane.

use super::client::PlaneClient;
use super::message::{PlaneRequest, PlaneStats};
use crate::config::SimulationConfig;
use crate::error::ManagementApiError;
use crate::model::{
    Deployment, DeploymentDefinition, GenericResource, GenericResourceId, ResourceGroup,
};
use crate::provisioning::ProvisioningState;
use serde_json::json;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Identifies a resource regardless of the API version it is read with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ResourceKey {
    resource_group: String,
    provider_namespace: String,
    parent_path: String,
    resource_type: String,
    resource_name: String,
}

impl From<&GenericResourceId> for ResourceKey {
    fn from(id: &GenericResourceId) -> Self {
        Self {
            resource_group: id.resource_group.clone(),
            provider_namespace: id.provider_namespace.clone(),
            parent_path: id.parent_path.clone(),
            resource_type: id.resource_type.clone(),
            resource_name: id.resource_name.clone(),
        }
    }
}

#[derive(Debug)]
struct SimDeployment {
    step: usize,
}

#[derive(Debug)]
struct SimResource {
    deployment: String,
    hidden_checks: u32,
    step: usize,
}

/// Owns the simulated cloud state and serves [`PlaneRequest`]s one at a time.
pub struct PlaneActor {
    receiver: mpsc::Receiver<PlaneRequest>,
    config: SimulationConfig,
    groups: HashMap<String, ResourceGroup>,
    deployments: HashMap<(String, String), SimDeployment>,
    resources: HashMap<ResourceKey, SimResource>,
    submissions: usize,
    group_creates: usize,
}

impl PlaneActor {
    pub fn new(mut config: SimulationConfig) -> (Self, PlaneClient) {
        if config.state_script.is_empty() {
            config.state_script.push(ProvisioningState::Succeeded.to_string());
        }
        let (sender, receiver) = mpsc::channel(config.buffer_size.max(1));
        let actor = Self {
            receiver,
            config,
            groups: HashMap::new(),
            deployments: HashMap::new(),
            resources: HashMap::new(),
            submissions: 0,
            group_creates: 0,
        };
        (actor, PlaneClient::new(sender))
    }

    /// Runs until every [`PlaneClient`] has been dropped.
    pub async fn run(mut self) {
        info!("Management plane started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                PlaneRequest::ResourceGroupExists { name, respond_to } => {
                    let found = self.groups.contains_key(&name);
                    debug!(resource_group = %name, found, "ResourceGroupExists");
                    let _ = respond_to.send(Ok(found));
                }
                PlaneRequest::CreateResourceGroup {
                    name,
                    location,
                    respond_to,
                } => {
                    self.group_creates += 1;
                    info!(resource_group = %name, %location, "Resource group created");
                    self.groups
                        .insert(name.clone(), ResourceGroup::new(name, location));
                    let _ = respond_to.send(Ok(()));
                }
                PlaneRequest::DeleteResourceGroup { name, respond_to } => {
                    let _ = respond_to.send(self.delete_group(&name));
                }
                PlaneRequest::DeploymentExists {
                    resource_group,
                    deployment,
                    respond_to,
                } => {
                    let found = self
                        .deployments
                        .contains_key(&(resource_group.clone(), deployment.clone()));
                    debug!(%resource_group, %deployment, found, "DeploymentExists");
                    let _ = respond_to.send(Ok(found));
                }
                PlaneRequest::GetDeployment {
                    resource_group,
                    deployment,
                    respond_to,
                } => {
                    let _ = respond_to.send(self.get_deployment(resource_group, deployment));
                }
                PlaneRequest::SubmitDeployment {
                    definition,
                    respond_to,
                } => {
                    let result = self.submit(definition);
                    if let Err(e) = &result {
                        warn!(error = %e, "Submit rejected");
                    }
                    let _ = respond_to.send(result);
                }
                PlaneRequest::GenericResourceExists { id, respond_to } => {
                    let found = self.resource_exists(&id);
                    debug!(resource = %id, found, "GenericResourceExists");
                    let _ = respond_to.send(Ok(found));
                }
                PlaneRequest::GetGenericResource { id, respond_to } => {
                    let _ = respond_to.send(self.get_resource(id));
                }
                PlaneRequest::Stats { respond_to } => {
                    let _ = respond_to.send(Ok(self.stats()));
                }
            }
        }

        info!(
            resource_groups = self.groups.len(),
            deployments = self.deployments.len(),
            "Management plane shutdown"
        );
    }

    fn stats(&self) -> PlaneStats {
        PlaneStats {
            resource_groups: self.groups.len(),
            deployments: self.deployments.len(),
            resources: self.resources.len(),
            submissions: self.submissions,
            resource_group_creates: self.group_creates,
        }
    }

    /// Current script entry for `step`; the last entry repeats forever.
    fn state_at(&self, step: usize) -> &str {
        let last = self.config.state_script.len() - 1;
        &self.config.state_script[step.min(last)]
    }

    fn delete_group(&mut self, name: &str) -> Result<(), ManagementApiError> {
        if self.groups.remove(name).is_none() {
            return Err(ManagementApiError::NotFound(format!("resource group {name}")));
        }
        self.deployments.retain(|(rg, _), _| rg != name);
        self.resources.retain(|key, _| key.resource_group != name);
        info!(resource_group = %name, "Resource group deleted");
        Ok(())
    }

    fn get_deployment(
        &mut self,
        resource_group: String,
        name: String,
    ) -> Result<Deployment, ManagementApiError> {
        let step = match self.deployments.get_mut(&(resource_group.clone(), name.clone())) {
            Some(deployment) => {
                let step = deployment.step;
                deployment.step += 1;
                step
            }
            None => {
                return Err(ManagementApiError::NotFound(format!(
                    "deployment {resource_group}/{name}"
                )))
            }
        };
        let state = ProvisioningState::parse(self.state_at(step));
        debug!(%resource_group, deployment = %name, %state, "GetDeployment");
        Ok(Deployment {
            resource_group,
            name,
            provisioning_state: state,
        })
    }

    fn submit(&mut self, definition: DeploymentDefinition) -> Result<(), ManagementApiError> {
        if !self.groups.contains_key(&definition.resource_group) {
            return Err(ManagementApiError::NotFound(format!(
                "resource group {}",
                definition.resource_group
            )));
        }
        let template: serde_json::Value = serde_json::from_str(&definition.template)
            .map_err(|e| ManagementApiError::InvalidRequest(format!("template: {e}")))?;

        self.submissions += 1;
        self.deployments.insert(
            (definition.resource_group.clone(), definition.name.clone()),
            SimDeployment { step: 0 },
        );

        let declared = template
            .get("resources")
            .and_then(|r| r.as_array())
            .map(Vec::as_slice)
            .unwrap_or_default();
        let hidden_checks = self.config.resource_visibility_delay;
        for resource in declared {
            let (Some(full_type), Some(name)) = (
                resource.get("type").and_then(|t| t.as_str()),
                resource.get("name").and_then(|n| n.as_str()),
            ) else {
                continue;
            };
            let Some((namespace, resource_type)) = full_type.split_once('/') else {
                continue;
            };
            let key = ResourceKey {
                resource_group: definition.resource_group.clone(),
                provider_namespace: namespace.to_string(),
                parent_path: String::new(),
                resource_type: resource_type.to_string(),
                resource_name: name.to_string(),
            };
            // Incremental mode: resources that already exist are left alone.
            self.resources.entry(key).or_insert_with(|| SimResource {
                deployment: definition.name.clone(),
                hidden_checks,
                step: 0,
            });
        }

        info!(
            resource_group = %definition.resource_group,
            deployment = %definition.name,
            mode = ?definition.mode,
            "Deployment accepted"
        );
        Ok(())
    }

    fn resource_exists(&mut self, id: &GenericResourceId) -> bool {
        match self.resources.get_mut(&ResourceKey::from(id)) {
            Some(resource) if resource.hidden_checks > 0 => {
                resource.hidden_checks -= 1;
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    fn get_resource(&mut self, id: GenericResourceId) -> Result<GenericResource, ManagementApiError> {
        let (step, deployment) = match self.resources.get_mut(&ResourceKey::from(&id)) {
            Some(resource) if resource.hidden_checks == 0 => {
                let step = resource.step;
                resource.step += 1;
                (step, resource.deployment.clone())
            }
            _ => return Err(ManagementApiError::NotFound(format!("resource {id}"))),
        };
        let state = self.state_at(step).to_string();
        debug!(resource = %id, %state, "GetGenericResource");
        Ok(GenericResource {
            id,
            properties: json!({
                "provisioningState": state,
                "deployment": deployment,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::management::ResourceManager;
    use crate::model::DeploymentMode;

    fn vm_id(rg: &str, name: &str) -> GenericResourceId {
        GenericResourceId {
            resource_group: rg.into(),
            provider_namespace: "Microsoft.Compute".into(),
            parent_path: String::new(),
            resource_type: "virtualMachines".into(),
            resource_name: name.into(),
            api_version: "2016-04-30-preview".into(),
        }
    }

    fn definition(rg: &str, name: &str) -> DeploymentDefinition {
        DeploymentDefinition {
            resource_group: rg.into(),
            name: name.into(),
            location: "West US".into(),
            template: json!({
                "resources": [
                    { "type": "Microsoft.Compute/virtualMachines", "name": "vm1" },
                    { "type": "Microsoft.Network/publicIPAddresses", "name": "ip1" },
                    { "name": "untyped" }
                ]
            })
            .to_string(),
            parameters: json!({}),
            mode: DeploymentMode::Incremental,
        }
    }

    #[tokio::test]
    async fn deployment_walks_the_state_script() {
        let config = SimulationConfig::default().with_state_script(["Accepted", "Succeeded"]);
        let (actor, client) = PlaneActor::new(config);
        let handle = tokio::spawn(actor.run());

        client.create_resource_group("rg1", "West US").await.unwrap();
        client.submit_deployment(definition("rg1", "d1")).await.unwrap();

        let states: Vec<String> = {
            let mut out = Vec::new();
            for _ in 0..3 {
                let d = client.get_deployment("rg1", "d1").await.unwrap();
                out.push(d.provisioning_state.to_string());
            }
            out
        };
        assert_eq!(states, vec!["Accepted", "Succeeded", "Succeeded"]);

        drop(client);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn declared_compute_resources_appear_after_delay() {
        let config = SimulationConfig::default().with_resource_visibility_delay(2);
        let (actor, client) = PlaneActor::new(config);
        let handle = tokio::spawn(actor.run());

        client.create_resource_group("rg1", "West US").await.unwrap();
        client.submit_deployment(definition("rg1", "d1")).await.unwrap();

        let id = vm_id("rg1", "vm1");
        assert!(!client.generic_resource_exists(&id).await.unwrap());
        assert!(matches!(
            client.get_generic_resource(&id).await,
            Err(ManagementApiError::NotFound(_))
        ));
        assert!(!client.generic_resource_exists(&id).await.unwrap());
        assert!(client.generic_resource_exists(&id).await.unwrap());

        let resource = client.get_generic_resource(&id).await.unwrap();
        assert_eq!(resource.provisioning_state(), Some("Accepted"));

        let stats = client.stats().await.unwrap();
        assert_eq!(stats.resources, 2);
        assert_eq!(stats.submissions, 1);

        drop(client);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn submit_requires_resource_group() {
        let (actor, client) = PlaneActor::new(SimulationConfig::default());
        let handle = tokio::spawn(actor.run());

        let err = client.submit_deployment(definition("nope", "d1")).await.unwrap_err();
        assert!(matches!(err, ManagementApiError::NotFound(_)));

        drop(client);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn deleting_a_group_removes_its_contents() {
        let (actor, client) = PlaneActor::new(SimulationConfig::default());
        let handle = tokio::spawn(actor.run());

        client.create_resource_group("rg1", "West US").await.unwrap();
        client.submit_deployment(definition("rg1", "d1")).await.unwrap();
        client.delete_resource_group("rg1").await.unwrap();

        assert!(!client.resource_group_exists("rg1").await.unwrap());
        assert!(!client.deployment_exists("rg1", "d1").await.unwrap());
        assert_eq!(client.stats().await.unwrap().resources, 0);
        assert!(matches!(
            client.delete_resource_group("rg1").await,
            Err(ManagementApiError::NotFound(_))
        ));

        drop(client);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn closed_plane_is_unavailable() {
        let (actor, client) = PlaneActor::new(SimulationConfig::default());
        drop(actor);

        let err = client.resource_group_exists("rg1").await.unwrap_err();
        assert!(matches!(err, ManagementApiError::Unavailable(_)));
    }
}
