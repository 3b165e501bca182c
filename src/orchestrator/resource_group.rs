use super::Orchestrator;
use crate::clock::Clock;
use crate::error::Result;
use crate::management::ResourceManager;
use tracing::{debug, info, instrument};

impl<M: ResourceManager, C: Clock> Orchestrator<M, C> {
    pub async fn resource_group_exists(&self, name: &str) -> Result<bool> {
        Ok(self.manager.resource_group_exists(name).await?)
    }

    /// Creates the resource group unless it already exists.
    ///
    /// Returns `true` if a create call was issued. A failed create is not
    /// retried.
    #[instrument(skip(self))]
    pub async fn ensure_resource_group(&self, name: &str, location: &str) -> Result<bool> {
        if self.resource_group_exists(name).await? {
            debug!("Resource group already exists");
            return Ok(false);
        }

        self.manager.create_resource_group(name, location).await?;
        info!("Resource group created");
        Ok(true)
    }

    /// Deletes the resource group if it exists.
    ///
    /// Returns `true` if a delete call was issued. A concurrent delete between
    /// the check and the call surfaces as the manager's error.
    #[instrument(skip(self))]
    pub async fn delete_resource_group(&self, name: &str) -> Result<bool> {
        if !self.resource_group_exists(name).await? {
            debug!("Resource group absent, nothing to delete");
            return Ok(false);
        }

        self.manager.delete_resource_group(name).await?;
        info!("Resource group deleted");
        Ok(true)
    }
}
