use crate::clock::{Clock, TokioClock};
use crate::config::{OrchestratorConfig, SimulationConfig};
use crate::management::simulated::{PlaneActor, PlaneClient};
use crate::orchestrator::Orchestrator;
use tracing::{error, info};

/// An orchestrator bound to a running simulated management plane.
///
/// # Example
///
/// ```ignore
/// let system = DeploymentSystem::new(SimulationConfig::default(), OrchestratorConfig::default());
///
/// let request = DeploymentRequest::new("rg1", "West US", "d1", "azuredeploy.json");
/// system.orchestrator.start_deployment(&request).await?;
/// let ok = system
///     .orchestrator
///     .wait_for_resource_provisioning("rg1", "vm1", "virtualMachines")
///     .await?;
///
/// system.shutdown().await?;
/// ```
pub struct DeploymentSystem<C = TokioClock> {
    pub orchestrator: Orchestrator<PlaneClient, C>,

    /// Direct handle on the plane, for inspection.
    pub plane: PlaneClient,

    handle: tokio::task::JoinHandle<()>,
}

impl DeploymentSystem<TokioClock> {
    /// Spawns the plane actor and wires an orchestrator using real time.
    pub fn new(simulation: SimulationConfig, config: OrchestratorConfig) -> Self {
        Self::with_clock(simulation, TokioClock, config)
    }
}

impl<C: Clock> DeploymentSystem<C> {
    pub fn with_clock(simulation: SimulationConfig, clock: C, config: OrchestratorConfig) -> Self {
        let (actor, plane) = PlaneActor::new(simulation);
        let handle = tokio::spawn(actor.run());
        let orchestrator = Orchestrator::with_clock(plane.clone(), clock, config);

        Self {
            orchestrator,
            plane,
            handle,
        }
    }

    /// Drops every plane client and waits for the actor to drain.
    ///
    /// Clones of [`DeploymentSystem::plane`] held elsewhere keep the actor
    /// alive; drop them first.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down deployment system...");

        drop(self.orchestrator);
        drop(self.plane);

        if let Err(e) = self.handle.await {
            error!("Management plane task failed: {:?}", e);
            return Err(format!("Management plane task failed: {:?}", e));
        }

        info!("Deployment system shutdown complete.");
        Ok(())
    }
}
