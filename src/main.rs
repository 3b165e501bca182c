//! # ARM Orchestrator Demo
//!
//! Runs the full orchestration against the in-process simulated plane:
//!
//! 1. Start a [`DeploymentSystem`].
//! 2. Submit the template with [`start_deployment`](arm_orchestrator::orchestrator::Orchestrator::start_deployment).
//! 3. Wait for the compute resource with
//!    [`wait_for_resource_provisioning`](arm_orchestrator::orchestrator::Orchestrator::wait_for_resource_provisioning).
//!
//! Ctrl-C cancels the wait.

use arm_orchestrator::config::{OrchestratorConfig, SimulationConfig};
use arm_orchestrator::lifecycle::{setup_tracing, DeploymentSystem};
use arm_orchestrator::model::DeploymentRequest;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn, Instrument};

#[derive(Parser, Debug)]
#[command(name = "arm-orchestrator")]
#[command(about = "Deploy a template and wait for a compute resource to provision")]
#[command(version)]
struct Cli {
    /// Deployment template (JSON)
    #[arg(long)]
    template: PathBuf,

    #[arg(long, default_value = "temp1234")]
    resource_group: String,

    #[arg(long, default_value = "West US")]
    location: String,

    #[arg(long, default_value = "tempDeploy")]
    deployment: String,

    #[arg(long, default_value = "SimpleWinVM")]
    resource_name: String,

    #[arg(long, default_value = "virtualMachines")]
    resource_type: String,

    /// Seconds between existence checks
    #[arg(long, env = "ARM_POLL_INTERVAL_SECS", default_value_t = 5)]
    poll_interval_secs: u64,

    /// Milliseconds between provisioning-state fetches
    #[arg(long, env = "ARM_PROVISIONING_DELAY_MS", default_value_t = 5000)]
    provisioning_delay_ms: u64,

    /// Give up after this many seconds (waits forever if unset)
    #[arg(long, env = "ARM_MAX_WAIT_SECS")]
    max_wait_secs: Option<u64>,

    /// Give up after this many polls per phase
    #[arg(long, env = "ARM_MAX_ATTEMPTS")]
    max_attempts: Option<u32>,

    /// Comma-separated states the simulated plane walks through
    #[arg(long, value_delimiter = ',', default_value = "Accepted,Creating,Running,Succeeded")]
    simulate_states: Vec<String>,
}

impl Cli {
    fn orchestrator_config(&self) -> OrchestratorConfig {
        let mut config = OrchestratorConfig::default()
            .with_existence_poll_interval(Duration::from_secs(self.poll_interval_secs))
            .with_provisioning_poll_delay(Duration::from_millis(self.provisioning_delay_ms));
        if let Some(secs) = self.max_wait_secs {
            config = config.with_max_wait(Duration::from_secs(secs));
        }
        if let Some(attempts) = self.max_attempts {
            config = config.with_max_attempts(attempts);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();
    let cli = Cli::parse();

    let simulation = SimulationConfig::default().with_state_script(cli.simulate_states.clone());
    let mut system = DeploymentSystem::new(simulation, cli.orchestrator_config());

    let (cancel_tx, cancel_rx) = watch::channel(false);
    system.orchestrator = system.orchestrator.with_cancellation(cancel_rx);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            let _ = cancel_tx.send(true);
        }
    });

    let request = DeploymentRequest::new(
        &cli.resource_group,
        &cli.location,
        &cli.deployment,
        &cli.template,
    );

    let span = tracing::info_span!("deployment", deployment = %cli.deployment);
    let outcome = async {
        let submitted = system.orchestrator.start_deployment(&request).await?;
        info!(submitted, "Deployment step finished");
        system
            .orchestrator
            .wait_for_resource_provisioning(&cli.resource_group, &cli.resource_name, &cli.resource_type)
            .await
    }
    .instrument(span)
    .await;

    if let Ok(stats) = system.plane.stats().await {
        info!(?stats, "Management plane summary");
    }
    system.shutdown().await?;

    match outcome {
        Ok(true) => {
            info!(resource = %cli.resource_name, "Provisioning succeeded");
            Ok(())
        }
        Ok(false) => {
            error!(resource = %cli.resource_name, "Provisioning ended without success");
            Err(format!("{} did not provision successfully", cli.resource_name))
        }
        Err(e) => {
            error!(error = %e, "Orchestration failed");
            Err(e.to_string())
        }
    }
}
