use super::Orchestrator;
use crate::clock::Clock;
use crate::error::{OrchestratorError, PollPhase, Result};
use crate::management::ResourceManager;
use crate::model::GenericResourceId;
use crate::provisioning::{ProvisioningState, StateClass};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Attempt and deadline accounting shared by both polling phases.
struct PollBudget {
    started: Instant,
    max_wait: Option<Duration>,
    max_attempts: Option<u32>,
}

impl PollBudget {
    /// Fails once `attempts` or the elapsed time reaches its limit.
    fn check(&self, phase: PollPhase, attempts: u32, now: Instant) -> Result<()> {
        let elapsed = now.saturating_duration_since(self.started);
        let out_of_attempts = self.max_attempts.is_some_and(|max| attempts >= max);
        let out_of_time = self.max_wait.is_some_and(|max| elapsed >= max);
        if out_of_attempts || out_of_time {
            return Err(OrchestratorError::DeadlineExceeded {
                phase,
                elapsed,
                attempts,
            });
        }
        Ok(())
    }

    /// Time left before `max_wait`, or `None` when there is no deadline.
    fn remaining(&self, now: Instant) -> Option<Duration> {
        let elapsed = now.saturating_duration_since(self.started);
        self.max_wait.map(|max| max.saturating_sub(elapsed))
    }

    /// `delay`, shortened so the sleep ends no later than the deadline.
    fn clamp(&self, delay: Duration, now: Instant) -> Duration {
        match self.remaining(now) {
            Some(remaining) => delay.min(remaining),
            None => delay,
        }
    }
}

impl<M: ResourceManager, C: Clock> Orchestrator<M, C> {
    /// Waits for a compute resource to be provisioned.
    ///
    /// Polls for existence every `existence_poll_interval`, then re-fetches
    /// the resource every `provisioning_poll_delay` until its
    /// `provisioningState` is terminal. Returns `true` iff it ended in
    /// `Succeeded`.
    ///
    /// API and parse errors are returned as-is; only pending states are
    /// retried. With no `max_wait`/`max_attempts` configured this waits
    /// forever. Sleeps are shortened so the last poll happens exactly at
    /// `max_wait`.
    #[instrument(skip(self))]
    pub async fn wait_for_resource_provisioning(
        &self,
        resource_group: &str,
        resource_name: &str,
        resource_type: &str,
    ) -> Result<bool> {
        let id = self.compute_resource_id(resource_group, resource_name, resource_type);
        let budget = PollBudget {
            started: self.clock.now(),
            max_wait: self.config.max_wait,
            max_attempts: self.config.max_attempts,
        };
        let mut cancel = self.cancel.clone();

        self.wait_for_existence(&id, &budget, &mut cancel).await?;
        let state = self.wait_for_terminal_state(&id, &budget, &mut cancel).await?;

        info!(%state, "Provisioning finished");
        Ok(state.is_succeeded())
    }

    fn compute_resource_id(
        &self,
        resource_group: &str,
        resource_name: &str,
        resource_type: &str,
    ) -> GenericResourceId {
        GenericResourceId {
            resource_group: resource_group.to_string(),
            provider_namespace: self.config.provider_namespace.clone(),
            parent_path: String::new(),
            resource_type: resource_type.to_string(),
            resource_name: resource_name.to_string(),
            api_version: self.config.api_version.clone(),
        }
    }

    async fn wait_for_existence(
        &self,
        id: &GenericResourceId,
        budget: &PollBudget,
        cancel: &mut Option<watch::Receiver<bool>>,
    ) -> Result<()> {
        let phase = PollPhase::Existence;
        let mut attempts = 0;
        loop {
            ensure_not_cancelled(cancel, phase)?;
            attempts += 1;
            if self.manager.generic_resource_exists(id).await? {
                debug!(attempts, "Resource exists");
                return Ok(());
            }
            debug!(attempts, "Resource not visible yet");
            let now = self.clock.now();
            budget.check(phase, attempts, now)?;
            let delay = budget.clamp(self.config.existence_poll_interval, now);
            self.pause(delay, phase, cancel).await?;
        }
    }

    async fn wait_for_terminal_state(
        &self,
        id: &GenericResourceId,
        budget: &PollBudget,
        cancel: &mut Option<watch::Receiver<bool>>,
    ) -> Result<ProvisioningState> {
        let phase = PollPhase::Provisioning;
        let mut attempts = 0;
        loop {
            ensure_not_cancelled(cancel, phase)?;
            attempts += 1;
            let state = self.fetch_provisioning_state(id).await?;
            match state.class() {
                StateClass::Ended | StateClass::Succeeded => return Ok(state),
                StateClass::Running => debug!(attempts, %state, "Still provisioning"),
                StateClass::Unknown => warn!(attempts, %state, "Unrecognized provisioning state"),
            }
            let now = self.clock.now();
            budget.check(phase, attempts, now)?;
            let delay = budget.clamp(self.config.provisioning_poll_delay, now);
            self.pause(delay, phase, cancel).await?;
        }
    }

    async fn fetch_provisioning_state(&self, id: &GenericResourceId) -> Result<ProvisioningState> {
        let resource = self.manager.get_generic_resource(id).await?;
        resource
            .provisioning_state()
            .map(ProvisioningState::parse)
            .ok_or_else(|| OrchestratorError::MissingProvisioningState {
                resource: id.to_string(),
            })
    }

    /// Sleeps for `delay`, returning early with `Cancelled` if cancellation fires.
    async fn pause(
        &self,
        delay: Duration,
        phase: PollPhase,
        cancel: &mut Option<watch::Receiver<bool>>,
    ) -> Result<()> {
        let mut sleep = self.clock.sleep(delay);
        if let Some(rx) = cancel {
            tokio::select! {
                _ = &mut sleep => return Ok(()),
                cancelled = rx.wait_for(|cancelled| *cancelled) => {
                    if cancelled.is_ok() {
                        info!(%phase, "Polling cancelled");
                        return Err(OrchestratorError::Cancelled { phase });
                    }
                }
            }
            // Sender dropped: nobody can cancel any more.
            *cancel = None;
        }
        sleep.await;
        Ok(())
    }
}

fn ensure_not_cancelled(cancel: &Option<watch::Receiver<bool>>, phase: PollPhase) -> Result<()> {
    match cancel {
        Some(rx) if *rx.borrow() => Err(OrchestratorError::Cancelled { phase }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use crate::clock::ManualClock;
    use crate::config::OrchestratorConfig;
    use crate::error::{ManagementApiError, OrchestratorError, PollPhase};
    use crate::mock::{MockResourceManager, Operation};
    use crate::model::{GenericResource, GenericResourceId};
    use crate::orchestrator::Orchestrator;
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::watch;

    fn resource(properties: serde_json::Value) -> GenericResource {
        GenericResource {
            id: GenericResourceId {
                resource_group: "rg1".into(),
                provider_namespace: "Microsoft.Compute".into(),
                parent_path: String::new(),
                resource_type: "virtualMachines".into(),
                resource_name: "vm1".into(),
                api_version: "2016-04-30-preview".into(),
            },
            properties,
        }
    }

    fn in_state(state: &str) -> GenericResource {
        resource(json!({ "provisioningState": state }))
    }

    fn orchestrator(
        mock: &MockResourceManager,
        clock: &ManualClock,
        config: OrchestratorConfig,
    ) -> Orchestrator<MockResourceManager, ManualClock> {
        Orchestrator::with_clock(mock.clone(), clock.clone(), config)
    }

    #[tokio::test]
    async fn succeeded_on_first_fetch() {
        let mock = MockResourceManager::new();
        let clock = ManualClock::new();
        mock.expect_generic_resource_exists().return_ok(true);
        mock.expect_get_generic_resource().return_ok(in_state("Succeeded"));

        let ok = orchestrator(&mock, &clock, OrchestratorConfig::default())
            .wait_for_resource_provisioning("rg1", "vm1", "virtualMachines")
            .await
            .unwrap();

        assert!(ok);
        assert_eq!(mock.calls(Operation::GetGenericResource), 1);
        assert!(clock.sleeps().is_empty());
        mock.verify();
    }

    #[tokio::test]
    async fn polls_existence_then_state_at_fixed_cadence() {
        let mock = MockResourceManager::new();
        let clock = ManualClock::new();
        mock.expect_generic_resource_exists().times(2).return_ok(false);
        mock.expect_generic_resource_exists().return_ok(true);
        mock.expect_get_generic_resource().return_ok(in_state("Creating"));
        mock.expect_get_generic_resource().return_ok(in_state("Running"));
        mock.expect_get_generic_resource().return_ok(in_state("Succeeded"));

        let ok = orchestrator(&mock, &clock, OrchestratorConfig::default())
            .wait_for_resource_provisioning("rg1", "vm1", "virtualMachines")
            .await
            .unwrap();

        assert!(ok);
        assert_eq!(
            clock.sleeps(),
            vec![
                Duration::from_secs(5),
                Duration::from_secs(5),
                Duration::from_millis(5000),
                Duration::from_millis(5000),
            ]
        );
        mock.verify();
    }

    #[tokio::test]
    async fn failed_and_canceled_terminate_with_false() {
        for state in ["Failed", "Canceled"] {
            let mock = MockResourceManager::new();
            let clock = ManualClock::new();
            mock.expect_generic_resource_exists().return_ok(true);
            mock.expect_get_generic_resource().return_ok(in_state("Accepted"));
            mock.expect_get_generic_resource().return_ok(in_state(state));

            let ok = orchestrator(&mock, &clock, OrchestratorConfig::default())
                .wait_for_resource_provisioning("rg1", "vm1", "virtualMachines")
                .await
                .unwrap();

            assert!(!ok, "{state}");
            mock.verify();
        }
    }

    #[tokio::test]
    async fn unknown_state_keeps_polling() {
        let mock = MockResourceManager::new();
        let clock = ManualClock::new();
        mock.expect_generic_resource_exists().return_ok(true);
        mock.expect_get_generic_resource().return_ok(in_state("Accepted "));
        mock.expect_get_generic_resource().return_ok(in_state("Updating"));
        mock.expect_get_generic_resource().return_ok(in_state("Succeeded"));

        let ok = orchestrator(&mock, &clock, OrchestratorConfig::default())
            .wait_for_resource_provisioning("rg1", "vm1", "virtualMachines")
            .await
            .unwrap();

        assert!(ok);
        assert_eq!(mock.calls(Operation::GetGenericResource), 3);
        mock.verify();
    }

    #[tokio::test]
    async fn never_existing_resource_hits_attempt_cap() {
        let mock = MockResourceManager::new();
        let clock = ManualClock::new();
        mock.expect_generic_resource_exists().times(50).return_ok(false);

        let config = OrchestratorConfig::default().with_max_attempts(50);
        let err = orchestrator(&mock, &clock, config)
            .wait_for_resource_provisioning("rg1", "vm1", "virtualMachines")
            .await
            .unwrap_err();

        match err {
            OrchestratorError::DeadlineExceeded { phase, attempts, .. } => {
                assert_eq!(phase, PollPhase::Existence);
                assert_eq!(attempts, 50);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(mock.calls(Operation::GetGenericResource), 0);
        assert_eq!(clock.sleeps().len(), 49);
        mock.verify();
    }

    #[tokio::test]
    async fn max_wait_bounds_both_phases() {
        let mock = MockResourceManager::new();
        let clock = ManualClock::new();
        mock.expect_generic_resource_exists().return_ok(false);
        mock.expect_generic_resource_exists().return_ok(true);
        mock.expect_get_generic_resource().times(2).return_ok(in_state("Running"));

        // 5s existence sleep + 5s provisioning sleep reaches the 10s limit.
        let config = OrchestratorConfig::default().with_max_wait(Duration::from_secs(10));
        let err = orchestrator(&mock, &clock, config)
            .wait_for_resource_provisioning("rg1", "vm1", "virtualMachines")
            .await
            .unwrap_err();

        match err {
            OrchestratorError::DeadlineExceeded { phase, elapsed, .. } => {
                assert_eq!(phase, PollPhase::Provisioning);
                assert_eq!(elapsed, Duration::from_secs(10));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        mock.verify();
    }

    #[tokio::test]
    async fn max_wait_is_never_overshot() {
        let mock = MockResourceManager::new();
        let clock = ManualClock::new();
        mock.expect_generic_resource_exists().times(3).return_ok(false);

        // 60s does not divide 61s: the second sleep is cut to 1s and the
        // last check lands exactly on the deadline.
        let config = OrchestratorConfig::default()
            .with_existence_poll_interval(Duration::from_secs(60))
            .with_max_wait(Duration::from_secs(61));
        let err = orchestrator(&mock, &clock, config)
            .wait_for_resource_provisioning("rg1", "vm1", "virtualMachines")
            .await
            .unwrap_err();

        match err {
            OrchestratorError::DeadlineExceeded {
                phase,
                elapsed,
                attempts,
            } => {
                assert_eq!(phase, PollPhase::Existence);
                assert_eq!(elapsed, Duration::from_secs(61));
                assert_eq!(attempts, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_secs(60), Duration::from_secs(1)]
        );
        assert_eq!(clock.slept(), Duration::from_secs(61));
        mock.verify();
    }

    #[tokio::test]
    async fn attempt_cap_restarts_for_provisioning_phase() {
        let mock = MockResourceManager::new();
        let clock = ManualClock::new();
        mock.expect_generic_resource_exists().times(2).return_ok(false);
        mock.expect_generic_resource_exists().return_ok(true);
        mock.expect_get_generic_resource().times(3).return_ok(in_state("Running"));

        // Existence uses all 3 attempts; provisioning still gets its own 3.
        let config = OrchestratorConfig::default().with_max_attempts(3);
        let err = orchestrator(&mock, &clock, config)
            .wait_for_resource_provisioning("rg1", "vm1", "virtualMachines")
            .await
            .unwrap_err();

        match err {
            OrchestratorError::DeadlineExceeded { phase, attempts, .. } => {
                assert_eq!(phase, PollPhase::Provisioning);
                assert_eq!(attempts, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(mock.calls(Operation::GenericResourceExists), 3);
        assert_eq!(mock.calls(Operation::GetGenericResource), 3);
        assert_eq!(clock.sleeps().len(), 4);
        mock.verify();
    }

    #[tokio::test]
    async fn missing_provisioning_state_is_an_error() {
        let mock = MockResourceManager::new();
        let clock = ManualClock::new();
        mock.expect_generic_resource_exists().return_ok(true);
        mock.expect_get_generic_resource()
            .return_ok(resource(json!({ "vmId": "abc" })));

        let err = orchestrator(&mock, &clock, OrchestratorConfig::default())
            .wait_for_resource_provisioning("rg1", "vm1", "virtualMachines")
            .await
            .unwrap_err();

        assert!(matches!(err, OrchestratorError::MissingProvisioningState { .. }));
        mock.verify();
    }

    #[tokio::test]
    async fn api_errors_are_not_retried() {
        let mock = MockResourceManager::new();
        let clock = ManualClock::new();
        mock.expect_generic_resource_exists().return_ok(true);
        mock.expect_get_generic_resource()
            .return_err(ManagementApiError::Transport("connection reset".into()));

        let err = orchestrator(&mock, &clock, OrchestratorConfig::default())
            .wait_for_resource_provisioning("rg1", "vm1", "virtualMachines")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OrchestratorError::ManagementApi(ManagementApiError::Transport(_))
        ));
        assert_eq!(mock.calls(Operation::GetGenericResource), 1);
        mock.verify();
    }

    #[tokio::test]
    async fn cancellation_is_checked_before_polling() {
        let mock = MockResourceManager::new();
        let clock = ManualClock::new();
        let (tx, rx) = watch::channel(true);

        let err = orchestrator(&mock, &clock, OrchestratorConfig::default())
            .with_cancellation(rx)
            .wait_for_resource_provisioning("rg1", "vm1", "virtualMachines")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OrchestratorError::Cancelled {
                phase: PollPhase::Existence
            }
        ));
        assert_eq!(mock.calls(Operation::GenericResourceExists), 0);
        drop(tx);
    }

    #[tokio::test]
    async fn cancellation_stops_a_running_poll() {
        let mock = MockResourceManager::new();
        let clock = ManualClock::new();
        mock.expect_generic_resource_exists().return_ok(true);
        mock.expect_get_generic_resource().times(3).return_ok(in_state("Running"));
        let (tx, rx) = watch::channel(false);

        let orchestrator =
            orchestrator(&mock, &clock, OrchestratorConfig::default()).with_cancellation(rx);

        let watcher = mock.clone();
        let canceller = async move {
            while watcher.calls(Operation::GetGenericResource) < 3 {
                tokio::task::yield_now().await;
            }
            tx.send(true).unwrap();
            tx
        };

        let (result, _tx) = tokio::join!(
            orchestrator.wait_for_resource_provisioning("rg1", "vm1", "virtualMachines"),
            canceller
        );

        assert!(matches!(
            result,
            Err(OrchestratorError::Cancelled {
                phase: PollPhase::Provisioning
            })
        ));
        assert_eq!(mock.calls(Operation::GetGenericResource), 3);
        mock.verify();
    }

    #[tokio::test]
    async fn dropped_cancel_sender_does_not_stop_polling() {
        let mock = MockResourceManager::new();
        let clock = ManualClock::new();
        mock.expect_generic_resource_exists().return_ok(false);
        mock.expect_generic_resource_exists().return_ok(true);
        mock.expect_get_generic_resource().return_ok(in_state("Succeeded"));
        let (tx, rx) = watch::channel(false);
        drop(tx);

        let ok = orchestrator(&mock, &clock, OrchestratorConfig::default())
            .with_cancellation(rx)
            .wait_for_resource_provisioning("rg1", "vm1", "virtualMachines")
            .await
            .unwrap();

        assert!(ok);
        mock.verify();
    }

    #[tokio::test]
    async fn uses_configured_addressing() {
        let mock = MockResourceManager::new();
        let clock = ManualClock::new();
        mock.expect_generic_resource_exists().return_ok(true);
        mock.expect_get_generic_resource().return_ok(in_state("Succeeded"));

        let config = OrchestratorConfig::default()
            .with_provider_namespace("Microsoft.ContainerService")
            .with_api_version("2024-01-01");
        let orchestrator = orchestrator(&mock, &clock, config);
        let id = orchestrator.compute_resource_id("rg1", "aks1", "managedClusters");

        assert_eq!(id.provider_namespace, "Microsoft.ContainerService");
        assert_eq!(id.api_version, "2024-01-01");
        assert!(id.parent_path.is_empty());
        assert!(orchestrator
            .wait_for_resource_provisioning("rg1", "aks1", "managedClusters")
            .await
            .unwrap());
    }
}
