//! # Endpoint Registrar
//!
//! Drives the load-balancing control plane: registers a task's freshly
//! assigned (address, port) pair as a target, optionally waits for health
//! convergence, and handles deregistration and health queries.
//!
//! Failure policy is deliberately asymmetric. Registration rejections are
//! hard failures; the health-convergence wait is not. A target that is still
//! `initial` when the wait budget runs out, or that reports `unhealthy`, is
//! logged and reported as a `false` wait result only: the registration
//! already succeeded and the task keeps running, so health may still
//! converge after this invocation returns.

use std::convert::Infallible;
use tracing::{debug, error, info, warn};

use crate::balancer::{HealthRecord, LoadBalancerApi, TargetHealthState, TargetRecord};
use crate::config::IgnitionConfig;
use crate::error::{IgnitionError, Result};
use crate::poll::{poll_until, PollDecision};

/// Drives target registration and health observation for one target group.
#[derive(Debug)]
pub struct EndpointRegistrar<B> {
    balancer: B,
    config: IgnitionConfig,
}

impl<B: LoadBalancerApi> EndpointRegistrar<B> {
    pub fn new(balancer: B, config: IgnitionConfig) -> Self {
        Self { balancer, config }
    }

    /// Register one (address, port) target. Idempotent: re-registering an
    /// already registered pair is not an error.
    ///
    /// With `wait_for_healthy`, polls health until the target is healthy or
    /// the budget elapses. The returned bool is the wait result; a timed-out
    /// or never-started wait is `false`, never a failure.
    pub async fn register(
        &self,
        target_group_arn: &str,
        address: &str,
        port: u16,
        wait_for_healthy: bool,
    ) -> Result<bool> {
        let target = TargetRecord::new(address, port);
        info!(
            target_group = %target_group_arn,
            address = %address,
            port = port,
            "registering target"
        );

        self.balancer
            .register_targets(target_group_arn, std::slice::from_ref(&target))
            .await
            .map_err(|e| {
                warn!(
                    target_group = %target_group_arn,
                    code = %e.code,
                    message = %e.message,
                    "target registration rejected"
                );
                IgnitionError::Registration {
                    code: e.code,
                    message: e.message,
                }
            })?;

        info!(address = %address, port = port, "target registered");

        if wait_for_healthy {
            Ok(self.wait_for_healthy(target_group_arn, &target).await)
        } else {
            Ok(true)
        }
    }

    /// Remove targets from a group. Callers in the bulk sweep treat a failure
    /// here as best-effort cleanup; standalone callers propagate it.
    pub async fn deregister(
        &self,
        target_group_arn: &str,
        targets: &[TargetRecord],
    ) -> Result<()> {
        self.balancer
            .deregister_targets(target_group_arn, targets)
            .await
            .map_err(IgnitionError::from)?;
        info!(
            target_group = %target_group_arn,
            count = targets.len(),
            "deregistered targets"
        );
        Ok(())
    }

    /// Health of one specific target. Absent from the control plane's
    /// response → a synthetic `not_found` record, not an error.
    pub async fn target_health(
        &self,
        target_group_arn: &str,
        target: &TargetRecord,
    ) -> Result<HealthRecord> {
        let records = self
            .balancer
            .describe_target_health(target_group_arn, Some(target))
            .await
            .map_err(IgnitionError::from)?;

        Ok(records
            .into_iter()
            .find(|r| r.address == target.address)
            .unwrap_or_else(|| HealthRecord::not_found(&target.address, target.port)))
    }

    /// All targets currently known to a group. Best-effort: a query failure
    /// logs and yields an empty list.
    pub async fn list_targets(&self, target_group_arn: &str) -> Vec<HealthRecord> {
        match self
            .balancer
            .describe_target_health(target_group_arn, None)
            .await
        {
            Ok(records) => records,
            Err(e) => {
                error!(target_group = %target_group_arn, error = %e, "error listing targets");
                Vec::new()
            }
        }
    }

    /// Poll until the target reports healthy or the budget elapses.
    ///
    /// `unhealthy` is informational: logged, then polling continues, because
    /// the checks may still pass once the container finishes warming up.
    /// Query errors mid-wait are logged and retried rather than raised.
    async fn wait_for_healthy(&self, target_group_arn: &str, target: &TargetRecord) -> bool {
        info!(
            address = %target.address,
            port = target.port,
            "waiting for target to become healthy"
        );

        let waited: std::result::Result<Option<()>, Infallible> = poll_until(
            self.config.poll_interval,
            self.config.health_wait_timeout,
            move || {
                let (registrar, target_group_arn, target) = (self, target_group_arn, target);
                async move {
                    match registrar.target_health(target_group_arn, target).await {
                        Ok(record) => Ok(registrar.classify_health(&record, target)),
                        Err(e) => {
                            warn!(address = %target.address, error = %e, "error checking target health");
                            Ok(PollDecision::Continue)
                        }
                    }
                }
            },
        )
        .await;

        match waited {
            Ok(Some(())) => {
                info!(address = %target.address, port = target.port, "target is healthy");
                true
            }
            Ok(None) => {
                warn!(
                    address = %target.address,
                    port = target.port,
                    waited_secs = self.config.health_wait_timeout.as_secs(),
                    "timeout waiting for target to become healthy; it may still be initializing"
                );
                false
            }
            Err(never) => match never {},
        }
    }

    fn classify_health(&self, record: &HealthRecord, target: &TargetRecord) -> PollDecision<()> {
        match record.state {
            TargetHealthState::Healthy => PollDecision::Ready(()),
            TargetHealthState::Unhealthy => {
                warn!(
                    address = %target.address,
                    port = target.port,
                    reason = record.reason.as_deref().unwrap_or("Unknown"),
                    description = record.description.as_deref().unwrap_or(""),
                    "target is unhealthy"
                );
                PollDecision::Continue
            }
            state => {
                debug!(address = %target.address, state = ?state, "target health pending");
                PollDecision::Continue
            }
        }
    }
}
