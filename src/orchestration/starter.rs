//! # Start Orchestrator
//!
//! Composes registry lookup, task launch, and target registration into one
//! linear start-and-register operation. The state machine has no branching
//! retries: each stage either succeeds or ends the operation with a typed
//! failure.
//!
//! 1. Resolve the service descriptor (case-insensitive).
//! 2. Merge trigger overrides over registry defaults.
//! 3. Validate the merged plan before any external call.
//! 4. Launch and wait for RUNNING; on failure, stop here.
//! 5. Register the assigned address; on failure, stop here. The launched
//!    task is left running: no automatic rollback on registration failure.
//! 6. Take a single non-blocking health snapshot and return.

use tracing::info;

use crate::balancer::{LoadBalancerApi, TargetRecord};
use crate::config::IgnitionConfig;
use crate::error::Result;
use crate::orchestration::endpoint_registrar::EndpointRegistrar;
use crate::orchestration::task_launcher::TaskLauncher;
use crate::orchestration::types::{StartOutcome, StartOverrides};
use crate::registry::ServiceRegistry;

/// One-shot start-and-register operation over injected collaborators.
#[derive(Debug)]
pub struct StartOrchestrator<S, B> {
    registry: ServiceRegistry,
    config: IgnitionConfig,
    launcher: TaskLauncher<S>,
    registrar: EndpointRegistrar<B>,
}

impl<S, B> StartOrchestrator<S, B>
where
    S: crate::scheduler::ContainerScheduler,
    B: LoadBalancerApi,
{
    pub fn new(
        registry: ServiceRegistry,
        config: IgnitionConfig,
        scheduler: S,
        balancer: B,
    ) -> Self {
        let launcher = TaskLauncher::new(scheduler, config.clone());
        let registrar = EndpointRegistrar::new(balancer, config.clone());
        Self {
            registry,
            config,
            launcher,
            registrar,
        }
    }

    /// The registry this orchestrator resolves services against.
    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Start a service's task and register it behind its target group.
    pub async fn start(&self, service_name: &str, overrides: &StartOverrides) -> Result<StartOutcome> {
        let descriptor = self.registry.resolve(service_name)?;
        let plan = overrides.apply(descriptor, &self.config);
        plan.validate()?;

        info!(
            service = %plan.service,
            cluster = %plan.request.cluster,
            task_definition = %plan.request.task_definition,
            port = plan.request.container_port,
            "starting task for service"
        );

        let (handle, private_ip) = self.launcher.start_task(&plan.request).await?;

        let port = plan.request.container_port;
        self.registrar
            .register(&plan.target_group_arn, &private_ip, port, plan.wait_for_healthy)
            .await?;

        let target = TargetRecord::new(private_ip.clone(), port);
        let health_status = self
            .registrar
            .target_health(&plan.target_group_arn, &target)
            .await?;

        info!(
            service = %plan.service,
            task_id = %handle.short_id(),
            private_ip = %private_ip,
            health = ?health_status.state,
            "task started and registered"
        );

        Ok(StartOutcome {
            service: plan.service,
            task_arn: handle.arn().to_string(),
            task_id: handle.short_id().to_string(),
            private_ip,
            port,
            target_group_arn: plan.target_group_arn,
            health_status,
        })
    }
}
