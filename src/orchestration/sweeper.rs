//! # Stop Sweeper
//!
//! Bulk stop-and-deregister across a set of services (default: all
//! configured). Services are processed sequentially and independently: an
//! unknown name, an empty cluster, or a scheduler fault in one service is
//! recorded as that service's outcome and the sweep moves on. The aggregate
//! report is always a success envelope; per-service failures are data.
//!
//! Stop failures for individual tasks are logged and excluded from the
//! stopped count without blocking the remaining tasks, and deregistration is
//! cleanup rather than correctness: once the tasks are stopped, a failed
//! batch deregistration is a warning, not an error.

use tracing::{error, info, warn};

use crate::balancer::{LoadBalancerApi, TargetRecord};
use crate::config::IgnitionConfig;
use crate::error::Result;
use crate::orchestration::endpoint_registrar::EndpointRegistrar;
use crate::orchestration::task_launcher::TaskLauncher;
use crate::orchestration::types::{ServiceSweepOutcome, SweepReport, SweepStatus};
use crate::registry::{ServiceDescriptor, ServiceRegistry};
use crate::scheduler::{private_ip, ContainerScheduler};

const SWEEP_STOP_REASON: &str = "Stopped by ignition stop sweep";

/// Bulk stop-and-deregister operation over injected collaborators.
#[derive(Debug)]
pub struct StopSweeper<S, B> {
    registry: ServiceRegistry,
    launcher: TaskLauncher<S>,
    registrar: EndpointRegistrar<B>,
}

impl<S, B> StopSweeper<S, B>
where
    S: ContainerScheduler,
    B: LoadBalancerApi,
{
    pub fn new(
        registry: ServiceRegistry,
        config: IgnitionConfig,
        scheduler: S,
        balancer: B,
    ) -> Self {
        let launcher = TaskLauncher::new(scheduler, config.clone());
        let registrar = EndpointRegistrar::new(balancer, config);
        Self {
            registry,
            launcher,
            registrar,
        }
    }

    /// The registry this sweeper resolves services against.
    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Stop every running task for the named services (all configured
    /// services when `services` is `None` or empty) and, when `deregister`
    /// is set, remove their discovered addresses from the matching target
    /// groups.
    pub async fn stop_all(&self, services: Option<Vec<String>>, deregister: bool) -> SweepReport {
        let names = match services {
            Some(list) if !list.is_empty() => list,
            _ => self.registry.service_names(),
        };

        info!(services = ?names, deregister = deregister, "sweeping services");

        let mut results = Vec::with_capacity(names.len());
        let mut total_stopped = 0;

        for name in &names {
            let outcome = self.sweep_service(name, deregister).await;
            total_stopped += outcome.tasks_stopped;
            results.push(outcome);
        }

        SweepReport {
            total_tasks_stopped: total_stopped,
            services_processed: names.len(),
            results,
        }
    }

    async fn sweep_service(&self, name: &str, deregister: bool) -> ServiceSweepOutcome {
        let descriptor = match self.registry.resolve(name) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                warn!(service = %name, reason = %e, "skipping unknown service");
                return ServiceSweepOutcome::skipped(name, e.to_string());
            }
        };

        match self.sweep_descriptor(descriptor, deregister).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(service = %name, error = %e, "error processing service");
                ServiceSweepOutcome::failed(name, Some(descriptor.cluster.clone()), e.to_string())
            }
        }
    }

    async fn sweep_descriptor(
        &self,
        descriptor: &ServiceDescriptor,
        deregister: bool,
    ) -> Result<ServiceSweepOutcome> {
        let handles = self.launcher.list_running_tasks(&descriptor.cluster).await?;

        if handles.is_empty() {
            info!(
                service = %descriptor.name,
                cluster = %descriptor.cluster,
                "no running tasks found"
            );
            return Ok(ServiceSweepOutcome::no_tasks(&descriptor.name, &descriptor.cluster));
        }

        info!(
            service = %descriptor.name,
            count = handles.len(),
            "found running tasks"
        );

        // Addresses must be captured before the stop; a task without a
        // discoverable address is simply omitted from the batch.
        let mut targets = Vec::new();
        if deregister {
            let observations = self
                .launcher
                .describe_tasks(&descriptor.cluster, &handles)
                .await?;
            for task in &observations {
                if let Some(address) = private_ip(task) {
                    targets.push(TargetRecord::new(address, descriptor.container_port));
                }
            }
        }

        let mut stopped_ids = Vec::new();
        for handle in &handles {
            match self
                .launcher
                .stop_task(&descriptor.cluster, handle, SWEEP_STOP_REASON)
                .await
            {
                Ok(()) => stopped_ids.push(handle.short_id().to_string()),
                Err(e) => {
                    error!(task_id = %handle.short_id(), error = %e, "error stopping task");
                }
            }
        }

        let mut deregistered = 0;
        if deregister && !targets.is_empty() {
            match self
                .registrar
                .deregister(&descriptor.target_group_arn, &targets)
                .await
            {
                Ok(()) => deregistered = targets.len(),
                Err(e) => {
                    warn!(
                        target_group = %descriptor.target_group_arn,
                        error = %e,
                        "error deregistering targets"
                    );
                }
            }
        }

        Ok(ServiceSweepOutcome {
            service: descriptor.name.clone(),
            cluster: Some(descriptor.cluster.clone()),
            tasks_stopped: stopped_ids.len(),
            targets_deregistered: deregistered,
            task_ids: stopped_ids,
            status: SweepStatus::Success,
            detail: None,
        })
    }
}
