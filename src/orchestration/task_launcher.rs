//! # Task Launcher
//!
//! ## Architecture: Launch with Polling-Based State Reconciliation
//!
//! The TaskLauncher owns the "wait for running" state machine. It submits a
//! run request for exactly one task instance, then reconciles against
//! observable scheduler state at a fixed cadence until one of three terminal
//! outcomes:
//!
//! - the task is RUNNING and its private address is extractable → success
//! - the task transitioned to STOPPED → hard failure carrying the stop
//!   reason and per-container reasons verbatim
//! - the wait budget elapsed → timeout failure naming the task
//!
//! RUNNING without an assigned address is a normal transient state under
//! address-assignment latency and simply continues the poll. Scheduler-side
//! launch rejections fail immediately without polling; a placement constraint
//! violation will not self-resolve by waiting.
//!
//! No local state survives between polls; every observation is fetched fresh.

use tracing::{debug, error, info, warn};

use crate::config::IgnitionConfig;
use crate::error::{IgnitionError, Result};
use crate::poll::{poll_until, PollDecision};
use crate::scheduler::{
    private_ip, ContainerScheduler, LaunchRequest, TaskHandle, TaskLifecycleStatus, TaskOverview,
};

/// Drives the cluster scheduler for one task launch or stop.
#[derive(Debug)]
pub struct TaskLauncher<S> {
    scheduler: S,
    config: IgnitionConfig,
}

impl<S: ContainerScheduler> TaskLauncher<S> {
    pub fn new(scheduler: S, config: IgnitionConfig) -> Self {
        Self { scheduler, config }
    }

    /// Submit a run request and block (bounded) until the task is RUNNING
    /// with an assigned address.
    pub async fn start_task(&self, request: &LaunchRequest) -> Result<(TaskHandle, String)> {
        info!(
            cluster = %request.cluster,
            task_definition = %request.task_definition,
            launch_type = %request.launch_type,
            "starting task"
        );

        let outcome = self.scheduler.run_task(request).await?;

        if !outcome.failures.is_empty() {
            let reasons: Vec<String> = outcome.failures.iter().map(ToString::to_string).collect();
            let message = reasons.join("; ");
            error!(cluster = %request.cluster, failures = %message, "scheduler rejected run request");
            return Err(IgnitionError::Launch(message));
        }

        let task = outcome
            .tasks
            .into_iter()
            .next()
            .ok_or_else(|| IgnitionError::Launch("No tasks started".to_string()))?;
        let handle = TaskHandle::new(task.task_arn);

        info!(task_id = %handle.short_id(), "task submitted");

        let address = self.wait_for_running(&request.cluster, &handle).await?;

        info!(
            task_id = %handle.short_id(),
            private_ip = %address,
            "task is RUNNING"
        );

        Ok((handle, address))
    }

    /// Poll the scheduler until the task reaches RUNNING and exposes an
    /// address, it stops, or the wait budget runs out.
    async fn wait_for_running(&self, cluster: &str, handle: &TaskHandle) -> Result<String> {
        debug!(task_id = %handle.short_id(), "waiting for RUNNING state");

        let scheduler = &self.scheduler;
        let observed = poll_until(self.config.poll_interval, self.config.task_wait_timeout, move || {
            let (scheduler, cluster, handle) = (scheduler, cluster, handle);
            async move {
                let observations = scheduler
                    .describe_tasks(cluster, std::slice::from_ref(handle))
                    .await?;
                let task = observations.into_iter().next().ok_or_else(|| {
                    IgnitionError::Scheduler(format!("Task {} not found", handle.short_id()))
                })?;
                classify_observation(handle, &task)
            }
        })
        .await?;

        observed.ok_or_else(|| IgnitionError::Timeout {
            task_id: handle.short_id().to_string(),
            waited_secs: self.config.task_wait_timeout.as_secs(),
        })
    }

    /// Stop one task, recording the reason with the scheduler.
    pub async fn stop_task(&self, cluster: &str, handle: &TaskHandle, reason: &str) -> Result<()> {
        self.scheduler.stop_task(cluster, handle, reason).await?;
        info!(task_id = %handle.short_id(), cluster = %cluster, "stopped task");
        Ok(())
    }

    /// Fresh observations for a batch of tasks.
    pub async fn describe_tasks(
        &self,
        cluster: &str,
        handles: &[TaskHandle],
    ) -> Result<Vec<TaskOverview>> {
        Ok(self.scheduler.describe_tasks(cluster, handles).await?)
    }

    /// Handles of all tasks currently running in a cluster.
    pub async fn list_running_tasks(&self, cluster: &str) -> Result<Vec<TaskHandle>> {
        Ok(self.scheduler.list_running_tasks(cluster).await?)
    }
}

/// Map one observation to a poll decision or a terminal failure.
fn classify_observation(
    handle: &TaskHandle,
    task: &TaskOverview,
) -> Result<PollDecision<String>> {
    match task.last_status {
        TaskLifecycleStatus::Stopped => {
            let stopped_reason = task
                .stopped_reason
                .clone()
                .unwrap_or_else(|| "Unknown".to_string());
            let container_reasons = task.container_reasons();
            error!(
                task_id = %handle.short_id(),
                stopped_reason = %stopped_reason,
                ?container_reasons,
                "task stopped before reaching RUNNING"
            );
            Err(IgnitionError::TaskStopped {
                task_id: handle.short_id().to_string(),
                stopped_reason,
                container_reasons,
            })
        }
        TaskLifecycleStatus::Running => match private_ip(task) {
            Some(address) => Ok(PollDecision::Ready(address.to_string())),
            None => {
                warn!(
                    task_id = %handle.short_id(),
                    "task is RUNNING but address not yet available"
                );
                Ok(PollDecision::Continue)
            }
        },
        status => {
            debug!(
                task_id = %handle.short_id(),
                last_status = ?status,
                desired_status = ?task.desired_status,
                "task not yet running"
            );
            Ok(PollDecision::Continue)
        }
    }
}
