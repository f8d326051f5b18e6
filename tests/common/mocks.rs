//! Scripted doubles for the two collaborator seams.
//!
//! Both mocks record every call so tests can assert on exactly which side
//! effects an operation produced, and both are driven through `Arc` so the
//! test keeps a handle to the recordings after handing the mock to an
//! orchestrator.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use ignition_core::balancer::{
    BalancerError, HealthRecord, LoadBalancerApi, TargetHealthState, TargetRecord,
};
use ignition_core::scheduler::{
    ContainerScheduler, LaunchRequest, RunFailure, RunTaskOutcome, SchedulerError, TaskHandle,
    TaskOverview,
};

pub const DEFAULT_TASK_ARN: &str = "arn:aws:ecs:us-east-2:123:task/test-cluster/abc123";

/// Scripted cluster scheduler.
///
/// Start-path polling is scripted through `describe_plan`: each
/// `describe_tasks` call consumes one entry, and the last entry repeats once
/// the plan is exhausted. Sweep-path describes fall back to the `overviews`
/// map keyed by task ARN.
#[derive(Debug, Default)]
pub struct MockScheduler {
    pub run_failure: Mutex<Option<RunFailure>>,
    pub run_transport_error: Mutex<Option<String>>,
    pub describe_plan: Mutex<VecDeque<Vec<TaskOverview>>>,
    last_describe: Mutex<Option<Vec<TaskOverview>>>,
    pub running: Mutex<HashMap<String, Vec<TaskHandle>>>,
    pub overviews: Mutex<HashMap<String, TaskOverview>>,
    pub stop_failures: Mutex<HashSet<String>>,
    pub list_errors: Mutex<HashSet<String>>,
    pub stopped: Mutex<Vec<(String, String, String)>>,
    pub describe_calls: Mutex<usize>,
}

impl MockScheduler {
    pub fn with_describe_plan(plan: Vec<Vec<TaskOverview>>) -> Self {
        Self {
            describe_plan: Mutex::new(plan.into()),
            ..Self::default()
        }
    }

    /// Register running tasks for a cluster, with per-task observations for
    /// the sweep's describe step.
    pub fn add_running_task(&self, cluster: &str, overview: TaskOverview) {
        let handle = TaskHandle::new(overview.task_arn.clone());
        self.running
            .lock()
            .unwrap()
            .entry(cluster.to_string())
            .or_default()
            .push(handle);
        self.overviews
            .lock()
            .unwrap()
            .insert(overview.task_arn.clone(), overview);
    }

    pub fn stopped_arns(&self) -> Vec<String> {
        self.stopped
            .lock()
            .unwrap()
            .iter()
            .map(|(_, arn, _)| arn.clone())
            .collect()
    }
}

#[async_trait]
impl ContainerScheduler for MockScheduler {
    async fn run_task(&self, _request: &LaunchRequest) -> Result<RunTaskOutcome, SchedulerError> {
        if let Some(message) = self.run_transport_error.lock().unwrap().clone() {
            return Err(SchedulerError::new(message));
        }
        if let Some(failure) = self.run_failure.lock().unwrap().clone() {
            return Ok(RunTaskOutcome {
                tasks: Vec::new(),
                failures: vec![failure],
            });
        }
        Ok(RunTaskOutcome {
            tasks: vec![TaskOverview {
                task_arn: DEFAULT_TASK_ARN.to_string(),
                ..TaskOverview::default()
            }],
            failures: Vec::new(),
        })
    }

    async fn describe_tasks(
        &self,
        _cluster: &str,
        handles: &[TaskHandle],
    ) -> Result<Vec<TaskOverview>, SchedulerError> {
        *self.describe_calls.lock().unwrap() += 1;

        if let Some(observations) = self.describe_plan.lock().unwrap().pop_front() {
            *self.last_describe.lock().unwrap() = Some(observations.clone());
            return Ok(observations);
        }
        if let Some(observations) = self.last_describe.lock().unwrap().clone() {
            return Ok(observations);
        }

        let overviews = self.overviews.lock().unwrap();
        Ok(handles
            .iter()
            .filter_map(|h| overviews.get(h.arn()).cloned())
            .collect())
    }

    async fn stop_task(
        &self,
        cluster: &str,
        handle: &TaskHandle,
        reason: &str,
    ) -> Result<(), SchedulerError> {
        if self.stop_failures.lock().unwrap().contains(handle.arn()) {
            return Err(SchedulerError::new(format!(
                "cannot stop {}",
                handle.short_id()
            )));
        }
        self.stopped.lock().unwrap().push((
            cluster.to_string(),
            handle.arn().to_string(),
            reason.to_string(),
        ));
        Ok(())
    }

    async fn list_running_tasks(&self, cluster: &str) -> Result<Vec<TaskHandle>, SchedulerError> {
        if self.list_errors.lock().unwrap().contains(cluster) {
            return Err(SchedulerError::new(format!(
                "cannot list tasks in {cluster}"
            )));
        }
        Ok(self
            .running
            .lock()
            .unwrap()
            .get(cluster)
            .cloned()
            .unwrap_or_default())
    }
}

/// Scripted load-balancer control plane.
///
/// Health queries consume `health_plan` entries in order; once exhausted, a
/// filtered query reports `default_health` (healthy unless overridden) for
/// the requested target.
#[derive(Debug)]
pub struct MockBalancer {
    pub register_error: Mutex<Option<BalancerError>>,
    pub deregister_error: Mutex<Option<BalancerError>>,
    pub health_plan: Mutex<VecDeque<Vec<HealthRecord>>>,
    pub default_health: Mutex<TargetHealthState>,
    pub registered: Mutex<Vec<(String, Vec<TargetRecord>)>>,
    pub deregistered: Mutex<Vec<(String, Vec<TargetRecord>)>>,
    pub health_calls: Mutex<usize>,
}

impl Default for MockBalancer {
    fn default() -> Self {
        Self {
            register_error: Mutex::new(None),
            deregister_error: Mutex::new(None),
            health_plan: Mutex::new(VecDeque::new()),
            default_health: Mutex::new(TargetHealthState::Healthy),
            registered: Mutex::new(Vec::new()),
            deregistered: Mutex::new(Vec::new()),
            health_calls: Mutex::new(0),
        }
    }
}

impl MockBalancer {
    pub fn with_default_health(state: TargetHealthState) -> Self {
        Self {
            default_health: Mutex::new(state),
            ..Self::default()
        }
    }

    pub fn push_health(&self, records: Vec<HealthRecord>) {
        self.health_plan.lock().unwrap().push_back(records);
    }
}

#[async_trait]
impl LoadBalancerApi for MockBalancer {
    async fn register_targets(
        &self,
        target_group_arn: &str,
        targets: &[TargetRecord],
    ) -> Result<(), BalancerError> {
        if let Some(err) = self.register_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.registered
            .lock()
            .unwrap()
            .push((target_group_arn.to_string(), targets.to_vec()));
        Ok(())
    }

    async fn deregister_targets(
        &self,
        target_group_arn: &str,
        targets: &[TargetRecord],
    ) -> Result<(), BalancerError> {
        if let Some(err) = self.deregister_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.deregistered
            .lock()
            .unwrap()
            .push((target_group_arn.to_string(), targets.to_vec()));
        Ok(())
    }

    async fn describe_target_health(
        &self,
        _target_group_arn: &str,
        filter: Option<&TargetRecord>,
    ) -> Result<Vec<HealthRecord>, BalancerError> {
        *self.health_calls.lock().unwrap() += 1;

        if let Some(records) = self.health_plan.lock().unwrap().pop_front() {
            return Ok(records);
        }

        match filter {
            Some(target) => Ok(vec![HealthRecord {
                address: target.address.clone(),
                port: Some(target.port),
                state: *self.default_health.lock().unwrap(),
                reason: None,
                description: None,
            }]),
            None => Ok(Vec::new()),
        }
    }
}
