//! # Cluster Scheduler Interface
//!
//! The ignition core drives an external container scheduler but never speaks
//! its transport directly. [`ContainerScheduler`] is the seam: the four calls
//! the core needs (run, describe, stop, list), expressed over the wire shapes
//! the scheduler reports. Production wiring implements this trait against the
//! real control plane; tests implement it with scripted fakes.
//!
//! Also home to [`private_ip`], the single place that knows how to dig a
//! task's dynamically assigned address out of a status observation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::error::IgnitionError;

/// Attachment type carrying the network interface for isolated-network tasks.
pub const ENI_ATTACHMENT_TYPE: &str = "ElasticNetworkInterface";
/// Attachment detail name holding the assigned private IPv4 address.
pub const PRIVATE_IPV4_DETAIL: &str = "privateIPv4Address";

/// Transport or API fault reported by a scheduler implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SchedulerError {
    pub message: String,
}

impl SchedulerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<SchedulerError> for IgnitionError {
    fn from(err: SchedulerError) -> Self {
        IgnitionError::Scheduler(err.message)
    }
}

/// Opaque scheduler-assigned task identifier (full ARN-like string).
///
/// The short form, the suffix after the last path separator, is what goes
/// into logs and result bodies for correlation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskHandle(String);

impl TaskHandle {
    pub fn new(arn: impl Into<String>) -> Self {
        Self(arn.into())
    }

    /// Full ARN-like identifier.
    pub fn arn(&self) -> &str {
        &self.0
    }

    /// Suffix after the last `/`, or the whole id when there is none.
    pub fn short_id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Task lifecycle states as the scheduler reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskLifecycleStatus {
    Provisioning,
    Pending,
    Activating,
    Running,
    Deactivating,
    Stopping,
    Deprovisioning,
    Stopped,
    /// Anything this crate does not model; treated as a transient state.
    #[default]
    #[serde(other)]
    Unknown,
}

/// One network-interface attachment record on a task observation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskAttachment {
    #[serde(rename = "type")]
    pub kind: String,
    pub details: Vec<AttachmentDetail>,
}

/// Key/value detail inside an attachment record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentDetail {
    pub name: String,
    pub value: Option<String>,
}

/// Network interface bound directly to a container (bridge/host placement).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkInterfaceBinding {
    pub private_ipv4_address: Option<String>,
}

/// Per-container status inside a task observation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerOverview {
    pub name: String,
    pub reason: Option<String>,
    pub network_interfaces: Vec<NetworkInterfaceBinding>,
}

/// A fresh observation of one task, fetched per poll and never cached.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskOverview {
    pub task_arn: String,
    pub last_status: TaskLifecycleStatus,
    pub desired_status: TaskLifecycleStatus,
    pub stopped_reason: Option<String>,
    pub attachments: Vec<TaskAttachment>,
    pub containers: Vec<ContainerOverview>,
}

impl TaskOverview {
    /// "name: reason" for every container that reported a failure reason.
    pub fn container_reasons(&self) -> Vec<String> {
        self.containers
            .iter()
            .filter_map(|c| c.reason.as_ref().map(|r| format!("{}: {}", c.name, r)))
            .collect()
    }
}

/// Scheduler-reported launch failure, distinct from a transport error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunFailure {
    pub arn: Option<String>,
    pub reason: Option<String>,
    pub detail: Option<String>,
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.reason.as_deref().unwrap_or("unknown reason"),
            self.detail.as_deref().unwrap_or("no detail")
        )
    }
}

/// Response to a run-task submission: started tasks and reported failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunTaskOutcome {
    pub tasks: Vec<TaskOverview>,
    pub failures: Vec<RunFailure>,
}

/// Fully merged, immutable instruction for one task launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub cluster: String,
    pub task_definition: String,
    pub subnets: Vec<String>,
    pub security_groups: Vec<String>,
    pub container_name: String,
    pub container_port: u16,
    pub launch_type: String,
    pub assign_public_ip: String,
}

/// The calls the core needs from the cluster scheduler.
#[async_trait]
pub trait ContainerScheduler: Send + Sync {
    /// Submit a run request for exactly one task instance.
    async fn run_task(&self, request: &LaunchRequest) -> Result<RunTaskOutcome, SchedulerError>;

    /// Fetch fresh observations for the given tasks.
    async fn describe_tasks(
        &self,
        cluster: &str,
        handles: &[TaskHandle],
    ) -> Result<Vec<TaskOverview>, SchedulerError>;

    /// Ask the scheduler to stop one task, recording the reason.
    async fn stop_task(
        &self,
        cluster: &str,
        handle: &TaskHandle,
        reason: &str,
    ) -> Result<(), SchedulerError>;

    /// List handles of all tasks currently running in a cluster.
    async fn list_running_tasks(&self, cluster: &str) -> Result<Vec<TaskHandle>, SchedulerError>;
}

#[async_trait]
impl<T: ContainerScheduler + ?Sized> ContainerScheduler for Arc<T> {
    async fn run_task(&self, request: &LaunchRequest) -> Result<RunTaskOutcome, SchedulerError> {
        (**self).run_task(request).await
    }

    async fn describe_tasks(
        &self,
        cluster: &str,
        handles: &[TaskHandle],
    ) -> Result<Vec<TaskOverview>, SchedulerError> {
        (**self).describe_tasks(cluster, handles).await
    }

    async fn stop_task(
        &self,
        cluster: &str,
        handle: &TaskHandle,
        reason: &str,
    ) -> Result<(), SchedulerError> {
        (**self).stop_task(cluster, handle, reason).await
    }

    async fn list_running_tasks(&self, cluster: &str) -> Result<Vec<TaskHandle>, SchedulerError> {
        (**self).list_running_tasks(cluster).await
    }
}

/// Extract the task's private address from an observation.
///
/// Precedence: the `privateIPv4Address` detail on an elastic network
/// interface attachment first (isolated-network placement), then the first
/// container network-interface binding (bridge/host placement). First match
/// wins; no merging. `None` is a valid transient state while the address is
/// still being assigned, not an error.
pub fn private_ip(task: &TaskOverview) -> Option<&str> {
    for attachment in &task.attachments {
        if attachment.kind != ENI_ATTACHMENT_TYPE {
            continue;
        }
        for detail in &attachment.details {
            if detail.name == PRIVATE_IPV4_DETAIL {
                if let Some(value) = detail.value.as_deref() {
                    return Some(value);
                }
            }
        }
    }

    for container in &task.containers {
        if let Some(interface) = container.network_interfaces.first() {
            if let Some(address) = interface.private_ipv4_address.as_deref() {
                return Some(address);
            }
        }
    }

    None
}
