//! # Orchestration Types
//!
//! Shared data structures for the start-and-register and stop-and-deregister
//! operations: trigger overrides, the merged launch plan, and the outcome
//! shapes that feed result envelopes.

use serde::{Deserialize, Serialize};

use crate::balancer::HealthRecord;
use crate::config::IgnitionConfig;
use crate::error::{IgnitionError, Result};
use crate::registry::ServiceDescriptor;
use crate::scheduler::LaunchRequest;

/// Per-call overrides carried in the trigger payload.
///
/// Field-wise merge semantics: a present field replaces the registry default,
/// an absent field inherits it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StartOverrides {
    pub cluster: Option<String>,
    pub task_definition: Option<String>,
    pub target_group_arn: Option<String>,
    pub subnets: Option<Vec<String>>,
    pub security_groups: Option<Vec<String>>,
    pub container_name: Option<String>,
    pub port: Option<u16>,
    pub wait_for_healthy: Option<bool>,
}

impl StartOverrides {
    /// Merge these overrides over a descriptor into a complete start plan.
    pub fn apply(&self, descriptor: &ServiceDescriptor, config: &IgnitionConfig) -> StartPlan {
        let pick =
            |field: &Option<String>, default: &str| field.clone().unwrap_or_else(|| default.to_string());
        StartPlan {
            service: descriptor.name.clone(),
            request: LaunchRequest {
                cluster: pick(&self.cluster, &descriptor.cluster),
                task_definition: pick(&self.task_definition, &descriptor.task_definition),
                subnets: self.subnets.clone().unwrap_or_else(|| descriptor.subnets.clone()),
                security_groups: self
                    .security_groups
                    .clone()
                    .unwrap_or_else(|| descriptor.security_groups.clone()),
                container_name: pick(&self.container_name, &descriptor.container_name),
                container_port: self.port.unwrap_or(descriptor.container_port),
                launch_type: config.launch_type.clone(),
                assign_public_ip: config.assign_public_ip.clone(),
            },
            target_group_arn: pick(&self.target_group_arn, &descriptor.target_group_arn),
            wait_for_healthy: self.wait_for_healthy.unwrap_or(false),
        }
    }
}

/// Everything one start operation needs, merged and frozen before any
/// external call is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartPlan {
    pub service: String,
    pub request: LaunchRequest,
    pub target_group_arn: String,
    pub wait_for_healthy: bool,
}

impl StartPlan {
    /// Fail fast on fields an override may have emptied out. Runs before the
    /// first scheduler call so a doomed request leaves no partial side
    /// effects behind.
    pub fn validate(&self) -> Result<()> {
        if self.target_group_arn.is_empty() {
            return Err(incomplete("Target group ARN", &self.service));
        }
        if self.request.subnets.is_empty() {
            return Err(incomplete("Subnets", &self.service));
        }
        if self.request.security_groups.is_empty() {
            return Err(incomplete("Security groups", &self.service));
        }
        if self.request.container_port == 0 {
            return Err(incomplete("Container port", &self.service));
        }
        Ok(())
    }
}

fn incomplete(field: &str, service: &str) -> IgnitionError {
    IgnitionError::Configuration(format!("{field} not configured for service: {service}"))
}

/// Successful start-and-register result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartOutcome {
    pub service: String,
    pub task_arn: String,
    pub task_id: String,
    pub private_ip: String,
    pub port: u16,
    pub target_group_arn: String,
    pub health_status: HealthRecord,
}

/// Status of one service's slice of a stop sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepStatus {
    Success,
    NoTasks,
    Skipped,
    Error,
}

/// Per-service outcome inside a sweep; one service's error never invalidates
/// another's outcome.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceSweepOutcome {
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    pub tasks_stopped: usize,
    pub targets_deregistered: usize,
    pub task_ids: Vec<String>,
    pub status: SweepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ServiceSweepOutcome {
    pub fn skipped(service: &str, reason: String) -> Self {
        Self {
            service: service.to_string(),
            cluster: None,
            tasks_stopped: 0,
            targets_deregistered: 0,
            task_ids: Vec::new(),
            status: SweepStatus::Skipped,
            detail: Some(reason),
        }
    }

    pub fn no_tasks(service: &str, cluster: &str) -> Self {
        Self {
            service: service.to_string(),
            cluster: Some(cluster.to_string()),
            tasks_stopped: 0,
            targets_deregistered: 0,
            task_ids: Vec::new(),
            status: SweepStatus::NoTasks,
            detail: None,
        }
    }

    pub fn failed(service: &str, cluster: Option<String>, detail: String) -> Self {
        Self {
            service: service.to_string(),
            cluster,
            tasks_stopped: 0,
            targets_deregistered: 0,
            task_ids: Vec::new(),
            status: SweepStatus::Error,
            detail: Some(detail),
        }
    }
}

/// Aggregate result of a stop sweep. Always a success envelope; per-service
/// failures live in `results`.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub total_tasks_stopped: usize,
    pub services_processed: usize,
    pub results: Vec<ServiceSweepOutcome>,
}
