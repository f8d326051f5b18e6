//! # Load-Balancer Control Plane Interface
//!
//! Seam for the second external collaborator: registering, deregistering, and
//! health-querying (address, port) targets in a named target group. The
//! control plane owns target health entirely; the core only observes it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::error::IgnitionError;

/// The unit registered with a target group. No identity beyond the pair;
/// re-registering the same pair is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRecord {
    pub address: String,
    pub port: u16,
}

impl TargetRecord {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }
}

/// Health states a target group tracks per target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetHealthState {
    Initial,
    Healthy,
    Unhealthy,
    Draining,
    Unused,
    #[default]
    Unavailable,
    /// Synthetic state for a target absent from the control plane's response.
    NotFound,
}

/// One target's health as the control plane reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub address: String,
    pub port: Option<u16>,
    pub state: TargetHealthState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl HealthRecord {
    /// Synthetic record for a target the control plane did not report.
    pub fn not_found(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port: Some(port),
            state: TargetHealthState::NotFound,
            reason: None,
            description: None,
        }
    }
}

/// API fault from the control plane, carrying its error code verbatim
/// (e.g. `TargetGroupNotFound`, `InvalidTarget`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{code} - {message}")]
pub struct BalancerError {
    pub code: String,
    pub message: String,
}

impl BalancerError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<BalancerError> for IgnitionError {
    fn from(err: BalancerError) -> Self {
        IgnitionError::Balancer(err.to_string())
    }
}

/// The calls the core needs from the load-balancing control plane.
#[async_trait]
pub trait LoadBalancerApi: Send + Sync {
    /// Register targets with a group. Idempotent on the control plane side.
    async fn register_targets(
        &self,
        target_group_arn: &str,
        targets: &[TargetRecord],
    ) -> Result<(), BalancerError>;

    /// Remove targets from a group.
    async fn deregister_targets(
        &self,
        target_group_arn: &str,
        targets: &[TargetRecord],
    ) -> Result<(), BalancerError>;

    /// Describe target health, optionally narrowed to one target.
    async fn describe_target_health(
        &self,
        target_group_arn: &str,
        filter: Option<&TargetRecord>,
    ) -> Result<Vec<HealthRecord>, BalancerError>;
}

#[async_trait]
impl<T: LoadBalancerApi + ?Sized> LoadBalancerApi for Arc<T> {
    async fn register_targets(
        &self,
        target_group_arn: &str,
        targets: &[TargetRecord],
    ) -> Result<(), BalancerError> {
        (**self).register_targets(target_group_arn, targets).await
    }

    async fn deregister_targets(
        &self,
        target_group_arn: &str,
        targets: &[TargetRecord],
    ) -> Result<(), BalancerError> {
        (**self).deregister_targets(target_group_arn, targets).await
    }

    async fn describe_target_health(
        &self,
        target_group_arn: &str,
        filter: Option<&TargetRecord>,
    ) -> Result<Vec<HealthRecord>, BalancerError> {
        (**self)
            .describe_target_health(target_group_arn, filter)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_states_serialize_lowercase() {
        assert_eq!(
            serde_json::to_value(TargetHealthState::Healthy).unwrap(),
            serde_json::json!("healthy")
        );
        assert_eq!(
            serde_json::to_value(TargetHealthState::NotFound).unwrap(),
            serde_json::json!("not_found")
        );
        let state: TargetHealthState = serde_json::from_value(serde_json::json!("draining")).unwrap();
        assert_eq!(state, TargetHealthState::Draining);
    }

    #[test]
    fn not_found_record_is_synthetic() {
        let record = HealthRecord::not_found("10.0.1.50", 8080);
        assert_eq!(record.state, TargetHealthState::NotFound);
        assert_eq!(record.port, Some(8080));
        assert!(record.reason.is_none());
    }

    #[test]
    fn balancer_error_renders_code_and_message() {
        let err = BalancerError::new("TargetGroupNotFound", "no such group");
        assert_eq!(err.to_string(), "TargetGroupNotFound - no such group");
    }
}
