//! # Structured Error Handling
//!
//! Unified error taxonomy for the ignition core. Every failure a trigger can
//! observe maps to exactly one variant here, and every variant knows the
//! HTTP-equivalent status code it should surface as in a result envelope.

use thiserror::Error;

/// Errors produced while starting, watching, or registering container tasks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IgnitionError {
    /// Unknown service name or a descriptor field that failed validation.
    /// Never retried; surfaced as a client error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The scheduler rejected the run request outright (placement constraint,
    /// capacity, malformed definition). Polling will not fix this.
    #[error("Failed to start task: {0}")]
    Launch(String),

    /// The task transitioned to STOPPED while we were waiting for RUNNING.
    /// The stop reason and per-container reasons are the actionable part and
    /// are carried verbatim.
    #[error("Task {task_id} stopped. Reason: {stopped_reason}. Container reasons: {container_reasons:?}")]
    TaskStopped {
        task_id: String,
        stopped_reason: String,
        container_reasons: Vec<String>,
    },

    /// The running-state wait expired before the task reached RUNNING with an
    /// assigned address.
    #[error("Timeout waiting for task {task_id} to reach RUNNING state after {waited_secs}s")]
    Timeout { task_id: String, waited_secs: u64 },

    /// The load-balancer control plane rejected a target registration.
    #[error("Failed to register target: {code} - {message}")]
    Registration { code: String, message: String },

    /// Transport or API fault talking to the cluster scheduler.
    #[error("Scheduler error: {0}")]
    Scheduler(String),

    /// Transport or API fault talking to the load-balancer control plane.
    #[error("Load balancer error: {0}")]
    Balancer(String),
}

impl IgnitionError {
    /// HTTP-equivalent status code for the result envelope.
    ///
    /// Configuration problems are the caller's to fix (400); everything else
    /// is a downstream failure (500).
    pub fn status_code(&self) -> u16 {
        match self {
            IgnitionError::Configuration(_) => 400,
            _ => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, IgnitionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_are_client_errors() {
        let err = IgnitionError::Configuration("unknown service".to_string());
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn downstream_errors_are_server_errors() {
        let stopped = IgnitionError::TaskStopped {
            task_id: "abc123".to_string(),
            stopped_reason: "OutOfMemoryError".to_string(),
            container_reasons: vec!["app: exit 137".to_string()],
        };
        assert_eq!(stopped.status_code(), 500);
        assert_eq!(
            IgnitionError::Launch("no capacity".to_string()).status_code(),
            500
        );
    }

    #[test]
    fn stopped_error_carries_reasons_verbatim() {
        let err = IgnitionError::TaskStopped {
            task_id: "abc123".to_string(),
            stopped_reason: "OutOfMemoryError".to_string(),
            container_reasons: vec!["app: exit 137".to_string()],
        };
        let rendered = err.to_string();
        assert!(rendered.contains("OutOfMemoryError"));
        assert!(rendered.contains("abc123"));
        assert!(rendered.contains("exit 137"));
    }
}
