use crate::error::{IgnitionError, Result};
use std::time::Duration;

/// Global settings for task launch and registration behavior.
///
/// Per-service infrastructure coordinates live in the
/// [`ServiceRegistry`](crate::registry::ServiceRegistry); this struct holds the
/// knobs that apply to every invocation: polling cadence, wait budgets, and the
/// scheduler placement policy.
#[derive(Debug, Clone)]
pub struct IgnitionConfig {
    /// Maximum time to wait for a launched task to reach RUNNING.
    pub task_wait_timeout: Duration,
    /// Interval between status polls (task wait and health wait).
    pub poll_interval: Duration,
    /// Maximum time to wait for a registered target to converge to healthy.
    pub health_wait_timeout: Duration,
    /// Scheduler capacity mode for launched tasks ("FARGATE" or "EC2").
    pub launch_type: String,
    /// Public-IP assignment policy for the task network interface
    /// ("ENABLED" or "DISABLED").
    pub assign_public_ip: String,
    /// Region the collaborating control planes live in.
    pub region: String,
}

impl Default for IgnitionConfig {
    fn default() -> Self {
        Self {
            task_wait_timeout: Duration::from_secs(300), // 5 minutes
            poll_interval: Duration::from_secs(5),
            health_wait_timeout: Duration::from_secs(60),
            launch_type: "FARGATE".to_string(),
            assign_public_ip: "ENABLED".to_string(),
            region: "us-east-2".to_string(),
        }
    }
}

impl IgnitionConfig {
    /// Build configuration from the process environment, falling back to
    /// defaults for anything unset. Unparseable numeric values are
    /// configuration errors, not silent fallbacks.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(timeout) = std::env::var("TASK_WAIT_TIMEOUT") {
            config.task_wait_timeout = Duration::from_secs(parse_secs("TASK_WAIT_TIMEOUT", &timeout)?);
        }

        if let Ok(interval) = std::env::var("TASK_POLL_INTERVAL") {
            config.poll_interval = Duration::from_secs(parse_secs("TASK_POLL_INTERVAL", &interval)?);
        }

        if let Ok(timeout) = std::env::var("HEALTH_WAIT_TIMEOUT") {
            config.health_wait_timeout = Duration::from_secs(parse_secs("HEALTH_WAIT_TIMEOUT", &timeout)?);
        }

        if let Ok(launch_type) = std::env::var("LAUNCH_TYPE") {
            config.launch_type = launch_type;
        }

        if let Ok(assign) = std::env::var("ASSIGN_PUBLIC_IP") {
            config.assign_public_ip = assign;
        }

        if let Ok(region) = std::env::var("AWS_REGION") {
            config.region = region;
        }

        Ok(config)
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<u64> {
    raw.parse()
        .map_err(|e| IgnitionError::Configuration(format!("Invalid {key}: {e}")))
}
