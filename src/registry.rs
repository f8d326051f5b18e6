//! # Service Registry
//!
//! Static mapping from a logical service name to its infrastructure
//! coordinates: cluster, task definition, target group, container identity,
//! and network placement. Pure lookup and validation, no I/O.
//!
//! The registry is an immutable structure built once and injected into the
//! orchestrators, never a process-wide singleton, so tests can construct
//! their own without touching the environment. [`ServiceRegistry::from_env`]
//! builds the production mapping: built-in descriptors for the known
//! services with per-service and global environment overrides.

use std::collections::HashMap;

use crate::error::{IgnitionError, Result};

/// Infrastructure coordinates for one logical service.
///
/// Every field must resolve to a non-empty value before use; absence is a
/// configuration error reported at resolve time, not a runtime fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub name: String,
    pub cluster: String,
    pub task_definition: String,
    pub target_group_arn: String,
    pub container_name: String,
    pub container_port: u16,
    pub subnets: Vec<String>,
    pub security_groups: Vec<String>,
}

/// Immutable service-name → descriptor lookup.
#[derive(Debug, Clone)]
pub struct ServiceRegistry {
    services: HashMap<String, ServiceDescriptor>,
}

impl ServiceRegistry {
    /// Build a registry from explicit descriptors. Names are matched
    /// case-insensitively on lookup.
    pub fn new(descriptors: Vec<ServiceDescriptor>) -> Self {
        let services = descriptors
            .into_iter()
            .map(|d| (d.name.to_lowercase(), d))
            .collect();
        Self { services }
    }

    /// Production registry: built-in service mappings with environment
    /// overrides. Per-service variables (`AUTH_CLUSTER`, `AUTH_SUBNETS`, ...)
    /// win over the global `SUBNETS` / `SECURITY_GROUPS` fallbacks.
    pub fn from_env() -> Self {
        let region = env_or("AWS_REGION", "us-east-2");
        let account = env_or("AWS_ACCOUNT_ID", "123456789012");
        let default_subnets = env_list("SUBNETS");
        let default_security_groups = env_list("SECURITY_GROUPS");

        let builtin = [
            ("auth", "AUTH", "authapi", "unified-auth-tg", 8080u16),
            ("pdf", "PDF", "pdfcreator", "unified-pdf-tg", 9080),
            ("fa", "FA", "faengine", "unified-fa-tg", 2531),
            ("users", "USERS", "usermanagement", "users-tg", 8080),
            ("batch", "BATCH", "batchengine", "batch-tg", 8080),
        ];

        let descriptors = builtin
            .into_iter()
            .map(|(name, prefix, stem, group, port)| {
                let default_group_arn = format!(
                    "arn:aws:elasticloadbalancing:{region}:{account}:targetgroup/{group}"
                );
                let subnets = {
                    let per_service = env_list(&format!("{prefix}_SUBNETS"));
                    if per_service.is_empty() {
                        default_subnets.clone()
                    } else {
                        per_service
                    }
                };
                let security_groups = {
                    let per_service = env_list(&format!("{prefix}_SECURITY_GROUPS"));
                    if per_service.is_empty() {
                        default_security_groups.clone()
                    } else {
                        per_service
                    }
                };
                ServiceDescriptor {
                    name: name.to_string(),
                    cluster: env_or(&format!("{prefix}_CLUSTER"), &format!("{stem}-cluster")),
                    task_definition: env_or(
                        &format!("{prefix}_TASK_DEF"),
                        &format!("{stem}-task-def"),
                    ),
                    target_group_arn: env_or(
                        &format!("{prefix}_TARGET_GROUP_ARN"),
                        &default_group_arn,
                    ),
                    container_name: format!("{stem}-container"),
                    container_port: port,
                    subnets,
                    security_groups,
                }
            })
            .collect();

        Self::new(descriptors)
    }

    /// Look up a service by name, case-insensitively, and validate that its
    /// descriptor is complete enough to act on.
    pub fn resolve(&self, name: &str) -> Result<&ServiceDescriptor> {
        let descriptor = self.services.get(&name.to_lowercase()).ok_or_else(|| {
            IgnitionError::Configuration(format!(
                "Unknown service: {}. Valid services: {}",
                name,
                self.service_names().join(", ")
            ))
        })?;

        if descriptor.target_group_arn.is_empty() {
            return Err(missing_field("Target group ARN", &descriptor.name));
        }
        if descriptor.subnets.is_empty() {
            return Err(missing_field("Subnets", &descriptor.name));
        }
        if descriptor.security_groups.is_empty() {
            return Err(missing_field("Security groups", &descriptor.name));
        }
        if descriptor.container_port == 0 {
            return Err(missing_field("Container port", &descriptor.name));
        }

        Ok(descriptor)
    }

    /// All configured service names, sorted for deterministic messages.
    pub fn service_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.services.keys().cloned().collect();
        names.sort();
        names
    }
}

fn missing_field(field: &str, service: &str) -> IgnitionError {
    IgnitionError::Configuration(format!("{field} not configured for service: {service}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_list(key: &str) -> Vec<String> {
    match std::env::var(key) {
        Ok(raw) if !raw.is_empty() => raw.split(',').map(|s| s.trim().to_string()).collect(),
        _ => Vec::new(),
    }
}
