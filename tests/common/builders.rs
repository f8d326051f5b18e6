//! Builders for registry fixtures and scheduler observations.

use ignition_core::balancer::{HealthRecord, TargetHealthState};
use ignition_core::registry::{ServiceDescriptor, ServiceRegistry};
use ignition_core::scheduler::{
    AttachmentDetail, ContainerOverview, NetworkInterfaceBinding, TaskAttachment,
    TaskLifecycleStatus, TaskOverview, ENI_ATTACHMENT_TYPE, PRIVATE_IPV4_DETAIL,
};

pub const AUTH_TARGET_GROUP: &str =
    "arn:aws:elasticloadbalancing:us-east-2:123:targetgroup/unified-auth-tg";
pub const PDF_TARGET_GROUP: &str =
    "arn:aws:elasticloadbalancing:us-east-2:123:targetgroup/unified-pdf-tg";

pub fn descriptor(name: &str, target_group_arn: &str, port: u16) -> ServiceDescriptor {
    ServiceDescriptor {
        name: name.to_string(),
        cluster: format!("{name}-cluster"),
        task_definition: format!("{name}-task-def"),
        target_group_arn: target_group_arn.to_string(),
        container_name: format!("{name}-container"),
        container_port: port,
        subnets: vec!["subnet-123".to_string(), "subnet-456".to_string()],
        security_groups: vec!["sg-789".to_string()],
    }
}

/// Two-service registry mirroring the production defaults for auth and pdf.
pub fn test_registry() -> ServiceRegistry {
    ServiceRegistry::new(vec![
        descriptor("auth", AUTH_TARGET_GROUP, 8080),
        descriptor("pdf", PDF_TARGET_GROUP, 9080),
    ])
}

pub fn pending_task(arn: &str) -> TaskOverview {
    TaskOverview {
        task_arn: arn.to_string(),
        last_status: TaskLifecycleStatus::Pending,
        desired_status: TaskLifecycleStatus::Running,
        ..TaskOverview::default()
    }
}

pub fn running_task_without_ip(arn: &str) -> TaskOverview {
    TaskOverview {
        task_arn: arn.to_string(),
        last_status: TaskLifecycleStatus::Running,
        desired_status: TaskLifecycleStatus::Running,
        ..TaskOverview::default()
    }
}

pub fn running_task(arn: &str, ip: &str) -> TaskOverview {
    TaskOverview {
        attachments: vec![TaskAttachment {
            kind: ENI_ATTACHMENT_TYPE.to_string(),
            details: vec![AttachmentDetail {
                name: PRIVATE_IPV4_DETAIL.to_string(),
                value: Some(ip.to_string()),
            }],
        }],
        ..running_task_without_ip(arn)
    }
}

pub fn stopped_task(arn: &str, reason: &str, container_reasons: &[(&str, &str)]) -> TaskOverview {
    TaskOverview {
        task_arn: arn.to_string(),
        last_status: TaskLifecycleStatus::Stopped,
        desired_status: TaskLifecycleStatus::Stopped,
        stopped_reason: Some(reason.to_string()),
        containers: container_reasons
            .iter()
            .map(|(name, reason)| ContainerOverview {
                name: (*name).to_string(),
                reason: Some((*reason).to_string()),
                network_interfaces: Vec::new(),
            })
            .collect(),
        ..TaskOverview::default()
    }
}

/// Running task whose address comes from a container binding, not an ENI
/// attachment.
pub fn running_task_bridge_mode(arn: &str, ip: &str) -> TaskOverview {
    TaskOverview {
        containers: vec![ContainerOverview {
            name: "app".to_string(),
            reason: None,
            network_interfaces: vec![NetworkInterfaceBinding {
                private_ipv4_address: Some(ip.to_string()),
            }],
        }],
        ..running_task_without_ip(arn)
    }
}

pub fn health(address: &str, port: u16, state: TargetHealthState) -> HealthRecord {
    HealthRecord {
        address: address.to_string(),
        port: Some(port),
        state,
        reason: None,
        description: None,
    }
}
