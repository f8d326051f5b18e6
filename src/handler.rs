//! # Trigger Handlers
//!
//! Parses inbound trigger events (EventBridge-style, with the operation
//! payload under `detail`) and shapes operation results into the
//! `{statusCode, body}` envelope the trigger transport expects.
//!
//! Every failure path produces a structured envelope with a human-readable
//! message: validation problems are 400s, downstream launcher/registrar
//! failures are 500s, and a stop sweep is always a 200 whose per-service
//! outcomes live in `body.results`.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::balancer::LoadBalancerApi;
use crate::error::IgnitionError;
use crate::orchestration::{StartOrchestrator, StartOverrides, StopSweeper};
use crate::scheduler::ContainerScheduler;

/// Result envelope returned to the trigger transport.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Envelope {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: Value,
}

impl Envelope {
    pub fn success(body: Value) -> Self {
        Self {
            status_code: 200,
            body,
        }
    }

    pub fn error(message: impl Into<String>, status_code: u16) -> Self {
        Self {
            status_code,
            body: json!({ "error": message.into() }),
        }
    }
}

impl From<IgnitionError> for Envelope {
    fn from(err: IgnitionError) -> Self {
        Envelope::error(err.to_string(), err.status_code())
    }
}

#[derive(Debug, Deserialize)]
struct StartDetail {
    #[serde(default)]
    service: Option<String>,
    #[serde(flatten)]
    overrides: StartOverrides,
}

#[derive(Debug, Deserialize)]
struct StopDetail {
    #[serde(default)]
    services: Option<Vec<String>>,
    #[serde(
        default = "default_deregister",
        rename = "deregisterTargets",
        alias = "deregister_targets"
    )]
    deregister_targets: bool,
}

impl Default for StopDetail {
    fn default() -> Self {
        Self {
            services: None,
            deregister_targets: true,
        }
    }
}

fn default_deregister() -> bool {
    true
}

/// Handle a start trigger: launch the named service's task and register it.
pub async fn handle_start<S, B>(event: &Value, orchestrator: &StartOrchestrator<S, B>) -> Envelope
where
    S: ContainerScheduler,
    B: LoadBalancerApi,
{
    info!(event = %event, "received start event");

    let Some(detail_value) = event.get("detail").filter(|d| !d.is_null()) else {
        return Envelope::error("Invalid event format: missing 'detail' field", 400);
    };

    let detail: StartDetail = match serde_json::from_value(detail_value.clone()) {
        Ok(detail) => detail,
        Err(e) => return Envelope::error(format!("Invalid event detail: {e}"), 400),
    };

    let Some(service) = detail.service.filter(|s| !s.is_empty()) else {
        return Envelope::error(
            format!(
                "Missing required field: 'service'. Valid services: {}",
                orchestrator.registry().service_names().join(", ")
            ),
            400,
        );
    };

    match orchestrator.start(&service, &detail.overrides).await {
        Ok(outcome) => {
            let message = format!("Successfully started and registered {} task", outcome.service);
            let mut body = match serde_json::to_value(&outcome) {
                Ok(Value::Object(map)) => map,
                _ => return Envelope::error("Failed to serialize start outcome", 500),
            };
            body.insert("message".to_string(), json!(message));
            Envelope::success(Value::Object(body))
        }
        Err(e) => {
            error!(service = %service, error = %e, "start operation failed");
            Envelope::from(e)
        }
    }
}

/// Handle a stop trigger: sweep the named services (default all), stopping
/// tasks and deregistering their targets.
pub async fn handle_stop<S, B>(event: &Value, sweeper: &StopSweeper<S, B>) -> Envelope
where
    S: ContainerScheduler,
    B: LoadBalancerApi,
{
    info!(event = %event, "received stop event");

    let detail: StopDetail = match event.get("detail") {
        Some(value) if !value.is_null() => match serde_json::from_value(value.clone()) {
            Ok(detail) => detail,
            Err(e) => return Envelope::error(format!("Invalid event detail: {e}"), 400),
        },
        _ => StopDetail::default(),
    };

    let report = sweeper
        .stop_all(detail.services, detail.deregister_targets)
        .await;

    let message = format!(
        "Successfully stopped {} tasks across {} services",
        report.total_tasks_stopped, report.services_processed
    );

    match serde_json::to_value(&report) {
        Ok(Value::Object(mut body)) => {
            body.insert("message".to_string(), json!(message));
            Envelope::success(Value::Object(body))
        }
        _ => Envelope::error("Failed to serialize sweep report", 500),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_detail_defaults_to_deregistering_all_services() {
        let detail: StopDetail = serde_json::from_value(json!({})).unwrap();
        assert!(detail.deregister_targets);
        assert!(detail.services.is_none());
    }

    #[test]
    fn stop_detail_accepts_both_casings() {
        let camel: StopDetail =
            serde_json::from_value(json!({ "deregisterTargets": false })).unwrap();
        assert!(!camel.deregister_targets);

        let snake: StopDetail =
            serde_json::from_value(json!({ "deregister_targets": false, "services": ["auth"] }))
                .unwrap();
        assert!(!snake.deregister_targets);
        assert_eq!(snake.services, Some(vec!["auth".to_string()]));
    }

    #[test]
    fn start_detail_splits_service_from_overrides() {
        let detail: StartDetail = serde_json::from_value(json!({
            "service": "pdf",
            "port": 9999
        }))
        .unwrap();
        assert_eq!(detail.service.as_deref(), Some("pdf"));
        assert_eq!(detail.overrides.port, Some(9999));
    }

    #[test]
    fn error_envelope_shape() {
        let envelope = Envelope::from(IgnitionError::Configuration("bad".to_string()));
        assert_eq!(envelope.status_code, 400);
        assert_eq!(envelope.body["error"], "Configuration error: bad");
    }
}
