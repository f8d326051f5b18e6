#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Ignition Core
//!
//! Event-triggered core for launching containerized tasks on a cluster
//! scheduler and registering their dynamically assigned addresses behind
//! load-balancing target groups, plus the companion teardown sweep.
//!
//! ## Overview
//!
//! One invocation performs exactly one operation and holds no state between
//! invocations:
//!
//! - **start-and-register**: resolve a logical service name to its
//!   infrastructure coordinates, launch one task, poll until it is RUNNING
//!   with an assigned private address, register that address behind the
//!   service's target group, and optionally wait for health convergence
//! - **stop-and-deregister**: for a set of services, stop every running task
//!   and remove their discovered addresses from the matching target groups,
//!   aggregating per-service outcomes
//!
//! The hard core is the task-lifecycle state machine with polling-based
//! state reconciliation: partial failure at each stage is a distinct,
//! reportable outcome rather than a blanket error.
//!
//! ## Architecture
//!
//! External collaborators are injected behind async traits, never
//! constructed here: [`scheduler::ContainerScheduler`] for the cluster
//! scheduler and [`balancer::LoadBalancerApi`] for the load-balancing
//! control plane. Everything else is pure composition over those seams.
//!
//! ## Module Organization
//!
//! - [`registry`] - Static service-name → infrastructure lookup
//! - [`scheduler`] - Cluster scheduler seam, wire types, address extraction
//! - [`balancer`] - Load-balancer seam and target health types
//! - [`poll`] - Bounded "poll until ready or deadline" primitive
//! - [`orchestration`] - TaskLauncher, EndpointRegistrar, and the two
//!   composed operations
//! - [`handler`] - Trigger payload parsing and result envelopes
//! - [`config`] - Global polling/placement settings
//! - [`error`] - Structured error taxonomy
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ignition_core::config::IgnitionConfig;
//! use ignition_core::registry::ServiceRegistry;
//!
//! let registry = ServiceRegistry::from_env();
//! let config = IgnitionConfig::from_env().expect("valid configuration");
//!
//! // Wire a StartOrchestrator with real ContainerScheduler and
//! // LoadBalancerApi implementations, then feed trigger events through
//! // ignition_core::handler::handle_start.
//! println!("configured services: {:?}", registry.service_names());
//! ```

pub mod balancer;
pub mod config;
pub mod error;
pub mod handler;
pub mod logging;
pub mod orchestration;
pub mod poll;
pub mod registry;
pub mod scheduler;

pub use balancer::{BalancerError, HealthRecord, LoadBalancerApi, TargetHealthState, TargetRecord};
pub use config::IgnitionConfig;
pub use error::{IgnitionError, Result};
pub use handler::{handle_start, handle_stop, Envelope};
pub use orchestration::{
    EndpointRegistrar, ServiceSweepOutcome, StartOrchestrator, StartOutcome, StartOverrides,
    StopSweeper, SweepReport, SweepStatus, TaskLauncher,
};
pub use registry::{ServiceDescriptor, ServiceRegistry};
pub use scheduler::{
    ContainerScheduler, LaunchRequest, SchedulerError, TaskHandle, TaskLifecycleStatus,
    TaskOverview,
};
