//! # Orchestration Core
//!
//! The task-lifecycle state machine and its two composed operations.
//!
//! ## Core Components
//!
//! - **TaskLauncher**: submits a run request and reconciles against observed
//!   scheduler state until the task is RUNNING with an assigned address
//! - **EndpointRegistrar**: registers/deregisters (address, port) targets and
//!   observes health convergence
//! - **StartOrchestrator**: resolve → merge → validate → launch → register →
//!   health snapshot, stopping at the first hard failure
//! - **StopSweeper**: per-service list → describe → stop → batch-deregister,
//!   aggregating outcomes instead of failing the sweep
//!
//! Both operations are stateless between invocations and strictly sequential
//! within one: a task is always fully launched (or failed) before any
//! registration call is attempted.

pub mod endpoint_registrar;
pub mod starter;
pub mod sweeper;
pub mod task_launcher;
pub mod types;

pub use endpoint_registrar::EndpointRegistrar;
pub use starter::StartOrchestrator;
pub use sweeper::StopSweeper;
pub use task_launcher::TaskLauncher;
pub use types::{
    ServiceSweepOutcome, StartOutcome, StartOverrides, StartPlan, SweepReport, SweepStatus,
};
