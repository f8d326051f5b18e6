//! # Bounded Polling Primitive
//!
//! A single generic "poll until ready or deadline" loop shared by the
//! task-running wait and the health-convergence wait. Each attempt is an async
//! operation that either produces a value, asks to keep polling, or fails
//! hard; attempts are separated by a fixed sleep and the whole loop is bounded
//! by a deadline measured from the first attempt.
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//! use ignition_core::poll::{poll_until, PollDecision};
//!
//! # async fn example() -> Result<(), std::convert::Infallible> {
//! let mut remaining = 3u32;
//! let outcome = poll_until(Duration::from_millis(1), Duration::from_secs(1), || {
//!     remaining -= 1;
//!     let done = remaining == 0;
//!     async move {
//!         if done {
//!             Ok::<_, std::convert::Infallible>(PollDecision::Ready("converged"))
//!         } else {
//!             Ok(PollDecision::Continue)
//!         }
//!     }
//! })
//! .await?;
//! assert_eq!(outcome, Some("converged"));
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// What a single poll attempt observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollDecision<T> {
    /// The awaited condition holds; stop polling and yield the value.
    Ready(T),
    /// Transient intermediate state; sleep and try again.
    Continue,
}

/// Repeatedly run `attempt` until it yields [`PollDecision::Ready`], it fails,
/// or `deadline` elapses.
///
/// Returns `Ok(Some(value))` on readiness, `Ok(None)` on deadline expiry, and
/// propagates the attempt's error unchanged. The first attempt runs
/// immediately; the deadline is checked after each non-ready attempt, so the
/// loop terminates within `deadline + interval` of wall clock.
pub async fn poll_until<T, E, F, Fut>(
    interval: Duration,
    deadline: Duration,
    mut attempt: F,
) -> Result<Option<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollDecision<T>, E>>,
{
    let started = Instant::now();
    loop {
        match attempt().await? {
            PollDecision::Ready(value) => return Ok(Some(value)),
            PollDecision::Continue => {}
        }
        if started.elapsed() >= deadline {
            return Ok(None);
        }
        tokio::time::sleep(interval).await;
    }
}
