//! Admission control for concurrently running operations
//!
//! This crate provides [`Gate`], a counting admission gate whose capacity can be changed at
//! runtime. It is the enforcement half of an adaptive concurrency limiter: something else
//! decides what the limit should be and calls [`Gate::resize`], while every unit of work holds
//! a [`Permit`] for as long as it runs.
//!
//! # Usage
//!
//! ```rust,no_run
//! use throttle::Gate;
//!
//! # async fn example() -> Result<(), throttle::Error> {
//! let gate = Gate::new(10);
//!
//! // Acquire a permit before starting the operation
//! let permit = gate.acquire().await?;
//! // Perform operation here - the slot is released when the permit is dropped
//! drop(permit);
//!
//! // Adjust the limit at any time, including while permits are held
//! gate.resize(4);
//! # Ok(())
//! # }
//! ```
//!
//! # Resizing
//!
//! - **Growing** adds slots immediately and wakes waiters.
//! - **Shrinking** forgets free slots first. If more permits are held than the new capacity
//!   allows, nothing is evicted; the excess releases are swallowed until the number of held
//!   permits fits the capacity again. Until then no new work is admitted.
//!
//! # Cancellation
//!
//! [`Gate::acquire`] is cancel safe. A caller that gives up while waiting (for example through
//! `tokio::time::timeout`) never took a slot and owes no release. A [`Permit`] releases its
//! slot when dropped, so work cancelled after admission gives its slot back as well.
//!
//! # Thread Safety
//!
//! The gate can be shared between tasks and threads. Waiting uses a tokio semaphore; the
//! bookkeeping for in-flight permits is kept under a short-lived `parking_lot` mutex.

mod gate;

pub use gate::{Gate, Permit};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("admission gate is closed")]
    Closed,
}
