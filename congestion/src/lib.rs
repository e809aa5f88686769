//! Latency-driven concurrency limit estimation
//!
//! This crate turns observed round-trip times into a ceiling on the number of operations a
//! client may have in flight. It holds only the feedback-control half of an adaptive limiter:
//! enforcing the ceiling is the job of an admission gate (see the `throttle` crate), and wiring
//! the two together is done by the `adaptive` crate.
//!
//! # Overview
//!
//! Every estimator implements [`LimitEstimator`]: it is fed one latency sample per completed
//! unit of work and answers with the new concurrency limit. Estimators are plain stateful
//! values; they are not synchronized and expect callers to serialize `update` calls.
//!
//! The only algorithm currently provided is [`Vegas`], modeled on TCP Vegas congestion control:
//!
//! 1. The first sample only seeds the minimum observed round-trip time.
//! 2. Every later sample estimates how many requests are queued beyond that baseline:
//!
//! ```text
//! queue_size = limit * (1 - min_rtt / rtt)
//! ```
//!
//! 3. A queue below `alpha` grows the limit by one, a queue above `beta` shrinks it by one,
//!    anything in between leaves it unchanged.
//! 4. `alpha` and `beta` are re-derived from the adjusted limit after every step.
//!
//! # Usage
//!
//! ```rust
//! use congestion::{LimitEstimator, Vegas, VegasConfig};
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), congestion::Error> {
//! let mut vegas = Vegas::new(VegasConfig::default())?;
//! assert_eq!(vegas.update(Duration::from_millis(100))?, 10); // seed sample
//! assert_eq!(vegas.update(Duration::from_millis(100))?, 11); // no queueing, probe upwards
//! assert_eq!(vegas.update(Duration::from_millis(300))?, 10); // heavy queueing, back off
//! # Ok(())
//! # }
//! ```
//!
//! # Algorithm Selection
//!
//! [`Algorithm`] names the available estimators and parses them from configuration strings,
//! rejecting unknown names with [`Error::UnsupportedAlgorithm`].
//!
//! # Replay
//!
//! [`replay()`] feeds a fixed latency sequence through an estimator and records the resulting
//! limit after every step. It is deterministic and is used to explore how an estimator reacts
//! to a latency profile without running any real work.

mod algorithm;
mod replay;
mod vegas;

pub use algorithm::Algorithm;
pub use replay::{Step, replay};
pub use vegas::{ALPHA_FLOOR, BETA_FLOOR, LIMIT_DEFAULT, Vegas, VegasConfig};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("algorithm '{0}' not supported")]
    UnsupportedAlgorithm(String),
    #[error("round trip time must be positive, got {0:?}")]
    InvalidRoundTripTime(std::time::Duration),
    #[error("invalid estimator configuration: {0}")]
    InvalidConfig(String),
}

/// Converts latency samples into a concurrency limit.
///
/// Implementations are fed one sample per completed unit of work, in completion order. Calls
/// must be externally serialized.
pub trait LimitEstimator {
    /// Current concurrency limit, always at least 1.
    fn limit(&self) -> usize;

    /// Records one round-trip time and returns the updated limit.
    ///
    /// A zero `round_trip_time` is rejected with [`Error::InvalidRoundTripTime`] and leaves the
    /// estimator unchanged.
    fn update(&mut self, round_trip_time: std::time::Duration) -> Result<usize, Error>;
}
