//! Adaptive concurrency limiting for outbound operations
//!
//! This crate caps the number of operations (typically network calls) a client has in flight
//! and adjusts that cap automatically from observed latency, in the spirit of TCP Vegas
//! congestion control. It protects both caller and callee from overload without a hand-tuned
//! static concurrency limit.
//!
//! # Overview
//!
//! A [`Client`] closes a feedback loop between two pieces:
//!
//! 1. **Estimator** - a [`congestion::LimitEstimator`] (Vegas by default) that turns one latency
//!    sample into a new limit
//! 2. **Gate** - a [`throttle::Gate`] that admits at most `limit` operations at once
//!
//! Every operation goes through the gate. When it completes successfully its latency is fed to
//! the estimator and the gate is resized to the answer. Failed or cancelled operations give
//! their slot back without touching the estimator.
//!
//! # Usage
//!
//! ```rust,no_run
//! use adaptive::{Client, ClientConfig};
//!
//! # async fn send_request() -> Result<String, anyhow::Error> { Ok(String::new()) }
//! # async fn example() -> Result<(), anyhow::Error> {
//! let client = Client::new(&ClientConfig::default())?;
//!
//! // Closure style: errors from the operation are returned unchanged
//! let response = client.run(send_request).await?;
//!
//! // Guard style: only a completed lease reports its latency
//! let lease = client.lease().await?;
//! let response = send_request().await?;
//! lease.complete();
//! # let _ = response;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! [`ClientConfig`] selects the algorithm by name and carries its tuning knobs. It deserializes
//! with serde and falls back to defaults for anything omitted:
//!
//! ```text
//! { "algorithm": "vegas", "vegas": { "limit": 10, "limit_max": 200, "alpha": 2, "beta": 4 } }
//! ```
//!
//! An unknown algorithm name or invalid knobs fail [`Client::new`] with [`Error::Config`].
//!
//! # Concurrency
//!
//! Clients are `Sync` and are meant to be shared (for example in an `Arc`) by every task that
//! talks to the same downstream service. Estimator updates and the following gate resize run
//! under one mutex; admission and release only touch the gate.

mod client;
mod config;
mod estimator;

pub use client::{Client, Lease};
pub use config::ClientConfig;
pub use congestion::{Algorithm, LimitEstimator, Vegas, VegasConfig};
pub use estimator::Estimator;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] congestion::Error),
    #[error(transparent)]
    Gate(#[from] throttle::Error),
}
