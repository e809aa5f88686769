use congestion::LimitEstimator;
use tokio::time::Instant;

use crate::{ClientConfig, Error, Estimator};

/// Concurrency limiter that tunes its limit from the latency of the work it admits.
#[derive(Debug)]
pub struct Client<L = Estimator> {
    estimator: parking_lot::Mutex<L>,
    gate: throttle::Gate,
}

impl Client<Estimator> {
    /// Builds a client running the estimator selected by `config`.
    ///
    /// Fails with [`Error::Config`] for an unknown algorithm or invalid tuning knobs.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        let estimator = Estimator::from_config(config)?;
        tracing::debug!(
            algorithm = %estimator.algorithm(),
            limit = estimator.limit(),
            "created adaptive client"
        );
        Ok(Self::with_estimator(estimator))
    }
}

impl<L: LimitEstimator> Client<L> {
    /// Builds a client around an already constructed estimator. The gate starts at the
    /// estimator's current limit.
    pub fn with_estimator(estimator: L) -> Self {
        let gate = throttle::Gate::new(estimator.limit());
        Self {
            estimator: parking_lot::Mutex::new(estimator),
            gate,
        }
    }

    /// Waits for a free slot and starts timing.
    ///
    /// Call [`Lease::complete`] once the work succeeded. Dropping the lease instead releases the
    /// slot without reporting a latency sample.
    pub async fn lease(&self) -> Result<Lease<'_, L>, Error> {
        let permit = self.gate.acquire().await?;
        Ok(Lease {
            client: self,
            permit,
            start: Instant::now(),
        })
    }

    /// Runs `work` inside an admitted slot.
    ///
    /// On success the elapsed time updates the estimator and the gate is resized before the
    /// slot is released. On failure the slot is released and the error is returned untouched.
    pub async fn run<F, Fut, T, E>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: From<Error>,
    {
        let lease = self.lease().await?;
        let output = work().await?;
        lease.complete();
        Ok(output)
    }

    fn record(&self, elapsed: std::time::Duration) {
        let mut estimator = self.estimator.lock();
        match estimator.update(elapsed) {
            Ok(limit) => {
                let previous = self.gate.capacity();
                if limit != previous {
                    tracing::debug!(?elapsed, previous, limit, "adjusted concurrency limit");
                }
                self.gate.resize(limit);
            }
            Err(error) => {
                tracing::warn!(?elapsed, %error, "discarding latency sample");
            }
        }
    }

    /// Current concurrency limit.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.gate.capacity()
    }

    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.gate.in_flight()
    }

    /// Slots that can be taken without waiting.
    #[must_use]
    pub fn available(&self) -> usize {
        self.gate.available()
    }

    /// Stops admitting work. Pending and future acquisitions fail with [`Error::Gate`]; work
    /// already admitted runs to completion.
    pub fn close(&self) {
        self.gate.close();
    }
}

/// An admitted slot of a [`Client`] together with the time it was admitted.
#[must_use = "dropping a lease releases its slot without reporting latency"]
#[derive(Debug)]
pub struct Lease<'a, L> {
    client: &'a Client<L>,
    permit: throttle::Permit<'a>,
    start: Instant,
}

impl<L: LimitEstimator> Lease<'_, L> {
    /// Time since the slot was admitted.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }

    /// Reports the elapsed time to the estimator, resizes the gate and releases the slot.
    ///
    /// Returns the limit in effect afterwards.
    pub fn complete(self) -> usize {
        let Lease {
            client,
            permit,
            start,
        } = self;
        client.record(start.elapsed());
        drop(permit);
        client.limit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tracing_test::traced_test;

    #[derive(Debug)]
    struct Recorder {
        limit: usize,
        next: usize,
        samples: Vec<Duration>,
    }

    impl LimitEstimator for Recorder {
        fn limit(&self) -> usize {
            self.limit
        }

        fn update(&mut self, round_trip_time: Duration) -> Result<usize, congestion::Error> {
            self.samples.push(round_trip_time);
            self.limit = self.next;
            Ok(self.limit)
        }
    }

    fn recording_client() -> Client<Recorder> {
        Client::with_estimator(Recorder {
            limit: 1,
            next: 2,
            samples: Vec::new(),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_updates_limit_from_elapsed_time() -> Result<(), anyhow::Error> {
        let client = recording_client();
        assert_eq!(client.limit(), 1);
        let value = client
            .run(|| async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, anyhow::Error>(42)
            })
            .await?;
        assert_eq!(value, 42);
        let samples = client.estimator.lock().samples.clone();
        assert_eq!(samples.len(), 1);
        assert!(samples[0] >= Duration::from_secs(1));
        assert!(samples[0] < Duration::from_millis(1010));
        assert_eq!(client.limit(), 2);
        assert_eq!(client.in_flight(), 0);
        assert_eq!(client.available(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_run_failure_skips_update() {
        let client = recording_client();
        let result = client
            .run(|| async { Err::<(), _>(anyhow::anyhow!("test exception")) })
            .await;
        assert_eq!(result.unwrap_err().to_string(), "test exception");
        assert!(client.estimator.lock().samples.is_empty());
        assert_eq!(client.limit(), 1);
        assert_eq!(client.available(), 1);
        assert_eq!(client.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_run_holds_slot_while_working() -> Result<(), anyhow::Error> {
        let client = recording_client();
        let client = &client;
        client
            .run(move || async move {
                assert_eq!(client.in_flight(), 1);
                assert_eq!(client.available(), 0);
                Ok::<_, anyhow::Error>(())
            })
            .await?;
        assert_eq!(client.in_flight(), 0);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_work_releases_slot_without_update() {
        let client = recording_client();
        let cancelled = tokio::time::timeout(
            Duration::from_millis(100),
            client.run(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, anyhow::Error>(())
            }),
        )
        .await;
        assert!(cancelled.is_err());
        assert!(client.estimator.lock().samples.is_empty());
        assert_eq!(client.in_flight(), 0);
        assert_eq!(client.available(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_lease_releases_slot_without_update() -> Result<(), Error> {
        let client = recording_client();
        {
            let lease = client.lease().await?;
            tokio::time::sleep(Duration::from_millis(30)).await;
            assert!(lease.elapsed() >= Duration::from_millis(30));
            assert_eq!(client.in_flight(), 1);
        }
        assert!(client.estimator.lock().samples.is_empty());
        assert_eq!(client.in_flight(), 0);
        assert_eq!(client.limit(), 1);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_lease_reports_latency() -> Result<(), Error> {
        let client = recording_client();
        let lease = client.lease().await?;
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(lease.complete(), 2);
        let samples = client.estimator.lock().samples.clone();
        assert_eq!(samples.len(), 1);
        assert!(samples[0] >= Duration::from_millis(250));
        assert!(samples[0] < Duration::from_millis(260));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn test_zero_latency_sample_is_discarded() -> Result<(), anyhow::Error> {
        let client = Client::new(&ClientConfig::default())?;
        client.run(|| async { Ok::<_, anyhow::Error>(()) }).await?;
        client.run(|| async { Ok::<_, anyhow::Error>(()) }).await?;
        assert!(logs_contain("discarding latency sample"));
        assert_eq!(client.limit(), 10);
        assert_eq!(client.available(), 10);
        Ok(())
    }

    #[tokio::test]
    async fn test_close_rejects_new_work() {
        let client = recording_client();
        client.close();
        let result = client.run(|| async { Ok::<_, anyhow::Error>(()) }).await;
        let error = result.unwrap_err();
        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::Gate(throttle::Error::Closed))
        ));
        assert!(client.estimator.lock().samples.is_empty());
    }

    #[test]
    fn test_new_rejects_unknown_algorithm() {
        let config = ClientConfig {
            algorithm: "invalid".to_string(),
            ..Default::default()
        };
        let error = Client::new(&config).unwrap_err();
        assert!(matches!(
            &error,
            Error::Config(congestion::Error::UnsupportedAlgorithm(name)) if name == "invalid"
        ));
        assert_eq!(error.to_string(), "algorithm 'invalid' not supported");
    }

    #[test]
    fn test_new_starts_gate_at_configured_limit() -> Result<(), Error> {
        let client = Client::new(&ClientConfig {
            vegas: congestion::VegasConfig {
                limit: 25,
                ..Default::default()
            },
            ..Default::default()
        })?;
        assert_eq!(client.limit(), 25);
        assert_eq!(client.available(), 25);
        Ok(())
    }
}
