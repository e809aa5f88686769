use crate::{Error, LimitEstimator};

/// Lower bound for the `alpha` threshold after every update.
pub const ALPHA_FLOOR: f64 = 2.0;
/// Lower bound for the `beta` threshold after every update.
pub const BETA_FLOOR: f64 = 4.0;
/// Starting limit when none is configured.
pub const LIMIT_DEFAULT: usize = 10;

/// Tuning knobs for [`Vegas`].
///
/// `alpha` and `beta` only apply until the first adjustment; afterwards they are derived from
/// the current limit and floored at [`ALPHA_FLOOR`] and [`BETA_FLOOR`].
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct VegasConfig {
    /// Initial concurrency limit
    pub limit: usize,
    /// Upper bound for the limit (default: unbounded)
    pub limit_max: usize,
    /// Initial queue size below which the limit grows
    pub alpha: f64,
    /// Initial queue size above which the limit shrinks
    pub beta: f64,
}

impl Default for VegasConfig {
    fn default() -> Self {
        Self {
            limit: LIMIT_DEFAULT,
            limit_max: usize::MAX,
            alpha: ALPHA_FLOOR,
            beta: BETA_FLOOR,
        }
    }
}

impl VegasConfig {
    /// Validate configuration and return errors if invalid
    pub fn validate(&self) -> Result<(), Error> {
        if self.limit == 0 {
            return Err(Error::InvalidConfig("limit must be at least 1".to_string()));
        }
        if self.limit > self.limit_max {
            return Err(Error::InvalidConfig(format!(
                "limit {} exceeds limit_max {}",
                self.limit, self.limit_max
            )));
        }
        for (name, value) in [("alpha", self.alpha), ("beta", self.beta)] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if self.alpha > self.beta {
            return Err(Error::InvalidConfig(format!(
                "alpha {} must not exceed beta {}",
                self.alpha, self.beta
            )));
        }
        Ok(())
    }
}

/// Delay-based limit estimator in the spirit of TCP Vegas.
///
/// Additive increase while measured latency stays close to the best one seen, additive
/// decrease once requests appear to be queueing. With a steady latency equal to the minimum the
/// estimator keeps probing upwards until it reaches `limit_max`.
#[derive(Debug, Clone)]
pub struct Vegas {
    limit: usize,
    limit_max: usize,
    min_round_trip_time: Option<std::time::Duration>,
    alpha: f64,
    beta: f64,
}

impl Vegas {
    pub fn new(config: VegasConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            limit: config.limit,
            limit_max: config.limit_max,
            min_round_trip_time: None,
            alpha: config.alpha,
            beta: config.beta,
        })
    }

    #[must_use]
    pub fn limit_max(&self) -> usize {
        self.limit_max
    }

    /// Smallest round-trip time observed so far, `None` before the first sample.
    #[must_use]
    pub fn min_round_trip_time(&self) -> Option<std::time::Duration> {
        self.min_round_trip_time
    }

    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    #[must_use]
    pub fn beta(&self) -> f64 {
        self.beta
    }
}

/// Estimated number of requests queued beyond the baseline latency.
///
/// Never negative as long as `min_rtt <= rtt`.
pub(crate) fn queue_size(limit: usize, min_rtt: f64, rtt: f64) -> f64 {
    limit as f64 * (1.0 - min_rtt / rtt)
}

impl LimitEstimator for Vegas {
    fn limit(&self) -> usize {
        self.limit
    }

    fn update(&mut self, round_trip_time: std::time::Duration) -> Result<usize, Error> {
        if round_trip_time.is_zero() {
            return Err(Error::InvalidRoundTripTime(round_trip_time));
        }
        let min_round_trip_time = match self.min_round_trip_time {
            None => {
                self.min_round_trip_time = Some(round_trip_time);
                tracing::debug!(?round_trip_time, limit = self.limit, "seeded minimum rtt");
                return Ok(self.limit);
            }
            Some(min_round_trip_time) => min_round_trip_time.min(round_trip_time),
        };
        self.min_round_trip_time = Some(min_round_trip_time);
        let queue_size = queue_size(
            self.limit,
            min_round_trip_time.as_secs_f64(),
            round_trip_time.as_secs_f64(),
        );
        if queue_size < self.alpha {
            self.limit = std::cmp::min(self.limit.saturating_add(1), self.limit_max);
        } else if queue_size > self.beta {
            self.limit = std::cmp::max(1, self.limit - 1);
        }
        // thresholds follow the adjusted limit, also when it did not move
        self.alpha = ALPHA_FLOOR.max(self.limit as f64 * 0.1);
        self.beta = BETA_FLOOR.max(self.limit as f64 * 0.2);
        tracing::debug!(
            ?round_trip_time,
            queue_size,
            limit = self.limit,
            alpha = self.alpha,
            beta = self.beta,
            "vegas update"
        );
        Ok(self.limit)
    }
}
