use crate::{Error, LimitEstimator};

/// One replayed sample and the limit the estimator answered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub round_trip_time: std::time::Duration,
    pub limit: usize,
}

/// Feeds `samples` to `estimator` in order and records the limit after each one.
///
/// Stops at the first sample the estimator rejects and returns its error.
pub fn replay<L, I>(estimator: &mut L, samples: I) -> Result<Vec<Step>, Error>
where
    L: LimitEstimator + ?Sized,
    I: IntoIterator<Item = std::time::Duration>,
{
    samples
        .into_iter()
        .map(|round_trip_time| {
            let limit = estimator.update(round_trip_time)?;
            Ok(Step {
                round_trip_time,
                limit,
            })
        })
        .collect()
}
