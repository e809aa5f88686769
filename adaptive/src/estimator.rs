use congestion::{Algorithm, LimitEstimator};

use crate::{ClientConfig, Error};

/// The estimator selected by [`ClientConfig::algorithm()`].
///
/// Selection happens once when the client is built; updates dispatch on the variant without
/// looking at the configuration again.
#[derive(Debug, Clone)]
pub enum Estimator {
    Vegas(congestion::Vegas),
}

impl Estimator {
    pub fn from_config(config: &ClientConfig) -> Result<Self, Error> {
        let estimator = match config.algorithm()? {
            Algorithm::Vegas => Estimator::Vegas(congestion::Vegas::new(config.vegas)?),
        };
        Ok(estimator)
    }

    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Estimator::Vegas(_) => Algorithm::Vegas,
        }
    }
}

impl LimitEstimator for Estimator {
    fn limit(&self) -> usize {
        match self {
            Estimator::Vegas(vegas) => vegas.limit(),
        }
    }

    fn update(&mut self, round_trip_time: std::time::Duration) -> Result<usize, congestion::Error> {
        match self {
            Estimator::Vegas(vegas) => vegas.update(round_trip_time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_from_config_builds_vegas() {
        let config = ClientConfig {
            vegas: congestion::VegasConfig {
                limit: 3,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut estimator = Estimator::from_config(&config).unwrap();
        assert_eq!(estimator.algorithm(), Algorithm::Vegas);
        assert_eq!(estimator.limit(), 3);
        assert_eq!(estimator.update(Duration::from_millis(10)).unwrap(), 3);
        assert_eq!(estimator.update(Duration::from_millis(10)).unwrap(), 4);
    }

    #[test]
    fn test_from_config_rejects_unknown_algorithm() {
        let config = ClientConfig {
            algorithm: "reno".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            Estimator::from_config(&config),
            Err(Error::Config(congestion::Error::UnsupportedAlgorithm(name))) if name == "reno"
        ));
    }
}
