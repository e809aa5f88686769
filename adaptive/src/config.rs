//! Configuration types for adaptive clients

use crate::Error;

/// Client configuration: which estimator to run and how to tune it
///
/// The algorithm is kept as a plain string so configuration can be deserialized as-is; it is
/// validated once, when the client is built.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Estimation algorithm name (default: "vegas")
    pub algorithm: String,
    /// Tuning knobs for the Vegas estimator
    pub vegas: congestion::VegasConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            algorithm: congestion::Algorithm::default().to_string(),
            vegas: congestion::VegasConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Parses the algorithm selector
    pub fn algorithm(&self) -> Result<congestion::Algorithm, Error> {
        Ok(self.algorithm.parse()?)
    }

    /// Validate configuration and return errors if invalid
    pub fn validate(&self) -> Result<(), Error> {
        match self.algorithm()? {
            congestion::Algorithm::Vegas => self.vegas.validate()?,
        }
        Ok(())
    }
}
