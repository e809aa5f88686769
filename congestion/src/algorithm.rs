use crate::Error;

/// Names of the available limit estimation algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    #[default]
    Vegas,
}

impl Algorithm {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Vegas => "vegas",
        }
    }
}

impl std::str::FromStr for Algorithm {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vegas" => Ok(Algorithm::Vegas),
            _ => Err(Error::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vegas() {
        assert_eq!("vegas".parse::<Algorithm>().unwrap(), Algorithm::Vegas);
        assert_eq!("Vegas".parse::<Algorithm>().unwrap(), Algorithm::Vegas);
        assert_eq!(Algorithm::default(), Algorithm::Vegas);
        assert_eq!(Algorithm::Vegas.to_string(), "vegas");
    }

    #[test]
    fn test_parse_unknown_algorithm() {
        let error = "invalid".parse::<Algorithm>().unwrap_err();
        assert_eq!(error, Error::UnsupportedAlgorithm("invalid".to_string()));
        assert_eq!(error.to_string(), "algorithm 'invalid' not supported");
    }
}
