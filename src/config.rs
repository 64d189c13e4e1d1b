use std::fmt;

use crate::{
    core::Bytes,
    policy::{PolicyKind, UnknownPolicy},
};

/// Rejected before any simulation starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    NonPositiveMemory(i64),
    UnknownPolicy(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveMemory(value) => {
                write!(f, "total memory must be a positive integer, got {value}")
            }
            Self::UnknownPolicy(value) => {
                write!(f, "unknown placement policy '{value}', expected first-fit or best-fit")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<UnknownPolicy> for ConfigError {
    fn from(err: UnknownPolicy) -> Self {
        Self::UnknownPolicy(err.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    pub total_memory: Bytes,
    pub policy: PolicyKind,
}

impl SimConfig {
    pub fn new(total_memory: i64, policy: &str) -> Result<Self, ConfigError> {
        let policy = policy.parse::<PolicyKind>()?;
        Self::with_policy(total_memory, policy)
    }

    pub fn with_policy(total_memory: i64, policy: PolicyKind) -> Result<Self, ConfigError> {
        let total_memory = Bytes::try_from(total_memory)
            .ok()
            .filter(|&m| m > 0)
            .ok_or(ConfigError::NonPositiveMemory(total_memory))?;
        Ok(Self {
            total_memory,
            policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_config() {
        let config = SimConfig::new(1024, "-b").unwrap();
        assert_eq!(config.total_memory, 1024);
        assert_eq!(config.policy, PolicyKind::BestFit);
    }

    #[test]
    fn rejects_non_positive_memory() {
        assert_eq!(
            SimConfig::new(0, "first-fit"),
            Err(ConfigError::NonPositiveMemory(0))
        );
        assert_eq!(
            SimConfig::with_policy(-5, PolicyKind::FirstFit),
            Err(ConfigError::NonPositiveMemory(-5))
        );
    }

    #[test]
    fn rejects_unknown_policy() {
        let err = SimConfig::new(100, "-w").unwrap_err();
        assert_eq!(err, ConfigError::UnknownPolicy("-w".into()));
        assert!(err.to_string().contains("'-w'"));
    }
}
