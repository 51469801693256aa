//! Training session configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Number of progress steps in a session
pub const STEPS: u8 = 10;

/// Progress added per step
pub const STEP_PERCENT: u8 = 100 / STEPS;

/// Minimum number of examples required to start a session
pub const MIN_EXAMPLES: usize = 5;

/// Configuration for the training store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Pause before each progress step, in milliseconds
    pub step_delay_ms: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self { step_delay_ms: 500 }
    }
}

impl TrainingConfig {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    /// Total wall time of an uninterrupted session
    pub fn session_duration(&self) -> Duration {
        self.step_delay() * u32::from(STEPS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: TrainingConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.step_delay(), Duration::from_millis(500));
        assert_eq!(config.session_duration(), Duration::from_secs(5));
        assert_eq!(STEP_PERCENT, 10);
    }
}
