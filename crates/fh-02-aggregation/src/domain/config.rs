//! Window geometry and ranking limits.

use shared_types::{
    Ticks, MAX_LEADERBOARD_ENTRIES, MAX_SAMPLES, TICKS_PER_MINUTE, TICKS_PER_SECOND,
};

use super::errors::AggregationError;

pub const DEFAULT_WINDOW: Ticks = 10 * TICKS_PER_MINUTE;
pub const DEFAULT_HOP: Ticks = TICKS_PER_MINUTE;
pub const DEFAULT_DISORDER: Ticks = 5 * TICKS_PER_SECOND;
pub const DEFAULT_PUNCTUATION: Ticks = TICKS_PER_SECOND;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationConfig {
    /// Width of tumbling and hopping windows.
    pub window: Ticks,
    /// Hopping window stride; also the leaderboard cadence.
    pub hop: Ticks,
    /// How far behind the highest seen time an event may arrive unadjusted.
    pub disorder: Ticks,
    /// Watermark granularity.
    pub punctuation: Ticks,
    pub max_samples: usize,
    pub max_entries: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            hop: DEFAULT_HOP,
            disorder: DEFAULT_DISORDER,
            punctuation: DEFAULT_PUNCTUATION,
            max_samples: MAX_SAMPLES,
            max_entries: MAX_LEADERBOARD_ENTRIES,
        }
    }
}

impl AggregationConfig {
    pub fn validate(&self) -> Result<(), AggregationError> {
        if self.window <= 0 || self.hop <= 0 || self.punctuation <= 0 {
            return Err(AggregationError::InvalidConfig(
                "window, hop and punctuation must be positive".into(),
            ));
        }
        if self.window % self.hop != 0 {
            return Err(AggregationError::InvalidConfig(format!(
                "hop {} does not divide window {}",
                self.hop, self.window
            )));
        }
        if self.disorder < 0 {
            return Err(AggregationError::InvalidConfig(
                "disorder must not be negative".into(),
            ));
        }
        if self.max_samples == 0 || self.max_entries == 0 {
            return Err(AggregationError::InvalidConfig(
                "sample and entry limits must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(AggregationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_hop_must_divide_window() {
        let config = AggregationConfig {
            hop: 7 * TICKS_PER_MINUTE,
            ..AggregationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AggregationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let config = AggregationConfig {
            punctuation: 0,
            ..AggregationConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
