//! Configuration for schedule computation.

use std::time::Duration;

/// Upper consumption percentage still reported as green.
pub const GREEN_LIMIT: f64 = 33.0;
/// Upper consumption percentage still reported as yellow.
pub const YELLOW_LIMIT: f64 = 66.0;

/// Engine configuration shared by every recomputation.
#[derive(Clone, Debug)]
pub struct CcpmConfig {
    /// Multiplier applied to the root-sum-of-squares of chain durations.
    pub buffer_factor: f64,
    /// Maximum number of root-to-sink paths before the graph is rejected.
    pub max_paths: usize,
    /// Wall-clock budget for path enumeration (None = unlimited).
    pub enumeration_deadline: Option<Duration>,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    pub verbosity: u8,
}

impl Default for CcpmConfig {
    fn default() -> Self {
        Self {
            buffer_factor: 0.5,
            max_paths: 100_000,
            enumeration_deadline: None,
            verbosity: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = CcpmConfig::default();
        assert!((config.buffer_factor - 0.5).abs() < 1e-9);
        assert_eq!(config.max_paths, 100_000);
        assert!(config.enumeration_deadline.is_none());
        assert_eq!(config.verbosity, 0);
    }
}
