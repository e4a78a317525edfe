//! Search configuration for the itinerary planner.

use chrono::Duration;

/// Configuration parameters for itinerary search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Minimum stopover between one leg's arrival and the next leg's
    /// departure (minutes). Tighter connections are not explored.
    pub min_stopover_mins: i64,

    /// Maximum stopover between one leg's arrival and the next leg's
    /// departure (minutes). Longer waits are not explored; this is the
    /// only built-in limiter on search breadth.
    pub max_stopover_mins: i64,
}

impl SearchConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(min_stopover_mins: i64, max_stopover_mins: i64) -> Self {
        Self {
            min_stopover_mins,
            max_stopover_mins,
        }
    }

    /// Returns the minimum stopover as a Duration.
    pub fn min_stopover(&self) -> Duration {
        Duration::minutes(self.min_stopover_mins)
    }

    /// Returns the maximum stopover as a Duration.
    pub fn max_stopover(&self) -> Duration {
        Duration::minutes(self.max_stopover_mins)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_stopover_mins: 30,
            max_stopover_mins: 6 * 60,
        }
    }
}
