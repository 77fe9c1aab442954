//! Engine tuning knobs
//!
//! Everything here has a sensible default; the CLI can load overrides from
//! a TOML file.

use diyplan_core::{clock, TimeRange};
use serde::{Deserialize, Serialize};

/// Solver-wide settings that are not part of a scheduling request
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Days past the drop-dead date the planning horizon still covers, so
    /// late placements surface as deadline conflicts instead of vanishing
    pub overrun_days: i64,
    /// Upper bound for the deadline-extension remediation search
    pub max_extension_days: i64,
    /// Night starts at this time of day ("HH:MM")
    #[serde(with = "clock")]
    pub night_start: u16,
    /// Night ends at this time of day ("HH:MM")
    #[serde(with = "clock")]
    pub night_end: u16,
    /// Confidence above which the risk buffer is halved
    pub high_confidence: f64,
    /// Fraction of the buffer kept for high-confidence tasks
    pub confident_buffer_factor: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            overrun_days: 28,
            max_extension_days: 180,
            night_start: 22 * 60,
            night_end: 6 * 60,
            high_confidence: 0.85,
            confident_buffer_factor: 0.5,
        }
    }
}

impl EngineConfig {
    /// Daytime window outside the night hours
    pub fn day_window(&self) -> TimeRange {
        TimeRange::new(self.night_end, self.night_start)
    }
}
