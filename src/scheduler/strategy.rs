//! Strategy weightings that turn a candidate's carbon, latency and cost
//! into one comparable score (lower is better).

use crate::error::Error;
use crate::model::CarbonEstimate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Steers toward hardware whose manufacturing carbon is mostly paid off.
    EmbodiedPrioritized,
    /// Weighs operational and embodied carbon equally.
    Balanced,
    /// Grid-only view; embodied carbon is reported but never scored.
    OperationalOnly,
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::EmbodiedPrioritized
    }
}

/// What a strategy needs to know about a candidate.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInputs {
    pub estimate: CarbonEstimate,
    pub debt_ratio: f64,
    pub latency_ms: f64,
    pub cost_factor: f64,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [
        Strategy::EmbodiedPrioritized,
        Strategy::Balanced,
        Strategy::OperationalOnly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::EmbodiedPrioritized => "embodied_prioritized",
            Strategy::Balanced => "balanced",
            Strategy::OperationalOnly => "operational_only",
        }
    }

    pub fn score(self, inputs: &ScoreInputs) -> f64 {
        let latency_term = 0.2 * (inputs.latency_ms / 1000.0);
        let cost_term = 0.1 * inputs.cost_factor;
        let estimate = &inputs.estimate;

        match self {
            // The debt term (x1000) dominates for short tasks.
            Strategy::EmbodiedPrioritized => {
                0.4 * estimate.total_co2_g + 0.3 * (inputs.debt_ratio * 1000.0) + latency_term + cost_term
            }
            Strategy::Balanced => {
                0.35 * estimate.operational_co2_g + 0.35 * estimate.embodied_co2_g + latency_term + cost_term
            }
            Strategy::OperationalOnly => 0.7 * estimate.operational_co2_g + latency_term + cost_term,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "embodied_prioritized" => Ok(Strategy::EmbodiedPrioritized),
            "balanced" => Ok(Strategy::Balanced),
            "operational_only" => Ok(Strategy::OperationalOnly),
            other => Err(Error::UnknownStrategy(other.to_string())),
        }
    }
}
