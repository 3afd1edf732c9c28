//! Power draw of aging hardware.

use crate::config::ModelConfig;
use crate::error::{ensure_non_negative, Result};

/// Ceiling on age-related power increase (60% above the new-hardware draw).
pub const MAX_DEGRADATION: f64 = 0.60;

/// Power draw in watts for hardware of the given age.
///
/// Degradation is linear in age and saturates at [`MAX_DEGRADATION`]:
/// `base * (1 + min(rate * age, 0.60))`.
pub fn power_draw(base_power_w: f64, age_years: f64, degradation_rate_per_year: f64) -> Result<f64> {
    ensure_non_negative("base_power_w", base_power_w)?;
    ensure_non_negative("age_years", age_years)?;
    ensure_non_negative("degradation_rate_per_year", degradation_rate_per_year)?;

    let degradation = (degradation_rate_per_year * age_years).min(MAX_DEGRADATION);
    let watts = base_power_w * (1.0 + degradation);

    assert!(
        watts <= base_power_w * (1.0 + MAX_DEGRADATION),
        "power {watts:.3}W exceeds the 60% degradation cap for base {base_power_w}W"
    );

    Ok(watts)
}

/// Aging power model bound to one baseline and degradation rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerModel {
    pub base_power_w: f64,
    pub degradation_rate: f64,
}

impl From<&ModelConfig> for PowerModel {
    fn from(config: &ModelConfig) -> Self {
        Self {
            base_power_w: config.base_power_w,
            degradation_rate: config.degradation_rate,
        }
    }
}

impl PowerModel {
    pub fn new(base_power_w: f64, degradation_rate: f64) -> Self {
        Self {
            base_power_w,
            degradation_rate,
        }
    }

    /// Draw at the model's own degradation rate.
    pub fn at_age(&self, age_years: f64) -> Result<f64> {
        power_draw(self.base_power_w, age_years, self.degradation_rate)
    }

    /// Draw under an alternative aging assumption.
    pub fn at_age_with_rate(&self, age_years: f64, degradation_rate: f64) -> Result<f64> {
        power_draw(self.base_power_w, age_years, degradation_rate)
    }

    /// Ratio of aged draw to new-hardware draw.
    pub fn degradation_factor(&self, age_years: f64) -> Result<f64> {
        if self.base_power_w == 0.0 {
            return Ok(1.0);
        }
        Ok(self.at_age(age_years)? / self.base_power_w)
    }
}
