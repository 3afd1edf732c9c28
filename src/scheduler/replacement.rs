//! Hardware replacement: when does a new, more efficient server earn back
//! its manufacturing carbon?

use crate::config::ModelConfig;
use crate::error::{ensure_non_negative, Result};
use crate::fleet::HardwareAgeClass;
use crate::intensity::BlendedIntensity;
use crate::model::{carbon_debt_ratio, remaining_life_years, CarbonEvaluator, HOURS_PER_YEAR};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerSnapshot {
    pub class: String,
    pub age_years: f64,
    pub power_w: f64,
    pub debt_ratio: f64,
    pub remaining_life_years: f64,
}

/// Break-even time in several units; infinite when never reached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BreakEven {
    pub hours: f64,
    pub days: f64,
    pub years: f64,
}

impl BreakEven {
    fn from_hours(hours: f64) -> Self {
        Self {
            hours,
            days: hours / 24.0,
            years: hours / HOURS_PER_YEAR,
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.hours.is_finite()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplacementAnalysis {
    pub region: String,
    pub carbon_intensity: BlendedIntensity,
    pub old_server: ServerSnapshot,
    pub new_server: ServerSnapshot,
    pub new_hardware_carbon_multiplier: f64,
    pub break_even: BreakEven,
    pub should_replace: bool,
    /// Run time over which the lifetime totals below are compared.
    pub horizon_hours: f64,
    pub old_total_co2_g: f64,
    pub new_total_co2_g: f64,
    /// Positive when the new server emits less over the horizon.
    pub carbon_difference_g: f64,
    pub carbon_savings_percent: f64,
    pub reasoning: String,
}

#[derive(Debug, Clone, Copy)]
pub struct BreakEvenAnalyzer<'a> {
    evaluator: CarbonEvaluator<'a>,
}

impl<'a> BreakEvenAnalyzer<'a> {
    pub fn new(config: &'a ModelConfig) -> Self {
        Self {
            evaluator: CarbonEvaluator::new(config),
        }
    }

    fn config(&self) -> &ModelConfig {
        self.evaluator.config()
    }

    /// Run hours after which replacing `old` with `new` is carbon-neutral.
    ///
    /// The new server's penalty is its full footprint times the new-hardware
    /// multiplier, less the debt the old server still carries. Returns
    /// `f64::INFINITY` when the new server saves no operational carbon.
    pub fn break_even_hours(
        &self,
        old: &HardwareAgeClass,
        new: &HardwareAgeClass,
        carbon_intensity: f64,
    ) -> Result<f64> {
        ensure_non_negative("carbon_intensity", carbon_intensity)?;
        let config = self.config();

        let old_remaining_g = old.total_embodied_carbon_kg
            * 1000.0
            * carbon_debt_ratio(old.age_years, old.expected_lifetime_years)?;
        let new_penalty_g = new.total_embodied_carbon_kg * 1000.0 * config.new_hardware_carbon_multiplier;
        let embodied_diff_g = new_penalty_g - old_remaining_g;

        let old_kw = self.evaluator.power_w(old)? / 1000.0;
        let new_kw = self.evaluator.power_w(new)? / 1000.0;
        let savings_g_per_hour = (old_kw - new_kw) * carbon_intensity * config.pue;

        if savings_g_per_hour <= 0.0 {
            return Ok(f64::INFINITY);
        }

        // A negative difference means replacement pays off immediately.
        Ok((embodied_diff_g / savings_g_per_hour).max(0.0))
    }

    pub fn analyze(
        &self,
        region: &str,
        old: &HardwareAgeClass,
        new: &HardwareAgeClass,
        intensity: BlendedIntensity,
    ) -> Result<ReplacementAnalysis> {
        let ci = intensity.value;
        let break_even = BreakEven::from_hours(self.break_even_hours(old, new, ci)?);

        let old_remaining_years = remaining_life_years(old.age_years, old.expected_lifetime_years)?;
        let remaining_hours = old_remaining_years * HOURS_PER_YEAR;
        let should_replace = break_even.hours < remaining_hours;

        let horizon_hours = if should_replace || !break_even.is_reachable() {
            remaining_hours
        } else {
            break_even.hours
        };

        let old_total = self.evaluator.evaluate(old, horizon_hours * 3600.0, ci)?.total_co2_g;
        let new_total = self.evaluator.evaluate(new, horizon_hours * 3600.0, ci)?.total_co2_g;
        let carbon_difference_g = old_total - new_total;
        let carbon_savings_percent = if old_total > 0.0 {
            carbon_difference_g / old_total * 100.0
        } else {
            0.0
        };

        let reasoning = if should_replace {
            format!(
                "Replace now: the new server breaks even after {:.1} days, within the old server's {:.2} remaining years",
                break_even.days, old_remaining_years
            )
        } else if !break_even.is_reachable() {
            "Keep the old server: the replacement draws no less power, so its embodied carbon is never recovered"
                .to_string()
        } else {
            format!(
                "Keep the old server: break-even after {:.1} days exceeds its {:.2} remaining years",
                break_even.days, old_remaining_years
            )
        };

        tracing::info!(
            region,
            old = %old.name,
            new = %new.name,
            break_even_hours = break_even.hours,
            should_replace,
            "replacement analysed"
        );

        Ok(ReplacementAnalysis {
            region: region.to_string(),
            carbon_intensity: intensity,
            old_server: self.snapshot(old)?,
            new_server: self.snapshot(new)?,
            new_hardware_carbon_multiplier: self.config().new_hardware_carbon_multiplier,
            break_even,
            should_replace,
            horizon_hours,
            old_total_co2_g: old_total,
            new_total_co2_g: new_total,
            carbon_difference_g,
            carbon_savings_percent,
            reasoning,
        })
    }

    fn snapshot(&self, class: &HardwareAgeClass) -> Result<ServerSnapshot> {
        Ok(ServerSnapshot {
            class: class.name.clone(),
            age_years: class.age_years,
            power_w: self.evaluator.power_w(class)?,
            debt_ratio: carbon_debt_ratio(class.age_years, class.expected_lifetime_years)?,
            remaining_life_years: remaining_life_years(class.age_years, class.expected_lifetime_years)?,
        })
    }
}
