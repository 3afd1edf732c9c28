//! Operational + embodied carbon for one hardware class on one grid.

use super::debt::carbon_debt_ratio;
use super::embodied::amortized_embodied_g;
use super::operational::operational_g;
use super::power::PowerModel;
use crate::config::ModelConfig;
use crate::error::{ensure_non_negative, Result};
use crate::fleet::HardwareAgeClass;
use serde::Serialize;

/// Carbon attributed to a single task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CarbonEstimate {
    pub operational_co2_g: f64,
    pub embodied_co2_g: f64,
    pub total_co2_g: f64,
}

impl CarbonEstimate {
    fn new(operational_co2_g: f64, embodied_co2_g: f64) -> Self {
        Self {
            operational_co2_g,
            embodied_co2_g,
            total_co2_g: operational_co2_g + embodied_co2_g,
        }
    }

    /// Operational share of the total, in percent.
    pub fn operational_share(&self) -> f64 {
        if self.total_co2_g > 0.0 {
            self.operational_co2_g / self.total_co2_g * 100.0
        } else {
            0.0
        }
    }

    /// Embodied share of the total, in percent.
    pub fn embodied_share(&self) -> f64 {
        if self.total_co2_g > 0.0 {
            self.embodied_co2_g / self.total_co2_g * 100.0
        } else {
            0.0
        }
    }
}

/// Full breakdown for a class, including the intermediate power and debt
/// figures the selector reports alongside the estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassAssessment {
    pub estimate: CarbonEstimate,
    pub power_w: f64,
    pub debt_ratio: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct CarbonEvaluator<'a> {
    config: &'a ModelConfig,
    power: PowerModel,
}

impl<'a> CarbonEvaluator<'a> {
    pub fn new(config: &'a ModelConfig) -> Self {
        Self {
            config,
            power: PowerModel::from(config),
        }
    }

    pub fn config(&self) -> &ModelConfig {
        self.config
    }

    pub fn power_model(&self) -> &PowerModel {
        &self.power
    }

    /// Draw of a class, derived from the new-hardware baseline.
    pub fn power_w(&self, class: &HardwareAgeClass) -> Result<f64> {
        self.power.at_age(class.age_years)
    }

    pub fn evaluate(
        &self,
        class: &HardwareAgeClass,
        duration_s: f64,
        carbon_intensity: f64,
    ) -> Result<CarbonEstimate> {
        Ok(self.assess(class, duration_s, carbon_intensity)?.estimate)
    }

    pub fn assess(
        &self,
        class: &HardwareAgeClass,
        duration_s: f64,
        carbon_intensity: f64,
    ) -> Result<ClassAssessment> {
        ensure_non_negative("duration_seconds", duration_s)?;
        let duration_hours = duration_s / 3600.0;

        let power_w = self.power_w(class)?;
        let operational = operational_g(power_w, duration_hours, carbon_intensity, self.config.pue)?;
        let embodied = amortized_embodied_g(
            class.total_embodied_carbon_kg,
            class.age_years,
            class.expected_lifetime_years,
            duration_hours,
        )?;
        let debt_ratio = carbon_debt_ratio(class.age_years, class.expected_lifetime_years)?;

        Ok(ClassAssessment {
            estimate: CarbonEstimate::new(operational, embodied),
            power_w,
            debt_ratio,
        })
    }
}

/// `(operational, embodied, total)` for `class` under `config`.
pub fn evaluate_total_carbon(
    config: &ModelConfig,
    class: &HardwareAgeClass,
    duration_s: f64,
    carbon_intensity: f64,
) -> Result<CarbonEstimate> {
    CarbonEvaluator::new(config).evaluate(class, duration_s, carbon_intensity)
}
