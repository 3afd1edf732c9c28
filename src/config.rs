use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Power draw of brand-new hardware; every age class degrades from here.
pub const DEFAULT_BASE_POWER_W: f64 = 65.0;
/// Efficiency loss per year of service (12%/year).
pub const DEFAULT_DEGRADATION_RATE: f64 = 0.12;
pub const DEFAULT_PUE: f64 = 1.2;
/// Extra weight on a freshly manufactured server's embodied carbon.
pub const DEFAULT_NEW_HARDWARE_CARBON_MULTIPLIER: f64 = 2.0;
/// Substituted when a region's live carbon intensity cannot be read (gCO2/kWh).
pub const DEFAULT_CARBON_INTENSITY: f64 = 700.0;
pub const DEFAULT_ALTERNATIVES: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub base_power_w: f64,
    pub degradation_rate: f64,
    pub pue: f64,
    pub new_hardware_carbon_multiplier: f64,
    pub default_carbon_intensity: f64,
    /// Length of the ranked shortlist kept next to the chosen placement.
    pub alternatives: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_power_w: DEFAULT_BASE_POWER_W,
            degradation_rate: DEFAULT_DEGRADATION_RATE,
            pue: DEFAULT_PUE,
            new_hardware_carbon_multiplier: DEFAULT_NEW_HARDWARE_CARBON_MULTIPLIER,
            default_carbon_intensity: DEFAULT_CARBON_INTENSITY,
            alternatives: DEFAULT_ALTERNATIVES,
        }
    }
}

impl ModelConfig {
    pub fn builder() -> ModelConfigBuilder {
        ModelConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        if !self.base_power_w.is_finite() || self.base_power_w <= 0.0 {
            return Err(Error::config("base_power_w must be > 0"));
        }

        if !self.degradation_rate.is_finite() || self.degradation_rate < 0.0 {
            return Err(Error::config("degradation_rate must be >= 0"));
        }

        if !self.pue.is_finite() || self.pue < 1.0 {
            return Err(Error::config("pue must be >= 1.0"));
        }

        if !self.new_hardware_carbon_multiplier.is_finite()
            || self.new_hardware_carbon_multiplier < 1.0
        {
            return Err(Error::config("new_hardware_carbon_multiplier must be >= 1.0"));
        }

        if !self.default_carbon_intensity.is_finite() || self.default_carbon_intensity < 0.0 {
            return Err(Error::config("default_carbon_intensity must be >= 0"));
        }

        if self.alternatives < DEFAULT_ALTERNATIVES {
            return Err(Error::config(format!(
                "alternatives must keep at least {DEFAULT_ALTERNATIVES} candidates"
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ModelConfigBuilder {
    config: ModelConfig,
}

impl ModelConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ModelConfig::default(),
        }
    }

    pub fn base_power_w(mut self, watts: f64) -> Self {
        self.config.base_power_w = watts;
        self
    }

    pub fn degradation_rate(mut self, rate: f64) -> Self {
        self.config.degradation_rate = rate;
        self
    }

    pub fn pue(mut self, pue: f64) -> Self {
        self.config.pue = pue;
        self
    }

    pub fn new_hardware_carbon_multiplier(mut self, multiplier: f64) -> Self {
        self.config.new_hardware_carbon_multiplier = multiplier;
        self
    }

    pub fn default_carbon_intensity(mut self, ci: f64) -> Self {
        self.config.default_carbon_intensity = ci;
        self
    }

    pub fn alternatives(mut self, n: usize) -> Self {
        self.config.alternatives = n;
        self
    }

    pub fn build(self) -> Result<ModelConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
