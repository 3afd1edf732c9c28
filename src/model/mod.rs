//! Closed-form carbon model.
//!
//! Each submodule is a pure function of its inputs: aging power draw,
//! carbon debt, embodied amortization, operational carbon, and the
//! evaluator that composes them for a hardware class.

pub mod debt;
pub mod embodied;
pub mod evaluator;
pub mod inventory;
pub mod operational;
pub mod power;

pub use debt::{carbon_debt_ratio, remaining_life_years};
pub use embodied::{amortized_embodied_g, embodied_rate_g_per_hour, HOURS_PER_YEAR};
pub use evaluator::{evaluate_total_carbon, CarbonEstimate, CarbonEvaluator, ClassAssessment};
pub use inventory::{Component, InstanceSpec};
pub use operational::{energy_kwh, operational_g};
pub use power::{power_draw, PowerModel, MAX_DEGRADATION};
