//! Amortization of manufacturing carbon onto individual tasks.

use super::debt::carbon_debt_ratio;
use crate::error::{ensure_non_negative, ensure_positive, Error, Result};

pub const HOURS_PER_YEAR: f64 = 365.25 * 24.0;

/// Constant attribution rate in g/h: total footprint spread over the full
/// expected lifetime.
pub fn embodied_rate_g_per_hour(total_embodied_kg: f64, expected_lifetime_years: f64) -> Result<f64> {
    ensure_non_negative("total_embodied_kg", total_embodied_kg)?;
    ensure_positive("expected_lifetime_years", expected_lifetime_years)?;
    Ok(total_embodied_kg * 1000.0 / (expected_lifetime_years * HOURS_PER_YEAR))
}

/// Embodied carbon (grams) attributed to a task of `duration_hours`.
///
/// The raw share uses the full lifetime, not the remaining one, and is then
/// scaled by the carbon debt ratio so older hardware carries less.
pub fn amortized_embodied_g(
    total_embodied_kg: f64,
    age_years: f64,
    expected_lifetime_years: f64,
    duration_hours: f64,
) -> Result<f64> {
    ensure_non_negative("duration_hours", duration_hours)?;

    let rate = embodied_rate_g_per_hour(total_embodied_kg, expected_lifetime_years)?;
    let debt_ratio = carbon_debt_ratio(age_years, expected_lifetime_years)?;

    // Fully amortized hardware owes nothing, however long the task.
    if debt_ratio == 0.0 {
        return Ok(0.0);
    }

    let raw_g = rate * duration_hours;
    if !raw_g.is_finite() {
        return Err(Error::invalid(format!(
            "embodied share overflows for {total_embodied_kg}kg over {duration_hours}h"
        )));
    }
    let embodied_g = raw_g * debt_ratio;

    assert!(
        (0.0..=raw_g).contains(&embodied_g),
        "embodied {embodied_g}g outside [0, {raw_g}] for a {age_years}y server"
    );

    Ok(embodied_g)
}
