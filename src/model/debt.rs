//! Carbon debt: the share of manufacturing carbon not yet paid off by use.

use crate::error::{ensure_non_negative, ensure_positive, Result};

/// Remaining-amortization fraction `max(0, (L - age) / L)`.
///
/// A brand-new server owes its whole footprint (1.0); at or past the end of
/// its expected lifetime it owes nothing (0.0).
pub fn carbon_debt_ratio(age_years: f64, expected_lifetime_years: f64) -> Result<f64> {
    ensure_non_negative("age_years", age_years)?;
    ensure_positive("expected_lifetime_years", expected_lifetime_years)?;

    let ratio = if age_years >= expected_lifetime_years {
        0.0
    } else {
        (expected_lifetime_years - age_years) / expected_lifetime_years
    };

    assert!(
        (0.0..=1.0).contains(&ratio),
        "carbon debt ratio {ratio} outside [0, 1] for age {age_years}y / lifetime {expected_lifetime_years}y"
    );

    Ok(ratio)
}

/// Years of service left before the footprint is fully amortized.
pub fn remaining_life_years(age_years: f64, expected_lifetime_years: f64) -> Result<f64> {
    ensure_non_negative("age_years", age_years)?;
    ensure_positive("expected_lifetime_years", expected_lifetime_years)?;
    Ok((expected_lifetime_years - age_years).max(0.0))
}
