//! Operational carbon from electricity drawn during a task.

use crate::error::{ensure_non_negative, Error, Result};

/// IT-equipment energy in kWh.
pub fn energy_kwh(power_w: f64, duration_hours: f64) -> Result<f64> {
    ensure_non_negative("power_w", power_w)?;
    ensure_non_negative("duration_hours", duration_hours)?;
    Ok(power_w * duration_hours / 1000.0)
}

/// Grams of CO2 for running at `power_w` for `duration_hours` on a grid at
/// `carbon_intensity` gCO2/kWh, with facility overhead `pue`.
pub fn operational_g(power_w: f64, duration_hours: f64, carbon_intensity: f64, pue: f64) -> Result<f64> {
    ensure_non_negative("carbon_intensity", carbon_intensity)?;
    if !pue.is_finite() || pue < 1.0 {
        return Err(Error::invalid(format!("pue must be >= 1.0, got {pue}")));
    }

    Ok(energy_kwh(power_w, duration_hours)? * carbon_intensity * pue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy() {
        assert!((energy_kwh(65.0, 2.0).unwrap() - 0.13).abs() < 1e-12);
    }

    #[test]
    fn test_operational_grams() {
        // 100 W for 10 h = 1 kWh
        let g = operational_g(100.0, 10.0, 500.0, 1.2).unwrap();
        assert!((g - 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_linear_in_intensity() {
        let clean = operational_g(68.9, 1.0, 50.0, 1.2).unwrap();
        let dirty = operational_g(68.9, 1.0, 535.0, 1.2).unwrap();
        assert!((dirty / clean - 535.0 / 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert!(operational_g(65.0, 1.0, -1.0, 1.2).is_err());
        assert!(operational_g(65.0, 1.0, 500.0, 0.8).is_err());
        assert!(operational_g(65.0, -1.0, 500.0, 1.2).is_err());
    }
}
