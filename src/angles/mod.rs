//! Height correction and mil/degree conversion.

use crate::config::{STEEP_DOWNHILL_DAMPING, STEEP_DOWNHILL_THRESHOLD};
use crate::util::round_to;

/// Adjust a table elevation (mils) for the target being `height_difference`
/// meters above (+) or below (-) the gun. `d_elev` is mils per 100m.
/// Below -100m the correction is damped by 0.6; these constants are
/// empirical and match the reference tables.
pub fn apply_height_correction(base_elevation: f64, height_difference: f64, d_elev: f64) -> f64 {
    let mut correction = (height_difference / 100.0) * d_elev;
    if height_difference < STEEP_DOWNHILL_THRESHOLD {
        correction *= STEEP_DOWNHILL_DAMPING;
    }
    (base_elevation - correction).round()
}

/// Degrees to whole mils.
pub fn degrees_to_mils(degrees: f64, mils_per_degree: f64) -> f64 {
    (degrees * mils_per_degree).round()
}

/// Mils to degrees, kept to 2 decimal places.
pub fn mils_to_degrees(mils: f64, mils_per_degree: f64) -> f64 {
    if mils_per_degree == 0.0 {
        return 0.0;
    }
    round_to(mils / mils_per_degree, 2)
}

/// Wrap an absolute mil bearing into `[0, mils_per_circle)`.
pub fn normalize_mils(mils: f64, mils_per_circle: f64) -> f64 {
    let m = mils.rem_euclid(mils_per_circle);
    if m >= mils_per_circle {
        0.0
    } else {
        m
    }
}

/// Wrap a mil difference into `(-half, +half]` of the weapon's circle.
pub fn normalize_mil_delta(delta: f64, mils_per_circle: f64) -> f64 {
    let half = mils_per_circle / 2.0;
    let mut d = delta.rem_euclid(mils_per_circle);
    if d > half {
        d -= mils_per_circle;
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn height_correction_fixtures() {
        assert_eq!(apply_height_correction(1000.0, 0.0, 10.0), 1000.0);
        assert_eq!(apply_height_correction(1000.0, 200.0, 10.0), 980.0);
        // damped: -20 * 0.6 = -12
        assert_eq!(apply_height_correction(1000.0, -200.0, 10.0), 1012.0);
    }

    #[test]
    fn damping_starts_below_minus_100() {
        assert_eq!(apply_height_correction(1000.0, -100.0, 10.0), 1010.0);
        assert_eq!(apply_height_correction(1000.0, -101.0, 10.0), 1006.0);
    }

    #[test]
    fn result_is_rounded() {
        assert_eq!(apply_height_correction(1000.4, 13.0, 10.0), 999.0);
    }

    #[test]
    fn mil_conversions() {
        assert_eq!(degrees_to_mils(90.0, 6400.0 / 360.0), 1600.0);
        assert_eq!(degrees_to_mils(45.0, 6000.0 / 360.0), 750.0);
        assert_eq!(mils_to_degrees(1600.0, 6400.0 / 360.0), 90.0);
        assert_eq!(mils_to_degrees(1000.0, 17.7778), 56.25);
    }

    #[test]
    fn mil_wrapping() {
        assert_eq!(normalize_mils(6400.0, 6400.0), 0.0);
        assert_eq!(normalize_mils(-100.0, 6000.0), 5900.0);
        assert_eq!(normalize_mil_delta(3300.0, 6400.0), -3100.0);
        assert_eq!(normalize_mil_delta(-3200.0, 6400.0), 3200.0);
        assert_eq!(normalize_mil_delta(3200.0, 6400.0), 3200.0);
        assert_eq!(normalize_mil_delta(-50.0, 6000.0), -50.0);
        assert_eq!(normalize_mil_delta(5990.0, 6000.0), -10.0);
    }
}
