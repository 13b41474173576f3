//! Directional terrain-slope effects on spread rate.
//!
//! The head-fire spread rate at each front vertex is scaled by a factor that
//! depends on the angle between the vertex's propagation heading and the
//! upslope azimuth. Upslope propagation uses the ST-X-3 spread factor capped
//! per Butler (2007); downslope propagation is mildly attenuated per
//! Anderson (1983).
//!
//! Aspect follows the terrain convention: the azimuth of steepest *descent*.
//! The upslope azimuth is therefore `aspect + 180°`.
//!
//! # References
//! - Forestry Canada (1992). Report ST-X-3, Eq. 39
//! - Butler, B.W. et al. (2007). Influence of slope on fire spread rate
//! - Anderson, H.E. (1983). Predicting wind-driven wild land fire size and shape

/// Cap on the upslope spread factor (Butler 2007).
pub const MAX_SLOPE_FACTOR: f64 = 5.0;

/// Floor on the downslope attenuation (Anderson 1983).
const MIN_DOWNSLOPE_FACTOR: f64 = 0.3;

/// ST-X-3 spread factor for a given slope (percent rise), capped.
///
/// SF = e^(3.533·(s/100)^1.2), clamped to [`MAX_SLOPE_FACTOR`].
pub fn slope_factor(slope_percent: f64) -> f64 {
    if slope_percent <= 0.0 {
        return 1.0;
    }
    (3.533 * (slope_percent / 100.0).powf(1.2))
        .exp()
        .min(MAX_SLOPE_FACTOR)
}

/// Directional spread-rate multiplier for a vertex propagating along
/// `heading` (degrees azimuth) over terrain of `slope_percent` with the
/// given `aspect` (azimuth of steepest descent, degrees).
///
/// Identically 1.0 on flat ground. Directly upslope it equals
/// [`slope_factor`]; cross-slope it is 1.0; directly downslope it bottoms
/// out at the Anderson floor.
pub fn directional_slope_factor(heading: f64, slope_percent: f64, aspect: f64) -> f64 {
    if slope_percent <= 0.0 {
        return 1.0;
    }
    let upslope = aspect + 180.0;
    let alignment = ((heading - upslope).to_radians()).cos();
    if alignment >= 0.0 {
        1.0 + (slope_factor(slope_percent) - 1.0) * alignment
    } else {
        (1.0 - 0.3 * (slope_percent / 30.0) * alignment.abs()).max(MIN_DOWNSLOPE_FACTOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_ground_is_identity() {
        for heading in [0.0, 45.0, 90.0, 180.0, 270.0] {
            assert_eq!(directional_slope_factor(heading, 0.0, 90.0), 1.0);
        }
    }

    #[test]
    fn test_slope_factor_reference_points() {
        // 30% slope: e^(3.533·0.3^1.2) ≈ 2.30
        assert_relative_eq!(slope_factor(30.0), 2.30, max_relative = 0.01);
        assert_eq!(slope_factor(0.0), 1.0);
    }

    #[test]
    fn test_steep_slope_hits_butler_cap() {
        assert_eq!(slope_factor(100.0), MAX_SLOPE_FACTOR);
        assert_eq!(slope_factor(200.0), MAX_SLOPE_FACTOR);
    }

    #[test]
    fn test_directly_upslope_gets_full_factor() {
        // Aspect 270 descends west, so ascent is toward 90
        let f = directional_slope_factor(90.0, 30.0, 270.0);
        assert_relative_eq!(f, slope_factor(30.0));
    }

    #[test]
    fn test_cross_slope_is_neutral() {
        let f = directional_slope_factor(0.0, 30.0, 270.0);
        assert_relative_eq!(f, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_directly_downslope_attenuates() {
        let f = directional_slope_factor(270.0, 30.0, 270.0);
        assert_relative_eq!(f, 0.7, max_relative = 0.01);
        assert!(f >= MIN_DOWNSLOPE_FACTOR);
    }

    #[test]
    fn test_downslope_floor() {
        // Very steep downslope bottoms out at the Anderson floor
        let f = directional_slope_factor(270.0, 120.0, 270.0);
        assert_eq!(f, MIN_DOWNSLOPE_FACTOR);
    }

    #[test]
    fn test_factor_never_exceeds_cap() {
        for slope in [10.0, 40.0, 80.0, 150.0] {
            for heading in 0..36 {
                let f = directional_slope_factor(f64::from(heading) * 10.0, slope, 180.0);
                assert!(f <= MAX_SLOPE_FACTOR);
                assert!(f >= MIN_DOWNSLOPE_FACTOR);
            }
        }
    }
}
