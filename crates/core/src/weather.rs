use serde::{Deserialize, Serialize};

use crate::error::FireGrowthError;

/// Daily fire-weather observation driving the FWI System.
///
/// Wind direction follows the meteorological convention: it names the
/// direction the wind blows *from*, so a 270° wind is a westerly and pushes
/// the head fire toward 90° (east).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    /// 10 m open wind speed (km/h)
    pub wind_speed: f64,
    /// Direction the wind blows from (degrees, meteorological)
    pub wind_direction: f64,
    /// Air temperature (°C)
    pub temperature: f64,
    /// Relative humidity (%)
    pub relative_humidity: f64,
    /// 24-hour accumulated precipitation (mm)
    pub precipitation_24h: f64,
}

impl Weather {
    /// Reject observations outside physical ranges.
    pub fn validate(&self) -> Result<(), FireGrowthError> {
        let fields = [
            ("wind_speed", self.wind_speed),
            ("wind_direction", self.wind_direction),
            ("temperature", self.temperature),
            ("relative_humidity", self.relative_humidity),
            ("precipitation_24h", self.precipitation_24h),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(FireGrowthError::config(format!(
                    "weather field {name} must be finite, got {value}"
                )));
            }
        }
        if self.wind_speed < 0.0 {
            return Err(FireGrowthError::config(format!(
                "wind_speed must be non-negative, got {}",
                self.wind_speed
            )));
        }
        // Supersaturated readings are recoverable and cap at 100% in the
        // moisture codes; only negative humidity is rejected.
        if self.relative_humidity < 0.0 {
            return Err(FireGrowthError::config(format!(
                "relative_humidity must be non-negative, got {}",
                self.relative_humidity
            )));
        }
        if self.temperature < -50.0 {
            return Err(FireGrowthError::config(format!(
                "temperature below -50°C is unphysical, got {}",
                self.temperature
            )));
        }
        if self.precipitation_24h < 0.0 {
            return Err(FireGrowthError::config(format!(
                "precipitation_24h must be non-negative, got {}",
                self.precipitation_24h
            )));
        }
        Ok(())
    }

    /// Azimuth the head fire spreads toward (downwind), degrees in [0, 360).
    pub fn spread_azimuth(&self) -> f64 {
        (self.wind_direction + 180.0).rem_euclid(360.0)
    }

    /// Relative humidity saturated at 100% before use in the moisture codes.
    pub(crate) fn bounded_rh(&self) -> f64 {
        self.relative_humidity.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Weather {
        Weather {
            wind_speed: 20.0,
            wind_direction: 270.0,
            temperature: 20.0,
            relative_humidity: 30.0,
            precipitation_24h: 0.0,
        }
    }

    #[test]
    fn test_valid_weather_accepted() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn test_negative_wind_rejected() {
        let mut w = base();
        w.wind_speed = -1.0;
        assert!(w.validate().is_err());
    }

    #[test]
    fn test_negative_humidity_rejected() {
        let mut w = base();
        w.relative_humidity = -0.1;
        assert!(w.validate().is_err());
    }

    #[test]
    fn test_supersaturated_humidity_accepted_and_capped() {
        let mut w = base();
        w.relative_humidity = 120.0;
        assert!(w.validate().is_ok());
        assert_eq!(w.bounded_rh(), 100.0);
    }

    #[test]
    fn test_unphysical_temperature_rejected() {
        let mut w = base();
        w.temperature = -60.0;
        assert!(w.validate().is_err());
    }

    #[test]
    fn test_nan_rejected() {
        let mut w = base();
        w.wind_direction = f64::NAN;
        assert!(w.validate().is_err());
    }

    #[test]
    fn test_spread_azimuth_is_downwind() {
        // Westerly wind pushes the head toward the east
        assert_eq!(base().spread_azimuth(), 90.0);
        let mut w = base();
        w.wind_direction = 45.0;
        assert_eq!(w.spread_azimuth(), 225.0);
    }
}
