//! Canadian Fire Weather Index System.
//!
//! Daily FFMC / DMC / DC moisture codes and the derived ISI / BUI / FWI
//! components, per Van Wagner (1987) and the ST-X-3 equation set. Each
//! component is a deterministic function of the previous day's moisture and
//! today's weather; with no prior state the standard station start-up values
//! are used.
//!
//! The simulation holds weather constant for the duration of a run, so the
//! seasonal day-length factors of the DMC and DC drying equations are fixed
//! at their high-summer values.
//!
//! # References
//!
//! - Van Wagner, C.E. (1987). "Development and structure of the Canadian
//!   Forest Fire Weather Index System". Forestry Technical Report 35.
//! - Forestry Canada (1992). "Development and structure of the Canadian
//!   Forest Fire Behavior Prediction System". Report ST-X-3.

use serde::{Deserialize, Serialize};

use crate::error::FireGrowthError;
use crate::weather::Weather;

/// Station start-up values used when no prior moisture state is given.
pub const FFMC_INIT: f64 = 85.0;
pub const DMC_INIT: f64 = 6.0;
pub const DC_INIT: f64 = 15.0;

/// High-summer day-length factors (June/July, northern mid-latitudes).
const DMC_DAY_LENGTH: f64 = 13.9;
const DC_DAY_LENGTH: f64 = 6.4;

/// Wind coefficient shared by the ISI wind function and the back-fire ratio.
pub(crate) const ISI_WIND_COEFF: f64 = 0.05039;

/// Explicit component overrides; a present value replaces the computed one.
///
/// Derived components still recompute from overridden inputs unless they are
/// themselves overridden: an `ffmc` override feeds the ISI calculation, an
/// `isi` override bypasses it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FwiOverrides {
    pub ffmc: Option<f64>,
    pub dmc: Option<f64>,
    pub dc: Option<f64>,
    pub isi: Option<f64>,
    pub bui: Option<f64>,
    pub fwi: Option<f64>,
}

/// The six FWI System components for one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FwiState {
    /// Fine Fuel Moisture Code, [0, 101]
    pub ffmc: f64,
    /// Duff Moisture Code, ≥ 0
    pub dmc: f64,
    /// Drought Code, ≥ 0
    pub dc: f64,
    /// Initial Spread Index, ≥ 0
    pub isi: f64,
    /// Buildup Index, ≥ 0
    pub bui: f64,
    /// Fire Weather Index, ≥ 0
    pub fwi: f64,
}

impl FwiState {
    /// Derive all six components from a daily weather observation, starting
    /// from the standard station start-up values.
    pub fn from_weather(weather: &Weather) -> Result<Self, FireGrowthError> {
        Self::from_weather_with_overrides(weather, &FwiOverrides::default())
    }

    /// Derive the components, replacing any that are explicitly overridden.
    pub fn from_weather_with_overrides(
        weather: &Weather,
        overrides: &FwiOverrides,
    ) -> Result<Self, FireGrowthError> {
        weather.validate()?;

        let rh = weather.bounded_rh();
        let ffmc = overrides.ffmc.unwrap_or_else(|| {
            update_ffmc(
                FFMC_INIT,
                weather.temperature,
                rh,
                weather.wind_speed,
                weather.precipitation_24h,
            )
        });
        let ffmc = ffmc.clamp(0.0, 101.0);
        let dmc = overrides
            .dmc
            .unwrap_or_else(|| {
                update_dmc(
                    DMC_INIT,
                    weather.temperature,
                    rh,
                    weather.precipitation_24h,
                )
            })
            .max(0.0);
        let dc = overrides
            .dc
            .unwrap_or_else(|| update_dc(DC_INIT, weather.temperature, weather.precipitation_24h))
            .max(0.0);

        let isi = overrides
            .isi
            .unwrap_or_else(|| initial_spread_index(ffmc, weather.wind_speed));
        let bui = overrides.bui.unwrap_or_else(|| buildup_index(dmc, dc));
        let fwi = overrides.fwi.unwrap_or_else(|| fire_weather_index(isi, bui));

        if isi < 0.0 || bui < 0.0 {
            return Err(FireGrowthError::config(format!(
                "overridden ISI/BUI must be non-negative, got isi={isi}, bui={bui}"
            )));
        }

        Ok(Self {
            ffmc,
            dmc,
            dc,
            isi,
            bui,
            fwi,
        })
    }
}

/// Fine-fuel moisture content (%) equivalent of an FFMC value.
pub fn fine_fuel_moisture(ffmc: f64) -> f64 {
    147.2 * (101.0 - ffmc) / (59.5 + ffmc)
}

fn moisture_to_ffmc(moisture: f64) -> f64 {
    59.5 * (250.0 - moisture) / (147.2 + moisture)
}

/// Daily FFMC update from the previous day's value (Van Wagner 1987, Eq. 1-10).
pub fn update_ffmc(prev_ffmc: f64, temp: f64, rh: f64, wind_speed: f64, rain: f64) -> f64 {
    let mut m = fine_fuel_moisture(prev_ffmc.clamp(0.0, 101.0));

    if rain > 0.5 {
        let rf = rain - 0.5;
        let mut mr = m + 42.5 * rf * (-100.0 / (251.0 - m)).exp() * (1.0 - (-6.93 / rf).exp());
        if m > 150.0 {
            mr += 0.0015 * (m - 150.0).powi(2) * rf.sqrt();
        }
        m = mr.min(250.0);
    }

    let ed = 0.942 * rh.powf(0.679)
        + 11.0 * ((rh - 100.0) / 10.0).exp()
        + 0.18 * (21.1 - temp) * (1.0 - (-0.115 * rh).exp());

    if m > ed {
        // drying toward the day's equilibrium
        let k0 = 0.424 * (1.0 - (rh / 100.0).powf(1.7))
            + 0.0694 * wind_speed.sqrt() * (1.0 - (rh / 100.0).powi(8));
        let kd = k0 * 0.581 * (0.0365 * temp).exp();
        m = ed + (m - ed) * 10f64.powf(-kd);
    } else {
        let ew = 0.618 * rh.powf(0.753)
            + 10.0 * ((rh - 100.0) / 10.0).exp()
            + 0.18 * (21.1 - temp) * (1.0 - (-0.115 * rh).exp());
        if m < ew {
            // wetting toward the day's equilibrium
            let k1 = 0.424 * (1.0 - ((100.0 - rh) / 100.0).powf(1.7))
                + 0.0694 * wind_speed.sqrt() * (1.0 - ((100.0 - rh) / 100.0).powi(8));
            let kw = k1 * 0.581 * (0.0365 * temp).exp();
            m = ew - (ew - m) * 10f64.powf(-kw);
        }
    }

    moisture_to_ffmc(m.clamp(0.0, 250.0)).clamp(0.0, 101.0)
}

/// Daily DMC update (Van Wagner 1987, Eq. 11-16).
pub fn update_dmc(prev_dmc: f64, temp: f64, rh: f64, rain: f64) -> f64 {
    let mut dmc = prev_dmc.max(0.0);

    if rain > 1.5 {
        let re = 0.92 * rain - 1.27;
        let m0 = 20.0 + (5.6348 - dmc / 43.43).exp();
        let b = if dmc <= 33.0 {
            100.0 / (0.5 + 0.3 * dmc)
        } else if dmc <= 65.0 {
            14.0 - 1.3 * dmc.ln()
        } else {
            6.2 * dmc.ln() - 17.2
        };
        let mr = m0 + 1000.0 * re / (48.77 + b * re);
        dmc = (244.72 - 43.43 * (mr - 20.0).max(1e-9).ln()).max(0.0);
    }

    if temp > -1.1 {
        let k = 1.894 * (temp + 1.1) * (100.0 - rh) * DMC_DAY_LENGTH * 1e-6;
        dmc += 100.0 * k;
    }
    dmc.max(0.0)
}

/// Daily DC update (Van Wagner 1987, Eq. 18-21).
pub fn update_dc(prev_dc: f64, temp: f64, rain: f64) -> f64 {
    let mut dc = prev_dc.max(0.0);

    if rain > 2.8 {
        let rd = 0.83 * rain - 1.27;
        let q0 = 800.0 * (-dc / 400.0).exp();
        let qr = q0 + 3.937 * rd;
        dc = (400.0 * (800.0 / qr.max(1e-9)).ln()).max(0.0);
    }

    let v = 0.36 * (temp + 2.8) + DC_DAY_LENGTH;
    if v > 0.0 {
        dc += 0.5 * v;
    }
    dc.max(0.0)
}

/// Initial Spread Index from FFMC and wind speed (ST-X-3 Eq. 52-53).
pub fn initial_spread_index(ffmc: f64, wind_speed: f64) -> f64 {
    let m = fine_fuel_moisture(ffmc.clamp(0.0, 101.0));
    let fw = (ISI_WIND_COEFF * wind_speed).exp();
    let ff = 91.9 * (-0.1386 * m).exp() * (1.0 + m.powf(5.31) / 4.93e7);
    0.208 * fw * ff
}

/// Buildup Index from DMC and DC (ST-X-3 Eq. 27).
pub fn buildup_index(dmc: f64, dc: f64) -> f64 {
    if dmc <= 0.0 {
        return 0.0;
    }
    let bui = if dmc <= 0.4 * dc {
        0.8 * dmc * dc / (dmc + 0.4 * dc)
    } else {
        dmc - (1.0 - 0.8 * dc / (dmc + 0.4 * dc)) * (0.92 + (0.0114 * dmc).powf(1.7))
    };
    bui.max(0.0)
}

/// Fire Weather Index from ISI and BUI (ST-X-3 Eq. 28-30).
pub fn fire_weather_index(isi: f64, bui: f64) -> f64 {
    let fd = if bui <= 80.0 {
        0.626 * bui.powf(0.809) + 2.0
    } else {
        1000.0 / (25.0 + 108.64 * (-0.023 * bui).exp())
    };
    let b = 0.1 * isi * fd;
    let fwi = if b > 1.0 {
        (2.72 * (0.434 * b.ln()).powf(0.647)).exp()
    } else {
        b
    };
    fwi.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn weather(wind_speed: f64, rh: f64, temp: f64, rain: f64) -> Weather {
        Weather {
            wind_speed,
            wind_direction: 270.0,
            temperature: temp,
            relative_humidity: rh,
            precipitation_24h: rain,
        }
    }

    #[test]
    fn test_ffmc_drying_day() {
        // Start-up value 85 on a warm, dry, breezy day dries to ~90.2
        let ffmc = update_ffmc(85.0, 20.0, 30.0, 20.0, 0.0);
        assert_relative_eq!(ffmc, 90.18, max_relative = 0.01);
    }

    #[test]
    fn test_ffmc_rain_lowers_moisture_code() {
        let dry = update_ffmc(85.0, 20.0, 30.0, 20.0, 0.0);
        let wet = update_ffmc(85.0, 20.0, 30.0, 20.0, 10.0);
        assert!(wet < dry);
    }

    #[test]
    fn test_ffmc_saturates_to_range() {
        let high = update_ffmc(101.0, 40.0, 0.0, 60.0, 0.0);
        assert!((0.0..=101.0).contains(&high));
        let low = update_ffmc(0.0, -10.0, 100.0, 0.0, 50.0);
        assert!((0.0..=101.0).contains(&low));
    }

    #[test]
    fn test_dmc_and_dc_dry_upward() {
        let dmc = update_dmc(6.0, 20.0, 30.0, 0.0);
        assert_relative_eq!(dmc, 9.89, max_relative = 0.01);
        let dc = update_dc(15.0, 20.0, 0.0);
        assert_relative_eq!(dc, 22.30, max_relative = 0.01);
    }

    #[test]
    fn test_rain_reduces_dmc_and_dc() {
        assert!(update_dmc(30.0, 10.0, 90.0, 20.0) < 30.0);
        assert!(update_dc(200.0, 10.0, 20.0) < 200.0);
    }

    #[test]
    fn test_isi_reference_point() {
        // FFMC 90, wind 20 km/h
        assert_relative_eq!(initial_spread_index(90.0, 20.0), 11.74, max_relative = 0.01);
    }

    #[test]
    fn test_bui_reference_point() {
        assert_relative_eq!(buildup_index(45.0, 300.0), 65.45, max_relative = 0.01);
        assert_eq!(buildup_index(0.0, 300.0), 0.0);
    }

    #[test]
    fn test_fwi_reference_point() {
        let isi = initial_spread_index(90.0, 20.0);
        let bui = buildup_index(45.0, 300.0);
        assert_relative_eq!(fire_weather_index(isi, bui), 28.45, max_relative = 0.01);
    }

    #[test]
    fn test_overrides_replace_components_exactly() {
        let w = weather(20.0, 30.0, 20.0, 0.0);
        let overrides = FwiOverrides {
            ffmc: Some(90.0),
            dmc: Some(45.0),
            dc: Some(300.0),
            isi: Some(10.0),
            bui: Some(60.0),
            fwi: Some(25.0),
        };
        let state = FwiState::from_weather_with_overrides(&w, &overrides).unwrap();
        assert_eq!(state.ffmc, 90.0);
        assert_eq!(state.dmc, 45.0);
        assert_eq!(state.dc, 300.0);
        assert_eq!(state.isi, 10.0);
        assert_eq!(state.bui, 60.0);
        assert_eq!(state.fwi, 25.0);
    }

    #[test]
    fn test_derived_components_recompute_from_overridden_inputs() {
        let w = weather(20.0, 30.0, 20.0, 0.0);
        let overrides = FwiOverrides {
            ffmc: Some(90.0),
            dmc: Some(45.0),
            dc: Some(300.0),
            ..FwiOverrides::default()
        };
        let state = FwiState::from_weather_with_overrides(&w, &overrides).unwrap();
        assert_relative_eq!(state.isi, initial_spread_index(90.0, 20.0));
        assert_relative_eq!(state.bui, buildup_index(45.0, 300.0));
        assert_relative_eq!(state.fwi, fire_weather_index(state.isi, state.bui));
    }

    #[test]
    fn test_invalid_weather_rejected() {
        let w = weather(-5.0, 30.0, 20.0, 0.0);
        assert!(FwiState::from_weather(&w).is_err());
    }

    #[test]
    fn test_supersaturated_humidity_saturates_to_100() {
        // RH above 100% is recoverable: it caps at 100% before the
        // moisture codes rather than failing the run
        let wet = FwiState::from_weather(&weather(20.0, 120.0, 20.0, 0.0)).unwrap();
        let capped = FwiState::from_weather(&weather(20.0, 100.0, 20.0, 0.0)).unwrap();
        assert_eq!(wet, capped);
    }

    #[test]
    fn test_negative_override_rejected() {
        let w = weather(20.0, 30.0, 20.0, 0.0);
        let overrides = FwiOverrides {
            isi: Some(-1.0),
            ..FwiOverrides::default()
        };
        assert!(FwiState::from_weather_with_overrides(&w, &overrides).is_err());
    }
}
