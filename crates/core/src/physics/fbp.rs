//! Canadian Fire Behavior Prediction System equation stack.
//!
//! Turns FWI components, wind, and a fuel type into head/flank/back rates of
//! spread, fuel consumption, head-fire intensity, length-to-breadth ratio,
//! fire-type classification, and flame length (ST-X-3 equation numbers cited
//! inline). The output feeds the per-vertex wavelet expansion in the solver.
//!
//! # References
//! - Forestry Canada (1992). "Development and structure of the Canadian
//!   Forest Fire Behavior Prediction System". Report ST-X-3.
//! - Byram, G.M. (1959). Combustion of forest fuels.

use serde::{Deserialize, Serialize};

use crate::error::FireGrowthError;
use crate::fuel::{FuelCode, FuelGroup};
use crate::physics::crown_fire::{self, FireType};
use crate::physics::fwi::{FwiState, ISI_WIND_COEFF};
use crate::weather::Weather;

/// Inputs beyond weather and FWI that tune the FBP equations.
///
/// Defaults follow the benchmark values used when a configuration does not
/// specify them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FbpOptions {
    /// Foliar moisture content (%)
    pub foliar_moisture: f64,
    /// Percent conifer for the M1/M2 mixedwood blend (0-100)
    pub percent_conifer: f64,
    /// Percent dead balsam fir for M3/M4 (0-100)
    pub percent_dead_fir: f64,
    /// Degree of grass curing for O1 fuels (0-100)
    pub grass_curing: f64,
    /// Crown base height override (m); replaces the fuel-table value
    pub crown_base_height: Option<f64>,
}

impl Default for FbpOptions {
    fn default() -> Self {
        Self {
            foliar_moisture: 97.0,
            percent_conifer: 50.0,
            percent_dead_fir: 35.0,
            grass_curing: 60.0,
            crown_base_height: None,
        }
    }
}

/// Full fire-behavior output at the head of the fire.
///
/// All rates of spread are m/min; consumptions kg/m²; intensity kW/m.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FireBehavior {
    /// Head spread rate, including any crown-phase boost
    pub ros_head: f64,
    /// Surface-phase head spread rate (RSS)
    pub ros_surface: f64,
    /// Flank spread rate
    pub ros_flank: f64,
    /// Back spread rate
    pub ros_back: f64,
    pub surface_fuel_consumption: f64,
    pub crown_fuel_consumption: f64,
    pub total_fuel_consumption: f64,
    /// Byram head-fire intensity
    pub head_fire_intensity: f64,
    pub length_to_breadth: f64,
    pub fire_type: FireType,
    pub crown_fraction_burned: f64,
    /// Byram flame length (m)
    pub flame_length: f64,
}

/// Compute full head-fire behavior for one fuel under the given conditions.
pub fn fire_behavior(
    code: FuelCode,
    fwi: &FwiState,
    weather: &Weather,
    opts: &FbpOptions,
) -> Result<FireBehavior, FireGrowthError> {
    if fwi.isi < 0.0 || fwi.bui < 0.0 {
        return Err(FireGrowthError::inputs(format!(
            "ISI and BUI must be non-negative, got isi={}, bui={}",
            fwi.isi, fwi.bui
        )));
    }
    validate_options(opts)?;

    let params = code.params();
    let ws = weather.wind_speed;

    let rsi = surface_rsi(code, fwi.isi, opts);
    let be = buildup_effect(code, fwi.bui);
    let rss = rsi * be;

    let sfc = surface_fuel_consumption(code, fwi.ffmc, fwi.bui, opts);

    // Van Wagner crown transition test
    let cbh = opts.crown_base_height.unwrap_or(params.cbh);
    let csi = crown_fire::critical_surface_intensity(cbh, opts.foliar_moisture);
    let rso = crown_fire::critical_surface_ros(csi, sfc);
    let cfb = crown_fire::crown_fraction_burned(rss, rso);
    let fire_type = crown_fire::classify(rss, rso, cfb);

    // Crown-phase spread boost, C6 only (ST-X-3 Eq. 64-65)
    let ros_head = if code == FuelCode::C6 && cfb > 0.0 {
        let rsc = crown_fire::crown_spread_rate(fwi.isi, opts.foliar_moisture);
        if rsc > rss {
            rss + cfb * (rsc - rss)
        } else {
            rss
        }
    } else {
        rss
    };

    let cfc = crown_fuel_consumption(code, cfb, opts);
    let tfc = sfc + cfc;

    // Byram (1959): I = 300 · w · R
    let hfi = 300.0 * tfc * ros_head;
    let lbr = length_to_breadth(params.group, ws);
    let ros_back = rss * (-ISI_WIND_COEFF * ws).exp();
    let ros_flank = (ros_head + ros_back) / (2.0 * lbr);
    let flame_length = 0.0775 * hfi.powf(0.46);

    let behavior = FireBehavior {
        ros_head,
        ros_surface: rss,
        ros_flank,
        ros_back,
        surface_fuel_consumption: sfc,
        crown_fuel_consumption: cfc,
        total_fuel_consumption: tfc,
        head_fire_intensity: hfi,
        length_to_breadth: lbr,
        fire_type,
        crown_fraction_burned: cfb,
        flame_length,
    };
    ensure_finite(&behavior)?;
    Ok(behavior)
}

fn validate_options(opts: &FbpOptions) -> Result<(), FireGrowthError> {
    let percents = [
        ("percent_conifer", opts.percent_conifer),
        ("percent_dead_fir", opts.percent_dead_fir),
        ("grass_curing", opts.grass_curing),
    ];
    for (name, value) in percents {
        if !(0.0..=100.0).contains(&value) {
            return Err(FireGrowthError::inputs(format!(
                "{name} must be within [0, 100], got {value}"
            )));
        }
    }
    if !(0.0..=200.0).contains(&opts.foliar_moisture) {
        return Err(FireGrowthError::inputs(format!(
            "foliar_moisture must be within [0, 200], got {}",
            opts.foliar_moisture
        )));
    }
    if let Some(cbh) = opts.crown_base_height {
        if !cbh.is_finite() || cbh < 0.0 {
            return Err(FireGrowthError::inputs(format!(
                "crown_base_height must be finite and non-negative, got {cbh}"
            )));
        }
    }
    Ok(())
}

/// Basic ISI spread curve, ROS = a·(1 − e^(−b·ISI))^c (ST-X-3 Eq. 26).
fn ros_curve(a: f64, b: f64, c: f64, isi: f64) -> f64 {
    a * (1.0 - (-b * isi).exp()).powf(c)
}

fn curve_for(code: FuelCode, isi: f64) -> f64 {
    let p = code.params();
    ros_curve(p.a, p.b, p.c, isi)
}

/// Surface RSI before the buildup effect, with the per-fuel modifications.
fn surface_rsi(code: FuelCode, isi: f64, opts: &FbpOptions) -> f64 {
    let pc = opts.percent_conifer / 100.0;
    let pdf = opts.percent_dead_fir / 100.0;
    match code {
        // Green aspen spreads at one fifth of the leafless rate
        FuelCode::D2 => 0.2 * curve_for(FuelCode::D1, isi),
        // Mixedwood blends of the C2 and D1 curves (ST-X-3 Eq. 27-29);
        // the green variants take the leafless hardwood component at 20%
        FuelCode::M1 => pc * curve_for(FuelCode::C2, isi) + (1.0 - pc) * curve_for(FuelCode::D1, isi),
        FuelCode::M2 => {
            pc * curve_for(FuelCode::C2, isi) + 0.2 * (1.0 - pc) * curve_for(FuelCode::D1, isi)
        }
        FuelCode::M3 => {
            pdf * curve_for(FuelCode::M3, isi) + (1.0 - pdf) * curve_for(FuelCode::D1, isi)
        }
        FuelCode::M4 => {
            pdf * curve_for(FuelCode::M4, isi) + 0.2 * (1.0 - pdf) * curve_for(FuelCode::D1, isi)
        }
        // Grass scales with the degree of curing (ST-X-3 Eq. 35)
        FuelCode::O1a | FuelCode::O1b => curve_for(code, isi) * grass_curing_factor(opts.grass_curing),
        _ => curve_for(code, isi),
    }
}

/// Grass curing factor (ST-X-3 Eq. 35); zero when no grass is cured.
fn grass_curing_factor(curing: f64) -> f64 {
    let cf = if curing < 58.8 {
        0.005 * ((0.061 * curing).exp() - 1.0)
    } else {
        0.176 + 0.02 * (curing - 58.8)
    };
    cf.max(0.0)
}

/// Buildup effect multiplier (ST-X-3 Eq. 54), clamped to the fuel's maximum.
/// Grass carries no duff, so the Open group is exempt.
fn buildup_effect(code: FuelCode, bui: f64) -> f64 {
    let p = code.params();
    if p.group == FuelGroup::Open || bui <= 0.0 {
        return 1.0;
    }
    (50.0 * p.q.ln() * (1.0 / bui - 1.0 / p.bui0))
        .exp()
        .min(p.max_be)
}

/// Surface fuel consumption (kg/m²), ST-X-3 Eq. 9-25.
fn surface_fuel_consumption(code: FuelCode, ffmc: f64, bui: f64, opts: &FbpOptions) -> f64 {
    let sfc = match code {
        FuelCode::C1 => {
            if ffmc > 84.0 {
                0.75 + 0.75 * (1.0 - (-0.23 * (ffmc - 84.0)).exp()).sqrt()
            } else {
                0.75 - 0.75 * (1.0 - (-0.23 * (84.0 - ffmc)).exp()).sqrt()
            }
        }
        FuelCode::C2 | FuelCode::M3 | FuelCode::M4 => 5.0 * (1.0 - (-0.0115 * bui).exp()),
        FuelCode::C3 | FuelCode::C4 => 5.0 * (1.0 - (-0.0164 * bui).exp()).powf(2.24),
        FuelCode::C5 | FuelCode::C6 => 5.0 * (1.0 - (-0.0149 * bui).exp()).powf(2.48),
        FuelCode::C7 => {
            let ffc = (2.0 * (1.0 - (-0.104 * (ffmc - 70.0)).exp())).max(0.0);
            let wfc = 1.5 * (1.0 - (-0.0201 * bui).exp());
            ffc + wfc
        }
        FuelCode::D1 | FuelCode::D2 => 1.5 * (1.0 - (-0.0183 * bui).exp()),
        FuelCode::M1 | FuelCode::M2 => {
            let pc = opts.percent_conifer / 100.0;
            pc * surface_fuel_consumption(FuelCode::C2, ffmc, bui, opts)
                + (1.0 - pc) * surface_fuel_consumption(FuelCode::D1, ffmc, bui, opts)
        }
        // Grass consumes its standing load
        FuelCode::O1a | FuelCode::O1b => code.params().grass_fuel_load,
        FuelCode::S1 => {
            4.0 * (1.0 - (-0.025 * bui).exp()) + 4.0 * (1.0 - (-0.034 * bui).exp())
        }
        FuelCode::S2 => {
            10.0 * (1.0 - (-0.013 * bui).exp()) + 6.0 * (1.0 - (-0.060 * bui).exp())
        }
        FuelCode::S3 => {
            12.0 * (1.0 - (-0.0166 * bui).exp()) + 20.0 * (1.0 - (-0.0210 * bui).exp())
        }
    };
    sfc.max(0.0)
}

/// Crown fuel consumption (kg/m²), scaled by the conifer share in mixedwoods.
fn crown_fuel_consumption(code: FuelCode, cfb: f64, opts: &FbpOptions) -> f64 {
    let base = code.params().cfl * cfb;
    match code {
        FuelCode::M1 | FuelCode::M2 => base * opts.percent_conifer / 100.0,
        FuelCode::M3 | FuelCode::M4 => base * opts.percent_dead_fir / 100.0,
        _ => base,
    }
}

/// Length-to-breadth ratio of the elliptical fire.
///
/// Forest fuels use ST-X-3 Eq. 79; grass uses the Eq. 80 relation with its
/// calm-wind floor.
pub fn length_to_breadth(group: FuelGroup, wind_speed: f64) -> f64 {
    if group == FuelGroup::Open {
        if wind_speed < 1.0 {
            1.0
        } else {
            1.1 * wind_speed.powf(0.464)
        }
    } else {
        1.0 + 8.729 * (1.0 - (-0.030 * wind_speed).exp()).powf(2.155)
    }
}

fn ensure_finite(b: &FireBehavior) -> Result<(), FireGrowthError> {
    let values = [
        b.ros_head,
        b.ros_surface,
        b.ros_flank,
        b.ros_back,
        b.surface_fuel_consumption,
        b.crown_fuel_consumption,
        b.total_fuel_consumption,
        b.head_fire_intensity,
        b.length_to_breadth,
        b.crown_fraction_burned,
        b.flame_length,
    ];
    if values.iter().all(|v| v.is_finite() && *v >= 0.0) {
        Ok(())
    } else {
        Err(FireGrowthError::inputs(
            "fire behavior produced non-finite or negative values",
        ))
    }
}
