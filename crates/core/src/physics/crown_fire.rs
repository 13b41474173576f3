//! Van Wagner Crown Fire Initiation Model (1977)
//!
//! Classifies fire behavior at the head into surface, passive (intermittent)
//! crown, and active crown fire, and supplies the crown spread-rate blend
//! used by the C6 conifer-plantation fuel type.
//!
//! # Scientific References
//! - Van Wagner, C.E. (1977). "Conditions for the start and spread of crown fire"
//!   Canadian Journal of Forest Research, 7(1), 23-34
//! - Forestry Canada (1992). Report ST-X-3, Eq. 56-64

use serde::{Deserialize, Serialize};

/// Crown-fraction-burned threshold separating passive from active crowning.
const ACTIVE_CFB_THRESHOLD: f64 = 0.9;

/// Fire type classification at the head of the fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FireType {
    /// Surface fire only, no crown involvement
    Surface,
    /// Intermittent torching of individual crowns
    PassiveCrown,
    /// Continuous crown fire spread
    ActiveCrown,
}

impl FireType {
    /// Wire-format name, matching the frame snapshot schema.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Surface => "surface",
            Self::PassiveCrown => "passive_crown",
            Self::ActiveCrown => "active_crown",
        }
    }
}

/// Critical surface fire intensity for crown involvement (kW/m).
///
/// Van Wagner (1977) Eq. 4 in the FBP parameterisation:
/// CSI = 0.001 · CBH^1.5 · (460 + 25.9 · FMC)^1.5
///
/// `cbh` is crown base height (m), `foliar_moisture` is FMC (%).
/// Fuels without a canopy (cbh ≤ 0) return infinity: they never crown.
pub fn critical_surface_intensity(cbh: f64, foliar_moisture: f64) -> f64 {
    if cbh <= 0.0 {
        return f64::INFINITY;
    }
    0.001 * cbh.powf(1.5) * (460.0 + 25.9 * foliar_moisture).powf(1.5)
}

/// Critical surface spread rate RSO (m/min) at which the surface fire reaches
/// the critical intensity, given surface fuel consumption (kg/m²).
pub fn critical_surface_ros(csi: f64, sfc: f64) -> f64 {
    if sfc <= 0.0 {
        return f64::INFINITY;
    }
    csi / (300.0 * sfc)
}

/// Crown fraction burned (ST-X-3 Eq. 58).
///
/// CFB = 1 − e^(−0.23·(ROS − RSO)), zero below the critical spread rate.
pub fn crown_fraction_burned(ros_head: f64, rso: f64) -> f64 {
    if !rso.is_finite() || ros_head <= rso {
        return 0.0;
    }
    (1.0 - (-0.23 * (ros_head - rso)).exp()).clamp(0.0, 1.0)
}

/// Classify the head fire from its spread rate and crown fraction burned.
pub fn classify(ros_head: f64, rso: f64, cfb: f64) -> FireType {
    if !rso.is_finite() || ros_head < rso {
        FireType::Surface
    } else if cfb >= ACTIVE_CFB_THRESHOLD {
        FireType::ActiveCrown
    } else {
        FireType::PassiveCrown
    }
}

/// Foliar moisture effect (ST-X-3 Eq. 61), normalised to 1.0 at FMC 97.
pub fn foliar_moisture_effect(foliar_moisture: f64) -> f64 {
    let fme = (1.5 - 0.00275 * foliar_moisture).powi(4) / (460.0 + 25.9 * foliar_moisture) * 1000.0;
    fme / 0.778
}

/// Crown-phase spread rate RSC for the C6 fuel type (ST-X-3 Eq. 64), m/min.
pub fn crown_spread_rate(isi: f64, foliar_moisture: f64) -> f64 {
    60.0 * (1.0 - (-0.0497 * isi).exp()) * foliar_moisture_effect(foliar_moisture)
}
