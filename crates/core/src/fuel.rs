use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FireGrowthError;

/// Broad FBP fuel groups used for dispatch in the equation stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FuelGroup {
    Conifer,
    Deciduous,
    Mixedwood,
    Open,
    Slash,
}

/// The 18 benchmark fuel types of the Canadian FBP System.
///
/// The enumeration is closed: unknown codes cannot be constructed, so the
/// parameter lookup below is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelCode {
    /// Spruce-lichen woodland
    C1,
    /// Boreal spruce
    C2,
    /// Mature jack or lodgepole pine
    C3,
    /// Immature jack or lodgepole pine
    C4,
    /// Red and white pine
    C5,
    /// Conifer plantation
    C6,
    /// Ponderosa pine / Douglas-fir
    C7,
    /// Leafless aspen
    D1,
    /// Green aspen
    D2,
    /// Boreal mixedwood, leafless
    M1,
    /// Boreal mixedwood, green
    M2,
    /// Dead balsam fir mixedwood, leafless
    M3,
    /// Dead balsam fir mixedwood, green
    M4,
    /// Matted grass
    O1a,
    /// Standing grass
    O1b,
    /// Jack or lodgepole pine slash
    S1,
    /// White spruce / balsam slash
    S2,
    /// Coastal cedar / hemlock / Douglas-fir slash
    S3,
}

/// Frozen per-fuel parameter record.
///
/// One immutable record exists per code; `FuelCode::params` returns a
/// `'static` reference into the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelParams {
    pub code: FuelCode,
    pub group: FuelGroup,
    /// Rate-of-spread curve coefficients, ROS = a·(1 − e^(−b·ISI))^c.
    /// Zero for M1/M2, which blend the C2 and D1 curves instead.
    pub a: f64,
    pub b: f64,
    pub c: f64,
    /// Buildup-effect parameters: q, BUI₀, and the cap on the multiplier.
    pub q: f64,
    pub bui0: f64,
    pub max_be: f64,
    /// Crown base height (m); zero for fuels that cannot crown.
    pub cbh: f64,
    /// Crown fuel load (kg/m²)
    pub cfl: f64,
    /// Grass fuel load (kg/m²), O1 fuels only
    pub grass_fuel_load: f64,
}

#[allow(clippy::too_many_arguments)]
const fn params(
    code: FuelCode,
    group: FuelGroup,
    a: f64,
    b: f64,
    c: f64,
    q: f64,
    bui0: f64,
    max_be: f64,
    cbh: f64,
    cfl: f64,
    grass_fuel_load: f64,
) -> FuelParams {
    FuelParams {
        code,
        group,
        a,
        b,
        c,
        q,
        bui0,
        max_be,
        cbh,
        cfl,
        grass_fuel_load,
    }
}

use FuelCode as F;
use FuelGroup as G;

static C1: FuelParams = params(F::C1, G::Conifer, 90.0, 0.0649, 4.5, 0.90, 72.0, 1.076, 2.0, 0.75, 0.0);
static C2: FuelParams = params(F::C2, G::Conifer, 110.0, 0.0282, 1.5, 0.70, 64.0, 1.321, 3.0, 0.80, 0.0);
static C3: FuelParams = params(F::C3, G::Conifer, 110.0, 0.0444, 3.0, 0.75, 62.0, 1.261, 8.0, 1.15, 0.0);
static C4: FuelParams = params(F::C4, G::Conifer, 110.0, 0.0293, 1.5, 0.80, 66.0, 1.184, 4.0, 1.20, 0.0);
static C5: FuelParams = params(F::C5, G::Conifer, 30.0, 0.0697, 4.0, 0.80, 56.0, 1.220, 18.0, 1.20, 0.0);
static C6: FuelParams = params(F::C6, G::Conifer, 30.0, 0.0800, 3.0, 0.80, 62.0, 1.197, 7.0, 1.80, 0.0);
static C7: FuelParams = params(F::C7, G::Conifer, 45.0, 0.0305, 2.0, 0.85, 106.0, 1.134, 10.0, 0.50, 0.0);
static D1: FuelParams = params(F::D1, G::Deciduous, 30.0, 0.0232, 1.6, 0.90, 32.0, 1.179, 0.0, 0.0, 0.0);
static D2: FuelParams = params(F::D2, G::Deciduous, 30.0, 0.0232, 1.6, 0.90, 32.0, 1.179, 0.0, 0.0, 0.0);
static M1: FuelParams = params(F::M1, G::Mixedwood, 0.0, 0.0, 0.0, 0.80, 50.0, 1.250, 6.0, 0.80, 0.0);
static M2: FuelParams = params(F::M2, G::Mixedwood, 0.0, 0.0, 0.0, 0.80, 50.0, 1.250, 6.0, 0.80, 0.0);
static M3: FuelParams = params(F::M3, G::Mixedwood, 120.0, 0.0572, 1.4, 0.80, 50.0, 1.250, 6.0, 0.80, 0.0);
static M4: FuelParams = params(F::M4, G::Mixedwood, 100.0, 0.0404, 1.48, 0.80, 50.0, 1.250, 6.0, 0.80, 0.0);
static O1A: FuelParams = params(F::O1a, G::Open, 190.0, 0.0310, 1.4, 1.00, 1.0, 1.000, 0.0, 0.0, 0.35);
static O1B: FuelParams = params(F::O1b, G::Open, 250.0, 0.0350, 1.7, 1.00, 1.0, 1.000, 0.0, 0.0, 0.35);
static S1: FuelParams = params(F::S1, G::Slash, 75.0, 0.0297, 1.3, 0.75, 38.0, 1.460, 0.0, 0.0, 0.0);
static S2: FuelParams = params(F::S2, G::Slash, 40.0, 0.0438, 1.7, 0.75, 63.0, 1.256, 0.0, 0.0, 0.0);
static S3: FuelParams = params(F::S3, G::Slash, 55.0, 0.0829, 3.2, 0.75, 31.0, 1.590, 0.0, 0.0, 0.0);

impl FuelCode {
    /// All 18 codes in canonical order.
    pub const ALL: [FuelCode; 18] = [
        F::C1,
        F::C2,
        F::C3,
        F::C4,
        F::C5,
        F::C6,
        F::C7,
        F::D1,
        F::D2,
        F::M1,
        F::M2,
        F::M3,
        F::M4,
        F::O1a,
        F::O1b,
        F::S1,
        F::S2,
        F::S3,
    ];

    /// Look up the frozen parameter record for this code.
    pub fn params(self) -> &'static FuelParams {
        match self {
            F::C1 => &C1,
            F::C2 => &C2,
            F::C3 => &C3,
            F::C4 => &C4,
            F::C5 => &C5,
            F::C6 => &C6,
            F::C7 => &C7,
            F::D1 => &D1,
            F::D2 => &D2,
            F::M1 => &M1,
            F::M2 => &M2,
            F::M3 => &M3,
            F::M4 => &M4,
            F::O1a => &O1A,
            F::O1b => &O1B,
            F::S1 => &S1,
            F::S2 => &S2,
            F::S3 => &S3,
        }
    }

    /// Broad group of this fuel.
    pub fn group(self) -> FuelGroup {
        self.params().group
    }

    /// Canonical code string ("C1" .. "S3").
    pub fn as_str(self) -> &'static str {
        match self {
            F::C1 => "C1",
            F::C2 => "C2",
            F::C3 => "C3",
            F::C4 => "C4",
            F::C5 => "C5",
            F::C6 => "C6",
            F::C7 => "C7",
            F::D1 => "D1",
            F::D2 => "D2",
            F::M1 => "M1",
            F::M2 => "M2",
            F::M3 => "M3",
            F::M4 => "M4",
            F::O1a => "O1a",
            F::O1b => "O1b",
            F::S1 => "S1",
            F::S2 => "S2",
            F::S3 => "S3",
        }
    }
}

impl fmt::Display for FuelCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FuelCode {
    type Err = FireGrowthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FuelCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| FireGrowthError::config(format!("unknown fuel type {s:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_total_and_consistent() {
        for code in FuelCode::ALL {
            let p = code.params();
            assert_eq!(p.code, code);
            assert!(p.q > 0.0 && p.q <= 1.0);
            assert!(p.bui0 > 0.0);
            assert!(p.max_be >= 1.0);
        }
    }

    #[test]
    fn test_groups() {
        assert_eq!(FuelCode::C6.group(), FuelGroup::Conifer);
        assert_eq!(FuelCode::D2.group(), FuelGroup::Deciduous);
        assert_eq!(FuelCode::M3.group(), FuelGroup::Mixedwood);
        assert_eq!(FuelCode::O1b.group(), FuelGroup::Open);
        assert_eq!(FuelCode::S2.group(), FuelGroup::Slash);
    }

    #[test]
    fn test_only_crowning_fuels_carry_crown_parameters() {
        for code in FuelCode::ALL {
            let p = code.params();
            match p.group {
                FuelGroup::Conifer | FuelGroup::Mixedwood => {
                    assert!(p.cbh > 0.0, "{code} should have a crown base height");
                    assert!(p.cfl > 0.0, "{code} should have a crown fuel load");
                }
                _ => {
                    assert_eq!(p.cbh, 0.0, "{code} cannot crown");
                    assert_eq!(p.cfl, 0.0, "{code} cannot crown");
                }
            }
        }
    }

    #[test]
    fn test_grass_fuel_load_only_for_open_group() {
        for code in FuelCode::ALL {
            let p = code.params();
            if p.group == FuelGroup::Open {
                assert!(p.grass_fuel_load > 0.0);
            } else {
                assert_eq!(p.grass_fuel_load, 0.0);
            }
        }
    }

    #[test]
    fn test_parse_round_trip() {
        for code in FuelCode::ALL {
            assert_eq!(code.as_str().parse::<FuelCode>().unwrap(), code);
        }
    }

    #[test]
    fn test_unknown_code_rejected() {
        assert!("C8".parse::<FuelCode>().is_err());
        assert!("o1a".parse::<FuelCode>().is_err());
        assert!("".parse::<FuelCode>().is_err());
    }

    #[test]
    fn test_serde_names_match_wire_format() {
        let json = serde_json::to_string(&FuelCode::O1a).unwrap();
        assert_eq!(json, "\"O1a\"");
        let back: FuelCode = serde_json::from_str("\"C2\"").unwrap();
        assert_eq!(back, FuelCode::C2);
    }
}
