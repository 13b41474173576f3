//! Simulation driver.
//!
//! Owns the mutable fire front for one run and integrates it forward in
//! time, emitting time-stamped frames as a lazy, pull-based sequence. One
//! simulation is single-threaded and suspends only between frames; dropping
//! the iterator cancels the run and releases all intermediate state. The
//! fuel parameter table is the only resource shared across simulations and
//! is read-only.

use nalgebra::{Point2, Vector2};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::FireGrowthError;
use crate::fuel::FuelCode;
use crate::physics::crown_fire::FireType;
use crate::physics::fbp::{fire_behavior, FbpOptions, FireBehavior};
use crate::physics::fwi::{FwiOverrides, FwiState};
use crate::physics::slope;
use crate::solver::{Perimeter, WaveletEllipse, MAX_VERTEX_SPACING_M};
use crate::spatial::LocalFrame;
use crate::weather::Weather;

/// Vertex count of the ignition seed polygon.
const SEED_VERTICES: usize = 16;
/// Smallest admissible integration step: one second, in minutes.
const MIN_STEP_MIN: f64 = 1.0 / 60.0;
const TIME_EPS: f64 = 1e-9;

/// Everything needed to run one simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub ignition_lat: f64,
    pub ignition_lng: f64,
    pub weather: Weather,
    /// Explicit FWI component overrides; present values replace computed ones
    #[serde(default)]
    pub fwi_overrides: Option<FwiOverrides>,
    pub fuel_type: FuelCode,
    pub duration_hours: f64,
    pub snapshot_interval_minutes: f64,
    /// Uniform terrain slope (percent rise)
    #[serde(default)]
    pub slope_pct: Option<f64>,
    /// Azimuth of steepest descent (degrees)
    #[serde(default)]
    pub aspect_deg: Option<f64>,
    /// FBP tuning values (foliar moisture, curing, mixedwood shares, CBH)
    #[serde(default)]
    pub fbp_options: FbpOptions,
}

impl SimulationConfig {
    fn validate(&self) -> Result<(), FireGrowthError> {
        if !(-90.0..=90.0).contains(&self.ignition_lat) || !self.ignition_lng.is_finite() {
            return Err(FireGrowthError::config(format!(
                "ignition point ({}, {}) is not a valid coordinate",
                self.ignition_lat, self.ignition_lng
            )));
        }
        if !self.duration_hours.is_finite() || self.duration_hours <= 0.0 {
            return Err(FireGrowthError::config(format!(
                "duration_hours must be positive, got {}",
                self.duration_hours
            )));
        }
        if !self.snapshot_interval_minutes.is_finite() || self.snapshot_interval_minutes <= 0.0 {
            return Err(FireGrowthError::config(format!(
                "snapshot_interval_minutes must be positive, got {}",
                self.snapshot_interval_minutes
            )));
        }
        if self.snapshot_interval_minutes > self.duration_hours * 60.0 + TIME_EPS {
            return Err(FireGrowthError::config(
                "snapshot_interval_minutes must not exceed the run duration",
            ));
        }
        if let Some(slope) = self.slope_pct {
            if !slope.is_finite() || slope < 0.0 {
                return Err(FireGrowthError::config(format!(
                    "slope_pct must be finite and non-negative, got {slope}"
                )));
            }
        }
        if let Some(aspect) = self.aspect_deg {
            if !aspect.is_finite() {
                return Err(FireGrowthError::config("aspect_deg must be finite"));
            }
        }
        Ok(())
    }
}

/// One time-stamped snapshot of the fire.
///
/// The perimeter is a closed ring of `[lat, lng]` pairs (first point
/// repeated); `fuel_breakdown` fractions sum to 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub time_hours: f64,
    pub perimeter: Vec<[f64; 2]>,
    pub area_ha: f64,
    pub head_ros_m_min: f64,
    pub max_hfi_kw_m: f64,
    pub fire_type: FireType,
    pub flame_length_m: f64,
    pub fuel_breakdown: FxHashMap<String, f64>,
}

/// Driver lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    Initializing,
    Running,
    Completed,
    Failed,
}

/// Run a simulation, returning the lazy frame sequence.
///
/// The sequence is finite, emits frames in strictly monotone `time_hours`,
/// and is not restartable. Configuration problems surface here, before any
/// frame is produced.
pub fn simulate(config: SimulationConfig) -> Result<FireGrowthSimulation, FireGrowthError> {
    FireGrowthSimulation::new(config)
}

/// A running simulation; iterate to pull frames.
#[derive(Debug)]
pub struct FireGrowthSimulation {
    fuel: FuelCode,
    fwi: FwiState,
    behavior: FireBehavior,
    slope_pct: f64,
    aspect_deg: f64,
    spread_azimuth: f64,
    plane: LocalFrame,
    perimeter: Perimeter,
    state: SimulationState,
    time_min: f64,
    end_min: f64,
    interval_min: f64,
    next_snapshot_min: f64,
    steps: usize,
    /// Slope-adjusted peaks from the latest step, reported in frames
    peak_head_ros: f64,
    peak_hfi: f64,
}

impl FireGrowthSimulation {
    /// Validate the configuration, evaluate the FWI/FBP stack once, and seed
    /// the ignition polygon.
    pub fn new(config: SimulationConfig) -> Result<Self, FireGrowthError> {
        config.validate()?;
        let overrides = config.fwi_overrides.unwrap_or_default();
        let fwi = FwiState::from_weather_with_overrides(&config.weather, &overrides)
            .map_err(FireGrowthError::into_config)?;
        let behavior = fire_behavior(config.fuel_type, &fwi, &config.weather, &config.fbp_options)
            .map_err(FireGrowthError::into_config)?;

        let slope_pct = config.slope_pct.unwrap_or(0.0);
        let aspect_deg = config.aspect_deg.unwrap_or(0.0);
        let interval_min = config.snapshot_interval_minutes;
        let end_min = config.duration_hours * 60.0;

        // Seed radius follows the first adaptive step so the initial ring is
        // on the same scale as one step of growth.
        let dt0 = adaptive_step(&behavior, slope_pct, interval_min);
        let seed_radius = (behavior.ros_head * dt0).max(1.0);
        let plane = LocalFrame::new(config.ignition_lat, config.ignition_lng);
        let perimeter = Perimeter::seed(Point2::new(0.0, 0.0), seed_radius, SEED_VERTICES);

        info!(
            fuel = %config.fuel_type,
            isi = fwi.isi,
            bui = fwi.bui,
            ros_head = behavior.ros_head,
            fire_type = behavior.fire_type.as_str(),
            "simulation initialised"
        );

        Ok(Self {
            fuel: config.fuel_type,
            fwi,
            behavior,
            slope_pct,
            aspect_deg,
            spread_azimuth: config.weather.spread_azimuth(),
            plane,
            perimeter,
            state: SimulationState::Initializing,
            time_min: 0.0,
            end_min,
            interval_min,
            next_snapshot_min: interval_min,
            steps: 0,
            peak_head_ros: behavior.ros_head,
            peak_hfi: behavior.head_fire_intensity,
        })
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// Simulated time so far, hours.
    pub fn time_hours(&self) -> f64 {
        self.time_min / 60.0
    }

    /// Number of integration steps taken.
    pub fn step_count(&self) -> usize {
        self.steps
    }

    /// The FWI components this run was evaluated with.
    pub fn fwi(&self) -> &FwiState {
        &self.fwi
    }

    /// The flat-ground fire behavior this run was evaluated with.
    pub fn behavior(&self) -> &FireBehavior {
        &self.behavior
    }

    /// Advance the front by one adaptive step.
    fn step(&mut self) -> Result<(), FireGrowthError> {
        if self.perimeter.is_degenerate() {
            // A collapsed front no longer propagates; run out the clock so
            // the remaining snapshots emit as zero-area frames.
            self.time_min = self.next_snapshot_min.min(self.end_min);
            return Ok(());
        }

        let dt = self
            .step_length()
            .min(self.next_snapshot_min.min(self.end_min) - self.time_min)
            .max(TIME_EPS);
        let normals = self.perimeter.outward_normals();
        let positions: Vec<Point2<f64>> = self.perimeter.positions().collect();

        let back_ratio = if self.behavior.ros_head > 0.0 {
            self.behavior.ros_back / self.behavior.ros_head
        } else {
            0.0
        };

        let mut next = Vec::with_capacity(positions.len());
        let mut peak_ros = 0.0f64;
        for (p, n) in positions.iter().zip(&normals) {
            let factor =
                slope::directional_slope_factor(azimuth_deg(*n), self.slope_pct, self.aspect_deg);
            let ros_head = self.behavior.ros_head * factor;
            let ros_back = ros_head * back_ratio;
            let ros_flank = (ros_head + ros_back) / (2.0 * self.behavior.length_to_breadth);
            let wavelet =
                WaveletEllipse::new(ros_head, ros_back, ros_flank, self.spread_azimuth, dt);
            next.push(p + wavelet.displace(*n));
            peak_ros = peak_ros.max(ros_head);
        }

        if next.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(FireGrowthError::numeric(
                self.time_hours(),
                "non-finite vertex position after wavelet expansion",
            ));
        }

        self.perimeter.set_positions(&next);
        self.perimeter.resample();
        let cuts = self.perimeter.remove_self_intersections();
        self.perimeter.enforce_ccw();

        self.time_min += dt;
        self.steps += 1;
        self.peak_head_ros = peak_ros;
        self.peak_hfi = 300.0 * self.behavior.total_fuel_consumption * peak_ros;

        debug!(
            step = self.steps,
            t_min = self.time_min,
            dt_min = dt,
            vertices = self.perimeter.len(),
            loops_cut = cuts,
            "front advanced"
        );
        if self.perimeter.is_degenerate() {
            warn!(
                t_min = self.time_min,
                "perimeter collapsed below 3 vertices; emitting zero-area frames"
            );
        }
        Ok(())
    }

    /// Adaptive step length (minutes), before snapshot-boundary clamping.
    fn step_length(&self) -> f64 {
        adaptive_step(&self.behavior, self.slope_pct, self.interval_min)
    }

    fn make_frame(&self) -> Frame {
        let mut ring: Vec<[f64; 2]> = self
            .perimeter
            .positions()
            .map(|p| {
                let (lat, lng) = self.plane.to_geographic(p);
                [lat, lng]
            })
            .collect();
        if let Some(first) = ring.first().copied() {
            ring.push(first);
        }

        let mut fuel_breakdown = FxHashMap::default();
        fuel_breakdown.insert(self.fuel.to_string(), 1.0);

        Frame {
            time_hours: self.time_min / 60.0,
            perimeter: ring,
            area_ha: self.perimeter.area_m2() / 10_000.0,
            head_ros_m_min: self.peak_head_ros,
            max_hfi_kw_m: self.peak_hfi,
            fire_type: self.behavior.fire_type,
            flame_length_m: self.behavior.flame_length,
            fuel_breakdown,
        }
    }
}

impl Iterator for FireGrowthSimulation {
    type Item = Result<Frame, FireGrowthError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            SimulationState::Completed | SimulationState::Failed => return None,
            SimulationState::Initializing => {
                self.state = SimulationState::Running;
                return Some(Ok(self.make_frame()));
            }
            SimulationState::Running => {}
        }

        loop {
            if let Err(err) = self.step() {
                self.state = SimulationState::Failed;
                return Some(Err(err));
            }
            let boundary = self.next_snapshot_min.min(self.end_min);
            if self.time_min + TIME_EPS >= boundary {
                self.next_snapshot_min += self.interval_min;
                let frame = self.make_frame();
                if self.time_min + TIME_EPS >= self.end_min {
                    self.state = SimulationState::Completed;
                }
                return Some(Ok(frame));
            }
        }
    }
}

/// Step length keeping the largest per-vertex displacement under half the
/// resampling split threshold, clamped to [1 s, snapshot interval].
fn adaptive_step(behavior: &FireBehavior, slope_pct: f64, interval_min: f64) -> f64 {
    let max_ros = behavior.ros_head * slope::slope_factor(slope_pct);
    if max_ros <= 0.0 {
        return interval_min;
    }
    (MAX_VERTEX_SPACING_M / 2.0 / max_ros).clamp(MIN_STEP_MIN, interval_min)
}

/// Azimuth (degrees, clockwise from north) of a direction vector.
fn azimuth_deg(v: Vector2<f64>) -> f64 {
    v.x.atan2(v.y).to_degrees().rem_euclid(360.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(fuel: FuelCode, wind_speed: f64) -> SimulationConfig {
        SimulationConfig {
            ignition_lat: 51.0,
            ignition_lng: -114.0,
            weather: Weather {
                wind_speed,
                wind_direction: 270.0,
                temperature: 20.0,
                relative_humidity: 30.0,
                precipitation_24h: 0.0,
            },
            fwi_overrides: Some(FwiOverrides {
                ffmc: Some(90.0),
                dmc: Some(45.0),
                dc: Some(300.0),
                ..FwiOverrides::default()
            }),
            fuel_type: fuel,
            duration_hours: 1.0,
            snapshot_interval_minutes: 30.0,
            slope_pct: None,
            aspect_deg: None,
            fbp_options: FbpOptions::default(),
        }
    }

    #[test]
    fn test_rejects_non_positive_duration() {
        let mut c = config(FuelCode::C2, 20.0);
        c.duration_hours = 0.0;
        assert!(matches!(
            simulate(c),
            Err(FireGrowthError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_rejects_interval_longer_than_run() {
        let mut c = config(FuelCode::C2, 20.0);
        c.snapshot_interval_minutes = 120.0;
        assert!(simulate(c).is_err());
    }

    #[test]
    fn test_rejects_invalid_weather() {
        let mut c = config(FuelCode::C2, 20.0);
        c.weather.relative_humidity = -10.0;
        let err = simulate(c).unwrap_err();
        assert!(matches!(err, FireGrowthError::InvalidConfig { .. }));
    }

    #[test]
    fn test_initial_frame_at_time_zero() {
        let mut sim = simulate(config(FuelCode::C2, 20.0)).unwrap();
        let first = sim.next().unwrap().unwrap();
        assert_eq!(first.time_hours, 0.0);
        assert!(first.area_ha < 0.1);
        assert_eq!(first.perimeter.first(), first.perimeter.last());
    }

    #[test]
    fn test_frame_times_are_snapshot_boundaries() {
        let sim = simulate(config(FuelCode::C2, 20.0)).unwrap();
        let times: Vec<f64> = sim.map(|f| f.unwrap().time_hours).collect();
        assert_eq!(times.len(), 3); // t = 0, 0.5, 1.0
        assert!((times[1] - 0.5).abs() < 1e-9);
        assert!((times[2] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_frames_are_monotone_and_closed() {
        let sim = simulate(config(FuelCode::C2, 20.0)).unwrap();
        let mut last_time = -1.0;
        for frame in sim {
            let frame = frame.unwrap();
            assert!(frame.time_hours > last_time);
            last_time = frame.time_hours;
            assert_eq!(frame.perimeter.first(), frame.perimeter.last());
            assert!(frame.area_ha >= 0.0);
            let total: f64 = frame.fuel_breakdown.values().sum();
            assert!((total - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_area_grows_under_wind() {
        let sim = simulate(config(FuelCode::C2, 20.0)).unwrap();
        let frames: Vec<Frame> = sim.map(Result::unwrap).collect();
        assert!(frames.last().unwrap().area_ha > frames[0].area_ha);
    }

    #[test]
    fn test_sequence_ends_after_duration() {
        let mut sim = simulate(config(FuelCode::C2, 20.0)).unwrap();
        let n = sim.by_ref().count();
        assert_eq!(n, 3);
        assert_eq!(sim.state(), SimulationState::Completed);
        assert!(sim.next().is_none());
    }

    #[test]
    fn test_final_frame_lands_on_off_grid_duration() {
        let mut c = config(FuelCode::C2, 20.0);
        c.duration_hours = 0.75; // 45 min with a 30 min interval
        let times: Vec<f64> = simulate(c)
            .unwrap()
            .map(|f| f.unwrap().time_hours)
            .collect();
        assert_eq!(times.len(), 3);
        assert!((times[2] - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_fire_type_reported() {
        let mut sim = simulate(config(FuelCode::O1b, 30.0)).unwrap();
        let frame = sim.next().unwrap().unwrap();
        assert_eq!(frame.fire_type, FireType::Surface);
    }

    #[test]
    fn test_frame_serialises_to_snapshot_schema() {
        let mut sim = simulate(config(FuelCode::C2, 20.0)).unwrap();
        let frame = sim.next().unwrap().unwrap();
        let json = serde_json::to_value(&frame).unwrap();
        assert!(json.get("time_hours").is_some());
        assert!(json.get("perimeter").is_some());
        assert!(json.get("area_ha").is_some());
        assert!(json.get("head_ros_m_min").is_some());
        assert!(json.get("max_hfi_kw_m").is_some());
        assert!(json.get("flame_length_m").is_some());
        assert_eq!(
            json.get("fire_type").unwrap().as_str().unwrap(),
            "active_crown"
        );
        assert!(json["fuel_breakdown"].get("C2").is_some());
    }

    #[test]
    fn test_azimuth_of_axes() {
        assert!((azimuth_deg(Vector2::new(0.0, 1.0)) - 0.0).abs() < 1e-12);
        assert!((azimuth_deg(Vector2::new(1.0, 0.0)) - 90.0).abs() < 1e-12);
        assert!((azimuth_deg(Vector2::new(0.0, -1.0)) - 180.0).abs() < 1e-12);
        assert!((azimuth_deg(Vector2::new(-1.0, 0.0)) - 270.0).abs() < 1e-12);
    }
}
