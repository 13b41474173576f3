//! Fire Growth Core Library
//!
//! Simulates the spatial growth of a wildfire from a point ignition under
//! constant weather and a single uniform fuel type. The Canadian Fire
//! Weather Index and Fire Behavior Prediction systems supply directional
//! spread rates and intensities; a Huygens wavelet propagator advances a
//! closed polygonal fire front; the driver emits time-stamped perimeter
//! frames as a lazy sequence.

pub mod error;
pub mod fuel;
pub mod physics;
pub mod simulation;
pub mod solver;
pub mod spatial;
pub mod weather;

// Re-export main types
pub use error::FireGrowthError;
pub use fuel::{FuelCode, FuelGroup, FuelParams};
pub use physics::{
    fire_behavior, FbpOptions, FireBehavior, FireType, FwiOverrides, FwiState,
};
pub use simulation::{
    simulate, FireGrowthSimulation, Frame, SimulationConfig, SimulationState,
};
pub use solver::{FireVertex, Perimeter};
pub use spatial::LocalFrame;
pub use weather::Weather;
