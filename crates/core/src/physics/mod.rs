//! The FWI/FBP equation stack and its directional modifiers.

pub mod crown_fire;
pub mod fbp;
pub mod fwi;
pub mod slope;

// Re-export public functions and types
pub use crown_fire::FireType;
pub use fbp::{fire_behavior, length_to_breadth, FbpOptions, FireBehavior};
pub use fwi::{FwiOverrides, FwiState};
pub use slope::{directional_slope_factor, slope_factor, MAX_SLOPE_FACTOR};
