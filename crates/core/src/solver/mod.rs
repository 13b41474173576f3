//! Huygens wavelet front propagation.
//!
//! The fire front is an explicit closed polygon. Each integration step every
//! vertex emits an elliptical wavelet shaped by the local spread rates and
//! advances to the wavelet boundary along its outward normal; the ring is
//! then resampled, cleaned of self-intersections, and re-wound.

mod ellipse;
mod perimeter;

pub use ellipse::WaveletEllipse;
pub use perimeter::{
    FireVertex, Perimeter, MAX_VERTEX_SPACING_M, MIN_VERTEX_SPACING_M,
};
