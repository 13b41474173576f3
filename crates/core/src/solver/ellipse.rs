//! Per-vertex Huygens wavelet ellipse.
//!
//! Every front vertex is the source of an elemental wavelet: an ellipse whose
//! shape is set by the head/flank/back spread rates and whose major axis is
//! aligned with the spread direction (downwind). The vertex advances to the
//! ellipse boundary along its outward normal, which is the Richards (1990)
//! vertex-expansion scheme used by Prometheus-style growth models.

use nalgebra::Vector2;

const EPS: f64 = 1e-12;

/// Time-parameterised wavelet ellipse for one integration step.
///
/// Axes and offset follow the standard construction from directional spread
/// rates over a step of `dt` minutes:
/// - semi-major `a = (ROS_head + ROS_back)/2 · dt`
/// - semi-minor `b = ROS_flank · dt`
/// - center offset `c = (ROS_head − ROS_back)/2 · dt` downwind of the vertex
#[derive(Debug, Clone, Copy)]
pub struct WaveletEllipse {
    semi_major: f64,
    semi_minor: f64,
    center_offset: f64,
    /// Unit vector of the spread azimuth (x east, y north)
    spread: Vector2<f64>,
}

impl WaveletEllipse {
    /// Build the wavelet for the given spread rates (m/min), spread azimuth
    /// (degrees, direction the head moves toward), and step length (minutes).
    pub fn new(
        ros_head: f64,
        ros_back: f64,
        ros_flank: f64,
        spread_azimuth_deg: f64,
        dt_min: f64,
    ) -> Self {
        let az = spread_azimuth_deg.to_radians();
        Self {
            semi_major: (ros_head + ros_back) / 2.0 * dt_min,
            semi_minor: ros_flank * dt_min,
            center_offset: (ros_head - ros_back) / 2.0 * dt_min,
            spread: Vector2::new(az.sin(), az.cos()),
        }
    }

    /// Displacement of the source vertex advancing along `normal` (unit
    /// vector) to the wavelet boundary. Returns zero when the wavelet has
    /// collapsed (no spread) or the ray cannot reach the boundary.
    pub fn displace(&self, normal: Vector2<f64>) -> Vector2<f64> {
        let (a, b) = (self.semi_major, self.semi_minor);
        if a <= EPS || b <= EPS || normal.norm_squared() < EPS {
            return Vector2::zeros();
        }

        // Ellipse frame: x' along the spread direction, y' to its left.
        let perp = Vector2::new(-self.spread.y, self.spread.x);
        // Vertex sits at (-c, 0) relative to the ellipse center.
        let ox = -self.center_offset;
        let dx = normal.dot(&self.spread);
        let dy = normal.dot(&perp);

        // Solve ((ox + t·dx)/a)² + ((t·dy)/b)² = 1 for the positive root.
        let qa = (dx / a).powi(2) + (dy / b).powi(2);
        let qb = 2.0 * ox * dx / (a * a);
        let qc = (ox / a).powi(2) - 1.0;
        let disc = qb * qb - 4.0 * qa * qc;
        if disc < 0.0 || qa <= EPS {
            return Vector2::zeros();
        }
        let t = (-qb + disc.sqrt()) / (2.0 * qa);
        if t <= 0.0 {
            return Vector2::zeros();
        }
        normal * t
    }
}
