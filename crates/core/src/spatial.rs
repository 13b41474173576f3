//! Local metric tangent plane centred on the ignition point.
//!
//! All spread math runs in a flat east/north frame measured in meters;
//! geographic coordinates appear only at the configuration and frame
//! boundaries. The plane is an equirectangular projection scaled by the
//! cosine of the origin latitude, which is accurate to well under a percent
//! at fire scales (a few kilometers).

use nalgebra::Point2;

/// WGS84 equatorial radius (m).
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Projection between WGS84 coordinates and the local metric plane.
#[derive(Debug, Clone, Copy)]
pub struct LocalFrame {
    origin_lat: f64,
    origin_lng: f64,
    cos_lat: f64,
}

impl LocalFrame {
    /// Create a tangent plane centred on the given point.
    pub fn new(origin_lat: f64, origin_lng: f64) -> Self {
        Self {
            origin_lat,
            origin_lng,
            cos_lat: origin_lat.to_radians().cos(),
        }
    }

    /// Project a geographic point into the plane (x east, y north, meters).
    pub fn to_local(&self, lat: f64, lng: f64) -> Point2<f64> {
        let x = (lng - self.origin_lng).to_radians() * self.cos_lat * EARTH_RADIUS_M;
        let y = (lat - self.origin_lat).to_radians() * EARTH_RADIUS_M;
        Point2::new(x, y)
    }

    /// Invert the projection back to (lat, lng) degrees.
    pub fn to_geographic(&self, p: Point2<f64>) -> (f64, f64) {
        let lat = self.origin_lat + (p.y / EARTH_RADIUS_M).to_degrees();
        let lng = self.origin_lng + (p.x / (EARTH_RADIUS_M * self.cos_lat)).to_degrees();
        (lat, lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_origin_maps_to_zero() {
        let frame = LocalFrame::new(51.0, -114.0);
        let p = frame.to_local(51.0, -114.0);
        assert_relative_eq!(p.x, 0.0);
        assert_relative_eq!(p.y, 0.0);
    }

    #[test]
    fn test_round_trip() {
        let frame = LocalFrame::new(51.0, -114.0);
        let (lat, lng) = frame.to_geographic(Point2::new(1250.0, -730.0));
        let back = frame.to_local(lat, lng);
        assert_relative_eq!(back.x, 1250.0, epsilon = 1e-6);
        assert_relative_eq!(back.y, -730.0, epsilon = 1e-6);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let frame = LocalFrame::new(51.0, -114.0);
        let p = frame.to_local(52.0, -114.0);
        // One degree of latitude is ~111.3 km on the WGS84 sphere
        assert_relative_eq!(p.y, 111_319.5, max_relative = 1e-4);
    }

    #[test]
    fn test_longitude_scales_with_latitude() {
        let equator = LocalFrame::new(0.0, 0.0);
        let north = LocalFrame::new(60.0, 0.0);
        let at_equator = equator.to_local(0.0, 1.0).x;
        let at_60 = north.to_local(60.0, 1.0).x;
        assert_relative_eq!(at_60, at_equator * 0.5, max_relative = 1e-9);
    }
}
