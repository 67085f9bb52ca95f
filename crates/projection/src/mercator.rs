//! Spherical Mercator projection.

use std::f64::consts::PI;

use crate::transform::{wrap_longitude, wrap_radians, Projection};

const TO_RAD: f64 = PI / 180.0;
const TO_DEG: f64 = 180.0 / PI;

/// Latitudes beyond this are not representable.
const MAX_LATITUDE: f64 = 89.5;

#[derive(Debug, Clone)]
pub struct Mercator {
    /// Central meridian (radians)
    pub lon0: f64,
    /// `R * cos(lat_ts)`
    scale: f64,
    pub false_easting: f64,
    pub false_northing: f64,
}

impl Mercator {
    pub fn new(lon0_deg: f64, standard_parallel_deg: f64, earth_radius: f64) -> Self {
        Self {
            lon0: lon0_deg * TO_RAD,
            scale: earth_radius * (standard_parallel_deg * TO_RAD).cos(),
            false_easting: 0.0,
            false_northing: 0.0,
        }
    }

    pub fn with_false_origin(mut self, false_easting: f64, false_northing: f64) -> Self {
        self.false_easting = false_easting;
        self.false_northing = false_northing;
        self
    }
}

impl Projection for Mercator {
    fn forward(&self, lon_deg: f64, lat_deg: f64) -> Option<(f64, f64)> {
        if !lon_deg.is_finite() || !lat_deg.is_finite() || lat_deg.abs() > MAX_LATITUDE {
            return None;
        }
        let lat = lat_deg * TO_RAD;
        let x = self.scale * wrap_radians(lon_deg * TO_RAD - self.lon0);
        let y = self.scale * (PI / 4.0 + lat / 2.0).tan().ln();
        Some((x + self.false_easting, y + self.false_northing))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let lon = self.lon0 + (x - self.false_easting) / self.scale;
        let lat = 2.0 * ((y - self.false_northing) / self.scale).exp().atan() - PI / 2.0;
        Some((wrap_longitude(lon * TO_DEG), lat * TO_DEG))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wx_common::crs::DEFAULT_EARTH_RADIUS;

    #[test]
    fn test_equator_is_linear_in_longitude() {
        let proj = Mercator::new(0.0, 0.0, DEFAULT_EARTH_RADIUS);
        let (x, y) = proj.forward(1.0, 0.0).unwrap();
        assert!((x - DEFAULT_EARTH_RADIUS * TO_RAD).abs() < 1e-6);
        assert!(y.abs() < 1e-6);
    }

    #[test]
    fn test_pole_rejected() {
        let proj = Mercator::new(0.0, 0.0, DEFAULT_EARTH_RADIUS);
        assert!(proj.forward(0.0, 90.0).is_none());
    }
}
