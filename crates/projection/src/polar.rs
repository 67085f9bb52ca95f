//! Spherical polar stereographic projection.
//!
//! Used by NCEP polar grids and most Arctic/Antarctic map views. The scale
//! is true at the standard parallel.

use std::f64::consts::PI;

use crate::transform::{wrap_longitude, wrap_radians, Projection};

const TO_RAD: f64 = PI / 180.0;
const TO_DEG: f64 = 180.0 / PI;

#[derive(Debug, Clone)]
pub struct PolarStereographic {
    /// Longitude pointing straight down from the pole (radians)
    pub lon0: f64,
    /// North or south polar aspect
    pub north: bool,
    /// `R * (1 + sin |lat_ts|)`
    scale: f64,
    pub false_easting: f64,
    pub false_northing: f64,
}

impl PolarStereographic {
    pub fn new(lon0_deg: f64, north: bool, standard_parallel_deg: f64, earth_radius: f64) -> Self {
        let lat_ts = standard_parallel_deg.abs() * TO_RAD;
        Self {
            lon0: lon0_deg * TO_RAD,
            north,
            scale: earth_radius * (1.0 + lat_ts.sin()),
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

impl Projection for PolarStereographic {
    fn forward(&self, lon_deg: f64, lat_deg: f64) -> Option<(f64, f64)> {
        if !lon_deg.is_finite() || !(-90.0..=90.0).contains(&lat_deg) {
            return None;
        }
        let lat = lat_deg * TO_RAD;
        let dlon = wrap_radians(lon_deg * TO_RAD - self.lon0);

        let (x, y) = if self.north {
            if lat_deg <= -90.0 {
                return None;
            }
            let rho = self.scale * (PI / 4.0 - lat / 2.0).tan();
            (rho * dlon.sin(), -rho * dlon.cos())
        } else {
            if lat_deg >= 90.0 {
                return None;
            }
            let rho = self.scale * (PI / 4.0 + lat / 2.0).tan();
            (rho * dlon.sin(), rho * dlon.cos())
        };

        Some((x + self.false_easting, y + self.false_northing))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let dx = x - self.false_easting;
        let dy = y - self.false_northing;
        let rho = (dx * dx + dy * dy).sqrt();
        let c = 2.0 * (rho / self.scale).atan();

        let (lat, lon) = if self.north {
            (PI / 2.0 - c, self.lon0 + dx.atan2(-dy))
        } else {
            (c - PI / 2.0, self.lon0 + dx.atan2(dy))
        };

        Some((wrap_longitude(lon * TO_DEG), lat * TO_DEG))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wx_common::crs::DEFAULT_EARTH_RADIUS;

    #[test]
    fn test_pole_is_origin() {
        let proj = PolarStereographic::new(-105.0, true, 60.0, DEFAULT_EARTH_RADIUS);
        let (x, y) = proj.forward(0.0, 90.0).unwrap();
        assert!(x.abs() < 1e-6 && y.abs() < 1e-6);
    }

    #[test]
    fn test_central_meridian_points_down() {
        let proj = PolarStereographic::new(-105.0, true, 60.0, DEFAULT_EARTH_RADIUS);
        let (x, y) = proj.forward(-105.0, 50.0).unwrap();
        assert!(x.abs() < 1e-6);
        assert!(y < 0.0);
    }

    #[test]
    fn test_south_roundtrip() {
        let proj = PolarStereographic::new(0.0, false, -71.0, DEFAULT_EARTH_RADIUS);
        let (x, y) = proj.forward(45.0, -70.0).unwrap();
        let (lon, lat) = proj.inverse(x, y).unwrap();
        assert!((lon - 45.0).abs() < 1e-8);
        assert!((lat + 70.0).abs() < 1e-8);
    }
}
