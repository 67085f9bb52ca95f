//! Lambert Conformal Conic projection.
//!
//! This projection is used by most regional NWP grids, including HRRR and
//! NAM. It maps a cone tangent or secant to a spherical Earth onto a plane.
//!
//! Parameters follow the CF `lambert_conformal_conic` grid mapping:
//! - Central meridian (lon0, LoV in GRIB2)
//! - Latitude of projection origin (lat0), where y = false northing
//! - Standard parallel(s): Latin1 and Latin2 (equal for a tangent cone)
//!
//! Projected coordinates are meters from the origin.

use std::f64::consts::PI;

use crate::transform::{wrap_longitude, wrap_radians, Projection};
use wx_common::crs::DEFAULT_EARTH_RADIUS;

const TO_RAD: f64 = PI / 180.0;
const TO_DEG: f64 = 180.0 / PI;

/// Lambert Conformal Conic projection parameters.
#[derive(Debug, Clone)]
pub struct LambertConformal {
    /// Central meridian in radians
    pub lon0: f64,
    /// Latitude of origin in radians
    pub lat0: f64,
    /// First standard parallel in radians
    pub latin1: f64,
    /// Second standard parallel in radians
    pub latin2: f64,
    /// Earth radius (meters)
    pub earth_radius: f64,
    pub false_easting: f64,
    pub false_northing: f64,
    /// Cone constant (n)
    n: f64,
    /// F constant
    f: f64,
    /// Rho at the latitude of origin
    rho0: f64,
}

impl LambertConformal {
    /// Create a projection from parameters in degrees.
    ///
    /// # Arguments
    /// * `lon0_deg` - Central meridian (degrees, 0..360 or -180..180)
    /// * `lat0_deg` - Latitude of projection origin (degrees)
    /// * `latin1_deg` - First standard parallel (degrees)
    /// * `latin2_deg` - Second standard parallel (degrees)
    /// * `earth_radius` - Sphere radius (meters)
    pub fn new(
        lon0_deg: f64,
        lat0_deg: f64,
        latin1_deg: f64,
        latin2_deg: f64,
        earth_radius: f64,
    ) -> Self {
        let lon0 = lon0_deg * TO_RAD;
        let lat0 = lat0_deg * TO_RAD;
        let latin1 = latin1_deg * TO_RAD;
        let latin2 = latin2_deg * TO_RAD;

        // Compute cone constant n
        let n = if (latin1 - latin2).abs() < 1e-10 {
            // Tangent cone (single standard parallel)
            latin1.sin()
        } else {
            // Secant cone (two standard parallels)
            let ln_ratio = (latin1.cos() / latin2.cos()).ln();
            let tan_ratio =
                ((PI / 4.0 + latin2 / 2.0).tan() / (PI / 4.0 + latin1 / 2.0).tan()).ln();
            ln_ratio / tan_ratio
        };

        let f = (latin1.cos() * (PI / 4.0 + latin1 / 2.0).tan().powf(n)) / n;
        let rho0 = earth_radius * f / (PI / 4.0 + lat0 / 2.0).tan().powf(n);

        Self {
            lon0,
            lat0,
            latin1,
            latin2,
            earth_radius,
            false_easting: 0.0,
            false_northing: 0.0,
            n,
            f,
            rho0,
        }
    }

    pub fn with_false_origin(mut self, false_easting: f64, false_northing: f64) -> Self {
        self.false_easting = false_easting;
        self.false_northing = false_northing;
        self
    }

    /// HRRR / NAM CONUS projection.
    ///
    /// - LoV: 262.5°E (= -97.5°)
    /// - Standard parallels: 38.5°N (both)
    /// - Origin: 38.5°N
    pub fn hrrr() -> Self {
        Self::new(-97.5, 38.5, 38.5, 38.5, DEFAULT_EARTH_RADIUS)
    }

    /// Cone constant.
    pub fn cone_constant(&self) -> f64 {
        self.n
    }

    /// Angle (radians) between grid north and true north at `lon_deg`.
    ///
    /// Positive east of the central meridian. Rotating grid-relative winds
    /// by this angle yields earth-relative winds.
    pub fn convergence_angle(&self, lon_deg: f64) -> f64 {
        self.n * wrap_radians(lon_deg * TO_RAD - self.lon0)
    }

    fn rho(&self, lat: f64) -> f64 {
        self.earth_radius * self.f / (PI / 4.0 + lat / 2.0).tan().powf(self.n)
    }
}

impl Projection for LambertConformal {
    fn forward(&self, lon_deg: f64, lat_deg: f64) -> Option<(f64, f64)> {
        if !lon_deg.is_finite() || !(-90.0..=90.0).contains(&lat_deg) {
            return None;
        }
        let lat = lat_deg * TO_RAD;

        // The pole opposite the cone apex maps to infinity.
        if (lat + self.n.signum() * PI / 2.0).abs() < 1e-12 {
            return None;
        }

        let rho = self.rho(lat);
        let theta = self.n * wrap_radians(lon_deg * TO_RAD - self.lon0);

        let x = rho * theta.sin() + self.false_easting;
        let y = self.rho0 - rho * theta.cos() + self.false_northing;
        Some((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let sign = self.n.signum();
        let dx = x - self.false_easting;
        let dy = self.rho0 - (y - self.false_northing);

        let rho = sign * (dx * dx + dy * dy).sqrt();
        if rho == 0.0 {
            return Some((self.lon0 * TO_DEG, sign * 90.0));
        }

        let theta = (sign * dx).atan2(sign * dy);
        let lat = 2.0 * (self.earth_radius * self.f / rho).powf(1.0 / self.n).atan() - PI / 2.0;
        let lon = self.lon0 + theta / self.n;

        Some((wrap_longitude(lon * TO_DEG), lat * TO_DEG))
    }
}
