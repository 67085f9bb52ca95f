//! Plate carrée: projected coordinates are longitude/latitude.

use crate::transform::{wrap_longitude, Projection};

/// Identity projection for regular lon/lat grids.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Geographic;

impl Projection for Geographic {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if !(-90.0..=90.0).contains(&lat) {
            return None;
        }
        Some((lon, lat))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if !(-90.0..=90.0).contains(&y) {
            return None;
        }
        Some((wrap_longitude(x), y))
    }

    fn is_geographic(&self) -> bool {
        true
    }
}
