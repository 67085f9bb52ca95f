//! Grid mapping metadata.
//!
//! Mirrors the CF-conventions `grid_mapping` attribute sets that gridded
//! datasets carry. The projection math itself lives in the `projection`
//! crate; this type only describes which projection a grid uses.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{WxError, WxResult};

/// Mean earth radius used by NCEP models (meters).
pub const DEFAULT_EARTH_RADIUS: f64 = 6_371_229.0;

/// Coordinate reference metadata attached to a gridded field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "grid_mapping_name", rename_all = "snake_case")]
pub enum GridCrs {
    /// Regular longitude/latitude grid (axes in degrees).
    LatitudeLongitude { earth_radius: f64 },

    /// Lambert conformal conic (axes in meters).
    LambertConformalConic {
        longitude_of_central_meridian: f64,
        latitude_of_projection_origin: f64,
        standard_parallel: (f64, f64),
        false_easting: f64,
        false_northing: f64,
        earth_radius: f64,
    },

    /// Polar stereographic (axes in meters).
    PolarStereographic {
        straight_vertical_longitude_from_pole: f64,
        /// +90 for north polar grids, -90 for south.
        latitude_of_projection_origin: f64,
        standard_parallel: f64,
        false_easting: f64,
        false_northing: f64,
        earth_radius: f64,
    },

    /// Mercator (axes in meters).
    Mercator {
        longitude_of_projection_origin: f64,
        standard_parallel: f64,
        false_easting: f64,
        false_northing: f64,
        earth_radius: f64,
    },
}

impl GridCrs {
    /// Plain lon/lat grid on the default sphere.
    pub fn geographic() -> Self {
        GridCrs::LatitudeLongitude {
            earth_radius: DEFAULT_EARTH_RADIUS,
        }
    }

    /// Lambert conformal with a single tangent parallel.
    pub fn lambert(central_longitude: f64, origin_latitude: f64, parallels: (f64, f64)) -> Self {
        GridCrs::LambertConformalConic {
            longitude_of_central_meridian: central_longitude,
            latitude_of_projection_origin: origin_latitude,
            standard_parallel: parallels,
            false_easting: 0.0,
            false_northing: 0.0,
            earth_radius: DEFAULT_EARTH_RADIUS,
        }
    }

    /// The HRRR / NAM CONUS Lambert conformal grid mapping.
    pub fn conus_lambert() -> Self {
        Self::lambert(-97.5, 38.5, (38.5, 38.5))
    }

    /// North polar stereographic true at 60N.
    pub fn north_polar_stereographic(central_longitude: f64) -> Self {
        GridCrs::PolarStereographic {
            straight_vertical_longitude_from_pole: central_longitude,
            latitude_of_projection_origin: 90.0,
            standard_parallel: 60.0,
            false_easting: 0.0,
            false_northing: 0.0,
            earth_radius: DEFAULT_EARTH_RADIUS,
        }
    }

    /// Spherical Mercator true at the equator.
    pub fn mercator(central_longitude: f64) -> Self {
        GridCrs::Mercator {
            longitude_of_projection_origin: central_longitude,
            standard_parallel: 0.0,
            false_easting: 0.0,
            false_northing: 0.0,
            earth_radius: DEFAULT_EARTH_RADIUS,
        }
    }

    /// True for lon/lat grids (axes in degrees).
    pub fn is_geographic(&self) -> bool {
        matches!(self, GridCrs::LatitudeLongitude { .. })
    }

    /// Earth radius the projection is defined on.
    pub fn earth_radius(&self) -> f64 {
        match self {
            GridCrs::LatitudeLongitude { earth_radius }
            | GridCrs::LambertConformalConic { earth_radius, .. }
            | GridCrs::PolarStereographic { earth_radius, .. }
            | GridCrs::Mercator { earth_radius, .. } => *earth_radius,
        }
    }

    /// CF name of the grid mapping.
    pub fn grid_mapping_name(&self) -> &'static str {
        match self {
            GridCrs::LatitudeLongitude { .. } => "latitude_longitude",
            GridCrs::LambertConformalConic { .. } => "lambert_conformal_conic",
            GridCrs::PolarStereographic { .. } => "polar_stereographic",
            GridCrs::Mercator { .. } => "mercator",
        }
    }

    /// Build from the numeric/string attributes of a CF grid-mapping variable.
    ///
    /// `standard_parallel` may hold one or two values; a single value is
    /// used for both parallels of a tangent cone.
    pub fn from_cf_attributes(
        name: &str,
        numbers: &HashMap<String, Vec<f64>>,
    ) -> WxResult<Self> {
        let first = |key: &str| numbers.get(key).and_then(|v| v.first().copied());
        let required = |key: &str| {
            first(key).ok_or_else(|| WxError::InvalidCrs(format!("{} requires '{}'", name, key)))
        };
        let earth_radius = first("earth_radius").unwrap_or(DEFAULT_EARTH_RADIUS);
        let false_easting = first("false_easting").unwrap_or(0.0);
        let false_northing = first("false_northing").unwrap_or(0.0);

        match name {
            "latitude_longitude" => Ok(GridCrs::LatitudeLongitude { earth_radius }),
            "lambert_conformal_conic" => {
                let parallels = numbers
                    .get("standard_parallel")
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| {
                        WxError::InvalidCrs(format!("{} requires 'standard_parallel'", name))
                    })?;
                let p1 = parallels[0];
                let p2 = parallels.get(1).copied().unwrap_or(p1);
                Ok(GridCrs::LambertConformalConic {
                    longitude_of_central_meridian: required("longitude_of_central_meridian")?,
                    latitude_of_projection_origin: first("latitude_of_projection_origin")
                        .unwrap_or(p1),
                    standard_parallel: (p1, p2),
                    false_easting,
                    false_northing,
                    earth_radius,
                })
            }
            "polar_stereographic" => Ok(GridCrs::PolarStereographic {
                straight_vertical_longitude_from_pole: required(
                    "straight_vertical_longitude_from_pole",
                )?,
                latitude_of_projection_origin: first("latitude_of_projection_origin")
                    .unwrap_or(90.0),
                standard_parallel: first("standard_parallel").unwrap_or(60.0),
                false_easting,
                false_northing,
                earth_radius,
            }),
            "mercator" => Ok(GridCrs::Mercator {
                longitude_of_projection_origin: first("longitude_of_projection_origin")
                    .unwrap_or(0.0),
                standard_parallel: first("standard_parallel").unwrap_or(0.0),
                false_easting,
                false_northing,
                earth_radius,
            }),
            other => Err(WxError::InvalidCrs(format!(
                "unsupported grid_mapping_name '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for GridCrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.grid_mapping_name())
    }
}
