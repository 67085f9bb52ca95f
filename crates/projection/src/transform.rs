//! The projection trait and construction from grid-mapping metadata.

use std::f64::consts::PI;

use wx_common::GridCrs;

use crate::{Geographic, LambertConformal, Mercator, PolarStereographic};

/// A forward/inverse map between geographic and projected coordinates.
///
/// Longitudes and latitudes are in degrees. Projected coordinates are in
/// meters, except for [`Geographic`] where they are degrees as well.
pub trait Projection: Send + Sync + std::fmt::Debug {
    /// Geographic to projected. `None` when the point is not representable
    /// (e.g. a pole under Mercator).
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)>;

    /// Projected to geographic.
    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)>;

    /// True when projected coordinates are themselves lon/lat.
    fn is_geographic(&self) -> bool {
        false
    }
}

/// Build the projection described by `crs`.
pub fn projection_for(crs: &GridCrs) -> Box<dyn Projection> {
    match crs {
        GridCrs::LatitudeLongitude { .. } => Box::new(Geographic),
        GridCrs::LambertConformalConic {
            longitude_of_central_meridian,
            latitude_of_projection_origin,
            standard_parallel,
            false_easting,
            false_northing,
            earth_radius,
        } => Box::new(
            LambertConformal::new(
                *longitude_of_central_meridian,
                *latitude_of_projection_origin,
                standard_parallel.0,
                standard_parallel.1,
                *earth_radius,
            )
            .with_false_origin(*false_easting, *false_northing),
        ),
        GridCrs::PolarStereographic {
            straight_vertical_longitude_from_pole,
            latitude_of_projection_origin,
            standard_parallel,
            false_easting,
            false_northing,
            earth_radius,
        } => Box::new(
            PolarStereographic::new(
                *straight_vertical_longitude_from_pole,
                *latitude_of_projection_origin >= 0.0,
                *standard_parallel,
                *earth_radius,
            )
            .with_false_origin(*false_easting, *false_northing),
        ),
        GridCrs::Mercator {
            longitude_of_projection_origin,
            standard_parallel,
            false_easting,
            false_northing,
            earth_radius,
        } => Box::new(
            Mercator::new(
                *longitude_of_projection_origin,
                *standard_parallel,
                *earth_radius,
            )
            .with_false_origin(*false_easting, *false_northing),
        ),
    }
}

/// Wrap a longitude difference (radians) into [-π, π].
pub(crate) fn wrap_radians(mut dlon: f64) -> f64 {
    while dlon > PI {
        dlon -= 2.0 * PI;
    }
    while dlon < -PI {
        dlon += 2.0 * PI;
    }
    dlon
}

/// Wrap a longitude (degrees) into [-180, 180).
pub fn wrap_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == 180.0 {
        -180.0
    } else {
        wrapped
    }
}
