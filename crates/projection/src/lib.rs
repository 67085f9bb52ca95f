//! Coordinate reference system transformations.
//!
//! Implements the spherical map projections used by NWP grids from scratch,
//! plus the vector transform that rotates wind components between
//! projections (including grid-relative to earth-relative).

pub mod geographic;
pub mod lambert;
pub mod mercator;
pub mod polar;
pub mod transform;
pub mod wind;

pub use geographic::Geographic;
pub use lambert::LambertConformal;
pub use mercator::Mercator;
pub use polar::PolarStereographic;
pub use transform::{projection_for, Projection};
pub use wind::{earth_relative_wind_components, transform_vectors, WindError};
