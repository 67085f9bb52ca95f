//! Derived meteorological quantities computed from labeled grids.
//!
//! Every function takes [`Field`](wx_common::Field)s, validates units and
//! grid alignment, and returns new fields on the same grid. Inputs are
//! never modified.

pub mod constants;
pub mod error;
pub mod isosurface;
pub mod kinematics;
pub mod smoothing;
pub mod thermo;
pub mod wind;

pub use error::{CalcError, CalcResult};
pub use isosurface::interpolate_to_isosurface;
pub use kinematics::{
    absolute_vorticity, advection, coriolis_field, coriolis_parameter, divergence, first_derivative_x,
    first_derivative_y, grid_deltas, vorticity, GridDeltas,
};
pub use smoothing::{smooth_gaussian, smooth_n_point, smooth_window, Window};
pub use thermo::{
    potential_temperature, potential_temperature_at, potential_vorticity_baroclinic,
};
pub use wind::{wind_direction, wind_speed};
