//! NetCDF decoding for gridded model output and GLM lightning files.
//!
//! Payloads arrive as bytes from a remote service. The netcdf library needs
//! a file path, so bytes are staged in a temp file (memory-backed on Linux)
//! before opening.
//!
//! # CF decoding
//!
//! Gridded variables are decoded following the CF conventions:
//! - `scale_factor` / `add_offset` / `_FillValue` / `missing_value` / `_Unsigned`
//! - coordinate variables classified into x, y, vertical and time axes
//! - projected x/y axes in kilometres are converted to meters
//! - the `grid_mapping` attribute resolves to a [`GridCrs`](wx_common::GridCrs)
//! - only the first time step is kept

pub mod cf;
pub mod error;
pub mod glm;
pub mod native;

pub use error::{NetCdfError, NetCdfResult};
pub use glm::read_glm_flashes;
pub use native::{read_fields, silence_hdf5_errors};
