//! Remote data boundary for the gallery recipes.
//!
//! Two request shapes are supported:
//!
//! - [`NcssQuery`]: a THREDDS NetCDF Subset Service query for gridded model
//!   output, answered with a netCDF file.
//! - [`DataRequest`]: a point data request (lightning flashes, surface
//!   observations) resolved to an OGC EDR `cube` query, answered with
//!   GeoJSON or netCDF.
//!
//! [`DataClient`] performs one-shot HTTP requests and decodes the responses
//! into [`wx_common::Field`]s and [`wx_common::PointBatch`]es.

pub mod client;
pub mod config;
pub mod error;
pub mod geojson;
pub mod ncss;
pub mod request;

pub use client::DataClient;
pub use config::AccessConfig;
pub use error::{AccessError, AccessResult};
pub use geojson::{decode_points, PointFeature, PointFeatureCollection};
pub use ncss::{Accept, HorizontalSubset, NcssQuery};
pub use request::{DataRequest, DataRequestBuilder, DataType, ResponseFormat};
