//! Common types shared by every wx-gallery crate.
//!
//! The central type is [`Field`], a labeled multi-dimensional grid carrying
//! a physical unit and (optionally) the grid-mapping metadata of the data
//! source. Point observations arrive as a [`PointBatch`].

pub mod bbox;
pub mod crs;
pub mod error;
pub mod field;
pub mod points;
pub mod time;
pub mod units;

pub use bbox::BoundingBox;
pub use crs::GridCrs;
pub use error::{WxError, WxResult};
pub use field::{Field, VectorFrame, VerticalAxis};
pub use points::{Observation, PointBatch};
pub use time::TimeSelector;
pub use units::Unit;
