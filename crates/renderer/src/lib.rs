//! Static map rendering for gridded and point weather data.
//!
//! A [`MapCanvas`] fixes the projection, geographic extent and raster size.
//! Layers are drawn in order onto a [`MapPlot`]:
//! - [`FilledContour`]: colormap bands sampled pixel by pixel
//! - [`ContourLines`]: marching squares isolines with optional labels
//! - [`Barbs`]: wind barbs rotated into the map frame
//! - [`Scatter`]: point markers colored by value
//! - [`Graticule`]: latitude/longitude lines
//!
//! The finished raster is written as PNG, palette-indexed when it has few
//! enough colors.

pub mod barbs;
pub mod canvas;
pub mod colormap;
pub mod contour;
pub mod error;
pub mod fill;
pub mod graticule;
pub mod plot;
pub mod png;
pub mod sampler;
pub mod scatter;
pub mod text;

pub use barbs::{BarbElements, Barbs};
pub use canvas::MapCanvas;
pub use colormap::{level_range, Colormap, Rgba};
pub use contour::ContourLines;
pub use error::{RenderError, RenderResult};
pub use fill::FilledContour;
pub use graticule::Graticule;
pub use plot::{Layer, MapPlot};
pub use sampler::GridSampler;
pub use scatter::Scatter;
