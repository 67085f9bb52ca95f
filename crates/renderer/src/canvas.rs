//! Map canvas: the pixel raster, its projection and its geographic extent.
//!
//! Pixel `(0, 0)` is the top-left corner; pixel centres sit at half-integer
//! coordinates. The projected bounds are the smallest box enclosing the
//! projected extent, widened so that one pixel covers the same projected
//! distance in x and y.

use projection::{projection_for, Projection};
use wx_common::{BoundingBox, GridCrs};

use crate::colormap::Rgba;
use crate::error::{RenderError, RenderResult};

const MAX_DIMENSION: u32 = 16_384;

/// Samples per extent edge when finding the projected bounds.
const EDGE_SAMPLES: usize = 64;

#[derive(Debug)]
pub struct MapCanvas {
    pub crs: GridCrs,
    /// Longitude/latitude extent in degrees.
    pub extent: BoundingBox,
    pub width: u32,
    pub height: u32,
    pub background: Rgba,
    projection: Box<dyn Projection>,
    bounds: BoundingBox,
}

impl MapCanvas {
    pub fn new(crs: GridCrs, extent: BoundingBox, width: u32, height: u32) -> RenderResult<Self> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(RenderError::InvalidCanvas(format!(
                "size {}x{} outside 1..={}",
                width, height, MAX_DIMENSION
            )));
        }
        if extent.min_x >= extent.max_x
            || extent.min_y >= extent.max_y
            || extent.min_y < -90.0
            || extent.max_y > 90.0
        {
            return Err(RenderError::InvalidCanvas(format!(
                "invalid lon/lat extent {:?}",
                extent
            )));
        }

        let projection = projection_for(&crs);
        let projected = extent_outline(&extent)
            .into_iter()
            .filter_map(|(lon, lat)| forward_near(projection.as_ref(), &extent, lon, lat));
        let enclosing = BoundingBox::enclosing(projected).ok_or_else(|| {
            RenderError::InvalidCanvas(format!(
                "extent {:?} does not project into {}",
                extent, crs
            ))
        })?;
        if enclosing.width() <= 0.0 || enclosing.height() <= 0.0 {
            return Err(RenderError::InvalidCanvas(format!(
                "extent {:?} projects to a degenerate box",
                extent
            )));
        }
        let bounds = match_aspect(enclosing, width, height);

        Ok(Self {
            crs,
            extent,
            width,
            height,
            background: [255, 255, 255, 255],
            projection,
            bounds,
        })
    }

    pub fn with_background(mut self, background: Rgba) -> Self {
        self.background = background;
        self
    }

    pub fn projection(&self) -> &dyn Projection {
        self.projection.as_ref()
    }

    /// Projected coordinates covered by the raster.
    pub fn projected_bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn map_to_pixel(&self, x: f64, y: f64) -> (f32, f32) {
        let px = (x - self.bounds.min_x) / self.bounds.width() * self.width as f64;
        let py = (self.bounds.max_y - y) / self.bounds.height() * self.height as f64;
        (px as f32, py as f32)
    }

    pub fn pixel_to_map(&self, px: f64, py: f64) -> (f64, f64) {
        let x = self.bounds.min_x + px / self.width as f64 * self.bounds.width();
        let y = self.bounds.max_y - py / self.height as f64 * self.bounds.height();
        (x, y)
    }

    /// Pixel position of a geographic point, `None` when it does not project.
    /// The point may fall outside the raster.
    pub fn to_pixel(&self, lon: f64, lat: f64) -> Option<(f32, f32)> {
        let (x, y) = forward_near(self.projection.as_ref(), &self.extent, lon, lat)?;
        Some(self.map_to_pixel(x, y))
    }

    /// Geographic point under a pixel position.
    pub fn to_geographic(&self, px: f64, py: f64) -> Option<(f64, f64)> {
        let (x, y) = self.pixel_to_map(px, py);
        self.projection.inverse(x, y)
    }

    pub fn contains_pixel(&self, px: f32, py: f32) -> bool {
        px >= 0.0 && py >= 0.0 && px < self.width as f32 && py < self.height as f32
    }
}

/// Project, choosing the longitude branch nearest the extent centre on
/// geographic maps so that 0..360 and -180..180 data land in the same place.
fn forward_near(
    projection: &dyn Projection,
    extent: &BoundingBox,
    lon: f64,
    lat: f64,
) -> Option<(f64, f64)> {
    let lon = if projection.is_geographic() {
        let centre = (extent.min_x + extent.max_x) / 2.0;
        centre + (lon - centre + 180.0).rem_euclid(360.0) - 180.0
    } else {
        lon
    };
    projection.forward(lon, lat)
}

fn extent_outline(extent: &BoundingBox) -> Vec<(f64, f64)> {
    let mut points = Vec::with_capacity(4 * (EDGE_SAMPLES + 1));
    for k in 0..=EDGE_SAMPLES {
        let t = k as f64 / EDGE_SAMPLES as f64;
        let lon = extent.min_x + t * extent.width();
        let lat = extent.min_y + t * extent.height();
        points.push((lon, extent.min_y));
        points.push((lon, extent.max_y));
        points.push((extent.min_x, lat));
        points.push((extent.max_x, lat));
    }
    points
}

/// Grow `bounds` about its centre to the raster's aspect ratio.
fn match_aspect(bounds: BoundingBox, width: u32, height: u32) -> BoundingBox {
    let per_px_x = bounds.width() / width as f64;
    let per_px_y = bounds.height() / height as f64;
    let per_px = per_px_x.max(per_px_y);
    let (cx, cy) = (
        (bounds.min_x + bounds.max_x) / 2.0,
        (bounds.min_y + bounds.max_y) / 2.0,
    );
    let half_w = per_px * width as f64 / 2.0;
    let half_h = per_px * height as f64 / 2.0;
    BoundingBox::new(cx - half_w, cy - half_h, cx + half_w, cy + half_h)
}
