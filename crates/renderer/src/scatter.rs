//! Point markers colored by value.

use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Stroke, Transform};
use tracing::debug;
use wx_common::PointBatch;

use crate::canvas::MapCanvas;
use crate::colormap::{Colormap, Rgba};
use crate::error::RenderResult;
use crate::plot::Layer;

#[derive(Debug, Clone)]
pub struct Scatter<'a> {
    points: &'a PointBatch,
    colormap: Colormap,
    /// Color scale limits; the batch's own value range when `None`.
    pub range: Option<(f32, f32)>,
    /// Marker radius in pixels.
    pub radius: f32,
    pub outline: Option<Rgba>,
}

impl<'a> Scatter<'a> {
    pub fn new(points: &'a PointBatch, colormap: Colormap) -> Self {
        Self {
            points,
            colormap,
            range: None,
            radius: 3.0,
            outline: None,
        }
    }

    pub fn range(mut self, vmin: f32, vmax: f32) -> Self {
        self.range = Some((vmin, vmax));
        self
    }

    pub fn radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn outline(mut self, color: Rgba) -> Self {
        self.outline = Some(color);
        self
    }
}

impl Layer for Scatter<'_> {
    fn name(&self) -> &'static str {
        "scatter"
    }

    fn draw(&self, canvas: &MapCanvas, pixmap: &mut Pixmap) -> RenderResult<()> {
        let Some((vmin, vmax)) = self.range.or_else(|| self.points.value_range()) else {
            debug!(parameter = %self.points.parameter, "No values to scatter");
            return Ok(());
        };

        let mut fill = Paint::default();
        fill.anti_alias = true;
        let mut edge = Paint::default();
        edge.anti_alias = true;
        if let Some([r, g, b, a]) = self.outline {
            edge.set_color_rgba8(r, g, b, a);
        }
        let stroke = Stroke {
            width: 0.75,
            ..Stroke::default()
        };

        let mut drawn = 0usize;
        for obs in &self.points.points {
            if obs.value.is_nan() {
                continue;
            }
            let Some((px, py)) = canvas.to_pixel(obs.lon, obs.lat) else {
                continue;
            };
            if !canvas.contains_pixel(px, py) {
                continue;
            }
            let Some(circle) = PathBuilder::from_circle(px, py, self.radius) else {
                continue;
            };

            let [r, g, b, a] = self.colormap.color_for_range(obs.value, vmin, vmax);
            fill.set_color_rgba8(r, g, b, a);
            pixmap.fill_path(&circle, &fill, FillRule::Winding, Transform::identity(), None);
            if self.outline.is_some() {
                pixmap.stroke_path(&circle, &edge, &stroke, Transform::identity(), None);
            }
            drawn += 1;
        }

        debug!(
            parameter = %self.points.parameter,
            points = self.points.len(),
            drawn,
            "Scattered points"
        );
        Ok(())
    }
}
