//! Procedural wind barbs.
//!
//! The staff points toward where the wind blows from. Speeds are rounded to
//! the nearest 5 kt: a pennant is 50 kt, a full barb 10 kt, a half barb 5 kt.
//! Barbs sit on the clockwise side of the staff in the northern hemisphere
//! and on the other side in the southern hemisphere.

use projection::{projection_for, transform_vectors};
use tiny_skia::{FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};
use tracing::debug;
use wx_common::{Field, GridCrs, Unit, VectorFrame};

use crate::canvas::MapCanvas;
use crate::colormap::Rgba;
use crate::error::{RenderError, RenderResult};
use crate::plot::Layer;

/// Speeds below this are drawn as a calm circle.
const CALM_KNOTS: f32 = 2.5;

/// Feather counts for one barb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarbElements {
    pub pennants: u32,
    pub full: u32,
    pub half: u32,
}

impl BarbElements {
    pub fn from_knots(speed: f32) -> Self {
        let rounded = ((speed.max(0.0) / 5.0).round() * 5.0) as u32;
        let rest = rounded % 50;
        Self {
            pennants: rounded / 50,
            full: rest / 10,
            half: (rest % 10) / 5,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pennants == 0 && self.full == 0 && self.half == 0
    }
}

/// One barb ready to draw: pixel anchor, unit staff direction in pixel
/// space and speed in knots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedBarb {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub knots: f32,
    pub southern: bool,
}

#[derive(Debug, Clone)]
pub struct Barbs<'a> {
    u: &'a Field,
    v: &'a Field,
    level_index: usize,
    /// Draw every `stride`-th grid point in each direction.
    pub stride: usize,
    /// Staff length in pixels.
    pub length: f32,
    pub color: Rgba,
    pub line_width: f32,
}

impl<'a> Barbs<'a> {
    pub fn new(u: &'a Field, v: &'a Field) -> RenderResult<Self> {
        if u.crs.is_none() {
            return Err(RenderError::layer(
                "barbs",
                format!("'{}' has no grid mapping", u.name),
            ));
        }
        u.check_aligned(v)?;
        Ok(Self {
            u,
            v,
            level_index: 0,
            stride: 1,
            length: 25.0,
            color: [0, 0, 0, 255],
            line_width: 1.2,
        })
    }

    pub fn at_level(mut self, k: usize) -> Self {
        self.level_index = k;
        self
    }

    pub fn stride(mut self, stride: usize) -> Self {
        self.stride = stride.max(1);
        self
    }

    pub fn length(mut self, length: f32) -> Self {
        self.length = length;
        self
    }

    pub fn color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    /// Decimate, rotate into the canvas frame and place the barbs.
    pub fn place(&self, canvas: &MapCanvas) -> RenderResult<Vec<PlacedBarb>> {
        let crs = self.u.crs.as_ref().ok_or_else(|| {
            RenderError::layer("barbs", format!("'{}' has no grid mapping", self.u.name))
        })?;
        if self.level_index >= self.u.nlev() {
            return Err(RenderError::layer(
                "barbs",
                format!("level {} of {}", self.level_index, self.u.nlev()),
            ));
        }
        let u_kt = self.u.convert_units(&Unit::Knots)?;
        let v_kt = self.v.convert_units(&Unit::Knots)?;
        let grid = projection_for(crs);

        let (mut xs, mut ys, mut lons, mut lats, mut us, mut vs) =
            (vec![], vec![], vec![], vec![], vec![], vec![]);
        for j in (0..self.u.ny()).step_by(self.stride) {
            for i in (0..self.u.nx()).step_by(self.stride) {
                let (Some(uu), Some(vv)) = (
                    u_kt.value(self.level_index, j, i),
                    v_kt.value(self.level_index, j, i),
                ) else {
                    continue;
                };
                if uu.is_nan() || vv.is_nan() {
                    continue;
                }
                let (x, y) = self.u.coords(j, i);
                let Some((lon, lat)) = grid.inverse(x, y) else {
                    continue;
                };
                xs.push(x);
                ys.push(y);
                lons.push(lon);
                lats.push(lat);
                us.push(uu);
                vs.push(vv);
            }
        }

        let (um, vm) = match self.u.vector_frame {
            VectorFrame::GridRelative => transform_vectors(crs, &canvas.crs, &xs, &ys, &us, &vs)?,
            VectorFrame::EarthRelative => {
                transform_vectors(&GridCrs::geographic(), &canvas.crs, &lons, &lats, &us, &vs)?
            }
        };

        let mut placed = Vec::with_capacity(um.len());
        for k in 0..um.len() {
            let Some((px, py)) = canvas.to_pixel(lons[k], lats[k]) else {
                continue;
            };
            if !canvas.contains_pixel(px, py) || um[k].is_nan() || vm[k].is_nan() {
                continue;
            }
            // Pixel y grows downward
            let (dx, dy) = (-um[k], vm[k]);
            let norm = (dx * dx + dy * dy).sqrt();
            let (dx, dy) = if norm > 0.0 {
                (dx / norm, dy / norm)
            } else {
                (0.0, -1.0)
            };
            placed.push(PlacedBarb {
                x: px,
                y: py,
                dx,
                dy,
                knots: (us[k] * us[k] + vs[k] * vs[k]).sqrt(),
                southern: lats[k] < 0.0,
            });
        }
        Ok(placed)
    }

    fn draw_barb(&self, barb: &PlacedBarb, pixmap: &mut Pixmap, paint: &Paint, stroke: &Stroke) {
        let l = self.length;
        if barb.knots < CALM_KNOTS {
            if let Some(circle) = PathBuilder::from_circle(barb.x, barb.y, l * 0.15) {
                pixmap.stroke_path(&circle, paint, stroke, Transform::identity(), None);
            }
            return;
        }

        let (dx, dy) = (barb.dx, barb.dy);
        let (mut nx, mut ny) = (-dy, dx);
        if barb.southern {
            nx = -nx;
            ny = -ny;
        }
        let along = |t: f32| (barb.x + dx * t, barb.y + dy * t);
        let feather = l * 0.4;
        let spacing = l * 0.14;

        let mut lines = PathBuilder::new();
        let (tx, ty) = along(l);
        lines.move_to(barb.x, barb.y);
        lines.line_to(tx, ty);

        let elements = BarbElements::from_knots(barb.knots);
        let mut pennants = PathBuilder::new();
        let mut t = l;
        for _ in 0..elements.pennants {
            let (ax, ay) = along(t);
            let (bx, by) = along(t - spacing);
            pennants.move_to(ax, ay);
            pennants.line_to(ax + nx * feather, ay + ny * feather);
            pennants.line_to(bx, by);
            pennants.close();
            t -= spacing * 1.2;
        }
        if elements.pennants > 0 {
            t -= spacing * 0.2;
        }
        // A lone half barb is set in from the tip
        if elements.pennants == 0 && elements.full == 0 {
            t -= spacing;
        }
        for k in 0..elements.full + elements.half {
            let len = if k < elements.full { feather } else { feather * 0.5 };
            let (ax, ay) = along(t);
            // Slanted toward the tip
            let (ex, ey) = (ax + nx * len + dx * len * 0.35, ay + ny * len + dy * len * 0.35);
            lines.move_to(ax, ay);
            lines.line_to(ex, ey);
            t -= spacing;
        }

        if let Some(path) = lines.finish() {
            pixmap.stroke_path(&path, paint, stroke, Transform::identity(), None);
        }
        if let Some(path) = pennants.finish() {
            pixmap.fill_path(&path, paint, FillRule::Winding, Transform::identity(), None);
        }
    }
}

impl Layer for Barbs<'_> {
    fn name(&self) -> &'static str {
        "barbs"
    }

    fn draw(&self, canvas: &MapCanvas, pixmap: &mut Pixmap) -> RenderResult<()> {
        let placed = self.place(canvas)?;

        let mut paint = Paint::default();
        paint.set_color_rgba8(self.color[0], self.color[1], self.color[2], self.color[3]);
        paint.anti_alias = true;
        let stroke = Stroke {
            width: self.line_width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };

        for barb in &placed {
            self.draw_barb(barb, pixmap, &paint, &stroke);
        }
        debug!(
            field = %self.u.name,
            stride = self.stride,
            barbs = placed.len(),
            "Drew wind barbs"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_barb_elements() {
        assert_eq!(
            BarbElements::from_knots(65.0),
            BarbElements { pennants: 1, full: 1, half: 1 }
        );
        assert_eq!(
            BarbElements::from_knots(17.0),
            BarbElements { pennants: 0, full: 1, half: 1 }
        );
        assert_eq!(
            BarbElements::from_knots(103.0),
            BarbElements { pennants: 2, full: 0, half: 1 }
        );
        assert!(BarbElements::from_knots(2.0).is_empty());
    }
}
