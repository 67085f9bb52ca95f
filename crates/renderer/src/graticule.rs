//! Latitude/longitude grid lines.

use tiny_skia::{Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::canvas::MapCanvas;
use crate::colormap::Rgba;
use crate::error::{RenderError, RenderResult};
use crate::plot::Layer;

/// Vertices per degree along each line, so lines curve with the projection.
const STEPS_PER_DEGREE: f64 = 4.0;

#[derive(Debug, Clone)]
pub struct Graticule {
    pub spacing_deg: f64,
    pub color: Rgba,
    pub line_width: f32,
}

impl Default for Graticule {
    fn default() -> Self {
        Self {
            spacing_deg: 10.0,
            color: [120, 120, 120, 160],
            line_width: 0.75,
        }
    }
}

impl Graticule {
    pub fn new(spacing_deg: f64) -> RenderResult<Self> {
        if !(spacing_deg > 0.0 && spacing_deg <= 90.0) {
            return Err(RenderError::layer(
                "graticule",
                format!("spacing {} outside (0, 90]", spacing_deg),
            ));
        }
        Ok(Self {
            spacing_deg,
            ..Self::default()
        })
    }

    /// Multiples of the spacing inside `[min, max]`.
    fn ticks(&self, min: f64, max: f64) -> Vec<f64> {
        let first = (min / self.spacing_deg).ceil() as i64;
        let last = (max / self.spacing_deg).floor() as i64;
        (first..=last).map(|k| k as f64 * self.spacing_deg).collect()
    }

    fn trace<I>(pb: &mut PathBuilder, canvas: &MapCanvas, points: I)
    where
        I: Iterator<Item = (f64, f64)>,
    {
        let mut pen_down = false;
        for (lon, lat) in points {
            match canvas.to_pixel(lon, lat) {
                Some((px, py)) if pen_down => pb.line_to(px, py),
                Some((px, py)) => {
                    pb.move_to(px, py);
                    pen_down = true;
                }
                None => pen_down = false,
            }
        }
    }
}

impl Layer for Graticule {
    fn name(&self) -> &'static str {
        "graticule"
    }

    fn draw(&self, canvas: &MapCanvas, pixmap: &mut Pixmap) -> RenderResult<()> {
        let e = canvas.extent;
        let samples = |span: f64| ((span * STEPS_PER_DEGREE).ceil() as usize).max(2);

        let mut pb = PathBuilder::new();
        for lon in self.ticks(e.min_x, e.max_x) {
            let n = samples(e.height());
            let line = (0..=n).map(|k| (lon, e.min_y + e.height() * k as f64 / n as f64));
            Self::trace(&mut pb, canvas, line);
        }
        for lat in self.ticks(e.min_y, e.max_y) {
            let n = samples(e.width());
            let line = (0..=n).map(|k| (e.min_x + e.width() * k as f64 / n as f64, lat));
            Self::trace(&mut pb, canvas, line);
        }

        let Some(path) = pb.finish() else {
            return Ok(());
        };
        let mut paint = Paint::default();
        paint.set_color_rgba8(self.color[0], self.color[1], self.color[2], self.color[3]);
        paint.anti_alias = true;
        let stroke = Stroke {
            width: self.line_width,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks() {
        let g = Graticule::new(10.0).unwrap();
        assert_eq!(g.ticks(-25.0, 12.0), vec![-20.0, -10.0, 0.0, 10.0]);
        assert!(Graticule::new(0.0).is_err());
    }
}
