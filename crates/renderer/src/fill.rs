//! Filled contours: every pixel is colored by the level band of the field
//! value sampled under it.

use rayon::prelude::*;
use tiny_skia::{IntSize, Pixmap, PixmapPaint, Transform};
use tracing::debug;
use wx_common::Field;

use crate::canvas::MapCanvas;
use crate::colormap::{validate_levels, Colormap};
use crate::error::{RenderError, RenderResult};
use crate::plot::Layer;
use crate::sampler::GridSampler;

#[derive(Debug, Clone)]
pub struct FilledContour<'a> {
    field: &'a Field,
    level_index: usize,
    levels: Vec<f32>,
    colormap: Colormap,
    /// 0.0 (transparent) to 1.0 (opaque).
    pub opacity: f32,
}

impl<'a> FilledContour<'a> {
    pub fn new(field: &'a Field, levels: Vec<f32>, colormap: Colormap) -> RenderResult<Self> {
        validate_levels(&levels)?;
        if levels.len() < 2 {
            return Err(RenderError::InvalidLevels(
                "filled contours need at least two levels".to_string(),
            ));
        }
        Ok(Self {
            field,
            level_index: 0,
            levels,
            colormap,
            opacity: 1.0,
        })
    }

    pub fn at_level(mut self, k: usize) -> Self {
        self.level_index = k;
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn levels(&self) -> &[f32] {
        &self.levels
    }

    /// Premultiplied RGBA raster the size of the canvas.
    fn rasterize(&self, canvas: &MapCanvas) -> RenderResult<Vec<u8>> {
        let sampler = GridSampler::new(self.field, self.level_index)?;
        let width = canvas.width as usize;
        let alpha = self.opacity;

        let mut raster = vec![0u8; width * canvas.height as usize * 4];
        raster
            .par_chunks_exact_mut(width * 4)
            .enumerate()
            .for_each(|(py, row)| {
                for (px, out) in row.chunks_exact_mut(4).enumerate() {
                    let color = canvas
                        .to_geographic(px as f64 + 0.5, py as f64 + 0.5)
                        .and_then(|(lon, lat)| sampler.sample(lon, lat))
                        .and_then(|value| self.colormap.color_for(value, &self.levels));
                    if let Some([r, g, b, a]) = color {
                        let a = (a as f32 * alpha).round() / 255.0;
                        out[0] = (r as f32 * a).round() as u8;
                        out[1] = (g as f32 * a).round() as u8;
                        out[2] = (b as f32 * a).round() as u8;
                        out[3] = (a * 255.0).round() as u8;
                    }
                }
            });
        Ok(raster)
    }
}

impl Layer for FilledContour<'_> {
    fn name(&self) -> &'static str {
        "filled contour"
    }

    fn draw(&self, canvas: &MapCanvas, pixmap: &mut Pixmap) -> RenderResult<()> {
        let raster = self.rasterize(canvas)?;
        let covered = raster.chunks_exact(4).filter(|p| p[3] > 0).count();

        let size = IntSize::from_wh(canvas.width, canvas.height)
            .ok_or_else(|| RenderError::layer(self.name(), "empty canvas"))?;
        let layer = Pixmap::from_vec(raster, size)
            .ok_or_else(|| RenderError::layer(self.name(), "raster size mismatch"))?;
        pixmap.draw_pixmap(
            0,
            0,
            layer.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );

        debug!(
            field = %self.field.name,
            colormap = %self.colormap.name,
            bands = self.levels.len() - 1,
            covered_pixels = covered,
            "Filled contours"
        );
        Ok(())
    }
}
