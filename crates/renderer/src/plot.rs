//! A map under construction: a canvas plus the raster layers are drawn into.

use std::path::Path;

use tiny_skia::{Color, Pixmap};
use tracing::debug;

use crate::canvas::MapCanvas;
use crate::error::{RenderError, RenderResult};
use crate::png::create_png_auto;

/// Something that can be drawn onto a map.
pub trait Layer {
    fn name(&self) -> &'static str;

    fn draw(&self, canvas: &MapCanvas, pixmap: &mut Pixmap) -> RenderResult<()>;
}

/// Layers are drawn in call order, each over the previous ones.
pub struct MapPlot {
    canvas: MapCanvas,
    pixmap: Pixmap,
}

impl MapPlot {
    pub fn new(canvas: MapCanvas) -> RenderResult<Self> {
        let mut pixmap = Pixmap::new(canvas.width, canvas.height).ok_or_else(|| {
            RenderError::InvalidCanvas(format!("{}x{}", canvas.width, canvas.height))
        })?;
        let [r, g, b, a] = canvas.background;
        pixmap.fill(Color::from_rgba8(r, g, b, a));
        Ok(Self { canvas, pixmap })
    }

    pub fn canvas(&self) -> &MapCanvas {
        &self.canvas
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn draw(&mut self, layer: &dyn Layer) -> RenderResult<&mut Self> {
        layer.draw(&self.canvas, &mut self.pixmap)?;
        debug!(layer = layer.name(), "Drew layer");
        Ok(self)
    }

    /// Straight-alpha RGBA bytes, row-major from the top-left.
    pub fn rgba(&self) -> Vec<u8> {
        self.pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect()
    }

    pub fn encode_png(&self) -> RenderResult<Vec<u8>> {
        create_png_auto(
            &self.rgba(),
            self.canvas.width as usize,
            self.canvas.height as usize,
        )
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        let png = self.encode_png()?;
        std::fs::write(path.as_ref(), &png)?;
        debug!(path = %path.as_ref().display(), bytes = png.len(), "Wrote PNG");
        Ok(())
    }
}
