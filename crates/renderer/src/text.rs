//! Stroke-drawn numeric labels.
//!
//! Labels only ever show numbers, so glyphs are drawn as seven-segment
//! strokes instead of shipping a font.

use tiny_skia::{FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::colormap::Rgba;

/// Segment endpoints in a unit cell, `(-1, -1)` top-left to `(1, 1)` bottom-right.
type Segment = ((f32, f32), (f32, f32));

const TOP: Segment = ((-1.0, -1.0), (1.0, -1.0));
const MIDDLE: Segment = ((-1.0, 0.0), (1.0, 0.0));
const BOTTOM: Segment = ((-1.0, 1.0), (1.0, 1.0));
const UPPER_LEFT: Segment = ((-1.0, -1.0), (-1.0, 0.0));
const LOWER_LEFT: Segment = ((-1.0, 0.0), (-1.0, 1.0));
const UPPER_RIGHT: Segment = ((1.0, -1.0), (1.0, 0.0));
const LOWER_RIGHT: Segment = ((1.0, 0.0), (1.0, 1.0));

fn glyph(ch: char) -> &'static [Segment] {
    match ch {
        '0' => &[TOP, UPPER_RIGHT, LOWER_RIGHT, BOTTOM, LOWER_LEFT, UPPER_LEFT],
        '1' => &[UPPER_RIGHT, LOWER_RIGHT],
        '2' => &[TOP, UPPER_RIGHT, MIDDLE, LOWER_LEFT, BOTTOM],
        '3' => &[TOP, UPPER_RIGHT, MIDDLE, LOWER_RIGHT, BOTTOM],
        '4' => &[UPPER_LEFT, MIDDLE, UPPER_RIGHT, LOWER_RIGHT],
        '5' => &[TOP, UPPER_LEFT, MIDDLE, LOWER_RIGHT, BOTTOM],
        '6' => &[TOP, UPPER_LEFT, MIDDLE, LOWER_LEFT, LOWER_RIGHT, BOTTOM],
        '7' => &[TOP, UPPER_RIGHT, LOWER_RIGHT],
        '8' => &[TOP, UPPER_LEFT, UPPER_RIGHT, MIDDLE, LOWER_LEFT, LOWER_RIGHT, BOTTOM],
        '9' => &[TOP, UPPER_LEFT, UPPER_RIGHT, MIDDLE, LOWER_RIGHT, BOTTOM],
        '-' => &[MIDDLE],
        '.' => &[((0.0, 0.8), (0.0, 1.0))],
        _ => &[],
    }
}

/// Text of a contour level: integers without decimals, otherwise up to
/// two significant decimals.
pub fn format_level(level: f32) -> String {
    if (level - level.round()).abs() < 1e-3 {
        format!("{:.0}", level.round())
    } else if (level * 10.0 - (level * 10.0).round()).abs() < 1e-2 {
        format!("{:.1}", level)
    } else {
        format!("{:.2}", level)
    }
}

/// Width of a label in pixels.
pub fn label_width(text: &str, size: f32) -> f32 {
    let n = text.chars().count() as f32;
    n * size * 0.7 - size * 0.1
}

/// Draw `text` centred on `(x, y)`, rotated by `angle` radians, over a
/// translucent white box.
pub fn draw_label(
    pixmap: &mut Pixmap,
    x: f32,
    y: f32,
    angle: f32,
    text: &str,
    size: f32,
    color: Rgba,
) {
    let (sin_a, cos_a) = angle.sin_cos();
    let rotate = |px: f32, py: f32| (px * cos_a - py * sin_a + x, px * sin_a + py * cos_a + y);

    let pad = size * 0.25;
    let half_w = label_width(text, size) / 2.0 + pad;
    let half_h = size / 2.0 + pad;
    let mut pb = PathBuilder::new();
    for (k, (cx, cy)) in [(-half_w, -half_h), (half_w, -half_h), (half_w, half_h), (-half_w, half_h)]
        .iter()
        .enumerate()
    {
        let (rx, ry) = rotate(*cx, *cy);
        if k == 0 {
            pb.move_to(rx, ry);
        } else {
            pb.line_to(rx, ry);
        }
    }
    pb.close();
    if let Some(path) = pb.finish() {
        let mut background = Paint::default();
        background.set_color_rgba8(255, 255, 255, 220);
        background.anti_alias = true;
        pixmap.fill_path(&path, &background, FillRule::Winding, Transform::identity(), None);
    }

    let mut paint = Paint::default();
    paint.set_color_rgba8(color[0], color[1], color[2], color[3]);
    paint.anti_alias = true;
    let stroke = Stroke {
        width: (size * 0.12).max(1.0),
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };

    let char_half_w = size * 0.3;
    let char_half_h = size * 0.5;
    let advance = size * 0.7;
    let start = -label_width(text, size) / 2.0 + char_half_w;

    let mut pb = PathBuilder::new();
    for (k, ch) in text.chars().enumerate() {
        let cx = start + k as f32 * advance;
        for ((x1, y1), (x2, y2)) in glyph(ch) {
            let (ax, ay) = rotate(cx + x1 * char_half_w, y1 * char_half_h);
            let (bx, by) = rotate(cx + x2 * char_half_w, y2 * char_half_h);
            pb.move_to(ax, ay);
            pb.line_to(bx, by);
        }
    }
    if let Some(path) = pb.finish() {
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}
