//! Contour lines (isolines) by marching squares.
//!
//! Contours are traced in grid index space, joined into polylines, smoothed
//! with Chaikin corner cutting and only then projected to pixels, so the
//! same code serves lon/lat and projected grids.

use std::collections::{HashMap, VecDeque};

use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, StrokeDash, Transform};
use tracing::debug;
use wx_common::Field;

use crate::canvas::MapCanvas;
use crate::colormap::{validate_levels, Rgba};
use crate::error::{RenderError, RenderResult};
use crate::plot::Layer;
use crate::sampler::GridSampler;
use crate::text::{draw_label, format_level, label_width};

/// A point in grid index space (`x` = column, `y` = row).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

/// A traced isoline.
#[derive(Debug, Clone)]
pub struct Contour {
    pub level: f32,
    pub points: Vec<Point>,
    pub closed: bool,
}

/// Levels that are multiples of `interval` within `[min, max]`.
pub fn generate_contour_levels(min_value: f32, max_value: f32, interval: f32) -> Vec<f32> {
    if interval <= 0.0 || max_value <= min_value || !min_value.is_finite() || !max_value.is_finite()
    {
        return vec![];
    }
    let first = (min_value / interval).ceil() as i64;
    let last = (max_value / interval).floor() as i64;
    (first..=last).map(|k| k as f32 * interval).collect()
}

/// Marching squares over a row-major `width` x `height` grid.
///
/// Cells touching NaN are skipped, which leaves gaps in the contours there.
pub fn march_squares(data: &[f32], width: usize, height: usize, level: f32) -> Vec<Segment> {
    if width < 2 || height < 2 || data.len() != width * height {
        return vec![];
    }

    let mut segments = Vec::new();
    for y in 0..height - 1 {
        for x in 0..width - 1 {
            let tl = data[y * width + x];
            let tr = data[y * width + x + 1];
            let bl = data[(y + 1) * width + x];
            let br = data[(y + 1) * width + x + 1];
            if tl.is_nan() || tr.is_nan() || bl.is_nan() || br.is_nan() {
                continue;
            }

            let mut case = 0u8;
            if tl >= level {
                case |= 1;
            }
            if tr >= level {
                case |= 2;
            }
            if br >= level {
                case |= 4;
            }
            if bl >= level {
                case |= 8;
            }
            if case == 0 || case == 15 {
                continue;
            }

            let (fx, fy) = (x as f32, y as f32);
            let top = interpolate_edge((fx, fy), (fx + 1.0, fy), tl, tr, level);
            let right = interpolate_edge((fx + 1.0, fy), (fx + 1.0, fy + 1.0), tr, br, level);
            let bottom = interpolate_edge((fx, fy + 1.0), (fx + 1.0, fy + 1.0), bl, br, level);
            let left = interpolate_edge((fx, fy), (fx, fy + 1.0), tl, bl, level);
            let seg = |start, end| Segment { start, end };

            match case {
                1 | 14 => segments.push(seg(left, top)),
                2 | 13 => segments.push(seg(top, right)),
                3 | 12 => segments.push(seg(left, right)),
                4 | 11 => segments.push(seg(right, bottom)),
                6 | 9 => segments.push(seg(top, bottom)),
                7 | 8 => segments.push(seg(left, bottom)),
                // Saddles: resolve with the cell-centre average
                5 | 10 => {
                    let centre_high = (tl + tr + br + bl) / 4.0 >= level;
                    if (case == 5) == centre_high {
                        segments.push(seg(left, bottom));
                        segments.push(seg(top, right));
                    } else {
                        segments.push(seg(left, top));
                        segments.push(seg(right, bottom));
                    }
                }
                _ => {}
            }
        }
    }
    segments
}

/// Where `level` crosses the edge from `a` (value `va`) to `b` (value `vb`).
fn interpolate_edge(a: (f32, f32), b: (f32, f32), va: f32, vb: f32, level: f32) -> Point {
    if (vb - va).abs() < f32::EPSILON {
        return Point::new((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);
    }
    let t = ((level - va) / (vb - va)).clamp(0.0, 1.0);
    Point::new(a.0 + t * (b.0 - a.0), a.1 + t * (b.1 - a.1))
}

/// Exact endpoint key; neighbouring cells compute shared crossings identically.
fn key(p: Point) -> (u32, u32) {
    (p.x.to_bits(), p.y.to_bits())
}

/// Join segments sharing endpoints into polylines, growing each line at
/// both ends.
pub fn connect_segments(segments: &[Segment], level: f32) -> Vec<Contour> {
    let mut by_endpoint: HashMap<(u32, u32), Vec<usize>> = HashMap::new();
    for (i, s) in segments.iter().enumerate() {
        by_endpoint.entry(key(s.start)).or_default().push(i);
        by_endpoint.entry(key(s.end)).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let next_from = |p: Point, used: &mut [bool]| -> Option<Point> {
        let candidates = by_endpoint.get(&key(p))?;
        let i = *candidates.iter().find(|i| !used[**i])?;
        used[i] = true;
        let s = segments[i];
        Some(if key(s.start) == key(p) { s.end } else { s.start })
    };

    let mut contours = Vec::new();
    for i in 0..segments.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        let mut points = VecDeque::from([segments[i].start, segments[i].end]);

        while let Some(p) = points.back().copied().and_then(|p| next_from(p, &mut used)) {
            points.push_back(p);
        }
        while let Some(p) = points.front().copied().and_then(|p| next_from(p, &mut used)) {
            points.push_front(p);
        }

        let points: Vec<Point> = points.into();
        let closed = points.len() > 2 && key(points[0]) == key(points[points.len() - 1]);
        contours.push(Contour {
            level,
            points,
            closed,
        });
    }
    contours
}

/// Chaikin corner cutting. Open lines keep their endpoints.
pub fn smooth_contour(contour: &Contour, iterations: u32) -> Contour {
    if iterations == 0 || contour.points.len() < 3 {
        return contour.clone();
    }

    let mut points = contour.points.clone();
    if contour.closed {
        // The duplicate closing point would produce a zero-length edge
        points.pop();
    }

    for _ in 0..iterations {
        let n = points.len();
        let edges = if contour.closed { n } else { n - 1 };
        let mut next = Vec::with_capacity(edges * 2 + 2);
        if !contour.closed {
            next.push(points[0]);
        }
        for i in 0..edges {
            let p = points[i];
            let q = points[(i + 1) % n];
            next.push(Point::new(0.75 * p.x + 0.25 * q.x, 0.75 * p.y + 0.25 * q.y));
            next.push(Point::new(0.25 * p.x + 0.75 * q.x, 0.25 * p.y + 0.75 * q.y));
        }
        if !contour.closed {
            next.push(points[n - 1]);
        }
        points = next;
    }

    if contour.closed {
        points.push(points[0]);
    }
    Contour {
        level: contour.level,
        points,
        closed: contour.closed,
    }
}

/// Trace, join and smooth every level.
pub fn generate_all_contours(
    data: &[f32],
    width: usize,
    height: usize,
    levels: &[f32],
    smoothing_passes: u32,
) -> Vec<Contour> {
    levels
        .iter()
        .flat_map(|&level| {
            let segments = march_squares(data, width, height, level);
            connect_segments(&segments, level)
        })
        .map(|c| smooth_contour(&c, smoothing_passes))
        .collect()
}

/// Contour line layer.
#[derive(Debug, Clone)]
pub struct ContourLines<'a> {
    field: &'a Field,
    level_index: usize,
    levels: Vec<f32>,
    pub color: Rgba,
    pub line_width: f32,
    pub smoothing_passes: u32,
    /// Label font size in pixels; no labels when `None`.
    pub label_size: Option<f32>,
    /// Minimum distance along a line between labels, in pixels.
    pub label_spacing: f32,
    pub dashed_negative: bool,
}

impl<'a> ContourLines<'a> {
    pub fn new(field: &'a Field, levels: Vec<f32>) -> RenderResult<Self> {
        validate_levels(&levels)?;
        if levels.is_empty() {
            return Err(RenderError::InvalidLevels("no contour levels".to_string()));
        }
        Ok(Self {
            field,
            level_index: 0,
            levels,
            color: [0, 0, 0, 255],
            line_width: 1.5,
            smoothing_passes: 2,
            label_size: None,
            label_spacing: 250.0,
            dashed_negative: false,
        })
    }

    /// Contour vertical level `k` of a 3-D field.
    pub fn at_level(mut self, k: usize) -> Self {
        self.level_index = k;
        self
    }

    pub fn color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    pub fn line_width(mut self, width: f32) -> Self {
        self.line_width = width;
        self
    }

    pub fn labels(mut self, size: f32) -> Self {
        self.label_size = Some(size);
        self
    }

    pub fn dashed_negative(mut self) -> Self {
        self.dashed_negative = true;
        self
    }

    pub fn levels(&self) -> &[f32] {
        &self.levels
    }

    /// Contours as pixel polylines; a line is split where it leaves the
    /// projection's domain.
    pub fn pixel_lines(&self, canvas: &MapCanvas) -> RenderResult<Vec<(f32, Vec<(f32, f32)>)>> {
        let sampler = GridSampler::new(self.field, self.level_index)?;
        let contours = generate_all_contours(
            self.field.level_slice(self.level_index),
            self.field.nx(),
            self.field.ny(),
            &self.levels,
            self.smoothing_passes,
        );

        let mut lines = Vec::new();
        for contour in &contours {
            let mut current: Vec<(f32, f32)> = Vec::new();
            for p in &contour.points {
                let pixel = sampler
                    .grid_to_geographic(p.x as f64, p.y as f64)
                    .and_then(|(lon, lat)| canvas.to_pixel(lon, lat));
                match pixel {
                    Some(px) => current.push(px),
                    None => {
                        if current.len() >= 2 {
                            lines.push((contour.level, std::mem::take(&mut current)));
                        } else {
                            current.clear();
                        }
                    }
                }
            }
            if current.len() >= 2 {
                lines.push((contour.level, current));
            }
        }
        Ok(lines)
    }
}

impl Layer for ContourLines<'_> {
    fn name(&self) -> &'static str {
        "contour lines"
    }

    fn draw(&self, canvas: &MapCanvas, pixmap: &mut Pixmap) -> RenderResult<()> {
        let lines = self.pixel_lines(canvas)?;

        let mut paint = Paint::default();
        paint.set_color_rgba8(self.color[0], self.color[1], self.color[2], self.color[3]);
        paint.anti_alias = true;
        let solid = Stroke {
            width: self.line_width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        let dashed = Stroke {
            dash: StrokeDash::new(vec![self.line_width * 4.0, self.line_width * 3.0], 0.0),
            line_cap: LineCap::Butt,
            ..solid.clone()
        };

        let mut labels: Vec<(f32, f32, f32, String)> = Vec::new();
        for (level, points) in &lines {
            let mut pb = PathBuilder::new();
            pb.move_to(points[0].0, points[0].1);
            for (x, y) in &points[1..] {
                pb.line_to(*x, *y);
            }
            let Some(path) = pb.finish() else { continue };
            let stroke = if self.dashed_negative && *level < 0.0 {
                &dashed
            } else {
                &solid
            };
            pixmap.stroke_path(&path, &paint, stroke, Transform::identity(), None);

            if let Some(size) = self.label_size {
                place_labels(points, *level, size, self.label_spacing, canvas, &mut labels);
            }
        }

        if let Some(size) = self.label_size {
            for (x, y, angle, text) in &labels {
                draw_label(pixmap, *x, *y, *angle, text, size, self.color);
            }
        }

        debug!(
            field = %self.field.name,
            levels = self.levels.len(),
            lines = lines.len(),
            labels = labels.len(),
            "Contoured"
        );
        Ok(())
    }
}

/// Evenly spaced label anchors along a pixel polyline, kept inside the
/// canvas and clear of labels already placed.
fn place_labels(
    points: &[(f32, f32)],
    level: f32,
    size: f32,
    spacing: f32,
    canvas: &MapCanvas,
    placed: &mut Vec<(f32, f32, f32, String)>,
) {
    let lengths: Vec<f32> = points
        .windows(2)
        .map(|w| ((w[1].0 - w[0].0).powi(2) + (w[1].1 - w[0].1).powi(2)).sqrt())
        .collect();
    let total: f32 = lengths.iter().sum();
    let text = format_level(level);
    if total < label_width(&text, size) * 3.0 {
        return;
    }

    let count = ((total / spacing).floor() as usize).max(1);
    let step = total / (count as f32 + 1.0);
    let margin = size * 2.0;
    let min_gap = size * 4.0;

    let mut travelled = 0.0;
    let mut target = step;
    for (k, seg_len) in lengths.iter().enumerate() {
        while travelled + seg_len >= target && target < total {
            let t = if *seg_len > 0.0 {
                (target - travelled) / seg_len
            } else {
                0.0
            };
            let (x0, y0) = points[k];
            let (x1, y1) = points[k + 1];
            let (x, y) = (x0 + t * (x1 - x0), y0 + t * (y1 - y0));

            let inside = x > margin
                && y > margin
                && x < canvas.width as f32 - margin
                && y < canvas.height as f32 - margin;
            let clear = placed
                .iter()
                .all(|(px, py, _, _)| (px - x).powi(2) + (py - y).powi(2) >= min_gap * min_gap);
            if inside && clear {
                let mut angle = (y1 - y0).atan2(x1 - x0);
                // Keep text upright
                if angle.abs() > std::f32::consts::FRAC_PI_2 {
                    angle += std::f32::consts::PI;
                }
                placed.push((x, y, angle, text.clone()));
            }
            target += step;
        }
        travelled += seg_len;
    }
}
