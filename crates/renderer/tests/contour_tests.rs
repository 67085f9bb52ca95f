//! Tests for marching squares and the contour line layer.

use renderer::contour::{
    connect_segments, generate_all_contours, march_squares, Point, Segment,
};
use renderer::{ContourLines, Layer, MapCanvas};
use test_utils::{geographic_field, regular_axis};
use tiny_skia::Pixmap;
use wx_common::{BoundingBox, Field, GridCrs, Unit};

fn canvas() -> MapCanvas {
    MapCanvas::new(
        GridCrs::geographic(),
        BoundingBox::new(-110.0, 30.0, -90.0, 50.0),
        200,
        200,
    )
    .unwrap()
}

/// Values increase eastward: `lon + 100`, so -10 on the west edge.
fn eastward_ramp() -> Field {
    geographic_field(
        "ramp",
        Unit::Dimensionless,
        regular_axis(21, -110.0, 1.0),
        regular_axis(21, 30.0, 1.0),
        |lon, _| lon + 100.0,
    )
}

fn white_pixmap() -> Pixmap {
    let mut pixmap = Pixmap::new(200, 200).unwrap();
    pixmap.fill(tiny_skia::Color::WHITE);
    pixmap
}

fn inked(pixmap: &Pixmap) -> usize {
    pixmap
        .pixels()
        .iter()
        .filter(|p| p.demultiply().red() < 128)
        .count()
}

// ============================================================================
// marching squares
// ============================================================================

#[test]
fn test_march_squares_vertical_crossing() {
    let data = [0.0, 10.0, 20.0, 0.0, 10.0, 20.0];
    let segments = march_squares(&data, 3, 2, 5.0);
    assert_eq!(segments.len(), 1);
    assert!((segments[0].start.x - 0.5).abs() < 1e-6);
    assert!((segments[0].end.x - 0.5).abs() < 1e-6);
}

#[test]
fn test_march_squares_skips_missing_cells() {
    let data = [0.0, 10.0, 20.0, 0.0, f32::NAN, 20.0];
    assert!(march_squares(&data, 3, 2, 5.0).is_empty());
    assert!(march_squares(&data, 3, 2, 15.0).is_empty());
}

#[test]
fn test_march_squares_saddle_gives_two_segments() {
    let data = [10.0, 0.0, 0.0, 10.0];
    assert_eq!(march_squares(&data, 2, 2, 5.0).len(), 2);
    let data = [0.0, 10.0, 10.0, 0.0];
    assert_eq!(march_squares(&data, 2, 2, 5.0).len(), 2);
}

#[test]
fn test_march_squares_bad_shape() {
    assert!(march_squares(&[1.0, 2.0, 3.0], 2, 2, 1.5).is_empty());
    assert!(march_squares(&[1.0, 2.0], 2, 1, 1.5).is_empty());
}

#[test]
fn test_connect_segments_any_orientation() {
    let a = Point::new(0.0, 0.0);
    let b = Point::new(1.0, 0.0);
    let c = Point::new(2.0, 0.5);
    let d = Point::new(3.0, 1.0);
    // Middle segment reversed and listed first
    let segments = [
        Segment { start: c, end: b },
        Segment { start: a, end: b },
        Segment { start: c, end: d },
    ];
    let contours = connect_segments(&segments, 1.0);
    assert_eq!(contours.len(), 1);
    assert_eq!(contours[0].points.len(), 4);
    assert!(!contours[0].closed);
    let ends = [contours[0].points[0], contours[0].points[3]];
    assert!(ends.contains(&a) && ends.contains(&d));
}

#[test]
fn test_cone_gives_nested_rings() {
    let n = 21;
    let mut data = Vec::with_capacity(n * n);
    for j in 0..n {
        for i in 0..n {
            let (x, y) = (i as f32 - 10.0, j as f32 - 10.0);
            data.push(10.0 - (x * x + y * y).sqrt());
        }
    }
    let contours = generate_all_contours(&data, n, n, &[2.0, 5.0, 8.0], 2);
    assert_eq!(contours.len(), 3);
    for c in &contours {
        assert!(c.closed, "level {} not closed", c.level);
        // Radius of each ring is 10 - level
        let r = 10.0 - c.level;
        for p in &c.points {
            let d = ((p.x - 10.0).powi(2) + (p.y - 10.0).powi(2)).sqrt();
            assert!((d - r).abs() < 0.5, "level {} point at radius {}", c.level, d);
        }
    }
}

// ============================================================================
// ContourLines layer
// ============================================================================

#[test]
fn test_levels_are_validated() {
    let field = eastward_ramp();
    assert!(ContourLines::new(&field, vec![]).is_err());
    assert!(ContourLines::new(&field, vec![5.0, 0.0]).is_err());
    assert!(ContourLines::new(&field, vec![0.0, f32::NAN]).is_err());
}

#[test]
fn test_pixel_lines_follow_the_field() {
    let field = eastward_ramp();
    let layer = ContourLines::new(&field, vec![-5.0, 5.0]).unwrap();
    let lines = layer.pixel_lines(&canvas()).unwrap();
    assert_eq!(lines.len(), 2);
    for (level, points) in &lines {
        // lon = level - 100 maps to px = (lon + 110) / 20 * 200
        let expected = (level - 100.0 + 110.0) / 20.0 * 200.0;
        for (px, _) in points {
            assert!((px - expected).abs() < 0.5, "px {} for level {}", px, level);
        }
    }
}

#[test]
fn test_draw_strokes_lines() {
    let field = eastward_ramp();
    let layer = ContourLines::new(&field, vec![0.0]).unwrap();
    let mut pixmap = white_pixmap();
    layer.draw(&canvas(), &mut pixmap).unwrap();

    // A vertical line at px 100 across the whole canvas
    let column_hits = (0..200)
        .filter(|y| {
            let p = pixmap.pixel(100, *y).unwrap().demultiply();
            p.red() < 128
        })
        .count();
    assert!(column_hits > 150, "only {} rows inked", column_hits);
}

#[test]
fn test_negative_levels_are_dashed() {
    let field = eastward_ramp();
    let canvas = canvas();

    let mut solid = white_pixmap();
    ContourLines::new(&field, vec![-5.0])
        .unwrap()
        .draw(&canvas, &mut solid)
        .unwrap();
    let mut dashed = white_pixmap();
    ContourLines::new(&field, vec![-5.0])
        .unwrap()
        .dashed_negative()
        .draw(&canvas, &mut dashed)
        .unwrap();

    assert!(inked(&dashed) > 0);
    assert!(inked(&dashed) < inked(&solid));
}

#[test]
fn test_labels_change_the_raster() {
    let field = eastward_ramp();
    let canvas = canvas();

    let mut plain = white_pixmap();
    ContourLines::new(&field, vec![0.0])
        .unwrap()
        .draw(&canvas, &mut plain)
        .unwrap();
    let mut labelled = white_pixmap();
    ContourLines::new(&field, vec![0.0])
        .unwrap()
        .labels(12.0)
        .draw(&canvas, &mut labelled)
        .unwrap();

    assert_ne!(plain.data(), labelled.data());
}

#[test]
fn test_field_without_crs_is_rejected() {
    let mut field = eastward_ramp();
    field.crs = None;
    let layer = ContourLines::new(&field, vec![0.0]).unwrap();
    assert!(layer.pixel_lines(&canvas()).is_err());
}
