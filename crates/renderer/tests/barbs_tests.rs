//! Tests for wind barb placement and drawing.

use projection::earth_relative_wind_components;
use renderer::{Barbs, Layer, MapCanvas};
use test_utils::{assert_approx_eq, geographic_field, regular_axis, uniform_flow};
use tiny_skia::Pixmap;
use wx_common::{BoundingBox, Field, GridCrs, Unit, VectorFrame};

fn geographic_canvas() -> MapCanvas {
    MapCanvas::new(
        GridCrs::geographic(),
        BoundingBox::new(-111.0, 29.0, -89.0, 51.0),
        220,
        220,
    )
    .unwrap()
}

fn earth_wind(u0: f64, v0: f64) -> (Field, Field) {
    let lons = regular_axis(21, -110.0, 1.0);
    let lats = regular_axis(21, 30.0, 1.0);
    let u = geographic_field("u", Unit::MetersPerSecond, lons.clone(), lats.clone(), |_, _| u0);
    let v = geographic_field("v", Unit::MetersPerSecond, lons, lats, |_, _| v0);
    (u, v)
}

#[test]
fn test_westerly_staff_points_west() {
    let (u, v) = earth_wind(10.0, 0.0);
    let placed = Barbs::new(&u, &v)
        .unwrap()
        .stride(10)
        .place(&geographic_canvas())
        .unwrap();
    assert_eq!(placed.len(), 9);
    for barb in &placed {
        assert_approx_eq!(barb.dx, -1.0, 1e-4);
        assert_approx_eq!(barb.dy, 0.0, 1e-4);
        assert_approx_eq!(barb.knots, 19.438, 1e-2);
    }
}

#[test]
fn test_southerly_staff_points_down() {
    let (u, v) = earth_wind(0.0, 10.0);
    let placed = Barbs::new(&u, &v)
        .unwrap()
        .stride(5)
        .place(&geographic_canvas())
        .unwrap();
    assert_eq!(placed.len(), 25);
    assert!(placed.iter().all(|b| (b.dy - 1.0).abs() < 1e-4));
}

#[test]
fn test_missing_values_are_skipped() {
    let (mut u, v) = earth_wind(10.0, 0.0);
    u.data_mut()[0] = f32::NAN;
    let placed = Barbs::new(&u, &v)
        .unwrap()
        .stride(10)
        .place(&geographic_canvas())
        .unwrap();
    assert_eq!(placed.len(), 8);
}

#[test]
fn test_same_projection_keeps_grid_components() {
    let (u, v) = uniform_flow(5, 5, 50_000.0, 10.0, 0.0);
    let u = u.with_vector_frame(VectorFrame::GridRelative);
    let v = v.with_vector_frame(VectorFrame::GridRelative);
    let canvas = MapCanvas::new(
        GridCrs::conus_lambert(),
        BoundingBox::new(-103.0, 35.0, -92.0, 42.0),
        300,
        200,
    )
    .unwrap();

    let placed = Barbs::new(&u, &v).unwrap().place(&canvas).unwrap();
    assert_eq!(placed.len(), 25);
    for barb in &placed {
        assert_approx_eq!(barb.dx, -1.0, 1e-6);
        assert_approx_eq!(barb.dy, 0.0, 1e-6);
    }
}

#[test]
fn test_grid_relative_wind_is_rotated_to_earth() {
    // Well east of the central meridian, where grid and true north differ
    let x = regular_axis(3, 1_000_000.0, 50_000.0);
    let y = regular_axis(3, 0.0, 50_000.0);
    let grid_wind = |value: f32| {
        Field::new("w", Unit::MetersPerSecond, x.clone(), y.clone(), vec![value; 9])
            .unwrap()
            .with_crs(GridCrs::conus_lambert())
            .with_vector_frame(VectorFrame::GridRelative)
    };
    let (u, v) = (grid_wind(10.0), grid_wind(0.0));
    let (ue, ve) = earth_relative_wind_components(&u, &v).unwrap();

    let canvas = MapCanvas::new(
        GridCrs::geographic(),
        BoundingBox::new(-95.0, 30.0, -75.0, 50.0),
        200,
        200,
    )
    .unwrap();
    let placed = Barbs::new(&u, &v).unwrap().place(&canvas).unwrap();
    assert_eq!(placed.len(), 9);

    let (eu, ev) = (ue.data()[0], ve.data()[0]);
    // Grid x is rotated away from true east here
    assert!(ev.abs() > 0.5);
    let norm = (eu * eu + ev * ev).sqrt();
    assert_approx_eq!(placed[0].dx, -eu / norm, 1e-3);
    assert_approx_eq!(placed[0].dy, ev / norm, 1e-3);
}

#[test]
fn test_requires_crs_and_alignment() {
    let (mut u, v) = earth_wind(5.0, 5.0);
    let other = geographic_field(
        "v",
        Unit::MetersPerSecond,
        regular_axis(5, 0.0, 1.0),
        regular_axis(5, 0.0, 1.0),
        |_, _| 1.0,
    );
    assert!(Barbs::new(&u, &other).is_err());
    u.crs = None;
    assert!(Barbs::new(&u, &v).is_err());
}

#[test]
fn test_draw_inks_pixels() {
    let (u, v) = earth_wind(30.0, -10.0);
    let canvas = geographic_canvas();
    let mut pixmap = Pixmap::new(canvas.width, canvas.height).unwrap();
    pixmap.fill(tiny_skia::Color::WHITE);

    Barbs::new(&u, &v)
        .unwrap()
        .stride(5)
        .draw(&canvas, &mut pixmap)
        .unwrap();

    let inked = pixmap
        .pixels()
        .iter()
        .filter(|p| p.demultiply().red() < 128)
        .count();
    assert!(inked > 100, "only {} pixels inked", inked);
}

#[test]
fn test_calm_wind_draws_circle() {
    let (u, v) = earth_wind(0.5, 0.5);
    let placed = Barbs::new(&u, &v)
        .unwrap()
        .stride(20)
        .place(&geographic_canvas())
        .unwrap();
    assert!(placed.iter().all(|b| b.knots < 2.5));
}
