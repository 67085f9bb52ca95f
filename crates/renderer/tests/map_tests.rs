//! End-to-end tests: layers drawn onto a map and written as PNG.

use renderer::{
    level_range, Colormap, FilledContour, Graticule, Layer, MapCanvas, MapPlot, Scatter,
};
use test_utils::{geographic_field, regular_axis, scratch_file, temp_test_dir};
use wx_common::{BoundingBox, Field, GridCrs, Observation, PointBatch, Unit};

fn conus_canvas() -> MapCanvas {
    MapCanvas::new(
        GridCrs::geographic(),
        BoundingBox::new(-120.0, 25.0, -70.0, 50.0),
        400,
        200,
    )
    .unwrap()
}

/// Global 2.5 degree grid on 0..360 longitudes, value = latitude.
fn global_latitudes() -> Field {
    geographic_field(
        "lat",
        Unit::Degrees,
        regular_axis(144, 0.0, 2.5),
        regular_axis(73, 90.0, -2.5),
        |_, lat| lat,
    )
}

fn pixel(plot: &MapPlot, x: u32, y: u32) -> [u8; 4] {
    let p = plot.pixmap().pixel(x, y).unwrap().demultiply();
    [p.red(), p.green(), p.blue(), p.alpha()]
}

#[test]
fn test_filled_contour_bands_follow_latitude() {
    let field = global_latitudes();
    let colormap = Colormap::named("viridis").unwrap();
    let levels = level_range(20.0, 55.0, 5.0);
    let layer = FilledContour::new(&field, levels.clone(), colormap.clone()).unwrap();

    let mut plot = MapPlot::new(conus_canvas()).unwrap();
    plot.draw(&layer).unwrap();

    // Pixel rows 0 and 199 sit near 50N and 25N
    let north = colormap.color_for(49.9, &levels).unwrap();
    let south = colormap.color_for(25.1, &levels).unwrap();
    assert_eq!(pixel(&plot, 200, 0), north);
    assert_eq!(pixel(&plot, 200, 199), south);
    assert_ne!(north, south);
}

#[test]
fn test_filled_contour_leaves_out_of_range_blank() {
    let field = global_latitudes();
    let layer = FilledContour::new(
        &field,
        vec![40.0, 45.0, 60.0],
        Colormap::named("plasma").unwrap(),
    )
    .unwrap();

    let mut plot = MapPlot::new(conus_canvas()).unwrap();
    plot.draw(&layer).unwrap();
    // 30N is below the lowest level; the white background shows through
    assert_eq!(pixel(&plot, 100, 160), [255, 255, 255, 255]);
    assert_ne!(pixel(&plot, 100, 20), [255, 255, 255, 255]);
}

#[test]
fn test_filled_contour_needs_two_levels() {
    let field = global_latitudes();
    let cmap = Colormap::named("viridis").unwrap();
    assert!(FilledContour::new(&field, vec![1.0], cmap.clone()).is_err());
    assert!(FilledContour::new(&field, vec![2.0, 1.0], cmap).is_err());
}

#[test]
fn test_filled_contour_crosses_the_dateline() {
    let field = global_latitudes();
    let canvas = MapCanvas::new(
        GridCrs::geographic(),
        BoundingBox::new(170.0, -10.0, 190.0, 10.0),
        100,
        100,
    )
    .unwrap();
    let layer = FilledContour::new(
        &field,
        vec![-90.0, 0.0, 90.0],
        Colormap::named("bwr").unwrap(),
    )
    .unwrap();

    let mut plot = MapPlot::new(canvas).unwrap();
    plot.draw(&layer).unwrap();
    // Every pixel, including those east of 180, is colored
    assert!(plot
        .pixmap()
        .pixels()
        .iter()
        .all(|p| p.demultiply().blue() < 255 || p.demultiply().red() < 255));
}

#[test]
fn test_scatter_colors_by_value() {
    let mut batch = PointBatch::new("flash_energy", Unit::Femtojoules);
    for (lon, value) in [(-110.0, 1.0), (-80.0, 100.0)] {
        batch.push(Observation {
            lon,
            lat: 40.0,
            value,
            time: None,
        });
    }
    let cmap = Colormap::named("viridis").unwrap();
    let layer = Scatter::new(&batch, cmap.clone()).radius(4.0);

    let mut plot = MapPlot::new(conus_canvas()).unwrap();
    plot.draw(&layer).unwrap();

    // (-110, 40) and (-80, 40) sit at pixels (80, 80) and (320, 80)
    assert_eq!(pixel(&plot, 80, 80), cmap.sample(0.0));
    assert_eq!(pixel(&plot, 320, 80), cmap.sample(1.0));
    assert_eq!(pixel(&plot, 200, 80), [255, 255, 255, 255]);
}

#[test]
fn test_empty_scatter_is_a_no_op() {
    let batch = PointBatch::new("flash_energy", Unit::Femtojoules);
    let layer = Scatter::new(&batch, Colormap::named("viridis").unwrap());
    let canvas = conus_canvas();
    let mut pixmap = tiny_skia::Pixmap::new(canvas.width, canvas.height).unwrap();
    layer.draw(&canvas, &mut pixmap).unwrap();
    assert!(pixmap.pixels().iter().all(|p| p.alpha() == 0));
}

#[test]
fn test_graticule_on_lambert_map() {
    let canvas = MapCanvas::new(
        GridCrs::conus_lambert(),
        BoundingBox::new(-125.0, 24.0, -66.0, 50.0),
        300,
        200,
    )
    .unwrap();
    let mut plot = MapPlot::new(canvas).unwrap();
    plot.draw(&Graticule::new(10.0).unwrap()).unwrap();
    let touched = plot
        .pixmap()
        .pixels()
        .iter()
        .filter(|p| p.demultiply().red() < 250)
        .count();
    assert!(touched > 300, "only {} pixels touched", touched);
}

#[test]
fn test_save_png() {
    let field = global_latitudes();
    let layer = FilledContour::new(
        &field,
        level_range(20.0, 55.0, 5.0),
        Colormap::named("ylorrd").unwrap(),
    )
    .unwrap();
    let mut plot = MapPlot::new(conus_canvas()).unwrap();
    plot.draw(&layer)
        .unwrap()
        .draw(&Graticule::default())
        .unwrap();

    let dir = temp_test_dir();
    let path = scratch_file(&dir, "map.png");
    plot.save_png(&path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
    assert_eq!(u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]), 400);
    assert_eq!(u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]), 200);
}
