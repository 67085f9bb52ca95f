//! Tests for PNG encoding of map rasters.

use renderer::png::{create_png, create_png_auto};

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Color type byte of the IHDR chunk.
fn color_type(png: &[u8]) -> u8 {
    png[25]
}

/// Filled-contour-like raster: a handful of flat color bands.
fn banded_pixels(width: usize, height: usize, bands: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for _ in 0..width {
            let band = (y * bands / height) as u8;
            pixels.extend_from_slice(&[band.wrapping_mul(20), 80, 200 - band * 5, 255]);
        }
    }
    pixels
}

#[test]
fn test_few_colors_use_palette() {
    let pixels = banded_pixels(32, 32, 8);
    let png = create_png_auto(&pixels, 32, 32).unwrap();
    assert_eq!(&png[0..8], &SIGNATURE);
    assert_eq!(color_type(&png), 3);
}

#[test]
fn test_many_colors_fall_back_to_rgba() {
    let mut pixels = Vec::with_capacity(300 * 4);
    for i in 0..300u32 {
        pixels.extend_from_slice(&[(i % 256) as u8, (i / 256) as u8, 7, 255]);
    }
    let png = create_png_auto(&pixels, 300, 1).unwrap();
    assert_eq!(color_type(&png), 6);
}

#[test]
fn test_indexed_is_smaller_than_rgba() {
    let pixels = banded_pixels(64, 64, 12);
    let indexed = create_png_auto(&pixels, 64, 64).unwrap();
    let rgba = create_png(&pixels, 64, 64).unwrap();
    assert!(
        indexed.len() < rgba.len(),
        "indexed {} bytes, rgba {} bytes",
        indexed.len(),
        rgba.len()
    );
}

#[test]
fn test_large_raster_parallel_palette() {
    // Above the parallel extraction threshold
    let pixels = banded_pixels(128, 128, 40);
    let png = create_png_auto(&pixels, 128, 128).unwrap();
    assert_eq!(color_type(&png), 3);
    assert_eq!(u32::from_be_bytes([png[16], png[17], png[18], png[19]]), 128);
}

#[test]
fn test_transparent_pixels_keep_alpha() {
    let pixels = [0, 0, 0, 0, 255, 0, 0, 128, 0, 0, 255, 255, 0, 0, 0, 0];
    let png = create_png_auto(&pixels, 2, 2).unwrap();
    // Palette images carry alpha in a tRNS chunk
    assert!(png.windows(4).any(|w| w == b"tRNS"));
}

#[test]
fn test_wrong_buffer_length() {
    assert!(create_png_auto(&[0u8; 12], 2, 2).is_err());
    assert!(create_png(&[0u8; 20], 2, 2).is_err());
}
