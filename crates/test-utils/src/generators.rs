//! Synthetic fields with known analytic properties.
//!
//! Projected generators place the grid on the CONUS Lambert mapping with
//! axes centred on the projection origin, so derivative results can be
//! checked against closed-form answers.

use wx_common::{Field, GridCrs, Unit, VectorFrame, VerticalAxis};

/// Axis of `n` points with `spacing`, centred on zero.
pub fn centred_axis(n: usize, spacing: f64) -> Vec<f64> {
    let half = (n as f64 - 1.0) / 2.0;
    (0..n).map(|i| (i as f64 - half) * spacing).collect()
}

/// Regular axis starting at `start`.
pub fn regular_axis(n: usize, start: f64, step: f64) -> Vec<f64> {
    (0..n).map(|i| start + i as f64 * step).collect()
}

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1000.0); // col=1, row=0
/// assert_eq!(grid[10], 1.0);  // col=0, row=1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates a grid with NaN at the given `(col, row)` positions, zero elsewhere.
pub fn create_grid_with_nans(
    width: usize,
    height: usize,
    nan_positions: &[(usize, usize)],
) -> Vec<f32> {
    let mut data = vec![0.0f32; width * height];
    for &(col, row) in nan_positions {
        if col < width && row < height {
            data[row * width + col] = f32::NAN;
        }
    }
    data
}

/// A 2-D field on a projected (Lambert, meters) grid with values `f(x, y)`.
pub fn projected_field<F>(
    name: &str,
    units: Unit,
    nx: usize,
    ny: usize,
    spacing: f64,
    f: F,
) -> Field
where
    F: Fn(f64, f64) -> f64,
{
    let x = centred_axis(nx, spacing);
    let y = centred_axis(ny, spacing);
    let mut data = Vec::with_capacity(nx * ny);
    for yy in &y {
        for xx in &x {
            data.push(f(*xx, *yy) as f32);
        }
    }
    Field::new(name, units, x, y, data)
        .expect("generator shape is consistent")
        .with_crs(GridCrs::conus_lambert())
}

/// A 2-D field on a lon/lat grid with values `f(lon, lat)`.
pub fn geographic_field<F>(name: &str, units: Unit, lons: Vec<f64>, lats: Vec<f64>, f: F) -> Field
where
    F: Fn(f64, f64) -> f64,
{
    let mut data = Vec::with_capacity(lons.len() * lats.len());
    for lat in &lats {
        for lon in &lons {
            data.push(f(*lon, *lat) as f32);
        }
    }
    Field::new(name, units, lons, lats, data)
        .expect("generator shape is consistent")
        .with_crs(GridCrs::geographic())
}

/// A 3-D field on isobaric levels (hPa) over a projected grid with values
/// `f(p_hpa, x, y)`.
pub fn isobaric_field<F>(
    name: &str,
    units: Unit,
    levels_hpa: &[f64],
    nx: usize,
    ny: usize,
    spacing: f64,
    f: F,
) -> Field
where
    F: Fn(f64, f64, f64) -> f64,
{
    let x = centred_axis(nx, spacing);
    let y = centred_axis(ny, spacing);
    let mut data = Vec::with_capacity(levels_hpa.len() * nx * ny);
    for p in levels_hpa {
        for yy in &y {
            for xx in &x {
                data.push(f(*p, *xx, *yy) as f32);
            }
        }
    }
    Field::new_3d(
        name,
        units,
        VerticalAxis::isobaric_hpa(levels_hpa.to_vec()),
        x,
        y,
        data,
    )
    .expect("generator shape is consistent")
    .with_crs(GridCrs::conus_lambert())
}

/// Solid-body rotation `u = -ωy, v = ωx` along the grid axes. Relative
/// vorticity is `2ω` everywhere and divergence is zero.
pub fn solid_body_rotation(nx: usize, ny: usize, spacing: f64, omega: f64) -> (Field, Field) {
    let u = projected_field("u", Unit::MetersPerSecond, nx, ny, spacing, |_, y| {
        -omega * y
    });
    let v = projected_field("v", Unit::MetersPerSecond, nx, ny, spacing, |x, _| {
        omega * x
    });
    (
        u.with_vector_frame(VectorFrame::GridRelative),
        v.with_vector_frame(VectorFrame::GridRelative),
    )
}

/// Spatially uniform wind along the grid axes.
pub fn uniform_flow(nx: usize, ny: usize, spacing: f64, u0: f64, v0: f64) -> (Field, Field) {
    let u = projected_field("u", Unit::MetersPerSecond, nx, ny, spacing, |_, _| u0);
    let v = projected_field("v", Unit::MetersPerSecond, nx, ny, spacing, |_, _| v0);
    (
        u.with_vector_frame(VectorFrame::GridRelative),
        v.with_vector_frame(VectorFrame::GridRelative),
    )
}

/// Scalar `a*x + b*y + c` on a projected grid.
#[allow(clippy::too_many_arguments)]
pub fn linear_field(
    name: &str,
    units: Unit,
    nx: usize,
    ny: usize,
    spacing: f64,
    a: f64,
    b: f64,
    c: f64,
) -> Field {
    projected_field(name, units, nx, ny, spacing, |x, y| a * x + b * y + c)
}

/// Standard-atmosphere-like temperature on isobaric levels: 288 K at
/// 1000 hPa decreasing with height, isothermal above 200 hPa.
pub fn temperature_profile(p_hpa: f64) -> f64 {
    if p_hpa <= 200.0 {
        217.0
    } else {
        // Dry adiabat-ish lapse in log-pressure
        217.0 + 71.0 * (p_hpa / 200.0).ln() / (5.0f64).ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_grid() {
        let grid = create_test_grid(10, 5);
        assert_eq!(grid.len(), 50);
        assert_eq!(grid[0], 0.0); // col=0, row=0
        assert_eq!(grid[11], 1001.0); // col=1, row=1
    }

    #[test]
    fn test_centred_axis() {
        let axis = centred_axis(5, 2.0);
        assert_eq!(axis, vec![-4.0, -2.0, 0.0, 2.0, 4.0]);
    }

    #[test]
    fn test_solid_body_rotation_shape() {
        let (u, v) = solid_body_rotation(7, 5, 1000.0, 1e-4);
        assert_eq!(u.shape(), (1, 5, 7));
        assert!(u.check_aligned(&v).is_ok());
        // Centre node is at rest.
        assert_eq!(u.value(0, 2, 3), Some(0.0));
    }

    #[test]
    fn test_isobaric_field_levels() {
        let t = isobaric_field("t", Unit::Kelvin, &[1000.0, 500.0], 3, 3, 1.0, |p, _, _| {
            temperature_profile(p)
        });
        assert_eq!(t.nlev(), 2);
        assert_eq!(t.value(0, 0, 0), Some(288.0));
    }

    #[test]
    fn test_grid_with_nans() {
        let grid = create_grid_with_nans(4, 4, &[(1, 2)]);
        assert!(grid[2 * 4 + 1].is_nan());
        assert_eq!(grid.iter().filter(|v| v.is_nan()).count(), 1);
    }
}
