//! Spatial smoothing filters.
//!
//! All filters act on each horizontal plane independently and keep the
//! field's units, axes and metadata. NaN values propagate into every output
//! point whose stencil touches them.

use tracing::debug;
use wx_common::Field;

use crate::error::{CalcError, CalcResult};

/// Gaussian filter.
///
/// `n` is the number of grid points per standard-deviation wavelength:
/// the kernel has σ = n / (2π) grid points and is truncated at 2√2·σ.
/// Edges are padded with the nearest value.
pub fn smooth_gaussian(field: &Field, n: usize) -> CalcResult<Field> {
    if n == 0 {
        return Err(CalcError::invalid_argument(
            "gaussian smoothing needs n >= 1",
        ));
    }
    let sigma = n as f64 / (2.0 * std::f64::consts::PI);
    let kernel = gaussian_kernel(sigma);
    debug!(field = %field.name, sigma, radius = kernel.len() / 2, "Gaussian smoothing");

    let (nx, ny) = (field.nx(), field.ny());
    let mut out = field.data().to_vec();
    if out.is_empty() {
        return Ok(field.clone());
    }
    for plane in out.chunks_mut(nx * ny) {
        convolve_rows(plane, nx, ny, &kernel);
        convolve_columns(plane, nx, ny, &kernel);
    }
    Ok(field.with_data(field.name.clone(), field.units.clone(), out)?)
}

/// Normalised 1-D Gaussian weights of radius `trunc(2√2 σ + 0.5)`.
fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (2.0 * std::f64::consts::SQRT_2 * sigma + 0.5) as isize;
    let weights: Vec<f64> = (-radius..=radius)
        .map(|k| (-0.5 * (k * k) as f64 / (sigma * sigma)).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

fn convolve_rows(plane: &mut [f32], nx: usize, ny: usize, kernel: &[f64]) {
    let radius = (kernel.len() / 2) as isize;
    let mut row = vec![0.0f32; nx];
    for j in 0..ny {
        row.copy_from_slice(&plane[j * nx..(j + 1) * nx]);
        for i in 0..nx {
            let mut acc = 0.0f64;
            for (k, w) in kernel.iter().enumerate() {
                let src = (i as isize + k as isize - radius).clamp(0, nx as isize - 1) as usize;
                acc += w * row[src] as f64;
            }
            plane[j * nx + i] = acc as f32;
        }
    }
}

fn convolve_columns(plane: &mut [f32], nx: usize, ny: usize, kernel: &[f64]) {
    let radius = (kernel.len() / 2) as isize;
    let mut column = vec![0.0f32; ny];
    for i in 0..nx {
        for (j, c) in column.iter_mut().enumerate() {
            *c = plane[j * nx + i];
        }
        for j in 0..ny {
            let mut acc = 0.0f64;
            for (k, w) in kernel.iter().enumerate() {
                let src = (j as isize + k as isize - radius).clamp(0, ny as isize - 1) as usize;
                acc += w * column[src] as f64;
            }
            plane[j * nx + i] = acc as f32;
        }
    }
}

/// A rectangular weight window with odd dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    rows: usize,
    cols: usize,
    weights: Vec<f64>,
}

impl Window {
    /// Weights are row-major, `rows * cols` long.
    pub fn new(rows: usize, cols: usize, weights: Vec<f64>) -> CalcResult<Self> {
        if rows % 2 == 0 || cols % 2 == 0 {
            return Err(CalcError::invalid_argument(format!(
                "window dimensions must be odd, got {}x{}",
                rows, cols
            )));
        }
        if weights.len() != rows * cols {
            return Err(CalcError::invalid_argument(format!(
                "{}x{} window needs {} weights, got {}",
                rows,
                cols,
                rows * cols,
                weights.len()
            )));
        }
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(CalcError::invalid_argument("window weights must be finite"));
        }
        Ok(Self {
            rows,
            cols,
            weights,
        })
    }

    /// Centre 0.5, edge neighbours 0.125.
    pub fn five_point() -> Self {
        Self {
            rows: 3,
            cols: 3,
            weights: vec![0.0, 0.125, 0.0, 0.125, 0.5, 0.125, 0.0, 0.125, 0.0],
        }
    }

    /// Centre 0.25, edge neighbours 0.125, corners 0.0625.
    pub fn nine_point() -> Self {
        Self {
            rows: 3,
            cols: 3,
            weights: vec![
                0.0625, 0.125, 0.0625, 0.125, 0.25, 0.125, 0.0625, 0.125, 0.0625,
            ],
        }
    }

    /// Uniform `size x size` window.
    pub fn boxcar(size: usize) -> CalcResult<Self> {
        let w = 1.0 / (size * size).max(1) as f64;
        Self::new(size, size, vec![w; size * size])
    }

    /// Scale weights to sum to one.
    pub fn normalized(self) -> CalcResult<Self> {
        let total: f64 = self.weights.iter().sum();
        if total == 0.0 {
            return Err(CalcError::invalid_argument(
                "cannot normalise a window whose weights sum to zero",
            ));
        }
        Ok(Self {
            weights: self.weights.iter().map(|w| w / total).collect(),
            ..self
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}

/// Apply a weighted window `passes` times.
///
/// Only points where the whole window fits inside the grid are smoothed;
/// points within half a window of the edge keep their values.
pub fn smooth_window(field: &Field, window: &Window, passes: usize) -> CalcResult<Field> {
    let (nx, ny) = (field.nx(), field.ny());
    let (hr, hc) = (window.rows / 2, window.cols / 2);

    let mut out = field.data().to_vec();
    if out.is_empty() || ny <= 2 * hr || nx <= 2 * hc {
        debug!(field = %field.name, "Grid smaller than window, nothing smoothed");
        return Ok(field.with_data(field.name.clone(), field.units.clone(), out)?);
    }

    for plane in out.chunks_mut(nx * ny) {
        let mut scratch = plane.to_vec();
        for _ in 0..passes {
            scratch.copy_from_slice(plane);
            for j in hr..ny - hr {
                for i in hc..nx - hc {
                    let mut acc = 0.0f64;
                    for wr in 0..window.rows {
                        let row = (j + wr - hr) * nx;
                        for wc in 0..window.cols {
                            let w = window.weights[wr * window.cols + wc];
                            if w != 0.0 {
                                acc += w * scratch[row + i + wc - hc] as f64;
                            }
                        }
                    }
                    plane[j * nx + i] = acc as f32;
                }
            }
        }
    }

    Ok(field.with_data(field.name.clone(), field.units.clone(), out)?)
}

/// Classic 5- or 9-point smoother.
pub fn smooth_n_point(field: &Field, n: usize, passes: usize) -> CalcResult<Field> {
    let window = match n {
        5 => Window::five_point(),
        9 => Window::nine_point(),
        other => {
            return Err(CalcError::invalid_argument(format!(
                "n-point smoothing supports 5 or 9 points, got {}",
                other
            )))
        }
    };
    smooth_window(field, &window, passes)
}
