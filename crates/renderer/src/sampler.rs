//! Bilinear sampling of a gridded field at geographic points.

use projection::{projection_for, Projection};
use wx_common::Field;

use crate::error::{RenderError, RenderResult};

/// Looks up values of one level of a field by longitude/latitude.
#[derive(Debug)]
pub struct GridSampler<'a> {
    x: &'a [f64],
    y: &'a [f64],
    data: &'a [f32],
    projection: Box<dyn Projection>,
    geographic: bool,
    /// Global lon/lat grid whose last column wraps to the first.
    periodic: bool,
}

impl<'a> GridSampler<'a> {
    pub fn new(field: &'a Field, level: usize) -> RenderResult<Self> {
        let crs = field.crs.as_ref().ok_or_else(|| {
            RenderError::layer("field", format!("'{}' has no grid mapping", field.name))
        })?;
        if level >= field.nlev() {
            return Err(RenderError::layer(
                "field",
                format!("level {} of '{}' ({} levels)", level, field.name, field.nlev()),
            ));
        }
        if field.nx() < 2 || field.ny() < 2 {
            return Err(RenderError::layer(
                "field",
                format!("'{}' needs at least 2x2 points", field.name),
            ));
        }

        let geographic = crs.is_geographic();
        let periodic = geographic && {
            let step = field.x[1] - field.x[0];
            let span = field.x[field.nx() - 1] - field.x[0];
            step > 0.0 && (span + step - 360.0).abs() < step * 0.5
        };

        Ok(Self {
            x: &field.x,
            y: &field.y,
            data: field.level_slice(level),
            projection: projection_for(crs),
            geographic,
            periodic,
        })
    }

    pub fn nx(&self) -> usize {
        self.x.len()
    }

    pub fn ny(&self) -> usize {
        self.y.len()
    }

    /// Value at `(lon, lat)`; `None` outside the grid or next to missing data.
    pub fn sample(&self, lon: f64, lat: f64) -> Option<f32> {
        let (fi, fj) = self.fractional_index(lon, lat)?;
        self.bilinear(fi, fj)
    }

    /// Fractional `(i, j)` grid index of a geographic point.
    pub fn fractional_index(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let (x, y) = self.projection.forward(lon, lat)?;
        let fj = axis_position(self.y, y)?;
        if !self.geographic {
            return Some((axis_position(self.x, x)?, fj));
        }

        for candidate in [x, x + 360.0, x - 360.0] {
            if let Some(fi) = axis_position(self.x, candidate) {
                return Some((fi, fj));
            }
        }
        if self.periodic {
            // Between the last column and the first one + 360
            let n = self.x.len();
            let last = self.x[n - 1];
            let step = self.x[1] - self.x[0];
            for candidate in [x, x + 360.0, x - 360.0] {
                let beyond = (candidate - last) / step;
                if (0.0..1.0).contains(&beyond) {
                    return Some(((n - 1) as f64 + beyond, fj));
                }
            }
        }
        None
    }

    /// Geographic position of a fractional grid index.
    pub fn grid_to_geographic(&self, fi: f64, fj: f64) -> Option<(f64, f64)> {
        let x = axis_value(self.x, fi)?;
        let y = axis_value(self.y, fj)?;
        self.projection.inverse(x, y)
    }

    fn bilinear(&self, fi: f64, fj: f64) -> Option<f32> {
        let nx = self.x.len();
        let ny = self.y.len();
        let wrap = self.periodic && fi >= (nx - 1) as f64;

        let i0 = if wrap { nx - 1 } else { (fi.floor() as usize).min(nx - 2) };
        let i1 = if wrap { 0 } else { i0 + 1 };
        let j0 = (fj.floor() as usize).min(ny - 2);
        let (tx, ty) = ((fi - i0 as f64) as f32, (fj - j0 as f64) as f32);

        let at = |j: usize, i: usize| self.data[j * nx + i];
        let (v00, v01) = (at(j0, i0), at(j0, i1));
        let (v10, v11) = (at(j0 + 1, i0), at(j0 + 1, i1));
        if v00.is_nan() || v01.is_nan() || v10.is_nan() || v11.is_nan() {
            return None;
        }

        let top = v00 + (v01 - v00) * tx;
        let bottom = v10 + (v11 - v10) * tx;
        Some(top + (bottom - top) * ty)
    }
}

/// Fractional index of `value` on a monotonic axis, `None` outside it.
pub fn axis_position(axis: &[f64], value: f64) -> Option<f64> {
    let n = axis.len();
    if n < 2 || !value.is_finite() {
        return None;
    }
    let ascending = axis[n - 1] > axis[0];
    let (lo, hi) = if ascending {
        (axis[0], axis[n - 1])
    } else {
        (axis[n - 1], axis[0])
    };
    if value < lo || value > hi {
        return None;
    }

    // First index whose coordinate is past `value`
    let upper = if ascending {
        axis.partition_point(|a| *a <= value)
    } else {
        axis.partition_point(|a| *a >= value)
    };
    let i = upper.clamp(1, n - 1) - 1;
    let (a, b) = (axis[i], axis[i + 1]);
    let t = if b != a { (value - a) / (b - a) } else { 0.0 };
    Some(i as f64 + t)
}

/// Coordinate at a fractional index, linear between nodes.
pub fn axis_value(axis: &[f64], index: f64) -> Option<f64> {
    let n = axis.len();
    if n == 0 || !index.is_finite() || index < 0.0 || index > (n - 1) as f64 {
        return None;
    }
    if n == 1 {
        return Some(axis[0]);
    }
    let i = (index.floor() as usize).min(n - 2);
    let t = index - i as f64;
    Some(axis[i] + (axis[i + 1] - axis[i]) * t)
}
