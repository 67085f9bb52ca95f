//! Interpolation of one 3-D variable onto a surface of another.
//!
//! The canonical use is the dynamic tropopause: potential temperature
//! interpolated to the 2 PVU surface of potential vorticity.

use tracing::debug;
use wx_common::{Field, Unit};

use crate::error::{CalcError, CalcResult};

/// Value of `interp_var` where `level_var` first crosses `threshold` in
/// each column.
///
/// Columns are searched from the physical bottom (highest pressure on an
/// isobaric axis, lowest value otherwise) upward when `bottom_up` is true,
/// and from the top downward otherwise. Between the two bracketing levels
/// the result is linearly interpolated in `level_var`. Columns with no
/// crossing are NaN.
pub fn interpolate_to_isosurface(
    level_var: &Field,
    interp_var: &Field,
    threshold: f64,
    bottom_up: bool,
) -> CalcResult<Field> {
    let axis = level_var
        .levels
        .as_ref()
        .ok_or_else(|| CalcError::MissingLevels(level_var.name.clone()))?;
    if interp_var.levels.is_none() {
        return Err(CalcError::MissingLevels(interp_var.name.clone()));
    }
    level_var.check_aligned(interp_var)?;
    if !threshold.is_finite() {
        return Err(CalcError::invalid_argument("isosurface threshold must be finite"));
    }

    let order = search_order(&axis.values, axis.units.is_compatible(&Unit::Pascal), bottom_up);
    let plane = level_var.nx() * level_var.ny();
    let levels = level_var.data();
    let values = interp_var.data();

    let mut out = vec![f32::NAN; plane];
    let mut missing = 0usize;
    for (n, slot) in out.iter_mut().enumerate() {
        match column_crossing(&order, plane, n, levels, values, threshold) {
            Some(v) => *slot = v as f32,
            None => missing += 1,
        }
    }

    debug!(
        level_var = %level_var.name,
        interp_var = %interp_var.name,
        threshold,
        columns = plane,
        missing,
        "Interpolated to isosurface"
    );

    let surface = interp_var.level(0)?;
    Ok(surface.with_data(interp_var.name.clone(), interp_var.units.clone(), out)?)
}

/// Level indices ordered bottom-first (or top-first).
fn search_order(values: &[f64], is_pressure: bool, bottom_up: bool) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|a, b| {
        let ord = values[*a].total_cmp(&values[*b]);
        if is_pressure {
            ord.reverse()
        } else {
            ord
        }
    });
    if !bottom_up {
        order.reverse();
    }
    order
}

fn column_crossing(
    order: &[usize],
    plane: usize,
    n: usize,
    levels: &[f32],
    values: &[f32],
    threshold: f64,
) -> Option<f64> {
    for pair in order.windows(2) {
        let (k0, k1) = (pair[0] * plane + n, pair[1] * plane + n);
        let (a, b) = (levels[k0] as f64, levels[k1] as f64);
        if !a.is_finite() || !b.is_finite() {
            continue;
        }
        if a == threshold {
            return Some(values[k0] as f64);
        }
        if (a - threshold) * (b - threshold) < 0.0 || b == threshold {
            let t = (threshold - a) / (b - a);
            let (v0, v1) = (values[k0] as f64, values[k1] as f64);
            return Some(v0 + t * (v1 - v0));
        }
    }
    None
}
