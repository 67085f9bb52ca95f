//! Thermodynamic quantities on isobaric levels.

use tracing::debug;
use wx_common::{Field, Unit};

use crate::constants::{GRAVITY, KAPPA, P0_HPA};
use crate::error::{CalcError, CalcResult};
use crate::kinematics::{absolute_vorticity, ddx, ddy, derivative_line, grid_deltas, grid_wind_pair};

/// θ = T (P0 / p)^κ for a single temperature (K) and pressure (hPa).
pub fn potential_temperature_at(temperature_k: f64, pressure_hpa: f64) -> f64 {
    temperature_k * (P0_HPA / pressure_hpa).powf(KAPPA)
}

/// Pressure of each level in the given unit, failing for fields without an
/// isobaric axis.
fn pressure_levels(field: &Field, units: &Unit) -> CalcResult<Vec<f64>> {
    let axis = field
        .levels
        .as_ref()
        .ok_or_else(|| CalcError::MissingLevels(field.name.clone()))?;
    if !axis.units.is_compatible(&Unit::Pascal) {
        return Err(CalcError::UnitMismatch {
            expected: "pressure levels".to_string(),
            actual: format!("{} ('{}')", axis.units, axis.name),
        });
    }
    Ok(axis.values_in(units)?)
}

/// Potential temperature (K) of a temperature field on isobaric levels.
pub fn potential_temperature(temperature: &Field) -> CalcResult<Field> {
    temperature.require_units(&Unit::Kelvin)?;
    let t = temperature.convert_units(&Unit::Kelvin)?;
    let pressures = pressure_levels(&t, &Unit::Hectopascal)?;

    let plane = t.nx() * t.ny();
    let data = t
        .data()
        .iter()
        .enumerate()
        .map(|(n, v)| potential_temperature_at(*v as f64, pressures[n / plane]) as f32)
        .collect();

    Ok(t.with_data("potential_temperature", Unit::Kelvin, data)?)
}

/// ∂f/∂p (per Pa) along the vertical axis of every column.
fn ddp(field: &Field) -> CalcResult<Vec<f64>> {
    let pressures = pressure_levels(field, &Unit::Pascal)?;
    let nlev = pressures.len();
    if nlev < 3 {
        return Err(CalcError::invalid_argument(format!(
            "'{}' needs at least 3 levels for a vertical derivative, got {}",
            field.name, nlev
        )));
    }

    let spacing: Vec<f64> = pressures.windows(2).map(|p| p[1] - p[0]).collect();
    if spacing.iter().any(|d| *d == 0.0) {
        return Err(CalcError::invalid_argument(format!(
            "'{}' has repeated pressure levels",
            field.name
        )));
    }

    let plane = field.nx() * field.ny();
    let mut out = vec![0.0; field.len()];
    let mut column = vec![0.0; nlev];
    let mut result = vec![0.0; nlev];
    for n in 0..plane {
        for (k, c) in column.iter_mut().enumerate() {
            *c = field.data()[k * plane + n] as f64;
        }
        derivative_line(&column, &spacing, &mut result);
        for (k, r) in result.iter().enumerate() {
            out[k * plane + n] = *r;
        }
    }
    Ok(out)
}

/// Baroclinic Ertel potential vorticity on isobaric levels (K m2 kg-1 s-1).
///
/// PV = −g (ζ + f) ∂θ/∂p + g (∂v/∂p ∂θ/∂x − ∂u/∂p ∂θ/∂y)
///
/// `theta`, `u` and `v` must share the same 3-D grid with at least three
/// pressure levels.
pub fn potential_vorticity_baroclinic(theta: &Field, u: &Field, v: &Field) -> CalcResult<Field> {
    theta.require_units(&Unit::Kelvin)?;
    let theta = theta.convert_units(&Unit::Kelvin)?;
    let (u, v) = grid_wind_pair(u, v)?;
    theta.check_aligned(&u)?;
    if theta.levels.is_none() {
        return Err(CalcError::MissingLevels(theta.name.clone()));
    }

    let dthetadp = ddp(&theta)?;
    let dudp = ddp(&u)?;
    let dvdp = ddp(&v)?;

    let deltas = grid_deltas(&theta)?;
    let dthetadx = ddx(&theta, &deltas)?;
    let dthetady = ddy(&theta, &deltas)?;

    let avor = absolute_vorticity(&u, &v)?;

    let pv = (0..theta.len())
        .map(|n| {
            let eta = avor.data()[n] as f64;
            -GRAVITY * eta * dthetadp[n]
                + GRAVITY * (dvdp[n] * dthetadx[n] - dudp[n] * dthetady[n])
        })
        .map(|v| v as f32)
        .collect();

    debug!(grid = ?theta.shape(), "Computed baroclinic potential vorticity");
    Ok(theta.with_data("potential_vorticity", Unit::PotentialVorticity, pv)?)
}
