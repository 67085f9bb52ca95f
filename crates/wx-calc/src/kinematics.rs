//! Horizontal derivatives and kinematic quantities.
//!
//! Derivatives use second-order centred differences that allow
//! non-uniform spacing, with second-order one-sided differences on the
//! edges. Spacing comes from [`grid_deltas`]: great-circle distances on
//! lon/lat grids, coordinate differences (meters) on projected grids.

use tracing::debug;
use wx_common::{Field, GridCrs, Unit, VectorFrame};

use crate::constants::EARTH_OMEGA;
use crate::error::{CalcError, CalcResult};

/// Signed distances (meters) between neighbouring grid nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct GridDeltas {
    pub nx: usize,
    pub ny: usize,
    /// `ny * (nx - 1)` values; `dx[j * (nx - 1) + i]` spans `(j, i)` to `(j, i + 1)`.
    pub dx: Vec<f64>,
    /// `(ny - 1) * nx` values; `dy[j * nx + i]` spans `(j, i)` to `(j + 1, i)`.
    pub dy: Vec<f64>,
}

impl GridDeltas {
    fn dx_row(&self, j: usize) -> &[f64] {
        &self.dx[j * (self.nx - 1)..(j + 1) * (self.nx - 1)]
    }
}

/// Node spacing of `field`'s horizontal grid.
///
/// Geographic grids use the haversine distance on the grid's sphere, signed
/// by the direction of the coordinate axis. Grids without a mapping are
/// treated as projected with axes in meters.
pub fn grid_deltas(field: &Field) -> CalcResult<GridDeltas> {
    let (nx, ny) = (field.nx(), field.ny());
    if nx < 2 || ny < 2 {
        return Err(CalcError::invalid_argument(format!(
            "'{}' needs at least 2x2 points for grid spacing, got {}x{}",
            field.name, nx, ny
        )));
    }

    let mut dx = Vec::with_capacity(ny * (nx - 1));
    let mut dy = Vec::with_capacity((ny - 1) * nx);

    match field.crs.as_ref().filter(|c| c.is_geographic()) {
        Some(crs) => {
            let radius = crs.earth_radius();
            for lat in &field.y {
                for pair in field.x.windows(2) {
                    let d = haversine(pair[0], *lat, pair[1], *lat, radius);
                    dx.push(d.copysign(pair[1] - pair[0]));
                }
            }
            for pair in field.y.windows(2) {
                for lon in &field.x {
                    let d = haversine(*lon, pair[0], *lon, pair[1], radius);
                    dy.push(d.copysign(pair[1] - pair[0]));
                }
            }
        }
        None => {
            for _ in 0..ny {
                dx.extend(field.x.windows(2).map(|p| p[1] - p[0]));
            }
            for pair in field.y.windows(2) {
                dy.extend(std::iter::repeat(pair[1] - pair[0]).take(nx));
            }
        }
    }

    if dx.iter().chain(&dy).any(|d| *d == 0.0 || !d.is_finite()) {
        return Err(CalcError::invalid_argument(format!(
            "'{}' has repeated or non-finite coordinates",
            field.name
        )));
    }

    Ok(GridDeltas { nx, ny, dx, dy })
}

/// Great-circle distance between two lon/lat points (degrees).
fn haversine(lon1: f64, lat1: f64, lon2: f64, lat2: f64, radius: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let dphi = phi2 - phi1;
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * radius * a.sqrt().asin()
}

/// First derivative of a line of values with spacings `d` (`f.len() - 1` long).
pub(crate) fn derivative_line(f: &[f64], d: &[f64], out: &mut [f64]) {
    let n = f.len();

    let (d0, d1) = (d[0], d[1]);
    out[0] = -(2.0 * d0 + d1) / (d0 * (d0 + d1)) * f[0] + (d0 + d1) / (d0 * d1) * f[1]
        - d0 / (d1 * (d0 + d1)) * f[2];

    for i in 1..n - 1 {
        let (d0, d1) = (d[i - 1], d[i]);
        out[i] = -d1 / (d0 * (d0 + d1)) * f[i - 1]
            + (d1 - d0) / (d0 * d1) * f[i]
            + d0 / (d1 * (d0 + d1)) * f[i + 1];
    }

    let (d0, d1) = (d[n - 3], d[n - 2]);
    out[n - 1] = d1 / (d0 * (d0 + d1)) * f[n - 3] - (d0 + d1) / (d0 * d1) * f[n - 2]
        + (2.0 * d1 + d0) / (d1 * (d0 + d1)) * f[n - 1];
}

fn require_points(field: &Field, axis: &str, n: usize) -> CalcResult<()> {
    if n < 3 {
        return Err(CalcError::invalid_argument(format!(
            "'{}' needs at least 3 points along {} to differentiate, got {}",
            field.name, axis, n
        )));
    }
    Ok(())
}

/// ∂f/∂x for every level, in `f` units per meter.
pub(crate) fn ddx(field: &Field, deltas: &GridDeltas) -> CalcResult<Vec<f64>> {
    let (nx, ny) = (field.nx(), field.ny());
    require_points(field, "x", nx)?;

    let mut out = vec![0.0; field.len()];
    let mut line = vec![0.0; nx];
    for (plane_in, plane_out) in field.data().chunks(nx * ny).zip(out.chunks_mut(nx * ny)) {
        for j in 0..ny {
            for (i, v) in line.iter_mut().enumerate() {
                *v = plane_in[j * nx + i] as f64;
            }
            derivative_line(&line, deltas.dx_row(j), &mut plane_out[j * nx..(j + 1) * nx]);
        }
    }
    Ok(out)
}

/// ∂f/∂y for every level, in `f` units per meter.
pub(crate) fn ddy(field: &Field, deltas: &GridDeltas) -> CalcResult<Vec<f64>> {
    let (nx, ny) = (field.nx(), field.ny());
    require_points(field, "y", ny)?;

    let mut out = vec![0.0; field.len()];
    let mut line = vec![0.0; ny];
    let mut spacing = vec![0.0; ny - 1];
    let mut column = vec![0.0; ny];
    for (plane_in, plane_out) in field.data().chunks(nx * ny).zip(out.chunks_mut(nx * ny)) {
        for i in 0..nx {
            for j in 0..ny {
                line[j] = plane_in[j * nx + i] as f64;
            }
            for (j, s) in spacing.iter_mut().enumerate() {
                *s = deltas.dy[j * nx + i];
            }
            derivative_line(&line, &spacing, &mut column);
            for j in 0..ny {
                plane_out[j * nx + i] = column[j];
            }
        }
    }
    Ok(out)
}

fn per_meter(units: &Unit) -> Unit {
    match units {
        Unit::MetersPerSecond => Unit::PerSecond,
        other => Unit::Other(format!("{} m-1", other.symbol())),
    }
}

fn per_second(units: &Unit) -> Unit {
    match units {
        Unit::Kelvin | Unit::Celsius => Unit::KelvinPerSecond,
        Unit::PerSecond => Unit::PerSecondSquared,
        other => Unit::Other(format!("{} s-1", other.symbol())),
    }
}

fn to_field(like: &Field, name: &str, units: Unit, values: Vec<f64>) -> CalcResult<Field> {
    let data = values.into_iter().map(|v| v as f32).collect();
    Ok(like.with_data(name, units, data)?)
}

/// ∂f/∂x as a new field.
pub fn first_derivative_x(field: &Field) -> CalcResult<Field> {
    let deltas = grid_deltas(field)?;
    let values = ddx(field, &deltas)?;
    to_field(field, &format!("d{}_dx", field.name), per_meter(&field.units), values)
}

/// ∂f/∂y as a new field.
pub fn first_derivative_y(field: &Field) -> CalcResult<Field> {
    let deltas = grid_deltas(field)?;
    let values = ddy(field, &deltas)?;
    to_field(field, &format!("d{}_dy", field.name), per_meter(&field.units), values)
}

/// Validate a wind pair and return both components in m/s.
pub(crate) fn wind_pair(u: &Field, v: &Field) -> CalcResult<(Field, Field)> {
    u.require_units(&Unit::MetersPerSecond)?;
    v.require_units(&Unit::MetersPerSecond)?;
    u.check_aligned(v)?;
    Ok((
        u.convert_units(&Unit::MetersPerSecond)?,
        v.convert_units(&Unit::MetersPerSecond)?,
    ))
}

/// Validate a wind pair and express it along the grid's own x/y axes.
///
/// Earth-relative winds on a projected grid are rotated into the grid
/// basis so that they line up with [`ddx`]/[`ddy`]. Lon/lat grids and
/// grids without a mapping are used as they are.
pub(crate) fn grid_wind_pair(u: &Field, v: &Field) -> CalcResult<(Field, Field)> {
    let (u, v) = wind_pair(u, v)?;
    if u.vector_frame != v.vector_frame {
        return Err(CalcError::invalid_argument(format!(
            "'{}' is {:?} but '{}' is {:?}",
            u.name, u.vector_frame, v.name, v.vector_frame
        )));
    }
    let crs = match u.crs.as_ref() {
        Some(crs) if !crs.is_geographic() && u.vector_frame == VectorFrame::EarthRelative => {
            crs.clone()
        }
        _ => return Ok((u, v)),
    };

    let proj = projection::projection_for(&crs);
    let plane = u.nx() * u.ny();
    let mut lons = Vec::with_capacity(plane);
    let mut lats = Vec::with_capacity(plane);
    for y in &u.y {
        for x in &u.x {
            let (lon, lat) = proj.inverse(*x, *y).unwrap_or((f64::NAN, f64::NAN));
            lons.push(lon);
            lats.push(lat);
        }
    }

    let geographic = GridCrs::geographic();
    let mut u_grid = Vec::with_capacity(u.len());
    let mut v_grid = Vec::with_capacity(v.len());
    for k in 0..u.nlev() {
        let range = k * plane..(k + 1) * plane;
        let (uk, vk) = projection::transform_vectors(
            &geographic,
            &crs,
            &lons,
            &lats,
            &u.data()[range.clone()],
            &v.data()[range],
        )
        .map_err(|e| CalcError::invalid_argument(e.to_string()))?;
        u_grid.extend(uk);
        v_grid.extend(vk);
    }

    debug!(crs = %crs, nodes = plane, "Rotated earth-relative winds onto grid axes");
    let u_name = u.name.clone();
    let v_name = v.name.clone();
    Ok((
        u.with_data(u_name, Unit::MetersPerSecond, u_grid)?
            .with_vector_frame(VectorFrame::GridRelative),
        v.with_data(v_name, Unit::MetersPerSecond, v_grid)?
            .with_vector_frame(VectorFrame::GridRelative),
    ))
}

/// Latitude (degrees) of each node of one horizontal plane.
pub(crate) fn node_latitudes(field: &Field) -> CalcResult<Vec<f64>> {
    let crs = field.crs.as_ref().ok_or_else(|| {
        CalcError::invalid_argument(format!(
            "'{}' has no grid mapping, node latitudes are unknown",
            field.name
        ))
    })?;

    if crs.is_geographic() {
        return Ok(field
            .y
            .iter()
            .flat_map(|lat| std::iter::repeat(*lat).take(field.nx()))
            .collect());
    }

    let proj = projection::projection_for(crs);
    let mut lats = Vec::with_capacity(field.nx() * field.ny());
    for y in &field.y {
        for x in &field.x {
            lats.push(proj.inverse(*x, *y).map(|(_, lat)| lat).unwrap_or(f64::NAN));
        }
    }
    Ok(lats)
}

/// Spherical metric terms `tan(lat) / a` per plane node, or `None` on
/// projected grids.
fn metric_terms(field: &Field) -> Option<Vec<f64>> {
    let crs = field.crs.as_ref().filter(|c| c.is_geographic())?;
    let radius = crs.earth_radius();
    Some(
        field
            .y
            .iter()
            .flat_map(|lat| std::iter::repeat(lat.to_radians().tan() / radius).take(field.nx()))
            .collect(),
    )
}

/// Relative vorticity ∂v/∂x − ∂u/∂y (s-1).
///
/// On lon/lat grids the spherical term `u·tan(φ)/a` is included.
pub fn vorticity(u: &Field, v: &Field) -> CalcResult<Field> {
    let (u, v) = grid_wind_pair(u, v)?;
    let deltas = grid_deltas(&u)?;
    let dvdx = ddx(&v, &deltas)?;
    let dudy = ddy(&u, &deltas)?;

    let mut out: Vec<f64> = dvdx.iter().zip(&dudy).map(|(a, b)| a - b).collect();
    if let Some(metric) = metric_terms(&u) {
        let plane = metric.len();
        for (n, value) in out.iter_mut().enumerate() {
            *value += u.data()[n] as f64 * metric[n % plane];
        }
    }

    debug!(grid = ?u.shape(), "Computed relative vorticity");
    to_field(&u, "relative_vorticity", Unit::PerSecond, out)
}

/// Horizontal divergence ∂u/∂x + ∂v/∂y (s-1).
///
/// On lon/lat grids the spherical term `−v·tan(φ)/a` is included.
pub fn divergence(u: &Field, v: &Field) -> CalcResult<Field> {
    let (u, v) = grid_wind_pair(u, v)?;
    let deltas = grid_deltas(&u)?;
    let dudx = ddx(&u, &deltas)?;
    let dvdy = ddy(&v, &deltas)?;

    let mut out: Vec<f64> = dudx.iter().zip(&dvdy).map(|(a, b)| a + b).collect();
    if let Some(metric) = metric_terms(&u) {
        let plane = metric.len();
        for (n, value) in out.iter_mut().enumerate() {
            *value -= v.data()[n] as f64 * metric[n % plane];
        }
    }

    to_field(&u, "divergence", Unit::PerSecond, out)
}

/// Coriolis parameter 2Ω·sin(φ) (s-1) at `latitude` degrees.
pub fn coriolis_parameter(latitude: f64) -> f64 {
    2.0 * EARTH_OMEGA * latitude.to_radians().sin()
}

/// Coriolis parameter at every node of `like`'s grid.
pub fn coriolis_field(like: &Field) -> CalcResult<Field> {
    let lats = node_latitudes(like)?;
    let plane = lats.len();
    let values = (0..like.len())
        .map(|n| coriolis_parameter(lats[n % plane]))
        .collect();
    to_field(like, "coriolis_parameter", Unit::PerSecond, values)
}

/// Relative vorticity plus the Coriolis parameter (s-1).
pub fn absolute_vorticity(u: &Field, v: &Field) -> CalcResult<Field> {
    let zeta = vorticity(u, v)?;
    let lats = node_latitudes(&zeta)?;
    let plane = lats.len();

    let data = zeta
        .data()
        .iter()
        .enumerate()
        .map(|(n, z)| (*z as f64 + coriolis_parameter(lats[n % plane])) as f32)
        .collect();
    Ok(zeta.with_data("absolute_vorticity", Unit::PerSecond, data)?)
}

/// Horizontal advection of `scalar` by `(u, v)`: −(u ∂s/∂x + v ∂s/∂y).
///
/// The result is in `scalar` units per second.
pub fn advection(scalar: &Field, u: &Field, v: &Field) -> CalcResult<Field> {
    let (u, v) = grid_wind_pair(u, v)?;
    scalar.check_aligned(&u)?;

    let deltas = grid_deltas(scalar)?;
    let dsdx = ddx(scalar, &deltas)?;
    let dsdy = ddy(scalar, &deltas)?;

    let out = u
        .data()
        .iter()
        .zip(v.data())
        .zip(dsdx.iter().zip(&dsdy))
        .map(|((uu, vv), (sx, sy))| -(*uu as f64 * sx + *vv as f64 * sy))
        .collect();

    debug!(scalar = %scalar.name, "Computed horizontal advection");
    to_field(
        scalar,
        &format!("{}_advection", scalar.name),
        per_second(&scalar.units),
        out,
    )
}
