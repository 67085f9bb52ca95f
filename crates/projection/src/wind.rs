//! Rotation of vector components between projections.
//!
//! Components on a projected grid are usually reported along the grid's
//! own x/y axes. To draw or analyse them against true east/north (or on a
//! different map projection) each vector is decomposed into earth-relative
//! east/north parts using the local basis of the source projection, then
//! recomposed in the basis of the destination projection.
//!
//! The local basis at a point is found numerically: the forward map is
//! differenced along a small eastward and northward step and the resulting
//! image vectors are normalised. This works uniformly for every projection
//! behind [`Projection`].

use nalgebra::{Matrix2, Vector2};
use thiserror::Error;
use tracing::debug;

use wx_common::{Field, GridCrs, VectorFrame};

use crate::transform::{projection_for, Projection};

/// Step (degrees) used to difference the forward map.
const BASIS_STEP: f64 = 1e-4;

#[derive(Debug, Error)]
pub enum WindError {
    /// The field carries no grid mapping, so the source projection is unknown.
    #[error("field '{0}' has no grid mapping metadata")]
    MissingCrs(String),

    #[error("wind components are not aligned: {0}")]
    Misaligned(String),

    #[error("expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

pub type WindResult<T> = Result<T, WindError>;

/// Rotate grid-relative `u`/`v` into earth-relative east/north components.
///
/// Both fields must share shape, axes and grid mapping. The inputs are
/// not modified; the returned fields have identical shape and axes with
/// `vector_frame` set to [`VectorFrame::EarthRelative`]. Fields that are
/// already earth-relative are returned as copies.
pub fn earth_relative_wind_components(u: &Field, v: &Field) -> WindResult<(Field, Field)> {
    let src = u
        .crs
        .as_ref()
        .ok_or_else(|| WindError::MissingCrs(u.name.clone()))?;
    if v.crs.is_none() {
        return Err(WindError::MissingCrs(v.name.clone()));
    }
    u.check_aligned(v)
        .map_err(|e| WindError::Misaligned(e.to_string()))?;
    if u.vector_frame != v.vector_frame {
        return Err(WindError::Misaligned(format!(
            "'{}' is {:?} but '{}' is {:?}",
            u.name, u.vector_frame, v.name, v.vector_frame
        )));
    }

    if u.vector_frame == VectorFrame::EarthRelative {
        debug!(u = %u.name, v = %v.name, "Winds already earth-relative");
        return Ok((u.clone(), v.clone()));
    }

    // Node coordinates of one horizontal plane
    let (nx, ny) = (u.nx(), u.ny());
    let mut xs = Vec::with_capacity(nx * ny);
    let mut ys = Vec::with_capacity(nx * ny);
    for y in &u.y {
        for x in &u.x {
            xs.push(*x);
            ys.push(*y);
        }
    }

    let rotations = node_rotations(src, &GridCrs::geographic(), &xs, &ys);

    let mut u_out = u.data().to_vec();
    let mut v_out = v.data().to_vec();
    for k in 0..u.nlev() {
        let offset = k * nx * ny;
        rotate_plane(
            &rotations,
            &mut u_out[offset..offset + nx * ny],
            &mut v_out[offset..offset + nx * ny],
        );
    }

    debug!(
        crs = %src,
        nodes = nx * ny,
        levels = u.nlev(),
        "Rotated winds to earth-relative"
    );

    let u_earth = u
        .with_data(u.name.clone(), u.units.clone(), u_out)
        .map_err(|e| WindError::Misaligned(e.to_string()))?
        .with_vector_frame(VectorFrame::EarthRelative);
    let v_earth = v
        .with_data(v.name.clone(), v.units.clone(), v_out)
        .map_err(|e| WindError::Misaligned(e.to_string()))?
        .with_vector_frame(VectorFrame::EarthRelative);

    Ok((u_earth, v_earth))
}

/// Transform vector components located at `(xs[i], ys[i])` in `src`
/// coordinates from the `src` basis to the `dst` basis.
///
/// When `src == dst` the components are returned unchanged. Points that
/// cannot be projected yield NaN components.
pub fn transform_vectors(
    src: &GridCrs,
    dst: &GridCrs,
    xs: &[f64],
    ys: &[f64],
    u: &[f32],
    v: &[f32],
) -> WindResult<(Vec<f32>, Vec<f32>)> {
    let n = xs.len();
    for len in [ys.len(), u.len(), v.len()] {
        if len != n {
            return Err(WindError::LengthMismatch {
                expected: n,
                actual: len,
            });
        }
    }

    let mut u_out = u.to_vec();
    let mut v_out = v.to_vec();
    if src == dst {
        return Ok((u_out, v_out));
    }

    let rotations = node_rotations(src, dst, xs, ys);
    rotate_plane(&rotations, &mut u_out, &mut v_out);
    Ok((u_out, v_out))
}

/// Per-point matrices taking `src` components to `dst` components.
fn node_rotations(
    src: &GridCrs,
    dst: &GridCrs,
    xs: &[f64],
    ys: &[f64],
) -> Vec<Option<Matrix2<f64>>> {
    let src_proj = projection_for(src);
    let dst_proj = projection_for(dst);

    xs.iter()
        .zip(ys)
        .map(|(&x, &y)| {
            let (lon, lat) = src_proj.inverse(x, y)?;
            let from = local_basis(src_proj.as_ref(), lon, lat)?;
            let to = local_basis(dst_proj.as_ref(), lon, lat)?;
            // src components = from * (east, north); dst components = to * (east, north)
            let to_earth = from.try_inverse()?;
            Some(to * to_earth)
        })
        .collect()
}

fn rotate_plane(rotations: &[Option<Matrix2<f64>>], u: &mut [f32], v: &mut [f32]) {
    for ((rot, uu), vv) in rotations.iter().zip(u.iter_mut()).zip(v.iter_mut()) {
        match rot {
            Some(m) => {
                let out = m * Vector2::new(*uu as f64, *vv as f64);
                *uu = out.x as f32;
                *vv = out.y as f32;
            }
            None => {
                *uu = f32::NAN;
                *vv = f32::NAN;
            }
        }
    }
}

/// Columns are the projected images of unit east and unit north.
fn local_basis(proj: &dyn Projection, lon: f64, lat: f64) -> Option<Matrix2<f64>> {
    let east = {
        let (x0, y0) = proj.forward(lon - BASIS_STEP, lat)?;
        let (x1, y1) = proj.forward(lon + BASIS_STEP, lat)?;
        Vector2::new(x1 - x0, y1 - y0)
    };

    // One-sided near the poles
    let lat_lo = (lat - BASIS_STEP).max(-90.0);
    let lat_hi = (lat + BASIS_STEP).min(90.0);
    let north = {
        let (x0, y0) = proj.forward(lon, lat_lo)?;
        let (x1, y1) = proj.forward(lon, lat_hi)?;
        Vector2::new(x1 - x0, y1 - y0)
    };

    let east = east.try_normalize(f64::EPSILON)?;
    let north = north.try_normalize(f64::EPSILON)?;
    Some(Matrix2::from_columns(&[east, north]))
}
