//! Native NetCDF reading using the netcdf library.
//!
//! The netcdf library requires a file path (it wraps libnetcdf/HDF5 which
//! need file handles). When reading from bytes, we stage them in a temp file
//! first. On Linux, `/dev/shm` (memory-backed tmpfs) is preferred.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Once;

use netcdf::AttributeValue;
use tempfile::NamedTempFile;
use tracing::{debug, instrument};
use wx_common::{Field, GridCrs, Unit, VerticalAxis};

use crate::cf::{
    classify_axis, horizontal_scale, parse_cf_time, vector_frame_for, AxisRole, CoordAttrs,
    Packing,
};
use crate::error::{NetCdfError, NetCdfResult};

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully (e.g. when probing optional attributes). This
/// disables that output via H5Eset_auto2 with null handlers. It only needs to
/// be called once per process, but is safe to call multiple times.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// An open NetCDF file backed by a staged temp file.
///
/// Field order matters: the file handle is closed before the temp file is
/// removed.
pub(crate) struct StagedFile {
    pub file: netcdf::File,
    _temp: NamedTempFile,
}

/// Write `data` to a temp file and open it.
pub(crate) fn open_bytes(data: &[u8]) -> NetCdfResult<StagedFile> {
    silence_hdf5_errors();

    let mut temp = tempfile::Builder::new()
        .prefix("wx_nc_")
        .suffix(".nc")
        .tempfile_in(get_optimal_temp_dir())?;
    temp.write_all(data)?;
    temp.flush()?;

    let file = netcdf::open(temp.path())
        .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to open NetCDF: {}", e)))?;

    Ok(StagedFile { file, _temp: temp })
}

/// Decode the named variables of a CF-netCDF payload into fields.
///
/// Each variable must end in `(y, x)` dimensions, optionally preceded by
/// one vertical dimension; any further leading dimensions (time, ensemble)
/// are reduced to their first index.
#[instrument(skip(data), fields(bytes = data.len()))]
pub fn read_fields(data: &[u8], names: &[&str]) -> NetCdfResult<Vec<Field>> {
    if names.is_empty() {
        return Err(NetCdfError::MissingData(
            "no variable names requested".to_string(),
        ));
    }
    let staged = open_bytes(data)?;
    names
        .iter()
        .map(|name| read_field(&staged.file, name))
        .collect()
}

fn read_field(file: &netcdf::File, name: &str) -> NetCdfResult<Field> {
    let var = file
        .variable(name)
        .ok_or_else(|| NetCdfError::MissingData(format!("variable '{}'", name)))?;

    let dims: Vec<(String, usize)> = var
        .dimensions()
        .iter()
        .map(|d| (d.name(), d.len()))
        .collect();
    let attrs: Vec<CoordAttrs> = dims.iter().map(|(d, _)| coord_attrs(file, d)).collect();
    let roles: Vec<AxisRole> = dims
        .iter()
        .zip(&attrs)
        .map(|((d, _), a)| classify_axis(d, a))
        .collect();

    let n = dims.len();
    if n < 2 || roles[n - 1] != AxisRole::X || roles[n - 2] != AxisRole::Y {
        return Err(NetCdfError::InvalidFormat(format!(
            "'{}' must end with (y, x) dimensions, found {:?}",
            name, roles
        )));
    }

    let vertical: Vec<usize> = (0..n - 2)
        .filter(|k| roles[*k] == AxisRole::Vertical)
        .collect();
    let vertical = match vertical.as_slice() {
        [] => None,
        [k] if *k == n - 3 => Some(*k),
        _ => {
            return Err(NetCdfError::InvalidFormat(format!(
                "'{}' needs a single vertical dimension directly before (y, x), found {:?}",
                name, roles
            )))
        }
    };

    let (ny, nx) = (dims[n - 2].1, dims[n - 1].1);
    let nlev = vertical.map(|k| dims[k].1).unwrap_or(1);
    let block = nlev * ny * nx;

    let raw: Vec<f64> = var
        .get_values::<f64, _>(..)
        .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to read '{}': {}", name, e)))?;
    if raw.len() < block {
        return Err(NetCdfError::InvalidFormat(format!(
            "'{}' holds {} values, expected at least {}",
            name,
            raw.len(),
            block
        )));
    }
    if raw.len() > block {
        debug!(
            variable = name,
            steps = raw.len() / block.max(1),
            "Keeping first time step"
        );
    }
    let values = packing_for(&var).unpack_all(&raw[..block]);

    let x = read_horizontal_axis(file, &dims[n - 1].0, &attrs[n - 1])?;
    let y = read_horizontal_axis(file, &dims[n - 2].0, &attrs[n - 2])?;

    let units = Unit::parse(&get_str_attr(&var, "units").unwrap_or_default());
    let mut field = match vertical {
        Some(k) => {
            let (level_name, _) = &dims[k];
            let levels = read_coordinate(file, level_name)?;
            let level_units = Unit::parse(attrs[k].units.as_deref().unwrap_or(""));
            Field::new_3d(
                name,
                units,
                VerticalAxis::new(level_name.clone(), levels, level_units),
                x,
                y,
                values,
            )?
        }
        None => Field::new(name, units, x, y, values)?,
    };

    if let Some(crs) = grid_crs_for(file, &var, &dims[n - 1].0, &attrs[n - 1])? {
        let standard_name = get_str_attr(&var, "standard_name");
        field.vector_frame = vector_frame_for(name, standard_name.as_deref(), &crs);
        field.crs = Some(crs);
    }

    if let Some(k) = (0..n - 2).find(|k| roles[*k] == AxisRole::Time) {
        let (time_name, _) = &dims[k];
        let first = read_coordinate(file, time_name)
            .ok()
            .and_then(|v| v.first().copied());
        if let (Some(value), Some(units)) = (first, attrs[k].units.as_deref()) {
            field.valid_time = parse_cf_time(units, value);
        }
    }

    debug!(
        variable = name,
        shape = ?field.shape(),
        crs = ?field.crs.as_ref().map(GridCrs::grid_mapping_name),
        "Decoded field"
    );
    Ok(field)
}

fn coord_attrs(file: &netcdf::File, dim_name: &str) -> CoordAttrs {
    match file.variable(dim_name) {
        Some(var) => CoordAttrs {
            axis: get_str_attr(&var, "axis"),
            standard_name: get_str_attr(&var, "standard_name"),
            units: get_str_attr(&var, "units"),
            positive: get_str_attr(&var, "positive"),
        },
        None => CoordAttrs::default(),
    }
}

/// Values of the coordinate variable named like its dimension.
fn read_coordinate(file: &netcdf::File, dim_name: &str) -> NetCdfResult<Vec<f64>> {
    let var = file.variable(dim_name).ok_or_else(|| {
        NetCdfError::MissingData(format!("coordinate variable for dimension '{}'", dim_name))
    })?;
    let raw: Vec<f64> = var.get_values::<f64, _>(..).map_err(|e| {
        NetCdfError::InvalidFormat(format!("Failed to read '{}': {}", dim_name, e))
    })?;
    let packing = packing_for(&var);
    Ok(raw.iter().map(|v| packing.unpack_f64(*v)).collect())
}

fn read_horizontal_axis(
    file: &netcdf::File,
    dim_name: &str,
    attrs: &CoordAttrs,
) -> NetCdfResult<Vec<f64>> {
    let scale = horizontal_scale(attrs.units.as_deref());
    Ok(read_coordinate(file, dim_name)?
        .into_iter()
        .map(|v| v * scale)
        .collect())
}

/// Grid mapping of `var`: the referenced CF mapping variable, or plain
/// lon/lat when the x axis is longitude.
fn grid_crs_for(
    file: &netcdf::File,
    var: &netcdf::Variable,
    x_name: &str,
    x_attrs: &CoordAttrs,
) -> NetCdfResult<Option<GridCrs>> {
    if let Some(mapping_name) = get_str_attr(var, "grid_mapping") {
        let mapping = file.variable(&mapping_name).ok_or_else(|| {
            NetCdfError::MissingData(format!("grid mapping variable '{}'", mapping_name))
        })?;
        let kind = get_str_attr(&mapping, "grid_mapping_name").ok_or_else(|| {
            NetCdfError::MissingData(format!("grid_mapping_name on '{}'", mapping_name))
        })?;

        let numbers: HashMap<String, Vec<f64>> = mapping
            .attributes()
            .filter_map(|attr| {
                let values = attr.value().ok().and_then(attr_to_f64s)?;
                Some((attr.name().to_string(), values))
            })
            .collect();
        return Ok(Some(GridCrs::from_cf_attributes(&kind, &numbers)?));
    }

    let is_longitude = matches!(
        x_attrs.units.as_deref(),
        Some("degrees_east") | Some("degree_east")
    ) || matches!(x_name, "lon" | "longitude");
    if is_longitude {
        return Ok(Some(GridCrs::geographic()));
    }

    debug!(axis = x_name, "No grid mapping found");
    Ok(None)
}

pub(crate) fn packing_for(var: &netcdf::Variable) -> Packing {
    let unsigned = get_str_attr(var, "_Unsigned")
        .map(|s| s.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let unsigned_bits = if unsigned {
        Some(
            var.attribute_value("_FillValue")
                .and_then(|v| v.ok())
                .map(|v| attr_bits(&v))
                .unwrap_or(16),
        )
    } else {
        None
    };

    Packing {
        scale_factor: get_f64_attr(var, "scale_factor").unwrap_or(1.0),
        add_offset: get_f64_attr(var, "add_offset").unwrap_or(0.0),
        fill_value: get_f64_attr(var, "_FillValue"),
        missing_value: get_f64_attr(var, "missing_value"),
        unsigned_bits,
    }
}

/// Read and unpack a whole variable.
pub(crate) fn read_unpacked(file: &netcdf::File, name: &str) -> NetCdfResult<Vec<f32>> {
    Ok(read_unpacked_f64(file, name)?
        .into_iter()
        .map(|v| v as f32)
        .collect())
}

/// Read and unpack a whole variable in double precision.
pub(crate) fn read_unpacked_f64(file: &netcdf::File, name: &str) -> NetCdfResult<Vec<f64>> {
    let var = file
        .variable(name)
        .ok_or_else(|| NetCdfError::MissingData(format!("variable '{}'", name)))?;
    let raw: Vec<f64> = var
        .get_values::<f64, _>(..)
        .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to read '{}': {}", name, e)))?;
    let packing = packing_for(&var);
    Ok(raw.iter().map(|v| packing.unpack_f64(*v)).collect())
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Get the optimal temp directory for NetCDF file operations.
///
/// On Linux, uses /dev/shm (memory-backed tmpfs) if writable.
/// Falls back to the system temp directory otherwise.
fn get_optimal_temp_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        use std::path::Path;
        let shm_path = Path::new("/dev/shm");
        if shm_path.is_dir() && tempfile::tempfile_in(shm_path).is_ok() {
            return shm_path.to_path_buf();
        }
    }

    std::env::temp_dir()
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

/// Helper to get f64 attribute.
pub(crate) fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    attr_to_f64s(attr_value)?.first().copied()
}

/// Helper to get string attribute.
pub(crate) fn get_str_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Str(s) => Some(s),
        AttributeValue::Strs(v) => v.into_iter().next(),
        _ => None,
    }
}

fn attr_to_f64s(value: AttributeValue) -> Option<Vec<f64>> {
    let values = match value {
        AttributeValue::Uchar(v) => vec![v as f64],
        AttributeValue::Schar(v) => vec![v as f64],
        AttributeValue::Ushort(v) => vec![v as f64],
        AttributeValue::Short(v) => vec![v as f64],
        AttributeValue::Uint(v) => vec![v as f64],
        AttributeValue::Int(v) => vec![v as f64],
        AttributeValue::Ulonglong(v) => vec![v as f64],
        AttributeValue::Longlong(v) => vec![v as f64],
        AttributeValue::Float(v) => vec![v as f64],
        AttributeValue::Double(v) => vec![v],
        AttributeValue::Uchars(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Schars(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Ushorts(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Shorts(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Uints(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Ints(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Ulonglongs(v) => v.into_iter().map(|x| x as f64).collect(),
        AttributeValue::Longlongs(v) => v.into_iter().map(|x| x as f64).collect(),
        AttributeValue::Floats(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Doubles(v) => v,
        _ => return None,
    };
    Some(values)
}

/// Storage width implied by an attribute's type.
fn attr_bits(value: &AttributeValue) -> u32 {
    match value {
        AttributeValue::Uchar(_) | AttributeValue::Schar(_) => 8,
        AttributeValue::Ushort(_) | AttributeValue::Short(_) => 16,
        AttributeValue::Uint(_) | AttributeValue::Int(_) => 32,
        _ => 16,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimal_temp_dir() {
        let dir = get_optimal_temp_dir();
        assert!(dir.exists(), "Temp dir should exist");
    }

    #[test]
    fn test_attr_conversions() {
        assert_eq!(
            attr_to_f64s(AttributeValue::Floats(vec![25.0, 50.0])),
            Some(vec![25.0, 50.0])
        );
        assert_eq!(attr_to_f64s(AttributeValue::Short(-1)), Some(vec![-1.0]));
        assert_eq!(attr_to_f64s(AttributeValue::Str("x".into())), None);
        assert_eq!(attr_bits(&AttributeValue::Schar(0)), 8);
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let err = read_fields(b"definitely not netcdf", &["Temperature"]);
        assert!(matches!(err, Err(NetCdfError::InvalidFormat(_))));
    }
}
