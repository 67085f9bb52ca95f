//! GOES Geostationary Lightning Mapper (GLM) L2 LCFA files.
//!
//! Each file holds ~20 seconds of detected flashes as parallel 1-D
//! variables: `flash_lat`, `flash_lon`, `flash_energy`, `flash_area` and
//! `flash_time_offset_of_first_event`, all packed per CF.

use chrono::{DateTime, Utc};
use tracing::{debug, instrument};
use wx_common::{Observation, PointBatch, Unit};

use crate::cf::parse_cf_time;
use crate::error::{NetCdfError, NetCdfResult};
use crate::native::{get_str_attr, open_bytes, read_unpacked, read_unpacked_f64};

const FLASH_TIME: &str = "flash_time_offset_of_first_event";

/// Decode flashes into a point batch of `parameter`.
///
/// `flash_energy` is reported in femtojoules and `flash_area` in square
/// kilometres; `flash_count` yields one unit-valued point per flash. Any
/// other flash variable is passed through in its file units. Flashes with
/// missing coordinates are dropped.
#[instrument(skip(data), fields(bytes = data.len()))]
pub fn read_glm_flashes(data: &[u8], parameter: &str) -> NetCdfResult<PointBatch> {
    let staged = open_bytes(data)?;
    let file = &staged.file;

    let lats = read_unpacked(file, "flash_lat")?;
    let lons = read_unpacked(file, "flash_lon")?;
    if lats.len() != lons.len() {
        return Err(NetCdfError::InvalidFormat(format!(
            "flash_lat has {} values but flash_lon has {}",
            lats.len(),
            lons.len()
        )));
    }

    let (values, units) = match parameter {
        "flash_count" => (vec![1.0f32; lats.len()], Unit::Dimensionless),
        name => {
            let raw = read_unpacked(file, name)?;
            let file_units = file
                .variable(name)
                .and_then(|v| get_str_attr(&v, "units"))
                .unwrap_or_default();
            scale_flash_values(raw, &file_units)
        }
    };
    if values.len() != lats.len() {
        return Err(NetCdfError::InvalidFormat(format!(
            "'{}' has {} values for {} flashes",
            parameter,
            values.len(),
            lats.len()
        )));
    }

    let times = flash_times(file, lats.len());

    let mut batch = PointBatch::new(parameter, units);
    let mut dropped = 0usize;
    for (n, (lat, lon)) in lats.iter().zip(&lons).enumerate() {
        if !lat.is_finite() || !lon.is_finite() {
            dropped += 1;
            continue;
        }
        batch.push(Observation {
            lon: *lon as f64,
            lat: *lat as f64,
            value: values[n],
            time: times.get(n).copied().flatten(),
        });
    }

    debug!(
        parameter,
        flashes = batch.len(),
        dropped,
        "Decoded GLM flashes"
    );
    Ok(batch)
}

/// Convert energy (J) to fJ and area (m2) to km2.
fn scale_flash_values(raw: Vec<f32>, file_units: &str) -> (Vec<f32>, Unit) {
    match file_units.trim() {
        "J" => (
            raw.into_iter().map(|v| (v as f64 * 1e15) as f32).collect(),
            Unit::Femtojoules,
        ),
        "m2" | "m^2" | "m**2" => (
            raw.into_iter().map(|v| (v as f64 / 1e6) as f32).collect(),
            Unit::SquareKilometers,
        ),
        other => (raw, Unit::parse(other)),
    }
}

/// Time of each flash's first event, when the file carries it.
fn flash_times(file: &netcdf::File, count: usize) -> Vec<Option<DateTime<Utc>>> {
    let units = file
        .variable(FLASH_TIME)
        .and_then(|v| get_str_attr(&v, "units"));
    let (units, offsets) = match (units, read_unpacked_f64(file, FLASH_TIME)) {
        (Some(units), Ok(offsets)) if offsets.len() == count => (units, offsets),
        _ => return vec![None; count],
    };
    offsets.iter().map(|v| parse_cf_time(&units, *v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_scaled_to_femtojoules() {
        let (values, units) = scale_flash_values(vec![2.5e-14], "J");
        assert_eq!(units, Unit::Femtojoules);
        assert!((values[0] - 25.0).abs() < 1e-4);
    }

    #[test]
    fn test_area_scaled_to_square_km() {
        let (values, units) = scale_flash_values(vec![85_000_000.0], "m2");
        assert_eq!(units, Unit::SquareKilometers);
        assert!((values[0] - 85.0).abs() < 1e-4);
    }

    #[test]
    fn test_unknown_units_pass_through() {
        let (values, units) = scale_flash_values(vec![3.0], "count");
        assert_eq!(units, Unit::Dimensionless);
        assert_eq!(values, vec![3.0]);
    }
}
