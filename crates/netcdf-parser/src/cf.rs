//! Library-independent pieces of CF decoding.

use chrono::{DateTime, Duration, Utc};
use wx_common::time::parse_iso8601;
use wx_common::{GridCrs, VectorFrame};

/// Role of a dimension, decided from its coordinate variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisRole {
    X,
    Y,
    Vertical,
    Time,
    Other,
}

/// The attributes of a coordinate variable that determine its role.
#[derive(Debug, Clone, Default)]
pub struct CoordAttrs {
    pub axis: Option<String>,
    pub standard_name: Option<String>,
    pub units: Option<String>,
    pub positive: Option<String>,
}

/// Classify a dimension by name and coordinate attributes.
pub fn classify_axis(name: &str, attrs: &CoordAttrs) -> AxisRole {
    if let Some(axis) = attrs.axis.as_deref() {
        match axis.to_ascii_uppercase().as_str() {
            "X" => return AxisRole::X,
            "Y" => return AxisRole::Y,
            "Z" => return AxisRole::Vertical,
            "T" => return AxisRole::Time,
            _ => {}
        }
    }

    match attrs.standard_name.as_deref() {
        Some("projection_x_coordinate") | Some("longitude") | Some("grid_longitude") => {
            return AxisRole::X
        }
        Some("projection_y_coordinate") | Some("latitude") | Some("grid_latitude") => {
            return AxisRole::Y
        }
        Some("air_pressure") | Some("height") | Some("altitude") => return AxisRole::Vertical,
        Some("time") => return AxisRole::Time,
        _ => {}
    }

    match attrs.units.as_deref() {
        Some("degrees_east") | Some("degree_east") => return AxisRole::X,
        Some("degrees_north") | Some("degree_north") => return AxisRole::Y,
        _ => {}
    }
    if attrs.positive.is_some() {
        return AxisRole::Vertical;
    }
    if attrs
        .units
        .as_deref()
        .map(|u| u.contains(" since "))
        .unwrap_or(false)
    {
        return AxisRole::Time;
    }

    let lower = name.to_ascii_lowercase();
    match lower.as_str() {
        "x" | "lon" | "longitude" => AxisRole::X,
        "y" | "lat" | "latitude" => AxisRole::Y,
        _ if lower.starts_with("isobaric")
            || lower.starts_with("pressure")
            || lower.starts_with("height_above")
            || lower.starts_with("level") =>
        {
            AxisRole::Vertical
        }
        _ if lower.starts_with("time") || lower.starts_with("reftime") => AxisRole::Time,
        _ => AxisRole::Other,
    }
}

/// Factor converting a horizontal axis to meters (1 for degrees and meters).
pub fn horizontal_scale(units: Option<&str>) -> f64 {
    match units.map(str::trim) {
        Some("km") | Some("kilometer") | Some("kilometers") | Some("kilometre") => 1000.0,
        _ => 1.0,
    }
}

/// Instant of a CF time coordinate value, e.g. `units = "Hour since 2024-01-15T12:00:00Z"`.
pub fn parse_cf_time(units: &str, value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() {
        return None;
    }
    let (unit, reference) = units.split_once(" since ")?;
    let seconds_per_unit = match unit.trim().to_ascii_lowercase().as_str() {
        "second" | "seconds" | "sec" | "secs" | "s" => 1.0,
        "minute" | "minutes" | "min" | "mins" => 60.0,
        "hour" | "hours" | "hr" | "hrs" | "h" => 3600.0,
        "day" | "days" | "d" => 86400.0,
        _ => return None,
    };

    let reference = normalise_reference(reference);
    let base = parse_iso8601(&reference).ok()?;
    let millis = (value * seconds_per_unit * 1000.0).round() as i64;
    base.checked_add_signed(Duration::milliseconds(millis))
}

/// `"2000-01-01 12:00:00.0 UTC"` -> `"2000-01-01T12:00:00"`
fn normalise_reference(reference: &str) -> String {
    let trimmed = reference
        .trim()
        .trim_end_matches("UTC")
        .trim_end_matches("utc")
        .trim();
    let mut s = trimmed.replacen(' ', "T", 1);
    if let Some(dot) = s.find('.') {
        if !s.contains('+') && !s.ends_with('Z') {
            s.truncate(dot);
        }
    }
    s
}

/// Unpacking rules of one variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Packing {
    pub scale_factor: f64,
    pub add_offset: f64,
    pub fill_value: Option<f64>,
    pub missing_value: Option<f64>,
    /// Bit width when `_Unsigned = "true"` marks signed storage of unsigned data.
    pub unsigned_bits: Option<u32>,
}

impl Default for Packing {
    fn default() -> Self {
        Self {
            scale_factor: 1.0,
            add_offset: 0.0,
            fill_value: None,
            missing_value: None,
            unsigned_bits: None,
        }
    }
}

impl Packing {
    /// Decode one raw value; fill and missing values become NaN.
    pub fn unpack_f64(&self, raw: f64) -> f64 {
        if raw.is_nan() || Some(raw) == self.fill_value || Some(raw) == self.missing_value {
            return f64::NAN;
        }
        let raw = match self.unsigned_bits {
            Some(bits) if raw < 0.0 => raw + 2f64.powi(bits as i32),
            _ => raw,
        };
        // Unsigned fill values may be declared in their unsigned form
        if self.unsigned_bits.is_some()
            && (Some(raw) == self.fill_value || Some(raw) == self.missing_value)
        {
            return f64::NAN;
        }
        raw * self.scale_factor + self.add_offset
    }

    pub fn unpack(&self, raw: f64) -> f32 {
        self.unpack_f64(raw) as f32
    }

    pub fn unpack_all(&self, raw: &[f64]) -> Vec<f32> {
        raw.iter().map(|v| self.unpack(*v)).collect()
    }
}

/// Vector frame of a variable.
///
/// CF `x_wind`/`y_wind` are along grid axes; `eastward_wind` and
/// `northward_wind` are earth-relative. GRIB-derived `*-component_of_wind`
/// variables on projected grids are grid-relative.
pub fn vector_frame_for(name: &str, standard_name: Option<&str>, crs: &GridCrs) -> VectorFrame {
    match standard_name {
        Some("x_wind") | Some("y_wind") => return VectorFrame::GridRelative,
        Some("eastward_wind") | Some("northward_wind") => return VectorFrame::EarthRelative,
        _ => {}
    }
    if !crs.is_geographic() && name.contains("component_of_wind") {
        VectorFrame::GridRelative
    } else {
        VectorFrame::EarthRelative
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn attrs(units: Option<&str>) -> CoordAttrs {
        CoordAttrs {
            units: units.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_classify_ncss_axes() {
        let x = CoordAttrs {
            standard_name: Some("projection_x_coordinate".into()),
            units: Some("km".into()),
            ..Default::default()
        };
        assert_eq!(classify_axis("x", &x), AxisRole::X);
        assert_eq!(classify_axis("isobaric3", &attrs(Some("Pa"))), AxisRole::Vertical);
        assert_eq!(
            classify_axis("time1", &attrs(Some("Hour since 2024-01-15T12:00:00Z"))),
            AxisRole::Time
        );
        assert_eq!(classify_axis("lat", &attrs(Some("degrees_north"))), AxisRole::Y);
        assert_eq!(classify_axis("ens", &attrs(None)), AxisRole::Other);
    }

    #[test]
    fn test_horizontal_scale() {
        assert_eq!(horizontal_scale(Some("km")), 1000.0);
        assert_eq!(horizontal_scale(Some("m")), 1.0);
        assert_eq!(horizontal_scale(None), 1.0);
    }

    #[test]
    fn test_parse_cf_time_units() {
        let t = parse_cf_time("Hour since 2024-01-15T12:00:00Z", 6.0).unwrap();
        assert_eq!((t.day(), t.hour()), (15, 18));

        let t = parse_cf_time("seconds since 2000-01-01 12:00:00", 90.0).unwrap();
        assert_eq!((t.year(), t.hour(), t.minute(), t.second()), (2000, 12, 1, 30));

        let t = parse_cf_time("days since 2024-01-01 00:00:00.0 UTC", 1.5).unwrap();
        assert_eq!((t.day(), t.hour()), (2, 12));

        assert!(parse_cf_time("fortnights since 2024-01-01", 1.0).is_none());
        assert!(parse_cf_time("hours", 1.0).is_none());
    }

    #[test]
    fn test_unpack_scale_offset_fill() {
        let packing = Packing {
            scale_factor: 0.5,
            add_offset: 100.0,
            fill_value: Some(-999.0),
            ..Default::default()
        };
        assert_eq!(packing.unpack(10.0), 105.0);
        assert!(packing.unpack(-999.0).is_nan());
    }

    #[test]
    fn test_unpack_unsigned_short() {
        let packing = Packing {
            unsigned_bits: Some(16),
            fill_value: Some(-1.0),
            ..Default::default()
        };
        assert_eq!(packing.unpack(-2.0), 65534.0);
        assert!(packing.unpack(-1.0).is_nan());
    }

    #[test]
    fn test_vector_frame_rules() {
        let lambert = GridCrs::conus_lambert();
        let geo = GridCrs::geographic();
        assert_eq!(
            vector_frame_for("u-component_of_wind_isobaric", None, &lambert),
            VectorFrame::GridRelative
        );
        assert_eq!(
            vector_frame_for("u-component_of_wind_isobaric", None, &geo),
            VectorFrame::EarthRelative
        );
        assert_eq!(
            vector_frame_for("u", Some("x_wind"), &geo),
            VectorFrame::GridRelative
        );
        assert_eq!(
            vector_frame_for("Temperature_isobaric", None, &lambert),
            VectorFrame::EarthRelative
        );
    }
}
