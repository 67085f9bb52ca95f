//! Labeled grids of meteorological data.
//!
//! A [`Field`] is a 2-D (y, x) or 3-D (level, y, x) array of `f32` values
//! with 1-D coordinate axes, a physical unit and optional grid-mapping
//! metadata. Missing values are NaN. Data is row-major with x varying
//! fastest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crs::GridCrs;
use crate::error::{WxError, WxResult};
use crate::units::Unit;

/// Tolerance used when comparing coordinate axes of two fields.
const AXIS_TOLERANCE: f64 = 1e-6;

/// Reference frame of a vector component field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VectorFrame {
    /// Components along the projection's local x/y axes.
    GridRelative,
    /// Components along true east/north.
    EarthRelative,
}

/// Vertical coordinate of a 3-D field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerticalAxis {
    pub name: String,
    pub values: Vec<f64>,
    pub units: Unit,
}

impl VerticalAxis {
    pub fn new(name: impl Into<String>, values: Vec<f64>, units: Unit) -> Self {
        Self {
            name: name.into(),
            values,
            units,
        }
    }

    /// Isobaric axis in hectopascals.
    pub fn isobaric_hpa(values: Vec<f64>) -> Self {
        Self::new("isobaric", values, Unit::Hectopascal)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index of the level closest to `value` (in axis units) within `tolerance`.
    pub fn find(&self, value: f64, tolerance: f64) -> Option<usize> {
        self.values
            .iter()
            .enumerate()
            .map(|(k, v)| (k, (v - value).abs()))
            .filter(|(_, d)| *d <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(k, _)| k)
    }

    /// Level values converted to another unit.
    pub fn values_in(&self, target: &Unit) -> WxResult<Vec<f64>> {
        let conv = self.units.converter(target)?;
        Ok(self.values.iter().map(|v| conv.apply(*v)).collect())
    }
}

/// A labeled grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub units: Unit,
    pub crs: Option<GridCrs>,
    /// X axis: longitude in degrees for geographic grids, meters otherwise.
    pub x: Vec<f64>,
    /// Y axis: latitude in degrees for geographic grids, meters otherwise.
    pub y: Vec<f64>,
    pub levels: Option<VerticalAxis>,
    pub valid_time: Option<DateTime<Utc>>,
    pub vector_frame: VectorFrame,
    data: Vec<f32>,
}

impl Field {
    /// Create a 2-D field. `data.len()` must equal `x.len() * y.len()`.
    pub fn new(
        name: impl Into<String>,
        units: Unit,
        x: Vec<f64>,
        y: Vec<f64>,
        data: Vec<f32>,
    ) -> WxResult<Self> {
        let expected = x.len() * y.len();
        if data.len() != expected {
            return Err(WxError::ShapeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            name: name.into(),
            units,
            crs: None,
            x,
            y,
            levels: None,
            valid_time: None,
            vector_frame: VectorFrame::EarthRelative,
            data,
        })
    }

    /// Create a 3-D field with a vertical axis.
    pub fn new_3d(
        name: impl Into<String>,
        units: Unit,
        levels: VerticalAxis,
        x: Vec<f64>,
        y: Vec<f64>,
        data: Vec<f32>,
    ) -> WxResult<Self> {
        let expected = levels.len() * x.len() * y.len();
        if data.len() != expected {
            return Err(WxError::ShapeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            name: name.into(),
            units,
            crs: None,
            x,
            y,
            levels: Some(levels),
            valid_time: None,
            vector_frame: VectorFrame::EarthRelative,
            data,
        })
    }

    pub fn with_crs(mut self, crs: GridCrs) -> Self {
        self.crs = Some(crs);
        self
    }

    /// Attach a vertical axis, reinterpreting the data as `[level][y][x]`.
    pub fn with_levels(mut self, levels: VerticalAxis) -> WxResult<Self> {
        let expected = levels.len() * self.nx() * self.ny();
        if self.data.len() != expected {
            return Err(WxError::ShapeMismatch {
                expected,
                actual: self.data.len(),
            });
        }
        self.levels = Some(levels);
        Ok(self)
    }

    pub fn with_valid_time(mut self, time: DateTime<Utc>) -> Self {
        self.valid_time = Some(time);
        self
    }

    pub fn with_vector_frame(mut self, frame: VectorFrame) -> Self {
        self.vector_frame = frame;
        self
    }

    pub fn nx(&self) -> usize {
        self.x.len()
    }

    pub fn ny(&self) -> usize {
        self.y.len()
    }

    /// Number of vertical levels (1 for 2-D fields).
    pub fn nlev(&self) -> usize {
        self.levels.as_ref().map(|l| l.len()).unwrap_or(1)
    }

    /// `(levels, y, x)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.nlev(), self.ny(), self.nx())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_geographic(&self) -> bool {
        self.crs.as_ref().map(GridCrs::is_geographic).unwrap_or(false)
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable view of the values. The length cannot change.
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Flat index of `(k, j, i)`.
    #[inline]
    pub fn index(&self, k: usize, j: usize, i: usize) -> usize {
        (k * self.ny() + j) * self.nx() + i
    }

    pub fn value(&self, k: usize, j: usize, i: usize) -> Option<f32> {
        if k >= self.nlev() || j >= self.ny() || i >= self.nx() {
            return None;
        }
        Some(self.data[self.index(k, j, i)])
    }

    /// Projected or geographic coordinates of node `(j, i)`.
    pub fn coords(&self, j: usize, i: usize) -> (f64, f64) {
        (self.x[i], self.y[j])
    }

    /// Values of level `k` as a slice of `ny * nx` values.
    pub fn level_slice(&self, k: usize) -> &[f32] {
        let plane = self.nx() * self.ny();
        &self.data[k * plane..(k + 1) * plane]
    }

    /// Extract level `k` as a 2-D field.
    pub fn level(&self, k: usize) -> WxResult<Field> {
        if k >= self.nlev() {
            return Err(WxError::IndexOutOfRange(format!(
                "level {} of {} in '{}'",
                k,
                self.nlev(),
                self.name
            )));
        }

        let mut out = Field::new(
            self.name.clone(),
            self.units.clone(),
            self.x.clone(),
            self.y.clone(),
            self.level_slice(k).to_vec(),
        )?;
        out.crs = self.crs.clone();
        out.valid_time = self.valid_time;
        out.vector_frame = self.vector_frame;
        Ok(out)
    }

    /// Extract the level whose coordinate equals `value` in `units`.
    pub fn select_level(&self, value: f64, units: &Unit) -> WxResult<Field> {
        let axis = self
            .levels
            .as_ref()
            .ok_or_else(|| WxError::MissingLevels(self.name.clone()))?;
        let target = units.convert(value, &axis.units)?;
        let k = axis.find(target, 1e-3 * target.abs().max(1.0)).ok_or_else(|| {
            WxError::IndexOutOfRange(format!(
                "no level {} {} in '{}'",
                value, units, self.name
            ))
        })?;
        self.level(k)
    }

    /// A new field on the same grid holding `data`.
    pub fn with_data(
        &self,
        name: impl Into<String>,
        units: Unit,
        data: Vec<f32>,
    ) -> WxResult<Field> {
        if data.len() != self.data.len() {
            return Err(WxError::ShapeMismatch {
                expected: self.data.len(),
                actual: data.len(),
            });
        }
        Ok(Field {
            name: name.into(),
            units,
            crs: self.crs.clone(),
            x: self.x.clone(),
            y: self.y.clone(),
            levels: self.levels.clone(),
            valid_time: self.valid_time,
            vector_frame: self.vector_frame,
            data,
        })
    }

    /// Apply `f` to every value, producing a new field.
    pub fn map_values<F>(&self, name: impl Into<String>, units: Unit, f: F) -> Field
    where
        F: Fn(f32) -> f32,
    {
        let data = self.data.iter().map(|v| f(*v)).collect();
        Field {
            name: name.into(),
            units,
            crs: self.crs.clone(),
            x: self.x.clone(),
            y: self.y.clone(),
            levels: self.levels.clone(),
            valid_time: self.valid_time,
            vector_frame: self.vector_frame,
            data,
        }
    }

    /// Combine two aligned fields pointwise.
    pub fn zip_with<F>(
        &self,
        other: &Field,
        name: impl Into<String>,
        units: Unit,
        f: F,
    ) -> WxResult<Field>
    where
        F: Fn(f32, f32) -> f32,
    {
        self.check_aligned(other)?;
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| f(*a, *b))
            .collect();
        self.with_data(name, units, data)
    }

    /// Verify that `other` has the same shape and coordinate axes.
    pub fn check_aligned(&self, other: &Field) -> WxResult<()> {
        if self.shape() != other.shape() {
            return Err(WxError::GridMismatch(format!(
                "'{}' has shape {:?} but '{}' has shape {:?}",
                self.name,
                self.shape(),
                other.name,
                other.shape()
            )));
        }

        let axes_match = |a: &[f64], b: &[f64]| {
            a.iter()
                .zip(b)
                .all(|(p, q)| (p - q).abs() <= AXIS_TOLERANCE * p.abs().max(1.0))
        };
        if !axes_match(&self.x, &other.x) || !axes_match(&self.y, &other.y) {
            return Err(WxError::GridMismatch(format!(
                "'{}' and '{}' have different horizontal coordinates",
                self.name, other.name
            )));
        }

        match (&self.levels, &other.levels) {
            (Some(a), Some(b)) => {
                let b_values = b.values_in(&a.units)?;
                if !axes_match(&a.values, &b_values) {
                    return Err(WxError::GridMismatch(format!(
                        "'{}' and '{}' have different vertical levels",
                        self.name, other.name
                    )));
                }
            }
            (None, None) => {}
            _ => {
                return Err(WxError::GridMismatch(format!(
                    "only one of '{}' and '{}' has vertical levels",
                    self.name, other.name
                )))
            }
        }

        if self.crs != other.crs {
            return Err(WxError::GridMismatch(format!(
                "'{}' and '{}' use different grid mappings",
                self.name, other.name
            )));
        }

        Ok(())
    }

    /// Fail with `UnitMismatch` unless the field's unit is compatible with `expected`.
    pub fn require_units(&self, expected: &Unit) -> WxResult<()> {
        if self.units.is_compatible(expected) || &self.units == expected {
            Ok(())
        } else {
            Err(WxError::UnitMismatch {
                expected: expected.to_string(),
                actual: format!("{} ('{}')", self.units, self.name),
            })
        }
    }

    /// Convert values to another unit.
    pub fn convert_units(&self, target: &Unit) -> WxResult<Field> {
        let conv = self.units.converter(target)?;
        Ok(self.map_values(self.name.clone(), target.clone(), |v| conv.apply_f32(v)))
    }

    /// Minimum and maximum of the finite values.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.data
            .iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(nx: usize, ny: usize) -> Field {
        let x: Vec<f64> = (0..nx).map(|i| i as f64).collect();
        let y: Vec<f64> = (0..ny).map(|j| j as f64 * 10.0).collect();
        let data = (0..nx * ny).map(|n| n as f32).collect();
        Field::new("ramp", Unit::Kelvin, x, y, data).unwrap()
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let err = Field::new("bad", Unit::Kelvin, vec![0.0, 1.0], vec![0.0], vec![1.0]);
        assert!(matches!(
            err,
            Err(WxError::ShapeMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_indexing_row_major() {
        let f = ramp(4, 3);
        assert_eq!(f.shape(), (1, 3, 4));
        assert_eq!(f.value(0, 1, 2), Some(6.0));
        assert_eq!(f.value(0, 3, 0), None);
        assert_eq!(f.coords(2, 1), (1.0, 20.0));
    }

    #[test]
    fn test_select_level_with_unit_conversion() {
        let axis = VerticalAxis::new("isobaric", vec![50000.0, 85000.0], Unit::Pascal);
        let f = Field::new_3d(
            "t",
            Unit::Kelvin,
            axis,
            vec![0.0, 1.0],
            vec![0.0],
            vec![250.0, 251.0, 280.0, 281.0],
        )
        .unwrap();

        let l = f.select_level(850.0, &Unit::Hectopascal).unwrap();
        assert_eq!(l.data(), &[280.0, 281.0]);
        assert!(l.levels.is_none());
        assert!(f.select_level(700.0, &Unit::Hectopascal).is_err());
    }

    #[test]
    fn test_zip_requires_alignment() {
        let a = ramp(3, 2);
        let b = ramp(3, 2);
        let sum = a.zip_with(&b, "sum", Unit::Kelvin, |p, q| p + q).unwrap();
        assert_eq!(sum.data()[5], 10.0);

        let c = ramp(2, 3);
        assert!(matches!(a.check_aligned(&c), Err(WxError::GridMismatch(_))));

        let shifted = Field::new(
            "shifted",
            Unit::Kelvin,
            vec![0.5, 1.5, 2.5],
            vec![0.0, 10.0],
            vec![0.0; 6],
        )
        .unwrap();
        assert!(a.check_aligned(&shifted).is_err());
    }

    #[test]
    fn test_convert_units_and_min_max() {
        let mut f = ramp(2, 1);
        f.data_mut()[0] = f32::NAN;
        let c = f.convert_units(&Unit::Celsius).unwrap();
        assert!((c.data()[1] - (1.0 - 273.15)).abs() < 1e-3);
        assert_eq!(f.min_max(), Some((1.0, 1.0)));
        assert!(f.convert_units(&Unit::Pascal).is_err());
    }
}
