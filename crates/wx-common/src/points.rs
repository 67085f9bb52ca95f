//! Point observations such as lightning flashes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::units::Unit;

/// One located observation of a single scalar parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub lon: f64,
    pub lat: f64,
    pub value: f32,
    pub time: Option<DateTime<Utc>>,
}

/// All observations returned by one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointBatch {
    pub parameter: String,
    pub units: Unit,
    pub points: Vec<Observation>,
}

impl PointBatch {
    pub fn new(parameter: impl Into<String>, units: Unit) -> Self {
        Self {
            parameter: parameter.into(),
            units,
            points: Vec::new(),
        }
    }

    pub fn push(&mut self, obs: Observation) {
        self.points.push(obs);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Geographic extent of the batch (lon/lat degrees).
    pub fn bbox(&self) -> Option<BoundingBox> {
        BoundingBox::enclosing(self.points.iter().map(|p| (p.lon, p.lat)))
    }

    /// Keep only observations inside `bbox`.
    pub fn filter_bbox(&self, bbox: &BoundingBox) -> PointBatch {
        PointBatch {
            parameter: self.parameter.clone(),
            units: self.units.clone(),
            points: self
                .points
                .iter()
                .filter(|p| bbox.contains_point(p.lon, p.lat))
                .cloned()
                .collect(),
        }
    }

    /// Minimum and maximum finite value.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        self.points
            .iter()
            .map(|p| p.value)
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
