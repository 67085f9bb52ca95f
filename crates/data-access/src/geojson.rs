//! GeoJSON point responses.
//!
//! Point data services answer `f=GeoJSON` queries with a FeatureCollection
//! whose features carry a `Point` geometry and the requested parameters as
//! plain numeric members of `properties`:
//!
//! ```json
//! { "type": "Feature",
//!   "geometry": { "type": "Point", "coordinates": [-97.25, 35.5] },
//!   "properties": { "flash_energy": 12.5, "time": "2024-01-15T12:01:00Z" } }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use wx_common::time::parse_iso8601;
use wx_common::{Observation, PointBatch, Unit};

use crate::error::{AccessError, AccessResult};

/// A GeoJSON FeatureCollection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PointFeatureCollection {
    /// Type identifier (always "FeatureCollection").
    #[serde(rename = "type")]
    pub type_: String,

    pub features: Vec<PointFeature>,
}

/// A GeoJSON Feature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PointFeature {
    #[serde(rename = "type")]
    pub type_: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    /// `null` for features without a location.
    pub geometry: Option<Geometry>,

    /// `null` for features without attributes.
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

/// GeoJSON geometry. Only points become observations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        /// `[lon, lat]` or `[lon, lat, z]`.
        coordinates: Vec<f64>,
    },
    MultiPoint {
        coordinates: Value,
    },
    LineString {
        coordinates: Value,
    },
    Polygon {
        coordinates: Value,
    },
    /// Multi-geometries, collections and anything newer.
    #[serde(other)]
    Other,
}

impl PointFeature {
    /// `(lon, lat)` of a point feature.
    pub fn lon_lat(&self) -> Option<(f64, f64)> {
        match &self.geometry {
            Some(Geometry::Point { coordinates }) if coordinates.len() >= 2 => {
                Some((coordinates[0], coordinates[1]))
            }
            _ => None,
        }
    }

    fn property(&self, name: &str) -> Option<&Value> {
        self.properties.as_ref().and_then(|p| p.get(name))
    }

    /// Numeric value of a property; `null` and non-numbers count as absent.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.property(name).and_then(Value::as_f64)
    }

    /// Observation time from `time` or `datetime`.
    pub fn time(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        ["time", "datetime"]
            .iter()
            .filter_map(|key| self.property(key).and_then(Value::as_str))
            .find_map(|s| parse_iso8601(s).ok())
    }
}

/// Decode a GeoJSON body into a batch of `parameter`.
///
/// Features that are not points, or that lack a numeric `parameter`
/// property, are skipped.
pub fn decode_points(body: &[u8], parameter: &str, units: Unit) -> AccessResult<PointBatch> {
    let collection: PointFeatureCollection = serde_json::from_slice(body)?;
    if collection.type_ != "FeatureCollection" {
        return Err(AccessError::Decode(format!(
            "expected a FeatureCollection, got '{}'",
            collection.type_
        )));
    }

    let mut batch = PointBatch::new(parameter, units);
    let mut skipped = 0usize;
    for feature in &collection.features {
        match (feature.lon_lat(), feature.number(parameter)) {
            (Some((lon, lat)), Some(value)) => batch.push(Observation {
                lon,
                lat,
                value: value as f32,
                time: feature.time(),
            }),
            _ => skipped += 1,
        }
    }

    debug!(
        parameter,
        points = batch.len(),
        skipped,
        "Decoded GeoJSON points"
    );
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_geometry_and_value() {
        let body = br#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":null,"properties":{"x":1.0}},
            {"type":"Feature","geometry":{"type":"Point","coordinates":[1.0,2.0]},
             "properties":{"x":null}},
            {"type":"Feature","geometry":{"type":"Point","coordinates":[3.0,4.0,100.0]},
             "properties":{"x":7}}
        ]}"#;
        let batch = decode_points(body, "x", Unit::Dimensionless).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!((batch.points[0].lon, batch.points[0].lat), (3.0, 4.0));
        assert_eq!(batch.points[0].value, 7.0);
        assert!(batch.points[0].time.is_none());
    }

    #[test]
    fn test_non_point_geometry_skipped() {
        let body = br#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"LineString","coordinates":[[0,0],[1,1]]},
             "properties":{"x":1.0}}
        ]}"#;
        let batch = decode_points(body, "x", Unit::Dimensionless).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_unlisted_geometry_types_skipped() {
        let body = br#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"MultiPolygon",
             "coordinates":[[[[0,0],[1,0],[1,1],[0,0]]]]},"properties":{"x":1.0}},
            {"type":"Feature","geometry":{"type":"GeometryCollection","geometries":[]},
             "properties":{"x":2.0}},
            {"type":"Feature","geometry":{"type":"Point","coordinates":[5.0,6.0]},
             "properties":{"x":3.0}}
        ]}"#;
        let batch = decode_points(body, "x", Unit::Dimensionless).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.points[0].value, 3.0);
    }

    #[test]
    fn test_null_properties_skipped() {
        let body = br#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"Point","coordinates":[1.0,2.0]},
             "properties":null},
            {"type":"Feature","geometry":{"type":"Point","coordinates":[5.0,6.0]},
             "properties":{"x":3.0,"time":"2024-01-15T12:01:00Z"}}
        ]}"#;
        let batch = decode_points(body, "x", Unit::Dimensionless).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!((batch.points[0].lon, batch.points[0].lat), (5.0, 6.0));
        assert!(batch.points[0].time.is_some());
    }

    #[test]
    fn test_rejects_single_feature() {
        let body = br#"{"type":"Feature","features":[]}"#;
        assert!(matches!(
            decode_points(body, "x", Unit::Dimensionless),
            Err(AccessError::Decode(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            decode_points(b"{", "x", Unit::Dimensionless),
            Err(AccessError::Json(_))
        ));
    }
}
