//! Common test fixtures for wx-gallery tests.

/// Common bounding boxes as (min_lon, min_lat, max_lon, max_lat).
pub mod bbox {
    /// Global bounding box (-180 to 180, -90 to 90)
    pub const GLOBAL: (f64, f64, f64, f64) = (-180.0, -90.0, 180.0, 90.0);

    /// Continental United States bounding box
    pub const CONUS: (f64, f64, f64, f64) = (-130.0, 20.0, -60.0, 55.0);

    /// GOES-East full disk lightning footprint used by the lightning recipe
    pub const GOES_EAST: (f64, f64, f64, f64) = (-140.0, -50.0, -10.0, 55.0);

    /// Invalid bbox (min > max)
    pub const INVALID: (f64, f64, f64, f64) = (10.0, 10.0, 5.0, 5.0);
}

/// Common time values for testing.
pub mod time {
    /// A fixed reference time for tests (2024-01-15T12:00:00Z)
    pub const REFERENCE_TIME: &str = "2024-01-15T12:00:00Z";

    /// Start/end of a ten minute lightning window
    pub const WINDOW_START: &str = "2024-01-15T12:00:00Z";
    pub const WINDOW_END: &str = "2024-01-15T12:10:00Z";
}

/// Canned service responses.
pub mod responses {
    /// GeoJSON point response for a lightning cube query. The third
    /// feature has no `flash_energy` property.
    pub const GLM_GEOJSON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "geometry": { "type": "Point", "coordinates": [-97.25, 35.5] },
      "properties": { "flash_energy": 12.5, "time": "2024-01-15T12:01:00Z" }
    },
    {
      "type": "Feature",
      "geometry": { "type": "Point", "coordinates": [-80.0, 27.75] },
      "properties": { "flash_energy": 3.0, "time": "2024-01-15T12:04:30Z" }
    },
    {
      "type": "Feature",
      "geometry": { "type": "Point", "coordinates": [-60.0, -10.0] },
      "properties": { "flash_area": 85.0 }
    }
  ]
}"#;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_ordering() {
        let (min_lon, min_lat, max_lon, max_lat) = bbox::CONUS;
        assert!(min_lon < max_lon && min_lat < max_lat);
        let (min_lon, _, max_lon, _) = bbox::INVALID;
        assert!(min_lon > max_lon);
    }

    #[test]
    fn test_geojson_fixture_is_feature_collection() {
        assert!(responses::GLM_GEOJSON.contains("\"FeatureCollection\""));
    }
}
