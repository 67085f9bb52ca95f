//! Point data requests resolved to OGC EDR `cube` queries.

use std::fmt;

use reqwest::Url;
use tracing::debug;
use wx_common::time::format_iso8601;
use wx_common::{BoundingBox, TimeSelector, Unit};

use crate::error::{AccessError, AccessResult};

/// Kind of point dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// Lightning flashes (GLM and ground networks).
    BinLightning,
    /// Surface observations.
    Obs,
}

impl DataType {
    pub fn parse(s: &str) -> AccessResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binlightning" | "lightning" => Ok(DataType::BinLightning),
            "obs" | "observations" => Ok(DataType::Obs),
            other => Err(AccessError::invalid(format!(
                "unsupported datatype '{}'",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::BinLightning => "binlightning",
            DataType::Obs => "obs",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encoding of the EDR response (`f=` parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    GeoJson,
    NetCdf,
}

impl ResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::GeoJson => "GeoJSON",
            ResponseFormat::NetCdf => "NetCDF",
        }
    }
}

/// A validated point data request.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRequest {
    pub data_type: DataType,
    /// EDR collection id, e.g. `GLM`.
    pub source: String,
    pub parameters: Vec<String>,
    pub time: TimeSelector,
    pub bbox: Option<BoundingBox>,
    pub format: ResponseFormat,
}

impl DataRequest {
    pub fn builder() -> DataRequestBuilder {
        DataRequestBuilder::default()
    }

    /// Resolve to `{base}/collections/{source}/cube?...`.
    ///
    /// A request without a bbox asks for the whole globe, as `cube`
    /// requires one.
    pub fn cube_url(&self, base: &str) -> AccessResult<Url> {
        let trimmed = base.trim_end_matches('/');
        let mut url = Url::parse(&format!("{}/collections/{}/cube", trimmed, self.source))
            .map_err(|e| AccessError::invalid(format!("EDR endpoint '{}': {}", base, e)))?;

        let bbox = self
            .bbox
            .unwrap_or_else(|| BoundingBox::new(-180.0, -90.0, 180.0, 90.0));

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("parameter-name", &self.parameters.join(","));
            match &self.time {
                TimeSelector::Latest => {}
                TimeSelector::At(t) => {
                    query.append_pair("datetime", &format_iso8601(t));
                }
                TimeSelector::Range { start, end } => {
                    query.append_pair(
                        "datetime",
                        &format!("{}/{}", format_iso8601(start), format_iso8601(end)),
                    );
                }
            }
            query.append_pair(
                "bbox",
                &format!("{},{},{},{}", bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y),
            );
            query.append_pair("f", self.format.as_str());
        }

        debug!(datatype = %self.data_type, url = %url, "Resolved point data request");
        Ok(url)
    }

    /// Units values of `parameter` are reported in.
    pub fn units_for(&self, parameter: &str) -> Unit {
        match (self.data_type, parameter) {
            (DataType::BinLightning, "flash_energy") => Unit::Femtojoules,
            (DataType::BinLightning, "flash_area") => Unit::SquareKilometers,
            (DataType::BinLightning, _) => Unit::Dimensionless,
            (DataType::Obs, "air_temperature") | (DataType::Obs, "dew_point_temperature") => {
                Unit::Celsius
            }
            (DataType::Obs, "wind_speed") => Unit::MetersPerSecond,
            (DataType::Obs, "air_pressure_at_sea_level") => Unit::Hectopascal,
            (DataType::Obs, other) => Unit::Other(other.to_string()),
        }
    }
}

/// Builder for [`DataRequest`]; [`build`](Self::build) fails fast on an
/// unsupported datatype, an empty parameter list or an inverted time range.
#[derive(Debug, Clone, Default)]
pub struct DataRequestBuilder {
    data_type: Option<String>,
    source: Option<String>,
    parameters: Vec<String>,
    time: Option<TimeSelector>,
    bbox: Option<BoundingBox>,
    format: ResponseFormat,
}

impl DataRequestBuilder {
    pub fn data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn parameter(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.parameters.contains(&name) {
            self.parameters.push(name);
        }
        self
    }

    pub fn time(mut self, time: TimeSelector) -> Self {
        self.time = Some(time);
        self
    }

    pub fn bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn format(mut self, format: ResponseFormat) -> Self {
        self.format = format;
        self
    }

    pub fn build(self) -> AccessResult<DataRequest> {
        let data_type = DataType::parse(
            self.data_type
                .as_deref()
                .ok_or_else(|| AccessError::invalid("datatype is required"))?,
        )?;

        let source = self
            .source
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| AccessError::invalid("source is required"))?;
        if source.contains('/') {
            return Err(AccessError::invalid(format!(
                "source '{}' is not a collection id",
                source
            )));
        }

        if self.parameters.is_empty() {
            return Err(AccessError::invalid("at least one parameter is required"));
        }

        let time = self.time.unwrap_or(TimeSelector::Latest);
        if let TimeSelector::Range { start, end } = &time {
            if end < start {
                return Err(AccessError::invalid(format!(
                    "time range end {} precedes start {}",
                    format_iso8601(end),
                    format_iso8601(start)
                )));
            }
        }

        if let Some(b) = &self.bbox {
            if b.min_x >= b.max_x || b.min_y >= b.max_y {
                return Err(AccessError::invalid(format!("degenerate bbox {:?}", b)));
            }
        }

        Ok(DataRequest {
            data_type,
            source,
            parameters: self.parameters,
            time,
            bbox: self.bbox,
            format: self.format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datatype_parse() {
        assert_eq!(DataType::parse("binlightning").unwrap(), DataType::BinLightning);
        assert_eq!(DataType::parse("OBS").unwrap(), DataType::Obs);
        assert!(DataType::parse("radar").is_err());
    }

    #[test]
    fn test_units_for_lightning() {
        let req = DataRequest::builder()
            .data_type("binlightning")
            .source("GLM")
            .parameter("flash_energy")
            .build()
            .unwrap();
        assert_eq!(req.units_for("flash_energy"), Unit::Femtojoules);
        assert_eq!(req.units_for("flash_area"), Unit::SquareKilometers);
    }

    #[test]
    fn test_latest_omits_datetime() {
        let url = DataRequest::builder()
            .data_type("binlightning")
            .source("GLM")
            .parameter("flash_energy")
            .build()
            .unwrap()
            .cube_url("http://localhost:8083/edr/")
            .unwrap();
        assert_eq!(url.path(), "/edr/collections/GLM/cube");
        assert!(!url.query().unwrap_or_default().contains("datetime"));
        assert!(url.query().unwrap_or_default().contains("bbox=-180%2C-90%2C180%2C90"));
    }
}
