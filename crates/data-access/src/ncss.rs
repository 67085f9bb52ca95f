//! THREDDS NetCDF Subset Service (NCSS) queries.
//!
//! A query names the variables wanted, the time, a horizontal subset and
//! the response encoding; [`NcssQuery::url`] renders it against a dataset
//! endpoint such as
//! `https://thredds.ucar.edu/thredds/ncss/grid/grib/NCEP/GFS/Global_0p25deg/Best`.

use reqwest::Url;
use wx_common::time::format_iso8601;
use wx_common::{BoundingBox, TimeSelector};

use crate::error::{AccessError, AccessResult};

/// Response encoding requested with `accept=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accept {
    NetCdf3,
    #[default]
    NetCdf4,
    Csv,
    Xml,
}

impl Accept {
    pub fn as_str(&self) -> &'static str {
        match self {
            Accept::NetCdf3 => "netcdf3",
            Accept::NetCdf4 => "netcdf4",
            Accept::Csv => "csv",
            Accept::Xml => "xml",
        }
    }

    pub fn is_netcdf(&self) -> bool {
        matches!(self, Accept::NetCdf3 | Accept::NetCdf4)
    }
}

/// Spatial part of a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HorizontalSubset {
    /// Longitude/latitude box in degrees.
    LonLatBox(BoundingBox),
    /// Single point; the service returns the nearest grid column.
    Point { lon: f64, lat: f64 },
}

/// A NetCDF Subset Service query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NcssQuery {
    variables: Vec<String>,
    time: Option<TimeSelector>,
    horizontal: Option<HorizontalSubset>,
    vertical_level: Option<f64>,
    stride: Option<u32>,
    accept: Accept,
    add_lat_lon: bool,
}

impl NcssQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request one more variable. Duplicates are ignored.
    pub fn variable(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.variables.contains(&name) {
            self.variables.push(name);
        }
        self
    }

    pub fn variables<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().fold(self, |q, name| q.variable(name))
    }

    pub fn time(mut self, selector: TimeSelector) -> Self {
        self.time = Some(selector);
        self
    }

    pub fn lonlat_box(mut self, bbox: BoundingBox) -> Self {
        self.horizontal = Some(HorizontalSubset::LonLatBox(bbox));
        self
    }

    pub fn lonlat_point(mut self, lon: f64, lat: f64) -> Self {
        self.horizontal = Some(HorizontalSubset::Point { lon, lat });
        self
    }

    /// Restrict to one vertical level, in the units of the vertical
    /// coordinate (Pa for GFS isobaric levels).
    pub fn vertical_level(mut self, level: f64) -> Self {
        self.vertical_level = Some(level);
        self
    }

    /// Take every `stride`-th grid point in x and y.
    pub fn horizontal_stride(mut self, stride: u32) -> Self {
        self.stride = Some(stride);
        self
    }

    pub fn accept(mut self, accept: Accept) -> Self {
        self.accept = accept;
        self
    }

    /// Ask the service to add 2-D lat/lon variables to projected output.
    pub fn add_lat_lon(mut self) -> Self {
        self.add_lat_lon = true;
        self
    }

    pub fn variable_names(&self) -> &[String] {
        &self.variables
    }

    pub fn accept_format(&self) -> Accept {
        self.accept
    }

    /// Check the query before sending it.
    pub fn validate(&self) -> AccessResult<()> {
        if self.variables.is_empty() {
            return Err(AccessError::invalid("NCSS query requests no variables"));
        }
        if let Some(TimeSelector::Range { start, end }) = &self.time {
            if end < start {
                return Err(AccessError::invalid(format!(
                    "time range end {} precedes start {}",
                    format_iso8601(end),
                    format_iso8601(start)
                )));
            }
        }
        match &self.horizontal {
            Some(HorizontalSubset::LonLatBox(b)) if b.min_x >= b.max_x || b.min_y >= b.max_y => {
                return Err(AccessError::invalid(format!(
                    "degenerate lon/lat box {:?}",
                    b
                )));
            }
            Some(HorizontalSubset::Point { lat, .. }) if !(-90.0..=90.0).contains(lat) => {
                return Err(AccessError::invalid(format!("latitude {} out of range", lat)));
            }
            _ => {}
        }
        if self.stride == Some(0) {
            return Err(AccessError::invalid("horizontal stride must be > 0"));
        }
        Ok(())
    }

    /// Query parameters in the order the service documents them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs: Vec<(&'static str, String)> = self
            .variables
            .iter()
            .map(|v| ("var", v.clone()))
            .collect();

        match &self.time {
            Some(TimeSelector::Latest) => pairs.push(("time", "present".to_string())),
            Some(TimeSelector::At(t)) => pairs.push(("time", format_iso8601(t))),
            Some(TimeSelector::Range { start, end }) => {
                pairs.push(("time_start", format_iso8601(start)));
                pairs.push(("time_end", format_iso8601(end)));
            }
            None => {}
        }

        match &self.horizontal {
            Some(HorizontalSubset::LonLatBox(b)) => {
                pairs.push(("west", b.min_x.to_string()));
                pairs.push(("east", b.max_x.to_string()));
                pairs.push(("south", b.min_y.to_string()));
                pairs.push(("north", b.max_y.to_string()));
            }
            Some(HorizontalSubset::Point { lon, lat }) => {
                pairs.push(("latitude", lat.to_string()));
                pairs.push(("longitude", lon.to_string()));
            }
            None => {}
        }

        if let Some(level) = self.vertical_level {
            pairs.push(("vertCoord", level.to_string()));
        }
        if let Some(stride) = self.stride {
            pairs.push(("horizStride", stride.to_string()));
        }
        if self.add_lat_lon {
            pairs.push(("addLatLon", "true".to_string()));
        }
        pairs.push(("accept", self.accept.as_str().to_string()));
        pairs
    }

    /// Full request URL against a dataset endpoint.
    pub fn url(&self, base: &str) -> AccessResult<Url> {
        self.validate()?;
        let mut url = Url::parse(base)
            .map_err(|e| AccessError::invalid(format!("NCSS endpoint '{}': {}", base, e)))?;
        url.query_pairs_mut().extend_pairs(self.query_pairs());
        Ok(url)
    }
}
