//! One-shot HTTP client for the remote data services.
//!
//! Requests are sent once; failures surface to the caller unchanged.

use bytes::Bytes;
use reqwest::{Client, Url};
use tracing::{debug, info, instrument};
use wx_common::{Field, PointBatch};

use crate::config::AccessConfig;
use crate::error::{AccessError, AccessResult};
use crate::geojson::decode_points;
use crate::ncss::NcssQuery;
use crate::request::{DataRequest, ResponseFormat};

/// HTTP client bound to one pair of service endpoints.
#[derive(Debug, Clone)]
pub struct DataClient {
    client: Client,
    config: AccessConfig,
}

impl DataClient {
    pub fn new(config: AccessConfig) -> AccessResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    /// GET `url` and return the body of a 2xx response.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_bytes(&self, url: &Url) -> AccessResult<Bytes> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AccessError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.bytes().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "Fetched");
        Ok(body)
    }

    /// Run an NCSS query and decode every requested variable.
    ///
    /// Fields come back in the order the variables were added to the query.
    #[instrument(skip(self, query), fields(variables = ?query.variable_names()))]
    pub async fn fetch_grid(&self, query: &NcssQuery) -> AccessResult<Vec<Field>> {
        if !query.accept_format().is_netcdf() {
            return Err(AccessError::invalid(format!(
                "grids are decoded from netCDF, not '{}'",
                query.accept_format().as_str()
            )));
        }
        let url = query.url(&self.config.ncss_base_url)?;
        let body = self.fetch_bytes(&url).await?;

        let names: Vec<&str> = query.variable_names().iter().map(String::as_str).collect();
        let fields = netcdf_parser::read_fields(&body, &names)?;
        info!(fields = fields.len(), bytes = body.len(), "Received grid");
        Ok(fields)
    }

    /// Resolve and run a point data request; one batch per parameter.
    #[instrument(skip(self, request), fields(datatype = %request.data_type, source = %request.source))]
    pub async fn fetch_points(&self, request: &DataRequest) -> AccessResult<Vec<PointBatch>> {
        let url = request.cube_url(&self.config.edr_base_url)?;
        let body = self.fetch_bytes(&url).await?;

        let batches = request
            .parameters
            .iter()
            .map(|parameter| match request.format {
                ResponseFormat::GeoJson => {
                    decode_points(&body, parameter, request.units_for(parameter))
                }
                ResponseFormat::NetCdf => Ok(netcdf_parser::read_glm_flashes(&body, parameter)?),
            })
            .collect::<AccessResult<Vec<_>>>()?;

        info!(
            points = batches.iter().map(PointBatch::len).sum::<usize>(),
            "Received points"
        );
        Ok(batches)
    }
}
