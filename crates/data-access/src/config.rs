//! Endpoints and client settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AccessError, AccessResult};

/// Where remote data comes from and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// NCSS endpoint of the model dataset, e.g. the GFS "Best" time series.
    pub ncss_base_url: String,

    /// Root of the EDR service answering point data requests.
    pub edr_base_url: String,

    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,

    pub user_agent: String,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            ncss_base_url:
                "https://thredds.ucar.edu/thredds/ncss/grid/grib/NCEP/GFS/Global_0p25deg/Best"
                    .to_string(),
            edr_base_url: "http://localhost:8083/edr".to_string(),
            timeout_secs: 120,
            user_agent: concat!("wx-gallery/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl AccessConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("NCSS_BASE_URL") {
            config.ncss_base_url = val;
        }

        if let Ok(val) = std::env::var("EDR_BASE_URL") {
            config.edr_base_url = val;
        }

        if let Ok(val) = std::env::var("HTTP_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.timeout_secs = secs;
            }
        }

        if let Ok(val) = std::env::var("HTTP_USER_AGENT") {
            config.user_agent = val;
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> AccessResult<()> {
        for (key, url) in [
            ("ncss_base_url", &self.ncss_base_url),
            ("edr_base_url", &self.edr_base_url),
        ] {
            reqwest::Url::parse(url)
                .map_err(|e| AccessError::Config(format!("{} '{}': {}", key, url, e)))?;
        }

        if self.timeout_secs == 0 {
            return Err(AccessError::Config("timeout_secs must be > 0".to_string()));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(AccessConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_url() {
        let config = AccessConfig {
            edr_base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AccessError::Config(_))));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let config = AccessConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
