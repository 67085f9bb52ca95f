//! Gallery configuration.
//!
//! Settings come from defaults, overridden by environment variables or by
//! an optional YAML file. Command-line flags override both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use data_access::AccessConfig;
use serde::{Deserialize, Serialize};

/// Runtime configuration shared by all recipes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Global model NCSS endpoint, point data endpoint and HTTP settings.
    pub access: AccessConfig,

    /// NCSS endpoint of the regional (projected, grid-relative) model.
    pub regional_ncss_url: String,

    /// EDR collection holding lightning mapper flashes.
    pub lightning_source: String,

    /// Directory PNG files are written to.
    pub output_dir: PathBuf,

    /// Default image size in pixels.
    pub width: u32,
    pub height: u32,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            access: AccessConfig::default(),
            regional_ncss_url:
                "https://thredds.ucar.edu/thredds/ncss/grid/grib/NCEP/NAM/CONUS_12km/Best"
                    .to_string(),
            lightning_source: "GLM".to_string(),
            output_dir: PathBuf::from("output"),
            width: 1200,
            height: 800,
        }
    }
}

impl GalleryConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self {
            access: AccessConfig::from_env(),
            ..Self::default()
        };

        if let Ok(val) = std::env::var("REGIONAL_NCSS_URL") {
            config.regional_ncss_url = val;
        }

        if let Ok(val) = std::env::var("LIGHTNING_SOURCE") {
            config.lightning_source = val;
        }

        if let Ok(val) = std::env::var("GALLERY_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("GALLERY_WIDTH") {
            if let Ok(width) = val.parse() {
                config.width = width;
            }
        }

        if let Ok(val) = std::env::var("GALLERY_HEIGHT") {
            if let Ok(height) = val.parse() {
                config.height = height;
            }
        }

        config
    }

    /// Load configuration from a YAML file. Missing keys keep their
    /// defaults.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.access.validate().map_err(|e| e.to_string())?;

        if !self.regional_ncss_url.starts_with("http://")
            && !self.regional_ncss_url.starts_with("https://")
        {
            return Err(format!(
                "regional_ncss_url must be an http(s) URL, got '{}'",
                self.regional_ncss_url
            ));
        }

        if self.lightning_source.is_empty() {
            return Err("lightning_source must not be empty".to_string());
        }

        if self.width == 0 || self.height == 0 {
            return Err("width and height must be > 0".to_string());
        }

        Ok(())
    }

    /// Access settings pointed at the regional model.
    pub fn regional_access(&self) -> AccessConfig {
        AccessConfig {
            ncss_base_url: self.regional_ncss_url.clone(),
            ..self.access.clone()
        }
    }
}
