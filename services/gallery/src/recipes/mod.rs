//! The gallery recipes. Each one acquires data, derives a field and
//! renders a map:
//!
//! | Recipe | Data | Derived | Map |
//! |---|---|---|---|
//! | `lightning` | GLM flashes (EDR) | - | flash energy markers |
//! | `vorticity-advection` | GFS 500 hPa (NCSS) | absolute vorticity advection | fill, height contours, barbs |
//! | `dynamic-tropopause` | GFS isobaric (NCSS) | potential temperature on 2 PVU | fill, contours, barbs |
//! | `wind-barbs` | NAM 10 m wind (NCSS) | earth-relative wind | speed fill, barbs |
//!
//! Recipes are split into `query`, `derive` and `render` steps so that
//! everything except the network call runs on synthetic data in tests.

pub mod dynamic_tropopause;
pub mod lightning;
pub mod vorticity_advection;
pub mod wind_barbs;

use std::fmt;

use anyhow::{Context, Result};
use chrono::Utc;
use data_access::DataClient;
use renderer::{MapCanvas, MapPlot};
use tracing::info;
use wx_common::{BoundingBox, GridCrs, TimeSelector};

use crate::config::GalleryConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipe {
    Lightning,
    VorticityAdvection,
    DynamicTropopause,
    WindBarbs,
}

impl Recipe {
    pub const ALL: [Recipe; 4] = [
        Recipe::Lightning,
        Recipe::VorticityAdvection,
        Recipe::DynamicTropopause,
        Recipe::WindBarbs,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Recipe::Lightning => "lightning",
            Recipe::VorticityAdvection => "vorticity-advection",
            Recipe::DynamicTropopause => "dynamic-tropopause",
            Recipe::WindBarbs => "wind-barbs",
        }
    }

    /// Map extent used when no `--bbox` is given.
    pub fn default_extent(&self) -> BoundingBox {
        match self {
            Recipe::Lightning => BoundingBox::new(-140.0, -50.0, -10.0, 55.0),
            Recipe::WindBarbs => BoundingBox::new(-125.0, 24.0, -66.0, 50.0),
            Recipe::VorticityAdvection | Recipe::DynamicTropopause => {
                BoundingBox::new(-130.0, 20.0, -60.0, 55.0)
            }
        }
    }

    /// Map projection of the output.
    pub fn map_crs(&self) -> GridCrs {
        match self {
            Recipe::Lightning => GridCrs::geographic(),
            _ => GridCrs::conus_lambert(),
        }
    }

    /// Output file name, stamped with the requested time when there is one.
    pub fn file_name(&self, time: &TimeSelector) -> String {
        match time.reference_time() {
            Some(t) => format!("{}_{}.png", self.name(), t.format("%Y%m%dT%H%MZ")),
            None => format!("{}_latest.png", self.name()),
        }
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Per-run choices taken from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeOptions {
    pub time: TimeSelector,
    pub extent: BoundingBox,
    pub width: u32,
    pub height: u32,
}

impl RecipeOptions {
    pub fn new(recipe: Recipe, config: &GalleryConfig) -> Self {
        Self {
            time: TimeSelector::Latest,
            extent: recipe.default_extent(),
            width: config.width,
            height: config.height,
        }
    }

    /// Model data are requested over a margin around the map so that
    /// derivatives and contours reach the edges.
    pub fn request_extent(&self) -> BoundingBox {
        const MARGIN_DEG: f64 = 5.0;
        self.extent.with_margin_deg(MARGIN_DEG)
    }

    pub fn canvas(&self, recipe: Recipe) -> renderer::RenderResult<MapCanvas> {
        MapCanvas::new(recipe.map_crs(), self.extent, self.width, self.height)
    }
}

/// Run one recipe end to end and return the finished map.
pub async fn run(recipe: Recipe, config: &GalleryConfig, options: &RecipeOptions) -> Result<MapPlot> {
    let started = Utc::now();
    info!(recipe = %recipe, time = ?options.time, extent = ?options.extent, "Running recipe");

    let plot = match recipe {
        Recipe::Lightning => {
            let client = client(config.access.clone())?;
            lightning::run(&client, &config.lightning_source, options).await?
        }
        Recipe::VorticityAdvection => {
            let client = client(config.access.clone())?;
            vorticity_advection::run(&client, options).await?
        }
        Recipe::DynamicTropopause => {
            let client = client(config.access.clone())?;
            dynamic_tropopause::run(&client, options).await?
        }
        Recipe::WindBarbs => {
            let client = client(config.regional_access())?;
            wind_barbs::run(&client, options).await?
        }
    };

    info!(
        recipe = %recipe,
        elapsed_ms = (Utc::now() - started).num_milliseconds(),
        "Recipe finished"
    );
    Ok(plot)
}

fn client(access: data_access::AccessConfig) -> Result<DataClient> {
    DataClient::new(access).context("Failed to create data client")
}
