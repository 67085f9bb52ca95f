//! Lightning mapper flashes over the GOES-East footprint, colored by
//! optical energy.

use anyhow::{Context, Result};
use data_access::{AccessResult, DataClient, DataRequest};
use renderer::{Colormap, Graticule, MapPlot, RenderResult, Scatter};
use tracing::info;
use wx_common::{Observation, PointBatch, Unit};

use super::{Recipe, RecipeOptions};

pub const PARAMETER: &str = "flash_energy";

pub fn request(source: &str, options: &RecipeOptions) -> AccessResult<DataRequest> {
    DataRequest::builder()
        .data_type("binlightning")
        .source(source)
        .parameter(PARAMETER)
        .time(options.time)
        .bbox(options.extent)
        .build()
}

/// Flash energies span several decades; markers are colored by
/// `log10(fJ)`. Non-positive energies are dropped.
pub fn derive(flashes: &PointBatch) -> PointBatch {
    let points = flashes
        .points
        .iter()
        .filter(|obs| obs.value > 0.0)
        .map(|obs| Observation {
            value: obs.value.log10(),
            ..obs.clone()
        })
        .collect();
    PointBatch {
        parameter: format!("log10_{}", flashes.parameter),
        units: Unit::Other(format!("log10({})", flashes.units)),
        points,
    }
}

pub fn render(options: &RecipeOptions, energy: &PointBatch) -> RenderResult<MapPlot> {
    let mut plot = MapPlot::new(options.canvas(Recipe::Lightning)?)?;
    let markers = Scatter::new(energy, Colormap::named("plasma")?)
        .radius(2.5)
        .outline([40, 40, 40, 255]);
    plot.draw(&Graticule::default())?.draw(&markers)?;
    Ok(plot)
}

pub async fn run(client: &DataClient, source: &str, options: &RecipeOptions) -> Result<MapPlot> {
    let request = request(source, options).context("Invalid lightning request")?;
    let batches = client
        .fetch_points(&request)
        .await
        .context("Failed to fetch lightning flashes")?;
    let flashes = batches
        .into_iter()
        .next()
        .unwrap_or_else(|| PointBatch::new(PARAMETER, Unit::Femtojoules));
    let flashes = flashes.filter_bbox(&options.extent);
    info!(flashes = flashes.len(), "Received lightning flashes");

    let energy = derive(&flashes);
    render(options, &energy).context("Failed to render lightning map")
}
