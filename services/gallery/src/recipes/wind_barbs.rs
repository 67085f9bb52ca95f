//! 10 m winds from the NAM CONUS grid. The model stores grid-relative
//! components, which are rotated to earth-relative before plotting.

use anyhow::{anyhow, Context, Result};
use data_access::{DataClient, NcssQuery};
use projection::earth_relative_wind_components;
use renderer::{level_range, Barbs, Colormap, FilledContour, Graticule, MapPlot, RenderResult};
use tracing::info;
use wx_calc::wind_speed;
use wx_common::{Field, Unit};

use super::vorticity_advection::barb_stride;
use super::{Recipe, RecipeOptions};

pub const U_WIND: &str = "u-component_of_wind_height_above_ground";
pub const V_WIND: &str = "v-component_of_wind_height_above_ground";

/// Height above ground of the requested wind, in metres.
pub const WIND_HEIGHT_M: f64 = 10.0;

pub fn query(options: &RecipeOptions) -> NcssQuery {
    NcssQuery::new()
        .variables([U_WIND, V_WIND])
        .time(options.time)
        .lonlat_box(options.request_extent())
        .vertical_level(WIND_HEIGHT_M)
}

#[derive(Debug, Clone)]
pub struct EarthRelativeWind {
    pub u: Field,
    pub v: Field,
    /// Speed in knots.
    pub speed: Field,
}

pub fn derive(u: &Field, v: &Field) -> Result<EarthRelativeWind> {
    let (u, v) = earth_relative_wind_components(u, v)?;
    let speed = wind_speed(&u, &v)?.convert_units(&Unit::Knots)?;
    Ok(EarthRelativeWind { u, v, speed })
}

pub fn render(options: &RecipeOptions, wind: &EarthRelativeWind) -> RenderResult<MapPlot> {
    let mut plot = MapPlot::new(options.canvas(Recipe::WindBarbs)?)?;

    let fill = FilledContour::new(
        &wind.speed,
        level_range(0.0, 60.0, 5.0),
        Colormap::named("ylorrd")?,
    )?
    .opacity(0.8);
    let barbs = Barbs::new(&wind.u, &wind.v)?
        .stride(barb_stride(&wind.u, options.width))
        .length(22.0);

    plot.draw(&fill)?.draw(&Graticule::default())?.draw(&barbs)?;
    Ok(plot)
}

pub async fn run(client: &DataClient, options: &RecipeOptions) -> Result<MapPlot> {
    let fields = client
        .fetch_grid(&query(options))
        .await
        .context("Failed to fetch 10 m wind")?;
    let [u, v] = <[Field; 2]>::try_from(fields)
        .map_err(|f| anyhow!("expected 2 fields, got {}", f.len()))?;
    info!(
        crs = ?u.crs,
        frame = ?u.vector_frame,
        shape = ?u.shape(),
        "Received regional wind"
    );

    let wind = derive(&u, &v).context("Failed to rotate wind to earth-relative")?;
    render(options, &wind).context("Failed to render wind barb map")
}
