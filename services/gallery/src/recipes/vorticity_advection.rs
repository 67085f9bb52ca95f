//! 500 hPa absolute vorticity advection from the GFS with geopotential
//! height contours and wind barbs.

use anyhow::{anyhow, Context, Result};
use data_access::{DataClient, NcssQuery};
use renderer::{level_range, Barbs, Colormap, ContourLines, FilledContour, Graticule, MapPlot, RenderResult};
use tracing::info;
use wx_calc::{absolute_vorticity, advection, smooth_gaussian, CalcResult};
use wx_common::{Field, Unit};

use super::{Recipe, RecipeOptions};

pub const HEIGHT: &str = "Geopotential_height_isobaric";
pub const U_WIND: &str = "u-component_of_wind_isobaric";
pub const V_WIND: &str = "v-component_of_wind_isobaric";

/// 500 hPa in the dataset's vertical units.
pub const LEVEL_PA: f64 = 50_000.0;

/// Gaussian smoothing scale in grid points.
const SMOOTHING: usize = 9;

/// Display scale of the advection field.
const ADVECTION_SCALE: f32 = 1e9;

pub fn query(options: &RecipeOptions) -> NcssQuery {
    NcssQuery::new()
        .variables([HEIGHT, U_WIND, V_WIND])
        .time(options.time)
        .lonlat_box(options.request_extent())
        .vertical_level(LEVEL_PA)
}

/// What the map shows.
#[derive(Debug, Clone)]
pub struct VorticityAdvection {
    /// Smoothed heights in decameters.
    pub heights: Field,
    /// Absolute vorticity advection in 1e-9 s-2.
    pub advection: Field,
    pub u: Field,
    pub v: Field,
}

pub fn derive(heights: &Field, u: &Field, v: &Field) -> CalcResult<VorticityAdvection> {
    let heights = smooth_gaussian(heights, SMOOTHING)?.convert_units(&Unit::Decameters)?;
    let avor = smooth_gaussian(&absolute_vorticity(u, v)?, SMOOTHING)?;
    let adv = advection(&avor, u, v)?;
    let advection = adv.map_values(
        "absolute_vorticity_advection",
        Unit::Other("1e-9 s-2".to_string()),
        |x| x * ADVECTION_SCALE,
    );

    Ok(VorticityAdvection {
        heights,
        advection,
        u: u.clone(),
        v: v.clone(),
    })
}

pub fn render(options: &RecipeOptions, fields: &VorticityAdvection) -> RenderResult<MapPlot> {
    let mut plot = MapPlot::new(options.canvas(Recipe::VorticityAdvection)?)?;

    let fill = FilledContour::new(
        &fields.advection,
        level_range(-10.0, 10.0, 2.0),
        Colormap::named("bwr")?,
    )?
    .opacity(0.85);
    let heights = ContourLines::new(&fields.heights, level_range(480.0, 600.0, 6.0))?
        .line_width(1.5)
        .labels(11.0);
    let stride = barb_stride(&fields.u, options.width);
    let barbs = Barbs::new(&fields.u, &fields.v)?.stride(stride);

    plot.draw(&fill)?
        .draw(&Graticule::default())?
        .draw(&heights)?
        .draw(&barbs)?;
    Ok(plot)
}

/// Roughly one barb every 40 pixels.
pub(crate) fn barb_stride(field: &Field, width: u32) -> usize {
    let barbs_across = (width as usize / 40).max(1);
    (field.nx() / barbs_across).max(1)
}

pub async fn run(client: &DataClient, options: &RecipeOptions) -> Result<MapPlot> {
    let fields = client
        .fetch_grid(&query(options))
        .await
        .context("Failed to fetch 500 hPa fields")?;
    let [heights, u, v] = <[Field; 3]>::try_from(fields)
        .map_err(|f| anyhow!("expected 3 fields, got {}", f.len()))?;
    info!(
        valid_time = ?heights.valid_time,
        shape = ?heights.shape(),
        "Received GFS 500 hPa fields"
    );

    let derived = derive(&heights, &u, &v).context("Failed to compute vorticity advection")?;
    render(options, &derived).context("Failed to render vorticity advection map")
}
