//! Potential temperature on the dynamic tropopause (the 2 PVU surface)
//! from GFS isobaric fields, with tropopause winds.

use anyhow::{anyhow, Context, Result};
use data_access::{DataClient, NcssQuery};
use renderer::{level_range, Barbs, Colormap, ContourLines, FilledContour, Graticule, MapPlot, RenderResult};
use tracing::info;
use wx_calc::{
    interpolate_to_isosurface, potential_temperature, potential_vorticity_baroclinic,
    smooth_n_point, CalcResult,
};
use wx_common::{Field, Unit};

use super::vorticity_advection::barb_stride;
use super::{Recipe, RecipeOptions};

pub const TEMPERATURE: &str = "Temperature_isobaric";
pub const U_WIND: &str = "u-component_of_wind_isobaric";
pub const V_WIND: &str = "v-component_of_wind_isobaric";

/// Dynamic tropopause threshold in PVU.
pub const TROPOPAUSE_PVU: f64 = 2.0;

pub fn query(options: &RecipeOptions) -> NcssQuery {
    NcssQuery::new()
        .variables([TEMPERATURE, U_WIND, V_WIND])
        .time(options.time)
        .lonlat_box(options.request_extent())
        .horizontal_stride(2)
}

#[derive(Debug, Clone)]
pub struct DynamicTropopause {
    /// Potential temperature on 2 PVU (K).
    pub theta: Field,
    pub u: Field,
    pub v: Field,
}

pub fn derive(temperature: &Field, u: &Field, v: &Field) -> CalcResult<DynamicTropopause> {
    let theta = potential_temperature(temperature)?;
    let pv = potential_vorticity_baroclinic(&theta, u, v)?.convert_units(&Unit::Pvu)?;
    // The southern hemisphere tropopause is at -2 PVU
    let pv = pv.map_values("potential_vorticity_magnitude", Unit::Pvu, f32::abs);

    let theta_2pvu = interpolate_to_isosurface(&pv, &theta, TROPOPAUSE_PVU, true)?;
    let u_2pvu = interpolate_to_isosurface(&pv, u, TROPOPAUSE_PVU, true)?;
    let v_2pvu = interpolate_to_isosurface(&pv, v, TROPOPAUSE_PVU, true)?;

    Ok(DynamicTropopause {
        theta: smooth_n_point(&theta_2pvu, 9, 2)?,
        u: u_2pvu,
        v: v_2pvu,
    })
}

pub fn render(options: &RecipeOptions, fields: &DynamicTropopause) -> RenderResult<MapPlot> {
    let mut plot = MapPlot::new(options.canvas(Recipe::DynamicTropopause)?)?;

    let fill = FilledContour::new(
        &fields.theta,
        level_range(280.0, 400.0, 5.0),
        Colormap::named("rdbu_r")?,
    )?;
    let isentropes = ContourLines::new(&fields.theta, level_range(280.0, 400.0, 10.0))?
        .color([30, 30, 30, 255])
        .line_width(1.0)
        .labels(10.0);
    let barbs = Barbs::new(&fields.u, &fields.v)?.stride(barb_stride(&fields.u, options.width));

    plot.draw(&fill)?
        .draw(&Graticule::default())?
        .draw(&isentropes)?
        .draw(&barbs)?;
    Ok(plot)
}

pub async fn run(client: &DataClient, options: &RecipeOptions) -> Result<MapPlot> {
    let fields = client
        .fetch_grid(&query(options))
        .await
        .context("Failed to fetch isobaric fields")?;
    let [temperature, u, v] = <[Field; 3]>::try_from(fields)
        .map_err(|f| anyhow!("expected 3 fields, got {}", f.len()))?;
    info!(
        valid_time = ?temperature.valid_time,
        shape = ?temperature.shape(),
        "Received GFS isobaric fields"
    );

    let derived = derive(&temperature, &u, &v).context("Failed to find the dynamic tropopause")?;
    render(options, &derived).context("Failed to render dynamic tropopause map")
}
