//! Wind speed and direction.

use wx_common::{Field, Unit};

use crate::error::CalcResult;
use crate::kinematics::wind_pair;

/// Speed √(u² + v²) in m/s.
pub fn wind_speed(u: &Field, v: &Field) -> CalcResult<Field> {
    let (u, v) = wind_pair(u, v)?;
    Ok(u.zip_with(&v, "wind_speed", Unit::MetersPerSecond, |a, b| a.hypot(b))?)
}

/// Meteorological direction the wind blows from, degrees clockwise from
/// north in (0, 360]. Calm winds are 0.
pub fn wind_direction(u: &Field, v: &Field) -> CalcResult<Field> {
    let (u, v) = wind_pair(u, v)?;
    Ok(u.zip_with(&v, "wind_direction", Unit::Degrees, direction_from)?)
}

fn direction_from(u: f32, v: f32) -> f32 {
    if u == 0.0 && v == 0.0 {
        return 0.0;
    }
    let mut dir = 90.0 - (-v as f64).atan2(-u as f64).to_degrees();
    if dir <= 0.0 {
        dir += 360.0;
    }
    dir as f32
}
