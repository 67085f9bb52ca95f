//! Named color ramps and discrete level coloring.

use crate::error::{RenderError, RenderResult};

/// RGBA, straight (not premultiplied) alpha.
pub type Rgba = [u8; 4];

const VIRIDIS: &[&str] = &[
    "#440154", "#472d7b", "#3b528b", "#2c728e", "#21918c", "#28ae80", "#5ec962", "#addc30",
    "#fde725",
];

const PLASMA: &[&str] = &[
    "#0d0887", "#4c02a1", "#7e03a8", "#a92395", "#cc4778", "#e56b5d", "#f89540", "#fdc527",
    "#f0f921",
];

const RDBU_R: &[&str] = &[
    "#053061", "#2166ac", "#4393c3", "#92c5de", "#d1e5f0", "#f7f7f7", "#fddbc7", "#f4a582",
    "#d6604d", "#b2182b", "#67001f",
];

const YLORRD: &[&str] = &[
    "#ffffcc", "#ffeda0", "#fed976", "#feb24c", "#fd8d3c", "#fc4e2a", "#e31a1c", "#bd0026",
    "#800026",
];

const BWR: &[&str] = &["#0000ff", "#ffffff", "#ff0000"];

/// A piecewise-linear color ramp over `[0, 1]` with evenly spaced stops.
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    pub name: String,
    stops: Vec<Rgba>,
}

impl Colormap {
    /// Look up a built-in ramp: `viridis`, `plasma`, `rdbu_r`, `ylorrd`
    /// or `bwr` (case-insensitive).
    pub fn named(name: &str) -> RenderResult<Self> {
        let hex = match name.to_ascii_lowercase().as_str() {
            "viridis" => VIRIDIS,
            "plasma" => PLASMA,
            "rdbu_r" => RDBU_R,
            "ylorrd" => YLORRD,
            "bwr" => BWR,
            _ => return Err(RenderError::UnknownColormap(name.to_string())),
        };
        Self::from_hex(name, hex)
    }

    /// Build from `#rrggbb` or `#rrggbbaa` stops.
    pub fn from_hex(name: &str, stops: &[&str]) -> RenderResult<Self> {
        let stops = stops
            .iter()
            .map(|s| parse_hex(s))
            .collect::<RenderResult<Vec<_>>>()?;
        Self::from_stops(name, stops)
    }

    pub fn from_stops(name: &str, stops: Vec<Rgba>) -> RenderResult<Self> {
        if stops.len() < 2 {
            return Err(RenderError::InvalidColor(format!(
                "colormap '{}' needs at least two stops",
                name
            )));
        }
        Ok(Self {
            name: name.to_string(),
            stops,
        })
    }

    /// Color at position `t` (clamped to `[0, 1]`).
    pub fn sample(&self, t: f32) -> Rgba {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let scaled = t * (self.stops.len() - 1) as f32;
        let i = (scaled.floor() as usize).min(self.stops.len() - 2);
        let frac = scaled - i as f32;
        let (a, b) = (self.stops[i], self.stops[i + 1]);
        let mut out = [0u8; 4];
        for c in 0..4 {
            out[c] = (a[c] as f32 + (b[c] as f32 - a[c] as f32) * frac).round() as u8;
        }
        out
    }

    /// Color of `value` normalised to `[vmin, vmax]`.
    pub fn color_for_range(&self, value: f32, vmin: f32, vmax: f32) -> Rgba {
        if vmax > vmin {
            self.sample((value - vmin) / (vmax - vmin))
        } else {
            self.sample(0.5)
        }
    }

    /// Color of the band `value` falls into, for the filled-contour bands
    /// `[levels[i], levels[i + 1])`. The top level is included in the last
    /// band. Values outside the levels, and NaN, are not colored.
    pub fn color_for(&self, value: f32, levels: &[f32]) -> Option<Rgba> {
        let band = band_index(value, levels)?;
        let bands = levels.len() - 1;
        let t = if bands > 1 {
            band as f32 / (bands - 1) as f32
        } else {
            0.5
        };
        Some(self.sample(t))
    }

    pub fn reversed(&self) -> Self {
        let mut stops = self.stops.clone();
        stops.reverse();
        Self {
            name: format!("{}_r", self.name),
            stops,
        }
    }
}

/// Index of the band `[levels[i], levels[i + 1])` holding `value`.
pub fn band_index(value: f32, levels: &[f32]) -> Option<usize> {
    if levels.len() < 2 || value.is_nan() {
        return None;
    }
    let last = levels.len() - 1;
    if value < levels[0] || value > levels[last] {
        return None;
    }
    // levels are ascending; first level strictly above value ends the band
    let above = levels.partition_point(|l| *l <= value);
    Some(above.saturating_sub(1).min(last - 1))
}

/// Check that contour levels are finite and strictly ascending.
pub fn validate_levels(levels: &[f32]) -> RenderResult<()> {
    if levels.iter().any(|l| !l.is_finite()) {
        return Err(RenderError::InvalidLevels(
            "levels must be finite".to_string(),
        ));
    }
    if levels.windows(2).any(|w| w[1] <= w[0]) {
        return Err(RenderError::InvalidLevels(format!(
            "levels must be strictly ascending: {:?}",
            levels
        )));
    }
    Ok(())
}

/// `start, start + step, ...` up to and including `stop`.
pub fn level_range(start: f32, stop: f32, step: f32) -> Vec<f32> {
    if step <= 0.0 || stop < start {
        return vec![];
    }
    let count = ((stop - start) / step + 1e-4).floor() as usize + 1;
    (0..count).map(|i| start + i as f32 * step).collect()
}

/// Parse `#rrggbb` / `#rrggbbaa`.
pub fn parse_hex(hex: &str) -> RenderResult<Rgba> {
    let digits = hex.trim().trim_start_matches('#');
    let channel = |i: usize| {
        digits
            .get(i..i + 2)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .ok_or_else(|| RenderError::InvalidColor(hex.to_string()))
    };
    match digits.len() {
        6 => Ok([channel(0)?, channel(2)?, channel(4)?, 255]),
        8 => Ok([channel(0)?, channel(2)?, channel(4)?, channel(6)?]),
        _ => Err(RenderError::InvalidColor(hex.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#ff8000").unwrap(), [255, 128, 0, 255]);
        assert_eq!(parse_hex("00000080").unwrap(), [0, 0, 0, 128]);
        assert!(parse_hex("#fff").is_err());
        assert!(parse_hex("#gg0000").is_err());
    }

    #[test]
    fn test_sample_endpoints() {
        let cmap = Colormap::named("bwr").unwrap();
        assert_eq!(cmap.sample(0.0), [0, 0, 255, 255]);
        assert_eq!(cmap.sample(0.5), [255, 255, 255, 255]);
        assert_eq!(cmap.sample(1.0), [255, 0, 0, 255]);
        assert_eq!(cmap.sample(7.0), [255, 0, 0, 255]);
    }

    #[test]
    fn test_band_index() {
        let levels = [0.0, 10.0, 20.0, 30.0];
        assert_eq!(band_index(-1.0, &levels), None);
        assert_eq!(band_index(0.0, &levels), Some(0));
        assert_eq!(band_index(9.99, &levels), Some(0));
        assert_eq!(band_index(10.0, &levels), Some(1));
        assert_eq!(band_index(30.0, &levels), Some(2));
        assert_eq!(band_index(30.1, &levels), None);
        assert_eq!(band_index(f32::NAN, &levels), None);
    }

    #[test]
    fn test_color_for_spans_ramp() {
        let cmap = Colormap::named("viridis").unwrap();
        let levels = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(cmap.color_for(0.5, &levels), Some(cmap.sample(0.0)));
        assert_eq!(cmap.color_for(2.5, &levels), Some(cmap.sample(1.0)));
    }

    #[test]
    fn test_unknown_name() {
        assert!(matches!(
            Colormap::named("jet"),
            Err(RenderError::UnknownColormap(_))
        ));
        assert!(Colormap::named("RdBu_r").is_ok());
    }

    #[test]
    fn test_level_range() {
        assert_eq!(level_range(-4.0, 4.0, 2.0), vec![-4.0, -2.0, 0.0, 2.0, 4.0]);
        assert!(level_range(1.0, 0.0, 1.0).is_empty());
        assert!(validate_levels(&[1.0, 1.0]).is_err());
    }
}
