//! Physical units carried by fields and point batches.
//!
//! Only the handful of units that meteorological grids actually arrive in
//! are modelled. Anything else is kept verbatim in [`Unit::Other`] so that
//! it can still be displayed, but it never converts.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{WxError, WxResult};

/// A physical unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    Kelvin,
    Celsius,
    MetersPerSecond,
    Knots,
    Pascal,
    Hectopascal,
    Meters,
    Decameters,
    /// Geopotential meters, numerically equal to meters for plotting purposes.
    GeopotentialMeters,
    Degrees,
    /// Frequency-like quantities such as vorticity and divergence.
    PerSecond,
    PerSecondSquared,
    KelvinPerSecond,
    /// SI potential vorticity (K m2 kg-1 s-1).
    PotentialVorticity,
    /// Potential vorticity units (1 PVU = 1e-6 K m2 kg-1 s-1).
    Pvu,
    Femtojoules,
    SquareKilometers,
    Dimensionless,
    Other(String),
}

/// The physical dimension a unit measures. Conversion is only defined
/// within a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dimension {
    Temperature,
    Speed,
    Pressure,
    Length,
    Angle,
    Frequency,
    FrequencyRate,
    TemperatureRate,
    PotentialVorticity,
    Energy,
    Area,
    None,
    Unknown,
}

impl Unit {
    /// Parse a CF/UDUNITS style unit string.
    pub fn parse(s: &str) -> Unit {
        let normalized = s.trim();
        match normalized {
            "K" | "kelvin" | "Kelvin" | "degK" => Unit::Kelvin,
            "degC" | "C" | "celsius" | "degree_Celsius" | "°C" => Unit::Celsius,
            "m/s" | "m s-1" | "m.s-1" | "m s**-1" | "meters/second" => Unit::MetersPerSecond,
            "kt" | "kts" | "knot" | "knots" => Unit::Knots,
            "Pa" | "pascal" | "Pascal" => Unit::Pascal,
            "hPa" | "mb" | "mbar" | "millibar" => Unit::Hectopascal,
            "m" | "meter" | "meters" | "metre" => Unit::Meters,
            "dam" | "decameter" | "decameters" => Unit::Decameters,
            "gpm" | "geopotential meters" | "m2 s-2 / 9.80665" => Unit::GeopotentialMeters,
            "degrees" | "degree" | "degrees_north" | "degrees_east" | "deg" => Unit::Degrees,
            "s-1" | "1/s" | "s**-1" | "/s" => Unit::PerSecond,
            "s-2" | "1/s^2" | "s**-2" | "1/s2" => Unit::PerSecondSquared,
            "K/s" | "K s-1" | "K s**-1" => Unit::KelvinPerSecond,
            "K m2 kg-1 s-1" | "K m**2 kg**-1 s**-1" | "K.m2.kg-1.s-1" => {
                Unit::PotentialVorticity
            }
            "PVU" | "pvu" => Unit::Pvu,
            "fJ" => Unit::Femtojoules,
            "km2" | "km^2" => Unit::SquareKilometers,
            "" | "1" | "dimensionless" | "count" => Unit::Dimensionless,
            other => Unit::Other(other.to_string()),
        }
    }

    /// Canonical short symbol.
    pub fn symbol(&self) -> &str {
        match self {
            Unit::Kelvin => "K",
            Unit::Celsius => "degC",
            Unit::MetersPerSecond => "m/s",
            Unit::Knots => "kt",
            Unit::Pascal => "Pa",
            Unit::Hectopascal => "hPa",
            Unit::Meters => "m",
            Unit::Decameters => "dam",
            Unit::GeopotentialMeters => "gpm",
            Unit::Degrees => "degrees",
            Unit::PerSecond => "1/s",
            Unit::PerSecondSquared => "1/s^2",
            Unit::KelvinPerSecond => "K/s",
            Unit::PotentialVorticity => "K m2 kg-1 s-1",
            Unit::Pvu => "PVU",
            Unit::Femtojoules => "fJ",
            Unit::SquareKilometers => "km2",
            Unit::Dimensionless => "1",
            Unit::Other(s) => s.as_str(),
        }
    }

    fn dimension(&self) -> Dimension {
        match self {
            Unit::Kelvin | Unit::Celsius => Dimension::Temperature,
            Unit::MetersPerSecond | Unit::Knots => Dimension::Speed,
            Unit::Pascal | Unit::Hectopascal => Dimension::Pressure,
            Unit::Meters | Unit::Decameters | Unit::GeopotentialMeters => Dimension::Length,
            Unit::Degrees => Dimension::Angle,
            Unit::PerSecond => Dimension::Frequency,
            Unit::PerSecondSquared => Dimension::FrequencyRate,
            Unit::KelvinPerSecond => Dimension::TemperatureRate,
            Unit::PotentialVorticity | Unit::Pvu => Dimension::PotentialVorticity,
            Unit::Femtojoules => Dimension::Energy,
            Unit::SquareKilometers => Dimension::Area,
            Unit::Dimensionless => Dimension::None,
            Unit::Other(_) => Dimension::Unknown,
        }
    }

    /// `(scale, offset)` such that `base = value * scale + offset`, where the
    /// base unit of each dimension is SI.
    fn to_base(&self) -> (f64, f64) {
        match self {
            Unit::Celsius => (1.0, 273.15),
            Unit::Knots => (1852.0 / 3600.0, 0.0),
            Unit::Hectopascal => (100.0, 0.0),
            Unit::Decameters => (10.0, 0.0),
            Unit::Pvu => (1e-6, 0.0),
            _ => (1.0, 0.0),
        }
    }

    /// True when values in `self` can be converted to `other`.
    pub fn is_compatible(&self, other: &Unit) -> bool {
        let dim = self.dimension();
        dim != Dimension::Unknown && dim == other.dimension()
    }

    /// Build a converter from `self` to `target`.
    pub fn converter(&self, target: &Unit) -> WxResult<UnitConverter> {
        if self == target {
            return Ok(UnitConverter {
                scale: 1.0,
                offset: 0.0,
            });
        }
        if !self.is_compatible(target) {
            return Err(WxError::UnitConversion {
                from: self.to_string(),
                to: target.to_string(),
            });
        }

        let (s_from, o_from) = self.to_base();
        let (s_to, o_to) = target.to_base();
        Ok(UnitConverter {
            scale: s_from / s_to,
            offset: (o_from - o_to) / s_to,
        })
    }

    /// Convert a single value.
    pub fn convert(&self, value: f64, target: &Unit) -> WxResult<f64> {
        Ok(self.converter(target)?.apply(value))
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A linear (affine) unit conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConverter {
    scale: f64,
    offset: f64,
}

impl UnitConverter {
    pub fn apply(&self, value: f64) -> f64 {
        value * self.scale + self.offset
    }

    pub fn apply_f32(&self, value: f32) -> f32 {
        (value as f64 * self.scale + self.offset) as f32
    }

    pub fn is_identity(&self) -> bool {
        self.scale == 1.0 && self.offset == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cf_spellings() {
        assert_eq!(Unit::parse("m s-1"), Unit::MetersPerSecond);
        assert_eq!(Unit::parse("m/s"), Unit::MetersPerSecond);
        assert_eq!(Unit::parse("hPa"), Unit::Hectopascal);
        assert_eq!(Unit::parse("gpm"), Unit::GeopotentialMeters);
        assert_eq!(Unit::parse("K m2 kg-1 s-1"), Unit::PotentialVorticity);
        assert_eq!(Unit::parse("furlongs"), Unit::Other("furlongs".to_string()));
    }

    #[test]
    fn test_temperature_conversion() {
        let c = Unit::Kelvin.convert(273.15, &Unit::Celsius).unwrap();
        assert!(c.abs() < 1e-9);
        let k = Unit::Celsius.convert(25.0, &Unit::Kelvin).unwrap();
        assert!((k - 298.15).abs() < 1e-9);
    }

    #[test]
    fn test_speed_and_pressure_conversion() {
        let kt = Unit::MetersPerSecond.convert(10.0, &Unit::Knots).unwrap();
        assert!((kt - 19.438_445).abs() < 1e-4);
        let pa = Unit::Hectopascal.convert(500.0, &Unit::Pascal).unwrap();
        assert_eq!(pa, 50000.0);
        let pvu = Unit::PotentialVorticity.convert(2e-6, &Unit::Pvu).unwrap();
        assert!((pvu - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_incompatible_units_fail() {
        assert!(Unit::Kelvin.convert(1.0, &Unit::Pascal).is_err());
        let other = Unit::Other("x".to_string());
        assert!(other.convert(1.0, &Unit::Other("y".to_string())).is_err());
        // Identical unknown units still convert trivially.
        assert_eq!(other.convert(3.0, &other).unwrap(), 3.0);
    }
}
