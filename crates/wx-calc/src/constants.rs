//! Physical constants.

/// Standard gravity (m s-2)
pub const GRAVITY: f64 = 9.80665;

/// Earth's angular velocity (rad s-1)
pub const EARTH_OMEGA: f64 = 7.292_115e-5;

/// Poisson constant for dry air, Rd / Cp
pub const KAPPA: f64 = 0.28571;

/// Reference pressure for potential temperature (hPa)
pub const P0_HPA: f64 = 1000.0;
