//! Potential temperature, potential vorticity and isosurface tests.

use test_utils::{assert_approx_eq, isobaric_field, temperature_profile, uniform_flow};
use wx_calc::constants::GRAVITY;
use wx_calc::{
    coriolis_parameter, interpolate_to_isosurface, potential_temperature,
    potential_vorticity_baroclinic, smooth_gaussian, CalcError,
};
use wx_common::{Field, Unit, VectorFrame};

const LEVELS: [f64; 5] = [1000.0, 800.0, 600.0, 400.0, 200.0];
const SPACING: f64 = 200_000.0;

fn theta_linear() -> Field {
    // θ = 300 + 0.1 K/hPa * (1000 - p)
    isobaric_field("theta", Unit::Kelvin, &LEVELS, 5, 5, SPACING, |p, _, _| {
        300.0 + 0.1 * (1000.0 - p)
    })
}

fn wind_3d(value: f64, name: &str) -> Field {
    isobaric_field(name, Unit::MetersPerSecond, &LEVELS, 5, 5, SPACING, |_, _, _| value)
        .with_vector_frame(VectorFrame::GridRelative)
}

#[test]
fn test_theta_at_1000_hpa_equals_temperature() {
    let t = isobaric_field("t", Unit::Kelvin, &LEVELS, 3, 3, SPACING, |p, _, _| {
        temperature_profile(p)
    });
    let theta = potential_temperature(&t).unwrap();

    assert_eq!(theta.units, Unit::Kelvin);
    assert_eq!(theta.value(0, 1, 1), t.value(0, 1, 1));
    assert!(theta.value(4, 1, 1).unwrap() > t.value(4, 1, 1).unwrap());
}

#[test]
fn test_theta_from_celsius() {
    let t = isobaric_field("t", Unit::Celsius, &LEVELS, 3, 3, SPACING, |_, _, _| 15.0);
    let theta = potential_temperature(&t).unwrap();
    assert_approx_eq!(theta.value(0, 0, 0).unwrap(), 288.15, 1e-3);
}

#[test]
fn test_theta_requires_levels() {
    let t = Field::new("t", Unit::Kelvin, vec![0.0, 1.0], vec![0.0], vec![280.0, 281.0]).unwrap();
    assert!(matches!(
        potential_temperature(&t),
        Err(CalcError::MissingLevels(_))
    ));
}

#[test]
fn test_barotropic_pv_is_stability_times_coriolis() {
    let theta = theta_linear();
    let u = wind_3d(10.0, "u");
    let v = wind_3d(0.0, "v");

    let pv = potential_vorticity_baroclinic(&theta, &u, &v).unwrap();
    assert_eq!(pv.units, Unit::PotentialVorticity);

    // Centre node sits on the projection origin at 38.5N; dθ/dp = -1e-3 K/Pa
    let f = coriolis_parameter(38.5);
    let expected = GRAVITY * f * 1e-3;
    for k in 0..LEVELS.len() {
        let got = pv.value(k, 2, 2).unwrap() as f64;
        assert!(
            (got - expected).abs() < expected * 1e-4,
            "level {}: {} vs {}",
            k,
            got,
            expected
        );
    }
}

#[test]
fn test_pv_requires_three_levels() {
    let levels = [1000.0, 500.0];
    let theta = isobaric_field("theta", Unit::Kelvin, &levels, 4, 4, SPACING, |p, _, _| 300.0 - p / 100.0);
    let u = isobaric_field("u", Unit::MetersPerSecond, &levels, 4, 4, SPACING, |_, _, _| 1.0);
    let v = u.clone();
    assert!(matches!(
        potential_vorticity_baroclinic(&theta, &u, &v),
        Err(CalcError::InvalidArgument(_))
    ));
}

#[test]
fn test_isosurface_crossing_is_linear() {
    // PV-like: 0 PVU at 1000 hPa, 1 PVU per 200 hPa
    let pv = isobaric_field("pv", Unit::Pvu, &LEVELS, 4, 3, SPACING, |p, _, _| {
        (1000.0 - p) / 200.0
    });
    let theta = isobaric_field("theta", Unit::Kelvin, &LEVELS, 4, 3, SPACING, |p, _, _| {
        300.0 + 0.1 * (1000.0 - p)
    });

    let surface = interpolate_to_isosurface(&pv, &theta, 1.5, true).unwrap();
    assert_eq!(surface.shape(), (1, 3, 4));
    assert!(surface.levels.is_none());
    assert_eq!(surface.units, Unit::Kelvin);
    for value in surface.data() {
        // 1.5 PVU lies halfway between 800 hPa (320 K) and 600 hPa (340 K)
        assert_approx_eq!(*value, 330.0, 1e-4);
    }
}

#[test]
fn test_isosurface_top_down_finds_upper_crossing() {
    // Non-monotonic column: crosses 1.0 twice
    let pv = isobaric_field("pv", Unit::Pvu, &LEVELS, 2, 2, SPACING, |p, _, _| match p as i64 {
        1000 => 0.0,
        800 => 2.0,
        600 => 0.0,
        400 => 0.0,
        _ => 2.0,
    });
    let height = isobaric_field("z", Unit::Meters, &LEVELS, 2, 2, SPACING, |p, _, _| {
        (1000.0 - p) * 10.0
    });

    let bottom = interpolate_to_isosurface(&pv, &height, 1.0, true).unwrap();
    let top = interpolate_to_isosurface(&pv, &height, 1.0, false).unwrap();
    assert_approx_eq!(bottom.data()[0], 1000.0, 1e-3);
    assert_approx_eq!(top.data()[0], 7000.0, 1e-3);
}

#[test]
fn test_isosurface_without_crossing_is_nan() {
    let theta = theta_linear();
    let surface = interpolate_to_isosurface(&theta, &theta, 1.0e6, true).unwrap();
    assert!(surface.data().iter().all(|v| v.is_nan()));
}

#[test]
fn test_smoothing_3d_acts_per_level() {
    let theta = theta_linear();
    let smoothed = smooth_gaussian(&theta, 8).unwrap();
    for k in 0..theta.nlev() {
        let a = theta.level_slice(k);
        let b = smoothed.level_slice(k);
        for (x, y) in a.iter().zip(b) {
            assert_approx_eq!(*x, *y, 1e-3);
        }
    }
}

#[test]
fn test_uniform_flow_helpers_are_2d() {
    let (u, _) = uniform_flow(3, 3, SPACING, 1.0, 1.0);
    assert_eq!(u.nlev(), 1);
}
