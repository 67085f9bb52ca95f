//! Behavioural tests for the earth-relative wind transform.

use projection::{earth_relative_wind_components, transform_vectors, WindError};
use test_utils::{assert_approx_eq, geographic_field, projected_field, regular_axis};
use wx_common::{GridCrs, Unit, VectorFrame};

fn grid_relative_pair() -> (wx_common::Field, wx_common::Field) {
    let u = projected_field("u-component_of_wind", Unit::MetersPerSecond, 9, 7, 250_000.0, |x, _| {
        10.0 + x * 1e-6
    })
    .with_vector_frame(VectorFrame::GridRelative);
    let v = projected_field("v-component_of_wind", Unit::MetersPerSecond, 9, 7, 250_000.0, |_, y| {
        -4.0 + y * 1e-6
    })
    .with_vector_frame(VectorFrame::GridRelative);
    (u, v)
}

#[test]
fn test_output_shape_and_axes_match_input() {
    let (u, v) = grid_relative_pair();
    let (ue, ve) = earth_relative_wind_components(&u, &v).unwrap();

    assert_eq!(ue.shape(), u.shape());
    assert_eq!(ve.shape(), v.shape());
    assert_eq!(ue.x, u.x);
    assert_eq!(ue.y, u.y);
    assert_eq!(ue.crs, u.crs);
}

#[test]
fn test_inputs_unmodified() {
    let (u, v) = grid_relative_pair();
    let (u_before, v_before) = (u.clone(), v.clone());
    let _ = earth_relative_wind_components(&u, &v).unwrap();

    assert_eq!(u, u_before);
    assert_eq!(v, v_before);
}

#[test]
fn test_deterministic() {
    let (u, v) = grid_relative_pair();
    let first = earth_relative_wind_components(&u, &v).unwrap();
    let second = earth_relative_wind_components(&u, &v).unwrap();

    assert_eq!(first.0.data(), second.0.data());
    assert_eq!(first.1.data(), second.1.data());
}

#[test]
fn test_speed_preserved() {
    let (u, v) = grid_relative_pair();
    let (ue, ve) = earth_relative_wind_components(&u, &v).unwrap();

    for n in 0..u.len() {
        let before = u.data()[n].hypot(v.data()[n]);
        let after = ue.data()[n].hypot(ve.data()[n]);
        assert_approx_eq!(before, after, 1e-4);
    }
}

#[test]
fn test_geographic_grid_is_identity() {
    let lons = regular_axis(5, -110.0, 5.0);
    let lats = regular_axis(4, 30.0, 5.0);
    let u = geographic_field("u", Unit::MetersPerSecond, lons.clone(), lats.clone(), |lon, _| {
        lon / 10.0
    })
    .with_vector_frame(VectorFrame::GridRelative);
    let v = geographic_field("v", Unit::MetersPerSecond, lons, lats, |_, lat| lat / 10.0)
        .with_vector_frame(VectorFrame::GridRelative);

    let (ue, ve) = earth_relative_wind_components(&u, &v).unwrap();
    for n in 0..u.len() {
        assert_approx_eq!(ue.data()[n], u.data()[n], 1e-5);
        assert_approx_eq!(ve.data()[n], v.data()[n], 1e-5);
    }
    assert_eq!(ue.vector_frame, VectorFrame::EarthRelative);
}

#[test]
fn test_misaligned_components_rejected() {
    let (u, _) = grid_relative_pair();
    let v = projected_field("v", Unit::MetersPerSecond, 8, 7, 250_000.0, |_, _| 1.0)
        .with_vector_frame(VectorFrame::GridRelative);

    let err = earth_relative_wind_components(&u, &v).unwrap_err();
    assert!(matches!(err, WindError::Misaligned(_)));
}

#[test]
fn test_missing_crs_on_second_component() {
    let (u, mut v) = grid_relative_pair();
    v.crs = None;

    match earth_relative_wind_components(&u, &v) {
        Err(WindError::MissingCrs(name)) => assert_eq!(name, "v-component_of_wind"),
        other => panic!("expected MissingCrs, got {:?}", other),
    }
}

#[test]
fn test_lambert_to_geographic_and_back() {
    let lambert = GridCrs::conus_lambert();
    let geo = GridCrs::geographic();
    let xs = [-1_200_000.0, 900_000.0];
    let ys = [-300_000.0, 700_000.0];

    let (ue, ve) = transform_vectors(&lambert, &geo, &xs, &ys, &[7.0, -3.0], &[2.0, 6.0]).unwrap();

    // Geographic coordinates of the same points, for the reverse transform
    let proj = projection::projection_for(&lambert);
    let (lons, lats): (Vec<f64>, Vec<f64>) = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| proj.inverse(*x, *y).unwrap())
        .unzip();

    let (ug, vg) = transform_vectors(&geo, &lambert, &lons, &lats, &ue, &ve).unwrap();
    assert_approx_eq!(ug[0], 7.0, 1e-4);
    assert_approx_eq!(vg[0], 2.0, 1e-4);
    assert_approx_eq!(ug[1], -3.0, 1e-4);
    assert_approx_eq!(vg[1], 6.0, 1e-4);
}
