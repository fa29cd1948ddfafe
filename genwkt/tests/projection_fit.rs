mod common;

use genwkt::surveying::projection_fit::{estimate_projection, EstimatorOptions};
use genwkt::{CoordinateConverter, GeoError};

#[test]
fn fixture_recovers_msk_projection() {
    let converter = CoordinateConverter::new();
    let truth = common::msk_projection();
    let fit = estimate_projection(
        &converter,
        &common::wgs84_points(),
        &common::msk_points(),
        &EstimatorOptions::default(),
    )
    .unwrap();
    let def = fit.definition;
    assert!(fit.converged);
    assert!((def.central_meridian - truth.central_meridian).abs() < 1e-4);
    assert!((def.false_easting - truth.false_easting).abs() < 10.0);
    assert!((def.false_northing - truth.false_northing).abs() < 10.0);
    assert_eq!(def.scale_factor, 1.0);
    assert_eq!(def.latitude_of_origin, 0.0);
}

#[test]
fn free_scale_stays_near_unity() {
    let converter = CoordinateConverter::new();
    let options = EstimatorOptions {
        fixed_scale: false,
        ..EstimatorOptions::default()
    };
    let fixed = estimate_projection(
        &converter,
        &common::wgs84_points(),
        &common::msk_points(),
        &EstimatorOptions::default(),
    )
    .unwrap();
    let free = estimate_projection(
        &converter,
        &common::wgs84_points(),
        &common::msk_points(),
        &options,
    )
    .unwrap();
    assert!((free.definition.scale_factor - 1.0).abs() < 1e-3);
    assert!(free.cost <= fixed.cost * (1.0 + 1e-6) + 1e-9);
}

#[test]
fn exactly_three_points_work() {
    let converter = CoordinateConverter::new();
    let wgs = common::wgs84_points();
    let msk = common::msk_points();
    assert!(estimate_projection(&converter, &wgs[..3], &msk[..3], &EstimatorOptions::default()).is_ok());
    assert!(matches!(
        estimate_projection(&converter, &wgs[..2], &msk[..2], &EstimatorOptions::default()),
        Err(GeoError::InsufficientData { .. })
    ));
}

#[test]
fn iteration_cap_is_reported_not_fatal() {
    let converter = CoordinateConverter::new();
    let options = EstimatorOptions {
        max_iterations: 5,
        ..EstimatorOptions::default()
    };
    let fit = estimate_projection(
        &converter,
        &common::wgs84_points(),
        &common::msk_points(),
        &options,
    )
    .unwrap();
    assert!(!fit.converged);
    assert_eq!(fit.iterations, 5);
}
