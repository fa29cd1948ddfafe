use genwkt::geometry::{CartesianPoint, Frame};
use genwkt::surveying::helmert::{apply_helmert, calculate_helmert, solve_helmert};
use genwkt::{CoordinateConverter, GeoError, HelmertParameters};

/// Non-collinear points about 50 km apart, rounded to half metres so that
/// integer shifts are exact.
fn control_points() -> Vec<CartesianPoint> {
    let converter = CoordinateConverter::new();
    [
        (55.6, 28.4, 120.0),
        (56.1, 28.6, 180.0),
        (55.9, 29.3, 90.0),
        (55.5, 29.1, 150.0),
        (55.8, 28.9, 300.0),
    ]
    .iter()
    .map(|(lat, lon, h)| {
        let p = converter.wgs84_to_geocentric(*lat, *lon, *h).unwrap();
        let r = |v: f64| (v * 2.0).round() / 2.0;
        CartesianPoint::new(r(p.x), r(p.y), r(p.z), Frame::Wgs84)
    })
    .collect()
}

fn shifted(points: &[CartesianPoint], dx: f64, dy: f64, dz: f64) -> Vec<CartesianPoint> {
    points
        .iter()
        .map(|p| CartesianPoint::new(p.x + dx, p.y + dy, p.z + dz, Frame::Krassovsky))
        .collect()
}

#[test]
fn identity() {
    let pts = control_points();
    let p = calculate_helmert(&pts, &pts).unwrap();
    for v in p.to_array() {
        assert!(v.abs() < 1e-6, "{:?}", p);
    }
}

#[test]
fn pure_translation() {
    let src = control_points();
    let dst = shifted(&src, 10.0, 20.0, 30.0);
    let p = calculate_helmert(&src, &dst).unwrap();
    assert!((p.tx - 10.0).abs() < 1e-4);
    assert!((p.ty - 20.0).abs() < 1e-4);
    assert!((p.tz - 30.0).abs() < 1e-4);
    assert!(p.rx.abs() < 1e-5 && p.ry.abs() < 1e-5 && p.rz.abs() < 1e-5);
    assert!(p.scale_ppm.abs() < 1e-5);
}

#[test]
fn recovers_rotation_and_scale() {
    let truth = HelmertParameters::from_array([23.9, -141.3, -80.9, 0.35, -0.82, -0.12, -0.12]);
    let src = control_points();
    let dst = apply_helmert(&src, &truth);
    let solution = solve_helmert(&src, &dst).unwrap();
    let p = solution.parameters;
    assert_eq!(solution.rank, 7);
    assert!(solution.rms < 1e-6);
    assert!((p.tx - truth.tx).abs() < 1e-2);
    assert!((p.ty - truth.ty).abs() < 1e-2);
    assert!((p.tz - truth.tz).abs() < 1e-2);
    assert!((p.rx - truth.rx).abs() < 1e-3);
    assert!((p.ry - truth.ry).abs() < 1e-3);
    assert!((p.rz - truth.rz).abs() < 1e-3);
    assert!((p.scale_ppm - truth.scale_ppm).abs() < 1e-3);
}

#[test]
fn apply_reproduces_target() {
    let src = control_points();
    let dst = shifted(&src, -5.0, 7.5, 12.0);
    let p = calculate_helmert(&src, &dst).unwrap();
    let moved = apply_helmert(&src, &p);
    for (m, t) in moved.iter().zip(&dst) {
        assert_eq!(m.frame, Frame::Krassovsky);
        assert!(m.distance(t) < 1e-6);
    }
}

#[test]
fn three_points_suffice_two_do_not() {
    let src = control_points();
    let dst = shifted(&src, 1.0, 2.0, 3.0);
    assert!(calculate_helmert(&src[..3], &dst[..3]).is_ok());
    assert!(matches!(
        calculate_helmert(&src[..2], &dst[..2]),
        Err(GeoError::InsufficientData { required: 3, actual: 2 })
    ));
}

#[test]
fn mismatched_lists_are_rejected() {
    let src = control_points();
    assert!(matches!(
        calculate_helmert(&src, &src[..4]),
        Err(GeoError::Validation(_))
    ));
}

#[test]
fn collinear_points_report_rank_deficiency() {
    let base = CartesianPoint::new(3_150_000.0, 1_730_000.0, 5_260_000.0, Frame::Wgs84);
    let src: Vec<CartesianPoint> = (0..4)
        .map(|i| {
            let t = i as f64 * 1000.0;
            CartesianPoint::new(base.x + t, base.y + 2.0 * t, base.z - t, Frame::Wgs84)
        })
        .collect();
    let dst = shifted(&src, 1.0, 1.0, 1.0);
    let solution = solve_helmert(&src, &dst).unwrap();
    assert!(solution.rank < 7);
    assert!(solution.is_degenerate());
    assert!(solution.rms < 1e-6);
}
