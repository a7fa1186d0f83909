use super::*;
use crate::geom::path::write_path_text;
use crate::geom::poly::Poly;

#[test]
fn closed_square_round_trips() {
    let path = BezPath::from_svg("M 0,0 L 10,0 L 10,10 L 0,10 Z").unwrap();
    let curve = from_path(&path);
    assert_eq!(curve.len(), 4);
    let back = to_path(&curve, 0.01);
    assert_eq!(
        write_path_text(&back),
        "M 0,0 L 10,0 L 10,10 L 0,10 L 0,0 Z"
    );
}

#[test]
fn cubic_is_exact() {
    let text = "M 0,0 C 10,20 30,-5 40,10";
    let curve = from_path(&BezPath::from_svg(text).unwrap());
    let back = to_path(&curve, 0.01);
    let PathSeg::Cubic(c) = back.segments().next().unwrap() else {
        panic!("expected a cubic");
    };
    assert!((c.p1 - Point::new(10.0, 20.0)).hypot() < 1e-9);
    assert!((c.p2 - Point::new(30.0, -5.0)).hypot() < 1e-9);
}

#[test]
fn discontinuity_starts_new_subpath() {
    let path = BezPath::from_svg("M 0,0 L 1,0 M 5,5 L 6,5").unwrap();
    let curve = from_path(&path);
    assert_eq!(curve.domain().unwrap().max, 2.0);
    let back = to_path(&curve, 0.01);
    assert_eq!(write_path_text(&back), "M 0,0 L 1,0 M 5,5 L 6,5");
}

#[test]
fn high_degree_fragment_is_approximated_within_tolerance() {
    // Quartic in x: x(u) = u^4 * 10, y(u) = u * 10.
    let seg = Curve2::new(
        Poly::from_coeffs(&[0.0, 0.0, 0.0, 0.0, 10.0]),
        Poly::linear(0.0, 10.0),
    );
    let curve = PiecewiseCurve::from_segment(seg.clone());
    let tol = 1e-3;
    let path = to_path(&curve, tol);
    assert!(path.segments().count() > 1);
    for s in path.segments() {
        let mid = kurbo::ParamCurve::eval(&s, 0.5);
        // Deviation from the true curve at the same y (y is linear in u).
        let u = mid.y / 10.0;
        assert!((mid.x - seg.eval(u).x).abs() < 10.0 * tol);
    }
}

#[test]
fn empty_curve_gives_empty_path() {
    assert!(to_path(&PiecewiseCurve::new(), 0.01).elements().is_empty());
    assert!(from_path(&BezPath::new()).is_empty());
}
