use super::*;
use std::f64::consts::{FRAC_PI_2, PI};

#[test]
fn triangle_containment_ignores_orientation() {
    let (a, b, c) = (Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(0.0, 10.0));
    assert!(point_in_triangle(Point::new(2.0, 2.0), a, b, c));
    assert!(point_in_triangle(Point::new(2.0, 2.0), a, c, b));
    assert!(point_in_triangle(Point::new(5.0, 0.0), a, b, c));
    assert!(!point_in_triangle(Point::new(8.0, 8.0), a, b, c));
}

#[test]
fn wedge_tests_cover_narrow_and_wide_sweeps() {
    let o = Point::ZERO;
    assert!(in_wedge(o, 0.0, FRAC_PI_2, Point::new(1.0, 1.0)));
    assert!(!in_wedge(o, 0.0, FRAC_PI_2, Point::new(-1.0, 1.0)));
    assert!(in_wedge(o, 0.0, 1.5 * PI, Point::new(-1.0, -1.0)));
    assert!(!in_wedge(o, 0.0, 1.5 * PI, Point::new(1.0, -1.0)));
    assert!(in_wedge(o, 0.0, 2.0 * PI, Point::new(1.0, -1.0)));
}

#[test]
fn line_crosses_ray_once() {
    let seg = PathSeg::Line(Line::new((5.0, -5.0), (5.0, 5.0)));
    let hits = ray_crossings(&seg, &Ray::from_angle(Point::ZERO, 0.0));
    assert_eq!(hits.len(), 1);
    assert!((hits[0] - 0.5).abs() < 1e-9);
    // The opposite ray does not reach it.
    assert!(ray_crossings(&seg, &Ray::from_angle(Point::ZERO, PI)).is_empty());
}

#[test]
fn clipping_keeps_inside_portion() {
    let seg = PathSeg::Line(Line::new((5.0, -5.0), (5.0, 5.0)));
    let parts = clip_to_wedge(&seg, Point::ZERO, 0.0, FRAC_PI_2);
    assert_eq!(parts.len(), 1);
    assert!((parts[0].0 - 0.5).abs() < 1e-9);
    assert!((parts[0].1 - 1.0).abs() < 1e-9);
}

fn polyline(points: &[(f64, f64)], closed: bool) -> PiecewiseCurve {
    let segs = points
        .windows(2)
        .map(|w| PathSeg::Line(Line::new(w[0], w[1])))
        .chain(closed.then(|| PathSeg::Line(Line::new(points[points.len() - 1], points[0]))))
        .collect();
    let sp = crate::geom::path::Subpath::from_segments(segs, closed).unwrap();
    crate::geom::convert::from_subpath(&sp)
}

#[test]
fn crossing_lines_meet_once() {
    let a = polyline(&[(0.0, 0.0), (10.0, 10.0)], false);
    let b = polyline(&[(0.0, 10.0), (10.0, 0.0)], false);
    let hits = curve_crossings(&a, &b, 0.01);
    assert_eq!(hits.len(), 1);
    let (ta, tb) = hits[0];
    assert!((ta - 0.5).abs() < 1e-6, "{ta}");
    assert!((tb - 0.5).abs() < 1e-6, "{tb}");
}

#[test]
fn figure_eight_crosses_itself_once() {
    let eight = polyline(&[(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)], true);
    let hits = self_crossings(&eight, true, 0.01);
    assert_eq!(hits.len(), 1, "{hits:?}");
    let (ta, tb) = hits[0];
    assert!(ta < tb);
    assert!((ta - 0.5).abs() < 1e-6, "{ta}");
    assert!((tb - 2.5).abs() < 1e-6, "{tb}");
}

#[test]
fn simple_loops_have_no_self_crossings() {
    let square = polyline(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)], true);
    assert!(self_crossings(&square, true, 0.01).is_empty());
    let open = polyline(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)], false);
    assert!(self_crossings(&open, false, 0.01).is_empty());
}

#[test]
fn cubic_loop_is_found_within_one_fragment() {
    let sp = crate::geom::path::Subpath::from_segments(
        vec![PathSeg::Cubic(kurbo::CubicBez::new(
            (0.0, 0.0),
            (30.0, 30.0),
            (-20.0, 30.0),
            (10.0, 0.0),
        ))],
        false,
    )
    .unwrap();
    let curve = crate::geom::convert::from_subpath(&sp);
    let hits = self_crossings(&curve, false, 0.01);
    assert_eq!(hits.len(), 1, "{hits:?}");
    let (ta, tb) = hits[0];
    let (pa, pb) = (curve.value_at(ta).unwrap(), curve.value_at(tb).unwrap());
    assert!((pa - pb).hypot() < 0.05);
}
