use super::*;
use kurbo::Rect;

fn ctx() -> EffectContext {
    EffectContext::new(Rect::new(0.0, 0.0, 100.0, 100.0))
}

fn polyline(points: &[(f64, f64)]) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(points[0]);
    for p in &points[1..] {
        path.line_to(*p);
    }
    path
}

fn ends(path: &BezPath) -> (Point, Point) {
    let sp = &subpaths(path)[0];
    (sp.start, sp.end())
}

#[test]
fn perpendicular_bisector_crosses_the_midpoint() {
    let mut e = PerpBisector::new();
    let out = e
        .do_effect_path(&polyline(&[(0.0, 0.0), (5.0, 3.0), (10.0, 0.0)]), &ctx())
        .unwrap();
    let (d, c) = ends(&out);
    assert!((d - Point::new(5.0, -200.0)).hypot() < 1e-9);
    assert!((c - Point::new(5.0, 200.0)).hypot() < 1e-9);
}

#[test]
fn dragging_an_end_sets_its_length() {
    let mut e = PerpBisector::new();
    e.do_effect_path(&polyline(&[(0.0, 0.0), (10.0, 0.0)]), &ctx())
        .unwrap();
    assert!(e.set_handle_position(
        &HandleTarget::Param(RIGHT),
        Point::new(7.0, 40.0),
        Modifiers::NONE
    ));
    assert_eq!(e.length_right.value(), 40.0);
    assert!(e.set_handle_position(
        &HandleTarget::Param(LEFT),
        Point::new(5.0, -12.0),
        Modifiers::NONE
    ));
    assert_eq!(e.length_left.value(), 12.0);
    let p = e.handle_position(&HandleTarget::Param(LEFT)).unwrap();
    assert!((p - Point::new(5.0, -12.0)).hypot() < 1e-9);
}

#[test]
fn handles_need_a_computed_axis() {
    let mut e = AngleBisector::new();
    assert!(e.handle_position(&HandleTarget::Param(RIGHT)).is_none());
    assert!(!e.set_handle_position(&HandleTarget::Param(RIGHT), Point::ZERO, Modifiers::NONE));
}

#[test]
fn angle_bisector_of_a_right_angle() {
    let mut e = AngleBisector::new();
    let out = e
        .do_effect_path(&polyline(&[(10.0, 0.0), (0.0, 0.0), (0.0, 10.0)]), &ctx())
        .unwrap();
    let (start, end) = ends(&out);
    assert!(start.distance(Point::ZERO) < 1e-9);
    let h = 250.0 / 2f64.sqrt();
    assert!((end - Point::new(h, h)).hypot() < 1e-9);
}

#[test]
fn angle_bisector_needs_three_nodes() {
    let mut e = AngleBisector::new();
    let err = e
        .do_effect_path(&polyline(&[(0.0, 0.0), (1.0, 0.0)]), &ctx())
        .unwrap_err();
    assert!(err.is_degenerate());
}
