use super::*;
use kurbo::{Rect, Shape};

fn ctx() -> EffectContext {
    EffectContext::new(Rect::new(0.0, 0.0, 100.0, 100.0))
}

fn square() -> BezPath {
    let mut path = BezPath::new();
    path.move_to((0.0, 0.0));
    path.line_to((100.0, 0.0));
    path.line_to((100.0, 100.0));
    path.line_to((0.0, 100.0));
    path.close_path();
    path
}

fn corner() -> BezPath {
    let mut path = BezPath::new();
    path.move_to((0.0, 0.0));
    path.line_to((100.0, 0.0));
    path.line_to((100.0, 100.0));
    path
}

fn applied(input: &BezPath, radius: f64) -> FilletChamfer {
    let mut e = FilletChamfer::new();
    e.radius.set(radius);
    e.on_apply(input, &ctx());
    e
}

fn run(e: &mut FilletChamfer, input: &BezPath) -> BezPath {
    e.before_effect(input, &ctx());
    e.do_effect_path(input, &ctx()).unwrap()
}

fn set_all_kinds(e: &mut FilletChamfer, kind: f64) {
    let entries: Vec<Point> = e.values.points().iter().map(|p| Point::new(p.x, kind)).collect();
    e.values.set_points(entries);
}

#[test]
fn on_apply_marks_cusps_as_fillets() {
    let e = applied(&square(), 0.0);
    assert_eq!(e.values.points(), &[Point::new(0.0, 1.0); 4]);
    let open = applied(&corner(), 0.0);
    assert_eq!(open.values.points(), &[Point::new(0.0, 0.0), Point::new(0.0, 1.0)]);
}

#[test]
fn fillets_round_every_corner() {
    let mut e = applied(&square(), 10.0);
    let out = run(&mut e, &square());
    let expected = 10_000.0 - 4.0 * (100.0 - std::f64::consts::PI * 25.0);
    assert!((out.area().abs() - expected).abs() < 0.5, "{}", out.area());
    let PathEl::MoveTo(start) = out.elements()[0] else {
        panic!("expected a move");
    };
    assert!(start.distance(Point::new(10.0, 0.0)) < 1e-6);
    let b = out.bounding_box();
    assert!((b.width() - 100.0).abs() < 1e-6 && (b.height() - 100.0).abs() < 1e-6);
}

#[test]
fn chamfers_cut_straight_across() {
    let mut e = applied(&square(), 10.0);
    set_all_kinds(&mut e, 3.0);
    let out = run(&mut e, &square());
    assert!((out.area().abs() - 9_800.0).abs() < 1e-6, "{}", out.area());
}

#[test]
fn inverse_fillets_bite_into_the_corner() {
    let mut e = applied(&square(), 10.0);
    set_all_kinds(&mut e, 2.0);
    let out = run(&mut e, &square());
    let expected = 10_000.0 - 4.0 * (50.0 + 25.0 * (std::f64::consts::PI - 2.0));
    assert!((out.area().abs() - expected).abs() < 0.5, "{}", out.area());
}

#[test]
fn bezier_method_uses_circle_handles() {
    let mut e = applied(&corner(), 10.0);
    e.method.set(FilletMethod::Bezier);
    let out = run(&mut e, &corner());
    let handle = out.elements().iter().find_map(|el| match el {
        PathEl::CurveTo(p1, _, _) => Some(*p1),
        _ => None,
    });
    let handle = handle.unwrap();
    assert!(handle.distance(Point::new(90.0 + 10.0 * KAPPA, 0.0)) < 1e-9);
}

#[test]
fn open_ends_and_smooth_nodes_are_left_alone() {
    let mut e = applied(&corner(), 10.0);
    let out = run(&mut e, &corner());
    assert!(matches!(out.elements()[0], PathEl::MoveTo(p) if p == Point::ZERO));
    assert!(matches!(
        out.elements().last(),
        Some(PathEl::LineTo(p)) if *p == Point::new(100.0, 100.0)
    ));

    set_all_kinds(&mut e, 0.0);
    let out = run(&mut e, &corner());
    assert_eq!(out, corner());
}

#[test]
fn flexible_radius_is_a_fraction_of_the_allowed_cut() {
    let mut e = applied(&corner(), 1.0);
    e.flexible.set(true);
    let out = run(&mut e, &corner());
    let PathEl::LineTo(a) = out.elements()[1] else {
        panic!("expected a line: {:?}", out.elements());
    };
    assert!(a.distance(Point::new(50.0, 0.0)) < 1e-6);
}

#[test]
fn zero_radius_entries_can_opt_out_of_the_default() {
    let mut e = applied(&square(), 10.0);
    e.ignore_radius_0.set(true);
    let out = run(&mut e, &square());
    assert!((out.area().abs() - 10_000.0).abs() < 1e-6);
}

#[test]
fn entries_follow_the_node_count() {
    let mut e = applied(&corner(), 10.0);
    let mut longer = corner();
    longer.line_to((0.0, 100.0));
    run(&mut e, &longer);
    assert_eq!(e.values.len(), 3);
    assert_eq!(e.values.get(2), Some(Point::new(0.0, 1.0)));
    run(&mut e, &corner());
    assert_eq!(e.values.len(), 2);
}

#[test]
fn knot_handles_set_the_radius_and_cycle_the_type() {
    let mut e = applied(&square(), 10.0);
    run(&mut e, &square());
    let target = HandleTarget::Entry { key: VALUES, index: 0 };
    let p = e.handle_position(&target).unwrap();
    assert!(p.distance(Point::new(10.0, 0.0)) < 1e-6);

    assert!(e.set_handle_position(&target, Point::new(20.0, 5.0), Modifiers::NONE));
    assert!((e.values.get(0).unwrap().x - 20.0).abs() < 1e-6);

    let shift = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };
    e.set_handle_position(&target, Point::ZERO, shift);
    assert_eq!(e.values.get(0).unwrap().y, 2.0);
    e.set_handle_position(&target, Point::ZERO, shift);
    assert_eq!(e.values.get(0).unwrap().y, 3.0);
    e.set_handle_position(&target, Point::ZERO, shift);
    assert_eq!(e.values.get(0).unwrap().y, 1.0);

    e.hide_knots.set(true);
    assert!(e.handle_targets().is_empty());
}
