use super::*;
use crate::geom::path::last_point;
use kurbo::Rect;

fn ctx() -> EffectContext {
    EffectContext::new(Rect::new(0.0, 0.0, 10.0, 10.0))
}

fn line() -> BezPath {
    let mut path = BezPath::new();
    path.move_to((0.0, 0.0));
    path.line_to((10.0, 0.0));
    path
}

#[test]
fn handle_on_normal_side_offsets_positively() {
    let mut e = Offset::new();
    e.set_handle_position(&HandleTarget::Param(OFFSET_PT), Point::new(5.0, 3.0), Modifiers::NONE);
    let out = e.do_effect_path(&line(), &ctx()).unwrap();
    assert!((e.distance() - 3.0).abs() < 1e-9);
    assert!(first_point(&out).unwrap().distance(Point::new(0.0, 3.0)) < 1e-6);
    assert!(last_point(&out).unwrap().distance(Point::new(10.0, 3.0)) < 1e-6);
}

#[test]
fn opposite_side_is_negative() {
    let mut e = Offset::new();
    e.set_handle_position(&HandleTarget::Param(OFFSET_PT), Point::new(2.0, -4.0), Modifiers::NONE);
    let out = e.do_effect_path(&line(), &ctx()).unwrap();
    assert!((e.distance() + 4.0).abs() < 1e-9);
    assert!(first_point(&out).unwrap().distance(Point::new(0.0, -4.0)) < 1e-6);
}

#[test]
fn on_apply_puts_the_handle_on_the_path() {
    let mut e = Offset::new();
    e.on_apply(&line(), &ctx());
    assert_eq!(e.handle_position(&HandleTarget::Param(OFFSET_PT)), Some(Point::ZERO));
    assert_eq!(e.do_effect_path(&line(), &ctx()).unwrap(), line());
}

#[test]
fn corners_are_bridged_into_one_subpath() {
    let mut path = line();
    path.line_to((10.0, 10.0));
    let mut e = Offset::new();
    e.set_handle_position(&HandleTarget::Param(OFFSET_PT), Point::new(5.0, 1.0), Modifiers::NONE);
    let out = e.do_effect_path(&path, &ctx()).unwrap();
    assert_eq!(subpaths(&out).len(), 1);
}
