use super::*;
use crate::geom::convert::{from_path, to_path};
use crate::geom::path::subpaths;
use kurbo::{BezPath, Point, Rect, Shape};

fn ctx() -> EffectContext {
    EffectContext::new(Rect::new(0.0, 0.0, 200.0, 0.0))
}

fn line() -> PiecewiseCurve {
    let mut path = BezPath::new();
    path.move_to((0.0, 0.0));
    path.line_to((200.0, 0.0));
    from_path(&path)
}

fn untapered() -> DynaStroke {
    let mut e = DynaStroke::new();
    e.growfor.set(0.0);
    e.fadefor.set(0.0);
    e
}

fn outline(e: &mut DynaStroke, curve: &PiecewiseCurve) -> BezPath {
    let out = e.do_effect_pwd2(curve, &ctx()).unwrap();
    to_path(&out, 0.01)
}

#[test]
fn round_pen_gives_constant_width() {
    let mut e = untapered();
    e.roundness.set(1.0);
    let b = outline(&mut e, &line()).bounding_box();
    assert!((b.y0 + 12.5).abs() < 1e-6 && (b.y1 - 12.5).abs() < 1e-6, "{b:?}");
    assert!(b.x0.abs() < 1e-6 && (b.x1 - 200.0).abs() < 1e-6, "{b:?}");
}

#[test]
fn flat_elliptic_pen_along_the_stroke_is_thin() {
    let mut e = untapered();
    e.angle.set(0.0);
    let b = outline(&mut e, &line()).bounding_box();
    assert!((b.height() - 5.0).abs() < 1e-6, "{b:?}");
}

#[test]
fn thick_thin_nib_across_the_stroke_is_widest() {
    let mut e = untapered();
    e.method.set(DynaStrokeMethod::ThickThin);
    e.angle.set(90.0);
    let b = outline(&mut e, &line()).bounding_box();
    assert!((b.height() - 25.0).abs() < 1e-6, "{b:?}");
}

#[test]
fn tapered_ends_start_at_the_centerline() {
    let mut e = DynaStroke::new();
    e.roundness.set(1.0);
    let out = e.do_effect_pwd2(&line(), &ctx()).unwrap();
    let start = out.first_value().unwrap();
    assert!(start.distance(Point::new(0.0, 0.0)) < 1e-6);
    let b = to_path(&out, 0.01).bounding_box();
    assert!((b.y1 - 12.5).abs() < 0.05, "{b:?}");
}

#[test]
fn zero_width_stays_finite() {
    let mut e = untapered();
    e.width.set(0.0);
    let out = e.do_effect_pwd2(&line(), &ctx()).unwrap();
    let path = to_path(&out, 0.01);
    let b = path.bounding_box();
    assert!(b.height() < 1e-3 && b.x1.is_finite());
    assert!(path.area().abs() < 1e-2);
}

#[test]
fn round_ends_bulge_past_the_centerline() {
    let mut e = untapered();
    e.roundness.set(1.0);
    e.round_ends.set(true);
    let b = outline(&mut e, &line()).bounding_box();
    assert!((b.x1 - 212.5).abs() < 0.05 && (b.x0 + 12.5).abs() < 0.05, "{b:?}");
}

#[test]
fn closed_input_gives_two_outlines() {
    let circle = kurbo::Circle::new((0.0, 0.0), 50.0).to_path(1e-3);
    let mut e = untapered();
    e.roundness.set(1.0);
    let out = outline(&mut e, &from_path(&circle));
    assert_eq!(subpaths(&out).len(), 2);
}

#[test]
fn taper_shapes_reach_full_width() {
    for cap in DynaStrokeCap::ALL {
        assert_eq!(cap.ramp(0.0), 0.0);
        assert!((cap.ramp(1.0) - 1.0).abs() < 1e-12);
        assert!(cap.ramp(0.5) > 0.0 && cap.ramp(0.5) < 1.0);
    }
}
