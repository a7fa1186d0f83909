use super::*;
use crate::geom::path::{first_point, last_point};
use kurbo::{Rect, Shape};

fn ctx() -> EffectContext {
    EffectContext::new(Rect::new(0.0, 0.0, 90.0, 100.0))
}

fn midline() -> BezPath {
    chord(Point::new(0.0, 50.0), Point::new(90.0, 50.0))
}

fn applied() -> VonKoch {
    let mut e = VonKoch::new();
    e.on_apply(&midline(), &ctx());
    e.drawall.set(false);
    e
}

#[test]
fn on_apply_spans_the_bounding_box_midline() {
    let e = applied();
    assert_eq!(e.ref_path.get(), &midline());
    assert_eq!(subpaths(e.generator.get()).len(), 4);
}

#[test]
fn one_generation_on_the_reference_is_the_generator() {
    let mut e = applied();
    let out = e.do_effect_path(&midline(), &ctx()).unwrap();
    assert_eq!(subpaths(&out).len(), 4);
    assert!(first_point(&out).unwrap().distance(Point::new(0.0, 50.0)) < 1e-9);
    assert!(last_point(&out).unwrap().distance(Point::new(90.0, 50.0)) < 1e-9);
    let b = out.bounding_box();
    assert!((b.y1 - (50.0 + 90.0 * 3f64.sqrt() / 6.0)).abs() < 1e-9, "{b:?}");
}

#[test]
fn generations_multiply_the_copies() {
    let mut e = applied();
    e.nbgenerations.set(2.0);
    let out = e.do_effect_path(&midline(), &ctx()).unwrap();
    assert_eq!(subpaths(&out).len(), 16);

    e.drawall.set(true);
    let out = e.do_effect_path(&midline(), &ctx()).unwrap();
    assert_eq!(subpaths(&out).len(), 1 + 4 + 16);
}

#[test]
fn complexity_caps_the_generation_count() {
    let mut e = applied();
    e.nbgenerations.set(3.0);
    e.max_complexity.set(10.0);
    let out = e.do_effect_path(&midline(), &ctx()).unwrap();
    assert_eq!(subpaths(&out).len(), 4);

    e.max_complexity.set(0.0);
    let out = e.do_effect_path(&midline(), &ctx()).unwrap();
    assert_eq!(out, midline());
}

#[test]
fn bent_generator_shears_unless_similar_only() {
    let mut e = VonKoch::new();
    e.drawall.set(false);
    e.ref_path.set(chord(Point::ZERO, Point::new(10.0, 0.0)));
    let mut generator = BezPath::new();
    generator.move_to((0.0, 0.0));
    generator.line_to((5.0, 10.0));
    generator.line_to((10.0, 0.0));
    e.generator.set(generator);
    let probe = chord(Point::new(0.0, 5.0), Point::new(0.0, 5.0 + 1e-3));

    let out = e.do_effect_path(&probe, &ctx()).unwrap();
    assert!(first_point(&out).unwrap().distance(Point::new(2.5, 5.0)) < 1e-9);

    e.similar_only.set(true);
    let out = e.do_effect_path(&probe, &ctx()).unwrap();
    assert!(first_point(&out).unwrap().distance(Point::new(0.0, 5.0)) < 1e-9);
}

#[test]
fn zero_length_reference_is_degenerate() {
    let mut e = applied();
    e.ref_path.set(chord(Point::new(3.0, 3.0), Point::new(3.0, 3.0)));
    assert!(e.do_effect_path(&midline(), &ctx()).unwrap_err().is_degenerate());
    assert!(applied().do_effect_path(&BezPath::new(), &ctx()).unwrap_err().is_degenerate());
}
