use super::*;
use kurbo::{Rect, Shape};

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

#[test]
fn spawned_gears_keep_pitch_circles_tangent() {
    let mut e = Gears::new();
    e.do_effect_path(
        &polyline(&[(-20.0, 0.0), (0.0, 0.0), (30.0, 0.0), (80.0, 20.0), (80.0, 120.0)]),
        &ctx(),
    )
    .unwrap();
    let gears = e.gears();
    assert_eq!(gears.len(), 3);
    for pair in gears.windows(2) {
        let d = pair[0].center().distance(pair[1].center());
        let sum = pair[0].pitch_radius() + pair[1].pitch_radius();
        assert!((d - sum).abs() < 1e-9, "{d} vs {sum}");
    }
}

#[test]
fn spawn_count_follows_the_centre_distance_ratio() {
    let mut gear = Gear::new(10, 2.0, 20f64.to_radians());
    gear.set_pitch_radius(10.0);
    // 25 from the centre leaves 15 for the new gear: 1.5 * 10 teeth.
    let next = gear.spawn(Point::new(25.0, 0.0));
    assert_eq!(next.teeth(), 15);
    assert!((next.pitch_radius() - 15.0).abs() < 1e-12);
    let tiny = gear.spawn(Point::new(10.5, 0.0));
    assert_eq!(tiny.teeth(), 3);
}

#[test]
fn outline_stays_between_root_and_outer_circles() {
    let mut gear = Gear::new(12, 1.0, 20f64.to_radians());
    gear.set_pitch_radius(30.0);
    let path = gear.path(0.01);
    let b = path.bounding_box();
    assert!(b.width() <= 2.0 * gear.outer_radius() + 1e-6);
    assert!(b.width() >= 2.0 * gear.root_radius());
    assert!(matches!(path.elements().last(), Some(kurbo::PathEl::ClosePath)));
}

#[test]
fn fewer_than_three_nodes_is_degenerate() {
    let mut e = Gears::new();
    let err = e
        .do_effect_path(&polyline(&[(0.0, 0.0), (10.0, 0.0)]), &ctx())
        .unwrap_err();
    assert!(err.is_degenerate());
}

#[test]
fn output_is_deterministic() {
    let input = polyline(&[(-20.0, 0.0), (0.0, 0.0), (30.0, 0.0)]);
    let a = Gears::new().do_effect_path(&input, &ctx()).unwrap();
    let b = Gears::new().do_effect_path(&input, &ctx()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn tooth_counts_are_capped() {
    let mut e = Gears::new();
    e.do_effect_path(&polyline(&[(-20.0, 0.0), (0.0, 0.0), (30.0, 0.0)]), &ctx())
        .unwrap();
    let first = e.gears()[0].clone();
    // a drag just past the first tooth asks for a huge count
    let p = first.center() + Vec2::from_angle(first.angle() + 1e-5) * first.outer_radius();
    assert!(e.set_handle_position(&HandleTarget::Param("teeth"), p, Modifiers::NONE));
    assert_eq!(*e.teeth.get(), MAX_TEETH as f64);
    assert!(e.teeth.read_from_text("100000"));
    assert_eq!(*e.teeth.get(), MAX_TEETH as f64);

    let far = first.spawn(Point::new(1e9, 0.0));
    assert_eq!(far.teeth(), MAX_TEETH);
    assert_eq!(Gear::new(usize::MAX, 1.0, 0.3).teeth(), MAX_TEETH);
}
