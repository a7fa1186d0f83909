use super::*;
use kurbo::{Rect, Shape};

fn ctx() -> EffectContext {
    EffectContext::new(Rect::new(0.0, 0.0, 100.0, 100.0))
}

fn square(x0: f64, y0: f64, size: f64) -> BezPath {
    Rect::new(x0, y0, x0 + size, y0 + size).to_path(0.1)
}

fn run(kind: BoolOpKind, operand: BezPath) -> BezPath {
    let mut e = BoolOp::new();
    e.operand.set(operand);
    e.operation.set(kind);
    e.do_effect_path(&square(0.0, 0.0, 100.0), &ctx()).unwrap()
}

fn filled_area(path: &BezPath) -> f64 {
    path.area().abs()
}

#[test]
fn overlapping_squares_combine_by_operation() {
    let other = square(50.0, 0.0, 100.0);
    let cases = [
        (BoolOpKind::Union, 15_000.0),
        (BoolOpKind::Intersection, 5_000.0),
        (BoolOpKind::Difference, 5_000.0),
        (BoolOpKind::Exclusion, 10_000.0),
    ];
    for (kind, expected) in cases {
        let out = run(kind, other.clone());
        assert!((filled_area(&out) - expected).abs() < 1e-6, "{kind:?}: {}", out.area());
    }
}

#[test]
fn union_result_is_one_outline() {
    let out = run(BoolOpKind::Union, square(50.0, 50.0, 100.0));
    assert_eq!(subpaths(&out).len(), 1);
    let b = out.bounding_box();
    assert!((b.width() - 150.0).abs() < 1e-6 && (b.height() - 150.0).abs() < 1e-6);
}

#[test]
fn cutting_out_the_middle_leaves_a_hole() {
    let out = run(BoolOpKind::Difference, square(25.0, 25.0, 50.0));
    assert_eq!(subpaths(&out).len(), 2);
    assert!((filled_area(&out) - 7_500.0).abs() < 1e-6, "{}", out.area());
}

#[test]
fn disjoint_intersection_is_empty() {
    let out = run(BoolOpKind::Intersection, square(200.0, 0.0, 10.0));
    assert!(out.elements().is_empty());
}

#[test]
fn missing_operand_is_degenerate() {
    let mut e = BoolOp::new();
    assert!(e.do_effect_path(&square(0.0, 0.0, 10.0), &ctx()).unwrap_err().is_degenerate());
}

#[test]
fn curved_input_is_flattened_within_tolerance() {
    let mut e = BoolOp::new();
    e.operand.set(square(-10.0, -10.0, 20.0));
    e.operation.set(BoolOpKind::Intersection);
    let circle = kurbo::Circle::new((0.0, 0.0), 5.0).to_path(0.01);
    let out = e.do_effect_path(&circle, &ctx()).unwrap();
    let expected = std::f64::consts::PI * 25.0;
    assert!((filled_area(&out) - expected).abs() < 0.5, "{}", out.area());
}

fn polygon(points: &[(f64, f64)]) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(points[0]);
    for &p in &points[1..] {
        path.line_to(p);
    }
    path.close_path();
    path
}

/// Band between the squares 20..80 and 30..70, drawn as two overlapping C shapes.
fn ring_from_two_cs() -> BezPath {
    let mut path = polygon(&[
        (20.0, 20.0),
        (55.0, 20.0),
        (55.0, 30.0),
        (30.0, 30.0),
        (30.0, 70.0),
        (55.0, 70.0),
        (55.0, 80.0),
        (20.0, 80.0),
    ]);
    path.extend(polygon(&[
        (45.0, 20.0),
        (80.0, 20.0),
        (80.0, 80.0),
        (45.0, 80.0),
        (45.0, 70.0),
        (70.0, 70.0),
        (70.0, 30.0),
        (45.0, 30.0),
    ]));
    path
}

/// The same band drawn as an outline with a nested hole.
fn ring_from_nested_squares() -> BezPath {
    let mut path = square(20.0, 20.0, 60.0);
    path.extend(square(30.0, 30.0, 40.0));
    path
}

fn filled(path: &BezPath, x: f64, y: f64) -> bool {
    path.winding(Point::new(x, y)) != 0
}

#[test]
fn ring_operand_keeps_its_hole() {
    for ring in [ring_from_two_cs(), ring_from_nested_squares()] {
        let cases = [
            (BoolOpKind::Union, 10_000.0),
            (BoolOpKind::Intersection, 2_000.0),
            (BoolOpKind::Difference, 8_000.0),
            (BoolOpKind::Exclusion, 8_000.0),
        ];
        for (kind, expected) in cases {
            let out = run(kind, ring.clone());
            assert!((filled_area(&out) - expected).abs() < 1e-6, "{kind:?}: {}", out.area());
        }

        let diff = run(BoolOpKind::Difference, ring.clone());
        assert!(filled(&diff, 50.0, 50.0));
        assert!(!filled(&diff, 25.0, 50.0));
        assert!(filled(&diff, 10.0, 50.0));

        let both = run(BoolOpKind::Intersection, ring);
        assert!(!filled(&both, 50.0, 50.0));
        assert!(filled(&both, 25.0, 50.0));
    }
}

#[test]
fn input_hole_covered_by_the_operand_is_filled() {
    let mut input = square(0.0, 0.0, 100.0);
    input.extend(square(40.0, 40.0, 20.0));
    let operand = square(30.0, 30.0, 40.0);
    let cases = [
        (BoolOpKind::Union, 10_000.0),
        (BoolOpKind::Intersection, 1_200.0),
        (BoolOpKind::Difference, 8_400.0),
        (BoolOpKind::Exclusion, 8_800.0),
    ];
    for (kind, expected) in cases {
        let mut e = BoolOp::new();
        e.operand.set(operand.clone());
        e.operation.set(kind);
        let out = e.do_effect_path(&input, &ctx()).unwrap();
        assert!((filled_area(&out) - expected).abs() < 1e-6, "{kind:?}: {}", out.area());
        let center = matches!(kind, BoolOpKind::Union | BoolOpKind::Exclusion);
        assert_eq!(filled(&out, 50.0, 50.0), center, "{kind:?}");
    }
}

#[test]
fn island_inside_a_hole_survives() {
    // outline, hole, island: the island is filled again
    let mut input = square(0.0, 0.0, 100.0);
    input.extend(square(20.0, 20.0, 60.0));
    input.extend(square(40.0, 40.0, 20.0));
    let out = run_on(&input, BoolOpKind::Union, square(200.0, 0.0, 10.0));
    assert!((filled_area(&out) - (10_000.0 - 3_600.0 + 400.0 + 100.0)).abs() < 1e-6);
    assert!(filled(&out, 50.0, 50.0));
    assert!(!filled(&out, 30.0, 50.0));
    assert_eq!(subpaths(&out).len(), 4);
}

fn run_on(input: &BezPath, kind: BoolOpKind, operand: BezPath) -> BezPath {
    let mut e = BoolOp::new();
    e.operand.set(operand);
    e.operation.set(kind);
    e.do_effect_path(input, &ctx()).unwrap()
}
