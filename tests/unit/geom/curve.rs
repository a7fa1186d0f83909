use super::*;
use kurbo::CubicBez;

fn near(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

fn line_curve(a: (f64, f64), b: (f64, f64)) -> PiecewiseCurve {
    PiecewiseCurve::from_segment(Curve2::line(Point::new(a.0, a.1), Point::new(b.0, b.1)))
}

#[test]
fn cubic_segment_round_trips_to_bezier() {
    let c = CubicBez::new((0.0, 0.0), (10.0, 20.0), (30.0, -5.0), (40.0, 10.0));
    let curve = Curve2::from_seg(PathSeg::Cubic(c));
    for u in [0.0, 0.3, 0.5, 1.0] {
        let a = curve.eval(u);
        let b = kurbo::ParamCurve::eval(&c, u);
        assert!((a - b).hypot() < 1e-9);
    }
    let Some(PathSeg::Cubic(back)) = curve.to_seg() else {
        panic!("expected cubic");
    };
    assert!((back.p1 - c.p1).hypot() < 1e-9);
    assert!((back.p2 - c.p2).hypot() < 1e-9);
}

#[test]
fn derivative_is_scaled_by_fragment_width() {
    let mut c = line_curve((0.0, 0.0), (10.0, 0.0));
    c.set_domain(Interval::new(0.0, 2.0));
    let d = c.derivative();
    let v = d.value_at(1.0).unwrap();
    assert!(near(v.x, 5.0, 1e-12));
    assert!(near(v.y, 0.0, 1e-12));
}

#[test]
fn unit_tangent_of_a_quarter_circle_is_unit() {
    let mut path = kurbo::BezPath::new();
    path.move_to((10.0, 0.0));
    let arc = kurbo::Arc::new((0.0, 0.0), (10.0, 10.0), 0.0, std::f64::consts::FRAC_PI_2, 0.0);
    arc.to_cubic_beziers(0.01, |p1, p2, p3| path.curve_to(p1, p2, p3));
    let seg = path.segments().next().unwrap();
    let curve = PiecewiseCurve::from_segment(Curve2::from_seg(seg));
    let tangent = curve.unit_tangent(1e-4);
    for t in [0.0, 0.25, 0.5, 0.75, 1.0] {
        let v = tangent.value_at(t).unwrap().to_vec2();
        assert!(near(v.hypot(), 1.0, 1e-3));
    }
    // The normal at the start points towards the centre for a counter-clockwise arc.
    let n = curve.normal(1e-4).value_at(0.0).unwrap();
    assert!(n.x < -0.99);
}

#[test]
fn arc_length_of_a_line_is_linear() {
    let c = line_curve((0.0, 0.0), (3.0, 4.0));
    assert!(near(c.length(), 5.0, 1e-9));
    let s = c.arc_length(1e-6);
    assert!(near(s.value_at(0.5).unwrap(), 2.5, 1e-6));
    assert!(near(s.last_value().unwrap(), 5.0, 1e-6));
}

#[test]
fn arc_length_reparametrization_spans_total_length() {
    let seg = PathSeg::Cubic(CubicBez::new((0.0, 0.0), (0.0, 50.0), (100.0, 50.0), (100.0, 0.0)));
    let c = PiecewiseCurve::from_segment(Curve2::from_seg(seg));
    let total = c.length();
    let r = c.arc_length_reparametrize(1e-3);
    let dom = r.domain().unwrap();
    assert!(near(dom.min, 0.0, 1e-12));
    assert!(near(dom.max, total, 1e-9));
    // Unit speed everywhere.
    let d = r.derivative();
    for k in 1..10 {
        let v = d.value_at(total * k as f64 / 10.0).unwrap().to_vec2();
        assert!(near(v.hypot(), 1.0, 2e-2), "speed {}", v.hypot());
    }
}

#[test]
fn zero_length_curve_reparametrizes_to_empty() {
    let c = line_curve((1.0, 1.0), (1.0, 1.0));
    assert!(c.arc_length_reparametrize(1e-3).is_empty());
}

#[test]
fn exact_bounds_include_cubic_extrema() {
    let seg = PathSeg::Cubic(CubicBez::new((0.0, 0.0), (0.0, 40.0), (10.0, 40.0), (10.0, 0.0)));
    let c = PiecewiseCurve::from_segment(Curve2::from_seg(seg));
    let b = c.bounds_exact().unwrap();
    assert!(near(b.y1, 30.0, 1e-9));
    assert!(near(b.x0, 0.0, 1e-12));
    assert!(near(b.x1, 10.0, 1e-12));
}

#[test]
fn nearest_time_projects_onto_line() {
    let mut c = line_curve((0.0, 0.0), (10.0, 0.0));
    c.concat(&line_curve((10.0, 0.0), (10.0, 10.0)));
    let t = c.nearest_time(Point::new(4.0, 3.0)).unwrap();
    assert!(near(t, 0.4, 1e-9));
    let t = c.nearest_time(Point::new(12.0, 5.0)).unwrap();
    assert!(near(t, 1.5, 1e-9));
}

#[test]
fn sums_after_mutual_partition() {
    let mut a = line_curve((0.0, 0.0), (1.0, 0.0));
    a.concat(&line_curve((1.0, 0.0), (2.0, 0.0)));
    let b = line_curve((0.0, 0.0), (0.0, 2.0));
    let sum = a.add(&b);
    assert_eq!(sum.len(), 2);
    let p = sum.value_at(1.0).unwrap();
    assert!(near(p.x, 1.0, 1e-12));
    assert!(near(p.y, 1.0, 1e-12));
    let diff = sum.sub(&b);
    let q = diff.value_at(1.5).unwrap();
    assert!(near(q.x, 1.5, 1e-12));
    assert!(near(q.y, 0.0, 1e-12));
}

#[test]
fn scaled_by_multiplies_pointwise() {
    let c = line_curve((1.0, 1.0), (1.0, 1.0));
    let f = PiecewiseScalar::from_segment(Poly::linear(0.0, 2.0));
    let p = c.scaled_by(&f).value_at(0.5).unwrap();
    assert!(near(p.x, 1.0, 1e-12));
    assert!(near(p.y, 1.0, 1e-12));
}

#[test]
fn transform_applies_affine() {
    let c = line_curve((1.0, 0.0), (2.0, 0.0));
    let r = c.transform(Affine::rotate(std::f64::consts::FRAC_PI_2));
    let p = r.first_value().unwrap();
    assert!(near(p.x, 0.0, 1e-12));
    assert!(near(p.y, 1.0, 1e-12));
}

#[test]
fn fit_scalar_tracks_sqrt_within_tolerance() {
    let f = fit_scalar(|x: f64| (1.0 + x).sqrt(), 0.0, 3.0, 1e-6);
    for x in [0.1, 0.9, 1.7, 2.95] {
        assert!(near(f.value_at(x).unwrap(), (1.0 + x).sqrt(), 1e-5));
    }
    assert!(fit_scalar(|x| x, 1.0, 1.0, 1e-6).is_empty());
}

#[test]
fn discontinuities_are_found_between_subpaths() {
    let mut c = line_curve((0.0, 0.0), (1.0, 0.0));
    c.concat(&line_curve((1.0, 0.0), (1.0, 1.0)));
    c.concat(&line_curve((5.0, 5.0), (6.0, 5.0)));
    assert_eq!(c.find_discontinuities(1e-9), vec![2]);
}

#[test]
fn scalar_roots_are_global_times() {
    let mut f = PiecewiseScalar::from_segment(Poly::linear(0.0, 1.0));
    f.concat(&PiecewiseScalar::from_segment(Poly::linear(1.0, 0.0)));
    let roots = f.roots_of(0.5);
    assert_eq!(roots.len(), 2);
    assert!(near(roots[0], 0.5, 1e-12));
    assert!(near(roots[1], 1.5, 1e-12));
}

#[test]
fn tangent_at_handles_stationary_start() {
    let seg = PathSeg::Cubic(CubicBez::new((0.0, 0.0), (0.0, 0.0), (10.0, 0.0), (10.0, 0.0)));
    let c = PiecewiseCurve::from_segment(Curve2::from_seg(seg));
    let v = tangent_at(&c, 0.0);
    assert!(near(v.x, 1.0, 1e-6));
    let n = normal_at(&c, 0.5);
    assert!(near(n.y, 1.0, 1e-6));
}

#[test]
fn bridged_fills_jumps_with_lines() {
    let line = Curve2::line(Point::new(0.0, 0.0), Point::new(1.0, 0.0));
    let mut c = PiecewiseCurve::from_segment(line);
    c.concat(&PiecewiseCurve::from_segment(Curve2::line(
        Point::new(1.0, 1.0),
        Point::new(2.0, 1.0),
    )));
    assert_eq!(c.find_discontinuities(1e-9), vec![1]);
    let b = c.bridged(1e-9);
    assert_eq!(b.len(), 3);
    assert!(b.find_discontinuities(1e-9).is_empty());
    assert_eq!(b.segment(1).at1(), Point::new(1.0, 1.0));
}
