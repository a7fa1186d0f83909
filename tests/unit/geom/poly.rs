use super::*;

fn near(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn eval_and_endpoints() {
    let p = Poly::from_coeffs(&[1.0, -2.0, 3.0]);
    assert!(near(p.eval(0.5), 1.0 - 1.0 + 0.75));
    assert_eq!(p.at0(), 1.0);
    assert!(near(p.at1(), 2.0));
    assert_eq!(p.degree(), 2);
}

#[test]
fn derivative_and_products() {
    let p = Poly::linear(0.0, 2.0); // 2u
    let q = &p * &p; // 4u^2
    assert!(near(q.eval(0.5), 1.0));
    assert!(near(q.derivative().eval(0.5), 4.0));
    assert!(near((&q - &p).eval(1.0), 2.0));
}

#[test]
fn compose_matches_pointwise_evaluation() {
    let outer = Poly::from_coeffs(&[0.5, 1.0, -1.0, 0.25]);
    let inner = Poly::from_coeffs(&[0.1, 0.7, 0.2]);
    let c = outer.compose(&inner);
    for u in [0.0, 0.2, 0.5, 0.9, 1.0] {
        assert!(near(c.eval(u), outer.eval(inner.eval(u))));
    }
}

#[test]
fn portion_and_reverse() {
    let p = Poly::from_coeffs(&[0.0, 0.0, 0.0, 1.0]); // u^3
    let half = p.portion(0.5, 1.0);
    assert!(near(half.at0(), 0.125));
    assert!(near(half.at1(), 1.0));
    let r = p.reversed();
    assert!(near(r.eval(0.25), 0.75f64.powi(3)));
}

#[test]
fn roots_of_cubic_are_isolated() {
    // (u - 0.2)(u - 0.5)(u - 0.8)
    let a = Poly::linear(-0.2, 0.8);
    let b = Poly::linear(-0.5, 0.5);
    let c = Poly::linear(-0.8, 0.2);
    let p = &(&a * &b) * &c;
    let roots = p.roots_unit();
    assert_eq!(roots.len(), 3);
    assert!(near(roots[0], 0.2));
    assert!(near(roots[1], 0.5));
    assert!(near(roots[2], 0.8));
}

#[test]
fn quadratic_without_real_roots() {
    let p = Poly::from_coeffs(&[1.0, 0.0, 1.0]);
    assert!(p.roots_unit().is_empty());
}

#[test]
fn range_sees_interior_extremum() {
    let p = Poly::from_coeffs(&[0.0, 4.0, -4.0]); // peak 1 at u = 0.5
    let (lo, hi) = p.range();
    assert!(near(lo, 0.0));
    assert!(near(hi, 1.0));
}
