use super::*;

fn ramp() -> Piecewise<Poly> {
    // f(t) = t on [0, 1], then 1 + 2(t - 1) on [1, 2].
    Piecewise::from_parts(
        vec![0.0, 1.0, 2.0],
        vec![Poly::linear(0.0, 1.0), Poly::linear(1.0, 3.0)],
    )
    .unwrap()
}

#[test]
fn from_parts_rejects_non_increasing_cuts() {
    assert!(Piecewise::from_parts(vec![0.0, 0.0], vec![Poly::zero()]).is_none());
    assert!(Piecewise::<Poly>::from_parts(vec![0.0], vec![]).is_none());
}

#[test]
fn value_lookup_uses_local_parameter() {
    let f = ramp();
    assert_eq!(f.value_at(0.5), Some(0.5));
    assert!((f.value_at(1.5).unwrap() - 2.0).abs() < 1e-12);
    assert_eq!(f.first_value(), Some(0.0));
    assert_eq!(f.last_value(), Some(3.0));
    assert_eq!(Piecewise::<Poly>::new().value_at(0.0), None);
}

#[test]
fn partition_keeps_values() {
    let f = ramp();
    let g = f.partition(&[0.25, 1.5, 7.0]);
    assert_eq!(g.cuts(), &[0.0, 0.25, 1.0, 1.5, 2.0]);
    for t in [0.1, 0.3, 1.2, 1.7] {
        assert!((f.value_at(t).unwrap() - g.value_at(t).unwrap()).abs() < 1e-12);
    }
}

#[test]
fn mutual_partition_shares_cut_sequence() {
    let a = ramp();
    let b = Piecewise::from_parts(
        vec![0.0, 0.5, 1.0 + 1e-12, 2.0],
        vec![Poly::constant(1.0), Poly::constant(2.0), Poly::constant(3.0)],
    )
    .unwrap();
    let (pa, pb) = mutual_partition(&a, &b);
    assert_eq!(pa.cuts(), pb.cuts());
    assert_eq!(pa.cuts().len(), 4, "near-duplicate cut collapses");
    for &c in pa.cuts() {
        assert!((pa.value_at(c).unwrap() - a.value_at(c).unwrap()).abs() < 1e-9);
    }
}

#[test]
fn mutual_partition_rescales_foreign_domain() {
    let a = ramp();
    let b = Piecewise::from_segment(Poly::linear(0.0, 1.0));
    let (_, pb) = mutual_partition(&a, &b);
    assert_eq!(pb.domain(), a.domain());
    assert!((pb.value_at(1.0).unwrap() - 0.5).abs() < 1e-12);
}

#[test]
fn reversed_and_portion() {
    let f = ramp();
    let r = f.reversed();
    assert!((r.value_at(0.0).unwrap() - 3.0).abs() < 1e-12);
    let p = f.portion(0.5, 1.5);
    assert_eq!(p.domain(), Some(Interval::new(0.5, 1.5)));
    assert!((p.value_at(1.5).unwrap() - 2.0).abs() < 1e-12);
}

#[test]
fn concat_shifts_second_domain() {
    let mut f = ramp();
    f.concat(&Piecewise::from_segment(Poly::constant(9.0)));
    assert_eq!(f.domain(), Some(Interval::new(0.0, 3.0)));
    assert_eq!(f.value_at(2.5), Some(9.0));
}

#[test]
fn compose_splits_inner_at_outer_cuts() {
    let outer = ramp();
    // inner sweeps 0..2 across t in [0, 1], crossing the outer cut at t = 0.5.
    let inner = Piecewise::from_segment(Poly::linear(0.0, 2.0));
    let c = compose(&outer, &inner);
    assert_eq!(c.len(), 2);
    for t in [0.1, 0.4, 0.6, 0.95] {
        let expect = outer.value_at(inner.value_at(t).unwrap()).unwrap();
        assert!((c.value_at(t).unwrap() - expect).abs() < 1e-9);
    }
}
