use super::*;

#[test]
fn fnv_seeded_hash_is_stable() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"livepath");
    let mut b = Fnv1a64::new(Fnv1a64::OFFSET_BASIS);
    b.write_u8(b'l');
    b.write_bytes(b"ivepath");
    assert_eq!(a.finish(), b.finish());
}

#[test]
fn path_fingerprint_distinguishes_geometry() {
    let mut a = BezPath::new();
    a.move_to((0.0, 0.0));
    a.line_to((1.0, 0.0));
    let mut b = a.clone();
    assert_eq!(fingerprint_path(&a), fingerprint_path(&b));
    b.line_to((1.0, 1.0));
    assert_ne!(fingerprint_path(&a), fingerprint_path(&b));
}

#[test]
fn quadrature_is_exact_for_low_degree() {
    let v = integrate(|x| 3.0 * x * x, 0.0, 2.0, 1);
    assert!((v - 8.0).abs() < 1e-12);
}

#[test]
fn angles_wrap_into_half_open_range() {
    use std::f64::consts::PI;
    assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-12);
    assert!((normalize_angle(-0.5 * PI) + 0.5 * PI).abs() < 1e-12);
}

#[test]
fn bisection_finds_sqrt_two() {
    let r = bisect(|x| x * x - 2.0, 0.0, 2.0);
    assert!((r - 2f64.sqrt()).abs() < 1e-12);
}

#[test]
fn rotation_and_signed_angles() {
    let v = rotate_vec(Vec2::new(1.0, 0.0), std::f64::consts::FRAC_PI_2);
    assert!((v - Vec2::new(0.0, 1.0)).hypot() < 1e-12);
    let a = angle_between(Vec2::new(1.0, 0.0), Vec2::new(0.0, -2.0));
    assert!((a + std::f64::consts::FRAC_PI_2).abs() < 1e-12);
}

#[test]
fn rng_replays_its_stream_and_stays_in_range() {
    let mut a = Rng64::new(42);
    let mut b = Rng64::new(42);
    let xs: Vec<u64> = (0..8).map(|_| a.next_u64()).collect();
    let ys: Vec<u64> = (0..8).map(|_| b.next_u64()).collect();
    assert_eq!(xs, ys);
    assert_ne!(Rng64::new(43).next_u64(), xs[0]);

    let mut r = Rng64::new(7);
    for _ in 0..1000 {
        let u = r.next_f64_01();
        assert!((0.0..1.0).contains(&u));
        let j = r.jitter(4.0);
        assert!((-2.0..2.0).contains(&j));
    }
    assert_eq!(r.jitter(0.0), 0.0);
}
