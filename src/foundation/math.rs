use kurbo::{BezPath, PathEl, Point, Vec2};

#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    pub(crate) const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub(crate) fn new_default() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    pub(crate) fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    pub(crate) fn write_f64(&mut self, v: f64) {
        self.write_bytes(&v.to_bits().to_le_bytes());
    }

    pub(crate) fn write_point(&mut self, p: Point) {
        self.write_f64(p.x);
        self.write_f64(p.y);
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        self.0 = h;
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }
}

/// Small seeded generator; the same seed replays the same stream on every platform.
#[derive(Clone, Copy, Debug)]
pub struct Rng64 {
    state: u64,
}

impl Rng64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        // SplitMix64
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)` with 53 bits of precision.
    pub fn next_f64_01(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }

    /// Uniform in `[-amplitude / 2, amplitude / 2)`.
    pub fn jitter(&mut self, amplitude: f64) -> f64 {
        amplitude * (self.next_f64_01() - 0.5)
    }
}

/// Bit-exact fingerprint of a path: equal fingerprints mean identical element streams.
pub fn fingerprint_path(path: &BezPath) -> u64 {
    let mut h = Fnv1a64::new_default();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                h.write_u8(b'M');
                h.write_point(p);
            }
            PathEl::LineTo(p) => {
                h.write_u8(b'L');
                h.write_point(p);
            }
            PathEl::QuadTo(p1, p2) => {
                h.write_u8(b'Q');
                h.write_point(p1);
                h.write_point(p2);
            }
            PathEl::CurveTo(p1, p2, p3) => {
                h.write_u8(b'C');
                h.write_point(p1);
                h.write_point(p2);
                h.write_point(p3);
            }
            PathEl::ClosePath => h.write_u8(b'Z'),
        }
    }
    h.finish()
}

const GAUSS_5_NODES: [f64; 5] = [
    -0.906_179_845_938_664,
    -0.538_469_310_105_683,
    0.0,
    0.538_469_310_105_683,
    0.906_179_845_938_664,
];
const GAUSS_5_WEIGHTS: [f64; 5] = [
    0.236_926_885_056_189,
    0.478_628_670_499_366,
    0.568_888_888_888_889,
    0.478_628_670_499_366,
    0.236_926_885_056_189,
];

/// Composite 5-point Gauss-Legendre quadrature of `f` over `[a, b]`.
pub(crate) fn integrate(f: impl Fn(f64) -> f64, a: f64, b: f64, pieces: usize) -> f64 {
    let pieces = pieces.max(1);
    let h = (b - a) / pieces as f64;
    let mut sum = 0.0;
    for k in 0..pieces {
        let lo = a + h * k as f64;
        let mid = lo + 0.5 * h;
        for (x, w) in GAUSS_5_NODES.iter().zip(GAUSS_5_WEIGHTS.iter()) {
            sum += w * f(mid + 0.5 * h * x);
        }
    }
    sum * 0.5 * h
}

/// Counter-clockwise rotation by 90 degrees (y-down canvases see it clockwise).
#[inline]
pub fn rot90(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

#[inline]
pub fn unit_or_zero(v: Vec2) -> Vec2 {
    let len = v.hypot();
    if len > 0.0 { v / len } else { Vec2::ZERO }
}

/// `v` rotated counter-clockwise by `angle` radians.
#[inline]
pub fn rotate_vec(v: Vec2, angle: f64) -> Vec2 {
    let (s, c) = angle.sin_cos();
    Vec2::new(v.x * c - v.y * s, v.x * s + v.y * c)
}

/// Signed angle from `a` to `b` in `(-PI, PI]`.
#[inline]
pub fn angle_between(a: Vec2, b: Vec2) -> f64 {
    a.cross(b).atan2(a.dot(b))
}

/// Wrap an angle in radians into `(-PI, PI]`.
pub fn normalize_angle(a: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let mut a = a % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}

/// Bisection for a sign change of `f` on `[lo, hi]`; `f(lo)` and `f(hi)` must differ in sign.
pub(crate) fn bisect(f: impl Fn(f64) -> f64, mut lo: f64, mut hi: f64) -> f64 {
    let mut flo = f(lo);
    for _ in 0..80 {
        let mid = 0.5 * (lo + hi);
        let fm = f(mid);
        if fm == 0.0 {
            return mid;
        }
        if (fm < 0.0) == (flo < 0.0) {
            lo = mid;
            flo = fm;
        } else {
            hi = mid;
        }
        if hi - lo <= 1e-14 {
            break;
        }
    }
    0.5 * (lo + hi)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
