//! Plane curves as pairs of polynomials, and the piecewise algebra built on them.
//!
//! Exact operations (sum, scaling, affine maps, derivative, composition with polynomial
//! reparametrizations, projection, exact bounds) stay polynomial. Operations that are not
//! polynomial (unit tangent, arc length and its inverse) are approximated fragment by fragment
//! with cubic interpolants refined until they meet the requested tolerance.

use std::ops::{Add, Sub};

use kurbo::{Affine, PathSeg, Point, Rect, Vec2};

use crate::foundation::core::{EPSILON, Interval};
use crate::foundation::math::{bisect, integrate, rot90, unit_or_zero};
use crate::geom::piecewise::{Fragment, Piecewise, compose, mutual_partition};
use crate::geom::poly::Poly;

/// Subdivision depth limit for adaptive fitting (at most `2^MAX_FIT_DEPTH` pieces per fragment).
const MAX_FIT_DEPTH: u32 = 8;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Curve2 {
    pub x: Poly,
    pub y: Poly,
}

pub type PiecewiseCurve = Piecewise<Curve2>;
pub type PiecewiseScalar = Piecewise<Poly>;

impl Curve2 {
    pub fn new(x: Poly, y: Poly) -> Self {
        Self { x, y }
    }

    pub fn constant(p: Point) -> Self {
        Self::new(Poly::constant(p.x), Poly::constant(p.y))
    }

    pub fn line(a: Point, b: Point) -> Self {
        Self::new(Poly::linear(a.x, b.x), Poly::linear(a.y, b.y))
    }

    /// Power-basis form of a Bezier segment.
    pub fn from_seg(seg: PathSeg) -> Self {
        match seg {
            PathSeg::Line(l) => Self::line(l.p0, l.p1),
            PathSeg::Quad(q) => {
                let c1 = (q.p1 - q.p0) * 2.0;
                let c2 = q.p0.to_vec2() - q.p1.to_vec2() * 2.0 + q.p2.to_vec2();
                Self::new(
                    Poly::from_coeffs(&[q.p0.x, c1.x, c2.x]),
                    Poly::from_coeffs(&[q.p0.y, c1.y, c2.y]),
                )
            }
            PathSeg::Cubic(c) => {
                let p0 = c.p0.to_vec2();
                let p1 = c.p1.to_vec2();
                let p2 = c.p2.to_vec2();
                let p3 = c.p3.to_vec2();
                let c1 = (p1 - p0) * 3.0;
                let c2 = (p0 - p1 * 2.0 + p2) * 3.0;
                let c3 = p3 - p0 + (p1 - p2) * 3.0;
                Self::new(
                    Poly::from_coeffs(&[p0.x, c1.x, c2.x, c3.x]),
                    Poly::from_coeffs(&[p0.y, c1.y, c2.y, c3.y]),
                )
            }
        }
    }

    pub fn degree(&self) -> usize {
        self.x.degree().max(self.y.degree())
    }

    pub fn eval(&self, u: f64) -> Point {
        Point::new(self.x.eval(u), self.y.eval(u))
    }

    pub fn at0(&self) -> Point {
        Point::new(self.x.at0(), self.y.at0())
    }

    pub fn at1(&self) -> Point {
        Point::new(self.x.at1(), self.y.at1())
    }

    pub fn derivative(&self) -> Self {
        Self::new(self.x.derivative(), self.y.derivative())
    }

    pub fn velocity(&self, u: f64) -> Vec2 {
        Vec2::new(self.x.derivative().eval(u), self.y.derivative().eval(u))
    }

    pub fn scale(&self, k: f64) -> Self {
        Self::new(self.x.scale(k), self.y.scale(k))
    }

    pub fn translate(&self, v: Vec2) -> Self {
        Self::new(self.x.shift(v.x), self.y.shift(v.y))
    }

    pub fn transform(&self, a: Affine) -> Self {
        let [m0, m1, m2, m3, m4, m5] = a.as_coeffs();
        Self::new(
            (&self.x.scale(m0) + &self.y.scale(m2)).shift(m4),
            (&self.x.scale(m1) + &self.y.scale(m3)).shift(m5),
        )
    }

    pub fn rot90(&self) -> Self {
        Self::new(-&self.y, self.x.clone())
    }

    pub fn mul_scalar(&self, f: &Poly) -> Self {
        Self::new(&self.x * f, &self.y * f)
    }

    pub fn dot(&self, other: &Curve2) -> Poly {
        &(&self.x * &other.x) + &(&self.y * &other.y)
    }

    /// Exact Bezier form when the degree allows it.
    pub fn to_seg(&self) -> Option<PathSeg> {
        let cx = padded(&self.x);
        let cy = padded(&self.y);
        match self.degree() {
            0 | 1 => Some(PathSeg::Line(kurbo::Line::new(self.at0(), self.at1()))),
            2 => {
                let p0 = Point::new(cx[0], cy[0]);
                let p1 = Point::new(cx[0] + cx[1] / 2.0, cy[0] + cy[1] / 2.0);
                Some(PathSeg::Quad(kurbo::QuadBez::new(p0, p1, self.at1())))
            }
            3 => {
                let p0 = Point::new(cx[0], cy[0]);
                let p1 = Point::new(cx[0] + cx[1] / 3.0, cy[0] + cy[1] / 3.0);
                let p2 = Point::new(
                    cx[0] + 2.0 * cx[1] / 3.0 + cx[2] / 3.0,
                    cy[0] + 2.0 * cy[1] / 3.0 + cy[2] / 3.0,
                );
                Some(PathSeg::Cubic(kurbo::CubicBez::new(p0, p1, p2, self.at1())))
            }
            _ => None,
        }
    }

    /// Exact bounding box over `[0, 1]`.
    pub fn bounds(&self) -> Rect {
        let (x0, x1) = self.x.range();
        let (y0, y1) = self.y.range();
        Rect::new(x0, y0, x1, y1)
    }

    /// Parameter in `[0, 1]` of the point closest to `p`.
    pub fn nearest(&self, p: Point) -> (f64, f64) {
        let rel = self.translate(-p.to_vec2());
        let d = rel.dot(&rel.derivative());
        let mut best = (0.0, (self.at0() - p).hypot2());
        let end = (self.at1() - p).hypot2();
        if end < best.1 {
            best = (1.0, end);
        }
        for u in d.roots_unit() {
            let dist = (self.eval(u) - p).hypot2();
            if dist < best.1 {
                best = (u, dist);
            }
        }
        best
    }
}

fn padded(p: &Poly) -> [f64; 4] {
    let mut out = [0.0; 4];
    for (slot, c) in out.iter_mut().zip(p.coeffs()) {
        *slot = *c;
    }
    out
}

impl Fragment for Curve2 {
    type Value = Point;

    fn value_at(&self, u: f64) -> Point {
        self.eval(u)
    }

    fn portion(&self, from: f64, to: f64) -> Self {
        Self::new(self.x.portion(from, to), self.y.portion(from, to))
    }

    fn reversed(&self) -> Self {
        Self::new(self.x.reversed(), self.y.reversed())
    }

    fn compose(&self, inner: &Poly) -> Self {
        Self::new(self.x.compose(inner), self.y.compose(inner))
    }
}

impl Add for &Curve2 {
    type Output = Curve2;

    fn add(self, rhs: &Curve2) -> Curve2 {
        Curve2::new(&self.x + &rhs.x, &self.y + &rhs.y)
    }
}

impl Sub for &Curve2 {
    type Output = Curve2;

    fn sub(self, rhs: &Curve2) -> Curve2 {
        Curve2::new(&self.x - &rhs.x, &self.y - &rhs.y)
    }
}

/// Cubic through four equally spaced samples at `u = 0, 1/3, 2/3, 1`.
fn cubic_through(f: [f64; 4]) -> Poly {
    let d1 = f[1] - f[0];
    let d2 = f[2] - 2.0 * f[1] + f[0];
    let d3 = f[3] - 3.0 * f[2] + 3.0 * f[1] - f[0];
    Poly::from_coeffs(&[f[0], 3.0 * d1 - 1.5 * d2 + d3, 4.5 * d2 - 4.5 * d3, 4.5 * d3])
}

fn fit_scalar_into(
    out: &mut PiecewiseScalar,
    f: &dyn Fn(f64) -> f64,
    a: f64,
    b: f64,
    tol: f64,
    depth: u32,
) {
    let at = |s: f64| f(a + (b - a) * s);
    let poly = cubic_through([at(0.0), at(1.0 / 3.0), at(2.0 / 3.0), at(1.0)]);
    let err = [1.0 / 6.0, 0.5, 5.0 / 6.0]
        .iter()
        .map(|s| (poly.eval(*s) - at(*s)).abs())
        .fold(0.0, f64::max);
    if err <= tol || depth >= MAX_FIT_DEPTH || !err.is_finite() {
        out.push_cut(a);
        out.push(poly, b);
        return;
    }
    let mid = 0.5 * (a + b);
    fit_scalar_into(out, f, a, mid, tol, depth + 1);
    fit_scalar_into(out, f, mid, b, tol, depth + 1);
}

/// Approximates `f` on `[a, b]` by piecewise cubics within `tol`.
pub fn fit_scalar(f: impl Fn(f64) -> f64, a: f64, b: f64, tol: f64) -> PiecewiseScalar {
    let mut out = PiecewiseScalar::new();
    if !(b > a) {
        return out;
    }
    fit_scalar_into(&mut out, &f, a, b, tol, 0);
    out
}

fn fit_curve_into(
    out: &mut PiecewiseCurve,
    f: &dyn Fn(f64) -> Point,
    a: f64,
    b: f64,
    tol: f64,
    depth: u32,
) {
    let at = |s: f64| f(a + (b - a) * s);
    let samples = [at(0.0), at(1.0 / 3.0), at(2.0 / 3.0), at(1.0)];
    let seg = Curve2::new(
        cubic_through(samples.map(|p| p.x)),
        cubic_through(samples.map(|p| p.y)),
    );
    let err = [1.0 / 6.0, 0.5, 5.0 / 6.0]
        .iter()
        .map(|s| (seg.eval(*s) - at(*s)).hypot())
        .fold(0.0, f64::max);
    if err <= tol || depth >= MAX_FIT_DEPTH || !err.is_finite() {
        out.push_cut(a);
        out.push(seg, b);
        return;
    }
    let mid = 0.5 * (a + b);
    fit_curve_into(out, f, a, mid, tol, depth + 1);
    fit_curve_into(out, f, mid, b, tol, depth + 1);
}

/// Approximates the plane function `f` on `[a, b]` by piecewise cubics within `tol`.
pub fn fit_curve(f: impl Fn(f64) -> Point, a: f64, b: f64, tol: f64) -> PiecewiseCurve {
    let mut out = PiecewiseCurve::new();
    if !(b > a) {
        return out;
    }
    fit_curve_into(&mut out, &f, a, b, tol, 0);
    out
}

/// Scalar piecewise arithmetic after mutual partitioning.
impl PiecewiseScalar {
    pub fn constant_on(dom: Interval, c: f64) -> Self {
        let mut out = Self::new();
        out.push_cut(dom.min);
        out.push(Poly::constant(c), dom.max);
        out
    }

    pub fn add(&self, other: &Self) -> Self {
        let (a, b) = mutual_partition(self, other);
        a.zip_with(&b, |x, y| x + y)
    }

    pub fn sub(&self, other: &Self) -> Self {
        let (a, b) = mutual_partition(self, other);
        a.zip_with(&b, |x, y| x - y)
    }

    pub fn mul(&self, other: &Self) -> Self {
        let (a, b) = mutual_partition(self, other);
        a.zip_with(&b, |x, y| x * y)
    }

    pub fn scale(&self, k: f64) -> Self {
        self.map(|p| p.scale(k))
    }

    pub fn shift(&self, k: f64) -> Self {
        self.map(|p| p.shift(k))
    }

    /// All global times where the function equals `value`.
    pub fn roots_of(&self, value: f64) -> Vec<f64> {
        let mut out: Vec<f64> = Vec::new();
        for (i, seg) in self.segments().iter().enumerate() {
            for u in seg.shift(-value).roots_unit() {
                let t = self.global(i, u);
                if out.last().is_none_or(|last| (t - last).abs() > 1e-9) {
                    out.push(t);
                }
            }
        }
        out
    }
}

impl PiecewiseCurve {
    pub fn derivative(&self) -> Self {
        let mut out = Self::new();
        let Some(dom) = self.domain() else {
            return out;
        };
        out.push_cut(dom.min);
        for (i, seg) in self.segments().iter().enumerate() {
            let width = self.cuts()[i + 1] - self.cuts()[i];
            out.push(seg.derivative().scale(1.0 / width), self.cuts()[i + 1]);
        }
        out
    }

    /// Unit tangent field, approximated within `tol`. Stationary points borrow the direction
    /// of a nearby parameter instead of producing NaN.
    pub fn unit_tangent(&self, tol: f64) -> Self {
        let mut out = Self::new();
        for (i, seg) in self.segments().iter().enumerate() {
            let d = seg.derivative();
            let chord = unit_or_zero(seg.at1() - seg.at0());
            let dir = move |u: f64| {
                for sample in [u, u + 1e-4, u - 1e-4, u + 1e-2, u - 1e-2] {
                    let v = Vec2::new(d.x.eval(sample), d.y.eval(sample));
                    if v.hypot() > EPSILON {
                        return v.normalize();
                    }
                }
                chord
            };
            let (a, b) = (self.cuts()[i], self.cuts()[i + 1]);
            let w = b - a;
            let piece = fit_curve(|t| dir((t - a) / w).to_point(), a, b, tol);
            out.concat_continuing(&piece);
        }
        out
    }

    /// The tangent rotated by +90 degrees.
    pub fn normal(&self, tol: f64) -> Self {
        self.unit_tangent(tol).rot90()
    }

    pub fn rot90(&self) -> Self {
        self.map(Curve2::rot90)
    }

    /// Appends a piece whose domain already starts at this function's end.
    fn concat_continuing(&mut self, other: &Self) {
        if self.is_empty() {
            *self = other.clone();
            return;
        }
        for (i, seg) in other.segments().iter().enumerate() {
            self.push(seg.clone(), other.cuts()[i + 1]);
        }
    }

    /// Arc length of fragment `i` between local parameters `u0` and `u1`.
    fn fragment_length(&self, i: usize, u0: f64, u1: f64) -> f64 {
        let d = self.segment(i).derivative();
        integrate(
            |u| Vec2::new(d.x.eval(u), d.y.eval(u)).hypot(),
            u0,
            u1,
            4,
        )
    }

    pub fn length(&self) -> f64 {
        (0..self.len())
            .map(|i| self.fragment_length(i, 0.0, 1.0))
            .sum()
    }

    /// Cumulative arc length `s(t)` from the start of the domain, within `tol`.
    pub fn arc_length(&self, tol: f64) -> PiecewiseScalar {
        let mut out = PiecewiseScalar::new();
        let mut base = 0.0;
        for i in 0..self.len() {
            let (a, b) = (self.cuts()[i], self.cuts()[i + 1]);
            let w = b - a;
            let piece = fit_scalar(
                |t| base + self.fragment_length(i, 0.0, (t - a) / w),
                a,
                b,
                tol,
            );
            if out.is_empty() {
                out = piece;
            } else {
                for (k, seg) in piece.segments().iter().enumerate() {
                    out.push(seg.clone(), piece.cuts()[k + 1]);
                }
            }
            base += self.fragment_length(i, 0.0, 1.0);
        }
        out
    }

    /// Same curve parametrized by arc length over `[0, length]`.
    ///
    /// Zero-length fragments are dropped; an overall zero-length curve yields an empty result.
    pub fn arc_length_reparametrize(&self, tol: f64) -> Self {
        let lengths: Vec<f64> = (0..self.len())
            .map(|i| self.fragment_length(i, 0.0, 1.0))
            .collect();
        let total: f64 = lengths.iter().sum();
        let mut out = Self::new();
        if total <= EPSILON {
            return out;
        }
        let mut base = 0.0;
        for (i, len) in lengths.iter().copied().enumerate() {
            if len <= EPSILON * 1e-3 {
                continue;
            }
            let inverse = |s: f64| -> f64 {
                let target = (s - base).clamp(0.0, len);
                bisect(|u| self.fragment_length(i, 0.0, u) - target, 0.0, 1.0)
            };
            let t_of_s = fit_scalar(
                |s| {
                    if s <= base {
                        0.0
                    } else if s >= base + len {
                        1.0
                    } else {
                        inverse(s)
                    }
                },
                base,
                base + len,
                tol / len.max(1.0),
            );
            let seg = self.segment(i);
            for (k, g) in t_of_s.segments().iter().enumerate() {
                out.push_cut(t_of_s.cuts()[k]);
                out.push(seg.compose(g), t_of_s.cuts()[k + 1]);
            }
            base += len;
        }
        out
    }

    /// Exact bounds of the whole curve, `None` when empty.
    pub fn bounds_exact(&self) -> Option<Rect> {
        self.segments()
            .iter()
            .map(Curve2::bounds)
            .reduce(|a, b| a.union(b))
    }

    /// Global time of the point on the curve closest to `p`.
    pub fn nearest_time(&self, p: Point) -> Option<f64> {
        let mut best: Option<(f64, f64)> = None;
        for (i, seg) in self.segments().iter().enumerate() {
            let (u, dist) = seg.nearest(p);
            if best.is_none_or(|(_, d)| dist < d) {
                best = Some((self.global(i, u), dist));
            }
        }
        best.map(|(t, _)| t)
    }

    pub fn add(&self, other: &Self) -> Self {
        let (a, b) = mutual_partition(self, other);
        a.zip_with(&b, |x, y| x + y)
    }

    pub fn sub(&self, other: &Self) -> Self {
        let (a, b) = mutual_partition(self, other);
        a.zip_with(&b, |x, y| x - y)
    }

    pub fn scale(&self, k: f64) -> Self {
        self.map(|c| c.scale(k))
    }

    pub fn translate(&self, v: Vec2) -> Self {
        self.map(|c| c.translate(v))
    }

    pub fn transform(&self, a: Affine) -> Self {
        self.map(|c| c.transform(a))
    }

    /// Pointwise product with a scalar function.
    pub fn scaled_by(&self, f: &PiecewiseScalar) -> Self {
        let (a, b) = mutual_partition(self, f);
        a.zip_with(&b, |c, p| c.mul_scalar(p))
    }

    pub fn dot(&self, other: &Self) -> PiecewiseScalar {
        let (a, b) = mutual_partition(self, other);
        a.zip_with(&b, |x, y| x.dot(y))
    }

    pub fn x(&self) -> PiecewiseScalar {
        self.map(|c| c.x.clone())
    }

    pub fn y(&self) -> PiecewiseScalar {
        self.map(|c| c.y.clone())
    }

    /// `self(f(t))`.
    pub fn compose(&self, f: &PiecewiseScalar) -> Self {
        compose(self, f)
    }

    /// Indices `i` where fragment `i` does not start at the end of fragment `i - 1`.
    pub fn find_discontinuities(&self, eps: f64) -> Vec<usize> {
        let segs = self.segments();
        (1..segs.len())
            .filter(|&i| (segs[i - 1].at1() - segs[i].at0()).hypot() > eps)
            .collect()
    }

    /// The same fragments with a straight line inserted across every jump larger than `eps`.
    pub fn bridged(&self, eps: f64) -> Self {
        let mut out = Self::new();
        let mut last: Option<Point> = None;
        for seg in self.segments() {
            if let Some(prev) = last {
                if (seg.at0() - prev).hypot() > eps {
                    out.concat(&Self::from_segment(Curve2::line(prev, seg.at0())));
                }
            }
            out.concat(&Self::from_segment(seg.clone()));
            last = Some(seg.at1());
        }
        out
    }
}

/// A direction sampled from a curve's tangent; helper for callers working in plain vectors.
pub fn tangent_at(curve: &PiecewiseCurve, t: f64) -> Vec2 {
    if curve.is_empty() {
        return Vec2::ZERO;
    }
    let i = curve.segment_index(t);
    let seg = curve.segment(i);
    let u = curve.local(i, t);
    let mut v = seg.velocity(u);
    if v.hypot() <= EPSILON {
        v = seg.velocity((u + 1e-3).min(1.0)) + seg.velocity((u - 1e-3).max(0.0));
    }
    unit_or_zero(v)
}

/// Normal at `t`: the tangent rotated by +90 degrees.
pub fn normal_at(curve: &PiecewiseCurve, t: f64) -> Vec2 {
    rot90(tangent_at(curve, t))
}

#[cfg(test)]
#[path = "../../tests/unit/geom/curve.rs"]
mod tests;
