//! Power-basis polynomials on the unit interval.
//!
//! `Poly` is the scalar building block of every piecewise curve: each fragment of a
//! [`crate::PiecewiseCurve`] is a pair of these, evaluated over a local parameter `u` in
//! `[0, 1]`. Arithmetic is exact (up to floating point); degree grows under products and
//! composition.

use std::ops::{Add, Mul, Neg, Sub};

use smallvec::{SmallVec, smallvec};

use crate::foundation::math::bisect;

#[derive(Clone, Debug, PartialEq)]
pub struct Poly {
    coeffs: SmallVec<[f64; 4]>,
}

impl Default for Poly {
    fn default() -> Self {
        Self::zero()
    }
}

impl Poly {
    pub fn zero() -> Self {
        Self {
            coeffs: smallvec![0.0],
        }
    }

    pub fn constant(c: f64) -> Self {
        Self {
            coeffs: smallvec![c],
        }
    }

    /// Straight interpolation: `a` at `u = 0`, `b` at `u = 1`.
    pub fn linear(a: f64, b: f64) -> Self {
        Self {
            coeffs: smallvec![a, b - a],
        }
    }

    pub fn from_coeffs(coeffs: &[f64]) -> Self {
        if coeffs.is_empty() {
            return Self::zero();
        }
        Self {
            coeffs: SmallVec::from_slice(coeffs),
        }
    }

    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    /// Degree ignoring trailing zero coefficients.
    pub fn degree(&self) -> usize {
        let mut d = self.coeffs.len() - 1;
        while d > 0 && self.coeffs[d] == 0.0 {
            d -= 1;
        }
        d
    }

    pub fn is_constant(&self) -> bool {
        self.degree() == 0
    }

    pub fn eval(&self, u: f64) -> f64 {
        self.coeffs.iter().rev().fold(0.0, |acc, c| acc * u + c)
    }

    pub fn at0(&self) -> f64 {
        self.coeffs[0]
    }

    pub fn at1(&self) -> f64 {
        self.coeffs.iter().sum()
    }

    pub fn derivative(&self) -> Self {
        if self.coeffs.len() <= 1 {
            return Self::zero();
        }
        let coeffs: SmallVec<[f64; 4]> = self
            .coeffs
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, c)| c * i as f64)
            .collect();
        Self { coeffs }
    }

    pub fn scale(&self, k: f64) -> Self {
        Self {
            coeffs: self.coeffs.iter().map(|c| c * k).collect(),
        }
    }

    pub fn shift(&self, k: f64) -> Self {
        let mut out = self.clone();
        out.coeffs[0] += k;
        out
    }

    /// `self(inner(u))`, by Horner's scheme over polynomials.
    pub fn compose(&self, inner: &Poly) -> Self {
        let mut acc = Poly::constant(0.0);
        for c in self.coeffs.iter().rev() {
            acc = (&acc * inner).shift(*c);
        }
        acc.trimmed()
    }

    /// The restriction to `[from, to]`, reparametrized onto `[0, 1]`.
    pub fn portion(&self, from: f64, to: f64) -> Self {
        self.compose(&Poly::linear(from, to))
    }

    pub fn reversed(&self) -> Self {
        self.portion(1.0, 0.0)
    }

    /// Drops exactly-zero trailing coefficients.
    pub fn trimmed(mut self) -> Self {
        while self.coeffs.len() > 1 && self.coeffs[self.coeffs.len() - 1] == 0.0 {
            self.coeffs.pop();
        }
        self
    }

    /// Real roots within `[lo, hi]`, ascending, duplicates merged.
    pub fn roots_in(&self, lo: f64, hi: f64) -> Vec<f64> {
        let p = self.clone().trimmed();
        let mut roots = match p.degree() {
            0 => Vec::new(),
            1 => {
                let r = -p.coeffs[0] / p.coeffs[1];
                if r >= lo && r <= hi { vec![r] } else { Vec::new() }
            }
            2 => quadratic_roots(p.coeffs[2], p.coeffs[1], p.coeffs[0])
                .into_iter()
                .filter(|r| *r >= lo && *r <= hi)
                .collect(),
            _ => {
                let mut knots = vec![lo];
                knots.extend(p.derivative().roots_in(lo, hi));
                knots.push(hi);
                let scale = p.coeffs.iter().fold(0.0f64, |m, c| m.max(c.abs()));
                let zero_eps = 1e-12 * scale.max(1.0);
                let mut out = Vec::new();
                for w in knots.windows(2) {
                    let (a, b) = (w[0], w[1]);
                    let fa = p.eval(a);
                    let fb = p.eval(b);
                    if fa.abs() <= zero_eps {
                        out.push(a);
                    } else if fb.abs() > zero_eps && (fa < 0.0) != (fb < 0.0) {
                        out.push(bisect(|u| p.eval(u), a, b));
                    }
                }
                if p.eval(hi).abs() <= zero_eps {
                    out.push(hi);
                }
                out
            }
        };
        roots.sort_by(f64::total_cmp);
        roots.dedup_by(|a, b| (*a - *b).abs() <= 1e-10);
        roots
    }

    pub fn roots_unit(&self) -> Vec<f64> {
        self.roots_in(0.0, 1.0)
    }

    /// Exact value range over `[0, 1]`.
    pub fn range(&self) -> (f64, f64) {
        let mut lo = self.at0().min(self.at1());
        let mut hi = self.at0().max(self.at1());
        for r in self.derivative().roots_unit() {
            let v = self.eval(r);
            lo = lo.min(v);
            hi = hi.max(v);
        }
        (lo, hi)
    }
}

fn quadratic_roots(a: f64, b: f64, c: f64) -> SmallVec<[f64; 2]> {
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return SmallVec::new();
    }
    if disc == 0.0 {
        return smallvec![-b / (2.0 * a)];
    }
    // Numerically stable form.
    let q = -0.5 * (b + b.signum() * disc.sqrt());
    let mut r: SmallVec<[f64; 2]> = smallvec![q / a];
    if q != 0.0 {
        r.push(c / q);
    } else {
        r.push(-r[0]);
    }
    r
}

impl Add for &Poly {
    type Output = Poly;

    fn add(self, rhs: &Poly) -> Poly {
        let n = self.coeffs.len().max(rhs.coeffs.len());
        let coeffs = (0..n)
            .map(|i| {
                self.coeffs.get(i).copied().unwrap_or(0.0)
                    + rhs.coeffs.get(i).copied().unwrap_or(0.0)
            })
            .collect();
        Poly { coeffs }
    }
}

impl Sub for &Poly {
    type Output = Poly;

    fn sub(self, rhs: &Poly) -> Poly {
        self + &(-rhs)
    }
}

impl Neg for &Poly {
    type Output = Poly;

    fn neg(self) -> Poly {
        self.scale(-1.0)
    }
}

impl Mul for &Poly {
    type Output = Poly;

    fn mul(self, rhs: &Poly) -> Poly {
        let len = self.coeffs.len() + rhs.coeffs.len() - 1;
        let mut coeffs: SmallVec<[f64; 4]> = smallvec![0.0; len];
        for (i, a) in self.coeffs.iter().enumerate() {
            if *a == 0.0 {
                continue;
            }
            for (j, b) in rhs.coeffs.iter().enumerate() {
                coeffs[i + j] += a * b;
            }
        }
        Poly { coeffs }
    }
}

impl Add for Poly {
    type Output = Poly;

    fn add(self, rhs: Poly) -> Poly {
        &self + &rhs
    }
}

impl Sub for Poly {
    type Output = Poly;

    fn sub(self, rhs: Poly) -> Poly {
        &self - &rhs
    }
}

impl Mul for Poly {
    type Output = Poly;

    fn mul(self, rhs: Poly) -> Poly {
        &self * &rhs
    }
}

impl Neg for Poly {
    type Output = Poly;

    fn neg(self) -> Poly {
        -&self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geom/poly.rs"]
mod tests;
