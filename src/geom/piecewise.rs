//! Piecewise functions over a strictly increasing cut sequence.
//!
//! A `Piecewise<T>` with cuts `t0 < t1 < ... < tn` holds one fragment per interval; fragment
//! `i` is evaluated at the local parameter `(t - t_i) / (t_{i+1} - t_i)`. The same container
//! backs scalar functions (`Piecewise<Poly>`) and plane curves (`Piecewise<Curve2>`).

use std::fmt;

use crate::foundation::core::{CUT_EPSILON, Interval};
use crate::geom::poly::Poly;

/// One polynomial piece of a piecewise function, parametrized on `[0, 1]`.
pub trait Fragment: Clone + fmt::Debug {
    type Value: Copy;

    fn value_at(&self, u: f64) -> Self::Value;

    fn portion(&self, from: f64, to: f64) -> Self;

    fn reversed(&self) -> Self;

    /// `self(inner(u))`.
    fn compose(&self, inner: &Poly) -> Self;
}

impl Fragment for Poly {
    type Value = f64;

    fn value_at(&self, u: f64) -> f64 {
        self.eval(u)
    }

    fn portion(&self, from: f64, to: f64) -> Self {
        Poly::portion(self, from, to)
    }

    fn reversed(&self) -> Self {
        Poly::reversed(self)
    }

    fn compose(&self, inner: &Poly) -> Self {
        Poly::compose(self, inner)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Piecewise<T> {
    cuts: Vec<f64>,
    segs: Vec<T>,
}

impl<T> Default for Piecewise<T> {
    fn default() -> Self {
        Self {
            cuts: Vec::new(),
            segs: Vec::new(),
        }
    }
}

impl<T: Fragment> Piecewise<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single fragment over `[0, 1]`.
    pub fn from_segment(seg: T) -> Self {
        Self {
            cuts: vec![0.0, 1.0],
            segs: vec![seg],
        }
    }

    /// Returns `None` unless `cuts` is strictly increasing with one more entry than `segs`.
    pub fn from_parts(cuts: Vec<f64>, segs: Vec<T>) -> Option<Self> {
        if segs.is_empty() || cuts.len() != segs.len() + 1 {
            return None;
        }
        if cuts.windows(2).any(|w| !(w[0] < w[1])) {
            return None;
        }
        Some(Self { cuts, segs })
    }

    pub fn len(&self) -> usize {
        self.segs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segs.is_empty()
    }

    pub fn cuts(&self) -> &[f64] {
        &self.cuts
    }

    pub fn segments(&self) -> &[T] {
        &self.segs
    }

    pub fn segment(&self, i: usize) -> &T {
        &self.segs[i]
    }

    /// Sets the start cut of an empty piecewise; ignored otherwise.
    pub fn push_cut(&mut self, start: f64) {
        if self.cuts.is_empty() {
            self.cuts.push(start);
        }
    }

    /// Appends a fragment ending at `to`. Fragments that would not advance the domain are dropped.
    pub fn push(&mut self, seg: T, to: f64) {
        let Some(&last) = self.cuts.last() else {
            self.cuts.push(to - 1.0);
            self.cuts.push(to);
            self.segs.push(seg);
            return;
        };
        if to > last {
            self.cuts.push(to);
            self.segs.push(seg);
        }
    }

    pub fn domain(&self) -> Option<Interval> {
        if self.segs.is_empty() {
            return None;
        }
        Some(Interval::new(self.cuts[0], self.cuts[self.cuts.len() - 1]))
    }

    fn cut_eps(&self) -> f64 {
        let extent = self.domain().map(|d| d.extent()).unwrap_or(1.0);
        CUT_EPSILON * extent.abs().max(1.0)
    }

    /// Index of the fragment containing `t`, clamped to the valid range.
    pub fn segment_index(&self, t: f64) -> usize {
        let n = self.segs.len();
        if n == 0 {
            return 0;
        }
        let idx = self.cuts.partition_point(|c| *c <= t);
        idx.saturating_sub(1).min(n - 1)
    }

    /// Local fragment parameter of global time `t` within fragment `i`.
    pub fn local(&self, i: usize, t: f64) -> f64 {
        (t - self.cuts[i]) / (self.cuts[i + 1] - self.cuts[i])
    }

    /// Global time of local parameter `u` within fragment `i`.
    pub fn global(&self, i: usize, u: f64) -> f64 {
        self.cuts[i] + (self.cuts[i + 1] - self.cuts[i]) * u
    }

    pub fn value_at(&self, t: f64) -> Option<T::Value> {
        if self.segs.is_empty() {
            return None;
        }
        let i = self.segment_index(t);
        Some(self.segs[i].value_at(self.local(i, t)))
    }

    pub fn first_value(&self) -> Option<T::Value> {
        self.segs.first().map(|s| s.value_at(0.0))
    }

    pub fn last_value(&self) -> Option<T::Value> {
        self.segs.last().map(|s| s.value_at(1.0))
    }

    /// Rebuilds the function over exactly `cuts`, which must span the current domain.
    fn repartition(&self, cuts: &[f64]) -> Self {
        let mut out = Self::new();
        if self.is_empty() || cuts.len() < 2 {
            return out;
        }
        out.cuts.push(cuts[0]);
        for w in cuts.windows(2) {
            let (a, b) = (w[0], w[1]);
            let i = self.segment_index(0.5 * (a + b));
            let seg = self.segs[i].portion(self.local(i, a), self.local(i, b));
            out.cuts.push(b);
            out.segs.push(seg);
        }
        out
    }

    /// Inserts `extra` cuts inside the domain without changing the function's values.
    pub fn partition(&self, extra: &[f64]) -> Self {
        let Some(dom) = self.domain() else {
            return self.clone();
        };
        let eps = self.cut_eps();
        let inside: Vec<f64> = extra
            .iter()
            .copied()
            .filter(|c| *c > dom.min + eps && *c < dom.max - eps)
            .collect();
        if inside.is_empty() {
            return self.clone();
        }
        let merged = merge_cuts(&self.cuts, &inside, eps);
        self.repartition(&merged)
    }

    /// The restriction to `[from, to]` (clamped to the domain), keeping global times.
    pub fn portion(&self, from: f64, to: f64) -> Self {
        let Some(dom) = self.domain() else {
            return Self::new();
        };
        let (from, to) = (dom.clamp(from.min(to)), dom.clamp(from.max(to)));
        if to - from <= self.cut_eps() {
            return Self::new();
        }
        let eps = self.cut_eps();
        let mut cuts = vec![from];
        cuts.extend(
            self.cuts
                .iter()
                .copied()
                .filter(|c| *c > from + eps && *c < to - eps),
        );
        cuts.push(to);
        self.repartition(&cuts)
    }

    /// Same domain, traversed backwards.
    pub fn reversed(&self) -> Self {
        let Some(dom) = self.domain() else {
            return Self::new();
        };
        let cuts = self
            .cuts
            .iter()
            .rev()
            .map(|c| dom.min + dom.max - c)
            .collect();
        let segs = self.segs.iter().rev().map(|s| s.reversed()).collect();
        Self { cuts, segs }
    }

    /// Appends `other` after the current domain, shifting its times; no continuity is implied.
    pub fn concat(&mut self, other: &Self) {
        let Some(odom) = other.domain() else {
            return;
        };
        let shift = match self.domain() {
            Some(dom) => dom.max - odom.min,
            None => {
                self.cuts.push(odom.min);
                0.0
            }
        };
        for (i, seg) in other.segs.iter().enumerate() {
            self.cuts.push(other.cuts[i + 1] + shift);
            self.segs.push(seg.clone());
        }
    }

    /// Linearly rescales the cut sequence onto `dom`.
    pub fn set_domain(&mut self, dom: Interval) {
        let Some(cur) = self.domain() else {
            return;
        };
        if dom.is_degenerate() || cur.is_degenerate() {
            return;
        }
        let k = dom.extent() / cur.extent();
        for c in &mut self.cuts {
            *c = dom.min + (*c - cur.min) * k;
        }
        // Pin the ends so shared domains compare equal.
        let n = self.cuts.len();
        self.cuts[0] = dom.min;
        self.cuts[n - 1] = dom.max;
    }

    pub fn offset_domain(&mut self, dt: f64) {
        for c in &mut self.cuts {
            *c += dt;
        }
    }

    pub fn map<U: Fragment>(&self, f: impl Fn(&T) -> U) -> Piecewise<U> {
        Piecewise {
            cuts: self.cuts.clone(),
            segs: self.segs.iter().map(f).collect(),
        }
    }

    /// Combines two functions that already share the same cut sequence.
    pub(crate) fn zip_with<U: Fragment, V: Fragment>(
        &self,
        other: &Piecewise<U>,
        f: impl Fn(&T, &U) -> V,
    ) -> Piecewise<V> {
        debug_assert_eq!(self.cuts.len(), other.cuts.len());
        Piecewise {
            cuts: self.cuts.clone(),
            segs: self
                .segs
                .iter()
                .zip(other.segs.iter())
                .map(|(a, b)| f(a, b))
                .collect(),
        }
    }
}

/// Sorted union of two cut lists; entries within `eps` of an earlier one collapse into it.
pub fn merge_cuts(a: &[f64], b: &[f64], eps: f64) -> Vec<f64> {
    let mut all: Vec<f64> = a.iter().chain(b.iter()).copied().collect();
    all.sort_by(f64::total_cmp);
    let mut out: Vec<f64> = Vec::with_capacity(all.len());
    for c in all {
        match out.last() {
            Some(&last) if c - last <= eps => {}
            _ => out.push(c),
        }
    }
    out
}

/// Re-cuts both functions at the union of their cut sets so they share one partition.
///
/// When the domains differ, `b` is first rescaled onto `a`'s domain.
pub fn mutual_partition<A: Fragment, B: Fragment>(
    a: &Piecewise<A>,
    b: &Piecewise<B>,
) -> (Piecewise<A>, Piecewise<B>) {
    let (Some(da), Some(db)) = (a.domain(), b.domain()) else {
        return (Piecewise::new(), Piecewise::new());
    };
    let mut b = b.clone();
    let eps = a.cut_eps();
    if (da.min - db.min).abs() > eps || (da.max - db.max).abs() > eps {
        b.set_domain(da);
    }
    let mut union = merge_cuts(&a.cuts, &b.cuts, eps);
    // Both ends must be the exact shared domain.
    let n = union.len();
    union[0] = da.min;
    union[n - 1] = da.max;
    (a.repartition(&union), b.repartition(&union))
}

/// `outer(inner(t))`: splits `inner` wherever it crosses one of `outer`'s cuts so each piece
/// composes with a single fragment.
pub fn compose<T: Fragment>(outer: &Piecewise<T>, inner: &Piecewise<Poly>) -> Piecewise<T> {
    let mut out = Piecewise::new();
    let Some(dom) = outer.domain() else {
        return out;
    };
    let interior = &outer.cuts[1..outer.cuts.len() - 1];
    for (j, g) in inner.segs.iter().enumerate() {
        let mut us = vec![0.0, 1.0];
        for c in interior {
            us.extend(g.shift(-c).roots_unit());
        }
        us.sort_by(f64::total_cmp);
        us.dedup_by(|x, y| (*x - *y).abs() <= 1e-9);
        for w in us.windows(2) {
            let (ua, ub) = (w[0], w[1]);
            if ub - ua <= 1e-12 {
                continue;
            }
            let piece = g.portion(ua, ub);
            let i = outer.segment_index(dom.clamp(piece.eval(0.5)));
            let width = outer.cuts[i + 1] - outer.cuts[i];
            let local = piece.shift(-outer.cuts[i]).scale(1.0 / width);
            let t0 = inner.global(j, ua);
            let t1 = inner.global(j, ub);
            out.push_cut(t0);
            out.push(outer.segs[i].compose(&local), t1);
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/geom/piecewise.rs"]
mod tests;
