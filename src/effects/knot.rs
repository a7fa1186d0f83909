//! Knot: where the path crosses itself, one strand is interrupted so the other appears to pass
//! over it.
//!
//! Crossings are found on every recompute and persisted as a flat number list, nine values
//! per crossing. A crossing's sign picks which strand goes under; signs survive edits by
//! matching topology first and the nearest old crossing second.

use kurbo::{Affine, BezPath, Point, Vec2};

use super::{EffectContext, PathEffect};
use crate::foundation::core::{CUT_EPSILON, Interval};
use crate::foundation::error::LpeResult;
use crate::geom::convert::{from_subpath, to_path};
use crate::geom::curve::{PiecewiseCurve, tangent_at};
use crate::geom::intersect::{curve_crossings, self_crossings};
use crate::geom::path::{Subpath, subpaths};
use crate::interaction::{HandleProvider, HandleTarget, Modifiers};
use crate::params::{BoolParam, Parameter, ScalarArrayParam, ScalarParam};

const CROSSING_POINTS: &str = "crossing_points";

/// Values persisted per crossing: x, y, i, j, ni, nj, ti, tj, sign.
const CROSSING_STRIDE: usize = 9;

/// Sign given to crossings with no predecessor.
const DEFAULT_SIGN: i8 = 1;

/// Switcher glyphs, drawn at `switcher_size / 10`.
const SWITCHER_POSITIVE: &str = "m -7.07,7.07 c 3.9,3.91 10.24,3.91 14.14,0 3.91,-3.9 3.91,-10.24 \
     0,-14.14 -3.9,-3.91 -10.24,-3.91 -14.14,0 l 2.83,-4.24 0.7,2.12";
const SWITCHER_NEGATIVE: &str = "m 7.07,7.07 c -3.9,3.91 -10.24,3.91 -14.14,0 -3.91,-3.9 \
     -3.91,-10.24 0,-14.14 3.9,-3.91 10.24,-3.91 14.14,0 l -2.83,-4.24 -0.7,2.12";
const SWITCHER_NEUTRAL: &str = "M 10,0 C 10,5.52 5.52,10 0,10 -5.52,10 -10,5.52 -10,0 \
     c 0,-5.52 4.48,-10 10,-10 5.52,0 10,4.48 10,10 z";

/// One place where strand `i` at time `ti` meets strand `j` at time `tj`.
///
/// `ni` and `nj` rank the crossing among all crossings along each strand; together with the
/// strand indices they identify the crossing across recomputes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Crossing {
    pub point: Point,
    pub i: usize,
    pub j: usize,
    pub ni: usize,
    pub nj: usize,
    pub ti: f64,
    pub tj: f64,
    /// `1` or `-1` choose the under strand relative to the crossing's orientation; `0` draws
    /// both strands uninterrupted.
    pub sign: i8,
}

impl Crossing {
    fn same_topology(&self, other: &Crossing) -> bool {
        self.i == other.i && self.j == other.j && self.ni == other.ni && self.nj == other.nj
    }

    /// Decodes the persisted list; a length that is not a multiple of the stride is empty.
    pub fn decode(values: &[f64]) -> Vec<Crossing> {
        if values.is_empty() || values.len() % CROSSING_STRIDE != 0 {
            return Vec::new();
        }
        let index = |v: f64| if v.is_finite() && v > 0.0 { v.round() as usize } else { 0 };
        values
            .chunks_exact(CROSSING_STRIDE)
            .map(|c| Crossing {
                point: Point::new(c[0], c[1]),
                i: index(c[2]),
                j: index(c[3]),
                ni: index(c[4]),
                nj: index(c[5]),
                ti: c[6],
                tj: c[7],
                sign: c[8].round().clamp(-1.0, 1.0) as i8,
            })
            .collect()
    }

    pub fn encode(crossings: &[Crossing]) -> Vec<f64> {
        crossings
            .iter()
            .flat_map(|c| {
                [
                    c.point.x,
                    c.point.y,
                    c.i as f64,
                    c.j as f64,
                    c.ni as f64,
                    c.nj as f64,
                    c.ti,
                    c.tj,
                    f64::from(c.sign),
                ]
            })
            .collect()
    }
}

fn nearest_index(crossings: &[Crossing], p: Point) -> Option<usize> {
    crossings
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (a.point - p).hypot2().total_cmp(&(b.point - p).hypot2()))
        .map(|(k, _)| k)
}

/// Copies signs from `old`: index by index while the topology matches, else from the
/// nearest old crossing.
fn inherit_signs(fresh: &mut [Crossing], old: &[Crossing]) {
    let topology_kept = fresh.len() <= old.len()
        && fresh.iter().zip(old).all(|(f, o)| f.same_topology(o));
    if topology_kept {
        for (f, o) in fresh.iter_mut().zip(old) {
            f.sign = o.sign;
        }
        return;
    }
    for f in fresh.iter_mut() {
        f.sign = nearest_index(old, f.point).map_or(DEFAULT_SIGN, |k| old[k].sign);
    }
}

/// A non-empty input subpath with its curve over `[0, segment count]`.
#[derive(Clone, Debug)]
struct Strand {
    subpath: Subpath,
    curve: PiecewiseCurve,
}

impl Strand {
    fn period(&self) -> f64 {
        self.curve.domain().map_or(0.0, |d| d.max)
    }
}

fn strands_of(input: &BezPath) -> Vec<Strand> {
    subpaths(input)
        .into_iter()
        .filter(|sp| !sp.is_empty())
        .map(|sp| Strand {
            curve: from_subpath(&sp),
            subpath: sp,
        })
        .collect()
}

fn find_crossings(strands: &[Strand], tol: f64) -> Vec<Crossing> {
    let mut out = Vec::new();
    for (i, a) in strands.iter().enumerate() {
        let mut push = |j: usize, ti: f64, tj: f64| {
            if let Some(point) = a.curve.value_at(ti) {
                out.push(Crossing {
                    point,
                    i,
                    j,
                    ni: 0,
                    nj: 0,
                    ti,
                    tj,
                    sign: DEFAULT_SIGN,
                });
            }
        };
        for (ti, tj) in self_crossings(&a.curve, a.subpath.closed, tol) {
            push(i, ti, tj);
        }
        for (j, b) in strands.iter().enumerate().skip(i + 1) {
            for (ti, tj) in curve_crossings(&a.curve, &b.curve, tol) {
                push(j, ti, tj);
            }
        }
    }
    rank_along_strands(&mut out, strands.len());
    out
}

fn rank_along_strands(crossings: &mut [Crossing], strand_count: usize) {
    for k in 0..strand_count {
        // (time, crossing index, is the `j` end)
        let mut ends: Vec<(f64, usize, bool)> = Vec::new();
        for (n, c) in crossings.iter().enumerate() {
            if c.i == k {
                ends.push((c.ti, n, false));
            }
            if c.j == k {
                ends.push((c.tj, n, true));
            }
        }
        ends.sort_by(|a, b| a.0.total_cmp(&b.0));
        for (rank, (_, n, is_j)) in ends.into_iter().enumerate() {
            if is_j {
                crossings[n].nj = rank;
            } else {
                crossings[n].ni = rank;
            }
        }
    }
}

/// Removes `cut` from the sorted union of intervals `domain`.
fn complement_of(cut: Interval, domain: &[Interval]) -> Vec<Interval> {
    let (Some(first), Some(last)) = (domain.first(), domain.last()) else {
        return Vec::new();
    };
    let before = Interval::new(first.min, cut.min);
    let after = Interval::new(cut.max, last.max);
    let meet = |a: &Interval, b: Interval| {
        let (lo, hi) = (a.min.max(b.min), a.max.min(b.max));
        (hi - lo > CUT_EPSILON).then(|| Interval::new(lo, hi))
    };
    let mut out = Vec::new();
    for d in domain {
        out.extend(meet(d, before));
        out.extend(meet(d, after));
    }
    out
}

/// Time span around `ta` during which `under` stays inside the band of half-width
/// `half_width` (and length six half-widths) centred on the over strand.
///
/// On closed strands the span may start below zero or end past the period.
fn shadowed_time(under: &Strand, at: Point, over_dir: Vec2, ta: f64, half_width: f64) -> Interval {
    let t = over_dir.normalize();
    let n = Vec2::new(t.y, -t.x);
    let o = at.to_vec2();
    let to_frame = Affine::new([t.x, n.x, t.y, n.y, -o.dot(t), -o.dot(n)]);
    let local = under.curve.transform(to_frame);
    let (xs, ys) = (local.x(), local.y());
    let mut times: Vec<f64> = Vec::new();
    times.extend(ys.roots_of(half_width));
    times.extend(ys.roots_of(-half_width));
    times.extend(xs.roots_of(3.0 * half_width));
    times.extend(xs.roots_of(-3.0 * half_width));
    times.sort_by(f64::total_cmp);
    times.dedup_by(|a, b| (*a - *b).abs() <= CUT_EPSILON);

    let period = under.period();
    let closed = under.subpath.closed;
    let (mut tmin, mut tmax) = (0.0, period);
    let rank = times.partition_point(|&x| x <= ta);
    if let Some(&next) = times.get(rank) {
        tmax = next;
    } else if let (true, Some(&first)) = (closed, times.first()) {
        tmax = first + period;
    }
    if rank > 0 {
        tmin = times[rank - 1];
    } else if let (true, Some(&last)) = (closed, times.last()) {
        tmin = last - period;
    }
    Interval::new(tmin, tmax)
}

#[derive(Clone, Debug)]
pub struct Knot {
    interruption_width: ScalarParam,
    prop_to_stroke_width: BoolParam,
    add_stroke_width: BoolParam,
    add_other_stroke_width: BoolParam,
    switcher_size: ScalarParam,
    crossing_points: ScalarArrayParam,
    crossings: Vec<Crossing>,
    selected: usize,
    switcher: Option<Point>,
}

impl Default for Knot {
    fn default() -> Self {
        Self::new()
    }
}

impl Knot {
    pub fn new() -> Self {
        Self {
            interruption_width: ScalarParam::scalar("interruption_width", "Fixed width", 3.0)
                .range(0.0, f64::INFINITY),
            prop_to_stroke_width: BoolParam::new(
                "prop_to_stroke_width",
                "In units of stroke width",
                true,
            ),
            add_stroke_width: BoolParam::new("add_stroke_width", "Stroke width", true),
            add_other_stroke_width: BoolParam::new(
                "add_other_stroke_width",
                "Crossing path stroke width",
                true,
            ),
            switcher_size: ScalarParam::scalar("switcher_size", "Switcher size", 15.0)
                .range(0.0, f64::INFINITY),
            crossing_points: ScalarArrayParam::new(CROSSING_POINTS, "Crossing signs", Vec::new()),
            crossings: Vec::new(),
            selected: 0,
            switcher: None,
        }
    }

    /// Crossings found by the last run, signs included.
    pub fn crossings(&self) -> &[Crossing] {
        &self.crossings
    }

    pub fn selected(&self) -> Option<usize> {
        (self.selected < self.crossings.len()).then_some(self.selected)
    }

    fn gap_width(&self, ctx: &EffectContext) -> f64 {
        let stroke = ctx.stroke_width;
        let mut width = self.interruption_width.value();
        if self.prop_to_stroke_width.value() {
            width *= stroke;
        }
        if self.add_stroke_width.value() {
            width += stroke;
        }
        if self.add_other_stroke_width.value() {
            width += stroke;
        }
        width
    }

    fn update_switcher(&mut self) {
        if self.selected >= self.crossings.len() {
            self.selected = 0;
        }
        self.switcher = self.crossings.get(self.selected).map(|c| c.point);
    }

    /// Parts of strand `k` left visible.
    fn visible_domain(&self, strands: &[Strand], k: usize, ctx: &EffectContext) -> Vec<Interval> {
        let strand = &strands[k];
        let period = strand.period();
        let mut keep = vec![Interval::new(0.0, period)];
        let half = 0.5 * self.gap_width(ctx);
        for c in &self.crossings {
            if c.i != k && c.j != k {
                continue;
            }
            let (Some(si), Some(sj)) = (strands.get(c.i), strands.get(c.j)) else {
                continue;
            };
            let di = tangent_at(&si.curve, c.ti);
            let dj = tangent_at(&sj.curve, c.tj);
            let geom_sign: i8 = if di.cross(dj) < 0.0 { 1 } else { -1 };
            // Time on strand `k` that goes under, and the direction of the strand over it.
            let under = match c.sign * geom_sign {
                s if s > 0 && c.i == k => Some((c.ti, dj)),
                s if s < 0 && c.j == k => Some((c.tj, di)),
                _ => None,
            };
            let Some((t_under, over_dir)) = under else {
                continue;
            };
            if over_dir.hypot() == 0.0 {
                continue;
            }
            let mut hidden = shadowed_time(strand, c.point, over_dir, t_under, half);
            if hidden.max > period {
                hidden = Interval::new(hidden.min - period, hidden.max - period);
            }
            if hidden.min < 0.0 {
                keep = complement_of(Interval::new(0.0, hidden.max), &keep);
                keep = complement_of(Interval::new(hidden.min + period, period), &keep);
            } else {
                keep = complement_of(hidden, &keep);
            }
        }
        keep
    }
}

fn append(out: &mut BezPath, piece: &PiecewiseCurve, tol: f64) {
    for el in to_path(piece, tol).elements() {
        out.push(*el);
    }
}

impl PathEffect for Knot {
    fn params(&self) -> Vec<&dyn Parameter> {
        vec![
            &self.interruption_width,
            &self.prop_to_stroke_width,
            &self.add_stroke_width,
            &self.add_other_stroke_width,
            &self.switcher_size,
            &self.crossing_points,
        ]
    }

    fn params_mut(&mut self) -> Vec<&mut dyn Parameter> {
        vec![
            &mut self.interruption_width,
            &mut self.prop_to_stroke_width,
            &mut self.add_stroke_width,
            &mut self.add_other_stroke_width,
            &mut self.switcher_size,
            &mut self.crossing_points,
        ]
    }

    fn before_effect(&mut self, input: &BezPath, ctx: &EffectContext) {
        let strands = strands_of(input);
        let mut fresh = find_crossings(&strands, ctx.tolerance);
        let old = Crossing::decode(self.crossing_points.get());
        inherit_signs(&mut fresh, &old);
        tracing::debug!(crossings = fresh.len(), "knot crossings");
        self.crossing_points.set(Crossing::encode(&fresh));
        self.crossings = fresh;
        self.update_switcher();
    }

    fn do_effect_path(&mut self, input: &BezPath, ctx: &EffectContext) -> LpeResult<BezPath> {
        if self.crossings.is_empty() {
            return Ok(input.clone());
        }
        let strands = strands_of(input);
        let mut out = BezPath::new();
        for (k, strand) in strands.iter().enumerate() {
            let keep = self.visible_domain(&strands, k, ctx);
            let (Some(front), Some(back)) = (keep.first(), keep.last()) else {
                continue;
            };
            let period = strand.period();
            let mut inner = &keep[..];
            if strand.subpath.closed
                && front.min <= CUT_EPSILON
                && back.max >= period - CUT_EPSILON
            {
                if keep.len() == 1 {
                    strand.subpath.append_to(&mut out);
                    continue;
                }
                // The seam is visible: the last and first pieces form one run.
                let mut wrapped = strand.curve.portion(back.min, back.max);
                wrapped.concat(&strand.curve.portion(front.min, front.max));
                append(&mut out, &wrapped, ctx.tolerance);
                inner = &keep[1..keep.len() - 1];
            }
            for iv in inner {
                append(&mut out, &strand.curve.portion(iv.min, iv.max), ctx.tolerance);
            }
        }
        Ok(out)
    }

    fn indicators(&self) -> Vec<BezPath> {
        let Some(at) = self.switcher else {
            return Vec::new();
        };
        let glyph = match self.crossings.get(self.selected).map(|c| c.sign) {
            Some(s) if s < 0 => SWITCHER_NEGATIVE,
            Some(0) => SWITCHER_NEUTRAL,
            _ => SWITCHER_POSITIVE,
        };
        let Ok(path) = BezPath::from_svg(glyph) else {
            return Vec::new();
        };
        let scale = 0.1 * self.switcher_size.value();
        vec![Affine::translate(at.to_vec2()) * Affine::scale(scale) * path]
    }
}

impl HandleProvider for Knot {
    fn handle_targets(&self) -> Vec<HandleTarget> {
        vec![HandleTarget::Param(CROSSING_POINTS)]
    }

    fn handle_position(&self, target: &HandleTarget) -> Option<Point> {
        if *target != HandleTarget::Param(CROSSING_POINTS) {
            return None;
        }
        self.switcher
    }

    /// Dragging selects the crossing nearest to `p`.
    fn set_handle_position(&mut self, target: &HandleTarget, p: Point, _mods: Modifiers) -> bool {
        if *target != HandleTarget::Param(CROSSING_POINTS) {
            return false;
        }
        let Some(k) = nearest_index(&self.crossings, p) else {
            return false;
        };
        let changed = k != self.selected;
        self.selected = k;
        self.update_switcher();
        changed
    }

    /// Cycles the selected crossing's sign `1 -> -1 -> 0 -> 1`; shift resets it to `1`.
    fn click_handle(&mut self, target: &HandleTarget, mods: Modifiers) -> bool {
        if *target != HandleTarget::Param(CROSSING_POINTS) {
            return false;
        }
        let Some(c) = self.crossings.get_mut(self.selected) else {
            return false;
        };
        c.sign = if mods.shift {
            1
        } else {
            (c.sign + 2).rem_euclid(3) - 1
        };
        self.crossing_points.set(Crossing::encode(&self.crossings));
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/knot.rs"]
mod tests;
