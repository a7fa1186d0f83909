//! Per-node fillets, inverse fillets and chamfers.
//!
//! One `(radius, type)` entry per node, in path order: type 0 leaves the node alone, 1 rounds
//! it, 2 rounds it inwards and 3 or more cuts it with `type - 2` straight pieces. The radius is
//! the fillet radius, or with `flexible` a fraction of the largest cut the adjacent segments
//! allow.

use kurbo::{
    Arc, BezPath, CubicBez, Line, ParamCurve, ParamCurveArclen, ParamCurveNearest, PathEl,
    PathSeg, Point, SvgArc, Vec2,
};

use super::{EffectContext, PathEffect};
use crate::foundation::core::EPSILON;
use crate::foundation::error::{LpeError, LpeResult};
use crate::foundation::math::angle_between;
use crate::geom::path::{ARCLEN_ACCURACY, Subpath, segment_direction, subpaths};
use crate::interaction::{HandleProvider, HandleTarget, Modifiers};
use crate::params::{BoolParam, EnumParam, Parameter, PointArrayParam, ScalarParam};

const VALUES: &str = "fillet_chamfer_values";

/// Bezier handle length for a quarter circle of unit radius.
const KAPPA: f64 = 0.552_284_749_830_793_6;

/// Turns smaller than this (radians) count as smooth.
const SMOOTH_TURN: f64 = 1e-3;

crate::param_enum! {
    pub enum FilletMethod {
        Auto => ("auto", "Auto"),
        Arc => ("arc", "Force arc"),
        Bezier => ("bezier", "Force bezier"),
    }
}

/// A node and the segments meeting at it.
#[derive(Clone, Copy, Debug)]
struct Knot {
    incoming: Option<PathSeg>,
    outgoing: PathSeg,
}

impl Knot {
    fn node(&self) -> Point {
        self.outgoing.start()
    }

    /// Unsigned turn angle at the node; zero at open ends.
    fn turn(&self) -> f64 {
        match self.incoming {
            Some(inc) => angle_between(
                segment_direction(&inc, 1.0),
                segment_direction(&self.outgoing, 0.0),
            )
            .abs(),
            None => 0.0,
        }
    }

    /// Longest cut either adjacent segment allows.
    fn limit(&self) -> f64 {
        let Some(inc) = self.incoming else {
            return 0.0;
        };
        0.5 * inc
            .arclen(ARCLEN_ACCURACY)
            .min(self.outgoing.arclen(ARCLEN_ACCURACY))
    }
}

/// The rounding curve between the two cut points.
enum Rounding {
    Arc(Arc),
    Curve(CubicBez),
    Line(Line),
}

impl Rounding {
    fn eval(&self, s: f64) -> Point {
        match self {
            Rounding::Arc(arc) => {
                let angle = arc.start_angle + arc.sweep_angle * s;
                arc.center + Vec2::from_angle(angle) * arc.radii.x
            }
            Rounding::Curve(c) => c.eval(s),
            Rounding::Line(l) => l.eval(s),
        }
    }

    fn push_to(&self, sp: &mut Subpath, tol: f64) {
        match self {
            Rounding::Arc(arc) => {
                let mut cur = arc.center + Vec2::from_angle(arc.start_angle) * arc.radii.x;
                for el in arc.append_iter(tol) {
                    if let PathEl::CurveTo(p1, p2, p3) = el {
                        sp.push(PathSeg::Cubic(CubicBez::new(cur, p1, p2, p3)));
                        cur = p3;
                    }
                }
            }
            Rounding::Curve(c) => sp.push(PathSeg::Cubic(*c)),
            Rounding::Line(l) => sp.push(PathSeg::Line(*l)),
        }
    }
}

/// `p` mirrored across the line through `a` and `b`.
fn reflect(p: Point, a: Point, b: Point) -> Point {
    let d = b - a;
    let len2 = d.hypot2();
    if len2 <= EPSILON * EPSILON {
        return p;
    }
    let foot = a + d * ((p - a).dot(d) / len2);
    foot + (foot - p)
}

fn is_line(seg: &PathSeg) -> bool {
    matches!(seg, PathSeg::Line(_))
}

/// Local time on `seg` at arc length `s` from its start.
fn time_at_length(seg: &PathSeg, s: f64) -> f64 {
    if s <= 0.0 {
        return 0.0;
    }
    seg.inv_arclen(s, ARCLEN_ACCURACY).clamp(0.0, 1.0)
}

#[derive(Clone, Debug)]
pub struct FilletChamfer {
    values: PointArrayParam,
    method: EnumParam<FilletMethod>,
    radius: ScalarParam,
    chamfer_steps: ScalarParam,
    flexible: BoolParam,
    ignore_radius_0: BoolParam,
    hide_knots: BoolParam,
    knots: Vec<Knot>,
}

impl Default for FilletChamfer {
    fn default() -> Self {
        Self::new()
    }
}

impl FilletChamfer {
    pub fn new() -> Self {
        Self {
            values: PointArrayParam::new(VALUES, "Fillet point"),
            method: EnumParam::new("method", "Method", FilletMethod::Auto),
            radius: ScalarParam::scalar("radius", "Radius", 0.0).range(0.0, 1e9),
            chamfer_steps: ScalarParam::scalar("chamfer_steps", "Chamfer steps", 0.0)
                .range(0.0, 1e6)
                .integer(),
            flexible: BoolParam::new("flexible", "Flexible radius size", false),
            ignore_radius_0: BoolParam::new("ignore_radius_0", "Ignore 0 radius knots", false),
            hide_knots: BoolParam::new("hide_knots", "Hide knots", false),
            knots: Vec::new(),
        }
    }

    fn knots_of(input: &BezPath) -> Vec<Knot> {
        let mut out = Vec::new();
        for sp in subpaths(input) {
            let n = sp.segments.len();
            for (i, seg) in sp.segments.iter().enumerate() {
                let incoming = match i {
                    0 if sp.closed => Some(sp.segments[n - 1]),
                    0 => None,
                    _ => Some(sp.segments[i - 1]),
                };
                out.push(Knot {
                    incoming,
                    outgoing: *seg,
                });
            }
        }
        out
    }

    fn initial_entry(&self, knot: &Knot) -> Point {
        let cusp = knot.turn() > SMOOTH_TURN;
        Point::new(0.0, if cusp { 1.0 } else { 0.0 })
    }

    fn kind(entry: Point) -> u32 {
        entry.y.abs().round() as u32
    }

    fn effective_radius(&self, entry: Point) -> f64 {
        if entry.x > 0.0 {
            entry.x
        } else if self.ignore_radius_0.value() {
            0.0
        } else {
            self.radius.value()
        }
    }

    /// Distance from the node to where each adjacent segment is cut.
    fn cut_length(&self, knot: &Knot, entry: Point) -> f64 {
        let turn = knot.turn();
        if Self::kind(entry) == 0 || knot.incoming.is_none() || turn <= SMOOTH_TURN {
            return 0.0;
        }
        let limit = knot.limit();
        let r = self.effective_radius(entry);
        let d = if self.flexible.value() {
            r.clamp(0.0, 1.0) * limit
        } else {
            r * (0.5 * turn).tan()
        };
        d.clamp(0.0, limit)
    }

    /// Inverse of [`Self::cut_length`] for handle drags.
    fn radius_for_cut(&self, knot: &Knot, cut: f64) -> f64 {
        if self.flexible.value() {
            let limit = knot.limit();
            return if limit > EPSILON {
                (cut / limit).clamp(0.0, 1.0)
            } else {
                0.0
            };
        }
        let tan = (0.5 * knot.turn()).tan();
        if tan > EPSILON { cut / tan } else { 0.0 }
    }

    fn rounding(&self, knot: &Knot, kind: u32, a: Point, b: Point) -> Rounding {
        let Some(inc) = knot.incoming else {
            return Rounding::Line(Line::new(a, b));
        };
        let out = knot.outgoing;
        let (u_in, u_out) = (segment_direction(&inc, 1.0), segment_direction(&out, 0.0));
        let inverse = kind == 2;
        let use_arc = match *self.method.get() {
            FilletMethod::Arc => true,
            FilletMethod::Bezier => false,
            FilletMethod::Auto => is_line(&inc) && is_line(&out),
        };
        if use_arc {
            let turn = knot.turn();
            let half = (0.5 * turn).sin();
            let chord = (b - a).hypot();
            if half > EPSILON && chord > EPSILON {
                let r = 0.5 * chord / half;
                let svg = SvgArc {
                    from: a,
                    to: b,
                    radii: Vec2::new(r, r),
                    x_rotation: 0.0,
                    large_arc: false,
                    sweep: (u_in.cross(u_out) > 0.0) != inverse,
                };
                if let Some(arc) = Arc::from_svg_arc(&svg) {
                    return Rounding::Arc(arc);
                }
            }
            return Rounding::Line(Line::new(a, b));
        }
        let node = knot.node();
        let k1 = (node - a).hypot() * KAPPA;
        let k2 = (node - b).hypot() * KAPPA;
        let (mut h1, mut h2) = (a + u_in * k1, b - u_out * k2);
        if inverse {
            h1 = reflect(h1, a, b);
            h2 = reflect(h2, a, b);
        }
        Rounding::Curve(CubicBez::new(a, h1, h2, b))
    }

    fn push_corner(&self, sp: &mut Subpath, knot: &Knot, entry: Point, b: Point, tol: f64) {
        let a = sp.end();
        let kind = Self::kind(entry);
        let rounding = self.rounding(knot, kind, a, b);
        if kind >= 3 {
            let pieces = kind - 2;
            let mut cur = a;
            for i in 1..=pieces {
                let next = rounding.eval(i as f64 / pieces as f64);
                sp.push(PathSeg::Line(Line::new(cur, next)));
                cur = next;
            }
        } else {
            rounding.push_to(sp, tol);
        }
    }

    fn entry(&self, index: usize) -> Point {
        self.values.get(index).unwrap_or(Point::ZERO)
    }

    fn fillet_subpath(&self, sp: &Subpath, base: usize, tol: f64) -> Subpath {
        let n = sp.segments.len();
        let cuts: Vec<f64> = (0..n)
            .map(|j| match self.knots.get(base + j) {
                Some(knot) => self.cut_length(knot, self.entry(base + j)),
                None => 0.0,
            })
            .collect();
        let next = |j: usize| {
            if j + 1 < n {
                Some(j + 1)
            } else if sp.closed {
                Some(0)
            } else {
                None
            }
        };
        let trimmed: Vec<PathSeg> = sp
            .segments
            .iter()
            .enumerate()
            .map(|(j, seg)| {
                let len = seg.arclen(ARCLEN_ACCURACY);
                let end_cut = next(j).map(|k| cuts[k]).unwrap_or(0.0);
                let t0 = time_at_length(seg, cuts[j]);
                let t1 = time_at_length(seg, len - end_cut).max(t0);
                seg.subsegment(t0..t1)
            })
            .collect();

        let mut out = Subpath::new(trimmed[0].start());
        for (j, seg) in trimmed.iter().enumerate() {
            out.push(*seg);
            let Some(k) = next(j) else {
                continue;
            };
            if cuts[k] <= EPSILON {
                continue;
            }
            if let Some(knot) = self.knots.get(base + k) {
                self.push_corner(&mut out, knot, self.entry(base + k), trimmed[k].start(), tol);
            }
        }
        out.closed = sp.closed;
        out
    }

    fn next_kind(&self, kind: u32) -> u32 {
        match kind {
            0 | 1 => 2,
            2 => self.chamfer_steps.count() as u32 + 3,
            _ => 1,
        }
    }
}

impl PathEffect for FilletChamfer {
    fn params(&self) -> Vec<&dyn Parameter> {
        vec![
            &self.values,
            &self.method,
            &self.radius,
            &self.chamfer_steps,
            &self.flexible,
            &self.ignore_radius_0,
            &self.hide_knots,
        ]
    }

    fn params_mut(&mut self) -> Vec<&mut dyn Parameter> {
        vec![
            &mut self.values,
            &mut self.method,
            &mut self.radius,
            &mut self.chamfer_steps,
            &mut self.flexible,
            &mut self.ignore_radius_0,
            &mut self.hide_knots,
        ]
    }

    fn on_apply(&mut self, base: &BezPath, _ctx: &EffectContext) {
        let knots = Self::knots_of(base);
        let entries: Vec<Point> = knots.iter().map(|k| self.initial_entry(k)).collect();
        self.values.set_default_points(entries.clone());
        self.values.set_points(entries);
    }

    /// Keeps one entry per node when the path gains or loses nodes.
    fn before_effect(&mut self, input: &BezPath, _ctx: &EffectContext) {
        self.knots = Self::knots_of(input);
        if self.values.len() == self.knots.len() {
            return;
        }
        let mut entries = self.values.points().to_vec();
        entries.truncate(self.knots.len());
        for knot in &self.knots[entries.len()..] {
            entries.push(self.initial_entry(knot));
        }
        tracing::debug!(nodes = self.knots.len(), "resized fillet entries");
        self.values.set_points(entries);
    }

    fn do_effect_path(&mut self, input: &BezPath, ctx: &EffectContext) -> LpeResult<BezPath> {
        let subs = subpaths(input);
        if subs.is_empty() {
            return Err(LpeError::degenerate("fillet needs at least one segment"));
        }
        if self.knots.len() != subs.iter().map(|sp| sp.segments.len()).sum::<usize>() {
            self.knots = Self::knots_of(input);
        }
        let mut out = BezPath::new();
        let mut base = 0;
        for sp in &subs {
            self.fillet_subpath(sp, base, ctx.tolerance).append_to(&mut out);
            base += sp.segments.len();
        }
        Ok(out)
    }
}

impl HandleProvider for FilletChamfer {
    fn handle_targets(&self) -> Vec<HandleTarget> {
        if self.hide_knots.value() {
            return Vec::new();
        }
        (0..self.values.len().min(self.knots.len()))
            .map(|index| HandleTarget::Entry { key: VALUES, index })
            .collect()
    }

    fn handle_position(&self, target: &HandleTarget) -> Option<Point> {
        let HandleTarget::Entry { key: VALUES, index } = *target else {
            return None;
        };
        let knot = self.knots.get(index)?;
        let cut = self.cut_length(knot, self.values.get(index)?);
        Some(knot.outgoing.eval(time_at_length(&knot.outgoing, cut)))
    }

    /// Dragging sets the radius from where the pointer projects onto the outgoing segment;
    /// shift cycles fillet, inverse fillet and chamfer instead.
    fn set_handle_position(&mut self, target: &HandleTarget, p: Point, mods: Modifiers) -> bool {
        let HandleTarget::Entry { key: VALUES, index } = *target else {
            return false;
        };
        let (Some(knot), Some(entry)) = (self.knots.get(index).copied(), self.values.get(index))
        else {
            return false;
        };
        let kind = Self::kind(entry);
        if mods.shift {
            let next = self.next_kind(kind);
            return self.values.set_point(index, Point::new(entry.x, next as f64));
        }
        let t = knot.outgoing.nearest(p, ARCLEN_ACCURACY).t;
        let cut = knot.outgoing.subsegment(0.0..t).arclen(ARCLEN_ACCURACY);
        let radius = self.radius_for_cut(&knot, cut);
        let kind = if kind == 0 { 1 } else { kind };
        self.values
            .set_point(index, Point::new(radius, kind as f64))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/fillet_chamfer.rs"]
mod tests;
