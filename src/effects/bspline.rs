//! Uniform-weight B-spline smoothing of a control polygon.
//!
//! Each input segment's chord gets two handles at `weight` from either end; every smooth
//! interior node moves to the midpoint of the handles around it. A node whose incoming or
//! outgoing handle sits on it is a cusp and keeps its position.

use kurbo::{BezPath, CubicBez, Line, ParamCurve, PathSeg, Point};

use super::{EffectContext, PathEffect};
use crate::foundation::core::{EPSILON, points_near};
use crate::foundation::error::{LpeError, LpeResult};
use crate::geom::path::{Subpath, subpaths};
use crate::interaction::{HandleProvider, HandleTarget, Modifiers, project_onto};
use crate::params::{BoolParam, Parameter, ScalarParam};

const WEIGHT: &str = "weight";
const DEFAULT_WEIGHT: f64 = 0.3334;

#[derive(Clone, Debug)]
pub struct BSpline {
    weight: ScalarParam,
    steps: ScalarParam,
    ignore_cusp: BoolParam,
    show_helper: BoolParam,
    /// First chord of the last input, for the weight handle.
    first_chord: Option<Line>,
    helper: Vec<BezPath>,
}

impl Default for BSpline {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle positions for one chord, before nodes are moved.
#[derive(Clone, Copy, Debug)]
struct Span {
    from: Point,
    to: Point,
    h1: Point,
    h2: Point,
}

impl Span {
    fn start_is_cusp(&self) -> bool {
        points_near(self.h1, self.from, EPSILON)
    }

    fn end_is_cusp(&self) -> bool {
        points_near(self.h2, self.to, EPSILON)
    }
}

impl BSpline {
    pub fn new() -> Self {
        Self {
            weight: ScalarParam::scalar(WEIGHT, "Change weight", DEFAULT_WEIGHT).range(0.0, 1.0),
            steps: ScalarParam::scalar("steps", "Steps with ctrl", 2.0)
                .range(1.0, 10.0)
                .integer(),
            ignore_cusp: BoolParam::new("ignore_cusp", "Ignore cusp nodes", true),
            show_helper: BoolParam::new("show_helper", "Show helper paths", false),
            first_chord: None,
            helper: Vec::new(),
        }
    }

    fn span(&self, seg: &PathSeg) -> Span {
        let (from, to) = (seg.start(), seg.end());
        let w = self.weight.value();
        let mut span = Span {
            from,
            to,
            h1: from.lerp(to, w),
            h2: to.lerp(from, w),
        };
        if self.ignore_cusp.value() {
            if let PathSeg::Cubic(c) = seg {
                if points_near(c.p0, c.p1, EPSILON) {
                    span.h1 = from;
                }
                if points_near(c.p2, c.p3, EPSILON) {
                    span.h2 = to;
                }
            }
        }
        span
    }

    fn smooth(&self, sp: &Subpath) -> Subpath {
        let spans: Vec<Span> = sp
            .segments
            .iter()
            .filter(|s| !points_near(s.start(), s.end(), EPSILON) || !sp.closed)
            .map(|s| self.span(s))
            .collect();
        let n = spans.len();
        if n == 0 {
            return sp.clone();
        }
        let node = |prev: &Span, next: &Span| {
            if prev.end_is_cusp() || next.start_is_cusp() {
                prev.to
            } else {
                prev.h2.midpoint(next.h1)
            }
        };
        // nodes[i] is where span i starts.
        let mut nodes: Vec<Point> = spans.iter().map(|s| s.from).collect();
        for i in 1..n {
            nodes[i] = node(&spans[i - 1], &spans[i]);
        }
        if sp.closed && n > 1 {
            nodes[0] = node(&spans[n - 1], &spans[0]);
        }
        let end = if sp.closed { nodes[0] } else { sp.end() };
        let mut out = Subpath::new(nodes[0]);
        for (i, span) in spans.iter().enumerate() {
            let p3 = nodes.get(i + 1).copied().unwrap_or(end);
            out.push(PathSeg::Cubic(CubicBez::new(nodes[i], span.h1, span.h2, p3)));
        }
        out.closed = sp.closed;
        out
    }

    fn snap_weight(&self, w: f64, mods: Modifiers) -> f64 {
        if !mods.ctrl {
            return w;
        }
        let k = (self.steps.count() + 1) as f64;
        (w * k).round() / k
    }
}

impl PathEffect for BSpline {
    fn params(&self) -> Vec<&dyn Parameter> {
        vec![&self.weight, &self.steps, &self.ignore_cusp, &self.show_helper]
    }

    fn params_mut(&mut self) -> Vec<&mut dyn Parameter> {
        vec![
            &mut self.weight,
            &mut self.steps,
            &mut self.ignore_cusp,
            &mut self.show_helper,
        ]
    }

    fn before_effect(&mut self, input: &BezPath, _ctx: &EffectContext) {
        self.first_chord = subpaths(input)
            .first()
            .and_then(|sp| sp.segments.first())
            .map(|seg| Line::new(seg.start(), seg.end()));
        self.helper.clear();
    }

    fn do_effect_path(&mut self, input: &BezPath, _ctx: &EffectContext) -> LpeResult<BezPath> {
        let subs = subpaths(input);
        if subs.is_empty() {
            return Err(LpeError::degenerate("b-spline needs at least one segment"));
        }
        let mut out = BezPath::new();
        for sp in &subs {
            self.smooth(sp).append_to(&mut out);
        }
        if self.show_helper.value() {
            self.helper.push(input.clone());
        }
        Ok(out)
    }

    fn indicators(&self) -> Vec<BezPath> {
        self.helper.clone()
    }
}

impl HandleProvider for BSpline {
    fn handle_targets(&self) -> Vec<HandleTarget> {
        vec![HandleTarget::Param(WEIGHT)]
    }

    fn handle_position(&self, target: &HandleTarget) -> Option<Point> {
        match target {
            HandleTarget::Param(WEIGHT) => {
                let chord = self.first_chord?;
                Some(chord.p0.lerp(chord.p1, self.weight.value()))
            }
            _ => None,
        }
    }

    fn set_handle_position(&mut self, target: &HandleTarget, p: Point, mods: Modifiers) -> bool {
        let (HandleTarget::Param(WEIGHT), Some(chord)) = (target, self.first_chord) else {
            return false;
        };
        let len = chord.length();
        if len <= EPSILON {
            return false;
        }
        let along = project_onto(chord.p0, (chord.p1 - chord.p0) / len, p);
        self.weight.set(self.snap_weight(along / len, mods));
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/bspline.rs"]
mod tests;
