use kurbo::{BezPath, PathEl, Point};

use super::{EffectContext, PathEffect};
use crate::foundation::core::EPSILON;
use crate::foundation::error::{LpeError, LpeResult};
use crate::geom::convert::{from_subpath, to_path};
use crate::geom::curve::{PiecewiseCurve, normal_at};
use crate::geom::path::{first_point, subpaths};
use crate::interaction::{HandleProvider, HandleTarget, Modifiers};
use crate::params::{Parameter, PointParam};

const OFFSET_PT: &str = "offset_pt";

/// Offsets the path along its normal by the signed distance from the curve to a dragged point.
#[derive(Clone, Debug)]
pub struct Offset {
    offset_pt: PointParam,
    last_distance: f64,
}

impl Default for Offset {
    fn default() -> Self {
        Self::new()
    }
}

impl Offset {
    pub fn new() -> Self {
        Self {
            offset_pt: PointParam::new(OFFSET_PT, "Offset", Point::ZERO),
            last_distance: 0.0,
        }
    }

    /// Signed distance of the last run.
    pub fn distance(&self) -> f64 {
        self.last_distance
    }

    fn signed_distance(&self, curve: &PiecewiseCurve) -> f64 {
        let p = *self.offset_pt.get();
        let Some(t) = curve.nearest_time(p) else {
            return 0.0;
        };
        let Some(foot) = curve.value_at(t) else {
            return 0.0;
        };
        let d = (p - foot).hypot();
        if (p - foot).dot(normal_at(curve, t)) < 0.0 { -d } else { d }
    }
}

/// Joins the runs of `path` into one subpath by replacing inner moves with lines.
fn bridge_runs(path: &BezPath, close: bool) -> BezPath {
    let mut out = BezPath::new();
    for el in path.elements() {
        match el {
            PathEl::MoveTo(p) if !out.elements().is_empty() => out.line_to(*p),
            PathEl::ClosePath => {}
            el => out.push(*el),
        }
    }
    if close && !out.elements().is_empty() {
        out.close_path();
    }
    out
}

impl PathEffect for Offset {
    fn params(&self) -> Vec<&dyn Parameter> {
        vec![&self.offset_pt]
    }

    fn params_mut(&mut self) -> Vec<&mut dyn Parameter> {
        vec![&mut self.offset_pt]
    }

    fn on_apply(&mut self, base: &BezPath, _ctx: &EffectContext) {
        if let Some(p) = first_point(base) {
            self.offset_pt.set_default_value(p);
            self.offset_pt.set(p);
        }
    }

    fn do_effect_path(&mut self, input: &BezPath, ctx: &EffectContext) -> LpeResult<BezPath> {
        let subs = subpaths(input);
        let whole: Vec<PiecewiseCurve> = subs.iter().map(from_subpath).collect();
        // The distance is measured against the first subpath, where the handle lives.
        let Some(first) = whole.first().filter(|c| !c.is_empty()) else {
            return Err(LpeError::degenerate("offset needs a non-empty path"));
        };
        let distance = self.signed_distance(first);
        self.last_distance = distance;
        if distance.abs() <= EPSILON {
            return Ok(input.clone());
        }
        let mut out = BezPath::new();
        for (sp, curve) in subs.iter().zip(&whole) {
            if curve.is_empty() {
                continue;
            }
            let shifted = curve.add(&curve.normal(ctx.tolerance).scale(distance));
            let run = bridge_runs(&to_path(&shifted, ctx.tolerance), sp.closed);
            for el in run.elements() {
                out.push(*el);
            }
        }
        Ok(out)
    }
}

impl HandleProvider for Offset {
    fn handle_targets(&self) -> Vec<HandleTarget> {
        vec![HandleTarget::Param(OFFSET_PT)]
    }

    fn handle_position(&self, target: &HandleTarget) -> Option<Point> {
        (*target == HandleTarget::Param(OFFSET_PT)).then(|| *self.offset_pt.get())
    }

    fn set_handle_position(&mut self, target: &HandleTarget, p: Point, _mods: Modifiers) -> bool {
        if *target != HandleTarget::Param(OFFSET_PT) {
            return false;
        }
        self.offset_pt.set(p);
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/offset.rs"]
mod tests;
