//! Blends the first two subpaths into a series of intermediate shapes placed along a trajectory.

use kurbo::{BezPath, Point};

use super::{EffectContext, PathEffect};
use crate::foundation::core::Interval;
use crate::foundation::error::{LpeError, LpeResult};
use crate::geom::convert::{from_path, from_subpath, to_path};
use crate::geom::curve::PiecewiseCurve;
use crate::geom::path::subpaths;
use crate::params::{BoolParam, Parameter, PathParam, ScalarParam};

#[derive(Clone, Debug)]
pub struct Interpolate {
    trajectory: PathParam,
    steps: ScalarParam,
    equidistant_spacing: BoolParam,
}

impl Default for Interpolate {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpolate {
    pub fn new() -> Self {
        Self {
            trajectory: PathParam::new("trajectory", "Trajectory", BezPath::new()),
            steps: ScalarParam::scalar("steps", "Steps", 5.0)
                .range(2.0, 1e6)
                .integer(),
            equidistant_spacing: BoolParam::new("equidistant_spacing", "Equidistant spacing", true),
        }
    }

    /// The trajectory over `[0, 1]`; a straight line between the two centres when unset.
    fn trajectory_curve(&self, from: Point, to: Point, tol: f64) -> PiecewiseCurve {
        let mut curve = from_path(self.trajectory.get());
        if curve.is_empty() {
            curve = from_path(&line(from, to));
        }
        if self.equidistant_spacing.value() {
            let even = curve.arc_length_reparametrize(tol);
            if !even.is_empty() {
                curve = even;
            }
        }
        curve.set_domain(Interval::new(0.0, 1.0));
        curve
    }
}

fn line(a: Point, b: Point) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(a);
    path.line_to(b);
    path
}

fn centered(curve: &PiecewiseCurve) -> Option<(PiecewiseCurve, Point)> {
    let center = curve.bounds_exact()?.center();
    let mut out = curve.translate(-center.to_vec2());
    out.set_domain(Interval::new(0.0, 1.0));
    Some((out, center))
}

impl PathEffect for Interpolate {
    fn params(&self) -> Vec<&dyn Parameter> {
        vec![&self.trajectory, &self.steps, &self.equidistant_spacing]
    }

    fn params_mut(&mut self) -> Vec<&mut dyn Parameter> {
        vec![&mut self.trajectory, &mut self.steps, &mut self.equidistant_spacing]
    }

    fn on_apply(&mut self, base: &BezPath, _ctx: &EffectContext) {
        let subs = subpaths(base);
        let [a, b, ..] = &subs[..] else {
            return;
        };
        let (Some((_, ca)), Some((_, cb))) =
            (centered(&from_subpath(a)), centered(&from_subpath(b)))
        else {
            return;
        };
        let path = line(ca, cb);
        self.trajectory.set_default_value(path.clone());
        self.trajectory.set(path);
    }

    fn do_effect_path(&mut self, input: &BezPath, ctx: &EffectContext) -> LpeResult<BezPath> {
        let subs = subpaths(input);
        let [a, b, ..] = &subs[..] else {
            return Err(LpeError::degenerate("interpolation needs two subpaths"));
        };
        let (Some((pa, ca)), Some((pb, cb))) =
            (centered(&from_subpath(a)), centered(&from_subpath(b)))
        else {
            return Err(LpeError::degenerate("interpolation needs non-empty subpaths"));
        };
        let trajectory = self.trajectory_curve(ca, cb, ctx.tolerance);
        let steps = self.steps.count().max(2);
        let mut out = BezPath::new();
        for i in 0..steps {
            let s = i as f64 / (steps - 1) as f64;
            let blend = pa.scale(1.0 - s).add(&pb.scale(s));
            let at = trajectory.value_at(s).unwrap_or_else(|| ca.lerp(cb, s));
            let placed = blend.translate(at.to_vec2());
            for el in to_path(&placed, ctx.tolerance).elements() {
                out.push(*el);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/interpolate.rs"]
mod tests;
