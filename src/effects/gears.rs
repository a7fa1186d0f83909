//! Involute spur gears driven by a path's nodes.
//!
//! The first segment places the first gear (its end is the centre, its start sets the phase),
//! the second segment's end sets the pitch radius, and every further node spawns a gear meshed
//! with the previous one.

use std::f64::consts::{PI, TAU};

use kurbo::{Arc, BezPath, Point, Vec2};

use super::{EffectContext, PathEffect};
use crate::foundation::core::EPSILON;
use crate::foundation::error::{LpeError, LpeResult};
use crate::foundation::math::unit_or_zero;
use crate::geom::curve::fit_curve;
use crate::geom::path::subpaths;
use crate::interaction::{HandleProvider, HandleTarget, Modifiers};
use crate::params::{Parameter, ScalarParam};

const MIN_TEETH: usize = 3;
/// Upper bound on teeth per gear, so one drag cannot demand millions of involutes.
pub const MAX_TEETH: usize = 1000;

#[derive(Clone, Debug, PartialEq)]
pub struct Gear {
    teeth: usize,
    module: f64,
    /// Pressure angle in radians.
    phi: f64,
    center: Point,
    angle: f64,
}

impl Gear {
    pub fn new(teeth: usize, module: f64, phi: f64) -> Self {
        Self {
            teeth: teeth.clamp(MIN_TEETH, MAX_TEETH),
            module,
            phi,
            center: Point::ZERO,
            angle: 0.0,
        }
    }

    pub fn teeth(&self) -> usize {
        self.teeth
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn pitch_radius(&self) -> f64 {
        self.teeth as f64 * self.module / 2.0
    }

    /// Keeps the tooth count and rescales the module.
    pub fn set_pitch_radius(&mut self, r: f64) {
        self.module = 2.0 * r / self.teeth as f64;
    }

    pub fn base_radius(&self) -> f64 {
        self.pitch_radius() * self.phi.cos()
    }

    pub fn outer_radius(&self) -> f64 {
        self.pitch_radius() + self.module
    }

    pub fn root_radius(&self) -> f64 {
        self.pitch_radius() - 1.25 * self.module
    }

    /// Angle of one tooth (or one gap) on the pitch circle.
    pub fn tooth_thickness_angle(&self) -> f64 {
        PI / self.teeth as f64
    }

    fn involute_swath_angle(&self, r: f64) -> f64 {
        let rb = self.base_radius();
        if r <= rb {
            return 0.0;
        }
        (r * r - rb * rb).sqrt() / rb
    }

    fn involute_intersect_angle(&self, r: f64) -> f64 {
        let rb = self.base_radius();
        if r <= rb {
            return 0.0;
        }
        (r * r - rb * rb).sqrt() / rb - (rb / r).acos()
    }

    /// Point on the involute unwound from base angle `start`, at roll angle `theta`.
    fn involute_point(&self, start: f64, theta: f64) -> Point {
        let rb = self.base_radius();
        let roll = theta - start;
        let (s, c) = theta.sin_cos();
        self.center + Vec2::new(c + roll * s, s - roll * c) * rb
    }

    fn polar(&self, angle: f64, r: f64) -> Point {
        self.center + Vec2::from_angle(angle) * r
    }

    /// The meshed gear centred in the direction of `p`, pitch circles tangent.
    pub fn spawn(&self, p: Point) -> Gear {
        let r1 = self.pitch_radius();
        let dir = p - self.center;
        let gap = dir.hypot() - r1;
        let teeth = ((gap / r1) * self.teeth as f64)
            .floor()
            .clamp(MIN_TEETH as f64, MAX_TEETH as f64) as usize;
        let mut gear = Gear::new(teeth, self.module, self.phi);
        let r2 = gear.pitch_radius();
        let a = dir.atan2();
        gear.center = self.center + unit_or_zero(dir) * (r1 + r2);
        let mut angle = 0.0;
        if gear.teeth % 2 == 0 {
            angle -= gear.tooth_thickness_angle();
        }
        angle -= self.angle * (r1 / r2);
        angle += a * (r1 / r2);
        gear.angle = angle + a;
        gear
    }

    /// Closed outline of all teeth.
    pub fn path(&self, tol: f64) -> BezPath {
        let tooth_rotation = 2.0 * self.tooth_thickness_angle();
        let outer = self.outer_radius();
        let root = self.root_radius();
        let base = self.base_radius();
        let involute_advance =
            self.involute_intersect_angle(outer) - self.involute_intersect_angle(root);
        let tip_advance = self.tooth_thickness_angle()
            - 2.0
                * (self.involute_intersect_angle(outer)
                    - self.involute_intersect_angle(self.pitch_radius()));
        let root_advance = (tooth_rotation - tip_advance) - 2.0 * involute_advance;
        let swath = self.involute_swath_angle(outer);
        let involute_t = if swath > 0.0 {
            self.involute_swath_angle(root) / swath
        } else {
            0.0
        };
        let first_tooth_angle = self.angle - (0.5 * tip_advance + involute_advance);

        let mut path = BezPath::new();
        for i in 0..self.teeth {
            let mut cursor = first_tooth_angle + i as f64 * tooth_rotation;
            // Leading flank, root to tip.
            let start = cursor;
            let flank = fit_curve(
                |s| self.involute_point(start, start + swath * s),
                involute_t,
                1.0,
                tol,
            );
            self.append(&mut path, &flank, i == 0);
            cursor += involute_advance;
            self.append_arc(&mut path, cursor, tip_advance, outer, tol);
            cursor += tip_advance + involute_advance;
            // Trailing flank, tip to root.
            let start = cursor;
            let flank = fit_curve(
                |s| self.involute_point(start, start - swath * (1.0 + involute_t - s)),
                involute_t,
                1.0,
                tol,
            );
            self.append(&mut path, &flank, false);
            if base > root {
                path.line_to(self.polar(cursor, root));
            }
            self.append_arc(&mut path, cursor, root_advance, root, tol);
            cursor += root_advance;
            if base > root {
                path.line_to(self.polar(cursor, base));
            }
        }
        path.close_path();
        path
    }

    fn append(&self, path: &mut BezPath, piece: &crate::geom::curve::PiecewiseCurve, first: bool) {
        let Some(start) = piece.first_value() else {
            return;
        };
        if first {
            path.move_to(start);
        } else {
            path.line_to(start);
        }
        for seg in piece.segments() {
            if let Some(bez) = seg.to_seg() {
                match bez {
                    kurbo::PathSeg::Line(l) => path.line_to(l.p1),
                    kurbo::PathSeg::Quad(q) => path.quad_to(q.p1, q.p2),
                    kurbo::PathSeg::Cubic(c) => path.curve_to(c.p1, c.p2, c.p3),
                }
            }
        }
    }

    fn append_arc(&self, path: &mut BezPath, from: f64, sweep: f64, r: f64, tol: f64) {
        path.line_to(self.polar(from, r));
        let arc = Arc::new(self.center, (r, r), from, sweep, 0.0);
        for el in arc.append_iter(tol) {
            path.push(el);
        }
    }
}

#[derive(Clone, Debug)]
pub struct Gears {
    teeth: ScalarParam,
    phi: ScalarParam,
    min_radius: ScalarParam,
    /// Gears of the last run, for handle placement.
    gears: Vec<Gear>,
}

impl Default for Gears {
    fn default() -> Self {
        Self::new()
    }
}

impl Gears {
    pub fn new() -> Self {
        Self {
            teeth: ScalarParam::scalar("teeth", "Teeth", 10.0)
                .range(MIN_TEETH as f64, MAX_TEETH as f64)
                .integer(),
            phi: ScalarParam::scalar("phi", "Phi", 5.0).range(0.01, 180.0),
            min_radius: ScalarParam::scalar("min_radius", "Min radius", 5.0).range(0.01, 9999.0),
            gears: Vec::new(),
        }
    }

    pub fn gears(&self) -> &[Gear] {
        &self.gears
    }

    fn build(&self, nodes: &[Point]) -> LpeResult<Vec<Gear>> {
        let [first, center, pitch, rest @ ..] = nodes else {
            return Err(LpeError::degenerate("gears need three nodes"));
        };
        let radius = (*pitch - *center).hypot();
        if radius < self.min_radius.value() || radius <= EPSILON {
            return Err(LpeError::degenerate("first gear is below the minimum radius"));
        }
        let mut gear = Gear::new(
            self.teeth.count(),
            200.0,
            self.phi.value().to_radians(),
        );
        gear.center = *center;
        gear.angle = (*first - *center).atan2();
        gear.set_pitch_radius(radius);
        let mut out = vec![gear];
        for p in rest {
            let prev = &out[out.len() - 1];
            if (*p - prev.center).hypot() <= prev.pitch_radius() + EPSILON {
                continue;
            }
            let next = prev.spawn(*p);
            if next.pitch_radius() < self.min_radius.value() {
                break;
            }
            out.push(next);
        }
        Ok(out)
    }
}

impl PathEffect for Gears {
    fn params(&self) -> Vec<&dyn Parameter> {
        vec![&self.teeth, &self.phi, &self.min_radius]
    }

    fn params_mut(&mut self) -> Vec<&mut dyn Parameter> {
        vec![&mut self.teeth, &mut self.phi, &mut self.min_radius]
    }

    fn do_effect_path(&mut self, input: &BezPath, ctx: &EffectContext) -> LpeResult<BezPath> {
        let nodes = subpaths(input)
            .into_iter()
            .next()
            .map(|sp| sp.nodes())
            .unwrap_or_default();
        let gears = self.build(&nodes)?;
        let mut out = BezPath::new();
        for gear in &gears {
            for el in gear.path(ctx.tolerance).elements() {
                out.push(*el);
            }
        }
        self.gears = gears;
        Ok(out)
    }
}

/// A single handle on the first gear's pitch circle edits the tooth count.
impl HandleProvider for Gears {
    fn handle_targets(&self) -> Vec<HandleTarget> {
        vec![HandleTarget::Param("teeth")]
    }

    fn handle_position(&self, target: &HandleTarget) -> Option<Point> {
        let gear = self.gears.first()?;
        (*target == HandleTarget::Param("teeth")).then(|| {
            let step = TAU / gear.teeth as f64;
            gear.polar(gear.angle + step, gear.outer_radius())
        })
    }

    fn set_handle_position(&mut self, target: &HandleTarget, p: Point, _mods: Modifiers) -> bool {
        let Some(gear) = self.gears.first() else {
            return false;
        };
        if *target != HandleTarget::Param("teeth") {
            return false;
        }
        let swept = (p - gear.center).atan2() - gear.angle;
        let swept = swept.rem_euclid(TAU);
        if swept <= EPSILON {
            return false;
        }
        self.teeth.set((TAU / swept).round());
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/gears.rs"]
mod tests;
