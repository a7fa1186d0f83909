//! Rotated copies around an origin, optionally fused into one kaleidoscope outline.

use kurbo::{Affine, BezPath, ParamCurve, PathSeg, Point, Vec2};

use super::{EffectContext, PathEffect};
use crate::foundation::core::EPSILON;
use crate::foundation::error::{LpeError, LpeResult};
use crate::geom::intersect::clip_to_wedge;
use crate::geom::path::{Subpath, subpaths};
use crate::interaction::{HandleProvider, HandleTarget, Modifiers};
use crate::params::{BoolParam, Parameter, PointParam, ScalarParam};

const ORIGIN: &str = "origin";
const STARTING_ANGLE: &str = "starting_angle";
const ROTATION_ANGLE: &str = "rotation_angle";

/// Angle increment for ctrl-snapped handle drags, in degrees.
const SNAP_DEGREES: f64 = 15.0;

#[derive(Clone, Debug)]
pub struct CopyRotate {
    starting_angle: ScalarParam,
    rotation_angle: ScalarParam,
    num_copies: ScalarParam,
    origin: PointParam,
    copies_to_360: BoolParam,
    fuse_paths: BoolParam,
    /// Distance of the angle handles from the origin; display only.
    handle_radius: f64,
}

impl Default for CopyRotate {
    fn default() -> Self {
        Self::new()
    }
}

impl CopyRotate {
    pub fn new() -> Self {
        Self {
            starting_angle: ScalarParam::scalar(STARTING_ANGLE, "Starting", 0.0),
            rotation_angle: ScalarParam::scalar(ROTATION_ANGLE, "Rotation angle", 30.0),
            num_copies: ScalarParam::scalar("num_copies", "Number of copies", 6.0)
                .range(1.0, 1e6)
                .integer(),
            origin: PointParam::new(ORIGIN, "Origin", Point::ZERO),
            copies_to_360: BoolParam::new("copies_to_360", "360° copies", true),
            fuse_paths: BoolParam::new("fuse_paths", "Fuse paths", false),
            handle_radius: 100.0,
        }
    }

    /// Angle between consecutive copies, in radians.
    fn step(&self) -> f64 {
        if self.copies_to_360.value() {
            std::f64::consts::TAU / self.num_copies.count().max(1) as f64
        } else {
            self.rotation_angle.value().to_radians()
        }
    }

    fn start(&self) -> f64 {
        self.starting_angle.value().to_radians()
    }

    fn copies(&self, input: &BezPath) -> BezPath {
        let origin = *self.origin.get();
        let step = self.step();
        let mut out = input.clone();
        for i in 1..self.num_copies.count() {
            let t = Affine::rotate_about(step * i as f64, origin);
            for el in input.elements() {
                out.push(t * *el);
            }
        }
        out
    }

    /// The part of the input inside the first wedge, chained into one open run.
    fn motif(&self, input: &BezPath, step: f64) -> Vec<PathSeg> {
        let origin = *self.origin.get();
        let start = self.start();
        let mut out = Vec::new();
        for sp in subpaths(input) {
            for seg in &sp.segments {
                for (t0, t1) in clip_to_wedge(seg, origin, start, step) {
                    if t1 - t0 > EPSILON {
                        out.push(seg.subsegment(t0..t1));
                    }
                }
            }
        }
        out
    }

    fn fused(&self, input: &BezPath) -> LpeResult<BezPath> {
        let origin = *self.origin.get();
        let step = self.step();
        let motif = self.motif(input, step);
        if motif.is_empty() {
            return Err(LpeError::degenerate("nothing inside the copy wedge"));
        }
        let end_ray = self.start() + step;
        let mirror = reflection_about(origin, end_ray);
        let n = self.num_copies.count();
        let mut run = Subpath::new(motif[0].start());
        let mut cur = run.start;
        for i in 0..n {
            let rotate = Affine::rotate_about(step * (2 * (i / 2)) as f64, origin);
            let t = if i % 2 == 1 { rotate * mirror } else { rotate };
            let mut piece: Vec<PathSeg> = motif.iter().map(|s| transform_seg(t, *s)).collect();
            let (Some(first), Some(last)) = (piece.first(), piece.last()) else {
                continue;
            };
            if (last.end() - cur).hypot() < (first.start() - cur).hypot() {
                piece = piece.iter().rev().map(|s| s.reverse()).collect();
            }
            for seg in piece {
                if (seg.start() - cur).hypot() > EPSILON {
                    run.push(PathSeg::Line(kurbo::Line::new(cur, seg.start())));
                }
                cur = seg.end();
                run.push(seg);
            }
        }
        let swept = step * n as f64;
        run.closed = (swept - std::f64::consts::TAU).abs() <= 1e-6;
        Ok(run.to_bezpath())
    }
}

/// Mirror across the line through `origin` at `angle`.
fn reflection_about(origin: Point, angle: f64) -> Affine {
    let (s, c) = (2.0 * angle).sin_cos();
    let o = origin.to_vec2();
    Affine::translate(o) * Affine::new([c, s, s, -c, 0.0, 0.0]) * Affine::translate(-o)
}

fn transform_seg(t: Affine, seg: PathSeg) -> PathSeg {
    match seg {
        PathSeg::Line(l) => PathSeg::Line(t * l),
        PathSeg::Quad(q) => PathSeg::Quad(t * q),
        PathSeg::Cubic(c) => PathSeg::Cubic(t * c),
    }
}

fn snap_degrees(deg: f64, mods: Modifiers) -> f64 {
    if mods.ctrl {
        (deg / SNAP_DEGREES).round() * SNAP_DEGREES
    } else {
        deg
    }
}

impl PathEffect for CopyRotate {
    fn params(&self) -> Vec<&dyn Parameter> {
        vec![
            &self.starting_angle,
            &self.rotation_angle,
            &self.num_copies,
            &self.origin,
            &self.copies_to_360,
            &self.fuse_paths,
        ]
    }

    fn params_mut(&mut self) -> Vec<&mut dyn Parameter> {
        vec![
            &mut self.starting_angle,
            &mut self.rotation_angle,
            &mut self.num_copies,
            &mut self.origin,
            &mut self.copies_to_360,
            &mut self.fuse_paths,
        ]
    }

    fn on_apply(&mut self, _base: &BezPath, ctx: &EffectContext) {
        let center = ctx.bbox.center();
        self.origin.set_default_value(center);
        self.origin.set(center);
        self.handle_radius = (ctx.bbox.width().max(ctx.bbox.height()) / 2.0).max(1.0);
    }

    fn do_effect_path(&mut self, input: &BezPath, _ctx: &EffectContext) -> LpeResult<BezPath> {
        if self.fuse_paths.value() {
            self.fused(input)
        } else {
            Ok(self.copies(input))
        }
    }

    fn indicators(&self) -> Vec<BezPath> {
        let origin = *self.origin.get();
        let mut path = BezPath::new();
        path.move_to(origin + Vec2::from_angle(self.start()) * self.handle_radius);
        path.line_to(origin);
        path.line_to(origin + Vec2::from_angle(self.start() + self.step()) * self.handle_radius);
        vec![path]
    }
}

impl HandleProvider for CopyRotate {
    fn handle_targets(&self) -> Vec<HandleTarget> {
        vec![
            HandleTarget::Param(ORIGIN),
            HandleTarget::Param(STARTING_ANGLE),
            HandleTarget::Param(ROTATION_ANGLE),
        ]
    }

    fn handle_position(&self, target: &HandleTarget) -> Option<Point> {
        let origin = *self.origin.get();
        match target {
            HandleTarget::Param(ORIGIN) => Some(origin),
            HandleTarget::Param(STARTING_ANGLE) => {
                Some(origin + Vec2::from_angle(self.start()) * self.handle_radius)
            }
            HandleTarget::Param(ROTATION_ANGLE) => {
                Some(origin + Vec2::from_angle(self.start() + self.step()) * self.handle_radius)
            }
            _ => None,
        }
    }

    fn set_handle_position(&mut self, target: &HandleTarget, p: Point, mods: Modifiers) -> bool {
        let origin = *self.origin.get();
        let v = p - origin;
        match target {
            HandleTarget::Param(ORIGIN) => self.origin.set(p),
            HandleTarget::Param(STARTING_ANGLE) | HandleTarget::Param(ROTATION_ANGLE)
                if v.hypot() <= EPSILON =>
            {
                return false;
            }
            HandleTarget::Param(STARTING_ANGLE) => {
                self.handle_radius = v.hypot();
                self.starting_angle
                    .set(snap_degrees(v.atan2().to_degrees(), mods));
            }
            HandleTarget::Param(ROTATION_ANGLE) => {
                self.handle_radius = v.hypot();
                let deg = (v.atan2().to_degrees() - self.starting_angle.value()).rem_euclid(360.0);
                let deg = snap_degrees(deg, mods);
                if self.copies_to_360.value() {
                    if deg <= EPSILON {
                        return false;
                    }
                    self.num_copies.set((360.0 / deg).round());
                } else {
                    self.rotation_angle.set(deg);
                }
            }
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/copy_rotate.rs"]
mod tests;
