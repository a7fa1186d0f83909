//! Calligraphic outline of a centerline drawn with a rotated pen.
//!
//! The elliptic pen offsets each side by the support point of an ellipse with semi-axes
//! `width / 2` and `roundness * width / 2`, rotated by `angle`. The thick-thin pen is a flat nib:
//! the half-width varies with how square the stroke runs to the nib. Open ends taper over
//! `growfor` and `fadefor` units of arc length.

use kurbo::Vec2;

use super::powerstroke::{LineCap, append_cap};
use super::{EffectContext, PathEffect};
use crate::foundation::core::{EPSILON, points_near};
use crate::foundation::error::{LpeError, LpeResult};
use crate::foundation::math::{rot90, unit_or_zero};
use crate::geom::curve::{Curve2, PiecewiseCurve, fit_curve};
use crate::params::{BoolParam, EnumParam, Parameter, ScalarParam};

crate::param_enum! {
    pub enum DynaStrokeMethod {
        EllipticPen => ("elliptic_pen", "Elliptic pen"),
        ThickThin => ("thick_thin", "Thick-thin"),
    }
}

crate::param_enum! {
    /// Shape of the width ramp at tapered ends.
    pub enum DynaStrokeCap {
        Linear => ("linear", "Linear"),
        Smooth => ("smooth", "Smooth"),
        Round => ("round", "Round"),
    }
}

impl DynaStrokeCap {
    fn ramp(self, u: f64) -> f64 {
        let u = u.clamp(0.0, 1.0);
        match self {
            DynaStrokeCap::Linear => u,
            DynaStrokeCap::Smooth => u * u * (3.0 - 2.0 * u),
            DynaStrokeCap::Round => (1.0 - (1.0 - u) * (1.0 - u)).sqrt(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DynaStroke {
    method: EnumParam<DynaStrokeMethod>,
    width: ScalarParam,
    roundness: ScalarParam,
    angle: ScalarParam,
    growfor: ScalarParam,
    fadefor: ScalarParam,
    round_ends: BoolParam,
    capping: EnumParam<DynaStrokeCap>,
}

impl Default for DynaStroke {
    fn default() -> Self {
        Self::new()
    }
}

/// The pen reduced to what the offset needs.
#[derive(Clone, Copy, Debug)]
struct Pen {
    method: DynaStrokeMethod,
    /// Major semi-axis direction.
    axis: Vec2,
    major: f64,
    minor: f64,
    roundness: f64,
}

impl Pen {
    /// Offset from the centerline to the left side for unit tangent `u`.
    fn offset(&self, u: Vec2) -> Vec2 {
        let n = rot90(u);
        match self.method {
            DynaStrokeMethod::EllipticPen => {
                // Support point of the ellipse in direction n.
                let (na, nb) = (n.dot(self.axis), n.dot(rot90(self.axis)));
                let (a2, b2) = (self.major * self.major, self.minor * self.minor);
                let h = (a2 * na * na + b2 * nb * nb).sqrt().max(EPSILON);
                (self.axis * (a2 * na) + rot90(self.axis) * (b2 * nb)) / h
            }
            DynaStrokeMethod::ThickThin => {
                let k = self.roundness + (1.0 - self.roundness) * n.dot(self.axis).abs();
                n * (self.major * k).max(EPSILON)
            }
        }
    }
}

fn seg_tangent(seg: &Curve2, u: f64) -> Vec2 {
    for sample in [u, u + 1e-4, u - 1e-4, u + 1e-2, u - 1e-2] {
        let v = seg.velocity(sample.clamp(0.0, 1.0));
        if v.hypot() > EPSILON {
            return v.normalize();
        }
    }
    unit_or_zero(seg.at1() - seg.at0())
}

impl DynaStroke {
    pub fn new() -> Self {
        Self {
            method: EnumParam::new("method", "Method", DynaStrokeMethod::EllipticPen),
            width: ScalarParam::scalar("width", "Pen width", 25.0).range(0.0, 1e6),
            roundness: ScalarParam::scalar("roundness", "Pen roundness", 0.2).range(0.0, 1.0),
            angle: ScalarParam::scalar("angle", "Angle", 45.0),
            growfor: ScalarParam::scalar("growfor", "Grow for", 100.0).range(0.0, 1e9),
            fadefor: ScalarParam::scalar("fadefor", "Fade for", 100.0).range(0.0, 1e9),
            round_ends: BoolParam::new("round_ends", "Round ends", false),
            capping: EnumParam::new("capping", "Capping", DynaStrokeCap::Linear),
        }
    }

    fn pen(&self) -> Pen {
        let major = (0.5 * self.width.value()).max(EPSILON);
        let roundness = self.roundness.value();
        Pen {
            method: *self.method.get(),
            axis: Vec2::from_angle(self.angle.value().to_radians()),
            major,
            minor: (major * roundness).max(EPSILON),
            roundness,
        }
    }

    /// Width factor at arc length `s` of `total`; 1 away from tapered ends.
    fn taper(&self, s: f64, total: f64) -> f64 {
        let cap = *self.capping.get();
        let grow = self.growfor.value();
        let fade = self.fadefor.value();
        let mut k = 1.0;
        if grow > EPSILON {
            k *= cap.ramp(s / grow);
        }
        if fade > EPSILON {
            k *= cap.ramp((total - s) / fade);
        }
        k
    }

    /// One side of the outline, `sign` picking left (+1) or right (-1).
    fn side(
        &self,
        curve: &PiecewiseCurve,
        pen: Pen,
        closed: bool,
        sign: f64,
        tol: f64,
    ) -> PiecewiseCurve {
        let arc = curve.arc_length(tol);
        let total = arc.last_value().unwrap_or(0.0);
        let mut out = PiecewiseCurve::new();
        for (i, seg) in curve.segments().iter().enumerate() {
            let (a, b) = (curve.cuts()[i], curve.cuts()[i + 1]);
            let w = b - a;
            let piece = fit_curve(
                |t| {
                    let u = (t - a) / w;
                    let k = if closed {
                        1.0
                    } else {
                        self.taper(arc.value_at(t).unwrap_or(0.0), total)
                    };
                    seg.eval(u) + pen.offset(seg_tangent(seg, u)) * (sign * k)
                },
                a,
                b,
                tol,
            );
            out.concat(&piece);
        }
        out.bridged(tol.max(EPSILON) * 1e-3)
    }
}

impl PathEffect for DynaStroke {
    fn params(&self) -> Vec<&dyn Parameter> {
        vec![
            &self.method,
            &self.width,
            &self.roundness,
            &self.angle,
            &self.growfor,
            &self.fadefor,
            &self.round_ends,
            &self.capping,
        ]
    }

    fn params_mut(&mut self) -> Vec<&mut dyn Parameter> {
        vec![
            &mut self.method,
            &mut self.width,
            &mut self.roundness,
            &mut self.angle,
            &mut self.growfor,
            &mut self.fadefor,
            &mut self.round_ends,
            &mut self.capping,
        ]
    }

    fn do_effect_pwd2(
        &mut self,
        curve: &PiecewiseCurve,
        ctx: &EffectContext,
    ) -> LpeResult<PiecewiseCurve> {
        let (Some(first), Some(last)) = (curve.first_value(), curve.last_value()) else {
            return Err(LpeError::degenerate("dynastroke needs a non-empty path"));
        };
        let tol = ctx.tolerance;
        let closed = curve.len() > 1 && points_near(first, last, EPSILON);
        let pen = self.pen();
        let mut output = self.side(curve, pen, closed, 1.0, tol);
        let back = self.side(curve, pen, closed, -1.0, tol).reversed();
        if closed {
            output.concat(&back);
            return Ok(output);
        }

        let cap = if self.round_ends.value() {
            LineCap::Round
        } else {
            LineCap::Butt
        };
        let end_dir = seg_tangent(curve.segment(curve.len() - 1), 1.0);
        let start_dir = seg_tangent(curve.segment(0), 0.0);
        let (Some(out_end), Some(back_start)) = (output.last_value(), back.first_value()) else {
            return Err(LpeError::degenerate("empty outline"));
        };
        append_cap(&mut output, cap, out_end, back_start, end_dir, tol);
        output.concat(&back);
        let (Some(back_end), Some(out_start)) = (output.last_value(), output.first_value()) else {
            return Err(LpeError::degenerate("empty outline"));
        };
        append_cap(&mut output, cap, back_end, out_start, -start_dir, tol);
        Ok(output)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/dynastroke.rs"]
mod tests;
