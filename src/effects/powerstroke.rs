//! Variable-width stroke outline from user-placed `(t, offset)` control points.
//!
//! The control points are interpolated into a width profile `(x(s), y(s))` where `x` is a time on
//! the centerline and `y` the offset along its normal. The outline is
//! `curve(x) + y * normal(x)` forward, the mirrored side backwards, and caps in between.

use kurbo::{BezPath, CubicBez, Line, PathSeg, Point, Vec2};

use super::{EffectContext, PathEffect};
use crate::foundation::core::EPSILON;
use crate::foundation::error::{LpeError, LpeResult};
use crate::geom::convert::{from_subpath, to_path};
use crate::geom::curve::{Curve2, PiecewiseCurve, PiecewiseScalar, fit_curve};
use crate::geom::path::{Subpath, subpaths};
use crate::interaction::{HandleProvider, HandleTarget, Modifiers};
use crate::params::{BoolParam, EnumParam, Parameter, PointArrayParam};

const OFFSET_POINTS: &str = "offset_points";

crate::param_enum! {
    /// How the width profile passes through the control points.
    pub enum StrokeInterpolator {
        Linear => ("Linear", "Linear"),
        CubicBezierFit => ("CubicBezierFit", "CubicBezierFit"),
        CubicBezierJohan => ("CubicBezierJohan", "CubicBezierJohan"),
    }
}

crate::param_enum! {
    pub enum LineCap {
        Butt => ("butt", "Butt"),
        Square => ("square", "Square"),
        Round => ("round", "Round"),
        Peak => ("peak", "Peak"),
    }
}

impl StrokeInterpolator {
    fn interpolate(self, points: &[Point]) -> PiecewiseCurve {
        let mut out = PiecewiseCurve::new();
        if points.len() < 2 {
            return out;
        }
        out.push_cut(0.0);
        for (i, w) in points.windows(2).enumerate() {
            let (p0, p1) = (w[0], w[1]);
            let seg = match self {
                StrokeInterpolator::Linear => PathSeg::Line(Line::new(p0, p1)),
                StrokeInterpolator::CubicBezierJohan => {
                    let dx = Vec2::new(p1.x - p0.x, 0.0);
                    PathSeg::Cubic(CubicBez::new(p0, p0 + 0.2 * dx, p1 - 0.2 * dx, p1))
                }
                StrokeInterpolator::CubicBezierFit => {
                    // Catmull-Rom tangents, clamped at the ends.
                    let prev = if i == 0 { p0 } else { points[i - 1] };
                    let next = points.get(i + 2).copied().unwrap_or(p1);
                    let m0 = (p1 - prev) / 6.0;
                    let m1 = (next - p0) / 6.0;
                    PathSeg::Cubic(CubicBez::new(p0, p0 + m0, p1 - m1, p1))
                }
            };
            out.push(Curve2::from_seg(seg), (i + 1) as f64);
        }
        out
    }
}

#[derive(Clone, Debug)]
pub struct PowerStroke {
    offset_points: PointArrayParam,
    sort_points: BoolParam,
    interpolator_type: EnumParam<StrokeInterpolator>,
    start_linecap_type: EnumParam<LineCap>,
    end_linecap_type: EnumParam<LineCap>,
}

impl Default for PowerStroke {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerStroke {
    pub fn new() -> Self {
        Self {
            offset_points: PointArrayParam::new(OFFSET_POINTS, "Offset points"),
            sort_points: BoolParam::new("sort_points", "Sort points", true),
            interpolator_type: EnumParam::new(
                "interpolator_type",
                "Interpolator type",
                StrokeInterpolator::CubicBezierJohan,
            ),
            start_linecap_type: EnumParam::new("start_linecap_type", "Start cap", LineCap::Round),
            end_linecap_type: EnumParam::new("end_linecap_type", "End cap", LineCap::Round),
        }
    }

    fn control_points(&self) -> Vec<Point> {
        let mut ts = self.offset_points.points().to_vec();
        if self.sort_points.value() {
            ts.sort_by(|a, b| a.x.total_cmp(&b.x));
        }
        ts
    }

    /// The width profile trimmed to the centerline's domain.
    fn profile(&self, ts: &[Point], min: f64, max: f64) -> (PiecewiseScalar, PiecewiseScalar) {
        let stroke = self.interpolator_type.get().interpolate(ts);
        let mut x = stroke.x();
        let mut y = stroke.y();
        if let (Some(&a), Some(&b)) = (x.roots_of(min).first(), x.roots_of(max).first()) {
            if b > a {
                x = x.portion(a, b);
                y = y.portion(a, b);
            }
        }
        (x, y)
    }

    fn outline_open(
        &self,
        curve: &PiecewiseCurve,
        der: &PiecewiseCurve,
        n: &PiecewiseCurve,
        tol: f64,
    ) -> LpeResult<PiecewiseCurve> {
        let dom = curve
            .domain()
            .ok_or_else(|| LpeError::degenerate("empty centerline"))?;
        let points = self.control_points();
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return Err(LpeError::degenerate("power stroke has no offset points"));
        };
        let mut ts = Vec::with_capacity(points.len() + 2);
        ts.push(Point::new(dom.min, first.y));
        ts.extend_from_slice(&points);
        ts.push(Point::new(dom.max, last.y));
        let (x, y) = self.profile(&ts, dom.min, dom.max);

        let mut output = bridged(&curve.compose(&x).add(&n.compose(&x).scaled_by(&y)), tol);
        let (xr, yr) = (x.reversed(), y.reversed());
        let mirror = bridged(&curve.compose(&xr).sub(&n.compose(&xr).scaled_by(&yr)), tol);
        let (Some(out_end), Some(mirror_start)) = (output.last_value(), mirror.first_value())
        else {
            return Err(LpeError::degenerate("empty width profile"));
        };
        let end_dir = der.last_value().map(|p| p.to_vec2()).unwrap_or(Vec2::ZERO);
        append_cap(&mut output, *self.end_linecap_type.get(), out_end, mirror_start, end_dir, tol);
        output.concat(&mirror);

        let (Some(out_start), Some(back_end)) = (output.first_value(), output.last_value()) else {
            return Err(LpeError::degenerate("empty outline"));
        };
        let start_dir = der.first_value().map(|p| p.to_vec2()).unwrap_or(Vec2::ZERO);
        append_cap(
            &mut output,
            *self.start_linecap_type.get(),
            back_end,
            out_start,
            -start_dir,
            tol,
        );
        Ok(output)
    }

    fn outline_closed(
        &self,
        curve: &PiecewiseCurve,
        n: &PiecewiseCurve,
        tol: f64,
    ) -> LpeResult<PiecewiseCurve> {
        let dom = curve
            .domain()
            .ok_or_else(|| LpeError::degenerate("empty centerline"))?;
        let mut ts = self.control_points();
        let (Some(&first), Some(&last)) = (ts.first(), ts.last()) else {
            return Err(LpeError::degenerate("power stroke has no offset points"));
        };
        let extent = Vec2::new(dom.extent(), 0.0);
        ts.insert(0, last - extent);
        ts.push(first + extent);
        let (x, y) = self.profile(&ts, dom.min, dom.max);
        let mut output = bridged(&curve.compose(&x).add(&n.compose(&x).scaled_by(&y)), tol);
        let (xr, yr) = (x.reversed(), y.reversed());
        output.concat(&bridged(&curve.compose(&xr).sub(&n.compose(&xr).scaled_by(&yr)), tol));
        Ok(output)
    }

    fn centerline(&self) -> Option<(&PiecewiseCurve, &PiecewiseCurve)> {
        Some((self.offset_points.cached_curve()?, self.offset_points.cached_normal()?))
    }

    /// `(t, offset)` of `p` against the cached centerline.
    fn project(&self, p: Point) -> Option<Point> {
        let (curve, n) = self.centerline()?;
        let t = curve.nearest_time(p)?;
        let foot = curve.value_at(t)?;
        let normal = n.value_at(t)?.to_vec2();
        Some(Point::new(t, (p - foot).dot(normal)))
    }
}

/// Closes the jumps an offset side gets at centerline corners.
fn bridged(side: &PiecewiseCurve, tol: f64) -> PiecewiseCurve {
    side.bridged(tol.max(EPSILON) * 1e-3)
}

fn line_piece(a: Point, b: Point) -> PiecewiseCurve {
    PiecewiseCurve::from_segment(Curve2::line(a, b))
}

/// Joins `from` to `to` with a cap bulging along `dir`.
pub(super) fn append_cap(
    out: &mut PiecewiseCurve,
    cap: LineCap,
    from: Point,
    to: Point,
    dir: Vec2,
    tol: f64,
) {
    let radius = 0.5 * (to - from).hypot();
    match cap {
        LineCap::Butt => out.concat(&line_piece(from, to)),
        LineCap::Square => {
            let d = dir * radius;
            out.concat(&line_piece(from, from + d));
            out.concat(&line_piece(from + d, to + d));
            out.concat(&line_piece(to + d, to));
        }
        LineCap::Peak => {
            let tip = from.midpoint(to) + dir * radius;
            out.concat(&line_piece(from, tip));
            out.concat(&line_piece(tip, to));
        }
        LineCap::Round => {
            let center = from.midpoint(to);
            let (u, v) = (from - center, dir * radius);
            let arc = fit_curve(
                |s| {
                    let (sin, cos) = (s * std::f64::consts::PI).sin_cos();
                    center + u * cos + v * sin
                },
                0.0,
                1.0,
                tol,
            );
            out.concat(&arc);
        }
    }
}

impl PathEffect for PowerStroke {
    fn params(&self) -> Vec<&dyn Parameter> {
        vec![
            &self.offset_points,
            &self.sort_points,
            &self.interpolator_type,
            &self.start_linecap_type,
            &self.end_linecap_type,
        ]
    }

    fn params_mut(&mut self) -> Vec<&mut dyn Parameter> {
        vec![
            &mut self.offset_points,
            &mut self.sort_points,
            &mut self.interpolator_type,
            &mut self.start_linecap_type,
            &mut self.end_linecap_type,
        ]
    }

    fn on_apply(&mut self, base: &BezPath, _ctx: &EffectContext) {
        let Some(sp) = subpaths(base).into_iter().next() else {
            return;
        };
        let size = sp.segments.len() as f64;
        let width = 1.0;
        let points = if sp.closed {
            vec![Point::new(0.5 * size, width)]
        } else {
            vec![
                Point::new(0.2, width),
                Point::new(0.5 * size, width),
                Point::new(size - 0.2, width),
            ]
        };
        self.offset_points.set_default_points(points.clone());
        self.offset_points.set_points(points);
    }

    fn do_effect_path(&mut self, input: &BezPath, ctx: &EffectContext) -> LpeResult<BezPath> {
        let mut out = BezPath::new();
        for (i, sp) in subpaths(input).iter().enumerate() {
            let curve = from_subpath(sp);
            if curve.is_empty() {
                continue;
            }
            let der = curve.unit_tangent(ctx.tolerance);
            let n = der.rot90();
            if i == 0 {
                self.offset_points.set_cache(curve.clone(), n.clone());
            }
            let outline = self.outline(sp, &curve, &der, &n, ctx.tolerance)?;
            for el in to_path(&outline, ctx.tolerance).elements() {
                out.push(*el);
            }
        }
        if out.elements().is_empty() {
            return Err(LpeError::degenerate("power stroke needs a non-empty path"));
        }
        Ok(out)
    }
}

impl PowerStroke {
    fn outline(
        &self,
        sp: &Subpath,
        curve: &PiecewiseCurve,
        der: &PiecewiseCurve,
        n: &PiecewiseCurve,
        tol: f64,
    ) -> LpeResult<PiecewiseCurve> {
        if sp.closed {
            self.outline_closed(curve, n, tol)
        } else {
            self.outline_open(curve, der, n, tol)
        }
    }
}

impl HandleProvider for PowerStroke {
    fn handle_targets(&self) -> Vec<HandleTarget> {
        (0..self.offset_points.len())
            .map(|index| HandleTarget::Entry {
                key: OFFSET_POINTS,
                index,
            })
            .collect()
    }

    fn handle_position(&self, target: &HandleTarget) -> Option<Point> {
        let HandleTarget::Entry {
            key: OFFSET_POINTS,
            index,
        } = *target
        else {
            return None;
        };
        let entry = self.offset_points.get(index)?;
        let (curve, n) = self.centerline()?;
        let dom = curve.domain()?;
        let t = dom.clamp(entry.x);
        Some(curve.value_at(t)? + n.value_at(t)?.to_vec2() * entry.y)
    }

    fn set_handle_position(&mut self, target: &HandleTarget, p: Point, _mods: Modifiers) -> bool {
        let HandleTarget::Entry {
            key: OFFSET_POINTS,
            index,
        } = *target
        else {
            return false;
        };
        match self.project(p) {
            Some(entry) => self.offset_points.set_point(index, entry),
            None => false,
        }
    }

    fn insert_entry(&mut self, key: &str, p: Point) -> Option<usize> {
        if key != OFFSET_POINTS {
            return None;
        }
        let entry = self.project(p)?;
        let index = self
            .offset_points
            .points()
            .iter()
            .take_while(|q| q.x <= entry.x)
            .count();
        Some(self.offset_points.insert(index, entry))
    }

    fn delete_entry(&mut self, key: &str, index: usize) -> bool {
        // The last remaining point defines the whole width.
        if key != OFFSET_POINTS || self.offset_points.len() <= 1 {
            return false;
        }
        self.offset_points.delete(index).is_some()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/powerstroke.rs"]
mod tests;
