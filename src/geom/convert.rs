//! Conversion between PathGeometry and piecewise curves.

use kurbo::{BezPath, CubicBez, PathSeg, Point, Vec2};

use crate::foundation::core::EPSILON;
use crate::geom::curve::{Curve2, PiecewiseCurve};
use crate::geom::path::{Subpath, subpaths};

const MAX_HERMITE_DEPTH: u32 = 10;

/// One fragment per segment over `[0, n]`; empty for an empty subpath.
pub fn from_subpath(sp: &Subpath) -> PiecewiseCurve {
    let mut out = PiecewiseCurve::new();
    if sp.is_empty() {
        return out;
    }
    out.push_cut(0.0);
    for (i, seg) in sp.segments.iter().enumerate() {
        out.push(Curve2::from_seg(*seg), (i + 1) as f64);
    }
    out
}

/// All subpaths concatenated into one curve; jumps between subpaths are discontinuities.
pub fn from_path(path: &BezPath) -> PiecewiseCurve {
    let mut out = PiecewiseCurve::new();
    for sp in subpaths(path) {
        out.concat(&from_subpath(&sp));
    }
    out
}

/// Bezier approximation of `curve` deviating at most `tol` from it.
///
/// Fragments of degree three or less convert exactly. A jump between fragments starts a new
/// subpath; a run that returns to its own start is closed.
pub fn to_path(curve: &PiecewiseCurve, tol: f64) -> BezPath {
    let mut path = BezPath::new();
    let mut run_start: Option<Point> = None;
    let mut run_segments = 0usize;
    let mut last = Point::ZERO;
    let join_eps = tol.max(EPSILON) * 1e-3;
    for seg in curve.segments() {
        let p0 = seg.at0();
        let jumped = run_start.is_none() || (p0 - last).hypot() > join_eps;
        if jumped {
            close_run(&mut path, run_start, last, run_segments, join_eps);
            path.move_to(p0);
            run_start = Some(p0);
            run_segments = 0;
        }
        match seg.to_seg() {
            Some(bez) => push_seg(&mut path, bez),
            None => hermite(&mut path, seg, 0.0, 1.0, tol, 0),
        }
        run_segments += 1;
        last = seg.at1();
    }
    close_run(&mut path, run_start, last, run_segments, join_eps);
    path
}

fn close_run(path: &mut BezPath, start: Option<Point>, last: Point, segments: usize, eps: f64) {
    let Some(start) = start else {
        return;
    };
    if segments > 1 && (last - start).hypot() <= eps {
        path.close_path();
    }
}

fn push_seg(path: &mut BezPath, seg: PathSeg) {
    match seg {
        PathSeg::Line(l) => path.line_to(l.p1),
        PathSeg::Quad(q) => path.quad_to(q.p1, q.p2),
        PathSeg::Cubic(c) => path.curve_to(c.p1, c.p2, c.p3),
    }
}

/// Cubic Hermite interpolant of `seg` over local `[a, b]`, subdivided until within `tol`.
fn hermite(path: &mut BezPath, seg: &Curve2, a: f64, b: f64, tol: f64, depth: u32) {
    let d = seg.derivative();
    let w = b - a;
    let p0 = seg.eval(a);
    let p3 = seg.eval(b);
    let v0: Vec2 = Vec2::new(d.x.eval(a), d.y.eval(a)) * w;
    let v1: Vec2 = Vec2::new(d.x.eval(b), d.y.eval(b)) * w;
    let cubic = CubicBez::new(p0, p0 + v0 / 3.0, p3 - v1 / 3.0, p3);
    let err = [0.25, 0.5, 0.75]
        .iter()
        .map(|s| (kurbo::ParamCurve::eval(&cubic, *s) - seg.eval(a + w * s)).hypot())
        .fold(0.0, f64::max);
    if err <= tol || depth >= MAX_HERMITE_DEPTH {
        path.curve_to(cubic.p1, cubic.p2, cubic.p3);
        return;
    }
    let mid = 0.5 * (a + b);
    hermite(path, seg, a, mid, tol, depth + 1);
    hermite(path, seg, mid, b, tol, depth + 1);
}

#[cfg(test)]
#[path = "../../tests/unit/geom/convert.rs"]
mod tests;
