//! Ray crossings and wedge tests used by angular clipping, plus curve-curve crossings.

use kurbo::{Line, ParamCurve, ParamCurveExtrema, PathSeg, Point, Rect, Vec2};
use smallvec::SmallVec;

use crate::geom::curve::{Curve2, PiecewiseCurve};

/// A half-line from `origin` along `dir`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Point,
    pub dir: Vec2,
}

impl Ray {
    pub fn from_angle(origin: Point, angle: f64) -> Self {
        Self {
            origin,
            dir: Vec2::from_angle(angle),
        }
    }

    /// The ray clipped to a segment long enough to cross anything within `reach` of the origin.
    fn as_line(&self, reach: f64) -> Line {
        Line::new(self.origin, self.origin + self.dir * reach)
    }
}

/// Segment parameters where `seg` crosses `ray`, ascending.
pub fn ray_crossings(seg: &PathSeg, ray: &Ray) -> SmallVec<[f64; 4]> {
    let bb = seg.bounding_box();
    let reach = [
        Point::new(bb.x0, bb.y0),
        Point::new(bb.x1, bb.y0),
        Point::new(bb.x0, bb.y1),
        Point::new(bb.x1, bb.y1),
    ]
    .iter()
    .map(|c| (*c - ray.origin).hypot())
    .fold(1.0, f64::max)
        * 2.0;
    let mut out: SmallVec<[f64; 4]> = seg
        .intersect_line(ray.as_line(reach))
        .iter()
        .map(|hit| hit.segment_t)
        .collect();
    out.sort_by(f64::total_cmp);
    out.dedup_by(|a, b| (*a - *b).abs() <= 1e-9);
    out
}

fn sign(p: Point, a: Point, b: Point) -> f64 {
    (p - b).cross(a - b)
}

/// Closed point-in-triangle test, independent of the triangle's orientation.
pub fn point_in_triangle(p: Point, a: Point, b: Point, c: Point) -> bool {
    let d1 = sign(p, a, b);
    let d2 = sign(p, b, c);
    let d3 = sign(p, c, a);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// Whether `p` lies inside the wedge swept counter-clockwise from `start` by `sweep` radians.
///
/// Wedges narrower than a half turn use a triangle large enough to contain `p`; wider wedges
/// are the complement of the opposite one.
pub fn in_wedge(origin: Point, start: f64, sweep: f64, p: Point) -> bool {
    use std::f64::consts::PI;
    if sweep >= 2.0 * PI {
        return true;
    }
    if sweep > PI {
        return !in_wedge(origin, start + sweep, 2.0 * PI - sweep, p) || on_ray(origin, start, p);
    }
    let reach = (p - origin).hypot() * 4.0 + 1.0;
    let a = origin + Vec2::from_angle(start) * reach;
    let b = origin + Vec2::from_angle(start + sweep) * reach;
    if sweep > PI / 2.0 {
        // Split so each triangle spans less than a right angle and still covers the radius.
        let m = origin + Vec2::from_angle(start + sweep / 2.0) * reach;
        return point_in_triangle(p, origin, a, m) || point_in_triangle(p, origin, m, b);
    }
    point_in_triangle(p, origin, a, b)
}

fn on_ray(origin: Point, angle: f64, p: Point) -> bool {
    let d = Vec2::from_angle(angle);
    let v = p - origin;
    v.cross(d).abs() <= 1e-9 * v.hypot().max(1.0) && v.dot(d) >= 0.0
}

/// Portions of `seg` lying inside the wedge, as `(t0, t1)` parameter ranges.
pub fn clip_to_wedge(seg: &PathSeg, origin: Point, start: f64, sweep: f64) -> Vec<(f64, f64)> {
    let mut ts: Vec<f64> = vec![0.0, 1.0];
    ts.extend(ray_crossings(seg, &Ray::from_angle(origin, start)));
    ts.extend(ray_crossings(seg, &Ray::from_angle(origin, start + sweep)));
    ts.sort_by(f64::total_cmp);
    ts.dedup_by(|a, b| (*a - *b).abs() <= 1e-9);
    let mut out: Vec<(f64, f64)> = Vec::new();
    for w in ts.windows(2) {
        let (t0, t1) = (w[0], w[1]);
        if !in_wedge(origin, start, sweep, seg.eval(0.5 * (t0 + t1))) {
            continue;
        }
        match out.last_mut() {
            Some(last) if (last.1 - t0).abs() <= 1e-9 => last.1 = t1,
            _ => out.push((t0, t1)),
        }
    }
    out
}

/// Subdivision depth limit when isolating a crossing.
const MAX_SPLIT_DEPTH: u32 = 40;

const CHORD_SLACK: f64 = 1e-9;

/// Global times `(ta, tb)` where `a` crosses `b`, ordered by `ta`.
///
/// Crossings closer than `tol` to an earlier one are merged.
pub fn curve_crossings(a: &PiecewiseCurve, b: &PiecewiseCurve, tol: f64) -> Vec<(f64, f64)> {
    let mut out = Vec::new();
    for (i, fa) in a.segments().iter().enumerate() {
        for (j, fb) in b.segments().iter().enumerate() {
            let mut local = Vec::new();
            split_hits(fa, (0.0, 1.0), fb, (0.0, 1.0), tol, 0, &mut local);
            out.extend(local.into_iter().map(|(u, v)| (a.global(i, u), b.global(j, v))));
        }
    }
    finish(a, out, tol)
}

/// Times `(ta, tb)` with `ta < tb` where `curve` crosses itself.
///
/// Shared fragment ends are not crossings; with `closed`, neither is the seam where the last
/// fragment meets the first.
pub fn self_crossings(curve: &PiecewiseCurve, closed: bool, tol: f64) -> Vec<(f64, f64)> {
    let Some(dom) = curve.domain() else {
        return Vec::new();
    };
    let segs = curve.segments();
    let mut out = Vec::new();
    for i in 0..segs.len() {
        let mut local = Vec::new();
        // A single fragment can only loop over itself across its midpoint.
        split_hits(&segs[i], (0.0, 0.5), &segs[i], (0.5, 1.0), tol, 0, &mut local);
        out.extend(local.into_iter().map(|(u, v)| (curve.global(i, u), curve.global(i, v))));
        for j in i + 1..segs.len() {
            let mut local = Vec::new();
            split_hits(&segs[i], (0.0, 1.0), &segs[j], (0.0, 1.0), tol, 0, &mut local);
            out.extend(local.into_iter().map(|(u, v)| (curve.global(i, u), curve.global(j, v))));
        }
    }
    let joint = 1e-6 * dom.extent().max(1.0);
    out.retain(|&(ta, tb)| {
        let same = (tb - ta).abs() <= joint;
        let seam = closed && ta - dom.min <= joint && dom.max - tb <= joint;
        let (pa, pb) = (curve.value_at(ta), curve.value_at(tb));
        let coincident = matches!((pa, pb), (Some(pa), Some(pb)) if (pa - pb).hypot() <= tol);
        !same && !seam && coincident && !touches_at_joint(curve, ta, tb, joint)
    });
    finish(curve, out, tol)
}

/// Both times sit on the same fragment boundary, i.e. adjacent fragments meeting end to start.
fn touches_at_joint(curve: &PiecewiseCurve, ta: f64, tb: f64, eps: f64) -> bool {
    let cuts = curve.cuts();
    let on_cut = |t: f64| cuts.iter().position(|c| (c - t).abs() <= eps);
    matches!((on_cut(ta), on_cut(tb)), (Some(x), Some(y)) if x == y)
}

fn finish(a: &PiecewiseCurve, mut hits: Vec<(f64, f64)>, tol: f64) -> Vec<(f64, f64)> {
    hits.sort_by(|x, y| x.0.total_cmp(&y.0));
    let mut out: Vec<(f64, f64)> = Vec::new();
    let mut points: Vec<Point> = Vec::new();
    for (ta, tb) in hits {
        let Some(p) = a.value_at(ta) else {
            continue;
        };
        if points.iter().any(|q| (*q - p).hypot() <= tol) {
            continue;
        }
        points.push(p);
        out.push((ta, tb));
    }
    out
}

fn part(c: &Curve2, lo: f64, hi: f64) -> Curve2 {
    Curve2::new(c.x.portion(lo, hi), c.y.portion(lo, hi))
}

fn boxes_meet(a: Rect, b: Rect, eps: f64) -> bool {
    a.x0 <= b.x1 + eps && b.x0 <= a.x1 + eps && a.y0 <= b.y1 + eps && b.y0 <= a.y1 + eps
}

fn split_hits(
    a: &Curve2,
    ra: (f64, f64),
    b: &Curve2,
    rb: (f64, f64),
    tol: f64,
    depth: u32,
    out: &mut Vec<(f64, f64)>,
) {
    let (pa, pb) = (part(a, ra.0, ra.1), part(b, rb.0, rb.1));
    let (ba, bb) = (pa.bounds(), pb.bounds());
    if !boxes_meet(ba, bb, tol * 1e-3) {
        return;
    }
    let flat = |r: Rect| r.width().max(r.height()) <= tol;
    if depth >= MAX_SPLIT_DEPTH || (flat(ba) && flat(bb)) {
        if let Some((s, r)) = chord_hit(pa.at0(), pa.at1(), pb.at0(), pb.at1()) {
            out.push((lerp(ra, s), lerp(rb, r)));
        }
        return;
    }
    let ma = 0.5 * (ra.0 + ra.1);
    let mb = 0.5 * (rb.0 + rb.1);
    for sa in [(ra.0, ma), (ma, ra.1)] {
        for sb in [(rb.0, mb), (mb, rb.1)] {
            split_hits(a, sa, b, sb, tol, depth + 1, out);
        }
    }
}

fn lerp(r: (f64, f64), f: f64) -> f64 {
    r.0 + (r.1 - r.0) * f
}

/// Parameters of the intersection of chords `a0a1` and `b0b1`. A crossing on a split point
/// may be reported by both neighbours; callers merge near duplicates.
fn chord_hit(a0: Point, a1: Point, b0: Point, b1: Point) -> Option<(f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;
    let den = da.cross(db);
    if den.abs() <= 1e-18 {
        return None;
    }
    let w = b0 - a0;
    let s = w.cross(db) / den;
    let r = w.cross(da) / den;
    let inside = |v: f64| (-CHORD_SLACK..=1.0 + CHORD_SLACK).contains(&v);
    (inside(s) && inside(r)).then(|| (s.clamp(0.0, 1.0), r.clamp(0.0, 1.0)))
}

#[cfg(test)]
#[path = "../../tests/unit/geom/intersect.rs"]
mod tests;
