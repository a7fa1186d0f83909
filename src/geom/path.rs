//! PathGeometry helpers over `kurbo::BezPath`.
//!
//! A path is an ordered sequence of subpaths. [`Subpath`] is the explicit segment-list view the
//! algorithms work on; the persisted text form is absolute `M`/`L`/`C`/`Z` commands.

use std::fmt::Write as _;

use kurbo::{
    BezPath, CubicBez, Line, ParamCurve, ParamCurveArclen, ParamCurveDeriv, PathEl, PathSeg,
    Point, Rect, Shape, Vec2,
};

use crate::foundation::core::EPSILON;

/// Arc-length accuracy used when delegating to kurbo's per-segment arclen.
pub(crate) const ARCLEN_ACCURACY: f64 = 1e-6;

#[derive(Clone, Debug, PartialEq)]
pub struct Subpath {
    pub start: Point,
    pub segments: Vec<PathSeg>,
    pub closed: bool,
}

impl Subpath {
    pub fn new(start: Point) -> Self {
        Self {
            start,
            segments: Vec::new(),
            closed: false,
        }
    }

    pub fn from_segments(segments: Vec<PathSeg>, closed: bool) -> Option<Self> {
        let start = segments.first()?.start();
        Some(Self {
            start,
            segments,
            closed,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn end(&self) -> Point {
        self.segments.last().map(|s| s.end()).unwrap_or(self.start)
    }

    /// Start point of every segment, plus the final end point when open.
    pub fn nodes(&self) -> Vec<Point> {
        let mut out: Vec<Point> = self.segments.iter().map(|s| s.start()).collect();
        if !self.closed || self.segments.is_empty() {
            out.push(self.end());
        }
        out
    }

    pub fn reversed(&self) -> Self {
        let segments: Vec<PathSeg> = self.segments.iter().rev().map(|s| s.reverse()).collect();
        Self {
            start: self.end(),
            segments,
            closed: self.closed,
        }
    }

    pub fn push(&mut self, seg: PathSeg) {
        self.segments.push(seg);
    }

    pub fn length(&self) -> f64 {
        self.segments.iter().map(|s| s.arclen(ARCLEN_ACCURACY)).sum()
    }

    /// Writes the subpath to `path`. A closing line equal to the implicit close is elided.
    pub fn append_to(&self, path: &mut BezPath) {
        path.move_to(self.start);
        let mut segs: &[PathSeg] = &self.segments;
        if self.closed {
            if let Some(PathSeg::Line(l)) = segs.last() {
                if segs.len() > 1 && (l.p1 - self.start).hypot() <= EPSILON {
                    segs = &segs[..segs.len() - 1];
                }
            }
        }
        for seg in segs {
            match *seg {
                PathSeg::Line(l) => path.line_to(l.p1),
                PathSeg::Quad(q) => path.quad_to(q.p1, q.p2),
                PathSeg::Cubic(c) => path.curve_to(c.p1, c.p2, c.p3),
            }
        }
        if self.closed {
            path.close_path();
        }
    }

    pub fn to_bezpath(&self) -> BezPath {
        let mut path = BezPath::new();
        self.append_to(&mut path);
        path
    }
}

/// Splits a path into subpaths. The closing segment of a closed subpath is materialized as an
/// explicit line when it has non-zero length; lone moves are dropped.
pub fn subpaths(path: &BezPath) -> Vec<Subpath> {
    let mut out = Vec::new();
    let mut cur: Option<Subpath> = None;
    let mut last = Point::ZERO;
    let flush = |cur: &mut Option<Subpath>, out: &mut Vec<Subpath>| {
        if let Some(sp) = cur.take() {
            if !sp.is_empty() {
                out.push(sp);
            }
        }
    };
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                flush(&mut cur, &mut out);
                cur = Some(Subpath::new(p));
                last = p;
            }
            PathEl::LineTo(p) => {
                let sp = cur.get_or_insert_with(|| Subpath::new(last));
                sp.push(PathSeg::Line(Line::new(last, p)));
                last = p;
            }
            PathEl::QuadTo(p1, p2) => {
                let sp = cur.get_or_insert_with(|| Subpath::new(last));
                sp.push(PathSeg::Quad(kurbo::QuadBez::new(last, p1, p2)));
                last = p2;
            }
            PathEl::CurveTo(p1, p2, p3) => {
                let sp = cur.get_or_insert_with(|| Subpath::new(last));
                sp.push(PathSeg::Cubic(CubicBez::new(last, p1, p2, p3)));
                last = p3;
            }
            PathEl::ClosePath => {
                if let Some(mut sp) = cur.take() {
                    if (last - sp.start).hypot() > EPSILON {
                        sp.push(PathSeg::Line(Line::new(last, sp.start)));
                    }
                    sp.closed = !sp.is_empty();
                    last = sp.start;
                    if !sp.is_empty() {
                        out.push(sp);
                    }
                }
            }
        }
    }
    flush(&mut cur, &mut out);
    out
}

pub fn from_subpaths<'a>(subs: impl IntoIterator<Item = &'a Subpath>) -> BezPath {
    let mut path = BezPath::new();
    for sp in subs {
        if !sp.is_empty() {
            sp.append_to(&mut path);
        }
    }
    path
}

/// Number of editable nodes, counting each subpath's start and the end of every segment
/// (closed subpaths do not count their closing node twice).
pub fn node_count(path: &BezPath) -> usize {
    subpaths(path).iter().map(|sp| sp.nodes().len()).sum()
}

pub fn path_bounds(path: &BezPath) -> Option<Rect> {
    if path.elements().is_empty() {
        return None;
    }
    Some(path.bounding_box())
}

pub fn first_point(path: &BezPath) -> Option<Point> {
    subpaths(path).first().map(|sp| sp.start)
}

pub fn last_point(path: &BezPath) -> Option<Point> {
    subpaths(path).last().map(Subpath::end)
}

/// Point at global segment time `t` (segment index + local parameter), clamped.
pub fn point_at(path: &BezPath, t: f64) -> Option<Point> {
    let segs: Vec<PathSeg> = path.segments().collect();
    let (i, u) = split_time(segs.len(), t)?;
    Some(segs[i].eval(u))
}

pub fn tangent_at(path: &BezPath, t: f64) -> Option<Vec2> {
    let segs: Vec<PathSeg> = path.segments().collect();
    let (i, u) = split_time(segs.len(), t)?;
    let d = match segs[i] {
        PathSeg::Line(l) => l.p1 - l.p0,
        PathSeg::Quad(q) => q.deriv().eval(u).to_vec2(),
        PathSeg::Cubic(c) => c.deriv().eval(u).to_vec2(),
    };
    Some(d)
}

/// Unit direction of `seg` at local time `t`; stationary ends borrow a nearby direction.
pub fn segment_direction(seg: &PathSeg, t: f64) -> Vec2 {
    for probe in [t, t + 1e-3, t - 1e-3] {
        let u = probe.clamp(0.0, 1.0);
        let d = match *seg {
            PathSeg::Line(l) => l.p1 - l.p0,
            PathSeg::Quad(q) => q.deriv().eval(u).to_vec2(),
            PathSeg::Cubic(c) => c.deriv().eval(u).to_vec2(),
        };
        if d.hypot() > EPSILON {
            return d.normalize();
        }
    }
    let chord = seg.end() - seg.start();
    if chord.hypot() > 0.0 {
        chord.normalize()
    } else {
        Vec2::ZERO
    }
}

pub fn arc_length(path: &BezPath) -> f64 {
    path.segments().map(|s| s.arclen(ARCLEN_ACCURACY)).sum()
}

fn split_time(n: usize, t: f64) -> Option<(usize, f64)> {
    if n == 0 {
        return None;
    }
    let t = t.clamp(0.0, n as f64);
    let i = (t.floor() as usize).min(n - 1);
    Some((i, t - i as f64))
}

/// Shortest round-trip decimal, never in exponent form and without a trailing `.0`.
pub(crate) fn format_number(v: f64) -> String {
    let v = if v == 0.0 { 0.0 } else { v };
    let s = format!("{v}");
    match s.strip_suffix(".0") {
        Some(int) => int.to_string(),
        None => s,
    }
}

fn write_point(out: &mut String, p: Point) {
    let _ = write!(out, "{},{}", format_number(p.x), format_number(p.y));
}

/// Persisted path text: absolute `M`, `L`, `C`, `Z`; quadratic segments are degree-elevated.
pub fn write_path_text(path: &BezPath) -> String {
    let mut out = String::new();
    let mut last = Point::ZERO;
    for el in path.elements() {
        if !out.is_empty() {
            out.push(' ');
        }
        match *el {
            PathEl::MoveTo(p) => {
                out.push_str("M ");
                write_point(&mut out, p);
                last = p;
            }
            PathEl::LineTo(p) => {
                out.push_str("L ");
                write_point(&mut out, p);
                last = p;
            }
            PathEl::QuadTo(p1, p2) => {
                let c = kurbo::QuadBez::new(last, p1, p2).raise();
                out.push_str("C ");
                write_point(&mut out, c.p1);
                out.push(' ');
                write_point(&mut out, c.p2);
                out.push(' ');
                write_point(&mut out, c.p3);
                last = p2;
            }
            PathEl::CurveTo(p1, p2, p3) => {
                out.push_str("C ");
                write_point(&mut out, p1);
                out.push(' ');
                write_point(&mut out, p2);
                out.push(' ');
                write_point(&mut out, p3);
                last = p3;
            }
            PathEl::ClosePath => out.push('Z'),
        }
    }
    out
}

/// Parses path text; arcs and relative commands are accepted and normalized by kurbo.
/// An empty or whitespace-only string is the empty path.
pub fn parse_path_text(text: &str) -> Option<BezPath> {
    if text.trim().is_empty() {
        return Some(BezPath::new());
    }
    BezPath::from_svg(text).ok()
}

#[cfg(test)]
#[path = "../../tests/unit/geom/path.rs"]
mod tests;
