//! Point-array parameters: ordered `(x, y)` entries with index-based editing.
//!
//! Curve-relative arrays (power-stroke offsets, fillet radii) keep an advisory copy of the last
//! centerline they were evaluated against so handles can be placed without recomputing the
//! stack. The cache is never persisted and is rebuilt on every effect run.

use kurbo::Point;

use super::values::{parse_number, parse_pair, write_pair};
use super::{Param, ParamKind, ParamValue, Parameter};
use crate::geom::curve::PiecewiseCurve;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointList(pub Vec<Point>);

impl ParamValue for PointList {
    type Constraint = ();

    const KIND: ParamKind = ParamKind::PointArray;

    /// `x,y | x,y | ...`; a bare flattened list of coordinates is accepted too.
    fn parse_text(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Some(Self::default());
        }
        if text.contains('|') {
            return text
                .split('|')
                .map(|entry| parse_pair(entry).map(|(x, y)| Point::new(x, y)))
                .collect::<Option<Vec<_>>>()
                .map(PointList);
        }
        let nums = text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(parse_number)
            .collect::<Option<Vec<_>>>()?;
        if nums.len() % 2 != 0 {
            return None;
        }
        Some(PointList(
            nums.chunks_exact(2).map(|c| Point::new(c[0], c[1])).collect(),
        ))
    }

    fn to_text(&self) -> String {
        self.0
            .iter()
            .map(|p| write_pair(p.x, p.y))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

#[derive(Clone, Debug)]
pub struct PointArrayParam {
    inner: Param<PointList>,
    last_curve: Option<PiecewiseCurve>,
    last_normal: Option<PiecewiseCurve>,
}

impl PointArrayParam {
    pub fn new(key: &'static str, label: &'static str) -> Self {
        Self {
            inner: Param::new(key, label, PointList::default()),
            last_curve: None,
            last_normal: None,
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.inner.get().0
    }

    pub fn len(&self) -> usize {
        self.points().len()
    }

    pub fn is_empty(&self) -> bool {
        self.points().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Point> {
        self.points().get(index).copied()
    }

    pub fn set_points(&mut self, points: Vec<Point>) {
        self.inner.set(PointList(points));
    }

    pub fn set_default_points(&mut self, points: Vec<Point>) {
        self.inner.set_default_value(PointList(points));
    }

    /// Overwrites one entry; out-of-range indices are ignored.
    pub fn set_point(&mut self, index: usize, p: Point) -> bool {
        let mut points = self.inner.get().0.clone();
        let Some(slot) = points.get_mut(index) else {
            return false;
        };
        *slot = p;
        self.inner.set(PointList(points));
        true
    }

    /// Inserts `p` at `index` (clamped to the length).
    pub fn insert(&mut self, index: usize, p: Point) -> usize {
        let mut points = self.inner.get().0.clone();
        let index = index.min(points.len());
        points.insert(index, p);
        self.inner.set(PointList(points));
        index
    }

    pub fn delete(&mut self, index: usize) -> Option<Point> {
        let mut points = self.inner.get().0.clone();
        if index >= points.len() {
            return None;
        }
        let removed = points.remove(index);
        self.inner.set(PointList(points));
        Some(removed)
    }

    /// Remembers the centerline (and its normal) the entries were last evaluated against.
    pub fn set_cache(&mut self, curve: PiecewiseCurve, normal: PiecewiseCurve) {
        self.last_curve = Some(curve);
        self.last_normal = Some(normal);
    }

    pub fn cached_curve(&self) -> Option<&PiecewiseCurve> {
        self.last_curve.as_ref()
    }

    pub fn cached_normal(&self) -> Option<&PiecewiseCurve> {
        self.last_normal.as_ref()
    }
}

impl Parameter for PointArrayParam {
    fn key(&self) -> &'static str {
        self.inner.key()
    }

    fn label(&self) -> &'static str {
        self.inner.label()
    }

    fn kind(&self) -> ParamKind {
        ParamKind::PointArray
    }

    fn read_from_text(&mut self, text: &str) -> bool {
        self.inner.read_from_text(text)
    }

    fn write_to_text(&self) -> String {
        self.inner.write_to_text()
    }

    fn set_default(&mut self) {
        self.inner.set_default();
    }

    fn clamp_to_range(&mut self) {
        self.inner.clamp_to_range();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/params/point_array.rs"]
mod tests;
