//! Combines the filled area of the input with an operand path.
//!
//! Both sides are flattened into closed polylines and combined with cavalier_contours; every
//! subpath counts as closed, and a subpath nested inside an odd number of others is a hole.
//! Results come back as outlines (counter-clockwise) each followed by its holes (clockwise),
//! so a non-zero fill of the output reproduces the region.

use cavalier_contours::polyline::{
    BooleanOp, BooleanResultInfo, PlineOrientation, PlineSource, PlineSourceMut, PlineVertex,
    Polyline,
};
use kurbo::{Arc, BezPath, PathEl, Point, SvgArc, Vec2};

use super::{EffectContext, PathEffect};
use crate::foundation::core::{EPSILON, points_near};
use crate::foundation::error::{LpeError, LpeResult};
use crate::geom::path::subpaths;
use crate::params::{EnumParam, Parameter, PathParam};

crate::param_enum! {
    pub enum BoolOpKind {
        Union => ("union", "Union"),
        Intersection => ("intersection", "Intersection"),
        Difference => ("difference", "Difference"),
        Exclusion => ("exclusion", "Exclusion"),
    }
}

#[derive(Clone, Debug)]
pub struct BoolOp {
    operand: PathParam,
    operation: EnumParam<BoolOpKind>,
}

impl Default for BoolOp {
    fn default() -> Self {
        Self::new()
    }
}

impl BoolOp {
    pub fn new() -> Self {
        Self {
            operand: PathParam::new("operand_path", "Operand path", BezPath::new()),
            operation: EnumParam::new("operation", "Operation", BoolOpKind::Union),
        }
    }
}

type Pline = Polyline<f64>;

/// Pieces below this area are numerical slivers from coincident edges.
const MIN_AREA: f64 = EPSILON;

/// One connected filled area: an outline and the holes directly inside it.
///
/// Outlines and holes are stored counter-clockwise; a filled island inside a hole is a
/// separate shape.
#[derive(Clone, Debug)]
struct Shape {
    outer: Pline,
    holes: Vec<Pline>,
}

impl Shape {
    fn solid(outer: Pline) -> Self {
        Self {
            outer: ccw(outer),
            holes: Vec::new(),
        }
    }

    /// Fill minus the simple polygon `q`.
    fn cut(&self, q: &Pline) -> Vec<Shape> {
        let res = self.outer.boolean(q, BooleanOp::Not);
        match res.result_info {
            BooleanResultInfo::InvalidInput | BooleanResultInfo::Disjoint => vec![self.clone()],
            BooleanResultInfo::Pline2InsidePline1 => {
                // q becomes a hole; holes it joins into a ring leave filled islands behind
                let holes = Region::union_of(self.holes.iter().cloned().chain([q.clone()]));
                let mut out = vec![Shape {
                    outer: self.outer.clone(),
                    holes: holes.shapes.iter().map(|h| h.outer.clone()).collect(),
                }];
                for h in holes.shapes {
                    out.extend(h.holes.into_iter().map(Shape::solid));
                }
                out
            }
            _ => {
                let mut out = Vec::new();
                for piece in res.pos_plines.into_iter().filter_map(|r| significant(r.pline)) {
                    let mut parts = vec![Shape::solid(piece)];
                    for h in &self.holes {
                        parts = parts.iter().flat_map(|s| s.cut(h)).collect();
                    }
                    out.extend(parts);
                }
                out
            }
        }
    }

    /// Fill restricted to the simple polygon `q`.
    fn clip(&self, q: &Pline) -> Vec<Shape> {
        let res = self.outer.boolean(q, BooleanOp::And);
        let mut out = Vec::new();
        for piece in res.pos_plines.into_iter().filter_map(|r| significant(r.pline)) {
            let mut parts = vec![Shape::solid(piece)];
            for h in &self.holes {
                parts = parts.iter().flat_map(|s| s.cut(h)).collect();
            }
            out.extend(parts);
        }
        out
    }
}

/// Filled area as a set of shapes with pairwise disjoint fills.
#[derive(Clone, Debug, Default)]
struct Region {
    shapes: Vec<Shape>,
}

impl Region {
    /// Loops nested inside an odd number of other loops are holes; every other loop is filled.
    fn from_path(path: &BezPath, tol: f64) -> Self {
        let loops: Vec<Pline> = subpaths(path)
            .iter()
            .filter_map(|sp| polyline(&sp.to_bezpath(), tol))
            .collect();
        let mut nested: Vec<(usize, &Pline)> = loops
            .iter()
            .enumerate()
            .map(|(i, l)| {
                let depth = loops
                    .iter()
                    .enumerate()
                    .filter(|&(j, other)| j != i && encloses(other, l))
                    .count();
                (depth, l)
            })
            .collect();
        nested.sort_by_key(|&(depth, _)| depth);

        let mut region = Self::default();
        for (depth, l) in nested {
            let piece = Self {
                shapes: vec![Shape::solid(l.clone())],
            };
            region = if depth % 2 == 0 {
                region.union(&piece)
            } else {
                region.subtract(&piece)
            };
        }
        region
    }

    fn union_of(plines: impl IntoIterator<Item = Pline>) -> Self {
        plines.into_iter().fold(Self::default(), |acc, p| {
            acc.union(&Self {
                shapes: vec![Shape::solid(p)],
            })
        })
    }

    fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    fn subtract(&self, other: &Self) -> Self {
        let mut shapes = self.shapes.clone();
        for b in &other.shapes {
            let mut next = Vec::new();
            for a in &shapes {
                next.extend(a.cut(&b.outer));
                for h in &b.holes {
                    next.extend(a.clip(h));
                }
            }
            shapes = next;
        }
        Self { shapes }
    }

    fn intersect(&self, other: &Self) -> Self {
        let mut shapes = Vec::new();
        for a in &self.shapes {
            for b in &other.shapes {
                let mut parts = a.clip(&b.outer);
                for h in &b.holes {
                    parts = parts.iter().flat_map(|s| s.cut(h)).collect();
                }
                shapes.extend(parts);
            }
        }
        Self { shapes }
    }

    /// Merged outlines minus whatever inside them neither side fills.
    fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        let outlines = merge_outlines(
            self.shapes
                .iter()
                .chain(&other.shapes)
                .map(|s| s.outer.clone())
                .collect(),
        );
        let hull = Self {
            shapes: outlines.into_iter().map(Shape::solid).collect(),
        };
        let empty = hull.subtract(self).subtract(other);
        hull.subtract(&empty)
    }

    /// Symmetric difference; the two halves are disjoint.
    fn exclusion(&self, other: &Self) -> Self {
        let mut out = self.subtract(other);
        out.shapes.extend(other.subtract(self).shapes);
        out
    }

    fn hole_count(&self) -> usize {
        self.shapes.iter().map(|s| s.holes.len()).sum()
    }

    fn to_path(&self, tol: f64) -> BezPath {
        let mut path = BezPath::new();
        for shape in &self.shapes {
            append_polyline(&mut path, &shape.outer, tol);
            for h in oriented(&shape.holes, PlineOrientation::Clockwise) {
                append_polyline(&mut path, &h, tol);
            }
        }
        path
    }
}

/// True when `inner` lies inside `outer` without touching its boundary.
fn encloses(outer: &Pline, inner: &Pline) -> bool {
    matches!(
        outer.boolean(inner, BooleanOp::And).result_info,
        BooleanResultInfo::Pline2InsidePline1
    )
}

/// Closed polyline through the flattened subpath; `None` below three distinct vertices.
fn polyline(sp: &BezPath, tol: f64) -> Option<Pline> {
    let mut points: Vec<Point> = Vec::new();
    kurbo::flatten(sp, tol, |el| match el {
        PathEl::MoveTo(p) | PathEl::LineTo(p) => {
            if points.last().is_none_or(|&q| !points_near(p, q, EPSILON)) {
                points.push(p);
            }
        }
        _ => {}
    });
    if let (Some(&first), Some(&last)) = (points.first(), points.last())
        && points.len() > 1
        && points_near(first, last, EPSILON)
    {
        points.pop();
    }
    if points.len() < 3 {
        return None;
    }
    let mut pl = Polyline::new_closed();
    for p in points {
        pl.vertex_data.push(PlineVertex::new(p.x, p.y, 0.0));
    }
    significant(simplify(pl))
}

fn simplify(p: Pline) -> Pline {
    p.remove_redundant(EPSILON).unwrap_or(p)
}

fn significant(p: Pline) -> Option<Pline> {
    (p.vertex_count() >= 3 && p.area().abs() > MIN_AREA).then_some(p)
}

fn ccw(mut p: Pline) -> Pline {
    if p.orientation() == PlineOrientation::Clockwise {
        p.invert_direction_mut();
    }
    p
}

/// Pairwise union of outlines until none overlap; enclosed gaps are filled in.
fn merge_outlines(mut plines: Vec<Pline>) -> Vec<Pline> {
    plines.retain(|p| p.is_closed() && p.vertex_count() >= 3);
    let mut i = 0;
    while i < plines.len() {
        let mut merged = false;
        for j in i + 1..plines.len() {
            let res = plines[i].boolean(&plines[j], BooleanOp::Or);
            if matches!(
                res.result_info,
                BooleanResultInfo::Disjoint | BooleanResultInfo::InvalidInput
            ) {
                continue;
            }
            let mut next: Vec<Pline> = res
                .pos_plines
                .into_iter()
                .map(|r| ccw(simplify(r.pline)))
                .collect();
            plines.swap_remove(j);
            plines.swap_remove(i);
            plines.append(&mut next);
            merged = true;
            break;
        }
        i = if merged { 0 } else { i + 1 };
    }
    plines
}

fn oriented(plines: &[Pline], desired: PlineOrientation) -> Vec<Pline> {
    plines
        .iter()
        .cloned()
        .map(|mut pl| {
            let orientation = pl.orientation();
            if orientation != PlineOrientation::Open && orientation != desired {
                pl.invert_direction_mut();
            }
            pl
        })
        .collect()
}

/// Appends one closed polyline; bulged segments become circular arcs.
fn append_polyline(path: &mut BezPath, pl: &Pline, tol: f64) {
    let n = pl.vertex_data.len();
    let Some(first) = pl.vertex_data.first() else {
        return;
    };
    path.move_to((first.x, first.y));
    for i in 0..n {
        let v1 = pl.vertex_data[i];
        let v2 = pl.vertex_data[(i + 1) % n];
        let to = Point::new(v2.x, v2.y);
        if v1.bulge.abs() <= EPSILON {
            if i + 1 < n {
                path.line_to(to);
            }
            continue;
        }
        let from = Point::new(v1.x, v1.y);
        // bulge = tan(sweep / 4)
        let sweep = 4.0 * v1.bulge.atan();
        let radius = from.distance(to) / (2.0 * (sweep / 2.0).sin().abs());
        let svg = SvgArc {
            from,
            to,
            radii: Vec2::new(radius, radius),
            x_rotation: 0.0,
            large_arc: v1.bulge.abs() > 1.0,
            sweep: v1.bulge > 0.0,
        };
        match Arc::from_svg_arc(&svg) {
            Some(arc) => {
                for el in arc.append_iter(tol) {
                    path.push(el);
                }
            }
            None => path.line_to(to),
        }
    }
    path.close_path();
}

impl PathEffect for BoolOp {
    fn params(&self) -> Vec<&dyn Parameter> {
        vec![&self.operand, &self.operation]
    }

    fn params_mut(&mut self) -> Vec<&mut dyn Parameter> {
        vec![&mut self.operand, &mut self.operation]
    }

    fn do_effect_path(&mut self, input: &BezPath, ctx: &EffectContext) -> LpeResult<BezPath> {
        let tol = ctx.tolerance;
        let a = Region::from_path(input, tol);
        let b = Region::from_path(self.operand.get(), tol);
        if a.is_empty() || b.is_empty() {
            return Err(LpeError::degenerate(
                "boolean operation needs two closed areas",
            ));
        }
        let out = match self.operation.get() {
            BoolOpKind::Union => a.union(&b),
            BoolOpKind::Intersection => a.intersect(&b),
            BoolOpKind::Difference => a.subtract(&b),
            BoolOpKind::Exclusion => a.exclusion(&b),
        };
        tracing::trace!(
            op = self.operation.get().key(),
            outlines = out.shapes.len(),
            holes = out.hole_count(),
            "boolean operation"
        );
        Ok(out.to_path(tol))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/boolop.rs"]
mod tests;
