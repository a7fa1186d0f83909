//! Free-form deformation through a 4x4 grid of control points over the bounding box.
//!
//! The grid is a bicubic Bernstein patch: with every point at its default the patch is the
//! identity. Each fragment is composed with the patch exactly, so the result stays polynomial.

use kurbo::{BezPath, Point, Rect};

use super::{EffectContext, PathEffect};
use crate::foundation::core::EPSILON;
use crate::foundation::error::{LpeError, LpeResult};
use crate::geom::convert::{from_path, to_path};
use crate::geom::curve::{Curve2, PiecewiseCurve};
use crate::geom::poly::Poly;
use crate::interaction::{HandleProvider, HandleTarget, Modifiers};
use crate::params::{Parameter, PointParam};

const GRID_KEYS: [&str; 16] = [
    "gridpoint0",
    "gridpoint1",
    "gridpoint2",
    "gridpoint3",
    "gridpoint4",
    "gridpoint5",
    "gridpoint6",
    "gridpoint7",
    "gridpoint8",
    "gridpoint9",
    "gridpoint10",
    "gridpoint11",
    "gridpoint12",
    "gridpoint13",
    "gridpoint14",
    "gridpoint15",
];

const GRID_LABELS: [&str; 16] = [
    "Control 0",
    "Control 1",
    "Control 2",
    "Control 3",
    "Control 4",
    "Control 5",
    "Control 6",
    "Control 7",
    "Control 8",
    "Control 9",
    "Control 10",
    "Control 11",
    "Control 12",
    "Control 13",
    "Control 14",
    "Control 15",
];

/// Point `i + 4 * j` sits at column `i`, row `j`.
#[derive(Clone, Debug)]
pub struct Lattice {
    grid: [PointParam; 16],
    bbox: Rect,
}

impl Default for Lattice {
    fn default() -> Self {
        Self::new()
    }
}

/// Cubic Bernstein basis polynomials composed with `s`.
fn bernstein(s: &Poly) -> [Poly; 4] {
    let one_minus = &Poly::constant(1.0) - s;
    let s2 = s * s;
    let m2 = &one_minus * &one_minus;
    [
        &m2 * &one_minus,
        (&m2 * s).scale(3.0),
        (&one_minus * &s2).scale(3.0),
        &s2 * s,
    ]
}

impl Lattice {
    pub fn new() -> Self {
        let bbox = Rect::new(0.0, 0.0, 1.0, 1.0);
        Self {
            grid: std::array::from_fn(|k| {
                PointParam::new(GRID_KEYS[k], GRID_LABELS[k], Self::grid_default(bbox, k))
            }),
            bbox,
        }
    }

    fn grid_default(bbox: Rect, k: usize) -> Point {
        let (i, j) = ((k % 4) as f64, (k / 4) as f64);
        Point::new(
            bbox.x0 + i / 3.0 * bbox.width(),
            bbox.y0 + j / 3.0 * bbox.height(),
        )
    }

    fn at_defaults(&self) -> bool {
        self.grid.iter().all(|p| p.is_default())
    }

    fn deform(&self, seg: &Curve2) -> Curve2 {
        let s = seg.x.shift(-self.bbox.x0).scale(1.0 / self.bbox.width());
        let t = seg.y.shift(-self.bbox.y0).scale(1.0 / self.bbox.height());
        let (bu, bv) = (bernstein(&s), bernstein(&t));
        let mut x = Poly::zero();
        let mut y = Poly::zero();
        for (j, v) in bv.iter().enumerate() {
            for (i, u) in bu.iter().enumerate() {
                let w = u * v;
                let p = *self.grid[i + 4 * j].get();
                x = &x + &w.scale(p.x);
                y = &y + &w.scale(p.y);
            }
        }
        Curve2::new(x.trimmed(), y.trimmed())
    }
}

impl PathEffect for Lattice {
    fn params(&self) -> Vec<&dyn Parameter> {
        self.grid.iter().map(|p| p as &dyn Parameter).collect()
    }

    fn params_mut(&mut self) -> Vec<&mut dyn Parameter> {
        self.grid
            .iter_mut()
            .map(|p| p as &mut dyn Parameter)
            .collect()
    }

    fn on_apply(&mut self, _base: &BezPath, ctx: &EffectContext) {
        for (k, p) in self.grid.iter_mut().enumerate() {
            let d = Self::grid_default(ctx.bbox, k);
            p.set_default_value(d);
            p.set(d);
        }
    }

    fn before_effect(&mut self, _input: &BezPath, ctx: &EffectContext) {
        self.bbox = ctx.bbox;
    }

    fn do_effect_path(&mut self, input: &BezPath, ctx: &EffectContext) -> LpeResult<BezPath> {
        if self.at_defaults() {
            return Ok(input.clone());
        }
        let curve = from_path(input);
        let out = self.do_effect_pwd2(&curve, ctx)?;
        Ok(to_path(&out, ctx.tolerance))
    }

    fn do_effect_pwd2(
        &mut self,
        curve: &PiecewiseCurve,
        _ctx: &EffectContext,
    ) -> LpeResult<PiecewiseCurve> {
        if self.bbox.width() <= EPSILON || self.bbox.height() <= EPSILON {
            return Err(LpeError::degenerate("lattice needs a two-dimensional bounding box"));
        }
        Ok(curve.map(|seg| self.deform(seg)))
    }

    fn indicators(&self) -> Vec<BezPath> {
        let mut path = BezPath::new();
        for row in 0..4 {
            path.move_to(*self.grid[4 * row].get());
            for col in 1..4 {
                path.line_to(*self.grid[col + 4 * row].get());
            }
        }
        for col in 0..4 {
            path.move_to(*self.grid[col].get());
            for row in 1..4 {
                path.line_to(*self.grid[col + 4 * row].get());
            }
        }
        vec![path]
    }
}

impl HandleProvider for Lattice {
    fn handle_targets(&self) -> Vec<HandleTarget> {
        GRID_KEYS.iter().map(|&k| HandleTarget::Param(k)).collect()
    }

    fn handle_position(&self, target: &HandleTarget) -> Option<Point> {
        let key = target.key();
        self.grid
            .iter()
            .find(|p| p.key() == key)
            .map(|p| *p.get())
    }

    fn set_handle_position(&mut self, target: &HandleTarget, p: Point, _mods: Modifiers) -> bool {
        let key = target.key();
        match self.grid.iter_mut().find(|g| g.key() == key) {
            Some(g) => {
                g.set(p);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/lattice.rs"]
mod tests;
