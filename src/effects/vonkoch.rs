//! Self-similar fractal: the input is repeatedly replaced by copies of itself placed by the
//! generator.
//!
//! Every generator subpath defines one affine map, the one that takes the reference chord onto
//! the subpath's own chord. Generation `n + 1` is the union of all maps applied to generation `n`.

use kurbo::{Affine, BezPath, ParamCurve, Point, Vec2};

use super::{EffectContext, PathEffect};
use crate::foundation::core::EPSILON;
use crate::foundation::error::{LpeError, LpeResult};
use crate::foundation::math::rot90;
use crate::geom::path::subpaths;
use crate::params::{BoolParam, Parameter, PathParam, ScalarParam};

#[derive(Clone, Debug)]
pub struct VonKoch {
    ref_path: PathParam,
    generator: PathParam,
    nbgenerations: ScalarParam,
    similar_only: BoolParam,
    drawall: BoolParam,
    max_complexity: ScalarParam,
}

impl Default for VonKoch {
    fn default() -> Self {
        Self::new()
    }
}

/// Origin and axes of a chord; the second axis is the first turned a quarter.
#[derive(Clone, Copy, Debug)]
struct Frame {
    origin: Point,
    x: Vec2,
    y: Vec2,
}

impl Frame {
    fn affine(self) -> Affine {
        Affine::new([
            self.x.x,
            self.x.y,
            self.y.x,
            self.y.y,
            self.origin.x,
            self.origin.y,
        ])
    }
}

fn chord(a: Point, b: Point) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(a);
    path.line_to(b);
    path
}

fn segment_count(path: &BezPath) -> usize {
    path.segments().count()
}

fn append(out: &mut BezPath, path: &BezPath) {
    for el in path.elements() {
        out.push(*el);
    }
}

impl VonKoch {
    pub fn new() -> Self {
        Self {
            ref_path: PathParam::new(
                "ref_path",
                "Reference segment",
                chord(Point::ZERO, Point::new(1.0, 0.0)),
            ),
            generator: PathParam::new(
                "generator",
                "Generating path",
                koch(Point::ZERO, Point::new(1.0, 0.0)),
            ),
            nbgenerations: ScalarParam::scalar("nbgenerations", "N# of generations", 1.0)
                .range(0.0, 1e6)
                .integer(),
            similar_only: BoolParam::new("similar_only", "Use uniform transforms only", false),
            drawall: BoolParam::new("drawall", "Draw all generations", true),
            max_complexity: ScalarParam::scalar("maxComplexity", "Max complexity", 1000.0)
                .range(0.0, 1e6)
                .integer(),
        }
    }

    fn reference(&self) -> LpeResult<Frame> {
        let sp = subpaths(self.ref_path.get())
            .into_iter()
            .next()
            .ok_or_else(|| LpeError::degenerate("von Koch needs a reference segment"))?;
        let (a, b) = (sp.start, sp.end());
        let x = b - a;
        if x.hypot() <= EPSILON {
            return Err(LpeError::degenerate("von Koch reference segment has no length"));
        }
        Ok(Frame { origin: a, x, y: rot90(x) })
    }

    /// Target frames of the generator subpaths. Without `similar_only`, a subpath with an
    /// interior node uses its first leg as the second axis, which allows shear and mirroring.
    fn frames(&self) -> Vec<Frame> {
        subpaths(self.generator.get())
            .iter()
            .filter_map(|sp| {
                let x = sp.end() - sp.start;
                if x.hypot() <= EPSILON {
                    return None;
                }
                let mut y = rot90(x);
                if !self.similar_only.value() && sp.segments.len() > 1 {
                    let leg = sp.segments[0].end() - sp.start;
                    if x.cross(leg).abs() > EPSILON * x.hypot() {
                        y = leg;
                    }
                }
                Some(Frame { origin: sp.start, x, y })
            })
            .collect()
    }

    /// Generations that fit under `maxComplexity` segments in the last generation.
    fn generations(&self, maps: usize, base: usize) -> usize {
        let cap = self.max_complexity.count();
        let mut size = base.max(1);
        let mut n = 0;
        while n < self.nbgenerations.count() {
            let next = size.saturating_mul(maps);
            if next > cap {
                tracing::debug!(
                    requested = self.nbgenerations.count(),
                    used = n,
                    "von Koch generations capped by complexity"
                );
                break;
            }
            size = next;
            n += 1;
        }
        n
    }
}

/// The classic four-piece generator over `a..b`, peak on the left of the chord.
fn koch(a: Point, b: Point) -> BezPath {
    let d = b - a;
    let p1 = a + d / 3.0;
    let p2 = a + d * (2.0 / 3.0);
    let peak = a + d * 0.5 + rot90(d) * (3f64.sqrt() / 6.0);
    let mut path = chord(a, p1);
    append(&mut path, &chord(p1, peak));
    append(&mut path, &chord(peak, p2));
    append(&mut path, &chord(p2, b));
    path
}

impl PathEffect for VonKoch {
    fn params(&self) -> Vec<&dyn Parameter> {
        vec![
            &self.ref_path,
            &self.generator,
            &self.nbgenerations,
            &self.similar_only,
            &self.drawall,
            &self.max_complexity,
        ]
    }

    fn params_mut(&mut self) -> Vec<&mut dyn Parameter> {
        vec![
            &mut self.ref_path,
            &mut self.generator,
            &mut self.nbgenerations,
            &mut self.similar_only,
            &mut self.drawall,
            &mut self.max_complexity,
        ]
    }

    fn on_apply(&mut self, _base: &BezPath, ctx: &EffectContext) {
        let y = ctx.bbox.center().y;
        let (a, b) = (Point::new(ctx.bbox.x0, y), Point::new(ctx.bbox.x1, y));
        let reference = chord(a, b);
        self.ref_path.set_default_value(reference.clone());
        self.ref_path.set(reference);
        let generator = koch(a, b);
        self.generator.set_default_value(generator.clone());
        self.generator.set(generator);
    }

    fn do_effect_path(&mut self, input: &BezPath, _ctx: &EffectContext) -> LpeResult<BezPath> {
        if input.elements().is_empty() {
            return Err(LpeError::degenerate("von Koch needs a pattern"));
        }
        let reference = self.reference()?.affine();
        let inverse = reference.inverse();
        let maps: Vec<Affine> = self
            .frames()
            .into_iter()
            .map(|f| f.affine() * inverse)
            .collect();
        if maps.is_empty() {
            return Err(LpeError::degenerate("von Koch generator has no usable subpath"));
        }
        let n = self.generations(maps.len(), segment_count(input));
        let mut out = BezPath::new();
        let mut current = input.clone();
        for _ in 0..n {
            if self.drawall.value() {
                append(&mut out, &current);
            }
            let mut next = BezPath::new();
            for m in &maps {
                append(&mut next, &(*m * current.clone()));
            }
            current = next;
        }
        append(&mut out, &current);
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/vonkoch.rs"]
mod tests;
