//! Rough hatches: fills the shape with a zig-zag stroke that runs back and forth between its
//! sides, like quick hand hatching.
//!
//! The shape is cut by parallel levels perpendicular to the hatch direction. Level crossings
//! are chained into snakes that alternate along a level and along the boundary; each
//! half-turn becomes a cubic whose position and roundness can be jittered. All randomness
//! comes from one seeded stream, restarted on every recompute.

use kurbo::{Affine, BezPath, CubicBez, Line, PathSeg, Point, Vec2};

use super::{EffectContext, PathEffect};
use crate::foundation::core::EPSILON;
use crate::foundation::error::{LpeError, LpeResult};
use crate::foundation::math::{Rng64, rot90, unit_or_zero};
use crate::geom::convert::from_subpath;
use crate::geom::curve::{Curve2, PiecewiseCurve};
use crate::geom::path::Subpath;
use crate::interaction::{HandleProvider, HandleTarget, Modifiers};
use crate::params::{BoolParam, Parameter, PointParam, ScalarParam, VectorParam};

const DIRECTION_ORIGIN: &str = "direction_origin";
const DIRECTION: &str = "direction";
const BENDER_ORIGIN: &str = "bender_origin";
const BENDER: &str = "bender";

/// Hatch spacing is this fraction of the direction vector's length.
const SPACING_FRACTION: f64 = 0.2;

/// Levels generated per subpath at most.
const MAX_LEVELS: usize = 100_000;

/// Crossing times closer than this on one level are one crossing.
const LEVEL_TIME_EPS: f64 = 1e-6;

/// Where the boundary meets one level.
#[derive(Clone, Copy, Debug)]
struct LevelCrossing {
    pt: Point,
    t: f64,
    /// The boundary moves towards increasing levels here.
    rising: bool,
    used: bool,
    next_on_curve: (usize, usize),
    prev_on_curve: (usize, usize),
}

/// Crossings per level, each level sorted along the level.
#[derive(Debug)]
struct Levels(Vec<Vec<LevelCrossing>>);

impl Levels {
    fn new(times: &[Vec<f64>], f: &PiecewiseCurve) -> Self {
        let velocity = f.derivative();
        let mut levels: Vec<Vec<LevelCrossing>> = times
            .iter()
            .map(|ts| {
                let mut lcs: Vec<LevelCrossing> = ts
                    .iter()
                    .filter_map(|&t| {
                        Some(LevelCrossing {
                            pt: f.value_at(t)?,
                            t,
                            rising: velocity.value_at(t)?.x > 0.0,
                            used: false,
                            next_on_curve: (0, 0),
                            prev_on_curve: (0, 0),
                        })
                    })
                    .collect();
                lcs.sort_by(|a, b| a.pt.y.total_cmp(&b.pt.y));
                lcs
            })
            .collect();

        // Boundary order: consecutive crossings by time, wrapping within each continuous run.
        let cuts = f.cuts();
        let jumps: Vec<f64> = f
            .find_discontinuities(EPSILON)
            .into_iter()
            .map(|i| cuts[i])
            .collect();
        let mut order: Vec<(usize, f64, usize, usize)> = Vec::new();
        for (level, lcs) in levels.iter().enumerate() {
            for (idx, lc) in lcs.iter().enumerate() {
                let run = jumps.partition_point(|&j| j <= lc.t);
                order.push((run, lc.t, level, idx));
            }
        }
        order.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));
        for run in order.chunk_by(|a, b| a.0 == b.0) {
            for (k, &(_, _, level, idx)) in run.iter().enumerate() {
                let (_, _, nl, ni) = run[(k + 1) % run.len()];
                levels[level][idx].next_on_curve = (nl, ni);
            }
        }
        let links: Vec<((usize, usize), (usize, usize))> = levels
            .iter()
            .enumerate()
            .flat_map(|(level, lcs)| {
                lcs.iter()
                    .enumerate()
                    .map(move |(idx, lc)| ((level, idx), lc.next_on_curve))
            })
            .collect();
        for (from, (nl, ni)) in links {
            levels[nl][ni].prev_on_curve = from;
        }
        Self(levels)
    }

    fn first_unused(&self) -> Option<(usize, usize)> {
        self.0.iter().enumerate().find_map(|(level, lcs)| {
            lcs.iter().position(|lc| !lc.used).map(|idx| (level, idx))
        })
    }

    fn used(&self, (level, idx): (usize, usize)) -> bool {
        self.0[level][idx].used
    }

    /// Next snake position. Even directions walk along the level (0 up, 2 down), odd ones
    /// follow the boundary to the next level.
    fn step(&self, (level, idx): (usize, usize), dir: &mut u8) -> Option<(usize, usize)> {
        if *dir % 2 == 0 {
            let len = self.0[level].len();
            let idx = if *dir == 0 {
                if idx + 1 >= len || self.used((level, idx + 1)) {
                    return None;
                }
                idx + 1
            } else {
                if idx == 0 || self.used((level, idx - 1)) {
                    return None;
                }
                idx - 1
            };
            *dir += 1;
            return Some((level, idx));
        }
        let lc = &self.0[level][idx];
        *dir = (*dir + 1) % 4;
        let next = if lc.rising {
            lc.next_on_curve
        } else {
            lc.prev_on_curve
        };
        if level + 1 != next.0 || self.used(next) {
            return None;
        }
        Some(next)
    }
}

/// Adds `amount * u * (1 - u)` to x, with `u` the normalized y over `[y0, y0 + h]`.
fn bend(f: &PiecewiseCurve, amount: f64, y0: f64, h: f64) -> PiecewiseCurve {
    f.map(|seg| {
        let u = seg.y.shift(-y0).scale(1.0 / h);
        let one_minus_u = -&u.shift(-1.0);
        let tilt = (&u * &one_minus_u).scale(amount);
        Curve2::new(&seg.x + &tilt, seg.y.clone())
    })
}

/// Frame turning `dir` onto the x axis's normal, so hatch levels are lines of constant x.
fn level_frame(dir: Vec2) -> Affine {
    Affine::new([-dir.y, dir.x, dir.x, dir.y, 0.0, 0.0])
}

#[derive(Clone, Debug)]
pub struct RoughHatches {
    direction_origin: PointParam,
    direction: VectorParam,
    dist_rdm: ScalarParam,
    growth: ScalarParam,
    do_bend: BoolParam,
    bender_origin: PointParam,
    bender: VectorParam,
    top_edge_variation: ScalarParam,
    bot_edge_variation: ScalarParam,
    top_tgt_variation: ScalarParam,
    bot_tgt_variation: ScalarParam,
    scale_tf: ScalarParam,
    scale_tb: ScalarParam,
    scale_bf: ScalarParam,
    scale_bb: ScalarParam,
    top_smth_variation: ScalarParam,
    bot_smth_variation: ScalarParam,
    fat_output: BoolParam,
    stroke_width_top: ScalarParam,
    stroke_width_bot: ScalarParam,
    front_thickness: ScalarParam,
    back_thickness: ScalarParam,
    seed: ScalarParam,
    rng: Rng64,
}

impl Default for RoughHatches {
    fn default() -> Self {
        Self::new()
    }
}

impl RoughHatches {
    pub fn new() -> Self {
        let jitter = |key, label| ScalarParam::scalar(key, label, 0.0).range(0.0, f64::INFINITY);
        let percent = |key, label| ScalarParam::scalar(key, label, 0.0).range(0.0, 100.0);
        let smoothness = |key, label| ScalarParam::scalar(key, label, 1.0);
        let width = |key, label, v| ScalarParam::scalar(key, label, v).range(0.0, f64::INFINITY);
        Self {
            direction_origin: PointParam::new(DIRECTION_ORIGIN, "Hatches origin", Point::ZERO),
            direction: VectorParam::new(DIRECTION, "Hatches width and dir", Vec2::new(50.0, 0.0)),
            dist_rdm: ScalarParam::scalar("dist_rdm", "Frequency randomness", 75.0)
                .range(0.0, 99.0),
            growth: ScalarParam::scalar("growth", "Growth", 0.0).range(0.0, f64::INFINITY),
            do_bend: BoolParam::new("do_bend", "Bend hatches", true),
            bender_origin: PointParam::new(BENDER_ORIGIN, "Bending origin", Point::ZERO),
            bender: VectorParam::new(BENDER, "Global bending", Vec2::new(-5.0, 0.0)),
            top_edge_variation: jitter("top_edge_variation", "Magnitude jitter: 1st side"),
            bot_edge_variation: jitter("bottom_edge_variation", "Magnitude jitter: 2nd side"),
            top_tgt_variation: jitter("top_tgt_variation", "Parallelism jitter: 1st side"),
            bot_tgt_variation: jitter("bottom_tgt_variation", "Parallelism jitter: 2nd side"),
            scale_tf: smoothness("scale_tf", "Half-turns smoothness: 1st side, in"),
            scale_tb: smoothness("scale_tb", "Half-turns smoothness: 1st side, out"),
            scale_bf: smoothness("scale_bf", "Half-turns smoothness: 2nd side, in"),
            scale_bb: smoothness("scale_bb", "Half-turns smoothness: 2nd side, out"),
            top_smth_variation: percent("top_smth_variation", "Smoothness variance: 1st side"),
            bot_smth_variation: percent("bottom_smth_variation", "Smoothness variance: 2nd side"),
            fat_output: BoolParam::new("fat_output", "Generate thick/thin path", true),
            stroke_width_top: width("stroke_width_top", "Thickness at 1st side", 1.0),
            stroke_width_bot: width("stroke_width_bottom", "Thickness at 2nd side", 1.0),
            front_thickness: width("front_thickness", "From 2nd to 1st side", 1.0),
            back_thickness: width("back_thickness", "From 1st to 2nd side", 0.25),
            seed: ScalarParam::scalar("seed", "Random seed", 1.0)
                .range(0.0, f64::from(u32::MAX))
                .integer(),
            rng: Rng64::new(1),
        }
    }

    fn hatch_dist(&self) -> f64 {
        self.direction.get().hypot() * SPACING_FRACTION
    }

    /// A draw in `[0, max)`; zero without consuming the stream when `max` is zero.
    fn draw(&mut self, max: f64) -> f64 {
        if max == 0.0 {
            return 0.0;
        }
        max * self.rng.next_f64_01()
    }

    /// Level positions covering `[lo, hi]`, aligned on `x_org`.
    fn generate_levels(&mut self, lo: f64, hi: f64, x_org: f64) -> Vec<f64> {
        let dist = self.hatch_dist();
        let mut out = Vec::new();
        if hi - lo <= EPSILON {
            return out;
        }
        let n = ((lo - x_org) / dist).trunc();
        let mut x = x_org + n * dist;
        let mut step = dist;
        let scale = 1.0 + dist * self.growth.value() / (hi - lo);
        let spread = self.dist_rdm.value();
        while x < hi {
            if out.len() >= MAX_LEVELS {
                tracing::warn!(levels = out.len(), "hatch level limit reached");
                break;
            }
            out.push(x);
            let rdm = if spread != 0.0 {
                1.0 + (2.0 * self.draw(spread) - spread) / 100.0
            } else {
                1.0
            };
            x += step * rdm;
            step *= scale;
        }
        out
    }

    /// Chains of level crossings; `f` is in the level frame, where levels have constant x.
    fn linear_snake(&mut self, f: &PiecewiseCurve, org: Point) -> Vec<Vec<Point>> {
        let x = f.x();
        let Some(bounds) = f.bounds_exact() else {
            return Vec::new();
        };
        let levels = self.generate_levels(bounds.x0, bounds.x1, org.x);
        let times: Vec<Vec<f64>> = levels
            .iter()
            .map(|&level| {
                let mut cleaned: Vec<f64> = Vec::new();
                for t in x.roots_of(level) {
                    if cleaned.last().is_none_or(|last| t - last > LEVEL_TIME_EPS) {
                        cleaned.push(t);
                    }
                }
                cleaned
            })
            .collect();
        let mut lscs = Levels::new(&times, f);

        let parity = ((bounds.x0 - org.x) / self.hatch_dist()).trunc() as i64 % 2;
        let mut out = Vec::new();
        while let Some((i, mut j)) = lscs.first_unused() {
            let mut dir = 0u8;
            if (i as i64 % 2 == parity) && j + 1 < lscs.0[i].len() && !lscs.0[i][j].used {
                j += 1;
                dir = 2;
            }
            let mut component = Vec::new();
            let mut pos = Some((i, j));
            while let Some((level, idx)) = pos {
                component.push(lscs.0[level][idx].pt);
                lscs.0[level][idx].used = true;
                pos = lscs.step((level, idx), &mut dir);
            }
            out.push(component);
        }
        out
    }

    /// Rounds each half-turn of every snake into a cubic, optionally as a thick/thin outline.
    fn smooth_snake(&mut self, snakes: &[Vec<Point>]) -> PiecewiseCurve {
        let mut result = PiecewiseCurve::new();
        let fat = self.fat_output.value();
        for snake in snakes.iter().filter(|s| s.len() >= 2) {
            let first = snake[0];
            let mut res = Subpath::new(first);
            let mut res_top = Subpath::new(first);
            let mut res_bot = Subpath::new(first);
            let mut last_hdle = first;
            let mut last_top_hdle = first;
            let mut last_bot_hdle = first;
            let mut is_top = snake[0].y < snake[1].y;
            let mut i = 1;
            while i + 1 < snake.len() {
                let (pt0, pt1) = (snake[i], snake[i + 1]);
                let mut new_pt = pt0.midpoint(pt1);
                let (mut scale_in, mut scale_out) = if is_top {
                    (self.scale_tf.value(), self.scale_tb.value())
                } else {
                    (self.scale_bf.value(), self.scale_bb.value())
                };
                let (edge, tgt, smth) = if is_top {
                    (
                        self.top_edge_variation.value(),
                        self.top_tgt_variation.value(),
                        self.top_smth_variation.value(),
                    )
                } else {
                    (
                        self.bot_edge_variation.value(),
                        self.bot_tgt_variation.value(),
                        self.bot_smth_variation.value(),
                    )
                };
                new_pt.y += self.draw(edge) - edge / 2.0;
                new_pt.x += self.draw(tgt) - tgt / 2.0;
                if smth != 0.0 {
                    scale_in *= (100.0 - self.draw(smth)) / 100.0;
                    scale_out *= (100.0 - self.draw(smth)) / 100.0;
                }
                let mut hdle_in = new_pt + (pt0 - pt1) * (scale_in / 2.0);
                let mut hdle_out = new_pt - (pt0 - pt1) * (scale_out / 2.0);
                if fat {
                    let (front, back) = (self.front_thickness.value(), self.back_thickness.value());
                    let (t_in, t_out) = if is_top { (front, back) } else { (back, front) };
                    let across = pt1.x - pt0.x;
                    let half = if across.abs() > EPSILON {
                        (pt1 - pt0) / 2.0 / across
                    } else {
                        Vec2::ZERO
                    };
                    let mut inside = new_pt;
                    inside.y += if is_top {
                        -self.stroke_width_top.value()
                    } else {
                        self.stroke_width_bot.value()
                    };
                    let inside_in = inside + (hdle_in - new_pt) + half * t_in;
                    let inside_out = inside + (hdle_out - new_pt) - half * t_out;
                    hdle_in -= half * t_in;
                    hdle_out += half * t_out;
                    let (outer, inner) = if is_top {
                        (&mut res_top, &mut res_bot)
                    } else {
                        (&mut res_bot, &mut res_top)
                    };
                    let (outer_last, inner_last) = if is_top {
                        (&mut last_top_hdle, &mut last_bot_hdle)
                    } else {
                        (&mut last_bot_hdle, &mut last_top_hdle)
                    };
                    let (outer_end, inner_end) = (outer.end(), inner.end());
                    outer.push(cubic(outer_end, *outer_last, hdle_in, new_pt));
                    inner.push(cubic(inner_end, *inner_last, inside_in, inside));
                    *outer_last = hdle_out;
                    *inner_last = inside_out;
                } else {
                    let end = res.end();
                    res.push(cubic(end, last_hdle, hdle_in, new_pt));
                }
                last_hdle = hdle_out;
                i += 2;
                is_top = !is_top;
            }
            if let Some(&tail) = snake.get(i) {
                if fat {
                    let (top_end, bot_end) = (res_top.end(), res_bot.end());
                    res_top.push(cubic(top_end, last_top_hdle, tail, tail));
                    res_bot.push(cubic(bot_end, last_bot_hdle, tail, tail));
                } else {
                    let end = res.end();
                    res.push(cubic(end, last_hdle, tail, tail));
                }
            }
            if fat {
                res = res_bot;
                let back = res_top.reversed();
                if (back.start - res.end()).hypot() > EPSILON {
                    let end = res.end();
                    res.push(PathSeg::Line(Line::new(end, back.start)));
                }
                res.segments.extend(back.segments);
            }
            result.concat(&from_subpath(&res));
        }
        result
    }
}

fn cubic(p0: Point, p1: Point, p2: Point, p3: Point) -> PathSeg {
    PathSeg::Cubic(CubicBez::new(p0, p1, p2, p3))
}

impl PathEffect for RoughHatches {
    fn params(&self) -> Vec<&dyn Parameter> {
        vec![
            &self.direction_origin,
            &self.direction,
            &self.dist_rdm,
            &self.growth,
            &self.do_bend,
            &self.bender_origin,
            &self.bender,
            &self.top_edge_variation,
            &self.bot_edge_variation,
            &self.top_tgt_variation,
            &self.bot_tgt_variation,
            &self.scale_tf,
            &self.scale_tb,
            &self.scale_bf,
            &self.scale_bb,
            &self.top_smth_variation,
            &self.bot_smth_variation,
            &self.fat_output,
            &self.stroke_width_top,
            &self.stroke_width_bot,
            &self.front_thickness,
            &self.back_thickness,
            &self.seed,
        ]
    }

    fn params_mut(&mut self) -> Vec<&mut dyn Parameter> {
        vec![
            &mut self.direction_origin,
            &mut self.direction,
            &mut self.dist_rdm,
            &mut self.growth,
            &mut self.do_bend,
            &mut self.bender_origin,
            &mut self.bender,
            &mut self.top_edge_variation,
            &mut self.bot_edge_variation,
            &mut self.top_tgt_variation,
            &mut self.bot_tgt_variation,
            &mut self.scale_tf,
            &mut self.scale_tb,
            &mut self.scale_bf,
            &mut self.scale_bb,
            &mut self.top_smth_variation,
            &mut self.bot_smth_variation,
            &mut self.fat_output,
            &mut self.stroke_width_top,
            &mut self.stroke_width_bot,
            &mut self.front_thickness,
            &mut self.back_thickness,
            &mut self.seed,
        ]
    }

    /// Spacing a quarter of the width, jitter a tenth of the height, both centred on the box.
    fn on_apply(&mut self, _base: &BezPath, ctx: &EffectContext) {
        let bbox = ctx.bbox;
        let origin = bbox.center();
        let edge = bbox.height() / 10.0;
        for p in [&mut self.top_edge_variation, &mut self.bot_edge_variation] {
            p.set_default_value(edge);
            p.set(edge);
        }
        let hatch_origin = origin + Vec2::new(0.0, -5.0);
        self.direction_origin.set_default_value(hatch_origin);
        self.direction_origin.set(hatch_origin);
        let dir = Vec2::new(bbox.width() / 4.0, 0.0);
        self.direction.set_default_value(dir);
        self.direction.set(dir);
        self.bender_origin.set_default_value(origin);
        self.bender_origin.set(origin);
        self.bender.set_default_value(Vec2::new(5.0, 0.0));
        self.bender.set(Vec2::new(5.0, 0.0));
    }

    /// Holes are hatched together with their outline.
    fn concatenate_subpaths(&self) -> bool {
        true
    }

    fn before_effect(&mut self, _input: &BezPath, _ctx: &EffectContext) {
        self.rng = Rng64::new(self.seed.count() as u64);
    }

    fn do_effect_pwd2(
        &mut self,
        curve: &PiecewiseCurve,
        _ctx: &EffectContext,
    ) -> LpeResult<PiecewiseCurve> {
        if self.hatch_dist() <= EPSILON {
            return Err(LpeError::degenerate("hatch direction has zero length"));
        }
        let (Some(dom), Some(first), Some(end)) =
            (curve.domain(), curve.first_value(), curve.last_value())
        else {
            return Ok(curve.clone());
        };
        // Only the last run can be left open by concatenation.
        let start = curve
            .find_discontinuities(EPSILON)
            .last()
            .map_or(first, |&i| curve.segment(i).at0());
        let mut shape = curve.clone();
        if (end - start).hypot() > EPSILON {
            shape.push(Curve2::line(end, start), dom.max + 1.0);
        }

        let mut tilt: Option<(Affine, f64, f64, f64)> = None;
        if self.do_bend.value() {
            let bend_dir = -rot90(unit_or_zero(*self.bender.get()));
            let amount = self.bender.get().hypot();
            let bend_mat = level_frame(bend_dir);
            let upright = shape.transform(bend_mat);
            let Some(bounds) = upright.bounds_exact() else {
                return Ok(curve.clone());
            };
            if bounds.height() > EPSILON && bend_mat.determinant().abs() > EPSILON {
                let bent = bend(&upright, -amount, bounds.y0, bounds.height());
                shape = bent.transform(bend_mat.inverse());
                tilt = Some((bend_mat, amount, bounds.y0, bounds.height()));
            }
        }

        let hatches_dir = rot90(unit_or_zero(*self.direction.get()));
        let mat = level_frame(hatches_dir);
        let framed = shape.transform(mat);
        let org = mat * *self.direction_origin.get();
        let snakes = self.linear_snake(&framed, org);
        if snakes.is_empty() {
            return Ok(curve.clone());
        }
        let mut out = self.smooth_snake(&snakes).transform(mat.inverse());
        if let Some((bend_mat, amount, y0, h)) = tilt {
            let upright = out.transform(bend_mat);
            out = bend(&upright, amount, y0, h).transform(bend_mat.inverse());
        }
        tracing::trace!(snakes = snakes.len(), "rough hatches");
        Ok(out)
    }
}

impl HandleProvider for RoughHatches {
    fn handle_targets(&self) -> Vec<HandleTarget> {
        vec![
            HandleTarget::Param(DIRECTION_ORIGIN),
            HandleTarget::Param(DIRECTION),
            HandleTarget::Param(BENDER_ORIGIN),
            HandleTarget::Param(BENDER),
        ]
    }

    fn handle_position(&self, target: &HandleTarget) -> Option<Point> {
        match target {
            HandleTarget::Param(DIRECTION_ORIGIN) => Some(*self.direction_origin.get()),
            HandleTarget::Param(DIRECTION) => {
                Some(*self.direction_origin.get() + *self.direction.get())
            }
            HandleTarget::Param(BENDER_ORIGIN) => Some(*self.bender_origin.get()),
            HandleTarget::Param(BENDER) => Some(*self.bender_origin.get() + *self.bender.get()),
            _ => None,
        }
    }

    /// Origins move their vector along; vector ends only change the vector.
    fn set_handle_position(&mut self, target: &HandleTarget, p: Point, _mods: Modifiers) -> bool {
        match target {
            HandleTarget::Param(DIRECTION_ORIGIN) => self.direction_origin.set(p),
            HandleTarget::Param(DIRECTION) => {
                self.direction.set(p - *self.direction_origin.get());
            }
            HandleTarget::Param(BENDER_ORIGIN) => self.bender_origin.set(p),
            HandleTarget::Param(BENDER) => self.bender.set(p - *self.bender_origin.get()),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/rough_hatches.rs"]
mod tests;
