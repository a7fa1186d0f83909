//! Construction lines: the perpendicular bisector of a path's end points, and the bisector of
//! the angle at a path's second node.

use kurbo::{BezPath, Point, Vec2};

use super::{EffectContext, PathEffect};
use crate::foundation::core::EPSILON;
use crate::foundation::error::{LpeError, LpeResult};
use crate::foundation::math::{angle_between, rot90, rotate_vec};
use crate::geom::path::subpaths;
use crate::interaction::{HandleProvider, HandleTarget, Modifiers, project_onto};
use crate::params::{Parameter, ScalarParam};

const LEFT: &str = "length_left";
const RIGHT: &str = "length_right";

/// Anchor and unit direction of the last constructed line.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Axis {
    origin: Point,
    dir: Vec2,
}

impl Axis {
    fn line(&self, left: f64, right: f64) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.origin - self.dir * left);
        path.line_to(self.origin + self.dir * right);
        path
    }
}

fn axis_handle_position(
    axis: Option<Axis>,
    left: f64,
    right: f64,
    target: &HandleTarget,
) -> Option<Point> {
    let axis = axis?;
    match target {
        HandleTarget::Param(LEFT) => Some(axis.origin - axis.dir * left),
        HandleTarget::Param(RIGHT) => Some(axis.origin + axis.dir * right),
        _ => None,
    }
}

fn axis_set_handle(
    axis: Option<Axis>,
    left: &mut ScalarParam,
    right: &mut ScalarParam,
    target: &HandleTarget,
    p: Point,
) -> bool {
    let Some(axis) = axis else {
        return false;
    };
    let along = project_onto(axis.origin, axis.dir, p);
    match target {
        HandleTarget::Param(LEFT) => left.set(-along),
        HandleTarget::Param(RIGHT) => right.set(along),
        _ => return false,
    }
    true
}

#[derive(Clone, Debug)]
pub struct PerpBisector {
    length_left: ScalarParam,
    length_right: ScalarParam,
    axis: Option<Axis>,
}

impl Default for PerpBisector {
    fn default() -> Self {
        Self::new()
    }
}

impl PerpBisector {
    pub fn new() -> Self {
        Self {
            length_left: ScalarParam::scalar(LEFT, "Length left", 200.0),
            length_right: ScalarParam::scalar(RIGHT, "Length right", 200.0),
            axis: None,
        }
    }
}

impl PathEffect for PerpBisector {
    fn params(&self) -> Vec<&dyn Parameter> {
        vec![&self.length_left, &self.length_right]
    }

    fn params_mut(&mut self) -> Vec<&mut dyn Parameter> {
        vec![&mut self.length_left, &mut self.length_right]
    }

    fn do_effect_path(&mut self, input: &BezPath, _ctx: &EffectContext) -> LpeResult<BezPath> {
        let sp = subpaths(input)
            .into_iter()
            .next()
            .ok_or_else(|| LpeError::degenerate("perpendicular bisector needs two nodes"))?;
        let (a, b) = (sp.start, sp.end());
        let chord = b - a;
        if chord.hypot() <= EPSILON {
            return Err(LpeError::degenerate("end points coincide"));
        }
        let axis = Axis {
            origin: a.midpoint(b),
            dir: rot90(chord.normalize()),
        };
        self.axis = Some(axis);
        Ok(axis.line(self.length_left.value(), self.length_right.value()))
    }
}

impl HandleProvider for PerpBisector {
    fn handle_targets(&self) -> Vec<HandleTarget> {
        vec![HandleTarget::Param(LEFT), HandleTarget::Param(RIGHT)]
    }

    fn handle_position(&self, target: &HandleTarget) -> Option<Point> {
        axis_handle_position(self.axis, self.length_left.value(), self.length_right.value(), target)
    }

    fn set_handle_position(&mut self, target: &HandleTarget, p: Point, _mods: Modifiers) -> bool {
        axis_set_handle(self.axis, &mut self.length_left, &mut self.length_right, target, p)
    }
}

#[derive(Clone, Debug)]
pub struct AngleBisector {
    length_left: ScalarParam,
    length_right: ScalarParam,
    axis: Option<Axis>,
}

impl Default for AngleBisector {
    fn default() -> Self {
        Self::new()
    }
}

impl AngleBisector {
    pub fn new() -> Self {
        Self {
            length_left: ScalarParam::scalar(LEFT, "Length left", 0.0),
            length_right: ScalarParam::scalar(RIGHT, "Length right", 250.0),
            axis: None,
        }
    }
}

impl PathEffect for AngleBisector {
    fn params(&self) -> Vec<&dyn Parameter> {
        vec![&self.length_left, &self.length_right]
    }

    fn params_mut(&mut self) -> Vec<&mut dyn Parameter> {
        vec![&mut self.length_left, &mut self.length_right]
    }

    fn do_effect_path(&mut self, input: &BezPath, _ctx: &EffectContext) -> LpeResult<BezPath> {
        let nodes = subpaths(input)
            .into_iter()
            .next()
            .map(|sp| sp.nodes())
            .unwrap_or_default();
        let [a, vertex, c, ..] = nodes[..] else {
            return Err(LpeError::degenerate("angle bisector needs three nodes"));
        };
        let (ua, uc) = (a - vertex, c - vertex);
        if ua.hypot() <= EPSILON || uc.hypot() <= EPSILON {
            return Err(LpeError::degenerate("angle arm has zero length"));
        }
        let dir = rotate_vec(ua.normalize(), angle_between(ua, uc) / 2.0);
        let axis = Axis {
            origin: vertex,
            dir,
        };
        self.axis = Some(axis);
        Ok(axis.line(self.length_left.value(), self.length_right.value()))
    }
}

impl HandleProvider for AngleBisector {
    fn handle_targets(&self) -> Vec<HandleTarget> {
        vec![HandleTarget::Param(LEFT), HandleTarget::Param(RIGHT)]
    }

    fn handle_position(&self, target: &HandleTarget) -> Option<Point> {
        axis_handle_position(self.axis, self.length_left.value(), self.length_right.value(), target)
    }

    fn set_handle_position(&mut self, target: &HandleTarget, p: Point, _mods: Modifiers) -> bool {
        axis_set_handle(self.axis, &mut self.length_left, &mut self.length_right, target, p)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/bisector.rs"]
mod tests;
