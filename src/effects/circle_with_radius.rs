use kurbo::{BezPath, Circle, Shape};

use super::{EffectContext, PathEffect};
use crate::foundation::core::EPSILON;
use crate::foundation::error::{LpeError, LpeResult};
use crate::geom::path::{first_point, last_point};
use crate::params::Parameter;

/// Replaces the path by the circle centred on its first node and passing through its last.
#[derive(Clone, Debug, Default)]
pub struct CircleWithRadius;

impl CircleWithRadius {
    pub fn new() -> Self {
        Self
    }
}

impl PathEffect for CircleWithRadius {
    fn params(&self) -> Vec<&dyn Parameter> {
        Vec::new()
    }

    fn params_mut(&mut self) -> Vec<&mut dyn Parameter> {
        Vec::new()
    }

    fn do_effect_path(&mut self, input: &BezPath, ctx: &EffectContext) -> LpeResult<BezPath> {
        let (Some(center), Some(rim)) = (first_point(input), last_point(input)) else {
            return Err(LpeError::degenerate("circle needs a path"));
        };
        let radius = (rim - center).hypot();
        if radius <= EPSILON {
            return Err(LpeError::degenerate("circle radius is zero"));
        }
        Ok(Circle::new(center, radius).to_path(ctx.tolerance))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/circle_with_radius.rs"]
mod tests;
