//! Path effects: the closed set of stage kinds, their shared trait and the stack that runs them.
//!
//! Each concrete effect is a plain struct owning its parameters. [`EffectOp`] is the tagged
//! union over all of them; [`registry`] maps persisted kind keys to constructors.

pub mod effect;
pub mod registry;
pub mod stack;

mod bisector;
mod boolop;
mod bspline;
mod circle_with_radius;
mod copy_rotate;
mod dynastroke;
mod fillet_chamfer;
mod gears;
mod interpolate;
mod knot;
mod lattice;
mod measure_line;
mod offset;
mod powerstroke;
mod rough_hatches;
mod vonkoch;

use std::fmt;

use kurbo::{BezPath, Rect};

use crate::foundation::core::LPE_CONVERSION_TOLERANCE;
use crate::foundation::error::LpeResult;
use crate::geom::convert::{from_path, from_subpath, to_path};
use crate::geom::curve::PiecewiseCurve;
use crate::geom::path::subpaths;
use crate::interaction::HandleProvider;
use crate::params::Parameter;

pub use bisector::{AngleBisector, PerpBisector};
pub use boolop::{BoolOp, BoolOpKind};
pub use bspline::BSpline;
pub use circle_with_radius::CircleWithRadius;
pub use copy_rotate::CopyRotate;
pub use dynastroke::{DynaStroke, DynaStrokeCap, DynaStrokeMethod};
pub use effect::{Diagnostic, Effect, EffectOutput, EffectState, ParamChange};
pub use fillet_chamfer::{FilletChamfer, FilletMethod};
pub use gears::{Gear, Gears};
pub use interpolate::Interpolate;
pub use knot::{Crossing, Knot};
pub use lattice::Lattice;
pub use measure_line::{DimensionLabel, MeasureLine, Orientation};
pub use offset::Offset;
pub use powerstroke::{LineCap, PowerStroke, StrokeInterpolator};
pub use rough_hatches::RoughHatches;
pub use stack::{EffectStack, Orphan, StackOutput};
pub use vonkoch::VonKoch;

/// Stable identity of an effect within its stack; handles refer to effects through it.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct EffectId(pub u64);

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lpe#{}", self.0)
    }
}

/// Geometric context a recompute runs in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectContext {
    /// Bounding box of the host item's original geometry.
    pub bbox: Rect,
    /// Maximum deviation when converting piecewise curves back to paths.
    pub tolerance: f64,
    /// Stroke width of the host item.
    pub stroke_width: f64,
}

impl EffectContext {
    pub fn new(bbox: Rect) -> Self {
        Self {
            bbox,
            tolerance: LPE_CONVERSION_TOLERANCE,
            stroke_width: 1.0,
        }
    }

    pub fn with_stroke_width(mut self, stroke_width: f64) -> Self {
        self.stroke_width = stroke_width;
        self
    }
}

/// One pipeline stage.
///
/// Stages either work on discrete segments by overriding [`PathEffect::do_effect_path`], or on
/// piecewise curves through [`PathEffect::do_effect_pwd2`] with the default conversion.
/// Insufficient input is reported as [`crate::LpeError::Degenerate`]; the caller falls back to
/// the unchanged input.
pub trait PathEffect: fmt::Debug {
    fn params(&self) -> Vec<&dyn Parameter>;

    fn params_mut(&mut self) -> Vec<&mut dyn Parameter>;

    /// Whether all subpaths are joined into one (possibly discontinuous) curve before
    /// [`PathEffect::do_effect_pwd2`] runs.
    fn concatenate_subpaths(&self) -> bool {
        false
    }

    /// First attachment to a host item: seeds defaults that depend on its geometry.
    fn on_apply(&mut self, _base: &BezPath, _ctx: &EffectContext) {}

    /// Runs once per recompute before the stage itself.
    fn before_effect(&mut self, _input: &BezPath, _ctx: &EffectContext) {}

    fn do_effect_path(&mut self, input: &BezPath, ctx: &EffectContext) -> LpeResult<BezPath> {
        if self.concatenate_subpaths() {
            let curve = from_path(input);
            let out = self.do_effect_pwd2(&curve, ctx)?;
            return Ok(to_path(&out, ctx.tolerance));
        }
        let mut path = BezPath::new();
        for sp in subpaths(input) {
            let out = self.do_effect_pwd2(&from_subpath(&sp), ctx)?;
            for el in to_path(&out, ctx.tolerance).elements() {
                path.push(*el);
            }
        }
        Ok(path)
    }

    fn do_effect_pwd2(
        &mut self,
        curve: &PiecewiseCurve,
        _ctx: &EffectContext,
    ) -> LpeResult<PiecewiseCurve> {
        Ok(curve.clone())
    }

    /// Guide geometry from the last run; never persisted or fed back into the pipeline.
    fn indicators(&self) -> Vec<BezPath> {
        Vec::new()
    }
}

/// Declared effect kinds, keyed by their persisted identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    DynaStroke,
    PowerStroke,
    Gears,
    CopyRotate,
    Interpolate,
    BSpline,
    FilletChamfer,
    Lattice,
    VonKoch,
    Offset,
    PerpBisector,
    AngleBisector,
    CircleWithRadius,
    BoolOp,
    Knot,
    RoughHatches,
    MeasureLine,
}

impl EffectKind {
    pub const ALL: [EffectKind; 17] = [
        EffectKind::DynaStroke,
        EffectKind::PowerStroke,
        EffectKind::Gears,
        EffectKind::CopyRotate,
        EffectKind::Interpolate,
        EffectKind::BSpline,
        EffectKind::FilletChamfer,
        EffectKind::Lattice,
        EffectKind::VonKoch,
        EffectKind::Offset,
        EffectKind::PerpBisector,
        EffectKind::AngleBisector,
        EffectKind::CircleWithRadius,
        EffectKind::BoolOp,
        EffectKind::Knot,
        EffectKind::RoughHatches,
        EffectKind::MeasureLine,
    ];

    pub fn key(self) -> &'static str {
        match self {
            EffectKind::DynaStroke => "dynastroke",
            EffectKind::PowerStroke => "powerstroke",
            EffectKind::Gears => "gears",
            EffectKind::CopyRotate => "copy_rotate",
            EffectKind::Interpolate => "interpolate",
            EffectKind::BSpline => "bspline",
            EffectKind::FilletChamfer => "fillet_chamfer",
            EffectKind::Lattice => "lattice",
            EffectKind::VonKoch => "vonkoch",
            EffectKind::Offset => "offset",
            EffectKind::PerpBisector => "perp_bisector",
            EffectKind::AngleBisector => "angle_bisector",
            EffectKind::CircleWithRadius => "circle_with_radius",
            EffectKind::BoolOp => "boolop",
            EffectKind::Knot => "knot",
            EffectKind::RoughHatches => "rough_hatches",
            EffectKind::MeasureLine => "measure_line",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EffectKind::DynaStroke => "Dynamic stroke",
            EffectKind::PowerStroke => "Power stroke",
            EffectKind::Gears => "Gears",
            EffectKind::CopyRotate => "Rotate copies",
            EffectKind::Interpolate => "Interpolate subpaths",
            EffectKind::BSpline => "BSpline",
            EffectKind::FilletChamfer => "Fillet/Chamfer",
            EffectKind::Lattice => "Lattice deformation",
            EffectKind::VonKoch => "VonKoch",
            EffectKind::Offset => "Offset",
            EffectKind::PerpBisector => "Perpendicular bisector",
            EffectKind::AngleBisector => "Angle bisector",
            EffectKind::CircleWithRadius => "Circle (by center and radius)",
            EffectKind::BoolOp => "Boolean operation",
            EffectKind::Knot => "Knot",
            EffectKind::RoughHatches => "Hatches (rough)",
            EffectKind::MeasureLine => "Measure line",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.key() == key)
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Tagged union of every concrete effect.
#[derive(Clone, Debug)]
pub enum EffectOp {
    DynaStroke(DynaStroke),
    PowerStroke(PowerStroke),
    Gears(Gears),
    CopyRotate(CopyRotate),
    Interpolate(Interpolate),
    BSpline(BSpline),
    FilletChamfer(FilletChamfer),
    Lattice(Lattice),
    VonKoch(VonKoch),
    Offset(Offset),
    PerpBisector(PerpBisector),
    AngleBisector(AngleBisector),
    CircleWithRadius(CircleWithRadius),
    BoolOp(BoolOp),
    Knot(Knot),
    RoughHatches(RoughHatches),
    MeasureLine(MeasureLine),
}

macro_rules! dispatch {
    ($op:expr, $e:ident => $body:expr) => {
        match $op {
            EffectOp::DynaStroke($e) => $body,
            EffectOp::PowerStroke($e) => $body,
            EffectOp::Gears($e) => $body,
            EffectOp::CopyRotate($e) => $body,
            EffectOp::Interpolate($e) => $body,
            EffectOp::BSpline($e) => $body,
            EffectOp::FilletChamfer($e) => $body,
            EffectOp::Lattice($e) => $body,
            EffectOp::VonKoch($e) => $body,
            EffectOp::Offset($e) => $body,
            EffectOp::PerpBisector($e) => $body,
            EffectOp::AngleBisector($e) => $body,
            EffectOp::CircleWithRadius($e) => $body,
            EffectOp::BoolOp($e) => $body,
            EffectOp::Knot($e) => $body,
            EffectOp::RoughHatches($e) => $body,
            EffectOp::MeasureLine($e) => $body,
        }
    };
}

impl EffectOp {
    pub fn kind(&self) -> EffectKind {
        match self {
            EffectOp::DynaStroke(_) => EffectKind::DynaStroke,
            EffectOp::PowerStroke(_) => EffectKind::PowerStroke,
            EffectOp::Gears(_) => EffectKind::Gears,
            EffectOp::CopyRotate(_) => EffectKind::CopyRotate,
            EffectOp::Interpolate(_) => EffectKind::Interpolate,
            EffectOp::BSpline(_) => EffectKind::BSpline,
            EffectOp::FilletChamfer(_) => EffectKind::FilletChamfer,
            EffectOp::Lattice(_) => EffectKind::Lattice,
            EffectOp::VonKoch(_) => EffectKind::VonKoch,
            EffectOp::Offset(_) => EffectKind::Offset,
            EffectOp::PerpBisector(_) => EffectKind::PerpBisector,
            EffectOp::AngleBisector(_) => EffectKind::AngleBisector,
            EffectOp::CircleWithRadius(_) => EffectKind::CircleWithRadius,
            EffectOp::BoolOp(_) => EffectKind::BoolOp,
            EffectOp::Knot(_) => EffectKind::Knot,
            EffectOp::RoughHatches(_) => EffectKind::RoughHatches,
            EffectOp::MeasureLine(_) => EffectKind::MeasureLine,
        }
    }

    pub fn as_effect(&self) -> &dyn PathEffect {
        dispatch!(self, e => e)
    }

    pub fn as_effect_mut(&mut self) -> &mut dyn PathEffect {
        dispatch!(self, e => e)
    }

    /// The on-canvas editing capability, for kinds that have handles.
    pub fn handles(&self) -> Option<&dyn HandleProvider> {
        match self {
            EffectOp::PowerStroke(e) => Some(e),
            EffectOp::Gears(e) => Some(e),
            EffectOp::CopyRotate(e) => Some(e),
            EffectOp::BSpline(e) => Some(e),
            EffectOp::FilletChamfer(e) => Some(e),
            EffectOp::Lattice(e) => Some(e),
            EffectOp::Offset(e) => Some(e),
            EffectOp::PerpBisector(e) => Some(e),
            EffectOp::AngleBisector(e) => Some(e),
            EffectOp::Knot(e) => Some(e),
            EffectOp::RoughHatches(e) => Some(e),
            EffectOp::DynaStroke(_)
            | EffectOp::Interpolate(_)
            | EffectOp::VonKoch(_)
            | EffectOp::CircleWithRadius(_)
            | EffectOp::BoolOp(_)
            | EffectOp::MeasureLine(_) => None,
        }
    }

    pub fn handles_mut(&mut self) -> Option<&mut dyn HandleProvider> {
        match self {
            EffectOp::PowerStroke(e) => Some(e),
            EffectOp::Gears(e) => Some(e),
            EffectOp::CopyRotate(e) => Some(e),
            EffectOp::BSpline(e) => Some(e),
            EffectOp::FilletChamfer(e) => Some(e),
            EffectOp::Lattice(e) => Some(e),
            EffectOp::Offset(e) => Some(e),
            EffectOp::PerpBisector(e) => Some(e),
            EffectOp::AngleBisector(e) => Some(e),
            EffectOp::Knot(e) => Some(e),
            EffectOp::RoughHatches(e) => Some(e),
            EffectOp::DynaStroke(_)
            | EffectOp::Interpolate(_)
            | EffectOp::VonKoch(_)
            | EffectOp::CircleWithRadius(_)
            | EffectOp::BoolOp(_)
            | EffectOp::MeasureLine(_) => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/kinds.rs"]
mod tests;
