//! Livepath is a live path effect engine: stacked, parameter-driven geometric transformations
//! of vector paths.
//!
//! An item keeps its original path; its effect stack recomputes the displayed path from it
//! whenever a parameter changes.
//!
//! # Pipeline overview
//!
//! 1. **Load**: persisted attribute strings -> typed parameters ([`Effect::from_node`])
//! 2. **Apply**: `original path -> effect 1 -> effect 2 -> ... -> output` ([`EffectStack::apply`])
//! 3. **Edit**: on-canvas handles map points to parameter values ([`InteractionHandle`])
//! 4. **Store**: parameters -> attribute strings ([`Effect::write_to_node`])
//!
//! Effects work either on discrete path segments or on exact piecewise polynomial curves
//! ([`PiecewiseCurve`]); conversion in both directions goes through [`from_path`] and
//! [`to_path`] with the engine tolerance.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Identity fallback**: a stage that cannot run passes its input through and flags the
//!   stack broken, so the item never loses its geometry.
//! - **No IO**: the host document is plain data; reading files is the caller's job.
#![forbid(unsafe_code)]

pub mod effects;
pub mod foundation;
pub mod geom;
pub mod host;
pub mod interaction;
pub mod params;

pub use effects::registry::{Registry, registry};
pub use effects::{
    Diagnostic, Effect, EffectContext, EffectId, EffectKind, EffectOp, EffectOutput,
    EffectStack, EffectState, Orphan, ParamChange, PathEffect, StackOutput,
};
pub use foundation::core::{
    EPSILON, EngineSettings, Interval, LPE_CONVERSION_TOLERANCE, are_near, points_near,
};
pub use foundation::error::{LpeError, LpeResult};
pub use geom::convert::{from_path, from_subpath, to_path};
pub use geom::curve::{Curve2, PiecewiseCurve, PiecewiseScalar, fit_curve, fit_scalar};
pub use geom::path::{Subpath, parse_path_text, subpaths, write_path_text};
pub use geom::piecewise::{Piecewise, compose, mutual_partition};
pub use geom::poly::Poly;
pub use host::{EffectNode, HostDocument, HostItem};
pub use interaction::{
    ArrayEdit, HandleProvider, HandleTarget, InteractionHandle, Modifiers, shift_handles,
};
pub use params::{ParamKind, Parameter, PointArrayParam};
