//! One effect instance: its parameters, lifecycle state and the recompute boundary.

use std::fmt;

use kurbo::{BezPath, PathEl, Point};

use super::registry::registry;
use super::{EffectContext, EffectId, EffectKind, EffectOp};
use crate::foundation::error::{LpeError, LpeResult};
use crate::host::{EffectNode, NODE_ID_PREFIX};
use crate::interaction::{HandleTarget, InteractionHandle, Modifiers};
use crate::params::Parameter;

/// Attribute holding the enabled flag; reserved next to the parameter keys.
pub const VISIBLE_ATTRIBUTE: &str = "is_visible";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectState {
    /// Parameters registered with defaults; not attached to an item yet.
    Constructed,
    /// Attached, parameters loaded or seeded.
    Applied,
    Active,
    Disabled,
    Removed,
}

/// A parameter write made through an effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParamChange {
    pub owner: EffectId,
    pub key: &'static str,
}

/// A persisted attribute that could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub key: String,
    pub text: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EffectOutput {
    pub path: BezPath,
    pub indicators: Vec<BezPath>,
    /// The stage fell back to its input.
    pub broken: bool,
}

type Listener = Box<dyn FnMut(&ParamChange)>;

pub struct Effect {
    id: EffectId,
    node_id: String,
    op: EffectOp,
    state: EffectState,
    enabled: bool,
    diagnostics: Vec<Diagnostic>,
    listeners: Vec<Listener>,
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.id)
            .field("node_id", &self.node_id)
            .field("op", &self.op)
            .field("state", &self.state)
            .field("enabled", &self.enabled)
            .field("diagnostics", &self.diagnostics)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Effect {
    /// Construct a detached effect with default parameters and node id `path-effect<id>`.
    pub fn new(kind: EffectKind, id: EffectId) -> LpeResult<Self> {
        let op = registry().construct(kind)?;
        Ok(Self::with_op(op, id, format!("{NODE_ID_PREFIX}{}", id.0)))
    }

    fn with_op(op: EffectOp, id: EffectId, node_id: String) -> Self {
        Self {
            id,
            node_id,
            op,
            state: EffectState::Constructed,
            enabled: true,
            diagnostics: Vec::new(),
            listeners: Vec::new(),
        }
    }

    /// Loads a persisted node. Absent attributes keep their defaults; unparseable ones fall back
    /// to the default and leave a [`Diagnostic`].
    pub fn from_node(node: &EffectNode, id: EffectId) -> LpeResult<Self> {
        let op = registry().construct_key(&node.kind)?;
        let mut effect = Self::with_op(op, id, node.id.clone());
        let mut diagnostics = Vec::new();
        for param in effect.op.as_effect_mut().params_mut() {
            let Some(text) = node.attribute(param.key()) else {
                continue;
            };
            if !param.read_from_text(text) {
                param.set_default();
                diagnostics.push(Diagnostic {
                    key: param.key().to_string(),
                    text: text.to_string(),
                });
            }
        }
        match node.attribute(VISIBLE_ATTRIBUTE).map(str::trim) {
            None | Some("true") => {}
            Some("false") => effect.enabled = false,
            Some(other) => {
                tracing::warn!(node = %node.id, text = other, "unparseable visibility flag");
                diagnostics.push(Diagnostic {
                    key: VISIBLE_ATTRIBUTE.to_string(),
                    text: other.to_string(),
                });
            }
        }
        effect.diagnostics = diagnostics;
        effect.state = EffectState::Applied;
        Ok(effect)
    }

    /// Stack-local identity, also the owner of change notifications and handles.
    pub fn id(&self) -> EffectId {
        self.id
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn kind(&self) -> EffectKind {
        self.op.kind()
    }

    /// The concrete algorithm behind this effect.
    pub fn op(&self) -> &EffectOp {
        &self.op
    }

    pub fn state(&self) -> EffectState {
        self.state
    }

    /// False only while [`EffectState::Disabled`].
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_active(&self) -> bool {
        self.state == EffectState::Active
    }

    /// Attributes that failed to parse when the effect was loaded.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// First attachment to `base`: seeds geometry-derived defaults.
    pub fn apply_to(&mut self, base: &BezPath, ctx: &EffectContext) -> LpeResult<()> {
        if self.state != EffectState::Constructed {
            return Err(LpeError::broken(format!(
                "{} is already attached ({:?})",
                self.id, self.state
            )));
        }
        self.op.as_effect_mut().on_apply(base, ctx);
        self.state = EffectState::Applied;
        Ok(())
    }

    /// Move an applied effect into [`EffectState::Active`]; fails before the first application.
    pub fn activate(&mut self) -> LpeResult<()> {
        match self.state {
            EffectState::Applied => {
                self.state = if self.enabled {
                    EffectState::Active
                } else {
                    EffectState::Disabled
                };
                Ok(())
            }
            EffectState::Active | EffectState::Disabled => Ok(()),
            EffectState::Constructed | EffectState::Removed => Err(LpeError::broken(format!(
                "{} cannot be activated from {:?}",
                self.id, self.state
            ))),
        }
    }

    /// Toggle between active and disabled; other states are left alone.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.state = match self.state {
            EffectState::Active | EffectState::Disabled if enabled => EffectState::Active,
            EffectState::Active | EffectState::Disabled => EffectState::Disabled,
            other => other,
        };
    }

    pub(crate) fn mark_removed(&mut self) {
        self.state = EffectState::Removed;
    }

    /// Every registered parameter, in declaration order.
    pub fn params(&self) -> Vec<&dyn Parameter> {
        self.op.as_effect().params()
    }

    /// Look a parameter up by its persisted key.
    pub fn param(&self, key: &str) -> Option<&dyn Parameter> {
        self.params().into_iter().find(|p| p.key() == key)
    }

    /// Persisted text of one parameter.
    pub fn param_text(&self, key: &str) -> Option<String> {
        self.param(key).map(|p| p.write_to_text())
    }

    /// Writes one parameter from text and notifies listeners on success.
    pub fn set_param_text(&mut self, key: &str, text: &str) -> bool {
        let mut changed = None;
        for param in self.op.as_effect_mut().params_mut() {
            if param.key() != key {
                continue;
            }
            changed = Some((param.key(), param.read_from_text(text)));
            break;
        }
        match changed {
            Some((key, true)) => {
                self.notify(key);
                true
            }
            Some((key, false)) => {
                self.diagnostics.push(Diagnostic {
                    key: key.to_string(),
                    text: text.to_string(),
                });
                false
            }
            None => {
                tracing::warn!(effect = %self.id, key, "no such parameter");
                false
            }
        }
    }

    /// Resets every parameter to its default.
    pub fn reset_params(&mut self) {
        let keys: Vec<&'static str> = self
            .op
            .as_effect_mut()
            .params_mut()
            .into_iter()
            .map(|p| {
                p.set_default();
                p.key()
            })
            .collect();
        for key in keys {
            self.notify(key);
        }
    }

    /// Register a listener called after every parameter write made through this effect.
    pub fn on_param_changed(&mut self, listener: impl FnMut(&ParamChange) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&mut self, key: &'static str) {
        let change = ParamChange {
            owner: self.id,
            key,
        };
        for listener in &mut self.listeners {
            listener(&change);
        }
    }

    /// Persist every parameter plus the enabled flag (`is_visible`).
    pub fn write_to_node(&self) -> EffectNode {
        let mut node = EffectNode::new(self.node_id.clone(), self.kind().key());
        for param in self.params() {
            node.attributes
                .insert(param.key().to_string(), param.write_to_text());
        }
        node.attributes
            .insert(VISIBLE_ATTRIBUTE.to_string(), self.enabled.to_string());
        node
    }

    /// On-canvas handles; empty for effects without any.
    pub fn handles(&self) -> Vec<InteractionHandle> {
        let Some(provider) = self.op.handles() else {
            return Vec::new();
        };
        provider
            .handle_targets()
            .into_iter()
            .map(|target| InteractionHandle {
                owner: self.id,
                target,
            })
            .collect()
    }

    pub fn handle_position(&self, target: &HandleTarget) -> Option<Point> {
        self.op.handles()?.handle_position(target)
    }

    /// Drag one handle; notifies listeners when a parameter changed.
    pub fn set_handle_position(
        &mut self,
        target: &HandleTarget,
        p: Point,
        mods: Modifiers,
    ) -> bool {
        let changed = match self.op.handles_mut() {
            Some(provider) => provider.set_handle_position(target, p, mods),
            None => false,
        };
        if changed {
            self.notify(target.key());
        }
        changed
    }

    /// Click one handle; notifies listeners when a parameter changed.
    pub fn click_handle(&mut self, target: &HandleTarget, mods: Modifiers) -> bool {
        let changed = match self.op.handles_mut() {
            Some(provider) => provider.click_handle(target, mods),
            None => false,
        };
        if changed {
            self.notify(target.key());
        }
        changed
    }

    /// Insert an array entry near `p`; returns its index.
    pub fn insert_entry(&mut self, key: &'static str, p: Point) -> Option<usize> {
        let index = self.op.handles_mut()?.insert_entry(key, p)?;
        self.notify(key);
        Some(index)
    }

    pub fn delete_entry(&mut self, key: &'static str, index: usize) -> bool {
        let deleted = match self.op.handles_mut() {
            Some(provider) => provider.delete_entry(key, index),
            None => false,
        };
        if deleted {
            self.notify(key);
        }
        deleted
    }

    /// Runs the stage on `input`. Errors and non-finite output fall back to the input and set
    /// [`EffectOutput::broken`].
    pub fn do_effect(&mut self, input: &BezPath, ctx: &EffectContext) -> EffectOutput {
        let (id, kind) = (self.id, self.kind());
        let stage = self.op.as_effect_mut();
        stage.before_effect(input, ctx);
        let result = stage.do_effect_path(input, ctx).and_then(|path| {
            if is_finite_path(&path) {
                Ok(path)
            } else {
                Err(LpeError::degenerate("non-finite output coordinates"))
            }
        });
        match result {
            Ok(path) => EffectOutput {
                path,
                indicators: stage.indicators(),
                broken: false,
            },
            Err(err) => {
                if err.is_degenerate() {
                    tracing::debug!(effect = %id, %kind, %err, "identity fallback");
                } else {
                    tracing::warn!(effect = %id, %kind, %err, "identity fallback");
                }
                EffectOutput {
                    path: input.clone(),
                    indicators: Vec::new(),
                    broken: true,
                }
            }
        }
    }
}

fn is_finite_path(path: &BezPath) -> bool {
    let finite = |p: &Point| p.x.is_finite() && p.y.is_finite();
    path.elements().iter().all(|el| match el {
        PathEl::MoveTo(p) | PathEl::LineTo(p) => finite(p),
        PathEl::QuadTo(a, b) => finite(a) && finite(b),
        PathEl::CurveTo(a, b, c) => finite(a) && finite(b) && finite(c),
        PathEl::ClosePath => true,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/effects/effect.rs"]
mod tests;
