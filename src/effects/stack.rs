//! Ordered effects attached to one host item.

use std::cell::Cell;
use std::rc::Rc;

use kurbo::{BezPath, Point, Rect};

use super::effect::Effect;
use super::{EffectContext, EffectId, EffectKind};
use crate::foundation::core::EngineSettings;
use crate::foundation::error::{LpeError, LpeResult};
use crate::foundation::math::{Fnv1a64, fingerprint_path};
use crate::geom::path::path_bounds;
use crate::host::EffectNode;
use crate::interaction::{ArrayEdit, InteractionHandle, Modifiers, shift_handles};

/// A reference that did not resolve to a usable effect. Kept in place and reported, never
/// dropped on its own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Orphan {
    pub reference: String,
    pub reason: String,
}

#[derive(Debug)]
enum Slot {
    Effect(Box<Effect>),
    Orphan(Orphan),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StackOutput {
    pub path: BezPath,
    pub indicators: Vec<BezPath>,
    pub broken: bool,
}

#[derive(Debug)]
pub struct EffectStack {
    slots: Vec<Slot>,
    next_id: u64,
    settings: EngineSettings,
    dirty: Rc<Cell<bool>>,
    /// Fingerprint of the base path and bounding box of the last run.
    last_input: Option<u64>,
    broken: bool,
}

impl Default for EffectStack {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectStack {
    /// Empty stack with default [`EngineSettings`].
    pub fn new() -> Self {
        Self::with_settings(EngineSettings::default())
    }

    pub fn with_settings(settings: EngineSettings) -> Self {
        Self {
            slots: Vec::new(),
            next_id: 1,
            settings,
            dirty: Rc::new(Cell::new(true)),
            last_input: None,
            broken: false,
        }
    }

    /// Loads the effects named by `references` (`#id` or bare ids) from `nodes`, in order.
    pub fn load(references: &[String], nodes: &[EffectNode]) -> Self {
        let mut stack = Self::new();
        for reference in references {
            let id = reference.strip_prefix('#').unwrap_or(reference);
            let Some(node) = nodes.iter().find(|n| n.id == id) else {
                tracing::warn!(reference = %reference, "unresolved effect reference");
                stack.slots.push(Slot::Orphan(Orphan {
                    reference: reference.clone(),
                    reason: "unresolved reference".to_string(),
                }));
                continue;
            };
            let effect_id = stack.next_id();
            let loaded = Effect::from_node(node, effect_id).and_then(|mut effect| {
                effect.activate()?;
                Ok(effect)
            });
            match loaded {
                Ok(effect) => stack.attach(stack.slots.len(), effect),
                Err(err) => {
                    tracing::warn!(reference = %reference, %err, "effect failed to load");
                    stack.slots.push(Slot::Orphan(Orphan {
                        reference: reference.clone(),
                        reason: err.to_string(),
                    }));
                }
            }
        }
        stack
    }

    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    /// Makes ids handed out from now on at least `next`.
    pub fn reserve_ids(&mut self, next: u64) {
        self.next_id = self.next_id.max(next);
    }

    /// Hand out a fresh effect id.
    pub fn next_id(&mut self) -> EffectId {
        let id = EffectId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Constructs `kind`, attaches it to `base` and appends it.
    pub fn create(&mut self, kind: EffectKind, base: &BezPath, bbox: Rect) -> LpeResult<EffectId> {
        let mut effect = Effect::new(kind, self.next_id())?;
        effect.apply_to(base, &self.context(bbox))?;
        self.push(effect)
    }

    /// Append an attached effect.
    pub fn push(&mut self, effect: Effect) -> LpeResult<EffectId> {
        self.insert(self.slots.len(), effect)
    }

    /// Inserts at `index` (clamped). The effect must already be attached.
    pub fn insert(&mut self, index: usize, mut effect: Effect) -> LpeResult<EffectId> {
        let id = effect.id();
        if self.effect(id).is_some() {
            return Err(LpeError::invalid_parameter(format!("{id} is already in the stack")));
        }
        effect.activate()?;
        self.next_id = self.next_id.max(id.0 + 1);
        self.attach(index.min(self.slots.len()), effect);
        Ok(id)
    }

    fn attach(&mut self, index: usize, mut effect: Effect) {
        let dirty = Rc::clone(&self.dirty);
        effect.on_param_changed(move |_| dirty.set(true));
        self.slots.insert(index, Slot::Effect(Box::new(effect)));
        self.dirty.set(true);
    }

    /// Detaches `id`. With `keep_paths`, removing the last effect returns the stack's full
    /// output so the caller can bake it into the item's original path.
    pub fn remove(
        &mut self,
        id: EffectId,
        keep_paths: bool,
        base: &BezPath,
    ) -> LpeResult<Option<BezPath>> {
        let index = self
            .position(id)
            .ok_or_else(|| LpeError::invalid_parameter(format!("{id} is not in the stack")))?;
        let baked = if keep_paths && self.effects().count() == 1 {
            let bbox = path_bounds(base).unwrap_or(Rect::ZERO);
            Some(self.apply(base, bbox).path)
        } else {
            None
        };
        if let Slot::Effect(mut effect) = self.slots.remove(index) {
            effect.mark_removed();
        }
        self.dirty.set(true);
        Ok(baked)
    }

    /// Drop an orphan slot; orphans are only ever removed explicitly.
    pub fn remove_orphan(&mut self, reference: &str) -> bool {
        let before = self.slots.len();
        self.slots
            .retain(|s| !matches!(s, Slot::Orphan(o) if o.reference == reference));
        let removed = self.slots.len() != before;
        if removed {
            self.dirty.set(true);
        }
        removed
    }

    /// Swap with the previous slot. Parameters are untouched.
    pub fn move_up(&mut self, id: EffectId) -> bool {
        match self.position(id) {
            Some(i) if i > 0 => {
                self.slots.swap(i - 1, i);
                self.dirty.set(true);
                true
            }
            _ => false,
        }
    }

    /// Swap with the next slot. Parameters are untouched.
    pub fn move_down(&mut self, id: EffectId) -> bool {
        match self.position(id) {
            Some(i) if i + 1 < self.slots.len() => {
                self.slots.swap(i, i + 1);
                self.dirty.set(true);
                true
            }
            _ => false,
        }
    }

    pub fn set_enabled(&mut self, id: EffectId, enabled: bool) -> bool {
        let Some(effect) = self.effect_mut(id) else {
            return false;
        };
        effect.set_enabled(enabled);
        true
    }

    /// Runs every active effect in order. Orphans and failed stages set `broken` without
    /// stopping the remaining stages.
    #[tracing::instrument(level = "debug", skip(self, base), fields(slots = self.slots.len()))]
    pub fn apply(&mut self, base: &BezPath, bbox: Rect) -> StackOutput {
        let ctx = self.context(bbox);
        let mut out = StackOutput {
            path: base.clone(),
            indicators: Vec::new(),
            broken: false,
        };
        for slot in &mut self.slots {
            let effect = match slot {
                Slot::Effect(effect) => effect,
                Slot::Orphan(_) => {
                    out.broken = true;
                    continue;
                }
            };
            if !effect.is_active() {
                continue;
            }
            let stage = effect.do_effect(&out.path, &ctx);
            out.path = stage.path;
            out.indicators.extend(stage.indicators);
            out.broken |= stage.broken;
        }
        self.broken = out.broken;
        self.dirty.set(false);
        self.last_input = Some(input_fingerprint(base, bbox));
        out
    }

    /// Whether the last [`EffectStack::apply`] fell back somewhere, or the stack holds orphans.
    pub fn is_broken(&self) -> bool {
        self.broken || self.orphans().next().is_some()
    }

    /// Whether anything changed since the last [`EffectStack::apply`].
    pub fn needs_recompute(&self) -> bool {
        self.dirty.get()
    }

    /// [`EffectStack::needs_recompute`], or the base geometry differs from the last run.
    pub fn needs_recompute_for(&self, base: &BezPath, bbox: Rect) -> bool {
        self.needs_recompute() || self.last_input != Some(input_fingerprint(base, bbox))
    }

    /// Number of slots, orphans included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Live effects in stack order.
    pub fn effects(&self) -> impl Iterator<Item = &Effect> {
        self.slots.iter().filter_map(|s| match s {
            Slot::Effect(e) => Some(e.as_ref()),
            Slot::Orphan(_) => None,
        })
    }

    pub fn orphans(&self) -> impl Iterator<Item = &Orphan> {
        self.slots.iter().filter_map(|s| match s {
            Slot::Orphan(o) => Some(o),
            Slot::Effect(_) => None,
        })
    }

    pub fn ids(&self) -> Vec<EffectId> {
        self.effects().map(Effect::id).collect()
    }

    pub fn effect(&self, id: EffectId) -> Option<&Effect> {
        self.effects().find(|e| e.id() == id)
    }

    /// Mutable access marks the stack for recompute.
    pub fn effect_mut(&mut self, id: EffectId) -> Option<&mut Effect> {
        let effect = self.slots.iter_mut().find_map(|s| match s {
            Slot::Effect(e) if e.id() == id => Some(e.as_mut()),
            _ => None,
        })?;
        self.dirty.set(true);
        Some(effect)
    }

    fn position(&self, id: EffectId) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| matches!(s, Slot::Effect(e) if e.id() == id))
    }

    fn context(&self, bbox: Rect) -> EffectContext {
        EffectContext {
            bbox,
            tolerance: self.settings.tolerance,
            stroke_width: self.settings.stroke_width,
        }
    }

    /// Persisted nodes of the live effects, in stack order.
    pub fn write_nodes(&self) -> Vec<EffectNode> {
        self.effects().map(Effect::write_to_node).collect()
    }

    /// Item-side references in stack order, orphans included.
    pub fn references(&self) -> Vec<String> {
        self.slots
            .iter()
            .map(|s| match s {
                Slot::Effect(e) => format!("#{}", e.node_id()),
                Slot::Orphan(o) => o.reference.clone(),
            })
            .collect()
    }

    /// Handles of every active effect.
    pub fn handles(&self) -> Vec<InteractionHandle> {
        self.effects()
            .filter(|e| e.is_active())
            .flat_map(Effect::handles)
            .collect()
    }

    pub fn handle_get(&self, handle: &InteractionHandle) -> Option<Point> {
        self.effect(handle.owner)?.handle_position(&handle.target)
    }

    /// Drag a handle on its owning effect; marks the stack for recompute on change.
    pub fn handle_set(&mut self, handle: &InteractionHandle, p: Point, mods: Modifiers) -> bool {
        match self.effect_mut(handle.owner) {
            Some(effect) => effect.set_handle_position(&handle.target, p, mods),
            None => false,
        }
    }

    /// Click a handle on its owning effect.
    pub fn handle_click(&mut self, handle: &InteractionHandle, mods: Modifiers) -> bool {
        match self.effect_mut(handle.owner) {
            Some(effect) => effect.click_handle(&handle.target, mods),
            None => false,
        }
    }

    /// Inserts an array entry through `owner`'s handles and re-indexes `handles`.
    pub fn insert_entry(
        &mut self,
        owner: EffectId,
        key: &'static str,
        p: Point,
        handles: &mut Vec<InteractionHandle>,
    ) -> Option<usize> {
        let index = self.effect_mut(owner)?.insert_entry(key, p)?;
        shift_handles(handles, owner, key, ArrayEdit::Inserted(index));
        handles.push(InteractionHandle {
            owner,
            target: crate::interaction::HandleTarget::Entry { key, index },
        });
        Some(index)
    }

    /// Deletes an array entry through `owner`'s handles and re-indexes `handles`.
    pub fn delete_entry(
        &mut self,
        owner: EffectId,
        key: &'static str,
        index: usize,
        handles: &mut Vec<InteractionHandle>,
    ) -> bool {
        let deleted = self
            .effect_mut(owner)
            .is_some_and(|e| e.delete_entry(key, index));
        if deleted {
            shift_handles(handles, owner, key, ArrayEdit::Deleted(index));
        }
        deleted
    }
}

fn input_fingerprint(base: &BezPath, bbox: Rect) -> u64 {
    let mut h = Fnv1a64::new(fingerprint_path(base));
    for v in [bbox.x0, bbox.y0, bbox.x1, bbox.y1] {
        h.write_f64(v);
    }
    h.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/effects/stack.rs"]
mod tests;
