//! On-canvas handles: screen points mapped to and from effect parameters.
//!
//! A handle is just `(owner, target)`. Its position is recomputed from the owner's current
//! parameter values on every query; dragging writes back through the owner's
//! [`HandleProvider`] implementation.

use kurbo::Point;

use crate::effects::EffectId;

/// What a handle edits inside its owning effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandleTarget {
    /// A single parameter (point, vector or scalar) by key.
    Param(&'static str),
    /// One entry of a point-array parameter.
    Entry { key: &'static str, index: usize },
}

impl HandleTarget {
    pub fn key(&self) -> &'static str {
        match self {
            HandleTarget::Param(key) | HandleTarget::Entry { key, .. } => key,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InteractionHandle {
    pub owner: EffectId,
    pub target: HandleTarget,
}

/// Keyboard state during a drag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
    };
}

/// Length change of a point-array parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArrayEdit {
    Inserted(usize),
    Deleted(usize),
}

/// Handle operations an effect supports. Implemented per effect kind; callers reach it through
/// [`crate::effects::EffectOp::handles`] and never need the concrete type.
pub trait HandleProvider {
    fn handle_targets(&self) -> Vec<HandleTarget>;

    /// Current position, derived from parameter values (and any cached curve).
    fn handle_position(&self, target: &HandleTarget) -> Option<Point>;

    /// Maps a dragged point back onto parameter values. Returns whether anything changed.
    fn set_handle_position(&mut self, target: &HandleTarget, p: Point, mods: Modifiers) -> bool;

    /// A click without drag. Returns whether anything changed.
    fn click_handle(&mut self, _target: &HandleTarget, _mods: Modifiers) -> bool {
        false
    }

    /// Inserts an array entry near `p`; returns its index.
    fn insert_entry(&mut self, _key: &str, _p: Point) -> Option<usize> {
        None
    }

    fn delete_entry(&mut self, _key: &str, _index: usize) -> bool {
        false
    }
}

/// Re-indexes handles bound to `owner`'s array `key` after an insert or delete.
///
/// A deleted entry's own handle is dropped.
pub fn shift_handles(
    handles: &mut Vec<InteractionHandle>,
    owner: EffectId,
    key: &str,
    edit: ArrayEdit,
) {
    handles.retain_mut(|h| {
        if h.owner != owner {
            return true;
        }
        let HandleTarget::Entry { key: k, index } = &mut h.target else {
            return true;
        };
        if *k != key {
            return true;
        }
        match edit {
            ArrayEdit::Inserted(at) => {
                if *index >= at {
                    *index += 1;
                }
                true
            }
            ArrayEdit::Deleted(at) => {
                if *index == at {
                    return false;
                }
                if *index > at {
                    *index -= 1;
                }
                true
            }
        }
    });
}

/// Scalar projection of `p` onto the line through `origin` along unit `dir`.
pub fn project_onto(origin: Point, dir: kurbo::Vec2, p: Point) -> f64 {
    (p - origin).dot(dir)
}

#[cfg(test)]
#[path = "../../tests/unit/interaction/handles.rs"]
mod tests;
