//! Persisted host-side state: effect nodes with their attribute strings, and path items that
//! reference them.
//!
//! This is the whole document surface the engine touches. The JSON form exists for tooling and
//! tests; the engine itself only reads attribute strings and path text.

use std::collections::BTreeMap;

use kurbo::{BezPath, Rect};

use crate::effects::EffectStack;
use crate::foundation::error::{LpeError, LpeResult};
use crate::geom::path::{parse_path_text, path_bounds};

/// Prefix of generated effect node ids.
pub const NODE_ID_PREFIX: &str = "path-effect";

/// One effect instance as stored by the host document.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EffectNode {
    pub id: String,
    /// Effect kind key, e.g. `"powerstroke"`.
    pub kind: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl EffectNode {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// A path-bearing item: its original geometry plus its ordered effect references.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HostItem {
    pub id: String,
    /// Original (pre-effect) path text.
    pub path: String,
    /// `#id` references into [`HostDocument::nodes`], applied in order.
    #[serde(default)]
    pub effects: Vec<String>,
}

impl HostItem {
    pub fn base_path(&self) -> LpeResult<BezPath> {
        parse_path_text(&self.path).ok_or_else(|| {
            LpeError::invalid_parameter(format!("item '{}' has unparseable path text", self.id))
        })
    }

    /// Bounding box of the original geometry; empty paths get a zero rect.
    pub fn bbox(&self) -> LpeResult<Rect> {
        Ok(path_bounds(&self.base_path()?).unwrap_or(Rect::ZERO))
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HostDocument {
    #[serde(default)]
    pub items: Vec<HostItem>,
    #[serde(default)]
    pub nodes: Vec<EffectNode>,
}

impl HostDocument {
    pub fn from_json(text: &str) -> LpeResult<Self> {
        let doc: HostDocument =
            serde_json::from_str(text).map_err(|e| LpeError::serde(e.to_string()))?;
        doc.validate()?;
        Ok(doc)
    }

    pub fn to_json(&self) -> LpeResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| LpeError::serde(e.to_string()))
    }

    /// Structural checks only. Dangling effect references are not an error here; they load as
    /// orphan slots and flag the stack broken.
    pub fn validate(&self) -> LpeResult<()> {
        let mut seen = std::collections::BTreeSet::new();
        for node in &self.nodes {
            if node.id.trim().is_empty() {
                return Err(LpeError::invalid_parameter("effect node id must be non-empty"));
            }
            if !seen.insert(node.id.as_str()) {
                return Err(LpeError::invalid_parameter(format!(
                    "duplicate effect node id '{}'",
                    node.id
                )));
            }
        }
        for item in &self.items {
            item.base_path()?;
        }
        Ok(())
    }

    pub fn item(&self, id: &str) -> Option<&HostItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn node(&self, reference: &str) -> Option<&EffectNode> {
        let id = reference.strip_prefix('#').unwrap_or(reference);
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Builds the effect stack of `item`. Effects created on it get node ids unused in this
    /// document.
    pub fn stack_for(&self, item: &HostItem) -> EffectStack {
        let mut stack = EffectStack::load(&item.effects, &self.nodes);
        let taken = self
            .nodes
            .iter()
            .filter_map(|n| n.id.strip_prefix(NODE_ID_PREFIX)?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        stack.reserve_ids(taken + 1);
        stack
    }

    /// Writes every effect of `stack` back into its node, adding nodes that are new.
    pub fn store_stack(&mut self, item_id: &str, stack: &EffectStack) {
        for node in stack.write_nodes() {
            match self.nodes.iter_mut().find(|n| n.id == node.id) {
                Some(existing) => *existing = node,
                None => self.nodes.push(node),
            }
        }
        if let Some(item) = self.items.iter_mut().find(|i| i.id == item_id) {
            item.effects = stack.references();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/document.rs"]
mod tests;
