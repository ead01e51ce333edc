//! Dependencies of dynamic selectors, reported by
//! [`SelectorsMap::query_with_changes`](crate::SelectorsMap::query_with_changes).

use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

/// Attribute and pseudo-class names one node is tested on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes {
    /// Attribute names read by attribute selectors.
    pub attributes: BTreeSet<String>,
    /// Pseudo-class names read by pseudo-class selectors.
    pub pseudo_classes: BTreeSet<String>,
}

impl Changes {
    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.pseudo_classes.is_empty()
    }
}

/// Per-node dependency sets, keyed by [`StyleNode::key`](crate::StyleNode::key).
///
/// A consumer re-queries the styled node when any attribute or pseudo-class
/// recorded here changes on the node it is recorded against.
#[derive(Debug, Clone)]
pub struct ChangeMap<K> {
    entries: HashMap<K, Changes>,
}

impl<K> Default for ChangeMap<K> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash> ChangeMap<K> {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `name` is read as an attribute on `node`.
    pub fn add_attribute(&mut self, node: K, name: &str) {
        let _ = self
            .entries
            .entry(node)
            .or_default()
            .attributes
            .insert(name.to_string());
    }

    /// Record that `name` is read as a pseudo-class on `node`.
    pub fn add_pseudo_class(&mut self, node: K, name: &str) {
        let _ = self
            .entries
            .entry(node)
            .or_default()
            .pseudo_classes
            .insert(name.to_string());
    }

    /// What was recorded against `node`.
    #[must_use]
    pub fn get(&self, node: K) -> Option<&Changes> {
        self.entries.get(&node)
    }

    /// Whether a change of attribute `name` on `node` can change the result.
    #[must_use]
    pub fn depends_on_attribute(&self, node: K, name: &str) -> bool {
        self.get(node).is_some_and(|c| c.attributes.contains(name))
    }

    /// Whether entering or leaving pseudo-class `name` on `node` can change
    /// the result.
    #[must_use]
    pub fn depends_on_pseudo_class(&self, node: K, name: &str) -> bool {
        self.get(node).is_some_and(|c| c.pseudo_classes.contains(name))
    }

    /// Number of nodes with recorded dependencies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
