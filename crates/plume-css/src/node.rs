//! What the engine needs from a styled node and from a property setter.
//!
//! The engine never owns nodes. It walks them through [`StyleNode`], a
//! borrowed handle whose `parent()` yields another handle, and writes
//! results through [`PropertySink`]. Neither side needs reflection or
//! shared ownership.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;

use plume_view::{NodeId, ViewRef};

use crate::error::PropertyError;

/// Capability set of a node that can be matched against selectors.
///
/// Implementations are expected to be cheap handles (a reference or an
/// index pair), since matching clones them while walking ancestors.
pub trait StyleNode: Clone {
    /// Identity used to key change-tracking results.
    type Key: Copy + Eq + Hash + fmt::Debug;

    /// This node's identity.
    fn key(&self) -> Self::Key;

    /// The node id, if any.
    fn id(&self) -> Option<&str>;

    /// The normalized type tag (see
    /// [`normalize_type_name`](plume_common::type_name::normalize_type_name)).
    fn type_tag(&self) -> &str;

    /// The node's classes.
    fn classes(&self) -> impl Iterator<Item = &str>;

    /// Whether the node has `class`.
    fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Whether the node is currently in pseudo-state `pseudo`.
    fn has_pseudo_class(&self, pseudo: &str) -> bool;

    /// Attribute lookup for attribute selectors.
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Handle on the parent node, `None` at the root.
    fn parent(&self) -> Option<Self>;
}

/// Receives resolved property values during the apply step.
///
/// Later calls for the same property overwrite earlier ones; the engine
/// relies on that to let higher-precedence rules win.
pub trait PropertySink {
    /// Resolve `property` to a setter and apply `value`.
    ///
    /// # Errors
    ///
    /// Returns a [`PropertyError`] when the property is unknown or the value
    /// cannot be coerced. The engine logs it and moves on to the next
    /// declaration.
    fn set_property(&mut self, property: &str, value: &str) -> Result<(), PropertyError>;
}

/// Raw sink: keeps the last declared value per property, never fails.
impl PropertySink for BTreeMap<String, String> {
    fn set_property(&mut self, property: &str, value: &str) -> Result<(), PropertyError> {
        let _ = self.insert(property.to_string(), value.to_string());
        Ok(())
    }
}

impl StyleNode for ViewRef<'_> {
    type Key = NodeId;

    fn key(&self) -> NodeId {
        self.node_id()
    }

    fn id(&self) -> Option<&str> {
        self.data().id.as_deref()
    }

    fn type_tag(&self) -> &str {
        self.data().type_name()
    }

    fn classes(&self) -> impl Iterator<Item = &str> {
        self.data().classes.iter().map(String::as_str)
    }

    fn has_class(&self, class: &str) -> bool {
        self.data().classes.contains(class)
    }

    fn has_pseudo_class(&self, pseudo: &str) -> bool {
        self.data().pseudo_classes.contains(pseudo)
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.data().attribute(name)
    }

    fn parent(&self) -> Option<Self> {
        self.parent_ref()
    }
}
