//! View tree for the Plume style engine.
//!
//! This crate provides an arena-based tree of stateful visual nodes: each
//! view has a type name, an optional id, a class set, a pseudo-class set
//! (its dynamic state, e.g. `pressed` or `disabled`), free-form attributes
//! and an optional inline style.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all
//! relationships. Parent links are plain indices, so a child never owns its
//! parent and no reference counting is needed. [`ViewRef`] pairs a borrowed
//! tree with a node index and is the handle the style engine walks.

use std::collections::{BTreeSet, HashMap};

use plume_common::type_name::normalize_type_name;

/// Map of attribute names to values for a view.
pub type AttributesMap = HashMap<String, String>;

/// A type-safe index into the view tree.
///
/// `NodeId` provides O(1) access to any node in the tree without borrowing issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root view is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// Per-view state the style engine reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewData {
    /// Normalized type name (dashes stripped, lower-cased).
    type_name: String,
    /// The view's id, if any.
    pub id: Option<String>,
    /// Style classes. Ordered so iteration is deterministic.
    pub classes: BTreeSet<String>,
    /// Active pseudo-classes (visual states such as `pressed`).
    pub pseudo_classes: BTreeSet<String>,
    /// Free-form attributes matched by attribute selectors.
    pub attributes: AttributesMap,
    /// Inline style declarations as `(property, value)` pairs in source order.
    pub inline_style: Vec<(String, String)>,
}

impl ViewData {
    /// Create view data for a view of the given type.
    ///
    /// The type name is normalized here, once, so `List-View` and
    /// `listview` produce the same tag.
    #[must_use]
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: normalize_type_name(type_name),
            ..Self::default()
        }
    }

    /// Set the view id.
    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    /// Add a style class.
    #[must_use]
    pub fn with_class(mut self, class: &str) -> Self {
        let _ = self.classes.insert(class.to_string());
        self
    }

    /// Add several style classes.
    #[must_use]
    pub fn with_classes(mut self, classes: &[&str]) -> Self {
        self.classes.extend(classes.iter().map(|&c| c.to_string()));
        self
    }

    /// Add an active pseudo-class.
    #[must_use]
    pub fn with_pseudo_class(mut self, pseudo: &str) -> Self {
        let _ = self.pseudo_classes.insert(pseudo.to_string());
        self
    }

    /// Set an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        let _ = self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    /// Append an inline style declaration.
    #[must_use]
    pub fn with_inline_style(mut self, property: &str, value: &str) -> Self {
        self.inline_style
            .push((property.to_string(), value.to_string()));
        self
    }

    /// The normalized type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Look up an attribute. `id` resolves to the view id so `[id=x]` works
    /// like it does on any other attribute-backed property.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match name {
            "id" => self.id.as_deref(),
            _ => self.attributes.get(name).map(String::as_str),
        }
    }
}

/// A node in the view tree: its data plus index links.
#[derive(Debug, Clone)]
pub struct ViewNode {
    /// The view's style-relevant state.
    pub data: ViewData,
    /// Parent index, `None` for the root or a detached node.
    pub parent: Option<NodeId>,
    /// Children in order.
    pub children: Vec<NodeId>,
}

/// Arena-based view tree with O(1) node access and parent traversal.
///
/// All nodes live in one vector and refer to each other by [`NodeId`]. The
/// tree always has a root at [`NodeId::ROOT`].
#[derive(Debug, Clone)]
pub struct ViewTree {
    nodes: Vec<ViewNode>,
}

impl ViewTree {
    /// Create a tree holding just the root view.
    #[must_use]
    pub fn new(root: ViewData) -> Self {
        Self {
            nodes: vec![ViewNode {
                data: root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Get the root node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&ViewNode> {
        self.nodes.get(id.0)
    }

    /// Get the view data of a node.
    #[must_use]
    pub fn data(&self, id: NodeId) -> Option<&ViewData> {
        self.get(id).map(|n| &n.data)
    }

    /// Get mutable view data of a node.
    pub fn data_mut(&mut self, id: NodeId) -> Option<&mut ViewData> {
        self.nodes.get_mut(id.0).map(|n| &mut n.data)
    }

    /// Get the number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always holds its root, so this is only true for a tree whose
    /// storage was never initialized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, data: ViewData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(ViewNode {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Appends `child` as the last child of `parent`, detaching it from its
    /// previous parent first.
    ///
    /// Returns `false` and leaves the tree unchanged when either ID is unknown
    /// or when `child` is `parent` or one of its ancestors.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.get(parent).is_none() || self.get(child).is_none() {
            return false;
        }
        if child == parent || self.ancestors(parent).any(|a| a == child) {
            return false;
        }
        if let Some(old) = self.parent(child) {
            self.nodes[old.0].children.retain(|&c| c != child);
        }
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        true
    }

    /// Allocate a node and append it under `parent` in one step.
    ///
    /// # Panics
    ///
    /// Panics if `parent` was not allocated by this tree.
    pub fn add_child(&mut self, parent: NodeId, data: ViewData) -> NodeId {
        assert!(self.get(parent).is_some(), "unknown parent {parent:?}");
        let child = self.alloc(data);
        let _ = self.append_child(parent, child);
        child
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// All nodes reachable from `id` in pre-order, `id` included.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if self.get(next).is_none() {
                continue;
            }
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Borrow a node as a [`ViewRef`] handle.
    #[must_use]
    pub fn view(&self, id: NodeId) -> Option<ViewRef<'_>> {
        self.get(id).map(|_| ViewRef { tree: self, id })
    }

    /// Find the first node, in pre-order from the root, with the given id.
    #[must_use]
    pub fn find_by_id(&self, view_id: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|&n| self.data(n).and_then(|d| d.id.as_deref()) == Some(view_id))
    }

    // Mutation. Nothing is cached on the style side, so a re-query after any
    // of these sees the new state immediately.

    /// Replace a node's id. Returns the previous id.
    pub fn set_id(&mut self, id: NodeId, view_id: Option<&str>) -> Option<String> {
        let data = self.data_mut(id)?;
        std::mem::replace(&mut data.id, view_id.map(str::to_string))
    }

    /// Add a class. Returns `true` if it was not present.
    pub fn add_class(&mut self, id: NodeId, class: &str) -> bool {
        self.data_mut(id)
            .is_some_and(|d| d.classes.insert(class.to_string()))
    }

    /// Remove a class. Returns `true` if it was present.
    pub fn remove_class(&mut self, id: NodeId, class: &str) -> bool {
        self.data_mut(id).is_some_and(|d| d.classes.remove(class))
    }

    /// Enter a visual state. Returns `true` if it was not active.
    pub fn add_pseudo_class(&mut self, id: NodeId, pseudo: &str) -> bool {
        self.data_mut(id)
            .is_some_and(|d| d.pseudo_classes.insert(pseudo.to_string()))
    }

    /// Leave a visual state. Returns `true` if it was active.
    pub fn remove_pseudo_class(&mut self, id: NodeId, pseudo: &str) -> bool {
        self.data_mut(id)
            .is_some_and(|d| d.pseudo_classes.remove(pseudo))
    }

    /// Set an attribute. Returns the previous value.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Option<String> {
        self.data_mut(id)?
            .attributes
            .insert(name.to_string(), value.to_string())
    }

    /// Remove an attribute. Returns the previous value.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        self.data_mut(id)?.attributes.remove(name)
    }
}

/// A borrowed handle on one node of a [`ViewTree`].
///
/// Copyable and cheap; walking to the parent yields another handle on the
/// same tree.
#[derive(Debug, Clone, Copy)]
pub struct ViewRef<'a> {
    tree: &'a ViewTree,
    id: NodeId,
}

impl<'a> ViewRef<'a> {
    /// The node index.
    #[must_use]
    pub const fn node_id(&self) -> NodeId {
        self.id
    }

    /// The tree this handle borrows.
    #[must_use]
    pub const fn tree(&self) -> &'a ViewTree {
        self.tree
    }

    /// The node's view data.
    ///
    /// # Panics
    ///
    /// Never: a `ViewRef` is only created for allocated nodes.
    #[must_use]
    pub fn data(&self) -> &'a ViewData {
        &self.tree.nodes[self.id.0].data
    }

    /// Handle on the parent node.
    #[must_use]
    pub fn parent_ref(&self) -> Option<Self> {
        self.tree.parent(self.id).and_then(|p| self.tree.view(p))
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a ViewTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}
