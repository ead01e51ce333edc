//! Tests for view tree construction, traversal and state mutation.

use plume_view::{NodeId, ViewData, ViewTree};

/// window > (toolbar > (button#save, button#open), list)
fn sample_tree() -> (ViewTree, [NodeId; 4]) {
    let mut tree = ViewTree::new(ViewData::new("Window"));
    let toolbar = tree.add_child(tree.root(), ViewData::new("ToolBar"));
    let save = tree.add_child(toolbar, ViewData::new("Button").with_id("save"));
    let open = tree.add_child(toolbar, ViewData::new("Button").with_id("open"));
    let list = tree.add_child(tree.root(), ViewData::new("List-View"));
    (tree, [toolbar, save, open, list])
}

// ========== construction ==========

#[test]
fn test_new_tree_has_only_root() {
    let tree = ViewTree::new(ViewData::new("window"));
    assert_eq!(tree.len(), 1);
    assert!(!tree.is_empty());
    assert_eq!(tree.root(), NodeId::ROOT);
    assert_eq!(tree.parent(tree.root()), None);
    assert!(tree.children(tree.root()).is_empty());
}

#[test]
fn test_alloc_then_append() {
    let mut tree = ViewTree::new(ViewData::new("window"));
    let detached = tree.alloc(ViewData::new("label"));
    assert_eq!(tree.parent(detached), None);
    assert!(tree.children(tree.root()).is_empty());

    assert!(tree.append_child(tree.root(), detached));
    assert_eq!(tree.parent(detached), Some(tree.root()));
    assert_eq!(tree.children(tree.root()), &[detached]);
}

#[test]
fn test_append_child_moves_between_parents() {
    let (mut tree, [toolbar, save, open, list]) = sample_tree();
    assert!(tree.append_child(list, save));
    assert_eq!(tree.parent(save), Some(list));
    assert_eq!(tree.children(toolbar), &[open]);
    assert_eq!(tree.children(list), &[save]);
    assert_eq!(
        tree.descendants(tree.root()),
        vec![tree.root(), toolbar, open, list, save]
    );
}

#[test]
fn test_append_child_rejects_cycles() {
    let (mut tree, [toolbar, save, _, _]) = sample_tree();
    assert!(!tree.append_child(save, toolbar));
    assert!(!tree.append_child(save, tree.root()));
    assert!(!tree.append_child(toolbar, toolbar));
    assert!(!tree.append_child(toolbar, NodeId(99)));

    assert_eq!(tree.parent(toolbar), Some(tree.root()));
    assert!(tree.children(save).is_empty());
    assert_eq!(tree.descendants(tree.root()).len(), 5);
}

#[test]
fn test_type_names_are_normalized() {
    let (tree, [toolbar, _, _, list]) = sample_tree();
    assert_eq!(tree.data(toolbar).unwrap().type_name(), "toolbar");
    assert_eq!(tree.data(list).unwrap().type_name(), "listview");
}

// ========== traversal ==========

#[test]
fn test_children_keep_insertion_order() {
    let (tree, [toolbar, save, open, list]) = sample_tree();
    assert_eq!(tree.children(tree.root()), &[toolbar, list]);
    assert_eq!(tree.children(toolbar), &[save, open]);
}

#[test]
fn test_ancestors_run_parent_to_root() {
    let (tree, [toolbar, save, _, _]) = sample_tree();
    let ancestors: Vec<_> = tree.ancestors(save).collect();
    assert_eq!(ancestors, vec![toolbar, tree.root()]);
    assert_eq!(tree.ancestors(tree.root()).count(), 0);
}

#[test]
fn test_descendants_are_pre_order() {
    let (tree, [toolbar, save, open, list]) = sample_tree();
    assert_eq!(
        tree.descendants(tree.root()),
        vec![tree.root(), toolbar, save, open, list]
    );
    assert_eq!(tree.descendants(toolbar), vec![toolbar, save, open]);
}

#[test]
fn test_find_by_id() {
    let (tree, [_, save, open, _]) = sample_tree();
    assert_eq!(tree.find_by_id("save"), Some(save));
    assert_eq!(tree.find_by_id("open"), Some(open));
    assert_eq!(tree.find_by_id("missing"), None);
}

#[test]
fn test_unknown_node_is_empty() {
    let tree = ViewTree::new(ViewData::new("window"));
    let stray = NodeId(42);
    assert!(tree.get(stray).is_none());
    assert!(tree.view(stray).is_none());
    assert!(tree.children(stray).is_empty());
    assert!(tree.descendants(stray).is_empty());
}

#[test]
fn test_view_ref_walks_to_parent() {
    let (tree, [toolbar, save, _, _]) = sample_tree();
    let view = tree.view(save).unwrap();
    assert_eq!(view.node_id(), save);
    assert_eq!(view.data().id.as_deref(), Some("save"));

    let parent = view.parent_ref().unwrap();
    assert_eq!(parent.node_id(), toolbar);
    let root = parent.parent_ref().unwrap();
    assert!(root.parent_ref().is_none());
    assert!(std::ptr::eq(root.tree(), &tree));
}

// ========== mutation ==========

#[test]
fn test_class_mutation_reports_change() {
    let (mut tree, [_, save, _, _]) = sample_tree();
    assert!(tree.add_class(save, "primary"));
    assert!(!tree.add_class(save, "primary"));
    assert!(tree.data(save).unwrap().classes.contains("primary"));
    assert!(tree.remove_class(save, "primary"));
    assert!(!tree.remove_class(save, "primary"));
}

#[test]
fn test_pseudo_class_mutation() {
    let (mut tree, [_, save, _, _]) = sample_tree();
    assert!(tree.add_pseudo_class(save, "pressed"));
    assert!(tree.data(save).unwrap().pseudo_classes.contains("pressed"));
    assert!(tree.remove_pseudo_class(save, "pressed"));
    assert!(tree.data(save).unwrap().pseudo_classes.is_empty());
}

#[test]
fn test_id_and_attribute_mutation() {
    let (mut tree, [_, save, _, _]) = sample_tree();
    assert_eq!(tree.set_id(save, Some("store")).as_deref(), Some("save"));
    assert_eq!(tree.find_by_id("store"), Some(save));
    assert_eq!(tree.data(save).unwrap().attribute("id"), Some("store"));

    assert_eq!(tree.set_attribute(save, "title", "Save"), None);
    assert_eq!(
        tree.set_attribute(save, "title", "Save all").as_deref(),
        Some("Save")
    );
    assert_eq!(tree.data(save).unwrap().attribute("title"), Some("Save all"));
    assert_eq!(tree.remove_attribute(save, "title").as_deref(), Some("Save all"));
    assert_eq!(tree.data(save).unwrap().attribute("title"), None);
}

#[test]
fn test_mutation_of_unknown_node_is_noop() {
    let mut tree = ViewTree::new(ViewData::new("window"));
    let stray = NodeId(7);
    assert!(!tree.add_class(stray, "x"));
    assert_eq!(tree.set_attribute(stray, "a", "b"), None);
    assert_eq!(tree.set_id(stray, Some("x")), None);
}

#[test]
fn test_builders_fill_view_data() {
    let data = ViewData::new("Label")
        .with_classes(&["a", "b"])
        .with_pseudo_class("disabled")
        .with_attribute("lang", "en")
        .with_inline_style("color", "red");
    assert_eq!(data.classes.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    assert!(data.pseudo_classes.contains("disabled"));
    assert_eq!(data.attribute("lang"), Some("en"));
    assert_eq!(
        data.inline_style,
        vec![("color".to_string(), "red".to_string())]
    );
}
