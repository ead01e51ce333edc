//! Integration tests for selector compilation and matching against a view tree.

use std::time::{Duration, Instant};

use plume_css::selector::{SelectorCore, create_selector, parse_selector_tokens};
use plume_css::{SelectorKind, Specificity};
use plume_view::{NodeId, ViewData, ViewRef, ViewTree};

/// `section > div.wrapper > label.row` plus a sibling `section > label.row`.
fn layout_tree() -> (ViewTree, NodeId, NodeId) {
    let mut tree = ViewTree::new(ViewData::new("Page"));
    let section = tree.add_child(tree.root(), ViewData::new("section"));
    let wrapper = tree.add_child(section, ViewData::new("div").with_class("wrapper"));
    let nested = tree.add_child(wrapper, ViewData::new("label").with_class("row"));
    let direct = tree.add_child(section, ViewData::new("label").with_class("row"));
    (tree, nested, direct)
}

fn view(tree: &ViewTree, id: NodeId) -> ViewRef<'_> {
    tree.view(id).unwrap()
}

fn matches(selector: &str, tree: &ViewTree, id: NodeId) -> bool {
    create_selector(selector).matches(&view(tree, id))
}

#[test]
fn test_child_combinator_requires_direct_parent() {
    let (tree, nested, direct) = layout_tree();
    assert!(!matches("section > .row", &tree, nested));
    assert!(matches("section > .row", &tree, direct));
    assert!(matches(".wrapper > .row", &tree, nested));
}

#[test]
fn test_descendant_combinator_any_depth() {
    let (tree, nested, direct) = layout_tree();
    assert!(matches("section .row", &tree, nested));
    assert!(matches("section .row", &tree, direct));
    assert!(matches("page label", &tree, nested));
    assert!(!matches("aside .row", &tree, nested));
}

#[test]
fn test_descendant_backtracks_past_nearest_ancestor() {
    // panel(.outer) > panel > panel > label: the nearest `panel` ancestor
    // has no `.outer` parent, a farther one does.
    let mut tree = ViewTree::new(ViewData::new("panel").with_class("outer"));
    let middle = tree.add_child(tree.root(), ViewData::new("panel"));
    let inner = tree.add_child(middle, ViewData::new("panel"));
    let label = tree.add_child(inner, ViewData::new("label"));

    assert!(matches(".outer > panel label", &tree, label));
    assert!(matches(".outer > panel > panel > label", &tree, label));
    assert!(!matches(".outer > panel > label", &tree, label));
}

#[test]
fn test_deep_descendant_chain_stays_linear() {
    // 60 nested `a` views ending in a `b` leaf.
    let mut tree = ViewTree::new(ViewData::new("a"));
    let mut parent = tree.root();
    for _ in 0..59 {
        parent = tree.add_child(parent, ViewData::new("a"));
    }
    let leaf = tree.add_child(parent, ViewData::new("b"));

    let started = Instant::now();
    assert!(!matches("x a a a a a a a b", &tree, leaf));
    assert!(!matches("a a a a a a a a x b", &tree, leaf));
    assert!(matches("a a a a a a a a b", &tree, leaf));
    assert!(matches("a > a a > a a b", &tree, leaf));
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[test]
fn test_attribute_operators_on_views() {
    let tree = ViewTree::new(
        ViewData::new("label")
            .with_attribute("title", "Hello World")
            .with_attribute("lang", "en-US"),
    );
    let root = tree.root();
    assert!(matches("[title]", &tree, root));
    assert!(matches("[title^=Hello]", &tree, root));
    assert!(matches("[title$=World]", &tree, root));
    assert!(matches("[title*=lo W]", &tree, root));
    assert!(matches("[title='Hello World']", &tree, root));
    assert!(matches("[title~=World]", &tree, root));
    assert!(matches("[lang|=en]", &tree, root));
    assert!(!matches("[lang|=english]", &tree, root));
    assert!(!matches("[missing]", &tree, root));
    assert!(!matches("[title^='']", &tree, root));
}

#[test]
fn test_dash_match_boundaries() {
    for (lang, expected) in [("en", true), ("en-US", true), ("english", false)] {
        let tree = ViewTree::new(ViewData::new("label").with_attribute("lang", lang));
        assert_eq!(matches("[lang|=en]", &tree, tree.root()), expected, "{lang}");
    }
}

#[test]
fn test_type_names_are_normalized_on_both_sides() {
    for node_type in ["ListView", "listview", "List-View", "list-view"] {
        let tree = ViewTree::new(ViewData::new(node_type));
        for selector in ["ListView", "listview", "List-View", "list-view"] {
            assert!(matches(selector, &tree, tree.root()), "{selector} vs {node_type}");
        }
    }
}

#[test]
fn test_pseudo_classes_follow_view_state() {
    let mut tree = ViewTree::new(ViewData::new("button"));
    let root = tree.root();
    assert!(!matches("button:pressed", &tree, root));
    let _ = tree.add_pseudo_class(root, "pressed");
    assert!(matches("button:pressed", &tree, root));
    assert!(!matches("button:pressed:disabled", &tree, root));
}

#[test]
fn test_id_attribute_alias() {
    let tree = ViewTree::new(ViewData::new("button").with_id("ok"));
    assert!(matches("[id=ok]", &tree, tree.root()));
    assert!(matches("#ok", &tree, tree.root()));
}

#[test]
fn test_matching_has_no_side_effects() {
    let (tree, nested, _) = layout_tree();
    let selector = create_selector("section .wrapper > .row");
    let node = view(&tree, nested);
    let first = selector.matches(&node);
    for _ in 0..3 {
        assert_eq!(selector.matches(&node), first);
    }
    assert!(first);
}

#[test]
fn test_may_match_ignores_dynamic_parts() {
    let tree = ViewTree::new(ViewData::new("button"));
    let node = view(&tree, tree.root());
    let selector = create_selector("button:hover[title]");
    assert!(!selector.matches(&node));
    assert!(selector.may_match(&node));
    assert!(!create_selector("label:hover").may_match(&node));
}

#[test]
fn test_kinds_and_display() {
    for (text, kind, display) in [
        ("*", SelectorKind::Universal, "*"),
        ("#a", SelectorKind::Id, "#a"),
        ("Button", SelectorKind::Type, "button"),
        (".a", SelectorKind::Class, ".a"),
        ("[a=b]", SelectorKind::Attribute, "[a=b]"),
        (":hover", SelectorKind::PseudoClass, ":hover"),
        ("a.b", SelectorKind::Sequence, "a.b"),
        ("a  >  b", SelectorKind::Complex, "a > b"),
        ("a~b", SelectorKind::Invalid, "a~b"),
    ] {
        let selector = create_selector(text);
        assert_eq!(selector.kind(), kind, "{text}");
        assert_eq!(selector.to_string(), display, "{text}");
    }
}

#[test]
fn test_invalid_selectors_match_nothing() {
    let tree = ViewTree::new(ViewData::new("label"));
    for text in ["[unterminated", "label::before", "a + label", ""] {
        let selector = create_selector(text);
        assert!(matches!(selector, SelectorCore::Invalid(_)), "{text}");
        assert!(!selector.matches(&view(&tree, tree.root())), "{text}");
        assert_eq!(selector.specificity(), Specificity::ZERO);
    }
}

#[test]
fn test_token_stream_shape() {
    let tokens = parse_selector_tokens("section > .row:hover").unwrap();
    assert_eq!(tokens.len(), 3);
    assert!(tokens[0].combinator.is_none());
    assert!(tokens[1].combinator.is_some());
    assert!(tokens[2].combinator.is_none());
}
