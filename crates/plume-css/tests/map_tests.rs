//! Integration tests for the selector index, queries and change tracking.

use plume_css::{
    AstNode, Declaration, MatchedSelector, RuleSet, SelectorsMap, StyleConfig, VisualStateMap,
};
use plume_view::{ViewData, ViewTree};

fn rule(selector: &str, property: &str, value: &str) -> RuleSet {
    RuleSet::parse(&[selector], vec![Declaration::new(property, value)])
}

fn selectors(matches: &[MatchedSelector<'_>]) -> Vec<String> {
    matches.iter().map(|m| m.selector.to_string()).collect()
}

fn button_tree() -> ViewTree {
    ViewTree::new(ViewData::new("button").with_id("foo").with_class("bar"))
}

#[test]
fn test_query_orders_by_specificity() {
    let tree = ViewTree::new(ViewData::new("div").with_id("a").with_class("b"));
    let map = SelectorsMap::build(vec![
        rule("#a", "color", "red"),
        rule(".b", "color", "green"),
        rule("div", "color", "blue"),
        rule("*", "color", "black"),
    ]);
    let node = tree.view(tree.root()).unwrap();
    assert_eq!(selectors(&map.query(&node)), vec!["*", "div", ".b", "#a"]);
}

#[test]
fn test_equal_specificity_keeps_document_order() {
    let tree = ViewTree::new(ViewData::new("label").with_class("x"));
    let map = SelectorsMap::build(vec![rule(".x", "color", "red"), rule(".x", "color", "blue")]);
    let node = tree.view(tree.root()).unwrap();
    let matches = map.query(&node);
    let values: Vec<&str> = matches
        .iter()
        .flat_map(|m| m.declarations())
        .map(|d| d.value.as_str())
        .collect();
    assert_eq!(values, vec!["red", "blue"]);
    assert!(matches[0].sequence < matches[1].sequence);
}

#[test]
fn test_every_bucket_hit_exactly_once() {
    let tree = button_tree();
    let node = tree.view(tree.root()).unwrap();
    let orders = [
        ["#foo", ".bar", "button", "*"],
        ["*", "button", ".bar", "#foo"],
        [".bar", "*", "#foo", "button"],
    ];
    for order in orders {
        let map = SelectorsMap::build(
            order
                .iter()
                .map(|s| rule(s, "color", "red"))
                .collect::<Vec<_>>(),
        );
        let matches = map.query(&node);
        assert_eq!(selectors(&matches), vec!["*", "button", ".bar", "#foo"], "{order:?}");
    }
}

#[test]
fn test_group_selectors_share_rule_set() {
    let tree = button_tree();
    let node = tree.view(tree.root()).unwrap();
    let map = SelectorsMap::build(vec![RuleSet::parse(
        &["#foo", ".bar", "label"],
        vec![Declaration::new("color", "red")],
    )]);
    let matches = map.query(&node);
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].rule_set_id, matches[1].rule_set_id);
    assert!(std::ptr::eq(matches[0].rule_set(), matches[1].rule_set()));
    assert_eq!(map.rule_set(matches[0].rule_set_id), Some(matches[0].rule_set()));
}

#[test]
fn test_invalid_selector_is_isolated() {
    let tree = button_tree();
    let node = tree.view(tree.root()).unwrap();
    let map = SelectorsMap::build(vec![
        rule(".bar", "color", "red"),
        RuleSet::parse(&["[unterminated", "#foo"], vec![Declaration::new("color", "blue")]),
        rule("button", "width", "10px"),
    ]);
    assert_eq!(map.len(), 3);
    let invalid: Vec<_> = map.invalid_selectors().map(|(_, s)| s.text.clone()).collect();
    assert_eq!(invalid, vec!["[unterminated"]);
    assert_eq!(selectors(&map.query(&node)), vec!["button", ".bar", "#foo"]);
}

#[test]
fn test_requery_sees_mutations() {
    let mut tree = ViewTree::new(ViewData::new("label"));
    let root = tree.root();
    let map = SelectorsMap::build(vec![rule(".warn", "color", "red"), rule("#title", "color", "blue")]);

    assert!(map.query(&tree.view(root).unwrap()).is_empty());

    let _ = tree.add_class(root, "warn");
    assert_eq!(selectors(&map.query(&tree.view(root).unwrap())), vec![".warn"]);

    let _ = tree.set_id(root, Some("title"));
    assert_eq!(selectors(&map.query(&tree.view(root).unwrap())), vec![".warn", "#title"]);

    let _ = tree.remove_class(root, "warn");
    assert_eq!(selectors(&map.query(&tree.view(root).unwrap())), vec!["#title"]);
}

#[test]
fn test_matched_selector_display() {
    let tree = button_tree();
    let map = SelectorsMap::build(vec![RuleSet::parse(
        &[".bar"],
        vec![Declaration::new("color", "red"), Declaration::new("opacity", "0.5")],
    )]);
    let matches = map.query(&tree.view(tree.root()).unwrap());
    assert_eq!(
        matches[0].to_string(),
        "ClassSelector .bar { color: red; opacity: 0.5; }"
    );
}

#[test]
fn test_change_tracking_records_dependencies_on_the_right_node() {
    let mut tree = ViewTree::new(ViewData::new("list"));
    let root = tree.root();
    let item = tree.add_child(root, ViewData::new("item"));
    let map = SelectorsMap::build(vec![
        rule("list:hover item", "color", "red"),
        rule("item[title]", "color", "blue"),
        rule("label:focus", "color", "green"),
    ]);

    let result = map.query_with_changes(&tree.view(item).unwrap());
    assert!(result.selectors.is_empty());
    assert!(result.changes.depends_on_pseudo_class(root, "hover"));
    assert!(!result.changes.depends_on_pseudo_class(item, "hover"));
    assert!(result.changes.depends_on_attribute(item, "title"));
    assert!(!result.changes.depends_on_pseudo_class(item, "focus"));

    let _ = tree.add_pseudo_class(root, "hover");
    let _ = tree.set_attribute(item, "title", "Tip");
    let result = map.query_with_changes(&tree.view(item).unwrap());
    // item[title] = 0x101, list:hover item = 0x102
    assert_eq!(
        selectors(&result.selectors),
        vec!["item[title]", "list:hover item"]
    );
}

#[test]
fn test_static_selectors_record_nothing() {
    let tree = button_tree();
    let map = SelectorsMap::build(vec![rule("#foo", "color", "red"), rule("button .bar", "color", "red")]);
    let result = map.query_with_changes(&tree.view(tree.root()).unwrap());
    assert!(result.changes.is_empty());
    assert_eq!(result.selectors.len(), 1);
}

#[test]
fn test_visual_state_queries() {
    let tree = ViewTree::new(ViewData::new("Button").with_class("primary"));
    let node = tree.view(tree.root()).unwrap();
    let map = SelectorsMap::build(vec![
        rule("button:pressed", "color", "red"),
        rule("button.primary:pressed", "color", "blue"),
        rule("button:hover", "color", "green"),
        rule("label:pressed", "color", "black"),
    ]);
    let states = VisualStateMap::for_map(&map);

    let pressed = states.query(&node, "pressed");
    assert_eq!(
        selectors(&pressed),
        vec!["button:pressed", "button.primary:pressed"]
    );
    assert_eq!(selectors(&states.query(&node, "hover")), vec!["button:hover"]);
    assert!(states.query(&node, "focus").is_empty());
    assert!(map.query(&node).is_empty());
}

#[test]
fn test_build_from_json_rule_ast() {
    let json = r##"[
        {"type": "comment", "comment": " theme "},
        {"type": "rule", "selectors": [".a", "#b"], "declarations": [
            {"type": "declaration", "property": "color", "value": "red"},
            {"type": "comment", "comment": "ignored"}
        ]},
        {"type": "media", "media": "print"},
        {"type": "rule", "selectors": ["a ~ b"], "declarations": []}
    ]"##;
    let nodes: Vec<AstNode> = serde_json::from_str(json).unwrap();
    assert_eq!(nodes.len(), 4);

    let map = SelectorsMap::from_sheets([nodes.as_slice()], &StyleConfig::default()).unwrap();
    assert_eq!(map.rule_sets().len(), 2);
    assert_eq!(map.len(), 2);
    assert_eq!(map.rule_sets()[0].declarations, vec![Declaration::new("color", "red")]);

    let strict = StyleConfig::new().with_strict_combinators(true);
    assert!(SelectorsMap::from_sheets([nodes.as_slice()], &strict).is_err());
}

#[test]
fn test_sheets_concatenate_in_order() {
    let first: Vec<AstNode> =
        serde_json::from_str(r#"[{"type":"rule","selectors":[".x"],"declarations":[{"type":"declaration","property":"color","value":"red"}]}]"#)
            .unwrap();
    let second: Vec<AstNode> =
        serde_json::from_str(r#"[{"type":"rule","selectors":[".x"],"declarations":[{"type":"declaration","property":"color","value":"blue"}]}]"#)
            .unwrap();
    let map =
        SelectorsMap::from_sheets([first.as_slice(), second.as_slice()], &StyleConfig::default()).unwrap();
    let tree = ViewTree::new(ViewData::new("label").with_class("x"));
    let matches = map.query(&tree.view(tree.root()).unwrap());
    assert_eq!(matches.last().map(|m| m.declarations()[0].value.as_str()), Some("blue"));
}
