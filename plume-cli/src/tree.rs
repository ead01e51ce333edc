//! JSON description of a view tree.

use std::collections::BTreeMap;

use plume_css::Declaration;
use plume_view::{NodeId, ViewData, ViewTree};
use serde::Deserialize;

/// One view and its children, as read from the `--tree` file.
///
/// ```json
/// {"type": "Page", "children": [
///     {"type": "Button", "id": "ok", "classes": ["primary"],
///      "pseudo_classes": ["pressed"], "attributes": {"title": "OK"},
///      "style": [{"property": "opacity", "value": "0.5"}]}
/// ]}
/// ```
#[derive(Debug, Deserialize)]
pub struct ViewSpec {
    /// View type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// View id.
    #[serde(default)]
    pub id: Option<String>,
    /// Style classes.
    #[serde(default)]
    pub classes: Vec<String>,
    /// Active visual states.
    #[serde(default)]
    pub pseudo_classes: Vec<String>,
    /// Attributes.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Inline style declarations.
    #[serde(default)]
    pub style: Vec<Declaration>,
    /// Child views in order.
    #[serde(default)]
    pub children: Vec<ViewSpec>,
}

impl ViewSpec {
    fn data(&self) -> ViewData {
        let mut data = ViewData::new(&self.type_name);
        data.id.clone_from(&self.id);
        data.classes.extend(self.classes.iter().cloned());
        data.pseudo_classes.extend(self.pseudo_classes.iter().cloned());
        data.attributes.extend(self.attributes.clone());
        data.inline_style = self
            .style
            .iter()
            .map(|d| (d.property.clone(), d.value.clone()))
            .collect();
        data
    }

    /// Build the arena tree.
    #[must_use]
    pub fn into_tree(self) -> ViewTree {
        let mut tree = ViewTree::new(self.data());
        let root = tree.root();
        attach(&mut tree, root, self.children);
        tree
    }
}

fn attach(tree: &mut ViewTree, parent: NodeId, children: Vec<ViewSpec>) {
    for child in children {
        let id = tree.add_child(parent, child.data());
        attach(tree, id, child.children);
    }
}

/// Short label for a view: `button#ok.primary:pressed`.
#[must_use]
pub fn describe(data: &ViewData) -> String {
    let mut label = data.type_name().to_string();
    if let Some(id) = &data.id {
        label.push('#');
        label.push_str(id);
    }
    for class in &data.classes {
        label.push('.');
        label.push_str(class);
    }
    for pseudo in &data.pseudo_classes {
        label.push(':');
        label.push_str(pseudo);
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_tree_builds_in_order() {
        let spec: ViewSpec = serde_json::from_str(
            r#"{"type": "Page", "children": [
                {"type": "Button", "id": "ok", "classes": ["primary"],
                 "pseudo_classes": ["pressed"], "attributes": {"title": "OK"},
                 "style": [{"property": "opacity", "value": "0.5"}]},
                {"type": "List-View"}
            ]}"#,
        )
        .unwrap();
        let tree = spec.into_tree();
        assert_eq!(tree.len(), 3);

        let ok = tree.find_by_id("ok").unwrap();
        let data = tree.data(ok).unwrap();
        assert_eq!(describe(data), "button#ok.primary:pressed");
        assert_eq!(data.attribute("title"), Some("OK"));
        assert_eq!(
            data.inline_style,
            vec![("opacity".to_string(), "0.5".to_string())]
        );

        let list = tree.children(tree.root())[1];
        assert_eq!(describe(tree.data(list).unwrap()), "listview");
    }
}
