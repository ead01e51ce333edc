//! Rules keyed by the visual state they style.
//!
//! Built alongside a [`SelectorsMap`] from the same rule sets. Every rule
//! selector of the form `key:state` is also filed here under `state`, so a
//! view can ask which rules would apply if it entered a state.

use std::collections::HashMap;
use std::sync::Arc;

use crate::node::StyleNode;
use crate::rule_set::{RuleSet, RuleSetId};
use crate::selector::{SelectorCore, VisualStateSelector};
use crate::selectors_map::{MatchedSelector, SelectorsMap, order_matches};

#[derive(Debug, Clone)]
struct StateEntry {
    selector: SelectorCore,
    rule_set: RuleSetId,
    sequence: u32,
}

/// Visual-state selectors grouped by state name.
#[derive(Debug, Clone)]
pub struct VisualStateMap {
    rule_sets: Arc<[RuleSet]>,
    by_state: HashMap<String, Vec<StateEntry>>,
    filed: usize,
}

impl Default for VisualStateMap {
    fn default() -> Self {
        Self::build(Vec::new())
    }
}

impl VisualStateMap {
    /// File every `key:state` selector of `rule_sets` under its state.
    #[must_use]
    pub fn build(rule_sets: impl Into<Arc<[RuleSet]>>) -> Self {
        let rule_sets = rule_sets.into();
        let mut by_state: HashMap<String, Vec<StateEntry>> = HashMap::new();
        let mut sequence: u32 = 0;
        let mut filed = 0;
        for (r, rule_set) in rule_sets.iter().enumerate() {
            for selector in rule_set.selectors.iter().filter_map(VisualStateSelector::from_core) {
                by_state
                    .entry(selector.state().to_string())
                    .or_default()
                    .push(StateEntry {
                        selector: SelectorCore::VisualState(selector),
                        rule_set: RuleSetId(r),
                        sequence,
                    });
                sequence = sequence.saturating_add(1);
                filed += 1;
            }
        }
        Self {
            rule_sets,
            by_state,
            filed,
        }
    }

    /// Build from the rule sets of an existing map, sharing them.
    #[must_use]
    pub fn for_map(map: &SelectorsMap) -> Self {
        Self::build(map.shared_rule_sets())
    }

    /// Rules that would apply to `node` once it is in `state`, in
    /// application order.
    #[must_use]
    pub fn query<N: StyleNode>(&self, node: &N, state: &str) -> Vec<MatchedSelector<'_>> {
        let Some(entries) = self.by_state.get(state) else {
            return Vec::new();
        };
        let mut matches: Vec<_> = entries
            .iter()
            .filter(|entry| match &entry.selector {
                SelectorCore::VisualState(selector) => selector.applies_in_state(node),
                _ => false,
            })
            .filter_map(|entry| {
                Some(MatchedSelector {
                    selector: &entry.selector,
                    rule_set: self.rule_sets.get(entry.rule_set.0)?,
                    rule_set_id: entry.rule_set,
                    sequence: entry.sequence,
                })
            })
            .collect();
        order_matches(&mut matches);
        matches
    }

    /// State names with at least one rule.
    pub fn states(&self) -> impl Iterator<Item = &str> + '_ {
        self.by_state.keys().map(String::as_str)
    }

    /// Number of filed selectors.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.filed
    }

    /// Whether nothing is filed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.filed == 0
    }
}

#[cfg(test)]
mod tests {
    use plume_view::{ViewData, ViewTree};

    use super::*;
    use crate::rule_set::Declaration;

    #[test]
    fn test_files_only_state_selectors() {
        let map = VisualStateMap::build(vec![
            RuleSet::parse(&["button:pressed", "button", ".a .b:hover"], Vec::new()),
            RuleSet::parse(&["#ok:pressed", "label:hover"], Vec::new()),
        ]);
        assert_eq!(map.len(), 3);
        let mut states: Vec<_> = map.states().collect();
        states.sort_unstable();
        assert_eq!(states, vec!["hover", "pressed"]);
    }

    #[test]
    fn test_query_ignores_current_state() {
        let tree = ViewTree::new(ViewData::new("Button").with_id("ok"));
        let node = tree.view(tree.root()).unwrap();
        let map = VisualStateMap::build(vec![
            RuleSet::parse(&["#ok:pressed"], vec![Declaration::new("color", "red")]),
            RuleSet::parse(&["button:pressed"], vec![Declaration::new("color", "blue")]),
            RuleSet::parse(&["label:pressed"], Vec::new()),
        ]);
        let matches = map.query(&node, "pressed");
        let order: Vec<_> = matches.iter().map(|m| m.selector.to_string()).collect();
        assert_eq!(order, vec!["button:pressed", "#ok:pressed"]);
        assert!(map.query(&node, "hover").is_empty());
    }
}
