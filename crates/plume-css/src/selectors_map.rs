//! Selector index and the query step.
//!
//! Every valid selector is filed once, under the head of its subject
//! compound: id selectors by id, class selectors by class, type selectors
//! by type tag, everything else in the universal bucket. A query gathers
//! the buckets a node can possibly hit, runs the full match on each
//! candidate and orders the survivors by specificity, then by document
//! order.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::changes::ChangeMap;
use crate::config::StyleConfig;
use crate::error::StyleError;
use crate::node::StyleNode;
use crate::rule_set::{AstNode, Declaration, RuleSet, RuleSetId};
use crate::selector::{IndexKey, InvalidSelector, SelectorCore, Specificity};

/// One filed selector.
#[derive(Debug, Clone, Copy)]
struct Entry {
    rule_set: RuleSetId,
    selector: usize,
    /// Global filing order. Strictly increasing across the whole map.
    sequence: u32,
}

/// A selector that matched, with the rule set it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct MatchedSelector<'a> {
    /// The selector that matched.
    pub selector: &'a SelectorCore,
    /// Its rule set.
    pub rule_set: &'a RuleSet,
    /// Index of the rule set in the map.
    pub rule_set_id: RuleSetId,
    /// Document order of the selector; breaks specificity ties.
    pub sequence: u32,
}

impl<'a> MatchedSelector<'a> {
    /// The owning rule set.
    #[must_use]
    pub const fn rule_set(&self) -> &'a RuleSet {
        self.rule_set
    }

    /// Selector weight.
    #[must_use]
    pub const fn specificity(&self) -> Specificity {
        self.selector.specificity()
    }

    /// The rule set's declarations.
    #[must_use]
    pub fn declarations(&self) -> &'a [Declaration] {
        &self.rule_set.declarations
    }

    /// Ordering key: weight first, then document order.
    const fn order(&self) -> (Specificity, u32) {
        (self.specificity(), self.sequence)
    }
}

impl fmt::Display for MatchedSelector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {{", self.selector.kind(), self.selector)?;
        for declaration in self.declarations() {
            write!(f, " {declaration}")?;
        }
        f.write_str(" }")
    }
}

/// Sort matches into application order and drop repeats.
pub(crate) fn order_matches(matches: &mut Vec<MatchedSelector<'_>>) {
    matches.sort_by_key(MatchedSelector::order);
    matches.dedup_by_key(|m| m.sequence);
}

/// Matches for one node plus the dynamic dependencies of its candidates.
#[derive(Debug, Clone)]
pub struct SelectorsMatch<'a, K> {
    /// Matches in application order.
    pub selectors: Vec<MatchedSelector<'a>>,
    /// Attributes and pseudo-classes that can change the result.
    pub changes: ChangeMap<K>,
}

/// Index of the selectors of a list of rule sets.
///
/// Immutable once built. Changing the sheets means building a new map.
#[derive(Debug, Clone)]
pub struct SelectorsMap {
    rule_sets: Arc<[RuleSet]>,
    id_index: HashMap<String, Vec<Entry>>,
    class_index: HashMap<String, Vec<Entry>>,
    type_index: HashMap<String, Vec<Entry>>,
    universal: Vec<Entry>,
    invalid: Vec<(RuleSetId, usize)>,
    filed: usize,
}

impl Default for SelectorsMap {
    fn default() -> Self {
        Self::build(Vec::new())
    }
}

impl SelectorsMap {
    /// Index `rule_sets`, in order. Invalid selectors are left out of the
    /// index and listed by [`invalid_selectors`](Self::invalid_selectors).
    #[must_use]
    pub fn build(rule_sets: impl Into<Arc<[RuleSet]>>) -> Self {
        let rule_sets = rule_sets.into();
        let mut map = Self {
            rule_sets: Arc::clone(&rule_sets),
            id_index: HashMap::new(),
            class_index: HashMap::new(),
            type_index: HashMap::new(),
            universal: Vec::new(),
            invalid: Vec::new(),
            filed: 0,
        };

        let mut sequence: u32 = 0;
        for (r, rule_set) in rule_sets.iter().enumerate() {
            for (s, selector) in rule_set.selectors.iter().enumerate() {
                let Some(key) = selector.index_key() else {
                    if !selector.is_valid() {
                        map.invalid.push((RuleSetId(r), s));
                    }
                    continue;
                };
                let entry = Entry {
                    rule_set: RuleSetId(r),
                    selector: s,
                    sequence,
                };
                sequence = sequence.saturating_add(1);
                map.filed += 1;
                match key {
                    IndexKey::Id(id) => map.id_index.entry(id).or_default().push(entry),
                    IndexKey::Class(class) => map.class_index.entry(class).or_default().push(entry),
                    IndexKey::Type(tag) => map.type_index.entry(tag).or_default().push(entry),
                    IndexKey::Universal => map.universal.push(entry),
                }
            }
        }
        map
    }

    /// Index `rule_sets` under `config`.
    ///
    /// # Errors
    ///
    /// With [`StyleConfig::strict_combinators`] set, returns
    /// [`StyleError::Rejected`] for the first selector that uses a sibling
    /// combinator.
    pub fn build_with(
        rule_sets: impl Into<Arc<[RuleSet]>>,
        config: &StyleConfig,
    ) -> Result<Self, StyleError> {
        let map = Self::build(rule_sets);
        let rejected = map
            .invalid_selectors()
            .find(|(_, invalid)| config.strict_combinators && invalid.error.is_unsupported())
            .map(|(_, invalid)| invalid.error.clone());
        match rejected {
            Some(error) => Err(StyleError::Rejected(error)),
            None => Ok(map),
        }
    }

    /// Build from the concatenated rule ASTs of several sheets, in order.
    ///
    /// # Errors
    ///
    /// Same as [`build_with`](Self::build_with).
    pub fn from_sheets<'s>(
        sheets: impl IntoIterator<Item = &'s [AstNode]>,
        config: &StyleConfig,
    ) -> Result<Self, StyleError> {
        let rule_sets: Vec<RuleSet> = sheets.into_iter().flat_map(RuleSet::from_ast).collect();
        Self::build_with(rule_sets, config)
    }

    /// All rule sets, in document order.
    #[must_use]
    pub fn rule_sets(&self) -> &[RuleSet] {
        &self.rule_sets
    }

    /// Shared handle on the rule sets.
    #[must_use]
    pub fn shared_rule_sets(&self) -> Arc<[RuleSet]> {
        Arc::clone(&self.rule_sets)
    }

    /// Look up a rule set.
    #[must_use]
    pub fn rule_set(&self, id: RuleSetId) -> Option<&RuleSet> {
        self.rule_sets.get(id.0)
    }

    /// Number of indexed selectors.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.filed
    }

    /// Whether no selector is indexed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.filed == 0
    }

    /// Selectors that failed to compile, with their rule set.
    pub fn invalid_selectors(&self) -> impl Iterator<Item = (RuleSetId, &InvalidSelector)> + '_ {
        self.invalid.iter().filter_map(|&(r, s)| {
            match self.rule_sets.get(r.0)?.selectors.get(s)? {
                SelectorCore::Invalid(invalid) => Some((r, invalid)),
                _ => None,
            }
        })
    }

    fn resolve(&self, entry: Entry) -> Option<MatchedSelector<'_>> {
        let rule_set = self.rule_sets.get(entry.rule_set.0)?;
        Some(MatchedSelector {
            selector: rule_set.selectors.get(entry.selector)?,
            rule_set,
            rule_set_id: entry.rule_set,
            sequence: entry.sequence,
        })
    }

    /// Every entry whose bucket `node` can hit.
    fn candidates<N: StyleNode>(&self, node: &N) -> Vec<MatchedSelector<'_>> {
        let mut entries: Vec<Entry> = self.universal.clone();
        if let Some(bucket) = node.id().and_then(|id| self.id_index.get(id)) {
            entries.extend_from_slice(bucket);
        }
        if let Some(bucket) = self.type_index.get(node.type_tag()) {
            entries.extend_from_slice(bucket);
        }
        for class in node.classes() {
            if let Some(bucket) = self.class_index.get(class) {
                entries.extend_from_slice(bucket);
            }
        }
        entries
            .into_iter()
            .filter_map(|entry| self.resolve(entry))
            .collect()
    }

    /// Selectors matching `node`, in application order: ascending
    /// specificity, ties in document order. Later entries win.
    ///
    /// Nothing is cached per node, so a query after a mutation sees it.
    #[must_use]
    pub fn query<N: StyleNode>(&self, node: &N) -> Vec<MatchedSelector<'_>> {
        let candidates = self.candidates(node);
        #[cfg(feature = "match-trace")]
        let candidate_count = candidates.len();

        let mut matches: Vec<_> = candidates
            .into_iter()
            .filter(|m| m.selector.matches(node))
            .collect();
        order_matches(&mut matches);

        #[cfg(feature = "match-trace")]
        eprintln!(
            "[MATCH] {:?} <{}>: {} candidates, {} matched",
            node.key(),
            node.type_tag(),
            candidate_count,
            matches.len()
        );
        matches
    }

    /// [`query`](Self::query) that also records, for every candidate whose
    /// static part matches, the attributes and pseudo-classes it tests and
    /// the nodes it tests them on.
    #[must_use]
    pub fn query_with_changes<N: StyleNode>(&self, node: &N) -> SelectorsMatch<'_, N::Key> {
        let mut changes = ChangeMap::new();
        let mut selectors = Vec::new();
        for candidate in self.candidates(node) {
            candidate.selector.track_changes(node, &mut changes);
            if candidate.selector.matches(node) {
                selectors.push(candidate);
            }
        }
        order_matches(&mut selectors);

        #[cfg(feature = "match-trace")]
        eprintln!(
            "[MATCH] {:?} <{}>: {} matched, dependencies on {} nodes",
            node.key(),
            node.type_tag(),
            selectors.len(),
            changes.len()
        );
        SelectorsMatch { selectors, changes }
    }
}
