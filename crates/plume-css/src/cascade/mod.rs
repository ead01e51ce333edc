//! Applying matched rules, and the style scope that owns the current
//! sheets.
//!
//! Matches come out of [`SelectorsMap::query`] in application order, so the
//! apply step is a plain walk: every declaration of every matched rule set
//! is handed to the property sink in turn, later ones overwriting earlier
//! ones. Inline declarations go last.

use std::collections::HashMap;
use std::sync::Arc;

use plume_common::warning::{clear_warnings, warn_once};
use plume_view::{NodeId, ViewTree};

use crate::config::StyleConfig;
use crate::error::{PropertyApplicationError, StyleError};
use crate::node::{PropertySink, StyleNode};
use crate::rule_set::{AstNode, Declaration};
use crate::selector::{InlineStyle, SelectorCore};
use crate::selectors_map::{MatchedSelector, SelectorsMap};
use crate::style::ResolvedStyle;
use crate::visual_state::VisualStateMap;

/// Outcome of one apply step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Declarations the sink accepted.
    pub applied: usize,
    /// Declarations the sink rejected, in application order.
    pub failures: Vec<PropertyApplicationError>,
}

impl ApplyReport {
    /// Whether every declaration was accepted.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Fold a later apply step into this report.
    pub fn merge(&mut self, other: Self) {
        self.applied += other.applied;
        self.failures.extend(other.failures);
    }
}

/// Diagnostic name of a rule's origin: `ClassSelector .x`.
fn origin(selector: &SelectorCore) -> String {
    format!("{} {}", selector.kind(), selector)
}

fn apply_declarations<S: PropertySink + ?Sized>(
    origin: &str,
    declarations: &[Declaration],
    sink: &mut S,
) -> ApplyReport {
    let mut report = ApplyReport::default();
    for declaration in declarations {
        match sink.set_property(&declaration.property, &declaration.value) {
            Ok(()) => report.applied += 1,
            Err(source) => {
                let failure = PropertyApplicationError {
                    origin: origin.to_string(),
                    source,
                };
                let _ = warn_once("Style", &failure.to_string());
                report.failures.push(failure);
            }
        }
    }
    report
}

/// Apply the declarations of `matches`, in order, to `sink`.
///
/// A declaration the sink rejects is logged and recorded; the remaining
/// declarations are still applied.
pub fn apply_matches<S: PropertySink + ?Sized>(
    matches: &[MatchedSelector<'_>],
    sink: &mut S,
) -> ApplyReport {
    let mut report = ApplyReport::default();
    for matched in matches {
        report.merge(apply_declarations(
            &origin(matched.selector),
            matched.declarations(),
            sink,
        ));
    }
    report
}

/// Apply a node's inline declarations to `sink`. Call after
/// [`apply_matches`] so they win.
pub fn apply_inline<S: PropertySink + ?Sized>(
    declarations: &[Declaration],
    sink: &mut S,
) -> ApplyReport {
    apply_declarations(&origin(&SelectorCore::Inline(InlineStyle)), declarations, sink)
}

/// The style sheets in effect for a tree of views, and the index built
/// from them.
///
/// Every change rebuilds both maps from scratch and swaps them in only once
/// the build has succeeded. Readers holding a [`snapshot`](Self::snapshot)
/// keep the revision they took.
#[derive(Debug, Clone, Default)]
pub struct StyleScope {
    config: StyleConfig,
    sheets: Vec<Vec<AstNode>>,
    map: Arc<SelectorsMap>,
    visual_states: Arc<VisualStateMap>,
}

impl StyleScope {
    /// An empty scope.
    #[must_use]
    pub fn new(config: StyleConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// A scope holding `sheets`, in order.
    ///
    /// # Errors
    ///
    /// Fails like [`SelectorsMap::build_with`].
    pub fn with_sheets(config: StyleConfig, sheets: Vec<Vec<AstNode>>) -> Result<Self, StyleError> {
        let mut scope = Self::new(config);
        scope.install(sheets)?;
        Ok(scope)
    }

    /// Append a sheet after the existing ones.
    ///
    /// # Errors
    ///
    /// Fails like [`SelectorsMap::build_with`]; the scope is left unchanged.
    pub fn add_sheet(&mut self, sheet: Vec<AstNode>) -> Result<(), StyleError> {
        let mut sheets = self.sheets.clone();
        sheets.push(sheet);
        self.install(sheets)
    }

    /// Replace all sheets.
    ///
    /// # Errors
    ///
    /// Fails like [`SelectorsMap::build_with`]; the scope is left unchanged.
    pub fn replace_sheets(&mut self, sheets: Vec<Vec<AstNode>>) -> Result<(), StyleError> {
        self.install(sheets)?;
        clear_warnings();
        Ok(())
    }

    /// Drop all sheets.
    pub fn clear(&mut self) {
        self.sheets.clear();
        self.map = Arc::new(SelectorsMap::default());
        self.visual_states = Arc::new(VisualStateMap::default());
    }

    fn install(&mut self, sheets: Vec<Vec<AstNode>>) -> Result<(), StyleError> {
        let map = SelectorsMap::from_sheets(sheets.iter().map(Vec::as_slice), &self.config)?;
        self.visual_states = Arc::new(VisualStateMap::for_map(&map));
        self.map = Arc::new(map);
        self.sheets = sheets;
        Ok(())
    }

    /// The configuration maps are built with.
    #[must_use]
    pub const fn config(&self) -> &StyleConfig {
        &self.config
    }

    /// The sheets in effect, in order.
    #[must_use]
    pub fn sheets(&self) -> &[Vec<AstNode>] {
        &self.sheets
    }

    /// The current index.
    #[must_use]
    pub fn snapshot(&self) -> Arc<SelectorsMap> {
        Arc::clone(&self.map)
    }

    /// The current visual-state map.
    #[must_use]
    pub fn visual_states(&self) -> Arc<VisualStateMap> {
        Arc::clone(&self.visual_states)
    }

    /// Selectors matching `node`, in application order.
    #[must_use]
    pub fn query<N: StyleNode>(&self, node: &N) -> Vec<MatchedSelector<'_>> {
        self.map.query(node)
    }

    /// Query `node`, apply the matches to `sink`, then apply `inline`.
    pub fn resolve<N, S>(&self, node: &N, inline: &[Declaration], sink: &mut S) -> ApplyReport
    where
        N: StyleNode,
        S: PropertySink + ?Sized,
    {
        let mut report = apply_matches(&self.map.query(node), sink);
        report.merge(apply_inline(inline, sink));
        report
    }

    /// Resolve every view of `tree` with its own inline style.
    #[must_use]
    pub fn resolve_tree(&self, tree: &ViewTree) -> TreeStyles {
        let mut resolved = TreeStyles::default();
        for id in tree.descendants(tree.root()) {
            let Some(view) = tree.view(id) else {
                continue;
            };
            let inline: Vec<Declaration> = view
                .data()
                .inline_style
                .iter()
                .map(|(property, value)| Declaration::new(property, value))
                .collect();
            let mut style = ResolvedStyle::default();
            let report = self.resolve(&view, &inline, &mut style);
            let _ = resolved.styles.insert(id, style);
            let _ = resolved.reports.insert(id, report);
        }
        resolved
    }
}

/// Styles of every view in a tree, with the apply report of each.
#[derive(Debug, Clone, Default)]
pub struct TreeStyles {
    /// Resolved style per view.
    pub styles: HashMap<NodeId, ResolvedStyle>,
    /// Apply outcome per view.
    pub reports: HashMap<NodeId, ApplyReport>,
}

impl TreeStyles {
    /// Whether no view had a rejected declaration.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.reports.values().all(ApplyReport::is_clean)
    }

    /// Rejected declarations of every view that had any.
    pub fn failures(&self) -> impl Iterator<Item = (NodeId, &PropertyApplicationError)> {
        self.reports
            .iter()
            .flat_map(|(&id, report)| report.failures.iter().map(move |failure| (id, failure)))
    }
}
