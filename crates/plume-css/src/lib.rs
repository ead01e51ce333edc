//! Selector parsing, rule indexing, matching and cascade for the Plume style
//! engine.
//!
//! # Scope
//!
//! This crate implements:
//! - **Selectors**
//!   - Universal, type, id, class, attribute and pseudo-class selectors
//!   - Sequences (`button.primary:pressed`)
//!   - Descendant and child combinators, matched right to left with
//!     backtracking
//!   - Packed specificity and index rarity per selector kind
//!
//! - **Index**
//!   - `SelectorsMap`: id, class and type buckets plus a universal bucket
//!   - `VisualStateMap`: `key:state` rules keyed by state name
//!   - Change tracking for attribute and pseudo-class dependencies
//!
//! - **Cascade**
//!   - Ordering by specificity, then document order
//!   - Inline declarations applied last
//!   - `StyleScope`: the current sheets and an immutable, swappable index
//!
//! - **Resolved styles**
//!   - A typed property sink for colors, sizes, opacity, font weight and
//!     visibility
//!
//! # Not Implemented
//!
//! - CSS text tokenizing; the engine consumes an already parsed rule AST
//! - Sibling combinators (`+`, `~`), rejected at parse time
//! - Pseudo-elements and functional pseudo-classes
//! - Property inheritance
//! - Incremental index updates

/// Applying matches and the style scope.
pub mod cascade;
/// Dependencies reported by change-tracking queries.
pub mod changes;
/// Engine configuration.
pub mod config;
/// Error types.
pub mod error;
/// Node and property-sink contracts.
pub mod node;
/// Rule sets and the rule AST.
pub mod rule_set;
/// Selector AST, parser and composer.
pub mod selector;
/// The selector index and query step.
pub mod selectors_map;
/// Resolved styles and typed values.
pub mod style;
/// The visual-state index.
pub mod visual_state;

// Re-exports for convenience
pub use cascade::{ApplyReport, StyleScope, TreeStyles, apply_inline, apply_matches};
pub use changes::{ChangeMap, Changes};
pub use config::StyleConfig;
pub use error::{PropertyApplicationError, PropertyError, SelectorError, StyleError};
pub use node::{PropertySink, StyleNode};
pub use rule_set::{AstDeclaration, AstNode, Declaration, RuleSet, RuleSetId};
pub use selector::{SelectorCore, SelectorKind, Specificity, create_selector};
pub use selectors_map::{MatchedSelector, SelectorsMap, SelectorsMatch};
pub use style::ResolvedStyle;
pub use visual_state::VisualStateMap;
