//! The closed set of selector shapes the index and pipeline work with.

use std::fmt;

use plume_common::warning::{error_once, warn_once};

use super::{
    Combinator, Compound, ParsedToken, Rarity, Selector, SelectorKind, SimpleSelector,
    SimpleSelectorSequence, Specificity, VisualStateSelector, parse_selector_tokens,
};
use crate::changes::ChangeMap;
use crate::error::SelectorError;
use crate::node::StyleNode;

/// Selector text that failed to compile. Matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSelector {
    /// The text as written.
    pub text: String,
    /// Why it was rejected.
    pub error: SelectorError,
}

/// Stands in for a node's own style declarations. Matches every node and
/// outranks any sheet selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InlineStyle;

/// Where a selector is filed in the index, taken from the head of its
/// subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexKey {
    /// Id bucket.
    Id(String),
    /// Class bucket.
    Class(String),
    /// Type bucket.
    Type(String),
    /// Universal bucket: every node is a candidate.
    Universal,
}

impl IndexKey {
    fn of(head: &SimpleSelector) -> Self {
        match head {
            SimpleSelector::Id(id) => Self::Id(id.clone()),
            SimpleSelector::Class(class) => Self::Class(class.clone()),
            SimpleSelector::Type(tag) => Self::Type(tag.clone()),
            SimpleSelector::Universal
            | SimpleSelector::Attribute(_)
            | SimpleSelector::PseudoClass(_) => Self::Universal,
        }
    }
}

/// A compiled selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorCore {
    /// A lone simple selector: `.btn`.
    Simple(SimpleSelector),
    /// One sequence: `button.primary`.
    Sequence(SimpleSelectorSequence),
    /// Sequences joined by combinators: `section > .row`.
    Complex(Selector),
    /// Text that failed to compile.
    Invalid(InvalidSelector),
    /// A node's inline style.
    Inline(InlineStyle),
    /// A `key:state` selector served by the visual-state map.
    VisualState(VisualStateSelector),
}

impl SelectorCore {
    /// The selector kind.
    #[must_use]
    pub const fn kind(&self) -> SelectorKind {
        match self {
            Self::Simple(selector) => selector.kind(),
            Self::Sequence(_) => SelectorKind::Sequence,
            Self::Complex(_) => SelectorKind::Complex,
            Self::Invalid(_) => SelectorKind::Invalid,
            Self::Inline(_) => SelectorKind::Inline,
            Self::VisualState(_) => SelectorKind::VisualState,
        }
    }

    /// Selector weight.
    #[must_use]
    pub const fn specificity(&self) -> Specificity {
        match self {
            Self::Simple(selector) => selector.specificity(),
            Self::Sequence(sequence) => sequence.specificity(),
            Self::Complex(selector) => selector.specificity(),
            Self::VisualState(selector) => selector.specificity(),
            Self::Invalid(_) | Self::Inline(_) => self.kind().metrics().specificity,
        }
    }

    /// Index rarity of the subject's head.
    #[must_use]
    pub fn rarity(&self) -> Rarity {
        match self {
            Self::Simple(selector) => selector.rarity(),
            Self::Sequence(sequence) => sequence.head().rarity(),
            Self::Complex(selector) => selector.subject().rarity(),
            Self::Invalid(_) | Self::Inline(_) | Self::VisualState(_) => Rarity::Unindexed,
        }
    }

    /// Whether the outcome depends on attributes or pseudo-states.
    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        match self {
            Self::Simple(selector) => selector.is_dynamic(),
            Self::Sequence(sequence) => sequence.is_dynamic(),
            Self::Complex(selector) => selector.is_dynamic(),
            Self::VisualState(_) => true,
            Self::Invalid(_) | Self::Inline(_) => false,
        }
    }

    /// Whether this selector compiled.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid(_))
    }

    /// Full match against `node`.
    #[must_use]
    pub fn matches<N: StyleNode>(&self, node: &N) -> bool {
        match self {
            Self::Simple(selector) => selector.matches(node),
            Self::Sequence(sequence) => sequence.matches(node),
            Self::Complex(selector) => selector.matches(node),
            Self::VisualState(selector) => selector.matches(node),
            Self::Invalid(_) => false,
            Self::Inline(_) => true,
        }
    }

    /// Match against `node` with attribute and pseudo-class tests treated
    /// as satisfied.
    #[must_use]
    pub fn may_match<N: StyleNode>(&self, node: &N) -> bool {
        match self {
            Self::Simple(selector) => selector.may_match(node),
            Self::Sequence(sequence) => sequence.may_match(node),
            Self::Complex(selector) => selector.may_match(node),
            Self::VisualState(selector) => selector.may_match(node),
            Self::Invalid(_) => false,
            Self::Inline(_) => true,
        }
    }

    /// Record which attributes and pseudo-classes, on which nodes, can
    /// change whether this selector matches `node`.
    pub fn track_changes<N: StyleNode>(&self, node: &N, changes: &mut ChangeMap<N::Key>) {
        match self {
            Self::Simple(selector) => {
                if selector.may_match(node) {
                    selector.track(node, changes);
                }
            }
            Self::Sequence(sequence) => {
                if sequence.may_match(node) {
                    sequence.track(node, changes);
                }
            }
            Self::Complex(selector) => selector.track_changes(node, changes),
            Self::VisualState(selector) => selector.track_changes(node, changes),
            Self::Invalid(_) | Self::Inline(_) => {}
        }
    }

    /// Where this selector is filed in the index. `None` for selectors the
    /// index never holds.
    #[must_use]
    pub fn index_key(&self) -> Option<IndexKey> {
        match self {
            Self::Simple(selector) => Some(IndexKey::of(selector)),
            Self::Sequence(sequence) => Some(IndexKey::of(sequence.head())),
            Self::Complex(selector) => Some(IndexKey::of(selector.subject().head())),
            Self::Invalid(_) | Self::Inline(_) | Self::VisualState(_) => None,
        }
    }
}

impl fmt::Display for SelectorCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple(selector) => fmt::Display::fmt(selector, f),
            Self::Sequence(sequence) => fmt::Display::fmt(sequence, f),
            Self::Complex(selector) => fmt::Display::fmt(selector, f),
            Self::VisualState(selector) => fmt::Display::fmt(selector, f),
            Self::Invalid(invalid) => f.write_str(&invalid.text),
            Self::Inline(_) => f.write_str("style"),
        }
    }
}

/// Group a token stream into sequences and chain them, subject first.
///
/// A single-member group is stored unwrapped, and a selector with one group
/// comes back as [`SelectorCore::Simple`] or [`SelectorCore::Sequence`].
/// Returns `None` for an empty stream or one whose later groups lack a
/// combinator.
#[must_use]
pub fn compose(tokens: Vec<ParsedToken>) -> Option<SelectorCore> {
    let mut groups: Vec<(Option<Combinator>, Vec<SimpleSelector>)> = Vec::new();
    for token in tokens {
        match (token.combinator, groups.last_mut()) {
            (None, Some((_, group))) => group.push(token.selector),
            (combinator, _) => groups.push((combinator, vec![token.selector])),
        }
    }

    let mut groups = groups.into_iter().rev();
    let (mut link, subject) = groups.next()?;
    let subject = Compound::from_group(subject)?;
    let mut ancestors = Vec::new();
    for (combinator, group) in groups {
        ancestors.push((link?, Compound::from_group(group)?));
        link = combinator;
    }

    Some(match (subject, ancestors.is_empty()) {
        (Compound::Simple(selector), true) => SelectorCore::Simple(selector),
        (Compound::Sequence(sequence), true) => SelectorCore::Sequence(sequence),
        (subject, false) => SelectorCore::Complex(Selector::new(subject, ancestors)),
    })
}

/// Compile selector text.
///
/// Never fails: text that does not parse becomes
/// [`SelectorCore::Invalid`], reported once through the warning log so one
/// bad selector never takes the rest of a sheet down with it.
#[must_use]
pub fn create_selector(text: &str) -> SelectorCore {
    let error = match parse_selector_tokens(text).map(compose) {
        Ok(Some(core)) => return core,
        Ok(None) => SelectorError::syntax(text, "empty selector"),
        Err(error) => error,
    };
    if error.is_unsupported() {
        let _ = error_once("Selector", &error.to_string());
    } else {
        let _ = warn_once("Selector", &error.to_string());
    }
    SelectorCore::Invalid(InvalidSelector {
        text: text.to_string(),
        error,
    })
}
