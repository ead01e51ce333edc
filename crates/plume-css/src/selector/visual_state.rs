//! `key:state` selectors.
//!
//! A visual-state selector names a node (by id, class, type, `type.class`
//! or an attribute test) and a pseudo-state. The visual-state map files
//! them by state so a view can ask which rules would apply if it entered
//! that state, without re-running the whole query.

use std::fmt;

use super::{AttributeSelector, SelectorCore, SimpleSelector, Specificity, parse_selector_tokens};
use crate::changes::ChangeMap;
use crate::error::SelectorError;
use crate::node::StyleNode;

/// The node part of a visual-state selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StateQualifier {
    /// `#id:state`
    Id(String),
    /// `.class:state`
    Class(String),
    /// `type:state`
    Type(String),
    /// `type.class:state`. Only accepted as a visual-state key.
    TypeClass {
        /// Normalized type tag.
        type_tag: String,
        /// Class name.
        class: String,
    },
    /// `[attr...]:state`
    Attribute(AttributeSelector),
}

impl StateQualifier {
    /// Specificity of the qualifier alone.
    #[must_use]
    pub const fn specificity(&self) -> Specificity {
        match self {
            Self::Id(_) => Specificity::ID,
            Self::Class(_) | Self::Attribute(_) => Specificity::CLASS,
            Self::Type(_) => Specificity::TYPE,
            Self::TypeClass { .. } => Specificity(Specificity::CLASS.0 + Specificity::TYPE.0),
        }
    }

    /// Test the qualifier against `node`.
    #[must_use]
    pub fn matches<N: StyleNode>(&self, node: &N) -> bool {
        match self {
            Self::Id(id) => node.id() == Some(id.as_str()),
            Self::Class(class) => node.has_class(class),
            Self::Type(tag) => node.type_tag() == tag,
            Self::TypeClass { type_tag, class } => {
                node.type_tag() == type_tag && node.has_class(class)
            }
            Self::Attribute(attr) => attr.matches_value(node.attribute(&attr.name)),
        }
    }

    fn from_selectors(selectors: &[SimpleSelector]) -> Option<Self> {
        Some(match selectors {
            [SimpleSelector::Id(id)] => Self::Id(id.clone()),
            [SimpleSelector::Class(class)] => Self::Class(class.clone()),
            [SimpleSelector::Type(tag)] => Self::Type(tag.clone()),
            [SimpleSelector::Type(tag), SimpleSelector::Class(class)] => Self::TypeClass {
                type_tag: tag.clone(),
                class: class.clone(),
            },
            [SimpleSelector::Attribute(attr)] => Self::Attribute(attr.clone()),
            _ => return None,
        })
    }
}

impl fmt::Display for StateQualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Class(class) => write!(f, ".{class}"),
            Self::Type(tag) => f.write_str(tag),
            Self::TypeClass { type_tag, class } => write!(f, "{type_tag}.{class}"),
            Self::Attribute(attr) => fmt::Display::fmt(attr, f),
        }
    }
}

/// A `key:state` selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VisualStateSelector {
    qualifier: StateQualifier,
    state: String,
    specificity: Specificity,
}

impl VisualStateSelector {
    /// Build from a qualifier and a state name.
    #[must_use]
    pub fn new(qualifier: StateQualifier, state: &str) -> Self {
        Self {
            specificity: qualifier.specificity() + Specificity::CLASS,
            qualifier,
            state: state.to_string(),
        }
    }

    /// Recognize a compiled selector of the form `key:state`.
    #[must_use]
    pub fn from_core(core: &SelectorCore) -> Option<Self> {
        let SelectorCore::Sequence(sequence) = core else {
            return None;
        };
        let (SimpleSelector::PseudoClass(state), key) = sequence.selectors().split_last()? else {
            return None;
        };
        StateQualifier::from_selectors(key).map(|qualifier| Self::new(qualifier, state))
    }

    /// The node part.
    #[must_use]
    pub const fn qualifier(&self) -> &StateQualifier {
        &self.qualifier
    }

    /// The state name.
    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Qualifier plus one pseudo-class.
    #[must_use]
    pub const fn specificity(&self) -> Specificity {
        self.specificity
    }

    /// Whether the rule would apply to `node` once it is in this state.
    #[must_use]
    pub fn applies_in_state<N: StyleNode>(&self, node: &N) -> bool {
        self.qualifier.matches(node)
    }

    /// Whether `node` matches the qualifier and is in the state now.
    #[must_use]
    pub fn matches<N: StyleNode>(&self, node: &N) -> bool {
        self.qualifier.matches(node) && node.has_pseudo_class(&self.state)
    }

    /// Qualifier match with attribute tests treated as satisfied.
    #[must_use]
    pub fn may_match<N: StyleNode>(&self, node: &N) -> bool {
        matches!(self.qualifier, StateQualifier::Attribute(_)) || self.qualifier.matches(node)
    }

    /// Record the state (and an attribute qualifier) against `node`.
    pub fn track_changes<N: StyleNode>(&self, node: &N, changes: &mut ChangeMap<N::Key>) {
        if !self.may_match(node) {
            return;
        }
        if let StateQualifier::Attribute(attr) = &self.qualifier {
            changes.add_attribute(node.key(), &attr.name);
        }
        changes.add_pseudo_class(node.key(), &self.state);
    }
}

impl fmt::Display for VisualStateSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.qualifier, self.state)
    }
}

/// Parse `key:state` text.
///
/// # Errors
///
/// Returns the parser's error for malformed text and a
/// [`SelectorError::Syntax`] for a well-formed selector of another shape.
pub fn parse_visual_state(text: &str) -> Result<VisualStateSelector, SelectorError> {
    let tokens = parse_selector_tokens(text)?;
    super::compose(tokens)
        .as_ref()
        .and_then(VisualStateSelector::from_core)
        .ok_or_else(|| {
            SelectorError::syntax(
                text,
                "expected '#id', '.class', 'type', 'type.class' or '[attr]' followed by one ':state'",
            )
        })
}
