//! Error types for selector compilation, index building and property
//! application.

use thiserror::Error;

/// A selector that could not be compiled.
///
/// Both variants are local to one selector: the rule set keeps the selector
/// as an [`InvalidSelector`](crate::selector::InvalidSelector) that matches
/// nothing, and the rest of the style sheet is unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// Malformed selector text (unterminated bracket, missing name, empty
    /// group member, ...).
    #[error("invalid selector '{selector}': {message}")]
    Syntax {
        /// The selector text as written.
        selector: String,
        /// What went wrong.
        message: String,
    },

    /// A sibling combinator (`+` or `~`). Only descendant and child
    /// combinators are evaluated.
    #[error(
        "unsupported combinator '{combinator}' in selector '{selector}' \
         (only descendant and '>' combinators are supported)"
    )]
    UnsupportedCombinator {
        /// The selector text as written.
        selector: String,
        /// The offending combinator character.
        combinator: char,
    },
}

impl SelectorError {
    /// Shorthand for a [`SelectorError::Syntax`].
    pub(crate) fn syntax(selector: &str, message: impl Into<String>) -> Self {
        Self::Syntax {
            selector: selector.to_string(),
            message: message.into(),
        }
    }

    /// Whether this error names syntax the engine refuses to evaluate, as
    /// opposed to a plain typo.
    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedCombinator { .. })
    }
}

/// Building a selector index failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
    /// Strict mode rejected a selector using an unsupported combinator.
    #[error("style sheet rejected: {0}")]
    Rejected(#[from] SelectorError),
}

/// Applying one declaration to a property sink failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    /// The sink has no setter for this property.
    #[error("unknown property '{property}'")]
    UnknownProperty {
        /// The property name as declared.
        property: String,
    },

    /// The setter exists but could not coerce the value.
    #[error("invalid value '{value}' for property '{property}': {reason}")]
    InvalidValue {
        /// The property name as declared.
        property: String,
        /// The raw declared value.
        value: String,
        /// Why coercion failed.
        reason: String,
    },
}

impl PropertyError {
    /// Shorthand for a [`PropertyError::InvalidValue`].
    #[must_use]
    pub fn invalid(property: &str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            property: property.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// A declaration that failed during the apply step, with the rule it came
/// from. Collected in [`ApplyReport`](crate::cascade::ApplyReport).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{origin}: {source}")]
pub struct PropertyApplicationError {
    /// Diagnostic description of the selector whose rule declared it.
    pub origin: String,
    /// The sink's error.
    pub source: PropertyError,
}
