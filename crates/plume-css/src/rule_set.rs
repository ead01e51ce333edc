//! Rule sets and the rule AST they are built from.
//!
//! The engine does not tokenize CSS text. It consumes the rule AST a CSS
//! parser produces: a list of nodes tagged by `type`, where `rule` nodes
//! carry their selector group (already split on commas) and their
//! declarations. Everything else is skipped.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::selector::{SelectorCore, create_selector};

/// One top-level node of a parsed style sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AstNode {
    /// A qualified rule.
    Rule {
        /// Selector group, one entry per comma-separated selector.
        selectors: Vec<String>,
        /// Declarations and comments in source order.
        #[serde(default)]
        declarations: Vec<AstDeclaration>,
    },
    /// A comment between rules.
    Comment {
        /// Comment text.
        #[serde(default)]
        comment: String,
    },
    /// At-rules and anything else the engine does not consume.
    #[serde(other)]
    Other,
}

/// One entry of a rule's declaration block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AstDeclaration {
    /// `property: value`
    Declaration {
        /// Property name.
        property: String,
        /// Raw value text.
        value: String,
    },
    /// A comment inside the block.
    Comment {
        /// Comment text.
        #[serde(default)]
        comment: String,
    },
    /// Anything else.
    #[serde(other)]
    Other,
}

/// A `property: value` pair. The value is opaque to the engine; only the
/// property sink interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Declaration {
    /// Property name.
    pub property: String,
    /// Raw value text.
    pub value: String,
}

impl Declaration {
    /// Create a declaration.
    #[must_use]
    pub fn new(property: &str, value: &str) -> Self {
        Self {
            property: property.to_string(),
            value: value.to_string(),
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {};", self.property, self.value)
    }
}

/// Index of a rule set within a [`SelectorsMap`](crate::SelectorsMap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleSetId(pub usize);

/// Selectors sharing one declaration block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    /// Compiled selectors in source order. Invalid ones are kept so
    /// diagnostics can name them.
    pub selectors: Vec<SelectorCore>,
    /// Declarations in source order.
    pub declarations: Vec<Declaration>,
}

impl RuleSet {
    /// Create a rule set from compiled selectors.
    #[must_use]
    pub const fn new(selectors: Vec<SelectorCore>, declarations: Vec<Declaration>) -> Self {
        Self {
            selectors,
            declarations,
        }
    }

    /// Compile each selector text and pair them with `declarations`.
    #[must_use]
    pub fn parse<S: AsRef<str>>(selectors: &[S], declarations: Vec<Declaration>) -> Self {
        Self::new(
            selectors.iter().map(|s| create_selector(s.as_ref())).collect(),
            declarations,
        )
    }

    /// Build rule sets from the `rule` nodes of a rule AST, in order.
    #[must_use]
    pub fn from_ast(nodes: &[AstNode]) -> Vec<Self> {
        nodes
            .iter()
            .filter_map(|node| match node {
                AstNode::Rule {
                    selectors,
                    declarations,
                } => Some(Self::parse(
                    selectors.as_slice(),
                    declarations
                        .iter()
                        .filter_map(|entry| match entry {
                            AstDeclaration::Declaration { property, value } => {
                                Some(Declaration::new(property, value))
                            }
                            AstDeclaration::Comment { .. } | AstDeclaration::Other => None,
                        })
                        .collect(),
                )),
                AstNode::Comment { .. } | AstNode::Other => None,
            })
            .collect()
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, selector) in self.selectors.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{selector}")?;
        }
        f.write_str(" {")?;
        for declaration in &self.declarations {
            write!(f, " {declaration}")?;
        }
        f.write_str(" }")
    }
}
