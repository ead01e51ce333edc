//! Selector AST and matchers.
//!
//! A selector is compiled in two steps: [`parse_selector_tokens`] turns text
//! into a flat token stream, then [`compose`] groups the tokens into
//! sequences and chains them with combinators. The result is a
//! [`SelectorCore`], the closed set of selector shapes the index and the
//! query pipeline work with.
//!
//! All selector values are immutable after construction. Specificity is
//! computed once when a selector is built and cached on it.

mod compose;
mod parser;
mod variant;
mod visual_state;

use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use plume_common::type_name::normalize_type_name;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::changes::ChangeMap;
use crate::node::StyleNode;

pub use compose::{Compound, Selector, SimpleSelectorSequence};
pub use parser::{ParsedToken, parse_selector_tokens};
pub use variant::{
    IndexKey, InlineStyle, InvalidSelector, SelectorCore, compose, create_selector,
};
pub use visual_state::{StateQualifier, VisualStateSelector, parse_visual_state};

/// Selector weight. Higher wins; ties are broken by document order.
///
/// A single packed number: ids count in the third byte, classes, attributes
/// and pseudo-classes in the second, types in the first. Inline styles sit
/// above anything a sheet can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Specificity(pub u32);

impl Specificity {
    /// Universal selector, invalid selectors.
    pub const ZERO: Self = Self(0);
    /// One type selector.
    pub const TYPE: Self = Self(0x1);
    /// One class, attribute or pseudo-class selector.
    pub const CLASS: Self = Self(0x100);
    /// One id selector.
    pub const ID: Self = Self(0x1_0000);
    /// Inline style declarations.
    pub const INLINE: Self = Self(0x0100_0000);
}

impl Add for Specificity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Specificity {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Specificity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// How selective a simple selector is, used only to choose the index
/// bucket a selector is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Rarity {
    /// Attribute, pseudo-class and universal selectors: universal bucket.
    #[default]
    Unindexed = 0,
    /// Type selectors.
    Type = 1,
    /// Class selectors.
    Class = 2,
    /// Id selectors.
    Id = 3,
}

/// The kind of a selector, for diagnostics and the metrics table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
pub enum SelectorKind {
    /// `*`
    #[strum(serialize = "UniversalSelector")]
    Universal,
    /// `#id`
    #[strum(serialize = "IdSelector")]
    Id,
    /// `type`
    #[strum(serialize = "TypeSelector")]
    Type,
    /// `.class`
    #[strum(serialize = "ClassSelector")]
    Class,
    /// `[name op value]`
    #[strum(serialize = "AttributeSelector")]
    Attribute,
    /// `:state`
    #[strum(serialize = "PseudoClassSelector")]
    PseudoClass,
    /// Several simple selectors on one node.
    #[strum(serialize = "SimpleSelectorSequence")]
    Sequence,
    /// Sequences chained by combinators.
    #[strum(serialize = "Selector")]
    Complex,
    /// Text that failed to compile.
    #[strum(serialize = "InvalidSelector")]
    Invalid,
    /// A node's own style declarations.
    #[strum(serialize = "InlineStyleSelector")]
    Inline,
    /// `key:state` looked up by state name.
    #[strum(serialize = "VisualStateSelector")]
    VisualState,
}

/// Fixed weight and rarity of one selector kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindMetrics {
    /// Base specificity. Composite kinds sum their parts instead.
    pub specificity: Specificity,
    /// Index rarity. Composite kinds take it from their head.
    pub rarity: Rarity,
}

impl SelectorKind {
    /// Constant metrics for this kind.
    #[must_use]
    pub const fn metrics(self) -> KindMetrics {
        let (specificity, rarity) = match self {
            Self::Id => (Specificity::ID, Rarity::Id),
            Self::Class => (Specificity::CLASS, Rarity::Class),
            Self::Type => (Specificity::TYPE, Rarity::Type),
            Self::Attribute | Self::PseudoClass => (Specificity::CLASS, Rarity::Unindexed),
            Self::Inline => (Specificity::INLINE, Rarity::Unindexed),
            Self::Universal
            | Self::Sequence
            | Self::Complex
            | Self::Invalid
            | Self::VisualState => (Specificity::ZERO, Rarity::Unindexed),
        };
        KindMetrics {
            specificity,
            rarity,
        }
    }
}

/// Attribute value operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
pub enum AttributeOperator {
    /// `[a=v]`: exact value.
    #[strum(serialize = "=")]
    Equals,
    /// `[a~=v]`: one of the whitespace-separated words.
    #[strum(serialize = "~=")]
    Includes,
    /// `[a|=v]`: exactly `v` or starting with `v-`.
    #[strum(serialize = "|=")]
    DashMatch,
    /// `[a^=v]`: starts with.
    #[strum(serialize = "^=")]
    Prefix,
    /// `[a$=v]`: ends with.
    #[strum(serialize = "$=")]
    Suffix,
    /// `[a*=v]`: contains.
    #[strum(serialize = "*=")]
    Substring,
}

impl AttributeOperator {
    /// Test an attribute value against the selector's expected value.
    ///
    /// An empty expected value never matches the word, prefix, suffix and
    /// substring operators.
    #[must_use]
    pub fn test(self, actual: &str, expected: &str) -> bool {
        match self {
            Self::Equals => actual == expected,
            Self::Includes => {
                !expected.is_empty()
                    && !expected.contains(char::is_whitespace)
                    && actual.split_whitespace().any(|word| word == expected)
            }
            Self::DashMatch => {
                actual == expected
                    || actual
                        .strip_prefix(expected)
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            Self::Prefix => !expected.is_empty() && actual.starts_with(expected),
            Self::Suffix => !expected.is_empty() && actual.ends_with(expected),
            Self::Substring => !expected.is_empty() && actual.contains(expected),
        }
    }
}

/// Operator and value of an attribute selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeTest {
    /// The operator.
    pub operator: AttributeOperator,
    /// The expected value, unquoted.
    pub value: String,
}

/// `[name]` or `[name op value]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeSelector {
    /// Attribute name.
    pub name: String,
    /// Value test; `None` tests for presence only.
    pub test: Option<AttributeTest>,
}

impl AttributeSelector {
    /// Test the node's value for this attribute (`None` if absent).
    #[must_use]
    pub fn matches_value(&self, actual: Option<&str>) -> bool {
        match (actual, &self.test) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(actual), Some(test)) => test.operator.test(actual, &test.value),
        }
    }
}

impl fmt::Display for AttributeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.test {
            None => write!(f, "[{}]", self.name),
            Some(test) if test.value.is_empty() || test.value.contains([' ', '\t', '\n', ']']) => {
                write!(
                    f,
                    "[{}{}\"{}\"]",
                    self.name,
                    test.operator,
                    test.value.replace('"', "\\\"")
                )
            }
            Some(test) => write!(f, "[{}{}{}]", self.name, test.operator, test.value),
        }
    }
}

/// A single condition on one node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimpleSelector {
    /// `*`: any node.
    Universal,
    /// `#name`: the node id.
    Id(String),
    /// `name`: the normalized type tag. Build with
    /// [`SimpleSelector::type_selector`] so the name is normalized.
    Type(String),
    /// `.name`: one of the node's classes.
    Class(String),
    /// `[...]`: an attribute test.
    Attribute(AttributeSelector),
    /// `:name`: a pseudo-state the node is currently in.
    PseudoClass(String),
}

impl SimpleSelector {
    /// A type selector. The name goes through the same normalization as
    /// node type tags.
    #[must_use]
    pub fn type_selector(name: &str) -> Self {
        Self::Type(normalize_type_name(name))
    }

    /// The selector kind.
    #[must_use]
    pub const fn kind(&self) -> SelectorKind {
        match self {
            Self::Universal => SelectorKind::Universal,
            Self::Id(_) => SelectorKind::Id,
            Self::Type(_) => SelectorKind::Type,
            Self::Class(_) => SelectorKind::Class,
            Self::Attribute(_) => SelectorKind::Attribute,
            Self::PseudoClass(_) => SelectorKind::PseudoClass,
        }
    }

    /// Specificity of this simple selector.
    #[must_use]
    pub const fn specificity(&self) -> Specificity {
        self.kind().metrics().specificity
    }

    /// Index rarity of this simple selector.
    #[must_use]
    pub const fn rarity(&self) -> Rarity {
        self.kind().metrics().rarity
    }

    /// Whether the outcome can change without the tree changing shape.
    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        matches!(self, Self::Attribute(_) | Self::PseudoClass(_))
    }

    /// Test this selector against one node.
    #[must_use]
    pub fn matches<N: StyleNode>(&self, node: &N) -> bool {
        match self {
            Self::Universal => true,
            Self::Id(id) => node.id() == Some(id.as_str()),
            Self::Type(tag) => node.type_tag() == tag,
            Self::Class(class) => node.has_class(class),
            Self::Attribute(attr) => attr.matches_value(node.attribute(&attr.name)),
            Self::PseudoClass(pseudo) => node.has_pseudo_class(pseudo),
        }
    }

    /// Like [`matches`](Self::matches), with dynamic tests treated as
    /// satisfied.
    #[must_use]
    pub fn may_match<N: StyleNode>(&self, node: &N) -> bool {
        self.is_dynamic() || self.matches(node)
    }

    /// Record what this selector depends on at `node`, if it is dynamic.
    pub fn track<N: StyleNode>(&self, node: &N, changes: &mut ChangeMap<N::Key>) {
        match self {
            Self::Attribute(attr) => changes.add_attribute(node.key(), &attr.name),
            Self::PseudoClass(pseudo) => changes.add_pseudo_class(node.key(), pseudo),
            Self::Universal | Self::Id(_) | Self::Type(_) | Self::Class(_) => {}
        }
    }
}

impl fmt::Display for SimpleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Universal => f.write_str("*"),
            Self::Id(id) => write!(f, "#{id}"),
            Self::Type(tag) => f.write_str(tag),
            Self::Class(class) => write!(f, ".{class}"),
            Self::Attribute(attr) => fmt::Display::fmt(attr, f),
            Self::PseudoClass(pseudo) => write!(f, ":{pseudo}"),
        }
    }
}

/// Relationship between two sequences of a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
pub enum Combinator {
    /// `A > B`: B's parent matches A.
    #[strum(serialize = ">")]
    Child,
    /// `A B`: some ancestor of B matches A.
    #[strum(serialize = " ")]
    Descendant,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specificity_weights() {
        assert_eq!(SimpleSelector::Id("a".into()).specificity(), Specificity(0x10000));
        assert_eq!(SimpleSelector::Class("a".into()).specificity(), Specificity(0x100));
        assert_eq!(SimpleSelector::PseudoClass("a".into()).specificity(), Specificity(0x100));
        assert_eq!(SimpleSelector::type_selector("a").specificity(), Specificity(1));
        assert_eq!(SimpleSelector::Universal.specificity(), Specificity::ZERO);
    }

    #[test]
    fn test_rarity_order() {
        assert!(Rarity::Id > Rarity::Class);
        assert!(Rarity::Class > Rarity::Type);
        assert!(Rarity::Type > Rarity::Unindexed);
        assert_eq!(
            SimpleSelector::PseudoClass("hover".into()).rarity(),
            Rarity::Unindexed
        );
    }

    #[test]
    fn test_type_selector_is_normalized() {
        assert_eq!(
            SimpleSelector::type_selector("List-View"),
            SimpleSelector::Type("listview".into())
        );
    }

    #[test]
    fn test_attribute_operators() {
        use AttributeOperator as Op;
        assert!(Op::Equals.test("a", "a"));
        assert!(!Op::Equals.test("ab", "a"));
        assert!(Op::Includes.test("one two", "two"));
        assert!(!Op::Includes.test("one two", "tw"));
        assert!(!Op::Includes.test("one two", ""));
        assert!(Op::DashMatch.test("en", "en"));
        assert!(Op::DashMatch.test("en-US", "en"));
        assert!(!Op::DashMatch.test("english", "en"));
        assert!(Op::Prefix.test("Hello World", "Hello"));
        assert!(Op::Suffix.test("Hello World", "World"));
        assert!(Op::Substring.test("Hello World", "lo W"));
        assert!(!Op::Prefix.test("x", ""));
        assert!(!Op::Suffix.test("x", ""));
        assert!(!Op::Substring.test("x", ""));
    }

    #[test]
    fn test_operator_round_trips_through_strum() {
        assert_eq!("|=".parse::<AttributeOperator>(), Ok(AttributeOperator::DashMatch));
        assert_eq!(AttributeOperator::Substring.to_string(), "*=");
        assert!("!=".parse::<AttributeOperator>().is_err());
    }

    #[test]
    fn test_attribute_display_quotes_when_needed() {
        let attr = AttributeSelector {
            name: "title".into(),
            test: Some(AttributeTest {
                operator: AttributeOperator::Substring,
                value: "lo W".into(),
            }),
        };
        assert_eq!(attr.to_string(), "[title*=\"lo W\"]");

        let bare = AttributeSelector {
            name: "lang".into(),
            test: Some(AttributeTest {
                operator: AttributeOperator::DashMatch,
                value: "en".into(),
            }),
        };
        assert_eq!(bare.to_string(), "[lang|=en]");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(SelectorKind::Sequence.to_string(), "SimpleSelectorSequence");
        assert_eq!(SelectorKind::Complex.to_string(), "Selector");
        assert_eq!(SelectorKind::Inline.metrics().specificity, Specificity::INLINE);
    }
}
