//! Selector text to token stream.
//!
//! The grammar is deliberately small: simple selectors, attribute tests,
//! pseudo-classes and the descendant and child combinators. Anything else
//! is an error for this one selector.

use std::iter::Peekable;
use std::str::Chars;

use super::{AttributeOperator, AttributeSelector, AttributeTest, Combinator, SimpleSelector};
use crate::error::SelectorError;

/// One simple selector of a parsed selector, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedToken {
    /// The simple selector.
    pub selector: SimpleSelector,
    /// The combinator before this token when it starts a new sequence.
    /// `None` for the first token and for tokens continuing a sequence.
    pub combinator: Option<Combinator>,
}

/// Check if a character can start a type name.
const fn is_ident_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-' || !c.is_ascii()
}

/// Check if a character can continue a name.
const fn is_ident_char(c: char) -> bool {
    is_ident_start_char(c) || c.is_ascii_digit()
}

struct SelectorParser<'a> {
    text: &'a str,
    chars: Peekable<Chars<'a>>,
    tokens: Vec<ParsedToken>,
    /// Combinator seen since the last simple selector.
    pending: Option<Combinator>,
    /// Whether the next simple selector continues the current sequence.
    in_sequence: bool,
}

impl<'a> SelectorParser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            chars: text.chars().peekable(),
            tokens: Vec::new(),
            pending: None,
            in_sequence: false,
        }
    }

    fn error(&self, message: impl Into<String>) -> SelectorError {
        SelectorError::syntax(self.text, message)
    }

    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            let _ = self.chars.next();
        }
    }

    fn read_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(&c) = self.chars.peek() {
            if !is_ident_char(c) {
                break;
            }
            name.push(c);
            let _ = self.chars.next();
        }
        name
    }

    fn push(&mut self, selector: SimpleSelector) {
        let combinator = if self.in_sequence {
            None
        } else {
            self.pending.take()
        };
        self.tokens.push(ParsedToken {
            selector,
            combinator,
        });
        self.pending = None;
        self.in_sequence = true;
    }

    fn parse(mut self) -> Result<Vec<ParsedToken>, SelectorError> {
        while let Some(&c) = self.chars.peek() {
            match c {
                c if c.is_whitespace() => {
                    self.skip_whitespace();
                    if !self.tokens.is_empty() && self.pending.is_none() {
                        self.pending = Some(Combinator::Descendant);
                    }
                    self.in_sequence = false;
                }
                '>' => {
                    let _ = self.chars.next();
                    if self.tokens.is_empty() {
                        return Err(self.error("selector starts with combinator '>'"));
                    }
                    if self.pending == Some(Combinator::Child) {
                        return Err(self.error("doubled combinator '>'"));
                    }
                    self.pending = Some(Combinator::Child);
                    self.in_sequence = false;
                }
                '+' | '~' => {
                    return Err(SelectorError::UnsupportedCombinator {
                        selector: self.text.to_string(),
                        combinator: c,
                    });
                }
                ',' => {
                    return Err(self.error("selector groups must be split before parsing"));
                }
                '*' => {
                    let _ = self.chars.next();
                    if self.in_sequence {
                        return Err(self.error("'*' may only start a sequence"));
                    }
                    self.push(SimpleSelector::Universal);
                }
                '.' => {
                    let _ = self.chars.next();
                    let name = self.read_name();
                    if name.is_empty() {
                        return Err(self.error("expected class name after '.'"));
                    }
                    self.push(SimpleSelector::Class(name));
                }
                '#' => {
                    let _ = self.chars.next();
                    let name = self.read_name();
                    if name.is_empty() {
                        return Err(self.error("expected id after '#'"));
                    }
                    self.push(SimpleSelector::Id(name));
                }
                ':' => {
                    let _ = self.chars.next();
                    if self.chars.peek() == Some(&':') {
                        return Err(self.error("pseudo-elements are not supported"));
                    }
                    let name = self.read_name();
                    if name.is_empty() {
                        return Err(self.error("expected pseudo-class name after ':'"));
                    }
                    if self.chars.peek() == Some(&'(') {
                        return Err(self.error(format!(
                            "functional pseudo-class ':{name}()' is not supported"
                        )));
                    }
                    self.push(SimpleSelector::PseudoClass(name));
                }
                '[' => {
                    let _ = self.chars.next();
                    let attribute = self.parse_attribute()?;
                    self.push(SimpleSelector::Attribute(attribute));
                }
                c if is_ident_start_char(c) => {
                    if self.in_sequence {
                        return Err(self.error("a type selector may only start a sequence"));
                    }
                    let name = self.read_name();
                    self.push(SimpleSelector::type_selector(&name));
                }
                c => return Err(self.error(format!("unexpected character '{c}'"))),
            }
        }

        if self.tokens.is_empty() {
            return Err(self.error("empty selector"));
        }
        if self.pending == Some(Combinator::Child) {
            return Err(self.error("dangling combinator '>'"));
        }
        Ok(self.tokens)
    }

    /// Parse the inside of `[...]`, the opening bracket already consumed.
    fn parse_attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        self.skip_whitespace();
        let name = self.read_name();
        if name.is_empty() {
            return match self.chars.peek() {
                None => Err(self.error("unterminated attribute selector")),
                Some(_) => Err(self.error("expected attribute name after '['")),
            };
        }
        self.skip_whitespace();

        let operator = match self.chars.next() {
            None => return Err(self.error("unterminated attribute selector")),
            Some(']') => return Ok(AttributeSelector { name, test: None }),
            Some('=') => AttributeOperator::Equals,
            Some(c @ ('~' | '|' | '^' | '$' | '*')) => {
                if self.chars.next() != Some('=') {
                    return Err(self.error(format!("expected '=' after '{c}' in attribute selector")));
                }
                match c {
                    '~' => AttributeOperator::Includes,
                    '|' => AttributeOperator::DashMatch,
                    '^' => AttributeOperator::Prefix,
                    '$' => AttributeOperator::Suffix,
                    _ => AttributeOperator::Substring,
                }
            }
            Some(c) => {
                return Err(self.error(format!("unexpected character '{c}' in attribute selector")));
            }
        };
        self.skip_whitespace();

        let value = match self.chars.peek() {
            Some(&quote @ ('"' | '\'')) => {
                let _ = self.chars.next();
                let value = self.read_quoted(quote)?;
                self.skip_whitespace();
                match self.chars.next() {
                    Some(']') => value,
                    None => return Err(self.error("unterminated attribute selector")),
                    Some(c) => {
                        return Err(self.error(format!(
                            "expected ']' after attribute value, found '{c}'"
                        )));
                    }
                }
            }
            _ => {
                let mut raw = String::new();
                loop {
                    match self.chars.next() {
                        None => return Err(self.error("unterminated attribute selector")),
                        Some(']') => break,
                        Some(c) => raw.push(c),
                    }
                }
                let value = raw.trim();
                if value.is_empty() {
                    return Err(self.error(format!("expected value after '{operator}'")));
                }
                value.to_string()
            }
        };

        Ok(AttributeSelector {
            name,
            test: Some(AttributeTest { operator, value }),
        })
    }

    /// Read a quoted string, the opening quote already consumed. A
    /// backslash escapes the next character.
    fn read_quoted(&mut self, quote: char) -> Result<String, SelectorError> {
        let mut value = String::new();
        while let Some(c) = self.chars.next() {
            match c {
                '\\' => match self.chars.next() {
                    Some(escaped) => value.push(escaped),
                    None => break,
                },
                c if c == quote => return Ok(value),
                c => value.push(c),
            }
        }
        Err(self.error("unterminated quoted string"))
    }
}

/// Parse one selector (no `,` groups) into simple-selector tokens.
///
/// # Errors
///
/// Returns [`SelectorError::Syntax`] for malformed text and
/// [`SelectorError::UnsupportedCombinator`] for `+` and `~`.
pub fn parse_selector_tokens(text: &str) -> Result<Vec<ParsedToken>, SelectorError> {
    SelectorParser::new(text).parse()
}
