//! Sequences and combinator chains.

use std::collections::HashSet;
use std::fmt;

use super::{Combinator, Rarity, SimpleSelector, Specificity};
use crate::changes::ChangeMap;
use crate::node::StyleNode;

/// Simple selectors that must all match the same node, e.g. `button.primary:pressed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleSelectorSequence {
    selectors: Vec<SimpleSelector>,
    head: usize,
    specificity: Specificity,
    dynamic: bool,
}

impl SimpleSelectorSequence {
    /// Build a sequence. Returns `None` for an empty list.
    #[must_use]
    pub fn new(selectors: Vec<SimpleSelector>) -> Option<Self> {
        let first = selectors.first()?;
        // First member with the highest rarity.
        let mut head = 0;
        let mut best = first.rarity();
        for (i, selector) in selectors.iter().enumerate().skip(1) {
            if selector.rarity() > best {
                head = i;
                best = selector.rarity();
            }
        }
        Some(Self {
            specificity: selectors.iter().map(SimpleSelector::specificity).sum(),
            dynamic: selectors.iter().any(SimpleSelector::is_dynamic),
            head,
            selectors,
        })
    }

    /// Members in source order.
    #[must_use]
    pub fn selectors(&self) -> &[SimpleSelector] {
        &self.selectors
    }

    /// The member used as the index key.
    #[must_use]
    pub fn head(&self) -> &SimpleSelector {
        &self.selectors[self.head]
    }

    /// Sum of the members' specificities.
    #[must_use]
    pub const fn specificity(&self) -> Specificity {
        self.specificity
    }

    /// Whether any member is dynamic.
    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Whether every member matches `node`.
    #[must_use]
    pub fn matches<N: StyleNode>(&self, node: &N) -> bool {
        self.selectors.iter().all(|s| s.matches(node))
    }

    /// Whether every static member matches `node`.
    #[must_use]
    pub fn may_match<N: StyleNode>(&self, node: &N) -> bool {
        self.selectors.iter().all(|s| s.may_match(node))
    }

    pub(crate) fn track<N: StyleNode>(&self, node: &N, changes: &mut ChangeMap<N::Key>) {
        for selector in &self.selectors {
            selector.track(node, changes);
        }
    }
}

impl fmt::Display for SimpleSelectorSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for selector in &self.selectors {
            write!(f, "{selector}")?;
        }
        Ok(())
    }
}

/// The part of a selector that applies to one node: a bare simple
/// selector or a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compound {
    /// One simple selector.
    Simple(SimpleSelector),
    /// Two or more simple selectors on the same node.
    Sequence(SimpleSelectorSequence),
}

impl Compound {
    /// Wrap a group of same-node selectors, unwrapping a single member.
    /// Returns `None` for an empty group.
    #[must_use]
    pub fn from_group(mut selectors: Vec<SimpleSelector>) -> Option<Self> {
        if selectors.len() == 1 {
            return selectors.pop().map(Self::Simple);
        }
        SimpleSelectorSequence::new(selectors).map(Self::Sequence)
    }

    /// The member used as the index key.
    #[must_use]
    pub fn head(&self) -> &SimpleSelector {
        match self {
            Self::Simple(selector) => selector,
            Self::Sequence(sequence) => sequence.head(),
        }
    }

    /// Specificity of this part.
    #[must_use]
    pub const fn specificity(&self) -> Specificity {
        match self {
            Self::Simple(selector) => selector.specificity(),
            Self::Sequence(sequence) => sequence.specificity(),
        }
    }

    /// Rarity of the head.
    #[must_use]
    pub fn rarity(&self) -> Rarity {
        self.head().rarity()
    }

    /// Whether this part contains a dynamic test.
    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        match self {
            Self::Simple(selector) => selector.is_dynamic(),
            Self::Sequence(sequence) => sequence.is_dynamic(),
        }
    }

    /// Test this part against one node.
    #[must_use]
    pub fn matches<N: StyleNode>(&self, node: &N) -> bool {
        match self {
            Self::Simple(selector) => selector.matches(node),
            Self::Sequence(sequence) => sequence.matches(node),
        }
    }

    /// Test the static members of this part against one node.
    #[must_use]
    pub fn may_match<N: StyleNode>(&self, node: &N) -> bool {
        match self {
            Self::Simple(selector) => selector.may_match(node),
            Self::Sequence(sequence) => sequence.may_match(node),
        }
    }

    pub(crate) fn track<N: StyleNode>(&self, node: &N, changes: &mut ChangeMap<N::Key>) {
        match self {
            Self::Simple(selector) => selector.track(node, changes),
            Self::Sequence(sequence) => sequence.track(node, changes),
        }
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple(selector) => fmt::Display::fmt(selector, f),
            Self::Sequence(sequence) => fmt::Display::fmt(sequence, f),
        }
    }
}

/// A chain of compounds joined by combinators, e.g. `section > .row label`.
///
/// Stored subject first. For `A > B C`:
/// - subject: `C`
/// - ancestors: `[(Descendant, B), (Child, A)]`
///
/// Each ancestor part carries the combinator relating it to the part
/// before it in this list (the subject for the first one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    subject: Compound,
    ancestors: Vec<(Combinator, Compound)>,
    specificity: Specificity,
    dynamic: bool,
}

impl Selector {
    /// Build a selector from its subject and its ancestor chain, nearest
    /// part first.
    #[must_use]
    pub fn new(subject: Compound, ancestors: Vec<(Combinator, Compound)>) -> Self {
        let specificity = subject.specificity()
            + ancestors
                .iter()
                .map(|(_, part)| part.specificity())
                .sum::<Specificity>();
        let dynamic = subject.is_dynamic() || ancestors.iter().any(|(_, part)| part.is_dynamic());
        Self {
            subject,
            ancestors,
            specificity,
            dynamic,
        }
    }

    /// The rightmost compound, tested against the styled node itself.
    #[must_use]
    pub const fn subject(&self) -> &Compound {
        &self.subject
    }

    /// The remaining compounds, nearest first.
    #[must_use]
    pub fn ancestors(&self) -> &[(Combinator, Compound)] {
        &self.ancestors
    }

    /// Sum of all parts' specificities.
    #[must_use]
    pub const fn specificity(&self) -> Specificity {
        self.specificity
    }

    /// Whether any part is dynamic.
    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Test the whole chain with `node` as the subject.
    ///
    /// A descendant part that matches the nearest candidate ancestor but
    /// cannot satisfy the rest of the chain there is retried on farther
    /// ancestors.
    #[must_use]
    pub fn matches<N: StyleNode>(&self, node: &N) -> bool {
        self.subject.matches(node)
            && match_chain(&self.ancestors, node, Compound::matches) == ChainMatch::Matched
    }

    /// Like [`matches`](Self::matches) with dynamic tests treated as
    /// satisfied.
    #[must_use]
    pub fn may_match<N: StyleNode>(&self, node: &N) -> bool {
        self.subject.may_match(node)
            && match_chain(&self.ancestors, node, Compound::may_match) == ChainMatch::Matched
    }

    /// Record the dynamic dependencies of this selector for subject `node`.
    ///
    /// Every node a part can statically match at is recorded, since any of
    /// them could become the one that completes the chain.
    pub fn track_changes<N: StyleNode>(&self, node: &N, changes: &mut ChangeMap<N::Key>) {
        if !self.dynamic || !self.subject.may_match(node) {
            return;
        }
        self.subject.track(node, changes);

        let mut frontier = vec![node.clone()];
        for (combinator, part) in &self.ancestors {
            let mut seen = HashSet::new();
            let mut next = Vec::new();
            for current in &frontier {
                let mut candidate = current.parent();
                while let Some(ancestor) = candidate {
                    if part.may_match(&ancestor) && seen.insert(ancestor.key()) {
                        part.track(&ancestor, changes);
                        next.push(ancestor.clone());
                    }
                    if *combinator == Combinator::Child {
                        break;
                    }
                    candidate = ancestor.parent();
                }
            }
            if next.is_empty() {
                return;
            }
            frontier = next;
        }
    }
}

/// Outcome of matching the rest of a chain from one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChainMatch {
    Matched,
    /// Failed here; a farther ancestor may still satisfy the enclosing
    /// descendant part.
    NotMatched,
    /// Ran out of ancestors. No farther starting point can match either.
    NotMatchedGlobally,
}

/// Walk `parts` upward from `node`, backtracking over descendant parts.
///
/// A descendant part that reaches the root without a match fails the whole
/// walk; closer ancestors of earlier parts are not retried.
fn match_chain<N, F>(parts: &[(Combinator, Compound)], node: &N, test: F) -> ChainMatch
where
    N: StyleNode,
    F: Fn(&Compound, &N) -> bool + Copy,
{
    let Some(((combinator, part), rest)) = parts.split_first() else {
        return ChainMatch::Matched;
    };
    match combinator {
        Combinator::Child => {
            let Some(parent) = node.parent() else {
                return ChainMatch::NotMatchedGlobally;
            };
            if test(part, &parent) {
                match_chain(rest, &parent, test)
            } else {
                ChainMatch::NotMatched
            }
        }
        Combinator::Descendant => {
            let mut candidate = node.parent();
            while let Some(ancestor) = candidate {
                if test(part, &ancestor) {
                    match match_chain(rest, &ancestor, test) {
                        ChainMatch::NotMatched => {}
                        outcome => return outcome,
                    }
                }
                candidate = ancestor.parent();
            }
            ChainMatch::NotMatchedGlobally
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (combinator, part) in self.ancestors.iter().rev() {
            match combinator {
                Combinator::Child => write!(f, "{part} > ")?,
                Combinator::Descendant => write!(f, "{part} ")?,
            }
        }
        write!(f, "{}", self.subject)
    }
}
