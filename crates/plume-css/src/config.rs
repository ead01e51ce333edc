//! Engine configuration.

use serde::Deserialize;

/// Options for building a [`SelectorsMap`](crate::SelectorsMap).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StyleConfig {
    /// Abort the build on the first selector using a sibling combinator
    /// instead of treating it as an invalid selector.
    pub strict_combinators: bool,
}

impl StyleConfig {
    /// Lenient defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            strict_combinators: false,
        }
    }

    /// Set strict combinator handling.
    #[must_use]
    pub const fn with_strict_combinators(mut self, strict: bool) -> Self {
        self.strict_combinators = strict;
        self
    }
}
