//! View type name normalization.
//!
//! Type selectors are case- and dash-insensitive: `ListView`, `list-view`
//! and `listview` all name the same view type. Both the selector compiler
//! and the view tree fold names through [`normalize_type_name`], so the
//! folding happens exactly once on each side and always the same way.

/// Fold a view type name into its canonical form: dashes removed,
/// ASCII-lowercased.
///
/// Only ASCII letters are lowered; `Ü-View` becomes `Üview`. Type names are
/// compared after this folding on both the selector and the view side, so
/// non-ASCII letters match only with the same case.
///
/// The function is idempotent: normalizing an already normalized name
/// returns it unchanged.
#[must_use]
pub fn normalize_type_name(name: &str) -> String {
    name.chars()
        .filter(|&c| c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Check whether `name` is already in canonical form.
#[must_use]
pub fn is_normalized(name: &str) -> bool {
    !name.contains('-') && !name.chars().any(|c| c.is_ascii_uppercase())
}
