//! Style engine warnings with colored terminal output.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the selector parser, the index builder and the property
//! application step to report problems in a style sheet.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

/// Global set of messages we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Record `key` and report whether it was seen for the first time.
fn first_time(key: String) -> bool {
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key)
}

/// Warn about a recoverable style problem (prints once per unique message).
///
/// Returns `true` if the message was printed, `false` if it was a duplicate.
///
/// # Example
/// ```ignore
/// warn_once("Style", "invalid value 'blue-ish' for color");
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let printed = first_time(format!("[{component}] {message}"));
    if printed {
        eprintln!("{}", format!("[Plume {component}] ⚠ {message}").yellow());
    }
    printed
}

/// Report a style sheet authoring error (prints once per unique message).
///
/// Same deduplication as [`warn_once`], printed in red. Used for syntax the
/// engine refuses to evaluate, such as sibling combinators.
pub fn error_once(component: &str, message: &str) -> bool {
    let printed = first_time(format!("[{component}] error: {message}"));
    if printed {
        eprintln!("{}", format!("[Plume {component}] ✖ {message}").red().bold());
    }
    printed
}

/// Clear all recorded warnings (call when a scope's style sheets are replaced)
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
