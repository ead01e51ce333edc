//! Common utilities for the Plume style engine.
//!
//! This crate provides shared infrastructure used by the view tree and the
//! style engine:
//! - **Warning System** - colored, deduplicated terminal output for style sheet problems
//! - **Type names** - the one normalization applied to view type names

pub mod type_name;
pub mod warning;
