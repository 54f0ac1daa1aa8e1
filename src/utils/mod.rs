//! Utility modules.
//!
//! - [`path`]: filesystem path normalization (`normalize_path`, `resolve_path`)
//! - [`url`]: asset URL classification and joining

pub mod path;
pub mod url;
