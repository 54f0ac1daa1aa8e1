//! Configuration section definitions.
//!
//! | Module     | TOML Section              | Purpose                          |
//! |------------|---------------------------|----------------------------------|
//! | `publish`  | `[publish]`               | Publish root, strategy, hashing  |
//! | `bundles`  | `[bundles.*]`, `[overrides]` | Bundle graph checks           |

mod bundles;
mod publish;

pub use bundles::validate_bundles;
pub use publish::{PublishConfig, PublishFields};
