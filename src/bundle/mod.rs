//! Bundle descriptors.
//!
//! A bundle is a named, ordered group of CSS/JS files plus the bundles it
//! depends on. Specs are loaded once from `assetry.toml` (or built in code)
//! and never mutated afterwards; per-request changes go through
//! [`BundleOverride`] into the session's registration records.

mod id;
mod kind;
mod overrides;
mod registry;
mod spec;

pub use id::BundleId;
pub use kind::{AssetKind, Position};
pub use overrides::{BundleOverride, BundlePatch};
pub use registry::BundleRegistry;
pub use spec::{AssetOptions, Attributes, BundleSpec, FileEntry, PublishOptions};
