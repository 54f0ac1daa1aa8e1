//! Assetry - asset bundles for server-rendered views.
//!
//! A bundle is a named set of css/js files with dependencies on other
//! bundles. Registering a bundle in a [`Session`](register::Session)
//! resolves its dependencies, publishes bundles that live outside the web
//! root, and records the URLs a renderer needs:
//!
//! ```text
//! assetry.toml ──► AssetConfig ──► AssetManager (shared, Arc)
//!                                     ├── BundleRegistry + overrides
//!                                     └── Publisher ──► public/assets/<hash>/
//!
//! Session::register("app")
//!   resolve ─► [jquery, app] ─► publish ─► records ─► render(&mut renderer)
//! ```
//!
//! [`fragment`] adds cached output regions with dynamic placeholders.

#[macro_use]
pub mod logger;

pub mod alias;
pub mod bundle;
pub mod config;
pub mod error;
pub mod fragment;
pub mod publish;
pub mod register;
pub mod resolve;
pub mod utils;

pub use error::{AssetError, ConfigurationError, FilesystemError, Result};
pub use register::{AssetManager, Session};
