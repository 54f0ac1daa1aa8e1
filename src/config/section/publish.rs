//! `[publish]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [publish]
//! base_path = "@webroot/assets"   # where bundles are published
//! base_url = "@web/assets"        # URL serving base_path
//! link_assets = false             # symlink instead of copy
//! force_copy = false              # republish existing destinations
//! append_timestamp = false        # add ?v=<mtime> to asset URLs
//! hash_length = 8                 # fingerprint length (4..=64)
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::publish::{DEFAULT_HASH_LENGTH, MAX_HASH_LENGTH, MIN_HASH_LENGTH, PublisherOptions};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
    pub base_path: PathBuf,
    pub base_url: String,
    pub link_assets: bool,
    pub force_copy: bool,
    pub append_timestamp: bool,
    pub hash_length: usize,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("@webroot/assets"),
            base_url: "@web/assets".to_string(),
            link_assets: false,
            force_copy: false,
            append_timestamp: false,
            hash_length: DEFAULT_HASH_LENGTH,
        }
    }
}

/// Field paths of `[publish]`.
pub struct PublishFields {
    pub base_path: FieldPath,
    pub base_url: FieldPath,
    pub hash_length: FieldPath,
}

impl PublishConfig {
    pub const FIELDS: PublishFields = PublishFields {
        base_path: FieldPath::new("publish.base_path"),
        base_url: FieldPath::new("publish.base_url"),
        hash_length: FieldPath::new("publish.hash_length"),
    };

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !(MIN_HASH_LENGTH..=MAX_HASH_LENGTH).contains(&self.hash_length) {
            diag.error_with_hint(
                Self::FIELDS.hash_length,
                format!(
                    "must be between {MIN_HASH_LENGTH} and {MAX_HASH_LENGTH}, got {}",
                    self.hash_length
                ),
                format!("the default is {DEFAULT_HASH_LENGTH}"),
            );
        }
        if self.base_path.as_os_str().is_empty() {
            diag.error(Self::FIELDS.base_path, "must not be empty");
        }
        if self.base_url.is_empty() {
            diag.error_with_hint(Self::FIELDS.base_url, "must not be empty", "use \"/\" for the site root");
        }
    }

    /// Publisher options (hooks are attached in code).
    pub fn to_options(&self) -> PublisherOptions {
        PublisherOptions {
            base_path: self.base_path.clone(),
            base_url: self.base_url.clone(),
            link_assets: self.link_assets,
            force_copy: self.force_copy,
            append_timestamp: self.append_timestamp,
            hash_length: self.hash_length,
            ..PublisherOptions::default()
        }
    }
}
