//! `@name` prefix aliases for paths and URLs.
//!
//! ```text
//! "@webroot" = "public"      @webroot/assets  →  public/assets
//! "@web"     = "/"           @web/assets      →  /assets
//! ```
//!
//! Only the leading segment is substituted. Values may themselves start with
//! an alias; expansion is repeated up to a fixed depth.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const MAX_DEPTH: usize = 8;

/// Alias of the public web directory on disk.
pub const WEBROOT_ALIAS: &str = "@webroot";
/// Alias of the URL serving [`WEBROOT_ALIAS`].
pub const WEB_ALIAS: &str = "@web";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AliasError {
    #[error("unknown alias `{0}`")]
    Unknown(String),

    #[error("alias `{0}` expands recursively")]
    TooDeep(String),

    #[error("alias name `{0}` must start with `@` and contain no `/`")]
    InvalidName(String),
}

/// Ordered alias table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasMap {
    entries: IndexMap<String, String>,
}

impl AliasMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an alias. `name` must look like `@name`.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<(), AliasError> {
        let name = name.into();
        Self::check_name(&name)?;
        let value = value.into();
        let value = match value.trim_end_matches('/') {
            "" => value,
            trimmed => trimmed.to_string(),
        };
        self.entries.insert(name, value);
        Ok(())
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        // Builder for tests and static setups; invalid names are ignored.
        self.set(name, value).ok();
        self
    }

    pub fn check_name(name: &str) -> Result<(), AliasError> {
        if name.len() > 1 && name.starts_with('@') && !name.contains('/') {
            Ok(())
        } else {
            Err(AliasError::InvalidName(name.to_string()))
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Expand a leading alias. Strings without one are returned unchanged.
    pub fn resolve(&self, input: &str) -> Result<String, AliasError> {
        let mut current = input.to_string();
        for _ in 0..MAX_DEPTH {
            if !current.starts_with('@') {
                return Ok(current);
            }
            let (name, rest) = match current.find('/') {
                Some(i) => current.split_at(i),
                None => (current.as_str(), ""),
            };
            let value = self
                .get(name)
                .ok_or_else(|| AliasError::Unknown(name.to_string()))?;
            current = join(value, rest);
        }
        if current.starts_with('@') {
            Err(AliasError::TooDeep(input.to_string()))
        } else {
            Ok(current)
        }
    }
}

/// `value` + `rest`, where `rest` is empty or starts with `/`.
fn join(value: &str, rest: &str) -> String {
    if rest.is_empty() {
        return value.to_string();
    }
    if value.is_empty() || value == "/" {
        return rest.to_string();
    }
    format!("{value}{rest}")
}
