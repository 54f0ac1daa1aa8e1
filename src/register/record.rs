//! Per-session registration records.

use serde::Serialize;
use std::path::PathBuf;

use crate::bundle::{AssetKind, AssetOptions, BundleId, BundleSpec, FileEntry, Position};
use crate::publish::{PublishOutcome, PublishedAsset};

/// Position used for files whose bundle sets none.
pub const fn default_position(kind: AssetKind) -> Position {
    match kind {
        AssetKind::Css => Position::Head,
        AssetKind::Js => Position::End,
    }
}

/// Resolved state of one bundle within a session.
///
/// Built from the effective spec (registry plus override) and the publish
/// result. Only the positions change after creation, when a later
/// registration hands one down to a bundle that had none.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationRecord {
    pub id: BundleId,
    pub base_path: Option<PathBuf>,
    pub base_url: Option<String>,
    pub css: Vec<FileEntry>,
    pub js: Vec<FileEntry>,
    pub css_options: AssetOptions,
    pub js_options: AssetOptions,
    pub depends: Vec<BundleId>,
    #[serde(skip)]
    pub outcome: PublishOutcome,
}

impl RegistrationRecord {
    pub(super) fn new(id: BundleId, spec: &BundleSpec, published: PublishedAsset) -> Self {
        Self {
            id,
            base_path: published.base_path,
            base_url: published.base_url,
            css: spec.css.clone(),
            js: spec.js.clone(),
            css_options: spec.css_options.clone(),
            js_options: spec.js_options.clone(),
            depends: spec.depends.clone(),
            outcome: published.outcome,
        }
    }

    pub fn files(&self, kind: AssetKind) -> &[FileEntry] {
        match kind {
            AssetKind::Css => &self.css,
            AssetKind::Js => &self.js,
        }
    }

    pub fn options(&self, kind: AssetKind) -> &AssetOptions {
        match kind {
            AssetKind::Css => &self.css_options,
            AssetKind::Js => &self.js_options,
        }
    }

    /// Explicit or inherited position.
    pub fn position(&self, kind: AssetKind) -> Option<Position> {
        self.options(kind).position
    }

    /// Set the position unless one is already present.
    pub(super) fn inherit_position(&mut self, kind: AssetKind, position: Position) {
        let options = match kind {
            AssetKind::Css => &mut self.css_options,
            AssetKind::Js => &mut self.js_options,
        };
        options.position.get_or_insert(position);
    }

    /// Whether the bundle's files came out of the publisher.
    pub fn published(&self) -> bool {
        matches!(
            self.outcome,
            PublishOutcome::Published | PublishOutcome::Linked | PublishOutcome::Existing
        )
    }

    /// Vetoed bundles render nothing.
    pub fn is_available(&self) -> bool {
        self.outcome != PublishOutcome::Vetoed
    }

    /// Options for one file: bundle options overlaid with the file's own.
    pub fn file_options(&self, kind: AssetKind, entry: &FileEntry) -> AssetOptions {
        match entry.options() {
            Some(own) => self.options(kind).merged(own),
            None => self.options(kind).clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> RegistrationRecord {
        let spec = BundleSpec::new()
            .with_css(["site.css".into(), FileEntry::with_options("print.css", AssetOptions::default().with_attr("media", "print"))])
            .with_options(AssetKind::Css, AssetOptions::default().with_attr("media", "screen"));
        let published = PublishedAsset {
            source: None,
            base_path: None,
            base_url: Some("/app".into()),
            outcome: PublishOutcome::Unpublished,
        };
        RegistrationRecord::new("app".into(), &spec, published)
    }

    #[test]
    fn test_file_options_merge() {
        let r = record();
        let site = r.file_options(AssetKind::Css, &r.css[0]);
        let print = r.file_options(AssetKind::Css, &r.css[1]);
        assert_eq!(site.attrs["media"], "screen");
        assert_eq!(print.attrs["media"], "print");
        assert!(!r.published());
        assert!(r.is_available());
    }

    #[test]
    fn test_inherit_position_keeps_existing() {
        let mut r = record();
        assert_eq!(r.position(AssetKind::Js), None);
        r.inherit_position(AssetKind::Js, Position::Head);
        r.inherit_position(AssetKind::Js, Position::End);
        assert_eq!(r.position(AssetKind::Js), Some(Position::Head));
        assert_eq!(default_position(AssetKind::Css), Position::Head);
    }
}
