//! Renderer seam.
//!
//! The session never writes markup. At flush time it hands each file to an
//! [`AssetRenderer`], in dependency-first order with css before js per bundle.

use indexmap::IndexMap;
use serde::Serialize;

use crate::bundle::{AssetKind, Attributes, BundleId, Position};

/// One css or js file ready to be rendered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedFile {
    /// Owning bundle, `None` for files registered on their own.
    pub bundle: Option<BundleId>,
    pub kind: AssetKind,
    pub position: Position,
    pub url: String,
    /// Tag attributes other than the position.
    pub attributes: Attributes,
}

/// Receiver of rendered files.
pub trait AssetRenderer {
    fn register_file(&mut self, file: RenderedFile);
}

impl AssetRenderer for Vec<RenderedFile> {
    fn register_file(&mut self, file: RenderedFile) {
        self.push(file);
    }
}

/// Files grouped by position, then kind, in registration order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageAssets {
    positions: IndexMap<Position, PositionGroup>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PositionGroup {
    pub css: Vec<RenderedFile>,
    pub js: Vec<RenderedFile>,
}

impl PageAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files of `kind` rendered at `position`.
    pub fn files(&self, position: Position, kind: AssetKind) -> &[RenderedFile] {
        match (self.positions.get(&position), kind) {
            (Some(group), AssetKind::Css) => &group.css,
            (Some(group), AssetKind::Js) => &group.js,
            (None, _) => &[],
        }
    }

    /// URLs of `kind` at `position`.
    pub fn urls(&self, position: Position, kind: AssetKind) -> Vec<&str> {
        self.files(position, kind).iter().map(|f| f.url.as_str()).collect()
    }

    /// Groups in page order (head first).
    pub fn groups(&self) -> Vec<(Position, &PositionGroup)> {
        let mut groups: Vec<_> = self.positions.iter().map(|(p, g)| (*p, g)).collect();
        groups.sort_by_key(|(p, _)| *p);
        groups
    }

    pub fn len(&self) -> usize {
        self.positions.values().map(|g| g.css.len() + g.js.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AssetRenderer for PageAssets {
    fn register_file(&mut self, file: RenderedFile) {
        let group = self.positions.entry(file.position).or_default();
        match file.kind {
            AssetKind::Css => group.css.push(file),
            AssetKind::Js => group.js.push(file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(kind: AssetKind, position: Position, url: &str) -> RenderedFile {
        RenderedFile {
            bundle: Some("app".into()),
            kind,
            position,
            url: url.into(),
            attributes: Attributes::new(),
        }
    }

    #[test]
    fn test_page_assets_groups() {
        let mut page = PageAssets::new();
        page.register_file(file(AssetKind::Js, Position::End, "/a.js"));
        page.register_file(file(AssetKind::Css, Position::Head, "/a.css"));
        page.register_file(file(AssetKind::Js, Position::Head, "/h.js"));
        page.register_file(file(AssetKind::Js, Position::End, "/b.js"));

        assert_eq!(page.len(), 4);
        assert_eq!(page.urls(Position::End, AssetKind::Js), vec!["/a.js", "/b.js"]);
        assert_eq!(page.urls(Position::Head, AssetKind::Css), vec!["/a.css"]);
        assert!(page.files(Position::Load, AssetKind::Js).is_empty());

        let order: Vec<_> = page.groups().into_iter().map(|(p, _)| p).collect();
        assert_eq!(order, vec![Position::Head, Position::End]);
    }

    #[test]
    fn test_vec_renderer() {
        let mut files = Vec::new();
        files.register_file(file(AssetKind::Css, Position::Head, "/a.css"));
        assert_eq!(files.len(), 1);
    }
}
