//! Asset kind and render position definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of asset file inside a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// Stylesheet (`<link>` in the renderer).
    Css,
    /// Script (`<script>` in the renderer).
    Js,
}

impl AssetKind {
    /// Both kinds in render order (stylesheets first).
    pub const ALL: [AssetKind; 2] = [AssetKind::Css, AssetKind::Js];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::Js => "js",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the renderer places an asset in the page.
///
/// Ordered by appearance: a bundle may only depend on bundles whose
/// position is the same or earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// Inside `<head>`.
    Head,
    /// Right after `<body>`.
    Begin,
    /// Right before `</body>`.
    End,
    /// End of body, wrapped in a document-ready handler.
    Ready,
    /// End of body, wrapped in a window-load handler.
    Load,
}

impl Position {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Begin => "begin",
            Self::End => "end",
            Self::Ready => "ready",
            Self::Load => "load",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
