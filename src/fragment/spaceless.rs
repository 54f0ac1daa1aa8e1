//! Whitespace removal between tags.

use regex::Regex;
use std::sync::LazyLock;

static BETWEEN_TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?-u)>\s+<").unwrap());

/// Drop whitespace between `>` and `<`, then trim both ends.
///
/// Whitespace inside text nodes is kept: `<p>a  b</p>` stays as is.
pub fn strip_between_tags(html: &str) -> String {
    BETWEEN_TAGS.replace_all(html, "><").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_between_tags() {
        assert_eq!(
            strip_between_tags("\t<ul>\n  <li>a  b</li>\n</ul>\n"),
            "<ul><li>a  b</li></ul>"
        );
        assert_eq!(strip_between_tags("plain text "), "plain text");
        assert_eq!(strip_between_tags(""), "");
    }
}
