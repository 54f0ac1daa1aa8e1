//! Asset URL helpers.

/// Check if a URL has a scheme (`https:`, `data:`, ...).
///
/// A valid scheme must have at least 1 character before the colon and only
/// contain ASCII alphanumeric or `+`, `-`, `.`.
#[inline]
pub fn has_scheme(url: &str) -> bool {
    url.find(':').is_some_and(|pos| {
        pos > 0
            && url[..pos]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

/// Whether `url` must be joined with a base URL.
///
/// Absolute (`https://`), protocol-relative (`//cdn`) and rooted (`/x`)
/// URLs are used verbatim.
#[inline]
pub fn is_relative(url: &str) -> bool {
    !url.starts_with('/') && !has_scheme(url)
}

/// Join URL segments with exactly one `/` between them.
///
/// An empty base yields the relative part unchanged; `/` as base yields a
/// rooted URL.
pub fn join(base: &str, rel: &str) -> String {
    let rel = rel.trim_start_matches('/');
    if base.is_empty() {
        return rel.to_string();
    }
    let base = base.trim_end_matches('/');
    format!("{base}/{rel}")
}
