//! Source-file identifier extraction.
//!
//! Cells in the sheet hold whatever the operator pasted: a bare Drive file
//! id, a `...?id=<id>` link, or a `.../d/<id>/view` link. [`extract`] turns
//! any of those into the bare id.

use std::sync::LazyLock;

use regex::Regex;

/// A marker (`id=` or `/d/`) followed by an id token, anywhere in the text.
static MARKED_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:id=|/d/)([A-Za-z0-9_-]{10,})").expect("static regex is valid")
});

/// The entire text is an id token.
static BARE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{10,}$").expect("static regex is valid"));

/// Extract a canonical source-file identifier from a free-form cell value.
///
/// A marked id wins over a bare token. When the text holds several marked
/// candidates, the leftmost one is returned.
///
/// ```
/// use sheetcast_core::extract;
///
/// assert_eq!(extract("id=1A2b3C4d5E6f7G8h9I").as_deref(), Some("1A2b3C4d5E6f7G8h9I"));
/// assert_eq!(extract("short"), None);
/// ```
pub fn extract(raw: &str) -> Option<String> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = MARKED_ID.captures(text) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }

    BARE_ID.is_match(text).then(|| text.to_string())
}
