//! Strips code-fence wrapping from raw service responses.
//!
//! Text-generation services frequently wrap file content in Markdown fences,
//! with or without a language tag, even when asked not to. Only a fence pair
//! at the very start and end of the response is stripped; fence-like
//! sequences in the middle of the content are left alone.

const FENCE: &str = "```";

/// Recovers the intended file content from a raw service response.
///
/// Trims surrounding whitespace, then removes a leading language-tagged
/// fence paired with a trailing plain fence, or a plain fence pair, and
/// trims again. Stripping repeats until nothing applies, so the function is
/// idempotent: `clean(clean(raw)) == clean(raw)`.
#[must_use]
pub fn clean(raw: &str) -> String {
    let mut current = raw.trim();

    while let Some(inner) = strip_tagged(current).or_else(|| strip_plain(current)) {
        current = inner.trim();
    }

    current.to_string()
}

/// Strips a `` ```lang `` opening fence (tag running to the end of the
/// fence line) paired with a closing plain fence.
fn strip_tagged(text: &str) -> Option<&str> {
    let rest = text.strip_prefix(FENCE)?;

    let tag_len = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .count();
    if tag_len == 0 {
        return None;
    }

    let after_tag = &rest[tag_len..];
    if !after_tag.starts_with(['\n', '\r']) {
        return None;
    }

    after_tag.strip_suffix(FENCE)
}

/// Strips a plain leading/trailing fence pair.
fn strip_plain(text: &str) -> Option<&str> {
    text.strip_prefix(FENCE)?.strip_suffix(FENCE)
}
