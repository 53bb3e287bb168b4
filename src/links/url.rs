//! URL normalization for extracted link targets.

/// Prefixes that already denote a complete target.
const QUALIFIED_PREFIXES: &[&str] = &["http://", "https://", "mailto:", "tel:", "ftp://", "#"];

/// Domain fragments that mark a bare host name.
const DOMAIN_HINTS: &[&str] = &[".com", ".org", ".net", ".edu", ".gov", ".io"];

/// Normalize a link target so that it is scheme-qualified where that can be inferred.
///
/// Rules, first match wins:
/// 1. contains `@` and has no scheme: `mailto:` is prepended
/// 2. already starts with a known scheme or `#`: unchanged
/// 3. starts with `www.` or contains a common TLD: `https://` is prepended
/// 4. anything else is returned unchanged (relative paths, unknown schemes)
///
/// The function is idempotent.
pub fn normalize_url(raw: &str) -> String {
    let url = raw.trim();
    if url.is_empty() {
        return url.to_string();
    }

    if url.contains('@') && !has_scheme(url) {
        return format!("mailto:{}", url);
    }

    let lower = url.to_ascii_lowercase();
    if QUALIFIED_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return url.to_string();
    }

    if lower.starts_with("www.") || DOMAIN_HINTS.iter().any(|d| lower.contains(d)) {
        return format!("https://{}", url);
    }

    url.to_string()
}

/// Whether the string starts with an RFC 3986 scheme followed by `:` ahead of any `@`.
fn has_scheme(url: &str) -> bool {
    let Some(colon) = url.find(':') else {
        return false;
    };
    if url.find('@').is_some_and(|at| at < colon) {
        return false;
    }
    let scheme = &url[..colon];
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
