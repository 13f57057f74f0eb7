//! Markup escaping and hyperlink validation for user- and AI-supplied text.

use url::{ParseError, Url};

/// Schemes a rendered `href` may carry. Everything else is stripped.
const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

/// Escapes text for interpolation into element content or a quoted attribute.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Validates a raw hyperlink and returns its normalized form, or `None` if it
/// must not be emitted.
///
/// Whitespace and control characters are removed before parsing, since
/// browsers ignore them inside a scheme (`java\tscript:`). Scheme-less input is
/// interpreted as an email address (`name@host`) or a bare host (`github.com/x`).
pub fn safe_href(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_control() && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let url = match Url::parse(&cleaned) {
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) => {
            let guess = if cleaned.contains('@') && !cleaned.contains('/') {
                format!("mailto:{cleaned}")
            } else if looks_like_host(&cleaned) {
                format!("https://{cleaned}")
            } else {
                return None;
            };
            Url::parse(&guess).ok()?
        }
        Err(_) => return None,
    };

    if ALLOWED_SCHEMES.contains(&url.scheme()) {
        Some(url.to_string())
    } else {
        None
    }
}

/// `example.com` or `example.com/path`: a dotted host with no leading slash.
fn looks_like_host(s: &str) -> bool {
    if s.starts_with('/') || s.starts_with('.') {
        return false;
    }
    let host = s.split('/').next().unwrap_or_default();
    host.contains('.')
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':'))
}
