//! Link destination filtering. Only destinations that pass are attached to
//! link runs; the link text is styled either way.

use url::Url;

pub const DEFAULT_ALLOWED_SCHEMES: &[&str] =
    &["http", "https", "mailto", "tel", "sms", "ftp", "ftps", "file"];

const DANGEROUS_PREFIXES: &[&str] = &["javascript:", "vbscript:", "data:text/html"];

/// [`sanitize_url_with`] over [`DEFAULT_ALLOWED_SCHEMES`].
pub fn sanitize_url(raw: &str) -> Option<String> {
    sanitize_url_with(raw, DEFAULT_ALLOWED_SCHEMES)
}

/// Returns the trimmed destination if its scheme is allowed, or if it is a
/// relative reference with no scheme at all.
pub fn sanitize_url_with(raw: &str, allowed: &[&str]) -> Option<String> {
    let trimmed = raw.trim();
    let safe = match Url::parse(trimmed) {
        Ok(url) => allowed.contains(&url.scheme()),
        // Relative references, and anything the parser refuses.
        Err(_) => relative_is_safe(trimmed, allowed),
    };
    safe.then(|| trimmed.to_string())
}

fn relative_is_safe(raw: &str, allowed: &[&str]) -> bool {
    // Control characters are dropped before matching so they cannot split a
    // scheme name.
    let stripped: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_control())
        .collect();
    if DANGEROUS_PREFIXES.iter().any(|p| stripped.starts_with(p)) {
        return false;
    }
    match stripped.split_once(':') {
        Some((scheme, _)) => {
            let scheme = scheme.trim();
            scheme.is_empty() || allowed.contains(&scheme)
        }
        None => true,
    }
}
