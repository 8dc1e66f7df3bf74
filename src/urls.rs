/// URL resolution and comparison logic for Tab Divert
use url::Url;

/// Resolve a raw href against the document's URL.
///
/// Handles absolute URLs, relative paths, query-only and fragment-only
/// hrefs alike; `Url::join` does the RFC 3986 work. Returns `None` for
/// anything unparseable, which callers treat as "leave the event to the
/// browser".
pub fn resolve(base: &Url, raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    base.join(raw).ok()
}

/// Only http(s) targets are worth a new tab; mailto:, javascript:, blob:
/// and friends keep their native behavior.
pub fn is_web_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// True when `target` differs from `current` by at most the fragment:
/// an in-page anchor jump, not a navigation.
pub fn same_document(current: &Url, target: &Url) -> bool {
    current.scheme() == target.scheme()
        && current.host_str() == target.host_str()
        && current.port_or_known_default() == target.port_or_known_default()
        && current.path() == target.path()
        && current.query() == target.query()
}

/// Hostname used to key the per-site policy, lowercased by the parser.
pub fn policy_host(url: &Url) -> Option<&str> {
    url.host_str()
}
