//! URL helpers shared by hydration and the view model.

use url::Url;

/// Comparison key for a company URL.
///
/// Lowercases, drops the scheme, a leading `www.`, and trailing slashes, so
/// `https://www.Acme.com/` and `acme.com` compare equal.
pub fn canonical_key(raw: &str) -> String {
    let trimmed = raw.trim().to_ascii_lowercase();
    let without_scheme = match trimmed.split_once("://") {
        Some((_, rest)) => rest,
        None => trimmed.as_str(),
    };
    let without_www = without_scheme.strip_prefix("www.").unwrap_or(without_scheme);
    without_www.trim_end_matches('/').to_string()
}

/// Short label for charts and table headers: the hostname without `www.`.
///
/// Inputs that do not parse as URLs with a host are returned unchanged.
pub fn display_label(raw: &str) -> String {
    let Ok(parsed) = Url::parse(raw) else {
        return raw.to_string();
    };
    match parsed.host_str() {
        Some(host) => {
            let bare = host.strip_prefix("www.").unwrap_or(host);
            if bare.is_empty() {
                raw.to_string()
            } else {
                bare.to_string()
            }
        }
        None => raw.to_string(),
    }
}
