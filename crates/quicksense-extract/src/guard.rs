//! Keeps the content context off the extension's own pages.

use url::Url;

const EXTENSION_SCHEMES: &[&str] = &["chrome-extension", "moz-extension", "safari-web-extension"];

/// Whether `page_url` belongs to the extension itself.
///
/// Extracting there would only pick up the extension's injected UI.
pub fn is_extension_page(page_url: &str, extension_origin: Option<&str>) -> bool {
    let Ok(url) = Url::parse(page_url) else {
        return false;
    };
    if EXTENSION_SCHEMES.contains(&url.scheme()) {
        return true;
    }

    extension_origin
        .filter(|o| !o.trim().is_empty())
        .and_then(|o| Url::parse(o.trim()).ok())
        .map(|origin| same_origin(&url, &origin))
        .unwrap_or(false)
}

/// Scheme, host and port match. `Url::origin` is opaque for extension
/// schemes, so the parts are compared directly.
fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str().is_some()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
}
