//! Target resolution and the canonical URL component view.
//!
//! A request target may be an absolute URL, a schemeless shorthand
//! (`host:port/path`) or a port-only shorthand (`:port/path`). Resolution
//! always recomputes from the stored input string, so repeated calls
//! yield structurally equal results.

use std::borrow::Cow;

use serde::Serialize;
use url::Url;

use crate::error::{self, Error};

/// Resolve a request target string into a parsed URL.
///
/// Shorthands missing a scheme default to `http`; a leading `:` defaults
/// the host to `localhost`.
///
/// # Errors
///
/// Returns a builder-kind `Error` if the expanded target is not a valid
/// URL or has no host.
pub fn resolve(input: &str) -> Result<Url, Error> {
    let candidate = expand_shorthand(input);
    let url = Url::parse(&candidate)
        .map_err(|e| error::url(format!("invalid request target '{input}': {e}")))?;
    if !url.has_host() {
        return Err(error::url(format!("request target has no host: '{input}'")));
    }
    Ok(url)
}

/// Expand the schemeless shorthands into absolute `http` URLs.
fn expand_shorthand(input: &str) -> Cow<'_, str> {
    if let Some(rest) = input.strip_prefix(':') {
        return Cow::Owned(format!("http://localhost:{rest}"));
    }
    if input.contains("://") {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(format!("http://{input}"))
    }
}

/// Structural view of a resolved URL.
///
/// Pure data, safe to log or compare; recomputed on every request rather
/// than cached, so no call can observe leftovers from a previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedUrl {
    /// Scheme with trailing colon, e.g. `http:`
    pub protocol: String,
    /// Host with the explicit port when one was given, e.g. `localhost:5000`
    pub host: String,
    /// Host without port
    pub hostname: String,
    /// Explicit port, or the scheme default
    pub port: u16,
    /// Path component
    pub pathname: String,
    /// Raw query string without the leading `?`
    pub query: String,
}

/// Break a resolved URL into its component view.
#[must_use]
pub fn components(url: &Url) -> ParsedUrl {
    let hostname = url.host_str().unwrap_or_default().to_string();
    let host = match url.port() {
        Some(port) => format!("{hostname}:{port}"),
        None => hostname.clone(),
    };
    ParsedUrl {
        protocol: format!("{}:", url.scheme()),
        host,
        hostname,
        port: url.port_or_known_default().unwrap_or_default(),
        pathname: url.path().to_string(),
        query: url.query().unwrap_or_default().to_string(),
    }
}
