//! Header store with case-insensitive keys, unset tombstones and
//! default merging.

use base64::{engine::general_purpose, Engine as _};
use http::{header, HeaderMap, HeaderName, HeaderValue};
use hashbrown::HashSet;
use thiserror::Error;

/// A wrapper around `http::HeaderMap` with remove-tombstones.
///
/// Keys compare case-insensitively. `unset` both removes the value and
/// records a tombstone so a later default merge cannot reinsert the key
/// within the same build cycle. An explicit `set` clears the tombstone.
#[derive(Debug, Clone, Default)]
pub struct HeaderStore {
    headers: HeaderMap,
    removed: HashSet<HeaderName>,
}

impl HeaderStore {
    /// Creates a new, empty `HeaderStore`.
    #[must_use]
    pub fn new() -> Self {
        HeaderStore {
            headers: HeaderMap::new(),
            removed: HashSet::new(),
        }
    }

    /// Sets a header, last write per key wins.
    ///
    /// # Errors
    ///
    /// Returns `HeaderError` when the name or value is not a legal HTTP
    /// header token.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        let name = parse_name(name)?;
        let value = parse_value(value)?;
        self.removed.remove(&name);
        self.headers.insert(name, value);
        Ok(())
    }

    /// Sets a header from already-validated parts.
    pub fn set_pair(&mut self, name: HeaderName, value: HeaderValue) {
        self.removed.remove(&name);
        self.headers.insert(name, value);
    }

    /// Removes a header and blocks defaults from reinserting it.
    ///
    /// An invalid name cannot name a stored header, so it is ignored.
    pub fn unset(&mut self, name: &str) {
        if let Ok(name) = parse_name(name) {
            self.headers.remove(&name);
            self.removed.insert(name);
        }
    }

    /// Value for `name`, if set.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Whether `name` carries an unset tombstone.
    #[must_use]
    pub fn is_unset(&self, name: &str) -> bool {
        parse_name(name).is_ok_and(|name| self.removed.contains(&name))
    }

    /// Merge defaults without clobbering explicit sets or unsets.
    pub fn merge_defaults(&mut self, defaults: &HeaderMap) {
        for (name, value) in defaults {
            if self.removed.contains(name) || self.headers.contains_key(name) {
                continue;
            }
            self.headers.insert(name.clone(), value.clone());
        }
    }

    /// Sets basic authentication on the Authorization header.
    ///
    /// # Errors
    ///
    /// Returns `HeaderError` if the credentials render to an invalid
    /// header value.
    pub fn basic_auth(&mut self, user: &str, pass: Option<&str>) -> Result<(), HeaderError> {
        let credentials = format!("{}:{}", user, pass.unwrap_or_default());
        let encoded = general_purpose::STANDARD.encode(credentials);
        let value = parse_value(&format!("Basic {encoded}"))?;
        self.set_pair(header::AUTHORIZATION, value);
        Ok(())
    }

    /// The wire-ready header map.
    #[must_use]
    pub fn to_wire(&self) -> HeaderMap {
        self.headers.clone()
    }

    /// Number of stored headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

/// Header-related errors.
#[derive(Debug, Clone, Error)]
pub enum HeaderError {
    /// The header name contains illegal characters.
    #[error("invalid header name: {name}")]
    InvalidName {
        /// The offending name
        name: String,
    },
    /// The header value contains illegal characters.
    #[error("invalid header value: {value}")]
    InvalidValue {
        /// The offending value
        value: String,
    },
}

impl From<HeaderError> for crate::error::Error {
    fn from(err: HeaderError) -> Self {
        crate::error::invalid_header(err)
    }
}

fn parse_name(name: &str) -> Result<HeaderName, HeaderError> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|_| HeaderError::InvalidName {
        name: name.to_string(),
    })
}

fn parse_value(value: &str) -> Result<HeaderValue, HeaderError> {
    HeaderValue::from_str(value).map_err(|_| HeaderError::InvalidValue {
        value: value.to_string(),
    })
}
