//! Request staging and wire freezing.
//!
//! `RequestParts` is the mutable staging area behind the fluent builder:
//! method, target string as given, header and query stores, the staged
//! body, disposition preference and transport selection. `freeze` turns
//! it into an immutable `WireRequest` for the agent; everything before
//! that is plain synchronous mutation.

use std::time::Duration;

use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, Method};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::agent::AgentSelection;
use crate::codec::CodecRegistry;
use crate::error::{self, Error};
use crate::http::headers::HeaderStore;
use crate::http::query::{QueryInput, QueryStore};
use crate::http::url::{self as target_url, ParsedUrl};

/// Staged request body prior to encoding.
#[derive(Debug, Clone, Default)]
pub enum StagedBody {
    #[default]
    None,
    /// Text accumulated across string sends
    Text(String),
    /// Structured value pending codec encoding
    Value(Value),
    /// Raw chunks accumulated via `write`
    Raw(Vec<u8>),
}

impl StagedBody {
    /// Snapshot for descriptions: raw chunks render as lossy text.
    #[must_use]
    pub fn preview(&self) -> Value {
        match self {
            StagedBody::None => Value::Null,
            StagedBody::Text(text) => Value::String(text.clone()),
            StagedBody::Value(value) => value.clone(),
            StagedBody::Raw(bytes) => {
                Value::String(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }
}

/// Mutable staging area for one request.
#[derive(Debug, Clone)]
pub struct RequestParts {
    method: Method,
    target: Option<String>,
    headers: HeaderStore,
    query: QueryStore,
    body: StagedBody,
    buffer_preference: Option<bool>,
    agent: AgentSelection,
    timeout: Option<Duration>,
    /// Internal error state for deferred error handling
    error: Option<Error>,
}

impl RequestParts {
    #[must_use]
    pub fn new(method: Method) -> Self {
        RequestParts {
            method,
            target: None,
            headers: HeaderStore::new(),
            query: QueryStore::new(),
            body: StagedBody::default(),
            buffer_preference: None,
            agent: AgentSelection::default(),
            timeout: None,
            error: None,
        }
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn set_method(&mut self, method: Method) {
        self.method = method;
    }

    /// The target exactly as the caller supplied it.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn set_target(&mut self, target: String) {
        self.target = Some(target);
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderStore {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderStore {
        &mut self.headers
    }

    pub fn add_query(&mut self, input: QueryInput) {
        self.query.add(input);
    }

    #[must_use]
    pub fn buffer_preference(&self) -> Option<bool> {
        self.buffer_preference
    }

    pub fn set_buffer_preference(&mut self, preference: bool) {
        self.buffer_preference = Some(preference);
    }

    #[must_use]
    pub fn agent_selection(&self) -> &AgentSelection {
        &self.agent
    }

    pub fn set_agent(&mut self, selection: AgentSelection) {
        self.agent = selection;
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }

    /// Record a deferred builder error; the first one wins and is
    /// reported when the request is frozen.
    pub fn defer_error(&mut self, error: Error) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    #[must_use]
    pub fn deferred_error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Stage a body value, merging with anything already staged:
    /// strings concatenate, objects shallow-merge. Incompatible mixes
    /// (a string after an object, anything after `write` chunks) are
    /// recorded as a deferred state error.
    pub fn stage_send(&mut self, value: Value) {
        if self.error.is_some() {
            return;
        }
        let staged = std::mem::take(&mut self.body);
        self.body = match (staged, value) {
            (StagedBody::None, Value::String(text)) => StagedBody::Text(text),
            (StagedBody::None, value) => StagedBody::Value(value),
            (StagedBody::Text(mut existing), Value::String(text)) => {
                existing.push_str(&text);
                StagedBody::Text(existing)
            }
            (StagedBody::Value(Value::Object(mut existing)), Value::Object(incoming)) => {
                for (key, value) in incoming {
                    existing.insert(key, value);
                }
                StagedBody::Value(Value::Object(existing))
            }
            (staged, _) => {
                self.defer_error(error::state(
                    "send called with a body incompatible with what is already staged",
                ));
                staged
            }
        };
    }

    /// Append a raw chunk to the outgoing body buffer. Returns whether
    /// the chunk was accepted; a structured body already staged rejects
    /// raw writes.
    pub fn stage_write(&mut self, chunk: &[u8]) -> bool {
        if self.error.is_some() {
            return false;
        }
        let staged = std::mem::take(&mut self.body);
        match staged {
            StagedBody::None => {
                self.body = StagedBody::Raw(chunk.to_vec());
                true
            }
            StagedBody::Raw(mut buffer) => {
                buffer.extend_from_slice(chunk);
                self.body = StagedBody::Raw(buffer);
                true
            }
            StagedBody::Text(text) => {
                let mut buffer = text.into_bytes();
                buffer.extend_from_slice(chunk);
                self.body = StagedBody::Raw(buffer);
                true
            }
            staged @ StagedBody::Value(_) => {
                self.body = staged;
                self.defer_error(error::state("write after a structured body was staged"));
                false
            }
        }
    }

    #[must_use]
    pub fn body(&self) -> &StagedBody {
        &self.body
    }

    /// Resolve the target and append accumulated query pairs. Recomputed
    /// from the stored input on every call, never from a previous
    /// resolution, so repeated calls cannot accumulate query fragments.
    pub fn resolved_url(&self) -> Result<Url, Error> {
        let target = self
            .target
            .as_deref()
            .ok_or_else(|| error::builder("no request target set"))?;
        let mut url = target_url::resolve(target)?;
        self.query.append_to(&mut url);
        Ok(url)
    }

    /// Component view of the resolved target; idempotent.
    pub fn parsed_url(&self) -> Result<ParsedUrl, Error> {
        Ok(target_url::components(&self.resolved_url()?))
    }

    /// Serializable snapshot: method, target as given, staged body.
    #[must_use]
    pub fn describe(&self) -> RequestDescription {
        RequestDescription {
            method: self.method.as_str().to_string(),
            url: self.target.clone().unwrap_or_default(),
            data: self.body.preview(),
        }
    }

    /// The content type that will govern body encoding: the explicit
    /// header when set, otherwise inferred from the staged body shape.
    fn effective_content_type(&self) -> Option<String> {
        if let Some(explicit) = self.headers.get(header::CONTENT_TYPE.as_str()) {
            return Some(explicit.to_string());
        }
        match &self.body {
            StagedBody::Value(_) => Some("application/json".to_string()),
            StagedBody::Text(_) => Some("application/x-www-form-urlencoded".to_string()),
            _ => None,
        }
    }

    /// Freeze into an immutable wire request: resolve the URL, encode
    /// the staged body, then merge inferred and caller defaults under
    /// the explicit headers (unset tombstones beat defaults).
    ///
    /// # Errors
    ///
    /// Reports any deferred builder error first, then target resolution
    /// and body encoding failures.
    pub fn freeze(
        &self,
        defaults: &HeaderMap,
        registry: &CodecRegistry,
    ) -> Result<WireRequest, Error> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }

        let url = self.resolved_url()?;
        let content_type = self.effective_content_type();

        let body = match &self.body {
            StagedBody::None => Bytes::new(),
            StagedBody::Text(text) => Bytes::from(text.clone()),
            StagedBody::Raw(bytes) => Bytes::from(bytes.clone()),
            StagedBody::Value(value) => {
                let content_type = content_type.as_deref().unwrap_or("application/json");
                registry
                    .encode_for(content_type, value)
                    .map_err(|e| e.with_url(url.clone()))?
            }
        };

        let mut headers = self.headers.clone();
        let mut merged_defaults = defaults.clone();
        if let Some(content_type) = &content_type {
            if let Ok(value) = HeaderValue::from_str(content_type) {
                merged_defaults.insert(header::CONTENT_TYPE, value);
            }
        }
        if !body.is_empty() {
            merged_defaults.insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
        }
        headers.merge_defaults(&merged_defaults);

        Ok(WireRequest {
            method: self.method.clone(),
            url,
            headers: headers.to_wire(),
            body,
            timeout: self.timeout,
        })
    }
}

/// Serializable snapshot of a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestDescription {
    pub method: String,
    pub url: String,
    pub data: Value,
}

/// An immutable, wire-ready request handed to the transport agent.
#[derive(Debug, Clone)]
pub struct WireRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub timeout: Option<Duration>,
}

impl WireRequest {
    /// The raw Content-Type header value, if present.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_sends_concatenate() {
        let mut parts = RequestParts::new(Method::POST);
        parts.stage_send(json!("{\"name\""));
        parts.stage_send(json!(":\"tobi\"}"));
        assert!(matches!(
            parts.body(),
            StagedBody::Text(text) if text == "{\"name\":\"tobi\"}"
        ));
    }

    #[test]
    fn object_sends_shallow_merge() {
        let mut parts = RequestParts::new(Method::POST);
        parts.stage_send(json!({"name": "tobi"}));
        parts.stage_send(json!({"species": "ferret"}));
        assert!(matches!(
            parts.body(),
            StagedBody::Value(value) if *value == json!({"name": "tobi", "species": "ferret"})
        ));
    }

    #[test]
    fn incompatible_send_mix_defers_a_state_error() {
        let mut parts = RequestParts::new(Method::POST);
        parts.stage_send(json!("text"));
        parts.stage_send(json!({"a": 1}));
        let error = parts.deferred_error().expect("state error deferred");
        assert!(error.is_state());
    }

    #[test]
    fn writes_accumulate_and_report_acceptance() {
        let mut parts = RequestParts::new(Method::POST);
        assert!(parts.stage_write(b"{\"name\""));
        assert!(parts.stage_write(b":\"tobi\"}"));
        assert!(matches!(
            parts.body(),
            StagedBody::Raw(bytes) if bytes == b"{\"name\":\"tobi\"}"
        ));
    }

    #[test]
    fn write_after_structured_send_is_rejected() {
        let mut parts = RequestParts::new(Method::POST);
        parts.stage_send(json!({"a": 1}));
        assert!(!parts.stage_write(b"raw"));
        assert!(parts.deferred_error().is_some());
    }

    #[test]
    fn parsed_url_is_idempotent_across_calls() {
        let mut parts = RequestParts::new(Method::GET);
        parts.set_target("http://localhost:5000/mypath?value1=1&value2=2".to_string());
        parts.add_query(QueryInput::from(json!({"value3": 3})));

        let first = parts.parsed_url().expect("first parse");
        let second = parts.parsed_url().expect("second parse");
        assert_eq!(first, second);
        assert_eq!(first.pathname, "/mypath");
        assert_eq!(first.host, "localhost:5000");
        assert_eq!(first.hostname, "localhost");
        assert_eq!(first.protocol, "http:");
        assert_eq!(first.port, 5000);
        for fragment in ["value1=1", "value2=2", "value3=3"] {
            assert!(first.query.contains(fragment), "missing {fragment}");
        }
    }

    #[test]
    fn freeze_infers_json_content_type_for_structured_bodies() {
        let mut parts = RequestParts::new(Method::POST);
        parts.set_target(":5000/echo".to_string());
        parts.stage_send(json!({"foo": "baz"}));

        let wire = parts
            .freeze(&HeaderMap::new(), &CodecRegistry::default())
            .expect("freeze");
        assert_eq!(wire.content_type(), Some("application/json"));
        assert_eq!(&wire.body[..], br#"{"foo":"baz"}"#);
        assert_eq!(
            wire.headers
                .get(header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok()),
            Some("13")
        );
    }

    #[test]
    fn freeze_reports_deferred_errors_first() {
        let mut parts = RequestParts::new(Method::POST);
        parts.set_target(":5000/echo".to_string());
        parts.stage_send(json!("text"));
        parts.stage_send(json!({"a": 1}));

        let error = parts
            .freeze(&HeaderMap::new(), &CodecRegistry::default())
            .expect_err("deferred error surfaces at freeze");
        assert!(error.is_state());
    }

    #[test]
    fn unset_header_survives_default_merge_at_freeze() {
        let mut parts = RequestParts::new(Method::POST);
        parts.set_target(":5000/echo".to_string());
        parts.headers_mut().unset("User-Agent");

        let mut defaults = HeaderMap::new();
        defaults.insert(header::USER_AGENT, HeaderValue::from_static("parley/0.1.0"));

        let wire = parts
            .freeze(&defaults, &CodecRegistry::default())
            .expect("freeze");
        assert!(wire.headers.get(header::USER_AGENT).is_none());
    }
}
