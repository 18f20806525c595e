//! Content-type codec registry with a deterministic fallback chain.
//!
//! Lookup order is exact mime match, then `type/*` wildcard, then the
//! binary fallback (raw bytes kept, nothing decoded). Mime keys are
//! normalized by stripping parameters and lowercasing, so
//! `application/json; charset=utf-8` matches `application/json`.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use hashbrown::HashMap;
use serde_json::{Map, Value};

use crate::error::{self, Error};

/// Encoder half of a codec: structured value to wire bytes.
pub type EncodeFn = Arc<dyn Fn(&Value) -> Result<Bytes, Error> + Send + Sync>;

/// Decoder half of a codec: wire bytes to structured value.
pub type DecodeFn = Arc<dyn Fn(&[u8]) -> Result<Value, Error> + Send + Sync>;

/// An encode/decode pair bound to a content type.
///
/// Either half may be absent: a decode-less codec (text, binary) leaves
/// the response's structured body empty, an encode-less one falls back
/// to string coercion for primitive values.
#[derive(Clone)]
pub struct Codec {
    encode: Option<EncodeFn>,
    decode: Option<DecodeFn>,
    buffers: bool,
}

impl Codec {
    /// A codec with no encode/decode halves that buffers by default.
    #[must_use]
    pub fn buffered() -> Self {
        Codec {
            encode: None,
            decode: None,
            buffers: true,
        }
    }

    /// A codec with no encode/decode halves that streams by default.
    #[must_use]
    pub fn streamed() -> Self {
        Codec {
            encode: None,
            decode: None,
            buffers: false,
        }
    }

    #[must_use]
    pub fn with_encode(
        mut self,
        encode: impl Fn(&Value) -> Result<Bytes, Error> + Send + Sync + 'static,
    ) -> Self {
        self.encode = Some(Arc::new(encode));
        self
    }

    #[must_use]
    pub fn with_decode(
        mut self,
        decode: impl Fn(&[u8]) -> Result<Value, Error> + Send + Sync + 'static,
    ) -> Self {
        self.decode = Some(Arc::new(decode));
        self
    }

    /// Whether responses of this type buffer when the caller expressed no
    /// preference.
    #[must_use]
    pub fn buffers_by_default(&self) -> bool {
        self.buffers
    }

    #[must_use]
    pub fn has_decoder(&self) -> bool {
        self.decode.is_some()
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("encode", &self.encode.is_some())
            .field("decode", &self.decode.is_some())
            .field("buffers", &self.buffers)
            .finish()
    }
}

/// Strip mime parameters and lowercase: `Text/HTML; charset=x` → `text/html`.
#[must_use]
pub fn normalize_mime(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Registry mapping normalized content types to codecs.
#[derive(Debug, Clone)]
pub struct CodecRegistry {
    entries: HashMap<String, Codec>,
    binary: Codec,
}

impl CodecRegistry {
    /// An empty registry with only the binary fallback.
    #[must_use]
    pub fn empty() -> Self {
        CodecRegistry {
            entries: HashMap::new(),
            binary: Codec::streamed(),
        }
    }

    /// Register a codec under a content type (or `type/*` wildcard).
    pub fn register(&mut self, content_type: &str, codec: Codec) {
        self.entries.insert(normalize_mime(content_type), codec);
    }

    /// Resolve a codec: exact match, `type/*` wildcard, binary fallback.
    #[must_use]
    pub fn lookup(&self, content_type: &str) -> &Codec {
        let normalized = normalize_mime(content_type);
        if let Some(codec) = self.entries.get(&normalized) {
            return codec;
        }
        if let Some(primary) = normalized.split('/').next() {
            if let Some(codec) = self.entries.get(&format!("{primary}/*")) {
                return codec;
            }
        }
        &self.binary
    }

    /// Disposition default for a response content type; an absent header
    /// counts as unknown and streams.
    #[must_use]
    pub fn buffers_by_default(&self, content_type: Option<&str>) -> bool {
        content_type.is_some_and(|ct| self.lookup(ct).buffers_by_default())
    }

    /// Encode a staged structured value for the given content type.
    ///
    /// A codec without an encoder coerces primitive values to their
    /// string rendering.
    ///
    /// # Errors
    ///
    /// Returns an encode-kind `Error` when the codec rejects the value,
    /// or when no codec applies and the value is not primitive.
    pub fn encode_for(&self, content_type: &str, value: &Value) -> Result<Bytes, Error> {
        let codec = self.lookup(content_type);
        if let Some(encode) = &codec.encode {
            return encode(value);
        }
        match value {
            Value::String(s) => Ok(Bytes::from(s.clone())),
            Value::Bool(_) | Value::Number(_) => Ok(Bytes::from(value.to_string())),
            Value::Null => Ok(Bytes::new()),
            _ => Err(error::encode(format!(
                "no codec applies to a structured body of type '{content_type}'"
            ))),
        }
    }

    /// Decode buffered response bytes.
    ///
    /// Returns `Ok(None)` when the resolved codec has no decoder (text,
    /// binary and unregistered types keep raw bytes only).
    ///
    /// # Errors
    ///
    /// Returns a decode-kind `Error` when the matched decoder rejects the
    /// bytes (e.g. malformed JSON).
    pub fn decode_for(&self, content_type: &str, bytes: &[u8]) -> Result<Option<Value>, Error> {
        match &self.lookup(content_type).decode {
            Some(decode) => decode(bytes).map(Some),
            None => Ok(None),
        }
    }
}

/// The built-in chain: JSON, url-encoded form, `text/*`, binary fallback.
impl Default for CodecRegistry {
    fn default() -> Self {
        let mut registry = CodecRegistry::empty();

        registry.register(
            "application/json",
            Codec::buffered()
                .with_encode(|value| {
                    serde_json::to_vec(value)
                        .map(Bytes::from)
                        .map_err(error::encode)
                })
                .with_decode(|bytes| {
                    serde_json::from_slice(bytes).map_err(error::decode)
                }),
        );

        registry.register(
            "application/x-www-form-urlencoded",
            Codec::buffered()
                .with_encode(|value| match value {
                    Value::Object(map) => {
                        let pairs: Vec<(String, String)> = map
                            .iter()
                            .map(|(k, v)| (k.clone(), form_scalar(v)))
                            .collect();
                        serde_urlencoded::to_string(&pairs)
                            .map(Bytes::from)
                            .map_err(error::encode)
                    }
                    other => Err(error::encode(format!(
                        "form encoding requires an object, got {other}"
                    ))),
                })
                .with_decode(|bytes| {
                    let mut map = Map::new();
                    for (key, value) in url::form_urlencoded::parse(bytes) {
                        map.insert(key.into_owned(), Value::String(value.into_owned()));
                    }
                    Ok(Value::Object(map))
                }),
        );

        // Textual payloads buffer but carry no structural decode.
        registry.register(
            "text/*",
            Codec::buffered().with_encode(|value| match value {
                Value::String(s) => Ok(Bytes::from(s.clone())),
                other => Ok(Bytes::from(other.to_string())),
            }),
        );

        registry
    }
}

fn form_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mime_parameters_are_stripped() {
        assert_eq!(
            normalize_mime("application/json; charset=utf-8"),
            "application/json"
        );
        assert_eq!(normalize_mime("Text/HTML"), "text/html");
    }

    #[test]
    fn wildcard_subtype_matches() {
        let registry = CodecRegistry::default();
        assert!(registry.buffers_by_default(Some("text/html")));
        assert!(registry.buffers_by_default(Some("text/plain; charset=utf-8")));
    }

    #[test]
    fn unknown_type_falls_back_to_binary() {
        let registry = CodecRegistry::default();
        assert!(!registry.buffers_by_default(Some("application/x-dog")));
        assert!(!registry.lookup("application/x-dog").has_decoder());
    }

    #[test]
    fn json_decode_failure_is_a_decode_error() {
        let registry = CodecRegistry::default();
        let err = registry
            .decode_for("application/json", b"not json")
            .expect_err("malformed json should fail decode");
        assert_eq!(err.kind(), crate::error::Kind::Decode);
    }

    #[test]
    fn form_round_trips_an_object() {
        let registry = CodecRegistry::default();
        let value = json!({"name": "tobi", "species": "ferret"});
        let bytes = registry
            .encode_for("application/x-www-form-urlencoded", &value)
            .expect("encode");
        let decoded = registry
            .decode_for("application/x-www-form-urlencoded", &bytes)
            .expect("decode")
            .expect("form has a decoder");
        assert_eq!(decoded, value);
    }

    #[test]
    fn primitive_without_codec_coerces_to_string() {
        let registry = CodecRegistry::default();
        let bytes = registry
            .encode_for("application/x-dog", &json!(42))
            .expect("primitive coercion");
        assert_eq!(&bytes[..], b"42");
    }

    #[test]
    fn structured_without_codec_is_an_encode_error() {
        let registry = CodecRegistry::default();
        let err = registry
            .encode_for("application/x-dog", &json!({"a": 1}))
            .expect_err("no codec applies");
        assert_eq!(err.kind(), crate::error::Kind::Encode);
    }
}
