//! Buffer-vs-stream disposition and terminal response construction.
//!
//! The disposition is decided once, from the caller's explicit
//! preference or, absent one, from whether the response content type
//! resolves to a codec that buffers by default. Buffering drains and
//! decodes; streaming hands the live byte stream to the caller
//! untouched.

use crate::agent::ResponseHead;
use crate::codec::CodecRegistry;
use crate::error::Error;
use crate::http::request::RequestDescription;
use crate::http::response::{BodyStream, Response};

/// The buffer-vs-stream decision made for a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Buffer,
    Stream,
}

/// Decide the disposition: explicit preference wins, otherwise the
/// content type's default. Unknown and absent types stream, the safe
/// choice for arbitrarily large binary payloads.
#[must_use]
pub fn choose(
    preference: Option<bool>,
    content_type: Option<&str>,
    registry: &CodecRegistry,
) -> Disposition {
    match preference {
        Some(true) => Disposition::Buffer,
        Some(false) => Disposition::Stream,
        None => {
            if registry.buffers_by_default(content_type) {
                Disposition::Buffer
            } else {
                Disposition::Stream
            }
        }
    }
}

/// Build the terminal `Response` for the decided disposition.
///
/// Buffering accumulates the full body, decodes it through the registry
/// and completes with text and structured body populated. Streaming
/// completes immediately with the stream attached and text/body left
/// empty so callers can branch on `buffered()`.
///
/// # Errors
///
/// A transport failure while buffering, or a decode failure from a
/// matched codec, completes with an error instead of a corrupted
/// partial response.
pub fn materialize(
    head: ResponseHead,
    mut stream: BodyStream,
    disposition: Disposition,
    registry: &CodecRegistry,
    request: RequestDescription,
) -> Result<Response, Error> {
    match disposition {
        Disposition::Stream => Ok(Response::from_stream(
            head.status,
            head.headers,
            stream,
            request,
        )),
        Disposition::Buffer => {
            let bytes = stream.drain_bytes()?;
            let text = String::from_utf8_lossy(&bytes).into_owned();
            let body = match head.content_type() {
                Some(content_type) => {
                    registry.decode_for(content_type, &bytes).map_err(|e| {
                        tracing::warn!(
                            status = head.status.as_u16(),
                            content_type,
                            "buffered response failed to decode"
                        );
                        e
                    })?
                }
                None => None,
            };
            Ok(Response::from_buffer(
                head.status,
                head.headers,
                text,
                body.unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new())),
                request,
            ))
        }
    }
}

/// Minimal capability interface for `pipe` targets: anything that can
/// accept chunks and be told the stream finished. No stream base type
/// required.
pub trait WriteSink {
    fn write(&mut self, chunk: &[u8]);
    fn end(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, HeaderValue, StatusCode};

    fn head(content_type: Option<&str>) -> ResponseHead {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(
                http::header::CONTENT_TYPE,
                HeaderValue::from_str(ct).expect("test content type"),
            );
        }
        ResponseHead::new(StatusCode::OK, headers)
    }

    fn description() -> RequestDescription {
        RequestDescription {
            method: "GET".to_string(),
            url: ":5000/test".to_string(),
            data: serde_json::Value::Null,
        }
    }

    #[test]
    fn preference_overrides_content_type_default() {
        let registry = CodecRegistry::default();
        assert_eq!(
            choose(Some(false), Some("application/json"), &registry),
            Disposition::Stream
        );
        assert_eq!(
            choose(Some(true), Some("application/x-dog"), &registry),
            Disposition::Buffer
        );
    }

    #[test]
    fn unset_preference_follows_codec_default() {
        let registry = CodecRegistry::default();
        assert_eq!(
            choose(None, Some("application/json"), &registry),
            Disposition::Buffer
        );
        assert_eq!(
            choose(None, Some("text/plain"), &registry),
            Disposition::Buffer
        );
        assert_eq!(
            choose(None, Some("application/x-dog"), &registry),
            Disposition::Stream
        );
        assert_eq!(choose(None, None, &registry), Disposition::Stream);
    }

    #[test]
    fn buffering_a_type_without_decoder_keeps_text_and_empty_body() {
        let registry = CodecRegistry::default();
        let (sender, stream) = BodyStream::channel();
        sender.send("custom stuff");
        sender.finish();

        let response = materialize(
            head(Some("application/x-dog")),
            stream,
            Disposition::Buffer,
            &registry,
            description(),
        )
        .expect("materialize");

        assert!(response.buffered());
        assert_eq!(response.text(), Some("custom stuff"));
        assert_eq!(response.body(), &serde_json::json!({}));
    }

    #[test]
    fn transport_failure_during_buffering_surfaces_as_error() {
        let registry = CodecRegistry::default();
        let (sender, stream) = BodyStream::channel();
        sender.send("partial");
        sender.fail("connection reset");

        let error = materialize(
            head(Some("application/json")),
            stream,
            Disposition::Buffer,
            &registry,
            description(),
        )
        .expect_err("transport failure");
        assert!(error.is_transport());
    }
}
