//! Response value, live byte stream and description snapshot.
//!
//! A buffered response carries decoded `text`/`body`; a streaming one
//! keeps the byte stream attached for the caller to drain. The stream
//! rides a bounded channel so a slow consumer holds the producer back.

use std::collections::BTreeMap;

use bytes::Bytes;
use crossbeam_channel::{bounded, Receiver, Sender};
use hashbrown::HashMap;
use http::{HeaderMap, StatusCode};
use once_cell::sync::OnceCell;
use serde::Serialize;
use serde_json::Value;

use crate::error::{self, Error};
use crate::http::request::RequestDescription;

/// Default bound for body-stream channels.
pub const STREAM_CAPACITY: usize = 1024;

/// Events delivered on a response body stream.
#[derive(Debug, Clone, Default)]
pub enum BodyEvent {
    /// Response body data chunk
    Data(Bytes),
    /// Error occurred during streaming
    Error(String),
    /// End of stream marker
    #[default]
    End,
}

/// Producer half of a body stream, held by the transport agent.
#[derive(Debug, Clone)]
pub struct BodySender {
    tx: Sender<BodyEvent>,
}

impl BodySender {
    /// Deliver a chunk; returns `false` once the consumer is gone.
    pub fn send(&self, chunk: impl Into<Bytes>) -> bool {
        self.tx.send(BodyEvent::Data(chunk.into())).is_ok()
    }

    /// Terminate the stream with a transport failure.
    pub fn fail(self, message: impl Into<String>) {
        let _ = self.tx.send(BodyEvent::Error(message.into()));
    }

    /// Terminate the stream normally.
    pub fn finish(self) {
        let _ = self.tx.send(BodyEvent::End);
    }
}

/// Chunk delivery mode configured via [`BodyStream::set_encoding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Deliver raw bytes
    #[default]
    Binary,
    /// Decode each chunk to text before delivery
    Utf8,
}

/// A chunk as delivered to the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyChunk {
    Data(Bytes),
    Text(String),
}

impl BodyChunk {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            BodyChunk::Data(bytes) => bytes,
            BodyChunk::Text(text) => text.as_bytes(),
        }
    }
}

/// Consumer half of a response body stream.
///
/// Iteration yields chunks in wire order and stops at the end event. A
/// dropped producer counts as end of stream; a mid-stream transport
/// failure surfaces as an `Err` item.
#[derive(Debug)]
pub struct BodyStream {
    rx: Receiver<BodyEvent>,
    encoding: Encoding,
    done: bool,
}

impl BodyStream {
    /// A producer/consumer pair with the default channel bound.
    #[must_use]
    pub fn channel() -> (BodySender, BodyStream) {
        Self::with_capacity(STREAM_CAPACITY)
    }

    /// A producer/consumer pair with an explicit bound. The bound is the
    /// backpressure: a producer ahead of the consumer by `capacity`
    /// chunks blocks until the consumer drains.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> (BodySender, BodyStream) {
        let (tx, rx) = bounded(capacity);
        (
            BodySender { tx },
            BodyStream {
                rx,
                encoding: Encoding::default(),
                done: false,
            },
        )
    }

    /// Switch chunk delivery to text or back to raw bytes.
    pub fn set_encoding(&mut self, encoding: Encoding) {
        self.encoding = encoding;
    }

    fn next_event(&mut self) -> Option<BodyEvent> {
        if self.done {
            return None;
        }
        match self.rx.recv() {
            Ok(BodyEvent::End) | Err(_) => {
                self.done = true;
                None
            }
            Ok(event) => Some(event),
        }
    }

    /// Drain the remaining bytes, failing on a mid-stream error event.
    pub(crate) fn drain_bytes(&mut self) -> Result<Vec<u8>, Error> {
        let mut collected = Vec::new();
        while let Some(event) = self.next_event() {
            match event {
                BodyEvent::Data(chunk) => collected.extend_from_slice(&chunk),
                BodyEvent::Error(message) => {
                    self.done = true;
                    return Err(error::transport(message));
                }
                BodyEvent::End => break,
            }
        }
        Ok(collected)
    }

    /// Forward every remaining chunk into `sink`, then signal `end`.
    ///
    /// # Errors
    ///
    /// A mid-stream transport failure aborts the forwarding without
    /// signalling `end` on the sink.
    pub fn pipe_into(&mut self, sink: &mut dyn crate::materialize::WriteSink) -> Result<(), Error> {
        while let Some(event) = self.next_event() {
            match event {
                BodyEvent::Data(chunk) => sink.write(&chunk),
                BodyEvent::Error(message) => {
                    self.done = true;
                    return Err(error::transport(message));
                }
                BodyEvent::End => break,
            }
        }
        sink.end();
        Ok(())
    }
}

impl Iterator for BodyStream {
    type Item = Result<BodyChunk, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_event()? {
            BodyEvent::Data(bytes) => Some(Ok(match self.encoding {
                Encoding::Binary => BodyChunk::Data(bytes),
                Encoding::Utf8 => BodyChunk::Text(String::from_utf8_lossy(&bytes).into_owned()),
            })),
            BodyEvent::Error(message) => {
                self.done = true;
                Some(Err(error::stream(message)))
            }
            BodyEvent::End => None,
        }
    }
}

/// An HTTP response after disposition was decided.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    text: Option<String>,
    body: Value,
    buffered: bool,
    stream: Option<BodyStream>,
    links: OnceCell<HashMap<String, String>>,
    request: RequestDescription,
}

impl Response {
    /// A fully buffered response with decoded text/body.
    #[must_use]
    pub fn from_buffer(
        status: StatusCode,
        headers: HeaderMap,
        text: String,
        body: Value,
        request: RequestDescription,
    ) -> Self {
        Response {
            status,
            headers,
            text: Some(text),
            body,
            buffered: true,
            stream: None,
            links: OnceCell::new(),
            request,
        }
    }

    /// A streaming response; the byte stream stays attached for the
    /// caller to consume.
    #[must_use]
    pub fn from_stream(
        status: StatusCode,
        headers: HeaderMap,
        stream: BodyStream,
        request: RequestDescription,
    ) -> Self {
        Response {
            status,
            headers,
            text: None,
            body: Value::Object(serde_json::Map::new()),
            buffered: false,
            stream: Some(stream),
            links: OnceCell::new(),
            request,
        }
    }

    /// A head-only response, used after `pipe` already drained the body.
    #[must_use]
    pub fn head_only(status: StatusCode, headers: HeaderMap, request: RequestDescription) -> Self {
        Response {
            status,
            headers,
            text: None,
            body: Value::Object(serde_json::Map::new()),
            buffered: false,
            stream: None,
            links: OnceCell::new(),
            request,
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    #[must_use]
    pub fn client_error(&self) -> bool {
        self.status.is_client_error()
    }

    #[must_use]
    pub fn server_error(&self) -> bool {
        self.status.is_server_error()
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A single header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Mapping parsed from the `Link` header, rel → URI. An absent
    /// header yields an empty mapping.
    pub fn links(&self) -> &HashMap<String, String> {
        self.links.get_or_init(|| {
            self.header("link").map(parse_links).unwrap_or_default()
        })
    }

    /// Decoded text when this response was buffered, `None` otherwise.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Decoded structured body; an empty object when nothing decoded.
    #[must_use]
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Which disposition was taken.
    #[must_use]
    pub fn buffered(&self) -> bool {
        self.buffered
    }

    /// The live byte stream, present on streaming responses.
    pub fn stream_mut(&mut self) -> Option<&mut BodyStream> {
        self.stream.as_mut()
    }

    /// Consume the response, taking the byte stream.
    #[must_use]
    pub fn into_stream(self) -> Option<BodyStream> {
        self.stream
    }

    /// Description of the originating request; read-only introspection,
    /// never a mutation handle.
    #[must_use]
    pub fn request(&self) -> &RequestDescription {
        &self.request
    }

    /// Plain structural snapshot, safe to log or compare.
    #[must_use]
    pub fn describe(&self) -> ResponseDescription {
        let mut header = BTreeMap::new();
        for (name, value) in &self.headers {
            if let Ok(value) = value.to_str() {
                header.insert(name.as_str().to_string(), value.to_string());
            }
        }
        ResponseDescription {
            header,
            req: self.request.clone(),
            status: self.status.as_u16(),
            text: self.text.clone(),
        }
    }

    /// The description rendered as a JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self.describe()).unwrap_or(Value::Null)
    }
}

/// Serializable snapshot of a response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseDescription {
    pub header: BTreeMap<String, String>,
    pub req: RequestDescription,
    pub status: u16,
    pub text: Option<String>,
}

/// Parse a `Link` header field into a rel → URI mapping.
fn parse_links(value: &str) -> HashMap<String, String> {
    let mut links = HashMap::new();
    for part in value.split(',') {
        let mut uri = None;
        let mut rel = None;
        for piece in part.split(';') {
            let piece = piece.trim();
            if piece.starts_with('<') && piece.ends_with('>') {
                uri = Some(&piece[1..piece.len() - 1]);
            } else if let Some(value) = piece.strip_prefix("rel=") {
                rel = Some(value.trim_matches('"'));
            }
        }
        if let (Some(uri), Some(rel)) = (uri, rel) {
            links.insert(rel.to_string(), uri.to_string());
        }
    }
    links
}
