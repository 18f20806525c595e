//! # parley
//!
//! Fluent HTTP client request/response abstraction: a chainable builder
//! that constructs a request, dispatches it over an [`Agent`] transport
//! collaborator, and exposes the response either fully buffered and
//! decoded or as a live byte stream, decided by content type.

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod builder;

// Re-export all public API components
pub use builder::{ContentType, Request};

// Re-export important types from client package
pub use parley_client::{
    Agent, AgentSelection, BodyChunk, BodyEvent, BodySender, BodyStream, Client, ClientBuilder,
    ClientStats, ClientStatsSnapshot, Codec, CodecRegistry, Disposition, Encoding, Error,
    HeaderStore, IntoTarget, Kind, ParsedUrl, QueryInput, RequestDescription, RequestParts,
    Response, ResponseDescription, ResponseHead, WireRequest, WriteSink,
};

/// Start a GET request.
///
/// Shorthand for [`Request::get`].
#[must_use]
pub fn get(client: &Client, target: impl IntoTarget) -> Request {
    Request::get(client, target)
}

/// Start a POST request.
///
/// Shorthand for [`Request::post`].
#[must_use]
pub fn post(client: &Client, target: impl IntoTarget) -> Request {
    Request::post(client, target)
}

/// Start a PUT request.
///
/// Shorthand for [`Request::put`].
#[must_use]
pub fn put(client: &Client, target: impl IntoTarget) -> Request {
    Request::put(client, target)
}

/// Start a PATCH request.
///
/// Shorthand for [`Request::patch`].
#[must_use]
pub fn patch(client: &Client, target: impl IntoTarget) -> Request {
    Request::patch(client, target)
}

/// Start a DELETE request.
///
/// Shorthand for [`Request::delete`].
#[must_use]
pub fn delete(client: &Client, target: impl IntoTarget) -> Request {
    Request::delete(client, target)
}

/// Start a HEAD request.
///
/// Shorthand for [`Request::head`].
#[must_use]
pub fn head(client: &Client, target: impl IntoTarget) -> Request {
    Request::head(client, target)
}
