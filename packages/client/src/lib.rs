//! # parley client
//!
//! Request/response negotiation engine behind the `parley` fluent API:
//! target resolution, header and query merging, codec dispatch by
//! content type, and the buffer-vs-stream disposition with its error
//! semantics. The wire transport itself is an external [`Agent`]
//! collaborator; nothing here opens a socket.

#![deny(unsafe_code)]
#![warn(clippy::all)]

// Core modules
pub mod agent;
pub mod client;
pub mod codec;
pub mod error;
pub mod http;
pub mod materialize;

pub use agent::{Agent, AgentSelection, ResponseHead};
pub use client::{Client, ClientBuilder, ClientStats, ClientStatsSnapshot};
pub use codec::{Codec, CodecRegistry};
pub use error::{Error, Kind};
pub use http::headers::{HeaderError, HeaderStore};
pub use http::into_target::IntoTarget;
pub use http::query::{QueryInput, QueryStore};
pub use http::request::{RequestDescription, RequestParts, StagedBody, WireRequest};
pub use http::response::{
    BodyChunk, BodyEvent, BodySender, BodyStream, Encoding, Response, ResponseDescription,
};
pub use http::url::ParsedUrl;
pub use materialize::{Disposition, WriteSink};
