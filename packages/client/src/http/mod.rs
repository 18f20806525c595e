//! HTTP vocabulary: targets, headers, query pairs, staged requests and
//! materialized responses.

pub mod headers;
pub mod into_target;
pub mod query;
pub mod request;
pub mod response;
pub mod url;

pub use headers::{HeaderError, HeaderStore};
pub use into_target::IntoTarget;
pub use query::{QueryInput, QueryStore};
pub use request::{RequestDescription, RequestParts, StagedBody, WireRequest};
pub use response::{
    BodyChunk, BodyEvent, BodySender, BodyStream, Encoding, Response, ResponseDescription,
};
pub use url::ParsedUrl;
