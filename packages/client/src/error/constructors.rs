use super::types::{Error, Kind};

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Creates an `Error` for a builder error.
pub fn builder<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Builder).with(e.into())
}

/// Creates an `Error` for an invalid-state error.
pub fn state<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::State).with(e.into())
}

/// Creates an `Error` for a body-encoding error.
pub fn encode<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Encode).with(e.into())
}

/// Creates an `Error` for a decode error.
pub fn decode<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Decode).with(e.into())
}

/// Creates an `Error` for a transport failure reported by the agent.
pub fn transport<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Transport).with(e.into())
}

/// Creates an `Error` for a body-stream processing failure.
pub fn stream<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Stream).with(e.into())
}

/// Creates an `Error` for an unusable request target.
pub fn url<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Builder).with(e.into())
}

/// Creates an `Error` for an invalid header name or value.
pub fn invalid_header<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Builder).with(e.into())
}
