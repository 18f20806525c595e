//! Error taxonomy for the negotiation engine.
//!
//! A single crate-wide [`Error`] with a boxed inner carrying the [`Kind`],
//! an optional source and the URL it relates to. Free constructor
//! functions keep call sites terse.

pub mod constructors;
pub mod types;

pub use constructors::{builder, decode, encode, invalid_header, state, stream, transport, url};
pub use types::{Error, Kind, Result};
