//! Fluent request builder.
//!
//! Split by concern: core structure and configuration, header/query
//! manipulation, body staging, and the terminal dispatch methods.

pub mod body;
pub mod core;
pub mod headers;
pub mod terminal;

pub use self::core::{ContentType, Request};
