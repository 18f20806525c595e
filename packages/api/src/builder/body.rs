//! Request body staging.
//!
//! `send` stages values for codec encoding at freeze time: strings
//! concatenate, objects shallow-merge across calls. `write` appends raw
//! chunks for streaming-body sends.

use bytes::Bytes;
use serde::Serialize;

use parley_client::error;

use crate::builder::core::Request;

impl Request {
    /// Stage a body value.
    ///
    /// Repeated calls merge: string values concatenate into one text
    /// body, object values shallow-merge key by key. The staged value is
    /// encoded by the codec matching the Content-Type when the request
    /// is dispatched; a structured body defaults the Content-Type to
    /// `application/json`, a string body to
    /// `application/x-www-form-urlencoded`.
    ///
    /// # Examples
    /// ```no_run
    /// use parley::{Client, Request};
    /// use serde::Serialize;
    ///
    /// #[derive(Serialize)]
    /// struct CreateUser {
    ///     name: String,
    /// }
    ///
    /// fn create(client: &Client) -> Result<(), parley::Error> {
    ///     let user = CreateUser { name: "tobi".to_string() };
    ///     let response = Request::post(client, "https://api.example.com/users")
    ///         .send(&user)
    ///         .end()?;
    ///     assert!(response.ok());
    ///     Ok(())
    /// }
    /// ```
    #[must_use]
    pub fn send<T: Serialize>(mut self, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => self.parts.stage_send(value),
            Err(e) => self
                .parts
                .defer_error(error::encode(format!("unserializable body: {e}"))),
        }
        self
    }

    /// Stage raw bytes as the request body without any serialization.
    ///
    /// Useful for binary data or pre-serialized content; no Content-Type
    /// is inferred.
    #[must_use]
    pub fn send_raw(mut self, bytes: Bytes) -> Self {
        self.parts.stage_write(&bytes);
        self
    }

    /// Append a raw chunk to the outgoing body buffer.
    ///
    /// Returns whether the chunk was accepted; a structured body already
    /// staged via `send` rejects raw writes.
    pub fn write(&mut self, chunk: impl AsRef<[u8]>) -> bool {
        self.parts.stage_write(chunk.as_ref())
    }
}
