//! Terminal methods: dispatch, pipe and introspection.
//!
//! `end` and `pipe` consume the request: a `Request` is destroyed by
//! its one execution and cannot be sent twice.

use std::sync::atomic::Ordering;

use serde_json::Value;

use parley_client::materialize::{self, Disposition, WriteSink};
use parley_client::{
    Client, Error, ParsedUrl, RequestDescription, Response, ResponseHead,
    BodyStream,
};

use crate::builder::core::Request;

struct Dispatched {
    client: Client,
    description: RequestDescription,
    preference: Option<bool>,
    head: ResponseHead,
    stream: BodyStream,
}

impl Request {
    /// Freeze the request, merge defaults, encode the staged body and
    /// hand it to the transport agent.
    fn dispatch(self) -> Result<Dispatched, Error> {
        let Request { client, parts } = self;

        let description = parts.describe();
        let wire = parts.freeze(client.default_headers(), client.registry())?;

        client
            .stats()
            .requests_dispatched
            .fetch_add(1, Ordering::Relaxed);
        log::debug!("{} {}", wire.method, wire.url);

        let agent = match parts.agent_selection().custom() {
            Some(agent) => agent.clone(),
            None => client.agent().clone(),
        };

        let (head, stream) = agent.send(&wire).map_err(|e| {
            client
                .stats()
                .transport_failures
                .fetch_add(1, Ordering::Relaxed);
            e
        })?;

        Ok(Dispatched {
            client,
            description,
            preference: parts.buffer_preference(),
            head,
            stream,
        })
    }

    /// Execute the request and materialize the response.
    ///
    /// The disposition is decided from an explicit `buffer(..)` call or,
    /// absent one, from the response content type: registered textual
    /// and structured types buffer and decode, everything else keeps the
    /// live byte stream attached for the caller to drain.
    ///
    /// # Errors
    ///
    /// Deferred builder errors, encoding failures, transport failures
    /// and response decode failures all surface here.
    pub fn end(self) -> Result<Response, Error> {
        let dispatched = self.dispatch()?;
        let registry = dispatched.client.registry().clone();

        let disposition = materialize::choose(
            dispatched.preference,
            dispatched.head.content_type(),
            &registry,
        );
        let stats = dispatched.client.stats();
        match disposition {
            Disposition::Buffer => stats.responses_buffered.fetch_add(1, Ordering::Relaxed),
            Disposition::Stream => stats.responses_streamed.fetch_add(1, Ordering::Relaxed),
        };

        materialize::materialize(
            dispatched.head,
            dispatched.stream,
            disposition,
            &registry,
            dispatched.description,
        )
    }

    /// Execute the request and forward the response bytes into `sink`,
    /// never buffering. Completion is signalled through `sink.end()`;
    /// the returned response carries the head only.
    ///
    /// # Errors
    ///
    /// Same failure surface as [`Request::end`], plus mid-stream
    /// transport failures while forwarding.
    pub fn pipe<S: WriteSink>(self, sink: &mut S) -> Result<Response, Error> {
        let mut dispatched = self.dispatch()?;
        dispatched
            .client
            .stats()
            .responses_streamed
            .fetch_add(1, Ordering::Relaxed);

        dispatched.stream.pipe_into(sink)?;
        Ok(Response::head_only(
            dispatched.head.status,
            dispatched.head.headers,
            dispatched.description,
        ))
    }

    /// Serializable snapshot of the request: method, target as given and
    /// the staged body.
    #[must_use]
    pub fn describe(&self) -> RequestDescription {
        self.parts.describe()
    }

    /// The description rendered as a JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self.describe()).unwrap_or(Value::Null)
    }

    /// Component view of the resolved target, including accumulated
    /// query parameters. Recomputed from the stored target on every
    /// call; repeated calls yield structurally equal results.
    ///
    /// # Errors
    ///
    /// Returns a builder-kind `Error` when no target was set or it does
    /// not resolve.
    pub fn parsed_url(&self) -> Result<ParsedUrl, Error> {
        self.parts.parsed_url()
    }
}
