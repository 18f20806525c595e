//! Client: shared transport, default headers and codec registry.
//!
//! One `Client` is cheap to clone and safe to share; the agent it holds
//! may be pooled across many requests. Per-request state never lives
//! here.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use http::{header, HeaderMap, HeaderName, HeaderValue};

use crate::agent::Agent;
use crate::codec::{Codec, CodecRegistry};

/// Client statistics for telemetry and monitoring
#[derive(Debug, Default)]
pub struct ClientStats {
    pub requests_dispatched: AtomicU64,
    pub responses_buffered: AtomicU64,
    pub responses_streamed: AtomicU64,
    pub transport_failures: AtomicU64,
}

impl ClientStats {
    /// Create a snapshot of current statistics
    #[must_use]
    pub fn snapshot(&self) -> ClientStatsSnapshot {
        ClientStatsSnapshot {
            requests_dispatched: self.requests_dispatched.load(Ordering::Relaxed),
            responses_buffered: self.responses_buffered.load(Ordering::Relaxed),
            responses_streamed: self.responses_streamed.load(Ordering::Relaxed),
            transport_failures: self.transport_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of [`ClientStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientStatsSnapshot {
    pub requests_dispatched: u64,
    pub responses_buffered: u64,
    pub responses_streamed: u64,
    pub transport_failures: u64,
}

struct ClientInner {
    agent: Arc<dyn Agent>,
    registry: CodecRegistry,
    defaults: HeaderMap,
    stats: ClientStats,
}

/// Shared request-construction context: the default transport, default
/// headers merged under every request, and the codec registry.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl Client {
    /// A client over the given transport with built-in codecs and the
    /// stock User-Agent default.
    #[must_use]
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        ClientBuilder::new(agent).build()
    }

    /// Start configuring a client.
    #[must_use]
    pub fn builder(agent: Arc<dyn Agent>) -> ClientBuilder {
        ClientBuilder::new(agent)
    }

    /// The default transport, used when a request carries no override.
    #[must_use]
    pub fn agent(&self) -> &Arc<dyn Agent> {
        &self.inner.agent
    }

    #[must_use]
    pub fn registry(&self) -> &CodecRegistry {
        &self.inner.registry
    }

    /// Headers merged under every request's explicit ones.
    #[must_use]
    pub fn default_headers(&self) -> &HeaderMap {
        &self.inner.defaults
    }

    #[must_use]
    pub fn stats(&self) -> &ClientStats {
        &self.inner.stats
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("defaults", &self.inner.defaults)
            .field("stats", &self.inner.stats.snapshot())
            .finish()
    }
}

/// Builder for [`Client`].
pub struct ClientBuilder {
    agent: Arc<dyn Agent>,
    registry: CodecRegistry,
    defaults: HeaderMap,
}

impl ClientBuilder {
    #[must_use]
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        let mut defaults = HeaderMap::new();
        let user_agent = format!("parley/{}", env!("CARGO_PKG_VERSION"));
        if let Ok(value) = HeaderValue::from_str(&user_agent) {
            defaults.insert(header::USER_AGENT, value);
        }
        ClientBuilder {
            agent,
            registry: CodecRegistry::default(),
            defaults,
        }
    }

    /// Replace the default User-Agent.
    #[must_use]
    pub fn user_agent(mut self, user_agent: &str) -> Self {
        match HeaderValue::from_str(user_agent) {
            Ok(value) => {
                self.defaults.insert(header::USER_AGENT, value);
            }
            Err(e) => log::warn!("invalid user agent '{user_agent}': {e}. Keeping default."),
        }
        self
    }

    /// Add a header merged under every request.
    #[must_use]
    pub fn default_header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.defaults.insert(name, value);
            }
            _ => log::warn!("invalid default header '{name}'. Skipping."),
        }
        self
    }

    /// Register a custom codec for a content type.
    #[must_use]
    pub fn codec(mut self, content_type: &str, codec: Codec) -> Self {
        self.registry.register(content_type, codec);
        self
    }

    #[must_use]
    pub fn build(self) -> Client {
        Client {
            inner: Arc::new(ClientInner {
                agent: self.agent,
                registry: self.registry,
                defaults: self.defaults,
                stats: ClientStats::default(),
            }),
        }
    }
}
