//! Transport collaborator interface.
//!
//! The engine never opens sockets itself; a frozen request is handed to
//! an [`Agent`], which returns the response head and a live byte-stream
//! handle. Connection pooling, TLS and retries are the agent's business.

use std::fmt;
use std::sync::Arc;

use http::{HeaderMap, StatusCode};

use crate::error::Error;
use crate::http::request::WireRequest;
use crate::http::response::BodyStream;

/// Status line and headers of a response, available before body bytes
/// arrive.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

impl ResponseHead {
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap) -> Self {
        ResponseHead { status, headers }
    }

    /// The raw Content-Type header value, if present.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }
}

/// Connection-management collaborator shared across requests.
///
/// Failures (refused connection, timeout, TLS) are reported through the
/// `Err` arm and reach the caller on the completion path; they are never
/// panicked across the dispatch boundary.
pub trait Agent: Send + Sync {
    fn send(&self, request: &WireRequest) -> Result<(ResponseHead, BodyStream), Error>;
}

/// Tri-state transport override recorded on a request.
///
/// `Default` (never set) is distinguishable from `Disabled` (explicitly
/// cleared with `.agent(None)`), which the accessor contract requires.
#[derive(Clone, Default)]
pub enum AgentSelection {
    /// Never set; the client's transport applies.
    #[default]
    Default,
    /// Explicitly cleared.
    Disabled,
    /// Explicit override.
    Custom(Arc<dyn Agent>),
}

impl AgentSelection {
    #[must_use]
    pub fn is_default(&self) -> bool {
        matches!(self, AgentSelection::Default)
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        matches!(self, AgentSelection::Disabled)
    }

    /// The override, when one was set.
    #[must_use]
    pub fn custom(&self) -> Option<&Arc<dyn Agent>> {
        match self {
            AgentSelection::Custom(agent) => Some(agent),
            _ => None,
        }
    }
}

impl From<Arc<dyn Agent>> for AgentSelection {
    fn from(agent: Arc<dyn Agent>) -> Self {
        AgentSelection::Custom(agent)
    }
}

impl From<Option<Arc<dyn Agent>>> for AgentSelection {
    fn from(agent: Option<Arc<dyn Agent>>) -> Self {
        match agent {
            Some(agent) => AgentSelection::Custom(agent),
            None => AgentSelection::Disabled,
        }
    }
}

impl fmt::Debug for AgentSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentSelection::Default => f.write_str("Default"),
            AgentSelection::Disabled => f.write_str("Disabled"),
            AgentSelection::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
