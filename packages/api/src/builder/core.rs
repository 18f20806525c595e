//! Core `Request` structure and base configuration methods.
//!
//! A `Request` is simultaneously a chainable builder, a staging area for
//! an outgoing body, and a serializable description of itself. It is
//! created by a verb factory, configured through chained mutators, and
//! consumed by exactly one terminal call (`end` or `pipe`).

use std::time::Duration;

use http::Method;

use parley_client::http::into_target::IntoTargetSealed;
use parley_client::{AgentSelection, Client, IntoTarget, RequestParts};

/// Content type enumeration for the common cases.
///
/// Free-form strings remain accepted everywhere a content type is taken,
/// so unregistered types stay expressible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// application/json content type
    ApplicationJson,
    /// application/x-www-form-urlencoded content type
    ApplicationFormUrlEncoded,
    /// application/octet-stream content type
    ApplicationOctetStream,
    /// text/plain content type
    TextPlain,
    /// text/html content type
    TextHtml,
}

impl ContentType {
    /// Convert content type to string representation
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::ApplicationJson => "application/json",
            ContentType::ApplicationFormUrlEncoded => "application/x-www-form-urlencoded",
            ContentType::ApplicationOctetStream => "application/octet-stream",
            ContentType::TextPlain => "text/plain",
            ContentType::TextHtml => "text/html",
        }
    }
}

impl AsRef<str> for ContentType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Fluent HTTP request builder.
///
/// Chainable mutators return `Self`; the terminal methods consume the
/// request, so it cannot be dispatched twice.
#[derive(Debug, Clone)]
pub struct Request {
    pub(crate) client: Client,
    pub(crate) parts: RequestParts,
}

impl Request {
    /// Start a request with the given method and no target yet.
    #[must_use]
    pub fn new(client: &Client, method: Method) -> Self {
        Request {
            client: client.clone(),
            parts: RequestParts::new(method),
        }
    }

    fn with_target(client: &Client, method: Method, target: impl IntoTarget) -> Self {
        let mut request = Request::new(client, method);
        request.parts.set_target(target.into_target());
        request
    }

    /// Start a GET request.
    ///
    /// # Examples
    /// ```no_run
    /// use parley::{Client, Request};
    ///
    /// fn fetch(client: &Client) -> Result<(), parley::Error> {
    ///     let response = Request::get(client, "https://api.example.com/users").end()?;
    ///     assert!(response.ok());
    ///     Ok(())
    /// }
    /// ```
    #[must_use]
    pub fn get(client: &Client, target: impl IntoTarget) -> Self {
        Request::with_target(client, Method::GET, target)
    }

    /// Start a POST request.
    #[must_use]
    pub fn post(client: &Client, target: impl IntoTarget) -> Self {
        Request::with_target(client, Method::POST, target)
    }

    /// Start a PUT request.
    #[must_use]
    pub fn put(client: &Client, target: impl IntoTarget) -> Self {
        Request::with_target(client, Method::PUT, target)
    }

    /// Start a PATCH request.
    #[must_use]
    pub fn patch(client: &Client, target: impl IntoTarget) -> Self {
        Request::with_target(client, Method::PATCH, target)
    }

    /// Start a DELETE request.
    #[must_use]
    pub fn delete(client: &Client, target: impl IntoTarget) -> Self {
        Request::with_target(client, Method::DELETE, target)
    }

    /// Start a HEAD request.
    #[must_use]
    pub fn head(client: &Client, target: impl IntoTarget) -> Self {
        Request::with_target(client, Method::HEAD, target)
    }

    /// Replace the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.parts.set_method(method);
        self
    }

    /// Set or replace the request target.
    ///
    /// Accepts absolute URLs, `host:port/path` shorthands (scheme
    /// defaults to `http`) and `:port/path` shorthands (host defaults to
    /// `localhost`).
    #[must_use]
    pub fn url(mut self, target: impl IntoTarget) -> Self {
        self.parts.set_target(target.into_target());
        self
    }

    /// Set the Content-Type used for body encoding.
    #[must_use]
    pub fn content_type(self, value: impl AsRef<str>) -> Self {
        self.set("content-type", value.as_ref())
    }

    /// Set the Accept header.
    #[must_use]
    pub fn accept(self, value: impl AsRef<str>) -> Self {
        self.set("accept", value.as_ref())
    }

    /// Set basic authentication credentials.
    #[must_use]
    pub fn auth(mut self, user: &str, pass: Option<&str>) -> Self {
        if let Err(e) = self.parts.headers_mut().basic_auth(user, pass) {
            self.parts.defer_error(e.into());
        }
        self
    }

    /// Set the transport timeout recorded on the frozen request.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.parts.set_timeout(timeout);
        self
    }

    /// Override the response disposition: `true` forces buffering,
    /// `false` forces streaming, regardless of content type.
    #[must_use]
    pub fn buffer(mut self, flag: bool) -> Self {
        self.parts.set_buffer_preference(flag);
        self
    }

    /// Override the transport agent for this request.
    ///
    /// Passing `None` explicitly clears the agent, which reads back as
    /// [`AgentSelection::Disabled`], observably different from never
    /// calling this method, which reads back as
    /// [`AgentSelection::Default`].
    #[must_use]
    pub fn agent(mut self, selection: impl Into<AgentSelection>) -> Self {
        self.parts.set_agent(selection.into());
        self
    }

    /// The current agent selection.
    #[must_use]
    pub fn selected_agent(&self) -> &AgentSelection {
        self.parts.agent_selection()
    }
}
