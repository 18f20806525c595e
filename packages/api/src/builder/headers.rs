//! Header and query manipulation on the fluent builder.

use parley_client::QueryInput;

use crate::builder::core::Request;

impl Request {
    /// Set a header field; keys are case-insensitive and the last write
    /// per key wins.
    ///
    /// # Examples
    /// ```no_run
    /// use parley::{Client, Request};
    ///
    /// fn tagged(client: &Client) -> Request {
    ///     Request::get(client, "https://api.example.com/data")
    ///         .set("X-API-Version", "v1")
    /// }
    /// ```
    #[must_use]
    pub fn set(mut self, name: &str, value: &str) -> Self {
        if let Err(e) = self.parts.headers_mut().set(name, value) {
            self.parts.defer_error(e.into());
        }
        self
    }

    /// Remove a header field and keep defaults from reinserting it.
    #[must_use]
    pub fn unset(mut self, name: &str) -> Self {
        self.parts.headers_mut().unset(name);
        self
    }

    /// Add multiple headers without overwriting order guarantees of
    /// individual `set` calls.
    #[must_use]
    pub fn headers(
        mut self,
        headers_config: impl Into<hashbrown::HashMap<&'static str, &'static str>>,
    ) -> Self {
        let headers_config = headers_config.into();
        for (header_key, header_value) in headers_config {
            if let Err(e) = self.parts.headers_mut().set(header_key, header_value) {
                self.parts.defer_error(e.into());
            }
        }
        self
    }

    /// Add query parameters; calls merge additively and nothing is
    /// deduplicated against the target's existing query string.
    ///
    /// Accepts raw fragments (`"a=1&b=2"`), explicit pairs, or a JSON
    /// object.
    #[must_use]
    pub fn query(mut self, input: impl Into<QueryInput>) -> Self {
        self.parts.add_query(input.into());
        self
    }
}
