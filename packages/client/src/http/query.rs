//! Additive query-pair store.
//!
//! Pairs accumulate across calls in insertion order and are appended to
//! the URL's existing query string at send time. No deduplication: a key
//! present in the target string and added programmatically appears twice,
//! matching wire semantics.

use serde::Serialize;
use serde_json::Value;
use url::form_urlencoded;
use url::Url;

use crate::error::{self, Error};

/// Accepted inputs for a `query(..)` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryInput {
    /// Raw query-string fragment, e.g. `"a=1&b=2"`
    Raw(String),
    /// Explicit key/value pairs
    Pairs(Vec<(String, String)>),
}

impl QueryInput {
    /// Build pairs from any serializable parameter struct or map.
    ///
    /// # Errors
    ///
    /// Returns a builder-kind `Error` when the value does not flatten to
    /// key/value pairs.
    pub fn params<T: Serialize>(params: &T) -> Result<Self, Error> {
        let raw = serde_urlencoded::to_string(params)
            .map_err(|e| error::builder(format!("unencodable query parameters: {e}")))?;
        Ok(QueryInput::Raw(raw))
    }
}

impl From<&str> for QueryInput {
    fn from(raw: &str) -> Self {
        QueryInput::Raw(raw.to_string())
    }
}

impl From<String> for QueryInput {
    fn from(raw: String) -> Self {
        QueryInput::Raw(raw)
    }
}

impl From<Vec<(String, String)>> for QueryInput {
    fn from(pairs: Vec<(String, String)>) -> Self {
        QueryInput::Pairs(pairs)
    }
}

impl From<&[(&str, &str)]> for QueryInput {
    fn from(pairs: &[(&str, &str)]) -> Self {
        QueryInput::Pairs(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }
}

/// A JSON object maps to its entries; scalars render without quoting.
impl From<Value> for QueryInput {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => QueryInput::Pairs(
                map.into_iter()
                    .map(|(k, v)| (k, scalar_string(&v)))
                    .collect(),
            ),
            other => QueryInput::Raw(scalar_string(&other)),
        }
    }
}

fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Ordered, additive query-pair accumulator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryStore {
    pairs: Vec<(String, String)>,
}

impl QueryStore {
    #[must_use]
    pub fn new() -> Self {
        QueryStore { pairs: Vec::new() }
    }

    /// Merge more pairs in, preserving order of arrival.
    pub fn add(&mut self, input: QueryInput) {
        match input {
            QueryInput::Raw(raw) => {
                for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
                    self.pairs.push((key.into_owned(), value.into_owned()));
                }
            }
            QueryInput::Pairs(pairs) => self.pairs.extend(pairs),
        }
    }

    /// The accumulated pairs in arrival order.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Append the accumulated pairs to the URL, keeping whatever query
    /// string the target already carried.
    pub fn append_to(&self, url: &mut Url) {
        if self.pairs.is_empty() {
            return;
        }
        let mut editor = url.query_pairs_mut();
        for (key, value) in &self.pairs {
            editor.append_pair(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_and_structured_inputs_accumulate_in_order() {
        let mut store = QueryStore::new();
        store.add(QueryInput::from("a=1&b=2"));
        store.add(QueryInput::from(json!({"c": 3})));
        assert_eq!(
            store.pairs(),
            &[
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
                ("c".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn serializable_params_flatten_to_pairs() {
        #[derive(serde::Serialize)]
        struct Params {
            page: u32,
            q: &'static str,
        }

        let input = QueryInput::params(&Params { page: 2, q: "ferret" }).expect("params");
        assert_eq!(input, QueryInput::Raw("page=2&q=ferret".to_string()));
    }

    #[test]
    fn append_keeps_existing_query_without_dedup() {
        let mut url = Url::parse("http://localhost:5000/p?a=1").expect("url");
        let mut store = QueryStore::new();
        store.add(QueryInput::from("a=2"));
        store.append_to(&mut url);
        assert_eq!(url.query(), Some("a=1&a=2"));
    }
}
