//! Request target parsing.
//!
//! Splits a raw request target such as `/getImages?tags=cat~orange` into its
//! path and a map of query parameters. Parsing is deliberately strict and
//! never fails:
//!
//! - only the first `?` separates path from query
//! - a parameter is kept only if splitting it on `=` yields exactly two parts
//! - values are kept raw (no percent-decoding)
//! - for repeated keys the last occurrence wins

use std::collections::HashMap;

/// A request target split into path and query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    /// Path component (everything before the first `?`)
    pub path: String,

    /// Raw query parameters
    pub params: HashMap<String, String>,
}

impl ParsedQuery {
    /// Get a query parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Get a query parameter, treating an empty value as absent.
    pub fn non_empty_param(&self, name: &str) -> Option<&str> {
        self.param(name).filter(|value| !value.is_empty())
    }
}

/// Parse a raw request target into path and parameters.
pub fn parse_query(target: &str) -> ParsedQuery {
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    };

    let mut params = HashMap::new();
    if let Some(query) = query {
        for pair in query.split('&') {
            let mut parts = pair.split('=');
            if let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) {
                params.insert(key.to_string(), value.to_string());
            }
        }
    }

    ParsedQuery {
        path: path.to_string(),
        params,
    }
}

/// Split a `~`-separated tag list as used by `/getImages?tags=a~b`.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split('~').map(str::to_string).collect()
}
