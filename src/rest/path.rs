//! Path building for REST resources.
//!
//! Mailman addresses most resources by a path relative to the API root
//! (`lists/{list_id}/member/{address}`). This module interpolates those
//! templates and merges query parameters into paths that may already carry
//! a query string.
//!
//! # Example
//!
//! ```rust
//! use mailman_client::rest::{build_path, with_query};
//!
//! let path = build_path(
//!     "lists/{list_id}/member/{address}",
//!     &[("list_id", "ant.example.com"), ("address", "anne@example.com")],
//! );
//! assert_eq!(path, "lists/ant.example.com/member/anne@example.com");
//!
//! let paged = with_query("lists?advertised=true", &[("count", "50"), ("page", "2")]);
//! assert_eq!(paged, "lists?advertised=true&count=50&page=2");
//! ```

use std::collections::BTreeMap;
use std::fmt::Display;

use crate::clients::encode_pairs;

/// Builds a path from a template by replacing `{name}` placeholders.
///
/// Placeholders without a matching entry are left untouched.
#[must_use]
pub fn build_path<V: Display>(template: &str, ids: &[(&str, V)]) -> String {
    let mut result = template.to_string();

    for (key, value) in ids {
        let placeholder = format!("{{{key}}}");
        result = result.replace(&placeholder, &value.to_string());
    }

    result
}

/// Merges `params` into the query string of `path`.
///
/// Existing parameters are kept unless `params` names them, in which case
/// they are replaced. The resulting query is sorted by key.
#[must_use]
pub fn with_query<V: AsRef<str>>(path: &str, params: &[(&str, V)]) -> String {
    let (base, query) = path.split_once('?').unwrap_or((path, ""));

    let mut merged: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        merged
            .entry(decode_component(key))
            .or_default()
            .push(decode_component(value));
    }
    for (key, value) in params {
        merged.insert((*key).to_string(), vec![value.as_ref().to_string()]);
    }

    if merged.is_empty() {
        return base.to_string();
    }

    let query = encode_pairs(
        merged
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |value| (key.as_str(), value.as_str()))),
    );
    format!("{base}?{query}")
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).map_or(spaced.clone(), std::borrow::Cow::into_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_template_interpolation_single_id() {
        let result = build_path("domains/{domain}", &[("domain", "example.com")]);
        assert_eq!(result, "domains/example.com");
    }

    #[test]
    fn test_path_template_interpolation_multiple_ids() {
        let result = build_path(
            "lists/{fqdn_listname}/{role}/{address}",
            &[
                ("fqdn_listname", "ant@example.com"),
                ("role", "moderator"),
                ("address", "bob@example.com"),
            ],
        );
        assert_eq!(result, "lists/ant@example.com/moderator/bob@example.com");
    }

    #[test]
    fn test_numeric_ids() {
        let result = build_path("lists/{list_id}/held/{id}", &[("list_id", "ant.example.com")]);
        assert_eq!(result, "lists/ant.example.com/held/{id}");
        assert_eq!(build_path("queues/{id}", &[("id", 7)]), "queues/7");
    }

    #[test]
    fn test_with_query_adds_to_plain_path() {
        assert_eq!(
            with_query("domains", &[("page", "1"), ("count", "50")]),
            "domains?count=50&page=1"
        );
    }

    #[test]
    fn test_with_query_merges_and_sorts_existing_parameters() {
        assert_eq!(
            with_query("/some-path?with=a&query=string", &[("count", "50"), ("page", "1")]),
            "/some-path?count=50&page=1&query=string&with=a"
        );
    }

    #[test]
    fn test_with_query_replaces_existing_values() {
        assert_eq!(
            with_query("members?count=10&page=4", &[("count", "25"), ("page", "2")]),
            "members?count=25&page=2"
        );
    }

    #[test]
    fn test_with_query_round_trips_encoded_values() {
        assert_eq!(
            with_query("members/find?subscriber=anne%40example.com", &[("page", "1")]),
            "members/find?page=1&subscriber=anne%40example.com"
        );
    }

    #[test]
    fn test_with_query_without_params_keeps_path() {
        let empty: &[(&str, &str)] = &[];
        assert_eq!(with_query("lists", empty), "lists");
    }
}
