//! Canonical parameter construction for EcoFlow request signing.
//!
//! Every signed request is reduced to a sorted list of `key=value` strings.
//! Where those parameters come from depends on the request's content type:
//!
//! ```text
//! content-type contains "application/json"  ->  flattened JSON body
//! anything else                             ->  decoded query string
//! ```
//!
//! JSON bodies are flattened into dotted and indexed paths:
//!
//! ```text
//! {"sn":"R331","params":{"quotas":["a","b"]}}
//!
//! params.quotas[0]=a
//! params.quotas[1]=b
//! sn=R331
//! ```
//!
//! Whatever the source, the final list is sorted with [`ascii_compare`] so
//! the result never depends on map iteration order.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use percent_encoding::percent_decode_str;
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::error::AuthError;

/// Content type marker that switches canonicalization to JSON mode.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Compare two strings byte by byte.
///
/// This is a plain lexicographic comparison over raw bytes: the first
/// differing byte decides, and when one string is a prefix of the other the
/// shorter one sorts first. It is neither locale-aware nor based on Unicode
/// scalar values.
///
/// # Examples
///
/// ```
/// use std::cmp::Ordering;
/// use ecoflow_auth::canonical::ascii_compare;
///
/// assert_eq!(ascii_compare("abc1", "abc!"), Ordering::Greater);
/// assert_eq!(ascii_compare("ab", "abc"), Ordering::Less);
/// ```
#[must_use]
pub fn ascii_compare(a: &str, b: &str) -> Ordering {
    a.as_bytes().cmp(b.as_bytes())
}

/// Format a single `key=value` parameter.
#[must_use]
pub fn param(key: &str, value: &str) -> String {
    format!("{key}={value}")
}

/// Join canonical parameters into the `&`-separated string form.
///
/// # Examples
///
/// ```
/// use ecoflow_auth::canonical::canonical_string;
///
/// let params = vec!["a=1".to_owned(), "b=2".to_owned()];
/// assert_eq!(canonical_string(&params), "a=1&b=2");
/// ```
#[must_use]
pub fn canonical_string(params: &[String]) -> String {
    params.join("&")
}

/// Whether the request declares a JSON body.
///
/// Only the first `content-type` value is inspected, case-insensitively.
#[must_use]
pub fn is_json_content(headers: &http::HeaderMap) -> bool {
    headers
        .get(http::header::CONTENT_TYPE)
        .is_some_and(|ct| {
            String::from_utf8_lossy(ct.as_bytes())
                .to_ascii_lowercase()
                .contains(CONTENT_TYPE_JSON)
        })
}

/// Build the canonical parameter list for a request.
///
/// JSON requests are read from `body`; all others from the query string of
/// `parts.uri`. `body` is `None` when the request carries no body at all.
///
/// # Errors
///
/// Returns [`AuthError::MissingBody`] if the request declares JSON but has no
/// body, [`AuthError::ParseJson`] if the body is not a JSON object, or
/// [`AuthError::InvalidQuery`] if a query component does not decode to UTF-8.
pub fn canonical_params(
    parts: &http::request::Parts,
    body: Option<&[u8]>,
) -> Result<Vec<String>, AuthError> {
    let params = if is_json_content(&parts.headers) {
        json_params(body)?
    } else {
        query_params(parts.uri.query().unwrap_or(""))?
    };

    debug!(count = params.len(), "Built canonical request parameters");

    Ok(params)
}

/// Build canonical parameters from a raw query string.
///
/// The query is decoded with `application/x-www-form-urlencoded` rules.
/// Values of a repeated key are sorted and joined with commas, so each key
/// appears exactly once. Pairs containing `;` or a malformed `%` escape are
/// skipped.
///
/// # Errors
///
/// Returns [`AuthError::InvalidQuery`] if a decoded key or value is not
/// valid UTF-8.
///
/// # Examples
///
/// ```
/// use ecoflow_auth::canonical::query_params;
///
/// assert_eq!(
///     query_params("test-list=b&test-list=a&example-1=12").unwrap(),
///     vec!["example-1=12".to_owned(), "test-list=a,b".to_owned()],
/// );
/// ```
pub fn query_params(query: &str) -> Result<Vec<String>, AuthError> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for pair in query.split('&') {
        if pair.is_empty() || pair.contains(';') {
            continue;
        }
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let (Some(key), Some(value)) = (unescape(key)?, unescape(value)?) else {
            continue;
        };
        grouped.entry(key).or_default().push(value);
    }

    let mut params: Vec<String> = grouped
        .into_iter()
        .map(|(key, mut values)| {
            values.sort_by(|a, b| ascii_compare(a, b));
            param(&key, &values.join(","))
        })
        .collect();

    params.sort_by(|a, b| ascii_compare(a, b));
    Ok(params)
}

/// Decode one query component. `Ok(None)` means the escape sequence is
/// malformed and the pair is dropped.
fn unescape(component: &str) -> Result<Option<String>, AuthError> {
    let bytes = component.as_bytes();
    let well_formed = bytes.iter().enumerate().all(|(i, &b)| {
        b != b'%'
            || bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit))
    });
    if !well_formed {
        return Ok(None);
    }

    let spaced = component.replace('+', " ");
    let decoded: Vec<u8> = percent_decode_str(&spaced).collect();
    String::from_utf8(decoded)
        .map(Some)
        .map_err(|_| AuthError::InvalidQuery(component.to_owned()))
}

/// Build canonical parameters from a JSON request body.
///
/// The body must be a JSON object. Nested objects contribute `parent.field`
/// keys and arrays contribute `parent[index]` keys; scalars become values.
///
/// # Errors
///
/// Returns [`AuthError::MissingBody`] when `body` is `None` and
/// [`AuthError::ParseJson`] when it does not hold a JSON object.
pub fn json_params(body: Option<&[u8]>) -> Result<Vec<String>, AuthError> {
    let raw = body.ok_or(AuthError::MissingBody)?;
    let object: Map<String, Value> = serde_json::from_slice(raw)?;

    let mut params = Vec::new();
    flatten_object("", &object, &mut params);

    params.sort_by(|a, b| ascii_compare(a, b));
    Ok(params)
}

fn flatten_object(prefix: &str, object: &Map<String, Value>, out: &mut Vec<String>) {
    for (field, value) in object {
        let key = if prefix.is_empty() {
            field.clone()
        } else {
            format!("{prefix}.{field}")
        };
        flatten_value(&key, value, out);
    }
}

fn flatten_value(key: &str, value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(object) => flatten_object(key, object, out),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_value(&format!("{key}[{index}]"), item, out);
            }
        }
        Value::String(s) => out.push(param(key, s)),
        Value::Number(n) => out.push(param(key, &number_text(n))),
        Value::Bool(b) => out.push(param(key, &b.to_string())),
        Value::Null => out.push(param(key, "null")),
    }
}

/// Render a JSON number the way it reads: integers verbatim, floats in plain
/// decimal notation with no trailing `.0`.
fn number_text(n: &Number) -> String {
    if n.is_f64() {
        n.as_f64().map_or_else(|| n.to_string(), |f| f.to_string())
    } else {
        n.to_string()
    }
}
