//! Captured outcome of one Opal call.
//!
//! # Design
//! Header values are a tagged union: a name seen once holds a `Scalar`,
//! and the second occurrence promotes it to a `List` that keeps arrival
//! order. Consumers match on the variant instead of guessing. Lookup is
//! case-insensitive because the HTTP stack may normalize names.

use std::borrow::Cow;

use crate::error::OpalError;
use crate::http::RawResponse;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Scalar(String),
    List(Vec<String>),
}

impl HeaderValue {
    pub fn first(&self) -> &str {
        match self {
            HeaderValue::Scalar(value) => value,
            HeaderValue::List(values) => values.first().map(String::as_str).unwrap_or(""),
        }
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            HeaderValue::Scalar(value) => vec![value.as_str()],
            HeaderValue::List(values) => values.iter().map(String::as_str).collect(),
        }
    }

    pub fn joined(&self, separator: &str) -> String {
        self.values().join(separator)
    }

    fn push(&mut self, value: String) {
        match self {
            HeaderValue::Scalar(first) => {
                *self = HeaderValue::List(vec![std::mem::take(first), value]);
            }
            HeaderValue::List(values) => values.push(value),
        }
    }
}

impl PartialEq<&str> for HeaderValue {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, HeaderValue::Scalar(value) if value == other)
    }
}

impl PartialEq<[&str; 2]> for HeaderValue {
    fn eq(&self, other: &[&str; 2]) -> bool {
        matches!(self, HeaderValue::List(values) if values.iter().eq(other.iter()))
    }
}

/// Response headers in first-arrival order of their names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, HeaderValue)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one received header, promoting repeated names to a list.
    pub fn push(&mut self, name: &str, value: &str) {
        let value = value.trim().to_string();
        match self
            .entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => existing.push(value),
            None => self
                .entries
                .push((name.to_string(), HeaderValue::Scalar(value))),
        }
    }

    /// Record a raw `"Name: value"` line. Lines without a colon, such as
    /// the status line or the blank terminator, are ignored.
    pub fn push_line(&mut self, line: &str) {
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            if !name.is_empty() {
                self.push(name, value);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: Headers,
    body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, headers: Headers, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn from_raw(raw: RawResponse) -> Self {
        let mut headers = Headers::new();
        for (name, value) in &raw.headers {
            headers.push(name, value);
        }
        Self::new(raw.status, headers, raw.body)
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Methods allowed on the resource, as reported by an OPTIONS call.
    pub fn allow(&self) -> Option<String> {
        self.header("Allow").map(|v| v.joined(", "))
    }

    pub fn raw_body(&self) -> &[u8] {
        &self.body
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Re-serialize the body with sorted keys and two-space indentation.
    /// The output is pure ASCII: other characters become `\uXXXX` escapes.
    pub fn pretty_json(&self) -> Result<String, OpalError> {
        let value: serde_json::Value = serde_json::from_slice(&self.body)?;
        let pretty = serde_json::to_string_pretty(&value)?;
        Ok(escape_non_ascii(&pretty))
    }
}

/// Outside of strings serialized JSON is already ASCII, so escaping every
/// other character in place only touches string contents.
fn escape_non_ascii(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut units = [0u16; 2];
    for c in json.chars() {
        if c.is_ascii() && c != '\u{7f}' {
            out.push(c);
        } else {
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    out
}
