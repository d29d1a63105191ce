//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe one Opal call as plain data. `CallScope::prepare`
//! merges the server and call layers into an `HttpRequest`; a `Transport`
//! turns it into a `RawResponse`. Keeping the merged request as data makes
//! the layering rules testable without a network.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::content::ContentSource;
use crate::error::OpalError;

/// HTTP method accepted by the Opal web services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Put,
    Post,
    Delete,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
        }
    }

    /// Methods that get a JSON `Content-Type` by default.
    pub fn sends_content(&self) -> bool {
        matches!(self, HttpMethod::Put | HttpMethod::Post)
    }
}

impl FromStr for HttpMethod {
    type Err = OpalError;

    /// Case-sensitive: `get` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(HttpMethod::Get),
            "PUT" => Ok(HttpMethod::Put),
            "POST" => Ok(HttpMethod::Post),
            "DELETE" => Ok(HttpMethod::Delete),
            "OPTIONS" => Ok(HttpMethod::Options),
            other => Err(OpalError::InvalidMethod(other.to_string())),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered header list. Keys are case-sensitive; `set` overwrites an
/// existing entry in place so the original position is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderList {
    entries: Vec<(String, String)>,
}

impl HeaderList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Whether any entry matches `name` regardless of ASCII case, as HTTP
    /// compares header names.
    pub fn contains_ignore_case(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Two-level merge: entries of `overrides` replace entries of `self`
    /// with the same key; distinct keys from both are kept. Server entries
    /// come first, call-only entries after them.
    pub fn merged_with(&self, overrides: &HeaderList) -> HeaderList {
        let mut merged = self.clone();
        for (name, value) in overrides.iter() {
            merged.set(name, value);
        }
        merged
    }

    /// Serialize as `"Name: Value"` lines.
    pub fn to_lines(&self) -> Vec<String> {
        self.iter().map(|(k, v)| format!("{k}: {v}")).collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderList {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut list = HeaderList::new();
        for (k, v) in iter {
            list.set(k, v);
        }
        list
    }
}

/// Minimum TLS protocol version requested for the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TlsVersion {
    Tls1_0,
    Tls1_1,
    Tls1_2,
    Tls1_3,
}

impl FromStr for TlsVersion {
    type Err = OpalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1.0" | "tls1.0" => Ok(TlsVersion::Tls1_0),
            "1.1" | "tls1.1" => Ok(TlsVersion::Tls1_1),
            "1.2" | "tls1.2" => Ok(TlsVersion::Tls1_2),
            "1.3" | "tls1.3" => Ok(TlsVersion::Tls1_3),
            other => Err(OpalError::InvalidOption(format!("unknown TLS version {other}"))),
        }
    }
}

/// Names of the transport knobs a scope can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionKey {
    VerifyPeer,
    VerifyHost,
    TlsVersion,
    ClientCert,
    ClientKey,
    KeyPassphrase,
    CaBundle,
    ConnectTimeout,
    Timeout,
    FailOnError,
}

impl OptionKey {
    pub const ALL: [OptionKey; 10] = [
        OptionKey::VerifyPeer,
        OptionKey::VerifyHost,
        OptionKey::TlsVersion,
        OptionKey::ClientCert,
        OptionKey::ClientKey,
        OptionKey::KeyPassphrase,
        OptionKey::CaBundle,
        OptionKey::ConnectTimeout,
        OptionKey::Timeout,
        OptionKey::FailOnError,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OptionKey::VerifyPeer => "verify-peer",
            OptionKey::VerifyHost => "verify-host",
            OptionKey::TlsVersion => "tls-version",
            OptionKey::ClientCert => "client-cert",
            OptionKey::ClientKey => "client-key",
            OptionKey::KeyPassphrase => "key-passphrase",
            OptionKey::CaBundle => "ca-bundle",
            OptionKey::ConnectTimeout => "connect-timeout",
            OptionKey::Timeout => "timeout",
            OptionKey::FailOnError => "fail-on-error",
        }
    }

    /// Whether `value` has the type this option expects.
    pub fn accepts(&self, value: &OptionValue) -> bool {
        match self {
            OptionKey::VerifyPeer | OptionKey::VerifyHost | OptionKey::FailOnError => {
                matches!(value, OptionValue::Flag(_))
            }
            OptionKey::TlsVersion => matches!(value, OptionValue::Tls(_)),
            OptionKey::ClientCert | OptionKey::ClientKey | OptionKey::CaBundle => {
                matches!(value, OptionValue::Path(_))
            }
            OptionKey::KeyPassphrase => matches!(value, OptionValue::Text(_)),
            OptionKey::ConnectTimeout | OptionKey::Timeout => {
                matches!(value, OptionValue::Duration(_))
            }
        }
    }
}

impl FromStr for OptionKey {
    type Err = OpalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OptionKey::ALL
            .into_iter()
            .find(|key| key.name() == s)
            .ok_or_else(|| OpalError::InvalidOption(format!("unknown option {s}")))
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Flag(bool),
    Text(String),
    Path(PathBuf),
    Duration(Duration),
    Tls(TlsVersion),
}

/// Transport options of one scope, keyed by `OptionKey`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportOptions {
    values: BTreeMap<OptionKey, OptionValue>,
}

impl TransportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn set(&mut self, key: OptionKey, value: OptionValue) -> Result<(), OpalError> {
        if !key.accepts(&value) {
            return Err(OpalError::InvalidOption(format!(
                "{key} does not accept {value:?}"
            )));
        }
        self.values.insert(key, value);
        Ok(())
    }

    /// Unchecked insert for setters whose value type is fixed.
    pub(crate) fn insert(&mut self, key: OptionKey, value: OptionValue) {
        debug_assert!(key.accepts(&value));
        self.values.insert(key, value);
    }

    pub fn get(&self, key: OptionKey) -> Option<&OptionValue> {
        self.values.get(&key)
    }

    pub fn remove(&mut self, key: OptionKey) -> Option<OptionValue> {
        self.values.remove(&key)
    }

    pub fn contains(&self, key: OptionKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Start from `self` and overwrite with `overrides` by key.
    pub fn merged_with(&self, overrides: &TransportOptions) -> TransportOptions {
        let mut merged = self.clone();
        merged
            .values
            .extend(overrides.values.iter().map(|(k, v)| (*k, v.clone())));
        merged
    }

    pub fn flag(&self, key: OptionKey) -> Option<bool> {
        match self.get(key) {
            Some(OptionValue::Flag(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn duration(&self, key: OptionKey) -> Option<Duration> {
        match self.get(key) {
            Some(OptionValue::Duration(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn path(&self, key: OptionKey) -> Option<&Path> {
        match self.get(key) {
            Some(OptionValue::Path(p)) => Some(p.as_path()),
            _ => None,
        }
    }

    pub fn text(&self, key: OptionKey) -> Option<&str> {
        match self.get(key) {
            Some(OptionValue::Text(t)) => Some(t.as_str()),
            _ => None,
        }
    }

    pub fn tls_version(&self) -> Option<TlsVersion> {
        match self.get(OptionKey::TlsVersion) {
            Some(OptionValue::Tls(v)) => Some(*v),
            _ => None,
        }
    }
}

/// A fully merged Opal call, ready for a `Transport`.
///
/// Built by `CallScope::prepare`. `headers` holds server defaults first
/// and call entries after them; `options` is the merged option map.
#[derive(Debug)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HeaderList,
    pub options: TransportOptions,
    pub content: Option<ContentSource>,
    pub verbose: bool,
}

/// What a `Transport` captured: status, header pairs in arrival order and
/// the full body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}
