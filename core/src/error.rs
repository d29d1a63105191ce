//! Error types for the Opal REST client core.
//!
//! # Design
//! A single `OpalError` enum covers every failure a call can produce. Callers
//! that only need to pick an exit path or a message prefix use `kind()`,
//! which folds the variants into the four categories a caller renders
//! differently: validation, transport, HTTP status and JSON parsing.
//! Validation-kind errors are always raised before any network I/O.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Coarse category of an `OpalError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Transport,
    Http,
    Parse,
}

/// Classification of a network-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportCode {
    Dns,
    Connect,
    Tls,
    Timeout,
    Io,
    Protocol,
    Other,
}

impl fmt::Display for TransportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportCode::Dns => "dns",
            TransportCode::Connect => "connect",
            TransportCode::Tls => "tls",
            TransportCode::Timeout => "timeout",
            TransportCode::Io => "io",
            TransportCode::Protocol => "protocol",
            TransportCode::Other => "other",
        };
        f.write_str(name)
    }
}

/// Errors returned by the configuration, transport and response layers.
#[derive(Debug, Error)]
pub enum OpalError {
    /// The method name is not one of GET, PUT, POST, DELETE, OPTIONS.
    #[error("not a valid method: {0}")]
    InvalidMethod(String),

    /// Unknown transport option name, or a value of the wrong type.
    #[error("invalid transport option: {0}")]
    InvalidOption(String),

    /// The call configuration cannot be sent as is.
    #[error("{0}")]
    Validation(String),

    /// A content or credential file could not be opened or read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// `dispatch` was called a second time on the same call.
    #[error("request already sent")]
    AlreadySent,

    /// DNS, connection, TLS or timeout failure. Never retried.
    #[error("transport error ({code}): {message}")]
    Transport { code: TransportCode, message: String },

    /// Status >= 400 while fail-on-error is enabled.
    #[error("HTTP {status}")]
    Http { status: u16, body: Vec<u8> },

    /// The response body is not valid JSON.
    #[error("invalid JSON in response body: {0}")]
    Parse(String),
}

impl OpalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OpalError::InvalidMethod(_)
            | OpalError::InvalidOption(_)
            | OpalError::Validation(_)
            | OpalError::Io { .. }
            | OpalError::AlreadySent => ErrorKind::Validation,
            OpalError::Transport { .. } => ErrorKind::Transport,
            OpalError::Http { .. } => ErrorKind::Http,
            OpalError::Parse(_) => ErrorKind::Parse,
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            OpalError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn transport(code: TransportCode, message: impl Into<String>) -> Self {
        OpalError::Transport {
            code,
            message: message.into(),
        }
    }
}

impl From<ureq::Error> for OpalError {
    fn from(err: ureq::Error) -> Self {
        let code = match &err {
            ureq::Error::HostNotFound => TransportCode::Dns,
            ureq::Error::ConnectionFailed => TransportCode::Connect,
            ureq::Error::Timeout(_) => TransportCode::Timeout,
            ureq::Error::Tls(_) | ureq::Error::Pem(_) => TransportCode::Tls,
            ureq::Error::Io(io) if io.kind() == io::ErrorKind::ConnectionRefused => {
                TransportCode::Connect
            }
            ureq::Error::Io(_) => TransportCode::Io,
            ureq::Error::Protocol(_) | ureq::Error::BadUri(_) => TransportCode::Protocol,
            _ => TransportCode::Other,
        };
        OpalError::transport(code, err.to_string())
    }
}

impl From<serde_json::Error> for OpalError {
    fn from(err: serde_json::Error) -> Self {
        OpalError::Parse(err.to_string())
    }
}
