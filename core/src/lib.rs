//! Synchronous REST client core for the Opal data-management service.
//!
//! # Overview
//! A `ServerScope` carries what every call to one server shares (base URL,
//! authentication, default headers, transport options). A `CallScope`
//! layers one call on top of it (method, resource, headers, content) and
//! is dispatched exactly once through a `Transport`, producing a
//! `Response`.
//!
//! # Design
//! - Call-scope entries win over server-scope entries with the same key;
//!   distinct keys from both layers are all sent.
//! - The merged request is plain data (`HttpRequest`), so everything up to
//!   the `Transport` boundary is testable without a network.
//! - Validation errors are raised before any I/O.
//! - One request per call, no pooling, no retries.

pub mod config;
pub mod content;
pub mod error;
pub mod http;
pub mod request;
pub mod response;
pub mod transport;

pub use config::{AuthMode, ServerScope};
pub use content::ContentSource;
pub use error::{ErrorKind, OpalError, TransportCode};
pub use http::{
    HeaderList, HttpMethod, HttpRequest, OptionKey, OptionValue, RawResponse, TlsVersion,
    TransportOptions,
};
pub use request::CallScope;
pub use response::{HeaderValue, Headers, Response};
pub use transport::{Transport, UreqTransport};
