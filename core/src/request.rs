//! Per-call configuration layered over a `ServerScope`.
//!
//! # Design
//! `CallScope` borrows its server scope read-only and owns everything that
//! is specific to one call. Setters return `&mut Self` so calls can be
//! chained; `dispatch` merges both layers into an `HttpRequest`, hands it
//! to a `Transport` and can only succeed once per scope.

use std::path::Path;
use std::time::Duration;

use log::info;

use crate::config::ServerScope;
use crate::content::ContentSource;
use crate::error::OpalError;
use crate::http::{HeaderList, HttpMethod, HttpRequest, OptionKey, OptionValue, TransportOptions};
use crate::response::Response;
use crate::transport::{Transport, UreqTransport};

pub const ACCEPT: &str = "Accept";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const APPLICATION_JSON: &str = "application/json";

/// Fixed path segment between the base URL and the resource path.
pub const WS_PREFIX: &str = "/ws";

#[derive(Debug)]
pub struct CallScope<'a> {
    server: &'a ServerScope,
    method: HttpMethod,
    resource: Option<String>,
    headers: HeaderList,
    options: TransportOptions,
    content: Option<ContentSource>,
    verbose: bool,
    sent: bool,
}

impl<'a> CallScope<'a> {
    pub fn new(server: &'a ServerScope) -> Self {
        let mut headers = HeaderList::new();
        headers.set(ACCEPT, APPLICATION_JSON);
        Self {
            server,
            method: HttpMethod::Get,
            resource: None,
            headers,
            options: TransportOptions::new(),
            content: None,
            verbose: false,
            sent: false,
        }
    }

    /// Set the method by name. An empty name means `GET`.
    pub fn set_method(&mut self, name: &str) -> Result<&mut Self, OpalError> {
        self.method = if name.is_empty() {
            HttpMethod::Get
        } else {
            name.parse()?
        };
        Ok(self)
    }

    pub fn method(&mut self, method: HttpMethod) -> &mut Self {
        self.method = method;
        self
    }

    pub fn get(&mut self) -> &mut Self {
        self.method(HttpMethod::Get)
    }

    pub fn put(&mut self) -> &mut Self {
        self.method(HttpMethod::Put)
    }

    pub fn post(&mut self) -> &mut Self {
        self.method(HttpMethod::Post)
    }

    pub fn delete(&mut self) -> &mut Self {
        self.method(HttpMethod::Delete)
    }

    pub fn options(&mut self) -> &mut Self {
        self.method(HttpMethod::Options)
    }

    pub fn current_method(&self) -> HttpMethod {
        self.method
    }

    /// Resource path under `/ws`, e.g. `/datasource/opal-data/tables`.
    pub fn set_resource(&mut self, path: &str) -> &mut Self {
        self.resource = Some(path.to_string());
        self
    }

    pub fn set_header(&mut self, name: &str, value: &str) -> &mut Self {
        self.headers.set(name, value);
        self
    }

    pub fn set_accept(&mut self, value: &str) -> &mut Self {
        self.set_header(ACCEPT, value)
    }

    pub fn set_content_type(&mut self, value: &str) -> &mut Self {
        self.set_header(CONTENT_TYPE, value)
    }

    pub fn accept_json(&mut self) -> &mut Self {
        self.set_accept(APPLICATION_JSON)
    }

    pub fn content_type_json(&mut self) -> &mut Self {
        self.set_content_type(APPLICATION_JSON)
    }

    pub fn set_transport_option(
        &mut self,
        key: OptionKey,
        value: OptionValue,
    ) -> Result<&mut Self, OpalError> {
        self.options.set(key, value)?;
        Ok(self)
    }

    pub fn timeout(&mut self, value: Duration) -> &mut Self {
        self.options
            .insert(OptionKey::Timeout, OptionValue::Duration(value));
        self
    }

    pub fn connect_timeout(&mut self, value: Duration) -> &mut Self {
        self.options
            .insert(OptionKey::ConnectTimeout, OptionValue::Duration(value));
        self
    }

    /// Turn statuses >= 400 into `OpalError::Http`.
    pub fn fail_on_error(&mut self) -> &mut Self {
        self.options
            .insert(OptionKey::FailOnError, OptionValue::Flag(true));
        self
    }

    pub fn enable_verbose(&mut self) -> &mut Self {
        self.verbose = true;
        self
    }

    /// Attach an in-memory body. Forces the method to `POST`.
    pub fn attach_content_bytes(&mut self, payload: impl Into<Vec<u8>>) -> &mut Self {
        self.attach(ContentSource::bytes(payload));
        self
    }

    /// Attach a file body. Forces the method to `POST`.
    pub fn attach_content_file(&mut self, path: impl AsRef<Path>) -> Result<&mut Self, OpalError> {
        let content = ContentSource::open(path)?;
        self.attach(content);
        Ok(self)
    }

    fn attach(&mut self, content: ContentSource) {
        if self.verbose {
            info!("* Content: {}", content.describe());
        }
        self.method = HttpMethod::Post;
        self.content = Some(content);
    }

    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    /// Merge the server and call layers into the request to send.
    ///
    /// Validation happens here, before any I/O. On success the scope is
    /// marked as sent and the attached content moves into the request.
    pub fn prepare(&mut self) -> Result<HttpRequest, OpalError> {
        if self.sent {
            return Err(OpalError::AlreadySent);
        }
        let base_url = self.server.base_url();
        if base_url.is_empty() {
            return Err(OpalError::Validation("base URL is missing".to_string()));
        }
        let resource = match self.resource.as_deref() {
            Some(resource) if !resource.is_empty() => resource,
            _ => return Err(OpalError::Validation("resource is missing".to_string())),
        };

        let mut call_headers = self.headers.clone();
        if self.method.sends_content()
            && !call_headers.contains_ignore_case(CONTENT_TYPE)
            && !self.server.headers().contains_ignore_case(CONTENT_TYPE)
        {
            call_headers.set(CONTENT_TYPE, APPLICATION_JSON);
        }

        let request = HttpRequest {
            method: self.method,
            url: format!("{base_url}{WS_PREFIX}{resource}"),
            headers: self.server.headers().merged_with(&call_headers),
            options: self.server.options().merged_with(&self.options),
            content: self.content.take(),
            verbose: self.verbose,
        };
        self.sent = true;
        Ok(request)
    }

    /// Send through `transport`. A second call fails with `AlreadySent`.
    pub fn dispatch(&mut self, transport: &dyn Transport) -> Result<Response, OpalError> {
        let request = self.prepare()?;
        let fail_on_error = request
            .options
            .flag(OptionKey::FailOnError)
            .unwrap_or(false);
        let raw = transport.execute(request)?;
        if fail_on_error && raw.status >= 400 {
            return Err(OpalError::Http {
                status: raw.status,
                body: raw.body,
            });
        }
        Ok(Response::from_raw(raw))
    }

    /// Send with the default `ureq` transport.
    pub fn send(&mut self) -> Result<Response, OpalError> {
        self.dispatch(&UreqTransport::new())
    }
}
