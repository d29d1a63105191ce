//! Server-wide configuration shared by every call of a CLI invocation.
//!
//! # Design
//! `ServerScope` holds the base URL, default headers, transport options and
//! the active authentication mode. Authentication leaves a footprint in the
//! header map (basic) or the option map (mutual TLS); switching modes
//! removes the other mode's footprint so both can never be active at once.

use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::OpalError;
use crate::http::{HeaderList, OptionKey, OptionValue, TlsVersion, TransportOptions};
use crate::request::CallScope;

pub const AUTHORIZATION: &str = "Authorization";

/// Scheme prefix of the Opal basic authorization header.
pub const AUTH_SCHEME: &str = "X-Opal-Auth";

const MTLS_KEYS: [OptionKey; 3] = [
    OptionKey::ClientCert,
    OptionKey::ClientKey,
    OptionKey::KeyPassphrase,
];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    None,
    BasicCustom { user: String },
    MutualTls { cert: PathBuf, key: PathBuf },
}

#[derive(Debug, Clone, Default)]
pub struct ServerScope {
    base_url: String,
    headers: HeaderList,
    options: TransportOptions,
    auth: AuthMode,
}

impl ServerScope {
    pub fn new(base_url: &str) -> Self {
        let mut scope = Self::default();
        scope.set_base_url(base_url);
        scope
    }

    pub fn set_base_url(&mut self, base_url: &str) -> &mut Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Authenticate with Opal credentials and drop any client certificate.
    pub fn set_auth_basic(&mut self, user: &str, password: &str) -> &mut Self {
        let token = STANDARD.encode(format!("{user}:{password}"));
        self.headers.set(AUTHORIZATION, format!("{AUTH_SCHEME} {token}"));
        for key in MTLS_KEYS {
            self.options.remove(key);
        }
        self.auth = AuthMode::BasicCustom {
            user: user.to_string(),
        };
        self
    }

    /// Authenticate with a client certificate and drop the authorization
    /// header. A CA bundle, when given, replaces the trusted roots.
    pub fn set_auth_mtls(
        &mut self,
        cert: impl Into<PathBuf>,
        key: impl Into<PathBuf>,
        passphrase: Option<&str>,
        ca_bundle: Option<PathBuf>,
    ) -> &mut Self {
        let cert = cert.into();
        let key = key.into();
        self.options
            .insert(OptionKey::ClientCert, OptionValue::Path(cert.clone()));
        self.options
            .insert(OptionKey::ClientKey, OptionValue::Path(key.clone()));
        match passphrase {
            Some(pass) => self
                .options
                .insert(OptionKey::KeyPassphrase, OptionValue::Text(pass.to_string())),
            None => {
                self.options.remove(OptionKey::KeyPassphrase);
            }
        }
        if let Some(ca) = ca_bundle {
            self.options.insert(OptionKey::CaBundle, OptionValue::Path(ca));
        }
        self.headers.remove(AUTHORIZATION);
        self.auth = AuthMode::MutualTls { cert, key };
        self
    }

    pub fn auth(&self) -> &AuthMode {
        &self.auth
    }

    pub fn set_transport_option(
        &mut self,
        key: OptionKey,
        value: OptionValue,
    ) -> Result<&mut Self, OpalError> {
        self.options.set(key, value)?;
        Ok(self)
    }

    pub fn set_default_header(&mut self, name: &str, value: &str) -> &mut Self {
        self.headers.set(name, value);
        self
    }

    pub fn verify_peer(&mut self, verify: bool) -> &mut Self {
        self.options.insert(OptionKey::VerifyPeer, OptionValue::Flag(verify));
        self
    }

    pub fn verify_host(&mut self, verify: bool) -> &mut Self {
        self.options.insert(OptionKey::VerifyHost, OptionValue::Flag(verify));
        self
    }

    pub fn tls_version(&mut self, version: TlsVersion) -> &mut Self {
        self.options.insert(OptionKey::TlsVersion, OptionValue::Tls(version));
        self
    }

    pub fn headers(&self) -> &HeaderList {
        &self.headers
    }

    pub fn options(&self) -> &TransportOptions {
        &self.options
    }

    /// Start a new call against this server.
    pub fn request(&self) -> CallScope<'_> {
        CallScope::new(self)
    }
}
