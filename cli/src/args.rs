//! Command-line arguments and their mapping onto the two configuration
//! scopes.

use std::num::ParseIntError;
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgGroup, Parser};
use opal_core::{CallScope, OpalError, OptionKey, OptionValue, ServerScope, TlsVersion};

/// REST call to Opal. Output the result on the stdout.
#[derive(Debug, Parser)]
#[command(name = "opal", version)]
#[command(group(ArgGroup::new("auth").required(true).args(["user", "cert"])))]
pub struct Args {
    /// Opal server base url
    #[arg(long, short = 'o', env = "OPAL_URL")]
    pub opal: String,

    /// User name
    #[arg(long, short = 'u', requires = "password")]
    pub user: Option<String>,

    /// User password
    #[arg(long, short = 'p', env = "OPAL_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Client certificate (PEM)
    #[arg(long, short = 'c', requires = "key", conflicts_with = "user")]
    pub cert: Option<PathBuf>,

    /// Client private key (PEM)
    #[arg(long, short = 'k', requires = "cert")]
    pub key: Option<PathBuf>,

    /// Passphrase of the client private key
    #[arg(long, requires = "key")]
    pub key_password: Option<String>,

    /// CA certificates (PEM) used to verify the server
    #[arg(long)]
    pub ca_bundle: Option<PathBuf>,

    /// Web service path, for instance: /datasource/xxx/table/yyy/variable/vvv
    #[arg(long, short = 'w')]
    pub ws: String,

    /// HTTP method (default is GET, others are POST, PUT, DELETE, OPTIONS)
    #[arg(long, short = 'm')]
    pub method: Option<String>,

    /// Accept header (default is application/json)
    #[arg(long, short = 'a')]
    pub accept: Option<String>,

    /// Content-Type header (default is application/json in case of POST or PUT requests)
    #[arg(long, short = 't')]
    pub content_type: Option<String>,

    /// Read the request content from the stdin
    #[arg(long, short = 'i', conflicts_with = "file")]
    pub stdin: bool,

    /// Read the request content from a file
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// Write the response to a file instead of the stdout
    #[arg(long, short = 'O')]
    pub out: Option<PathBuf>,

    /// Pretty JSON formatting of the response
    #[arg(long, short = 'j')]
    pub json: bool,

    /// Verbose output
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Total request timeout, in seconds
    #[arg(long, value_parser = parse_seconds)]
    pub timeout: Option<Duration>,

    /// Connection timeout, in seconds
    #[arg(long, value_parser = parse_seconds)]
    pub connect_timeout: Option<Duration>,

    /// Minimum TLS version (only 1.2 can be enforced)
    #[arg(long)]
    pub tls_version: Option<TlsVersion>,

    /// Do not verify the server certificate
    #[arg(long)]
    pub insecure: bool,
}

fn parse_seconds(value: &str) -> Result<Duration, ParseIntError> {
    value.parse().map(Duration::from_secs)
}

impl Args {
    /// Server-wide settings: base URL, TLS and authentication.
    pub fn server_scope(&self) -> Result<ServerScope, OpalError> {
        let mut server = ServerScope::new(&self.opal);

        // Self-signed certificates are the norm on Opal test servers.
        let https = self.opal.starts_with("https:");
        if self.insecure || (https && self.ca_bundle.is_none()) {
            server.verify_peer(false);
        }
        if let Some(version) = self.tls_version {
            server.tls_version(version);
        }
        if let Some(ca) = &self.ca_bundle {
            server.set_transport_option(OptionKey::CaBundle, OptionValue::Path(ca.clone()))?;
        }

        match (&self.user, &self.cert, &self.key) {
            (Some(user), _, _) => {
                server.set_auth_basic(user, self.password.as_deref().unwrap_or(""));
            }
            (None, Some(cert), Some(key)) => {
                server.set_auth_mtls(
                    cert.clone(),
                    key.clone(),
                    self.key_password.as_deref(),
                    self.ca_bundle.clone(),
                );
            }
            _ => {}
        }
        Ok(server)
    }

    /// Per-call settings. Content is attached last so it can force `POST`.
    pub fn configure(&self, call: &mut CallScope<'_>) -> Result<(), OpalError> {
        call.fail_on_error();
        if self.verbose {
            call.enable_verbose();
        }
        match &self.accept {
            Some(accept) => call.set_accept(accept),
            None => call.accept_json(),
        };
        if let Some(content_type) = &self.content_type {
            call.set_content_type(content_type);
        }
        if let Some(timeout) = self.timeout {
            call.timeout(timeout);
        }
        if let Some(timeout) = self.connect_timeout {
            call.connect_timeout(timeout);
        }
        call.set_method(self.method.as_deref().unwrap_or(""))?
            .set_resource(&self.ws);
        if let Some(path) = &self.file {
            call.attach_content_file(path)?;
        }
        Ok(())
    }
}
