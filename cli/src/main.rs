//! `opal` command-line entry point.
//!
//! Thin wrapper around `opal-core`: parses arguments, builds the server
//! and call scopes, sends the request and renders the response. Any
//! validation, transport or HTTP error exits with status 2.

mod args;
mod logger;
mod render;

use std::io::{self, Read};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use opal_core::OpalError;

use crate::args::Args;
use crate::logger::init_logger;

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logger(args.verbose) {
        eprintln!("Failed to initialize logger: {e}");
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::from(2)
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let server = args.server_scope()?;
    let mut call = server.request();
    args.configure(&mut call)?;
    if args.stdin {
        let mut content = Vec::new();
        io::stdin()
            .read_to_end(&mut content)
            .context("failed to read the request content from stdin")?;
        call.attach_content_bytes(content);
    }

    let response = call.send()?;
    debug!("received {} bytes with status {}", response.raw_body().len(), response.status());

    let rendered = render::render(&response, call.current_method(), args.json)?;
    render::write_output(&rendered, args.out.as_deref())
}

fn report(err: &anyhow::Error) {
    eprintln!("An error occurred: {err:#}");
    if let Some(OpalError::Http { body, .. }) = err.downcast_ref::<OpalError>() {
        if !body.is_empty() {
            eprintln!("{}", String::from_utf8_lossy(body));
        }
    }
}
