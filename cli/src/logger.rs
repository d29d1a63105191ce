//! Logger initialization.
//!
//! Diagnostics and the verbose wire trace go to stderr through
//! `env_logger`, so they never mix with the response written to stdout.
//! `RUST_LOG` is read first; `--verbose` raises this tool's own modules to
//! `info`.

use std::io::Write;

use log::{Level, LevelFilter, SetLoggerError};

pub fn init_logger(verbose: bool) -> Result<(), SetLoggerError> {
    let level = if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };

    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(LevelFilter::Warn);
    builder.filter_module("opal_core", level);
    builder.filter_module("opal", level);
    builder.target(env_logger::Target::Stderr);
    builder.format(|buf, record| {
        if record.level() <= Level::Warn {
            writeln!(buf, "{}: {}", record.level(), record.args())
        } else {
            writeln!(buf, "{}", record.args())
        }
    });
    builder.try_init()
}
