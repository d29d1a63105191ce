//! Turns a response into the bytes shown to the user.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use opal_core::{HttpMethod, OpalError, Response};

/// Pretty JSON when asked for, the `Allow` header for `OPTIONS`, otherwise
/// the body untouched.
pub fn render(response: &Response, method: HttpMethod, json: bool) -> Result<Vec<u8>, OpalError> {
    if json {
        return Ok(response.pretty_json()?.into_bytes());
    }
    if method == HttpMethod::Options {
        return Ok(response.allow().unwrap_or_default().into_bytes());
    }
    Ok(response.raw_body().to_vec())
}

/// Write to `out` byte for byte, or to stdout followed by a newline.
pub fn write_output(content: &[u8], out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content).context("failed to write to stdout")?;
            stdout.write_all(b"\n").context("failed to write to stdout")?;
            stdout.flush().context("failed to write to stdout")
        }
    }
}

#[cfg(test)]
mod tests {
    use opal_core::{ErrorKind, Headers};

    use super::*;

    fn response(lines: &[&str], body: &str) -> Response {
        let mut headers = Headers::new();
        for line in lines {
            headers.push_line(line);
        }
        Response::new(200, headers, body.as_bytes().to_vec())
    }

    #[test]
    fn raw_body_by_default() {
        let body = r#"{"b":1,"a":2}"#;
        let out = render(&response(&[], body), HttpMethod::Get, false).unwrap();
        assert_eq!(out, body.as_bytes());
    }

    #[test]
    fn json_flag_pretty_prints() {
        let out = render(&response(&[], r#"{"b":1,"a":2}"#), HttpMethod::Get, true).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{\n  \"a\": 2,\n  \"b\": 1\n}");
    }

    #[test]
    fn json_flag_on_html_is_a_parse_error() {
        let err = render(&response(&[], "<html/>"), HttpMethod::Get, true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn options_renders_allow_header() {
        let resp = response(&["Allow: GET, PUT, DELETE, OPTIONS"], "ignored body");
        let out = render(&resp, HttpMethod::Options, false).unwrap();
        assert_eq!(out, b"GET, PUT, DELETE, OPTIONS");
    }

    #[test]
    fn options_without_allow_is_empty() {
        let out = render(&response(&[], "body"), HttpMethod::Options, false).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn file_output_is_byte_exact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_output(b"[1,2]", Some(path.as_path())).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"[1,2]");
    }

    #[test]
    fn unwritable_output_reports_path() {
        let err = write_output(b"x", Some(Path::new("/no/such/dir/out.json"))).unwrap_err();
        assert!(err.to_string().contains("/no/such/dir/out.json"));
    }
}
