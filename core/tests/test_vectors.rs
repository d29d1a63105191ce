//! Verify request construction and header promotion against JSON test
//! vectors stored in `test-vectors/`.
//!
//! Each request vector describes a server scope, a call scope and the
//! merged request (method, URL, ordered header lines, declared content
//! length) or the error expected before any I/O.

use opal_core::{CallScope, HeaderValue, Headers, HttpMethod, HttpRequest, OpalError, ServerScope};
use serde_json::Value;

fn pairs(value: &Value) -> Vec<(String, String)> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|pair| {
                    let arr = pair.as_array().unwrap();
                    (
                        arr[0].as_str().unwrap().to_string(),
                        arr[1].as_str().unwrap().to_string(),
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

fn server_scope(desc: &Value) -> ServerScope {
    let mut server = ServerScope::new(desc["base_url"].as_str().unwrap());
    if let (Some(user), Some(password)) = (desc["user"].as_str(), desc["password"].as_str()) {
        server.set_auth_basic(user, password);
    }
    for (name, value) in pairs(&desc["headers"]) {
        server.set_default_header(&name, &value);
    }
    server
}

/// Apply a call description to `call` and merge it into a request.
fn build_request(call: &mut CallScope<'_>, desc: &Value) -> Result<HttpRequest, OpalError> {
    call.set_method(desc["method"].as_str().unwrap_or(""))?;
    if let Some(resource) = desc["resource"].as_str() {
        call.set_resource(resource);
    }
    for (header, value) in pairs(&desc["headers"]) {
        call.set_header(&header, &value);
    }
    if let Some(content) = desc["content"].as_str() {
        call.attach_content_bytes(content);
    }
    call.prepare()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let server = server_scope(&case["server"]);

        let mut call = server.request();
        let result = build_request(&mut call, &case["call"]);

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error.as_str().unwrap() {
                "InvalidMethod" => {
                    assert!(matches!(err, OpalError::InvalidMethod(_)), "{name}: {err}")
                }
                "Validation" => assert!(matches!(err, OpalError::Validation(_)), "{name}: {err}"),
                other => panic!("{name}: unknown expected_error: {other}"),
            }
            continue;
        }

        let request = result.unwrap();
        let expected = &case["expected_request"];
        let method: HttpMethod = serde_json::from_value(expected["method"].clone()).unwrap();
        assert_eq!(request.method, method, "{name}: method");
        assert_eq!(request.url, expected["url"].as_str().unwrap(), "{name}: url");

        let headers: Vec<(String, String)> = request
            .headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(headers, pairs(&expected["headers"]), "{name}: headers");

        let content_length = request.content.as_ref().map(|c| c.len());
        assert_eq!(content_length, expected["content_length"].as_u64(), "{name}: content length");
    }
}

// ---------------------------------------------------------------------------
// Header promotion
// ---------------------------------------------------------------------------

#[test]
fn header_test_vectors() {
    let raw = include_str!("../../test-vectors/headers.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let mut headers = Headers::new();
        for line in case["lines"].as_array().unwrap() {
            headers.push_line(line.as_str().unwrap());
        }

        let expected = case["expected"].as_object().unwrap();
        assert_eq!(headers.len(), expected.len(), "{name}: header count");
        for (header, value) in expected {
            let want = match value {
                Value::String(s) => HeaderValue::Scalar(s.clone()),
                Value::Array(items) => HeaderValue::List(
                    items
                        .iter()
                        .map(|v| v.as_str().unwrap().to_string())
                        .collect(),
                ),
                other => panic!("{name}: unexpected expected value {other}"),
            };
            assert_eq!(headers.get(header), Some(&want), "{name}: {header}");
        }

        for absent in case["absent"].as_array().unwrap() {
            let absent = absent.as_str().unwrap();
            assert!(headers.get(absent).is_none(), "{name}: {absent} present");
        }
    }
}
