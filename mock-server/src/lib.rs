use std::{collections::BTreeMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    routing::{any, get, options},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// Authorization value for `administrator:password`.
pub const ADMIN_AUTH: &str = "X-Opal-Auth YWRtaW5pc3RyYXRvcjpwYXNzd29yZA==";

/// Methods reported by `OPTIONS` on a table.
pub const TABLE_ALLOW: &str = "GET, PUT, DELETE, OPTIONS";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Datasource {
    pub name: String,
    #[serde(default)]
    pub table: Vec<String>,
}

pub type Db = Arc<RwLock<BTreeMap<String, Datasource>>>;

fn seed() -> BTreeMap<String, Datasource> {
    [
        Datasource {
            name: "opal-data".to_string(),
            table: vec!["CIPRELIM".to_string(), "Participants".to_string()],
        },
        Datasource {
            name: "clinical".to_string(),
            table: vec!["Visits".to_string()],
        },
    ]
    .into_iter()
    .map(|ds| (ds.name.clone(), ds))
    .collect()
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(seed()));
    Router::new()
        .route("/ws/datasources", get(list_datasources).post(create_datasource))
        .route(
            "/ws/datasource/{name}",
            get(get_datasource).delete(delete_datasource),
        )
        .route("/ws/datasource/{name}/table/{table}", options(table_options))
        .route("/ws/tagged", get(tagged))
        .route("/ws/broken", get(broken))
        .route("/ws/echo", any(echo))
        .route("/ws/moved", any(moved))
        .route("/ws/landed", get(landed))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn authorized(headers: &HeaderMap) -> Result<(), StatusCode> {
    match headers.get(header::AUTHORIZATION) {
        Some(value) if value.as_bytes().starts_with(b"X-Opal-Auth ") => Ok(()),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn list_datasources(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<Vec<Datasource>>, StatusCode> {
    authorized(&headers)?;
    let datasources = db.read().await;
    Ok(Json(datasources.values().cloned().collect()))
}

async fn create_datasource(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<Datasource>,
) -> Result<(StatusCode, Json<Datasource>), StatusCode> {
    authorized(&headers)?;
    let mut datasources = db.write().await;
    if datasources.contains_key(&input.name) {
        return Err(StatusCode::CONFLICT);
    }
    datasources.insert(input.name.clone(), input.clone());
    Ok((StatusCode::CREATED, Json(input)))
}

async fn get_datasource(
    State(db): State<Db>,
    Path(name): Path<String>,
) -> Result<Json<Datasource>, StatusCode> {
    let datasources = db.read().await;
    datasources.get(&name).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn delete_datasource(
    State(db): State<Db>,
    Path(name): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let mut datasources = db.write().await;
    datasources
        .remove(&name)
        .map(|_| StatusCode::OK)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn table_options(
    State(db): State<Db>,
    Path((name, table)): Path<(String, String)>,
) -> Result<([(header::HeaderName, &'static str); 1], StatusCode), StatusCode> {
    let datasources = db.read().await;
    let ds = datasources.get(&name).ok_or(StatusCode::NOT_FOUND)?;
    if !ds.table.contains(&table) {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(([(header::ALLOW, TABLE_ALLOW)], StatusCode::OK))
}

/// Sends `X-Opal-Tag` twice so clients see a repeated header.
async fn tagged() -> (HeaderMap, &'static str) {
    let mut headers = HeaderMap::new();
    headers.append("x-opal-tag", HeaderValue::from_static("first"));
    headers.append("x-opal-tag", HeaderValue::from_static("second"));
    headers.insert("x-opal-version", HeaderValue::from_static("2.0"));
    (headers, "tagged")
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

/// Redirects every method to `/ws/landed`.
async fn moved() -> (StatusCode, [(header::HeaderName, &'static str); 1], &'static str) {
    (StatusCode::FOUND, [(header::LOCATION, "/ws/landed")], "moved")
}

async fn landed() -> &'static str {
    "landed"
}

/// Reflects the request as JSON: method, header pairs and body text.
async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let pairs: Vec<[String; 2]> = headers
        .iter()
        .map(|(name, value)| {
            [
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            ]
        })
        .collect();
    Json(json!({
        "method": method.as_str(),
        "headers": pairs,
        "body": String::from_utf8_lossy(&body),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datasource_serializes_to_json() {
        let ds = Datasource {
            name: "opal-data".to_string(),
            table: vec!["CIPRELIM".to_string()],
        };
        let json = serde_json::to_value(&ds).unwrap();
        assert_eq!(json["name"], "opal-data");
        assert_eq!(json["table"][0], "CIPRELIM");
    }

    #[test]
    fn datasource_tables_default_to_empty() {
        let ds: Datasource = serde_json::from_str(r#"{"name":"empty"}"#).unwrap();
        assert!(ds.table.is_empty());
    }

    #[test]
    fn datasource_rejects_missing_name() {
        let result: Result<Datasource, _> = serde_json::from_str(r#"{"table":[]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn seed_is_ordered_by_name() {
        let names: Vec<String> = seed().into_keys().collect();
        assert_eq!(names, vec!["clinical", "opal-data"]);
    }

    #[test]
    fn authorization_requires_opal_scheme() {
        let mut headers = HeaderMap::new();
        assert_eq!(authorized(&headers), Err(StatusCode::UNAUTHORIZED));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(authorized(&headers), Err(StatusCode::UNAUTHORIZED));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(ADMIN_AUTH));
        assert_eq!(authorized(&headers), Ok(()));
    }
}
