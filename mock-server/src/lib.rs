use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{Path, Query},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, delete, get, patch, post, put},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use uuid::Uuid;

/// What the server saw of a request, echoed back as JSON.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub url: String,
    pub args: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub form: BTreeMap<String, String>,
    pub data: String,
    pub json: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthResult {
    pub authenticated: bool,
    pub user: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/get", get(echo))
        .route("/post", post(echo))
        .route("/put", put(echo))
        .route("/patch", patch(echo))
        .route("/delete", delete(echo))
        .route("/anything", any(echo))
        .route("/anything/{*rest}", any(echo))
        .route("/headers", get(echo_headers))
        .route("/basic-auth/{user}/{password}", get(basic_auth))
        .route("/status/{code}", any(status))
        .route("/response-headers", get(response_headers))
        .route("/redirect-to", any(redirect_to))
        .route("/uuid", get(fresh_uuid))
        .route("/bytes/{n}", get(bytes))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// `content-type` -> `Content-Type`
pub fn title_case(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut out: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        out.entry(title_case(name.as_str()))
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    out
}

fn pairs(raw: &[u8]) -> BTreeMap<String, String> {
    url::form_urlencoded::parse(raw).into_owned().collect()
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

    let (form, data) = if is_form {
        (pairs(&body), String::new())
    } else {
        (BTreeMap::new(), String::from_utf8_lossy(&body).into_owned())
    };

    Json(Echo {
        method: method.to_string(),
        url: format!("http://{host}{uri}"),
        args: pairs(uri.query().unwrap_or("").as_bytes()),
        headers: header_map(&headers),
        form,
        json: serde_json::from_slice(&body).ok(),
        data,
    })
}

async fn echo_headers(headers: HeaderMap) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "headers": header_map(&headers) }))
}

async fn basic_auth(Path((user, password)): Path<(String, String)>, headers: HeaderMap) -> Response {
    let supplied = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Basic "))
        .and_then(|encoded| BASE64.decode(encoded).ok())
        .and_then(|decoded| String::from_utf8(decoded).ok());

    if supplied.as_deref() == Some(format!("{user}:{password}").as_str()) {
        Json(AuthResult {
            authenticated: true,
            user,
        })
        .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Basic realm=\"Fake Realm\"")],
        )
            .into_response()
    }
}

async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

/// Every query pair becomes a response header. Repeated names are sent as
/// repeated header lines.
async fn response_headers(Query(params): Query<Vec<(String, String)>>) -> Response {
    let mut headers = HeaderMap::new();
    for (name, value) in &params {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            headers.append(name, value);
        }
    }
    let body: BTreeMap<String, String> = params.into_iter().collect();
    (headers, Json(body)).into_response()
}

#[derive(Deserialize)]
pub struct RedirectParams {
    pub url: String,
}

async fn redirect_to(Query(params): Query<RedirectParams>) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, params.url)]).into_response()
}

async fn fresh_uuid() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "uuid": Uuid::new_v4() }))
}

/// `n` bytes of filler as `application/octet-stream`.
async fn bytes(Path(n): Path<usize>) -> Response {
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        vec![b'x'; n],
    )
        .into_response()
}
