use hyper::{
    body::Bytes,
    header::{HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE},
    Method, Response, StatusCode,
};
use http_body_util::Full;
use serde::Serialize;
use std::time::Duration;
use tracing::error;

use crate::app::{state::RecommendRequest, App, RecommendError};

pub type HttpResponse = Response<Full<Bytes>>;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    message: &'static str,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn with_cors(mut response: HttpResponse) -> HttpResponse {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("GET, POST, OPTIONS"));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("content-type"));
    response
}

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> HttpResponse {
    let bytes = serde_json::to_vec(body)
        .unwrap_or_else(|_| br#"{"error":"failed to serialize response"}"#.to_vec());
    let mut response = Response::new(Full::new(Bytes::from(bytes)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    with_cors(response)
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    json_response(status, &ErrorBody { error: message.into() })
}

fn empty_response(status: StatusCode) -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    with_cors(response)
}

pub async fn route(app: &App, timeout: Duration, method: &Method, path: &str, body: &[u8]) -> HttpResponse {
    match (method, path) {
        (&Method::OPTIONS, "/health" | "/recommend") => empty_response(StatusCode::NO_CONTENT),
        (&Method::GET, "/health") => json_response(
            StatusCode::OK,
            &HealthBody { status: "healthy", message: "API is running" },
        ),
        (&Method::POST, "/recommend") => recommend(app, timeout, body).await,
        (_, "/health" | "/recommend") => error_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed"),
        _ => error_response(StatusCode::NOT_FOUND, format!("no route for {path}")),
    }
}

async fn recommend(app: &App, timeout: Duration, body: &[u8]) -> HttpResponse {
    let request: RecommendRequest = if body.iter().all(u8::is_ascii_whitespace) {
        RecommendRequest::default()
    } else {
        match serde_json::from_slice(body) {
            Ok(request) => request,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, format!("Invalid JSON body: {e}")),
        }
    };

    match tokio::time::timeout(timeout, app.recommend(request)).await {
        Ok(Ok(response)) => json_response(StatusCode::OK, &response),
        Ok(Err(e)) if e.is_client_error() => error_response(StatusCode::BAD_REQUEST, e.to_string()),
        Ok(Err(e)) => {
            error!("Error processing recommendation request: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(_) => {
            let e = RecommendError::Timeout(timeout);
            error!("Error processing recommendation request: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
