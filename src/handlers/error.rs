//! Error response envelope and trace-id extraction.

use std::collections::HashMap;

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::router::RouterError;
use crate::rpc::RpcError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub trace_id: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>, trace_id: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                trace_id: trace_id.into(),
            },
        }
    }

    /// `trailers` are backend-supplied trailing metadata, if the error came
    /// from a backend call; forwarded as `x-rpc-trailer-*` headers since
    /// this renderer has no native trailer channel.
    pub fn into_response_with_status(self, status: StatusCode, trailers: HashMap<String, String>) -> Response {
        let trace_id = self.error.trace_id.clone();
        let mut headers = HeaderMap::new();
        if let Ok(header_value) = trace_id.parse() {
            headers.insert("x-trace-id", header_value);
        }
        for (key, value) in trailers {
            let Ok(name) = HeaderName::from_bytes(format!("x-rpc-trailer-{}", key).as_bytes()) else {
                continue;
            };
            let Ok(val) = value.parse() else {
                continue;
            };
            headers.insert(name, val);
        }
        (status, headers, Json(self)).into_response()
    }
}

/// Errors the gateway handler surfaces to callers. Each maps to a status
/// code and error code via `into_response`.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Routing(#[from] RouterError),
    #[error("failed to parse request body as JSON: {0}")]
    PayloadParse(String),
    #[error(transparent)]
    Backend(#[from] RpcError),
}

impl GatewayError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            GatewayError::Routing(_) => (StatusCode::NOT_FOUND, "ROUTE_NOT_FOUND"),
            GatewayError::PayloadParse(_) => (StatusCode::BAD_REQUEST, "PAYLOAD_PARSE_ERROR"),
            GatewayError::Backend(RpcError::NoBackend { .. }) => {
                (StatusCode::SERVICE_UNAVAILABLE, "BACKEND_UNAVAILABLE")
            }
            GatewayError::Backend(RpcError::Timeout(_)) => (StatusCode::GATEWAY_TIMEOUT, "BACKEND_TIMEOUT"),
            GatewayError::Backend(RpcError::CallFailed { status, .. }) => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                "BACKEND_CALL_FAILED",
            ),
            GatewayError::Backend(_) => (StatusCode::BAD_GATEWAY, "BACKEND_CALL_FAILED"),
        }
    }

    /// Backend-supplied trailing metadata, carried through for the caller;
    /// empty for every error kind that doesn't originate from a backend call.
    fn trailers(&self) -> HashMap<String, String> {
        match self {
            GatewayError::Backend(RpcError::CallFailed { trailers, .. }) => trailers.clone(),
            _ => HashMap::new(),
        }
    }

    pub fn into_response(self, trace_id: &str) -> Response {
        let (status, code) = self.status_and_code();
        let trailers = self.trailers();
        let message = self.to_string();
        ErrorResponse::new(code, message, trace_id).into_response_with_status(status, trailers)
    }
}

/// Priority order: W3C `traceparent` header, `x-trace-id`, `x-request-id`,
/// else a freshly generated UUID.
pub fn extract_trace_id<B>(request: &Request<B>) -> String {
    let headers = request.headers();

    if let Some(traceparent) = headers.get("traceparent") {
        if let Ok(traceparent_str) = traceparent.to_str() {
            if let Some(trace_id) = parse_trace_id_from_traceparent(traceparent_str) {
                return trace_id;
            }
        }
    }

    if let Some(trace_id) = headers.get("x-trace-id") {
        if let Ok(trace_id_str) = trace_id.to_str() {
            if !trace_id_str.is_empty() {
                return trace_id_str.to_string();
            }
        }
    }

    if let Some(request_id) = headers.get("x-request-id") {
        if let Ok(request_id_str) = request_id.to_str() {
            if !request_id_str.is_empty() {
                return request_id_str.to_string();
            }
        }
    }

    let new_trace_id = uuid::Uuid::new_v4().to_string();
    warn!(trace_id = %new_trace_id, "no trace id found in request, generated new one");
    new_trace_id
}

fn parse_trace_id_from_traceparent(traceparent: &str) -> Option<String> {
    let parts: Vec<&str> = traceparent.split('-').collect();
    if parts.len() != 4 || parts[0] != "00" {
        return None;
    }
    Some(parts[1].to_string())
}
