//! The transcoding handler (C5): assemble payload, pick a backend, invoke,
//! forward the response.

use std::collections::HashMap;

use axum::{
    body::to_bytes,
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Json, Response},
};
use tracing::{error, info};

use crate::app::AppState;
use crate::rpc::{RpcError, RpcResponse};

use super::error::{extract_trace_id, GatewayError};
use super::payload::assemble_payload;

const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Registered as the catch-all handler behind the mux's dispatch. Axum
/// doesn't hand us path params directly here; the mux already resolved them
/// during routing, so this function re-derives the `RoutingDecision` from
/// the route table rather than duplicating dispatch logic in the axum
/// router tree.
///
/// Dropping the returned future (client disconnect) cancels whatever await
/// point the handler is suspended on, including the in-flight RPC. There is
/// no separate cancellation token to thread through.
pub async fn gateway_handler(State(state): State<AppState>, request: Request) -> Response {
    let trace_id = extract_trace_id(&request);
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().unwrap_or("").to_string();

    match handle(state, method, path, query, request, trace_id.clone()).await {
        Ok(response) => response,
        Err(err) => {
            error!(trace_id = %trace_id, error = %err, "gateway request failed");
            err.into_response(&trace_id)
        }
    }
}

async fn handle(
    state: AppState,
    method: String,
    path: String,
    query: String,
    request: Request,
    trace_id: String,
) -> Result<Response, GatewayError> {
    let decision = state.routes.route(&method, &path).await?;

    let body = to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|err| GatewayError::PayloadParse(err.to_string()))?;

    let payload = assemble_payload(&method, &body, &decision.path_params, &query)?;

    let conn = state
        .rpc_factory
        .client(&decision.service_name, &decision.service_versions)
        .await?;

    let service_method = format!("/{}/{}", decision.service_name, decision.method_name);
    let mut headers = HashMap::new();
    headers.insert("x-gateway-service".to_string(), decision.service_name.to_string());
    headers.insert("x-trace-id".to_string(), trace_id);

    info!(
        service = %decision.service_name,
        method = %decision.method_name,
        versions = ?decision.service_versions,
        "dispatching rpc"
    );

    let rpc_response = match tokio::time::timeout(
        state.request_timeout,
        conn.invoke(&service_method, payload, &headers),
    )
    .await
    {
        Ok(result) => result?,
        Err(_elapsed) => return Err(GatewayError::Backend(RpcError::Timeout(service_method))),
    };

    Ok(forward_response(rpc_response))
}

/// Forwards the backend's response body, headers, and trailers to the HTTP
/// caller. Trailers have no native channel in a buffered JSON response, so
/// they're flattened into `x-rpc-trailer-*` headers.
fn forward_response(rpc_response: RpcResponse) -> Response {
    let mut response = Json(rpc_response.body).into_response();
    let header_map = response.headers_mut();

    for (key, value) in &rpc_response.headers {
        insert_header(header_map, key, value);
    }
    for (key, value) in &rpc_response.trailers {
        insert_header(header_map, &format!("x-rpc-trailer-{}", key), value);
    }

    response
}

fn insert_header(header_map: &mut axum::http::HeaderMap, key: &str, value: &str) {
    let (Ok(name), Ok(val)) = (
        HeaderName::from_bytes(key.as_bytes()),
        HeaderValue::from_str(value),
    ) else {
        return;
    };
    header_map.insert(name, val);
}
