//! Errors and response envelope surfaced by the RPC client factory.

use std::collections::HashMap;

use serde_json::Value;

/// A completed RPC invocation: the decoded JSON body plus whatever response
/// headers and trailing metadata the backend attached.
#[derive(Debug, Clone)]
pub struct RpcResponse {
    pub body: Value,
    pub headers: HashMap<String, String>,
    pub trailers: HashMap<String, String>,
}

impl RpcResponse {
    /// A response with no headers or trailers, for backends that don't send any.
    pub fn new(body: Value) -> Self {
        Self {
            body,
            headers: HashMap::new(),
            trailers: HashMap::new(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("no connection available for {service} (versions: {versions:?})")]
    NoBackend { service: String, versions: Vec<String> },
    #[error("connection error: {0}")]
    Connection(String),
    /// The backend handled the call and returned a non-success status. The
    /// status and trailers are the backend's own, carried through so the
    /// gateway's error renderer can forward them instead of synthesizing one.
    #[error("call failed with status {status}: {message}")]
    CallFailed {
        status: u16,
        message: String,
        trailers: HashMap<String, String>,
    },
    #[error("timeout invoking {0}")]
    Timeout(String),
}
