//! RPC client factory: the backend-facing half of the transcoding handler.

mod client;
mod types;

pub mod mock;

pub use client::{Connection, RpcClientFactory};
pub use types::{RpcError, RpcResponse};
