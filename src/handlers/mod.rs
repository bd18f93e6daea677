//! HTTP-facing transcoding handler and its error/payload machinery.

mod error;
mod gateway;
mod payload;

pub use error::{extract_trace_id, ErrorResponse, GatewayError};
pub use gateway::gateway_handler;
