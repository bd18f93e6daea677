use serde::Serialize;

/// Body returned by `GET /healthz`: route count and reconciler freshness are
/// the two signals available without a per-backend probe, which is out of
/// scope for this core. `healthy` drives the status code; it is not part of
/// the wire shape.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HealthStatus {
    #[serde(skip)]
    pub healthy: bool,
    pub routes: usize,
    pub last_refresh_age_seconds: Option<u64>,
}
