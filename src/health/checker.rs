//! Health evaluation: route table size plus reconciler freshness.

use std::sync::Arc;

use crate::registry::Reconciler;
use crate::router::RouteTable;

use super::types::HealthStatus;

/// A refresh is considered stale once it's overdue by more than this
/// multiple of the configured refresh interval. By then the loop has
/// missed at least one full cycle, which only happens if it's stuck.
const STALE_MULTIPLIER: u32 = 2;

pub struct HealthChecker {
    routes: Arc<RouteTable>,
    reconciler: Arc<Reconciler>,
}

impl HealthChecker {
    pub fn new(routes: Arc<RouteTable>, reconciler: Arc<Reconciler>) -> Self {
        Self { routes, reconciler }
    }

    pub async fn check_health(&self) -> HealthStatus {
        let route_count = self.routes.route_count().await;
        let age = self.reconciler.last_refresh_age();

        let healthy = match age {
            Some(age) => age < self.reconciler.refresh_interval() * STALE_MULTIPLIER,
            None => false,
        };

        HealthStatus {
            healthy,
            routes: route_count,
            last_refresh_age_seconds: age.map(|a| a.as_secs()),
        }
    }
}
