//! Refresh and watch loops that keep the route table in sync with the
//! registry (C3). Grounded directly in the original `refresh`/`watch`/
//! `process` trio: a periodic full list+get pass, plus an incremental watch
//! stream, both funneling into the router's `store` operation.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::time::{self, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::router::RouteTable;

use super::cache::ServiceCache;
use super::client::RegistryClient;
use super::types::{Action, Event, RegistryError, ServiceDescriptor};

/// Tuning knobs for the refresh and watch loops' linear backoff and cadence.
#[derive(Debug, Clone, Copy)]
pub struct ReconcilerSettings {
    pub refresh_interval: Duration,
    pub watch_backoff_unit: Duration,
}

pub struct Reconciler {
    namespace: String,
    registry: Arc<dyn RegistryClient>,
    cache: Arc<ServiceCache>,
    routes: Arc<RouteTable>,
    settings: ReconcilerSettings,
    shutdown: CancellationToken,
    last_refresh: Mutex<Option<Instant>>,
}

impl Reconciler {
    pub fn new(
        namespace: String,
        registry: Arc<dyn RegistryClient>,
        routes: Arc<RouteTable>,
        settings: ReconcilerSettings,
    ) -> Self {
        let cache = Arc::new(ServiceCache::new(registry.clone()));
        Self {
            namespace,
            registry,
            cache,
            routes,
            settings,
            shutdown: CancellationToken::new(),
            last_refresh: Mutex::new(None),
        }
    }

    /// Spawn the refresh loop and the watch loop as independent background
    /// tasks. Returns immediately; callers keep the join handles to await on
    /// shutdown.
    pub fn start(self: &Arc<Self>) -> (tokio::task::JoinHandle<()>, tokio::task::JoinHandle<()>) {
        let refresh_handle = tokio::spawn(self.clone().refresh_loop());
        let watch_handle = tokio::spawn(self.clone().watch_loop());
        (refresh_handle, watch_handle)
    }

    /// Idempotent: a second call is a no-op, matching the Go original's
    /// closed-channel guard.
    pub fn close(&self) {
        self.shutdown.cancel();
        self.cache.stop();
    }

    fn in_namespace(&self, name: &str) -> bool {
        name.starts_with(self.namespace.as_str())
    }

    /// Time since the last successful full refresh, or `None` if one hasn't
    /// completed yet. Used by the health endpoint to detect a stalled loop.
    pub fn last_refresh_age(&self) -> Option<Duration> {
        self.last_refresh.lock().unwrap().map(|at| at.elapsed())
    }

    pub fn refresh_interval(&self) -> Duration {
        self.settings.refresh_interval
    }

    async fn refresh_loop(self: Arc<Self>) {
        let mut attempts: u32 = 0;
        loop {
            if self.shutdown.is_cancelled() {
                return;
            }

            match self.perform_refresh().await {
                Ok(count) => {
                    attempts = 0;
                    *self.last_refresh.lock().unwrap() = Some(Instant::now());
                    info!(services = count, "registry refresh complete");
                }
                Err(err) => {
                    attempts += 1;
                    let backoff = self.settings.watch_backoff_unit * attempts;
                    warn!(error = %err, attempt = attempts, backoff_ms = backoff.as_millis() as u64, "registry refresh failed, backing off");
                    tokio::select! {
                        _ = self.shutdown.cancelled() => return,
                        _ = time::sleep(backoff) => {}
                    }
                    continue;
                }
            }

            tokio::select! {
                _ = self.shutdown.cancelled() => return,
                _ = time::sleep(self.settings.refresh_interval) => {}
            }
        }
    }

    async fn perform_refresh(&self) -> Result<usize, RegistryError> {
        let summaries = self.registry.list_services().await?;
        let mut refreshed = 0;
        for summary in summaries {
            if !self.in_namespace(&summary.name) {
                continue;
            }
            match self.cache.get_service(&summary.name).await {
                Ok(descriptors) => {
                    self.routes.store(descriptors).await;
                    refreshed += 1;
                }
                Err(RegistryError::NotFound) => {
                    debug!(service = %summary.name, "service vanished between list and get");
                }
                Err(err) => {
                    warn!(service = %summary.name, error = %err, "get_service failed during refresh, retaining existing routes");
                }
            }
        }
        Ok(refreshed)
    }

    async fn watch_loop(self: Arc<Self>) {
        let mut attempts: u32 = 0;
        loop {
            if self.shutdown.is_cancelled() {
                return;
            }

            let watcher = match self.registry.watch().await {
                Ok(w) => w,
                Err(err) => {
                    attempts += 1;
                    let backoff = self.settings.watch_backoff_unit * attempts;
                    warn!(error = %err, attempt = attempts, "failed to open registry watch, backing off");
                    tokio::select! {
                        _ = self.shutdown.cancelled() => return,
                        _ = time::sleep(backoff) => {}
                    }
                    continue;
                }
            };
            attempts = 0;

            let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);
            let shutdown = self.shutdown.clone();
            let stopper = tokio::spawn(async move {
                shutdown.cancelled().await;
                let _ = stop_tx.send(()).await;
            });

            self.drain_watch(watcher, &mut stop_rx).await;
            stopper.abort();

            if self.shutdown.is_cancelled() {
                return;
            }
        }
    }

    async fn drain_watch(
        &self,
        mut watcher: Box<dyn super::client::Watcher>,
        stop_rx: &mut mpsc::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                _ = stop_rx.recv() => {
                    watcher.stop();
                    return;
                }
                event = watcher.next() => {
                    match event {
                        Ok(event) => self.process(event).await,
                        Err(err) => {
                            error!(error = %err, "watch stream error, reopening");
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Mirrors the Go original's `process`: a `delete` that misses the cache
    /// is resolved by synthesizing an empty descriptor so `store`'s prune
    /// phase removes every binding that version used to own. The namespace
    /// filter is applied once here, not twice.
    async fn process(&self, event: Event) {
        if !self.in_namespace(&event.service.name) {
            return;
        }

        match event.action {
            Action::Delete => match self.cache.get_service(&event.service.name).await {
                Ok(descriptors) => self.routes.store(descriptors).await,
                Err(RegistryError::NotFound) => {
                    let empty = ServiceDescriptor::empty(
                        event.service.name.clone(),
                        event.service.version.clone(),
                    );
                    self.routes.store(vec![empty]).await;
                }
                Err(err) => {
                    warn!(service = %event.service.name, error = %err, "get_service failed while processing delete");
                }
            },
            Action::Create | Action::Update => match self.cache.get_service(&event.service.name).await {
                Ok(descriptors) => self.routes.store(descriptors).await,
                Err(err) => {
                    warn!(service = %event.service.name, error = %err, "get_service failed while processing update");
                }
            },
        }
    }
}
