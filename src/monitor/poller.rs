//! Sensor Poller
//!
//! Periodically fetches the live sensor document and the full tracking
//! document from the realtime database, publishes decoded snapshots on the
//! monitor bus, and runs a watchdog that flags the monitor as disconnected
//! when updates stop arriving.
//!
//! Failure policy: a failed or malformed tick never halts polling. Any
//! failing tick degrades the live readings to the zero-valued snapshot; only
//! a body that actually arrived counts as contact for the disconnection
//! watchdog. There is no backoff, the next scheduled tick is the retry.

use reqwest::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::MonitorConfig;
use crate::monitor::events::{MonitorBus, MonitorEvent};
use crate::monitor::reading::{LivePayload, LiveSnapshot, TrackingPayload};
use crate::monitor::series::HistorySnapshot;

#[derive(Debug, Error)]
pub enum PollError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("payload decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Endpoints and cadence for one polling session.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub live_url: String,
    pub tracking_url: String,
    pub live_interval: Duration,
    pub history_interval: Duration,
    pub check_interval: Duration,
    /// Elapsed time since the last successful update after which the
    /// monitor counts as disconnected.
    pub disconnect_after: Duration,
}

impl From<&MonitorConfig> for PollerConfig {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            live_url: config.live_url.clone(),
            tracking_url: config.tracking_url.clone(),
            live_interval: config.live_interval(),
            history_interval: config.history_interval(),
            check_interval: config.check_interval(),
            disconnect_after: config.disconnect_after(),
        }
    }
}

/// State mutated only by the poller's own tasks; readable from anywhere.
struct Shared {
    active: AtomicBool,
    disconnected: AtomicBool,
    live: RwLock<LiveSnapshot>,
    history: RwLock<HistorySnapshot>,
    last_update: RwLock<Instant>,
}

pub struct SensorPoller {
    config: PollerConfig,
    client: Client,
    bus: Arc<MonitorBus>,
    shared: Arc<Shared>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl SensorPoller {
    pub fn new(config: PollerConfig, bus: Arc<MonitorBus>) -> Self {
        Self {
            config,
            client: Client::new(),
            bus,
            shared: Arc::new(Shared {
                active: AtomicBool::new(false),
                disconnected: AtomicBool::new(false),
                live: RwLock::new(LiveSnapshot::default()),
                history: RwLock::new(HistorySnapshot::default()),
                last_update: RwLock::new(Instant::now()),
            }),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Spawn the live, history and watchdog timers. Calling `start` on an
    /// already running poller is a no-op.
    pub fn start(&self) {
        if self.shared.active.swap(true, Ordering::SeqCst) {
            return;
        }

        info!(
            live_url = %self.config.live_url,
            tracking_url = %self.config.tracking_url,
            "sensor poller started"
        );

        let live = self.spawn_ticker(self.config.live_interval, {
            let client = self.client.clone();
            let url = self.config.live_url.clone();
            let shared = self.shared.clone();
            let bus = self.bus.clone();
            move || poll_live_once(client.clone(), url.clone(), shared.clone(), bus.clone())
        });

        let history = self.spawn_ticker(self.config.history_interval, {
            let client = self.client.clone();
            let url = self.config.tracking_url.clone();
            let shared = self.shared.clone();
            let bus = self.bus.clone();
            move || poll_tracking_once(client.clone(), url.clone(), shared.clone(), bus.clone())
        });

        let watchdog = self.spawn_watchdog();

        let mut tasks = self.tasks.lock().expect("poller task list poisoned");
        tasks.extend([live, history, watchdog]);
    }

    /// Tear down all timers. Idempotent; in-flight fetches that complete
    /// after this point are dropped by the active-flag guard.
    pub fn stop(&self) {
        if !self.shared.active.swap(false, Ordering::SeqCst) {
            return;
        }
        let mut tasks = self.tasks.lock().expect("poller task list poisoned");
        for task in tasks.drain(..) {
            task.abort();
        }
        info!("sensor poller stopped");
    }

    pub async fn live(&self) -> LiveSnapshot {
        *self.shared.live.read().await
    }

    pub async fn history(&self) -> HistorySnapshot {
        self.shared.history.read().await.clone()
    }

    pub fn is_disconnected(&self) -> bool {
        self.shared.disconnected.load(Ordering::SeqCst)
    }

    pub async fn since_last_update(&self) -> Duration {
        self.shared.last_update.read().await.elapsed()
    }

    /// Run `tick` on a fixed wall-clock interval. Each fetch is spawned so a
    /// slow or hung request never delays the next scheduled tick.
    fn spawn_ticker<F, Fut>(&self, interval: Duration, tick: F) -> JoinHandle<()>
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let shared = self.shared.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if !shared.active.load(Ordering::SeqCst) {
                    break;
                }
                tokio::spawn(tick());
            }
        })
    }

    fn spawn_watchdog(&self) -> JoinHandle<()> {
        let shared = self.shared.clone();
        let bus = self.bus.clone();
        let check_interval = self.config.check_interval;
        let disconnect_after = self.config.disconnect_after;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(check_interval);
            loop {
                ticker.tick().await;
                if !shared.active.load(Ordering::SeqCst) {
                    break;
                }

                let elapsed = shared.last_update.read().await.elapsed();
                let down = elapsed > disconnect_after;
                let was_down = shared.disconnected.swap(down, Ordering::SeqCst);

                // One event per transition, in either direction.
                if down && !was_down {
                    warn!(?elapsed, "monitor disconnected");
                    bus.publish(MonitorEvent::ConnectionLost);
                } else if !down && was_down {
                    info!("monitor connection restored");
                    bus.publish(MonitorEvent::ConnectionRestored);
                }
            }
        })
    }
}

impl Drop for SensorPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn fetch_json<T: serde::de::DeserializeOwned>(
    client: &Client,
    url: &str,
) -> Result<T, PollError> {
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(serde_json::from_str(&body)?)
}

async fn poll_live_once(client: Client, url: String, shared: Arc<Shared>, bus: Arc<MonitorBus>) {
    let result = fetch_json::<LivePayload>(&client, &url).await;

    if !shared.active.load(Ordering::SeqCst) {
        return;
    }

    match result {
        Ok(payload) => apply_live(&shared, &bus, LiveSnapshot::from(payload)).await,
        Err(PollError::Decode(e)) => {
            // Matches the upstream monitor: a body that arrived but did not
            // decode still counts as contact, with zeroed readings.
            warn!("live payload did not decode, substituting zero readings: {e}");
            apply_live(&shared, &bus, LiveSnapshot::default()).await;
        }
        Err(PollError::Transport(e)) => {
            // Zero the display, but let the watchdog keep counting.
            warn!("live poll failed, zeroing live readings: {e}");
            publish_live(&shared, &bus, LiveSnapshot::default()).await;
        }
    }
}

async fn poll_tracking_once(
    client: Client,
    url: String,
    shared: Arc<Shared>,
    bus: Arc<MonitorBus>,
) {
    let result = fetch_json::<TrackingPayload>(&client, &url).await;

    if !shared.active.load(Ordering::SeqCst) {
        return;
    }

    // On failure, degrade like a live tick: zero the live readings, but
    // leave the recorded history alone rather than wiping the charts.
    let payload = match result {
        Ok(payload) => payload,
        Err(PollError::Decode(e)) => {
            warn!("tracking payload did not decode, substituting zero readings: {e}");
            apply_live(&shared, &bus, LiveSnapshot::default()).await;
            return;
        }
        Err(PollError::Transport(e)) => {
            warn!("tracking poll failed, zeroing live readings: {e}");
            publish_live(&shared, &bus, LiveSnapshot::default()).await;
            return;
        }
    };

    let history = HistorySnapshot::from(payload.historial_sensores);
    apply_live(&shared, &bus, LiveSnapshot::from(payload.tiemporeal_sensores)).await;

    let changed = {
        let mut current = shared.history.write().await;
        if *current == history {
            false
        } else {
            *current = history.clone();
            true
        }
    };

    if changed {
        debug!(
            points = history.series(crate::monitor::reading::SensorKind::Temperature).len(),
            "history snapshot replaced"
        );
        bus.publish(MonitorEvent::HistoryUpdated(history));
    }
}

/// Record contact with the backend, then publish the snapshot.
async fn apply_live(shared: &Shared, bus: &MonitorBus, snapshot: LiveSnapshot) {
    *shared.last_update.write().await = Instant::now();
    publish_live(shared, bus, snapshot).await;
}

/// Publish without touching `last_update`; used when the backend could not
/// be reached at all, so the watchdog keeps counting.
async fn publish_live(shared: &Shared, bus: &MonitorBus, snapshot: LiveSnapshot) {
    *shared.live.write().await = snapshot;
    bus.publish(MonitorEvent::LiveUpdated(snapshot));
}
