//! Monitor Event Bus
//!
//! Asynchronous pub/sub fan-out for poller updates. The bus is an explicit
//! service object constructed at startup and shared by reference; consumers
//! subscribe for their own receiver.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::monitor::reading::LiveSnapshot;
use crate::monitor::series::HistorySnapshot;

/// Events published by the sensor poller.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum MonitorEvent {
    /// A live poll tick produced a (possibly degraded) snapshot
    LiveUpdated(LiveSnapshot),
    /// The recorded history changed since the previous tick
    HistoryUpdated(HistorySnapshot),
    /// No successful update for longer than the disconnect threshold
    ConnectionLost,
    /// Updates resumed after a disconnection
    ConnectionRestored,
}

pub struct MonitorBus {
    tx: broadcast::Sender<MonitorEvent>,
}

impl MonitorBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1024);
        Self { tx }
    }

    /// Publish an event to all subscribers. Lagging or absent subscribers
    /// never block the poller.
    pub fn publish(&self, event: MonitorEvent) {
        let _ = self.tx.send(event);
    }

    /// Create a new subscriber
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.tx.subscribe()
    }
}

impl Default for MonitorBus {
    fn default() -> Self {
        Self::new()
    }
}
