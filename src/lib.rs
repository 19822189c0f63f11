//! BabyMonitor Core
//!
//! Headless engine for the BabyChat nursery monitor:
//! - Periodic polling of live and historical sensor readings
//! - Disconnection watchdog with one-shot transition events
//! - Calendar-day filtering over history series
//! - Trend classification (stable / rising / falling)
//! - AI-generated care recommendations via chat completions

pub mod advisor;
pub mod config;
pub mod monitor;

// Re-exports for convenience
pub use advisor::{Advisor, CompletionProvider, OpenAiCompatProvider};
pub use config::{ConfigStore, MonitorConfig};
pub use monitor::{MonitorBus, MonitorEvent, PollerConfig, SensorKind, SensorPoller, Trend};
