//! Monitor Module
//!
//! The sensor side of the crate: reading and history types, the wire decode
//! layer, day filtering, trend classification, and the polling engine with
//! its event bus.

mod events;
mod poller;
mod reading;
mod series;
mod trend;

pub use events::{MonitorBus, MonitorEvent};
pub use poller::{PollError, PollerConfig, SensorPoller};
pub use reading::{
    parse_timestamp, HistoryPayload, LivePayload, LiveSnapshot, LiveValue, SensorKind,
    SensorReading, TrackingPayload, TIMESTAMP_FORMAT,
};
pub use series::{filter_by_day, filter_today, HistorySnapshot};
pub use trend::{Trend, STABLE_BAND_PERCENT};
