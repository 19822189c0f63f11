//! History series per sensor kind, plus calendar-day filtering.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::warn;

use crate::monitor::reading::{parse_timestamp, HistoryPayload, SensorKind, SensorReading};

/// The full recorded history for every sensor, sorted ascending by timestamp.
///
/// Snapshots are replaced wholesale on each history poll tick, and only when
/// the content actually differs, so subscribers are not flooded with
/// identical updates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistorySnapshot {
    pub temperature: Vec<SensorReading>,
    pub humidity: Vec<SensorReading>,
    pub gas: Vec<SensorReading>,
}

impl HistorySnapshot {
    pub fn series(&self, kind: SensorKind) -> &[SensorReading] {
        match kind {
            SensorKind::Temperature => &self.temperature,
            SensorKind::Humidity => &self.humidity,
            SensorKind::Gas => &self.gas,
        }
    }

    pub fn is_empty(&self) -> bool {
        SensorKind::ALL.iter().all(|k| self.series(*k).is_empty())
    }

    /// Most recent timestamp across all series, i.e. when the monitor last
    /// wrote a history record.
    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        SensorKind::ALL
            .iter()
            .filter_map(|kind| self.series(*kind).last())
            .map(|reading| reading.timestamp)
            .max()
    }

    /// Distinct calendar days covered by any series, most recent first.
    pub fn available_days(&self) -> Vec<NaiveDate> {
        let mut days = BTreeSet::new();
        for kind in SensorKind::ALL {
            for reading in self.series(kind) {
                days.insert(reading.timestamp.date());
            }
        }
        days.into_iter().rev().collect()
    }
}

impl From<HistoryPayload> for HistorySnapshot {
    fn from(payload: HistoryPayload) -> Self {
        Self {
            temperature: series_from_map(payload.temperatura),
            humidity: series_from_map(payload.humedad),
            gas: series_from_map(payload.gases),
        }
    }
}

/// Decode one per-kind history map into a sorted series. Entries whose key
/// does not parse as a firmware timestamp are skipped rather than silently
/// stamped with the current time.
fn series_from_map(map: std::collections::HashMap<String, f64>) -> Vec<SensorReading> {
    let mut series: Vec<SensorReading> = map
        .into_iter()
        .filter_map(|(stamp, value)| match parse_timestamp(&stamp) {
            Some(timestamp) => Some(SensorReading::new(timestamp, value)),
            None => {
                warn!("skipping history entry with unparseable timestamp {stamp:?}");
                None
            }
        })
        .collect();
    series.sort_by_key(|reading| reading.timestamp);
    series
}

/// Keep exactly the points that fall on the given local calendar day,
/// preserving their relative order.
pub fn filter_by_day(series: &[SensorReading], day: NaiveDate) -> Vec<SensorReading> {
    series
        .iter()
        .copied()
        .filter(|reading| reading.timestamp.date() == day)
        .collect()
}

/// The "show only today" toggle of the monitor screen.
pub fn filter_today(series: &[SensorReading]) -> Vec<SensorReading> {
    filter_by_day(series, chrono::Local::now().date_naive())
}
