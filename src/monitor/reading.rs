//! Sensor kinds, readings and the wire (JSON) payloads served by the
//! realtime database.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Timestamp format used by the monitor firmware for every reading.
pub const TIMESTAMP_FORMAT: &str = "%d-%m-%Y_%H:%M:%S";

/// The physical quantities reported by the nursery monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    Temperature,
    Humidity,
    Gas,
}

impl SensorKind {
    pub const ALL: [SensorKind; 3] = [
        SensorKind::Temperature,
        SensorKind::Humidity,
        SensorKind::Gas,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SensorKind::Temperature => "Temperature",
            SensorKind::Humidity => "Humidity",
            SensorKind::Gas => "Gas level",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            SensorKind::Temperature => "°C",
            SensorKind::Humidity => "%",
            SensorKind::Gas => "ppa",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single timestamped sensor measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

impl SensorReading {
    /// Non-finite values are clamped to zero so downstream math stays sane.
    pub fn new(timestamp: NaiveDateTime, value: f64) -> Self {
        let value = if value.is_finite() { value } else { 0.0 };
        Self { timestamp, value }
    }

    /// The degraded reading substituted when a live payload cannot be decoded.
    pub fn zero_now() -> Self {
        Self::new(Local::now().naive_local(), 0.0)
    }
}

/// Parse a firmware timestamp. The format is fixed; anything else is `None`.
pub fn parse_timestamp(stamp: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()
}

/// Current value of every sensor, as of the most recent live poll tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LiveSnapshot {
    pub temperature: SensorReading,
    pub humidity: SensorReading,
    pub gas: SensorReading,
}

impl LiveSnapshot {
    pub fn reading(&self, kind: SensorKind) -> &SensorReading {
        match kind {
            SensorKind::Temperature => &self.temperature,
            SensorKind::Humidity => &self.humidity,
            SensorKind::Gas => &self.gas,
        }
    }
}

impl Default for LiveSnapshot {
    fn default() -> Self {
        Self {
            temperature: SensorReading::zero_now(),
            humidity: SensorReading::zero_now(),
            gas: SensorReading::zero_now(),
        }
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// WIRE TYPES
//
// Field names match the realtime database document verbatim; everything else
// in the crate uses the English domain vocabulary.
// ──────────────────────────────────────────────────────────────────────────────

/// One sensor entry of the live document: `{"fechahora": ..., "registro": ...}`.
#[derive(Debug, Clone, Deserialize)]
pub struct LiveValue {
    pub fechahora: String,
    pub registro: f64,
}

impl LiveValue {
    /// An unparseable timestamp falls back to the wall clock; the value is
    /// what matters for the live display.
    fn to_reading(&self) -> SensorReading {
        let timestamp =
            parse_timestamp(&self.fechahora).unwrap_or_else(|| Local::now().naive_local());
        SensorReading::new(timestamp, self.registro)
    }
}

/// The live document: `tiemporeal_sensores.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct LivePayload {
    pub temperatura: LiveValue,
    pub humedad: LiveValue,
    pub gases: LiveValue,
}

impl From<LivePayload> for LiveSnapshot {
    fn from(payload: LivePayload) -> Self {
        Self {
            temperature: payload.temperatura.to_reading(),
            humidity: payload.humedad.to_reading(),
            gas: payload.gases.to_reading(),
        }
    }
}

/// Per-kind history maps keyed by firmware timestamp strings.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryPayload {
    pub temperatura: HashMap<String, f64>,
    pub humedad: HashMap<String, f64>,
    pub gases: HashMap<String, f64>,
}

/// The tracking document: history maps plus the live values, in one fetch.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackingPayload {
    pub historial_sensores: HistoryPayload,
    pub tiemporeal_sensores: LivePayload,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_timestamp_fixed_format() {
        let parsed = parse_timestamp("19-03-2025_14:30:05").unwrap();
        assert_eq!(
            parsed,
            NaiveDate::from_ymd_opt(2025, 3, 19)
                .unwrap()
                .and_hms_opt(14, 30, 5)
                .unwrap()
        );
    }

    #[test]
    fn test_parse_timestamp_rejects_other_formats() {
        assert!(parse_timestamp("2025-03-19T14:30:05").is_none());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("not a date").is_none());
    }

    #[test]
    fn test_non_finite_values_clamp_to_zero() {
        let now = Local::now().naive_local();
        assert_eq!(SensorReading::new(now, f64::NAN).value, 0.0);
        assert_eq!(SensorReading::new(now, f64::INFINITY).value, 0.0);
        assert_eq!(SensorReading::new(now, 21.5).value, 21.5);
    }

    #[test]
    fn test_decode_live_payload() {
        let body = r#"{
            "temperatura": {"fechahora": "19-03-2025_10:00:00", "registro": 22.5},
            "humedad": {"fechahora": "19-03-2025_10:00:00", "registro": 61.0},
            "gases": {"fechahora": "19-03-2025_10:00:00", "registro": 1.84}
        }"#;

        let payload: LivePayload = serde_json::from_str(body).unwrap();
        let snapshot = LiveSnapshot::from(payload);

        assert_eq!(snapshot.temperature.value, 22.5);
        assert_eq!(snapshot.humidity.value, 61.0);
        assert_eq!(snapshot.gas.value, 1.84);
        assert_eq!(
            snapshot.reading(SensorKind::Temperature).timestamp,
            parse_timestamp("19-03-2025_10:00:00").unwrap()
        );
    }

    #[test]
    fn test_decode_live_payload_malformed() {
        assert!(serde_json::from_str::<LivePayload>("{\"temperatura\": 3}").is_err());
        assert!(serde_json::from_str::<LivePayload>("nonsense").is_err());
    }

    #[test]
    fn test_live_value_bad_timestamp_keeps_value() {
        let value = LiveValue { fechahora: String::new(), registro: 19.0 };
        assert_eq!(value.to_reading().value, 19.0);
    }

    #[test]
    fn test_default_snapshot_is_zeroed() {
        let snapshot = LiveSnapshot::default();
        for kind in SensorKind::ALL {
            assert_eq!(snapshot.reading(kind).value, 0.0);
        }
    }
}
