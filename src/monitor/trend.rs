//! Trend classification over the tail of a history series.

use std::fmt;

use crate::monitor::reading::SensorReading;

/// Percent-change band (exclusive) inside which a series counts as stable.
pub const STABLE_BAND_PERCENT: f64 = 2.0;

/// Direction of the last two points of a series.
///
/// `Insufficient` covers both "fewer than two points" and a zero previous
/// value: a percent change relative to zero is undefined, so rather than
/// dividing by zero we report that there is nothing meaningful to compare.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trend {
    Insufficient,
    Stable { from: f64, to: f64 },
    Rising { from: f64, to: f64 },
    Falling { from: f64, to: f64 },
}

impl Trend {
    pub fn of(series: &[SensorReading]) -> Self {
        let [.., prev, last] = series else {
            return Trend::Insufficient;
        };
        let (from, to) = (prev.value, last.value);
        if from == 0.0 {
            return Trend::Insufficient;
        }

        let percent = (to - from) / from * 100.0;
        if percent.abs() < STABLE_BAND_PERCENT {
            Trend::Stable { from, to }
        } else if percent > 0.0 {
            Trend::Rising { from, to }
        } else {
            Trend::Falling { from, to }
        }
    }

    /// Percent change between the compared points, when defined.
    pub fn percent_change(&self) -> Option<f64> {
        match self {
            Trend::Insufficient => None,
            Trend::Stable { from, to }
            | Trend::Rising { from, to }
            | Trend::Falling { from, to } => Some((to - from) / from * 100.0),
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Insufficient => write!(f, "insufficient data"),
            Trend::Stable { to, .. } => write!(f, "stable ({to:.1})"),
            Trend::Rising { from, to } => write!(f, "rising ({from:.1} → {to:.1})"),
            Trend::Falling { from, to } => write!(f, "falling ({from:.1} → {to:.1})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(values: &[f64]) -> Vec<SensorReading> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                SensorReading::new(
                    NaiveDate::from_ymd_opt(2025, 3, 19)
                        .unwrap()
                        .and_hms_opt(10 + i as u32, 0, 0)
                        .unwrap(),
                    *v,
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_and_single_point_are_insufficient() {
        assert_eq!(Trend::of(&[]), Trend::Insufficient);
        assert_eq!(Trend::of(&series(&[20.0])), Trend::Insufficient);
        assert_eq!(Trend::of(&[]).percent_change(), None);
    }

    #[test]
    fn test_zero_previous_value_is_insufficient() {
        // Guarded explicitly: percent change relative to zero is undefined.
        assert_eq!(Trend::of(&series(&[0.0, 5.0])), Trend::Insufficient);
    }

    #[test]
    fn test_small_change_is_stable() {
        let trend = Trend::of(&series(&[20.0, 20.3]));
        assert_eq!(trend, Trend::Stable { from: 20.0, to: 20.3 });
        assert!((trend.percent_change().unwrap() - 1.5).abs() < 1e-9);
        assert_eq!(trend.to_string(), "stable (20.3)");
    }

    #[test]
    fn test_rising_twenty_percent() {
        let trend = Trend::of(&series(&[10.0, 12.0]));
        assert_eq!(trend, Trend::Rising { from: 10.0, to: 12.0 });
        assert!((trend.percent_change().unwrap() - 20.0).abs() < 1e-9);
        assert_eq!(trend.to_string(), "rising (10.0 → 12.0)");
    }

    #[test]
    fn test_falling_ten_percent() {
        let trend = Trend::of(&series(&[10.0, 9.0]));
        assert_eq!(trend, Trend::Falling { from: 10.0, to: 9.0 });
        assert!((trend.percent_change().unwrap() + 10.0).abs() < 1e-9);
        assert_eq!(trend.to_string(), "falling (10.0 → 9.0)");
    }

    #[test]
    fn test_classification_boundary_is_exactly_two_percent() {
        // 1.99% below the band, still stable.
        assert!(matches!(
            Trend::of(&series(&[100.0, 101.99])),
            Trend::Stable { .. }
        ));
        // Exactly +2% is no longer stable.
        assert!(matches!(
            Trend::of(&series(&[100.0, 102.0])),
            Trend::Rising { .. }
        ));
        // Exactly -2% is no longer stable.
        assert!(matches!(
            Trend::of(&series(&[100.0, 98.0])),
            Trend::Falling { .. }
        ));
    }

    #[test]
    fn test_only_last_two_points_matter() {
        let trend = Trend::of(&series(&[5.0, 80.0, 10.0, 12.0]));
        assert_eq!(trend, Trend::Rising { from: 10.0, to: 12.0 });
    }
}
