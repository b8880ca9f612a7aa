//! Reduction of a tracker's logs to one current value.

use goalpost_core::{LogEntry, MetricKind, Tracker};

use crate::config::EngineConfig;
use crate::window::active_window;

/// Current value of `tracker` over its active window.
///
/// `None` means there is nothing to report: the tracker has never been
/// logged, or (for every kind except `SUM`) nothing was logged in the
/// window. Callers must treat `None` as "not yet met", not as zero.
pub fn aggregate(tracker: &Tracker, config: &EngineConfig) -> Option<f64> {
    if tracker.logs.is_empty() {
        return None;
    }

    let entries = active_window(tracker, config).entries(tracker);
    match tracker.metric_kind {
        MetricKind::Sum => Some(entries.iter().map(|e| e.value).sum()),
        kind => reduce(kind, &entries),
    }
}

/// Reduce date-ordered `entries` according to `kind`.
fn reduce(kind: MetricKind, entries: &[LogEntry]) -> Option<f64> {
    let last = entries.last()?;
    let values = entries.iter().map(|e| e.value);

    let value = match kind {
        MetricKind::Sum => values.sum::<f64>(),
        MetricKind::Latest | MetricKind::Boolean => last.value,
        MetricKind::Min => values.fold(f64::INFINITY, f64::min),
        MetricKind::Max => values.fold(f64::NEG_INFINITY, f64::max),
        MetricKind::Mean => values.sum::<f64>() / entries.len() as f64,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use goalpost_core::{Cadence, SuccessLogic, TargetRange};

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn tracker(kind: MetricKind, cadence: Cadence, logs: &[(&str, f64)]) -> Tracker {
        logs.iter().fold(
            Tracker::new("t", kind, TargetRange::unbounded(), SuccessLogic::TotalCount { threshold: 1 })
                .with_cadence(cadence),
            |t, (date, value)| t.append(d(date), *value).unwrap(),
        )
    }

    #[test]
    fn test_sum_over_window() {
        let config = EngineConfig::as_of(d("2024-01-07"));
        let t = tracker(
            MetricKind::Sum,
            Cadence::Weekly,
            &[("2024-01-01", 10.0), ("2024-01-03", 15.0), ("2024-01-05", 20.0), ("2023-12-31", 100.0)],
        );
        assert_eq!(aggregate(&t, &config), Some(45.0));
    }

    #[test]
    fn test_sum_is_zero_when_window_empty_but_history_exists() {
        let config = EngineConfig::as_of(d("2024-03-01"));
        let t = tracker(MetricKind::Sum, Cadence::Daily, &[("2024-01-01", 3.0)]);
        assert_eq!(aggregate(&t, &config), Some(0.0));
    }

    #[test]
    fn test_empty_history_is_absent() {
        let config = EngineConfig::as_of(d("2024-01-01"));
        for kind in [MetricKind::Sum, MetricKind::Latest, MetricKind::Boolean, MetricKind::Mean] {
            assert_eq!(aggregate(&tracker(kind, Cadence::Once, &[]), &config), None);
        }
    }

    #[test]
    fn test_latest_picks_max_date_not_insertion_order() {
        let config = EngineConfig::as_of(d("2024-01-10"));
        let t = tracker(
            MetricKind::Latest,
            Cadence::Once,
            &[("2024-01-05", 80.0), ("2024-01-02", 70.0)],
        );
        assert_eq!(aggregate(&t, &config), Some(80.0));
    }

    #[test]
    fn test_latest_same_date_is_last_write() {
        let config = EngineConfig::as_of(d("2024-01-10"));
        let t = tracker(
            MetricKind::Latest,
            Cadence::Once,
            &[("2024-01-05", 80.0), ("2024-01-05", 75.0)],
        );
        assert_eq!(aggregate(&t, &config), Some(75.0));
    }

    #[test]
    fn test_latest_outside_window_is_absent() {
        let config = EngineConfig::as_of(d("2024-01-20"));
        let t = tracker(MetricKind::Boolean, Cadence::Daily, &[("2024-01-19", 1.0)]);
        assert_eq!(aggregate(&t, &config), None);
    }

    #[test]
    fn test_future_entries_excluded_from_window() {
        let config = EngineConfig::as_of(d("2024-01-10"));
        let t = tracker(MetricKind::Sum, Cadence::Weekly, &[("2024-01-09", 2.0), ("2024-01-11", 5.0)]);
        assert_eq!(aggregate(&t, &config), Some(2.0));
    }

    #[test]
    fn test_min_max_mean() {
        let config = EngineConfig::as_of(d("2024-01-07"));
        let logs = [("2024-01-05", 4.0), ("2024-01-06", 8.0), ("2024-01-07", 6.0)];
        assert_eq!(aggregate(&tracker(MetricKind::Min, Cadence::Weekly, &logs), &config), Some(4.0));
        assert_eq!(aggregate(&tracker(MetricKind::Max, Cadence::Weekly, &logs), &config), Some(8.0));
        assert_eq!(aggregate(&tracker(MetricKind::Mean, Cadence::Weekly, &logs), &config), Some(6.0));
    }

    #[test]
    fn test_window_days_overrides_cadence() {
        let config = EngineConfig::as_of(d("2024-01-10"));
        let t = tracker(MetricKind::Sum, Cadence::Daily, &[("2024-01-08", 1.0), ("2024-01-09", 2.0), ("2024-01-10", 3.0)])
            .with_window_days(2);
        assert_eq!(aggregate(&t, &config), Some(5.0));
    }
}
