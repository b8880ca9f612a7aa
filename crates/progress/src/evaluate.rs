//! Success evaluation for trackers.

use chrono::NaiveDate;
use goalpost_core::{SuccessLogic, TargetRange, Tracker, TrackerId};
use serde::Serialize;

use crate::aggregate::aggregate;
use crate::config::EngineConfig;
use crate::window::periods;

/// Tolerance for treating a value as equal to an exact target.
const TARGET_EPSILON: f64 = 1e-9;

/// Whether the tracker's success condition currently holds.
///
/// A tracker with no logs is never satisfied.
pub fn evaluate(tracker: &Tracker, config: &EngineConfig) -> bool {
    if tracker.logs.is_empty() {
        return false;
    }

    match tracker.success_logic {
        SuccessLogic::TotalCount { threshold } => met_entries(tracker) >= threshold as usize,
        SuccessLogic::Streak { threshold } => trailing_streak(tracker, config) >= threshold,
        SuccessLogic::Achieved { threshold } => match aggregate(tracker, config) {
            Some(current) => achieves(&tracker.target_range, current, threshold),
            None => false,
        },
    }
}

/// Number of entries over all history whose value lies in the target range.
pub fn met_entries(tracker: &Tracker) -> usize {
    tracker
        .logs
        .iter()
        .filter(|e| tracker.target_range.contains(e.value))
        .count()
}

/// Length of the run of met periods ending at the most recent logged period.
///
/// A period is met when every entry logged in it lies in the target range.
/// A single unmet entry, or a period with no entries, ends the run.
pub fn trailing_streak(tracker: &Tracker, config: &EngineConfig) -> u32 {
    let mut streak = 0;
    let mut expected = None;

    for period in periods(tracker, config) {
        if expected.is_some_and(|index| index != period.index) {
            break;
        }
        let met = !period.entries.is_empty()
            && period
                .entries
                .iter()
                .all(|e| tracker.target_range.contains(e.value));
        if !met {
            break;
        }
        streak += 1;
        expected = Some(period.index + 1);
    }

    streak
}

/// `current` is in range and reaches `threshold` in the range's direction.
fn achieves(range: &TargetRange, current: f64, threshold: f64) -> bool {
    if !range.contains(current) {
        return false;
    }

    match (range.min(), range.max()) {
        (Some(_), Some(_)) => (current - threshold).abs() <= TARGET_EPSILON,
        (None, Some(_)) => current <= threshold,
        (Some(_), None) | (None, None) => current >= threshold,
    }
}

/// Everything the dashboard shows for one tracker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerReport {
    /// Tracker reported on
    pub tracker: TrackerId,

    /// Aggregated value over the active window
    pub current_value: Option<f64>,

    /// Whether the success condition holds
    pub satisfied: bool,

    /// Entries in range over all history
    pub met_entries: usize,

    /// Trailing run of met periods
    pub trailing_streak: u32,

    /// Date of the newest entry
    pub last_log_date: Option<NaiveDate>,

    /// Fill level toward the target, in `[0, 1]`
    pub progress_ratio: Option<f64>,
}

/// Build a full report for `tracker`.
pub fn report(tracker: &Tracker, config: &EngineConfig) -> TrackerReport {
    let current_value = aggregate(tracker, config);

    TrackerReport {
        tracker: tracker.id.clone(),
        current_value,
        satisfied: evaluate(tracker, config),
        met_entries: met_entries(tracker),
        trailing_streak: trailing_streak(tracker, config),
        last_log_date: tracker.last_log_date(),
        progress_ratio: progress_ratio(&tracker.target_range, current_value),
    }
}

// The upper bound wins as the gauge target, falling back to the lower one.
fn progress_ratio(range: &TargetRange, current: Option<f64>) -> Option<f64> {
    let target = range.max().or(range.min()).filter(|t| *t > 0.0)?;
    let current = current.unwrap_or(0.0);
    Some((current / target).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use goalpost_core::{Cadence, MetricKind};

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn with_logs(tracker: Tracker, logs: &[(&str, f64)]) -> Tracker {
        logs.iter()
            .fold(tracker, |t, (date, value)| t.append(d(date), *value).unwrap())
    }

    fn weekly_streak(threshold: u32) -> Tracker {
        Tracker::new(
            "runs",
            MetricKind::Sum,
            TargetRange::at_least(3.0),
            SuccessLogic::Streak { threshold },
        )
        .with_cadence(Cadence::Weekly)
    }

    #[test]
    fn test_empty_history_never_satisfied() {
        let config = EngineConfig::as_of(d("2024-01-01"));
        for logic in [
            SuccessLogic::Streak { threshold: 0 },
            SuccessLogic::TotalCount { threshold: 0 },
            SuccessLogic::Achieved { threshold: 0.0 },
        ] {
            let t = Tracker::new("t", MetricKind::Sum, TargetRange::unbounded(), logic);
            assert!(!evaluate(&t, &config));
        }
    }

    #[test]
    fn test_sum_achieved_example() {
        let config = EngineConfig::as_of(d("2024-01-07"));
        let t = with_logs(
            Tracker::new(
                "savings",
                MetricKind::Sum,
                TargetRange::at_least(30.0),
                SuccessLogic::Achieved { threshold: 30.0 },
            )
            .with_cadence(Cadence::Weekly),
            &[("2024-01-02", 10.0), ("2024-01-04", 15.0), ("2024-01-06", 20.0)],
        );
        assert_eq!(aggregate(&t, &config), Some(45.0));
        assert!(evaluate(&t, &config));
    }

    #[test]
    fn test_achieved_upper_bound_is_a_maximum() {
        let config = EngineConfig::as_of(d("2024-01-10"));
        let base = Tracker::new(
            "weight",
            MetricKind::Latest,
            TargetRange::at_most(80.0),
            SuccessLogic::Achieved { threshold: 75.0 },
        );
        assert!(evaluate(&with_logs(base.clone(), &[("2024-01-10", 74.0)]), &config));
        assert!(!evaluate(&with_logs(base.clone(), &[("2024-01-10", 78.0)]), &config));
        assert!(!evaluate(&with_logs(base, &[("2024-01-10", 81.0)]), &config));
    }

    #[test]
    fn test_achieved_fully_bounded_is_exact_target() {
        let config = EngineConfig::as_of(d("2024-01-10"));
        let base = Tracker::new(
            "done",
            MetricKind::Boolean,
            TargetRange::new(Some(1.0), Some(1.0)).unwrap(),
            SuccessLogic::Achieved { threshold: 1.0 },
        );
        assert!(evaluate(&with_logs(base.clone(), &[("2024-01-03", 1.0)]), &config));
        assert!(!evaluate(&with_logs(base, &[("2024-01-03", 1.0), ("2024-01-04", 0.0)]), &config));
    }

    #[test]
    fn test_achieved_out_of_range_fails_even_past_threshold() {
        let config = EngineConfig::as_of(d("2024-01-10"));
        let t = with_logs(
            Tracker::new(
                "sleep",
                MetricKind::Latest,
                TargetRange::new(Some(7.0), Some(9.0)).unwrap(),
                SuccessLogic::Achieved { threshold: 8.0 },
            ),
            &[("2024-01-10", 10.0)],
        );
        assert!(!evaluate(&t, &config));
    }

    #[test]
    fn test_total_count_counts_all_history() {
        let config = EngineConfig::as_of(d("2024-06-01"));
        let base = Tracker::new(
            "pushups",
            MetricKind::Latest,
            TargetRange::at_least(20.0),
            SuccessLogic::TotalCount { threshold: 3 },
        )
        .with_cadence(Cadence::Daily);
        let two = with_logs(base, &[("2024-01-01", 25.0), ("2024-01-02", 10.0), ("2024-01-03", 30.0)]);
        assert_eq!(met_entries(&two), 2);
        assert!(!evaluate(&two, &config));

        let three = two.append(d("2024-02-01"), 21.0).unwrap();
        assert_eq!(met_entries(&three), 3);
        assert!(evaluate(&three, &config));
    }

    #[test]
    fn test_total_count_monotonic_under_met_appends() {
        let mut t = Tracker::new(
            "t",
            MetricKind::Latest,
            TargetRange::at_least(1.0),
            SuccessLogic::TotalCount { threshold: 1 },
        );
        let mut previous = 0;
        for day in 1..=20 {
            let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
            t = t.append(date, if day % 3 == 0 { 0.0 } else { 5.0 }).unwrap();
            let now = met_entries(&t);
            assert!(now >= previous);
            previous = now;
        }
    }

    #[test]
    fn test_weekly_streak_of_three() {
        let config = EngineConfig::as_of(d("2024-01-21"));
        // Weeks (back from 01-21): 01-15..21, 01-08..14, 01-01..07
        let t = with_logs(
            weekly_streak(3),
            &[("2024-01-02", 3.0), ("2024-01-09", 5.0), ("2024-01-12", 3.5), ("2024-01-16", 4.0)],
        );
        assert_eq!(trailing_streak(&t, &config), 3);
        assert!(evaluate(&t, &config));
    }

    #[test]
    fn test_streak_judges_each_entry_not_the_period_total() {
        let config = EngineConfig::as_of(d("2024-01-21"));
        // Week 2 sums to 3.0 but both of its entries are below the range.
        let t = with_logs(
            weekly_streak(3),
            &[("2024-01-02", 3.0), ("2024-01-09", 1.0), ("2024-01-12", 2.0), ("2024-01-16", 4.0)],
        );
        assert_eq!(met_entries(&t), 2);
        assert_eq!(trailing_streak(&t, &config), 1);
        assert!(!evaluate(&t, &config));
    }

    #[test]
    fn test_unmet_entry_breaks_otherwise_met_period() {
        let config = EngineConfig::as_of(d("2024-01-14"));
        // Weeks: 01-08..14 holds a miss on 01-09 next to a hit on 01-10.
        let t = with_logs(
            Tracker::new(
                "journal",
                MetricKind::Boolean,
                TargetRange::new(Some(1.0), Some(1.0)).unwrap(),
                SuccessLogic::Streak { threshold: 2 },
            )
            .with_cadence(Cadence::Weekly),
            &[("2024-01-03", 1.0), ("2024-01-09", 0.0), ("2024-01-10", 1.0)],
        );
        assert_eq!(trailing_streak(&t, &config), 0);
        assert!(!evaluate(&t, &config));

        let fixed = t.append(d("2024-01-09"), 1.0).unwrap();
        assert_eq!(trailing_streak(&fixed, &config), 2);
        assert!(evaluate(&fixed, &config));
    }

    #[test]
    fn test_weekly_streak_resets_on_missed_week() {
        let config = EngineConfig::as_of(d("2024-01-21"));
        let t = with_logs(
            weekly_streak(3),
            &[("2024-01-02", 3.0), ("2024-01-09", 1.0), ("2024-01-16", 4.0)],
        );
        assert_eq!(trailing_streak(&t, &config), 1);
        assert!(!evaluate(&t, &config));
    }

    #[test]
    fn test_streak_breaks_on_missing_period() {
        let config = EngineConfig::as_of(d("2024-01-10"));
        let t = with_logs(
            Tracker::new(
                "meditate",
                MetricKind::Boolean,
                TargetRange::new(Some(1.0), Some(1.0)).unwrap(),
                SuccessLogic::Streak { threshold: 2 },
            )
            .with_cadence(Cadence::Daily),
            &[("2024-01-06", 1.0), ("2024-01-07", 1.0), ("2024-01-09", 1.0)],
        );
        assert_eq!(trailing_streak(&t, &config), 1);
        assert!(!evaluate(&t, &config));
    }

    #[test]
    fn test_streak_ends_at_most_recent_logged_period() {
        // The run does not have to reach today; it ends at the newest period present.
        let config = EngineConfig::as_of(d("2024-01-20"));
        let t = with_logs(
            Tracker::new(
                "meditate",
                MetricKind::Boolean,
                TargetRange::new(Some(1.0), Some(1.0)).unwrap(),
                SuccessLogic::Streak { threshold: 3 },
            )
            .with_cadence(Cadence::Daily),
            &[("2024-01-01", 0.0), ("2024-01-02", 1.0), ("2024-01-03", 1.0), ("2024-01-04", 1.0)],
        );
        assert_eq!(trailing_streak(&t, &config), 3);
        assert!(evaluate(&t, &config));
    }

    #[test]
    fn test_streak_once_cadence_uses_consecutive_entries() {
        let config = EngineConfig::as_of(d("2024-12-31"));
        let t = with_logs(
            Tracker::new(
                "exam",
                MetricKind::Latest,
                TargetRange::at_least(50.0),
                SuccessLogic::Streak { threshold: 2 },
            ),
            &[("2024-01-01", 40.0), ("2024-03-01", 60.0), ("2024-09-01", 70.0)],
        );
        assert_eq!(trailing_streak(&t, &config), 2);
    }

    #[test]
    fn test_report_progress_ratio() {
        let config = EngineConfig::as_of(d("2024-01-07"));
        let t = with_logs(
            Tracker::new(
                "km",
                MetricKind::Sum,
                TargetRange::at_least(40.0),
                SuccessLogic::Achieved { threshold: 40.0 },
            )
            .with_cadence(Cadence::Weekly),
            &[("2024-01-06", 10.0)],
        );
        let r = report(&t, &config);
        assert_eq!(r.current_value, Some(10.0));
        assert_eq!(r.progress_ratio, Some(0.25));
        assert!(!r.satisfied);
        assert_eq!(r.last_log_date, Some(d("2024-01-06")));

        let full = report(&t.append(d("2024-01-07"), 90.0).unwrap(), &config);
        assert_eq!(full.progress_ratio, Some(1.0));
        assert!(full.satisfied);
    }
}
