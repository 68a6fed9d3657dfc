use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{DayMark, Streak};
use crate::progress::history::{CalendarDay, CompletionHistory};

/// Longest window any series or rate may span (ten years).
pub const MAX_WINDOW_DAYS: u32 = 3660;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// When a run of completions still counts as the current streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakPolicy {
    /// Alive while the latest completion is today or yesterday.
    #[default]
    Lenient,
    /// Alive only if today is completed.
    Strict,
}

impl StreakPolicy {
    fn grace_days(self) -> i64 {
        match self {
            StreakPolicy::Lenient => 1,
            StreakPolicy::Strict => 0,
        }
    }
}

/// Streak and windowed-completion statistics over a completion history.
///
/// Every method is pure: the reference `now` is always passed in, so callers
/// capture it once and get mutually consistent numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressCalculator {
    policy: StreakPolicy,
}

impl ProgressCalculator {
    pub fn new(policy: StreakPolicy) -> Self {
        Self { policy }
    }

    /// Fraction (0.0..=1.0) of the last `window_days` days, today included,
    /// on which the habit was completed.
    pub fn completion_ratio(
        &self,
        history: &CompletionHistory,
        window_days: u32,
        now: impl CalendarDay,
    ) -> Result<f64, ProgressError> {
        check_window(window_days)?;
        let today = now.calendar_day();
        let start = window_start(today, window_days);
        let done = history.count_between(start, today);
        Ok(done as f64 / window_days as f64)
    }

    /// Completion percentage over the window, rounded to the nearest integer.
    pub fn completion_rate(
        &self,
        history: &CompletionHistory,
        window_days: u32,
        now: impl CalendarDay,
    ) -> Result<u8, ProgressError> {
        let ratio = self.completion_ratio(history, window_days, now)?;
        Ok(ratio_to_percent(ratio))
    }

    /// Consecutive completed days ending at the latest completion, or 0 once
    /// that completion is older than the policy allows.
    pub fn current_streak(&self, history: &CompletionHistory, now: impl CalendarDay) -> u32 {
        let today = now.calendar_day();
        let Some(latest) = history.latest_on_or_before(today) else {
            return 0;
        };
        if (today - latest).num_days() > self.policy.grace_days() {
            return 0;
        }

        let mut count = 0;
        let mut expected = Some(latest);
        for day in history.days_through(latest).rev() {
            if Some(day) != expected {
                break;
            }
            count += 1;
            expected = day.pred_opt();
        }
        count
    }

    /// Longest run of consecutive calendar days anywhere in the history.
    pub fn longest_streak(&self, history: &CompletionHistory) -> u32 {
        let mut best = 0;
        let mut run = 0;
        let mut prev: Option<NaiveDate> = None;
        for day in history.days() {
            run = match prev.and_then(|p| p.succ_opt()) {
                Some(next) if next == day => run + 1,
                _ => 1,
            };
            best = best.max(run);
            prev = Some(day);
        }
        best
    }

    pub fn streak(&self, history: &CompletionHistory, now: impl CalendarDay) -> Streak {
        let current = self.current_streak(history, now);
        let best = self.longest_streak(history).max(current);
        Streak { current, best }
    }

    /// One entry per day from `today - window_days + 1` through today.
    pub fn windowed_series(
        &self,
        history: &CompletionHistory,
        window_days: u32,
        now: impl CalendarDay,
    ) -> Result<Vec<DayMark>, ProgressError> {
        check_window(window_days)?;
        let today = now.calendar_day();

        let mut series = Vec::with_capacity(window_days as usize);
        let mut day = Some(today);
        for _ in 0..window_days {
            let Some(date) = day else { break };
            series.push(DayMark {
                date,
                completed: history.contains(date),
            });
            day = date.pred_opt();
        }
        series.reverse();
        Ok(series)
    }
}

pub fn ratio_to_percent(ratio: f64) -> u8 {
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}

fn check_window(window_days: u32) -> Result<(), ProgressError> {
    if window_days == 0 {
        return Err(ProgressError::InvalidArgument(
            "window must span at least one day".to_string(),
        ));
    }
    if window_days > MAX_WINDOW_DAYS {
        return Err(ProgressError::InvalidArgument(format!(
            "window of {} days exceeds the {} day limit",
            window_days, MAX_WINDOW_DAYS
        )));
    }
    Ok(())
}

fn window_start(today: NaiveDate, window_days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(window_days - 1)))
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveTime};

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn history(days: &[&str]) -> CompletionHistory {
        CompletionHistory::parse(days.iter().copied())
    }

    fn run_ending(end: NaiveDate, len: i64) -> CompletionHistory {
        (0..len).map(|i| end - Duration::days(i)).collect()
    }

    #[test]
    fn three_day_run_ending_today() {
        let calc = ProgressCalculator::default();
        let h = history(&["2024-01-01", "2024-01-02", "2024-01-03"]);
        let now = day("2024-01-03");
        assert_eq!(calc.current_streak(&h, now), 3);
        assert_eq!(calc.longest_streak(&h), 3);
    }

    #[test]
    fn gap_breaks_the_run() {
        let calc = ProgressCalculator::default();
        let h = history(&["2024-01-01", "2024-01-03"]);
        let now = day("2024-01-03");
        assert_eq!(calc.current_streak(&h, now), 1);
        assert_eq!(calc.longest_streak(&h), 1);
    }

    #[test]
    fn empty_history_yields_zeroes() {
        let calc = ProgressCalculator::default();
        let h = CompletionHistory::default();
        let now = day("2024-06-15");
        assert_eq!(calc.completion_rate(&h, 30, now).unwrap(), 0);
        assert_eq!(calc.current_streak(&h, now), 0);
        assert_eq!(calc.longest_streak(&h), 0);

        let series = calc.windowed_series(&h, 30, now).unwrap();
        assert_eq!(series.len(), 30);
        assert!(series.iter().all(|d| !d.completed));
    }

    #[test]
    fn full_window_is_one_hundred_percent() {
        let calc = ProgressCalculator::default();
        let now = day("2024-03-10");
        let h = run_ending(now, 30);
        assert_eq!(calc.completion_rate(&h, 30, now).unwrap(), 100);
    }

    #[test]
    fn window_covers_exactly_window_days() {
        let calc = ProgressCalculator::default();
        let now = day("2024-03-10");
        // 31 consecutive days: the oldest one falls outside a 30-day window.
        let h = run_ending(now, 31);
        assert_eq!(calc.completion_ratio(&h, 30, now).unwrap(), 1.0);

        let only_oldest: CompletionHistory = [now - Duration::days(30)].into_iter().collect();
        assert_eq!(calc.completion_rate(&only_oldest, 30, now).unwrap(), 0);
        let edge: CompletionHistory = [now - Duration::days(29)].into_iter().collect();
        assert_eq!(calc.completion_rate(&edge, 30, now).unwrap(), 3);
    }

    #[test]
    fn rate_rounds_to_nearest() {
        let calc = ProgressCalculator::default();
        let now = day("2024-03-10");
        // 2/7 = 28.57%
        let h = history(&["2024-03-10", "2024-03-08"]);
        assert_eq!(calc.completion_rate(&h, 7, now).unwrap(), 29);
        // 2/3 = 66.67%
        assert_eq!(calc.completion_rate(&h, 3, now).unwrap(), 67);
        // 1/3 = 33.33%
        assert_eq!(calc.completion_rate(&h, 3, day("2024-03-09")).unwrap(), 33);
    }

    #[test]
    fn time_of_day_does_not_shift_the_window() {
        let calc = ProgressCalculator::default();
        let h = history(&["2024-01-03", "2024-01-04"]);
        let evening = day("2024-01-04").and_time(NaiveTime::from_hms_opt(23, 30, 0).unwrap());
        let morning = day("2024-01-04").and_time(NaiveTime::from_hms_opt(0, 5, 0).unwrap());
        assert_eq!(
            calc.completion_rate(&h, 2, evening).unwrap(),
            calc.completion_rate(&h, 2, morning).unwrap()
        );
        assert_eq!(calc.completion_rate(&h, 2, evening).unwrap(), 100);
    }

    #[test]
    fn future_dates_are_ignored_by_windowed_stats() {
        let calc = ProgressCalculator::default();
        let h = history(&["2030-01-01", "2030-01-02"]);
        let now = day("2024-01-01");
        assert_eq!(calc.completion_rate(&h, 30, now).unwrap(), 0);
        assert_eq!(calc.current_streak(&h, now), 0);
        assert_eq!(calc.longest_streak(&h), 2);
    }

    #[test]
    fn rate_stays_within_bounds() {
        let calc = ProgressCalculator::default();
        let now = day("2024-05-01");
        let h = run_ending(now + Duration::days(5), 400);
        for window in [1, 2, 7, 30, 365, MAX_WINDOW_DAYS] {
            let rate = calc.completion_rate(&h, window, now).unwrap();
            assert!(rate <= 100, "window {} gave {}", window, rate);
        }
    }

    #[test]
    fn zero_window_is_rejected() {
        let calc = ProgressCalculator::default();
        let h = history(&["2024-01-01"]);
        let now = day("2024-01-01");
        assert!(matches!(
            calc.completion_rate(&h, 0, now),
            Err(ProgressError::InvalidArgument(_))
        ));
        assert!(calc.windowed_series(&h, 0, now).is_err());
        assert!(calc.windowed_series(&h, MAX_WINDOW_DAYS + 1, now).is_err());
    }

    #[test]
    fn lenient_policy_keeps_yesterdays_streak_alive() {
        let calc = ProgressCalculator::new(StreakPolicy::Lenient);
        let h = history(&["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(calc.current_streak(&h, day("2024-01-04")), 3);
        assert_eq!(calc.current_streak(&h, day("2024-01-05")), 0);
    }

    #[test]
    fn strict_policy_requires_today() {
        let calc = ProgressCalculator::new(StreakPolicy::Strict);
        let h = history(&["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(calc.current_streak(&h, day("2024-01-03")), 3);
        assert_eq!(calc.current_streak(&h, day("2024-01-04")), 0);
    }

    #[test]
    fn streak_never_grows_after_a_gap() {
        let calc = ProgressCalculator::default();
        let h = history(&["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-06"]);
        let observed: Vec<u32> = (3..=10)
            .map(|d| calc.current_streak(&h, day("2024-01-01") + Duration::days(d - 1)))
            .collect();
        // now = 01-03 .. 01-10
        assert_eq!(observed, vec![3, 3, 0, 1, 1, 0, 0, 0]);
    }

    #[test]
    fn longest_streak_picks_the_longest_run() {
        let calc = ProgressCalculator::default();
        let h = history(&[
            "2024-01-01",
            "2024-01-02",
            "2024-01-05",
            "2024-01-06",
            "2024-01-07",
            "2024-01-08",
            "2024-01-10",
        ]);
        assert_eq!(calc.longest_streak(&h), 4);
        let n_days = run_ending(day("2024-12-31"), 45);
        assert_eq!(calc.longest_streak(&n_days), 45);
    }

    #[test]
    fn runs_across_month_and_year_boundaries() {
        let calc = ProgressCalculator::default();
        let h = history(&[
            "2023-12-30",
            "2023-12-31",
            "2024-01-01",
            "2024-02-28",
            "2024-02-29",
            "2024-03-01",
        ]);
        assert_eq!(calc.longest_streak(&h), 3);
        assert_eq!(calc.current_streak(&h, day("2024-03-01")), 3);
    }

    #[test]
    fn seven_day_series_bounds() {
        let calc = ProgressCalculator::default();
        let h = history(&["2024-01-04", "2024-01-08", "2024-01-11"]);
        let series = calc.windowed_series(&h, 7, day("2024-01-10")).unwrap();
        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, day("2024-01-04"));
        assert_eq!(series[6].date, day("2024-01-10"));
        assert!(series[0].completed);
        assert!(series[4].completed);
        assert_eq!(series.iter().filter(|d| d.completed).count(), 2);
        for pair in series.windows(2) {
            assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
        }
    }

    #[test]
    fn calls_are_idempotent() {
        let calc = ProgressCalculator::default();
        let h = history(&["2024-01-01", "2024-01-02", "2024-01-09"]);
        let now = day("2024-01-09");
        assert_eq!(calc.streak(&h, now), calc.streak(&h, now));
        assert_eq!(
            calc.windowed_series(&h, 30, now).unwrap(),
            calc.windowed_series(&h, 30, now).unwrap()
        );
        assert_eq!(
            calc.completion_rate(&h, 30, now).unwrap(),
            calc.completion_rate(&h, 30, now).unwrap()
        );
    }
}
