use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{debug, warn};
use std::collections::BTreeMap;

use crate::config::ProgressConfig;
use crate::models::{DailyCount, DashboardStats, Habit, HabitProgress, Streak, StreakEntry};
use crate::progress::calculator::{ProgressCalculator, ratio_to_percent};
use crate::progress::history::{CalendarDay, CompletionHistory};

const TOP_STREAKS: usize = 5;
const TOP_STREAK_NAME_LEN: usize = 15;

/// Builds the per-habit and dashboard views from one captured `today`.
pub struct ProgressReporter<'a> {
    calc: ProgressCalculator,
    config: &'a ProgressConfig,
    today: NaiveDate,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(config: &'a ProgressConfig, now: impl CalendarDay) -> Self {
        Self {
            calc: ProgressCalculator::new(config.streak_policy),
            config,
            today: now.calendar_day(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Current/best streak, taking server-supplied numbers when configured to.
    pub fn streak_for(&self, habit: &Habit, history: &CompletionHistory) -> Streak {
        let derived = self.calc.streak(history, self.today);
        if !self.config.prefer_server_streaks {
            return derived;
        }
        let current = habit.current_streak.unwrap_or(derived.current);
        let best = habit
            .longest_streak
            .unwrap_or(derived.best)
            .max(current);
        Streak { current, best }
    }

    pub fn habit_progress(&self, habit: &Habit) -> Result<HabitProgress> {
        self.habit_progress_over(habit, self.config.chart_window_days)
    }

    pub fn habit_progress_over(&self, habit: &Habit, series_days: u32) -> Result<HabitProgress> {
        let history = history_of(habit);
        if history.is_empty() {
            debug!("Habit {} has no completions yet", habit.id);
        }

        let completion_rate = self
            .calc
            .completion_rate(&history, self.config.rate_window_days, self.today)
            .context("Computing completion rate")?;
        let series = self
            .calc
            .windowed_series(&history, series_days, self.today)
            .context("Building daily series")?;

        Ok(HabitProgress {
            habit_id: habit.id.clone(),
            title: habit.display_title().to_string(),
            category: habit.category_or_default().to_string(),
            completion_rate,
            streak: self.streak_for(habit, &history),
            total_completions: history.len(),
            rejected_entries: history.rejected(),
            completed_today: history.contains(self.today),
            series,
        })
    }

    pub fn dashboard(&self, habits: &[Habit]) -> Result<DashboardStats> {
        let trend_days = self.config.trend_window_days;
        let mut trend: Vec<DailyCount> = Vec::new();
        let mut categories: BTreeMap<String, usize> = BTreeMap::new();
        let mut ratio_sum = 0.0;
        let mut active_streaks = 0u32;
        let mut total_completions = 0usize;
        let mut streaks: Vec<StreakEntry> = Vec::with_capacity(habits.len());

        for habit in habits {
            let history = history_of(habit);
            ratio_sum += self
                .calc
                .completion_ratio(&history, self.config.rate_window_days, self.today)
                .context("Computing completion rate")?;

            let streak = self.streak_for(habit, &history);
            active_streaks += streak.current;
            total_completions += history.len();
            *categories
                .entry(habit.category_or_default().to_string())
                .or_insert(0) += 1;
            streaks.push(StreakEntry {
                name: truncate_chars(habit.display_title(), TOP_STREAK_NAME_LEN),
                streak: streak.current,
            });

            let series = self
                .calc
                .windowed_series(&history, trend_days, self.today)
                .context("Building trend series")?;
            if trend.is_empty() {
                trend = series
                    .iter()
                    .map(|d| DailyCount {
                        date: d.date,
                        completions: 0,
                    })
                    .collect();
            }
            for (bucket, mark) in trend.iter_mut().zip(&series) {
                if mark.completed {
                    bucket.completions += 1;
                }
            }
        }

        if trend.is_empty() {
            // No habits: still show an empty trend of the configured width.
            trend = self
                .calc
                .windowed_series(&CompletionHistory::default(), trend_days, self.today)
                .context("Building trend series")?
                .into_iter()
                .map(|d| DailyCount {
                    date: d.date,
                    completions: 0,
                })
                .collect();
        }

        // Stable sort keeps feed order among equal streaks.
        streaks.sort_by(|a, b| b.streak.cmp(&a.streak));
        streaks.truncate(TOP_STREAKS);

        let completion_rate = if habits.is_empty() {
            0
        } else {
            ratio_to_percent(ratio_sum / habits.len() as f64)
        };

        Ok(DashboardStats {
            total_habits: habits.len(),
            active_streaks,
            total_completions,
            completion_rate,
            categories,
            trend,
            top_streaks: streaks,
        })
    }
}

fn history_of(habit: &Habit) -> CompletionHistory {
    let history = CompletionHistory::parse(&habit.completion_history);
    for raw in history.rejected_entries() {
        warn!("Habit {}: skipping malformed completion date {:?}", habit.id, raw);
    }
    history
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
