use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub current: u32,
    pub best: u32,
}

/// One bucket of a fixed-window series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayMark {
    pub date: NaiveDate,
    pub completed: bool,
}

/// Number of habits completed on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub completions: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitProgress {
    pub habit_id: String,
    pub title: String,
    pub category: String,
    pub completion_rate: u8,
    pub streak: Streak,
    pub total_completions: usize,
    pub rejected_entries: usize,
    pub completed_today: bool,
    pub series: Vec<DayMark>,
}

impl HabitProgress {
    pub fn days_completed_in_series(&self) -> usize {
        self.series.iter().filter(|d| d.completed).count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakEntry {
    pub name: String,
    pub streak: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_habits: usize,
    pub active_streaks: u32,
    pub total_completions: usize,
    pub completion_rate: u8,
    pub categories: BTreeMap<String, usize>,
    pub trend: Vec<DailyCount>,
    pub top_streaks: Vec<StreakEntry>,
}

impl DashboardStats {
    pub fn completed_on_latest_day(&self) -> u32 {
        self.trend.last().map(|d| d.completions).unwrap_or(0)
    }
}
