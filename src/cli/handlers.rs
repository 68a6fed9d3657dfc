use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;

use crate::config::AppConfig;
use crate::feed::{HabitQuery, find_habit};
use crate::models::{Habit, HabitProgress};
use crate::progress::ProgressReporter;
use crate::utils::format::{
    format_short_date, pad_to_width, percent_bar, progress_bar, series_strip,
};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const BLUE: &str = "\x1b[38;2;37;99;235m";

const BAR_WIDTH: usize = 20;
const TITLE_WIDTH: usize = 24;

fn rate_color(rate: u8) -> &'static str {
    match rate {
        70..=100 => GREEN,
        30..=69 => AMBER,
        _ => RED,
    }
}

// ─── Overview ────────────────────────────────────────────────────────────────

pub fn handle_overview(habits: &[Habit], config: &AppConfig, today: NaiveDate) -> Result<()> {
    let reporter = ProgressReporter::new(&config.progress, today);
    let stats = reporter.dashboard(habits)?;

    println!();
    println_colored!(BLUE, "  Dashboard — {}", today.format("%Y-%m-%d"));
    println!();
    println_colored!(BOLD, "  Total habits:      {}", stats.total_habits);
    println_colored!(BOLD, "  Active streaks:    {} days", stats.active_streaks);
    println_colored!(BOLD, "  Total completions: {}", stats.total_completions);
    println_colored!(
        BOLD,
        "  Done today:        {}/{}",
        stats.completed_on_latest_day(),
        stats.total_habits
    );
    println_colored!(
        rate_color(stats.completion_rate),
        "  Completion rate:   {}% ({}d)  {}",
        stats.completion_rate,
        config.progress.rate_window_days,
        percent_bar(stats.completion_rate, BAR_WIDTH)
    );

    if !stats.categories.is_empty() {
        println!();
        println_colored!(BLUE, "  By category");
        for (category, count) in &stats.categories {
            println!("  {}  {}", pad_to_width(category, TITLE_WIDTH), count);
        }
    }

    println!();
    println_colored!(BLUE, "  Completion trend (last {} days)", stats.trend.len());
    let peak = stats
        .trend
        .iter()
        .map(|d| d.completions)
        .max()
        .unwrap_or(0)
        .max(1);
    for point in &stats.trend {
        println!(
            "  {}  {}  {}",
            pad_to_width(&format_short_date(point.date), 7),
            progress_bar(point.completions, peak, BAR_WIDTH),
            point.completions
        );
    }

    if !stats.top_streaks.is_empty() {
        println!();
        println_colored!(BLUE, "  Top habits by streak");
        for entry in &stats.top_streaks {
            println!("  {}  {}", pad_to_width(&entry.name, TITLE_WIDTH), entry.streak);
        }
    }
    println!();
    Ok(())
}

// ─── Show ────────────────────────────────────────────────────────────────────

fn lookup<'a>(habits: &'a [Habit], id: &str) -> Result<&'a Habit> {
    find_habit(habits, id).ok_or_else(|| anyhow!("Habit '{}' not found in feed", id))
}

pub fn handle_show(
    habits: &[Habit],
    config: &AppConfig,
    today: NaiveDate,
    id: &str,
) -> Result<()> {
    let habit = lookup(habits, id)?;
    let reporter = ProgressReporter::new(&config.progress, today);
    let progress = reporter.habit_progress(habit)?;

    println!();
    println_colored!(BLUE, "  {}  ({})", progress.title, progress.category);
    if let Some(description) = habit.description.as_deref() {
        println_colored!(DIM, "  {}", description);
    }
    println!();
    println_colored!(
        rate_color(progress.completion_rate),
        "  Progress (last {} days):  {}  {}%",
        config.progress.rate_window_days,
        percent_bar(progress.completion_rate, BAR_WIDTH),
        progress.completion_rate
    );
    println_colored!(
        BOLD,
        "  Streak:  {} days current  |  {} days best",
        progress.streak.current,
        progress.streak.best
    );
    println!("  Completions: {}", progress.total_completions);
    if progress.completed_today {
        println_colored!(GREEN, "  ✓ Completed today");
    } else {
        println_colored!(AMBER, "  ○ Not yet completed today");
    }
    if let Some(reminder) = habit.reminder_time.as_deref() {
        println_colored!(DIM, "  Reminder: {}", reminder);
    }
    print_rejected(&progress);
    println!();
    println_colored!(DIM, "  Last {} days", progress.series.len());
    println!("  {}", series_strip(&progress.series));
    println!();
    Ok(())
}

// ─── Chart ───────────────────────────────────────────────────────────────────

pub fn handle_chart(
    habits: &[Habit],
    config: &AppConfig,
    today: NaiveDate,
    id: &str,
    days: Option<u32>,
) -> Result<()> {
    let habit = lookup(habits, id)?;
    let reporter = ProgressReporter::new(&config.progress, today);
    let days = days.unwrap_or(config.progress.chart_window_days);
    let progress = reporter
        .habit_progress_over(habit, days)
        .with_context(|| format!("Charting {} days", days))?;

    println!();
    println_colored!(
        BLUE,
        "  {} — {}/{} days",
        progress.title,
        progress.days_completed_in_series(),
        progress.series.len()
    );
    println!();
    for mark in &progress.series {
        if mark.completed {
            println_colored!(GREEN, "  {}  ●", pad_to_width(&format_short_date(mark.date), 7));
        } else {
            println_colored!(DIM, "  {}  ○", pad_to_width(&format_short_date(mark.date), 7));
        }
    }
    print_rejected(&progress);
    println!();
    Ok(())
}

// ─── List ────────────────────────────────────────────────────────────────────

pub fn handle_list(habits: &[Habit], query: &HabitQuery) -> Result<()> {
    let page = query.apply(habits)?;

    println!();
    if page.total_matches == 0 {
        println_colored!(DIM, "  No habits match");
        println!();
        return Ok(());
    }

    println_colored!(
        BLUE,
        "  Habits ({} found, page {}/{})",
        page.total_matches,
        page.page,
        page.total_pages
    );
    println!();
    for habit in &page.items {
        let visibility = if habit.is_public { "public" } else { "private" };
        println!(
            "  {}  {}  🔥 {:<4} {}{}\x1b[0m",
            pad_to_width(habit.display_title(), TITLE_WIDTH),
            pad_to_width(habit.category_or_default(), 10),
            habit.current_streak.unwrap_or(0),
            DIM,
            visibility
        );
        println_colored!(DIM, "    id: {}", habit.id);
    }
    println!();
    Ok(())
}

// ─── Export ──────────────────────────────────────────────────────────────────

pub fn handle_export(habits: &[Habit], config: &AppConfig, today: NaiveDate) -> Result<()> {
    let reporter = ProgressReporter::new(&config.progress, today);
    let report = export_report(&reporter, habits)?;
    let json = serde_json::to_string_pretty(&report).context("Serializing report")?;
    println!("{}", json);
    Ok(())
}

fn export_report(reporter: &ProgressReporter<'_>, habits: &[Habit]) -> Result<serde_json::Value> {
    let dashboard = reporter.dashboard(habits)?;
    let progress = habits
        .iter()
        .map(|h| reporter.habit_progress(h))
        .collect::<Result<Vec<_>>>()?;
    Ok(serde_json::json!({
        "date": reporter.today(),
        "dashboard": dashboard,
        "habits": progress,
    }))
}

// ─── Config ──────────────────────────────────────────────────────────────────

pub fn handle_config(config: &AppConfig, write: bool) -> Result<()> {
    let path = AppConfig::config_path()?;
    if write {
        config.save_to(&path)?;
        println_colored!(GREEN, "  ✓ Wrote {}", path.display());
        return Ok(());
    }
    println_colored!(DIM, "# {}", path.display());
    print!("{}", toml::to_string_pretty(config).context("Serializing config")?);
    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn print_rejected(progress: &HabitProgress) {
    if progress.rejected_entries > 0 {
        println_colored!(
            AMBER,
            "  ! {} unreadable completion entries ignored",
            progress.rejected_entries
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::source::parse_habits;

    #[test]
    fn export_includes_every_habit() {
        let habits = parse_habits(
            r#"[{"_id": "a", "title": "Walk", "completionHistory": ["2024-01-09", "2024-01-10"]},
                {"_id": "b", "title": "Read", "completionHistory": []}]"#,
        )
        .unwrap();
        let config = AppConfig::default();
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let reporter = ProgressReporter::new(&config.progress, today);

        let report = export_report(&reporter, &habits).unwrap();
        assert_eq!(report["date"], "2024-01-10");
        assert_eq!(report["dashboard"]["totalHabits"], 2);
        assert_eq!(report["habits"][0]["streak"]["current"], 2);
        assert_eq!(report["habits"][0]["series"].as_array().unwrap().len(), 30);
        assert_eq!(report["habits"][1]["completionRate"], 0);
    }

    #[test]
    fn unknown_habit_is_reported() {
        let habits = parse_habits(r#"[{"_id": "a"}]"#).unwrap();
        let err = lookup(&habits, "zzz").unwrap_err();
        assert!(err.to_string().contains("zzz"));
    }

    #[test]
    fn rate_colors_follow_thresholds() {
        assert_eq!(rate_color(100), GREEN);
        assert_eq!(rate_color(45), AMBER);
        assert_eq!(rate_color(0), RED);
    }
}
