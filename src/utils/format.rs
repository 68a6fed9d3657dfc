use chrono::NaiveDate;
use unicode_width::UnicodeWidthStr;

use crate::models::DayMark;

/// Format a date the way the dashboards label chart axes, e.g. "Jan 4"
pub fn format_short_date(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Create a simple progress bar for a 0-100 percentage
pub fn percent_bar(percent: u8, width: usize) -> String {
    progress_bar(u32::from(percent), 100, width)
}

/// Create a simple ASCII progress bar
pub fn progress_bar(filled: u32, total: u32, width: usize) -> String {
    if total == 0 {
        return "░".repeat(width);
    }
    let ratio = (filled as f64 / total as f64).min(1.0);
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

/// One dot per day: ● completed, ○ missed
pub fn series_strip(series: &[DayMark]) -> String {
    series
        .iter()
        .map(|d| if d.completed { "●" } else { "○" })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pad to a display width, counting wide glyphs correctly
pub fn pad_to_width(s: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(s);
    format!("{}{}", s, " ".repeat(width.saturating_sub(used)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_scale_to_width() {
        assert_eq!(percent_bar(0, 4), "░░░░");
        assert_eq!(percent_bar(50, 4), "██░░");
        assert_eq!(percent_bar(100, 4), "████");
        assert_eq!(progress_bar(3, 0, 2), "░░");
        assert_eq!(progress_bar(9, 3, 3), "███");
    }

    #[test]
    fn strip_marks_each_day() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();
        let series = [
            DayMark {
                date: d,
                completed: true,
            },
            DayMark {
                date: d,
                completed: false,
            },
        ];
        assert_eq!(series_strip(&series), "● ○");
    }

    #[test]
    fn short_dates_and_padding() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();
        assert_eq!(format_short_date(d), "Jan 4");
        assert_eq!(pad_to_width("ab", 4), "ab  ");
        assert_eq!(pad_to_width("日本", 5), "日本 ");
        assert_eq!(pad_to_width("toolong", 3), "toolong");
    }
}
