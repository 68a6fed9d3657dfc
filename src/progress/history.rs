use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use std::collections::BTreeSet;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Anything that can be pinned to a calendar day.
///
/// The calculator only ever compares days, so a `now` carrying a time of day
/// is truncated before any distance is taken.
pub trait CalendarDay {
    fn calendar_day(&self) -> NaiveDate;
}

impl CalendarDay for NaiveDate {
    fn calendar_day(&self) -> NaiveDate {
        *self
    }
}

impl CalendarDay for NaiveDateTime {
    fn calendar_day(&self) -> NaiveDate {
        self.date()
    }
}

impl<Tz: TimeZone> CalendarDay for DateTime<Tz> {
    fn calendar_day(&self) -> NaiveDate {
        self.date_naive()
    }
}

/// Parse a history entry into its calendar day.
///
/// Plain `YYYY-MM-DD` is the expected shape; full timestamps are tolerated
/// and reduced to the day they carry.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(day) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return Some(day);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|ts| ts.date())
}

/// Distinct completed days of one habit, ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionHistory {
    days: BTreeSet<NaiveDate>,
    rejected: Vec<String>,
}

impl CompletionHistory {
    /// Build a history from raw API strings. Malformed entries are set aside
    /// in `rejected_entries`; duplicates collapse.
    pub fn parse<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut history = Self::default();
        for entry in entries {
            let raw = entry.as_ref();
            match parse_day(raw) {
                Some(day) => {
                    history.days.insert(day);
                }
                None => history.rejected.push(raw.to_string()),
            }
        }
        history
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Number of entries dropped because they did not parse.
    pub fn rejected(&self) -> usize {
        self.rejected.len()
    }

    pub fn rejected_entries(&self) -> &[String] {
        &self.rejected
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.days.contains(&day)
    }

    pub fn days(&self) -> impl DoubleEndedIterator<Item = NaiveDate> + '_ {
        self.days.iter().copied()
    }

    /// Days in `..=day`, ascending.
    pub fn days_through(&self, day: NaiveDate) -> impl DoubleEndedIterator<Item = NaiveDate> + '_ {
        self.days.range(..=day).copied()
    }

    pub fn latest_on_or_before(&self, day: NaiveDate) -> Option<NaiveDate> {
        self.days.range(..=day).next_back().copied()
    }

    /// Distinct days in `start..=end`.
    pub fn count_between(&self, start: NaiveDate, end: NaiveDate) -> usize {
        if start > end {
            return 0;
        }
        self.days.range(start..=end).count()
    }
}

impl FromIterator<NaiveDate> for CompletionHistory {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self {
            days: iter.into_iter().collect(),
            rejected: Vec::new(),
        }
    }
}
