use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate};
use clap::ValueEnum;
use std::cmp::Ordering;

use crate::models::Habit;
use crate::progress::history::parse_day;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Streak,
    Title,
}

/// Client-side search, filter, sort and paging over an already-fetched feed.
#[derive(Debug, Clone)]
pub struct HabitQuery {
    pub search: Option<String>,
    pub categories: Vec<String>,
    pub public_only: bool,
    pub sort: SortOrder,
    pub page: usize,
    pub per_page: usize,
}

impl Default for HabitQuery {
    fn default() -> Self {
        Self {
            search: None,
            categories: vec![],
            public_only: false,
            sort: SortOrder::default(),
            page: 1,
            per_page: 10,
        }
    }
}

#[derive(Debug)]
pub struct HabitPage<'a> {
    pub items: Vec<&'a Habit>,
    pub page: usize,
    pub total_pages: usize,
    pub total_matches: usize,
}

impl HabitQuery {
    pub fn matches(&self, habit: &Habit) -> bool {
        if self.public_only && !habit.is_public {
            return false;
        }
        if !self.categories.is_empty() {
            let category = habit.category_or_default();
            if !self
                .categories
                .iter()
                .any(|c| c.eq_ignore_ascii_case(category))
            {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                habit.title.to_lowercase().contains(&needle)
                    || habit
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            }
        }
    }

    pub fn apply<'a>(&self, habits: &'a [Habit]) -> Result<HabitPage<'a>> {
        if self.page == 0 || self.per_page == 0 {
            bail!("page and per-page must both be at least 1");
        }

        let mut items: Vec<&Habit> = habits.iter().filter(|h| self.matches(h)).collect();
        items.sort_by(|a, b| compare(self.sort, a, b));

        let total_matches = items.len();
        let total_pages = total_matches.div_ceil(self.per_page).max(1);
        let skip = (self.page - 1).saturating_mul(self.per_page);
        let items = items.into_iter().skip(skip).take(self.per_page).collect();

        Ok(HabitPage {
            items,
            page: self.page,
            total_pages,
            total_matches,
        })
    }
}

fn created_day(habit: &Habit) -> Option<NaiveDate> {
    let raw = habit.created_at.as_deref()?;
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.date_naive())
        .ok()
        .or_else(|| parse_day(raw))
}

fn compare(order: SortOrder, a: &Habit, b: &Habit) -> Ordering {
    match order {
        // Habits without a creation date sink to the end either way.
        SortOrder::Newest => match (created_day(a), created_day(b)) {
            (Some(x), Some(y)) => y.cmp(&x),
            (a, b) => b.is_some().cmp(&a.is_some()),
        },
        SortOrder::Oldest => match (created_day(a), created_day(b)) {
            (Some(x), Some(y)) => x.cmp(&y),
            (a, b) => b.is_some().cmp(&a.is_some()),
        },
        SortOrder::Streak => b
            .current_streak
            .unwrap_or(0)
            .cmp(&a.current_streak.unwrap_or(0)),
        SortOrder::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
    }
}
