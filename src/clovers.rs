//! Month summary for the "my clovers" overview: one clover per entry,
//! grouped by calendar month, most recent month first.

use crate::diary_entry::DiaryEntry;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::fmt;

/// Clovers drawn on a single month card.
pub const CLOVER_CAP: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// "April, 2023"
    pub fn label(&self) -> String {
        match self.first_day() {
            Some(day) => day.format("%B, %Y").to_string(),
            None => format!("{:04}-{:02}", self.year, self.month),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthBucket {
    pub year_month: YearMonth,
    pub count: usize,
}

impl MonthBucket {
    pub fn tokens(&self) -> usize {
        self.count.min(CLOVER_CAP)
    }

    pub fn opacity(&self) -> f32 {
        opacity_tier(i64::try_from(self.count).unwrap_or(i64::MAX))
    }
}

pub fn group_by_month<'a, I>(entries: I) -> Vec<MonthBucket>
where
    I: IntoIterator<Item = &'a DiaryEntry>,
{
    let mut counts: BTreeMap<YearMonth, usize> = BTreeMap::new();
    for entry in entries {
        *counts.entry(YearMonth::of(entry.date)).or_default() += 1;
    }

    counts
        .into_iter()
        .rev()
        .map(|(year_month, count)| MonthBucket { year_month, count })
        .collect()
}

/// Step function in bands of five; each band includes its lower bound.
pub fn opacity_tier(count: i64) -> f32 {
    match count {
        i64::MIN..=-1 => 0.0,
        0..=4 => 0.5,
        5..=9 => 0.6,
        10..=14 => 0.7,
        15..=19 => 0.8,
        20..=24 => 0.9,
        _ => 1.0,
    }
}
