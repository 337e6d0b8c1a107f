//! Summary numbers and the activity histogram shown on the stats screen.

use crate::models::{Category, Task};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Histograms spanning more days than this are grouped by date.
const WEEKDAY_SPAN_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub starred: usize,
    pub by_category: Vec<CategoryCount>,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|t| t.completed).count();
        Self {
            total: tasks.len(),
            completed,
            pending: tasks.len() - completed,
            starred: tasks.iter().filter(|t| t.starred).count(),
            by_category: Category::ALL
                .iter()
                .map(|&category| CategoryCount {
                    category,
                    count: tasks.iter().filter(|t| t.category == category).count(),
                })
                .collect(),
        }
    }

    /// Completed share in percent, `0.0` for an empty list.
    pub fn completion_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 * 100.0 / self.total as f64
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grouping {
    ByWeekday,
    ByDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityBucket {
    pub label: String,
    pub completed: usize,
    pub incomplete: usize,
}

/// Completed and incomplete counts over the tasks' own dates. Undated tasks
/// are left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityHistogram {
    pub grouping: Grouping,
    pub buckets: Vec<ActivityBucket>,
    pub total_completed: usize,
    pub total_incomplete: usize,
    pub date_range: Option<String>,
}

impl ActivityHistogram {
    /// `today` decides whether date labels need a year.
    pub fn from_tasks(tasks: &[Task], today: NaiveDate) -> Self {
        let dated: Vec<(NaiveDateTime, bool)> = tasks
            .iter()
            .filter_map(|t| t.timestamp().map(|ts| (ts, t.completed)))
            .collect();

        let (Some(min), Some(max)) = (
            dated.iter().map(|(ts, _)| *ts).min(),
            dated.iter().map(|(ts, _)| *ts).max(),
        ) else {
            return Self {
                grouping: Grouping::ByWeekday,
                buckets: Vec::new(),
                total_completed: 0,
                total_incomplete: 0,
                date_range: None,
            };
        };

        // Whole days, rounded up.
        const MINUTES_PER_DAY: i64 = 24 * 60;
        let span_days = ((max - min).num_minutes() + MINUTES_PER_DAY - 1) / MINUTES_PER_DAY;
        let short_range = format!(
            "{} - {}",
            min.format("%b %-d"),
            max.format("%b %-d, %Y")
        );

        let (grouping, buckets, date_range) = if span_days > WEEKDAY_SPAN_DAYS {
            let mut by_date: BTreeMap<NaiveDate, (usize, usize)> = BTreeMap::new();
            for (ts, completed) in &dated {
                tally(by_date.entry(ts.date()).or_default(), *completed);
            }
            let buckets = by_date
                .into_iter()
                .map(|(date, (completed, incomplete))| ActivityBucket {
                    label: date_label(date, today),
                    completed,
                    incomplete,
                })
                .collect();
            (Grouping::ByDate, buckets, short_range)
        } else {
            let mut by_weekday = [(0usize, 0usize); 7];
            for (ts, completed) in &dated {
                let index = ts.weekday().num_days_from_sunday() as usize;
                tally(&mut by_weekday[index], *completed);
            }
            let buckets = WEEKDAYS
                .iter()
                .zip(by_weekday)
                .map(|(label, (completed, incomplete))| ActivityBucket {
                    label: label.to_string(),
                    completed,
                    incomplete,
                })
                .collect();
            let range = if span_days == 0 {
                min.format("%B %-d, %Y").to_string()
            } else {
                short_range
            };
            (Grouping::ByWeekday, buckets, range)
        };

        let total_completed = dated.iter().filter(|(_, c)| *c).count();
        Self {
            grouping,
            buckets,
            total_completed,
            total_incomplete: dated.len() - total_completed,
            date_range: Some(date_range),
        }
    }
}

fn tally(counts: &mut (usize, usize), completed: bool) {
    if completed {
        counts.0 += 1;
    } else {
        counts.1 += 1;
    }
}

fn date_label(date: NaiveDate, today: NaiveDate) -> String {
    if date.year() == today.year() {
        date.format("%b %-d").to_string()
    } else {
        date.format("%b %-d, %Y").to_string()
    }
}
