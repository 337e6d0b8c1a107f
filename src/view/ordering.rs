//! Sort modes for task lists and the comparators behind them.

use crate::models::Task;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// The sort modes a list view offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortMode {
    Newest,
    Oldest,
    #[serde(rename = "A to Z")]
    AToZ,
    #[serde(rename = "Z to A")]
    ZToA,
    #[serde(rename = "Completed First")]
    CompletedFirst,
    #[serde(rename = "Uncompleted First")]
    UncompletedFirst,
}

impl SortMode {
    pub const ALL: [SortMode; 6] = [
        SortMode::Newest,
        SortMode::Oldest,
        SortMode::AToZ,
        SortMode::ZToA,
        SortMode::CompletedFirst,
        SortMode::UncompletedFirst,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortMode::Newest => "Newest",
            SortMode::Oldest => "Oldest",
            SortMode::AToZ => "A to Z",
            SortMode::ZToA => "Z to A",
            SortMode::CompletedFirst => "Completed First",
            SortMode::UncompletedFirst => "Uncompleted First",
        }
    }

    /// Resolves a display label ("A to Z") or a compact alias (`a-z`,
    /// `completed-first`). Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        let compact: String = label
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        match compact.as_str() {
            "newest" => Some(SortMode::Newest),
            "oldest" => Some(SortMode::Oldest),
            "atoz" | "az" => Some(SortMode::AToZ),
            "ztoa" | "za" => Some(SortMode::ZToA),
            "completedfirst" | "completed" => Some(SortMode::CompletedFirst),
            "uncompletedfirst" | "uncompleted" => Some(SortMode::UncompletedFirst),
            _ => None,
        }
    }

    pub fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortMode::Newest => compare_timestamps(a.timestamp(), b.timestamp(), true),
            SortMode::Oldest => compare_timestamps(a.timestamp(), b.timestamp(), false),
            SortMode::AToZ => compare_titles(&a.title, &b.title),
            SortMode::ZToA => compare_titles(&b.title, &a.title),
            SortMode::CompletedFirst => b.completed.cmp(&a.completed),
            SortMode::UncompletedFirst => a.completed.cmp(&b.completed),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stable sort of `tasks` by `mode`; `None` keeps the input order.
pub fn order(tasks: &[Task], mode: Option<SortMode>) -> Vec<Task> {
    let mut ordered = tasks.to_vec();
    if let Some(mode) = mode {
        ordered.sort_by(|a, b| mode.compare(a, b));
    }
    ordered
}

// Undated tasks go after every dated task, whichever direction is requested.
fn compare_timestamps(
    a: Option<NaiveDateTime>,
    b: Option<NaiveDateTime>,
    newest_first: bool,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if newest_first => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Collation-style title order.
///
/// Titles compare first by base letters, ignoring accents and case, so
/// "Éclair" sits between "apple" and "Zebra". Remaining ties are broken by
/// accents (unaccented first), then by case (lowercase first).
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    base_key(a)
        .cmp(&base_key(b))
        .then_with(|| accent_key(a).cmp(&accent_key(b)))
        .then_with(|| compare_case(a, b))
}

fn base_key(title: &str) -> String {
    title
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn accent_key(title: &str) -> String {
    title.nfd().flat_map(char::to_lowercase).collect()
}

fn compare_case(a: &str, b: &str) -> Ordering {
    a.nfd()
        .zip(b.nfd())
        .find(|(x, y)| x != y)
        .map_or(Ordering::Equal, |(x, y)| {
            match (x.is_lowercase(), y.is_lowercase()) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => x.cmp(&y),
            }
        })
}
