use super::filter::{filter_by_category, filter_by_date, filter_by_search, CategoryFilter};
use super::ordering::SortMode;
use crate::models::Task;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Everything a list screen lets the user pick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSelection {
    #[serde(default)]
    pub category: CategoryFilter,
    #[serde(default)]
    pub search_term: String,
    #[serde(default)]
    pub sort_mode: Option<SortMode>,
    #[serde(default)]
    pub selected_date: Option<NaiveDate>,
}

/// Which screen is listing, and so which optional stages apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    /// Home and per-category lists. Starred tasks are pinned first.
    Category,
    /// Only starred tasks.
    Starred,
    /// One calendar day, no pinning.
    Calendar,
}

impl Screen {
    fn pins_starred(self) -> bool {
        matches!(self, Screen::Category)
    }
}

/// Stamps each task with its position in a freshly fetched batch.
pub fn annotate_original_index(tasks: Vec<Task>) -> Vec<Task> {
    tasks
        .into_iter()
        .enumerate()
        .map(|(index, mut task)| {
            task.original_index = index;
            task
        })
        .collect()
}

/// Starred tasks first; each side keeps `original_index` order.
pub fn partition_starred(tasks: &[Task]) -> Vec<Task> {
    let mut pinned = tasks.to_vec();
    pinned.sort_by_key(|t| (!t.starred, t.original_index));
    pinned
}

/// The list a screen renders for `selection`.
///
/// Starred pinning (where the screen has it) is the outer sort key and the
/// selected sort mode the inner one; ties keep the pinned order.
pub fn derive(tasks: &[Task], selection: &ViewSelection, screen: Screen) -> Vec<Task> {
    let base: Vec<Task> = match screen {
        Screen::Category => partition_starred(tasks),
        Screen::Starred => tasks.iter().filter(|t| t.starred).cloned().collect(),
        Screen::Calendar => tasks.to_vec(),
    };

    let mut list = filter_by_category(&base, selection.category);
    if let Some(date) = selection.selected_date {
        list = filter_by_date(&list, date);
    }
    let mut list = filter_by_search(&list, &selection.search_term);

    let pin = screen.pins_starred();
    list.sort_by(|a, b| {
        let outer = if pin {
            b.starred.cmp(&a.starred)
        } else {
            Ordering::Equal
        };
        outer.then_with(|| {
            selection
                .sort_mode
                .map_or(Ordering::Equal, |mode| mode.compare(a, b))
        })
    });
    list
}
