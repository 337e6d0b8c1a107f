//! Filter stages applied, in order, by the list derivation: category, then
//! calendar date, then title prefix search. Each stage is usable alone.

use crate::datetime;
use crate::models::{Category, Task, TaskError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Active category selector. `All` is the `"all"` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => task.category == category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(CategoryFilter::All);
        }
        s.parse().map(CategoryFilter::Only)
    }
}

impl TryFrom<String> for CategoryFilter {
    type Error = TaskError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CategoryFilter> for String {
    fn from(filter: CategoryFilter) -> Self {
        filter.to_string()
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("all"),
            CategoryFilter::Only(category) => write!(f, "{category}"),
        }
    }
}

pub fn filter_by_category(tasks: &[Task], filter: CategoryFilter) -> Vec<Task> {
    tasks.iter().filter(|t| filter.matches(t)).cloned().collect()
}

/// Keeps tasks whose normalized timestamp falls on `date`. Tasks without a
/// usable timestamp never match.
pub fn filter_by_date(tasks: &[Task], date: NaiveDate) -> Vec<Task> {
    let wanted = datetime::local_date_string(date);
    tasks
        .iter()
        .filter(|t| {
            t.normalized_datetime()
                .as_deref()
                .and_then(datetime::date_part)
                .is_some_and(|day| day == wanted)
        })
        .cloned()
        .collect()
}

/// Case-insensitive title prefix match. A blank term keeps everything.
pub fn filter_by_search(tasks: &[Task], term: &str) -> Vec<Task> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return tasks.to_vec();
    }
    tasks
        .iter()
        .filter(|t| t.title.to_lowercase().starts_with(&term))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(title: &str, category: Category, datetime: Option<&str>) -> Task {
        Task {
            id: title.to_lowercase(),
            owner: "me".to_string(),
            title: title.to_string(),
            description: None,
            category,
            datetime: datetime.map(str::to_string),
            completed: false,
            starred: false,
            original_index: 0,
        }
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn test_category_filter_is_exact() {
        let tasks = vec![
            task("Report", Category::Work, None),
            task("Gym", Category::Personal, None),
        ];
        assert_eq!(
            titles(&filter_by_category(&tasks, CategoryFilter::Only(Category::Work))),
            vec!["Report"]
        );
        assert_eq!(titles(&filter_by_category(&tasks, CategoryFilter::All)), vec!["Report", "Gym"]);
        assert!(filter_by_category(&tasks, CategoryFilter::Only(Category::Special)).is_empty());
    }

    #[test]
    fn test_category_filter_parsing() {
        assert_eq!("all".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!("ALL".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            "wishlist".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Only(Category::Wishlist)
        );
        assert!("everything".parse::<CategoryFilter>().is_err());
        assert_eq!(CategoryFilter::Only(Category::Work).to_string(), "work");
    }

    #[test]
    fn test_search_is_prefix_not_substring() {
        let tasks = vec![
            task("Buy milk", Category::Personal, None),
            task("Really buy bread", Category::Personal, None),
        ];
        assert_eq!(titles(&filter_by_search(&tasks, "buy")), vec!["Buy milk"]);
        assert_eq!(titles(&filter_by_search(&tasks, "  BUY ")), vec!["Buy milk"]);
        assert_eq!(filter_by_search(&tasks, "   ").len(), 2);
        assert!(filter_by_search(&tasks, "bread").is_empty());
    }

    #[test]
    fn test_date_filter_excludes_undated() {
        let tasks = vec![
            task("Morning", Category::Work, Some("2024-03-05T09:30")),
            task("Next day", Category::Work, Some("2024-03-06T00:00")),
            task("Undated", Category::Work, None),
            task("Broken", Category::Work, Some("whenever")),
            task("Legacy", Category::Work, Some("2024-03-05 18:00:00")),
        ];
        let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(titles(&filter_by_date(&tasks, day)), vec!["Morning", "Legacy"]);
    }

    #[test]
    fn test_stages_accept_empty_input() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert!(filter_by_category(&[], CategoryFilter::All).is_empty());
        assert!(filter_by_date(&[], day).is_empty());
        assert!(filter_by_search(&[], "x").is_empty());
    }
}
