use chrono::NaiveDate;
use rusty_tasks::models::{Category, Task};
use rusty_tasks::view::{
    annotate_original_index, derive, order, CategoryFilter, Screen, SortMode, ViewSelection,
};

fn task(title: &str, category: Category, datetime: Option<&str>, completed: bool, starred: bool) -> Task {
    Task {
        id: title.to_lowercase().replace(' ', "-"),
        owner: "me@example.com".to_string(),
        title: title.to_string(),
        description: None,
        category,
        datetime: datetime.map(str::to_string),
        completed,
        starred,
        original_index: 0,
    }
}

fn titles(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|t| t.title.as_str()).collect()
}

fn week_of_tasks() -> Vec<Task> {
    annotate_original_index(vec![
        task("Zeta", Category::Work, Some("2024-01-01T10:00"), false, false),
        task("Alpha", Category::Work, Some("2024-02-01T10:00"), true, true),
        task("Buy milk", Category::Personal, Some("2024-03-05T08:00"), false, false),
        task("Really buy bread", Category::Personal, Some("2024-03-05 18:15"), false, true),
        task("Birthday cake", Category::Birthdays, Some("2024-03-06"), true, false),
        task("Someday", Category::Wishlist, None, false, false),
    ])
}

#[test]
fn test_work_list_sorted_a_to_z_pins_starred() {
    let tasks = week_of_tasks();
    let selection = ViewSelection {
        category: CategoryFilter::Only(Category::Work),
        sort_mode: Some(SortMode::AToZ),
        ..Default::default()
    };
    assert_eq!(titles(&derive(&tasks[..2], &selection, Screen::Category)), vec!["Alpha", "Zeta"]);
    assert_eq!(titles(&derive(&tasks, &selection, Screen::Category)), vec!["Alpha", "Zeta"]);
}

#[test]
fn test_home_list_newest_first_with_pins() {
    let tasks = week_of_tasks();
    let selection = ViewSelection {
        sort_mode: Some(SortMode::Newest),
        ..Default::default()
    };
    assert_eq!(
        titles(&derive(&tasks, &selection, Screen::Category)),
        vec!["Really buy bread", "Alpha", "Birthday cake", "Buy milk", "Zeta", "Someday"]
    );
}

#[test]
fn test_home_list_without_sort_keeps_fetch_order_under_pins() {
    let tasks = week_of_tasks();
    assert_eq!(
        titles(&derive(&tasks, &ViewSelection::default(), Screen::Category)),
        vec!["Alpha", "Really buy bread", "Zeta", "Buy milk", "Birthday cake", "Someday"]
    );
}

#[test]
fn test_search_is_prefix_only_across_screens() {
    let tasks = week_of_tasks();
    let selection = ViewSelection {
        search_term: "  BUY ".to_string(),
        ..Default::default()
    };
    assert_eq!(titles(&derive(&tasks, &selection, Screen::Category)), vec!["Buy milk"]);
    assert!(derive(&tasks, &selection, Screen::Starred).is_empty());
}

#[test]
fn test_calendar_day_has_no_pinning() {
    let tasks = week_of_tasks();
    let selection = ViewSelection {
        selected_date: NaiveDate::from_ymd_opt(2024, 3, 5),
        sort_mode: Some(SortMode::Oldest),
        ..Default::default()
    };
    assert_eq!(
        titles(&derive(&tasks, &selection, Screen::Calendar)),
        vec!["Buy milk", "Really buy bread"]
    );
}

#[test]
fn test_starred_screen_lists_only_starred() {
    let tasks = week_of_tasks();
    let selection = ViewSelection {
        sort_mode: Some(SortMode::ZToA),
        ..Default::default()
    };
    assert_eq!(
        titles(&derive(&tasks, &selection, Screen::Starred)),
        vec!["Really buy bread", "Alpha"]
    );
}

#[test]
fn test_completed_first_is_stable() {
    let tasks = annotate_original_index(vec![
        task("A", Category::Work, None, false, false),
        task("B", Category::Work, None, true, false),
        task("C", Category::Work, None, false, false),
        task("D", Category::Work, None, true, false),
    ]);
    assert_eq!(titles(&order(&tasks, Some(SortMode::CompletedFirst))), vec!["B", "D", "A", "C"]);
    assert_eq!(titles(&order(&tasks, Some(SortMode::UncompletedFirst))), vec!["A", "C", "B", "D"]);
}

#[test]
fn test_selection_is_serializable() {
    let selection = ViewSelection {
        category: CategoryFilter::Only(Category::Birthdays),
        search_term: "birth".to_string(),
        sort_mode: Some(SortMode::AToZ),
        selected_date: NaiveDate::from_ymd_opt(2024, 3, 6),
    };
    let json = serde_json::to_string(&selection).unwrap();
    let replayed: ViewSelection = serde_json::from_str(&json).unwrap();
    assert_eq!(replayed, selection);

    let tasks = week_of_tasks();
    assert_eq!(titles(&derive(&tasks, &replayed, Screen::Category)), vec!["Birthday cake"]);
}

#[test]
fn test_empty_input_yields_empty_lists() {
    let selection = ViewSelection {
        sort_mode: Some(SortMode::Newest),
        ..Default::default()
    };
    for screen in [Screen::Category, Screen::Starred, Screen::Calendar] {
        assert!(derive(&[], &selection, screen).is_empty());
    }
}
