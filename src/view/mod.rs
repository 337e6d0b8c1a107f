//! The task-list derivation every list screen goes through: filter stages,
//! sort modes and starred pinning over one fetched snapshot.

pub mod derivation;
pub mod filter;
pub mod ordering;

pub use derivation::{annotate_original_index, derive, partition_starred, Screen, ViewSelection};
pub use filter::{filter_by_category, filter_by_date, filter_by_search, CategoryFilter};
pub use ordering::{compare_titles, order, SortMode};
