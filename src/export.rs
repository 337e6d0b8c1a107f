//! Sharing and exporting a derived task list.

use crate::models::{Category, Task};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::{self, Write as _};
use std::str::FromStr;

pub const REPORT_TITLE: &str = "Task Summary";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// One bullet per title, for pasting into a message.
    Share,
    #[default]
    Report,
    Json,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "share" | "text" => Ok(ExportFormat::Share),
            "report" | "summary" => Ok(ExportFormat::Report),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!(
                "unknown export format '{other}' (expected share, report or json)"
            )),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Share => "share",
            ExportFormat::Report => "report",
            ExportFormat::Json => "json",
        })
    }
}

pub fn share_text(tasks: &[Task]) -> String {
    tasks
        .iter()
        .map(|t| format!("• {}", t.title))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedTask {
    pub title: String,
    pub completed: bool,
    pub starred: bool,
    pub category: Category,
    pub datetime: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportDocument {
    pub title: String,
    pub generated_on: NaiveDate,
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub tasks: Vec<ExportedTask>,
}

impl ExportDocument {
    pub fn new(tasks: &[Task], generated_on: NaiveDate) -> Self {
        let completed = tasks.iter().filter(|t| t.completed).count();
        Self {
            title: REPORT_TITLE.to_string(),
            generated_on,
            total: tasks.len(),
            completed,
            pending: tasks.len() - completed,
            tasks: tasks
                .iter()
                .map(|t| ExportedTask {
                    title: t.title.clone(),
                    completed: t.completed,
                    starred: t.starred,
                    category: t.category,
                    datetime: t.normalized_datetime(),
                    description: t.description.clone(),
                })
                .collect(),
        }
    }

    /// Plain-text summary with a header, the counts and one entry per task.
    pub fn render_report(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{}", self.title);
        let _ = writeln!(out, "Generated on {}", self.generated_on.format("%B %-d, %Y"));
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Total Tasks: {} | Completed: {} | Pending: {}",
            self.total, self.completed, self.pending
        );
        let _ = writeln!(out);

        if self.tasks.is_empty() {
            let _ = writeln!(out, "No tasks found");
        }
        for task in &self.tasks {
            let checkbox = if task.completed { "[x]" } else { "[ ]" };
            let date = task
                .datetime
                .as_deref()
                .and_then(crate::datetime::parse_canonical)
                .map(|ts| format!("  ({})", ts.format("%-m/%-d/%Y")))
                .unwrap_or_default();
            let _ = writeln!(out, "{checkbox} {}{date}", task.title);
            if let Some(description) = &task.description {
                let _ = writeln!(out, "    {description}");
            }
        }

        let _ = writeln!(out);
        let _ = write!(out, "Generated with rusty_tasks");
        out
    }
}

pub fn render_report(tasks: &[Task], generated_on: NaiveDate) -> String {
    ExportDocument::new(tasks, generated_on).render_report()
}

pub fn export(
    tasks: &[Task],
    format: ExportFormat,
    generated_on: NaiveDate,
) -> Result<String, serde_json::Error> {
    match format {
        ExportFormat::Share => Ok(share_text(tasks)),
        ExportFormat::Report => Ok(render_report(tasks, generated_on)),
        ExportFormat::Json => serde_json::to_string_pretty(&ExportDocument::new(tasks, generated_on)),
    }
}
