//! Executes parsed CLI commands against the configured store.

use crate::auth::{AuthError, AuthProvider, ConfigAuth, Identity};
use crate::cli::{AuthCommand, Command, ConfigCommand, PrivateCommand, TemplateCommand, ViewArgs};
use crate::config::{ConfigError, ConfigManager};
use crate::datetime;
use crate::export::{self, ExportFormat};
use crate::models::{Category, NewTask, StorageError, Task, TaskError, TaskPatch};
use crate::private::{PrivateVault, VaultError};
use crate::stats::ActivityHistogram;
use crate::storage::Storage;
use crate::task_manager::{ManagerError, TaskManager};
use crate::templates;
use crate::view::{CategoryFilter, Screen, SortMode, ViewSelection};
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Manager(#[from] ManagerError),
    #[error(transparent)]
    Vault(#[from] VaultError),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    InvalidArgument(String),
}

pub fn run(config_path: Option<&std::path::Path>, command: Command) -> Result<(), CliError> {
    let mut config = ConfigManager::new(config_path)?;
    match command {
        Command::Auth(cmd) => run_auth(cmd, &mut config),
        Command::Config(cmd) => run_config(cmd, &mut config),
        Command::Normalize { value } => {
            let canonical = datetime::normalize(Some(&value))
                .ok_or_else(|| TaskError::InvalidDateTime(value.clone()))?;
            println!("{canonical}");
            Ok(())
        }
        Command::Template(TemplateCommand::List { category }) => list_templates(category.as_deref()),
        other => {
            let identity = ConfigAuth::new(&mut config).require_identity()?;
            let storage = config.create_storage()?;
            run_tasks(other, &config, storage.as_ref(), &identity)
        }
    }
}

fn run_auth(command: AuthCommand, config: &mut ConfigManager) -> Result<(), CliError> {
    let mut auth = ConfigAuth::new(config);
    match command {
        AuthCommand::Login { owner } => {
            let identity = auth.sign_in(&owner)?;
            println!("Signed in as {}", identity.owner_id);
        }
        AuthCommand::Logout => {
            auth.sign_out()?;
            println!("Signed out");
        }
        AuthCommand::Whoami => {
            let identity = auth.require_identity()?;
            println!("{}", identity.owner_id);
        }
    }
    Ok(())
}

fn run_config(command: ConfigCommand, config: &mut ConfigManager) -> Result<(), CliError> {
    match command {
        ConfigCommand::Get { key } => match config.get(&key) {
            Some(value) => println!("{value}"),
            None if crate::config::KEYS.contains(&key.as_str()) => println!("(not set)"),
            None => return Err(ConfigError::InvalidKey(key).into()),
        },
        ConfigCommand::Set { key, value } => {
            config.set(&key, &value)?;
            println!("{key} = {}", config.get(&key).unwrap_or(value));
        }
        ConfigCommand::Unset { key } => {
            config.unset(&key)?;
            println!("Unset {key}");
        }
        ConfigCommand::List => {
            for (key, value, is_default) in config.list() {
                if is_default {
                    println!("{key} = {value} (default)");
                } else {
                    println!("{key} = {value}");
                }
            }
        }
    }
    Ok(())
}

fn list_templates(category: Option<&str>) -> Result<(), CliError> {
    let categories = match category {
        Some(raw) => vec![raw.parse::<Category>()?],
        None => Category::ALL.to_vec(),
    };
    for category in categories {
        println!("{} ({category})", category.display_name());
        for (index, title) in templates::templates_for(category).iter().enumerate() {
            println!("  {:>2}. {title}", index + 1);
        }
    }
    Ok(())
}

fn run_tasks(
    command: Command,
    config: &ConfigManager,
    storage: &dyn Storage,
    identity: &Identity,
) -> Result<(), CliError> {
    let manager = TaskManager::new(storage, identity);
    match command {
        Command::Add {
            title,
            category,
            description,
            datetime,
            date,
            time,
        } => {
            let category = match category {
                Some(raw) => raw.parse()?,
                None => config.default_category(),
            };
            let mut task = NewTask::new(&title, category)?.with_description(description);
            if let Some(raw) = datetime {
                task = task.with_datetime(&raw)?;
            } else if let (Some(date), Some(time)) = (date, time) {
                let day = parse_date(&date)?;
                let combined = datetime::combine_date_and_time(day, &time)
                    .ok_or_else(|| TaskError::InvalidDateTime(format!("{date} {time}")))?;
                task = task.with_datetime(&datetime::format_canonical(&combined))?;
            }
            let task = manager.add(task)?;
            println!("Added task {}: {}", short_id(&task.id), task.title);
        }
        Command::List(view) => {
            let selection = selection(&view, config, None)?;
            print_tasks(&manager.view(&selection, Screen::Category)?, view.json)?;
        }
        Command::Starred(view) => {
            let selection = selection(&view, config, None)?;
            print_tasks(&manager.view(&selection, Screen::Starred)?, view.json)?;
        }
        Command::Calendar { date, view } => {
            let day = match date {
                Some(raw) => parse_date(&raw)?,
                None => datetime::today(),
            };
            let selection = selection(&view, config, Some(day))?;
            let tasks = manager.view(&selection, Screen::Calendar)?;
            if !view.json {
                println!("{}", day.format("%A, %B %-d, %Y"));
            }
            print_tasks(&tasks, view.json)?;
        }
        Command::Show { id } => {
            let task = manager.get(&id)?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        Command::Done { id } => report("Completed", &manager.set_completed(&id, true)?),
        Command::Undone { id } => report("Reopened", &manager.set_completed(&id, false)?),
        Command::Toggle { id } => {
            let task = manager.toggle_completed(&id)?;
            report(if task.completed { "Completed" } else { "Reopened" }, &task);
        }
        Command::Star { id } => report("Starred", &manager.set_starred(&id, true)?),
        Command::Unstar { id } => report("Unstarred", &manager.set_starred(&id, false)?),
        Command::Edit {
            id,
            title,
            description,
            clear_description,
            category,
            datetime,
            clear_date,
        } => {
            let patch = TaskPatch {
                title,
                description: if clear_description {
                    Some(None)
                } else {
                    description.map(Some)
                },
                category: category.map(|raw| raw.parse()).transpose()?,
                datetime: if clear_date { Some(None) } else { datetime.map(Some) },
                ..Default::default()
            };
            report("Updated", &manager.edit(&id, &patch)?);
        }
        Command::Delete { id } => report("Deleted", &manager.delete(&id)?),
        Command::Stats { json } => {
            let stats = manager.stats()?;
            let activity = manager.activity(datetime::today())?;
            if json {
                let out = serde_json::json!({ "stats": stats, "activity": activity });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!(
                    "Total: {}  Completed: {}  Pending: {}  Starred: {}",
                    stats.total, stats.completed, stats.pending, stats.starred
                );
                println!("Completion: {:.1}%", stats.completion_rate());
                println!("By category:");
                for count in &stats.by_category {
                    println!("  {:<18} {}", count.category.display_name(), count.count);
                }
                print_activity(&activity);
            }
        }
        Command::Export { format, view } => {
            let format: ExportFormat = format.parse().map_err(CliError::InvalidArgument)?;
            let selection = selection(&view, config, None)?;
            let tasks = manager.view(&selection, Screen::Category)?;
            println!("{}", export::export(&tasks, format, datetime::today())?);
        }
        Command::Template(TemplateCommand::Add { category, number }) => {
            let task = manager.add_from_template(category.parse()?, number)?;
            println!("Added task {}: {} ({})", short_id(&task.id), task.title, task.category);
        }
        Command::Private(cmd) => run_private(cmd, storage, identity)?,
        other @ (Command::Auth(_)
        | Command::Config(_)
        | Command::Normalize { .. }
        | Command::Template(TemplateCommand::List { .. })) => {
            return Err(CliError::InvalidArgument(format!(
                "{other:?} does not need the task store"
            )));
        }
    }
    Ok(())
}

fn run_private(
    command: PrivateCommand,
    storage: &dyn Storage,
    identity: &Identity,
) -> Result<(), CliError> {
    let vault = PrivateVault::new(storage, &identity.owner_id);
    match command {
        PrivateCommand::SetPin { pin } => {
            vault.set_pin(&pin)?;
            println!("PIN set");
        }
        PrivateCommand::List { pin, json } => {
            print_tasks(&vault.unlock(&pin)?.list()?, json)?;
        }
        PrivateCommand::Add {
            title,
            datetime,
            description,
            pin,
        } => {
            let task = vault.unlock(&pin)?.create(&title, description, &datetime)?;
            println!("Added private task {}: {}", short_id(&task.id), task.title);
        }
        PrivateCommand::Toggle { id, pin } => {
            let task = vault.unlock(&pin)?.toggle_complete(&id)?;
            report(if task.completed { "Completed" } else { "Reopened" }, &task);
        }
        PrivateCommand::Delete { id, pin } => {
            report("Deleted", &vault.unlock(&pin)?.delete(&id)?);
        }
    }
    Ok(())
}

/// Builds the view selection from flags, falling back to the configured sort.
fn selection(
    view: &ViewArgs,
    config: &ConfigManager,
    selected_date: Option<NaiveDate>,
) -> Result<ViewSelection, CliError> {
    let category = match view.category.as_deref() {
        Some(raw) => raw.parse::<CategoryFilter>()?,
        None => CategoryFilter::All,
    };
    let sort_mode = match view.sort.as_deref() {
        Some(label) => {
            let mode = SortMode::from_label(label);
            if mode.is_none() {
                tracing::warn!(label, "unknown sort mode, keeping stored order");
            }
            mode
        }
        None => config.default_sort(),
    };
    Ok(ViewSelection {
        category,
        search_term: view.search.clone().unwrap_or_default(),
        sort_mode,
        selected_date,
    })
}

fn parse_date(raw: &str) -> Result<NaiveDate, CliError> {
    datetime::normalize(Some(raw))
        .as_deref()
        .and_then(datetime::parse_canonical)
        .map(|ts| ts.date())
        .ok_or_else(|| TaskError::InvalidDateTime(raw.to_string()).into())
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn report(action: &str, task: &Task) {
    println!("{action} {}: {}", short_id(&task.id), task.title);
}

fn print_tasks(tasks: &[Task], json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(tasks)?);
        return Ok(());
    }
    if tasks.is_empty() {
        println!("No tasks found");
        return Ok(());
    }
    for task in tasks {
        let check = if task.completed { "[x]" } else { "[ ]" };
        let star = if task.starred { "*" } else { " " };
        let when = task.normalized_datetime().unwrap_or_else(|| "-".to_string());
        println!(
            "{} {check} {star} {:<16} {:<10} {}",
            short_id(&task.id),
            when,
            task.category,
            task.title
        );
        if let Some(description) = &task.description {
            println!("{:>14}{description}", "");
        }
    }
    Ok(())
}

fn print_activity(activity: &ActivityHistogram) {
    match &activity.date_range {
        Some(range) => println!("Activity ({range}):"),
        None => {
            println!("Activity: no dated tasks");
            return;
        }
    }
    for bucket in &activity.buckets {
        println!(
            "  {:<12} done {:>3}  open {:>3}",
            bucket.label, bucket.completed, bucket.incomplete
        );
    }
}
