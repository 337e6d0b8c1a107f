use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Categorised to-do lists with starred, calendar and private views.
#[derive(Parser, Debug)]
#[command(name = "rusty_tasks", version, about)]
pub struct Cli {
    /// Config file (defaults to $RTASKS_CONFIG, then ~/.config/rtasks/config.json).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Selection shared by the list screens.
#[derive(Args, Debug, Clone, Default)]
pub struct ViewArgs {
    /// Category to show, or "all".
    #[arg(short, long)]
    pub category: Option<String>,

    /// Only titles starting with this text (case-insensitive).
    #[arg(short, long)]
    pub search: Option<String>,

    /// Newest, Oldest, "A to Z", "Z to A", "Completed First" or "Uncompleted First".
    #[arg(long)]
    pub sort: Option<String>,

    /// Print the list as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a task.
    Add {
        title: String,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// Date and time in any common format (defaults to now).
        #[arg(long = "at", conflicts_with_all = ["date", "time"])]
        datetime: Option<String>,
        /// Calendar date, YYYY-MM-DD.
        #[arg(long, requires = "time")]
        date: Option<String>,
        /// Time of day, HH:MM.
        #[arg(long, requires = "date")]
        time: Option<String>,
    },

    /// List tasks, starred first.
    List(ViewArgs),

    /// List starred tasks only.
    Starred(ViewArgs),

    /// List the tasks of one day.
    Calendar {
        /// Day to show (defaults to today).
        date: Option<String>,
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Show one task.
    Show { id: String },

    /// Mark a task as completed.
    Done { id: String },

    /// Mark a task as not completed.
    Undone { id: String },

    /// Flip a task's completed state.
    Toggle { id: String },

    /// Star a task so it is listed first.
    Star { id: String },

    /// Remove a task's star.
    Unstar { id: String },

    /// Change a task's fields.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,
        #[arg(long)]
        clear_description: bool,
        #[arg(long)]
        category: Option<String>,
        #[arg(long = "at", conflicts_with = "clear_date")]
        datetime: Option<String>,
        #[arg(long)]
        clear_date: bool,
    },

    /// Delete a task.
    Delete { id: String },

    /// Show completion, category and activity statistics.
    Stats {
        #[arg(long)]
        json: bool,
    },

    /// Share or export the listed tasks.
    Export {
        /// share, report or json.
        #[arg(short, long, default_value = "report")]
        format: String,
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Suggested tasks per category.
    #[command(subcommand)]
    Template(TemplateCommand),

    /// PIN-protected private tasks.
    #[command(subcommand)]
    Private(PrivateCommand),

    /// Choose who the tasks belong to.
    #[command(subcommand)]
    Auth(AuthCommand),

    /// Manage configuration values.
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Print the canonical YYYY-MM-DDTHH:MM form of a date/time.
    Normalize { value: String },
}

#[derive(Subcommand, Debug)]
pub enum TemplateCommand {
    /// List templates, optionally for one category.
    List { category: Option<String> },
    /// Add the numbered template of a category as a task.
    Add { category: String, number: usize },
}

#[derive(Subcommand, Debug)]
pub enum PrivateCommand {
    /// Set the 4-digit PIN (only once).
    SetPin { pin: String },
    /// List private tasks.
    List {
        #[arg(long)]
        pin: String,
        #[arg(long)]
        json: bool,
    },
    /// Add a private task; a date and time is required.
    Add {
        title: String,
        #[arg(long = "at")]
        datetime: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        pin: String,
    },
    /// Flip a private task's completed state.
    Toggle {
        id: String,
        #[arg(long)]
        pin: String,
    },
    /// Delete a private task.
    Delete {
        id: String,
        #[arg(long)]
        pin: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Sign in as an owner id (for example an email address).
    Login { owner: String },
    /// Sign out.
    Logout,
    /// Print the signed-in owner.
    Whoami,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print a stored value.
    Get { key: String },
    /// Set a value.
    Set { key: String, value: String },
    /// Remove a stored value.
    Unset { key: String },
    /// Print every value, marking defaults.
    List,
}
