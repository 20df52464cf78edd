//! CLI entry point for taskflow.

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};
use taskflow_app::{AppConfig, Workspace};
use taskflow_core::{ListId, TaskId};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod commands;

/// Personal task lists stored as JSON records.
#[derive(Parser, Debug)]
#[command(
    name = "taskflow",
    version,
    about = "taskflow: personal tasks grouped into colored lists"
)]
struct Cli {
    /// Directory holding the records (defaults to the platform data directory).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Configuration file (defaults to `config.toml` inside the data directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Seed the default lists and settings.
    Init,

    /// Manage lists.
    Lists {
        #[command(subcommand)]
        cmd: ListsCommand,
    },

    /// Manage tasks.
    Task {
        #[command(subcommand)]
        cmd: TaskCommand,
    },

    /// Show tasks through one of the views.
    View {
        #[command(subcommand)]
        view: ViewCommand,
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
        format: OutputFormat,
    },
}

#[derive(Subcommand, Debug)]
enum ListsCommand {
    /// Show every list with its open-task count.
    Ls {
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Create a list.
    Add {
        name: String,
        #[arg(long)]
        color: Option<String>,
    },
    /// Rename or recolor a list.
    Edit {
        id: ListId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a list. Its tasks are kept.
    Rm { id: ListId },
    /// Set the display order; unnamed lists keep their position.
    Reorder {
        #[arg(required = true)]
        ids: Vec<ListId>,
    },
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
    /// Create a task.
    Add {
        title: String,
        /// Owning list (defaults to the configured default list).
        #[arg(short = 'l', long)]
        list: Option<ListId>,
        #[arg(long)]
        description: Option<String>,
        /// `high`, `medium`, `low` or `none`.
        #[arg(short = 'p', long)]
        priority: Option<String>,
        /// `YYYY-MM-DD` or an RFC 3339 timestamp.
        #[arg(long)]
        due: Option<String>,
    },
    /// Change task fields.
    Edit {
        id: TaskId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(short = 'p', long)]
        priority: Option<String>,
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        /// Remove the due date.
        #[arg(long)]
        clear_due: bool,
        #[arg(short = 'l', long)]
        list: Option<ListId>,
    },
    /// Mark a task completed.
    Done { id: TaskId },
    /// Reopen a completed task.
    Undo { id: TaskId },
    /// Flip a task's completion.
    Toggle { id: TaskId },
    /// Delete a task.
    Rm { id: TaskId },
    /// Print a task as JSON.
    Show { id: TaskId },
}

#[derive(Subcommand, Debug, Clone)]
enum ViewCommand {
    /// Every task.
    All,
    /// Due today plus open overdue tasks.
    Today,
    /// Tasks grouped by due date.
    Upcoming,
    /// Tasks of one list.
    List { id: ListId },
}

/// Filters shared by the views. Empty values impose no constraint.
#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Case-insensitive text in title or description.
    #[arg(short = 's', long, global = true)]
    search: Option<String>,
    /// `high`, `medium`, `low` or `none`.
    #[arg(short = 'p', long, global = true)]
    priority: Option<String>,
    /// List id.
    #[arg(short = 'l', long, global = true)]
    list: Option<String>,
    /// `overdue`, `today`, `tomorrow` or `week`.
    #[arg(long, global = true)]
    due: Option<String>,
    /// Include completed tasks.
    #[arg(long, global = true)]
    show_completed: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

fn main() -> Result<()> {
    let Cli {
        data_dir,
        config,
        cmd,
    } = Cli::parse();

    install_tracing();

    let data_dir = resolve_data_dir(data_dir)?;
    tracing::debug!(data_dir = %data_dir.display(), "Using data directory");
    let config = match config {
        Some(path) => AppConfig::from_path(path)?,
        None => AppConfig::from_data_dir(&data_dir)?,
    };
    let workspace = Workspace::open(&data_dir, &config);
    tokio::runtime::Runtime::new()?.block_on(commands::run(cmd, &workspace, &data_dir))
}

fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    explicit
        .or_else(|| dirs::data_dir().map(|dir| dir.join("taskflow")))
        .ok_or_else(|| anyhow!("could not determine a data directory; pass --data-dir"))
}

fn install_tracing() {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives.as_deref()))
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

/// `RUST_LOG` directives replace the filter when set and valid; INFO otherwise. Logs go to stderr.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|raw| !raw.trim().is_empty())
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
