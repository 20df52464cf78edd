use std::path::Path;

use anyhow::{Context, Result, bail};
use taskflow_app::{ListPatch, NewList, NewTask, TaskFilterBuilder, TaskPatch, Workspace};
use taskflow_core::{Calendar, Priority, TaskFilter};
use taskflow_store::KeyValueStore;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::{Command, FilterArgs, ListsCommand, OutputFormat, TaskCommand, ViewCommand};

mod render;

/// Execute a parsed command against the workspace.
pub async fn run<B: KeyValueStore>(command: Command, ws: &Workspace<B>, data_dir: &Path) -> Result<()> {
    match command {
        Command::Init => {
            let seeded = ws.seeded();
            if seeded.is_empty() {
                println!("already initialized: {}", data_dir.display());
            } else {
                println!(
                    "initialized {} (tasks: {}, lists: {}, settings: {})",
                    data_dir.display(),
                    seeded.tasks,
                    seeded.lists,
                    seeded.settings
                );
            }
        }
        Command::Lists { cmd } => run_lists(cmd, ws).await?,
        Command::Task { cmd } => run_task(cmd, ws).await?,
        Command::View {
            view,
            filters,
            format,
        } => run_view(view, filters, format, ws).await?,
    }
    Ok(())
}

async fn run_lists<B: KeyValueStore>(command: ListsCommand, ws: &Workspace<B>) -> Result<()> {
    let lists = ws.lists();
    match command {
        ListsCommand::Ls { format } => {
            let all = lists.get_all().await;
            let counts = ws.counts().await;
            match format {
                OutputFormat::Table => render::list_table(&all, &counts),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&all)?),
            }
        }
        ListsCommand::Add { name, color } => {
            let name = required_text("list name", &name)?;
            let mut input = NewList::new(name);
            input.color = color;
            let list = lists.create(input).await;
            println!("created list: {} ({})", list.id, list.name);
        }
        ListsCommand::Edit { id, name, color } => {
            let name = name.map(|raw| required_text("list name", &raw)).transpose()?;
            let patch = ListPatch {
                name,
                color,
                order: None,
            };
            if patch.is_empty() {
                bail!("nothing to change; pass --name or --color");
            }
            let list = lists.update(id, patch).await?;
            println!("updated list: {} ({})", list.id, list.name);
        }
        ListsCommand::Rm { id } => {
            let list = lists.delete(id).await?;
            println!("deleted list: {} ({})", list.id, list.name);
        }
        ListsCommand::Reorder { ids } => {
            let ordered = lists.reorder(&ids).await;
            for list in ordered {
                println!("{}. {} ({})", list.order, list.name, list.id);
            }
        }
    }
    Ok(())
}

async fn run_task<B: KeyValueStore>(command: TaskCommand, ws: &Workspace<B>) -> Result<()> {
    let tasks = ws.tasks();
    match command {
        TaskCommand::Add {
            title,
            list,
            description,
            priority,
            due,
        } => {
            let title = required_text("title", &title)?;
            let list_id = list.unwrap_or_else(|| ws.settings().default_list_id);
            ws.lists()
                .get_by_id(list_id)
                .await
                .with_context(|| format!("cannot add a task to list {list_id}"))?;

            let mut input = NewTask::new(title, list_id);
            input.description = description.unwrap_or_default();
            input.priority = parse_priority(priority.as_deref())?.unwrap_or_default();
            input.due_date = due.as_deref().map(|raw| parse_due(raw, &ws.calendar())).transpose()?;
            let task = tasks.create(input).await;
            println!("created task: {} ({})", task.id, task.title);
        }
        TaskCommand::Edit {
            id,
            title,
            description,
            priority,
            due,
            clear_due,
            list,
        } => {
            let title = title.map(|raw| required_text("title", &raw)).transpose()?;
            let due_date = if clear_due {
                Some(None)
            } else {
                due.as_deref()
                    .map(|raw| parse_due(raw, &ws.calendar()).map(Some))
                    .transpose()?
            };
            let patch = TaskPatch {
                title,
                description,
                priority: parse_priority(priority.as_deref())?,
                due_date,
                list_id: list,
                ..TaskPatch::default()
            };
            if patch.is_empty() {
                bail!("nothing to change; pass at least one field to edit");
            }
            let task = tasks.update(id, patch).await?;
            println!("updated task: {} ({})", task.id, task.title);
        }
        TaskCommand::Done { id } => {
            let task = tasks.mark_complete(id).await?;
            println!("completed task: {} ({})", task.id, task.title);
        }
        TaskCommand::Undo { id } => {
            let task = tasks.mark_incomplete(id).await?;
            println!("reopened task: {} ({})", task.id, task.title);
        }
        TaskCommand::Toggle { id } => {
            let task = tasks.toggle_complete(id).await?;
            let verb = if task.completed { "completed" } else { "reopened" };
            println!("{verb} task: {} ({})", task.id, task.title);
        }
        TaskCommand::Rm { id } => {
            let task = tasks.delete(id).await?;
            println!("deleted task: {} ({})", task.id, task.title);
        }
        TaskCommand::Show { id } => {
            let task = tasks.get_by_id(id).await?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
    }
    Ok(())
}

async fn run_view<B: KeyValueStore>(
    view: ViewCommand,
    filters: FilterArgs,
    format: OutputFormat,
    ws: &Workspace<B>,
) -> Result<()> {
    let filter = build_filter(filters, ws.shows_completed())?;
    let calendar = ws.calendar();
    match view {
        ViewCommand::All => {
            let rows = ws.all_view(&filter).await;
            match format {
                OutputFormat::Table => render::row_table(&rows, &calendar, filter.is_empty()),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
            }
        }
        ViewCommand::Today => {
            let today = ws.today_view(&filter).await;
            match format {
                OutputFormat::Table => render::today(&today, &calendar),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&today)?),
            }
        }
        ViewCommand::Upcoming => {
            let buckets = ws.upcoming_view(&filter).await;
            match format {
                OutputFormat::Table => render::upcoming(&buckets, &calendar),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&buckets)?),
            }
        }
        ViewCommand::List { id } => {
            let view = ws.list_view(id, &filter).await?;
            match format {
                OutputFormat::Table => render::list_view(&view, &calendar),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
            }
        }
    }
    Ok(())
}

fn build_filter(args: FilterArgs, default_show_completed: bool) -> Result<TaskFilter> {
    let FilterArgs {
        search,
        priority,
        list,
        due,
        show_completed,
    } = args;
    Ok(TaskFilterBuilder::new()
        .with_text(search)
        .with_show_completed(show_completed || default_show_completed)
        .with_priority(priority.as_deref())?
        .with_list(list.as_deref())?
        .with_due(due.as_deref())?
        .build())
}

fn required_text(field: &str, raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("{field} must not be empty");
    }
    Ok(trimmed.to_owned())
}

fn parse_priority(raw: Option<&str>) -> Result<Option<Priority>> {
    raw.map(|token| token.parse::<Priority>().map_err(anyhow::Error::from))
        .transpose()
}

/// Accept an RFC 3339 timestamp, or a bare date meaning its start in the calendar's offset.
fn parse_due(raw: &str, calendar: &Calendar) -> Result<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(ts);
    }
    let date = Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .with_context(|| format!("invalid due date {raw:?}; expected YYYY-MM-DD or RFC 3339"))?;
    Ok(date.midnight().assume_offset(calendar.offset()))
}
