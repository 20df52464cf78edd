use taskflow_app::{BucketRows, ListView, TaskRow, TodayView};
use taskflow_core::{Calendar, DueStatus, List, Progress, Task, TaskCounts};

pub(super) fn list_table(lists: &[List], counts: &TaskCounts) {
    if lists.is_empty() {
        println!("No lists found");
        return;
    }
    println!("ID | Order | Name | Color | Open");
    println!("-- | ----- | ---- | ----- | ----");
    for list in lists {
        println!(
            "{} | {} | {} | {} | {}",
            list.id,
            list.order,
            list.name,
            list.color,
            counts.for_list(list.id)
        );
    }
    println!();
    println!(
        "open: {} | due today: {} | upcoming: {}",
        counts.all, counts.today, counts.upcoming
    );
}

pub(super) fn row_table(rows: &[TaskRow], calendar: &Calendar, filter_empty: bool) {
    if rows.is_empty() {
        if filter_empty {
            println!("No tasks found");
        } else {
            println!("No tasks matched the provided filters");
        }
        return;
    }
    print_header();
    for row in rows {
        print_task(&row.task, &row.list_name, calendar);
    }
}

pub(super) fn today(view: &TodayView, calendar: &Calendar) {
    if view.overdue.is_empty() && view.today.is_empty() {
        println!("Nothing due today");
        return;
    }
    for (label, rows) in [("Overdue", &view.overdue), ("Today", &view.today)] {
        if rows.is_empty() {
            continue;
        }
        println!("{label} ({})", rows.len());
        print_header();
        for row in rows {
            print_task(&row.task, &row.list_name, calendar);
        }
        println!();
    }
    print_progress(view.progress);
}

pub(super) fn upcoming(buckets: &[BucketRows], calendar: &Calendar) {
    if buckets.is_empty() {
        println!("No tasks found");
        return;
    }
    for group in buckets {
        println!("{} ({})", group.bucket.label(), group.rows.len());
        print_header();
        for row in &group.rows {
            print_task(&row.task, &row.list_name, calendar);
        }
        println!();
    }
}

pub(super) fn list_view(view: &ListView, calendar: &Calendar) {
    let total = view.progress.total;
    let noun = if total == 1 { "task" } else { "tasks" };
    println!(
        "{} ({total} {noun}, {} completed)",
        view.list.name, view.progress.completed
    );
    if view.tasks.is_empty() {
        println!("No tasks in this list");
        return;
    }
    print_header();
    for task in &view.tasks {
        print_task(task, &view.list.name, calendar);
    }
    println!();
    print_progress(view.progress);
}

fn print_header() {
    println!("ID | Done | Title | Priority | Due | List");
    println!("-- | ---- | ----- | -------- | --- | ----");
}

fn print_task(task: &Task, list_name: &str, calendar: &Calendar) {
    let done = if task.completed { "x" } else { " " };
    let priority = if task.priority.is_unset() {
        "-"
    } else {
        task.priority.as_str()
    };
    let due = match calendar.due_status(task.due_date) {
        DueStatus::None => "-".to_owned(),
        DueStatus::Overdue if !task.completed => {
            format!("{} (overdue)", calendar.due_label(task.due_date))
        }
        _ => calendar.due_label(task.due_date),
    };
    println!(
        "{} | {done} | {} | {priority} | {due} | {list_name}",
        task.id, task.title
    );
}

fn print_progress(progress: Progress) {
    println!(
        "Progress: {}% ({}/{})",
        progress.percent(),
        progress.completed,
        progress.total
    );
}
