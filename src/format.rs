//! Output formatting utilities for the CLI.

use chrono::{DateTime, Local, Utc};

use crate::store::views::{TaskStats, tasks_by_status};
use crate::types::{Priority, Status, Task};

/// Format a single task as markdown.
pub fn format_task_markdown(task: &Task) -> String {
    let mut md = String::new();

    md.push_str(&format!("## Task: {}\n", task.title));
    md.push_str(&format!("- **id**: `{}`\n", task.id));
    md.push_str(&format!("- **status**: {}\n", task.status.as_str()));
    md.push_str(&format!("- **priority**: {}\n", task.priority.as_str()));

    if let Some(due) = task.due_date {
        md.push_str(&format!("- **due**: {}\n", format_due(due, task.status)));
    }

    if !task.tags.is_empty() {
        let names: Vec<&str> = task.tags.iter().map(|t| t.name.as_str()).collect();
        md.push_str(&format!("- **tags**: {}\n", names.join(", ")));
    }

    if !task.description.is_empty() {
        md.push_str("\n### Description\n");
        md.push_str(&task.description);
        md.push('\n');
    }

    md
}

/// Format a list of tasks as markdown, grouped In Progress / To Do / Done
/// (active work first).
pub fn format_tasks_markdown(tasks: &[&Task]) -> String {
    let mut md = String::new();
    md.push_str(&format!("# Tasks ({})\n\n", tasks.len()));

    let groups = tasks_by_status(tasks);
    for (status, group) in [
        (Status::InProgress, &groups.in_progress),
        (Status::Todo, &groups.todo),
        (Status::Done, &groups.done),
    ] {
        if group.is_empty() {
            continue;
        }
        md.push_str(&format!("## {}\n\n", status.display_name()));
        for task in group {
            md.push_str(&format_task_short(task));
        }
        md.push('\n');
    }

    md
}

/// Format a task in short form for lists.
fn format_task_short(task: &Task) -> String {
    let priority_marker = match task.priority {
        Priority::High => "!!! ",
        Priority::Medium | Priority::Low => "",
    };

    let due = task
        .due_date
        .map(|d| format!(" ({})", format_due(d, task.status)))
        .unwrap_or_default();

    let tags = if task.tags.is_empty() {
        String::new()
    } else {
        let names: Vec<&str> = task.tags.iter().map(|t| t.name.as_str()).collect();
        format!(" [{}]", names.join(", "))
    };

    // Imported snapshots may carry arbitrary id strings, so shorten by
    // characters rather than byte-slicing
    let short_id: String = task.id.chars().take(8).collect();

    format!(
        "- {}{} `{}`{}{}\n",
        priority_marker, task.title, short_id, due, tags,
    )
}

/// Format statistics as markdown.
pub fn format_stats_markdown(stats: &TaskStats) -> String {
    let mut md = String::new();
    md.push_str("# Task Statistics\n\n");
    md.push_str(&format!("- **total**: {}\n", stats.total));
    md.push_str(&format!("- **to do**: {}\n", stats.todo));
    md.push_str(&format!("- **in progress**: {}\n", stats.in_progress));
    md.push_str(&format!("- **done**: {}\n", stats.done));
    md.push_str(&format!("- **overdue**: {}\n", stats.overdue));
    md.push_str(&format!("- **due today**: {}\n", stats.due_today));
    md.push_str(&format!(
        "- **completion**: {}%\n",
        stats.completion_rate()
    ));
    md.push_str(&format!(
        "- **priority**: {} high / {} medium / {} low\n",
        stats.high_priority, stats.medium_priority, stats.low_priority
    ));
    md
}

/// Render a due date as a local calendar day, flagging overdue open tasks.
fn format_due(due: DateTime<Utc>, status: Status) -> String {
    let local_day = due.with_timezone(&Local).date_naive();
    let today = Local::now().date_naive();
    if status != Status::Done && local_day < today {
        format!("{}, overdue", local_day.format("%Y-%m-%d"))
    } else {
        local_day.format("%Y-%m-%d").to_string()
    }
}
