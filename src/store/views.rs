//! Pure derivation functions over store state.
//!
//! Every screen recomputes these from the current task collection and filter
//! state; nothing here caches or mutates. Statistics are the one
//! time-dependent computation, so [`task_stats_at`] takes an explicit "now"
//! and [`task_stats`] wraps it with the wall clock.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::types::{Priority, Status, Task, TaskFilters};

/// Subsequence of `tasks` passing every active filter dimension, in their
/// original relative order. The search string is matched verbatim (just
/// case-folded): whitespace counts, so only the empty string matches
/// everything.
pub fn filtered_tasks<'a>(tasks: &'a [Task], filters: &TaskFilters) -> Vec<&'a Task> {
    let search = filters.search.to_lowercase();
    tasks
        .iter()
        .filter(|task| {
            if !search.is_empty() {
                let matches = task.title.to_lowercase().contains(&search)
                    || task.description.to_lowercase().contains(&search);
                if !matches {
                    return false;
                }
            }
            if !filters.priority.matches(task.priority) {
                return false;
            }
            if !filters.status.matches(task.status) {
                return false;
            }
            if !filters.tags.is_empty() {
                // OR within the tag dimension: any listed id suffices.
                let has_match = filters.tags.iter().any(|id| task.has_tag(id));
                if !has_match {
                    return false;
                }
            }
            true
        })
        .collect()
}

/// The three board columns. Grouping by status is a partition: every input
/// task lands in exactly one group.
#[derive(Debug, Serialize)]
pub struct StatusGroups<'a> {
    pub todo: Vec<&'a Task>,
    #[serde(rename = "in-progress")]
    pub in_progress: Vec<&'a Task>,
    pub done: Vec<&'a Task>,
}

impl StatusGroups<'_> {
    pub fn total(&self) -> usize {
        self.todo.len() + self.in_progress.len() + self.done.len()
    }
}

/// Partition an already-filtered list into the three status groups,
/// preserving order within each group.
pub fn tasks_by_status<'a>(filtered: &[&'a Task]) -> StatusGroups<'a> {
    let mut groups = StatusGroups {
        todo: Vec::new(),
        in_progress: Vec::new(),
        done: Vec::new(),
    };
    for task in filtered {
        match task.status {
            Status::Todo => groups.todo.push(task),
            Status::InProgress => groups.in_progress.push(task),
            Status::Done => groups.done.push(task),
        }
    }
    groups
}

/// Aggregate statistics over the full, unfiltered task collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
    /// Not done, with a due date strictly before the start of the local day.
    pub overdue: usize,
    /// Not done, due within [start of today, start of tomorrow).
    pub due_today: usize,
    pub high_priority: usize,
    pub medium_priority: usize,
    pub low_priority: usize,
}

impl TaskStats {
    /// Completed share as a whole percentage; 0 for an empty collection.
    pub fn completion_rate(&self) -> u32 {
        if self.total == 0 {
            0
        } else {
            (self.done * 100 / self.total) as u32
        }
    }
}

/// Statistics against the wall clock. Time-dependent; tests should go
/// through [`task_stats_at`] with a fixed instant instead.
pub fn task_stats(tasks: &[Task]) -> TaskStats {
    task_stats_at(tasks, Local::now())
}

/// Statistics with an injected "now". Day boundaries are local-time calendar
/// days: a task is overdue when its due date falls on an earlier local day
/// than `now`, and due today when it falls on the same local day.
pub fn task_stats_at(tasks: &[Task], now: DateTime<Local>) -> TaskStats {
    let today = now.date_naive();
    let mut stats = TaskStats {
        total: tasks.len(),
        todo: 0,
        in_progress: 0,
        done: 0,
        overdue: 0,
        due_today: 0,
        high_priority: 0,
        medium_priority: 0,
        low_priority: 0,
    };
    for task in tasks {
        match task.status {
            Status::Todo => stats.todo += 1,
            Status::InProgress => stats.in_progress += 1,
            Status::Done => stats.done += 1,
        }
        match task.priority {
            Priority::High => stats.high_priority += 1,
            Priority::Medium => stats.medium_priority += 1,
            Priority::Low => stats.low_priority += 1,
        }
        if task.status != Status::Done
            && let Some(due) = task.due_date
        {
            let due_day = due.with_timezone(&Local).date_naive();
            if due_day < today {
                stats.overdue += 1;
            } else if due_day == today {
                stats.due_today += 1;
            }
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Priority, Status, TaskDraft};
    use crate::store::TaskStore;
    use chrono::{Duration, TimeZone, Utc};

    fn task(title: &str, status: Status, priority: Priority) -> Task {
        let mut store = TaskStore::new();
        store.add_task(TaskDraft {
            title: title.into(),
            description: String::new(),
            priority,
            status,
            due_date: None,
            tags: Vec::new(),
        });
        store.tasks()[0].clone()
    }

    #[test]
    fn completion_rate_rounds_down() {
        let stats = TaskStats {
            total: 3,
            todo: 1,
            in_progress: 1,
            done: 1,
            overdue: 0,
            due_today: 0,
            high_priority: 0,
            medium_priority: 3,
            low_priority: 0,
        };
        assert_eq!(stats.completion_rate(), 33);
    }

    #[test]
    fn completion_rate_empty_is_zero() {
        let stats = task_stats(&[]);
        assert_eq!(stats.completion_rate(), 0);
    }

    #[test]
    fn done_tasks_are_never_overdue() {
        let mut t = task("ship", Status::Done, Priority::Low);
        t.due_date = Some(Utc::now() - Duration::days(10));
        let now = Local::now();
        let stats = task_stats_at(&[t], now);
        assert_eq!(stats.overdue, 0);
        assert_eq!(stats.due_today, 0);
    }

    #[test]
    fn due_day_comparison_uses_local_calendar_days() {
        let now = Local.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();

        let mut due_yesterday = task("a", Status::Todo, Priority::Medium);
        due_yesterday.due_date = Some(now.with_timezone(&Utc) - Duration::days(1));
        let mut due_today = task("b", Status::Todo, Priority::Medium);
        due_today.due_date = Some(now.with_timezone(&Utc));
        let mut due_tomorrow = task("c", Status::Todo, Priority::Medium);
        due_tomorrow.due_date = Some(now.with_timezone(&Utc) + Duration::days(1));

        let stats = task_stats_at(&[due_yesterday, due_today, due_tomorrow], now);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.due_today, 1);
    }
}
