//! Built-in seed dataset.
//!
//! Used when no snapshot exists yet (first run) or when the snapshot on disk
//! cannot be read, so the store never comes up empty and un-recoverable.

use chrono::{Duration, Utc};

use crate::types::{Priority, Status, Tag, Task, new_id};

/// The six example tags.
pub fn seed_tags() -> Vec<Tag> {
    [
        ("Design", "#8B5CF6"),
        ("Development", "#3B82F6"),
        ("Marketing", "#EC4899"),
        ("Research", "#14B8A6"),
        ("Bug Fix", "#EF4444"),
        ("Feature", "#22C55E"),
    ]
    .into_iter()
    .map(|(name, color)| Tag {
        id: new_id(),
        name: name.into(),
        color: color.into(),
    })
    .collect()
}

/// The seven example tasks, with due dates spread around the current day.
/// Tag snapshots are copied from `tags` by position (Design, Development,
/// Marketing, Research, Bug Fix, Feature).
pub fn seed_tasks(tags: &[Tag]) -> Vec<Task> {
    let now = Utc::now();
    let tag = |i: usize| tags.get(i).cloned();
    let entry = |title: &str,
                 description: &str,
                 priority: Priority,
                 status: Status,
                 due_in_days: i64,
                 created_days_ago: i64,
                 task_tags: Vec<Option<Tag>>| Task {
        id: new_id(),
        title: title.into(),
        description: description.into(),
        priority,
        status,
        due_date: Some(now + Duration::days(due_in_days)),
        tags: task_tags.into_iter().flatten().collect(),
        created_at: now - Duration::days(created_days_ago),
        updated_at: now,
    };

    vec![
        entry(
            "Design new landing page",
            "Create wireframes and high-fidelity mockups for the new landing page redesign.",
            Priority::High,
            Status::Todo,
            3,
            0,
            vec![tag(0), tag(1)],
        ),
        entry(
            "Implement user authentication",
            "Set up OAuth2 authentication with Google and GitHub providers.",
            Priority::High,
            Status::InProgress,
            2,
            0,
            vec![tag(1), tag(5)],
        ),
        entry(
            "Write API documentation",
            "Document all REST API endpoints with examples and response schemas.",
            Priority::Medium,
            Status::Todo,
            5,
            0,
            vec![tag(3)],
        ),
        entry(
            "Fix mobile navigation bug",
            "The hamburger menu is not closing properly on mobile devices.",
            Priority::High,
            Status::InProgress,
            1,
            0,
            vec![tag(4)],
        ),
        entry(
            "Prepare marketing campaign",
            "Plan and schedule social media posts for product launch.",
            Priority::Medium,
            Status::Todo,
            7,
            0,
            vec![tag(2)],
        ),
        entry(
            "Database optimization",
            "Optimize slow queries and add proper indexing to improve performance.",
            Priority::Low,
            Status::Done,
            -1,
            3,
            vec![tag(1)],
        ),
        entry(
            "User feedback analysis",
            "Review and categorize user feedback from the beta testing phase.",
            Priority::Low,
            Status::Done,
            -2,
            5,
            vec![tag(3)],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_tasks_reference_only_seed_tags() {
        let tags = seed_tags();
        let tasks = seed_tasks(&tags);
        assert_eq!(tags.len(), 6);
        assert_eq!(tasks.len(), 7);
        for task in &tasks {
            for t in &task.tags {
                assert!(tags.iter().any(|g| g.id == t.id));
            }
        }
    }

    #[test]
    fn seed_timestamps_are_consistent() {
        let tags = seed_tags();
        for task in seed_tasks(&tags) {
            assert!(task.updated_at >= task.created_at);
        }
    }
}
