//! Integration tests for the derivation functions.
//!
//! These tests verify filtering, status grouping, and statistics over a
//! realistic task collection, exercising the combinations the board UI
//! actually requests.

use chrono::{Duration, Local, TimeZone, Utc};
use kanvax::store::TaskStore;
use kanvax::store::views::{filtered_tasks, task_stats_at, tasks_by_status};
use kanvax::types::{Priority, PriorityFilter, Status, StatusFilter, TaskDraft, TaskFilters};

/// Helper to build a populated store with a known tag and task layout.
fn setup_store() -> TaskStore {
    let mut store = TaskStore::new();
    let design = store.add_tag("Design".into(), "#8B5CF6".into()).clone();
    let dev = store.add_tag("Development".into(), "#3B82F6".into()).clone();
    let bug = store.add_tag("Bug Fix".into(), "#EF4444".into()).clone();

    store.add_task(TaskDraft {
        title: "Design landing page".to_string(),
        description: "Hero section and pricing table".to_string(),
        priority: Priority::High,
        status: Status::InProgress,
        tags: vec![design.clone()],
        ..Default::default()
    });
    store.add_task(TaskDraft {
        title: "Fix login redirect".to_string(),
        description: "Users land on a blank page after OAuth".to_string(),
        priority: Priority::High,
        status: Status::Todo,
        tags: vec![dev.clone(), bug],
        ..Default::default()
    });
    store.add_task(TaskDraft {
        title: "Write API docs".to_string(),
        description: "Document the task endpoints".to_string(),
        priority: Priority::Medium,
        status: Status::Todo,
        tags: vec![dev],
        ..Default::default()
    });
    store.add_task(TaskDraft {
        title: "Ship onboarding email".to_string(),
        description: "Design the welcome sequence".to_string(),
        priority: Priority::Low,
        status: Status::Done,
        tags: vec![design],
        ..Default::default()
    });
    store
}

fn titles(tasks: &[&kanvax::types::Task]) -> Vec<String> {
    tasks.iter().map(|t| t.title.clone()).collect()
}

#[test]
fn default_filters_pass_everything() {
    let store = setup_store();
    let filtered = filtered_tasks(store.tasks(), &TaskFilters::default());
    assert_eq!(filtered.len(), store.tasks().len());
}

#[test]
fn search_is_case_insensitive_and_covers_description() {
    let store = setup_store();

    let filters = TaskFilters {
        search: "DESIGN".to_string(),
        ..Default::default()
    };
    let filtered = filtered_tasks(store.tasks(), &filters);
    // Matches "Design landing page" by title and "Ship onboarding email"
    // by its description
    assert_eq!(
        titles(&filtered),
        vec!["Design landing page", "Ship onboarding email"]
    );

    let filters = TaskFilters {
        search: "oauth".to_string(),
        ..Default::default()
    };
    let filtered = filtered_tasks(store.tasks(), &filters);
    assert_eq!(titles(&filtered), vec!["Fix login redirect"]);
}

#[test]
fn search_whitespace_is_significant() {
    let mut store = TaskStore::new();
    store.add_task(TaskDraft {
        title: "Fix bug".to_string(),
        ..Default::default()
    });

    // The trailing space makes " bug " a miss against "Fix bug"
    let filters = TaskFilters {
        search: " bug ".to_string(),
        ..Default::default()
    };
    assert!(filtered_tasks(store.tasks(), &filters).is_empty());

    // A leading space alone still lines up with the word boundary
    let filters = TaskFilters {
        search: " bug".to_string(),
        ..Default::default()
    };
    assert_eq!(filtered_tasks(store.tasks(), &filters).len(), 1);

    // Whitespace-only is a real substring query, not match-all
    let filters = TaskFilters {
        search: "   ".to_string(),
        ..Default::default()
    };
    assert!(filtered_tasks(store.tasks(), &filters).is_empty());
}

#[test]
fn status_and_priority_filters_narrow_independently() {
    let store = setup_store();

    let filters = TaskFilters {
        status: StatusFilter::Todo,
        ..Default::default()
    };
    assert_eq!(filtered_tasks(store.tasks(), &filters).len(), 2);

    let filters = TaskFilters {
        priority: PriorityFilter::High,
        ..Default::default()
    };
    assert_eq!(filtered_tasks(store.tasks(), &filters).len(), 2);

    // Dimensions AND together
    let filters = TaskFilters {
        status: StatusFilter::Todo,
        priority: PriorityFilter::High,
        ..Default::default()
    };
    let filtered = filtered_tasks(store.tasks(), &filters);
    assert_eq!(titles(&filtered), vec!["Fix login redirect"]);
}

#[test]
fn tag_filter_is_or_within_the_dimension() {
    let store = setup_store();
    let design = store.tags()[0].id.clone();
    let bug = store.tags()[2].id.clone();

    let filters = TaskFilters {
        tags: vec![design, bug],
        ..Default::default()
    };
    let filtered = filtered_tasks(store.tasks(), &filters);
    assert_eq!(
        titles(&filtered),
        vec![
            "Design landing page",
            "Fix login redirect",
            "Ship onboarding email"
        ]
    );
}

#[test]
fn filtering_preserves_relative_order() {
    let store = setup_store();
    let filters = TaskFilters {
        status: StatusFilter::Todo,
        ..Default::default()
    };
    let filtered = filtered_tasks(store.tasks(), &filters);
    assert_eq!(titles(&filtered), vec!["Fix login redirect", "Write API docs"]);
}

#[test]
fn adding_a_filter_never_grows_the_result() {
    let store = setup_store();
    let broad = TaskFilters {
        search: "e".to_string(),
        ..Default::default()
    };
    let narrow = TaskFilters {
        search: "e".to_string(),
        status: StatusFilter::Todo,
        ..Default::default()
    };
    let broad_count = filtered_tasks(store.tasks(), &broad).len();
    let narrow_count = filtered_tasks(store.tasks(), &narrow).len();
    assert!(narrow_count <= broad_count);
}

#[test]
fn status_groups_partition_the_input() {
    let store = setup_store();
    let filtered = filtered_tasks(store.tasks(), &TaskFilters::default());
    let groups = tasks_by_status(&filtered);

    assert_eq!(groups.total(), filtered.len());
    assert_eq!(titles(&groups.todo), vec!["Fix login redirect", "Write API docs"]);
    assert_eq!(titles(&groups.in_progress), vec!["Design landing page"]);
    assert_eq!(titles(&groups.done), vec!["Ship onboarding email"]);
}

#[test]
fn grouping_respects_the_active_filter() {
    let store = setup_store();
    let filters = TaskFilters {
        priority: PriorityFilter::High,
        ..Default::default()
    };
    let filtered = filtered_tasks(store.tasks(), &filters);
    let groups = tasks_by_status(&filtered);

    assert_eq!(groups.total(), 2);
    assert!(groups.done.is_empty());
}

#[test]
fn stats_count_statuses_and_priorities() {
    let store = setup_store();
    let now = Local.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
    let stats = task_stats_at(store.tasks(), now);

    assert_eq!(stats.total, 4);
    assert_eq!(stats.todo, 2);
    assert_eq!(stats.in_progress, 1);
    assert_eq!(stats.done, 1);
    assert_eq!(stats.high_priority, 2);
    assert_eq!(stats.medium_priority, 1);
    assert_eq!(stats.low_priority, 1);
    assert_eq!(stats.completion_rate(), 25);
}

#[test]
fn stats_ignore_active_filters() {
    let mut store = setup_store();
    store.set_filters(kanvax::types::FilterPatch {
        status: Some(StatusFilter::Done),
        ..Default::default()
    });

    // Stats run over the unfiltered collection
    let now = Local.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
    let stats = task_stats_at(store.tasks(), now);
    assert_eq!(stats.total, 4);
}

#[test]
fn overdue_and_due_today_use_local_day_boundaries() {
    let now = Local.with_ymd_and_hms(2026, 3, 10, 23, 30, 0).unwrap();
    let mut store = TaskStore::new();
    store.add_task(TaskDraft {
        title: "late".to_string(),
        due_date: Some(now.with_timezone(&Utc) - Duration::days(2)),
        ..Default::default()
    });
    store.add_task(TaskDraft {
        title: "today early morning".to_string(),
        due_date: Some(
            Local
                .with_ymd_and_hms(2026, 3, 10, 0, 15, 0)
                .unwrap()
                .with_timezone(&Utc),
        ),
        ..Default::default()
    });
    store.add_task(TaskDraft {
        title: "tomorrow".to_string(),
        due_date: Some(now.with_timezone(&Utc) + Duration::days(1)),
        ..Default::default()
    });
    store.add_task(TaskDraft {
        title: "done but old".to_string(),
        status: Status::Done,
        due_date: Some(now.with_timezone(&Utc) - Duration::days(5)),
        ..Default::default()
    });

    let stats = task_stats_at(store.tasks(), now);
    assert_eq!(stats.overdue, 1);
    assert_eq!(stats.due_today, 1);
}
