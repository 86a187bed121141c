//! The canonical task store.
//!
//! Single owner of the task/tag collections and the UI-selection state.
//! All mutation goes through the operations here; id-keyed operations on a
//! missing id are silent no-ops rather than errors (single-user client, no
//! "already deleted" races worth surfacing).

pub mod seed;
pub mod views;

use chrono::Utc;
use tracing::debug;

use crate::types::{
    FilterPatch, Status, Tag, Task, TaskDraft, TaskFilters, TaskPatch, ViewMode, new_id,
};

/// In-memory store for tasks, tags, filters, and view state.
///
/// Constructed once at startup (from a snapshot or the seed dataset) and
/// handed to the layers that need it; there is no hidden global instance.
#[derive(Debug, Clone)]
pub struct TaskStore {
    tasks: Vec<Task>,
    tags: Vec<Tag>,
    /// One-slot undo buffer: the most recently deleted task.
    last_deleted: Option<Task>,
    filters: TaskFilters,
    view_mode: ViewMode,
    /// Weak reference by id. Deliberately not cleared when the task goes
    /// away; resolve through [`TaskStore::selected_task`].
    selected_task_id: Option<String>,
    is_adding_task: bool,
    is_editing_task: bool,
    user_name: String,
}

impl TaskStore {
    /// Empty store with default view state.
    pub fn new() -> Self {
        Self::from_parts(Vec::new(), Vec::new(), ViewMode::default(), "there".into())
    }

    /// Store pre-populated with the built-in example tasks and tags.
    pub fn with_seed_data() -> Self {
        let tags = seed::seed_tags();
        let tasks = seed::seed_tasks(&tags);
        Self::from_parts(tasks, tags, ViewMode::default(), "there".into())
    }

    /// Rebuild a store from persisted fields. Filters and selection state are
    /// not persisted and start at their defaults.
    pub fn from_parts(
        tasks: Vec<Task>,
        tags: Vec<Tag>,
        view_mode: ViewMode,
        user_name: String,
    ) -> Self {
        Self {
            tasks,
            tags,
            last_deleted: None,
            filters: TaskFilters::default(),
            view_mode,
            selected_task_id: None,
            is_adding_task: false,
            is_editing_task: false,
            user_name,
        }
    }

    // Read access

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn filters(&self) -> &TaskFilters {
        &self.filters
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn selected_task_id(&self) -> Option<&str> {
        self.selected_task_id.as_deref()
    }

    pub fn is_adding_task(&self) -> bool {
        self.is_adding_task
    }

    pub fn is_editing_task(&self) -> bool {
        self.is_editing_task
    }

    pub fn last_deleted(&self) -> Option<&Task> {
        self.last_deleted.as_ref()
    }

    pub fn get_task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Resolve the selection. A stale id (task since deleted) is treated as
    /// no selection.
    pub fn selected_task(&self) -> Option<&Task> {
        self.selected_task_id
            .as_deref()
            .and_then(|id| self.get_task(id))
    }

    // Task mutations

    /// Create a task from form data. Generates a fresh id, stamps both
    /// timestamps with the same instant, and appends (insertion order is the
    /// default display order). Performs no field validation.
    pub fn add_task(&mut self, draft: TaskDraft) -> &Task {
        let now = Utc::now();
        let task = Task {
            id: new_id(),
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            status: draft.status,
            due_date: draft.due_date,
            tags: draft.tags,
            created_at: now,
            updated_at: now,
        };
        debug!(id = %task.id, title = %task.title, "task added");
        let idx = self.tasks.len();
        self.tasks.push(task);
        &self.tasks[idx]
    }

    /// Merge the set fields of `patch` into the matching task and bump
    /// `updated_at`. `created_at` is never touched. Returns whether a task
    /// matched; an unknown id is a no-op.
    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            debug!(id, "update ignored, no such task");
            return false;
        };
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        if let Some(tags) = patch.tags {
            task.tags = tags;
        }
        task.updated_at = Utc::now();
        true
    }

    /// Remove the matching task, snapshotting it into the undo buffer
    /// (overwriting whatever was there). An unknown id is a no-op and leaves
    /// the buffer in its prior state.
    pub fn delete_task(&mut self, id: &str) -> bool {
        let Some(pos) = self.tasks.iter().position(|t| t.id == id) else {
            debug!(id, "delete ignored, no such task");
            return false;
        };
        let task = self.tasks.remove(pos);
        debug!(id = %task.id, title = %task.title, "task deleted");
        self.last_deleted = Some(task);
        true
    }

    /// Re-insert the buffered deletion, appended to the end of the
    /// collection, and clear the buffer. No-op when the buffer is empty.
    pub fn restore_task(&mut self) -> Option<&Task> {
        let task = self.last_deleted.take()?;
        debug!(id = %task.id, "task restored");
        self.tasks.push(task);
        self.tasks.last()
    }

    /// Status transition fast path; equivalent to a status-only patch. Any
    /// status may move to any other.
    pub fn move_task(&mut self, id: &str, status: Status) -> bool {
        self.update_task(id, TaskPatch::with_status(status))
    }

    // Tag mutations

    /// Create a tag with a fresh id. Does not attach it to any task.
    pub fn add_tag(&mut self, name: String, color: String) -> &Tag {
        let tag = Tag {
            id: new_id(),
            name,
            color,
        };
        let idx = self.tags.len();
        self.tags.push(tag);
        &self.tags[idx]
    }

    /// Remove the tag from the global collection and strip it from every
    /// task's tag list, keeping the remaining tags in their original order.
    pub fn delete_tag(&mut self, id: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t.id != id);
        for task in &mut self.tasks {
            task.tags.retain(|t| t.id != id);
        }
        before != self.tags.len()
    }

    // UI state

    pub fn set_user_name(&mut self, name: String) {
        self.user_name = name;
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    /// Merge a partial filter update over the current filters.
    pub fn set_filters(&mut self, patch: FilterPatch) {
        if let Some(search) = patch.search {
            self.filters.search = search;
        }
        if let Some(priority) = patch.priority {
            self.filters.priority = priority;
        }
        if let Some(status) = patch.status {
            self.filters.status = status;
        }
        if let Some(tags) = patch.tags {
            self.filters.tags = tags;
        }
    }

    /// Back to the all-encompassing default filter.
    pub fn reset_filters(&mut self) {
        self.filters = TaskFilters::default();
    }

    pub fn set_selected_task(&mut self, id: Option<String>) {
        self.selected_task_id = id;
    }

    pub fn set_is_adding_task(&mut self, value: bool) {
        self.is_adding_task = value;
    }

    pub fn set_is_editing_task(&mut self, value: bool) {
        self.is_editing_task = value;
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}
