//! AI-assisted operations: task extraction, description enhancement, task
//! breakdown, and productivity coaching.
//!
//! Everything here is proxy-side plumbing around an opaque text generator.
//! Results only ever reach the store through its ordinary mutation
//! operations, and every operation degrades gracefully: insight generation
//! falls back to locally computed text, the rest surface an error without
//! touching store state.

pub mod client;
pub mod prompts;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub use client::{AiError, GeminiClient, GenerateClient};

use crate::store::views::task_stats;
use crate::types::{Priority, Status, Task};

/// Upper bound on extraction input, matching the API contract.
pub const MAX_EXTRACT_INPUT: usize = 10_000;

/// Shown when insights are requested over an empty task collection.
pub const WELCOME_INSIGHT: &str =
    "🚀 Welcome to your productivity dashboard! Add tasks to unlock personalized AI insights.";

/// A task candidate extracted from free text. Due date and tag suggestions
/// are free-form strings resolved by the user during review, not by the
/// store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub suggested_due_date: Option<String>,
    #[serde(default)]
    pub suggested_tag: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Extract actionable tasks from free text. Empty or whitespace-only input
/// yields an empty list without calling upstream; "no tasks found" is also
/// an empty list, never an error.
pub async fn extract_tasks(
    client: &dyn GenerateClient,
    text: &str,
) -> Result<Vec<ExtractedTask>, AiError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let response = client.generate(&prompts::extract_tasks(text), true).await?;
    parse_extracted_tasks(&response)
}

/// Replacement description for a task.
pub async fn enhance_description(
    client: &dyn GenerateClient,
    title: &str,
    description: &str,
) -> Result<String, AiError> {
    let response = client
        .generate(&prompts::enhance_description(title, description), false)
        .await?;
    Ok(response.trim().to_string())
}

/// Markdown checklist of subtasks, intended to be appended under the task's
/// description.
pub async fn breakdown_task(
    client: &dyn GenerateClient,
    title: &str,
    description: &str,
) -> Result<String, AiError> {
    let response = client
        .generate(&prompts::breakdown_task(title, description), false)
        .await?;
    Ok(response.trim().to_string())
}

/// Productivity insight over the task collection. Infallible: upstream
/// failure (or no configured client) falls back to a locally computed
/// summary.
pub async fn generate_insights(client: Option<&dyn GenerateClient>, tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return WELCOME_INSIGHT.to_string();
    }
    if let Some(client) = client {
        match client
            .generate(&prompts::insights(&summarize_tasks(tasks)), false)
            .await
        {
            Ok(text) if !text.trim().is_empty() => return text.trim().to_string(),
            Ok(_) => warn!("insight generation returned empty text, using local fallback"),
            Err(e) => warn!(error = %e, "insight generation failed, using local fallback"),
        }
    }
    fallback_insight(tasks)
}

/// Chat reply given the conversation history and a task-context summary.
pub async fn chat(
    client: &dyn GenerateClient,
    messages: &[ChatMessage],
    task_context: &str,
) -> Result<String, AiError> {
    let response = client
        .generate(&prompts::chat(messages, task_context), false)
        .await?;
    Ok(response.trim().to_string())
}

/// Locally computed insight used when the upstream call fails.
pub fn fallback_insight(tasks: &[Task]) -> String {
    let done = tasks.iter().filter(|t| t.status == Status::Done).count();
    let high_open = tasks
        .iter()
        .filter(|t| t.priority == Priority::High && t.status != Status::Done)
        .count();
    let nudge = if high_open > 0 {
        format!("Focus on your {} high-priority items!", high_open)
    } else {
        "Great job staying on top of things!".to_string()
    };
    format!("You have {}/{} tasks completed. {}", done, tasks.len(), nudge)
}

/// Compact task-context summary fed to the insight and chat prompts.
pub fn summarize_tasks(tasks: &[Task]) -> String {
    let stats = task_stats(tasks);
    let mut summary = format!(
        "{} tasks total: {} to do, {} in progress, {} done, {} overdue, {} due today.\n",
        stats.total, stats.todo, stats.in_progress, stats.done, stats.overdue, stats.due_today
    );
    for task in tasks.iter().filter(|t| t.status != Status::Done) {
        let due = task
            .due_date
            .map(|d| format!(", due {}", d.format("%Y-%m-%d")))
            .unwrap_or_default();
        summary.push_str(&format!(
            "- [{}] {} ({}{})\n",
            task.status.as_str(),
            task.title,
            task.priority.as_str(),
            due
        ));
    }
    summary
}

/// Parse the model's extraction output: a JSON array, possibly wrapped in a
/// markdown code fence despite the prompt.
fn parse_extracted_tasks(response: &str) -> Result<Vec<ExtractedTask>, AiError> {
    let json = strip_code_fences(response);
    serde_json::from_str(json).map_err(|e| AiError::Parse(e.to_string()))
}

/// Strip a surrounding ``` / ```json fence, if present.
fn strip_code_fences(s: &str) -> &str {
    let trimmed = s.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.trim_start_matches(['\r', '\n']);
    rest.strip_suffix("```").map(str::trim_end).unwrap_or(rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TaskStore;
    use crate::types::TaskDraft;

    #[test]
    fn parses_bare_json_array() {
        let tasks = parse_extracted_tasks(
            r#"[{"title":"Call dentist","description":"","priority":"high","suggestedDueDate":"tomorrow","suggestedTag":"Personal"}]"#,
        )
        .unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Call dentist");
        assert_eq!(tasks[0].priority, Priority::High);
        assert_eq!(tasks[0].suggested_due_date.as_deref(), Some("tomorrow"));
    }

    #[test]
    fn parses_fenced_json() {
        let response = "```json\n[{\"title\":\"Write report\"}]\n```";
        let tasks = parse_extracted_tasks(response).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].priority, Priority::Medium); // default
        assert!(tasks[0].suggested_tag.is_none());
    }

    #[test]
    fn empty_array_is_not_an_error() {
        assert_eq!(parse_extracted_tasks("[]").unwrap(), Vec::new());
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(
            parse_extracted_tasks("I couldn't find any tasks."),
            Err(AiError::Parse(_))
        ));
    }

    #[test]
    fn fallback_insight_counts_completed_and_high_priority() {
        let mut store = TaskStore::new();
        store.add_task(TaskDraft {
            title: "done one".into(),
            description: String::new(),
            priority: Priority::Low,
            status: Status::Done,
            due_date: None,
            tags: Vec::new(),
        });
        store.add_task(TaskDraft {
            title: "urgent".into(),
            description: String::new(),
            priority: Priority::High,
            status: Status::Todo,
            due_date: None,
            tags: Vec::new(),
        });
        let text = fallback_insight(store.tasks());
        assert!(text.contains("1/2 tasks completed"));
        assert!(text.contains("1 high-priority"));
    }

    #[tokio::test]
    async fn empty_input_short_circuits_extraction() {
        struct Panicking;
        #[async_trait::async_trait]
        impl GenerateClient for Panicking {
            async fn generate(&self, _: &str, _: bool) -> Result<String, AiError> {
                panic!("upstream must not be called for empty input");
            }
        }
        let tasks = extract_tasks(&Panicking, "   \n  ").await.unwrap();
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn insights_fall_back_when_upstream_fails() {
        struct Failing;
        #[async_trait::async_trait]
        impl GenerateClient for Failing {
            async fn generate(&self, _: &str, _: bool) -> Result<String, AiError> {
                Err(AiError::NotConfigured)
            }
        }
        let mut store = TaskStore::new();
        store.add_task(TaskDraft {
            title: "a task".into(),
            description: String::new(),
            priority: Priority::Medium,
            status: Status::Todo,
            due_date: None,
            tags: Vec::new(),
        });
        let text = generate_insights(Some(&Failing), store.tasks()).await;
        assert!(text.contains("0/1 tasks completed"));
    }

    #[tokio::test]
    async fn insights_over_empty_collection_use_welcome_text() {
        assert_eq!(generate_insights(None, &[]).await, WELCOME_INSIGHT);
    }
}
