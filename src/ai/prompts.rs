//! Prompt construction for the AI operations.
//!
//! Plain string builders; the actual network call lives in
//! [`super::client`]. Prompt wording is part of the product behavior
//! (extraction output must be a bare JSON array, breakdowns must be
//! checklists), so changes here need matching parser updates.

use crate::ai::ChatMessage;

/// Extraction prompt: turn free text (meeting notes, brain dumps, emails)
/// into a JSON array of actionable tasks.
pub fn extract_tasks(raw_text: &str) -> String {
    format!(
        r#"You are a task extraction assistant. Analyze the raw text below (meeting notes, brain dumps, emails) and extract actionable tasks.

For each task you identify, provide:
- title: a clear, actionable task title starting with a verb, under 10 words
- description: brief context if available, otherwise an empty string
- priority: "high" (urgent/important), "medium" (normal), or "low" (can wait)
- suggestedDueDate: if a date or time is mentioned, a human-readable string (e.g. "Friday", "next week", "tomorrow"), otherwise null
- suggestedTag: ONE fitting category tag (e.g. "Development", "Design", "Marketing", "Personal", "Finance", "Meeting"), otherwise null

Rules:
1. Only extract actionable items; ignore completed items and general statements.
2. Return ONLY a valid JSON array, no markdown, no explanation.
3. If no tasks are found, return an empty array [].

Raw text to analyze:
"""
{raw_text}
"""

Return the JSON array of tasks:"#
    )
}

/// Rewrite a terse description into a clearer, more useful one.
pub fn enhance_description(title: &str, description: &str) -> String {
    format!(
        r#"You are helping improve a task description on a kanban board.

Task title: {title}
Current description: {description}

Rewrite the description to be clear, specific, and actionable in 2-4 sentences. Keep any concrete details from the current description. Return only the improved description text, with no preamble and no markdown headings."#
    )
}

/// Break a task into a markdown checklist of subtasks.
pub fn breakdown_task(title: &str, description: &str) -> String {
    format!(
        r#"Break the following task into 3-7 concrete subtasks.

Task title: {title}
Description: {description}

Return ONLY a markdown checklist, one subtask per line in the form "- [ ] subtask", ordered so earlier items unblock later ones. No heading, no explanation."#
    )
}

/// Productivity insight over the current task collection.
pub fn insights(task_summary: &str) -> String {
    format!(
        r#"You are a friendly productivity coach. Here is a summary of the user's current tasks:

{task_summary}

Write 2-3 short sentences of encouraging, specific insight: call out progress made, flag overdue or high-priority work to focus on next, and suggest one concrete next step. Plain text only, no markdown, no lists."#
    )
}

/// Chat prompt: conversation history plus task context, asking for the next
/// assistant reply.
pub fn chat(messages: &[ChatMessage], task_context: &str) -> String {
    let mut prompt = String::from(
        "You are Kanvax, a concise productivity assistant embedded in a kanban task app. \
         Answer the user's latest message helpfully, using their task context when relevant.\n\n",
    );
    prompt.push_str("Task context:\n");
    prompt.push_str(task_context);
    prompt.push_str("\n\nConversation so far:\n");
    for message in messages {
        prompt.push_str(&format!("{}: {}\n", message.role.as_str(), message.content));
    }
    prompt.push_str("assistant:");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{ChatMessage, ChatRole};

    #[test]
    fn extract_prompt_embeds_input() {
        let prompt = extract_tasks("call the dentist tomorrow");
        assert!(prompt.contains("call the dentist tomorrow"));
        assert!(prompt.contains("JSON array"));
    }

    #[test]
    fn chat_prompt_replays_history_in_order() {
        let messages = vec![
            ChatMessage {
                role: ChatRole::User,
                content: "what should I do first?".into(),
            },
            ChatMessage {
                role: ChatRole::Assistant,
                content: "Start with the overdue task.".into(),
            },
        ];
        let prompt = chat(&messages, "1 overdue task");
        let user_pos = prompt.find("user: what should I do first?").unwrap();
        let assistant_pos = prompt.find("assistant: Start with").unwrap();
        assert!(user_pos < assistant_pos);
        assert!(prompt.ends_with("assistant:"));
    }
}
