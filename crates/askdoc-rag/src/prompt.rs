//! Prompt construction for answer turns.

use askdoc_core::{ChatMessage, ConversationMessage, RetrievedDocument};

/// System instruction for every answer turn.
const SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions \
based on the provided context from uploaded documents.\n\n\
Guidelines:\n\
- Base your answers only on the context provided\n\
- If the context doesn't contain relevant information, say so\n\
- Be concise but thorough\n\
- Do not make up information not present in the context";

/// Separator between retrieved texts in the context block.
const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Placeholder when retrieval returns nothing.
const NO_CONTEXT_PLACEHOLDER: &str = "No relevant documents found.";

/// Build the final user turn: the context block plus the question.
pub fn build_user_prompt(question: &str, sources: &[RetrievedDocument]) -> String {
    let context = if sources.is_empty() {
        NO_CONTEXT_PLACEHOLDER.to_string()
    } else {
        sources
            .iter()
            .map(|s| s.content.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR)
    };

    format!(
        "Context from documents:\n{}\n\nUser question: {}\n\n\
         Provide a clear and accurate answer based only on the context above.",
        context, question
    )
}

/// Assemble the full message list for the completion service: the system
/// instruction, prior turns as separate role-tagged messages, and the current
/// question carrying the context block.
pub fn build_messages(
    history: &[ConversationMessage],
    question: &str,
    sources: &[RetrievedDocument],
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(SYSTEM_PROMPT));

    for turn in history {
        messages.push(ChatMessage {
            role: turn.role.into(),
            content: turn.content.clone(),
        });
    }

    messages.push(ChatMessage::user(build_user_prompt(question, sources)));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use askdoc_core::ChatRole;

    fn doc(content: &str) -> RetrievedDocument {
        RetrievedDocument {
            id: "d1-chunk-0".to_string(),
            content: content.to_string(),
            metadata: serde_json::json!({}),
            score: 0.9,
        }
    }

    #[test]
    fn test_context_block_joins_sources_with_separator() {
        let prompt = build_user_prompt("What is it?", &[doc("First."), doc("Second.")]);

        assert!(prompt.contains("First.\n\n---\n\nSecond."));
        assert!(prompt.contains("User question: What is it?"));
    }

    #[test]
    fn test_empty_retrieval_uses_placeholder() {
        let prompt = build_user_prompt("Anything?", &[]);
        assert!(prompt.contains("No relevant documents found."));
    }

    #[test]
    fn test_history_becomes_role_tagged_turns() {
        let history = vec![
            ConversationMessage::user("Earlier question"),
            ConversationMessage::assistant("Earlier answer", vec![]),
        ];

        let messages = build_messages(&history, "Follow-up?", &[doc("ctx")]);

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(messages[1].role, ChatRole::User);
        assert_eq!(messages[1].content, "Earlier question");
        assert_eq!(messages[2].role, ChatRole::Assistant);
        assert_eq!(messages[2].content, "Earlier answer");
        assert_eq!(messages[3].role, ChatRole::User);
        // History stays out of the context block; only the final turn carries it
        assert!(messages[3].content.contains("ctx"));
        assert!(!messages[1].content.contains("ctx"));
    }
}
