//! Chats commands - list, show, and delete conversations.

use super::build_app;
use anyhow::Result;
use askdoc_core::MessageRole;
use colored::Colorize;

/// List conversations.
pub fn list() -> Result<()> {
    let app = build_app()?;
    let summaries = app.conversations.list_summaries();

    if summaries.is_empty() {
        println!("No conversations yet. Run 'askdoc ask \"...\"' first.");
        return Ok(());
    }

    println!("{}", "Conversations:".cyan().bold());
    for summary in summaries {
        println!(
            "  {} {} (updated {})",
            summary.id.dimmed(),
            summary.title.white(),
            summary.updated_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

/// Show a conversation's messages.
pub fn show(id: &str) -> Result<()> {
    let app = build_app()?;

    let Some(conversation) = app.conversations.get(id) else {
        anyhow::bail!("No conversation with id {}", id);
    };

    println!("{} {}", "Conversation:".cyan().bold(), conversation.id);
    println!("{}", "─".repeat(70));

    for message in &conversation.messages {
        let label = match message.role {
            MessageRole::User => "You:".cyan().bold(),
            MessageRole::Assistant => "Assistant:".green().bold(),
        };
        println!();
        println!("{} {}", label, message.content);

        if let Some(sources) = &message.sources {
            if !sources.is_empty() {
                let ids: Vec<&str> = sources.iter().map(|s| s.id.as_str()).collect();
                println!("{}", format!("  (sources: {})", ids.join(", ")).dimmed());
            }
        }
    }

    Ok(())
}

/// Delete a conversation.
pub fn delete(id: &str) -> Result<()> {
    let app = build_app()?;

    if app.conversations.delete(id) {
        println!("{} Deleted conversation {}", "✓".green().bold(), id);
    } else {
        println!("{} No conversation with id {}", "•".yellow(), id);
    }

    Ok(())
}
