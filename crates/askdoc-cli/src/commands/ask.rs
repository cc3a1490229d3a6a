//! Ask command - question answering over ingested documents.

use super::build_app;
use anyhow::Result;
use askdoc_core::{ndjson_line, RetrievedDocument, StreamEvent};
use colored::Colorize;
use std::io::{self, Write};

/// Run the ask command.
pub async fn run(
    question: &str,
    conversation: Option<String>,
    stream: bool,
    json: bool,
) -> Result<()> {
    let app = build_app()?;

    if json {
        let mut rx = app.rag.answer_stream(question.to_string(), conversation);
        let mut stdout = io::stdout();
        while let Some(event) = rx.recv().await {
            let failed = matches!(event, StreamEvent::Error(_));
            stdout.write_all(ndjson_line(&event)?.as_bytes())?;
            stdout.flush()?;
            if failed {
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    println!("{} {}", "Question:".cyan().bold(), question);
    println!("{}", "─".repeat(70));
    println!();

    if stream {
        let mut rx = app.rag.answer_stream(question.to_string(), conversation);
        let mut conversation_id = None;
        let mut sources = Vec::new();

        print!("{} ", "Answer:".green().bold());
        io::stdout().flush()?;

        while let Some(event) = rx.recv().await {
            match event {
                StreamEvent::ConversationId(id) => conversation_id = Some(id),
                StreamEvent::Content(delta) => {
                    print!("{}", delta);
                    io::stdout().flush().ok();
                }
                StreamEvent::Sources(retrieved) => sources = retrieved,
                StreamEvent::Error(message) => {
                    println!();
                    anyhow::bail!(message);
                }
            }
        }

        println!();
        println!();
        print_sources(&sources);
        if let Some(id) = conversation_id {
            println!();
            println!(
                "{} askdoc ask -c {} \"...\"",
                "Continue with:".dimmed(),
                id
            );
        }
    } else {
        let answer = app.rag.answer(question, conversation.as_deref()).await?;

        println!("{}", "Answer:".green().bold());
        println!();
        println!("{}", answer.message.content);
        println!();
        print_sources(&answer.sources);
        println!();
        println!(
            "{} askdoc ask -c {} \"...\"",
            "Continue with:".dimmed(),
            answer.conversation_id
        );
    }

    Ok(())
}

fn print_sources(sources: &[RetrievedDocument]) {
    if sources.is_empty() {
        return;
    }

    println!("{}", "─".repeat(70));
    println!("{}", "Sources:".cyan().bold());
    for (i, source) in sources.iter().enumerate() {
        let filename = source
            .metadata
            .get("filename")
            .and_then(|f| f.as_str())
            .unwrap_or("unknown");
        println!(
            "  {}. {} {} (similarity: {:.0}%)",
            i + 1,
            filename.white(),
            format!("[{}]", source.id).dimmed(),
            source.score * 100.0
        );
    }
}
