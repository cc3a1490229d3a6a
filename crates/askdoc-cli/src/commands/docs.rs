//! Docs commands - list and delete ingested documents.

use super::build_app;
use anyhow::Result;
use colored::Colorize;

/// List ingested documents.
pub fn list() -> Result<()> {
    let app = build_app()?;
    let documents = app.registry.list();

    if documents.is_empty() {
        println!("No documents ingested yet. Run 'askdoc ingest <path>' first.");
        return Ok(());
    }

    println!("{}", "Documents:".cyan().bold());
    for entry in documents {
        println!(
            "  {} {} ({} chunks, uploaded {})",
            entry.document_id.dimmed(),
            entry.filename.white(),
            entry.chunk_ids.len(),
            entry.uploaded_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

/// Delete a document and its vectors.
pub async fn delete(id: &str) -> Result<()> {
    let app = build_app()?;

    if app.ingestor.delete(id).await? {
        println!("{} Deleted document {}", "✓".green().bold(), id);
    } else {
        println!("{} No document with id {}", "•".yellow(), id);
    }

    Ok(())
}
