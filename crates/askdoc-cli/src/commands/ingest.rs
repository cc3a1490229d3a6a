//! Ingest command - upload a document into the index.

use super::build_app;
use anyhow::{Context, Result};
use askdoc_core::{ndjson_line, IngestEvent, IngestStage};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

/// Run the ingest command.
pub async fn run(path: &Path, mime: Option<String>, json: bool) -> Result<()> {
    let app = build_app()?;

    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    let mime_type = mime.unwrap_or_else(|| guess_mime(&filename));

    let mut rx = app.ingestor.ingest_stream(bytes, filename, mime_type);

    if json {
        let mut stdout = io::stdout();
        while let Some(event) = rx.recv().await {
            let failed = matches!(event, IngestEvent::Error { .. });
            stdout.write_all(ndjson_line(&event)?.as_bytes())?;
            stdout.flush()?;
            if failed {
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));

    while let Some(event) = rx.recv().await {
        match event {
            IngestEvent::Stage(IngestStage::Parsing) => spinner.set_message("Parsing..."),
            IngestEvent::Stage(IngestStage::Chunking) => spinner.set_message("Chunking..."),
            IngestEvent::Stage(IngestStage::Indexing { total }) => {
                spinner.set_message(format!("Indexing {} chunks...", total))
            }
            IngestEvent::Stage(IngestStage::Done { result }) => {
                spinner.finish_and_clear();
                println!(
                    "{} Ingested {} as {} ({} chunks)",
                    "✓".green().bold(),
                    result.filename.white(),
                    result.document_id.dimmed(),
                    result.chunks
                );
            }
            IngestEvent::Error { error } => {
                spinner.finish_and_clear();
                anyhow::bail!(error);
            }
        }
    }

    Ok(())
}

/// Best-effort MIME detection from the filename extension. The loader falls
/// back to the extension anyway; this keeps the declared type honest.
fn guess_mime(filename: &str) -> String {
    let extension = filename
        .rsplit('.')
        .next()
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => "application/pdf",
        "md" | "markdown" => "text/markdown",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime("paper.PDF"), "application/pdf");
        assert_eq!(guess_mime("notes.md"), "text/markdown");
        assert_eq!(guess_mime("notes.txt"), "text/plain");
        assert_eq!(guess_mime("unknown.bin"), "application/octet-stream");
    }
}
