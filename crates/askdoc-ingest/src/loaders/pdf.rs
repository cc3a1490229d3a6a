//! PDF loader.

use super::{DocumentLoader, TextUnit};
use crate::error::{IngestError, IngestResult};
use tracing::debug;

/// Loader for PDF uploads. Each page becomes one unit tagged with its page
/// number, so retrieved chunks can cite the page they came from.
pub struct PdfLoader;

impl PdfLoader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentLoader for PdfLoader {
    fn load(&self, bytes: &[u8], filename: &str) -> IngestResult<Vec<TextUnit>> {
        debug!("Parsing PDF: {} ({} bytes)", filename, bytes.len());

        let content =
            pdf_extract::extract_text_from_mem(bytes).map_err(|e| IngestError::Parse {
                filename: filename.to_string(),
                message: format!("failed to extract text from PDF: {}", e),
            })?;

        // pdf-extract marks page breaks with form feeds
        let units: Vec<TextUnit> = content
            .split('\x0C')
            .enumerate()
            .filter_map(|(index, page)| {
                let cleaned = clean_pdf_text(page);
                if cleaned.trim().is_empty() {
                    return None;
                }
                Some(TextUnit {
                    text: cleaned,
                    metadata: serde_json::json!({
                        "source": filename,
                        "filename": filename,
                        "page": index + 1,
                    }),
                })
            })
            .collect();

        debug!("Extracted {} non-empty pages from {}", units.len(), filename);

        Ok(units)
    }
}

/// Clean up extracted PDF text: trim line whitespace and collapse runs of
/// blank lines.
fn clean_pdf_text(text: &str) -> String {
    text.lines()
        .map(|line| line.trim())
        .fold(Vec::new(), |mut acc, line| {
            let last_was_empty = acc.last().map(|s: &String| s.is_empty()).unwrap_or(false);
            if !(line.is_empty() && last_was_empty) {
                acc.push(line.to_string());
            }
            acc
        })
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_pdf_text() {
        let messy = "  Hello  \n\n\n\nWorld  \n\nTest";
        let cleaned = clean_pdf_text(messy);
        assert!(!cleaned.contains("\n\n\n"));
        assert!(cleaned.starts_with("Hello"));
    }

    #[test]
    fn test_invalid_pdf_is_a_parse_error() {
        let loader = PdfLoader::new();
        let result = loader.load(b"this is not a pdf", "bad.pdf");
        assert!(matches!(result, Err(IngestError::Parse { .. })));
    }
}
