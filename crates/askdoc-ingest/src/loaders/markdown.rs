//! Markdown loader.

use super::{decode_utf8, DocumentLoader, TextUnit};
use crate::error::IngestResult;
use pulldown_cmark::{Event, HeadingLevel, Parser, Tag};

/// Loader for markdown uploads.
///
/// The raw buffer is kept as the unit text so retrieved chunks show the
/// document as written; the first H1 heading is recorded as the title.
pub struct MarkdownLoader;

impl MarkdownLoader {
    pub fn new() -> Self {
        Self
    }

    /// Extract the first H1 heading, if any.
    fn extract_title(markdown: &str) -> Option<String> {
        let parser = Parser::new(markdown);
        let mut in_h1 = false;
        let mut title = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::Heading(HeadingLevel::H1, _, _)) => {
                    in_h1 = true;
                }
                Event::End(Tag::Heading(HeadingLevel::H1, _, _)) => {
                    let trimmed = title.trim();
                    if !trimmed.is_empty() {
                        return Some(trimmed.to_string());
                    }
                    in_h1 = false;
                }
                Event::Text(t) | Event::Code(t) if in_h1 => {
                    title.push_str(&t);
                }
                _ => {}
            }
        }

        None
    }
}

impl Default for MarkdownLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentLoader for MarkdownLoader {
    fn load(&self, bytes: &[u8], filename: &str) -> IngestResult<Vec<TextUnit>> {
        let content = decode_utf8(bytes, filename)?;

        let mut metadata = serde_json::json!({
            "source": filename,
            "filename": filename,
            "format": "markdown",
        });
        if let Some(title) = Self::extract_title(&content) {
            metadata["title"] = serde_json::json!(title);
        }

        Ok(vec![TextUnit {
            text: content,
            metadata,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_from_first_h1() {
        let loader = MarkdownLoader::new();
        let units = loader
            .load(
                b"# My Document\n\nSome paragraph.\n\n# Second Heading\n",
                "doc.md",
            )
            .unwrap();

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].metadata["title"], "My Document");
        // The raw markdown is preserved
        assert!(units[0].text.starts_with("# My Document"));
    }

    #[test]
    fn test_no_h1_means_no_title() {
        let loader = MarkdownLoader::new();
        let units = loader
            .load(b"Just some text without a heading.", "doc.md")
            .unwrap();

        assert!(units[0].metadata.get("title").is_none());
    }
}
