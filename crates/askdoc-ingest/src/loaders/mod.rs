//! Document loaders for supported upload formats.

mod markdown;
mod pdf;
mod text;

pub use markdown::MarkdownLoader;
pub use pdf::PdfLoader;
pub use text::TextLoader;

use crate::error::{IngestError, IngestResult};

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    PlainText,
    Markdown,
}

impl FileKind {
    /// Classify an upload by declared MIME type first, filename extension as
    /// fallback. Adding a format means adding a variant here and a loader
    /// implementing it; the dispatch itself never changes.
    pub fn classify(mime_type: &str, filename: &str) -> Option<Self> {
        match mime_type {
            "application/pdf" => return Some(FileKind::Pdf),
            "text/plain" => return Some(FileKind::PlainText),
            "text/markdown" => return Some(FileKind::Markdown),
            _ => {}
        }

        let extension = filename
            .rsplit('.')
            .next()
            .map(|ext| ext.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Some(FileKind::Pdf),
            "txt" => Some(FileKind::PlainText),
            "md" | "markdown" => Some(FileKind::Markdown),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Pdf => "pdf",
            FileKind::PlainText => "text",
            FileKind::Markdown => "markdown",
        }
    }
}

/// One extracted unit of text with its metadata: a PDF page, or the whole
/// buffer for text and markdown uploads.
#[derive(Debug, Clone)]
pub struct TextUnit {
    pub text: String,
    pub metadata: serde_json::Value,
}

/// Trait for format-specific loaders.
pub trait DocumentLoader: Send + Sync {
    /// Extract text units from raw file bytes.
    fn load(&self, bytes: &[u8], filename: &str) -> IngestResult<Vec<TextUnit>>;
}

fn loader_for(kind: FileKind) -> Box<dyn DocumentLoader> {
    match kind {
        FileKind::Pdf => Box::new(PdfLoader::new()),
        FileKind::PlainText => Box::new(TextLoader::new()),
        FileKind::Markdown => Box::new(MarkdownLoader::new()),
    }
}

/// Validate and load an upload into text units.
///
/// The size limit is checked before anything touches the bytes, and the
/// format is resolved before any parsing is attempted.
pub fn load_document(
    bytes: &[u8],
    filename: &str,
    mime_type: &str,
    max_bytes: usize,
) -> IngestResult<Vec<TextUnit>> {
    if bytes.len() > max_bytes {
        return Err(IngestError::FileTooLarge {
            size: bytes.len(),
            limit_mb: max_bytes / (1024 * 1024),
        });
    }

    let kind = FileKind::classify(mime_type, filename).ok_or_else(|| {
        IngestError::UnsupportedFormat(if mime_type.is_empty() {
            filename.to_string()
        } else {
            mime_type.to_string()
        })
    })?;

    loader_for(kind).load(bytes, filename)
}

/// Read the file bytes as UTF-8, rejecting blank content.
fn decode_utf8(bytes: &[u8], filename: &str) -> IngestResult<String> {
    let content = std::str::from_utf8(bytes).map_err(|e| IngestError::Parse {
        filename: filename.to_string(),
        message: format!("not valid UTF-8: {}", e),
    })?;

    if content.trim().is_empty() {
        return Err(IngestError::EmptyContent);
    }

    Ok(content.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_mime_type() {
        assert_eq!(
            FileKind::classify("application/pdf", "whatever.bin"),
            Some(FileKind::Pdf)
        );
        assert_eq!(
            FileKind::classify("text/plain", "notes"),
            Some(FileKind::PlainText)
        );
        assert_eq!(
            FileKind::classify("text/markdown", "readme"),
            Some(FileKind::Markdown)
        );
    }

    #[test]
    fn test_classify_falls_back_to_extension() {
        assert_eq!(
            FileKind::classify("application/octet-stream", "paper.PDF"),
            Some(FileKind::Pdf)
        );
        assert_eq!(FileKind::classify("", "notes.txt"), Some(FileKind::PlainText));
        assert_eq!(FileKind::classify("", "readme.md"), Some(FileKind::Markdown));
        assert_eq!(
            FileKind::classify("", "readme.markdown"),
            Some(FileKind::Markdown)
        );
    }

    #[test]
    fn test_classify_mime_takes_precedence() {
        // Declared type wins even when the extension disagrees
        assert_eq!(
            FileKind::classify("text/plain", "notes.md"),
            Some(FileKind::PlainText)
        );
    }

    #[test]
    fn test_classify_rejects_unknown() {
        assert_eq!(FileKind::classify("application/zip", "archive.zip"), None);
        assert_eq!(FileKind::classify("", "noextension"), None);
    }

    #[test]
    fn test_unsupported_format_error() {
        let result = load_document(b"data", "archive.zip", "application/zip", 1024);
        assert!(matches!(result, Err(IngestError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_oversize_rejected_before_parsing() {
        // Invalid PDF bytes: if parsing were attempted it would fail with a
        // parse error, so the size error proves the check runs first.
        let bytes = vec![0u8; 2048];
        let result = load_document(&bytes, "big.pdf", "application/pdf", 1024);
        assert!(matches!(result, Err(IngestError::FileTooLarge { .. })));
    }

    #[test]
    fn test_blank_text_file_rejected() {
        let result = load_document(b"   \n  ", "empty.txt", "text/plain", 1024);
        assert!(matches!(result, Err(IngestError::EmptyContent)));
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let result = load_document(&[0xFF, 0xFE, 0x00], "bad.txt", "text/plain", 1024);
        assert!(matches!(result, Err(IngestError::Parse { .. })));
    }
}
