//! Plain text loader.

use super::{decode_utf8, DocumentLoader, TextUnit};
use crate::error::IngestResult;

/// Loader for plain text uploads. The whole buffer becomes one unit.
pub struct TextLoader;

impl TextLoader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentLoader for TextLoader {
    fn load(&self, bytes: &[u8], filename: &str) -> IngestResult<Vec<TextUnit>> {
        let content = decode_utf8(bytes, filename)?;

        Ok(vec![TextUnit {
            text: content,
            metadata: serde_json::json!({
                "source": filename,
                "filename": filename,
            }),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_buffer_is_one_unit() {
        let loader = TextLoader::new();
        let units = loader
            .load(b"First line.\nSecond line.\n", "notes.txt")
            .unwrap();

        assert_eq!(units.len(), 1);
        assert!(units[0].text.contains("Second line."));
        assert_eq!(units[0].metadata["filename"], "notes.txt");
    }
}
