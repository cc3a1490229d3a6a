//! Content chunking for retrieval.
//!
//! Splits text into fixed-size overlapping character windows suitable for
//! embedding and similarity search.

use crate::error::{IngestError, IngestResult};

/// Configuration for chunking.
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Size of each chunk in characters.
    pub chunk_size: usize,
    /// Number of characters shared between consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Content chunker for splitting text.
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkConfig,
}

impl Chunker {
    /// Create a new chunker. The overlap must be positive and strictly
    /// smaller than the chunk size.
    pub fn new(config: ChunkConfig) -> IngestResult<Self> {
        if config.chunk_size == 0 {
            return Err(IngestError::InvalidChunking(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if config.chunk_overlap == 0 || config.chunk_overlap >= config.chunk_size {
            return Err(IngestError::InvalidChunking(format!(
                "chunk_overlap must be between 1 and {} (exclusive)",
                config.chunk_size
            )));
        }
        Ok(Self { config })
    }

    /// Create a chunker with default configuration.
    pub fn default_chunker() -> Self {
        Self {
            config: ChunkConfig::default(),
        }
    }

    /// Split text into overlapping chunks, preserving character order.
    ///
    /// Blank input (after trimming) is an error. Input no longer than the
    /// chunk size yields exactly one chunk; the final chunk of longer input
    /// may be shorter than the chunk size. Walks characters, not bytes, so
    /// multi-byte text never splits inside a code point.
    pub fn split(&self, text: &str) -> IngestResult<Vec<String>> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(IngestError::EmptyContent);
        }

        let chars: Vec<char> = trimmed.chars().collect();
        let size = self.config.chunk_size;

        if chars.len() <= size {
            return Ok(vec![trimmed.to_string()]);
        }

        let stride = size - self.config.chunk_overlap;
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let end = usize::min(start + size, chars.len());
            chunks.push(chars[start..end].iter().collect());
            start += stride;
        }

        Ok(chunks)
    }

    /// The configured overlap, in characters.
    pub fn overlap(&self) -> usize {
        self.config.chunk_overlap
    }
}
