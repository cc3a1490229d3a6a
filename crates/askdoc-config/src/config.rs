//! Configuration structures and loading.

use crate::error::{ConfigError, ConfigResult};
use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ollama: OllamaConfig,

    #[serde(default)]
    pub pinecone: PineconeConfig,

    #[serde(default)]
    pub chunking: ChunkingConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub limits: LimitsConfig,
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> ConfigResult<Self> {
        let paths = AppPaths::new().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&paths.config_file)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &PathBuf) -> ConfigResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Create a default config file with comments.
    pub fn create_default_file(path: &PathBuf) -> ConfigResult<()> {
        let default_config = Self::default_config_string();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, default_config)?;
        Ok(())
    }

    /// Check invariants the pipelines rely on.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.chunking.chunk_size == 0 {
            return Err(ConfigError::Invalid(
                "chunking.chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.chunking.chunk_overlap == 0 || self.chunking.chunk_overlap >= self.chunking.chunk_size
        {
            return Err(ConfigError::Invalid(format!(
                "chunking.chunk_overlap must be between 1 and {} (exclusive)",
                self.chunking.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(ConfigError::Invalid(
                "retrieval.top_k must be at least 1".to_string(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::Invalid(
                "limits.max_file_size_mb must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Generate a default config file with helpful comments.
    pub fn default_config_string() -> String {
        r#"# Askdoc Configuration
# Ask questions answered from your own documents.

[ollama]
# Ollama server address
host = "http://localhost:11434"

# Default model for answering questions
model = "llama3.1:8b"

# Model for generating embeddings
embedding_model = "nomic-embed-text"

# Request timeout in seconds
timeout_seconds = 120

[pinecone]
# Vector index endpoint
host = "http://localhost:5080"

# API key sent as the Api-Key header (leave empty for unauthenticated local indexes)
api_key = ""

# Optional namespace to scope all index operations
# namespace = "askdoc"

# Request timeout in seconds
timeout_seconds = 30

[chunking]
# Characters per chunk
chunk_size = 1000

# Overlapping characters between consecutive chunks
chunk_overlap = 200

[retrieval]
# Number of context chunks retrieved per question
top_k = 4

[limits]
# Maximum upload size in MiB; larger files are rejected before parsing
max_file_size_mb = 10
"#
        .to_string()
    }
}

/// Ollama LLM settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub host: String,
    pub model: String,
    pub embedding_model: String,
    pub timeout_seconds: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            model: "llama3.1:8b".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            timeout_seconds: 120,
        }
    }
}

/// Vector index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PineconeConfig {
    pub host: String,
    pub api_key: String,
    pub namespace: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for PineconeConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:5080".to_string(),
            api_key: String::new(),
            namespace: None,
            timeout_seconds: 30,
        }
    }
}

/// Text chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 4 }
    }
}

/// Input limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_file_size_mb: usize,
}

impl LimitsConfig {
    /// The limit in bytes.
    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_mb * 1024 * 1024
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ollama.host, "http://localhost:11434");
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.chunk_overlap, 200);
        assert_eq!(config.retrieval.top_k, 4);
        assert_eq!(config.limits.max_file_size_mb, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(config.ollama.host, deserialized.ollama.host);
        assert_eq!(config.pinecone.host, deserialized.pinecone.host);
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
            [ollama]
            model = "mistral"

            [retrieval]
            top_k = 8
            "#
        )
        .unwrap();

        let path = temp_file.path().to_path_buf();
        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.ollama.model, "mistral");
        assert_eq!(config.retrieval.top_k, 8);
        // Defaults should still apply
        assert_eq!(config.ollama.host, "http://localhost:11434");
    }

    #[test]
    fn test_validate_rejects_bad_overlap() {
        let mut config = Config::default();
        config.chunking.chunk_overlap = config.chunking.chunk_size;
        assert!(config.validate().is_err());

        config.chunking.chunk_overlap = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_config_string_parses() {
        let config: Config = toml::from_str(&Config::default_config_string()).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_max_file_size_bytes() {
        let limits = LimitsConfig::default();
        assert_eq!(limits.max_file_size_bytes(), 10 * 1024 * 1024);
    }
}
