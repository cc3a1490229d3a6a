//! Askdoc Core - domain types, wire events, and client traits.

mod error;
mod events;
mod traits;
mod types;

pub use error::ClientError;
pub use events::{ndjson_line, IngestEvent, IngestStage, StreamEvent};
pub use traits::{
    CompletionClient, CompletionStream, EmbeddingClient, IndexPoint, VectorIndex,
};
pub use types::*;
