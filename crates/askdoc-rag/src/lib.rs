//! Askdoc RAG - retrieval-augmented answer pipeline.
//!
//! Turns a user prompt plus conversation history into a retrieved context, a
//! (streamed) model response, and a persisted, attributable conversation
//! turn.

mod error;
mod pipeline;
mod prompt;

pub use error::{RagError, RagResult};
pub use pipeline::{Answer, RagConfig, RagPipeline};
pub use prompt::{build_messages, build_user_prompt};
