//! The answer pipeline: retrieve, generate, persist.

use crate::error::{RagError, RagResult};
use crate::prompt;
use askdoc_core::{
    CompletionClient, ConversationId, ConversationMessage, EmbeddingClient, RetrievedDocument,
    StreamEvent, VectorIndex,
};
use askdoc_db::ConversationStore;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Configuration for answer turns.
#[derive(Debug, Clone)]
pub struct RagConfig {
    /// Number of context chunks retrieved per question.
    pub top_k: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self { top_k: 4 }
    }
}

/// Result of a non-streaming answer turn.
#[derive(Debug, Clone)]
pub struct Answer {
    pub conversation_id: ConversationId,
    pub message: ConversationMessage,
    pub sources: Vec<RetrievedDocument>,
}

/// Composes retrieval, completion, and conversation persistence.
///
/// Owns prompt construction, streaming aggregation, and turn persistence.
/// Conversation messages are appended exclusively here.
#[derive(Clone)]
pub struct RagPipeline {
    embeddings: Arc<dyn EmbeddingClient>,
    index: Arc<dyn VectorIndex>,
    completions: Arc<dyn CompletionClient>,
    conversations: Arc<ConversationStore>,
    config: RagConfig,
}

impl RagPipeline {
    pub fn new(
        embeddings: Arc<dyn EmbeddingClient>,
        index: Arc<dyn VectorIndex>,
        completions: Arc<dyn CompletionClient>,
        conversations: Arc<ConversationStore>,
        config: RagConfig,
    ) -> Self {
        Self {
            embeddings,
            index,
            completions,
            conversations,
            config,
        }
    }

    /// Retrieve the most relevant chunks for a prompt.
    pub async fn retrieve(&self, prompt: &str) -> RagResult<Vec<RetrievedDocument>> {
        let vector = self.embeddings.embed(prompt).await?;
        let documents = self.index.query(&vector, self.config.top_k).await?;
        debug!("Retrieved {} documents", documents.len());
        Ok(documents)
    }

    /// Answer a prompt in one shot.
    ///
    /// Same turn semantics as [`answer_stream`]: the user message is
    /// persisted before generation, the assistant message after it.
    ///
    /// [`answer_stream`]: RagPipeline::answer_stream
    pub async fn answer(&self, prompt: &str, conversation_id: Option<&str>) -> RagResult<Answer> {
        if prompt.trim().is_empty() {
            return Err(RagError::EmptyPrompt);
        }

        let conversation = self.conversations.get_or_create(conversation_id);
        let history = conversation.messages;

        let sources = self.retrieve(prompt).await?;
        self.conversations
            .append(&conversation.id, ConversationMessage::user(prompt));

        let messages = prompt::build_messages(&history, prompt, &sources);
        let content = self.completions.complete(&messages).await?;

        let message = ConversationMessage::assistant(content.trim(), sources.clone());
        self.conversations.append(&conversation.id, message.clone());
        info!("Completed turn for conversation {}", conversation.id);

        Ok(Answer {
            conversation_id: conversation.id,
            message,
            sources,
        })
    }

    /// Answer a prompt as a stream of events.
    ///
    /// Event order: the conversation id first (always, and before any
    /// generation so the caller can correlate later turns even if this one
    /// fails), then one `content` event per fragment, then `sources` last.
    /// Any failure produces exactly one terminal `error` event instead.
    /// Dropping the receiver cancels the in-flight completion; a cancelled
    /// turn keeps its user message but never persists a partial assistant
    /// message.
    pub fn answer_stream(
        &self,
        prompt: String,
        conversation_id: Option<String>,
    ) -> mpsc::Receiver<StreamEvent> {
        let (tx, rx) = mpsc::channel(32);
        let pipeline = self.clone();

        tokio::spawn(async move {
            if prompt.trim().is_empty() {
                let _ = tx
                    .send(StreamEvent::Error(RagError::EmptyPrompt.to_string()))
                    .await;
                return;
            }

            let conversation = pipeline.conversations.get_or_create(conversation_id.as_deref());
            let id = conversation.id.clone();
            let history = conversation.messages;

            if tx
                .send(StreamEvent::ConversationId(id.clone()))
                .await
                .is_err()
            {
                return;
            }

            if let Err(e) = pipeline.run_turn(&id, history, &prompt, &tx).await {
                let _ = tx.send(StreamEvent::Error(e.to_string())).await;
            }
        });

        rx
    }

    async fn run_turn(
        &self,
        conversation_id: &str,
        history: Vec<ConversationMessage>,
        prompt: &str,
        tx: &mpsc::Sender<StreamEvent>,
    ) -> RagResult<()> {
        let sources = self.retrieve(prompt).await?;

        // Persisted before generation so a crash mid-stream still leaves a
        // record of what was asked.
        self.conversations
            .append(conversation_id, ConversationMessage::user(prompt));

        let messages = prompt::build_messages(&history, prompt, &sources);
        let mut stream = self.completions.complete_stream(&messages).await?;

        let mut answer = String::new();
        while let Some(fragment) = stream.recv().await {
            let fragment = fragment?;
            if fragment.is_empty() {
                continue;
            }

            answer.push_str(&fragment);
            if tx.send(StreamEvent::Content(fragment)).await.is_err() {
                // Consumer is gone: stop reading (dropping the stream aborts
                // the request) and persist nothing further.
                debug!("Answer stream cancelled for conversation {}", conversation_id);
                return Ok(());
            }
        }

        let message = ConversationMessage::assistant(answer, sources.clone());
        self.conversations.append(conversation_id, message);
        info!("Completed turn for conversation {}", conversation_id);

        let _ = tx.send(StreamEvent::Sources(sources)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askdoc_core::{
        ChatMessage, ChatRole, ClientError, CompletionStream, IndexPoint, MessageRole,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockEmbedder;

    #[async_trait]
    impl EmbeddingClient for MockEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, ClientError> {
            Ok(vec![1.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ClientError> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }
    }

    struct MockIndex {
        results: Vec<RetrievedDocument>,
    }

    impl MockIndex {
        fn with_results(results: Vec<RetrievedDocument>) -> Arc<Self> {
            Arc::new(Self { results })
        }
    }

    #[async_trait]
    impl VectorIndex for MockIndex {
        async fn upsert(&self, _points: &[IndexPoint]) -> Result<(), ClientError> {
            Ok(())
        }

        async fn query(
            &self,
            _vector: &[f32],
            _top_k: usize,
        ) -> Result<Vec<RetrievedDocument>, ClientError> {
            Ok(self.results.clone())
        }

        async fn delete(&self, _ids: &[String]) -> Result<(), ClientError> {
            Ok(())
        }
    }

    /// Scripted completion: replays its fragments, recording every request.
    struct MockCompletion {
        fragments: Vec<Result<String, ClientError>>,
        requests: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl MockCompletion {
        fn with_fragments(fragments: Vec<Result<String, ClientError>>) -> Arc<Self> {
            Arc::new(Self {
                fragments,
                requests: Mutex::new(Vec::new()),
            })
        }

        fn last_request(&self) -> Vec<ChatMessage> {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl CompletionClient for MockCompletion {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ClientError> {
            self.requests.lock().unwrap().push(messages.to_vec());
            let mut full = String::new();
            for fragment in &self.fragments {
                full.push_str(fragment.as_ref().map_err(|e| e.clone())?);
            }
            Ok(full)
        }

        async fn complete_stream(
            &self,
            messages: &[ChatMessage],
        ) -> Result<CompletionStream, ClientError> {
            self.requests.lock().unwrap().push(messages.to_vec());
            let (tx, rx) = mpsc::channel(8);
            let fragments = self.fragments.clone();
            tokio::spawn(async move {
                for fragment in fragments {
                    if tx.send(fragment).await.is_err() {
                        return;
                    }
                }
            });
            Ok(rx)
        }
    }

    fn docs() -> Vec<RetrievedDocument> {
        vec![
            RetrievedDocument {
                id: "d1-chunk-0".to_string(),
                content: "Rust is a systems language.".to_string(),
                metadata: serde_json::json!({"filename": "rust.md"}),
                score: 0.91,
            },
            RetrievedDocument {
                id: "d1-chunk-1".to_string(),
                content: "It has no garbage collector.".to_string(),
                metadata: serde_json::json!({"filename": "rust.md"}),
                score: 0.84,
            },
        ]
    }

    fn pipeline(
        index: Arc<MockIndex>,
        completions: Arc<MockCompletion>,
    ) -> (RagPipeline, Arc<ConversationStore>) {
        let conversations = Arc::new(ConversationStore::new());
        let pipeline = RagPipeline::new(
            Arc::new(MockEmbedder),
            index,
            completions,
            conversations.clone(),
            RagConfig::default(),
        );
        (pipeline, conversations)
    }

    async fn collect(mut rx: mpsc::Receiver<StreamEvent>) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_full_turn_event_order_and_persistence() {
        let completions = MockCompletion::with_fragments(vec![
            Ok("Hello ".to_string()),
            Ok("world".to_string()),
        ]);
        let (pipeline, conversations) =
            pipeline(MockIndex::with_results(docs()), completions);

        let events = collect(pipeline.answer_stream("What is Rust?".to_string(), None)).await;

        assert_eq!(events.len(), 4);
        let conversation_id = match &events[0] {
            StreamEvent::ConversationId(id) => id.clone(),
            other => panic!("expected conversationId first, got {:?}", other),
        };
        assert_eq!(events[1], StreamEvent::Content("Hello ".to_string()));
        assert_eq!(events[2], StreamEvent::Content("world".to_string()));
        match &events[3] {
            StreamEvent::Sources(sources) => assert_eq!(sources.len(), 2),
            other => panic!("expected sources last, got {:?}", other),
        }

        let conversation = conversations.get(&conversation_id).unwrap();
        assert_eq!(conversation.messages.len(), 2);
        assert_eq!(conversation.messages[0].role, MessageRole::User);
        assert_eq!(conversation.messages[0].content, "What is Rust?");
        assert_eq!(conversation.messages[1].role, MessageRole::Assistant);
        assert_eq!(conversation.messages[1].content, "Hello world");
        assert_eq!(
            conversation.messages[1].sources.as_ref().unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn test_midstream_failure_emits_one_error_and_persists_no_answer() {
        let completions = MockCompletion::with_fragments(vec![
            Ok("partial".to_string()),
            Err(ClientError::Connection("reset".to_string())),
        ]);
        let (pipeline, conversations) =
            pipeline(MockIndex::with_results(docs()), completions);

        let events = collect(pipeline.answer_stream("Question".to_string(), None)).await;

        // conversationId, the partial delta, then exactly one error; no sources
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], StreamEvent::ConversationId(_)));
        assert_eq!(events[1], StreamEvent::Content("partial".to_string()));
        assert!(matches!(events[2], StreamEvent::Error(_)));

        let id = match &events[0] {
            StreamEvent::ConversationId(id) => id.clone(),
            _ => unreachable!(),
        };
        let conversation = conversations.get(&id).unwrap();
        assert_eq!(conversation.messages.len(), 1);
        assert_eq!(conversation.messages[0].role, MessageRole::User);
    }

    #[tokio::test]
    async fn test_empty_prompt_is_a_single_error_event_with_no_side_effects() {
        let completions = MockCompletion::with_fragments(vec![]);
        let (pipeline, conversations) =
            pipeline(MockIndex::with_results(docs()), completions);

        let events = collect(pipeline.answer_stream("   ".to_string(), None)).await;

        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], StreamEvent::Error(_)));
        assert!(conversations.is_empty());
    }

    #[tokio::test]
    async fn test_empty_retrieval_uses_placeholder_context() {
        let completions =
            MockCompletion::with_fragments(vec![Ok("I don't know.".to_string())]);
        let (pipeline, _conversations) =
            pipeline(MockIndex::with_results(vec![]), completions.clone());

        let events = collect(pipeline.answer_stream("Anything?".to_string(), None)).await;
        match events.last().unwrap() {
            StreamEvent::Sources(sources) => assert!(sources.is_empty()),
            other => panic!("expected sources last, got {:?}", other),
        }

        let request = completions.last_request();
        let user_turn = request.last().unwrap();
        assert!(user_turn.content.contains("No relevant documents found."));
    }

    #[tokio::test]
    async fn test_history_is_replayed_as_role_tagged_turns() {
        let completions = MockCompletion::with_fragments(vec![Ok("Again.".to_string())]);
        let (pipeline, conversations) =
            pipeline(MockIndex::with_results(docs()), completions.clone());

        let conversation = conversations.create();
        conversations.append(&conversation.id, ConversationMessage::user("First question"));
        conversations.append(
            &conversation.id,
            ConversationMessage::assistant("First answer", vec![]),
        );

        let events = collect(
            pipeline.answer_stream("Second question".to_string(), Some(conversation.id.clone())),
        )
        .await;
        assert_eq!(
            events[0],
            StreamEvent::ConversationId(conversation.id.clone())
        );

        let request = completions.last_request();
        assert_eq!(request.len(), 4);
        assert_eq!(request[0].role, ChatRole::System);
        assert_eq!(request[1].content, "First question");
        assert_eq!(request[2].role, ChatRole::Assistant);
        assert_eq!(request[2].content, "First answer");
        assert!(request[3].content.contains("Second question"));

        let conversation = conversations.get(&conversation.id).unwrap();
        assert_eq!(conversation.messages.len(), 4);
    }

    #[tokio::test]
    async fn test_unknown_conversation_id_starts_a_new_conversation() {
        let completions = MockCompletion::with_fragments(vec![Ok("Hi.".to_string())]);
        let (pipeline, _conversations) =
            pipeline(MockIndex::with_results(vec![]), completions);

        let events = collect(
            pipeline.answer_stream("Hello?".to_string(), Some("no-such-id".to_string())),
        )
        .await;

        match &events[0] {
            StreamEvent::ConversationId(id) => assert_ne!(id, "no-such-id"),
            other => panic!("expected conversationId first, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancellation_persists_no_assistant_message() {
        // A stream that never finishes on its own
        struct StallingCompletion {
            requests: Mutex<Vec<Vec<ChatMessage>>>,
        }

        #[async_trait]
        impl CompletionClient for StallingCompletion {
            async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, ClientError> {
                unreachable!("streaming test")
            }

            async fn complete_stream(
                &self,
                messages: &[ChatMessage],
            ) -> Result<CompletionStream, ClientError> {
                self.requests.lock().unwrap().push(messages.to_vec());
                let (tx, rx) = mpsc::channel(1);
                tokio::spawn(async move {
                    loop {
                        if tx.send(Ok("tick ".to_string())).await.is_err() {
                            return;
                        }
                    }
                });
                Ok(rx)
            }
        }

        let conversations = Arc::new(ConversationStore::new());
        let pipeline = RagPipeline::new(
            Arc::new(MockEmbedder),
            MockIndex::with_results(docs()),
            Arc::new(StallingCompletion {
                requests: Mutex::new(Vec::new()),
            }),
            conversations.clone(),
            RagConfig::default(),
        );

        let mut rx = pipeline.answer_stream("Long question".to_string(), None);

        let first = rx.recv().await.unwrap();
        let id = match first {
            StreamEvent::ConversationId(id) => id,
            other => panic!("expected conversationId first, got {:?}", other),
        };
        // Read one delta, then hang up
        assert!(matches!(rx.recv().await, Some(StreamEvent::Content(_))));
        drop(rx);

        // Give the pipeline task a moment to observe the closed channel
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let conversation = conversations.get(&id).unwrap();
        assert_eq!(conversation.messages.len(), 1);
        assert_eq!(conversation.messages[0].role, MessageRole::User);
    }

    #[tokio::test]
    async fn test_batch_answer_matches_stream_semantics() {
        let completions = MockCompletion::with_fragments(vec![
            Ok("Hello ".to_string()),
            Ok("world".to_string()),
        ]);
        let (pipeline, conversations) =
            pipeline(MockIndex::with_results(docs()), completions);

        let answer = pipeline.answer("What is Rust?", None).await.unwrap();

        assert_eq!(answer.message.content, "Hello world");
        assert_eq!(answer.sources.len(), 2);

        let conversation = conversations.get(&answer.conversation_id).unwrap();
        assert_eq!(conversation.messages.len(), 2);
        assert_eq!(conversation.messages[1].content, "Hello world");
    }

    #[tokio::test]
    async fn test_batch_answer_rejects_empty_prompt() {
        let completions = MockCompletion::with_fragments(vec![]);
        let (pipeline, conversations) =
            pipeline(MockIndex::with_results(vec![]), completions);

        let result = pipeline.answer("  ", None).await;
        assert!(matches!(result, Err(RagError::EmptyPrompt)));
        assert!(conversations.is_empty());
    }
}
