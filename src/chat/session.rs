//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the
//! conversation history and drives streaming turns against the API.

use crate::DashScope;
use crate::chat::config::ChatConfig;
use crate::error::Result;
use crate::render::Renderer;
use crate::streaming;
use crate::types::{GenerationChunk, GenerationRequest, Message, Model, Usage};

/// A chat session that manages conversation state and API interactions.
///
/// The session maintains the ordered message history and issues at most
/// one request at a time: a turn runs to completion or failure before the
/// next line of input is accepted. A failed turn is rolled back entirely,
/// so no half-turn ever survives in the history.
pub struct ChatSession {
    client: DashScope,
    config: ChatConfig,
    messages: Vec<Message>,
    usage_totals: Usage,
    last_turn_usage: Option<Usage>,
    last_request_id: Option<String>,
    request_count: u64,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// The model used for the session.
    pub model: Model,
    /// The number of messages in the conversation.
    pub message_count: usize,
    /// Whether verbose token reporting is enabled.
    pub verbose: bool,
    /// Total input tokens across all requests.
    pub total_input_tokens: u64,
    /// Total output tokens across all requests.
    pub total_output_tokens: u64,
    /// Total number of API requests made.
    pub total_requests: u64,
    /// Token usage for the last turn, if available.
    pub last_turn_usage: Option<Usage>,
    /// The request id of the last turn, if available.
    pub last_request_id: Option<String>,
}

impl ChatSession {
    /// Creates a new chat session with the given client and configuration.
    pub fn new(client: DashScope, config: ChatConfig) -> Self {
        Self {
            client,
            config,
            messages: Vec::new(),
            usage_totals: Usage::new(0, 0),
            last_turn_usage: None,
            last_request_id: None,
            request_count: 0,
        }
    }

    /// Sends a user message and streams the response.
    ///
    /// This method:
    /// 1. Adds the user message to history
    /// 2. Sends a streaming request carrying the full history
    /// 3. Renders response deltas as they arrive
    /// 4. Adds the complete assistant response to history
    ///
    /// # Errors
    ///
    /// Returns an error if the request or the stream fails; the history
    /// is rolled back to its state before the turn.
    pub async fn send_streaming(
        &mut self,
        user_input: &str,
        renderer: &mut dyn Renderer,
    ) -> Result<()> {
        let previous_len = self.messages.len();
        self.messages.push(Message::user(user_input));

        match self.drive_turn(renderer).await {
            Ok(chunk) => {
                self.messages
                    .push(Message::assistant(chunk.text().to_string()));
                self.record_turn(&chunk);
                Ok(())
            }
            Err(err) => {
                self.messages.truncate(previous_len);
                Err(err)
            }
        }
    }

    async fn drive_turn(&mut self, renderer: &mut dyn Renderer) -> Result<GenerationChunk> {
        let request = GenerationRequest::new(self.config.model.clone(), self.messages.clone());
        let events = self.client.stream(request).await?;
        streaming::accumulate(events, renderer).await
    }

    fn record_turn(&mut self, chunk: &GenerationChunk) {
        self.request_count = self.request_count.saturating_add(1);
        self.last_request_id = Some(chunk.request_id.clone());
        self.last_turn_usage = chunk.usage;
        if let Some(usage) = chunk.usage {
            self.usage_totals = self.usage_totals + usage;
        }
    }

    /// Clears the conversation history.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Returns the number of messages in the conversation.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Returns the conversation history, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Changes the model used for responses.
    pub fn set_model(&mut self, model: Model) {
        self.config.model = model;
    }

    /// Returns the current model.
    pub fn model(&self) -> &Model {
        &self.config.model
    }

    /// Replaces the API key by rebuilding the client.
    pub fn set_api_key(&mut self, api_key: String) -> Result<()> {
        self.client = DashScope::new(Some(api_key))?;
        Ok(())
    }

    /// Sets verbose token reporting.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.config.verbose = verbose;
    }

    /// Returns whether verbose token reporting is enabled.
    pub fn verbose(&self) -> bool {
        self.config.verbose
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            model: self.config.model.clone(),
            message_count: self.message_count(),
            verbose: self.config.verbose,
            total_input_tokens: tokens_to_u64(self.usage_totals.input_tokens),
            total_output_tokens: tokens_to_u64(self.usage_totals.output_tokens),
            total_requests: self.request_count,
            last_turn_usage: self.last_turn_usage,
            last_request_id: self.last_request_id.clone(),
        }
    }
}

fn tokens_to_u64(value: i32) -> u64 {
    value.max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KnownModel;

    fn test_session() -> ChatSession {
        let client = DashScope::new(Some("test-key".to_string())).unwrap();
        let config = ChatConfig::new(Model::Known(KnownModel::QwenTurbo));
        ChatSession::new(client, config)
    }

    #[test]
    fn new_session_empty() {
        let session = test_session();
        assert_eq!(session.message_count(), 0);
        assert!(session.messages().is_empty());
    }

    #[test]
    fn clear_session_is_idempotent() {
        let mut session = test_session();

        // Manually add messages for testing
        session.messages.push(Message::user("hello"));
        session.messages.push(Message::assistant("hi"));
        assert_eq!(session.message_count(), 2);

        session.clear();
        assert_eq!(session.message_count(), 0);

        session.clear();
        assert_eq!(session.message_count(), 0);
    }

    #[test]
    fn set_model() {
        let mut session = test_session();
        assert_eq!(session.model(), &Model::Known(KnownModel::QwenTurbo));

        session.set_model(Model::Known(KnownModel::QwenMax));
        assert_eq!(session.model(), &Model::Known(KnownModel::QwenMax));
    }

    #[test]
    fn set_verbose() {
        let mut session = test_session();
        assert!(!session.verbose());
        session.set_verbose(true);
        assert!(session.verbose());
    }

    #[tokio::test]
    async fn failed_turn_rolls_back_history() {
        // Nothing listens on the discard port, so the turn fails before
        // any response arrives.
        let client = DashScope::with_options(
            Some("test-key".to_string()),
            Some("http://127.0.0.1:9/".to_string()),
            Some(std::time::Duration::from_millis(250)),
        )
        .unwrap();
        let config = ChatConfig::new(Model::Known(KnownModel::QwenTurbo));
        let mut session = ChatSession::new(client, config);
        let mut renderer = NullRenderer;

        let result = session.send_streaming("hello", &mut renderer).await;
        assert!(result.is_err());
        assert_eq!(session.message_count(), 0);
        assert!(session.messages().is_empty());
    }

    struct NullRenderer;

    impl Renderer for NullRenderer {
        fn print_text(&mut self, _text: &str) {}
        fn print_info(&mut self, _info: &str) {}
        fn print_verbose(&mut self, _info: &str) {}
        fn print_error(&mut self, _error: &str) {}
        fn finish_response(&mut self) {}
    }

    #[test]
    fn record_turn_accumulates_usage() {
        let mut session = test_session();
        let chunk: GenerationChunk = serde_json::from_value(serde_json::json!({
            "output": {"text": "hi", "finish_reason": "stop"},
            "usage": {"input_tokens": 7, "output_tokens": 3},
            "request_id": "req-1",
        }))
        .unwrap();

        session.record_turn(&chunk);
        session.record_turn(&chunk);

        let stats = session.stats();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.total_input_tokens, 14);
        assert_eq!(stats.total_output_tokens, 6);
        assert_eq!(stats.last_request_id.as_deref(), Some("req-1"));
        assert_eq!(stats.last_turn_usage.unwrap().total(), 10);
    }
}
