//! Integration tests for the DashScope library.
//! These tests require an API key in the environment to run.

#[cfg(test)]
mod tests {
    use dashscope::{
        DashScope, GenerationRequest, KnownModel, Message, Model, Renderer, streaming,
    };

    /// Renderer that discards output; the tests only care about the final chunk.
    struct NullRenderer;

    impl Renderer for NullRenderer {
        fn print_text(&mut self, _text: &str) {}
        fn print_info(&mut self, _message: &str) {}
        fn print_verbose(&mut self, _message: &str) {}
        fn print_error(&mut self, _message: &str) {}
        fn finish_response(&mut self) {}
    }

    #[tokio::test]
    async fn test_simple_generation_request() {
        // This test requires DASHSCOPE_API_KEY to be set
        let api_key = std::env::var("DASHSCOPE_API_KEY").ok();
        if api_key.is_none() {
            eprintln!("Skipping test: DASHSCOPE_API_KEY not set");
            return;
        }

        let client = DashScope::new(api_key).expect("Failed to create client");

        let request = GenerationRequest::new(
            Model::Known(KnownModel::QwenTurbo),
            vec![Message::user("Say 'test passed'")],
        );

        let response = client.send(request).await;
        assert!(
            response.is_ok(),
            "Request should succeed with valid API key"
        );
        let chunk = response.unwrap();
        assert!(!chunk.request_id.is_empty());
    }

    #[tokio::test]
    async fn test_streaming_response() {
        let api_key = std::env::var("DASHSCOPE_API_KEY").ok();
        if api_key.is_none() {
            eprintln!("Skipping test: DASHSCOPE_API_KEY not set");
            return;
        }

        let client = DashScope::new(api_key).expect("Failed to create client");

        let request = GenerationRequest::new(
            Model::Known(KnownModel::QwenTurbo),
            vec![Message::user("Count to 3")],
        );

        let events = client
            .stream(request)
            .await
            .expect("Stream request should succeed");
        let mut renderer = NullRenderer;
        let chunk = streaming::accumulate(events, &mut renderer)
            .await
            .expect("Stream should produce a final chunk");
        assert!(chunk.usage.is_some(), "Final chunk should report usage");
    }
}
