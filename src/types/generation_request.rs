use serde::{Deserialize, Serialize};

use crate::types::{Message, Model};

/// The `input` envelope of a generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationInput {
    /// The full conversation history, oldest first.
    pub messages: Vec<Message>,
}

/// Parameters for a text-generation request.
///
/// Each user turn sends the complete message history plus the selected
/// model; the service does not retain conversation state between calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The model that should generate the response.
    pub model: Model,

    /// The conversation input.
    pub input: GenerationInput,
}

impl GenerationRequest {
    /// Creates a new request for the given model and message history.
    pub fn new(model: Model, messages: Vec<Message>) -> Self {
        Self {
            model,
            input: GenerationInput { messages },
        }
    }
}
