use serde::{Deserialize, Serialize};

use crate::types::{FinishReason, Usage};

/// The `output` envelope of a generation response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutput {
    /// The response text so far.
    ///
    /// In a streamed response this is cumulative, not a delta: the server
    /// resends the full text generated so far with every event, and each
    /// value must extend the previous one under prefix order.
    pub text: String,

    /// Why generation stopped, or [`FinishReason::Null`] while it is
    /// still in progress.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
}

/// One decoded unit of a generation response.
///
/// A non-streaming call yields exactly one of these; a streamed call
/// yields a sequence of them of which the last carries the complete text
/// and the usage accounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationChunk {
    /// The generated output.
    pub output: GenerationOutput,

    /// Token accounting, when the model reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,

    /// Server-assigned identifier for the request.
    pub request_id: String,
}

impl GenerationChunk {
    /// The response text carried by this chunk.
    pub fn text(&self) -> &str {
        &self.output.text
    }

    /// Returns true if this chunk carries the terminal stop sentinel.
    pub fn is_stop(&self) -> bool {
        self.output
            .finish_reason
            .is_some_and(|reason| reason.is_stop())
    }
}
