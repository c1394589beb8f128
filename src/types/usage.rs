use serde::{Deserialize, Serialize};

/// Token accounting for a single generation.
///
/// DashScope bills by token counts. Some models omit `total_tokens`, so
/// [`Usage::total`] falls back to summing the parts.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    /// The number of input tokens consumed by the prompt.
    pub input_tokens: i32,

    /// The number of output tokens generated.
    pub output_tokens: i32,

    /// The combined token count, when the model reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<i32>,
}

impl Usage {
    /// Create a new `Usage` with the given input and output tokens.
    pub fn new(input_tokens: i32, output_tokens: i32) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: None,
        }
    }

    /// Set the total token count.
    pub fn with_total_tokens(mut self, tokens: i32) -> Self {
        self.total_tokens = Some(tokens);
        self
    }

    /// The total token count, computed from the parts when the model did
    /// not report one.
    pub fn total(&self) -> i32 {
        self.total_tokens
            .unwrap_or(self.input_tokens + self.output_tokens)
    }
}

impl std::ops::Add for Usage {
    type Output = Usage;

    fn add(self, rhs: Usage) -> Usage {
        Usage {
            input_tokens: self.input_tokens + rhs.input_tokens,
            output_tokens: self.output_tokens + rhs.output_tokens,
            total_tokens: match (self.total_tokens, rhs.total_tokens) {
                (None, None) => None,
                (lhs, rhs) => Some(lhs.unwrap_or(0) + rhs.unwrap_or(0)),
            },
        }
    }
}
