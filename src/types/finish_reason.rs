use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reasons why the model stopped generating a response.
///
/// While a generation is still in progress the API reports the literal
/// string `"null"` rather than JSON null, so that spelling gets its own
/// variant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinishReason {
    /// Generation is still in progress
    Null,

    /// The model finished the response naturally
    Stop,

    /// The response reached the maximum length limit
    Length,
}

impl FinishReason {
    /// Returns true if this is the terminal sentinel for a streamed
    /// response.
    pub fn is_stop(&self) -> bool {
        matches!(self, FinishReason::Stop)
    }
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinishReason::Null => write!(f, "null"),
            FinishReason::Stop => write!(f, "stop"),
            FinishReason::Length => write!(f, "length"),
        }
    }
}

/// Error returned when parsing an invalid finish reason string.
#[derive(Debug)]
pub struct FinishReasonParseError {
    /// The invalid string value that could not be parsed.
    pub invalid_value: String,
}

impl fmt::Display for FinishReasonParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown finish reason: {}", self.invalid_value)
    }
}

impl std::error::Error for FinishReasonParseError {}

impl FromStr for FinishReason {
    type Err = FinishReasonParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "null" => Ok(FinishReason::Null),
            "stop" => Ok(FinishReason::Stop),
            "length" => Ok(FinishReason::Length),
            _ => Err(FinishReasonParseError {
                invalid_value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization() {
        assert_eq!(
            serde_json::to_string(&FinishReason::Stop).unwrap(),
            r#""stop""#
        );
        assert_eq!(
            serde_json::to_string(&FinishReason::Null).unwrap(),
            r#""null""#
        );
    }

    #[test]
    fn deserialization() {
        let reason: FinishReason = serde_json::from_str(r#""length""#).unwrap();
        assert_eq!(reason, FinishReason::Length);
        let reason: FinishReason = serde_json::from_str(r#""null""#).unwrap();
        assert_eq!(reason, FinishReason::Null);
    }

    #[test]
    fn stop_sentinel() {
        assert!(FinishReason::Stop.is_stop());
        assert!(!FinishReason::Null.is_stop());
        assert!(!FinishReason::Length.is_stop());
    }
}
