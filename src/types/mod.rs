// Public modules
pub mod finish_reason;
pub mod generation_chunk;
pub mod generation_request;
pub mod message;
pub mod model;
pub mod role;
pub mod usage;

// Re-exports
pub use finish_reason::{FinishReason, FinishReasonParseError};
pub use generation_chunk::{GenerationChunk, GenerationOutput};
pub use generation_request::{GenerationInput, GenerationRequest};
pub use message::Message;
pub use model::{KnownModel, Model, ModelParseError};
pub use role::{Role, RoleParseError};
pub use usage::Usage;
