// Public modules
pub mod chat_completion;
pub mod message;
pub mod model;

// Re-exports
pub use chat_completion::{
    ApiUsage, ChatCompletion, ChatCompletionChunk, ChatCompletionParams, Choice, ChunkChoice,
    Delta,
};
pub use message::{Message, Role};
pub use model::{KnownModel, Model};
