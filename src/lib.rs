// Public modules
pub mod chat;
pub mod client;
pub mod error;
pub mod ingest;
pub mod observability;
pub mod render;
pub mod sse;
pub mod types;

// Re-exports
pub use client::{CompletionBackend, DEFAULT_API_URL, OpenAi};
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use render::{PlainTextRenderer, Renderer};
pub use types::*;
