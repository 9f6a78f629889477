//! External service clients.

mod ollama;

pub use ollama::{ClipMeta, OllamaClient};
