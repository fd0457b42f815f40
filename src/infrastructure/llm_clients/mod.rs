mod ollama;

pub use ollama::{GenerationOutcome, OllamaClient};
