use std::env;
use std::path::PathBuf;

/// Process configuration, read once at startup. `.env` files are honored
/// via dotenvy before this is built.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub ollama_base_url: String,
    pub data_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            host: env_or("MTM_HOST", "127.0.0.1"),
            port: env_or("MTM_PORT", "8000").parse().unwrap_or(8000),
            ollama_base_url: env_or("OLLAMA_BASE_URL", "http://localhost:11434"),
            data_dir: PathBuf::from(env_or("MTM_DATA_DIR", "data")),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
