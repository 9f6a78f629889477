//! API server configuration.

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: usize,
    /// Ollama generate endpoint for clip metadata
    pub ollama_url: String,
    /// Ollama model name
    pub ollama_model: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: 2 * 1024 * 1024 * 1024,
            ollama_url: "http://localhost:11434/api/generate".to_string(),
            ollama_model: "qwen2.5:3b".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
            ollama_url: std::env::var("OLLAMA_URL").unwrap_or(defaults.ollama_url),
            ollama_model: std::env::var("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
        }
    }
}
