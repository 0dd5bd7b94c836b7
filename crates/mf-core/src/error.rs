use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("No models configured: add a `models` list to the failover config")]
    NoModelsConfigured,

    #[error("Model '{0}' is not in the configured failover order")]
    ModelNotConfigured(String),

    #[error("Invalid timestamp '{0}': expected epoch seconds, RFC 3339, or YYYY-MM-DD")]
    InvalidTimestamp(String),

    #[error("Config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
}
