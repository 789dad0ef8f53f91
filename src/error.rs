use thiserror::Error;

#[derive(Error, Debug)]
pub enum CurateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Glossary error: {0}")]
    Glossary(String),

    #[error("Correction map error: {0}")]
    Corrections(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Alignment error: {0}")]
    Alignment(String),
}

pub type Result<T> = std::result::Result<T, CurateError>;
