use thiserror::Error;

#[derive(Error, Debug)]
pub enum VstreamError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Input file not set")]
    MissingInput,

    #[error("Invalid stream type '{0}', must be DASH(0) or HLS(1)")]
    InvalidStreamType(String),

    #[error("Invalid file extension: {0}")]
    InvalidExtension(String),

    #[error("Codec not recognized by encoder: {0}")]
    UnsupportedCodec(String),

    #[error("Command execution failed ({reason}): {command}")]
    ExecutionFailed { command: String, reason: String },

    #[error("Media processing error: {0}")]
    Media(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, VstreamError>;
