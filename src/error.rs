//! Error types for textsift.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TextsiftError {
    // Configuration errors
    #[error("Configuration file not found at {}", path.display())]
    ConfigFileNotFound { path: std::path::PathBuf },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Frame source errors
    #[error("Malformed frame line {line}: {message}")]
    FrameParse { line: u64, message: String },

    #[error("Frame source failed: {message}")]
    FrameSource { message: String },

    // Notification sink errors
    #[error("Notification endpoint rejected the payload: {status}")]
    NotifyRejected { status: String },

    #[error("Notification delivery failed: {message}")]
    NotifyFailed { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, TextsiftError>;
