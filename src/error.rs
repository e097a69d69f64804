//! Error types for the finance assistant

use thiserror::Error;

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, AssistantError>;

#[derive(Error, Debug)]
pub enum AssistantError {

    // =============================
    // Interpretation Pipeline Errors
    // =============================

    /// Inference output was not parseable structured text.
    #[error("Extraction parse error: {0}")]
    ExtractionParse(String),

    /// Inference output parsed but violated the extraction schema.
    #[error("Extraction schema error: {0}")]
    ExtractionSchema(String),

    /// Extracted amount could not be coerced to a valid number.
    #[error("Amount format error: {0}")]
    AmountFormat(String),

    /// Report narrative could not be generated.
    #[error("Narrative generation error: {0}")]
    NarrativeGeneration(String),

    /// Ledger store operation failed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Inference collaborator call failed.
    #[error("Inference error: {0}")]
    Inference(String),

    /// Startup misconfiguration. Fatal, reported before serving traffic.
    #[error("Configuration error: {0}")]
    Config(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
