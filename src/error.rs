use std::time::Duration;
use thiserror::Error;

/// Every failure a conversion can produce. The display strings are the exact
/// messages surfaced in the JSON `error` field, so changing one changes the
/// output contract.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Text is empty")]
    EmptyText,

    #[error("Text too long (max {limit} chars)")]
    TextTooLong { limit: usize },

    #[error("Failed to decode base64: {0}")]
    Base64(String),

    #[error("Failed to read text file: {0}")]
    TextFile(String),

    #[error("Failed to create output directory: {0}")]
    OutputDir(String),

    #[error("Failed to create communicator: {0}")]
    Construction(String),

    #[error("Conversion timeout ({}s)", .0.as_secs())]
    Timeout(Duration),

    #[error("Synthesis failed: {0}")]
    Synthesis(String),

    #[error("Failed to save audio: {0}")]
    SaveAudio(String),

    #[error("Audio speed adjustment failed: {0}")]
    Transform(String),

    #[error("Missing dependency: {name}. Run: {remedy}")]
    MissingDependency { name: String, remedy: String },

    #[error("Failed to create output file")]
    MissingArtifact,

    #[error("Output file is empty")]
    EmptyArtifact,
}
