use thiserror::Error;

/// Top-level error type for the Legal Aid client.
///
/// Subsystem crates define their own error types; this one covers the
/// shared concerns (configuration, I/O, serialization, parsing of
/// user-supplied identifiers).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LegalAidError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unknown category: {0}")]
    InvalidCategory(String),

    #[error("Unknown narration section: {0}")]
    InvalidSection(String),
}

impl From<toml::de::Error> for LegalAidError {
    fn from(err: toml::de::Error) -> Self {
        LegalAidError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for LegalAidError {
    fn from(err: toml::ser::Error) -> Self {
        LegalAidError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for LegalAidError {
    fn from(err: serde_json::Error) -> Self {
        LegalAidError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Legal Aid operations.
pub type Result<T> = std::result::Result<T, LegalAidError>;
