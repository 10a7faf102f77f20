//! Error types for speech sessions.

use crate::capability::SpeechCapabilityKind;

/// Errors from speech input and output sessions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpeechError {
    #[error("{0} is not supported on this host")]
    UnsupportedCapability(SpeechCapabilityKind),
    #[error("speech recognition is already listening")]
    AlreadyListening,
    #[error("speech platform error: {0}")]
    Platform(String),
}
