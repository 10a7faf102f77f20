//! Error types for the chat surface.

use legalaid_core::{MessageId, NarrationSection};
use legalaid_speech::SpeechError;

/// Errors from [`ChatOrchestrator`](crate::ChatOrchestrator) operations.
///
/// Network failures never appear here: they are absorbed into the fallback
/// answer or an empty scenario list.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("no scenario list is open")]
    NoScenarioPopup,
    #[error("scenario {index} out of range ({available} available)")]
    ScenarioOutOfRange { index: usize, available: usize },
    #[error("message not found: {0}")]
    MessageNotFound(MessageId),
    #[error("nothing to read aloud for {0}")]
    NothingToNarrate(NarrationSection),
    #[error(transparent)]
    Speech(#[from] SpeechError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use legalaid_speech::SpeechCapabilityKind;

    #[test]
    fn test_chat_error_display() {
        assert_eq!(ChatError::EmptyMessage.to_string(), "message cannot be empty");
        assert_eq!(
            ChatError::MessageTooLong(2000).to_string(),
            "message exceeds maximum length of 2000 characters"
        );
        assert_eq!(
            ChatError::ScenarioOutOfRange {
                index: 4,
                available: 2
            }
            .to_string(),
            "scenario 4 out of range (2 available)"
        );
        assert_eq!(
            ChatError::NothingToNarrate(NarrationSection::ActionPlan).to_string(),
            "nothing to read aloud for action-plan"
        );
    }

    #[test]
    fn test_speech_error_is_transparent() {
        let err: ChatError =
            SpeechError::UnsupportedCapability(SpeechCapabilityKind::Synthesis).into();
        assert_eq!(err.to_string(), "text-to-speech is not supported on this host");
    }
}
