//! Host speech capabilities.
//!
//! Hosts report asynchronous progress by calling back into the owning
//! session with the id they were started with:
//! [`SpeechInputSession::handle_event`](crate::SpeechInputSession::handle_event)
//! and [`SpeechOutputSession::handle_event`](crate::SpeechOutputSession::handle_event).
//! Implementations must not hold locks shared with the session while
//! delivering those callbacks.

use std::fmt;

use uuid::Uuid;

use legalaid_core::config::SpeechInputConfig;

use crate::error::SpeechError;

/// Which host capability an operation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeechCapabilityKind {
    Recognition,
    Synthesis,
}

impl fmt::Display for SpeechCapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeechCapabilityKind::Recognition => write!(f, "speech recognition"),
            SpeechCapabilityKind::Synthesis => write!(f, "text-to-speech"),
        }
    }
}

/// Identifies one recognition session from start to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecognitionSessionId(Uuid);

impl RecognitionSessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecognitionSessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecognitionSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one text-to-speech playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtteranceId(Uuid);

impl UtteranceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UtteranceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One recognized fragment within a result batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptFragment {
    pub text: String,
    pub is_final: bool,
}

impl TranscriptFragment {
    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }

    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }
}

/// Callback from a speech-to-text host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    Started,
    /// Fragments changed since the previous result, in order.
    Result(Vec<TranscriptFragment>),
    Error(String),
    Ended,
}

/// Callback from a text-to-speech host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UtteranceEvent {
    Started,
    Ended,
    Error(String),
}

/// A text-to-speech request.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

/// Continuous speech-to-text provided by the host.
pub trait SpeechRecognizer: Send + Sync {
    /// Whether the host has a recognition engine at all.
    fn supported(&self) -> bool;

    /// Begin recognizing. Results are delivered for `session`.
    fn start(
        &self,
        session: RecognitionSessionId,
        options: &SpeechInputConfig,
    ) -> Result<(), SpeechError>;

    /// Release the platform session.
    fn stop(&self, session: RecognitionSessionId);
}

/// Text-to-speech provided by the host.
pub trait SpeechSynthesizer: Send + Sync {
    /// Whether the host has a synthesis engine at all.
    fn supported(&self) -> bool;

    /// Queue `utterance` for playback.
    fn speak(&self, utterance: &Utterance) -> Result<(), SpeechError>;

    /// Cancel whatever is playing or queued.
    fn cancel(&self);
}

/// A host with no speech engines, such as a plain terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedHost;

impl SpeechRecognizer for UnsupportedHost {
    fn supported(&self) -> bool {
        false
    }

    fn start(
        &self,
        _session: RecognitionSessionId,
        _options: &SpeechInputConfig,
    ) -> Result<(), SpeechError> {
        Err(SpeechError::UnsupportedCapability(
            SpeechCapabilityKind::Recognition,
        ))
    }

    fn stop(&self, _session: RecognitionSessionId) {}
}

impl SpeechSynthesizer for UnsupportedHost {
    fn supported(&self) -> bool {
        false
    }

    fn speak(&self, _utterance: &Utterance) -> Result<(), SpeechError> {
        Err(SpeechError::UnsupportedCapability(
            SpeechCapabilityKind::Synthesis,
        ))
    }

    fn cancel(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_host_reports_unsupported() {
        let host = UnsupportedHost;
        assert!(!SpeechRecognizer::supported(&host));
        assert!(!SpeechSynthesizer::supported(&host));
        assert_eq!(
            host.start(RecognitionSessionId::new(), &SpeechInputConfig::default()),
            Err(SpeechError::UnsupportedCapability(SpeechCapabilityKind::Recognition))
        );
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(RecognitionSessionId::new(), RecognitionSessionId::new());
        assert_ne!(UtteranceId::new(), UtteranceId::new());
    }

    #[test]
    fn test_fragment_constructors() {
        assert!(TranscriptFragment::final_text("hello").is_final);
        assert!(!TranscriptFragment::interim("hel").is_final);
    }
}
