//! Recording speech engines for testing.
//!
//! Neither mock produces events on its own. Tests drive the session's
//! `handle_event` with the ids the mocks recorded.

use std::sync::{Mutex, PoisonError};

use legalaid_core::config::SpeechInputConfig;

use crate::capability::{
    RecognitionSessionId, SpeechRecognizer, SpeechSynthesizer, Utterance, UtteranceId,
};
use crate::error::SpeechError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognizerCall {
    Start(RecognitionSessionId),
    Stop(RecognitionSessionId),
}

/// [`SpeechRecognizer`] that records every call.
#[derive(Default)]
pub struct MockRecognizer {
    start_error: Option<String>,
    calls: Mutex<Vec<RecognizerCall>>,
    last_options: Mutex<Option<SpeechInputConfig>>,
}

impl MockRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every start with a platform error carrying `code`.
    pub fn with_start_error(mut self, code: impl Into<String>) -> Self {
        self.start_error = Some(code.into());
        self
    }

    pub fn calls(&self) -> Vec<RecognizerCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_options(&self) -> Option<SpeechInputConfig> {
        self.last_options
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SpeechRecognizer for MockRecognizer {
    fn supported(&self) -> bool {
        true
    }

    fn start(
        &self,
        session: RecognitionSessionId,
        options: &SpeechInputConfig,
    ) -> Result<(), SpeechError> {
        if let Some(code) = &self.start_error {
            return Err(SpeechError::Platform(code.clone()));
        }
        *self
            .last_options
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(options.clone());
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecognizerCall::Start(session));
        Ok(())
    }

    fn stop(&self, session: RecognitionSessionId) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecognizerCall::Stop(session));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SynthesizerCall {
    Speak(Utterance),
    Cancel,
}

/// [`SpeechSynthesizer`] that records every call.
#[derive(Default)]
pub struct MockSynthesizer {
    fail_speak: bool,
    calls: Mutex<Vec<SynthesizerCall>>,
}

impl MockSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every utterance with a platform error.
    pub fn with_failing_speak(mut self) -> Self {
        self.fail_speak = true;
        self
    }

    pub fn calls(&self) -> Vec<SynthesizerCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn cancel_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, SynthesizerCall::Cancel))
            .count()
    }

    /// Utterances handed to the engine, in order.
    pub fn spoken(&self) -> Vec<Utterance> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SynthesizerCall::Speak(u) => Some(u),
                SynthesizerCall::Cancel => None,
            })
            .collect()
    }

    pub fn last_utterance_id(&self) -> Option<UtteranceId> {
        self.spoken().last().map(|u| u.id)
    }
}

impl SpeechSynthesizer for MockSynthesizer {
    fn supported(&self) -> bool {
        true
    }

    fn speak(&self, utterance: &Utterance) -> Result<(), SpeechError> {
        if self.fail_speak {
            return Err(SpeechError::Platform("synthesis-failed".to_string()));
        }
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SynthesizerCall::Speak(utterance.clone()));
        Ok(())
    }

    fn cancel(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SynthesizerCall::Cancel);
    }
}
