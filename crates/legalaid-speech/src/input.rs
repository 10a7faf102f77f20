//! Speech input session.
//!
//! Wraps a host [`SpeechRecognizer`] and keeps the transcript state the chat
//! surface reads: whether we are listening, the finalized text accumulated
//! so far, and the interim (not yet final) text for display.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use legalaid_core::config::SpeechInputConfig;

use crate::capability::{
    RecognitionEvent, RecognitionSessionId, SpeechCapabilityKind, SpeechRecognizer,
    TranscriptFragment,
};
use crate::error::SpeechError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListenState {
    Idle,
    Listening(RecognitionSessionId),
}

impl fmt::Display for ListenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListenState::Idle => write!(f, "Idle"),
            ListenState::Listening(id) => write!(f, "Listening({id})"),
        }
    }
}

#[derive(Debug)]
struct InputInner {
    state: ListenState,
    accumulated: String,
    interim: String,
}

impl InputInner {
    fn transition(&mut self, next: ListenState) {
        if self.state != next {
            tracing::debug!("Speech input state: {} -> {}", self.state, next);
            self.state = next;
        }
    }
}

/// Snapshot of a [`SpeechInputSession`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeechInputState {
    pub is_listening: bool,
    pub accumulated_text: String,
    pub interim_text: String,
}

/// Controller for one host speech recognizer.
///
/// Cloning shares the same session. At most one recognition session is live;
/// events carrying any other session id are dropped.
#[derive(Clone)]
pub struct SpeechInputSession {
    recognizer: Arc<dyn SpeechRecognizer>,
    options: SpeechInputConfig,
    inner: Arc<Mutex<InputInner>>,
}

impl SpeechInputSession {
    pub fn new(recognizer: Arc<dyn SpeechRecognizer>, options: SpeechInputConfig) -> Self {
        Self {
            recognizer,
            options,
            inner: Arc::new(Mutex::new(InputInner {
                state: ListenState::Idle,
                accumulated: String::new(),
                interim: String::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, InputInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_supported(&self) -> bool {
        self.recognizer.supported()
    }

    pub fn is_listening(&self) -> bool {
        matches!(self.lock().state, ListenState::Listening(_))
    }

    pub fn state(&self) -> SpeechInputState {
        let inner = self.lock();
        SpeechInputState {
            is_listening: matches!(inner.state, ListenState::Listening(_)),
            accumulated_text: inner.accumulated.clone(),
            interim_text: inner.interim.clone(),
        }
    }

    /// Begin a new recognition session.
    ///
    /// Accumulated text from earlier sessions is kept.
    pub fn start(&self) -> Result<RecognitionSessionId, SpeechError> {
        if !self.recognizer.supported() {
            tracing::warn!("Speech recognition requested but not supported on this host");
            return Err(SpeechError::UnsupportedCapability(
                SpeechCapabilityKind::Recognition,
            ));
        }

        let session = RecognitionSessionId::new();
        {
            let mut inner = self.lock();
            if matches!(inner.state, ListenState::Listening(_)) {
                return Err(SpeechError::AlreadyListening);
            }
            inner.interim.clear();
            inner.transition(ListenState::Listening(session));
        }

        // The host may call back synchronously, so the lock is released first.
        if let Err(e) = self.recognizer.start(session, &self.options) {
            tracing::warn!(error = %e, "Speech recognizer failed to start");
            let mut inner = self.lock();
            if inner.state == ListenState::Listening(session) {
                inner.transition(ListenState::Idle);
            }
            return Err(e);
        }

        tracing::info!(session = %session, locale = %self.options.locale, "Listening");
        Ok(session)
    }

    /// End the current session, if any. Interim text is discarded.
    pub fn stop(&self) {
        let previous = {
            let mut inner = self.lock();
            inner.interim.clear();
            let previous = inner.state;
            inner.transition(ListenState::Idle);
            previous
        };

        if let ListenState::Listening(session) = previous {
            self.recognizer.stop(session);
            tracing::info!(session = %session, "Stopped listening");
        }
    }

    /// Start when idle, stop when listening. Returns whether we are now listening.
    pub fn toggle(&self) -> Result<bool, SpeechError> {
        if self.is_listening() {
            self.stop();
            Ok(false)
        } else {
            self.start().map(|_| true)
        }
    }

    /// Take the accumulated transcript, leaving it empty.
    pub fn take_transcript(&self) -> String {
        std::mem::take(&mut self.lock().accumulated)
    }

    /// Apply a host callback for `session`.
    pub fn handle_event(&self, session: RecognitionSessionId, event: RecognitionEvent) {
        let mut inner = self.lock();
        if inner.state != ListenState::Listening(session) {
            tracing::debug!(session = %session, "Ignoring event from stale recognition session");
            return;
        }

        match event {
            RecognitionEvent::Started => {
                inner.interim.clear();
            }
            RecognitionEvent::Result(fragments) => apply_result(&mut inner, &fragments),
            RecognitionEvent::Error(code) => {
                tracing::warn!(session = %session, error = %code, "Speech recognition error");
                inner.interim.clear();
                inner.transition(ListenState::Idle);
            }
            RecognitionEvent::Ended => {
                inner.interim.clear();
                inner.transition(ListenState::Idle);
            }
        }
    }
}

fn apply_result(inner: &mut InputInner, fragments: &[TranscriptFragment]) {
    let mut finals = String::new();
    let mut interim = String::new();
    for fragment in fragments {
        if fragment.is_final {
            finals.push_str(&fragment.text);
        } else {
            interim.push_str(&fragment.text);
        }
    }

    let finals = finals.trim();
    if finals.is_empty() {
        inner.interim = interim.trim().to_string();
        return;
    }

    if !inner.accumulated.is_empty() {
        inner.accumulated.push(' ');
    }
    inner.accumulated.push_str(finals);
    inner.interim.clear();
    tracing::debug!(chars = inner.accumulated.len(), "Transcript extended");
}
