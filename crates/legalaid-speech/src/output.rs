//! Speech output session.
//!
//! Plays one narratable section at a time. Asking to speak the section that
//! is already playing stops it; asking for any other section replaces
//! whatever is playing.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use legalaid_core::config::SpeechOutputConfig;
use legalaid_core::{MessageId, NarrationSection};

use crate::capability::{
    SpeechCapabilityKind, SpeechSynthesizer, Utterance, UtteranceEvent, UtteranceId,
};
use crate::error::SpeechError;

/// Identifies a narratable section of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectionId(String);

impl SectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id of `section` within the message `message`, e.g. `"7:action-plan"`.
    pub fn for_message(message: MessageId, section: NarrationSection) -> Self {
        Self(format!("{message}:{section}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Playback state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechOutputState {
    Idle,
    /// Handed to the engine, playback not yet confirmed.
    Starting {
        section: SectionId,
        utterance: UtteranceId,
    },
    Speaking {
        section: SectionId,
        utterance: UtteranceId,
    },
}

impl SpeechOutputState {
    fn section(&self) -> Option<&SectionId> {
        match self {
            SpeechOutputState::Idle => None,
            SpeechOutputState::Starting { section, .. }
            | SpeechOutputState::Speaking { section, .. } => Some(section),
        }
    }

    fn utterance(&self) -> Option<UtteranceId> {
        match self {
            SpeechOutputState::Idle => None,
            SpeechOutputState::Starting { utterance, .. }
            | SpeechOutputState::Speaking { utterance, .. } => Some(*utterance),
        }
    }
}

impl fmt::Display for SpeechOutputState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeechOutputState::Idle => write!(f, "Idle"),
            SpeechOutputState::Starting { section, .. } => write!(f, "Starting({section})"),
            SpeechOutputState::Speaking { section, .. } => write!(f, "Speaking({section})"),
        }
    }
}

/// What a call to [`SpeechOutputSession::speak`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakOutcome {
    Started(UtteranceId),
    /// The section was already playing and has been stopped.
    Stopped,
}

/// Controller for one host speech synthesizer.
///
/// Cloning shares the same session.
#[derive(Clone)]
pub struct SpeechOutputSession {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    voice: SpeechOutputConfig,
    state: Arc<Mutex<SpeechOutputState>>,
    /// Held across a state change and the engine calls that follow it, so
    /// concurrent speak/stop calls reach the engine in the order they
    /// claimed the slot.
    engine: Arc<Mutex<()>>,
}

impl SpeechOutputSession {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, voice: SpeechOutputConfig) -> Self {
        Self {
            synthesizer,
            voice,
            state: Arc::new(Mutex::new(SpeechOutputState::Idle)),
            engine: Arc::new(Mutex::new(())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SpeechOutputState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn engine(&self) -> MutexGuard<'_, ()> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(state: &mut SpeechOutputState, next: SpeechOutputState) {
        tracing::debug!("Speech output state: {} -> {}", state, next);
        *state = next;
    }

    pub fn is_supported(&self) -> bool {
        self.synthesizer.supported()
    }

    pub fn state(&self) -> SpeechOutputState {
        self.lock().clone()
    }

    /// The section currently audible. `None` while idle or still starting.
    pub fn active_section(&self) -> Option<SectionId> {
        match &*self.lock() {
            SpeechOutputState::Speaking { section, .. } => Some(section.clone()),
            _ => None,
        }
    }

    pub fn is_speaking(&self) -> bool {
        matches!(*self.lock(), SpeechOutputState::Speaking { .. })
    }

    /// Speak `text` for `section`, or stop it if that section is current.
    pub fn speak(&self, text: &str, section: SectionId) -> Result<SpeakOutcome, SpeechError> {
        if !self.synthesizer.supported() {
            tracing::warn!("Text-to-speech requested but not supported on this host");
            return Err(SpeechError::UnsupportedCapability(
                SpeechCapabilityKind::Synthesis,
            ));
        }

        let utterance = Utterance {
            id: UtteranceId::new(),
            text: text.to_string(),
            rate: self.voice.rate,
            pitch: self.voice.pitch,
            volume: self.voice.volume,
        };

        let _engine = self.engine();
        let was_active = {
            let mut state = self.lock();
            if state.section() == Some(&section) {
                Self::transition(&mut state, SpeechOutputState::Idle);
                drop(state);
                self.synthesizer.cancel();
                tracing::info!(section = %section, "Stopped speaking");
                return Ok(SpeakOutcome::Stopped);
            }
            let was_active = *state != SpeechOutputState::Idle;
            Self::transition(
                &mut state,
                SpeechOutputState::Starting {
                    section: section.clone(),
                    utterance: utterance.id,
                },
            );
            was_active
        };

        // Engine calls happen outside the state lock; hosts may call back
        // synchronously.
        if was_active {
            self.synthesizer.cancel();
        }
        if let Err(e) = self.synthesizer.speak(&utterance) {
            tracing::warn!(section = %section, error = %e, "Speech synthesis failed to start");
            let mut state = self.lock();
            if state.utterance() == Some(utterance.id) {
                Self::transition(&mut state, SpeechOutputState::Idle);
            }
            return Err(e);
        }

        tracing::info!(section = %section, chars = text.len(), "Speaking");
        Ok(SpeakOutcome::Started(utterance.id))
    }

    /// Cancel any playback and return to idle.
    pub fn stop(&self) {
        let _engine = self.engine();
        {
            let mut state = self.lock();
            if *state != SpeechOutputState::Idle {
                Self::transition(&mut state, SpeechOutputState::Idle);
            }
        }
        self.synthesizer.cancel();
    }

    /// Apply a host callback for `utterance`. Callbacks for anything but the
    /// current utterance are ignored.
    pub fn handle_event(&self, utterance: UtteranceId, event: UtteranceEvent) {
        let mut state = self.lock();
        if state.utterance() != Some(utterance) {
            tracing::debug!(utterance = %utterance, "Ignoring event from stale utterance");
            return;
        }

        match event {
            UtteranceEvent::Started => {
                let next = match &*state {
                    SpeechOutputState::Starting { section, .. } => {
                        Some(SpeechOutputState::Speaking {
                            section: section.clone(),
                            utterance,
                        })
                    }
                    _ => None,
                };
                if let Some(next) = next {
                    Self::transition(&mut state, next);
                }
            }
            UtteranceEvent::Ended => {
                Self::transition(&mut state, SpeechOutputState::Idle);
            }
            UtteranceEvent::Error(code) => {
                tracing::warn!(utterance = %utterance, error = %code, "Speech synthesis error");
                Self::transition(&mut state, SpeechOutputState::Idle);
            }
        }
    }
}
