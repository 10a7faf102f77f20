//! Speech input and output session controllers.
//!
//! The host platform's recognition and synthesis engines are reached only
//! through the [`SpeechRecognizer`] and [`SpeechSynthesizer`] traits. The
//! sessions own all state: at most one recognition session and at most one
//! utterance are current at any time, and host callbacks for anything that
//! is no longer current are ignored.

pub mod capability;
pub mod error;
pub mod input;
pub mod mock;
pub mod output;

pub use capability::{
    RecognitionEvent, RecognitionSessionId, SpeechCapabilityKind, SpeechRecognizer,
    SpeechSynthesizer, TranscriptFragment, UnsupportedHost, Utterance, UtteranceEvent,
    UtteranceId,
};
pub use error::SpeechError;
pub use input::{SpeechInputSession, SpeechInputState};
pub use mock::{MockRecognizer, MockSynthesizer, RecognizerCall, SynthesizerCall};
pub use output::{SectionId, SpeakOutcome, SpeechOutputSession, SpeechOutputState};
