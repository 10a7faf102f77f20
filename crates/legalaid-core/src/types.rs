use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::LegalAidError;

// =============================================================================
// Category
// =============================================================================

/// Legal topic bucket used to route a query to the backend.
///
/// Serialized exactly as the backend expects: `"Housing"`, `"Employment"`,
/// `"Consumer"`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Housing,
    Employment,
    /// Also the fallback for text that matches no keyword.
    #[default]
    Consumer,
}

impl Category {
    /// All categories in routing priority order.
    pub const ALL: [Category; 3] = [Category::Housing, Category::Employment, Category::Consumer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Housing => "Housing",
            Category::Employment => "Employment",
            Category::Consumer => "Consumer",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = LegalAidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "housing" => Ok(Category::Housing),
            "employment" => Ok(Category::Employment),
            "consumer" => Ok(Category::Consumer),
            _ => Err(LegalAidError::InvalidCategory(s.to_string())),
        }
    }
}

// =============================================================================
// Assistant payload
// =============================================================================

/// A statutory citation returned alongside an answer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicableLaw {
    pub name: String,
    pub section: String,
    pub description: String,
}

/// Structured answer rendered for an assistant message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantPayload {
    pub answer: String,
    pub suggestion: String,
    pub reasoning: String,
    pub applicable_laws: Vec<ApplicableLaw>,
    pub action_plan: Vec<String>,
    /// Backend rule that produced the answer. `None` means a generic or
    /// out-of-scope response.
    pub matched_rule: Option<String>,
}

const SCOPED_PREAMBLE: &str = "Based on my analysis of your legal query, I've identified the applicable laws and regulations that govern your situation. Here's a comprehensive breakdown of your legal position, the relevant statutory provisions, and the specific steps you should take to protect your rights and achieve the best possible outcome.";

const OUT_OF_SCOPE_PREAMBLE: &str = "I've reviewed your legal query, but this area falls outside our current scope of expertise. Here's what I can advise based on general legal principles and the importance of seeking professional guidance.";

impl AssistantPayload {
    /// Introductory paragraph shown above the answer.
    pub fn analysis_preamble(&self) -> &'static str {
        if self.matched_rule.is_some() {
            SCOPED_PREAMBLE
        } else {
            OUT_OF_SCOPE_PREAMBLE
        }
    }

    /// Text read aloud for a section, or `None` if the section has nothing
    /// to narrate.
    pub fn narration(&self, section: NarrationSection) -> Option<String> {
        match section {
            NarrationSection::MainAnswer | NarrationSection::SimpleTerms => {
                if self.answer.trim().is_empty() {
                    None
                } else {
                    Some(self.answer.clone())
                }
            }
            NarrationSection::ApplicableLaws => {
                if self.applicable_laws.is_empty() {
                    return None;
                }
                Some(
                    self.applicable_laws
                        .iter()
                        .map(|law| format!("{}, {}: {}", law.name, law.section, law.description))
                        .collect::<Vec<_>>()
                        .join(". "),
                )
            }
            NarrationSection::ActionPlan => {
                if self.action_plan.is_empty() {
                    None
                } else {
                    Some(self.action_plan.join(". "))
                }
            }
        }
    }
}

/// Independently narratable region of an assistant message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NarrationSection {
    MainAnswer,
    SimpleTerms,
    ApplicableLaws,
    ActionPlan,
}

impl NarrationSection {
    pub const ALL: [NarrationSection; 4] = [
        NarrationSection::MainAnswer,
        NarrationSection::SimpleTerms,
        NarrationSection::ApplicableLaws,
        NarrationSection::ActionPlan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NarrationSection::MainAnswer => "main-answer",
            NarrationSection::SimpleTerms => "simple-terms",
            NarrationSection::ApplicableLaws => "applicable-laws",
            NarrationSection::ActionPlan => "action-plan",
        }
    }
}

impl fmt::Display for NarrationSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NarrationSection {
    type Err = LegalAidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "main-answer" | "answer" => Ok(NarrationSection::MainAnswer),
            "simple-terms" | "simple" => Ok(NarrationSection::SimpleTerms),
            "applicable-laws" | "laws" => Ok(NarrationSection::ApplicableLaws),
            "action-plan" | "plan" => Ok(NarrationSection::ActionPlan),
            _ => Err(LegalAidError::InvalidSection(s.to_string())),
        }
    }
}

// =============================================================================
// Scenario
// =============================================================================

/// A canned example prompt associated with a category.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub title: String,
    pub description: String,
    pub query: String,
}

// =============================================================================
// Messages
// =============================================================================

static MESSAGE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque ordinal identifying a message. Unique for the process lifetime,
/// including across conversation resets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(u64);

impl MessageId {
    pub fn next() -> Self {
        MessageId(MESSAGE_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who authored a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// Message body; the variant determines the role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "content", rename_all = "snake_case")]
pub enum MessagePayload {
    User(String),
    Assistant(AssistantPayload),
}

/// A single entry in the conversation transcript.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub timestamp: DateTime<Local>,
    pub payload: MessagePayload,
}

impl Message {
    /// Create a user message stamped with the current time.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: MessageId::next(),
            timestamp: Local::now(),
            payload: MessagePayload::User(text.into()),
        }
    }

    /// Create an assistant message stamped with the current time.
    pub fn assistant(payload: AssistantPayload) -> Self {
        Self {
            id: MessageId::next(),
            timestamp: Local::now(),
            payload: MessagePayload::Assistant(payload),
        }
    }

    pub fn role(&self) -> Role {
        match self.payload {
            MessagePayload::User(_) => Role::User,
            MessagePayload::Assistant(_) => Role::Assistant,
        }
    }

    /// The structured answer, if this is an assistant message.
    pub fn assistant_payload(&self) -> Option<&AssistantPayload> {
        match &self.payload {
            MessagePayload::Assistant(p) => Some(p),
            MessagePayload::User(_) => None,
        }
    }

    /// The plain text, if this is a user message.
    pub fn user_text(&self) -> Option<&str> {
        match &self.payload {
            MessagePayload::User(t) => Some(t),
            MessagePayload::Assistant(_) => None,
        }
    }
}
