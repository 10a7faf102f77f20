//! Conversation logic for the Legal Aid client.
//!
//! Routes questions to a legal category, keeps the conversation log, and
//! coordinates the backend, the scenario popup and speech through
//! [`ChatOrchestrator`].

pub mod catalog;
pub mod classifier;
pub mod error;
pub mod orchestrator;
pub mod store;

pub use catalog::{find_card, topic_cards, CategoryFilter, Complexity, TopicCard, TOPIC_CARDS};
pub use classifier::{CategoryClassifier, KeywordRule, RuleTable, ScenarioCategoryMapper};
pub use error::ChatError;
pub use orchestrator::{ChatOrchestrator, PendingQuery, ScenarioPopup};
pub use store::ConversationStore;
