//! Query dispatch with fault absorption.
//!
//! Every call resolves to a well-formed [`AssistantPayload`]: backend
//! answers are normalized, and any failure becomes the fixed apology
//! payload.

use std::sync::Arc;

use legalaid_core::{AssistantPayload, Category};

use crate::backend::LegalBackend;
use crate::wire::QueryRequest;

pub const FAILURE_ANSWER: &str =
    "Sorry, I encountered an error processing your request. Please try again.";
pub const FAILURE_SUGGESTION: &str =
    "Check your internet connection and ensure the backend server is running.";
pub const FAILURE_REASONING: &str = "Network or server error occurred.";

/// The payload shown when a query could not be completed.
pub fn network_failure_payload() -> AssistantPayload {
    AssistantPayload {
        answer: FAILURE_ANSWER.to_string(),
        suggestion: FAILURE_SUGGESTION.to_string(),
        reasoning: FAILURE_REASONING.to_string(),
        applicable_laws: Vec::new(),
        action_plan: Vec::new(),
        matched_rule: None,
    }
}

/// Issues queries against the backend.
///
/// No de-duplication or cancellation: concurrent calls are independent and
/// resolve in whatever order the backend answers them.
#[derive(Clone)]
pub struct QueryDispatcher {
    backend: Arc<dyn LegalBackend>,
}

impl QueryDispatcher {
    pub fn new(backend: Arc<dyn LegalBackend>) -> Self {
        Self { backend }
    }

    /// Send `text` under `category` and return the answer to display.
    pub async fn send(&self, category: Category, text: &str) -> AssistantPayload {
        let request = QueryRequest {
            category,
            query: text.to_string(),
        };
        tracing::info!(category = %category, query_len = text.len(), "Dispatching legal query");

        match self.backend.query(&request).await {
            Ok(response) => {
                let payload = response.into_payload();
                tracing::debug!(
                    category = %category,
                    matched_rule = payload.matched_rule.as_deref().unwrap_or("none"),
                    laws = payload.applicable_laws.len(),
                    steps = payload.action_plan.len(),
                    "Query answered"
                );
                payload
            }
            Err(e) => {
                tracing::warn!(
                    category = %category,
                    error = %e,
                    "Query failed, using fallback answer"
                );
                network_failure_payload()
            }
        }
    }
}
