//! Example scenario retrieval.

use std::sync::Arc;

use legalaid_core::{Category, Scenario};

use crate::backend::LegalBackend;

/// The single scenario offered when the backend has none for a category.
pub fn fallback_scenario() -> Scenario {
    Scenario {
        title: "General Legal Question".to_string(),
        description: "Ask about your specific situation".to_string(),
        query: "I have a legal question about my situation. Can you help me understand my rights and options?"
            .to_string(),
    }
}

/// Fetches example prompts for a category.
///
/// An empty backend answer is replaced with [`fallback_scenario`]; a failed
/// request yields an empty list with no fallback.
#[derive(Clone)]
pub struct ScenarioProvider {
    backend: Arc<dyn LegalBackend>,
}

impl ScenarioProvider {
    pub fn new(backend: Arc<dyn LegalBackend>) -> Self {
        Self { backend }
    }

    pub async fn fetch(&self, category: Category) -> Vec<Scenario> {
        tracing::info!(category = %category, "Fetching scenarios");
        match self.backend.scenarios(category).await {
            Ok(response) => {
                let scenarios = response.into_scenarios();
                if scenarios.is_empty() {
                    tracing::debug!(category = %category, "No scenarios returned, using fallback");
                    vec![fallback_scenario()]
                } else {
                    tracing::debug!(
                        category = %category,
                        count = scenarios.len(),
                        "Scenarios received"
                    );
                    scenarios
                }
            }
            Err(e) => {
                tracing::warn!(category = %category, error = %e, "Scenario fetch failed");
                Vec::new()
            }
        }
    }
}
