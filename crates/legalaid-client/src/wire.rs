//! Request and response bodies exchanged with the backend.
//!
//! Response types are deliberately lenient: every field is optional and a
//! missing or `null` field normalizes to an empty value instead of failing
//! the decode.

use serde::{Deserialize, Serialize};

use legalaid_core::{ApplicableLaw, AssistantPayload, Category, Scenario};

/// Body of `POST /query`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub category: Category,
    pub query: String,
}

/// Body returned by `POST /query`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryResponse {
    pub answer: Option<String>,
    pub suggestion: Option<String>,
    pub reasoning: Option<String>,
    pub applicable_laws: Option<Vec<ApplicableLaw>>,
    pub action_plan: Option<Vec<String>>,
    pub matched_rule: Option<String>,
}

impl QueryResponse {
    /// Normalize into the payload stored on an assistant message.
    pub fn into_payload(self) -> AssistantPayload {
        AssistantPayload {
            answer: self.answer.unwrap_or_default(),
            suggestion: self.suggestion.unwrap_or_default(),
            reasoning: self.reasoning.unwrap_or_default(),
            applicable_laws: self.applicable_laws.unwrap_or_default(),
            action_plan: self.action_plan.unwrap_or_default(),
            matched_rule: self.matched_rule.filter(|r| !r.is_empty()),
        }
    }
}

/// Body of `POST /scenarios`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRequest {
    pub category: Category,
}

/// Body returned by `POST /scenarios`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioResponse {
    pub scenarios: Option<Vec<Scenario>>,
}

impl ScenarioResponse {
    pub fn into_scenarios(self) -> Vec<Scenario> {
        self.scenarios.unwrap_or_default()
    }
}

/// Body returned by `GET /health`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthStatus {
    pub status: String,
    pub rules_loaded: usize,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

/// Body returned by `GET /categories`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}
