//! Mock backend for testing.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use legalaid_core::{Category, Scenario};

use crate::backend::LegalBackend;
use crate::error::ClientError;
use crate::wire::{HealthStatus, QueryRequest, QueryResponse, ScenarioResponse};

/// In-memory [`LegalBackend`] with configurable replies.
///
/// By default every query is answered with an echo of its category and
/// text, and scenario requests return an empty list.
pub struct MockBackend {
    response: Option<QueryResponse>,
    scenarios: Vec<Scenario>,
    fail_queries: AtomicBool,
    fail_scenarios: AtomicBool,
    delays: Vec<(String, Duration)>,
    query_log: Mutex<Vec<QueryRequest>>,
    scenario_log: Mutex<Vec<Category>>,
    query_count: AtomicU32,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            response: None,
            scenarios: Vec::new(),
            fail_queries: AtomicBool::new(false),
            fail_scenarios: AtomicBool::new(false),
            delays: Vec::new(),
            query_log: Mutex::new(Vec::new()),
            scenario_log: Mutex::new(Vec::new()),
            query_count: AtomicU32::new(0),
        }
    }

    /// Answer every query with `response`.
    pub fn with_response(mut self, response: QueryResponse) -> Self {
        self.response = Some(response);
        self
    }

    /// Return `scenarios` for every scenario request.
    pub fn with_scenarios(mut self, scenarios: Vec<Scenario>) -> Self {
        self.scenarios = scenarios;
        self
    }

    /// Fail every query with a network error.
    pub fn with_failing_queries(self) -> Self {
        self.fail_queries.store(true, Ordering::SeqCst);
        self
    }

    /// Fail every scenario request with a network error.
    pub fn with_failing_scenarios(self) -> Self {
        self.fail_scenarios.store(true, Ordering::SeqCst);
        self
    }

    /// Delay queries whose text contains `needle`.
    pub fn with_delay_for(mut self, needle: impl Into<String>, delay: Duration) -> Self {
        self.delays.push((needle.into(), delay));
        self
    }

    /// Switch query failure on or off after construction.
    pub fn set_failing_queries(&self, failing: bool) {
        self.fail_queries.store(failing, Ordering::SeqCst);
    }

    pub fn query_count(&self) -> u32 {
        self.query_count.load(Ordering::SeqCst)
    }

    /// Every query request received, in arrival order.
    pub fn queries(&self) -> Vec<QueryRequest> {
        self.query_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Every scenario category requested, in arrival order.
    pub fn scenario_requests(&self) -> Vec<Category> {
        self.scenario_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl LegalBackend for MockBackend {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ClientError> {
        self.query_count.fetch_add(1, Ordering::SeqCst);
        self.query_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let delay = self
            .delays
            .iter()
            .find(|(needle, _)| request.query.contains(needle.as_str()))
            .map(|(_, d)| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(ClientError::Network("mock backend unavailable".to_string()));
        }

        Ok(self.response.clone().unwrap_or_else(|| QueryResponse {
            answer: Some(format!("{} answer: {}", request.category, request.query)),
            ..QueryResponse::default()
        }))
    }

    async fn scenarios(&self, category: Category) -> Result<ScenarioResponse, ClientError> {
        self.scenario_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(category);

        if self.fail_scenarios.load(Ordering::SeqCst) {
            return Err(ClientError::Network("mock backend unavailable".to_string()));
        }
        Ok(ScenarioResponse {
            scenarios: Some(self.scenarios.clone()),
        })
    }

    async fn health(&self) -> Result<HealthStatus, ClientError> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(ClientError::Network("mock backend unavailable".to_string()));
        }
        Ok(HealthStatus {
            status: "healthy".to_string(),
            rules_loaded: 0,
        })
    }

    async fn categories(&self) -> Result<Vec<String>, ClientError> {
        Ok(Category::ALL.iter().map(|c| c.to_string()).collect())
    }
}
