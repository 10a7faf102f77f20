//! Client side of the legal guidance backend.
//!
//! Wraps the backend's query and scenario endpoints behind the
//! [`LegalBackend`] trait and layers the fault-absorbing
//! [`QueryDispatcher`] and [`ScenarioProvider`] on top, so callers always
//! receive a well-formed answer or scenario list.

pub mod backend;
pub mod dispatcher;
pub mod error;
pub mod mock;
pub mod scenarios;
pub mod wire;

pub use backend::{HttpBackend, LegalBackend};
pub use dispatcher::{network_failure_payload, QueryDispatcher};
pub use error::ClientError;
pub use mock::MockBackend;
pub use scenarios::{fallback_scenario, ScenarioProvider};
pub use wire::{HealthStatus, QueryRequest, QueryResponse, ScenarioRequest, ScenarioResponse};
