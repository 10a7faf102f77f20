//! Shared domain types, configuration, and errors for the Legal Aid client.

pub mod config;
pub mod error;
pub mod types;

pub use config::LegalAidConfig;
pub use error::{LegalAidError, Result};
pub use types::*;
