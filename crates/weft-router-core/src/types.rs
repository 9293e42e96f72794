//! Common types for the history client
//!
//! Centralizes type definitions to avoid duplication across modules.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::service::HistoryService;

/// Host address (e.g., "10.0.0.1:7934")
pub type HostAddress = String;

/// Shared, reusable connection to one history host
pub type HistoryConnection = Arc<dyn HistoryService>;

/// Service name used when resolving history hosts
pub const HISTORY_SERVICE_NAME: &str = "weft-history";

/// A member of the history ring as reported by membership
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInfo {
    /// Network address of the host
    pub address: HostAddress,
}

impl HostInfo {
    pub fn new(address: impl Into<HostAddress>) -> Self {
        Self {
            address: address.into(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

impl std::fmt::Display for HostInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.address)
    }
}
