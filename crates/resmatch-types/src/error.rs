//! Error types for the ResourceMatch marketplace engine.
//!
//! All errors use the `RM_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Provider registry errors
//! - 2xx: Matching errors
//! - 3xx: Ledger errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{NodeHandle, RegionKey, Timestamp};

/// Central error enum for all ResourceMatch operations.
///
/// Every variant aborts the whole operation: the caller never observes a
/// partially applied mutation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResmatchError {
    // =================================================================
    // Provider Registry Errors (1xx)
    // =================================================================
    /// The provider's availability window is empty or inverted.
    #[error("RM_ERR_100: Invalid availability window: start {start} must be before end {end}")]
    InvalidWindow { start: Timestamp, end: Timestamp },

    /// The handle does not reference a live provider node.
    #[error("RM_ERR_101: Provider not found: {0}")]
    NotFound(NodeHandle),

    /// A region list's linkage did not match what the caller expected.
    #[error("RM_ERR_102: Corrupt provider list: {reason}")]
    CorruptList { reason: String },

    // =================================================================
    // Matching Errors (2xx)
    // =================================================================
    /// The consumer request cannot be satisfied even in principle.
    #[error("RM_ERR_200: Invalid consumer request: {reason}")]
    InvalidRequest { reason: String },

    /// No provider in the region offers this exact price with a usable window.
    #[error("RM_ERR_201: No eligible provider in region {region} at price {price}")]
    NoEligibleProvider { region: RegionKey, price: u64 },

    // =================================================================
    // Ledger Errors (3xx)
    // =================================================================
    /// The requested ledger index is beyond the recorded count.
    #[error("RM_ERR_300: Match index {index} out of range (count {count})")]
    IndexOutOfRange { index: usize, count: usize },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Serialization / deserialization error.
    #[error("RM_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("RM_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, ResmatchError>;

impl From<serde_json::Error> for ResmatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
