//! # Transaction Gateway
//!
//! The seam between the return engine and whatever stores rental
//! transactions (cloud API, local database, test double).
//!
//! ## Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      TransactionGateway Seam                            │
//! │                                                                         │
//! │   ReturnEngine ──► load_transaction(code) ──► RentalTransaction        │
//! │        │                                                                │
//! │        └────────► commit_return(request) ──► ReturnCommitReceipt       │
//! │                                                                         │
//! │   The engine defines WHAT crosses the boundary (these DTOs) and        │
//! │   nothing about HOW — wire format, auth, and timeouts belong to the    │
//! │   implementation. Timeout policy in particular is the gateway's:       │
//! │   the guard above this seam never imposes one.                         │
//! │                                                                         │
//! │   Implementations in the wild:                                         │
//! │   • HTTP client against the rental back office (out of this repo)      │
//! │   • MemoryGateway (memory.rs) for tests and demos                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sandang_core::money::Money;
use sandang_core::types::{ConditionSplit, PenaltySummary, RentalTransaction};

// =============================================================================
// Gateway Error
// =============================================================================

/// Failures reported by a gateway implementation.
///
/// `Clone` because commit outcomes are broadcast to every caller sharing an
/// in-flight attempt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// No transaction exists for the given code.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    /// The backend reports this return was already recorded. The guard
    /// maps this to an idempotent success, so callers normally never see
    /// it as an error.
    #[error("Transaction {transaction_code} is already returned")]
    AlreadyReturned { transaction_code: String },

    /// The backend accepted the call and answered with a failure.
    #[error("Gateway rejected the request: {message}")]
    Remote { message: String },

    /// The backend could not be reached at all.
    #[error("Gateway unavailable: {message}")]
    Unavailable { message: String },
}

/// Convenience type alias for Results with GatewayError.
pub type GatewayResult<T> = Result<T, GatewayError>;

// =============================================================================
// Commit DTOs
// =============================================================================

/// One line's declared splits inside a commit payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnLineDeclaration {
    pub line_id: String,
    pub splits: Vec<ConditionSplit>,
}

/// The full commit payload handed to the gateway.
///
/// Carries the computed totals so the backend can cross-check them against
/// its own calculation before posting the ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnCommitRequest {
    pub transaction_code: String,
    pub actual_return_date: DateTime<Utc>,
    /// Free-text note from the cashier, empty when none.
    pub notes: String,
    pub lines: Vec<ReturnLineDeclaration>,
    pub total_penalty: Money,
    pub summary: PenaltySummary,
}

impl ReturnCommitRequest {
    /// Units covered by this commit across all lines and splits.
    pub fn declared_units(&self) -> i64 {
        self.lines
            .iter()
            .flat_map(|l| l.splits.iter())
            .map(|s| s.quantity)
            .sum()
    }
}

/// What the gateway hands back for a recorded (or already-recorded) return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnCommitReceipt {
    /// Backend-assigned receipt identifier (UUID).
    pub receipt_id: String,
    pub transaction_code: String,
    /// Units the backend recorded as returned.
    pub items_processed: i64,
    pub total_penalty: Money,
    /// True when an earlier attempt already recorded this return and this
    /// receipt merely confirms the end state.
    pub already_returned: bool,
    /// Display message for the confirmation screen.
    pub message: String,
}

impl ReturnCommitReceipt {
    /// Receipt standing in for a return that an earlier attempt already
    /// recorded. The desired end state exists, so callers see success.
    pub fn for_already_returned(transaction_code: &str) -> Self {
        ReturnCommitReceipt {
            receipt_id: String::new(),
            transaction_code: transaction_code.to_string(),
            items_processed: 0,
            total_penalty: Money::zero(),
            already_returned: true,
            message: "Return was already recorded by an earlier submission".to_string(),
        }
    }
}

// =============================================================================
// Gateway Trait
// =============================================================================

/// Persistence boundary for rental transactions.
///
/// Implementations must be safe to call from spawned tasks; the engine
/// wraps them in `Arc` and the guard may invoke `commit_return` from a
/// task that outlives the original caller.
#[async_trait]
pub trait TransactionGateway: Send + Sync {
    /// Loads a rental transaction by its business code.
    async fn load_transaction(&self, transaction_code: &str) -> GatewayResult<RentalTransaction>;

    /// Records a completed return and returns the backend's receipt.
    ///
    /// Must be idempotent at the backend: replaying a commit for an
    /// already-returned transaction reports `GatewayError::AlreadyReturned`
    /// rather than double-charging.
    async fn commit_return(&self, request: ReturnCommitRequest) -> GatewayResult<ReturnCommitReceipt>;
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = GatewayError::TransactionNotFound("TRX-404".to_string());
        assert_eq!(err.to_string(), "Transaction not found: TRX-404");

        let err = GatewayError::AlreadyReturned {
            transaction_code: "TRX-001".to_string(),
        };
        assert_eq!(err.to_string(), "Transaction TRX-001 is already returned");
    }

    #[test]
    fn test_commit_request_serializes_camel_case() {
        let request = ReturnCommitRequest {
            transaction_code: "TRX-001".to_string(),
            actual_return_date: Utc::now(),
            notes: String::new(),
            lines: vec![ReturnLineDeclaration {
                line_id: "line-1".to_string(),
                splits: vec![ConditionSplit::new("Baik - tidak ada kerusakan", 2)],
            }],
            total_penalty: Money::zero(),
            summary: PenaltySummary::default(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("transactionCode").is_some());
        assert!(json.get("actualReturnDate").is_some());
        assert!(json.get("totalPenalty").is_some());
        assert_eq!(request.declared_units(), 2);
    }

    #[test]
    fn test_already_returned_receipt_reads_as_success() {
        let receipt = ReturnCommitReceipt::for_already_returned("TRX-001");
        assert!(receipt.already_returned);
        assert_eq!(receipt.items_processed, 0);
        assert_eq!(receipt.total_penalty, Money::zero());
    }
}
