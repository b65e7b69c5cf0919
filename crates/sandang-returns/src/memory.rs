//! # Memory Gateway
//!
//! In-memory [`TransactionGateway`] for tests, demos, and downstream app
//! test suites.
//!
//! ## What It Gives You
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        MemoryGateway                                    │
//! │                                                                         │
//! │  Seeded transactions   with_transaction(tx), with_already_returned()   │
//! │  Commit journal        journal() — every accepted ReturnCommitRequest  │
//! │  Invocation counters   commit_calls(), load_calls()                    │
//! │  Failure switch        fail_next_commit(err) — one shot                │
//! │  Latency knob          with_commit_delay(d) — paused-clock friendly    │
//! │                                                                         │
//! │  Semantics match a well-behaved backend: a second commit for the       │
//! │  same code reports AlreadyReturned instead of double-charging.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::gateway::{
    GatewayError, GatewayResult, ReturnCommitReceipt, ReturnCommitRequest, TransactionGateway,
};
use sandang_core::types::RentalTransaction;

// =============================================================================
// Memory Gateway
// =============================================================================

#[derive(Debug, Default)]
struct Inner {
    transactions: HashMap<String, RentalTransaction>,
    committed_codes: HashSet<String>,
    journal: Vec<ReturnCommitRequest>,
    commit_calls: u64,
    load_calls: u64,
    next_commit_failure: Option<GatewayError>,
}

/// In-memory transaction store with test instrumentation.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    inner: Mutex<Inner>,
    commit_delay: Duration,
}

impl MemoryGateway {
    /// Creates an empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Builders
    // =========================================================================

    /// Seeds a transaction, keyed by its code.
    pub fn with_transaction(mut self, transaction: RentalTransaction) -> Self {
        self.inner
            .get_mut()
            .transactions
            .insert(transaction.transaction_code.clone(), transaction);
        self
    }

    /// Marks a code as already committed, so the first commit for it
    /// reports `AlreadyReturned`.
    pub fn with_already_returned(mut self, transaction_code: &str) -> Self {
        self.inner
            .get_mut()
            .committed_codes
            .insert(transaction_code.to_string());
        self
    }

    /// Simulated network latency for `commit_return`.
    pub fn with_commit_delay(mut self, delay: Duration) -> Self {
        self.commit_delay = delay;
        self
    }

    // =========================================================================
    // Instrumentation
    // =========================================================================

    /// Makes the next `commit_return` fail with the given error (one shot).
    pub async fn fail_next_commit(&self, error: GatewayError) {
        self.inner.lock().await.next_commit_failure = Some(error);
    }

    /// How many times `commit_return` was invoked (including failures).
    pub async fn commit_calls(&self) -> u64 {
        self.inner.lock().await.commit_calls
    }

    /// How many times `load_transaction` was invoked.
    pub async fn load_calls(&self) -> u64 {
        self.inner.lock().await.load_calls
    }

    /// Every commit request accepted so far, in order.
    pub async fn journal(&self) -> Vec<ReturnCommitRequest> {
        self.inner.lock().await.journal.clone()
    }

    /// True once a commit for this code was accepted (or seeded).
    pub async fn is_committed(&self, transaction_code: &str) -> bool {
        self.inner
            .lock()
            .await
            .committed_codes
            .contains(transaction_code)
    }
}

#[async_trait]
impl TransactionGateway for MemoryGateway {
    async fn load_transaction(&self, transaction_code: &str) -> GatewayResult<RentalTransaction> {
        let mut inner = self.inner.lock().await;
        inner.load_calls += 1;
        inner
            .transactions
            .get(transaction_code)
            .cloned()
            .ok_or_else(|| GatewayError::TransactionNotFound(transaction_code.to_string()))
    }

    async fn commit_return(
        &self,
        request: ReturnCommitRequest,
    ) -> GatewayResult<ReturnCommitReceipt> {
        {
            let mut inner = self.inner.lock().await;
            inner.commit_calls += 1;
        }

        if !self.commit_delay.is_zero() {
            tokio::time::sleep(self.commit_delay).await;
        }

        let mut inner = self.inner.lock().await;

        if let Some(error) = inner.next_commit_failure.take() {
            return Err(error);
        }
        if !inner.transactions.contains_key(&request.transaction_code) {
            return Err(GatewayError::TransactionNotFound(
                request.transaction_code.clone(),
            ));
        }
        if inner.committed_codes.contains(&request.transaction_code) {
            return Err(GatewayError::AlreadyReturned {
                transaction_code: request.transaction_code.clone(),
            });
        }

        let receipt = ReturnCommitReceipt {
            receipt_id: Uuid::new_v4().to_string(),
            transaction_code: request.transaction_code.clone(),
            items_processed: request.declared_units(),
            total_penalty: request.total_penalty,
            already_returned: false,
            message: format!(
                "Return recorded: {} item(s), penalty {}",
                request.declared_units(),
                request.total_penalty
            ),
        };

        inner.committed_codes.insert(request.transaction_code.clone());
        inner.journal.push(request);

        Ok(receipt)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
