//! # Submission Guard
//!
//! Serializes return commits so that impatient double-clicks, laggy
//! networks, and page re-renders cannot charge a customer twice.
//!
//! ## Decision Ladder
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │ submit(request)                                                         │
//! │                                                                         │
//! │  1. Same transaction already in flight?                                 │
//! │       → join it: await the shared outcome, no second gateway call      │
//! │                                                                         │
//! │  2. Same fingerprint succeeded inside the cooldown window?              │
//! │       → reject with DuplicateSubmission { retry_after_secs }           │
//! │                                                                         │
//! │  3. Otherwise                                                           │
//! │       → register the attempt, dispatch the gateway call on a           │
//! │         detached task, await the shared outcome                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - The gateway call runs on a spawned task, so a caller that is dropped
//!   mid-await (user navigated away) does not abort the commit. The
//!   backend either records the return or it does not; the guard never
//!   leaves that ambiguous.
//! - `AlreadyReturned` from the backend is a success end state. It becomes
//!   an idempotent receipt before the outcome is broadcast, so every
//!   waiter sees the same answer.
//! - Only successful completions arm the cooldown. A failed commit may be
//!   retried with the same declarations immediately.
//! - The cooldown is keyed on the submission fingerprint: changing any
//!   declaration (or the notes) produces a different fingerprint, which is
//!   a new submission, not a duplicate.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};
use crate::fingerprint::SubmissionFingerprint;
use crate::gateway::{
    GatewayError, GatewayResult, ReturnCommitReceipt, ReturnCommitRequest, TransactionGateway,
};

/// How long an identical fingerprint is refused after a successful commit.
pub const COOLDOWN_WINDOW: Duration = Duration::from_secs(30);

/// Outcome slot shared by every caller of one attempt. `None` until the
/// dispatched task reports.
type SharedOutcome = Option<GatewayResult<ReturnCommitReceipt>>;

// =============================================================================
// Guard State
// =============================================================================

#[derive(Debug)]
struct InFlightAttempt {
    attempt_id: u64,
    transaction_code: String,
    outcome: watch::Receiver<SharedOutcome>,
}

#[derive(Debug)]
struct CompletedSubmission {
    fingerprint: SubmissionFingerprint,
    completed_at: Instant,
}

#[derive(Debug, Default)]
struct GuardState {
    in_flight: Option<InFlightAttempt>,
    last_success: Option<CompletedSubmission>,
    next_attempt_id: u64,
}

// =============================================================================
// Submission Guard
// =============================================================================

/// Gatekeeper between the return workflow and [`TransactionGateway::commit_return`].
///
/// Tracks the most recent attempt and the most recent success. One guard
/// instance serves one back-office station; all commits go through it.
pub struct ReturnSubmissionGuard {
    gateway: Arc<dyn TransactionGateway>,
    state: Arc<Mutex<GuardState>>,
}

impl ReturnSubmissionGuard {
    pub fn new(gateway: Arc<dyn TransactionGateway>) -> Self {
        Self {
            gateway,
            state: Arc::new(Mutex::new(GuardState::default())),
        }
    }

    /// Commits a return through the gateway, deduplicating along the way.
    ///
    /// Concurrent calls for the same transaction share one gateway
    /// invocation and receive the same receipt. An identical resubmission
    /// within [`COOLDOWN_WINDOW`] of a success is rejected with
    /// [`EngineError::DuplicateSubmission`].
    pub async fn submit(&self, request: ReturnCommitRequest) -> EngineResult<ReturnCommitReceipt> {
        let fingerprint = SubmissionFingerprint::for_request(&request);

        let outcome_rx = {
            let mut state = self.state.lock().await;

            let join_rx = state
                .in_flight
                .as_ref()
                .filter(|attempt| attempt.transaction_code == request.transaction_code)
                .map(|attempt| attempt.outcome.clone());

            match join_rx {
                Some(rx) => {
                    debug!(
                        transaction_code = %request.transaction_code,
                        "Joining in-flight submission"
                    );
                    rx
                }
                None => {
                    if let Some(last) = &state.last_success {
                        if last.fingerprint == fingerprint {
                            let elapsed = last.completed_at.elapsed();
                            if elapsed < COOLDOWN_WINDOW {
                                let retry_after_secs =
                                    (COOLDOWN_WINDOW - elapsed).as_secs().max(1);
                                warn!(
                                    transaction_code = %request.transaction_code,
                                    fingerprint = fingerprint.short_digest(),
                                    retry_after_secs,
                                    "Rejecting duplicate submission inside cooldown"
                                );
                                return Err(EngineError::DuplicateSubmission { retry_after_secs });
                            }
                        }
                    }

                    let attempt_id = state.next_attempt_id;
                    state.next_attempt_id += 1;

                    let (outcome_tx, outcome_rx) = watch::channel::<SharedOutcome>(None);
                    state.in_flight = Some(InFlightAttempt {
                        attempt_id,
                        transaction_code: request.transaction_code.clone(),
                        outcome: outcome_rx.clone(),
                    });

                    info!(
                        transaction_code = %request.transaction_code,
                        attempt_id,
                        fingerprint = fingerprint.short_digest(),
                        "Dispatching commit to gateway"
                    );

                    self.spawn_commit(attempt_id, fingerprint, request, outcome_tx);
                    outcome_rx
                }
            }
        };

        Self::await_outcome(outcome_rx).await
    }

    /// Runs the gateway call on a detached task so caller cancellation
    /// cannot abandon a commit mid-flight.
    fn spawn_commit(
        &self,
        attempt_id: u64,
        fingerprint: SubmissionFingerprint,
        request: ReturnCommitRequest,
        outcome_tx: watch::Sender<SharedOutcome>,
    ) {
        let gateway = Arc::clone(&self.gateway);
        let state_handle = Arc::clone(&self.state);

        tokio::spawn(async move {
            let outcome = match gateway.commit_return(request).await {
                Err(GatewayError::AlreadyReturned { transaction_code }) => {
                    info!(
                        %transaction_code,
                        "Backend reports return already recorded; treating as success"
                    );
                    Ok(ReturnCommitReceipt::for_already_returned(&transaction_code))
                }
                other => other,
            };

            let mut state = state_handle.lock().await;
            // A newer attempt may have replaced this registration; only the
            // owning task clears it.
            if state.in_flight.as_ref().map(|a| a.attempt_id) == Some(attempt_id) {
                state.in_flight = None;
            }
            match &outcome {
                Ok(receipt) => {
                    state.last_success = Some(CompletedSubmission {
                        fingerprint,
                        completed_at: Instant::now(),
                    });
                    info!(
                        receipt_id = %receipt.receipt_id,
                        already_returned = receipt.already_returned,
                        attempt_id,
                        "Commit completed"
                    );
                }
                Err(error) => {
                    warn!(%error, attempt_id, "Commit failed; cooldown not armed");
                }
            }
            // Wake every caller sharing this attempt. No receivers left is
            // fine: the state above is already settled.
            let _ = outcome_tx.send(Some(outcome));
        });
    }

    async fn await_outcome(
        mut outcome_rx: watch::Receiver<SharedOutcome>,
    ) -> EngineResult<ReturnCommitReceipt> {
        loop {
            let settled = outcome_rx.borrow_and_update().clone();
            if let Some(outcome) = settled {
                return outcome.map_err(EngineError::from);
            }
            if outcome_rx.changed().await.is_err() {
                return Err(EngineError::Gateway(GatewayError::Unavailable {
                    message: "commit task ended without reporting an outcome".to_string(),
                }));
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::ReturnLineDeclaration;
    use crate::memory::MemoryGateway;
    use chrono::{TimeZone, Utc};
    use sandang_core::money::Money;
    use sandang_core::types::{
        ConditionSplit, PenaltySummary, RentalLineItem, RentalTransaction, ReturnedStatus,
    };

    fn sample_transaction(code: &str) -> RentalTransaction {
        RentalTransaction {
            transaction_code: code.to_string(),
            customer_name: Some("Ibu Sari".to_string()),
            lines: vec![RentalLineItem {
                line_id: "line-1".to_string(),
                product_name: "Kebaya Modern".to_string(),
                quantity_taken_out: 2,
                already_returned_status: ReturnedStatus::None,
                unit_original_cost: Some(Money::from_rupiah(150_000)),
                expected_return_date: Some(Utc.with_ymd_and_hms(2026, 8, 20, 10, 0, 0).unwrap()),
            }],
        }
    }

    fn sample_request(code: &str, notes: &str) -> ReturnCommitRequest {
        ReturnCommitRequest {
            transaction_code: code.to_string(),
            actual_return_date: Utc.with_ymd_and_hms(2026, 8, 22, 15, 0, 0).unwrap(),
            notes: notes.to_string(),
            lines: vec![ReturnLineDeclaration {
                line_id: "line-1".to_string(),
                splits: vec![ConditionSplit::new("Baik - tidak ada kerusakan", 2)],
            }],
            total_penalty: Money::from_rupiah(20_000),
            summary: PenaltySummary::default(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_submissions_share_one_gateway_call() {
        let gateway = Arc::new(
            MemoryGateway::new()
                .with_transaction(sample_transaction("TRX-GRD-01"))
                .with_commit_delay(Duration::from_millis(200)),
        );
        let guard = Arc::new(ReturnSubmissionGuard::new(gateway.clone()));

        let first = tokio::spawn({
            let guard = Arc::clone(&guard);
            async move { guard.submit(sample_request("TRX-GRD-01", "")).await }
        });
        // Let the first caller register before the second arrives.
        tokio::task::yield_now().await;

        let second = guard.submit(sample_request("TRX-GRD-01", "")).await.unwrap();
        let first = first.await.unwrap().unwrap();

        assert_eq!(first.receipt_id, second.receipt_id);
        assert!(!first.already_returned);
        assert_eq!(gateway.commit_calls().await, 1);
        assert_eq!(gateway.journal().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_rejects_identical_resubmission() {
        let gateway = Arc::new(MemoryGateway::new().with_transaction(sample_transaction("TRX-GRD-02")));
        let guard = ReturnSubmissionGuard::new(gateway.clone());

        let receipt = guard.submit(sample_request("TRX-GRD-02", "")).await.unwrap();
        assert!(!receipt.already_returned);

        let err = guard
            .submit(sample_request("TRX-GRD-02", ""))
            .await
            .unwrap_err();
        match err {
            EngineError::DuplicateSubmission { retry_after_secs } => {
                assert_eq!(retry_after_secs, 30);
            }
            other => panic!("expected DuplicateSubmission, got {other:?}"),
        }
        // The rejection never reached the backend.
        assert_eq!(gateway.commit_calls().await, 1);

        tokio::time::advance(Duration::from_secs(31)).await;

        // Past the window the resubmission goes through; the backend
        // answers AlreadyReturned, which surfaces as an idempotent receipt.
        let receipt = guard.submit(sample_request("TRX-GRD-02", "")).await.unwrap();
        assert!(receipt.already_returned);
        assert_eq!(receipt.items_processed, 0);
        assert_eq!(gateway.commit_calls().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_changed_declarations_bypass_cooldown() {
        let gateway = Arc::new(MemoryGateway::new().with_transaction(sample_transaction("TRX-GRD-03")));
        let guard = ReturnSubmissionGuard::new(gateway.clone());

        guard.submit(sample_request("TRX-GRD-03", "")).await.unwrap();

        // Different notes, different fingerprint: not a duplicate. It
        // reaches the gateway, which reports the return already recorded.
        let receipt = guard
            .submit(sample_request("TRX-GRD-03", "sabuk tertinggal"))
            .await
            .unwrap();
        assert!(receipt.already_returned);
        assert_eq!(gateway.commit_calls().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_commit_does_not_arm_cooldown() {
        let gateway = Arc::new(MemoryGateway::new().with_transaction(sample_transaction("TRX-GRD-04")));
        gateway
            .fail_next_commit(GatewayError::Unavailable {
                message: "socket closed".to_string(),
            })
            .await;
        let guard = ReturnSubmissionGuard::new(gateway.clone());

        let err = guard
            .submit(sample_request("TRX-GRD-04", ""))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Gateway(GatewayError::Unavailable { .. })
        ));

        // Same declarations, immediate retry: allowed, because failure
        // never arms the cooldown.
        let receipt = guard.submit(sample_request("TRX-GRD-04", "")).await.unwrap();
        assert!(!receipt.already_returned);
        assert_eq!(gateway.commit_calls().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_commit_survives_caller_cancellation() {
        let gateway = Arc::new(
            MemoryGateway::new()
                .with_transaction(sample_transaction("TRX-GRD-05"))
                .with_commit_delay(Duration::from_millis(200)),
        );
        let guard = Arc::new(ReturnSubmissionGuard::new(gateway.clone()));

        let caller = tokio::spawn({
            let guard = Arc::clone(&guard);
            async move { guard.submit(sample_request("TRX-GRD-05", "")).await }
        });
        tokio::task::yield_now().await;
        // The cashier's screen goes away mid-flight.
        caller.abort();

        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(gateway.commit_calls().await, 1);
        assert!(gateway.is_committed("TRX-GRD-05").await);

        // The success was recorded: an identical resubmission right after
        // is still caught by the cooldown.
        let err = guard
            .submit(sample_request("TRX-GRD-05", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateSubmission { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_independent_transactions_run_separately() {
        let gateway = Arc::new(
            MemoryGateway::new()
                .with_transaction(sample_transaction("TRX-GRD-06"))
                .with_transaction(sample_transaction("TRX-GRD-07"))
                .with_commit_delay(Duration::from_millis(100)),
        );
        let guard = Arc::new(ReturnSubmissionGuard::new(gateway.clone()));

        let first = tokio::spawn({
            let guard = Arc::clone(&guard);
            async move { guard.submit(sample_request("TRX-GRD-06", "")).await }
        });
        tokio::task::yield_now().await;

        // A different transaction does not join the in-flight attempt.
        let second = guard.submit(sample_request("TRX-GRD-07", "")).await.unwrap();
        let first = first.await.unwrap().unwrap();

        assert_eq!(first.transaction_code, "TRX-GRD-06");
        assert_eq!(second.transaction_code, "TRX-GRD-07");
        assert_eq!(gateway.commit_calls().await, 2);
    }
}
