//! # Return Engine
//!
//! Façade that ties the return workflow together for the host application.
//!
//! ## Wiring
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          ReturnEngine                                   │
//! │                                                                         │
//! │   load_transaction(code) ──────────► TransactionGateway::load           │
//! │   create_session(transaction) ─────► ReturnSession (steps 1-3)          │
//! │   commit_return(session, notes) ───► ReturnSubmissionGuard::submit      │
//! │                                          │                              │
//! │                                          └──► gateway::commit_return    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine owns the penalty policy and the submission guard; sessions it
//! hands out carry a copy of the policy so computation stays pure and
//! synchronous. Only loading and committing touch the network.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};
use crate::gateway::{ReturnCommitRequest, ReturnLineDeclaration, TransactionGateway};
use crate::guard::ReturnSubmissionGuard;
use crate::session::{ReturnSession, ReturnStep};
use sandang_core::money::Money;
use sandang_core::rules::PenaltyRules;
use sandang_core::types::RentalTransaction;

// =============================================================================
// Commit Outcome
// =============================================================================

/// What the caller shows the cashier after a commit goes through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitOutcome {
    pub success: bool,
    pub items_processed: i64,
    pub total_penalty: Money,
    pub message: String,
}

// =============================================================================
// Return Engine
// =============================================================================

/// Entry point for the return-and-penalty workflow.
///
/// One engine per back-office station. Sessions are cheap and short-lived;
/// the engine (and its guard) outlive them.
pub struct ReturnEngine {
    gateway: Arc<dyn TransactionGateway>,
    guard: ReturnSubmissionGuard,
    rules: PenaltyRules,
}

impl ReturnEngine {
    /// Creates an engine with the standard rental-shop policy.
    pub fn new(gateway: Arc<dyn TransactionGateway>) -> Self {
        Self::with_rules(gateway, PenaltyRules::default())
    }

    /// Creates an engine with an overridden policy (e.g. a promotional
    /// late-rate loaded from deployment config).
    pub fn with_rules(gateway: Arc<dyn TransactionGateway>, rules: PenaltyRules) -> Self {
        Self {
            guard: ReturnSubmissionGuard::new(Arc::clone(&gateway)),
            gateway,
            rules,
        }
    }

    pub fn rules(&self) -> &PenaltyRules {
        &self.rules
    }

    /// Fetches the rental transaction a customer wants to return.
    pub async fn load_transaction(
        &self,
        transaction_code: &str,
    ) -> EngineResult<RentalTransaction> {
        debug!(%transaction_code, "Loading rental transaction");
        let transaction = self.gateway.load_transaction(transaction_code).await?;
        info!(
            transaction_code = %transaction.transaction_code,
            line_count = transaction.lines.len(),
            returnable_count = transaction.returnable_lines().count(),
            "Transaction loaded"
        );
        Ok(transaction)
    }

    /// Opens a three-step return session for a loaded transaction.
    pub fn create_session(&self, transaction: RentalTransaction) -> ReturnSession {
        ReturnSession::new(transaction, self.rules.clone())
    }

    /// Submits the reviewed return to the backend, via the duplicate guard.
    ///
    /// ## Rules
    /// - Only allowed at step 3 (confirming); earlier steps get
    ///   [`EngineError::StepNotAllowed`].
    /// - Declarations edited after review are recomputed here with the
    ///   reviewed return date, so the committed total always matches what
    ///   is on screen.
    /// - Failures land in `session.processing_error` for the form to show;
    ///   `is_committing` is cleared either way.
    pub async fn commit_return(
        &self,
        session: &mut ReturnSession,
        notes: &str,
    ) -> EngineResult<CommitOutcome> {
        let transaction_code = session.transaction().transaction_code.clone();

        if session.step() != ReturnStep::Confirming {
            return Err(EngineError::StepNotAllowed {
                step: session.step(),
                reason: "commit requires a reviewed and confirmed penalty".to_string(),
            });
        }

        let validation = session.validate();
        if !validation.can_proceed {
            return Err(EngineError::SessionNotReady {
                reason: "declarations are incomplete or invalid".to_string(),
            });
        }

        let actual_return_date = session.last_actual_return_date().ok_or_else(|| {
            EngineError::SessionNotReady {
                reason: "no penalty calculation on record".to_string(),
            }
        })?;

        if session.is_result_stale() {
            warn!(
                %transaction_code,
                "Declarations changed after review; recomputing penalty before commit"
            );
            session.compute_penalty(actual_return_date)?;
        }

        let (total_penalty, summary) = match session.last_result() {
            Some(result) => (result.total_penalty, result.summary),
            None => {
                return Err(EngineError::SessionNotReady {
                    reason: "no penalty calculation on record".to_string(),
                })
            }
        };

        let lines: Vec<ReturnLineDeclaration> = session
            .lines()
            .iter()
            .map(|line| ReturnLineDeclaration {
                line_id: line.line_id.clone(),
                splits: line.splits.clone(),
            })
            .collect();

        let request = ReturnCommitRequest {
            transaction_code: transaction_code.clone(),
            actual_return_date,
            notes: notes.trim().to_string(),
            lines,
            total_penalty,
            summary,
        };

        info!(
            %transaction_code,
            total_penalty = %total_penalty,
            declared_units = request.declared_units(),
            "Committing return"
        );

        session.is_committing = true;
        let submitted = self.guard.submit(request).await;
        session.is_committing = false;

        match submitted {
            Ok(receipt) => {
                info!(
                    %transaction_code,
                    receipt_id = %receipt.receipt_id,
                    already_returned = receipt.already_returned,
                    "Return committed"
                );
                session.processing_error = None;
                Ok(CommitOutcome {
                    success: true,
                    items_processed: receipt.items_processed,
                    total_penalty: receipt.total_penalty,
                    message: receipt.message,
                })
            }
            Err(error) => {
                warn!(%transaction_code, %error, "Return commit failed");
                session.processing_error = Some(error.to_string());
                Err(error)
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
