//! # Return Session
//!
//! The three-step return workflow for one rental transaction.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Return Session Steps                               │
//! │                                                                         │
//! │   ┌──────────────────┐  advance   ┌──────────────────┐  advance        │
//! │   │ 1 Declaring      │ ─────────► │ 2 Reviewing      │ ─────────►      │
//! │   │   Conditions     │  requires  │   Penalty        │  requires       │
//! │   │                  │ can_proceed│  (computes on    │ stored result   │
//! │   │  edit splits     │            │   entry)         │ (recomputes     │
//! │   └──────────────────┘            └──────────────────┘  when stale)    │
//! │        ▲    ▲                          │    ▲                          │
//! │        │    └───────── retreat ────────┘    │         ┌─────────────┐  │
//! │     retreat                                 └ retreat ┤ 3 Confirming│  │
//! │    (= exit request                                    │   → commit  │  │
//! │     at step 1)                                        └─────────────┘  │
//! │                                                                         │
//! │   Editing a split at ANY step: marks the stored result stale and       │
//! │   clears processing_error. It never navigates — the cashier does.      │
//! │   Terminal: the caller drops the session after a successful commit.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Staleness
//! The session keeps the last computed [`PenaltyCalculationResult`] plus a
//! dirty flag. A stale result is never committed: entering step 3 and the
//! commit path both recompute first, against the return date the cashier
//! reviewed. Over-allocated or otherwise invalid declarations block the
//! recompute path before the calculator ever runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};
use sandang_core::penalty::compute_transaction_penalty;
use sandang_core::rules::PenaltyRules;
use sandang_core::types::{
    ConditionSplit, LineReturnState, PenaltyCalculationResult, RentalTransaction,
};
use sandang_core::validation::{self, SessionValidation};

// =============================================================================
// Return Step
// =============================================================================

/// Position in the three-step return workflow.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ReturnStep {
    /// Step 1: declare per-line condition splits.
    DeclaringConditions,
    /// Step 2: review the computed penalty.
    ReviewingPenalty,
    /// Step 3: final confirmation before commit.
    Confirming,
}

impl ReturnStep {
    /// 1-based step number for the dashboard stepper.
    pub fn number(&self) -> u8 {
        match self {
            ReturnStep::DeclaringConditions => 1,
            ReturnStep::ReviewingPenalty => 2,
            ReturnStep::Confirming => 3,
        }
    }
}

impl std::fmt::Display for ReturnStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReturnStep::DeclaringConditions => write!(f, "1 (declaring conditions)"),
            ReturnStep::ReviewingPenalty => write!(f, "2 (reviewing penalty)"),
            ReturnStep::Confirming => write!(f, "3 (confirming)"),
        }
    }
}

/// What a retreat did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetreatOutcome {
    /// Moved back one step.
    SteppedBack(ReturnStep),
    /// Already at step 1 — the caller should leave the workflow.
    ExitRequested,
}

// =============================================================================
// Return Session
// =============================================================================

/// One cashier's in-progress return for one rental transaction.
///
/// ## Design Notes
/// - Line states are **snapshots**: catalog edits made while the cashier
///   is mid-return do not change what is being returned.
/// - Mutations are permissive (a cashier can type 7 into a 5-unit line);
///   [`Self::validate`] is authoritative and blocking. Nothing is ever
///   silently clamped.
/// - One session per transaction, driven by one user; the session itself
///   is plain mutable state with no locking.
#[derive(Debug, Clone)]
pub struct ReturnSession {
    transaction: RentalTransaction,
    lines: Vec<LineReturnState>,
    rules: PenaltyRules,
    step: ReturnStep,
    last_result: Option<PenaltyCalculationResult>,
    last_actual_return_date: Option<DateTime<Utc>>,
    result_stale: bool,
    pub(crate) processing_error: Option<String>,
    pub(crate) is_committing: bool,
}

impl ReturnSession {
    /// Opens a session for a transaction.
    ///
    /// Seeds one undeclared split (full quantity, empty label) per
    /// returnable line; already-returned lines do not participate.
    pub fn new(transaction: RentalTransaction, rules: PenaltyRules) -> Self {
        let lines: Vec<LineReturnState> = transaction
            .returnable_lines()
            .map(LineReturnState::from_line)
            .collect();

        debug!(
            transaction_code = %transaction.transaction_code,
            returnable_lines = lines.len(),
            "Return session opened"
        );

        ReturnSession {
            transaction,
            lines,
            rules,
            step: ReturnStep::DeclaringConditions,
            last_result: None,
            last_actual_return_date: None,
            result_stale: false,
            processing_error: None,
            is_committing: false,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The transaction being returned.
    pub fn transaction(&self) -> &RentalTransaction {
        &self.transaction
    }

    /// Current workflow step.
    pub fn step(&self) -> ReturnStep {
        self.step
    }

    /// The per-line declarations, in transaction order.
    pub fn lines(&self) -> &[LineReturnState] {
        &self.lines
    }

    /// One line's declaration by ID.
    pub fn line(&self, line_id: &str) -> Option<&LineReturnState> {
        self.lines.iter().find(|l| l.line_id == line_id)
    }

    /// The most recent penalty calculation, if any.
    pub fn last_result(&self) -> Option<&PenaltyCalculationResult> {
        self.last_result.as_ref()
    }

    /// The return date the last calculation ran against.
    pub fn last_actual_return_date(&self) -> Option<DateTime<Utc>> {
        self.last_actual_return_date
    }

    /// True when splits changed after the last calculation.
    pub fn is_result_stale(&self) -> bool {
        self.result_stale
    }

    /// Last commit/calculation failure message, for the banner in the UI.
    pub fn processing_error(&self) -> Option<&str> {
        self.processing_error.as_deref()
    }

    /// True while a commit is in flight for this session.
    pub fn is_committing(&self) -> bool {
        self.is_committing
    }

    /// True iff the given line can usefully grow another condition split.
    pub fn can_offer_additional_split(&self, line_id: &str) -> EngineResult<bool> {
        let line = self.line(line_id).ok_or_else(|| EngineError::UnknownLine {
            line_id: line_id.to_string(),
        })?;
        Ok(validation::can_offer_additional_split(line))
    }

    // =========================================================================
    // Split Mutations
    // =========================================================================

    fn find_line_mut(&mut self, line_id: &str) -> EngineResult<&mut LineReturnState> {
        self.lines
            .iter_mut()
            .find(|l| l.line_id == line_id)
            .ok_or_else(|| EngineError::UnknownLine {
                line_id: line_id.to_string(),
            })
    }

    /// Marks stored results stale after a split edit.
    fn touch_splits(&mut self) {
        self.result_stale = true;
        self.processing_error = None;
    }

    /// Replaces one split wholesale (label, quantity, cost override).
    ///
    /// ## Returns
    /// Fresh session validation, so the form can re-render its findings
    /// immediately after the edit.
    pub fn set_condition_split(
        &mut self,
        line_id: &str,
        split_index: usize,
        split: ConditionSplit,
    ) -> EngineResult<SessionValidation> {
        let line = self.find_line_mut(line_id)?;
        let slot = line.splits.get_mut(split_index).ok_or_else(|| {
            EngineError::SplitIndexOutOfRange {
                line_id: line_id.to_string(),
                split_index,
            }
        })?;
        *slot = split;

        self.touch_splits();
        Ok(self.validate())
    }

    /// Appends a split to a line, seeded with the unallocated remainder
    /// and an empty label for the cashier to fill in.
    pub fn add_condition_split(&mut self, line_id: &str) -> EngineResult<SessionValidation> {
        let line = self.find_line_mut(line_id)?;
        let remainder = line.unallocated_quantity();
        line.splits.push(ConditionSplit::undeclared(remainder));

        self.touch_splits();
        Ok(self.validate())
    }

    /// Removes a split. The last split of a line cannot be removed — a
    /// line leaves the session only by the transaction's say-so, not by
    /// deleting its declaration.
    pub fn remove_condition_split(
        &mut self,
        line_id: &str,
        split_index: usize,
    ) -> EngineResult<SessionValidation> {
        let line = self.find_line_mut(line_id)?;
        if line.splits.len() <= 1 {
            return Err(EngineError::LastSplit {
                line_id: line_id.to_string(),
            });
        }
        if split_index >= line.splits.len() {
            return Err(EngineError::SplitIndexOutOfRange {
                line_id: line_id.to_string(),
                split_index,
            });
        }
        line.splits.remove(split_index);

        self.touch_splits();
        Ok(self.validate())
    }

    // =========================================================================
    // Validation & Calculation
    // =========================================================================

    /// Validates the whole session. Pure and cheap; call freely.
    pub fn validate(&self) -> SessionValidation {
        validation::validate_session(&self.lines, &self.transaction)
    }

    /// Computes (or recomputes) the penalty against the given return date.
    ///
    /// Stores the result and clears staleness. Fails when any line is
    /// missing its expected return date; the message also lands in
    /// `processing_error` for the UI banner.
    pub fn compute_penalty(
        &mut self,
        actual_return_date: DateTime<Utc>,
    ) -> EngineResult<&PenaltyCalculationResult> {
        match compute_transaction_penalty(self.lines.iter(), actual_return_date, &self.rules) {
            Ok(result) => {
                info!(
                    transaction_code = %self.transaction.transaction_code,
                    total_penalty = %result.total_penalty,
                    late_units = result.summary.late_units,
                    damaged_units = result.summary.damaged_units,
                    lost_units = result.summary.lost_units,
                    "Penalty computed"
                );
                self.last_actual_return_date = Some(actual_return_date);
                self.result_stale = false;
                Ok(self.last_result.insert(result))
            }
            Err(err) => {
                self.processing_error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Recomputes a stale result before it is trusted, against the date
    /// the cashier reviewed. Declarations must still validate — the
    /// calculator never runs over an invalid session.
    fn refresh_stale_result(&mut self) -> EngineResult<()> {
        if !self.result_stale {
            return Ok(());
        }
        if !self.validate().can_proceed {
            return Err(EngineError::SessionNotReady {
                reason: "declarations changed and no longer validate".to_string(),
            });
        }
        let date = self
            .last_actual_return_date
            .ok_or_else(|| EngineError::SessionNotReady {
                reason: "no penalty calculation on record".to_string(),
            })?;
        warn!(
            transaction_code = %self.transaction.transaction_code,
            "Splits changed after review; recomputing penalty"
        );
        self.compute_penalty(date)?;
        Ok(())
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Advances one step.
    ///
    /// ## Rules
    /// - 1→2 requires `validate().can_proceed`; entering step 2 always
    ///   computes the penalty against `actual_return_date`
    /// - 2→3 requires a stored result, recomputing first when stale
    /// - advancing past step 3 is refused; commit is the way out
    pub fn advance_step(
        &mut self,
        actual_return_date: DateTime<Utc>,
    ) -> EngineResult<ReturnStep> {
        let next = match self.step {
            ReturnStep::DeclaringConditions => {
                let validation = self.validate();
                if !validation.can_proceed {
                    return Err(EngineError::StepNotAllowed {
                        step: self.step,
                        reason: "declarations are incomplete or invalid".to_string(),
                    });
                }
                self.compute_penalty(actual_return_date)?;
                ReturnStep::ReviewingPenalty
            }
            ReturnStep::ReviewingPenalty => {
                if self.last_result.is_none() {
                    return Err(EngineError::StepNotAllowed {
                        step: self.step,
                        reason: "no penalty calculation on record".to_string(),
                    });
                }
                self.refresh_stale_result()?;
                ReturnStep::Confirming
            }
            ReturnStep::Confirming => {
                return Err(EngineError::StepNotAllowed {
                    step: self.step,
                    reason: "already at the final step".to_string(),
                });
            }
        };

        info!(
            transaction_code = %self.transaction.transaction_code,
            from = %self.step,
            to = %next,
            "Return session advanced"
        );
        self.step = next;
        Ok(next)
    }

    /// Steps back, or signals exit when already at step 1. Always allowed;
    /// stored results are kept (re-entering step 2 recomputes anyway).
    pub fn retreat_step(&mut self) -> RetreatOutcome {
        let previous = match self.step {
            ReturnStep::DeclaringConditions => return RetreatOutcome::ExitRequested,
            ReturnStep::ReviewingPenalty => ReturnStep::DeclaringConditions,
            ReturnStep::Confirming => ReturnStep::ReviewingPenalty,
        };
        debug!(
            transaction_code = %self.transaction.transaction_code,
            from = %self.step,
            to = %previous,
            "Return session stepped back"
        );
        self.step = previous;
        RetreatOutcome::SteppedBack(previous)
    }

    // =========================================================================
    // Dashboard Summary
    // =========================================================================

    /// Snapshot DTO for the dashboard.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            transaction_code: self.transaction.transaction_code.clone(),
            customer_name: self.transaction.customer_name.clone(),
            step: self.step,
            step_number: self.step.number(),
            lines: self.lines.clone(),
            validation: self.validate(),
            penalty: self.last_result.clone(),
            result_stale: self.result_stale,
            processing_error: self.processing_error.clone(),
            is_committing: self.is_committing,
        }
    }
}

// =============================================================================
// Session Summary DTO
// =============================================================================

/// Everything the return screen needs to render one session state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub transaction_code: String,
    pub customer_name: Option<String>,
    pub step: ReturnStep,
    pub step_number: u8,
    pub lines: Vec<LineReturnState>,
    pub validation: SessionValidation,
    pub penalty: Option<PenaltyCalculationResult>,
    pub result_stale: bool,
    pub processing_error: Option<String>,
    pub is_committing: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================
