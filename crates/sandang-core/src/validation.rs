//! # Validation Module
//!
//! Condition-split validation for return declarations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Return screen (TypeScript)                                   │
//! │  ├── Basic format checks (empty label, length)                         │
//! │  └── Immediate cashier feedback                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (authoritative)                                  │
//! │  ├── Quantity accounting per line (never silently clamped)             │
//! │  ├── Label bounds per split                                            │
//! │  └── Session-level completeness (every returnable line declared)       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: State machine + commit                                       │
//! │  └── Refuses to advance or commit while Layer 2 reports errors         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Errors vs Warnings
//! Findings are returned as values, never thrown. Errors block step
//! advance; warnings render in the form but never block — in particular an
//! unallocated remainder is a legitimate partial return (the rest of the
//! units stay out with the customer).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::types::{LineReturnState, RentalTransaction};
use crate::{CONDITION_LABEL_MAX_CHARS, CONDITION_LABEL_MIN_CHARS, SPLIT_COUNT_SOFT_LIMIT};

// =============================================================================
// Findings
// =============================================================================

/// A blocking validation problem. Rendered next to the offending line;
/// any error on any returnable line holds the session at step 1.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    /// Splits cover more units than the line can return.
    #[error("exceeds available quantity by {excess}")]
    ExceedsAvailable { excess: i64 },

    /// No units allocated to any condition. A fully missing garment is
    /// declared by marking the line lost, not by leaving it empty.
    #[error("no units allocated to any condition")]
    NothingAllocated,

    /// A split has no condition text at all.
    #[error("split {split_index}: condition description is required")]
    EmptyLabel { split_index: usize },

    /// A split's condition text is too short to mean anything.
    #[error("split {split_index}: condition must be at least {min} characters")]
    LabelTooShort { split_index: usize, min: usize },

    /// A split's condition text exceeds the storage bound.
    #[error("split {split_index}: condition must be at most {max} characters")]
    LabelTooLong { split_index: usize, max: usize },

    /// A split with zero or negative units.
    #[error("split {split_index}: quantity must be positive")]
    NonPositiveQuantity { split_index: usize },

    /// A returnable line has no declaration in the session at all.
    #[error("line {line_id} is missing from the return declaration")]
    MissingLine { line_id: String },
}

/// A non-blocking advisory finding.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    /// Some units are not yet allocated to any condition. Drives the
    /// "add another condition" affordance; committing like this records a
    /// partial return.
    #[error("{remaining} unit(s) not yet allocated to a condition")]
    UnallocatedRemainder { remaining: i64 },

    /// More splits than a cashier can plausibly need on one line.
    #[error("{count} condition splits on one line - consider consolidating")]
    TooManySplits { count: usize },

    /// Every line in the transaction is already fully returned.
    #[error("all lines in this transaction are already returned")]
    NoReturnableLines,
}

// =============================================================================
// Per-Line Validation
// =============================================================================

/// Validation outcome for a single line's declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineValidation {
    pub line_id: String,
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationWarning>,
}

/// True iff a trimmed condition label is within the accepted bounds.
pub fn is_valid_condition_label(label: &str) -> bool {
    let len = label.trim().len();
    (CONDITION_LABEL_MIN_CHARS..=CONDITION_LABEL_MAX_CHARS).contains(&len)
}

/// Validates one line's splits against its returnable quantity.
///
/// ## Rules
/// - allocated units must not exceed the line total (reported by how many,
///   never clamped)
/// - at least one unit must be allocated
/// - every split needs a label within bounds and a positive quantity
/// - an unallocated remainder and a split count above
///   [`SPLIT_COUNT_SOFT_LIMIT`] are warnings only
pub fn validate_line(line: &LineReturnState) -> LineValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let excess = line.excess_quantity();
    if excess > 0 {
        errors.push(ValidationIssue::ExceedsAvailable { excess });
    }
    if line.allocated_quantity() == 0 {
        errors.push(ValidationIssue::NothingAllocated);
    }

    for (split_index, split) in line.splits.iter().enumerate() {
        let label = split.condition_label.trim();
        if label.is_empty() {
            errors.push(ValidationIssue::EmptyLabel { split_index });
        } else if label.len() < CONDITION_LABEL_MIN_CHARS {
            errors.push(ValidationIssue::LabelTooShort {
                split_index,
                min: CONDITION_LABEL_MIN_CHARS,
            });
        } else if label.len() > CONDITION_LABEL_MAX_CHARS {
            errors.push(ValidationIssue::LabelTooLong {
                split_index,
                max: CONDITION_LABEL_MAX_CHARS,
            });
        }
        if split.quantity <= 0 {
            errors.push(ValidationIssue::NonPositiveQuantity { split_index });
        }
    }

    let remaining = line.unallocated_quantity();
    if remaining > 0 {
        warnings.push(ValidationWarning::UnallocatedRemainder { remaining });
    }
    if line.splits.len() > SPLIT_COUNT_SOFT_LIMIT {
        warnings.push(ValidationWarning::TooManySplits {
            count: line.splits.len(),
        });
    }

    LineValidation {
        line_id: line.line_id.clone(),
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// True iff the line can usefully grow another condition split.
///
/// Offered only when every declared split is already well-formed and some
/// quantity remains strictly between 0 and the line total — a cashier with
/// an invalid split fixes it first instead of stacking more.
pub fn can_offer_additional_split(line: &LineReturnState) -> bool {
    let remaining = line.unallocated_quantity();
    if remaining == 0 || remaining >= line.total_quantity {
        return false;
    }
    line.splits
        .iter()
        .all(|s| s.quantity > 0 && is_valid_condition_label(&s.condition_label))
}

// =============================================================================
// Session Validation
// =============================================================================

/// Validation outcome for the whole session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionValidation {
    /// Every returnable line is declared and individually valid.
    pub is_form_valid: bool,

    /// `is_form_valid` plus at least one returnable line — a transaction
    /// with everything already back has nothing to advance with.
    pub can_proceed: bool,

    /// Per-line results, in transaction order.
    pub lines: Vec<LineValidation>,

    /// Session-scoped errors (missing line declarations).
    pub errors: Vec<ValidationIssue>,

    /// Session-scoped warnings.
    pub warnings: Vec<ValidationWarning>,
}

/// Validates a session's declarations against its transaction.
///
/// Lines that cannot be returned (nothing taken out, or already fully
/// returned) are excluded from validation entirely, so a stray declaration
/// for them neither helps nor hurts.
pub fn validate_session(
    lines: &[LineReturnState],
    transaction: &RentalTransaction,
) -> SessionValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut line_results = Vec::new();
    let mut returnable_count = 0usize;

    for item in transaction.returnable_lines() {
        returnable_count += 1;
        match lines.iter().find(|state| state.line_id == item.line_id) {
            Some(state) => line_results.push(validate_line(state)),
            None => errors.push(ValidationIssue::MissingLine {
                line_id: item.line_id.clone(),
            }),
        }
    }

    if returnable_count == 0 {
        warnings.push(ValidationWarning::NoReturnableLines);
    }

    let is_form_valid = errors.is_empty() && line_results.iter().all(|r| r.is_valid);
    let can_proceed = is_form_valid && returnable_count > 0;

    SessionValidation {
        is_form_valid,
        can_proceed,
        lines: line_results,
        errors,
        warnings,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{ConditionSplit, RentalLineItem, ReturnedStatus};

    fn line_state(total: i64, splits: Vec<ConditionSplit>) -> LineReturnState {
        LineReturnState {
            line_id: "line-1".to_string(),
            product_name: "Beskap Jawa".to_string(),
            total_quantity: total,
            unit_original_cost: Some(Money::from_rupiah(200_000)),
            expected_return_date: None,
            splits,
        }
    }

    fn rental_line(line_id: &str, qty: i64, status: ReturnedStatus) -> RentalLineItem {
        RentalLineItem {
            line_id: line_id.to_string(),
            product_name: "Beskap Jawa".to_string(),
            quantity_taken_out: qty,
            already_returned_status: status,
            unit_original_cost: None,
            expected_return_date: None,
        }
    }

    #[test]
    fn test_valid_single_split() {
        let state = line_state(3, vec![ConditionSplit::new("Baik - tidak ada kerusakan", 3)]);
        let result = validate_line(&state);

        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_over_allocation_reported_not_clamped() {
        // 3 + 4 units declared on a 5-unit line.
        let state = line_state(
            5,
            vec![
                ConditionSplit::new("Baik - tidak ada kerusakan", 3),
                ConditionSplit::new("Rusak ringan di ujung", 4),
            ],
        );
        let result = validate_line(&state);

        assert!(!result.is_valid);
        assert_eq!(
            result.errors,
            vec![ValidationIssue::ExceedsAvailable { excess: 2 }]
        );
        assert_eq!(
            result.errors[0].to_string(),
            "exceeds available quantity by 2"
        );
        // The declaration itself is untouched.
        assert_eq!(state.allocated_quantity(), 7);
    }

    #[test]
    fn test_nothing_allocated() {
        let state = line_state(3, vec![ConditionSplit::new("Baik - tidak ada kerusakan", 0)]);
        let result = validate_line(&state);

        assert!(!result.is_valid);
        assert!(result.errors.contains(&ValidationIssue::NothingAllocated));
        assert!(result
            .errors
            .contains(&ValidationIssue::NonPositiveQuantity { split_index: 0 }));
    }

    #[test]
    fn test_label_bounds() {
        let empty = validate_line(&line_state(1, vec![ConditionSplit::new("", 1)]));
        assert!(empty
            .errors
            .contains(&ValidationIssue::EmptyLabel { split_index: 0 }));

        let short = validate_line(&line_state(1, vec![ConditionSplit::new("ok", 1)]));
        assert!(short.errors.contains(&ValidationIssue::LabelTooShort {
            split_index: 0,
            min: CONDITION_LABEL_MIN_CHARS,
        }));

        let long_label = "x".repeat(CONDITION_LABEL_MAX_CHARS + 1);
        let long = validate_line(&line_state(1, vec![ConditionSplit::new(long_label, 1)]));
        assert!(long.errors.contains(&ValidationIssue::LabelTooLong {
            split_index: 0,
            max: CONDITION_LABEL_MAX_CHARS,
        }));

        // Exactly 4 characters ("Baik") is acceptable.
        let minimal = validate_line(&line_state(1, vec![ConditionSplit::new("Baik", 1)]));
        assert!(minimal.is_valid);
    }

    #[test]
    fn test_partial_allocation_warns_but_passes() {
        let state = line_state(5, vec![ConditionSplit::new("Baik - tidak ada kerusakan", 3)]);
        let result = validate_line(&state);

        assert!(result.is_valid);
        assert_eq!(
            result.warnings,
            vec![ValidationWarning::UnallocatedRemainder { remaining: 2 }]
        );
    }

    #[test]
    fn test_too_many_splits_warns() {
        let splits = (0..6)
            .map(|_| ConditionSplit::new("Baik - tidak ada kerusakan", 1))
            .collect();
        let result = validate_line(&line_state(6, splits));

        assert!(result.is_valid);
        assert!(result
            .warnings
            .contains(&ValidationWarning::TooManySplits { count: 6 }));
    }

    #[test]
    fn test_can_offer_additional_split() {
        // Valid first split with remainder: offer.
        let partial = line_state(5, vec![ConditionSplit::new("Baik - tidak ada kerusakan", 3)]);
        assert!(can_offer_additional_split(&partial));

        // Fully allocated: nothing left to add.
        let full = line_state(5, vec![ConditionSplit::new("Baik - tidak ada kerusakan", 5)]);
        assert!(!can_offer_additional_split(&full));

        // Nothing declared yet: fix the first split first.
        let untouched = line_state(5, vec![ConditionSplit::undeclared(5)]);
        assert!(!can_offer_additional_split(&untouched));

        // Invalid label on an existing split: fix before adding more.
        let broken = line_state(5, vec![ConditionSplit::new("ok", 3)]);
        assert!(!can_offer_additional_split(&broken));
    }

    #[test]
    fn test_session_missing_line_blocks() {
        let transaction = RentalTransaction {
            transaction_code: "TRX-001".to_string(),
            customer_name: None,
            lines: vec![
                rental_line("line-1", 2, ReturnedStatus::None),
                rental_line("line-2", 1, ReturnedStatus::None),
            ],
        };
        let states = vec![LineReturnState {
            line_id: "line-1".to_string(),
            splits: vec![ConditionSplit::new("Baik - tidak ada kerusakan", 2)],
            ..line_state(2, vec![])
        }];

        let result = validate_session(&states, &transaction);

        assert!(!result.is_form_valid);
        assert!(!result.can_proceed);
        assert_eq!(
            result.errors,
            vec![ValidationIssue::MissingLine {
                line_id: "line-2".to_string()
            }]
        );
    }

    #[test]
    fn test_session_ignores_non_returnable_lines() {
        let transaction = RentalTransaction {
            transaction_code: "TRX-002".to_string(),
            customer_name: None,
            lines: vec![
                rental_line("line-1", 2, ReturnedStatus::None),
                rental_line("line-2", 1, ReturnedStatus::Complete),
            ],
        };
        // Only the returnable line is declared; the completed one is absent.
        let states = vec![LineReturnState {
            line_id: "line-1".to_string(),
            splits: vec![ConditionSplit::new("Baik - tidak ada kerusakan", 2)],
            ..line_state(2, vec![])
        }];

        let result = validate_session(&states, &transaction);

        assert!(result.is_form_valid);
        assert!(result.can_proceed);
        assert_eq!(result.lines.len(), 1);
    }

    #[test]
    fn test_session_with_nothing_returnable_cannot_proceed() {
        let transaction = RentalTransaction {
            transaction_code: "TRX-003".to_string(),
            customer_name: None,
            lines: vec![rental_line("line-1", 2, ReturnedStatus::Complete)],
        };

        let result = validate_session(&[], &transaction);

        // Nothing is wrong with the form, but there is nothing to return.
        assert!(result.is_form_valid);
        assert!(!result.can_proceed);
        assert!(result
            .warnings
            .contains(&ValidationWarning::NoReturnableLines));
    }
}
