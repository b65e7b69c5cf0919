//! # sandang-core: Pure Return & Penalty Logic for Sandang POS
//!
//! This crate is the **heart** of the Sandang POS return workflow. It
//! contains all penalty business logic as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Sandang POS Return Architecture                     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Back-Office Dashboard (UI)                     │   │
//! │  │   Lookup ──► Declare Conditions ──► Review Penalty ──► Confirm  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              sandang-returns (Workflow Layer)                   │   │
//! │  │    ReturnSession state machine • submission guard • gateway     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ sandang-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  classify │  │  penalty  │  │   │
//! │  │   │ LineState │  │   Money   │  │  keyword  │  │ late days │  │   │
//! │  │   │  splits   │  │  (rupiah) │  │   tiers   │  │   fees    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐                                 │   │
//! │  │   │   rules   │  │ validation│                                 │   │
//! │  │   │  policy   │  │  checks   │                                 │   │
//! │  │   └───────────┘  └───────────┘                                 │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK • NO NETWORK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (RentalTransaction, LineReturnState, breakdowns)
//! - [`money`] - Money type with integer rupiah arithmetic (no floating point!)
//! - [`rules`] - The penalty policy and Indonesian keyword tables
//! - [`classify`] - Free-text condition label → fee grade
//! - [`penalty`] - Late days, per-split fees, transaction totals
//! - [`validation`] - Split/session validation (errors vs warnings)
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O, No Clock**: The actual return date is always passed in, never read
//! 3. **Integer Money**: All monetary values are whole rupiah (i64), no float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use sandang_core::money::Money;
//! use sandang_core::penalty::compute_transaction_penalty;
//! use sandang_core::rules::PenaltyRules;
//! use sandang_core::types::{ConditionSplit, LineReturnState};
//!
//! let rules = PenaltyRules::default();
//! let due = Utc.with_ymd_and_hms(2026, 8, 10, 12, 0, 0).unwrap();
//!
//! let line = LineReturnState {
//!     line_id: "line-1".into(),
//!     product_name: "Kebaya Modern".into(),
//!     total_quantity: 3,
//!     unit_original_cost: None,
//!     expected_return_date: Some(due),
//!     splits: vec![ConditionSplit::new("Baik - tidak ada kerusakan", 3)],
//! };
//!
//! // Three clean units, three days late: 3 days × Rp5.000 × 3 units.
//! let result =
//!     compute_transaction_penalty([&line], due + Duration::days(3), &rules).unwrap();
//! assert_eq!(result.total_penalty, Money::from_rupiah(45_000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod classify;
pub mod error;
pub mod money;
pub mod penalty;
pub mod rules;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use sandang_core::Money` instead of
// `use sandang_core::money::Money`

pub use classify::{classify_condition, ConditionAssessment, ConditionGrade};
pub use error::{CoreError, CoreResult};
pub use money::Money;
pub use penalty::{compute_late_days, compute_transaction_penalty};
pub use rules::PenaltyRules;
pub use types::*;
pub use validation::{validate_line, validate_session, LineValidation, SessionValidation};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Minimum length of a condition label, in characters.
///
/// ## Business Reason
/// Four characters admits the shortest meaningful report ("Baik") while
/// rejecting stray keystrokes.
pub const CONDITION_LABEL_MIN_CHARS: usize = 4;

/// Maximum length of a condition label, in characters.
///
/// ## Business Reason
/// Condition notes travel onto the printed receipt and into the rental
/// ledger; 500 characters is the storage bound upstream.
pub const CONDITION_LABEL_MAX_CHARS: usize = 500;

/// Split count per line above which validation warns.
///
/// ## Business Reason
/// A cashier genuinely distinguishing more than five physical conditions
/// on one line is almost always a data-entry mistake, but the store
/// manager may still allow it - warning, not error.
pub const SPLIT_COUNT_SOFT_LIMIT: usize = 5;
