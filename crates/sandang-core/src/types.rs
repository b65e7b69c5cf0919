//! # Domain Types
//!
//! Core domain types for the return & penalty engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────┐   ┌──────────────────┐   ┌────────────────────┐  │
//! │  │ RentalTransaction│   │ RentalLineItem   │   │  ConditionSplit    │  │
//! │  │  ──────────────  │   │  ──────────────  │   │  ──────────────    │  │
//! │  │  transaction_code│──►│  line_id         │   │  condition_label   │  │
//! │  │  customer_name   │   │  product_name    │   │  quantity          │  │
//! │  │  lines           │   │  qty_taken_out   │   │  cost_override     │  │
//! │  └──────────────────┘   │  expected_return │   └────────────────────┘  │
//! │                         └──────────────────┘             │             │
//! │                                  │                       │             │
//! │                                  ▼                       ▼             │
//! │                         ┌─────────────────────────────────────┐        │
//! │                         │        LineReturnState              │        │
//! │                         │  snapshot of line facts + splits    │        │
//! │                         └─────────────────────────────────────┘        │
//! │                                  │ penalty computation                 │
//! │                                  ▼                                     │
//! │  ┌──────────────────┐   ┌──────────────────────┐   ┌───────────────┐  │
//! │  │  SeverityTier    │   │ PenaltyLineBreakdown │   │PenaltySummary │  │
//! │  │  on_time < late  │   │  one per split       │──►│ unit tallies  │  │
//! │  │  < damaged < lost│   │  fees + tier + text  │   │ per tier      │  │
//! │  └──────────────────┘   └──────────────────────┘   └───────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! `LineReturnState` freezes the line's facts (name, quantity, cost,
//! schedule) at the moment the return session is opened. Catalog edits made
//! while the cashier is mid-return cannot change what is being returned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Returned Status
// =============================================================================

/// How much of a rental line has already been returned by earlier visits.
///
/// Lines that are `Complete` are excluded from a new return session
/// entirely; `None` and `Partial` lines participate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReturnedStatus {
    /// Nothing returned yet.
    None,
    /// Some units came back on an earlier visit.
    Partial,
    /// Every unit is already back; nothing left to process.
    Complete,
}

impl Default for ReturnedStatus {
    fn default() -> Self {
        ReturnedStatus::None
    }
}

// =============================================================================
// Rental Line Item
// =============================================================================

/// One rented product entry within a transaction (read-only input).
///
/// Loaded through the `TransactionGateway`; the engine never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RentalLineItem {
    /// Unique identifier (UUID v4, assigned upstream).
    pub line_id: String,

    /// Display name shown to the cashier and on the return receipt.
    pub product_name: String,

    /// Units the customer took out. Always > 0 for a real line.
    pub quantity_taken_out: i64,

    /// Whether earlier visits already returned some or all units.
    pub already_returned_status: ReturnedStatus,

    /// Per-unit original cost, used for lost-item valuation when the
    /// cashier does not supply an override.
    pub unit_original_cost: Option<Money>,

    /// When this line was due back. `None` means the upstream record is
    /// broken; penalty calculation fails loudly rather than guessing.
    #[ts(as = "Option<String>")]
    pub expected_return_date: Option<DateTime<Utc>>,
}

impl RentalLineItem {
    /// A line participates in a return session iff it still has units out.
    ///
    /// ## Example
    /// ```rust
    /// use sandang_core::types::{RentalLineItem, ReturnedStatus};
    ///
    /// let line = RentalLineItem {
    ///     line_id: "l-1".into(),
    ///     product_name: "Kebaya Modern".into(),
    ///     quantity_taken_out: 2,
    ///     already_returned_status: ReturnedStatus::Complete,
    ///     unit_original_cost: None,
    ///     expected_return_date: None,
    /// };
    /// assert!(!line.is_returnable());
    /// ```
    pub fn is_returnable(&self) -> bool {
        self.quantity_taken_out > 0 && self.already_returned_status != ReturnedStatus::Complete
    }
}

// =============================================================================
// Rental Transaction
// =============================================================================

/// A rental transaction as loaded from the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RentalTransaction {
    /// Business code the cashier types in (e.g. `TRX-20260815-0012`).
    pub transaction_code: String,

    /// Customer display name, when the upstream record has one.
    pub customer_name: Option<String>,

    /// The rented product lines.
    pub lines: Vec<RentalLineItem>,
}

impl RentalTransaction {
    /// Iterates over the lines that can still be returned.
    pub fn returnable_lines(&self) -> impl Iterator<Item = &RentalLineItem> {
        self.lines.iter().filter(|l| l.is_returnable())
    }
}

// =============================================================================
// Condition Split
// =============================================================================

/// One declared outcome for a sub-quantity of a line.
///
/// A line returned entirely in one condition has a single split; a line
/// where e.g. one dress came back torn and two came back clean has two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConditionSplit {
    /// Free-text condition as reported by the cashier. Classified into a
    /// severity tier by keyword matching; 4–500 characters when valid.
    pub condition_label: String,

    /// Units returned in this condition. Must be > 0 to validate.
    pub quantity: i64,

    /// Per-unit replacement value, honored only when the condition
    /// classifies as lost.
    pub original_cost_override: Option<Money>,
}

impl ConditionSplit {
    /// Creates a split with a label and quantity.
    pub fn new(condition_label: impl Into<String>, quantity: i64) -> Self {
        ConditionSplit {
            condition_label: condition_label.into(),
            quantity,
            original_cost_override: None,
        }
    }

    /// Creates an undeclared split: full quantity, label left for the
    /// cashier to fill in.
    pub fn undeclared(quantity: i64) -> Self {
        ConditionSplit {
            condition_label: String::new(),
            quantity,
            original_cost_override: None,
        }
    }

    /// Sets a lost-item valuation override (per unit).
    pub fn with_cost_override(mut self, per_unit: Money) -> Self {
        self.original_cost_override = Some(per_unit);
        self
    }
}

// =============================================================================
// Line Return State
// =============================================================================

/// One line's full return declaration: frozen line facts plus the ordered
/// list of condition splits covering its quantity.
///
/// ## Invariants (enforced by validation, not by construction)
/// - `allocated_quantity() ≤ total_quantity` on a valid line
/// - a line is complete iff nothing is unallocated and every split has a
///   valid label and a positive quantity
/// - splits are appended, never inserted; the last split cannot be removed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineReturnState {
    /// The rental line this declaration belongs to.
    pub line_id: String,

    /// Product name at session-open time (frozen).
    pub product_name: String,

    /// Units being returned in this session (frozen from the line).
    pub total_quantity: i64,

    /// Per-unit original cost at session-open time (frozen).
    pub unit_original_cost: Option<Money>,

    /// Due date at session-open time (frozen).
    #[ts(as = "Option<String>")]
    pub expected_return_date: Option<DateTime<Utc>>,

    /// Ordered condition declarations. Seeded with one undeclared split
    /// covering the full quantity.
    pub splits: Vec<ConditionSplit>,
}

impl LineReturnState {
    /// Snapshots a rental line into its initial return state.
    ///
    /// The new state starts with exactly one split at the full quantity and
    /// an empty label — the cashier must declare the condition before the
    /// session validates.
    pub fn from_line(line: &RentalLineItem) -> Self {
        LineReturnState {
            line_id: line.line_id.clone(),
            product_name: line.product_name.clone(),
            total_quantity: line.quantity_taken_out,
            unit_original_cost: line.unit_original_cost,
            expected_return_date: line.expected_return_date,
            splits: vec![ConditionSplit::undeclared(line.quantity_taken_out)],
        }
    }

    /// Units covered by the declared splits.
    pub fn allocated_quantity(&self) -> i64 {
        self.splits.iter().map(|s| s.quantity).sum()
    }

    /// Units not yet covered by any split (never negative).
    pub fn unallocated_quantity(&self) -> i64 {
        (self.total_quantity - self.allocated_quantity()).max(0)
    }

    /// Units declared beyond what the line can return (never negative).
    /// Positive excess means the declaration is invalid.
    pub fn excess_quantity(&self) -> i64 {
        (self.allocated_quantity() - self.total_quantity).max(0)
    }

    /// True iff everything is allocated and every split is well-formed.
    pub fn is_complete(&self) -> bool {
        self.allocated_quantity() == self.total_quantity
            && self.splits.iter().all(|s| {
                s.quantity > 0 && crate::validation::is_valid_condition_label(&s.condition_label)
            })
    }
}

// =============================================================================
// Severity Tier
// =============================================================================

/// Severity of a returned split, for fee purposes and headline display.
///
/// Declaration order doubles as headline precedence: when one split must be
/// reduced to a single label, `lost > damaged > late > on_time` — so `Ord`'s
/// `max` picks the right one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SeverityTier {
    /// Returned in good condition, on schedule.
    OnTime,
    /// Good condition, but past the due date.
    Late,
    /// Came back with damage or staining.
    Damaged,
    /// Never came back (or declared unreturnable).
    Lost,
}

impl SeverityTier {
    /// Human-readable label used in penalty descriptions.
    pub fn label(&self) -> &'static str {
        match self {
            SeverityTier::OnTime => "on time",
            SeverityTier::Late => "late",
            SeverityTier::Damaged => "damaged",
            SeverityTier::Lost => "lost",
        }
    }
}

// =============================================================================
// Penalty Breakdown
// =============================================================================

/// Computed penalty for a single condition split. Never persisted directly;
/// the commit payload carries the totals instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PenaltyLineBreakdown {
    /// Line this split belongs to.
    pub line_id: String,

    /// Product name (frozen from the line state).
    pub product_name: String,

    /// Position of the split within its line.
    pub split_index: usize,

    /// The condition as declared.
    pub condition_label: String,

    /// Units in this split.
    pub quantity: i64,

    /// Late days for the line. Lateness is a property of the return event,
    /// so every split of one line shares the same count.
    pub late_days: i64,

    /// `late_days × daily rate × quantity`.
    pub late_fee: Money,

    /// Per-unit condition fee × quantity.
    pub condition_fee: Money,

    /// `late_fee + condition_fee`.
    pub total: Money,

    /// Resolved severity for this split.
    pub severity_tier: SeverityTier,

    /// Human-readable explanation of how the fee came about.
    pub description: String,
}

// =============================================================================
// Penalty Summary
// =============================================================================

/// Per-tier unit tallies across a whole calculation, for the review screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PenaltySummary {
    /// Units returned clean and on schedule.
    pub on_time_units: i64,
    /// Units returned clean but late.
    pub late_units: i64,
    /// Units returned damaged or stained.
    pub damaged_units: i64,
    /// Units lost.
    pub lost_units: i64,
    /// Lines that contributed at least one split.
    pub total_lines: i64,
    /// Total condition splits across all lines.
    pub total_conditions: i64,
    /// Σ late_days × quantity — the late-day exposure for reporting.
    pub aggregate_late_days: i64,
}

impl PenaltySummary {
    /// Folds one computed split into the tallies.
    pub fn record_split(&mut self, tier: SeverityTier, quantity: i64, late_days: i64) {
        match tier {
            SeverityTier::OnTime => self.on_time_units += quantity,
            SeverityTier::Late => self.late_units += quantity,
            SeverityTier::Damaged => self.damaged_units += quantity,
            SeverityTier::Lost => self.lost_units += quantity,
        }
        self.total_conditions += 1;
        self.aggregate_late_days += late_days * quantity;
    }
}

// =============================================================================
// Penalty Calculation Result
// =============================================================================

/// The full outcome of a transaction penalty calculation.
///
/// A pure function of the line states and the actual return date — no
/// computed-at timestamp, so recomputing an unchanged session compares
/// equal. The state machine relies on that for its staleness handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PenaltyCalculationResult {
    /// One entry per condition split, in line order.
    pub breakdowns: Vec<PenaltyLineBreakdown>,

    /// Sum of every breakdown's total.
    pub total_penalty: Money,

    /// Per-tier tallies for the review screen.
    pub summary: PenaltySummary,

    /// The return date the calculation was run against.
    #[ts(as = "String")]
    pub actual_return_date: DateTime<Utc>,
}

impl PenaltyCalculationResult {
    /// The single tier that headlines this result (worst split wins).
    /// Used only by legacy/simplified displays.
    pub fn headline_tier(&self) -> SeverityTier {
        self.breakdowns
            .iter()
            .map(|b| b.severity_tier)
            .max()
            .unwrap_or(SeverityTier::OnTime)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
