//! # Error Types
//!
//! Domain-specific error types for sandang-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  sandang-core errors (this file)                                       │
//! │  └── CoreError        - Penalty calculation failures                   │
//! │                                                                         │
//! │  sandang-core validation (validation.rs)                               │
//! │  ├── ValidationIssue   - Blocking problems, reported as values         │
//! │  └── ValidationWarning - Advisory, never blocks                        │
//! │                                                                         │
//! │  sandang-returns errors (separate crate)                               │
//! │  ├── GatewayError     - Transaction store failures                     │
//! │  └── EngineError      - Workflow/state machine failures                │
//! │                                                                         │
//! │  Flow: CoreError ──► EngineError ──► caller (UI / API layer)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (line ID, product name, etc.)
//! 3. Errors are enum variants, never String
//! 4. Validation findings are values, not errors — they render in the form,
//!    while `CoreError` means the calculation itself cannot proceed

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Penalty calculation errors.
///
/// Calculation is pure and total except where the input data itself is
/// broken; those cases fail loudly instead of guessing.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A line has no usable expected return date.
    ///
    /// ## When This Occurs
    /// - The upstream rental record never stored a due date
    /// - The stored date failed to parse at the gateway boundary
    ///
    /// Lateness cannot be derived without a due date, and defaulting to
    /// "today" would silently zero the late fee. The cashier sees the
    /// product name and escalates.
    #[error("Line {line_id} ({product_name}) has no expected return date")]
    InvalidSchedule {
        line_id: String,
        product_name: String,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
