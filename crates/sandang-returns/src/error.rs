//! # Engine Error Types
//!
//! Workflow-level errors for the return engine.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Return Engine Errors                              │
//! │                                                                         │
//! │  EngineError (this file)                                               │
//! │  ├── Core        ◄── sandang-core calculation failures                 │
//! │  ├── Gateway     ◄── transport/backend failures (verbatim, retryable)  │
//! │  ├── DuplicateSubmission  ◄── guard cooldown rejection                 │
//! │  └── workflow violations (step, session, line, split)                  │
//! │                                                                         │
//! │  NOT errors here:                                                      │
//! │  • validation findings — returned as SessionValidation values          │
//! │  • "already returned" — mapped to an idempotent success receipt        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::gateway::GatewayError;
use crate::session::ReturnStep;
use sandang_core::error::CoreError;

// =============================================================================
// Engine Error
// =============================================================================

/// Errors surfaced by the return workflow.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Penalty calculation failed (broken schedule data).
    #[error("Penalty calculation failed: {0}")]
    Core(#[from] CoreError),

    /// The gateway failed; message passed through verbatim so the UI can
    /// show it next to a retry affordance. The guard leaves its state
    /// clean, so the retry is not blocked by this attempt.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// An identical submission succeeded moments ago; the guard refuses a
    /// second ledger entry until the cooldown lapses.
    #[error("Duplicate submission - please wait {retry_after_secs} seconds")]
    DuplicateSubmission { retry_after_secs: u64 },

    /// The session's current step does not allow the requested operation.
    #[error("Not allowed at step {step}: {reason}")]
    StepNotAllowed { step: ReturnStep, reason: String },

    /// The session cannot be committed as it stands.
    #[error("Session is not ready to commit: {reason}")]
    SessionNotReady { reason: String },

    /// No line with this ID participates in the session.
    #[error("Unknown line: {line_id}")]
    UnknownLine { line_id: String },

    /// A split edit referenced an index past the end of the line's splits.
    #[error("Line {line_id} has no split at index {split_index}")]
    SplitIndexOutOfRange { line_id: String, split_index: usize },

    /// Every line keeps at least one split; remove is refused on the last.
    #[error("Line {line_id} must keep at least one condition split")]
    LastSplit { line_id: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EngineError::DuplicateSubmission {
            retry_after_secs: 17,
        };
        assert_eq!(
            err.to_string(),
            "Duplicate submission - please wait 17 seconds"
        );

        let err = EngineError::LastSplit {
            line_id: "line-3".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Line line-3 must keep at least one condition split"
        );
    }

    #[test]
    fn test_gateway_errors_pass_through_verbatim() {
        let err: EngineError = GatewayError::Unavailable {
            message: "connection refused".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Gateway unavailable: connection refused");
    }
}
