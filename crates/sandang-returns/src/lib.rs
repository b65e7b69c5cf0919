//! # sandang-returns: Return Workflow Engine for Sandang POS
//!
//! This crate provides the async orchestration layer for garment returns:
//! the three-step return session, the duplicate-submission guard, and the
//! gateway boundary to the transaction backend. All penalty arithmetic
//! lives in `sandang-core`; this crate decides when it runs and what
//! happens with the result.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Return Workflow Architecture                       │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      ReturnEngine (Façade)                       │  │
//! │  │                                                                  │  │
//! │  │  Owns the penalty policy and the submission guard                │  │
//! │  │  Hands out sessions, routes commits                              │  │
//! │  └────────────┬────────────────────────────┬────────────────────────┘  │
//! │               │                            │                           │
//! │               ▼                            ▼                           │
//! │  ┌────────────────────────┐   ┌─────────────────────────────────────┐  │
//! │  │     ReturnSession      │   │       ReturnSubmissionGuard         │  │
//! │  │                        │   │                                     │  │
//! │  │ Step 1: declare        │   │ Concurrent commits share one       │  │
//! │  │ Step 2: review penalty │   │ gateway call; 30s cooldown per     │  │
//! │  │ Step 3: confirm        │   │ fingerprint; dispatched commits    │  │
//! │  │ (sandang-core math)    │   │ survive caller cancellation        │  │
//! │  └────────────────────────┘   └──────────────────┬──────────────────┘  │
//! │                                                  │                     │
//! │                                                  ▼                     │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │               TransactionGateway (async trait)                   │  │
//! │  │                                                                  │  │
//! │  │  load_transaction / commit_return                                │  │
//! │  │  Implemented by the host backend; MemoryGateway for tests        │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`engine`] - `ReturnEngine` façade (load, session, commit)
//! - [`error`] - Workflow error types
//! - [`fingerprint`] - Canonical fingerprint of a submission's intent
//! - [`gateway`] - `TransactionGateway` trait and commit DTOs
//! - [`guard`] - Duplicate-submission guard
//! - [`memory`] - In-memory gateway for tests and demos
//! - [`session`] - Three-step return session state machine
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use chrono::Utc;
//! use sandang_core::types::ConditionSplit;
//! use sandang_returns::{MemoryGateway, ReturnEngine};
//!
//! let gateway = Arc::new(MemoryGateway::new().with_transaction(rental));
//! let engine = ReturnEngine::new(gateway);
//!
//! let transaction = engine.load_transaction("TRX-20260815-0012").await?;
//! let mut session = engine.create_session(transaction);
//!
//! // Step 1: declare what came back, in what condition
//! session.set_condition_split(
//!     "line-1",
//!     0,
//!     ConditionSplit::new("Baik - tidak ada kerusakan", 2),
//! )?;
//!
//! // Step 2: review the computed penalty
//! session.advance_step(Utc::now())?;
//! println!("Penalty: {}", session.last_result().unwrap().total_penalty);
//!
//! // Step 3: confirm and commit
//! session.advance_step(Utc::now())?;
//! let outcome = engine.commit_return(&mut session, "").await?;
//! println!("{}", outcome.message);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod gateway;
pub mod guard;
pub mod memory;
pub mod session;

// =============================================================================
// Re-exports
// =============================================================================

// Façade
pub use engine::{CommitOutcome, ReturnEngine};
pub use error::{EngineError, EngineResult};

// Gateway boundary
pub use gateway::{
    GatewayError, GatewayResult, ReturnCommitReceipt, ReturnCommitRequest, ReturnLineDeclaration,
    TransactionGateway,
};
pub use memory::MemoryGateway;

// Workflow internals callers interact with
pub use fingerprint::SubmissionFingerprint;
pub use guard::{ReturnSubmissionGuard, COOLDOWN_WINDOW};
pub use session::{RetreatOutcome, ReturnSession, ReturnStep, SessionSummary};
