//! # Submission Fingerprint
//!
//! Stable identity of a commit request, used by the guard to recognize a
//! resubmission of the same user intent.
//!
//! ## Construction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Fingerprint Allow-List                               │
//! │                                                                         │
//! │  ReturnCommitRequest                                                   │
//! │  ├── transaction_code      ──► INCLUDED                                │
//! │  ├── lines (id + splits)   ──► INCLUDED (sorted by line_id)            │
//! │  ├── notes                 ──► INCLUDED                                │
//! │  ├── actual_return_date    ──✗ EXCLUDED (volatile)                     │
//! │  ├── total_penalty         ──✗ EXCLUDED (derived from splits)          │
//! │  └── summary               ──✗ EXCLUDED (derived from splits)          │
//! │                                                                         │
//! │  The canonical payload is built from an explicit allow-list struct,    │
//! │  so a field added to the request later stays OUT of the fingerprint    │
//! │  until someone deliberately puts it in. Volatile fields can never      │
//! │  leak in through "whole payload minus timestamp" string surgery.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two clicks of the same confirm button fingerprint identically even
//! though their requests carry different wall-clock dates. Fingerprints
//! live only in guard memory; they are never persisted or sent anywhere.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::gateway::ReturnCommitRequest;
use sandang_core::types::ConditionSplit;

// =============================================================================
// Canonical Payload (private)
// =============================================================================

#[derive(Serialize)]
struct CanonicalLine<'a> {
    line_id: &'a str,
    splits: &'a [ConditionSplit],
}

#[derive(Serialize)]
struct CanonicalPayload<'a> {
    transaction_code: &'a str,
    lines: Vec<CanonicalLine<'a>>,
    notes: &'a str,
}

// =============================================================================
// Submission Fingerprint
// =============================================================================

/// Canonical identity of one commit intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionFingerprint(String);

impl SubmissionFingerprint {
    /// Builds the fingerprint for a commit request.
    ///
    /// Lines are sorted by `line_id` so the identity does not depend on
    /// declaration order; split order within a line is kept, since it is
    /// part of what the cashier declared.
    pub fn for_request(request: &ReturnCommitRequest) -> Self {
        let mut lines: Vec<CanonicalLine<'_>> = request
            .lines
            .iter()
            .map(|line| CanonicalLine {
                line_id: &line.line_id,
                splits: &line.splits,
            })
            .collect();
        lines.sort_by(|a, b| a.line_id.cmp(b.line_id));

        let payload = CanonicalPayload {
            transaction_code: &request.transaction_code,
            lines,
            notes: &request.notes,
        };

        // Strings and integers only; serialization cannot fail.
        let canonical =
            serde_json::to_string(&payload).expect("canonical payload serializes");
        SubmissionFingerprint(canonical)
    }

    /// The canonical form. Mostly useful in tests and debug output.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short digest for structured log fields, where the full canonical
    /// JSON would drown the log line.
    pub fn short_digest(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.0.hash(&mut hasher);
        hasher.finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::ReturnLineDeclaration;
    use chrono::{Duration, Utc};
    use sandang_core::money::Money;
    use sandang_core::types::PenaltySummary;

    fn request() -> ReturnCommitRequest {
        ReturnCommitRequest {
            transaction_code: "TRX-001".to_string(),
            actual_return_date: Utc::now(),
            notes: "dikembalikan oleh suami".to_string(),
            lines: vec![
                ReturnLineDeclaration {
                    line_id: "line-1".to_string(),
                    splits: vec![ConditionSplit::new("Baik - tidak ada kerusakan", 2)],
                },
                ReturnLineDeclaration {
                    line_id: "line-2".to_string(),
                    splits: vec![ConditionSplit::new("Rusak ringan", 1)],
                },
            ],
            total_penalty: Money::from_rupiah(5_000),
            summary: PenaltySummary::default(),
        }
    }

    #[test]
    fn test_identical_requests_match() {
        assert_eq!(
            SubmissionFingerprint::for_request(&request()),
            SubmissionFingerprint::for_request(&request())
        );
    }

    #[test]
    fn test_timestamp_excluded_by_construction() {
        let first = request();
        let mut second = request();
        second.actual_return_date = first.actual_return_date + Duration::seconds(42);

        assert_eq!(
            SubmissionFingerprint::for_request(&first),
            SubmissionFingerprint::for_request(&second)
        );
    }

    #[test]
    fn test_derived_totals_excluded() {
        let first = request();
        let mut second = request();
        second.total_penalty = Money::from_rupiah(999_999);
        second.summary.lost_units = 7;

        assert_eq!(
            SubmissionFingerprint::for_request(&first),
            SubmissionFingerprint::for_request(&second)
        );
    }

    #[test]
    fn test_declared_content_included() {
        let base = SubmissionFingerprint::for_request(&request());

        let mut other_notes = request();
        other_notes.notes = "".to_string();
        assert_ne!(base, SubmissionFingerprint::for_request(&other_notes));

        let mut other_quantity = request();
        other_quantity.lines[0].splits[0].quantity = 1;
        assert_ne!(base, SubmissionFingerprint::for_request(&other_quantity));

        let mut other_label = request();
        other_label.lines[1].splits[0].condition_label = "Hilang".to_string();
        assert_ne!(base, SubmissionFingerprint::for_request(&other_label));
    }

    #[test]
    fn test_line_order_does_not_matter() {
        let first = request();
        let mut second = request();
        second.lines.reverse();

        assert_eq!(
            SubmissionFingerprint::for_request(&first),
            SubmissionFingerprint::for_request(&second)
        );
    }
}
