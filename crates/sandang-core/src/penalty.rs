//! # Penalty Calculation
//!
//! Pure fee arithmetic: late days, per-split fees, transaction totals.
//!
//! ## Calculation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   compute_transaction_penalty                           │
//! │                                                                         │
//! │  for each LineReturnState                                              │
//! │      │                                                                  │
//! │      ├─ expected_return_date missing? ──► Err(InvalidSchedule)         │
//! │      │                                                                  │
//! │      ├─ late_days = ceil((actual − expected) / 1 day), ≥0, ≤cap        │
//! │      │   (one count per line — every split shares it)                  │
//! │      │                                                                  │
//! │      └─ for each ConditionSplit                                        │
//! │             late_fee      = late_days × daily rate × quantity          │
//! │             condition_fee = per-unit fee × quantity                    │
//! │             total         = late_fee + condition_fee                   │
//! │             tier          = grade tier, OnTime→Late when late          │
//! │                                                                         │
//! │  result = Σ breakdowns + per-tier summary                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is a pure function of its arguments. Recomputing an
//! unchanged session yields an identical (`==`) result, which the workflow
//! layer relies on for staleness handling.
//!
//! Inputs are assumed validated: quantities positive, labels within length
//! bounds, allocations not exceeding the line. The validator runs first;
//! these functions do not re-check.

use chrono::{DateTime, Utc};

use crate::classify::{classify_condition, ConditionGrade};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::rules::PenaltyRules;
use crate::types::{
    ConditionSplit, LineReturnState, PenaltyCalculationResult, PenaltyLineBreakdown,
    PenaltySummary, SeverityTier,
};

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

// =============================================================================
// Late Days
// =============================================================================

/// Whole late days between the expected and actual return instants.
///
/// ## Rules
/// - Any positive overrun rounds UP: one hour late is 1 full day
/// - Early or on-time returns are 0, never negative
/// - Capped at `rules.max_penalty_days` — a rental abandoned for years
///   settles as a lost item, not as an unbounded late fee
///
/// ## Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use sandang_core::penalty::compute_late_days;
/// use sandang_core::rules::PenaltyRules;
///
/// let rules = PenaltyRules::default();
/// let due = Utc.with_ymd_and_hms(2026, 8, 10, 12, 0, 0).unwrap();
/// let back = Utc.with_ymd_and_hms(2026, 8, 10, 13, 0, 0).unwrap();
/// assert_eq!(compute_late_days(due, back, &rules), 1);
/// assert_eq!(compute_late_days(due, due, &rules), 0);
/// ```
pub fn compute_late_days(
    expected: DateTime<Utc>,
    actual: DateTime<Utc>,
    rules: &PenaltyRules,
) -> i64 {
    let overrun_ms = actual.signed_duration_since(expected).num_milliseconds();
    if overrun_ms <= 0 {
        return 0;
    }
    let days = (overrun_ms + MS_PER_DAY - 1) / MS_PER_DAY;
    days.min(rules.max_penalty_days)
}

// =============================================================================
// Lost-Item Valuation
// =============================================================================

/// Per-unit replacement value for a lost split.
///
/// First usable value wins: the cashier's override, the line's recorded
/// unit cost, then `daily rate × lost_item_default_days`. Zero and
/// negative candidates are skipped, not charged.
pub fn lost_unit_replacement_value(
    cost_override: Option<Money>,
    line_unit_cost: Option<Money>,
    rules: &PenaltyRules,
) -> Money {
    match cost_override {
        Some(value) if value.is_positive() => value,
        _ => match line_unit_cost {
            Some(value) if value.is_positive() => value,
            _ => rules.lost_item_fallback_fee(),
        },
    }
}

// =============================================================================
// Per-Split Penalty
// =============================================================================

/// Computes the penalty breakdown for one condition split.
///
/// `late_days` is passed in rather than derived here because lateness
/// belongs to the line: every split of one line carries the same count.
pub fn compute_split_penalty(
    line: &LineReturnState,
    split_index: usize,
    split: &ConditionSplit,
    late_days: i64,
    rules: &PenaltyRules,
) -> PenaltyLineBreakdown {
    let assessment = classify_condition(&split.condition_label, split.original_cost_override, rules);

    // The classifier cannot see the line, so for lost splits without an
    // override it answered with the policy fallback; re-resolve with the
    // line's unit cost in the chain.
    let per_unit_fee = if assessment.grade == ConditionGrade::Lost {
        lost_unit_replacement_value(split.original_cost_override, line.unit_original_cost, rules)
    } else {
        assessment.per_unit_fee
    };

    let late_fee = rules.daily_late_rate * late_days * split.quantity;
    let condition_fee = per_unit_fee.multiply_quantity(split.quantity);
    let total = late_fee + condition_fee;

    // Lost and Damaged outrank lateness; a clean-but-late split reports
    // as Late.
    let severity_tier = match assessment.grade.severity_tier() {
        SeverityTier::OnTime if late_days > 0 => SeverityTier::Late,
        tier => tier,
    };

    let description = if late_days > 0 {
        format!(
            "late by {} day(s) at {}/day; {}",
            late_days, rules.daily_late_rate, assessment.description
        )
    } else {
        assessment.description
    };

    PenaltyLineBreakdown {
        line_id: line.line_id.clone(),
        product_name: line.product_name.clone(),
        split_index,
        condition_label: split.condition_label.clone(),
        quantity: split.quantity,
        late_days,
        late_fee,
        condition_fee,
        total,
        severity_tier,
        description,
    }
}

// =============================================================================
// Transaction Penalty
// =============================================================================

/// Computes the full penalty for a set of line declarations.
///
/// Breakdowns come out in input order (splits within their line, lines in
/// the order given), so repeated runs over the same session render the
/// same review screen.
///
/// ## Errors
/// `CoreError::InvalidSchedule` when any line lacks its expected return
/// date. Lateness cannot be derived without one, and defaulting to "today"
/// would silently zero the late fee — the whole calculation fails instead.
pub fn compute_transaction_penalty<'a, I>(
    lines: I,
    actual_return_date: DateTime<Utc>,
    rules: &PenaltyRules,
) -> CoreResult<PenaltyCalculationResult>
where
    I: IntoIterator<Item = &'a LineReturnState>,
{
    let mut breakdowns = Vec::new();
    let mut total_penalty = Money::zero();
    let mut summary = PenaltySummary::default();

    for line in lines {
        let expected = line
            .expected_return_date
            .ok_or_else(|| CoreError::InvalidSchedule {
                line_id: line.line_id.clone(),
                product_name: line.product_name.clone(),
            })?;
        let late_days = compute_late_days(expected, actual_return_date, rules);

        if !line.splits.is_empty() {
            summary.total_lines += 1;
        }
        for (split_index, split) in line.splits.iter().enumerate() {
            let breakdown = compute_split_penalty(line, split_index, split, late_days, rules);
            total_penalty += breakdown.total;
            summary.record_split(breakdown.severity_tier, breakdown.quantity, late_days);
            breakdowns.push(breakdown);
        }
    }

    Ok(PenaltyCalculationResult {
        breakdowns,
        total_penalty,
        summary,
        actual_return_date,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn rules() -> PenaltyRules {
        PenaltyRules::default()
    }

    fn due_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 10, 12, 0, 0).unwrap()
    }

    fn line(total_quantity: i64, splits: Vec<ConditionSplit>) -> LineReturnState {
        LineReturnState {
            line_id: "line-1".to_string(),
            product_name: "Kebaya Encim".to_string(),
            total_quantity,
            unit_original_cost: None,
            expected_return_date: Some(due_date()),
            splits,
        }
    }

    // =========================================================================
    // Late Days
    // =========================================================================

    #[test]
    fn test_late_days_on_time_and_early() {
        let due = due_date();
        assert_eq!(compute_late_days(due, due, &rules()), 0);
        let early = due - chrono::Duration::days(2);
        assert_eq!(compute_late_days(due, early, &rules()), 0);
    }

    #[test]
    fn test_late_days_rounds_up() {
        let due = due_date();
        let one_hour = due + chrono::Duration::hours(1);
        assert_eq!(compute_late_days(due, one_hour, &rules()), 1);

        let exactly_one_day = due + chrono::Duration::days(1);
        assert_eq!(compute_late_days(due, exactly_one_day, &rules()), 1);

        let just_over = due + chrono::Duration::days(1) + chrono::Duration::milliseconds(1);
        assert_eq!(compute_late_days(due, just_over, &rules()), 2);
    }

    #[test]
    fn test_late_days_capped() {
        let due = due_date();
        let abandoned = due + chrono::Duration::days(400);
        assert_eq!(compute_late_days(due, abandoned, &rules()), 365);
    }

    #[test]
    fn test_late_days_monotonic_in_actual() {
        let due = due_date();
        let mut previous = 0;
        for hours in 0..100 {
            let days = compute_late_days(due, due + chrono::Duration::hours(hours), &rules());
            assert!(days >= previous);
            previous = days;
        }
    }

    // =========================================================================
    // Lost Valuation Chain
    // =========================================================================

    #[test]
    fn test_lost_value_chain() {
        let r = rules();
        let override_ = Some(Money::from_rupiah(75_000));
        let unit_cost = Some(Money::from_rupiah(120_000));

        assert_eq!(
            lost_unit_replacement_value(override_, unit_cost, &r),
            Money::from_rupiah(75_000)
        );
        assert_eq!(
            lost_unit_replacement_value(None, unit_cost, &r),
            Money::from_rupiah(120_000)
        );
        assert_eq!(
            lost_unit_replacement_value(None, None, &r),
            Money::from_rupiah(150_000)
        );
        // Zero-valued candidates are skipped, not charged.
        assert_eq!(
            lost_unit_replacement_value(Some(Money::zero()), Some(Money::zero()), &r),
            Money::from_rupiah(150_000)
        );
    }

    // =========================================================================
    // Store Scenarios
    // =========================================================================

    #[test]
    fn test_clean_on_time_return_is_free() {
        // 3 units, all good, returned on schedule.
        let state = line(3, vec![ConditionSplit::new("Baik - tidak ada kerusakan", 3)]);
        let result = compute_transaction_penalty([&state], due_date(), &rules()).unwrap();

        assert_eq!(result.total_penalty, Money::zero());
        assert_eq!(result.summary.on_time_units, 3);
        assert_eq!(result.summary.total_lines, 1);
        assert_eq!(result.headline_tier(), SeverityTier::OnTime);
    }

    #[test]
    fn test_clean_late_return_charges_per_unit_per_day() {
        // Same line, three days late: 3 days × Rp5.000 × 3 units.
        let state = line(3, vec![ConditionSplit::new("Baik - tidak ada kerusakan", 3)]);
        let back = due_date() + chrono::Duration::days(3);
        let result = compute_transaction_penalty([&state], back, &rules()).unwrap();

        assert_eq!(result.total_penalty, Money::from_rupiah(45_000));
        assert_eq!(result.summary.late_units, 3);
        assert_eq!(result.summary.aggregate_late_days, 9);
        assert_eq!(result.breakdowns[0].severity_tier, SeverityTier::Late);
        assert!(result.breakdowns[0].description.contains("late by 3 day(s)"));
    }

    #[test]
    fn test_mixed_condition_split() {
        // One severe unit plus one clean unit, on time: only the severe
        // unit is charged, 4× Rp5.000.
        let state = line(
            2,
            vec![
                ConditionSplit::new("Buruk - kerusakan besar", 1),
                ConditionSplit::new("Baik", 1),
            ],
        );
        let result = compute_transaction_penalty([&state], due_date(), &rules()).unwrap();

        assert_eq!(result.total_penalty, Money::from_rupiah(20_000));
        assert_eq!(result.breakdowns.len(), 2);
        assert_eq!(result.breakdowns[0].total, Money::from_rupiah(20_000));
        assert_eq!(result.breakdowns[1].total, Money::zero());
        assert_eq!(result.summary.damaged_units, 1);
        assert_eq!(result.summary.on_time_units, 1);
        assert_eq!(result.headline_tier(), SeverityTier::Damaged);
    }

    #[test]
    fn test_lost_item_with_override() {
        // Lost unit valued by the cashier at Rp75.000, on time.
        let state = line(
            1,
            vec![ConditionSplit::new("Hilang", 1).with_cost_override(Money::from_rupiah(75_000))],
        );
        let result = compute_transaction_penalty([&state], due_date(), &rules()).unwrap();

        assert_eq!(result.total_penalty, Money::from_rupiah(75_000));
        assert_eq!(result.breakdowns[0].severity_tier, SeverityTier::Lost);
        assert_eq!(result.summary.lost_units, 1);
    }

    #[test]
    fn test_lost_tier_survives_lateness() {
        // A lost split stays Lost no matter how late; the late fee still
        // applies on top of the replacement value.
        let state = line(
            1,
            vec![ConditionSplit::new("Hilang", 1).with_cost_override(Money::from_rupiah(75_000))],
        );
        let back = due_date() + chrono::Duration::days(2);
        let result = compute_transaction_penalty([&state], back, &rules()).unwrap();

        assert_eq!(result.breakdowns[0].severity_tier, SeverityTier::Lost);
        assert_eq!(result.breakdowns[0].late_fee, Money::from_rupiah(10_000));
        assert_eq!(result.breakdowns[0].condition_fee, Money::from_rupiah(75_000));
        assert_eq!(result.total_penalty, Money::from_rupiah(85_000));
    }

    #[test]
    fn test_lost_override_scales_per_unit() {
        // The override is a per-unit valuation: 2 lost units at Rp75.000
        // each charge Rp150.000.
        let state = line(
            2,
            vec![ConditionSplit::new("Hilang", 2).with_cost_override(Money::from_rupiah(75_000))],
        );
        let result = compute_transaction_penalty([&state], due_date(), &rules()).unwrap();

        assert_eq!(result.total_penalty, Money::from_rupiah(150_000));
    }

    #[test]
    fn test_lost_falls_back_to_line_unit_cost() {
        let mut state = line(1, vec![ConditionSplit::new("Hilang", 1)]);
        state.unit_original_cost = Some(Money::from_rupiah(120_000));
        let result = compute_transaction_penalty([&state], due_date(), &rules()).unwrap();

        assert_eq!(result.total_penalty, Money::from_rupiah(120_000));
    }

    #[test]
    fn test_damage_fee_independent_of_late_fee() {
        // Light damage, two days late: both fees apply to every unit.
        let state = line(2, vec![ConditionSplit::new("Kotor terkena lumpur", 2)]);
        let back = due_date() + chrono::Duration::days(2);
        let result = compute_transaction_penalty([&state], back, &rules()).unwrap();

        let b = &result.breakdowns[0];
        assert_eq!(b.late_fee, Money::from_rupiah(20_000)); // 2 days × 5k × 2 units
        assert_eq!(b.condition_fee, Money::from_rupiah(10_000)); // 1× 5k × 2 units
        assert_eq!(b.severity_tier, SeverityTier::Damaged);
        assert_eq!(result.total_penalty, Money::from_rupiah(30_000));
    }

    #[test]
    fn test_missing_schedule_fails_loudly() {
        let mut state = line(1, vec![ConditionSplit::new("Baik", 1)]);
        state.expected_return_date = None;

        let err = compute_transaction_penalty([&state], due_date(), &rules()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidSchedule { .. }));
        assert!(err.to_string().contains("Kebaya Encim"));
    }

    #[test]
    fn test_recomputation_is_identical() {
        let state = line(
            2,
            vec![
                ConditionSplit::new("Rusak ringan", 1),
                ConditionSplit::new("Baik", 1),
            ],
        );
        let back = due_date() + chrono::Duration::days(1);

        let first = compute_transaction_penalty([&state], back, &rules()).unwrap();
        let second = compute_transaction_penalty([&state], back, &rules()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_multiple_lines_sum_in_order() {
        let mut first = line(1, vec![ConditionSplit::new("Baik", 1)]);
        first.line_id = "line-1".to_string();
        let mut second = line(1, vec![ConditionSplit::new("Buruk - kerusakan besar", 1)]);
        second.line_id = "line-2".to_string();

        let result =
            compute_transaction_penalty([&first, &second], due_date(), &rules()).unwrap();

        assert_eq!(result.total_penalty, Money::from_rupiah(20_000));
        assert_eq!(result.summary.total_lines, 2);
        assert_eq!(result.breakdowns[0].line_id, "line-1");
        assert_eq!(result.breakdowns[1].line_id, "line-2");
    }
}
