//! # Condition Classification
//!
//! Turns the cashier's free-text condition label into a fee grade.
//!
//! ## Classification Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              classify_condition(label) — first match wins               │
//! │                                                                         │
//! │  lowercase(trim(label))                                                │
//! │      │                                                                  │
//! │      ├─ contains lost keyword?      ──► Lost    (replacement value)    │
//! │      ├─ contains severe keyword?    ──► Severe  (4× daily rate)        │
//! │      ├─ contains moderate keyword?  ──► Moderate(2× daily rate)        │
//! │      ├─ contains light keyword?     ──► Light   (1× daily rate)        │
//! │      ├─ contains good keyword?      ──► Good    (no fee)               │
//! │      └─ otherwise                   ──► Moderate(2× daily rate)        │
//! │                                                                         │
//! │  Good comes AFTER the damage tiers: "Baik tapi rusak ringan" is        │
//! │  light damage, while a bare "Baik" still reads as good.                │
//! │  Unrecognized text falls to moderate — never silently to zero.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::rules::{
    PenaltyRules, GOOD_KEYWORDS, LIGHT_DAMAGE_KEYWORDS, LOST_KEYWORDS,
    MODERATE_DAMAGE_KEYWORDS, SEVERE_DAMAGE_KEYWORDS,
};
use crate::types::SeverityTier;

// =============================================================================
// Condition Grade
// =============================================================================

/// Fee grade of a condition label. Finer-grained than [`SeverityTier`]:
/// the three damage grades all report as `Damaged` but carry different fees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ConditionGrade {
    /// No damage reported.
    Good,
    /// Light damage or staining (1× daily rate).
    LightDamage,
    /// Moderate damage, also the unrecognized-label fallback (2× daily rate).
    ModerateDamage,
    /// Severe damage (4× daily rate).
    SevereDamage,
    /// Item never came back; replacement value charged.
    Lost,
}

impl ConditionGrade {
    /// Collapses the grade to its reporting tier. Lateness promotion
    /// (`OnTime → Late`) happens in the penalty formula, not here.
    pub fn severity_tier(&self) -> SeverityTier {
        match self {
            ConditionGrade::Good => SeverityTier::OnTime,
            ConditionGrade::LightDamage
            | ConditionGrade::ModerateDamage
            | ConditionGrade::SevereDamage => SeverityTier::Damaged,
            ConditionGrade::Lost => SeverityTier::Lost,
        }
    }
}

// =============================================================================
// Condition Assessment
// =============================================================================

/// The classifier's ruling on one condition label.
///
/// For lost items the fee here covers what the classifier can know on its
/// own: the cashier's override, else the policy fallback. The penalty
/// formula upgrades the fallback to the line's recorded unit cost when one
/// exists (see [`crate::penalty::lost_unit_replacement_value`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConditionAssessment {
    /// The resolved fee grade.
    pub grade: ConditionGrade,

    /// Condition fee per unit (before quantity scaling).
    pub per_unit_fee: Money,

    /// Short explanation of the ruling, shown next to the fee.
    pub description: String,
}

// =============================================================================
// Classification
// =============================================================================

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| haystack.contains(kw))
}

/// Classifies a condition label into a grade and per-unit fee.
///
/// Matching is case-insensitive substring search against the keyword
/// tables in [`crate::rules`], in strict precedence order (lost, severe,
/// moderate, light, good). Total: every input classifies, including the
/// empty string.
///
/// ## Example
/// ```rust
/// use sandang_core::classify::{classify_condition, ConditionGrade};
/// use sandang_core::money::Money;
/// use sandang_core::rules::PenaltyRules;
///
/// let rules = PenaltyRules::default();
/// let a = classify_condition("Buruk - kerusakan besar", None, &rules);
/// assert_eq!(a.grade, ConditionGrade::SevereDamage);
/// assert_eq!(a.per_unit_fee, Money::from_rupiah(20_000));
/// ```
pub fn classify_condition(
    label: &str,
    original_cost_override: Option<Money>,
    rules: &PenaltyRules,
) -> ConditionAssessment {
    let normalized = label.trim().to_lowercase();

    if contains_any(&normalized, LOST_KEYWORDS) {
        let (per_unit_fee, description) = match original_cost_override {
            Some(value) if value.is_positive() => {
                (value, "lost item - cashier-entered replacement value".to_string())
            }
            _ => (
                rules.lost_item_fallback_fee(),
                "lost item - replacement value charged".to_string(),
            ),
        };
        return ConditionAssessment {
            grade: ConditionGrade::Lost,
            per_unit_fee,
            description,
        };
    }

    if contains_any(&normalized, SEVERE_DAMAGE_KEYWORDS) {
        return ConditionAssessment {
            grade: ConditionGrade::SevereDamage,
            per_unit_fee: rules.severe_damage_fee(),
            description: format!(
                "severe damage ({}x daily rate)",
                rules.severe_damage_multiplier
            ),
        };
    }

    if contains_any(&normalized, MODERATE_DAMAGE_KEYWORDS) {
        return ConditionAssessment {
            grade: ConditionGrade::ModerateDamage,
            per_unit_fee: rules.moderate_damage_fee(),
            description: format!(
                "moderate damage ({}x daily rate)",
                rules.moderate_damage_multiplier
            ),
        };
    }

    if contains_any(&normalized, LIGHT_DAMAGE_KEYWORDS) {
        return ConditionAssessment {
            grade: ConditionGrade::LightDamage,
            per_unit_fee: rules.light_damage_fee(),
            description: format!(
                "light damage ({}x daily rate)",
                rules.light_damage_multiplier
            ),
        };
    }

    if contains_any(&normalized, GOOD_KEYWORDS) {
        return ConditionAssessment {
            grade: ConditionGrade::Good,
            per_unit_fee: Money::zero(),
            description: "good condition - no condition fee".to_string(),
        };
    }

    ConditionAssessment {
        grade: ConditionGrade::ModerateDamage,
        per_unit_fee: rules.moderate_damage_fee(),
        description: format!(
            "unrecognized condition, treated as moderate damage ({}x daily rate)",
            rules.moderate_damage_multiplier
        ),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
