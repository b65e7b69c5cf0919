//! # Penalty Rules
//!
//! The configurable penalty policy plus the Indonesian keyword tables that
//! drive condition classification.
//!
//! ## Fee Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Penalty Fee Policy                               │
//! │                                                                         │
//! │  Late fee (per unit):     late_days × daily rate                       │
//! │                           (1 hour late = 1 full day, capped at 365)    │
//! │                                                                         │
//! │  Condition fee (per unit, added on top of any late fee):               │
//! │  ┌──────────┬────────────────┬───────────────────────────────────┐     │
//! │  │ Tier     │ Fee            │ Example labels                    │     │
//! │  ├──────────┼────────────────┼───────────────────────────────────┤     │
//! │  │ good     │ 0              │ "Baik - tidak ada kerusakan"      │     │
//! │  │ light    │ 1× daily rate  │ "Kotor terkena lumpur"            │     │
//! │  │ moderate │ 2× daily rate  │ "Kerusakan sedang pada resleting" │     │
//! │  │ severe   │ 4× daily rate  │ "Buruk - kerusakan besar"         │     │
//! │  │ lost     │ replacement    │ "Hilang"                          │     │
//! │  └──────────┴────────────────┴───────────────────────────────────┘     │
//! │                                                                         │
//! │  Lost replacement value, first match wins:                              │
//! │    1. cashier's per-unit override on the split                          │
//! │    2. the line's recorded per-unit original cost                        │
//! │    3. daily rate × 30                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Defaults match the store's standing policy; deployments override by
//! deserializing a `PenaltyRules` from their settings store.

use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Policy Constants
// =============================================================================

/// Standing daily late rate: Rp 5.000 per unit per day.
pub const DAILY_LATE_RATE: Money = Money::from_rupiah(5_000);

// =============================================================================
// Keyword Tables
// =============================================================================
//
// Classification works on lowercased labels, so the tables are lowercase.
// Damage tiers use compound phrases ("kerusakan besar", not bare
// "kerusakan") so that "tidak ada kerusakan" does not read as damage.

/// Labels meaning the item never came back.
pub const LOST_KEYWORDS: &[&str] = &["hilang", "tidak dikembalikan"];

/// Labels meaning heavy damage (4× daily rate).
pub const SEVERE_DAMAGE_KEYWORDS: &[&str] = &["kerusakan besar", "rusak berat", "buruk"];

/// Labels meaning moderate damage (2× daily rate).
pub const MODERATE_DAMAGE_KEYWORDS: &[&str] = &["kerusakan sedang", "rusak sedang", "noda berat"];

/// Labels meaning light damage or staining (1× daily rate).
pub const LIGHT_DAMAGE_KEYWORDS: &[&str] =
    &["kerusakan kecil", "rusak ringan", "kotor", "noda ringan"];

/// Labels meaning the item is fine. Checked after the damage tiers so a
/// mixed label ("baik tapi rusak ringan") lands on the damage tier.
pub const GOOD_KEYWORDS: &[&str] = &["baik", "tidak ada kerusakan"];

// =============================================================================
// Penalty Rules
// =============================================================================

/// The penalty policy in force for a calculation.
///
/// ## Example
/// ```rust
/// use sandang_core::rules::PenaltyRules;
/// use sandang_core::money::Money;
///
/// let rules = PenaltyRules::default();
/// assert_eq!(rules.daily_late_rate, Money::from_rupiah(5_000));
/// assert_eq!(rules.severe_damage_fee(), Money::from_rupiah(20_000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyRules {
    /// Late fee per unit per day.
    #[serde(default = "default_daily_late_rate")]
    pub daily_late_rate: Money,

    /// Condition-fee multiplier for light damage.
    #[serde(default = "default_light_multiplier")]
    pub light_damage_multiplier: i64,

    /// Condition-fee multiplier for moderate damage. Also the fallback
    /// tier for labels no keyword table recognizes.
    #[serde(default = "default_moderate_multiplier")]
    pub moderate_damage_multiplier: i64,

    /// Condition-fee multiplier for severe damage.
    #[serde(default = "default_severe_multiplier")]
    pub severe_damage_multiplier: i64,

    /// Days of daily rate charged for a lost item when no replacement
    /// value is known.
    #[serde(default = "default_lost_item_days")]
    pub lost_item_default_days: i64,

    /// Hard cap on late days entering the fee formula. Rentals abandoned
    /// for years settle as lost items, not as unbounded late fees.
    #[serde(default = "default_max_penalty_days")]
    pub max_penalty_days: i64,
}

fn default_daily_late_rate() -> Money {
    DAILY_LATE_RATE
}

fn default_light_multiplier() -> i64 {
    1
}

fn default_moderate_multiplier() -> i64 {
    2
}

fn default_severe_multiplier() -> i64 {
    4
}

fn default_lost_item_days() -> i64 {
    30
}

fn default_max_penalty_days() -> i64 {
    365
}

impl Default for PenaltyRules {
    fn default() -> Self {
        PenaltyRules {
            daily_late_rate: default_daily_late_rate(),
            light_damage_multiplier: default_light_multiplier(),
            moderate_damage_multiplier: default_moderate_multiplier(),
            severe_damage_multiplier: default_severe_multiplier(),
            lost_item_default_days: default_lost_item_days(),
            max_penalty_days: default_max_penalty_days(),
        }
    }
}

impl PenaltyRules {
    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Per-unit fee for light damage.
    pub fn light_damage_fee(&self) -> Money {
        self.daily_late_rate * self.light_damage_multiplier
    }

    /// Per-unit fee for moderate damage.
    pub fn moderate_damage_fee(&self) -> Money {
        self.daily_late_rate * self.moderate_damage_multiplier
    }

    /// Per-unit fee for severe damage.
    pub fn severe_damage_fee(&self) -> Money {
        self.daily_late_rate * self.severe_damage_multiplier
    }

    /// Per-unit lost-item fee when no replacement value is known.
    pub fn lost_item_fallback_fee(&self) -> Money {
        self.daily_late_rate * self.lost_item_default_days
    }
}

// =============================================================================
// Standard Condition Labels
// =============================================================================

/// Preset condition options the return screen offers alongside free text.
///
/// One preset per tier, worded so the keyword tables classify each preset
/// into its intended tier.
pub fn standard_condition_labels() -> &'static [&'static str] {
    &[
        "Baik - tidak ada kerusakan",
        "Kotor - perlu cuci ekstra",
        "Kerusakan kecil - noda ringan",
        "Kerusakan sedang - perlu perbaikan",
        "Buruk - kerusakan besar",
        "Hilang - tidak dikembalikan",
    ]
}

// =============================================================================
// Unit Tests
// =============================================================================
