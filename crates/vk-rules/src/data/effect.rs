//! Perk effect variants.
//!
//! Each perk carries a list of [`PerkEffect`]s. The three categories are
//! closed so that stat derivation is a total match over them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::skills::Skill;

/// A single effect granted by a perk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerkEffect {
    /// A stat delta applied once per owned rank.
    PerRank(PerRankEffect),
    /// A bonus that only matters during combat resolution at the table.
    Combat(CombatEffect),
    /// A rule change with no numeric stat.
    SpecialRule(SpecialRuleEffect),
}

/// Stat deltas scaled by perk rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerRankEffect {
    /// Maximum hit points.
    MaxHp(i32),
    /// Physical damage resistance.
    DrPhysical(i32),
    /// Energy damage resistance.
    DrEnergy(i32),
    /// Radiation damage resistance.
    DrRadiation(i32),
    /// Carry capacity in pounds.
    CarryCapacity(i32),
}

/// Combat-only bonuses, reported on the stat block for the table to apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatEffect {
    /// Extra damage dice with a weapon category.
    DamageBonus {
        /// Weapon category the bonus applies to.
        weapon: String,
        /// Extra damage per rank.
        amount: i32,
    },
    /// Re-roll dice on skill tests.
    Reroll {
        /// Skill the re-roll applies to.
        skill: Skill,
        /// Dice re-rolled per rank.
        dice: u32,
    },
    /// Reduced action point cost for an action.
    ApDiscount {
        /// Action the discount applies to.
        action: String,
        /// AP saved per rank.
        amount: u32,
    },
}

impl CombatEffect {
    /// Scale the numeric part by perk rank.
    pub fn scaled(&self, rank: u32) -> Self {
        match self {
            Self::DamageBonus { weapon, amount } => Self::DamageBonus {
                weapon: weapon.clone(),
                amount: amount * rank as i32,
            },
            Self::Reroll { skill, dice } => Self::Reroll {
                skill: *skill,
                dice: dice * rank,
            },
            Self::ApDiscount { action, amount } => Self::ApDiscount {
                action: action.clone(),
                amount: amount * rank,
            },
        }
    }
}

impl fmt::Display for CombatEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DamageBonus { weapon, amount } => write!(f, "+{amount} damage with {weapon}"),
            Self::Reroll { skill, dice } => write!(f, "re-roll {dice} dice on {skill} tests"),
            Self::ApDiscount { action, amount } => write!(f, "{action} costs {amount} AP less"),
        }
    }
}

/// Rule changes that do not map to a stat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialRuleEffect {
    /// Immunity to a hazard (radiation, poison, disease).
    Immunity {
        /// The hazard ignored.
        hazard: String,
    },
    /// A named rule with free-text wording.
    Rule {
        /// Stable rule id.
        id: String,
        /// Rule wording for display.
        description: String,
    },
}

impl fmt::Display for SpecialRuleEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immunity { hazard } => write!(f, "immune to {hazard}"),
            Self::Rule { description, .. } => write!(f, "{description}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combat_effect_scales_with_rank() {
        let effect = CombatEffect::DamageBonus {
            weapon: "melee weapons".to_string(),
            amount: 1,
        };
        assert_eq!(effect.scaled(3).to_string(), "+3 damage with melee weapons");
    }

    #[test]
    fn json_shape_is_externally_tagged() {
        let effect = PerkEffect::PerRank(PerRankEffect::DrPhysical(1));
        let json = serde_json::to_string(&effect).unwrap();
        assert_eq!(json, r#"{"per_rank":{"dr_physical":1}}"#);
    }

    #[test]
    fn special_rule_display() {
        let rule = SpecialRuleEffect::Immunity {
            hazard: "radiation".to_string(),
        };
        assert_eq!(rule.to_string(), "immune to radiation");
    }
}
