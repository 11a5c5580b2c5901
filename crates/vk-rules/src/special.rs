//! SPECIAL attributes and the attribute point-buy budget.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::RulesConfig;
use crate::data::Origin;
use crate::error::{RulesError, RulesResult};

/// One of the seven core attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// Raw physical power.
    Strength,
    /// Awareness of surroundings.
    Perception,
    /// Stamina and toughness.
    Endurance,
    /// Presence and force of personality.
    Charisma,
    /// Reasoning and memory.
    Intelligence,
    /// Coordination and reflexes.
    Agility,
    /// Fortune.
    Luck,
}

impl Attribute {
    /// All attributes in sheet order.
    pub const ALL: [Attribute; 7] = [
        Attribute::Strength,
        Attribute::Perception,
        Attribute::Endurance,
        Attribute::Charisma,
        Attribute::Intelligence,
        Attribute::Agility,
        Attribute::Luck,
    ];

    /// Lowercase name used in payloads and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::Strength => "strength",
            Self::Perception => "perception",
            Self::Endurance => "endurance",
            Self::Charisma => "charisma",
            Self::Intelligence => "intelligence",
            Self::Agility => "agility",
            Self::Luck => "luck",
        }
    }

    /// Parse a full name or the one-letter abbreviation (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|a| a.name() == lower || a.name()[..1] == lower)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A full set of attribute scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Special {
    /// Strength score.
    pub strength: u32,
    /// Perception score.
    pub perception: u32,
    /// Endurance score.
    pub endurance: u32,
    /// Charisma score.
    pub charisma: u32,
    /// Intelligence score.
    pub intelligence: u32,
    /// Agility score.
    pub agility: u32,
    /// Luck score.
    pub luck: u32,
}

impl Default for Special {
    fn default() -> Self {
        Self::uniform(5)
    }
}

impl Special {
    /// Every attribute at the same value.
    pub fn uniform(value: u32) -> Self {
        Self {
            strength: value,
            perception: value,
            endurance: value,
            charisma: value,
            intelligence: value,
            agility: value,
            luck: value,
        }
    }

    /// Read one attribute.
    pub fn get(&self, attribute: Attribute) -> u32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Perception => self.perception,
            Attribute::Endurance => self.endurance,
            Attribute::Charisma => self.charisma,
            Attribute::Intelligence => self.intelligence,
            Attribute::Agility => self.agility,
            Attribute::Luck => self.luck,
        }
    }

    /// Overwrite one attribute.
    pub fn set(&mut self, attribute: Attribute, value: u32) {
        let slot = match attribute {
            Attribute::Strength => &mut self.strength,
            Attribute::Perception => &mut self.perception,
            Attribute::Endurance => &mut self.endurance,
            Attribute::Charisma => &mut self.charisma,
            Attribute::Intelligence => &mut self.intelligence,
            Attribute::Agility => &mut self.agility,
            Attribute::Luck => &mut self.luck,
        };
        *slot = value;
    }

    /// Iterate `(attribute, value)` pairs in sheet order.
    pub fn iter(&self) -> impl Iterator<Item = (Attribute, u32)> + '_ {
        Attribute::ALL.into_iter().map(|a| (a, self.get(a)))
    }

    /// Add signed modifiers, saturating at zero.
    pub fn with_modifiers(&self, modifiers: impl IntoIterator<Item = (Attribute, i32)>) -> Self {
        let mut out = *self;
        for (attribute, delta) in modifiers {
            let value = (out.get(attribute) as i64 + delta as i64).max(0) as u32;
            out.set(attribute, value);
        }
        out
    }
}

/// Result of checking a pre-modifier attribute distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeBudget {
    /// Size of the point pool.
    pub pool: i32,
    /// Points spent above (or recovered below) the default value.
    pub spent: i32,
    /// `pool - spent`; negative means overspent.
    pub remaining: i32,
    /// False when overspent or when any attribute is out of range.
    pub valid: bool,
}

impl AttributeBudget {
    /// Every point is spent and the distribution is legal.
    pub fn is_complete(&self) -> bool {
        self.valid && self.remaining == 0
    }

    /// Points are left over.
    pub fn is_underspent(&self) -> bool {
        self.remaining > 0
    }
}

/// Compute the remaining attribute points for a pre-modifier distribution.
///
/// Never clamps: a negative `remaining` is reported as-is.
pub fn attribute_budget(special: &Special, config: &RulesConfig) -> AttributeBudget {
    let default = config.attribute_default as i32;
    let spent: i32 = special.iter().map(|(_, v)| v as i32 - default).sum();
    let remaining = config.attribute_pool - spent;
    let in_range = special
        .iter()
        .all(|(_, v)| (config.attribute_min..=config.attribute_max).contains(&v));
    AttributeBudget {
        pool: config.attribute_pool,
        spent,
        remaining,
        valid: in_range && remaining >= 0,
    }
}

/// Check that a pre-modifier value lies within the point-buy range.
pub fn check_attribute_range(
    attribute: Attribute,
    value: u32,
    config: &RulesConfig,
) -> RulesResult<()> {
    if (config.attribute_min..=config.attribute_max).contains(&value) {
        Ok(())
    } else {
        Err(RulesError::AttributeOutOfRange {
            attribute,
            value,
            min: config.attribute_min,
            max: config.attribute_max,
        })
    }
}

/// Validate a pre-modifier distribution, failing on the first range error
/// or on overspend. Underspend is returned as a budget with points left.
pub fn validate_attributes(special: &Special, config: &RulesConfig) -> RulesResult<AttributeBudget> {
    for (attribute, value) in special.iter() {
        check_attribute_range(attribute, value, config)?;
    }
    let budget = attribute_budget(special, config);
    if budget.remaining < 0 {
        return Err(RulesError::AttributeOverspent {
            remaining: budget.remaining,
        });
    }
    Ok(budget)
}

/// Post-modifier maximum for an attribute under the given origin.
pub fn attribute_maximum(attribute: Attribute, origin: Option<&Origin>, config: &RulesConfig) -> u32 {
    origin
        .and_then(|o| o.special_max.get(&attribute).copied())
        .unwrap_or(config.attribute_max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn spread(values: [u32; 7]) -> Special {
        let mut s = Special::default();
        for (a, v) in Attribute::ALL.into_iter().zip(values) {
            s.set(a, v);
        }
        s
    }

    #[test]
    fn default_distribution_has_full_pool() {
        let budget = attribute_budget(&Special::default(), &RulesConfig::default());
        assert_eq!(budget.remaining, 5);
        assert!(budget.valid);
        assert!(budget.is_underspent());
    }

    #[test]
    fn exact_spend_is_complete() {
        let s = spread([7, 6, 6, 5, 6, 5, 5]);
        let budget = validate_attributes(&s, &RulesConfig::default()).unwrap();
        assert_eq!(budget.remaining, 0);
        assert!(budget.is_complete());
    }

    #[test]
    fn lowering_an_attribute_refunds_a_point() {
        let s = spread([4, 5, 5, 5, 5, 5, 5]);
        let budget = attribute_budget(&s, &RulesConfig::default());
        assert_eq!(budget.remaining, 6);
    }

    #[test]
    fn overspend_reports_negative_remaining() {
        let s = spread([10, 10, 5, 5, 5, 5, 5]);
        let budget = attribute_budget(&s, &RulesConfig::default());
        assert_eq!(budget.remaining, -5);
        assert!(!budget.valid);
        assert_eq!(
            validate_attributes(&s, &RulesConfig::default()),
            Err(RulesError::AttributeOverspent { remaining: -5 })
        );
    }

    #[test]
    fn out_of_range_is_rejected() {
        let s = spread([3, 5, 5, 5, 5, 5, 5]);
        let err = validate_attributes(&s, &RulesConfig::default()).unwrap_err();
        assert_eq!(err.code(), "attribute_out_of_range");
    }

    #[test]
    fn parse_names_and_abbreviations() {
        assert_eq!(Attribute::parse("Agility"), Some(Attribute::Agility));
        assert_eq!(Attribute::parse("l"), Some(Attribute::Luck));
        assert_eq!(Attribute::parse("wisdom"), None);
    }

    #[test]
    fn modifiers_saturate_at_zero() {
        let s = Special::uniform(1).with_modifiers([(Attribute::Charisma, -3), (Attribute::Strength, 2)]);
        assert_eq!(s.charisma, 0);
        assert_eq!(s.strength, 3);
    }

    #[test]
    fn origin_maximum_overrides_default() {
        let mut origin = Origin::new("mutant", "Mutant");
        origin.special_max.insert(Attribute::Strength, 12);
        let cfg = RulesConfig::default();
        assert_eq!(attribute_maximum(Attribute::Strength, Some(&origin), &cfg), 12);
        assert_eq!(attribute_maximum(Attribute::Luck, Some(&origin), &cfg), 10);
        assert_eq!(attribute_maximum(Attribute::Luck, None, &cfg), 10);
    }

    proptest! {
        #[test]
        fn remaining_zero_iff_deviation_equals_pool(values in proptest::array::uniform7(4u32..=10)) {
            let s = spread(values);
            let deviation: i32 = values.iter().map(|v| *v as i32 - 5).sum();
            let budget = attribute_budget(&s, &RulesConfig::default());
            prop_assert_eq!(budget.remaining == 0, deviation == 5);
        }
    }
}
