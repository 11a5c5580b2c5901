//! Tunable game-system constants for character builds.

use serde::{Deserialize, Serialize};

/// Point-buy and slot constants used by the build rules.
///
/// The defaults are the standard game values; a table may override them
/// through the `[rules]` section of the Vaultkeeper config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Attribute points to distribute above the default value.
    pub attribute_pool: i32,
    /// Value every attribute starts at.
    pub attribute_default: u32,
    /// Lowest pre-modifier attribute value.
    pub attribute_min: u32,
    /// Highest pre-modifier attribute value, and the post-modifier
    /// maximum when the origin has no override.
    pub attribute_max: u32,
    /// Skill points granted before adding intelligence.
    pub base_skill_points: u32,
    /// Tag skill slots every character has.
    pub base_tag_slots: u32,
    /// Minimum rank of a tagged skill. Points up to this rank are free.
    pub tag_floor: u32,
    /// Skill rank ceiling when the origin has no override.
    pub skill_max: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            attribute_pool: 5,
            attribute_default: 5,
            attribute_min: 4,
            attribute_max: 10,
            base_skill_points: 9,
            base_tag_slots: 3,
            tag_floor: 2,
            skill_max: 6,
        }
    }
}

impl RulesConfig {
    /// Set the attribute point pool.
    pub fn with_attribute_pool(mut self, pool: i32) -> Self {
        self.attribute_pool = pool;
        self
    }

    /// Set the base number of tag skill slots.
    pub fn with_base_tag_slots(mut self, slots: u32) -> Self {
        self.base_tag_slots = slots;
        self
    }

    /// Set the default skill ceiling (never below the tag floor).
    pub fn with_skill_max(mut self, max: u32) -> Self {
        self.skill_max = max.max(self.tag_floor);
        self
    }
}
