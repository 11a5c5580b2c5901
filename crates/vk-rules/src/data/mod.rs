//! Read-only reference data: origins, survivor traits and perks.
//!
//! A [`RuleData`] is resolved once at startup (from [`preset::core`] or a
//! JSON/TOML file) and passed by reference to every rules function.

pub mod effect;
pub mod preset;

pub use effect::{CombatEffect, PerRankEffect, PerkEffect, SpecialRuleEffect};

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RulesError, RulesResult};
use crate::skills::Skill;
use crate::special::Attribute;

/// Survivor trait ids with mechanical effects. Other trait ids are
/// narrative only.
pub mod traits {
    /// Origin that may pick survivor traits.
    pub const SURVIVOR_ORIGIN: &str = "survivor";
    /// One extra tag skill slot.
    pub const EDUCATED: &str = "educated";
    /// +1 to two chosen attributes, -1 max luck points.
    pub const GIFTED: &str = "gifted";
    /// +1 melee damage bonus.
    pub const HEAVY_HANDED: &str = "heavy_handed";
    /// Carry capacity counts strength at half weight.
    pub const SMALL_FRAME: &str = "small_frame";
}

/// Bonus tag skills an origin grants on top of the regular slots.
///
/// Skills are stored by name and resolved leniently: names that do not
/// match a known skill are dropped and grant nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BonusTagSkills {
    /// No bonus tag skills.
    #[default]
    None,
    /// Every listed skill is tagged automatically.
    Fixed {
        /// Skill names.
        skills: Vec<String>,
    },
    /// The player picks one skill from the options.
    Choice {
        /// Skill names to choose from.
        options: Vec<String>,
    },
}

/// A character's starting archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    /// Stable id (e.g. "survivor").
    pub id: String,
    /// Display name.
    pub name: String,
    /// Flavour text and the origin's unique trait.
    #[serde(default)]
    pub description: String,
    /// Signed adjustments applied after point-buy.
    #[serde(default)]
    pub special_modifiers: BTreeMap<Attribute, i32>,
    /// Post-modifier maximums replacing the default of 10.
    #[serde(default)]
    pub special_max: BTreeMap<Attribute, u32>,
    /// Bonus tag skills.
    #[serde(default)]
    pub bonus_tag_skills: BonusTagSkills,
    /// Skill rank ceiling replacing the default of 6.
    #[serde(default)]
    pub skill_max: Option<u32>,
    /// Robots cannot take some perks.
    #[serde(default)]
    pub is_robot: bool,
}

impl Origin {
    /// An origin with no modifiers.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            special_modifiers: BTreeMap::new(),
            special_max: BTreeMap::new(),
            bonus_tag_skills: BonusTagSkills::None,
            skill_max: None,
            is_robot: false,
        }
    }

    /// Skills tagged automatically by this origin.
    pub fn fixed_tag_skills(&self) -> Vec<Skill> {
        match &self.bonus_tag_skills {
            BonusTagSkills::Fixed { skills } => resolve_skills(skills),
            _ => Vec::new(),
        }
    }

    /// Skills the player may choose one bonus tag from.
    pub fn tag_skill_options(&self) -> Vec<Skill> {
        match &self.bonus_tag_skills {
            BonusTagSkills::Choice { options } => resolve_skills(options),
            _ => Vec::new(),
        }
    }

    /// Number of extra tag slots this origin grants.
    pub fn bonus_tag_slots(&self) -> u32 {
        match &self.bonus_tag_skills {
            BonusTagSkills::None => 0,
            BonusTagSkills::Fixed { .. } => self.fixed_tag_skills().len() as u32,
            BonusTagSkills::Choice { .. } => u32::from(!self.tag_skill_options().is_empty()),
        }
    }
}

fn resolve_skills(names: &[String]) -> Vec<Skill> {
    names
        .iter()
        .filter_map(|name| {
            let skill = Skill::parse(name);
            if skill.is_none() {
                tracing::warn!(skill = %name, "origin references unknown bonus tag skill");
            }
            skill
        })
        .collect()
}

/// An optional trait available to survivor-origin characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurvivorTrait {
    /// Stable id (e.g. "small_frame").
    pub id: String,
    /// Display name.
    pub name: String,
    /// Benefit and drawback wording.
    #[serde(default)]
    pub description: String,
}

/// Prerequisites for taking a perk rank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerkRequirements {
    /// Minimum post-modifier attribute scores.
    pub special: BTreeMap<Attribute, u32>,
    /// Minimum level for rank 1.
    pub level: u32,
    /// Extra levels required for each rank after the first.
    pub level_increase_per_rank: Option<u32>,
    /// Minimum skill ranks.
    pub skills: BTreeMap<Skill, u32>,
    /// Perk ids that must already be owned.
    pub perks: Vec<String>,
    /// Perk ids that must not be owned.
    pub excluded_perks: Vec<String>,
    /// Robots cannot take this perk.
    pub not_for_robots: bool,
}

/// A purchasable, rank-scalable ability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerkDefinition {
    /// Stable id (e.g. "toughness").
    pub id: String,
    /// Display name.
    pub name: String,
    /// Rules text.
    #[serde(default)]
    pub description: String,
    /// Highest rank that can be owned.
    #[serde(default = "default_max_rank")]
    pub max_rank: u32,
    /// Prerequisites.
    #[serde(default)]
    pub requirements: PerkRequirements,
    /// Effects granted per owned rank.
    #[serde(default)]
    pub effects: Vec<PerkEffect>,
}

fn default_max_rank() -> u32 {
    1
}

impl PerkDefinition {
    /// A single-rank perk with no prerequisites or effects.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            max_rank: 1,
            requirements: PerkRequirements::default(),
            effects: Vec::new(),
        }
    }

    /// Minimum character level to take `rank` of this perk.
    pub fn required_level(&self, rank: u32) -> u32 {
        let step = self.requirements.level_increase_per_rank.unwrap_or(0);
        self.requirements.level + step * rank.saturating_sub(1)
    }
}

/// The complete reference data set for a game system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleData {
    /// Data set name.
    #[serde(default)]
    pub name: String,
    /// Origins in display order.
    #[serde(default)]
    pub origins: Vec<Origin>,
    /// Survivor traits in display order.
    #[serde(default)]
    pub survivor_traits: Vec<SurvivorTrait>,
    /// Perks in display order.
    #[serde(default)]
    pub perks: Vec<PerkDefinition>,
}

impl RuleData {
    /// Look up an origin by id.
    pub fn origin(&self, id: &str) -> Option<&Origin> {
        self.origins.iter().find(|o| o.id == id)
    }

    /// Look up a survivor trait by id.
    pub fn survivor_trait(&self, id: &str) -> Option<&SurvivorTrait> {
        self.survivor_traits.iter().find(|t| t.id == id)
    }

    /// Look up a perk by id.
    pub fn perk(&self, id: &str) -> Option<&PerkDefinition> {
        self.perks.iter().find(|p| p.id == id)
    }

    /// Parse a data set from JSON.
    pub fn from_json(source: &str) -> RulesResult<Self> {
        serde_json::from_str(source).map_err(|e| RulesError::InvalidData(e.to_string()))
    }

    /// Parse a data set from TOML.
    pub fn from_toml(source: &str) -> RulesResult<Self> {
        toml::from_str(source).map_err(|e| RulesError::InvalidData(e.to_string()))
    }

    /// Load a data set from a `.json` or `.toml` file.
    pub fn load(path: &Path) -> RulesResult<Self> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| RulesError::InvalidData(format!("{}: {e}", path.display())))?;
        let data = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&source)?,
            _ => Self::from_json(&source)?,
        };
        tracing::info!(
            path = %path.display(),
            origins = data.origins.len(),
            perks = data.perks.len(),
            "loaded reference data"
        );
        Ok(data)
    }
}
