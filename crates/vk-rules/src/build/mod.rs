//! Character build state and the reducer that edits it.
//!
//! A [`CharacterBuild`] holds the raw choices a player makes. Derived
//! numbers never live here; call [`crate::derive_stats`] after each edit.

pub mod action;

pub use action::{BuildAction, apply_build_action};

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::RulesConfig;
use crate::data::{Origin, RuleData, traits};
use crate::perks::{self, OwnedPerk, PerkChoice, PerkContext, TAG_PERK, UnmetRequirement};
use crate::skills::{self, Skill, SkillBudget, SkillRanks};
use crate::special::{self, Attribute, AttributeBudget, Special};

/// A perk taken but waiting for its secondary selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPerk {
    /// Perk id.
    pub perk_id: String,
    /// Rank the perk reaches once committed.
    pub rank: u32,
}

/// The secondary choice that commits a pending perk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerkSelection {
    /// An attribute to raise.
    Attribute(Attribute),
    /// A skill to tag.
    Skill(Skill),
}

/// Every build choice a character sheet records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterBuild {
    /// Character level, at least 1.
    pub level: u32,
    /// Origin id. Player characters only.
    pub origin: Option<String>,
    /// Pre-modifier attributes.
    pub special: Special,
    /// Skill ranks.
    pub skills: SkillRanks,
    /// All tagged skills, including origin- and perk-granted ones.
    pub tag_skills: BTreeSet<Skill>,
    /// Bonus tag skill picked from the origin's options.
    pub origin_tag_choice: Option<Skill>,
    /// Survivor trait ids; none or exactly two.
    pub survivor_traits: Vec<String>,
    /// Attributes raised by the gifted trait; none or exactly two.
    pub gifted_bonus_attributes: Vec<Attribute>,
    /// Attributes raised by intense training, one per rank.
    pub exercise_bonuses: Vec<Attribute>,
    /// Skill tagged through the tag! perk.
    pub tag_perk_skill: Option<Skill>,
    /// Owned perks.
    pub perks: Vec<OwnedPerk>,
    /// Perk waiting for a secondary selection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_perk: Option<PendingPerk>,
}

impl Default for CharacterBuild {
    fn default() -> Self {
        Self {
            level: 1,
            origin: None,
            special: Special::default(),
            skills: SkillRanks::new(),
            tag_skills: BTreeSet::new(),
            origin_tag_choice: None,
            survivor_traits: Vec::new(),
            gifted_bonus_attributes: Vec::new(),
            exercise_bonuses: Vec::new(),
            tag_perk_skill: None,
            perks: Vec::new(),
            pending_perk: None,
        }
    }
}

impl CharacterBuild {
    /// The build's origin record, if set and known.
    pub fn origin<'d>(&self, data: &'d RuleData) -> Option<&'d Origin> {
        self.origin.as_deref().and_then(|id| data.origin(id))
    }

    /// Returns true if the survivor trait is chosen.
    pub fn has_trait(&self, id: &str) -> bool {
        self.survivor_traits.iter().any(|t| t == id)
    }

    /// Returns true if the origin is the survivor origin.
    pub fn is_survivor(&self) -> bool {
        self.origin.as_deref() == Some(traits::SURVIVOR_ORIGIN)
    }

    /// Returns true if the origin is a robot.
    pub fn is_robot(&self, data: &RuleData) -> bool {
        self.origin(data).is_some_and(|o| o.is_robot)
    }

    /// Owned rank of a perk.
    pub fn perk_rank(&self, perk_id: &str) -> u32 {
        perks::owned_rank(&self.perks, perk_id)
    }

    /// Perk choices left at the current level.
    pub fn perk_choices_remaining(&self) -> i64 {
        perks::perk_choices_remaining(self.level, &self.perks)
    }

    /// Attributes after origin, gifted and intense training modifiers,
    /// without any maximum applied.
    pub fn modified_special(&self, data: &RuleData) -> Special {
        let origin_mods = self
            .origin(data)
            .map(|o| o.special_modifiers.clone())
            .unwrap_or_default();
        let gifted: &[Attribute] = if self.has_trait(traits::GIFTED) {
            &self.gifted_bonus_attributes
        } else {
            &[]
        };
        self.special
            .with_modifiers(origin_mods)
            .with_modifiers(gifted.iter().map(|a| (*a, 1)))
            .with_modifiers(self.exercise_bonuses.iter().map(|a| (*a, 1)))
    }

    /// Post-modifier attributes clamped to the origin maximums.
    pub fn effective_special(&self, data: &RuleData, config: &RulesConfig) -> Special {
        let origin = self.origin(data);
        let mut special = self.modified_special(data);
        for attribute in Attribute::ALL {
            let max = special::attribute_maximum(attribute, origin, config);
            if special.get(attribute) > max {
                special.set(attribute, max);
            }
        }
        special
    }

    /// Pre-modifier attribute budget.
    pub fn attribute_budget(&self, config: &RulesConfig) -> AttributeBudget {
        special::attribute_budget(&self.special, config)
    }

    /// Skill point budget using post-modifier intelligence.
    pub fn skill_budget(&self, data: &RuleData, config: &RulesConfig) -> SkillBudget {
        let intelligence = self.effective_special(data, config).intelligence;
        skills::skill_budget(&self.skills, &self.tag_skills, intelligence, config)
    }

    /// Total tag skill slots.
    pub fn tag_slot_count(&self, data: &RuleData, config: &RulesConfig) -> u32 {
        skills::tag_slot_count(
            config,
            self.origin(data),
            self.has_trait(traits::EDUCATED),
            self.perk_rank(TAG_PERK) > 0,
        )
    }

    /// Skill rank ceiling.
    pub fn skill_ceiling(&self, data: &RuleData, config: &RulesConfig) -> u32 {
        skills::skill_ceiling(self.origin(data), config)
    }

    /// Tag skills granted by the origin.
    pub fn origin_tag_skills(&self, data: &RuleData) -> BTreeSet<Skill> {
        let Some(origin) = self.origin(data) else {
            return BTreeSet::new();
        };
        let mut granted: BTreeSet<Skill> = origin.fixed_tag_skills().into_iter().collect();
        if let Some(choice) = self.origin_tag_choice {
            if origin.tag_skill_options().contains(&choice) {
                granted.insert(choice);
            }
        }
        granted
    }

    /// Tag skills the player cannot toggle off.
    pub fn locked_tag_skills(&self, data: &RuleData) -> BTreeSet<Skill> {
        let mut locked = self.origin_tag_skills(data);
        locked.extend(self.tag_perk_skill);
        locked
    }

    /// Returns true if the origin offers a bonus tag choice that is not made.
    pub fn origin_tag_choice_missing(&self, data: &RuleData) -> bool {
        self.origin(data)
            .is_some_and(|o| !o.tag_skill_options().is_empty())
            && self.origin_tag_choice.is_none()
    }

    /// Perks this build may take next.
    pub fn available_perks(&self, data: &RuleData, config: &RulesConfig) -> Vec<PerkChoice> {
        let special = self.effective_special(data, config);
        let ctx = PerkContext {
            level: self.level,
            special: &special,
            skills: &self.skills,
            owned: &self.perks,
            is_robot: self.is_robot(data),
        };
        perks::available_perks(data, &ctx)
    }

    /// Owned perks whose prerequisites the build no longer meets.
    ///
    /// Each perk is checked at its owned rank against the rest of the
    /// build, with its own entry left out. Unknown ids and ranks outside
    /// `1..=max_rank` are skipped; validation reports those separately.
    pub fn unmet_perk_requirements(
        &self,
        data: &RuleData,
        config: &RulesConfig,
    ) -> Vec<(OwnedPerk, UnmetRequirement)> {
        let special = self.effective_special(data, config);
        let is_robot = self.is_robot(data);
        let mut unmet = Vec::new();
        for owned in &self.perks {
            let Some(perk) = data.perk(&owned.perk_id) else {
                continue;
            };
            if owned.rank == 0 || owned.rank > perk.max_rank {
                continue;
            }
            let others: Vec<OwnedPerk> = self
                .perks
                .iter()
                .filter(|p| p.perk_id != owned.perk_id)
                .cloned()
                .collect();
            let ctx = PerkContext {
                level: self.level,
                special: &special,
                skills: &self.skills,
                owned: &others,
                is_robot,
            };
            if let Some(reason) = perks::unmet_requirement(perk, owned.rank, &ctx) {
                unmet.push((owned.clone(), reason));
            }
        }
        unmet
    }
}
