//! Skills, the skill point budget, and tag-skill slot accounting.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::RulesConfig;
use crate::data::Origin;
use crate::error::{RulesError, RulesResult};

/// One of the seventeen skills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    /// Running, climbing, swimming.
    Athletics,
    /// Trading and haggling.
    Barter,
    /// Miniguns, flamers, launchers.
    BigGuns,
    /// Lasers and plasma.
    EnergyWeapons,
    /// Grenades and mines.
    Explosives,
    /// Locks and safes.
    Lockpick,
    /// Healing and chems.
    Medicine,
    /// Blades and clubs.
    MeleeWeapons,
    /// Vehicles and vertibirds.
    Pilot,
    /// Fixing and crafting.
    Repair,
    /// Computers and chemistry.
    Science,
    /// Pistols and rifles.
    SmallGuns,
    /// Staying hidden.
    Sneak,
    /// Persuasion and deception.
    Speech,
    /// Foraging and tracking.
    Survival,
    /// Thrown weapons.
    Throwing,
    /// Fists and knuckles.
    Unarmed,
}

impl Skill {
    /// All skills in sheet order.
    pub const ALL: [Skill; 17] = [
        Skill::Athletics,
        Skill::Barter,
        Skill::BigGuns,
        Skill::EnergyWeapons,
        Skill::Explosives,
        Skill::Lockpick,
        Skill::Medicine,
        Skill::MeleeWeapons,
        Skill::Pilot,
        Skill::Repair,
        Skill::Science,
        Skill::SmallGuns,
        Skill::Sneak,
        Skill::Speech,
        Skill::Survival,
        Skill::Throwing,
        Skill::Unarmed,
    ];

    /// Snake-case name used in payloads and reference data.
    pub fn name(self) -> &'static str {
        match self {
            Self::Athletics => "athletics",
            Self::Barter => "barter",
            Self::BigGuns => "big_guns",
            Self::EnergyWeapons => "energy_weapons",
            Self::Explosives => "explosives",
            Self::Lockpick => "lockpick",
            Self::Medicine => "medicine",
            Self::MeleeWeapons => "melee_weapons",
            Self::Pilot => "pilot",
            Self::Repair => "repair",
            Self::Science => "science",
            Self::SmallGuns => "small_guns",
            Self::Sneak => "sneak",
            Self::Speech => "speech",
            Self::Survival => "survival",
            Self::Throwing => "throwing",
            Self::Unarmed => "unarmed",
        }
    }

    /// Parse a skill name. Spaces, dashes and case are ignored.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        Self::ALL.into_iter().find(|sk| sk.name() == normalized)
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Skill ranks keyed by skill. Missing skills are untrained (rank 0).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillRanks(BTreeMap<Skill, u32>);

impl SkillRanks {
    /// All skills untrained.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rank of a skill, 0 if untrained.
    pub fn get(&self, skill: Skill) -> u32 {
        self.0.get(&skill).copied().unwrap_or(0)
    }

    /// Set a skill's rank. Rank 0 removes the entry.
    pub fn set(&mut self, skill: Skill, rank: u32) {
        if rank == 0 {
            self.0.remove(&skill);
        } else {
            self.0.insert(skill, rank);
        }
    }

    /// Iterate trained skills.
    pub fn iter(&self) -> impl Iterator<Item = (Skill, u32)> + '_ {
        self.0.iter().map(|(s, r)| (*s, *r))
    }

    /// Lower every rank above `ceiling` to `ceiling`. Returns the skills
    /// that were changed.
    pub fn clamp_to(&mut self, ceiling: u32) -> Vec<Skill> {
        let mut clamped = Vec::new();
        for (skill, rank) in self.0.iter_mut() {
            if *rank > ceiling {
                *rank = ceiling;
                clamped.push(*skill);
            }
        }
        clamped
    }
}

impl FromIterator<(Skill, u32)> for SkillRanks {
    fn from_iter<I: IntoIterator<Item = (Skill, u32)>>(iter: I) -> Self {
        let mut ranks = Self::new();
        for (skill, rank) in iter {
            ranks.set(skill, rank);
        }
        ranks
    }
}

/// Skill point accounting for a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillBudget {
    /// `base_skill_points + intelligence`.
    pub pool: i32,
    /// Points spent; tag skills only count ranks above the floor.
    pub spent: i32,
    /// `pool - spent`; negative means overspent.
    pub remaining: i32,
}

impl SkillBudget {
    /// Points were spent beyond the pool.
    pub fn is_overspent(&self) -> bool {
        self.remaining < 0
    }

    /// Points are left over.
    pub fn is_underspent(&self) -> bool {
        self.remaining > 0
    }
}

/// Compute the skill budget. `intelligence` is the post-modifier value.
pub fn skill_budget(
    ranks: &SkillRanks,
    tag_skills: &BTreeSet<Skill>,
    intelligence: u32,
    config: &RulesConfig,
) -> SkillBudget {
    let pool = (config.base_skill_points + intelligence) as i32;
    let spent: i32 = ranks
        .iter()
        .map(|(skill, rank)| {
            if tag_skills.contains(&skill) {
                rank.saturating_sub(config.tag_floor) as i32
            } else {
                rank as i32
            }
        })
        .sum();
    SkillBudget {
        pool,
        spent,
        remaining: pool - spent,
    }
}

/// Total tag skill slots for a build.
pub fn tag_slot_count(
    config: &RulesConfig,
    origin: Option<&Origin>,
    educated: bool,
    tag_perk: bool,
) -> u32 {
    config.base_tag_slots
        + u32::from(educated)
        + u32::from(tag_perk)
        + origin.map_or(0, Origin::bonus_tag_slots)
}

/// Skill rank ceiling under the given origin.
pub fn skill_ceiling(origin: Option<&Origin>, config: &RulesConfig) -> u32 {
    origin
        .and_then(|o| o.skill_max)
        .unwrap_or(config.skill_max)
        .max(config.tag_floor)
}

/// Mark a skill as tagged, raising it to the tag floor.
pub fn tag_skill(ranks: &mut SkillRanks, tags: &mut BTreeSet<Skill>, skill: Skill, config: &RulesConfig) {
    tags.insert(skill);
    if ranks.get(skill) < config.tag_floor {
        ranks.set(skill, config.tag_floor);
    }
}

/// Remove a tag. A rank sitting exactly on the floor goes back to 0; a rank
/// the player raised above the floor is kept.
pub fn untag_skill(ranks: &mut SkillRanks, tags: &mut BTreeSet<Skill>, skill: Skill, config: &RulesConfig) {
    if tags.remove(&skill) && ranks.get(skill) == config.tag_floor {
        ranks.set(skill, 0);
    }
}

/// Toggle a player-chosen tag skill.
///
/// `locked` holds skills granted by origin or perk; they cannot be
/// toggled off. Turning a tag on needs a free slot out of `slots`.
/// Returns whether the skill is tagged afterwards.
pub fn toggle_tag_skill(
    ranks: &mut SkillRanks,
    tags: &mut BTreeSet<Skill>,
    locked: &BTreeSet<Skill>,
    slots: u32,
    skill: Skill,
    config: &RulesConfig,
) -> RulesResult<bool> {
    if tags.contains(&skill) {
        if locked.contains(&skill) {
            return Err(RulesError::TagSkillLocked(skill));
        }
        untag_skill(ranks, tags, skill, config);
        Ok(false)
    } else {
        if tags.len() as u32 >= slots {
            return Err(RulesError::TagSlotsExhausted { slots });
        }
        tag_skill(ranks, tags, skill, config);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BonusTagSkills;

    fn cfg() -> RulesConfig {
        RulesConfig::default()
    }

    #[test]
    fn toggling_on_raises_to_floor() {
        let mut ranks = SkillRanks::new();
        let mut tags = BTreeSet::new();
        ranks.set(Skill::Sneak, 1);
        let on = toggle_tag_skill(&mut ranks, &mut tags, &BTreeSet::new(), 3, Skill::Sneak, &cfg()).unwrap();
        assert!(on);
        assert_eq!(ranks.get(Skill::Sneak), 2);
    }

    #[test]
    fn toggling_on_keeps_higher_rank() {
        let mut ranks = SkillRanks::new();
        let mut tags = BTreeSet::new();
        ranks.set(Skill::Sneak, 3);
        toggle_tag_skill(&mut ranks, &mut tags, &BTreeSet::new(), 3, Skill::Sneak, &cfg()).unwrap();
        assert_eq!(ranks.get(Skill::Sneak), 3);
    }

    #[test]
    fn toggling_off_at_floor_resets_to_zero() {
        let mut ranks = SkillRanks::new();
        let mut tags = BTreeSet::new();
        let locked = BTreeSet::new();
        toggle_tag_skill(&mut ranks, &mut tags, &locked, 3, Skill::Repair, &cfg()).unwrap();
        let on = toggle_tag_skill(&mut ranks, &mut tags, &locked, 3, Skill::Repair, &cfg()).unwrap();
        assert!(!on);
        assert_eq!(ranks.get(Skill::Repair), 0);
    }

    #[test]
    fn toggling_off_keeps_player_raised_rank() {
        let mut ranks = SkillRanks::new();
        let mut tags = BTreeSet::new();
        let locked = BTreeSet::new();
        toggle_tag_skill(&mut ranks, &mut tags, &locked, 3, Skill::Repair, &cfg()).unwrap();
        ranks.set(Skill::Repair, 4);
        toggle_tag_skill(&mut ranks, &mut tags, &locked, 3, Skill::Repair, &cfg()).unwrap();
        assert_eq!(ranks.get(Skill::Repair), 4);
        assert!(!tags.contains(&Skill::Repair));
    }

    #[test]
    fn locked_tag_cannot_be_removed() {
        let mut ranks = SkillRanks::new();
        let mut tags = BTreeSet::from([Skill::Survival]);
        ranks.set(Skill::Survival, 2);
        let locked = BTreeSet::from([Skill::Survival]);
        let err = toggle_tag_skill(&mut ranks, &mut tags, &locked, 4, Skill::Survival, &cfg()).unwrap_err();
        assert_eq!(err, RulesError::TagSkillLocked(Skill::Survival));
        assert!(tags.contains(&Skill::Survival));
        assert_eq!(ranks.get(Skill::Survival), 2);
    }

    #[test]
    fn full_slots_reject_new_tag() {
        let mut ranks = SkillRanks::new();
        let mut tags = BTreeSet::from([Skill::Sneak, Skill::Speech, Skill::Barter]);
        let err = toggle_tag_skill(&mut ranks, &mut tags, &BTreeSet::new(), 3, Skill::Repair, &cfg()).unwrap_err();
        assert_eq!(err.code(), "tag_slots_exhausted");
        assert_eq!(ranks.get(Skill::Repair), 0);
    }

    #[test]
    fn tag_floor_is_free() {
        let ranks: SkillRanks = [(Skill::Sneak, 2), (Skill::Repair, 3), (Skill::Barter, 1)]
            .into_iter()
            .collect();
        let tags = BTreeSet::from([Skill::Sneak, Skill::Repair]);
        let budget = skill_budget(&ranks, &tags, 6, &cfg());
        assert_eq!(budget.pool, 15);
        assert_eq!(budget.spent, 2);
        assert_eq!(budget.remaining, 13);
    }

    #[test]
    fn overspent_budget_goes_negative() {
        let ranks: SkillRanks = [(Skill::Sneak, 6), (Skill::Repair, 6), (Skill::Barter, 6)]
            .into_iter()
            .collect();
        let budget = skill_budget(&ranks, &BTreeSet::new(), 1, &cfg());
        assert_eq!(budget.remaining, -8);
        assert!(budget.is_overspent());
    }

    #[test]
    fn slot_count_sums_all_sources() {
        let mut origin = Origin::new("initiate", "Initiate");
        origin.bonus_tag_skills = BonusTagSkills::Choice {
            options: vec!["energy_weapons".into(), "science".into()],
        };
        assert_eq!(tag_slot_count(&cfg(), None, false, false), 3);
        assert_eq!(tag_slot_count(&cfg(), Some(&origin), true, true), 6);
    }

    #[test]
    fn ceiling_follows_origin_override() {
        let mut origin = Origin::new("mutant", "Mutant");
        origin.skill_max = Some(4);
        assert_eq!(skill_ceiling(Some(&origin), &cfg()), 4);
        assert_eq!(skill_ceiling(None, &cfg()), 6);
    }

    #[test]
    fn clamp_lowers_ranks() {
        let mut ranks: SkillRanks = [(Skill::Sneak, 6), (Skill::Repair, 3)].into_iter().collect();
        let changed = ranks.clamp_to(4);
        assert_eq!(changed, vec![Skill::Sneak]);
        assert_eq!(ranks.get(Skill::Sneak), 4);
        assert_eq!(ranks.get(Skill::Repair), 3);
    }

    #[test]
    fn parse_skill_names() {
        assert_eq!(Skill::parse("Energy Weapons"), Some(Skill::EnergyWeapons));
        assert_eq!(Skill::parse("small-guns"), Some(Skill::SmallGuns));
        assert_eq!(Skill::parse("hacking"), None);
    }
}
