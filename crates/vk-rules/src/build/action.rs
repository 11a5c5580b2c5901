//! Build actions and the pure reducer that applies them.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::RulesConfig;
use crate::data::{RuleData, traits};
use crate::error::{RulesError, RulesResult};
use crate::perks::{self, INTENSE_TRAINING, OwnedPerk, PerkContext, SelectionKind, TAG_PERK};
use crate::skills::{self, Skill};
use crate::special::{self, Attribute};

use super::{CharacterBuild, PendingPerk, PerkSelection};

/// A single edit to a character build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BuildAction {
    /// Change the character level.
    SetLevel {
        /// New level, at least 1.
        level: u32,
    },
    /// Change or clear the origin.
    SetOrigin {
        /// Origin id, or `None` for no origin.
        origin: Option<String>,
    },
    /// Set a pre-modifier attribute value.
    SetAttribute {
        /// The attribute.
        attribute: Attribute,
        /// New pre-modifier value.
        value: u32,
    },
    /// Set a skill rank.
    SetSkill {
        /// The skill.
        skill: Skill,
        /// New rank.
        rank: u32,
    },
    /// Tag or untag a player-chosen skill.
    ToggleTagSkill {
        /// The skill.
        skill: Skill,
    },
    /// Pick the origin's bonus tag skill.
    ChooseOriginTagSkill {
        /// One of the origin's options.
        skill: Skill,
    },
    /// Replace the survivor traits.
    SetSurvivorTraits {
        /// Trait ids; none or exactly two.
        traits: Vec<String>,
    },
    /// Replace the gifted bonus attributes.
    SetGiftedAttributes {
        /// Attributes; none or exactly two.
        attributes: Vec<Attribute>,
    },
    /// Take the next rank of a perk.
    TakePerk {
        /// Perk id.
        perk_id: String,
    },
    /// Commit the pending perk with its secondary selection.
    ResolvePendingPerk {
        /// The attribute or skill chosen.
        selection: PerkSelection,
    },
    /// Drop the pending perk without taking it.
    CancelPendingPerk,
    /// Remove the highest owned rank of a perk.
    RemovePerk {
        /// Perk id.
        perk_id: String,
    },
}

impl fmt::Display for BuildAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetLevel { level } => write!(f, "set level to {level}"),
            Self::SetOrigin { origin: Some(id) } => write!(f, "set origin to {id}"),
            Self::SetOrigin { origin: None } => write!(f, "clear origin"),
            Self::SetAttribute { attribute, value } => write!(f, "set {attribute} to {value}"),
            Self::SetSkill { skill, rank } => write!(f, "set {skill} to rank {rank}"),
            Self::ToggleTagSkill { skill } => write!(f, "toggle tag on {skill}"),
            Self::ChooseOriginTagSkill { skill } => write!(f, "choose {skill} as origin tag skill"),
            Self::SetSurvivorTraits { traits } => write!(f, "set traits [{}]", traits.join(", ")),
            Self::SetGiftedAttributes { attributes } => {
                let names: Vec<&str> = attributes.iter().map(|a| a.name()).collect();
                write!(f, "set gifted attributes [{}]", names.join(", "))
            }
            Self::TakePerk { perk_id } => write!(f, "take perk {perk_id}"),
            Self::ResolvePendingPerk {
                selection: PerkSelection::Attribute(a),
            } => write!(f, "resolve pending perk with {a}"),
            Self::ResolvePendingPerk {
                selection: PerkSelection::Skill(s),
            } => write!(f, "resolve pending perk with {s}"),
            Self::CancelPendingPerk => write!(f, "cancel pending perk"),
            Self::RemovePerk { perk_id } => write!(f, "remove perk {perk_id}"),
        }
    }
}

/// Apply an action to a build, returning the edited copy.
///
/// On error the input build is untouched and the error names the
/// violated rule. Derived stats are not recomputed here.
pub fn apply_build_action(
    data: &RuleData,
    config: &RulesConfig,
    build: &CharacterBuild,
    action: &BuildAction,
) -> RulesResult<CharacterBuild> {
    let mut next = build.clone();
    match action {
        BuildAction::SetLevel { level } => set_level(&mut next, *level)?,
        BuildAction::SetOrigin { origin } => set_origin(data, config, &mut next, origin.as_deref())?,
        BuildAction::SetAttribute { attribute, value } => {
            set_attribute(data, config, &mut next, *attribute, *value)?
        }
        BuildAction::SetSkill { skill, rank } => set_skill(data, config, &mut next, *skill, *rank)?,
        BuildAction::ToggleTagSkill { skill } => toggle_tag(data, config, &mut next, *skill)?,
        BuildAction::ChooseOriginTagSkill { skill } => {
            choose_origin_tag(data, config, &mut next, *skill)?
        }
        BuildAction::SetSurvivorTraits { traits } => set_traits(data, config, &mut next, traits)?,
        BuildAction::SetGiftedAttributes { attributes } => {
            set_gifted(data, config, &mut next, attributes)?
        }
        BuildAction::TakePerk { perk_id } => take_perk(data, config, &mut next, perk_id)?,
        BuildAction::ResolvePendingPerk { selection } => {
            resolve_pending(data, config, &mut next, *selection)?
        }
        BuildAction::CancelPendingPerk => {
            if next.pending_perk.take().is_none() {
                return Err(RulesError::NoPendingPerk);
            }
        }
        BuildAction::RemovePerk { perk_id } => remove_perk(config, &mut next, perk_id)?,
    }
    check_owned_perks(data, config, &next)?;
    tracing::debug!(%action, "applied build action");
    Ok(next)
}

fn set_level(build: &mut CharacterBuild, level: u32) -> RulesResult<()> {
    if level == 0 {
        return Err(RulesError::InvalidLevel(level));
    }
    let spent = perks::ranks_spent(&build.perks);
    if spent > level {
        return Err(RulesError::PerkBudgetExceeded { level, spent });
    }
    build.level = level;
    Ok(())
}

fn set_origin(
    data: &RuleData,
    config: &RulesConfig,
    build: &mut CharacterBuild,
    origin: Option<&str>,
) -> RulesResult<()> {
    if let Some(id) = origin {
        if data.origin(id).is_none() {
            return Err(RulesError::UnknownOrigin(id.to_string()));
        }
    }

    for skill in build.origin_tag_skills(data) {
        skills::untag_skill(&mut build.skills, &mut build.tag_skills, skill, config);
    }
    build.origin = origin.map(str::to_string);
    build.origin_tag_choice = None;
    if !build.is_survivor() {
        build.survivor_traits.clear();
        build.gifted_bonus_attributes.clear();
    }

    let new_origin = build.origin(data);
    for skill in new_origin.map(|o| o.fixed_tag_skills()).unwrap_or_default() {
        skills::tag_skill(&mut build.skills, &mut build.tag_skills, skill, config);
    }

    let modified = build.modified_special(data);
    for attribute in Attribute::ALL {
        let max = special::attribute_maximum(attribute, new_origin, config);
        let excess = modified.get(attribute).saturating_sub(max);
        if excess > 0 {
            let base = build.special.get(attribute);
            let lowered = base.saturating_sub(excess).max(config.attribute_min);
            tracing::debug!(%attribute, from = base, to = lowered, "lowered attribute for origin maximum");
            build.special.set(attribute, lowered);
        }
    }

    let ceiling = build.skill_ceiling(data, config);
    for skill in build.skills.clamp_to(ceiling) {
        tracing::debug!(%skill, ceiling, "clamped skill rank for origin ceiling");
    }

    check_tag_capacity(data, config, build)?;
    check_skill_points(data, config, build)
}

fn set_attribute(
    data: &RuleData,
    config: &RulesConfig,
    build: &mut CharacterBuild,
    attribute: Attribute,
    value: u32,
) -> RulesResult<()> {
    special::check_attribute_range(attribute, value, config)?;
    build.special.set(attribute, value);
    let budget = build.attribute_budget(config);
    if budget.remaining < 0 {
        return Err(RulesError::AttributeOverspent {
            remaining: budget.remaining,
        });
    }
    check_attribute_maxima(data, config, build)
}

fn set_skill(
    data: &RuleData,
    config: &RulesConfig,
    build: &mut CharacterBuild,
    skill: Skill,
    rank: u32,
) -> RulesResult<()> {
    let max = build.skill_ceiling(data, config);
    if rank > max {
        return Err(RulesError::SkillAboveMaximum { skill, rank, max });
    }
    if build.tag_skills.contains(&skill) && rank < config.tag_floor {
        return Err(RulesError::TagSkillBelowFloor {
            skill,
            floor: config.tag_floor,
        });
    }
    build.skills.set(skill, rank);
    check_skill_points(data, config, build)
}

fn toggle_tag(
    data: &RuleData,
    config: &RulesConfig,
    build: &mut CharacterBuild,
    skill: Skill,
) -> RulesResult<()> {
    let locked = build.locked_tag_skills(data);
    let mut slots = build.tag_slot_count(data, config);
    if build.origin_tag_choice_missing(data) {
        slots = slots.saturating_sub(1);
    }
    skills::toggle_tag_skill(
        &mut build.skills,
        &mut build.tag_skills,
        &locked,
        slots,
        skill,
        config,
    )?;
    check_skill_points(data, config, build)
}

fn choose_origin_tag(
    data: &RuleData,
    config: &RulesConfig,
    build: &mut CharacterBuild,
    skill: Skill,
) -> RulesResult<()> {
    let options = build
        .origin(data)
        .map(|o| o.tag_skill_options())
        .unwrap_or_default();
    if !options.contains(&skill) {
        return Err(RulesError::InvalidOriginTagChoice(skill));
    }
    if let Some(previous) = build.origin_tag_choice {
        if previous != skill {
            skills::untag_skill(&mut build.skills, &mut build.tag_skills, previous, config);
        }
    }
    build.origin_tag_choice = Some(skill);
    skills::tag_skill(&mut build.skills, &mut build.tag_skills, skill, config);
    check_tag_capacity(data, config, build)
}

fn set_traits(
    data: &RuleData,
    config: &RulesConfig,
    build: &mut CharacterBuild,
    ids: &[String],
) -> RulesResult<()> {
    let distinct: BTreeSet<&str> = ids.iter().map(String::as_str).collect();
    if !distinct.is_empty() && !build.is_survivor() {
        return Err(RulesError::TraitsRequireSurvivor);
    }
    if !matches!(distinct.len(), 0 | 2) {
        return Err(RulesError::InvalidTraitCount(distinct.len()));
    }
    if let Some(unknown) = distinct.iter().find(|id| data.survivor_trait(id).is_none()) {
        return Err(RulesError::UnknownTrait((*unknown).to_string()));
    }

    build.survivor_traits = distinct.into_iter().map(str::to_string).collect();
    if !build.has_trait(traits::GIFTED) {
        build.gifted_bonus_attributes.clear();
    }
    check_tag_capacity(data, config, build)?;
    check_skill_points(data, config, build)
}

fn set_gifted(
    data: &RuleData,
    config: &RulesConfig,
    build: &mut CharacterBuild,
    attributes: &[Attribute],
) -> RulesResult<()> {
    if attributes.is_empty() {
        build.gifted_bonus_attributes.clear();
        return Ok(());
    }
    if !build.has_trait(traits::GIFTED) {
        return Err(RulesError::GiftedNotActive);
    }
    let distinct: BTreeSet<Attribute> = attributes.iter().copied().collect();
    if attributes.len() != 2 || distinct.len() != 2 {
        return Err(RulesError::InvalidGiftedAttributes(distinct.len()));
    }
    build.gifted_bonus_attributes = attributes.to_vec();
    check_attribute_maxima(data, config, build)
}

fn take_perk(
    data: &RuleData,
    config: &RulesConfig,
    build: &mut CharacterBuild,
    perk_id: &str,
) -> RulesResult<()> {
    if let Some(pending) = &build.pending_perk {
        return Err(RulesError::PerkPending(pending.perk_id.clone()));
    }
    let perk = data
        .perk(perk_id)
        .ok_or_else(|| RulesError::UnknownPerk(perk_id.to_string()))?;
    if build.perk_choices_remaining() <= 0 {
        return Err(RulesError::PerkBudgetExceeded {
            level: build.level,
            spent: perks::ranks_spent(&build.perks) + 1,
        });
    }

    let rank = build.perk_rank(perk_id) + 1;
    let special = build.effective_special(data, config);
    let ctx = PerkContext {
        level: build.level,
        special: &special,
        skills: &build.skills,
        owned: &build.perks,
        is_robot: build.is_robot(data),
    };
    if let Some(unmet) = perks::unmet_requirement(perk, rank, &ctx) {
        return Err(RulesError::PerkNotEligible {
            perk: perk_id.to_string(),
            rank,
            reason: unmet.to_string(),
        });
    }

    if perks::secondary_selection(perk_id).is_some() {
        build.pending_perk = Some(PendingPerk {
            perk_id: perk_id.to_string(),
            rank,
        });
    } else {
        add_rank(&mut build.perks, perk_id, rank);
    }
    Ok(())
}

fn resolve_pending(
    data: &RuleData,
    config: &RulesConfig,
    build: &mut CharacterBuild,
    selection: PerkSelection,
) -> RulesResult<()> {
    let pending = build.pending_perk.take().ok_or(RulesError::NoPendingPerk)?;
    if build.perk_choices_remaining() <= 0 {
        return Err(RulesError::PerkBudgetExceeded {
            level: build.level,
            spent: perks::ranks_spent(&build.perks) + 1,
        });
    }

    match (perks::secondary_selection(&pending.perk_id), selection) {
        (Some(SelectionKind::Attribute), PerkSelection::Attribute(attribute)) => {
            build.exercise_bonuses.push(attribute);
            check_attribute_maxima(data, config, build)?;
        }
        (Some(SelectionKind::Skill), PerkSelection::Skill(skill)) => {
            if build.tag_skills.contains(&skill) {
                return Err(RulesError::InvalidPerkSelection(format!(
                    "{skill} is already tagged"
                )));
            }
            build.tag_perk_skill = Some(skill);
            skills::tag_skill(&mut build.skills, &mut build.tag_skills, skill, config);
        }
        _ => {
            return Err(RulesError::InvalidPerkSelection(format!(
                "perk '{}' does not take that kind of selection",
                pending.perk_id
            )));
        }
    }
    add_rank(&mut build.perks, &pending.perk_id, pending.rank);
    Ok(())
}

fn remove_perk(config: &RulesConfig, build: &mut CharacterBuild, perk_id: &str) -> RulesResult<()> {
    let index = build
        .perks
        .iter()
        .position(|p| p.perk_id == perk_id)
        .ok_or_else(|| RulesError::PerkNotOwned(perk_id.to_string()))?;

    let entry = &mut build.perks[index];
    entry.rank = entry.rank.saturating_sub(1);
    if entry.rank == 0 {
        build.perks.remove(index);
    }

    match perk_id {
        INTENSE_TRAINING => {
            build.exercise_bonuses.pop();
        }
        TAG_PERK if build.perk_rank(TAG_PERK) == 0 => {
            if let Some(skill) = build.tag_perk_skill.take() {
                skills::untag_skill(&mut build.skills, &mut build.tag_skills, skill, config);
            }
        }
        _ => {}
    }
    Ok(())
}

fn add_rank(owned: &mut Vec<OwnedPerk>, perk_id: &str, rank: u32) {
    match owned.iter_mut().find(|p| p.perk_id == perk_id) {
        Some(entry) => entry.rank = rank,
        None => owned.push(OwnedPerk::new(perk_id, rank)),
    }
}

fn check_attribute_maxima(
    data: &RuleData,
    config: &RulesConfig,
    build: &CharacterBuild,
) -> RulesResult<()> {
    let origin = build.origin(data);
    let modified = build.modified_special(data);
    for (attribute, value) in modified.iter() {
        let max = special::attribute_maximum(attribute, origin, config);
        if value > max {
            return Err(RulesError::AttributeAboveMaximum {
                attribute,
                value,
                max,
            });
        }
    }
    Ok(())
}

fn check_skill_points(
    data: &RuleData,
    config: &RulesConfig,
    build: &CharacterBuild,
) -> RulesResult<()> {
    let budget = build.skill_budget(data, config);
    if budget.is_overspent() {
        return Err(RulesError::SkillPointsOverspent {
            remaining: budget.remaining,
        });
    }
    Ok(())
}

fn check_owned_perks(
    data: &RuleData,
    config: &RulesConfig,
    build: &CharacterBuild,
) -> RulesResult<()> {
    match build.unmet_perk_requirements(data, config).into_iter().next() {
        Some((owned, reason)) => Err(RulesError::PerkNotEligible {
            perk: owned.perk_id,
            rank: owned.rank,
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

fn check_tag_capacity(
    data: &RuleData,
    config: &RulesConfig,
    build: &CharacterBuild,
) -> RulesResult<()> {
    let slots = build.tag_slot_count(data, config);
    if build.tag_skills.len() as u32 > slots {
        return Err(RulesError::TagSlotsExhausted { slots });
    }
    Ok(())
}
