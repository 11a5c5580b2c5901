//! Perk eligibility: which perk ranks a build may take next.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::{PerkDefinition, RuleData};
use crate::skills::{Skill, SkillRanks};
use crate::special::{Attribute, Special};

/// Perk whose ranks each raise an attribute chosen when the rank is taken.
pub const INTENSE_TRAINING: &str = "intense_training";

/// Perk that grants an extra tag skill chosen when it is taken.
pub const TAG_PERK: &str = "tag";

/// The kind of secondary choice a perk needs before it is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKind {
    /// Pick an attribute.
    Attribute,
    /// Pick a skill.
    Skill,
}

/// Secondary selection required by a perk, if any.
pub fn secondary_selection(perk_id: &str) -> Option<SelectionKind> {
    match perk_id {
        INTENSE_TRAINING => Some(SelectionKind::Attribute),
        TAG_PERK => Some(SelectionKind::Skill),
        _ => None,
    }
}

/// A perk owned by a character at some rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedPerk {
    /// Perk id.
    pub perk_id: String,
    /// Owned rank, at least 1.
    pub rank: u32,
}

impl OwnedPerk {
    /// An owned perk entry.
    pub fn new(perk_id: impl Into<String>, rank: u32) -> Self {
        Self {
            perk_id: perk_id.into(),
            rank,
        }
    }
}

/// Rank owned of a perk, 0 if not owned.
pub fn owned_rank(owned: &[OwnedPerk], perk_id: &str) -> u32 {
    owned
        .iter()
        .find(|p| p.perk_id == perk_id)
        .map_or(0, |p| p.rank)
}

/// Total perk ranks owned.
pub fn ranks_spent(owned: &[OwnedPerk]) -> u32 {
    owned.iter().map(|p| p.rank).sum()
}

/// Perk choices left at `level`. Negative when the build is over budget.
pub fn perk_choices_remaining(level: u32, owned: &[OwnedPerk]) -> i64 {
    level as i64 - ranks_spent(owned) as i64
}

/// Everything the resolver needs to know about a build.
#[derive(Debug, Clone, Copy)]
pub struct PerkContext<'a> {
    /// Character level.
    pub level: u32,
    /// Post-modifier attributes.
    pub special: &'a Special,
    /// Skill ranks.
    pub skills: &'a SkillRanks,
    /// Perks owned so far.
    pub owned: &'a [OwnedPerk],
    /// Whether the character is a robot.
    pub is_robot: bool,
}

/// A prerequisite clause that a perk rank fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnmetRequirement {
    /// Already owned at max rank.
    MaxRank(u32),
    /// Character level too low for the requested rank.
    Level {
        /// Level needed.
        required: u32,
        /// Current level.
        actual: u32,
    },
    /// Attribute too low.
    Attribute {
        /// The attribute.
        attribute: Attribute,
        /// Score needed.
        required: u32,
        /// Current score.
        actual: u32,
    },
    /// Skill rank too low.
    Skill {
        /// The skill.
        skill: Skill,
        /// Rank needed.
        required: u32,
        /// Current rank.
        actual: u32,
    },
    /// A required perk is not owned.
    MissingPerk(String),
    /// An excluded perk is owned.
    ExcludedPerk(String),
    /// Robots cannot take the perk.
    Robot,
}

impl fmt::Display for UnmetRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxRank(max) => write!(f, "already at max rank {max}"),
            Self::Level { required, actual } => write!(f, "needs level {required} (is {actual})"),
            Self::Attribute {
                attribute,
                required,
                actual,
            } => write!(f, "needs {attribute} {required} (is {actual})"),
            Self::Skill {
                skill,
                required,
                actual,
            } => write!(f, "needs {skill} {required} (is {actual})"),
            Self::MissingPerk(id) => write!(f, "requires perk '{id}'"),
            Self::ExcludedPerk(id) => write!(f, "incompatible with perk '{id}'"),
            Self::Robot => write!(f, "not usable by robots"),
        }
    }
}

/// First prerequisite clause `perk` fails for `rank`, or `None` if all hold.
pub fn unmet_requirement(
    perk: &PerkDefinition,
    rank: u32,
    ctx: &PerkContext<'_>,
) -> Option<UnmetRequirement> {
    if rank > perk.max_rank {
        return Some(UnmetRequirement::MaxRank(perk.max_rank));
    }

    let req = &perk.requirements;
    if req.not_for_robots && ctx.is_robot {
        return Some(UnmetRequirement::Robot);
    }

    let required = perk.required_level(rank);
    if ctx.level < required {
        return Some(UnmetRequirement::Level {
            required,
            actual: ctx.level,
        });
    }

    for (&attribute, &min) in &req.special {
        let actual = ctx.special.get(attribute);
        if actual < min {
            return Some(UnmetRequirement::Attribute {
                attribute,
                required: min,
                actual,
            });
        }
    }

    for (&skill, &min) in &req.skills {
        let actual = ctx.skills.get(skill);
        if actual < min {
            return Some(UnmetRequirement::Skill {
                skill,
                required: min,
                actual,
            });
        }
    }

    if let Some(missing) = req.perks.iter().find(|id| owned_rank(ctx.owned, id) == 0) {
        return Some(UnmetRequirement::MissingPerk(missing.clone()));
    }

    if let Some(excluded) = req
        .excluded_perks
        .iter()
        .find(|id| owned_rank(ctx.owned, id) > 0)
    {
        return Some(UnmetRequirement::ExcludedPerk(excluded.clone()));
    }

    None
}

/// A perk that can be taken next, with the rank it would reach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerkChoice {
    /// The perk.
    pub perk: PerkDefinition,
    /// Rank the character would own after taking it.
    pub rank: u32,
}

/// Every perk the build may take next.
///
/// Empty when no perk choices remain at the current level, regardless of
/// what the individual prerequisites say.
pub fn available_perks(data: &RuleData, ctx: &PerkContext<'_>) -> Vec<PerkChoice> {
    if perk_choices_remaining(ctx.level, ctx.owned) <= 0 {
        return Vec::new();
    }

    data.perks
        .iter()
        .filter_map(|perk| {
            let rank = owned_rank(ctx.owned, &perk.id) + 1;
            match unmet_requirement(perk, rank, ctx) {
                None => Some(PerkChoice {
                    perk: perk.clone(),
                    rank,
                }),
                Some(_) => None,
            }
        })
        .collect()
}
