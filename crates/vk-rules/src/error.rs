//! Error types for the rules engine.

use crate::skills::Skill;
use crate::special::Attribute;

/// Blocking rule violations. The operation that produced one is rejected
/// and the build it was applied to is left unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RulesError {
    /// A pre-modifier attribute lies outside the allowed point-buy range.
    #[error("{attribute} must be between {min} and {max}, got {value}")]
    AttributeOutOfRange {
        /// The offending attribute.
        attribute: Attribute,
        /// The requested value.
        value: u32,
        /// Lowest allowed value.
        min: u32,
        /// Highest allowed value.
        max: u32,
    },

    /// More attribute points were spent than the pool holds.
    #[error("attribute points overspent ({remaining} remaining)")]
    AttributeOverspent {
        /// Remaining points; always negative.
        remaining: i32,
    },

    /// The post-modifier value of an attribute exceeds its maximum.
    #[error("{attribute} would be {value}, above its maximum of {max}")]
    AttributeAboveMaximum {
        /// The offending attribute.
        attribute: Attribute,
        /// The post-modifier value.
        value: u32,
        /// The maximum for the current origin.
        max: u32,
    },

    /// A skill rank exceeds the ceiling for the current origin.
    #[error("{skill} rank {rank} exceeds the maximum of {max}")]
    SkillAboveMaximum {
        /// The offending skill.
        skill: Skill,
        /// The requested rank.
        rank: u32,
        /// The skill ceiling.
        max: u32,
    },

    /// More skill points were spent than the pool holds.
    #[error("skill points overspent ({remaining} remaining)")]
    SkillPointsOverspent {
        /// Remaining points; always negative.
        remaining: i32,
    },

    /// A tag skill was set below the tag floor.
    #[error("tag skill {skill} cannot go below rank {floor}")]
    TagSkillBelowFloor {
        /// The offending skill.
        skill: Skill,
        /// The tag floor.
        floor: u32,
    },

    /// An origin- or perk-granted tag skill cannot be toggled off.
    #[error("tag skill {0} is granted by origin or perk and cannot be removed")]
    TagSkillLocked(Skill),

    /// All tag skill slots are in use.
    #[error("all {slots} tag skill slots are in use")]
    TagSlotsExhausted {
        /// Total slot count for the build.
        slots: u32,
    },

    /// The skill is not among the origin's bonus tag skill options.
    #[error("{0} is not a bonus tag skill option for this origin")]
    InvalidOriginTagChoice(Skill),

    /// The origin id is not in the reference data.
    #[error("unknown origin: {0}")]
    UnknownOrigin(String),

    /// The survivor trait id is not in the reference data.
    #[error("unknown survivor trait: {0}")]
    UnknownTrait(String),

    /// The perk id is not in the reference data.
    #[error("unknown perk: {0}")]
    UnknownPerk(String),

    /// Survivor traits were chosen for a non-survivor origin.
    #[error("survivor traits require the survivor origin")]
    TraitsRequireSurvivor,

    /// Survivor traits must be chosen in pairs.
    #[error("expected 0 or 2 distinct survivor traits, got {0}")]
    InvalidTraitCount(usize),

    /// Gifted bonus attributes were chosen without the gifted trait.
    #[error("gifted bonus attributes require the gifted trait")]
    GiftedNotActive,

    /// The gifted trait takes exactly two distinct attributes.
    #[error("expected 2 distinct gifted bonus attributes, got {0}")]
    InvalidGiftedAttributes(usize),

    /// Character level must be at least 1.
    #[error("invalid level: {0}")]
    InvalidLevel(u32),

    /// No perk choices remain at this level.
    #[error("perk budget exceeded: {spent} ranks spent at level {level}")]
    PerkBudgetExceeded {
        /// Character level.
        level: u32,
        /// Perk ranks that would be owned.
        spent: u32,
    },

    /// The perk's prerequisites are not met for the requested rank.
    #[error("perk '{perk}' rank {rank} is not available: {reason}")]
    PerkNotEligible {
        /// The perk id.
        perk: String,
        /// The requested rank.
        rank: u32,
        /// First unmet prerequisite.
        reason: String,
    },

    /// A perk is waiting for its secondary selection.
    #[error("perk '{0}' is waiting for a selection")]
    PerkPending(String),

    /// No perk is waiting for a secondary selection.
    #[error("no perk is waiting for a selection")]
    NoPendingPerk,

    /// The secondary selection does not fit the pending perk.
    #[error("invalid perk selection: {0}")]
    InvalidPerkSelection(String),

    /// The perk is not owned by the build.
    #[error("perk '{0}' is not owned")]
    PerkNotOwned(String),

    /// Reference data could not be parsed.
    #[error("invalid reference data: {0}")]
    InvalidData(String),
}

impl RulesError {
    /// Stable code naming the violated invariant.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AttributeOutOfRange { .. } => "attribute_out_of_range",
            Self::AttributeOverspent { .. } => "attribute_overspent",
            Self::AttributeAboveMaximum { .. } => "attribute_above_maximum",
            Self::SkillAboveMaximum { .. } => "skill_above_maximum",
            Self::SkillPointsOverspent { .. } => "skill_points_overspent",
            Self::TagSkillBelowFloor { .. } => "tag_skill_below_floor",
            Self::TagSkillLocked(_) => "tag_skill_locked",
            Self::TagSlotsExhausted { .. } => "tag_slots_exhausted",
            Self::InvalidOriginTagChoice(_) => "invalid_origin_tag_choice",
            Self::UnknownOrigin(_) => "unknown_origin",
            Self::UnknownTrait(_) => "unknown_trait",
            Self::UnknownPerk(_) => "unknown_perk",
            Self::TraitsRequireSurvivor => "traits_require_survivor",
            Self::InvalidTraitCount(_) => "invalid_trait_count",
            Self::GiftedNotActive => "gifted_not_active",
            Self::InvalidGiftedAttributes(_) => "invalid_gifted_attributes",
            Self::InvalidLevel(_) => "invalid_level",
            Self::PerkBudgetExceeded { .. } => "perk_budget_exceeded",
            Self::PerkNotEligible { .. } => "perk_not_eligible",
            Self::PerkPending(_) => "perk_pending",
            Self::NoPendingPerk => "no_pending_perk",
            Self::InvalidPerkSelection(_) => "invalid_perk_selection",
            Self::PerkNotOwned(_) => "perk_not_owned",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

/// Convenience result type for rules operations.
pub type RulesResult<T> = Result<T, RulesError>;
