//! Character build and stat derivation rules engine for Vaultkeeper.
//!
//! Validates SPECIAL point-buy and skill budgets, allocates tag skills,
//! resolves which perks a build may take next, and folds origin, trait,
//! perk and equipment effects into a derived [`StatBlock`]. Every function
//! takes the reference data ([`RuleData`]) as an explicit parameter; the
//! built-in data set lives in [`data::preset`].

pub mod build;
pub mod config;
pub mod data;
pub mod derive;
pub mod error;
pub mod perks;
pub mod skills;
pub mod special;
pub mod validate;

pub use build::{BuildAction, CharacterBuild, PendingPerk, PerkSelection, apply_build_action};
pub use config::RulesConfig;
pub use data::{
    BonusTagSkills, CombatEffect, Origin, PerRankEffect, PerkDefinition, PerkEffect,
    PerkRequirements, RuleData, SpecialRuleEffect, SurvivorTrait,
};
pub use derive::{DamageResistance, EquipmentBonuses, StatBlock, derive_stats};
pub use error::{RulesError, RulesResult};
pub use perks::{OwnedPerk, PerkChoice, PerkContext, available_perks};
pub use skills::{Skill, SkillBudget, SkillRanks};
pub use special::{Attribute, AttributeBudget, Special};
pub use validate::{Severity, ValidationIssue, ValidationReport, validate_build};
