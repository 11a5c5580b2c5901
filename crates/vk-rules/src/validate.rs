//! Whole-build validation.
//!
//! The reducer rejects bad edits one at a time. This pass looks at a
//! complete build, such as one submitted as a full payload, and reports
//! every blocking error along with the warnings that mark it incomplete.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::build::CharacterBuild;
use crate::config::RulesConfig;
use crate::data::{RuleData, traits};
use crate::error::RulesError;
use crate::perks::{self, INTENSE_TRAINING, TAG_PERK};
use crate::special::{self, Attribute};

/// How serious a validation issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The build violates a rule and cannot be saved.
    Error,
    /// The build is legal but incomplete.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single problem found in a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Error or warning.
    pub severity: Severity,
    /// Stable code naming the rule.
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

impl ValidationIssue {
    /// A warning issue.
    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Returns true for blocking issues.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl From<RulesError> for ValidationIssue {
    fn from(err: RulesError) -> Self {
        Self {
            severity: Severity::Error,
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.code, self.message)
    }
}

/// All issues found in a build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Issues in the order they were found.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Blocking issues.
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.is_error())
    }

    /// Non-blocking issues.
    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| !i.is_error())
    }

    /// Returns true if any issue blocks the build.
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// The first blocking issue as an error, if any.
    pub fn first_error(&self) -> Option<&ValidationIssue> {
        self.errors().next()
    }

    /// Returns true if nothing was found.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    fn error(&mut self, err: RulesError) {
        self.issues.push(err.into());
    }

    fn warn(&mut self, code: &str, message: impl Into<String>) {
        self.issues.push(ValidationIssue::warning(code, message));
    }
}

/// Check a complete build against every build rule.
pub fn validate_build(data: &RuleData, config: &RulesConfig, build: &CharacterBuild) -> ValidationReport {
    let mut report = ValidationReport::default();

    if build.level == 0 {
        report.error(RulesError::InvalidLevel(build.level));
    }

    check_origin(data, build, &mut report);
    check_attributes(data, config, build, &mut report);
    check_skills(data, config, build, &mut report);
    check_traits(data, build, &mut report);
    check_perks(data, config, build, &mut report);

    tracing::debug!(
        errors = report.errors().count(),
        warnings = report.warnings().count(),
        "validated build"
    );
    report
}

fn check_origin(data: &RuleData, build: &CharacterBuild, report: &mut ValidationReport) {
    if let Some(id) = &build.origin {
        if data.origin(id).is_none() {
            report.error(RulesError::UnknownOrigin(id.clone()));
        }
    }
    if build.origin_tag_choice_missing(data) {
        report.warn(
            "origin_tag_skill_missing",
            "origin bonus tag skill has not been chosen",
        );
    }
    if let (Some(choice), Some(origin)) = (build.origin_tag_choice, build.origin(data)) {
        if !origin.tag_skill_options().contains(&choice) {
            report.error(RulesError::InvalidOriginTagChoice(choice));
        }
    }
}

fn check_attributes(
    data: &RuleData,
    config: &RulesConfig,
    build: &CharacterBuild,
    report: &mut ValidationReport,
) {
    for (attribute, value) in build.special.iter() {
        if let Err(err) = special::check_attribute_range(attribute, value, config) {
            report.error(err);
        }
    }

    let budget = build.attribute_budget(config);
    if budget.remaining < 0 {
        report.error(RulesError::AttributeOverspent {
            remaining: budget.remaining,
        });
    } else if budget.is_underspent() {
        report.warn(
            "attribute_underspent",
            format!("{} attribute points unspent", budget.remaining),
        );
    }

    let origin = build.origin(data);
    for (attribute, value) in build.modified_special(data).iter() {
        let max = special::attribute_maximum(attribute, origin, config);
        if value > max {
            report.error(RulesError::AttributeAboveMaximum {
                attribute,
                value,
                max,
            });
        }
    }
}

fn check_skills(
    data: &RuleData,
    config: &RulesConfig,
    build: &CharacterBuild,
    report: &mut ValidationReport,
) {
    let max = build.skill_ceiling(data, config);
    for (skill, rank) in build.skills.iter() {
        if rank > max {
            report.error(RulesError::SkillAboveMaximum { skill, rank, max });
        }
    }
    for &skill in &build.tag_skills {
        if build.skills.get(skill) < config.tag_floor {
            report.error(RulesError::TagSkillBelowFloor {
                skill,
                floor: config.tag_floor,
            });
        }
    }

    let budget = build.skill_budget(data, config);
    if budget.is_overspent() {
        report.error(RulesError::SkillPointsOverspent {
            remaining: budget.remaining,
        });
    } else if budget.is_underspent() {
        report.warn(
            "skill_points_underspent",
            format!("{} skill points unspent", budget.remaining),
        );
    }

    let slots = build.tag_slot_count(data, config);
    let tagged = build.tag_skills.len() as u32;
    if tagged > slots {
        report.error(RulesError::TagSlotsExhausted { slots });
    } else if tagged < slots {
        report.warn(
            "tag_skills_unassigned",
            format!("{} of {slots} tag skills chosen", tagged),
        );
    }

    for skill in build.locked_tag_skills(data) {
        if !build.tag_skills.contains(&skill) {
            report.error(RulesError::TagSkillLocked(skill));
        }
    }
}

fn check_traits(data: &RuleData, build: &CharacterBuild, report: &mut ValidationReport) {
    let distinct: BTreeSet<&str> = build.survivor_traits.iter().map(String::as_str).collect();
    if !distinct.is_empty() && !build.is_survivor() {
        report.error(RulesError::TraitsRequireSurvivor);
    }
    if !matches!(distinct.len(), 0 | 2) || distinct.len() != build.survivor_traits.len() {
        report.error(RulesError::InvalidTraitCount(distinct.len()));
    }
    for id in &distinct {
        if data.survivor_trait(id).is_none() {
            report.error(RulesError::UnknownTrait((*id).to_string()));
        }
    }

    let gifted: BTreeSet<Attribute> = build.gifted_bonus_attributes.iter().copied().collect();
    if !build.gifted_bonus_attributes.is_empty() && !build.has_trait(traits::GIFTED) {
        report.error(RulesError::GiftedNotActive);
    } else if build.has_trait(traits::GIFTED) {
        if build.gifted_bonus_attributes.is_empty() {
            report.warn("gifted_attributes_missing", "gifted bonus attributes not chosen");
        } else if build.gifted_bonus_attributes.len() != 2 || gifted.len() != 2 {
            report.error(RulesError::InvalidGiftedAttributes(gifted.len()));
        }
    }

    if build.is_survivor() && distinct.is_empty() {
        report.warn("survivor_traits_missing", "survivor traits not chosen");
    }
}

fn check_perks(
    data: &RuleData,
    config: &RulesConfig,
    build: &CharacterBuild,
    report: &mut ValidationReport,
) {
    let spent = perks::ranks_spent(&build.perks);
    if spent > build.level {
        report.error(RulesError::PerkBudgetExceeded {
            level: build.level,
            spent,
        });
    }

    let mut seen = BTreeSet::new();
    for owned in &build.perks {
        if !seen.insert(owned.perk_id.as_str()) {
            report.error(RulesError::InvalidPerkSelection(format!(
                "perk '{}' is listed more than once",
                owned.perk_id
            )));
        }
        let Some(perk) = data.perk(&owned.perk_id) else {
            report.error(RulesError::UnknownPerk(owned.perk_id.clone()));
            continue;
        };
        if owned.rank == 0 || owned.rank > perk.max_rank {
            report.error(RulesError::PerkNotEligible {
                perk: owned.perk_id.clone(),
                rank: owned.rank,
                reason: format!("rank must be between 1 and {}", perk.max_rank),
            });
        }
    }

    for (owned, reason) in build.unmet_perk_requirements(data, config) {
        report.error(RulesError::PerkNotEligible {
            perk: owned.perk_id,
            rank: owned.rank,
            reason: reason.to_string(),
        });
    }

    let training = build.perk_rank(INTENSE_TRAINING) as usize;
    if build.exercise_bonuses.len() != training {
        report.error(RulesError::InvalidPerkSelection(format!(
            "{} intense training bonuses for rank {training}",
            build.exercise_bonuses.len()
        )));
    }

    if build.perk_rank(TAG_PERK) > 0 && build.tag_perk_skill.is_none() {
        report.warn("tag_perk_skill_missing", "Tag! perk skill has not been chosen");
    }

    if let Some(pending) = &build.pending_perk {
        report.warn(
            "perk_pending",
            format!("perk '{}' is waiting for a selection", pending.perk_id),
        );
    }
    if spent < build.level && build.pending_perk.is_none() {
        report.warn(
            "perk_choices_unspent",
            format!("{} perk choices unspent", build.level - spent),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::preset;
    use crate::perks::OwnedPerk;
    use crate::skills::Skill;
    use crate::special::Special;

    fn codes(report: &ValidationReport) -> Vec<&str> {
        report.issues.iter().map(|i| i.code.as_str()).collect()
    }

    fn complete_build() -> CharacterBuild {
        CharacterBuild {
            special: Special {
                strength: 7,
                endurance: 7,
                luck: 6,
                ..Special::default()
            },
            skills: [
                (Skill::SmallGuns, 4),
                (Skill::Sneak, 4),
                (Skill::Medicine, 2),
                (Skill::Athletics, 5),
                (Skill::Repair, 5),
            ]
            .into_iter()
            .collect(),
            tag_skills: BTreeSet::from([Skill::SmallGuns, Skill::Sneak, Skill::Medicine]),
            perks: vec![OwnedPerk::new("toughness", 1)],
            ..CharacterBuild::default()
        }
    }

    #[test]
    fn complete_build_is_clean() {
        let report = validate_build(&preset::core(), &RulesConfig::default(), &complete_build());
        assert!(report.is_clean(), "{:?}", report.issues);
    }

    #[test]
    fn fresh_build_only_warns() {
        let report = validate_build(&preset::core(), &RulesConfig::default(), &CharacterBuild::default());
        assert!(!report.has_errors());
        let found = codes(&report);
        assert!(found.contains(&"attribute_underspent"));
        assert!(found.contains(&"skill_points_underspent"));
        assert!(found.contains(&"tag_skills_unassigned"));
        assert!(found.contains(&"perk_choices_unspent"));
    }

    #[test]
    fn overspent_attributes_are_errors() {
        let build = CharacterBuild {
            special: Special::uniform(7),
            ..complete_build()
        };
        let report = validate_build(&preset::core(), &RulesConfig::default(), &build);
        assert_eq!(report.first_error().unwrap().code, "attribute_overspent");
    }

    #[test]
    fn missing_origin_choice_is_a_warning() {
        let build = CharacterBuild {
            origin: Some("vault_dweller".to_string()),
            ..complete_build()
        };
        let report = validate_build(&preset::core(), &RulesConfig::default(), &build);
        assert!(!report.has_errors(), "{:?}", report.issues);
        assert!(codes(&report).contains(&"origin_tag_skill_missing"));
    }

    #[test]
    fn perk_budget_and_rank_errors() {
        let build = CharacterBuild {
            perks: vec![OwnedPerk::new("toughness", 3), OwnedPerk::new("ghost_perk", 1)],
            ..complete_build()
        };
        let report = validate_build(&preset::core(), &RulesConfig::default(), &build);
        let found = codes(&report);
        assert!(found.contains(&"perk_budget_exceeded"));
        assert!(found.contains(&"perk_not_eligible"));
        assert!(found.contains(&"unknown_perk"));
    }

    #[test]
    fn robots_cannot_own_living_perks() {
        let build = CharacterBuild {
            origin: Some("mister_handy".to_string()),
            special: Special {
                endurance: 8,
                ..Special::default()
            },
            perks: vec![OwnedPerk::new("rad_resistant", 1)],
            ..complete_build()
        };
        let report = validate_build(&preset::core(), &RulesConfig::default(), &build);
        let issue = report.errors().find(|i| i.code == "perk_not_eligible").unwrap();
        assert!(issue.message.contains("robots"));
    }

    #[test]
    fn perk_below_attribute_minimum_is_an_error() {
        let build = CharacterBuild {
            perks: vec![OwnedPerk::new("big_leagues", 1)],
            ..complete_build()
        };
        let report = validate_build(&preset::core(), &RulesConfig::default(), &build);
        let issue = report.errors().find(|i| i.code == "perk_not_eligible").unwrap();
        assert!(issue.message.contains("needs strength 8 (is 7)"), "{}", issue.message);
    }

    #[test]
    fn perk_without_its_required_perk_is_an_error() {
        let build = CharacterBuild {
            level: 4,
            special: Special {
                perception: 8,
                endurance: 6,
                luck: 6,
                ..Special::default()
            },
            perks: vec![OwnedPerk::new("penetrator", 1)],
            ..complete_build()
        };
        let report = validate_build(&preset::core(), &RulesConfig::default(), &build);
        let messages: Vec<&str> = report
            .errors()
            .filter(|i| i.code == "perk_not_eligible")
            .map(|i| i.message.as_str())
            .collect();
        assert_eq!(messages.len(), 1, "{:?}", report.issues);
        assert!(messages[0].contains("requires perk 'sniper'"));
    }

    #[test]
    fn excluded_perks_cannot_be_owned_together() {
        let build = CharacterBuild {
            level: 3,
            special: Special {
                charisma: 8,
                agility: 6,
                endurance: 6,
                luck: 6,
                ..Special::default()
            },
            perks: vec![OwnedPerk::new("inspirational", 1), OwnedPerk::new("lone_wanderer", 1)],
            ..complete_build()
        };
        let report = validate_build(&preset::core(), &RulesConfig::default(), &build);
        assert!(
            report
                .errors()
                .any(|i| i.message.contains("incompatible with perk 'inspirational'")),
            "{:?}",
            report.issues
        );
    }

    #[test]
    fn tag_perk_without_skill_warns() {
        let build = CharacterBuild {
            level: 5,
            perks: vec![OwnedPerk::new("tag", 1)],
            ..complete_build()
        };
        let report = validate_build(&preset::core(), &RulesConfig::default(), &build);
        assert!(!report.has_errors(), "{:?}", report.issues);
        assert!(codes(&report).contains(&"tag_perk_skill_missing"));
    }

    #[test]
    fn trait_rules() {
        let build = CharacterBuild {
            survivor_traits: vec!["gifted".to_string()],
            gifted_bonus_attributes: vec![Attribute::Luck],
            ..complete_build()
        };
        let report = validate_build(&preset::core(), &RulesConfig::default(), &build);
        let found = codes(&report);
        assert!(found.contains(&"traits_require_survivor"));
        assert!(found.contains(&"invalid_trait_count"));
        assert!(found.contains(&"invalid_gifted_attributes"));
    }

    #[test]
    fn tag_floor_and_slots() {
        let mut build = complete_build();
        build.skills.set(Skill::Medicine, 1);
        build.tag_skills.insert(Skill::Repair);
        let report = validate_build(&preset::core(), &RulesConfig::default(), &build);
        let found = codes(&report);
        assert!(found.contains(&"tag_skill_below_floor"));
        assert!(found.contains(&"tag_slots_exhausted"));
    }

    #[test]
    fn exercise_bonuses_match_training_rank() {
        let build = CharacterBuild {
            exercise_bonuses: vec![Attribute::Agility],
            ..complete_build()
        };
        let report = validate_build(&preset::core(), &RulesConfig::default(), &build);
        assert!(codes(&report).contains(&"invalid_perk_selection"));
    }

    #[test]
    fn issue_display() {
        let issue = ValidationIssue::warning("perk_pending", "perk 'tag' is waiting for a selection");
        assert_eq!(
            issue.to_string(),
            "warning: perk_pending: perk 'tag' is waiting for a selection"
        );
    }
}
