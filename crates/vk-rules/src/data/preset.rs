//! Built-in reference data for the core wasteland rules.
//!
//! Produces the same [`RuleData`] a JSON file would, without requiring one
//! on disk.

use std::collections::BTreeMap;

use crate::data::{
    BonusTagSkills, CombatEffect, Origin, PerRankEffect, PerkDefinition, PerkEffect,
    PerkRequirements, RuleData, SpecialRuleEffect, SurvivorTrait,
};
use crate::skills::Skill;
use crate::special::Attribute;

/// The core rulebook data set.
pub fn core() -> RuleData {
    RuleData {
        name: "core".to_string(),
        origins: origins(),
        survivor_traits: survivor_traits(),
        perks: perks(),
    }
}

fn origins() -> Vec<Origin> {
    vec![
        Origin {
            description: "Raised by the Brotherhood. Tag one of Energy Weapons, Science or Repair."
                .to_string(),
            bonus_tag_skills: BonusTagSkills::Choice {
                options: names(&[Skill::EnergyWeapons, Skill::Science, Skill::Repair]),
            },
            ..Origin::new("brotherhood_initiate", "Brotherhood Initiate")
        },
        Origin {
            description: "Necrotic post-human. Immune to radiation, Survival is tagged."
                .to_string(),
            bonus_tag_skills: BonusTagSkills::Fixed {
                skills: names(&[Skill::Survival]),
            },
            ..Origin::new("ghoul", "Ghoul")
        },
        Origin {
            description: "A robot butler. Cannot take perks meant for the living.".to_string(),
            is_robot: true,
            ..Origin::new("mister_handy", "Mister Handy")
        },
        Origin {
            description: "Forced evolution. Strong and tough, limited in wit.".to_string(),
            special_modifiers: BTreeMap::from([(Attribute::Strength, 2), (Attribute::Endurance, 2)]),
            special_max: BTreeMap::from([
                (Attribute::Strength, 12),
                (Attribute::Endurance, 12),
                (Attribute::Intelligence, 6),
                (Attribute::Charisma, 6),
            ]),
            skill_max: Some(4),
            ..Origin::new("super_mutant", "Super Mutant")
        },
        Origin {
            description: "Born in the wasteland. Picks two survivor traits.".to_string(),
            ..Origin::new("survivor", "Survivor")
        },
        Origin {
            description: "Grew up in a vault. Tag one of Medicine, Science or Speech.".to_string(),
            bonus_tag_skills: BonusTagSkills::Choice {
                options: names(&[Skill::Medicine, Skill::Science, Skill::Speech]),
            },
            ..Origin::new("vault_dweller", "Vault Dweller")
        },
    ]
}

fn survivor_traits() -> Vec<SurvivorTrait> {
    [
        ("educated", "Educated", "One additional tag skill."),
        ("fast_shot", "Fast Shot", "Extra ranged attack costs less AP, but hits harder to land."),
        ("gifted", "Gifted", "+1 to two attributes, one fewer maximum luck point."),
        ("heavy_handed", "Heavy Handed", "+1 melee damage, melee complications more likely."),
        ("small_frame", "Small Frame", "Nimble, but carry capacity counts strength at half."),
    ]
    .into_iter()
    .map(|(id, name, description)| SurvivorTrait {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
    })
    .collect()
}

fn perks() -> Vec<PerkDefinition> {
    vec![
        PerkDefinition {
            description: "Spend 2 AP for an extra minor action.".to_string(),
            max_rank: 2,
            requirements: reqs(&[(Attribute::Agility, 6)], 1, Some(5)),
            effects: vec![PerkEffect::Combat(CombatEffect::ApDiscount {
                action: "extra minor action".to_string(),
                amount: 1,
            })],
            ..PerkDefinition::new("action_boy", "Action Boy")
        },
        PerkDefinition {
            description: "+1 melee damage per rank with melee weapons.".to_string(),
            max_rank: 3,
            requirements: reqs(&[(Attribute::Strength, 8)], 1, Some(3)),
            effects: vec![PerkEffect::Combat(CombatEffect::DamageBonus {
                weapon: "melee weapons".to_string(),
                amount: 1,
            })],
            ..PerkDefinition::new("big_leagues", "Big Leagues")
        },
        PerkDefinition {
            description: "Recover more from chems, fewer addictions.".to_string(),
            max_rank: 2,
            requirements: PerkRequirements {
                not_for_robots: true,
                ..reqs(&[(Attribute::Endurance, 7)], 1, Some(4))
            },
            effects: vec![PerkEffect::SpecialRule(SpecialRuleEffect::Rule {
                id: "chem_addiction_halved".to_string(),
                description: "chem addiction chance halved".to_string(),
            })],
            ..PerkDefinition::new("chem_resistant", "Chem Resistant")
        },
        PerkDefinition {
            description: "Inspire the team: the group AP pool holds one more.".to_string(),
            requirements: reqs(&[(Attribute::Charisma, 8)], 3, None),
            effects: vec![PerkEffect::SpecialRule(SpecialRuleEffect::Rule {
                id: "group_ap_bonus".to_string(),
                description: "+1 maximum group AP while present".to_string(),
            })],
            ..PerkDefinition::new("inspirational", "Inspirational")
        },
        PerkDefinition {
            description: "Gain +1 to an attribute of your choice per rank.".to_string(),
            max_rank: 10,
            requirements: reqs(&[], 2, Some(2)),
            ..PerkDefinition::new("intense_training", "Intense Training")
        },
        PerkDefinition {
            description: "+1 unarmed damage per rank.".to_string(),
            max_rank: 2,
            requirements: reqs(&[(Attribute::Strength, 6)], 1, Some(5)),
            effects: vec![PerkEffect::Combat(CombatEffect::DamageBonus {
                weapon: "unarmed".to_string(),
                amount: 1,
            })],
            ..PerkDefinition::new("iron_fist", "Iron Fist")
        },
        PerkDefinition {
            description: "Re-roll radiation damage from food and drink.".to_string(),
            max_rank: 2,
            requirements: PerkRequirements {
                not_for_robots: true,
                ..reqs(&[(Attribute::Endurance, 6)], 1, Some(4))
            },
            effects: vec![PerkEffect::SpecialRule(SpecialRuleEffect::Immunity {
                hazard: "food radiation".to_string(),
            })],
            ..PerkDefinition::new("lead_belly", "Lead Belly")
        },
        PerkDefinition {
            description: "Gain maximum HP per rank.".to_string(),
            max_rank: 3,
            requirements: PerkRequirements {
                not_for_robots: true,
                ..reqs(&[(Attribute::Endurance, 8)], 5, Some(5))
            },
            effects: vec![PerkEffect::PerRank(PerRankEffect::MaxHp(2))],
            ..PerkDefinition::new("life_giver", "Life Giver")
        },
        PerkDefinition {
            description: "Travel light and alone.".to_string(),
            requirements: PerkRequirements {
                excluded_perks: vec!["inspirational".to_string()],
                ..reqs(&[(Attribute::Charisma, 4), (Attribute::Agility, 6)], 2, None)
            },
            effects: vec![PerkEffect::PerRank(PerRankEffect::CarryCapacity(25))],
            ..PerkDefinition::new("lone_wanderer", "Lone Wanderer")
        },
        PerkDefinition {
            description: "When below half HP, gain damage resistance.".to_string(),
            max_rank: 3,
            requirements: reqs(&[(Attribute::Intelligence, 8)], 2, Some(5)),
            effects: vec![
                PerkEffect::PerRank(PerRankEffect::DrPhysical(1)),
                PerkEffect::PerRank(PerRankEffect::DrEnergy(1)),
            ],
            ..PerkDefinition::new("nerd_rage", "Nerd Rage!")
        },
        PerkDefinition {
            description: "Ignore cover when attacking.".to_string(),
            requirements: PerkRequirements {
                perks: vec!["sniper".to_string()],
                ..reqs(&[(Attribute::Perception, 7)], 4, None)
            },
            effects: vec![PerkEffect::SpecialRule(SpecialRuleEffect::Rule {
                id: "ignore_cover".to_string(),
                description: "ranged attacks ignore cover".to_string(),
            })],
            ..PerkDefinition::new("penetrator", "Penetrator")
        },
        PerkDefinition {
            description: "Reduce energy damage taken.".to_string(),
            max_rank: 2,
            requirements: reqs(&[(Attribute::Perception, 6), (Attribute::Luck, 7)], 1, Some(4)),
            effects: vec![PerkEffect::PerRank(PerRankEffect::DrEnergy(1))],
            ..PerkDefinition::new("refractor", "Refractor")
        },
        PerkDefinition {
            description: "Reduce radiation damage taken.".to_string(),
            max_rank: 2,
            requirements: PerkRequirements {
                not_for_robots: true,
                ..reqs(&[(Attribute::Endurance, 8)], 1, Some(4))
            },
            effects: vec![PerkEffect::PerRank(PerRankEffect::DrRadiation(1))],
            ..PerkDefinition::new("rad_resistant", "Rad Resistant")
        },
        PerkDefinition {
            description: "Re-roll one die when programming or repairing robots.".to_string(),
            requirements: PerkRequirements {
                skills: BTreeMap::from([(Skill::Science, 2)]),
                ..reqs(&[(Attribute::Intelligence, 8)], 2, None)
            },
            effects: vec![PerkEffect::Combat(CombatEffect::Reroll {
                skill: Skill::Science,
                dice: 1,
            })],
            ..PerkDefinition::new("robotics_expert", "Robotics Expert")
        },
        PerkDefinition {
            description: "Aimed shots with rifles are deadlier.".to_string(),
            requirements: PerkRequirements {
                skills: BTreeMap::from([(Skill::SmallGuns, 2)]),
                ..reqs(&[(Attribute::Perception, 8), (Attribute::Agility, 6)], 2, None)
            },
            effects: vec![PerkEffect::Combat(CombatEffect::Reroll {
                skill: Skill::SmallGuns,
                dice: 1,
            })],
            ..PerkDefinition::new("sniper", "Sniper")
        },
        PerkDefinition {
            description: "Carry more per rank.".to_string(),
            max_rank: 3,
            requirements: reqs(&[(Attribute::Strength, 5)], 1, Some(2)),
            effects: vec![PerkEffect::PerRank(PerRankEffect::CarryCapacity(25))],
            ..PerkDefinition::new("strong_back", "Strong Back")
        },
        PerkDefinition {
            description: "Choose an additional tag skill.".to_string(),
            requirements: reqs(&[], 5, None),
            ..PerkDefinition::new("tag", "Tag!")
        },
        PerkDefinition {
            description: "Reduce physical damage taken.".to_string(),
            max_rank: 2,
            requirements: reqs(&[(Attribute::Endurance, 6), (Attribute::Luck, 6)], 1, Some(4)),
            effects: vec![PerkEffect::PerRank(PerRankEffect::DrPhysical(1))],
            ..PerkDefinition::new("toughness", "Toughness")
        },
    ]
}

fn names(skills: &[Skill]) -> Vec<String> {
    skills.iter().map(|s| s.name().to_string()).collect()
}

fn reqs(special: &[(Attribute, u32)], level: u32, per_rank: Option<u32>) -> PerkRequirements {
    PerkRequirements {
        special: special.iter().copied().collect(),
        level,
        level_increase_per_rank: per_rank,
        ..PerkRequirements::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_has_expected_origins() {
        let data = core();
        assert_eq!(data.origins.len(), 6);
        assert!(data.origin("survivor").is_some());
        assert!(data.origin("mister_handy").unwrap().is_robot);
        assert_eq!(data.origin("super_mutant").unwrap().skill_max, Some(4));
    }

    #[test]
    fn perk_ids_are_unique() {
        let data = core();
        let mut ids: Vec<_> = data.perks.iter().map(|p| p.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), data.perks.len());
    }

    #[test]
    fn perk_prerequisites_reference_known_perks() {
        let data = core();
        for perk in &data.perks {
            for id in perk
                .requirements
                .perks
                .iter()
                .chain(&perk.requirements.excluded_perks)
            {
                assert!(data.perk(id).is_some(), "{} references {id}", perk.id);
            }
        }
    }

    #[test]
    fn secondary_selection_perks_present() {
        let data = core();
        assert!(data.perk("intense_training").is_some());
        assert!(data.perk("tag").is_some());
    }

    #[test]
    fn survivor_traits_cover_mechanical_ids() {
        let data = core();
        for id in ["educated", "gifted", "heavy_handed", "small_frame"] {
            assert!(data.survivor_trait(id).is_some(), "missing {id}");
        }
    }
}
