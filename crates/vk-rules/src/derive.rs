//! Stat derivation: fold origin, traits, perks and equipment into a
//! [`StatBlock`].

use serde::{Deserialize, Serialize};

use crate::build::CharacterBuild;
use crate::config::RulesConfig;
use crate::data::{
    CombatEffect, PerRankEffect, PerkEffect, RuleData, SpecialRuleEffect, traits,
};
use crate::special::Special;

/// Base carry capacity before strength.
pub const BASE_CARRY_CAPACITY: f64 = 75.0;

/// Damage resistance by damage type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageResistance {
    /// Physical damage resistance.
    pub physical: i32,
    /// Energy damage resistance.
    pub energy: i32,
    /// Radiation damage resistance.
    pub radiation: i32,
}

/// Bonuses contributed by carried equipment, computed outside the core.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquipmentBonuses {
    /// Extra carry capacity in pounds (backpacks, mods).
    pub carry_capacity: f64,
}

/// The derived combat stat block for a build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatBlock {
    /// Post-modifier attributes.
    pub special: Special,
    /// Maximum hit points.
    pub max_hp: i32,
    /// Defense target number.
    pub defense: u32,
    /// Initiative score.
    pub initiative: u32,
    /// Bonus melee damage dice.
    pub melee_damage_bonus: u32,
    /// Maximum luck points.
    pub max_luck_points: u32,
    /// Carry capacity in pounds.
    pub carry_capacity: f64,
    /// Perk-sourced damage resistance. Armor is applied elsewhere.
    pub dr: DamageResistance,
    /// Combat-only bonuses, already scaled by rank.
    pub combat_effects: Vec<CombatEffect>,
    /// Rule changes from perks.
    pub special_rules: Vec<SpecialRuleEffect>,
    /// Human-readable list of active effects, for display only.
    pub active_effects: Vec<String>,
}

/// `endurance + luck + (level - 1)`.
pub fn calculate_max_hp(endurance: u32, luck: u32, level: u32) -> i32 {
    (endurance + luck + level.saturating_sub(1)) as i32
}

/// 2 with agility 9 or more, otherwise 1.
pub fn calculate_defense(agility: u32) -> u32 {
    if agility >= 9 { 2 } else { 1 }
}

/// `perception + agility`.
pub fn calculate_initiative(perception: u32, agility: u32) -> u32 {
    perception + agility
}

/// Melee damage bonus from strength, +1 for heavy-handed.
pub fn calculate_melee_damage_bonus(strength: u32, heavy_handed: bool) -> u32 {
    let base = match strength {
        0..=6 => 0,
        7..=8 => 1,
        9..=10 => 2,
        _ => 3,
    };
    base + u32::from(heavy_handed)
}

/// `luck`, minus one for gifted.
pub fn calculate_max_luck_points(luck: u32, gifted: bool) -> u32 {
    luck.saturating_sub(u32::from(gifted))
}

/// `75 + k × strength`, `k` halved for small-frame.
pub fn calculate_carry_capacity(strength: u32, small_frame: bool) -> f64 {
    let per_point = if small_frame { 2.5 } else { 5.0 };
    BASE_CARRY_CAPACITY + per_point * strength as f64
}

/// Derive the stat block for a build.
///
/// Pure: the same inputs always give the same block. Perk ids missing from
/// the reference data are skipped, and post-modifier attributes above the
/// origin maximum are clamped.
pub fn derive_stats(
    data: &RuleData,
    config: &RulesConfig,
    build: &CharacterBuild,
    equipment: &EquipmentBonuses,
) -> StatBlock {
    let origin = build.origin(data);
    let special = build.effective_special(data, config);

    let small_frame = build.has_trait(traits::SMALL_FRAME);
    let heavy_handed = build.has_trait(traits::HEAVY_HANDED);
    let gifted = build.has_trait(traits::GIFTED);

    let mut block = StatBlock {
        special,
        max_hp: calculate_max_hp(special.endurance, special.luck, build.level),
        defense: calculate_defense(special.agility),
        initiative: calculate_initiative(special.perception, special.agility),
        melee_damage_bonus: calculate_melee_damage_bonus(special.strength, heavy_handed),
        max_luck_points: calculate_max_luck_points(special.luck, gifted),
        carry_capacity: calculate_carry_capacity(special.strength, small_frame)
            + equipment.carry_capacity,
        ..StatBlock::default()
    };

    if let Some(origin) = origin {
        let mods: Vec<String> = origin
            .special_modifiers
            .iter()
            .map(|(a, d)| format!("{d:+} {a}"))
            .collect();
        if mods.is_empty() {
            block.active_effects.push(format!("Origin: {}", origin.name));
        } else {
            block
                .active_effects
                .push(format!("Origin: {} ({})", origin.name, mods.join(", ")));
        }
    }

    for id in &build.survivor_traits {
        let name = data
            .survivor_trait(id)
            .map_or(id.as_str(), |t| t.name.as_str());
        let text = match id.as_str() {
            traits::EDUCATED => format!("{name}: +1 tag skill"),
            traits::GIFTED => {
                let attrs: Vec<String> = build
                    .gifted_bonus_attributes
                    .iter()
                    .map(|a| format!("+1 {a}"))
                    .collect();
                if attrs.is_empty() {
                    format!("{name}: -1 max luck points")
                } else {
                    format!("{name}: {}, -1 max luck points", attrs.join(", "))
                }
            }
            traits::HEAVY_HANDED => format!("{name}: +1 melee damage"),
            traits::SMALL_FRAME => format!("{name}: carry capacity uses half strength"),
            _ => name.to_string(),
        };
        block.active_effects.push(text);
    }

    for owned in &build.perks {
        let Some(perk) = data.perk(&owned.perk_id) else {
            tracing::debug!(perk = %owned.perk_id, "skipping unknown perk in derivation");
            continue;
        };
        let rank = owned.rank;
        let scale = rank as i32;

        for effect in &perk.effects {
            match effect {
                PerkEffect::PerRank(per_rank) => {
                    let (label, amount) = match *per_rank {
                        PerRankEffect::MaxHp(n) => {
                            block.max_hp += n * scale;
                            ("max HP", n * scale)
                        }
                        PerRankEffect::DrPhysical(n) => {
                            block.dr.physical += n * scale;
                            ("physical DR", n * scale)
                        }
                        PerRankEffect::DrEnergy(n) => {
                            block.dr.energy += n * scale;
                            ("energy DR", n * scale)
                        }
                        PerRankEffect::DrRadiation(n) => {
                            block.dr.radiation += n * scale;
                            ("radiation DR", n * scale)
                        }
                        PerRankEffect::CarryCapacity(n) => {
                            block.carry_capacity += (n * scale) as f64;
                            ("carry capacity", n * scale)
                        }
                    };
                    block
                        .active_effects
                        .push(format!("{} {rank}: {amount:+} {label}", perk.name));
                }
                PerkEffect::Combat(combat) => {
                    let scaled = combat.scaled(rank);
                    block
                        .active_effects
                        .push(format!("{} {rank}: {scaled}", perk.name));
                    block.combat_effects.push(scaled);
                }
                PerkEffect::SpecialRule(rule) => {
                    block
                        .active_effects
                        .push(format!("{} {rank}: {rule}", perk.name));
                    block.special_rules.push(rule.clone());
                }
            }
        }
    }

    if !build.exercise_bonuses.is_empty() {
        let attrs: Vec<String> = build
            .exercise_bonuses
            .iter()
            .map(|a| format!("+1 {a}"))
            .collect();
        block
            .active_effects
            .push(format!("Intense Training: {}", attrs.join(", ")));
    }

    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::preset;
    use crate::perks::OwnedPerk;

    fn build_with(special: Special) -> CharacterBuild {
        CharacterBuild {
            special,
            ..CharacterBuild::default()
        }
    }

    #[test]
    fn max_hp_formula() {
        assert_eq!(calculate_max_hp(5, 5, 1), 10);
        assert_eq!(calculate_max_hp(5, 5, 5), 14);
    }

    #[test]
    fn carry_capacity_formula() {
        assert_eq!(calculate_carry_capacity(5, false), 100.0);
        assert_eq!(calculate_carry_capacity(5, true), 87.5);
    }

    #[test]
    fn melee_bonus_thresholds() {
        assert_eq!(calculate_melee_damage_bonus(6, false), 0);
        assert_eq!(calculate_melee_damage_bonus(7, false), 1);
        assert_eq!(calculate_melee_damage_bonus(8, false), 1);
        assert_eq!(calculate_melee_damage_bonus(9, false), 2);
        assert_eq!(calculate_melee_damage_bonus(10, false), 2);
        assert_eq!(calculate_melee_damage_bonus(11, false), 3);
        assert_eq!(calculate_melee_damage_bonus(7, true), 2);
    }

    #[test]
    fn defense_and_luck() {
        assert_eq!(calculate_defense(8), 1);
        assert_eq!(calculate_defense(9), 2);
        assert_eq!(calculate_max_luck_points(5, true), 4);
        assert_eq!(calculate_max_luck_points(0, true), 0);
    }

    #[test]
    fn plain_build_stats() {
        let data = preset::core();
        let block = derive_stats(
            &data,
            &RulesConfig::default(),
            &build_with(Special::default()),
            &EquipmentBonuses::default(),
        );
        assert_eq!(block.max_hp, 10);
        assert_eq!(block.defense, 1);
        assert_eq!(block.initiative, 10);
        assert_eq!(block.melee_damage_bonus, 0);
        assert_eq!(block.max_luck_points, 5);
        assert_eq!(block.carry_capacity, 100.0);
        assert_eq!(block.dr, DamageResistance::default());
        assert!(block.active_effects.is_empty());
    }

    #[test]
    fn perk_effects_scale_with_rank() {
        let data = preset::core();
        let mut build = build_with(Special::default());
        build.level = 9;
        build.perks = vec![
            OwnedPerk::new("toughness", 2),
            OwnedPerk::new("life_giver", 1),
            OwnedPerk::new("strong_back", 3),
            OwnedPerk::new("big_leagues", 2),
        ];
        let block = derive_stats(&data, &RulesConfig::default(), &build, &EquipmentBonuses::default());
        assert_eq!(block.dr.physical, 2);
        assert_eq!(block.max_hp, 10 + 8 + 2);
        assert_eq!(block.carry_capacity, 100.0 + 75.0);
        assert_eq!(
            block.combat_effects,
            vec![CombatEffect::DamageBonus {
                weapon: "melee weapons".to_string(),
                amount: 2
            }]
        );
        assert!(block.active_effects.contains(&"Toughness 2: +2 physical DR".to_string()));
    }

    #[test]
    fn unknown_perks_are_skipped() {
        let data = preset::core();
        let mut build = build_with(Special::default());
        build.perks = vec![OwnedPerk::new("not_a_perk", 1)];
        let block = derive_stats(&data, &RulesConfig::default(), &build, &EquipmentBonuses::default());
        assert_eq!(block.max_hp, 10);
    }

    #[test]
    fn traits_apply_flat_effects() {
        let data = preset::core();
        let mut build = build_with(Special {
            strength: 7,
            ..Special::default()
        });
        build.origin = Some("survivor".to_string());
        build.survivor_traits = vec!["small_frame".to_string(), "heavy_handed".to_string()];
        let block = derive_stats(&data, &RulesConfig::default(), &build, &EquipmentBonuses::default());
        assert_eq!(block.carry_capacity, 75.0 + 2.5 * 7.0);
        assert_eq!(block.melee_damage_bonus, 2);
    }

    #[test]
    fn origin_modifiers_and_equipment() {
        let data = preset::core();
        let mut build = build_with(Special::default());
        build.origin = Some("super_mutant".to_string());
        let equipment = EquipmentBonuses { carry_capacity: 30.0 };
        let block = derive_stats(&data, &RulesConfig::default(), &build, &equipment);
        assert_eq!(block.special.strength, 7);
        assert_eq!(block.special.endurance, 7);
        assert_eq!(block.max_hp, 12);
        assert_eq!(block.carry_capacity, 75.0 + 35.0 + 30.0);
        assert_eq!(
            block.active_effects[0],
            "Origin: Super Mutant (+2 strength, +2 endurance)"
        );
    }

    #[test]
    fn over_maximum_attributes_are_clamped() {
        let data = preset::core();
        let mut build = build_with(Special {
            intelligence: 9,
            ..Special::default()
        });
        build.origin = Some("super_mutant".to_string());
        let block = derive_stats(&data, &RulesConfig::default(), &build, &EquipmentBonuses::default());
        assert_eq!(block.special.intelligence, 6);
    }

    #[test]
    fn derivation_is_pure() {
        let data = preset::core();
        let mut build = build_with(Special::default());
        build.perks = vec![OwnedPerk::new("refractor", 1)];
        let a = derive_stats(&data, &RulesConfig::default(), &build, &EquipmentBonuses::default());
        let b = derive_stats(&data, &RulesConfig::default(), &build, &EquipmentBonuses::default());
        assert_eq!(a, b);
    }
}
