use std::path::{Path, PathBuf};

use clap::Subcommand;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use vk_core::{Character, CharacterDraft, CharacterKind, CharacterPatch, Checked};
use vk_rules::{Attribute, BuildAction, CharacterBuild, EquipmentBonuses, Skill};

use super::{CliVault, describe, print_warnings};

#[derive(Subcommand)]
pub enum CharacterCommand {
    /// Create a character
    Create {
        /// Character name
        name: String,

        /// Create a non-player character
        #[arg(long)]
        npc: bool,

        /// JSON file holding the full build
        #[arg(short, long)]
        build: Option<PathBuf>,

        /// Starting caps
        #[arg(long, default_value = "0")]
        caps: u32,
    },

    /// List characters, optionally only pc or npc
    List {
        /// pc or npc
        kind: Option<String>,
    },

    /// Show a character sheet
    Show {
        /// Name or id prefix
        character: String,

        /// Print the stored record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change name, caps, HP, luck, equipment or the whole build
    Update {
        /// Name or id prefix
        character: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// JSON file holding a replacement build
        #[arg(short, long)]
        build: Option<PathBuf>,

        /// Caps
        #[arg(long)]
        caps: Option<u32>,

        /// Current HP
        #[arg(long)]
        hp: Option<i32>,

        /// Current luck points
        #[arg(long)]
        luck: Option<u32>,

        /// Extra carry capacity from equipment
        #[arg(long)]
        carry: Option<f64>,
    },

    /// Apply a build action given as JSON, e.g. '{"action":"set_level","level":3}'
    Edit {
        /// Name or id prefix
        character: String,

        /// The action
        action: String,
    },

    /// Set the character level
    Level {
        /// Name or id prefix
        character: String,

        /// New level
        level: u32,
    },

    /// Set or clear the origin
    Origin {
        /// Name or id prefix
        character: String,

        /// Origin id; omit to clear
        origin: Option<String>,
    },

    /// Set a pre-modifier attribute
    Attribute {
        /// Name or id prefix
        character: String,

        /// Attribute name or first letter
        attribute: String,

        /// New value
        value: u32,
    },

    /// Set a skill rank
    Skill {
        /// Name or id prefix
        character: String,

        /// Skill name
        skill: String,

        /// New rank
        rank: u32,
    },

    /// Tag or untag a skill
    Tag {
        /// Name or id prefix
        character: String,

        /// Skill name
        skill: String,
    },

    /// Take the next rank of a perk
    Perk {
        /// Name or id prefix
        character: String,

        /// Perk id
        perk: String,
    },

    /// Remove one rank of a perk
    DropPerk {
        /// Name or id prefix
        character: String,

        /// Perk id
        perk: String,
    },

    /// Run full build validation
    Check {
        /// Name or id prefix
        character: String,
    },

    /// Copy a character
    Duplicate {
        /// Name or id prefix
        character: String,

        /// Name of the copy
        #[arg(long)]
        name: Option<String>,
    },

    /// Delete a character
    Delete {
        /// Name or id prefix
        character: String,
    },
}

pub fn run(vault: &mut CliVault, command: CharacterCommand) -> Result<(), String> {
    match command {
        CharacterCommand::Create {
            name,
            npc,
            build,
            caps,
        } => {
            let kind = if npc { CharacterKind::Npc } else { CharacterKind::Pc };
            let mut draft = CharacterDraft::new(name, kind).with_caps(caps);
            if let Some(path) = build {
                draft = draft.with_build(read_build(&path)?);
            }
            let saved = vault.create_character(draft).map_err(describe)?;
            println!(
                "  Created {} '{}' ({})",
                saved.record.kind,
                saved.record.name.bold(),
                saved.record.id
            );
            print_warnings(&saved.warnings);
            Ok(())
        }
        CharacterCommand::List { kind } => {
            let kind = kind
                .map(|k| k.parse::<CharacterKind>())
                .transpose()?;
            list(vault, kind)
        }
        CharacterCommand::Show { character, json } => {
            let character = vault.find_character(&character).map_err(describe)?;
            if json {
                let out = serde_json::to_string_pretty(&character).map_err(|e| e.to_string())?;
                println!("{out}");
            } else {
                show(&character);
            }
            Ok(())
        }
        CharacterCommand::Update {
            character,
            name,
            build,
            caps,
            hp,
            luck,
            carry,
        } => {
            let id = vault.find_character(&character).map_err(describe)?.id;
            let patch = CharacterPatch {
                name,
                build: build.as_deref().map(read_build).transpose()?,
                equipment: carry.map(|carry_capacity| EquipmentBonuses { carry_capacity }),
                caps,
                current_hp: hp,
                current_luck_points: luck,
            };
            let saved = vault.update_character(id, &patch).map_err(describe)?;
            report_saved(&saved);
            Ok(())
        }
        CharacterCommand::Edit { character, action } => {
            let action: BuildAction =
                serde_json::from_str(&action).map_err(|e| format!("invalid action: {e}"))?;
            edit(vault, &character, &action)
        }
        CharacterCommand::Level { character, level } => {
            edit(vault, &character, &BuildAction::SetLevel { level })
        }
        CharacterCommand::Origin { character, origin } => {
            edit(vault, &character, &BuildAction::SetOrigin { origin })
        }
        CharacterCommand::Attribute {
            character,
            attribute,
            value,
        } => {
            let attribute = parse_attribute(&attribute)?;
            edit(vault, &character, &BuildAction::SetAttribute { attribute, value })
        }
        CharacterCommand::Skill {
            character,
            skill,
            rank,
        } => {
            let skill = parse_skill(&skill)?;
            edit(vault, &character, &BuildAction::SetSkill { skill, rank })
        }
        CharacterCommand::Tag { character, skill } => {
            let skill = parse_skill(&skill)?;
            edit(vault, &character, &BuildAction::ToggleTagSkill { skill })
        }
        CharacterCommand::Perk { character, perk } => {
            edit(vault, &character, &BuildAction::TakePerk { perk_id: perk })
        }
        CharacterCommand::DropPerk { character, perk } => {
            edit(vault, &character, &BuildAction::RemovePerk { perk_id: perk })
        }
        CharacterCommand::Check { character } => {
            let character = vault.find_character(&character).map_err(describe)?;
            let report = vault.check_character(character.id).map_err(describe)?;
            if report.is_clean() {
                println!("  {} '{}' passes every build check", "✓".green(), character.name);
                return Ok(());
            }
            for issue in &report.issues {
                let label = if issue.is_error() {
                    "error:".red()
                } else {
                    "warning:".yellow()
                };
                println!("  {label} {} ({})", issue.message, issue.code);
            }
            if report.has_errors() {
                Err(format!("'{}' has build errors", character.name))
            } else {
                Ok(())
            }
        }
        CharacterCommand::Duplicate { character, name } => {
            let id = vault.find_character(&character).map_err(describe)?.id;
            let copy = vault.duplicate_character(id, name).map_err(describe)?;
            println!("  Created '{}' ({})", copy.name.bold(), copy.id);
            Ok(())
        }
        CharacterCommand::Delete { character } => {
            let id = vault.find_character(&character).map_err(describe)?.id;
            let removed = vault.delete_character(id).map_err(describe)?;
            println!("  Deleted '{}'", removed.name);
            Ok(())
        }
    }
}

fn edit(vault: &mut CliVault, character: &str, action: &BuildAction) -> Result<(), String> {
    let id = vault.find_character(character).map_err(describe)?.id;
    let saved = vault.apply_build_action(id, action).map_err(describe)?;
    report_saved(&saved);
    Ok(())
}

fn report_saved(saved: &Checked<Character>) {
    let c = &saved.record;
    println!(
        "  Updated '{}': HP {}/{}, defense {}, initiative {}",
        c.name.bold(),
        c.current_hp,
        c.stats.max_hp,
        c.stats.defense,
        c.stats.initiative
    );
    print_warnings(&saved.warnings);
}

fn read_build(path: &Path) -> Result<CharacterBuild, String> {
    let source =
        std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    serde_json::from_str(&source).map_err(|e| format!("{}: {e}", path.display()))
}

fn parse_attribute(s: &str) -> Result<Attribute, String> {
    Attribute::parse(s).ok_or_else(|| format!("unknown attribute: {s}"))
}

fn parse_skill(s: &str) -> Result<Skill, String> {
    Skill::parse(s).ok_or_else(|| format!("unknown skill: {s}"))
}

fn list(vault: &CliVault, kind: Option<CharacterKind>) -> Result<(), String> {
    let characters = vault.characters(kind).map_err(describe)?;
    if characters.is_empty() {
        println!("  No characters found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Name", "Kind", "Level", "Origin", "HP"]);
    for c in &characters {
        let origin = c
            .build
            .origin(vault.data())
            .map_or_else(|| "—".to_string(), |o| o.name.clone());
        table.add_row(vec![
            c.id.to_string(),
            c.name.clone(),
            c.kind.to_string(),
            c.build.level.to_string(),
            origin,
            format!("{}/{}", c.current_hp, c.stats.max_hp),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} characters", characters.len());
    Ok(())
}

fn abbreviation(attribute: Attribute) -> &'static str {
    match attribute {
        Attribute::Strength => "STR",
        Attribute::Perception => "PER",
        Attribute::Endurance => "END",
        Attribute::Charisma => "CHA",
        Attribute::Intelligence => "INT",
        Attribute::Agility => "AGI",
        Attribute::Luck => "LCK",
    }
}

fn show(c: &Character) {
    let stats = &c.stats;
    println!(
        "  {} [{}] level {}",
        c.name.bold(),
        c.kind.to_string().dimmed(),
        c.build.level
    );
    if let Some(origin) = &c.build.origin {
        println!("  origin:     {origin}");
    }
    if !c.build.survivor_traits.is_empty() {
        println!("  traits:     {}", c.build.survivor_traits.join(", "));
    }
    println!();

    let special: Vec<String> = stats
        .special
        .iter()
        .map(|(a, v)| format!("{} {v}", abbreviation(a)))
        .collect();
    println!("  {}", special.join("  "));
    println!();

    println!("  HP:         {}/{}", c.current_hp, stats.max_hp);
    println!("  Luck:       {}/{}", c.current_luck_points, stats.max_luck_points);
    println!("  Defense:    {}", stats.defense);
    println!("  Initiative: {}", stats.initiative);
    println!("  Melee dmg:  +{}", stats.melee_damage_bonus);
    println!("  Carry:      {} lbs", stats.carry_capacity);
    println!(
        "  DR:         phys {} / energy {} / rad {}",
        stats.dr.physical, stats.dr.energy, stats.dr.radiation
    );
    println!("  Caps:       {}", c.caps);

    let trained: Vec<String> = c
        .build
        .skills
        .iter()
        .filter(|(skill, rank)| *rank > 0 || c.build.tag_skills.contains(skill))
        .map(|(skill, rank)| {
            let mark = if c.build.tag_skills.contains(&skill) { "*" } else { "" };
            format!("{skill}{mark} {rank}")
        })
        .collect();
    if !trained.is_empty() {
        println!();
        println!("  {}", "Skills".bold());
        for line in trained {
            println!("    {line}");
        }
    }

    if !c.build.perks.is_empty() || c.build.pending_perk.is_some() {
        println!();
        println!("  {}", "Perks".bold());
        for perk in &c.build.perks {
            println!("    {} (rank {})", perk.perk_id, perk.rank);
        }
        if let Some(pending) = &c.build.pending_perk {
            println!("    {} (rank {}, {})", pending.perk_id, pending.rank, "pending".yellow());
        }
    }

    if !stats.active_effects.is_empty() {
        println!();
        println!("  {}", "Effects".bold());
        for effect in &stats.active_effects {
            println!("    {effect}");
        }
    }
}
