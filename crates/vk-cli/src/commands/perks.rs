use clap::Subcommand;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use vk_rules::{Attribute, PerkChoice, PerkContext, PerkDefinition, SkillRanks, Special};

use super::{CliVault, describe};

#[derive(Subcommand)]
pub enum PerksCommand {
    /// List every perk
    List,

    /// Show one perk
    Show {
        /// Perk id
        perk: String,
    },

    /// Perks a character (or a bare level and SPECIAL) may take next
    Available {
        /// Name or id prefix of a stored character
        character: Option<String>,

        /// Level, when no character is given
        #[arg(long, default_value = "1")]
        level: u32,

        /// Seven comma-separated SPECIAL values, when no character is given
        #[arg(long)]
        special: Option<String>,

        /// Treat the build as a robot
        #[arg(long)]
        robot: bool,
    },
}

pub fn run(vault: &CliVault, command: PerksCommand) -> Result<(), String> {
    match command {
        PerksCommand::List => {
            print_perks(vault.perks().iter().map(|p| (p, None)));
            Ok(())
        }
        PerksCommand::Show { perk } => {
            let perk = vault.perk(&perk).map_err(describe)?;
            show(perk);
            Ok(())
        }
        PerksCommand::Available {
            character,
            level,
            special,
            robot,
        } => {
            let choices = match character {
                Some(query) => {
                    let id = vault.find_character(&query).map_err(describe)?.id;
                    vault.character_available_perks(id).map_err(describe)?
                }
                None => {
                    let special = match special {
                        Some(s) => parse_special(&s)?,
                        None => Special::default(),
                    };
                    let skills = SkillRanks::new();
                    let ctx = PerkContext {
                        level,
                        special: &special,
                        skills: &skills,
                        owned: &[],
                        is_robot: robot,
                    };
                    vault.available_perks(&ctx)
                }
            };
            if choices.is_empty() {
                println!("  No perks available.");
                return Ok(());
            }
            print_choices(&choices);
            Ok(())
        }
    }
}

fn parse_special(s: &str) -> Result<Special, String> {
    let values: Vec<u32> = s
        .split(',')
        .map(|v| v.trim().parse::<u32>().map_err(|e| format!("bad SPECIAL value '{v}': {e}")))
        .collect::<Result<_, _>>()?;
    if values.len() != Attribute::ALL.len() {
        return Err(format!(
            "expected {} SPECIAL values, got {}",
            Attribute::ALL.len(),
            values.len()
        ));
    }
    let mut special = Special::default();
    for (attribute, value) in Attribute::ALL.into_iter().zip(values) {
        special.set(attribute, value);
    }
    Ok(special)
}

fn print_choices(choices: &[PerkChoice]) {
    print_perks(choices.iter().map(|c| (&c.perk, Some(c.rank))));
}

fn print_perks<'a>(perks: impl Iterator<Item = (&'a PerkDefinition, Option<u32>)>) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Name", "Ranks", "Level", "Description"]);
    let mut count = 0;
    for (perk, rank) in perks {
        let ranks = match rank {
            Some(rank) => format!("{rank}/{}", perk.max_rank),
            None => perk.max_rank.to_string(),
        };
        let level = perk.required_level(rank.unwrap_or(1));
        table.add_row(vec![
            perk.id.clone(),
            perk.name.clone(),
            ranks,
            level.to_string(),
            perk.description.clone(),
        ]);
        count += 1;
    }
    println!("{table}");
    println!();
    println!("  {count} perks");
}

fn show(perk: &PerkDefinition) {
    println!("  {} ({})", perk.name.bold(), perk.id.dimmed());
    if !perk.description.is_empty() {
        println!("  {}", perk.description);
    }
    println!();
    println!("  ranks:      {}", perk.max_rank);
    println!("  level:      {}", perk.required_level(1));
    let req = &perk.requirements;
    if let Some(step) = req.level_increase_per_rank {
        println!("  per rank:   +{step} level");
    }
    for (attribute, min) in &req.special {
        println!("  needs:      {attribute} {min}");
    }
    for (skill, min) in &req.skills {
        println!("  needs:      {skill} {min}");
    }
    for id in &req.perks {
        println!("  needs perk: {id}");
    }
    for id in &req.excluded_perks {
        println!("  excludes:   {id}");
    }
    if req.not_for_robots {
        println!("  {}", "not usable by robots".yellow());
    }
}
