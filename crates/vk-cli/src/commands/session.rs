use clap::Subcommand;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use vk_combat::{CombatPhase, CombatStatus, SessionStatus};
use vk_core::{QuickNpc, SessionId, SessionPatch, SessionRecord};

use super::{CliVault, describe};

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Create a session
    Create {
        /// Session name
        name: String,
    },

    /// List sessions
    List,

    /// Show participants, turn order and AP pools
    Show {
        /// Name or id prefix
        session: String,
    },

    /// Rename a session
    Rename {
        /// Name or id prefix
        session: String,

        /// New name
        name: String,
    },

    /// Set the session status (planned, in_progress, completed)
    Status {
        /// Name or id prefix
        session: String,

        /// New status
        status: String,
    },

    /// Delete a session
    Delete {
        /// Name or id prefix
        session: String,
    },

    /// Add a stored character
    Join {
        /// Name or id prefix of the session
        session: String,

        /// Name or id prefix of the character
        character: String,
    },

    /// Add a quick NPC with no character sheet
    Npc {
        /// Name or id prefix of the session
        session: String,

        /// NPC name
        name: String,

        /// Maximum HP
        #[arg(long)]
        hp: i32,

        /// Defense
        #[arg(long, default_value = "1")]
        defense: u32,

        /// Initiative score
        #[arg(long, default_value = "0")]
        initiative: u32,

        /// Maximum AP
        #[arg(long)]
        ap: Option<u32>,
    },

    /// Remove a participant
    Remove {
        /// Name or id prefix of the session
        session: String,

        /// Name or id prefix of the participant
        participant: String,
    },

    /// Record an initiative result
    Initiative {
        /// Name or id prefix of the session
        session: String,

        /// Name or id prefix of the participant
        participant: String,

        /// Initiative result
        #[arg(allow_hyphen_values = true)]
        value: i32,
    },

    /// Change a participant's status (active, unconscious, dead, fled)
    Mark {
        /// Name or id prefix of the session
        session: String,

        /// Name or id prefix of the participant
        participant: String,

        /// New status
        status: String,
    },

    /// Sort by initiative and begin round 1
    Start {
        /// Name or id prefix
        session: String,
    },

    /// Advance to the next combatant
    Next {
        /// Name or id prefix
        session: String,
    },

    /// Step back to the previous combatant
    Prev {
        /// Name or id prefix
        session: String,
    },

    /// End the combat
    End {
        /// Name or id prefix
        session: String,
    },

    /// Set the group AP pool
    GroupAp {
        /// Name or id prefix
        session: String,

        /// Current value
        #[arg(long)]
        value: Option<u32>,

        /// Maximum
        #[arg(long)]
        max: Option<u32>,
    },

    /// Set the GM AP pool
    GmAp {
        /// Name or id prefix
        session: String,

        /// New value
        value: u32,
    },

    /// Damage a participant
    Damage {
        /// Name or id prefix of the session
        session: String,

        /// Name or id prefix of the participant
        participant: String,

        /// HP lost
        amount: u32,
    },

    /// Heal a participant
    Heal {
        /// Name or id prefix of the session
        session: String,

        /// Name or id prefix of the participant
        participant: String,

        /// HP restored
        amount: u32,
    },

    /// Spend a participant's AP
    SpendAp {
        /// Name or id prefix of the session
        session: String,

        /// Name or id prefix of the participant
        participant: String,

        /// AP spent
        amount: u32,
    },

    /// Give a participant AP, up to its maximum
    GainAp {
        /// Name or id prefix of the session
        session: String,

        /// Name or id prefix of the participant
        participant: String,

        /// AP gained
        amount: u32,
    },

    /// Print the combat log
    Log {
        /// Name or id prefix
        session: String,
    },
}

pub fn run(vault: &mut CliVault, command: SessionCommand) -> Result<(), String> {
    match command {
        SessionCommand::Create { name } => {
            let record = vault.create_session(name).map_err(describe)?;
            println!("  Created session '{}' ({})", record.session.name.bold(), record.id);
            Ok(())
        }
        SessionCommand::List => list(vault),
        SessionCommand::Show { session } => {
            let record = vault.find_session(&session).map_err(describe)?;
            show(&record);
            Ok(())
        }
        SessionCommand::Rename { session, name } => {
            let id = find(vault, &session)?;
            let patch = SessionPatch {
                name: Some(name),
                ..SessionPatch::default()
            };
            let record = vault.update_session(id, &patch).map_err(describe)?;
            println!("  Renamed to '{}'", record.session.name);
            Ok(())
        }
        SessionCommand::Status { session, status } => {
            let id = find(vault, &session)?;
            let status: SessionStatus = status.parse()?;
            let patch = SessionPatch {
                status: Some(status),
                ..SessionPatch::default()
            };
            vault.update_session(id, &patch).map_err(describe)?;
            println!("  Status set to {status}");
            Ok(())
        }
        SessionCommand::Delete { session } => {
            let id = find(vault, &session)?;
            let removed = vault.delete_session(id).map_err(describe)?;
            println!("  Deleted session '{}'", removed.session.name);
            Ok(())
        }
        SessionCommand::Join { session, character } => {
            let id = find(vault, &session)?;
            let character = vault.find_character(&character).map_err(describe)?;
            vault.add_participant(id, character.id).map_err(describe)?;
            println!("  {} joins", character.name.bold());
            Ok(())
        }
        SessionCommand::Npc {
            session,
            name,
            hp,
            defense,
            initiative,
            ap,
        } => {
            let id = find(vault, &session)?;
            let npc = QuickNpc {
                name: name.clone(),
                max_hp: hp,
                defense,
                initiative,
                max_ap: ap,
            };
            vault.add_quick_npc(id, npc).map_err(describe)?;
            println!("  {} joins", name.bold());
            Ok(())
        }
        SessionCommand::Remove {
            session,
            participant,
        } => {
            let (id, pid) = find_participant(vault, &session, &participant)?;
            vault.remove_participant(id, pid).map_err(describe)?;
            println!("  Removed {participant}");
            Ok(())
        }
        SessionCommand::Initiative {
            session,
            participant,
            value,
        } => {
            let (id, pid) = find_participant(vault, &session, &participant)?;
            vault.set_initiative(id, pid, value).map_err(describe)?;
            println!("  Initiative {value} recorded");
            Ok(())
        }
        SessionCommand::Mark {
            session,
            participant,
            status,
        } => {
            let (id, pid) = find_participant(vault, &session, &participant)?;
            let status: CombatStatus = status.parse()?;
            let record = vault.set_combat_status(id, pid, status).map_err(describe)?;
            print_last_log(&record);
            Ok(())
        }
        SessionCommand::Start { session } => {
            let id = find(vault, &session)?;
            let record = vault.start_combat(id).map_err(describe)?;
            show(&record);
            Ok(())
        }
        SessionCommand::Next { session } => {
            let id = find(vault, &session)?;
            let record = vault.next_turn(id).map_err(describe)?;
            print_turn(&record);
            Ok(())
        }
        SessionCommand::Prev { session } => {
            let id = find(vault, &session)?;
            let record = vault.prev_turn(id).map_err(describe)?;
            print_turn(&record);
            Ok(())
        }
        SessionCommand::End { session } => {
            let id = find(vault, &session)?;
            let record = vault.end_combat(id).map_err(describe)?;
            println!("  Combat ended after {} round(s)", record.session.round());
            Ok(())
        }
        SessionCommand::GroupAp {
            session,
            value,
            max,
        } => {
            let id = find(vault, &session)?;
            let record = vault.update_group_ap(id, value, max).map_err(describe)?;
            println!("  Group AP: {}", record.session.group_ap());
            Ok(())
        }
        SessionCommand::GmAp { session, value } => {
            let id = find(vault, &session)?;
            let record = vault.update_gm_ap(id, value).map_err(describe)?;
            println!("  GM AP: {}", record.session.gm_ap());
            Ok(())
        }
        SessionCommand::Damage {
            session,
            participant,
            amount,
        } => {
            let (id, pid) = find_participant(vault, &session, &participant)?;
            let record = vault.apply_damage(id, pid, amount).map_err(describe)?;
            print_last_log(&record);
            Ok(())
        }
        SessionCommand::Heal {
            session,
            participant,
            amount,
        } => {
            let (id, pid) = find_participant(vault, &session, &participant)?;
            let record = vault.heal(id, pid, amount).map_err(describe)?;
            print_last_log(&record);
            Ok(())
        }
        SessionCommand::SpendAp {
            session,
            participant,
            amount,
        } => {
            let (id, pid) = find_participant(vault, &session, &participant)?;
            let record = vault.spend_participant_ap(id, pid, amount).map_err(describe)?;
            print_last_log(&record);
            Ok(())
        }
        SessionCommand::GainAp {
            session,
            participant,
            amount,
        } => {
            let (id, pid) = find_participant(vault, &session, &participant)?;
            let record = vault.gain_participant_ap(id, pid, amount).map_err(describe)?;
            print_last_log(&record);
            Ok(())
        }
        SessionCommand::Log { session } => {
            let record = vault.find_session(&session).map_err(describe)?;
            if record.session.log().is_empty() {
                println!("  Nothing has happened yet.");
            }
            for entry in record.session.log() {
                println!("  {} {}", format!("[round {}]", entry.round).dimmed(), entry.message);
            }
            Ok(())
        }
    }
}

fn find(vault: &CliVault, session: &str) -> Result<SessionId, String> {
    Ok(vault.find_session(session).map_err(describe)?.id)
}

fn find_participant(
    vault: &CliVault,
    session: &str,
    participant: &str,
) -> Result<(SessionId, vk_combat::ParticipantId), String> {
    let id = find(vault, session)?;
    let pid = vault.find_participant(id, participant).map_err(describe)?;
    Ok((id, pid))
}

fn list(vault: &CliVault) -> Result<(), String> {
    let sessions = vault.sessions().map_err(describe)?;
    if sessions.is_empty() {
        println!("  No sessions found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Name", "Status", "Combat", "Round", "Participants"]);
    for record in &sessions {
        let s = &record.session;
        table.add_row(vec![
            record.id.to_string(),
            s.name.clone(),
            s.status.to_string(),
            s.phase().to_string(),
            s.round().to_string(),
            s.participants().len().to_string(),
        ]);
    }
    println!("{table}");
    println!();
    println!("  {} sessions", sessions.len());
    Ok(())
}

fn show(record: &SessionRecord) {
    let s = &record.session;
    println!("  {} [{}]", s.name.bold(), s.status.to_string().dimmed());
    match s.phase() {
        CombatPhase::Active => println!("  Round {} | combat {}", s.round(), s.phase()),
        phase => println!("  combat {phase}"),
    }
    println!("  Group AP: {} | GM AP: {}", s.group_ap(), s.gm_ap());
    println!();

    if s.participants().is_empty() {
        println!("  No participants.");
        return;
    }

    let current = s.current_participant().map(|p| p.id);
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["", "Name", "Init", "HP", "AP", "Def", "Status"]);
    for p in s.ordered_participants() {
        let marker = if Some(p.id) == current { "▶" } else { "" };
        let name = if p.is_quick_npc() {
            format!("{} (npc)", p.name)
        } else {
            p.name.clone()
        };
        table.add_row(vec![
            marker.to_string(),
            name,
            p.turn_order.map_or_else(|| "—".to_string(), |t| t.to_string()),
            format!("{}/{}", p.current_hp, p.max_hp),
            format!("{}/{}", p.current_ap, p.max_ap),
            p.defense.to_string(),
            p.status.to_string(),
        ]);
    }
    println!("{table}");
}

fn print_turn(record: &SessionRecord) {
    let s = &record.session;
    match s.current_participant() {
        Some(p) => println!("  Round {}: {}'s turn ({} AP)", s.round(), p.name.bold(), p.current_ap),
        None => println!("  Round {}", s.round()),
    }
}

fn print_last_log(record: &SessionRecord) {
    if let Some(entry) = record.session.log().last() {
        println!("  {}", entry.message);
    }
}
