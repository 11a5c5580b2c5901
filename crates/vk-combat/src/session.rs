//! Combat session state machine.
//!
//! Phases run `preparation → active → ended`. Initiative is collected during
//! preparation, fixed into `combatant_ids` when combat starts, and cleared
//! when it ends. Turns advance by index; incapacitated combatants keep their
//! slot and are not skipped.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::CombatConfig;
use crate::error::{CombatError, CombatResult};
use crate::participant::{CombatStatus, Participant, ParticipantId};
use crate::pool::{GmApPool, GroupApPool};

/// Where the session is in its combat lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatPhase {
    /// Gathering participants and initiative.
    #[default]
    Preparation,
    /// Turns are running.
    Active,
    /// Combat is over. Terminal.
    Ended,
}

impl fmt::Display for CombatPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preparation => write!(f, "preparation"),
            Self::Active => write!(f, "active"),
            Self::Ended => write!(f, "ended"),
        }
    }
}

/// Host-facing session status, independent of the combat phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Not started yet.
    #[default]
    Planned,
    /// Being played.
    InProgress,
    /// Finished.
    Completed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Planned => write!(f, "planned"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "planned" => Ok(Self::Planned),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown session status: {other}")),
        }
    }
}

/// A recorded combat event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatLogEntry {
    /// Round the event happened in (0 before combat starts).
    pub round: u32,
    /// What happened.
    pub message: String,
}

/// A single transition of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SessionAction {
    /// Rename the session.
    Rename {
        /// New name.
        name: String,
    },
    /// Change the host-facing status.
    SetStatus {
        /// New status.
        status: SessionStatus,
    },
    /// Add a participant.
    AddParticipant {
        /// The participant.
        participant: Participant,
    },
    /// Remove a participant.
    RemoveParticipant {
        /// Participant id.
        id: ParticipantId,
    },
    /// Record an initiative result.
    SetInitiative {
        /// Participant id.
        id: ParticipantId,
        /// Initiative result.
        value: i32,
    },
    /// Explicitly change a participant's status.
    SetCombatStatus {
        /// Participant id.
        id: ParticipantId,
        /// New status.
        status: CombatStatus,
    },
    /// Sort by initiative and begin round 1.
    StartCombat,
    /// Advance to the next combatant.
    NextTurn,
    /// Step back to the previous combatant.
    PrevTurn,
    /// End the combat.
    EndCombat,
    /// Set the group pool value and/or maximum.
    UpdateGroupAp {
        /// New current value.
        group_ap: Option<u32>,
        /// New maximum.
        max_group_ap: Option<u32>,
    },
    /// Spend group AP.
    SpendGroupAp {
        /// Amount.
        amount: u32,
    },
    /// Gain group AP.
    GainGroupAp {
        /// Amount.
        amount: u32,
    },
    /// Set the GM pool value.
    UpdateGmAp {
        /// New value.
        value: u32,
    },
    /// Spend GM AP.
    SpendGmAp {
        /// Amount.
        amount: u32,
    },
    /// Gain GM AP.
    GainGmAp {
        /// Amount.
        amount: u32,
    },
    /// Damage a participant.
    ApplyDamage {
        /// Participant id.
        id: ParticipantId,
        /// HP lost.
        amount: u32,
    },
    /// Heal a participant.
    Heal {
        /// Participant id.
        id: ParticipantId,
        /// HP restored.
        amount: u32,
    },
    /// Spend a participant's own AP.
    SpendParticipantAp {
        /// Participant id.
        id: ParticipantId,
        /// Amount.
        amount: u32,
    },
    /// Give a participant AP, up to its maximum.
    GainParticipantAp {
        /// Participant id.
        id: ParticipantId,
        /// Amount.
        amount: u32,
    },
}

impl fmt::Display for SessionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rename { name } => write!(f, "rename to {name}"),
            Self::SetStatus { status } => write!(f, "set status {status}"),
            Self::AddParticipant { participant } => write!(f, "add {}", participant.name),
            Self::RemoveParticipant { id } => write!(f, "remove {id}"),
            Self::SetInitiative { id, value } => write!(f, "set initiative of {id} to {value}"),
            Self::SetCombatStatus { id, status } => write!(f, "mark {id} {status}"),
            Self::StartCombat => write!(f, "start combat"),
            Self::NextTurn => write!(f, "next turn"),
            Self::PrevTurn => write!(f, "previous turn"),
            Self::EndCombat => write!(f, "end combat"),
            Self::UpdateGroupAp {
                group_ap,
                max_group_ap,
            } => write!(f, "update group AP ({group_ap:?}/{max_group_ap:?})"),
            Self::SpendGroupAp { amount } => write!(f, "spend {amount} group AP"),
            Self::GainGroupAp { amount } => write!(f, "gain {amount} group AP"),
            Self::UpdateGmAp { value } => write!(f, "set GM AP to {value}"),
            Self::SpendGmAp { amount } => write!(f, "spend {amount} GM AP"),
            Self::GainGmAp { amount } => write!(f, "gain {amount} GM AP"),
            Self::ApplyDamage { id, amount } => write!(f, "deal {amount} damage to {id}"),
            Self::Heal { id, amount } => write!(f, "heal {id} by {amount}"),
            Self::SpendParticipantAp { id, amount } => write!(f, "{id} spends {amount} AP"),
            Self::GainParticipantAp { id, amount } => write!(f, "{id} gains {amount} AP"),
        }
    }
}

/// The state of a combat session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Display name.
    pub name: String,
    /// Host-facing status.
    pub status: SessionStatus,
    phase: CombatPhase,
    round: u32,
    turn_index: usize,
    combatant_ids: Vec<ParticipantId>,
    participants: Vec<Participant>,
    group_ap: GroupApPool,
    gm_ap: GmApPool,
    log: Vec<CombatLogEntry>,
}

impl Session {
    /// A planned session with no participants.
    pub fn new(name: impl Into<String>, config: &CombatConfig) -> Self {
        Self {
            name: name.into(),
            status: SessionStatus::Planned,
            phase: CombatPhase::Preparation,
            round: 0,
            turn_index: 0,
            combatant_ids: Vec::new(),
            participants: Vec::new(),
            group_ap: GroupApPool::empty(config.max_group_ap),
            gm_ap: GmApPool::new(config.starting_gm_ap),
            log: Vec::new(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> CombatPhase {
        self.phase
    }

    /// Returns true while turns are running.
    pub fn combat_active(&self) -> bool {
        self.phase == CombatPhase::Active
    }

    /// Current round; 0 before combat starts.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Index into [`Self::combatant_ids`] of whoever's turn it is.
    pub fn turn_index(&self) -> usize {
        self.turn_index
    }

    /// Turn order while combat is active, empty otherwise.
    pub fn combatant_ids(&self) -> &[ParticipantId] {
        &self.combatant_ids
    }

    /// Participants in the order they joined.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Participants in turn order while combat is active, otherwise in
    /// join order.
    pub fn ordered_participants(&self) -> Vec<&Participant> {
        if self.combatant_ids.is_empty() {
            return self.participants.iter().collect();
        }
        self.combatant_ids
            .iter()
            .filter_map(|id| self.participant(*id))
            .collect()
    }

    /// Group AP pool.
    pub fn group_ap(&self) -> &GroupApPool {
        &self.group_ap
    }

    /// GM AP pool.
    pub fn gm_ap(&self) -> &GmApPool {
        &self.gm_ap
    }

    /// Combat log, oldest first.
    pub fn log(&self) -> &[CombatLogEntry] {
        &self.log
    }

    /// Look up a participant.
    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    fn participant_mut(&mut self, id: ParticipantId) -> CombatResult<&mut Participant> {
        self.participants
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(CombatError::ParticipantNotFound(id))
    }

    /// The participant whose turn it is.
    pub fn current_participant(&self) -> Option<&Participant> {
        if !self.combat_active() {
            return None;
        }
        let id = self.combatant_ids.get(self.turn_index)?;
        self.participant(*id)
    }

    fn record(&mut self, message: String) {
        tracing::debug!(round = self.round, index = self.turn_index, %message, "combat event");
        self.log.push(CombatLogEntry {
            round: self.round,
            message,
        });
    }

    /// Add a participant. Joining mid-combat appends to the turn order.
    pub fn add_participant(&mut self, participant: Participant) -> CombatResult<()> {
        if self.phase == CombatPhase::Ended {
            return Err(CombatError::CombatEnded);
        }
        if self.participant(participant.id).is_some() {
            return Err(CombatError::DuplicateParticipant(participant.id));
        }
        if self.combat_active() {
            self.combatant_ids.push(participant.id);
        }
        let message = format!("{} joins", participant.name);
        self.participants.push(participant);
        self.record(message);
        Ok(())
    }

    /// Remove a participant, keeping the current turn on the same combatant
    /// where possible.
    pub fn remove_participant(&mut self, id: ParticipantId) -> CombatResult<Participant> {
        let index = self
            .participants
            .iter()
            .position(|p| p.id == id)
            .ok_or(CombatError::ParticipantNotFound(id))?;
        let removed = self.participants.remove(index);

        if let Some(slot) = self.combatant_ids.iter().position(|c| *c == id) {
            self.combatant_ids.remove(slot);
            if slot < self.turn_index {
                self.turn_index -= 1;
            }
            if self.turn_index >= self.combatant_ids.len() {
                self.turn_index = 0;
            }
        }
        self.record(format!("{} leaves", removed.name));
        Ok(removed)
    }

    /// Record an initiative result. Preparation only; the order is fixed
    /// when combat starts.
    pub fn set_initiative(&mut self, id: ParticipantId, value: i32) -> CombatResult<()> {
        if self.phase != CombatPhase::Preparation {
            return Err(CombatError::NotInPreparation(self.phase));
        }
        self.participant_mut(id)?.turn_order = Some(value);
        Ok(())
    }

    /// Explicitly change a participant's status. Allowed in any phase.
    /// Repeating the current status is a no-op.
    pub fn set_combat_status(&mut self, id: ParticipantId, status: CombatStatus) -> CombatResult<()> {
        let participant = self.participant_mut(id)?;
        if participant.set_status(status)? {
            let message = format!("{} is {status}", participant.name);
            self.record(message);
        }
        Ok(())
    }

    /// Sort participants by descending initiative and begin round 1.
    ///
    /// Ties keep join order; participants without initiative go last.
    pub fn start_combat(&mut self) -> CombatResult<()> {
        if self.phase != CombatPhase::Preparation {
            return Err(CombatError::NotInPreparation(self.phase));
        }
        if self.participants.is_empty() {
            return Err(CombatError::NoParticipants);
        }

        let mut order: Vec<&Participant> = self.participants.iter().collect();
        order.sort_by_key(|p| std::cmp::Reverse(p.turn_order.map_or(i64::MIN, i64::from)));
        self.combatant_ids = order.into_iter().map(|p| p.id).collect();

        for participant in &mut self.participants {
            participant.reset_ap();
        }
        self.phase = CombatPhase::Active;
        self.round = 1;
        self.turn_index = 0;
        if self.status == SessionStatus::Planned {
            self.status = SessionStatus::InProgress;
        }
        tracing::info!(combatants = self.combatant_ids.len(), "combat started");
        self.record("combat starts".to_string());
        Ok(())
    }

    /// Advance to the next combatant, starting a new round after the last.
    /// Only the new current combatant's AP is refilled.
    pub fn next_turn(&mut self) -> CombatResult<()> {
        self.require_turns()?;
        self.turn_index += 1;
        if self.turn_index >= self.combatant_ids.len() {
            self.turn_index = 0;
            self.round += 1;
            let message = format!("round {} begins", self.round);
            self.record(message);
        }
        self.begin_turn()
    }

    /// Step back to the previous combatant. At the first turn of round 1
    /// this does nothing.
    pub fn prev_turn(&mut self) -> CombatResult<()> {
        self.require_turns()?;
        if self.turn_index == 0 {
            if self.round <= 1 {
                return Ok(());
            }
            self.round -= 1;
            self.turn_index = self.combatant_ids.len() - 1;
        } else {
            self.turn_index -= 1;
        }
        self.begin_turn()
    }

    fn require_turns(&self) -> CombatResult<()> {
        if !self.combat_active() {
            return Err(CombatError::NotActive(self.phase));
        }
        if self.combatant_ids.is_empty() {
            return Err(CombatError::NoParticipants);
        }
        Ok(())
    }

    fn begin_turn(&mut self) -> CombatResult<()> {
        let id = self.combatant_ids[self.turn_index];
        let participant = self.participant_mut(id)?;
        participant.reset_ap();
        let message = format!("{}'s turn", participant.name);
        self.record(message);
        Ok(())
    }

    /// End the combat and clear the turn order.
    pub fn end_combat(&mut self) -> CombatResult<()> {
        if !self.combat_active() {
            return Err(CombatError::NotActive(self.phase));
        }
        self.phase = CombatPhase::Ended;
        self.combatant_ids.clear();
        self.turn_index = 0;
        tracing::info!(rounds = self.round, "combat ended");
        self.record("combat ends".to_string());
        Ok(())
    }

    /// Set the group pool value and/or maximum. The maximum is applied
    /// first, then the value is clamped to it.
    pub fn update_group_ap(&mut self, group_ap: Option<u32>, max_group_ap: Option<u32>) {
        if let Some(max) = max_group_ap {
            self.group_ap.set_max(max);
        }
        if let Some(value) = group_ap {
            self.group_ap.set_current(value);
        }
    }

    /// Spend group AP, clamped at 0.
    pub fn spend_group_ap(&mut self, amount: u32) -> u32 {
        let left = self.group_ap.spend(amount);
        self.record(format!("group spends {amount} AP ({left} left)"));
        left
    }

    /// Gain group AP, clamped at the maximum.
    pub fn gain_group_ap(&mut self, amount: u32) -> u32 {
        let now = self.group_ap.gain(amount);
        self.record(format!("group gains {amount} AP ({now} now)"));
        now
    }

    /// Set the GM pool value.
    pub fn update_gm_ap(&mut self, value: u32) {
        self.gm_ap.set(value);
    }

    /// Spend GM AP, clamped at 0.
    pub fn spend_gm_ap(&mut self, amount: u32) -> u32 {
        let left = self.gm_ap.spend(amount);
        self.record(format!("GM spends {amount} AP ({left} left)"));
        left
    }

    /// Gain GM AP.
    pub fn gain_gm_ap(&mut self, amount: u32) -> u32 {
        let now = self.gm_ap.gain(amount);
        self.record(format!("GM gains {amount} AP ({now} now)"));
        now
    }

    /// Damage a participant; an active one at 0 HP falls unconscious.
    pub fn apply_damage(&mut self, id: ParticipantId, amount: u32) -> CombatResult<()> {
        let participant = self.participant_mut(id)?;
        let changed = participant.apply_damage(amount);
        let mut message = format!(
            "{} takes {amount} damage ({} HP)",
            participant.name, participant.current_hp
        );
        if let Some(status) = changed {
            message.push_str(&format!(" and is {status}"));
        }
        self.record(message);
        Ok(())
    }

    /// Heal a participant; an unconscious one above 0 HP wakes up.
    pub fn heal(&mut self, id: ParticipantId, amount: u32) -> CombatResult<()> {
        let participant = self.participant_mut(id)?;
        let changed = participant.heal(amount)?;
        let mut message = format!(
            "{} heals {amount} ({} HP)",
            participant.name, participant.current_hp
        );
        if let Some(status) = changed {
            message.push_str(&format!(" and is {status}"));
        }
        self.record(message);
        Ok(())
    }

    /// Spend a participant's own AP. Combat must be active.
    pub fn spend_participant_ap(&mut self, id: ParticipantId, amount: u32) -> CombatResult<u32> {
        if !self.combat_active() {
            return Err(CombatError::NotActive(self.phase));
        }
        let participant = self.participant_mut(id)?;
        let left = participant.spend_ap(amount)?;
        let message = format!("{} spends {amount} AP ({left} left)", participant.name);
        self.record(message);
        Ok(left)
    }

    /// Give a participant AP, clamped at its maximum.
    pub fn gain_participant_ap(&mut self, id: ParticipantId, amount: u32) -> CombatResult<u32> {
        let participant = self.participant_mut(id)?;
        let now = participant.gain_ap(amount);
        let message = format!("{} gains {amount} AP ({now} now)", participant.name);
        self.record(message);
        Ok(now)
    }

    /// Apply an action to a copy of the session.
    ///
    /// The input is never modified, so replaying the same action against
    /// the same snapshot always yields the same result.
    pub fn apply(&self, action: SessionAction) -> CombatResult<Session> {
        let mut next = self.clone();
        match action {
            SessionAction::Rename { name } => next.name = name,
            SessionAction::SetStatus { status } => next.status = status,
            SessionAction::AddParticipant { participant } => next.add_participant(participant)?,
            SessionAction::RemoveParticipant { id } => {
                next.remove_participant(id)?;
            }
            SessionAction::SetInitiative { id, value } => next.set_initiative(id, value)?,
            SessionAction::SetCombatStatus { id, status } => next.set_combat_status(id, status)?,
            SessionAction::StartCombat => next.start_combat()?,
            SessionAction::NextTurn => next.next_turn()?,
            SessionAction::PrevTurn => next.prev_turn()?,
            SessionAction::EndCombat => next.end_combat()?,
            SessionAction::UpdateGroupAp {
                group_ap,
                max_group_ap,
            } => next.update_group_ap(group_ap, max_group_ap),
            SessionAction::SpendGroupAp { amount } => {
                next.spend_group_ap(amount);
            }
            SessionAction::GainGroupAp { amount } => {
                next.gain_group_ap(amount);
            }
            SessionAction::UpdateGmAp { value } => next.update_gm_ap(value),
            SessionAction::SpendGmAp { amount } => {
                next.spend_gm_ap(amount);
            }
            SessionAction::GainGmAp { amount } => {
                next.gain_gm_ap(amount);
            }
            SessionAction::ApplyDamage { id, amount } => next.apply_damage(id, amount)?,
            SessionAction::Heal { id, amount } => next.heal(id, amount)?,
            SessionAction::SpendParticipantAp { id, amount } => {
                next.spend_participant_ap(id, amount)?;
            }
            SessionAction::GainParticipantAp { id, amount } => {
                next.gain_participant_ap(id, amount)?;
            }
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(initiatives: &[(&str, Option<i32>)]) -> (Session, Vec<ParticipantId>) {
        let mut session = Session::new("Ambush", &CombatConfig::default());
        let mut ids = Vec::new();
        for (name, init) in initiatives {
            let p = Participant::new(*name, 10, 4);
            ids.push(p.id);
            session.add_participant(p).unwrap();
            if let Some(v) = init {
                session.set_initiative(*ids.last().unwrap(), *v).unwrap();
            }
        }
        (session, ids)
    }

    fn current_name(session: &Session) -> &str {
        &session.current_participant().unwrap().name
    }

    #[test]
    fn start_sorts_by_descending_initiative() {
        let (mut session, _) =
            session_with(&[("Alice", Some(15)), ("Bob", Some(10)), ("Charlie", Some(20))]);
        session.start_combat().unwrap();
        assert_eq!(session.phase(), CombatPhase::Active);
        assert_eq!(session.round(), 1);
        assert_eq!(session.turn_index(), 0);
        assert_eq!(current_name(&session), "Charlie");
        let names: Vec<&str> = session
            .ordered_participants()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Charlie", "Alice", "Bob"]);
        assert_eq!(session.status, SessionStatus::InProgress);
    }

    #[test]
    fn ties_keep_join_order_and_unset_goes_last() {
        let (mut session, _) = session_with(&[
            ("Unrolled", None),
            ("First", Some(12)),
            ("Second", Some(12)),
            ("Negative", Some(-1)),
        ]);
        session.start_combat().unwrap();
        let names: Vec<&str> = session
            .ordered_participants()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["First", "Second", "Negative", "Unrolled"]);
    }

    #[test]
    fn three_turns_wrap_to_round_two_and_back() {
        let (mut session, _) = session_with(&[("A", Some(3)), ("B", Some(2)), ("C", Some(1))]);
        session.start_combat().unwrap();
        assert_eq!((session.turn_index(), session.round()), (0, 1));

        for _ in 0..3 {
            session.next_turn().unwrap();
        }
        assert_eq!((session.turn_index(), session.round()), (0, 2));

        session.prev_turn().unwrap();
        assert_eq!((session.turn_index(), session.round()), (2, 1));
    }

    #[test]
    fn prev_turn_at_start_is_a_no_op() {
        let (mut session, _) = session_with(&[("A", Some(3)), ("B", Some(2))]);
        session.start_combat().unwrap();
        let before = session.clone();
        session.prev_turn().unwrap();
        assert_eq!(session, before);
    }

    #[test]
    fn next_turn_refills_only_the_new_combatant() {
        let (mut session, ids) = session_with(&[("A", Some(3)), ("B", Some(2))]);
        session.start_combat().unwrap();
        session.spend_participant_ap(ids[0], 3).unwrap();
        session.next_turn().unwrap();
        assert_eq!(session.participant(ids[0]).unwrap().current_ap, 1);
        assert_eq!(session.participant(ids[1]).unwrap().current_ap, 4);
        session.spend_participant_ap(ids[1], 4).unwrap();
        session.next_turn().unwrap();
        assert_eq!(session.participant(ids[0]).unwrap().current_ap, 4);
        assert_eq!(session.participant(ids[1]).unwrap().current_ap, 0);
    }

    #[test]
    fn participant_ap_gain_clamps() {
        let (mut session, ids) = session_with(&[("A", Some(3))]);
        session.start_combat().unwrap();
        session.spend_participant_ap(ids[0], 4).unwrap();
        assert_eq!(session.gain_participant_ap(ids[0], 2).unwrap(), 2);
        assert_eq!(session.gain_participant_ap(ids[0], 9).unwrap(), 4);
    }

    #[test]
    fn start_resets_every_ap() {
        let (mut session, ids) = session_with(&[("A", Some(3)), ("B", Some(2))]);
        let mut tired = session.participant(ids[1]).unwrap().clone();
        tired.current_ap = 0;
        session.remove_participant(ids[1]).unwrap();
        session.add_participant(tired).unwrap();
        session.start_combat().unwrap();
        assert!(session.participants().iter().all(|p| p.current_ap == p.max_ap));
    }

    #[test]
    fn turn_transitions_need_active_combat() {
        let (mut session, ids) = session_with(&[("A", Some(3))]);
        assert_eq!(session.next_turn().unwrap_err().code(), "combat_not_active");
        assert_eq!(session.prev_turn().unwrap_err().code(), "combat_not_active");
        assert_eq!(session.end_combat().unwrap_err().code(), "combat_not_active");

        session.start_combat().unwrap();
        assert_eq!(session.start_combat().unwrap_err().code(), "not_in_preparation");
        assert_eq!(
            session.set_initiative(ids[0], 5).unwrap_err(),
            CombatError::NotInPreparation(CombatPhase::Active)
        );
    }

    #[test]
    fn empty_session_cannot_start() {
        let mut session = Session::new("Empty", &CombatConfig::default());
        assert_eq!(session.start_combat().unwrap_err(), CombatError::NoParticipants);
    }

    #[test]
    fn end_clears_order_and_is_terminal() {
        let (mut session, ids) = session_with(&[("A", Some(3)), ("B", Some(2))]);
        session.start_combat().unwrap();
        session.end_combat().unwrap();
        assert_eq!(session.phase(), CombatPhase::Ended);
        assert!(session.combatant_ids().is_empty());
        assert!(session.current_participant().is_none());
        assert!(session.start_combat().is_err());
        assert_eq!(
            session.add_participant(Participant::new("Late", 5, 4)).unwrap_err(),
            CombatError::CombatEnded
        );
        session.set_combat_status(ids[0], CombatStatus::Fled).unwrap();
    }

    #[test]
    fn setting_dead_twice_is_idempotent() {
        let (session, ids) = session_with(&[("A", Some(3))]);
        let action = SessionAction::SetCombatStatus {
            id: ids[0],
            status: CombatStatus::Dead,
        };
        let once = session.apply(action.clone()).unwrap();
        let twice = once.apply(action).unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice.participant(ids[0]).unwrap().status, CombatStatus::Dead);
    }

    #[test]
    fn dead_combatants_keep_their_slot() {
        let (mut session, ids) = session_with(&[("A", Some(3)), ("B", Some(2)), ("C", Some(1))]);
        session.start_combat().unwrap();
        session.set_combat_status(ids[1], CombatStatus::Dead).unwrap();
        session.next_turn().unwrap();
        assert_eq!(current_name(&session), "B");
        assert_eq!(session.combatant_ids().len(), 3);
    }

    #[test]
    fn apply_leaves_input_untouched_on_error() {
        let (session, _) = session_with(&[("A", Some(3))]);
        let before = session.clone();
        assert!(session.apply(SessionAction::NextTurn).is_err());
        assert_eq!(session, before);
    }

    #[test]
    fn replaying_next_turn_on_one_snapshot_does_not_double_advance() {
        let (mut session, _) = session_with(&[("A", Some(3)), ("B", Some(2))]);
        session.start_combat().unwrap();
        session.next_turn().unwrap();
        let a = session.apply(SessionAction::NextTurn).unwrap();
        let b = session.apply(SessionAction::NextTurn).unwrap();
        assert_eq!(a.round(), 2);
        assert_eq!(a, b);
    }

    #[test]
    fn group_and_gm_pools() {
        let mut session = Session::new("Pools", &CombatConfig::default());
        session.update_group_ap(Some(3), Some(6));
        assert_eq!(session.spend_group_ap(5), 0);
        assert_eq!(session.gain_group_ap(10), 6);

        session.update_group_ap(None, Some(4));
        assert_eq!(session.group_ap().current(), 4);

        session.update_gm_ap(2);
        assert_eq!(session.spend_gm_ap(5), 0);
        assert_eq!(session.gain_gm_ap(12), 12);
    }

    #[test]
    fn damage_and_heal_drive_status() {
        let (mut session, ids) = session_with(&[("A", Some(3))]);
        session.apply_damage(ids[0], 15).unwrap();
        let p = session.participant(ids[0]).unwrap();
        assert_eq!((p.current_hp, p.status), (0, CombatStatus::Unconscious));

        session.heal(ids[0], 2).unwrap();
        let p = session.participant(ids[0]).unwrap();
        assert_eq!((p.current_hp, p.status), (2, CombatStatus::Active));

        session.set_combat_status(ids[0], CombatStatus::Dead).unwrap();
        assert_eq!(session.heal(ids[0], 5).unwrap_err().code(), "cannot_revive_dead");
        assert!(session.log().iter().any(|e| e.message.contains("is unconscious")));
    }

    #[test]
    fn removing_before_current_keeps_current() {
        let (mut session, ids) = session_with(&[("A", Some(3)), ("B", Some(2)), ("C", Some(1))]);
        session.start_combat().unwrap();
        session.next_turn().unwrap();
        session.next_turn().unwrap();
        assert_eq!(current_name(&session), "C");
        session.remove_participant(ids[0]).unwrap();
        assert_eq!(current_name(&session), "C");
        assert_eq!(session.turn_index(), 1);

        session.remove_participant(ids[2]).unwrap();
        assert_eq!(current_name(&session), "B");
    }

    #[test]
    fn joining_mid_combat_appends() {
        let (mut session, _) = session_with(&[("A", Some(3))]);
        session.start_combat().unwrap();
        session.add_participant(Participant::new("Late", 5, 4)).unwrap();
        assert_eq!(session.combatant_ids().len(), 2);
        session.next_turn().unwrap();
        assert_eq!(current_name(&session), "Late");
    }

    #[test]
    fn unknown_participant() {
        let (mut session, _) = session_with(&[("A", Some(3))]);
        let stranger = ParticipantId::new();
        assert_eq!(
            session.apply_damage(stranger, 1).unwrap_err(),
            CombatError::ParticipantNotFound(stranger)
        );
    }

    #[test]
    fn session_round_trips_through_json() {
        let (mut session, _) = session_with(&[("A", Some(3)), ("B", Some(2))]);
        session.start_combat().unwrap();
        let json = serde_json::to_string(&session).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn actions_parse_from_json() {
        let action: SessionAction =
            serde_json::from_str(r#"{"action":"update_group_ap","group_ap":3,"max_group_ap":null}"#)
                .unwrap();
        assert_eq!(
            action,
            SessionAction::UpdateGroupAp {
                group_ap: Some(3),
                max_group_ap: None
            }
        );
    }
}
