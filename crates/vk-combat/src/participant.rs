//! Combatants and their status lifecycle.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CombatError, CombatResult};

/// Unique identifier for a participant within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(pub Uuid);

impl ParticipantId {
    /// Generate a new random participant ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// A combatant's standing in the fight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatStatus {
    /// Able to act.
    #[default]
    Active,
    /// Down at 0 HP; recovers when healed.
    Unconscious,
    /// Terminal.
    Dead,
    /// Left the fight.
    Fled,
}

impl CombatStatus {
    /// All statuses.
    pub const ALL: [CombatStatus; 4] = [Self::Active, Self::Unconscious, Self::Dead, Self::Fled];

    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Unconscious => "unconscious",
            Self::Dead => "dead",
            Self::Fled => "fled",
        }
    }

    /// Whether an explicit change from `self` to `to` is allowed.
    ///
    /// Staying in the same status is always allowed.
    pub fn can_transition_to(self, to: CombatStatus) -> bool {
        use CombatStatus::*;
        self == to
            || matches!(
                (self, to),
                (Active, Unconscious | Dead | Fled) | (Unconscious, Active | Dead)
            )
    }
}

impl fmt::Display for CombatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for CombatStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|st| st.name() == lower)
            .ok_or_else(|| format!("unknown combat status: {s}"))
    }
}

/// A combatant in a session, holding a live copy of its combat stats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Participant id.
    pub id: ParticipantId,
    /// Display name.
    pub name: String,
    /// Backing character, or `None` for a quick NPC.
    pub character_id: Option<Uuid>,
    /// Initiative result; unset until rolled.
    pub turn_order: Option<i32>,
    /// Combat status.
    pub status: CombatStatus,
    /// Current hit points, `0..=max_hp`.
    pub current_hp: i32,
    /// Maximum hit points.
    pub max_hp: i32,
    /// Current action points.
    pub current_ap: u32,
    /// Maximum action points.
    pub max_ap: u32,
    /// Defense target number.
    pub defense: u32,
    /// Derived initiative score.
    pub initiative: u32,
    /// Free-form conditions (e.g. "prone", "poisoned").
    #[serde(default)]
    pub conditions: Vec<String>,
}

impl Participant {
    /// A participant at full HP and AP.
    pub fn new(name: impl Into<String>, max_hp: i32, max_ap: u32) -> Self {
        let max_hp = max_hp.max(0);
        Self {
            id: ParticipantId::new(),
            name: name.into(),
            character_id: None,
            turn_order: None,
            status: CombatStatus::Active,
            current_hp: max_hp,
            max_hp,
            current_ap: max_ap,
            max_ap,
            defense: 1,
            initiative: 0,
            conditions: Vec::new(),
        }
    }

    /// Link the participant to a stored character.
    pub fn with_character(mut self, character_id: Uuid) -> Self {
        self.character_id = Some(character_id);
        self
    }

    /// Set defense and derived initiative.
    pub fn with_combat_stats(mut self, defense: u32, initiative: u32) -> Self {
        self.defense = defense;
        self.initiative = initiative;
        self
    }

    /// Start below full HP, clamped to `0..=max_hp`.
    pub fn with_current_hp(mut self, hp: i32) -> Self {
        self.current_hp = hp.clamp(0, self.max_hp);
        self
    }

    /// Returns true for participants without a backing character.
    pub fn is_quick_npc(&self) -> bool {
        self.character_id.is_none()
    }

    /// Returns true if the participant can act.
    pub fn is_active(&self) -> bool {
        self.status == CombatStatus::Active
    }

    /// Explicitly change status. Returns true if the status changed.
    pub fn set_status(&mut self, status: CombatStatus) -> CombatResult<bool> {
        if !self.status.can_transition_to(status) {
            return Err(CombatError::InvalidStatusTransition {
                from: self.status,
                to: status,
            });
        }
        let changed = self.status != status;
        self.status = status;
        Ok(changed)
    }

    /// Take damage. An active participant dropping to 0 HP falls
    /// unconscious. Returns the new status if it changed.
    pub fn apply_damage(&mut self, amount: u32) -> Option<CombatStatus> {
        self.current_hp = clamp_hp(self.current_hp as i64 - amount as i64, self.max_hp);
        if self.current_hp == 0 && self.status == CombatStatus::Active {
            self.status = CombatStatus::Unconscious;
            return Some(self.status);
        }
        None
    }

    /// Restore HP. An unconscious participant healed above 0 becomes
    /// active again. Returns the new status if it changed.
    pub fn heal(&mut self, amount: u32) -> CombatResult<Option<CombatStatus>> {
        if self.status == CombatStatus::Dead {
            return Err(CombatError::CannotReviveDead(self.id));
        }
        self.current_hp = clamp_hp(self.current_hp as i64 + amount as i64, self.max_hp);
        if self.current_hp > 0 && self.status == CombatStatus::Unconscious {
            self.status = CombatStatus::Active;
            return Ok(Some(self.status));
        }
        Ok(None)
    }

    /// Spend action points. Fails if the participant cannot act or has
    /// too few.
    pub fn spend_ap(&mut self, amount: u32) -> CombatResult<u32> {
        if !self.is_active() {
            return Err(CombatError::Incapacitated {
                id: self.id,
                status: self.status,
            });
        }
        if amount > self.current_ap {
            return Err(CombatError::InsufficientAp {
                id: self.id,
                requested: amount,
                available: self.current_ap,
            });
        }
        self.current_ap -= amount;
        Ok(self.current_ap)
    }

    /// Gain action points, clamped at the maximum. Returns the new value.
    pub fn gain_ap(&mut self, amount: u32) -> u32 {
        self.current_ap = self.current_ap.saturating_add(amount).min(self.max_ap);
        self.current_ap
    }

    /// Refill action points to the maximum.
    pub fn reset_ap(&mut self) {
        self.current_ap = self.max_ap;
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (HP {}/{}, AP {}/{}, {})",
            self.name, self.current_hp, self.max_hp, self.current_ap, self.max_ap, self.status
        )
    }
}

fn clamp_hp(hp: i64, max_hp: i32) -> i32 {
    hp.clamp(0, max_hp as i64) as i32
}
