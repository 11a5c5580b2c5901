//! Error types for the combat state machine.

use crate::participant::{CombatStatus, ParticipantId};
use crate::session::CombatPhase;

/// Rejected combat transitions. The session they were applied to is left
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CombatError {
    /// The transition needs the preparation phase.
    #[error("combat must be in preparation (is {0})")]
    NotInPreparation(CombatPhase),

    /// The transition needs an active combat.
    #[error("combat is not active (is {0})")]
    NotActive(CombatPhase),

    /// The combat has ended and accepts no further changes of this kind.
    #[error("combat has ended")]
    CombatEnded,

    /// Combat cannot start or continue without participants.
    #[error("session has no participants")]
    NoParticipants,

    /// The participant id is not in the session.
    #[error("participant not found: {0}")]
    ParticipantNotFound(ParticipantId),

    /// The participant id is already in the session.
    #[error("participant already in session: {0}")]
    DuplicateParticipant(ParticipantId),

    /// The status change is not allowed.
    #[error("cannot change status from {from} to {to}")]
    InvalidStatusTransition {
        /// Current status.
        from: CombatStatus,
        /// Requested status.
        to: CombatStatus,
    },

    /// Dead combatants cannot be healed.
    #[error("participant {0} is dead and cannot be healed")]
    CannotReviveDead(ParticipantId),

    /// Only active combatants can spend action points.
    #[error("participant {id} is {status} and cannot act")]
    Incapacitated {
        /// The participant.
        id: ParticipantId,
        /// Its status.
        status: CombatStatus,
    },

    /// The participant has fewer action points than requested.
    #[error("participant {id} has {available} AP, needs {requested}")]
    InsufficientAp {
        /// The participant.
        id: ParticipantId,
        /// AP requested.
        requested: u32,
        /// AP available.
        available: u32,
    },
}

impl CombatError {
    /// Stable code naming the violated invariant.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotInPreparation(_) => "not_in_preparation",
            Self::NotActive(_) => "combat_not_active",
            Self::CombatEnded => "combat_ended",
            Self::NoParticipants => "no_participants",
            Self::ParticipantNotFound(_) => "participant_not_found",
            Self::DuplicateParticipant(_) => "duplicate_participant",
            Self::InvalidStatusTransition { .. } => "invalid_status_transition",
            Self::CannotReviveDead(_) => "cannot_revive_dead",
            Self::Incapacitated { .. } => "participant_incapacitated",
            Self::InsufficientAp { .. } => "insufficient_ap",
        }
    }
}

/// Convenience result type for combat operations.
pub type CombatResult<T> = Result<T, CombatError>;
