//! Combat session state machine for Vaultkeeper.
//!
//! A [`Session`] owns its participants, the initiative order, the round and
//! turn counters, and two shared action point pools. Every transition is
//! available as a `&mut self` method and as the pure [`Session::apply`],
//! which returns an edited copy and leaves the input untouched on error.

pub mod config;
pub mod error;
pub mod participant;
pub mod pool;
pub mod session;

pub use config::CombatConfig;
pub use error::{CombatError, CombatResult};
pub use participant::{CombatStatus, Participant, ParticipantId};
pub use pool::{GmApPool, GroupApPool};
pub use session::{CombatLogEntry, CombatPhase, Session, SessionAction, SessionStatus};
