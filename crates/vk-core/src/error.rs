use vk_combat::CombatError;
use vk_rules::{RulesError, ValidationReport};

use crate::character::CharacterId;
use crate::record::SessionId;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors returned by the service layer.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A build edit broke a rule.
    #[error(transparent)]
    Rules(#[from] RulesError),

    /// A combat transition was rejected.
    #[error(transparent)]
    Combat(#[from] CombatError),

    /// A submitted build has blocking validation errors.
    #[error("invalid build: {}", first_error(.0))]
    InvalidBuild(ValidationReport),

    /// Non-player characters have no origin.
    #[error("an npc cannot have an origin")]
    NpcWithOrigin,

    /// The requested character does not exist.
    #[error("character not found: {0}")]
    CharacterNotFound(CharacterId),

    /// The character already has a participant in the session.
    #[error("character {character} is already in session {session}")]
    AlreadyInSession {
        /// The character.
        character: CharacterId,
        /// The session.
        session: SessionId,
    },

    /// The requested session does not exist.
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),

    /// Nothing matched a lookup by name or id prefix.
    #[error("no {kind} matches \"{query}\"")]
    NoMatch {
        /// What was looked up.
        kind: &'static str,
        /// The query text.
        query: String,
    },

    /// More than one record matched a lookup by name or id prefix.
    #[error("\"{query}\" matches more than one {kind}")]
    Ambiguous {
        /// What was looked up.
        kind: &'static str,
        /// The query text.
        query: String,
    },

    /// Reading or writing the store failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// The configuration file could not be read.
    #[error("config error: {0}")]
    Config(String),
}

impl CoreError {
    /// Stable code for the failure, forwarded from the rules or combat
    /// layer where one applies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Rules(e) => e.code(),
            Self::Combat(e) => e.code(),
            Self::InvalidBuild(_) => "invalid_build",
            Self::NpcWithOrigin => "npc_with_origin",
            Self::CharacterNotFound(_) => "character_not_found",
            Self::AlreadyInSession { .. } => "already_in_session",
            Self::SessionNotFound(_) => "session_not_found",
            Self::NoMatch { .. } => "no_match",
            Self::Ambiguous { .. } => "ambiguous",
            Self::Storage(_) => "storage",
            Self::Config(_) => "config",
        }
    }
}

fn first_error(report: &ValidationReport) -> String {
    match report.first_error() {
        Some(issue) => format!("{} ({})", issue.message, issue.code),
        None => "no errors".to_string(),
    }
}
