use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vk_combat::{CombatConfig, Session, SessionStatus};

/// Unique identifier for a stored session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Generate a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// A stored combat session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Session id.
    pub id: SessionId,
    /// Session state.
    pub session: Session,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session was last saved.
    pub updated_at: DateTime<Utc>,
}

impl SessionRecord {
    /// A new planned session.
    pub fn new(name: impl Into<String>, config: &CombatConfig) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            session: Session::new(name, config),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A partial session update. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionPatch {
    /// New name.
    pub name: Option<String>,
    /// New status.
    pub status: Option<SessionStatus>,
}
