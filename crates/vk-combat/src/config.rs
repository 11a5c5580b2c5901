//! Configuration for new combat sessions.

use serde::{Deserialize, Serialize};

/// Defaults applied when sessions and participants are created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Maximum AP for a new participant.
    pub participant_max_ap: u32,
    /// Maximum size of the group AP pool for a new session.
    pub max_group_ap: u32,
    /// GM AP a new session starts with.
    pub starting_gm_ap: u32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            participant_max_ap: 4,
            max_group_ap: 6,
            starting_gm_ap: 0,
        }
    }
}

impl CombatConfig {
    /// Set the participant AP maximum.
    pub fn with_participant_max_ap(mut self, max: u32) -> Self {
        self.participant_max_ap = max;
        self
    }

    /// Set the group AP pool maximum.
    pub fn with_max_group_ap(mut self, max: u32) -> Self {
        self.max_group_ap = max;
        self
    }

    /// Set the starting GM AP.
    pub fn with_starting_gm_ap(mut self, ap: u32) -> Self {
        self.starting_gm_ap = ap;
        self
    }
}
