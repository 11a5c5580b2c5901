use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vk_rules::{CharacterBuild, EquipmentBonuses, RuleData, RulesConfig, StatBlock, derive_stats};

/// Unique identifier for a stored character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    /// Generate a new random character ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Player character or host-run character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterKind {
    /// Player character.
    #[default]
    Pc,
    /// Non-player character.
    Npc,
}

impl fmt::Display for CharacterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pc => write!(f, "pc"),
            Self::Npc => write!(f, "npc"),
        }
    }
}

impl FromStr for CharacterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pc" => Ok(Self::Pc),
            "npc" => Ok(Self::Npc),
            other => Err(format!("unknown character kind: {other} (expected pc or npc)")),
        }
    }
}

/// A stored character sheet.
///
/// `stats` is always derived from `build` and `equipment`; it is stored for
/// display and never trusted as input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    /// Character id.
    pub id: CharacterId,
    /// Display name.
    pub name: String,
    /// PC or NPC.
    pub kind: CharacterKind,
    /// Build choices.
    pub build: CharacterBuild,
    /// Equipment bonuses, computed outside the core.
    #[serde(default)]
    pub equipment: EquipmentBonuses,
    /// Derived stat block.
    pub stats: StatBlock,
    /// Current hit points, `0..=stats.max_hp`.
    pub current_hp: i32,
    /// Current luck points, `0..=stats.max_luck_points`.
    pub current_luck_points: u32,
    /// Bottle caps.
    #[serde(default)]
    pub caps: u32,
    /// When the character was created.
    pub created_at: DateTime<Utc>,
    /// When the character was last saved.
    pub updated_at: DateTime<Utc>,
}

impl Character {
    /// Create a character at full HP and luck.
    pub fn new(
        name: impl Into<String>,
        kind: CharacterKind,
        build: CharacterBuild,
        data: &RuleData,
        config: &RulesConfig,
    ) -> Self {
        let now = Utc::now();
        let mut character = Self {
            id: CharacterId::new(),
            name: name.into(),
            kind,
            build,
            equipment: EquipmentBonuses::default(),
            stats: StatBlock::default(),
            current_hp: i32::MAX,
            current_luck_points: u32::MAX,
            caps: 0,
            created_at: now,
            updated_at: now,
        };
        character.refresh(data, config);
        character
    }

    /// Recompute the stat block and clamp current HP and luck to it.
    pub fn refresh(&mut self, data: &RuleData, config: &RulesConfig) {
        self.stats = derive_stats(data, config, &self.build, &self.equipment);
        let hp = self.current_hp.clamp(0, self.stats.max_hp.max(0));
        let luck = self.current_luck_points.min(self.stats.max_luck_points);
        if hp != self.current_hp || luck != self.current_luck_points {
            tracing::debug!(
                character = %self.id,
                hp,
                luck,
                "clamped current values to derived maxima"
            );
        }
        self.current_hp = hp;
        self.current_luck_points = luck;
    }

    /// Returns true for player characters.
    pub fn is_pc(&self) -> bool {
        self.kind == CharacterKind::Pc
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] level {} (HP {}/{})",
            self.name, self.kind, self.build.level, self.current_hp, self.stats.max_hp
        )
    }
}

/// Input for creating a character.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterDraft {
    /// Display name.
    pub name: String,
    /// PC or NPC.
    pub kind: CharacterKind,
    /// Build choices.
    pub build: CharacterBuild,
    /// Equipment bonuses.
    pub equipment: EquipmentBonuses,
    /// Bottle caps.
    pub caps: u32,
    /// Starting HP; full when unset.
    pub current_hp: Option<i32>,
    /// Starting luck points; full when unset.
    pub current_luck_points: Option<u32>,
}

impl CharacterDraft {
    /// A draft with a default build.
    pub fn new(name: impl Into<String>, kind: CharacterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Self::default()
        }
    }

    /// Use the given build.
    pub fn with_build(mut self, build: CharacterBuild) -> Self {
        self.build = build;
        self
    }

    /// Use the given equipment bonuses.
    pub fn with_equipment(mut self, equipment: EquipmentBonuses) -> Self {
        self.equipment = equipment;
        self
    }

    /// Start with the given caps.
    pub fn with_caps(mut self, caps: u32) -> Self {
        self.caps = caps;
        self
    }
}

/// A partial character update. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterPatch {
    /// New name.
    pub name: Option<String>,
    /// Replacement build.
    pub build: Option<CharacterBuild>,
    /// Replacement equipment bonuses.
    pub equipment: Option<EquipmentBonuses>,
    /// New caps.
    pub caps: Option<u32>,
    /// New current HP, clamped.
    pub current_hp: Option<i32>,
    /// New current luck points, clamped.
    pub current_luck_points: Option<u32>,
}

impl CharacterPatch {
    /// Apply the patch to a copy of `character`. Stats are not refreshed.
    pub fn apply_to(&self, character: &Character) -> Character {
        let mut next = character.clone();
        if let Some(name) = &self.name {
            next.name = name.clone();
        }
        if let Some(build) = &self.build {
            next.build = build.clone();
        }
        if let Some(equipment) = self.equipment {
            next.equipment = equipment;
        }
        if let Some(caps) = self.caps {
            next.caps = caps;
        }
        if let Some(hp) = self.current_hp {
            next.current_hp = hp;
        }
        if let Some(luck) = self.current_luck_points {
            next.current_luck_points = luck;
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vk_rules::data::preset;

    #[test]
    fn character_id_display_shows_short_form() {
        let id = CharacterId::new();
        assert_eq!(id.to_string().len(), 8);
    }

    #[test]
    fn new_character_starts_full() {
        let data = preset::core();
        let c = Character::new(
            "Nora",
            CharacterKind::Pc,
            CharacterBuild::default(),
            &data,
            &RulesConfig::default(),
        );
        assert_eq!(c.stats.max_hp, 10);
        assert_eq!(c.current_hp, 10);
        assert_eq!(c.current_luck_points, 5);
        assert!(c.is_pc());
    }

    #[test]
    fn refresh_clamps_current_values() {
        let data = preset::core();
        let config = RulesConfig::default();
        let mut c = Character::new("Nora", CharacterKind::Pc, CharacterBuild::default(), &data, &config);
        c.current_hp = -4;
        c.current_luck_points = 99;
        c.refresh(&data, &config);
        assert_eq!(c.current_hp, 0);
        assert_eq!(c.current_luck_points, 5);
    }

    #[test]
    fn patch_leaves_unset_fields() {
        let data = preset::core();
        let c = Character::new("Nora", CharacterKind::Npc, CharacterBuild::default(), &data, &RulesConfig::default());
        let patched = CharacterPatch {
            caps: Some(120),
            ..CharacterPatch::default()
        }
        .apply_to(&c);
        assert_eq!(patched.caps, 120);
        assert_eq!(patched.name, "Nora");
        assert_eq!(patched.kind, CharacterKind::Npc);
    }

    #[test]
    fn parse_kind() {
        assert_eq!("NPC".parse::<CharacterKind>(), Ok(CharacterKind::Npc));
        assert!("monster".parse::<CharacterKind>().is_err());
    }
}
