//! Record storage behind a narrow trait.
//!
//! The service layer only ever loads a whole record, edits a copy, and puts
//! it back, so a repository needs nothing beyond keyed get/put/remove.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::character::{Character, CharacterId};
use crate::error::{CoreError, CoreResult};
use crate::record::{SessionId, SessionRecord};

/// Keyed storage for characters and sessions.
pub trait Repository {
    /// All characters in insertion order.
    fn characters(&self) -> CoreResult<Vec<Character>>;

    /// Load one character.
    fn character(&self, id: CharacterId) -> CoreResult<Option<Character>>;

    /// Insert or replace a character.
    fn put_character(&mut self, character: Character) -> CoreResult<()>;

    /// Remove a character, returning it if it existed.
    fn remove_character(&mut self, id: CharacterId) -> CoreResult<Option<Character>>;

    /// All sessions in insertion order.
    fn sessions(&self) -> CoreResult<Vec<SessionRecord>>;

    /// Load one session.
    fn session(&self, id: SessionId) -> CoreResult<Option<SessionRecord>>;

    /// Insert or replace a session.
    fn put_session(&mut self, record: SessionRecord) -> CoreResult<()>;

    /// Remove a session, returning it if it existed.
    fn remove_session(&mut self, id: SessionId) -> CoreResult<Option<SessionRecord>>;
}

/// In-memory repository. Also the on-disk layout of [`JsonFileRepository`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryRepository {
    characters: Vec<Character>,
    sessions: Vec<SessionRecord>,
}

impl MemoryRepository {
    /// An empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Repository for MemoryRepository {
    fn characters(&self) -> CoreResult<Vec<Character>> {
        Ok(self.characters.clone())
    }

    fn character(&self, id: CharacterId) -> CoreResult<Option<Character>> {
        Ok(self.characters.iter().find(|c| c.id == id).cloned())
    }

    fn put_character(&mut self, character: Character) -> CoreResult<()> {
        match self.characters.iter_mut().find(|c| c.id == character.id) {
            Some(slot) => *slot = character,
            None => self.characters.push(character),
        }
        Ok(())
    }

    fn remove_character(&mut self, id: CharacterId) -> CoreResult<Option<Character>> {
        let index = self.characters.iter().position(|c| c.id == id);
        Ok(index.map(|i| self.characters.remove(i)))
    }

    fn sessions(&self) -> CoreResult<Vec<SessionRecord>> {
        Ok(self.sessions.clone())
    }

    fn session(&self, id: SessionId) -> CoreResult<Option<SessionRecord>> {
        Ok(self.sessions.iter().find(|s| s.id == id).cloned())
    }

    fn put_session(&mut self, record: SessionRecord) -> CoreResult<()> {
        match self.sessions.iter_mut().find(|s| s.id == record.id) {
            Some(slot) => *slot = record,
            None => self.sessions.push(record),
        }
        Ok(())
    }

    fn remove_session(&mut self, id: SessionId) -> CoreResult<Option<SessionRecord>> {
        let index = self.sessions.iter().position(|s| s.id == id);
        Ok(index.map(|i| self.sessions.remove(i)))
    }
}

/// A repository kept in a single pretty-printed JSON file.
///
/// Every write rewrites the whole file through a temporary sibling and a
/// rename. The in-memory copy only changes once the write succeeded.
#[derive(Debug)]
pub struct JsonFileRepository {
    path: PathBuf,
    store: MemoryRepository,
}

impl JsonFileRepository {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> CoreResult<Self> {
        let path = path.into();
        let store = if path.exists() {
            let source = std::fs::read_to_string(&path)
                .map_err(|e| CoreError::Storage(format!("{}: {e}", path.display())))?;
            serde_json::from_str(&source)
                .map_err(|e| CoreError::Storage(format!("{}: {e}", path.display())))?
        } else {
            tracing::debug!(path = %path.display(), "store file missing, starting empty");
            MemoryRepository::default()
        };
        Ok(Self { path, store })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn commit(&mut self, edit: impl FnOnce(&mut MemoryRepository) -> CoreResult<()>) -> CoreResult<()> {
        let mut next = self.store.clone();
        edit(&mut next)?;
        write_store(&self.path, &next)?;
        self.store = next;
        Ok(())
    }
}

fn write_store(path: &Path, store: &MemoryRepository) -> CoreResult<()> {
    let json = serde_json::to_string_pretty(store).map_err(|e| CoreError::Storage(e.to_string()))?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)
        .and_then(|()| std::fs::rename(&tmp, path))
        .map_err(|e| CoreError::Storage(format!("{}: {e}", path.display())))?;
    tracing::debug!(path = %path.display(), "store written");
    Ok(())
}

impl Repository for JsonFileRepository {
    fn characters(&self) -> CoreResult<Vec<Character>> {
        self.store.characters()
    }

    fn character(&self, id: CharacterId) -> CoreResult<Option<Character>> {
        self.store.character(id)
    }

    fn put_character(&mut self, character: Character) -> CoreResult<()> {
        self.commit(|store| store.put_character(character))
    }

    fn remove_character(&mut self, id: CharacterId) -> CoreResult<Option<Character>> {
        let mut removed = None;
        self.commit(|store| {
            removed = store.remove_character(id)?;
            Ok(())
        })?;
        Ok(removed)
    }

    fn sessions(&self) -> CoreResult<Vec<SessionRecord>> {
        self.store.sessions()
    }

    fn session(&self, id: SessionId) -> CoreResult<Option<SessionRecord>> {
        self.store.session(id)
    }

    fn put_session(&mut self, record: SessionRecord) -> CoreResult<()> {
        self.commit(|store| store.put_session(record))
    }

    fn remove_session(&mut self, id: SessionId) -> CoreResult<Option<SessionRecord>> {
        let mut removed = None;
        self.commit(|store| {
            removed = store.remove_session(id)?;
            Ok(())
        })?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::CharacterKind;
    use vk_combat::CombatConfig;
    use vk_rules::data::preset;
    use vk_rules::{CharacterBuild, RulesConfig};

    fn character(name: &str) -> Character {
        Character::new(
            name,
            CharacterKind::Pc,
            CharacterBuild::default(),
            &preset::core(),
            &RulesConfig::default(),
        )
    }

    #[test]
    fn memory_put_replaces_by_id() {
        let mut repo = MemoryRepository::new();
        let mut c = character("Nate");
        repo.put_character(c.clone()).unwrap();
        c.caps = 50;
        repo.put_character(c.clone()).unwrap();
        assert_eq!(repo.characters().unwrap().len(), 1);
        assert_eq!(repo.character(c.id).unwrap().unwrap().caps, 50);
    }

    #[test]
    fn memory_remove_missing_is_none() {
        let mut repo = MemoryRepository::new();
        assert!(repo.remove_session(SessionId::new()).unwrap().is_none());
    }

    #[test]
    fn json_file_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.json");

        let c = character("Piper");
        let s = SessionRecord::new("Diamond City", &CombatConfig::default());
        {
            let mut repo = JsonFileRepository::open(&path).unwrap();
            repo.put_character(c.clone()).unwrap();
            repo.put_session(s.clone()).unwrap();
        }

        let repo = JsonFileRepository::open(&path).unwrap();
        assert_eq!(repo.character(c.id).unwrap(), Some(c));
        assert_eq!(repo.session(s.id).unwrap(), Some(s));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn json_file_missing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::open(dir.path().join("none.json")).unwrap();
        assert!(repo.characters().unwrap().is_empty());
    }

    #[test]
    fn json_file_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();
        let err = JsonFileRepository::open(&path).unwrap_err();
        assert_eq!(err.code(), "storage");
    }

    #[test]
    fn failed_write_keeps_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("vault.json");
        let mut repo = JsonFileRepository::open(&path).unwrap();
        assert!(repo.put_character(character("Codsworth")).is_err());
        assert!(repo.characters().unwrap().is_empty());
    }
}
