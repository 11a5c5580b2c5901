//! Records, storage and the service layer for Vaultkeeper.
//!
//! [`Vault`] wires the pure rules engine and combat state machine to a
//! [`Repository`]. It is the only place where derived stats become
//! authoritative: every character save re-runs validation and derivation.

/// Stored characters, drafts and patches.
pub mod character;
/// Installation-wide configuration.
pub mod config;
/// Error types used throughout the crate.
pub mod error;
/// Lookup by name or short id.
pub mod lookup;
/// Stored sessions.
pub mod record;
/// Storage trait and its in-memory and JSON-file implementations.
pub mod repository;
/// The service layer.
pub mod vault;

pub use character::{Character, CharacterDraft, CharacterId, CharacterKind, CharacterPatch};
pub use config::VaultConfig;
pub use error::{CoreError, CoreResult};
pub use record::{SessionId, SessionPatch, SessionRecord};
pub use repository::{JsonFileRepository, MemoryRepository, Repository};
pub use vault::{Checked, QuickNpc, Vault};
