//! The service layer: every character, perk and session operation.
//!
//! Each mutating call loads a record, applies a pure transition to a copy,
//! and writes it back only if the transition succeeded. A rejected call
//! leaves the stored record exactly as it was.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use vk_combat::{CombatStatus, Participant, ParticipantId, SessionAction};
use vk_rules::{
    BuildAction, PerkChoice, PerkContext, PerkDefinition, RuleData, RulesError, ValidationIssue,
    ValidationReport, apply_build_action, available_perks, validate_build,
};

use crate::character::{Character, CharacterDraft, CharacterId, CharacterKind, CharacterPatch};
use crate::config::VaultConfig;
use crate::error::{CoreError, CoreResult};
use crate::lookup::find_unique;
use crate::record::{SessionId, SessionPatch, SessionRecord};
use crate::repository::Repository;

/// A saved record together with the non-blocking issues found in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checked<T> {
    /// The saved record.
    pub record: T,
    /// Warnings from build validation.
    pub warnings: Vec<ValidationIssue>,
}

/// A participant without a backing character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickNpc {
    /// Display name.
    pub name: String,
    /// Maximum hit points.
    pub max_hp: i32,
    /// Defense target number.
    pub defense: u32,
    /// Initiative score.
    pub initiative: u32,
    /// Maximum AP; the configured default when unset.
    pub max_ap: Option<u32>,
}

impl QuickNpc {
    /// A quick NPC with the given hit points and default combat stats.
    pub fn new(name: impl Into<String>, max_hp: i32) -> Self {
        Self {
            name: name.into(),
            max_hp,
            defense: 1,
            initiative: 0,
            max_ap: None,
        }
    }
}

/// Character and session service over a [`Repository`].
///
/// Reference data is fixed at construction.
pub struct Vault<R: Repository> {
    repo: R,
    data: RuleData,
    config: VaultConfig,
}

impl<R: Repository> Vault<R> {
    /// Create a service over `repo`.
    pub fn new(repo: R, data: RuleData, config: VaultConfig) -> Self {
        tracing::debug!(data = %data.name, "vault opened");
        Self { repo, data, config }
    }

    /// The reference data in use.
    pub fn data(&self) -> &RuleData {
        &self.data
    }

    /// The configuration in use.
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// The underlying repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    // --- characters ---

    /// Create a character from a full build payload.
    ///
    /// Blocking validation errors reject the draft; warnings are returned
    /// with the saved record.
    pub fn create_character(&mut self, draft: CharacterDraft) -> CoreResult<Checked<Character>> {
        let mut character = Character::new(
            draft.name,
            draft.kind,
            draft.build,
            &self.data,
            &self.config.rules,
        );
        character.equipment = draft.equipment;
        character.caps = draft.caps;
        if let Some(hp) = draft.current_hp {
            character.current_hp = hp;
        }
        if let Some(luck) = draft.current_luck_points {
            character.current_luck_points = luck;
        }
        let saved = self.save_character(character)?;
        tracing::info!(character = %saved.record.id, name = %saved.record.name, "character created");
        Ok(saved)
    }

    /// Replace parts of a character and re-derive its stats.
    pub fn update_character(
        &mut self,
        id: CharacterId,
        patch: &CharacterPatch,
    ) -> CoreResult<Checked<Character>> {
        let current = self.character(id)?;
        self.save_character(patch.apply_to(&current))
    }

    /// Apply one build edit to a stored character.
    pub fn apply_build_action(
        &mut self,
        id: CharacterId,
        action: &BuildAction,
    ) -> CoreResult<Checked<Character>> {
        let mut character = self.character(id)?;
        character.build = apply_build_action(&self.data, &self.config.rules, &character.build, action)
            .inspect_err(|e| {
                tracing::debug!(character = %id, %action, code = e.code(), "build action rejected");
            })?;
        self.save_character(character)
    }

    /// Delete a character. Participants copied from it stay in their
    /// sessions.
    pub fn delete_character(&mut self, id: CharacterId) -> CoreResult<Character> {
        let removed = self
            .repo
            .remove_character(id)?
            .ok_or(CoreError::CharacterNotFound(id))?;
        tracing::info!(character = %id, "character deleted");
        Ok(removed)
    }

    /// Copy a character under a new id. The copy is named `name`, or
    /// "<original> (copy)".
    pub fn duplicate_character(&mut self, id: CharacterId, name: Option<String>) -> CoreResult<Character> {
        let original = self.character(id)?;
        let now = Utc::now();
        let copy = Character {
            id: CharacterId::new(),
            name: name.unwrap_or_else(|| format!("{} (copy)", original.name)),
            created_at: now,
            updated_at: now,
            ..original
        };
        self.repo.put_character(copy.clone())?;
        tracing::info!(from = %id, to = %copy.id, "character duplicated");
        Ok(copy)
    }

    /// Load a character.
    pub fn character(&self, id: CharacterId) -> CoreResult<Character> {
        self.repo.character(id)?.ok_or(CoreError::CharacterNotFound(id))
    }

    /// All characters, optionally only PCs or only NPCs.
    pub fn characters(&self, kind: Option<CharacterKind>) -> CoreResult<Vec<Character>> {
        let mut all = self.repo.characters()?;
        if let Some(kind) = kind {
            all.retain(|c| c.kind == kind);
        }
        Ok(all)
    }

    /// Resolve a character by name or id prefix.
    pub fn find_character(&self, query: &str) -> CoreResult<Character> {
        find_unique(self.repo.characters()?, "character", query, |c| c.id.0, |c| c.name.as_str())
    }

    /// Run full build validation on a stored character.
    pub fn check_character(&self, id: CharacterId) -> CoreResult<ValidationReport> {
        let character = self.character(id)?;
        Ok(validate_build(&self.data, &self.config.rules, &character.build))
    }

    fn save_character(&mut self, mut character: Character) -> CoreResult<Checked<Character>> {
        if character.kind == CharacterKind::Npc && character.build.origin.is_some() {
            return Err(CoreError::NpcWithOrigin);
        }
        let report = validate_build(&self.data, &self.config.rules, &character.build);
        if report.has_errors() {
            tracing::warn!(
                character = %character.id,
                errors = report.errors().count(),
                "build rejected"
            );
            return Err(CoreError::InvalidBuild(report));
        }

        character.refresh(&self.data, &self.config.rules);
        character.updated_at = Utc::now();
        self.repo.put_character(character.clone())?;
        Ok(Checked {
            record: character,
            warnings: report.warnings().cloned().collect(),
        })
    }

    // --- perks ---

    /// Every perk in the reference data.
    pub fn perks(&self) -> &[PerkDefinition] {
        &self.data.perks
    }

    /// Look up a perk definition.
    pub fn perk(&self, id: &str) -> CoreResult<&PerkDefinition> {
        self.data
            .perk(id)
            .ok_or_else(|| RulesError::UnknownPerk(id.to_string()).into())
    }

    /// Perks a build described by `ctx` may take next.
    pub fn available_perks(&self, ctx: &PerkContext<'_>) -> Vec<PerkChoice> {
        available_perks(&self.data, ctx)
    }

    /// Perks a stored character may take next.
    pub fn character_available_perks(&self, id: CharacterId) -> CoreResult<Vec<PerkChoice>> {
        let character = self.character(id)?;
        Ok(character.build.available_perks(&self.data, &self.config.rules))
    }

    // --- sessions ---

    /// Create a planned session.
    pub fn create_session(&mut self, name: impl Into<String>) -> CoreResult<SessionRecord> {
        let record = SessionRecord::new(name, &self.config.combat);
        self.repo.put_session(record.clone())?;
        tracing::info!(session = %record.id, name = %record.session.name, "session created");
        Ok(record)
    }

    /// Rename a session or change its status.
    pub fn update_session(&mut self, id: SessionId, patch: &SessionPatch) -> CoreResult<SessionRecord> {
        let mut record = self.session(id)?;
        if let Some(name) = &patch.name {
            record.session = record.session.apply(SessionAction::Rename { name: name.clone() })?;
        }
        if let Some(status) = patch.status {
            record.session = record.session.apply(SessionAction::SetStatus { status })?;
        }
        self.store_session(record)
    }

    /// Delete a session and its participants.
    pub fn delete_session(&mut self, id: SessionId) -> CoreResult<SessionRecord> {
        let removed = self
            .repo
            .remove_session(id)?
            .ok_or(CoreError::SessionNotFound(id))?;
        tracing::info!(session = %id, "session deleted");
        Ok(removed)
    }

    /// Load a session.
    pub fn session(&self, id: SessionId) -> CoreResult<SessionRecord> {
        self.repo.session(id)?.ok_or(CoreError::SessionNotFound(id))
    }

    /// All sessions.
    pub fn sessions(&self) -> CoreResult<Vec<SessionRecord>> {
        self.repo.sessions()
    }

    /// Resolve a session by name or id prefix.
    pub fn find_session(&self, query: &str) -> CoreResult<SessionRecord> {
        find_unique(self.repo.sessions()?, "session", query, |s| s.id.0, |s| s.session.name.as_str())
    }

    /// Resolve a participant of a session by name or id prefix.
    pub fn find_participant(&self, id: SessionId, query: &str) -> CoreResult<ParticipantId> {
        let record = self.session(id)?;
        let found = find_unique(
            record.session.participants().iter(),
            "participant",
            query,
            |p| p.id.0,
            |p| p.name.as_str(),
        )?;
        Ok(found.id)
    }

    /// Add a stored character to a session, copying its derived combat
    /// stats and current HP.
    pub fn add_participant(
        &mut self,
        id: SessionId,
        character_id: CharacterId,
    ) -> CoreResult<(SessionRecord, ParticipantId)> {
        let character = self.character(character_id)?;
        let record = self.session(id)?;
        let already = record
            .session
            .participants()
            .iter()
            .any(|p| p.character_id == Some(character_id.0));
        if already {
            return Err(CoreError::AlreadyInSession {
                character: character_id,
                session: id,
            });
        }

        let participant = Participant::new(
            character.name.clone(),
            character.stats.max_hp,
            self.config.combat.participant_max_ap,
        )
        .with_character(character_id.0)
        .with_combat_stats(character.stats.defense, character.stats.initiative)
        .with_current_hp(character.current_hp);
        let participant_id = participant.id;
        let record = self.mutate_session(id, SessionAction::AddParticipant { participant })?;
        Ok((record, participant_id))
    }

    /// Add a participant with no backing character.
    pub fn add_quick_npc(&mut self, id: SessionId, npc: QuickNpc) -> CoreResult<(SessionRecord, ParticipantId)> {
        let max_ap = npc.max_ap.unwrap_or(self.config.combat.participant_max_ap);
        let participant =
            Participant::new(npc.name, npc.max_hp, max_ap).with_combat_stats(npc.defense, npc.initiative);
        let participant_id = participant.id;
        let record = self.mutate_session(id, SessionAction::AddParticipant { participant })?;
        Ok((record, participant_id))
    }

    /// Remove a participant.
    pub fn remove_participant(&mut self, id: SessionId, participant: ParticipantId) -> CoreResult<SessionRecord> {
        self.mutate_session(id, SessionAction::RemoveParticipant { id: participant })
    }

    /// Explicitly change a participant's combat status.
    pub fn set_combat_status(
        &mut self,
        id: SessionId,
        participant: ParticipantId,
        status: CombatStatus,
    ) -> CoreResult<SessionRecord> {
        self.mutate_session(
            id,
            SessionAction::SetCombatStatus {
                id: participant,
                status,
            },
        )
    }

    /// Record a participant's initiative result.
    pub fn set_initiative(
        &mut self,
        id: SessionId,
        participant: ParticipantId,
        value: i32,
    ) -> CoreResult<SessionRecord> {
        self.mutate_session(
            id,
            SessionAction::SetInitiative {
                id: participant,
                value,
            },
        )
    }

    /// Sort by initiative and begin round 1.
    pub fn start_combat(&mut self, id: SessionId) -> CoreResult<SessionRecord> {
        self.mutate_session(id, SessionAction::StartCombat)
    }

    /// End the combat.
    pub fn end_combat(&mut self, id: SessionId) -> CoreResult<SessionRecord> {
        self.mutate_session(id, SessionAction::EndCombat)
    }

    /// Advance to the next combatant.
    pub fn next_turn(&mut self, id: SessionId) -> CoreResult<SessionRecord> {
        self.mutate_session(id, SessionAction::NextTurn)
    }

    /// Step back to the previous combatant.
    pub fn prev_turn(&mut self, id: SessionId) -> CoreResult<SessionRecord> {
        self.mutate_session(id, SessionAction::PrevTurn)
    }

    /// Set the group AP value and/or maximum.
    pub fn update_group_ap(
        &mut self,
        id: SessionId,
        group_ap: Option<u32>,
        max_group_ap: Option<u32>,
    ) -> CoreResult<SessionRecord> {
        self.mutate_session(
            id,
            SessionAction::UpdateGroupAp {
                group_ap,
                max_group_ap,
            },
        )
    }

    /// Set the GM AP value.
    pub fn update_gm_ap(&mut self, id: SessionId, value: u32) -> CoreResult<SessionRecord> {
        self.mutate_session(id, SessionAction::UpdateGmAp { value })
    }

    /// Damage a participant.
    pub fn apply_damage(
        &mut self,
        id: SessionId,
        participant: ParticipantId,
        amount: u32,
    ) -> CoreResult<SessionRecord> {
        self.mutate_session(
            id,
            SessionAction::ApplyDamage {
                id: participant,
                amount,
            },
        )
    }

    /// Heal a participant.
    pub fn heal(&mut self, id: SessionId, participant: ParticipantId, amount: u32) -> CoreResult<SessionRecord> {
        self.mutate_session(
            id,
            SessionAction::Heal {
                id: participant,
                amount,
            },
        )
    }

    /// Spend a participant's own AP.
    pub fn spend_participant_ap(
        &mut self,
        id: SessionId,
        participant: ParticipantId,
        amount: u32,
    ) -> CoreResult<SessionRecord> {
        self.mutate_session(
            id,
            SessionAction::SpendParticipantAp {
                id: participant,
                amount,
            },
        )
    }

    /// Give a participant AP, up to its maximum.
    pub fn gain_participant_ap(
        &mut self,
        id: SessionId,
        participant: ParticipantId,
        amount: u32,
    ) -> CoreResult<SessionRecord> {
        self.mutate_session(
            id,
            SessionAction::GainParticipantAp {
                id: participant,
                amount,
            },
        )
    }

    /// Apply any session action. The typed methods above all go through
    /// here.
    pub fn mutate_session(&mut self, id: SessionId, action: SessionAction) -> CoreResult<SessionRecord> {
        let mut record = self.session(id)?;
        let label = action.to_string();
        record.session = record.session.apply(action).inspect_err(|e| {
            tracing::debug!(session = %id, action = %label, code = e.code(), "session action rejected");
        })?;
        tracing::debug!(session = %id, action = %label, round = record.session.round(), "session action applied");
        self.store_session(record)
    }

    fn store_session(&mut self, mut record: SessionRecord) -> CoreResult<SessionRecord> {
        record.updated_at = Utc::now();
        self.repo.put_session(record.clone())?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryRepository;
    use vk_combat::CombatPhase;
    use vk_rules::data::preset;
    use vk_rules::{Attribute, CharacterBuild, OwnedPerk, Skill, Special};

    fn vault() -> Vault<MemoryRepository> {
        Vault::new(MemoryRepository::new(), preset::core(), VaultConfig::default())
    }

    fn wanderer_build() -> CharacterBuild {
        let mut build = CharacterBuild {
            special: Special {
                strength: 7,
                endurance: 7,
                luck: 6,
                ..Special::default()
            },
            ..CharacterBuild::default()
        };
        for (skill, rank) in [
            (Skill::SmallGuns, 4),
            (Skill::Sneak, 4),
            (Skill::Medicine, 2),
            (Skill::Athletics, 5),
            (Skill::Repair, 5),
        ] {
            build.skills.set(skill, rank);
        }
        build.tag_skills = [Skill::SmallGuns, Skill::Sneak, Skill::Medicine].into();
        build
    }

    fn create(vault: &mut Vault<MemoryRepository>, name: &str, kind: CharacterKind) -> Character {
        vault
            .create_character(CharacterDraft::new(name, kind).with_build(wanderer_build()))
            .unwrap()
            .record
    }

    #[test]
    fn create_derives_stats_and_reports_warnings() {
        let mut vault = vault();
        let saved = vault
            .create_character(CharacterDraft::new("Lone", CharacterKind::Pc))
            .unwrap();
        assert_eq!(saved.record.stats.max_hp, 10);
        assert!(saved.warnings.iter().any(|w| w.code == "attribute_underspent"));

        let full = create(&mut vault, "Wanderer", CharacterKind::Pc);
        assert_eq!(full.stats.max_hp, 13);
        assert_eq!(full.current_hp, 13);
    }

    #[test]
    fn invalid_build_is_not_stored() {
        let mut vault = vault();
        let mut build = wanderer_build();
        build.special.strength = 10;
        let err = vault
            .create_character(CharacterDraft::new("Cheater", CharacterKind::Pc).with_build(build))
            .unwrap_err();
        assert_eq!(err.code(), "invalid_build");
        assert!(vault.characters(None).unwrap().is_empty());
    }

    #[test]
    fn perks_with_unmet_prerequisites_are_not_stored() {
        let mut vault = vault();
        let mut build = wanderer_build();
        build.special.strength = 5;
        build.special.endurance = 9;
        build.perks = vec![OwnedPerk::new("big_leagues", 1)];
        let err = vault
            .create_character(CharacterDraft::new("Slugger", CharacterKind::Pc).with_build(build.clone()))
            .unwrap_err();
        assert_eq!(err.code(), "invalid_build");
        assert!(vault.characters(None).unwrap().is_empty());

        let stored = create(&mut vault, "Wanderer", CharacterKind::Pc);
        let patch = CharacterPatch {
            build: Some(build),
            ..CharacterPatch::default()
        };
        let err = vault.update_character(stored.id, &patch).unwrap_err();
        assert_eq!(err.code(), "invalid_build");
        assert!(vault.character(stored.id).unwrap().build.perks.is_empty());
    }

    #[test]
    fn npc_cannot_have_origin() {
        let mut vault = vault();
        let build = CharacterBuild {
            origin: Some("survivor".to_string()),
            ..CharacterBuild::default()
        };
        let err = vault
            .create_character(CharacterDraft::new("Raider", CharacterKind::Npc).with_build(build))
            .unwrap_err();
        assert_eq!(err.code(), "npc_with_origin");
    }

    #[test]
    fn rejected_build_action_leaves_record() {
        let mut vault = vault();
        let c = create(&mut vault, "Wanderer", CharacterKind::Pc);
        let err = vault
            .apply_build_action(
                c.id,
                &BuildAction::SetAttribute {
                    attribute: Attribute::Agility,
                    value: 9,
                },
            )
            .unwrap_err();
        assert_eq!(err.code(), "attribute_overspent");
        assert_eq!(vault.character(c.id).unwrap(), c);
    }

    #[test]
    fn build_action_rederives() {
        let mut vault = vault();
        let c = create(&mut vault, "Wanderer", CharacterKind::Pc);
        let saved = vault
            .apply_build_action(c.id, &BuildAction::SetLevel { level: 5 })
            .unwrap();
        assert_eq!(saved.record.stats.max_hp, 17);
        assert!(saved.warnings.iter().any(|w| w.code == "perk_choices_unspent"));
    }

    #[test]
    fn update_clamps_current_hp() {
        let mut vault = vault();
        let c = create(&mut vault, "Wanderer", CharacterKind::Pc);
        let patch = CharacterPatch {
            current_hp: Some(500),
            caps: Some(25),
            ..CharacterPatch::default()
        };
        let saved = vault.update_character(c.id, &patch).unwrap().record;
        assert_eq!(saved.current_hp, saved.stats.max_hp);
        assert_eq!(saved.caps, 25);
        assert!(saved.updated_at >= c.updated_at);
    }

    #[test]
    fn list_filters_by_kind() {
        let mut vault = vault();
        create(&mut vault, "Pc", CharacterKind::Pc);
        create(&mut vault, "Npc", CharacterKind::Npc);
        assert_eq!(vault.characters(None).unwrap().len(), 2);
        let npcs = vault.characters(Some(CharacterKind::Npc)).unwrap();
        assert_eq!(npcs.len(), 1);
        assert_eq!(npcs[0].name, "Npc");
    }

    #[test]
    fn duplicate_and_delete() {
        let mut vault = vault();
        let c = create(&mut vault, "Wanderer", CharacterKind::Pc);
        let copy = vault.duplicate_character(c.id, None).unwrap();
        assert_ne!(copy.id, c.id);
        assert_eq!(copy.name, "Wanderer (copy)");
        assert_eq!(copy.build, c.build);

        vault.delete_character(c.id).unwrap();
        assert_eq!(vault.character(c.id).unwrap_err().code(), "character_not_found");
        assert_eq!(vault.find_character("wanderer (copy)").unwrap().id, copy.id);
    }

    #[test]
    fn available_perks_for_character() {
        let mut vault = vault();
        let c = create(&mut vault, "Wanderer", CharacterKind::Pc);
        let choices = vault.character_available_perks(c.id).unwrap();
        assert!(choices.iter().any(|p| p.perk.id == "toughness"));
        assert!(choices.iter().all(|p| p.perk.id != "tag"));
        assert_eq!(vault.perk("nope").unwrap_err().code(), "unknown_perk");
    }

    #[test]
    fn session_combat_flow() {
        let mut vault = vault();
        let c = create(&mut vault, "Wanderer", CharacterKind::Pc);
        let session = vault.create_session("Corvega").unwrap();

        let (_, hero) = vault.add_participant(session.id, c.id).unwrap();
        let (_, raider) = vault
            .add_quick_npc(session.id, QuickNpc::new("Raider", 8))
            .unwrap();
        assert_eq!(
            vault.add_participant(session.id, c.id).unwrap_err().code(),
            "already_in_session"
        );

        vault.set_initiative(session.id, hero, 12).unwrap();
        vault.set_initiative(session.id, raider, 15).unwrap();
        let record = vault.start_combat(session.id).unwrap();
        assert_eq!(record.session.phase(), CombatPhase::Active);
        assert_eq!(record.session.current_participant().unwrap().id, raider);

        let record = vault.next_turn(session.id).unwrap();
        assert_eq!(record.session.current_participant().unwrap().id, hero);

        vault.apply_damage(session.id, raider, 8).unwrap();
        let record = vault.session(session.id).unwrap();
        assert_eq!(
            record.session.participant(raider).unwrap().status,
            CombatStatus::Unconscious
        );

        vault.update_group_ap(session.id, Some(4), None).unwrap();
        let record = vault.update_gm_ap(session.id, 3).unwrap();
        assert_eq!(record.session.group_ap().current(), 4);
        assert_eq!(record.session.gm_ap().current(), 3);

        let record = vault.end_combat(session.id).unwrap();
        assert!(record.session.combatant_ids().is_empty());
    }

    #[test]
    fn rejected_session_action_leaves_record() {
        let mut vault = vault();
        let session = vault.create_session("Empty").unwrap();
        assert_eq!(
            vault.start_combat(session.id).unwrap_err().code(),
            "no_participants"
        );
        assert_eq!(vault.session(session.id).unwrap(), session);
    }

    #[test]
    fn combat_does_not_touch_character() {
        let mut vault = vault();
        let c = create(&mut vault, "Wanderer", CharacterKind::Pc);
        let session = vault.create_session("Lexington").unwrap();
        let (_, hero) = vault.add_participant(session.id, c.id).unwrap();
        vault.apply_damage(session.id, hero, 5).unwrap();
        assert_eq!(vault.character(c.id).unwrap().current_hp, c.current_hp);
    }

    #[test]
    fn update_and_find_session() {
        let mut vault = vault();
        let session = vault.create_session("Sanctuary").unwrap();
        let patch = SessionPatch {
            name: Some("Red Rocket".to_string()),
            status: Some(vk_combat::SessionStatus::Completed),
        };
        vault.update_session(session.id, &patch).unwrap();
        let found = vault.find_session("red rocket").unwrap();
        assert_eq!(found.session.status, vk_combat::SessionStatus::Completed);

        let (_, id) = vault
            .add_quick_npc(session.id, QuickNpc::new("Mirelurk", 12))
            .unwrap();
        assert_eq!(vault.find_participant(session.id, "mirelurk").unwrap(), id);

        vault.delete_session(session.id).unwrap();
        assert!(vault.sessions().unwrap().is_empty());
    }
}
