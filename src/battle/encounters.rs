use crate::battle::session::CombatSession;
use crate::battle::state::Participant;
use crate::errors::{EngineError, EngineResult};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Combat sessions keyed by the owner of the encounter. An owner has at most
/// one active session at a time.
#[derive(Debug, Default)]
pub struct Encounters {
    sessions: HashMap<String, CombatSession>,
}

impl Encounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `session` for `owner`. A finished session for the same owner is
    /// replaced; an active one is an error and the new session is dropped.
    pub fn open(
        &mut self,
        owner: &str,
        mut session: CombatSession,
        participants: Vec<Participant>,
    ) -> EngineResult<&mut CombatSession> {
        if self.sessions.get(owner).is_some_and(CombatSession::is_active) {
            return Err(EngineError::SessionAlreadyActive(format!(
                "{} is already in a battle",
                owner
            )));
        }
        session.set_owner(owner);
        session.start(participants)?;
        tracing::debug!("Opened encounter for {}", owner);

        let slot = match self.sessions.entry(owner.to_string()) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(session);
                occupied.into_mut()
            }
            Entry::Vacant(vacant) => vacant.insert(session),
        };
        Ok(slot)
    }

    pub fn get(&self, owner: &str) -> Option<&CombatSession> {
        self.sessions.get(owner)
    }

    pub fn get_mut(&mut self, owner: &str) -> Option<&mut CombatSession> {
        self.sessions.get_mut(owner)
    }

    /// Remove and return the owner's session once it has ended. An active
    /// session stays registered.
    pub fn finish(&mut self, owner: &str) -> Option<CombatSession> {
        if self.sessions.get(owner)?.is_active() {
            return None;
        }
        self.sessions.remove(owner)
    }

    pub fn active_count(&self) -> usize {
        self.sessions.values().filter(|session| session.is_active()).count()
    }
}
