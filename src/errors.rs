use crate::battle::state::ParticipantId;

/// Main error type for the rules engine.
///
/// Every failure that can happen during normal play is returned as one of
/// these values. The engine validates an action completely before touching
/// any state, so receiving an error means nothing was mutated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// An action referenced a participant id that is not in the battle
    #[error("invalid participant {id}: {reason}")]
    InvalidParticipant { id: ParticipantId, reason: String },

    /// The target exists but cannot be affected by this action
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// Not enough MP, items or other consumables
    #[error("insufficient resource: {0}")]
    InsufficientResource(String),

    /// A load-bearing collaborator or data record is missing
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    /// A session could not be built from the given input
    #[error("cannot construct session: {0}")]
    ConstructionError(String),

    /// An action was attempted on a session that is not running
    #[error("battle is not active")]
    SessionInactive,

    /// `start` was called on a session that is already running
    #[error("battle is already active: {0}")]
    SessionAlreadyActive(String),

    /// The spellcasting collaborator refused the cast
    #[error("spell failed: {0}")]
    SpellFailed(String),

    /// Configuration text could not be read or parsed
    #[error("configuration error: {0}")]
    Config(String),
}

impl EngineError {
    pub fn invalid_participant(id: ParticipantId, reason: impl Into<String>) -> Self {
        EngineError::InvalidParticipant {
            id,
            reason: reason.into(),
        }
    }

    /// The human-readable reason without the variant prefix.
    pub fn reason(&self) -> String {
        match self {
            EngineError::InvalidParticipant { reason, .. } => reason.clone(),
            EngineError::InvalidTarget(reason)
            | EngineError::InsufficientResource(reason)
            | EngineError::DataUnavailable(reason)
            | EngineError::ConstructionError(reason)
            | EngineError::SessionAlreadyActive(reason)
            | EngineError::SpellFailed(reason)
            | EngineError::Config(reason) => reason.clone(),
            EngineError::SessionInactive => "battle is not active".to_string(),
        }
    }
}

/// Type alias for Results using EngineError
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_reason() {
        let err = EngineError::InsufficientResource("needs 12 MP, has 4".to_string());
        assert_eq!(err.to_string(), "insufficient resource: needs 12 MP, has 4");
        assert_eq!(err.reason(), "needs 12 MP, has 4");
    }

    #[test]
    fn test_invalid_participant_mentions_id() {
        let err = EngineError::invalid_participant(ParticipantId(7), "not in this battle");
        assert_eq!(err.to_string(), "invalid participant #7: not in this battle");
    }
}
