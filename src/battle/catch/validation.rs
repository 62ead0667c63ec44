use crate::battle::session::CombatSession;
use crate::battle::state::ParticipantId;
use crate::errors::{EngineError, EngineResult};

/// A capture attempt that passed every check. Nothing has been mutated yet.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureTarget {
    pub user: usize,
    pub target: usize,
    /// The capture item and the bonus it grants once consumed.
    pub item: Option<(String, i32)>,
}

impl CombatSession {
    /// Check that `user` may try to capture `target` with `item`.
    pub(crate) fn validate_capture(
        &self,
        user: ParticipantId,
        target: ParticipantId,
        item: Option<&str>,
    ) -> EngineResult<CaptureTarget> {
        self.ensure_active()?;
        let user_index = self.acting_index(user)?;
        let target_index = self.target_index(user_index, target)?;

        let thrower = &self.participants[user_index];
        let quarry = &self.participants[target_index];
        if quarry.side == thrower.side {
            return Err(EngineError::InvalidTarget(format!(
                "{} is on the same side as {}",
                quarry.name(),
                thrower.name()
            )));
        }
        match quarry.actor().as_creature() {
            Some(creature) if creature.wild => {}
            Some(creature) => {
                return Err(EngineError::InvalidTarget(format!(
                    "{} already belongs to someone",
                    creature.display_name()
                )))
            }
            None => {
                return Err(EngineError::InvalidTarget(format!(
                    "{} is not a creature",
                    quarry.name()
                )))
            }
        }

        let item = match item {
            Some(item) => Some((item.to_string(), self.capture_item_bonus(item)?)),
            None => None,
        };

        Ok(CaptureTarget {
            user: user_index,
            target: target_index,
            item,
        })
    }

    fn capture_item_bonus(&self, item: &str) -> EngineResult<i32> {
        let Some(inventory) = self.services.inventory.as_ref() else {
            return Err(EngineError::DataUnavailable(format!(
                "no inventory to take {} from",
                item
            )));
        };
        if inventory.quantity(item) == 0 {
            return Err(EngineError::InsufficientResource(format!("no {} left", item)));
        }
        inventory
            .capture_bonus(item)
            .or_else(|| self.config.capture.item_bonuses.get(item).copied())
            .ok_or_else(|| EngineError::InvalidTarget(format!("{} is not a capture item", item)))
    }
}
