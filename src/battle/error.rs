use thiserror::Error;

use crate::battle::effect::EffectId;

/// Fatal conditions that abort a battle run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleError {
    #[error("effect '{effect}' is not registered with this engine")]
    UnregisteredEffect { effect: EffectId },
}

pub type Result<T> = std::result::Result<T, BattleError>;
