pub mod attack;
pub mod awakening;
pub mod curves;
pub mod effect;
pub mod effectiveness;
pub mod element;
pub mod engine;
pub mod error;
pub mod rng;
pub mod sheet;
pub mod skill;
pub mod state;
pub mod trace;

pub use attack::{execute_attack, execute_attack_with_ratio, BASE_DAMAGE_RATIO};
pub use awakening::Awakening;
pub use curves::{
    attackable_check, defensable_check, less_attackable_check, less_defensable_check,
    neutral_check, CheckCurve,
};
pub use effect::{
    EffectContext, EffectId, EffectKind, EffectRegistry, EffectRegistryBuilder, FnEffect,
    SkillEffect, StateUpdate,
};
pub use effectiveness::effectiveness_multiplier;
pub use element::{
    builtin_element_multiplier, element_multiplier, Element, ElementRelation, ElementRelations,
};
pub use engine::{
    judge, BattleConfig, BattleEngine, BattleOutcome, BattleResult, ResolvedEffect, TurnRecord,
    DEFAULT_MAX_TURNS,
};
pub use error::BattleError;
pub use rng::{DrawSource, Rng, ScriptedDraws};
pub use sheet::{AppliedEffect, CharacterSheet, Skill, MAX_FATIGUE};
pub use skill::{
    execute_active_skills, execute_passive_skills, skill_success_rate, ActiveSkillOutcome,
    CooldownTransition, ExecutedSkill, PassiveSkillOutcome,
};
pub use state::{max_hp_at, recalculate, CharacterState, EffectApplication, Side};
pub use trace::{TraceCollector, TraceMode};
