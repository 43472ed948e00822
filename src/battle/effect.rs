//! Skill effects: what a skill or status actually does to a combatant.
//!
//! Effects are looked up by [EffectId] in an [EffectRegistry] that is built once and handed to
//! the engine. An effect returns a sparse [StateUpdate] that the caller merges onto the state.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::battle::error::{BattleError, Result};
use crate::battle::state::CharacterState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EffectId {
    Poison,
    IntelligenceDown,
    SpiritDown,
    Heal,
    Focus,
}

impl EffectId {
    pub const ALL: [EffectId; 5] = [
        EffectId::Poison,
        EffectId::IntelligenceDown,
        EffectId::SpiritDown,
        EffectId::Heal,
        EffectId::Focus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Poison => "poison",
            Self::IntelligenceDown => "intelligence-down",
            Self::SpiritDown => "spirit-down",
            Self::Heal => "heal",
            Self::Focus => "focus",
        }
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Active effects are cast on the opponent as a status; passive effects act on their owner
/// after the owner attacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    Active,
    Passive,
}

/// Sparse override produced by an effect. `None` leaves the field untouched.
///
/// The damage fields only matter to passive effects, which may rewrite this turn's
/// damage-dealt and damage-received figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_damage: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intelligence: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spirit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_dealt: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_received: Option<i64>,
}

impl StateUpdate {
    pub fn total_damage(value: i64) -> Self {
        Self {
            total_damage: Some(value),
            ..Self::default()
        }
    }

    pub fn intelligence(value: u32) -> Self {
        Self {
            intelligence: Some(value),
            ..Self::default()
        }
    }

    pub fn spirit(value: u32) -> Self {
        Self {
            spirit: Some(value),
            ..Self::default()
        }
    }

    pub fn damage_dealt(value: i64) -> Self {
        Self {
            damage_dealt: Some(value),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// What an effect sees when it is applied.
#[derive(Debug, Clone, Copy)]
pub struct EffectContext<'a> {
    pub state: &'a CharacterState,
    /// Damage the owner dealt this turn. Only set for passive effects.
    pub damage_dealt: Option<i64>,
}

impl<'a> EffectContext<'a> {
    pub fn status(state: &'a CharacterState) -> Self {
        Self {
            state,
            damage_dealt: None,
        }
    }

    pub fn passive(state: &'a CharacterState, damage_dealt: Option<i64>) -> Self {
        Self {
            state,
            damage_dealt,
        }
    }
}

pub trait SkillEffect: fmt::Debug + Send + Sync {
    fn kind(&self) -> EffectKind;

    /// Human-readable label used in progress lines.
    fn label(&self) -> &str;

    /// `None` means the effect declines to act this time.
    fn apply(&self, ctx: &EffectContext<'_>) -> Option<StateUpdate>;
}

/// Deals a share of max HP as damage each turn the status is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Poison {
    pub max_hp_ratio: f64,
}

impl Default for Poison {
    fn default() -> Self {
        Self { max_hp_ratio: 0.1 }
    }
}

impl SkillEffect for Poison {
    fn kind(&self) -> EffectKind {
        EffectKind::Active
    }

    fn label(&self) -> &str {
        "poison damage"
    }

    fn apply(&self, ctx: &EffectContext<'_>) -> Option<StateUpdate> {
        let damage = (ctx.state.max_hp as f64 * self.max_hp_ratio).floor() as i64;
        Some(StateUpdate::total_damage(ctx.state.total_damage + damage))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntelligenceDown {
    pub factor: f64,
}

impl Default for IntelligenceDown {
    fn default() -> Self {
        Self { factor: 0.5 }
    }
}

impl SkillEffect for IntelligenceDown {
    fn kind(&self) -> EffectKind {
        EffectKind::Active
    }

    fn label(&self) -> &str {
        "intelligence down"
    }

    fn apply(&self, ctx: &EffectContext<'_>) -> Option<StateUpdate> {
        Some(StateUpdate::intelligence(scale_stat(ctx.state.intelligence, self.factor)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpiritDown {
    pub factor: f64,
}

impl Default for SpiritDown {
    fn default() -> Self {
        Self { factor: 0.5 }
    }
}

impl SkillEffect for SpiritDown {
    fn kind(&self) -> EffectKind {
        EffectKind::Active
    }

    fn label(&self) -> &str {
        "spirit down"
    }

    fn apply(&self, ctx: &EffectContext<'_>) -> Option<StateUpdate> {
        Some(StateUpdate::spirit(scale_stat(ctx.state.spirit, self.factor)))
    }
}

/// Wipes all accumulated damage.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Heal;

impl SkillEffect for Heal {
    fn kind(&self) -> EffectKind {
        EffectKind::Passive
    }

    fn label(&self) -> &str {
        "full heal"
    }

    fn apply(&self, _ctx: &EffectContext<'_>) -> Option<StateUpdate> {
        Some(StateUpdate::total_damage(0))
    }
}

/// Scales this turn's outgoing damage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Focus {
    pub multiplier: f64,
}

impl Default for Focus {
    fn default() -> Self {
        Self { multiplier: 1.5 }
    }
}

impl SkillEffect for Focus {
    fn kind(&self) -> EffectKind {
        EffectKind::Passive
    }

    fn label(&self) -> &str {
        "focused strike"
    }

    fn apply(&self, ctx: &EffectContext<'_>) -> Option<StateUpdate> {
        let dealt = ctx.damage_dealt?;
        Some(StateUpdate::damage_dealt(
            (dealt as f64 * self.multiplier).floor() as i64,
        ))
    }
}

/// Effect backed by a closure, for behaviour that does not warrant its own type.
pub struct FnEffect<F> {
    kind: EffectKind,
    label: String,
    apply: F,
}

impl<F> FnEffect<F>
where
    F: Fn(&EffectContext<'_>) -> Option<StateUpdate> + Send + Sync,
{
    pub fn new(kind: EffectKind, label: impl Into<String>, apply: F) -> Self {
        Self {
            kind,
            label: label.into(),
            apply,
        }
    }
}

impl<F> fmt::Debug for FnEffect<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnEffect")
            .field("kind", &self.kind)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl<F> SkillEffect for FnEffect<F>
where
    F: Fn(&EffectContext<'_>) -> Option<StateUpdate> + Send + Sync,
{
    fn kind(&self) -> EffectKind {
        self.kind
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn apply(&self, ctx: &EffectContext<'_>) -> Option<StateUpdate> {
        (self.apply)(ctx)
    }
}

fn scale_stat(value: u32, factor: f64) -> u32 {
    (f64::from(value) * factor).floor().max(0.0) as u32
}

/// Immutable effect lookup table. Cheap to clone; share one across engines and threads.
#[derive(Debug, Clone, Default)]
pub struct EffectRegistry {
    effects: HashMap<EffectId, Arc<dyn SkillEffect>>,
}

impl EffectRegistry {
    pub fn builder() -> EffectRegistryBuilder {
        EffectRegistryBuilder::default()
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Poison, intelligence-down and spirit-down (active); heal and focus (passive).
    pub fn standard() -> Self {
        Self::builder()
            .register(EffectId::Poison, Poison::default())
            .register(EffectId::IntelligenceDown, IntelligenceDown::default())
            .register(EffectId::SpiritDown, SpiritDown::default())
            .register(EffectId::Heal, Heal)
            .register(EffectId::Focus, Focus::default())
            .build()
    }

    pub fn get(&self, id: EffectId) -> Option<&dyn SkillEffect> {
        self.effects.get(&id).map(|effect| effect.as_ref())
    }

    /// Like [EffectRegistry::get], but a missing id is a configuration error.
    pub fn resolve(&self, id: EffectId) -> Result<&dyn SkillEffect> {
        self.get(id)
            .ok_or(BattleError::UnregisteredEffect { effect: id })
    }

    pub fn contains(&self, id: EffectId) -> bool {
        self.effects.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct EffectRegistryBuilder {
    effects: HashMap<EffectId, Arc<dyn SkillEffect>>,
}

impl EffectRegistryBuilder {
    /// Registers `effect` under `id`, replacing any earlier registration.
    pub fn register<E: SkillEffect + 'static>(mut self, id: EffectId, effect: E) -> Self {
        self.effects.insert(id, Arc::new(effect));
        self
    }

    pub fn register_shared(mut self, id: EffectId, effect: Arc<dyn SkillEffect>) -> Self {
        self.effects.insert(id, effect);
        self
    }

    pub fn build(self) -> EffectRegistry {
        EffectRegistry {
            effects: self.effects,
        }
    }
}
