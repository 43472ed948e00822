//! Turn pipeline. Every turn runs the same phases in a fixed order:
//!
//! 1. active skills, hero on enemy then enemy on hero
//! 2. both states rebuilt from their sheets and statuses
//! 3. attacks (an unprotected strike when the hero is already down)
//! 4. hero passives, then damage folded into both totals
//! 5. status durations tick down
//!
//! The battle ends as soon as either side is defeated, or in a draw after `max_turns`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::battle::attack::{execute_attack_with_ratio, BASE_DAMAGE_RATIO};
use crate::battle::effect::{EffectId, EffectRegistry, StateUpdate};
use crate::battle::element::ElementRelations;
use crate::battle::error::Result;
use crate::battle::rng::{DrawSource, Rng};
use crate::battle::sheet::CharacterSheet;
use crate::battle::skill::{execute_active_skills, execute_passive_skills, ExecutedSkill};
use crate::battle::state::{recalculate, CharacterState, EffectApplication, Side};
use crate::battle::trace::{TraceCollector, TraceMode};

pub const DEFAULT_MAX_TURNS: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BattleResult {
    Victory,
    Lose,
    MutualStrike,
    Draw,
}

impl BattleResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Victory => "victory",
            Self::Lose => "lose",
            Self::MutualStrike => "mutual-strike",
            Self::Draw => "draw",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    pub max_turns: u32,
    pub base_damage_ratio: f64,
    pub element_relations: ElementRelations,
    pub trace_mode: TraceMode,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            base_damage_ratio: BASE_DAMAGE_RATIO,
            element_relations: ElementRelations::builtin(),
            trace_mode: TraceMode::Off,
        }
    }
}

/// An effect that changed a combatant's state while it was being rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEffect {
    pub target: Side,
    pub effect: EffectId,
    pub update: StateUpdate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub turn: u32,
    /// States after teardown; the next turn starts from these.
    pub hero_state: CharacterState,
    pub enemy_state: CharacterState,
    /// Damage the hero dealt. `None` when the hero did not attack.
    pub damage_dealt: Option<i64>,
    /// Damage the hero took. `None` when the enemy did not attack.
    pub damage_received: Option<i64>,
    pub executed_skills: Vec<ExecutedSkill>,
    pub resolved_effects: Vec<ResolvedEffect>,
    pub unprotected_strike: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleOutcome {
    pub result: BattleResult,
    pub turns: Vec<TurnRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<String>,
}

impl BattleOutcome {
    pub fn turn_count(&self) -> u32 {
        self.turns.last().map_or(0, |record| record.turn)
    }

    pub fn last_turn(&self) -> Option<&TurnRecord> {
        self.turns.last()
    }
}

#[derive(Debug, Clone)]
pub struct BattleEngine {
    config: BattleConfig,
    registry: Arc<EffectRegistry>,
}

impl BattleEngine {
    pub fn new(config: BattleConfig, registry: impl Into<Arc<EffectRegistry>>) -> Self {
        Self {
            config,
            registry: registry.into(),
        }
    }

    /// Default configuration with the standard effect library.
    pub fn standard() -> Self {
        Self::new(BattleConfig::default(), EffectRegistry::standard())
    }

    pub fn with_trace_mode(mut self, trace_mode: TraceMode) -> Self {
        self.config.trace_mode = trace_mode;
        self
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }

    /// Fight with a freshly seeded generator.
    pub fn run(&self, hero: &CharacterSheet, enemy: &CharacterSheet) -> Result<BattleOutcome> {
        self.run_battle(hero, enemy, &mut Rng::from_entropy())
    }

    pub fn run_seeded(
        &self,
        hero: &CharacterSheet,
        enemy: &CharacterSheet,
        seed: u64,
    ) -> Result<BattleOutcome> {
        self.run_battle(hero, enemy, &mut Rng::new(seed))
    }

    pub fn run_battle<D: DrawSource + ?Sized>(
        &self,
        hero: &CharacterSheet,
        enemy: &CharacterSheet,
        draws: &mut D,
    ) -> Result<BattleOutcome> {
        let mut trace = TraceCollector::new(self.config.trace_mode);
        let mut hero_state = CharacterState::initial(hero);
        let mut enemy_state = CharacterState::initial(enemy);
        let mut turns = Vec::new();

        for turn in 1..=self.config.max_turns {
            let record = self.resolve_turn(turn, &hero_state, &enemy_state, draws, &mut trace)?;
            hero_state = record.hero_state.clone();
            enemy_state = record.enemy_state.clone();
            turns.push(record);

            if let Some(result) = judge(&hero_state, &enemy_state) {
                trace.record(|| verdict_line(result).to_string());
                return Ok(BattleOutcome {
                    result,
                    turns,
                    trace: trace.into_lines(),
                });
            }
        }

        trace.record(|| format!("Draw after {} turns", self.config.max_turns));
        Ok(BattleOutcome {
            result: BattleResult::Draw,
            turns,
            trace: trace.into_lines(),
        })
    }

    /// Resolve a single turn from the given pre-turn states.
    pub fn run_turn<D: DrawSource + ?Sized>(
        &self,
        turn: u32,
        hero: &CharacterState,
        enemy: &CharacterState,
        draws: &mut D,
    ) -> Result<TurnRecord> {
        let mut trace = TraceCollector::new(TraceMode::Off);
        self.resolve_turn(turn, hero, enemy, draws, &mut trace)
    }

    fn resolve_turn<D: DrawSource + ?Sized>(
        &self,
        turn: u32,
        hero: &CharacterState,
        enemy: &CharacterState,
        draws: &mut D,
        trace: &mut TraceCollector,
    ) -> Result<TurnRecord> {
        let registry = self.registry.as_ref();
        trace.record(|| format!("Turn {turn} starts"));

        let hero_cast = execute_active_skills(hero, Side::Hero, enemy, registry, turn, draws)?;
        let mut enemy_cast_ready = hero_cast.target;
        let enemy_cast =
            execute_active_skills(&enemy_cast_ready, Side::Enemy, hero, registry, turn, draws)?;
        enemy_cast_ready.apply_cooldowns(&enemy_cast.cooldowns);
        let mut hero_cast_ready = enemy_cast.target;
        hero_cast_ready.apply_cooldowns(&hero_cast.cooldowns);

        let mut executed_skills = hero_cast.executed;
        executed_skills.extend(enemy_cast.executed);
        for skill in &executed_skills {
            trace.record(|| {
                format!(
                    "{} casts {} on {} ({})",
                    skill.caster,
                    skill.name,
                    skill.caster.opponent(),
                    skill.effect
                )
            });
        }

        let (mut hero_now, hero_effects) = recalculate(&hero_cast_ready, registry, turn)?;
        let (mut enemy_now, enemy_effects) = recalculate(&enemy_cast_ready, registry, turn)?;
        let resolved_effects: Vec<ResolvedEffect> = tag_effects(Side::Hero, hero_effects)
            .chain(tag_effects(Side::Enemy, enemy_effects))
            .collect();
        for resolved in &resolved_effects {
            let label = registry
                .get(resolved.effect)
                .map_or(resolved.effect.as_str(), |effect| effect.label());
            trace.record(|| format!("{} is affected by {label}", resolved.target));
        }
        trace.record(|| format!("Hero {hero_now}"));
        trace.record(|| format!("Enemy {enemy_now}"));

        let hero_down = hero_now.is_defeated();
        let enemy_down = enemy_now.is_defeated();
        let unprotected_strike = hero_down && !enemy_down;

        let damage_dealt = (!hero_down && !enemy_down).then(|| self.attack(&hero_now, &enemy_now));
        let damage_received = (!enemy_down).then(|| {
            if unprotected_strike {
                let mut downed = hero_now.clone();
                downed.intelligence = 0;
                self.attack(&enemy_now, &downed)
            } else {
                self.attack(&enemy_now, &hero_now)
            }
        });

        if hero_down {
            if let Some(damage) = damage_received {
                trace.record(|| format!("Enemy strikes the fallen hero for {damage}"));
            }
            hero_now.tick_effects();
            enemy_now.tick_effects();
            return Ok(TurnRecord {
                turn,
                hero_state: hero_now,
                enemy_state: enemy_now,
                damage_dealt,
                damage_received,
                executed_skills,
                resolved_effects,
                unprotected_strike,
            });
        }

        let passive = execute_passive_skills(
            &hero_now,
            Side::Hero,
            damage_dealt,
            damage_received,
            registry,
            turn,
        )?;
        for skill in &passive.executed {
            trace.record(|| format!("Hero triggers {} ({})", skill.name, skill.effect));
        }
        hero_now = passive.state;
        hero_now.apply_cooldowns(&passive.cooldowns);
        executed_skills.extend(passive.executed);
        let damage_dealt = passive.damage_dealt;
        let damage_received = passive.damage_received;

        if let Some(damage) = damage_received {
            hero_now.total_damage += damage;
            trace.record(|| format!("Hero takes {damage} damage, {hero_now}"));
        }
        if let Some(damage) = damage_dealt {
            enemy_now.total_damage += damage;
            trace.record(|| format!("Enemy takes {damage} damage, {enemy_now}"));
        }

        hero_now.tick_effects();
        enemy_now.tick_effects();

        Ok(TurnRecord {
            turn,
            hero_state: hero_now,
            enemy_state: enemy_now,
            damage_dealt,
            damage_received,
            executed_skills,
            resolved_effects,
            unprotected_strike,
        })
    }

    fn attack(&self, attacker: &CharacterState, defender: &CharacterState) -> i64 {
        execute_attack_with_ratio(
            attacker,
            defender,
            &self.config.element_relations,
            self.config.base_damage_ratio,
        )
    }
}

/// Result once either side is down after a turn, `None` while both stand.
pub fn judge(hero: &CharacterState, enemy: &CharacterState) -> Option<BattleResult> {
    match (hero.is_defeated(), enemy.is_defeated()) {
        (true, true) => Some(BattleResult::MutualStrike),
        (false, true) => Some(BattleResult::Victory),
        (true, false) => Some(BattleResult::Lose),
        (false, false) => None,
    }
}

fn verdict_line(result: BattleResult) -> &'static str {
    match result {
        BattleResult::Victory => "Hero wins!",
        BattleResult::Lose => "Enemy wins!",
        BattleResult::MutualStrike => "Both sides fall!",
        BattleResult::Draw => "Draw!",
    }
}

fn tag_effects(
    target: Side,
    applications: Vec<EffectApplication>,
) -> impl Iterator<Item = ResolvedEffect> {
    applications
        .into_iter()
        .map(move |application| ResolvedEffect {
            target,
            effect: application.effect,
            update: application.update,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::element::Element;
    use crate::battle::rng::ScriptedDraws;

    fn fighter(vitality: u32) -> CharacterSheet {
        CharacterSheet::new("fighter", Element::Fire, vitality, 50, 50)
    }

    #[test]
    fn judge_covers_every_combination() {
        let standing = CharacterState::initial(&fighter(100));
        let mut down = standing.clone();
        down.total_damage = 100;
        assert_eq!(judge(&standing, &standing), None);
        assert_eq!(judge(&standing, &down), Some(BattleResult::Victory));
        assert_eq!(judge(&down, &standing), Some(BattleResult::Lose));
        assert_eq!(judge(&down, &down), Some(BattleResult::MutualStrike));
    }

    #[test]
    fn even_fight_ends_in_mutual_strike() {
        let engine = BattleEngine::standard();
        let outcome = engine
            .run_battle(&fighter(100), &fighter(100), &mut ScriptedDraws::constant(0.5))
            .expect("battle");
        assert_eq!(outcome.result, BattleResult::MutualStrike);
        assert_eq!(outcome.turn_count(), 5);
        assert!(outcome.turns.iter().all(|t| t.damage_dealt == Some(20)));
    }

    #[test]
    fn turn_cap_yields_draw() {
        let config = BattleConfig {
            max_turns: 2,
            ..BattleConfig::default()
        };
        let engine = BattleEngine::new(config, EffectRegistry::standard());
        let outcome = engine
            .run_battle(&fighter(1000), &fighter(1000), &mut ScriptedDraws::constant(0.5))
            .expect("battle");
        assert_eq!(outcome.result, BattleResult::Draw);
        assert_eq!(outcome.turns.len(), 2);
    }

    #[test]
    fn base_damage_ratio_is_configurable() {
        let config = BattleConfig {
            base_damage_ratio: 0.5,
            ..BattleConfig::default()
        };
        let engine = BattleEngine::new(config, EffectRegistry::standard());
        let outcome = engine
            .run_battle(&fighter(100), &fighter(100), &mut ScriptedDraws::constant(0.5))
            .expect("battle");
        assert_eq!(outcome.result, BattleResult::MutualStrike);
        assert_eq!(outcome.turn_count(), 2);
    }

    #[test]
    fn config_round_trips_through_yaml_defaults() {
        let config: BattleConfig = serde_yaml::from_str("max_turns: 3\n").expect("config");
        assert_eq!(config.max_turns, 3);
        assert_eq!(config.base_damage_ratio, BASE_DAMAGE_RATIO);
        assert_eq!(config.element_relations, ElementRelations::builtin());
        assert_eq!(config.trace_mode, TraceMode::Off);
    }
}
