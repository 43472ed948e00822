//! Skill resolution. Active skills try to attach a status to the opponent; passive skills
//! rewrite their owner's state and this turn's damage figures after the owner attacks.
//!
//! Neither phase mutates skills in place: successful casts come back as
//! [CooldownTransition]s that the caller applies to the caster's state.

use serde::{Deserialize, Serialize};

use crate::battle::effect::{EffectContext, EffectId, EffectKind, EffectRegistry};
use crate::battle::error::Result;
use crate::battle::rng::DrawSource;
use crate::battle::sheet::AppliedEffect;
use crate::battle::state::{CharacterState, Side};

/// Turns a freshly cast status lasts.
pub const CAST_STATUS_DURATION: u32 = 1;

/// New cooldown expiry for the skill at `skill_index` in the caster's sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownTransition {
    pub skill_index: usize,
    pub cool_down_end_turn: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutedSkill {
    pub caster: Side,
    pub name: String,
    pub effect: EffectId,
    pub kind: EffectKind,
    /// Cooldown expiry after this cast.
    pub cool_down_end_turn: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSkillOutcome {
    /// Target with any new statuses attached.
    pub target: CharacterState,
    pub executed: Vec<ExecutedSkill>,
    pub cooldowns: Vec<CooldownTransition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PassiveSkillOutcome {
    pub state: CharacterState,
    pub damage_dealt: Option<i64>,
    pub damage_received: Option<i64>,
    pub executed: Vec<ExecutedSkill>,
    pub cooldowns: Vec<CooldownTransition>,
}

/// Chance that an active skill lands: `max(0, (i - s/2) / (i + 2s))`.
pub fn skill_success_rate(actor_intelligence: f64, target_spirit: f64) -> f64 {
    ((actor_intelligence - target_spirit / 2.0) / (actor_intelligence + target_spirit * 2.0))
        .max(0.0)
}

/// Roll every ready active skill of `actor` against `target`, one draw per skill in sheet order.
///
/// A non-stackable status the target already carries is not cast again and the skill keeps its
/// cooldown.
pub fn execute_active_skills<D: DrawSource + ?Sized>(
    actor: &CharacterState,
    caster: Side,
    target: &CharacterState,
    registry: &EffectRegistry,
    turn: u32,
    draws: &mut D,
) -> Result<ActiveSkillOutcome> {
    let success_rate =
        skill_success_rate(f64::from(actor.intelligence), f64::from(target.spirit));
    let mut target = target.clone();
    let mut executed = Vec::new();
    let mut cooldowns = Vec::new();

    for (skill_index, skill) in actor.sheet.skills.iter().enumerate() {
        if !skill.is_ready(turn) {
            continue;
        }
        let definition = registry.resolve(skill.effect)?;
        if definition.kind() != EffectKind::Active {
            continue;
        }
        if draws.next_draw() >= success_rate {
            continue;
        }
        if !skill.stackable && target.sheet.has_effect(skill.effect) {
            continue;
        }

        target.sheet.active_effects.push(AppliedEffect::new(
            skill.effect,
            CAST_STATUS_DURATION,
            skill.stackable,
        ));
        let cool_down_end_turn = turn.saturating_add(skill.cool_time);
        cooldowns.push(CooldownTransition {
            skill_index,
            cool_down_end_turn,
        });
        executed.push(ExecutedSkill {
            caster,
            name: skill.name.clone(),
            effect: skill.effect,
            kind: EffectKind::Active,
            cool_down_end_turn,
        });
    }

    Ok(ActiveSkillOutcome {
        target,
        executed,
        cooldowns,
    })
}

/// Fire every ready passive skill of `actor`. Nothing fires when the actor did not attack.
pub fn execute_passive_skills(
    actor: &CharacterState,
    caster: Side,
    damage_dealt: Option<i64>,
    damage_received: Option<i64>,
    registry: &EffectRegistry,
    turn: u32,
) -> Result<PassiveSkillOutcome> {
    let mut outcome = PassiveSkillOutcome {
        state: actor.clone(),
        damage_dealt,
        damage_received,
        executed: Vec::new(),
        cooldowns: Vec::new(),
    };
    if damage_dealt.is_none() {
        return Ok(outcome);
    }

    for (skill_index, skill) in actor.sheet.skills.iter().enumerate() {
        if !skill.is_ready(turn) {
            continue;
        }
        let definition = registry.resolve(skill.effect)?;
        if definition.kind() != EffectKind::Passive {
            continue;
        }
        let Some(update) = definition.apply(&EffectContext::passive(&outcome.state, damage_dealt))
        else {
            continue;
        };

        if update.damage_dealt.is_some() {
            outcome.damage_dealt = update.damage_dealt;
        }
        if update.damage_received.is_some() {
            outcome.damage_received = update.damage_received;
        }
        outcome.state.apply_update(&update);

        let cool_down_end_turn = turn.saturating_add(skill.cool_time);
        outcome.cooldowns.push(CooldownTransition {
            skill_index,
            cool_down_end_turn,
        });
        outcome.executed.push(ExecutedSkill {
            caster,
            name: skill.name.clone(),
            effect: skill.effect,
            kind: EffectKind::Passive,
            cool_down_end_turn,
        });
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::effect::{FnEffect, StateUpdate};
    use crate::battle::element::Element;
    use crate::battle::error::BattleError;
    use crate::battle::rng::ScriptedDraws;
    use crate::battle::sheet::{CharacterSheet, Skill};

    fn approx_eq(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() <= tol, "expected {b}, got {a}");
    }

    fn water_heroine() -> CharacterSheet {
        CharacterSheet::new("water_heroine", Element::Water, 400, 100, 40)
    }

    fn fire_heroine() -> CharacterSheet {
        CharacterSheet::new("fire_heroine", Element::Fire, 1000, 20, 60)
    }

    fn defenceless_target() -> CharacterState {
        let mut sheet = fire_heroine();
        sheet.spirit = 0;
        CharacterState::initial(&sheet.with_effect(AppliedEffect::new(EffectId::Poison, 1, false)))
    }

    #[test]
    fn success_rate_reference_values() {
        approx_eq(skill_success_rate(100.0, 0.0), 1.0, 1e-12);
        approx_eq(skill_success_rate(0.0, 100.0), 0.0, 1e-12);
        approx_eq(skill_success_rate(100.0, 100.0), 0.1667, 1e-3);
        assert_eq!(skill_success_rate(20.0, 60.0), 0.0);
    }

    #[test]
    fn active_skill_attaches_status_and_sets_cooldown() {
        let actor = CharacterState::initial(
            &water_heroine().with_skill(Skill::new("Confuse", EffectId::IntelligenceDown, 3)),
        );
        let mut draws = ScriptedDraws::constant(0.5);
        let outcome = execute_active_skills(
            &actor,
            Side::Hero,
            &defenceless_target(),
            &EffectRegistry::standard(),
            1,
            &mut draws,
        )
        .expect("active skills");

        assert_eq!(outcome.target.sheet.active_effects.len(), 2);
        assert_eq!(
            outcome.target.sheet.active_effects[1],
            AppliedEffect::new(EffectId::IntelligenceDown, 1, false)
        );
        assert_eq!(
            outcome.cooldowns,
            vec![CooldownTransition {
                skill_index: 0,
                cool_down_end_turn: 4
            }]
        );
        assert_eq!(outcome.executed[0].caster, Side::Hero);
        assert_eq!(outcome.executed[0].name, "Confuse");
        // the caster's sheet is untouched until the transition is applied
        assert_eq!(actor.sheet.skills[0].cool_down_end_turn, 0);
    }

    #[test]
    fn non_stackable_collision_is_a_no_op() {
        let actor = CharacterState::initial(
            &water_heroine().with_skill(Skill::new("Venom", EffectId::Poison, 1)),
        );
        let mut draws = ScriptedDraws::constant(0.0);
        let outcome = execute_active_skills(
            &actor,
            Side::Hero,
            &defenceless_target(),
            &EffectRegistry::standard(),
            1,
            &mut draws,
        )
        .expect("active skills");

        assert_eq!(outcome.target.sheet.effect_count(EffectId::Poison), 1);
        assert!(outcome.executed.is_empty());
        assert!(outcome.cooldowns.is_empty());
    }

    #[test]
    fn stackable_skill_adds_another_instance() {
        let actor = CharacterState::initial(
            &water_heroine().with_skill(Skill::new("Venom", EffectId::Poison, 1).stackable()),
        );
        let mut draws = ScriptedDraws::constant(0.0);
        let outcome = execute_active_skills(
            &actor,
            Side::Hero,
            &defenceless_target(),
            &EffectRegistry::standard(),
            1,
            &mut draws,
        )
        .expect("active skills");
        assert_eq!(outcome.target.sheet.effect_count(EffectId::Poison), 2);
    }

    #[test]
    fn second_non_stackable_cast_in_same_phase_collides_with_first() {
        let actor = CharacterState::initial(
            &water_heroine()
                .with_skill(Skill::new("Confuse", EffectId::IntelligenceDown, 2))
                .with_skill(Skill::new("Confuse again", EffectId::IntelligenceDown, 2)),
        );
        let target = CharacterState::initial(&CharacterSheet::new("t", Element::Fire, 10, 1, 0));
        let mut draws = ScriptedDraws::constant(0.0);
        let outcome = execute_active_skills(
            &actor,
            Side::Hero,
            &target,
            &EffectRegistry::standard(),
            1,
            &mut draws,
        )
        .expect("active skills");
        assert_eq!(outcome.target.sheet.effect_count(EffectId::IntelligenceDown), 1);
        assert_eq!(outcome.executed.len(), 1);
        assert_eq!(draws.consumed(), 2);
    }

    #[test]
    fn failed_roll_and_cooldown_skip() {
        let mut skill = Skill::new("Confuse", EffectId::IntelligenceDown, 2);
        let actor = CharacterState::initial(&water_heroine().with_skill(skill.clone()));
        let target = CharacterState::initial(&CharacterSheet::new("t", Element::Fire, 10, 1, 100));
        // rate = (100 - 50) / (100 + 200) = 1/6
        let mut draws = ScriptedDraws::constant(0.2);
        let outcome = execute_active_skills(
            &actor,
            Side::Hero,
            &target,
            &EffectRegistry::standard(),
            1,
            &mut draws,
        )
        .expect("active skills");
        assert!(outcome.executed.is_empty());

        skill.cool_down_end_turn = 5;
        let mut cooling = actor.clone();
        cooling.sheet.skills[0] = skill;
        let mut draws = ScriptedDraws::constant(0.0);
        let outcome = execute_active_skills(
            &cooling,
            Side::Hero,
            &target,
            &EffectRegistry::standard(),
            4,
            &mut draws,
        )
        .expect("active skills");
        assert!(outcome.executed.is_empty());
        assert_eq!(draws.consumed(), 0, "cooling skills must not roll");
    }

    #[test]
    fn passive_skills_are_not_rolled_in_active_phase() {
        let actor = CharacterState::initial(
            &water_heroine().with_skill(Skill::new("Recovery", EffectId::Heal, 2)),
        );
        let mut draws = ScriptedDraws::constant(0.0);
        let outcome = execute_active_skills(
            &actor,
            Side::Hero,
            &defenceless_target(),
            &EffectRegistry::standard(),
            1,
            &mut draws,
        )
        .expect("active skills");
        assert!(outcome.executed.is_empty());
        assert_eq!(draws.consumed(), 0);
    }

    #[test]
    fn unknown_skill_effect_is_fatal() {
        let actor = CharacterState::initial(
            &water_heroine().with_skill(Skill::new("Venom", EffectId::Poison, 1)),
        );
        let mut draws = ScriptedDraws::constant(0.0);
        let err = execute_active_skills(
            &actor,
            Side::Hero,
            &defenceless_target(),
            &EffectRegistry::empty(),
            1,
            &mut draws,
        )
        .unwrap_err();
        assert_eq!(
            err,
            BattleError::UnregisteredEffect {
                effect: EffectId::Poison
            }
        );
    }

    #[test]
    fn huge_cool_times_saturate_instead_of_overflowing() {
        let actor = CharacterState::initial(
            &water_heroine()
                .with_skill(Skill::new("Confuse", EffectId::IntelligenceDown, u32::MAX))
                .with_skill(Skill::new("Recovery", EffectId::Heal, u32::MAX)),
        );
        let mut draws = ScriptedDraws::constant(0.0);
        let active = execute_active_skills(
            &actor,
            Side::Hero,
            &defenceless_target(),
            &EffectRegistry::standard(),
            3,
            &mut draws,
        )
        .expect("active skills");
        assert_eq!(active.cooldowns[0].cool_down_end_turn, u32::MAX);

        let passive = execute_passive_skills(
            &actor,
            Side::Hero,
            Some(10),
            Some(10),
            &EffectRegistry::standard(),
            3,
        )
        .expect("passive skills");
        assert_eq!(
            passive.cooldowns,
            vec![CooldownTransition {
                skill_index: 1,
                cool_down_end_turn: u32::MAX
            }]
        );
    }

    #[test]
    fn passive_heal_resets_damage() {
        let mut actor = CharacterState::initial(
            &water_heroine().with_skill(Skill::new("Recovery", EffectId::Heal, 2)),
        );
        actor.total_damage = 50;

        let outcome = execute_passive_skills(
            &actor,
            Side::Hero,
            Some(30),
            Some(20),
            &EffectRegistry::standard(),
            1,
        )
        .expect("passive skills");

        assert_eq!(outcome.state.total_damage, 0);
        assert_eq!(outcome.damage_dealt, Some(30));
        assert_eq!(outcome.damage_received, Some(20));
        assert_eq!(outcome.executed.len(), 1);
        assert_eq!(outcome.executed[0].name, "Recovery");
        assert_eq!(outcome.cooldowns[0].cool_down_end_turn, 3);
    }

    #[test]
    fn passive_on_cooldown_does_not_fire() {
        let mut actor = CharacterState::initial(
            &water_heroine().with_skill(Skill::new("Recovery", EffectId::Heal, 2)),
        );
        actor.total_damage = 50;
        actor.sheet.skills[0].cool_down_end_turn = 3;

        let outcome = execute_passive_skills(
            &actor,
            Side::Hero,
            Some(30),
            Some(20),
            &EffectRegistry::standard(),
            1,
        )
        .expect("passive skills");
        assert!(outcome.executed.is_empty());
        assert_eq!(outcome.state.total_damage, 50);
    }

    #[test]
    fn passive_needs_an_attack() {
        let mut actor = CharacterState::initial(
            &water_heroine().with_skill(Skill::new("Recovery", EffectId::Heal, 2)),
        );
        actor.total_damage = 50;

        let outcome = execute_passive_skills(
            &actor,
            Side::Hero,
            None,
            None,
            &EffectRegistry::standard(),
            1,
        )
        .expect("passive skills");
        assert_eq!(outcome.state.total_damage, 50);
        assert!(outcome.executed.is_empty());
    }

    #[test]
    fn passive_can_rewrite_both_damage_figures() {
        let registry = EffectRegistry::builder()
            .register(
                EffectId::Focus,
                FnEffect::new(EffectKind::Passive, "parry", |ctx| {
                    Some(StateUpdate {
                        damage_dealt: ctx.damage_dealt.map(|d| d * 2),
                        damage_received: Some(0),
                        ..StateUpdate::default()
                    })
                }),
            )
            .build();
        let actor = CharacterState::initial(
            &water_heroine().with_skill(Skill::new("Parry", EffectId::Focus, 1)),
        );
        let outcome =
            execute_passive_skills(&actor, Side::Hero, Some(40), Some(25), &registry, 2)
                .expect("passive skills");
        assert_eq!(outcome.damage_dealt, Some(80));
        assert_eq!(outcome.damage_received, Some(0));
    }
}
