use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::battle::effect::{EffectContext, EffectId, EffectRegistry, StateUpdate};
use crate::battle::error::Result;
use crate::battle::sheet::CharacterSheet;
use crate::battle::skill::CooldownTransition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Hero,
    Enemy,
}

impl Side {
    pub const fn opponent(self) -> Side {
        match self {
            Self::Hero => Self::Enemy,
            Self::Enemy => Self::Hero,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hero => "Hero",
            Self::Enemy => "Enemy",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-turn view of a combatant, derived from its sheet.
///
/// `remaining_hp = max_hp - total_damage` and is allowed to go negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterState {
    pub max_hp: i64,
    pub total_damage: i64,
    pub intelligence: u32,
    pub spirit: u32,
    pub sheet: CharacterSheet,
}

/// An effect that changed a state during recalculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectApplication {
    pub effect: EffectId,
    pub update: StateUpdate,
}

impl CharacterState {
    /// State before turn 1: no damage, base stats, every skill off cooldown.
    pub fn initial(sheet: &CharacterSheet) -> Self {
        let mut sheet = sheet.clone();
        for skill in &mut sheet.skills {
            skill.cool_down_end_turn = 0;
        }
        Self {
            max_hp: max_hp_at(&sheet, 1),
            total_damage: 0,
            intelligence: sheet.intelligence,
            spirit: sheet.spirit,
            sheet,
        }
    }

    pub fn remaining_hp(&self) -> i64 {
        self.max_hp - self.total_damage
    }

    pub fn is_defeated(&self) -> bool {
        self.remaining_hp() <= 0
    }

    /// Merge the stat fields of `update`. Damage figures are the caller's business.
    pub fn apply_update(&mut self, update: &StateUpdate) {
        if let Some(total_damage) = update.total_damage {
            self.total_damage = total_damage;
        }
        if let Some(intelligence) = update.intelligence {
            self.intelligence = intelligence;
        }
        if let Some(spirit) = update.spirit {
            self.spirit = spirit;
        }
    }

    pub fn apply_cooldowns(&mut self, transitions: &[CooldownTransition]) {
        for transition in transitions {
            if let Some(skill) = self.sheet.skills.get_mut(transition.skill_index) {
                skill.cool_down_end_turn = transition.cool_down_end_turn;
            }
        }
    }

    /// Decrement every status by one turn and drop the expired ones.
    pub fn tick_effects(&mut self) {
        for effect in &mut self.sheet.active_effects {
            effect.duration = effect.duration.saturating_sub(1);
        }
        self.sheet.active_effects.retain(|effect| effect.duration > 0);
    }
}

impl fmt::Display for CharacterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HP: {}/{} Intelligence: {}/{} Spirit: {}/{}",
            self.remaining_hp(),
            self.max_hp,
            self.intelligence,
            self.sheet.intelligence,
            self.spirit,
            self.sheet.spirit
        )
    }
}

pub fn max_hp_at(sheet: &CharacterSheet, turn: u32) -> i64 {
    (f64::from(sheet.vitality) * sheet.awakening.ratio(turn)).floor() as i64
}

/// Rebuild a state for `turn` from its sheet and statuses.
///
/// Stats reset to the sheet's base values every turn, so debuffs never accumulate across
/// turns. On turn 1 the fatigue debt replaces any accumulated damage. Statuses fold in sheet
/// order; a non-stackable status applies at most once per turn however many copies exist.
pub fn recalculate(
    before: &CharacterState,
    registry: &EffectRegistry,
    turn: u32,
) -> Result<(CharacterState, Vec<EffectApplication>)> {
    let mut state = before.clone();
    state.max_hp = max_hp_at(&state.sheet, turn);
    state.intelligence = state.sheet.intelligence;
    state.spirit = state.sheet.spirit;
    if turn == 1 {
        state.total_damage = state.max_hp * i64::from(state.sheet.fatigue) / 100;
    }

    let mut applied_counts: HashMap<EffectId, u32> = HashMap::new();
    let mut applications = Vec::new();
    let statuses = state.sheet.active_effects.clone();

    for status in statuses {
        if status.duration == 0 {
            continue;
        }
        let definition = registry.resolve(status.effect)?;
        let count = applied_counts.entry(status.effect).or_insert(0);
        if !status.stackable && *count > 0 {
            continue;
        }
        *count += 1;

        let Some(update) = definition.apply(&EffectContext::status(&state)) else {
            continue;
        };
        state.apply_update(&update);
        applications.push(EffectApplication {
            effect: status.effect,
            update,
        });
    }

    Ok((state, applications))
}
