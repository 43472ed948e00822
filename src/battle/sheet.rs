//! Static character sheets: the validated input describing one combatant.

use serde::{Deserialize, Serialize};

use crate::battle::awakening::Awakening;
use crate::battle::effect::EffectId;
use crate::battle::element::Element;
use crate::battle::state::Side;

pub const MAX_FATIGUE: u32 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CharacterSheet {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Which side the sheet was authored for. Informational; the engine assigns sides by
    /// argument position.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<Side>,
    pub element: Element,
    pub vitality: u32,
    pub intelligence: u32,
    pub spirit: u32,
    /// Percentage of max HP already lost when the battle starts, 0..=50.
    #[serde(default)]
    pub fatigue: u32,
    #[serde(default)]
    pub awakening: Awakening,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub active_effects: Vec<AppliedEffect>,
}

impl CharacterSheet {
    /// Sheet with no fatigue, a flat 1.0 awakening, no skills and no statuses.
    pub fn new(
        id: impl Into<String>,
        element: Element,
        vitality: u32,
        intelligence: u32,
        spirit: u32,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            description: None,
            kind: None,
            element,
            vitality,
            intelligence,
            spirit,
            fatigue: 0,
            awakening: Awakening::default(),
            skills: Vec::new(),
            active_effects: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.element = element;
        self
    }

    pub fn with_kind(mut self, kind: Side) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_fatigue(mut self, fatigue: u32) -> Self {
        self.fatigue = fatigue;
        self
    }

    pub fn with_awakening(mut self, awakening: Awakening) -> Self {
        self.awakening = awakening;
        self
    }

    pub fn with_skill(mut self, skill: Skill) -> Self {
        self.skills.push(skill);
        self
    }

    pub fn with_effect(mut self, effect: AppliedEffect) -> Self {
        self.active_effects.push(effect);
        self
    }

    pub fn has_effect(&self, effect: EffectId) -> bool {
        self.active_effects.iter().any(|e| e.effect == effect)
    }

    pub fn effect_count(&self, effect: EffectId) -> usize {
        self.active_effects
            .iter()
            .filter(|e| e.effect == effect)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Skill {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub effect: EffectId,
    /// Validated but not read by casts yet: a freshly cast status always lasts one turn.
    pub duration: u32,
    pub stackable: bool,
    pub cool_time: u32,
    /// First turn on which the skill may fire again. Reset to 0 when a battle starts.
    #[serde(default)]
    pub cool_down_end_turn: u32,
}

impl Skill {
    pub fn new(name: impl Into<String>, effect: EffectId, cool_time: u32) -> Self {
        Self {
            name: name.into(),
            description: None,
            effect,
            duration: 1,
            stackable: false,
            cool_time,
            cool_down_end_turn: 0,
        }
    }

    pub fn stackable(mut self) -> Self {
        self.stackable = true;
        self
    }

    pub fn is_ready(&self, turn: u32) -> bool {
        self.cool_down_end_turn <= turn
    }
}

/// A timed status attached to a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppliedEffect {
    #[serde(rename = "type")]
    pub effect: EffectId,
    pub duration: u32,
    pub stackable: bool,
}

impl AppliedEffect {
    pub fn new(effect: EffectId, duration: u32, stackable: bool) -> Self {
        Self {
            effect,
            duration,
            stackable,
        }
    }
}
