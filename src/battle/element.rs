use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const ADVANTAGE_MULTIPLIER: f64 = 1.5;
pub const DISADVANTAGE_MULTIPLIER: f64 = 0.67;
pub const NEUTRAL_MULTIPLIER: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Fire,
    Water,
    Wind,
}

impl Element {
    pub const ALL: [Element; 3] = [Element::Fire, Element::Water, Element::Wind];

    /// Element this one deals boosted damage to in the built-in cycle.
    pub const fn advantage(self) -> Element {
        match self {
            Self::Fire => Self::Wind,
            Self::Water => Self::Fire,
            Self::Wind => Self::Water,
        }
    }

    /// Element this one deals reduced damage to in the built-in cycle.
    pub const fn disadvantage(self) -> Element {
        match self {
            Self::Fire => Self::Water,
            Self::Water => Self::Wind,
            Self::Wind => Self::Fire,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fire => "fire",
            Self::Water => "water",
            Self::Wind => "wind",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRelation {
    pub advantage: Element,
    pub disadvantage: Element,
}

/// Caller-supplied advantage table. Elements missing from the table are neutral against everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementRelations {
    relations: BTreeMap<Element, ElementRelation>,
}

impl ElementRelations {
    pub fn new() -> Self {
        Self {
            relations: BTreeMap::new(),
        }
    }

    /// The fire -> wind -> water -> fire cycle.
    pub fn builtin() -> Self {
        Element::ALL
            .into_iter()
            .map(|element| {
                (
                    element,
                    ElementRelation {
                        advantage: element.advantage(),
                        disadvantage: element.disadvantage(),
                    },
                )
            })
            .collect()
    }

    pub fn with_relation(mut self, element: Element, relation: ElementRelation) -> Self {
        self.relations.insert(element, relation);
        self
    }

    pub fn relation(&self, element: Element) -> Option<&ElementRelation> {
        self.relations.get(&element)
    }

    pub fn is_advantage(&self, from: Element, to: Element) -> bool {
        self.relation(from).is_some_and(|r| r.advantage == to)
    }

    pub fn is_disadvantage(&self, from: Element, to: Element) -> bool {
        self.relation(from).is_some_and(|r| r.disadvantage == to)
    }

    pub fn multiplier(&self, attacker: Element, defender: Element) -> f64 {
        if self.is_advantage(attacker, defender) {
            ADVANTAGE_MULTIPLIER
        } else if self.is_disadvantage(attacker, defender) {
            DISADVANTAGE_MULTIPLIER
        } else {
            NEUTRAL_MULTIPLIER
        }
    }
}

impl Default for ElementRelations {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FromIterator<(Element, ElementRelation)> for ElementRelations {
    fn from_iter<I: IntoIterator<Item = (Element, ElementRelation)>>(iter: I) -> Self {
        Self {
            relations: iter.into_iter().collect(),
        }
    }
}

/// Damage multiplier from the attacker's element against the defender's, using `relations`.
pub fn element_multiplier(attacker: Element, defender: Element, relations: &ElementRelations) -> f64 {
    relations.multiplier(attacker, defender)
}

/// Same as [element_multiplier] against the built-in cycle, without building a table.
pub fn builtin_element_multiplier(attacker: Element, defender: Element) -> f64 {
    if attacker.advantage() == defender {
        ADVANTAGE_MULTIPLIER
    } else if attacker.disadvantage() == defender {
        DISADVANTAGE_MULTIPLIER
    } else {
        NEUTRAL_MULTIPLIER
    }
}
