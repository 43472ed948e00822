use serde::{Deserialize, Serialize};

/// Power-scaling curve applied to a combatant's vitality.
///
/// Heroines transform and fight at a flat multiple of their base stats; sealed enemies
/// wake up gradually, ramping from `start_ratio` to `end_ratio` over `turns_to_awake` turns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Awakening {
    Flat {
        ratio: f64,
    },
    #[serde(rename_all = "camelCase")]
    Ramp {
        start_ratio: f64,
        end_ratio: f64,
        #[serde(rename = "turnToAwake")]
        turns_to_awake: u32,
    },
}

impl Awakening {
    /// Ratio in effect on `turn` (1-based). `turns_to_awake` must be at least 1.
    pub fn ratio(&self, turn: u32) -> f64 {
        match *self {
            Self::Flat { ratio } => ratio,
            Self::Ramp {
                start_ratio,
                end_ratio,
                turns_to_awake,
            } => {
                if turn > turns_to_awake {
                    end_ratio
                } else {
                    let progress = (f64::from(turn) - 1.0) / f64::from(turns_to_awake);
                    start_ratio + (end_ratio - start_ratio) * progress
                }
            }
        }
    }
}

impl Default for Awakening {
    fn default() -> Self {
        Self::Flat { ratio: 1.0 }
    }
}
