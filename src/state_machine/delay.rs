use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::state::DecayState;

/// Seconds between wakes when nothing else is configured.
pub const DEFAULT_WAKE_DELAY_SECS: u64 = 3;

/// How long to wait before the next wake, per state.
///
/// Every state currently uses the same delay. The table exists so that a
/// thirstier plant can be made to decay faster without touching the
/// controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelaySchedule {
    pub alive: u64,
    pub thirsty: u64,
    pub parched: u64,
    pub dying: u64,
    pub dead: u64,
}

impl Default for DelaySchedule {
    fn default() -> Self {
        Self::uniform(DEFAULT_WAKE_DELAY_SECS)
    }
}

impl DelaySchedule {
    /// The same delay, in seconds, for every state.
    pub fn uniform(secs: u64) -> Self {
        Self {
            alive: secs,
            thirsty: secs,
            parched: secs,
            dying: secs,
            dead: secs,
        }
    }

    pub fn delay_for(&self, state: DecayState) -> Duration {
        let secs = match state {
            DecayState::Alive => self.alive,
            DecayState::Thirsty => self.thirsty,
            DecayState::Parched => self.parched,
            DecayState::Dying => self.dying,
            DecayState::Dead => self.dead,
        };
        Duration::from_secs(secs)
    }
}

/// Delay before the next wake under the default schedule.
pub fn delay_for(state: DecayState) -> Duration {
    DelaySchedule::default().delay_for(state)
}
