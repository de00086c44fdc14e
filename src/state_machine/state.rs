use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::storage::{KeyValueStore, PLANT_STATE_KEY};

/// The five decay states of the plant, ordered by severity.
///
/// The plant only ever moves forward: ALIVE → THIRSTY → PARCHED → DYING → DEAD.
/// The numeric codes are what gets persisted. DEAD is 9, not 4, and must stay
/// that way so state written by earlier builds still reads back correctly.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum DecayState {
    #[default]
    Alive = 0,
    Thirsty = 1,
    Parched = 2,
    Dying = 3,
    Dead = 9,
}

impl DecayState {
    /// Every state in severity order.
    pub const ALL: [DecayState; 5] = [
        DecayState::Alive,
        DecayState::Thirsty,
        DecayState::Parched,
        DecayState::Dying,
        DecayState::Dead,
    ];

    /// The integer written to the persistent store.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Decode a persisted integer. Codes that don't name a state yield `None`.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(DecayState::Alive),
            1 => Some(DecayState::Thirsty),
            2 => Some(DecayState::Parched),
            3 => Some(DecayState::Dying),
            9 => Some(DecayState::Dead),
            _ => None,
        }
    }

    /// The next state after one wake. DEAD is a fixed point.
    pub fn advance(self) -> Self {
        match self {
            DecayState::Alive => DecayState::Thirsty,
            DecayState::Thirsty => DecayState::Parched,
            DecayState::Parched => DecayState::Dying,
            DecayState::Dying => DecayState::Dead,
            DecayState::Dead => DecayState::Dead,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == DecayState::Dead
    }

    /// Which bundled image represents this state.
    pub fn asset(self) -> AssetId {
        match self {
            DecayState::Alive | DecayState::Thirsty | DecayState::Parched => AssetId::Healthy,
            DecayState::Dying | DecayState::Dead => AssetId::Terminal,
        }
    }
}

impl fmt::Display for DecayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecayState::Alive => write!(f, "ALIVE"),
            DecayState::Thirsty => write!(f, "THIRSTY"),
            DecayState::Parched => write!(f, "PARCHED"),
            DecayState::Dying => write!(f, "DYING"),
            DecayState::Dead => write!(f, "DEAD"),
        }
    }
}

/// Opaque reference to one of the two bundled images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetId {
    /// The leaf: shown while the plant can still be saved.
    Healthy,
    /// The cake: shown once the plant is dying or dead.
    Terminal,
}

impl AssetId {
    /// Resource name of the bundled image.
    pub fn resource_name(self) -> &'static str {
        match self {
            AssetId::Healthy => "IMAGE_LEAF",
            AssetId::Terminal => "IMAGE_CAKE",
        }
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource_name())
    }
}

/// Restore the persisted state, or start fresh at ALIVE.
///
/// A missing value, an unrecognised code and a failed read all count as
/// "nothing persisted".
pub fn initialize(store: &impl KeyValueStore) -> DecayState {
    match store.read_int(PLANT_STATE_KEY) {
        Ok(Some(code)) => DecayState::from_code(code).unwrap_or_else(|| {
            debug!(code, "ignoring unrecognised persisted state");
            DecayState::Alive
        }),
        Ok(None) => DecayState::Alive,
        Err(e) => {
            debug!(error = %e, "could not read persisted state, starting fresh");
            DecayState::Alive
        }
    }
}

/// Pure transition function; see [`DecayState::advance`].
pub fn advance(state: DecayState) -> DecayState {
    state.advance()
}

/// Map a state to its display asset.
pub fn asset_for(state: DecayState) -> AssetId {
    state.asset()
}

/// Map a raw persisted code to its display asset. Unknown codes get the
/// terminal image.
pub fn asset_for_code(code: i32) -> AssetId {
    DecayState::from_code(code)
        .map(DecayState::asset)
        .unwrap_or(AssetId::Terminal)
}
