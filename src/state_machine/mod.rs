mod delay;
mod state;

pub use delay::{DEFAULT_WAKE_DELAY_SECS, DelaySchedule, delay_for};
pub use state::{AssetId, DecayState, advance, asset_for, asset_for_code, initialize};
