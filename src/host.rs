//! The host event loop.
//!
//! Delivers one event at a time to a [`PlantController`]: `Load` on start,
//! `WakeFired` whenever the earliest pending wake comes due, `Unload` on the
//! way out. Each event runs to completion before the loop sleeps again.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::controller::{HostEvent, PlantController};
use crate::display::DisplaySurface;
use crate::error::Result;
use crate::state_machine::{AssetId, DecayState, DelaySchedule, initialize};
use crate::storage::{KeyValueStore, PLANT_STATE_KEY};
use crate::wakeup::WakeQueue;

/// Knobs for a single run of the loop.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub delays: DelaySchedule,
    pub stop_when_dead: bool,
    pub max_wakes: Option<u32>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            delays: DelaySchedule::default(),
            stop_when_dead: true,
            max_wakes: None,
        }
    }
}

/// Why the loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Dead,
    WakeLimit,
    Interrupted,
    NothingScheduled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub initial: DecayState,
    pub final_state: DecayState,
    pub wakes: u32,
    pub reason: StopReason,
}

/// Run the plant until it dies, the wake limit is hit, or `shutdown`
/// resolves. Returns the store so callers can inspect what was persisted.
pub async fn run<S, D>(
    store: S,
    display: &mut D,
    options: RunOptions,
    shutdown: impl Future<Output = ()>,
) -> (RunSummary, S)
where
    S: KeyValueStore,
    D: DisplaySurface,
{
    tokio::pin!(shutdown);

    let mut ctrl = PlantController::launch(store, WakeQueue::new(), options.delays, Utc::now());
    let initial = ctrl.state();
    let asset = ctrl.handle(HostEvent::Load, Utc::now());
    display.show(asset, ctrl.state());

    let mut wakes = 0u32;
    let reason = loop {
        if options.stop_when_dead && ctrl.state().is_terminal() {
            break StopReason::Dead;
        }
        if let Some(max) = options.max_wakes
            && wakes >= max
        {
            break StopReason::WakeLimit;
        }
        let Some(next) = ctrl.scheduler().next_due() else {
            break StopReason::NothingScheduled;
        };

        display.waiting(next.at);
        let wait = (next.at - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        debug!(timer = %next.handle, ?wait, "sleeping until next wake");
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = &mut shutdown => break StopReason::Interrupted,
        }

        let now = Utc::now().max(next.at);
        let due = ctrl.scheduler_mut().pop_due(now);
        for wake in due {
            let asset = ctrl.handle(HostEvent::WakeFired(wake.handle), now);
            display.show(asset, ctrl.state());
            wakes += 1;
        }
    };

    ctrl.handle(HostEvent::Unload, Utc::now());
    let pending = ctrl.pending_timer();
    ctrl.scheduler_mut().cancel(pending);
    display.close();

    let summary = RunSummary {
        initial,
        final_state: ctrl.state(),
        wakes,
        reason,
    };
    info!(
        initial = %summary.initial,
        final_state = %summary.final_state,
        wakes,
        ?reason,
        "run finished"
    );

    let (store, _) = ctrl.into_parts();
    (summary, store)
}

/// Resolve once `signal` fires. If the signal can't be listened for, never
/// resolve, so the run isn't cut short.
pub async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        warn!(error = %e, "could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

/// What the store currently says about the plant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    /// Raw persisted code, if any.
    pub code: Option<i32>,
    /// The decoded state; `None` when nothing usable is persisted.
    pub state: Option<DecayState>,
    /// What the next run will show on load.
    pub asset: AssetId,
}

pub fn status(store: &impl KeyValueStore) -> Result<StatusReport> {
    let code = store.read_int(PLANT_STATE_KEY)?;
    let state = code.and_then(DecayState::from_code);
    let asset = initialize(store).asset();
    Ok(StatusReport { code, state, asset })
}

pub fn reset(store: &mut impl KeyValueStore) -> Result<()> {
    store.delete(PLANT_STATE_KEY)?;
    info!("plant state cleared");
    Ok(())
}
