use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::state_machine::{AssetId, DecayState, DelaySchedule, advance, initialize};
use crate::storage::{KeyValueStore, PLANT_STATE_KEY};
use crate::wakeup::{TimerHandle, WakeScheduler};

/// Events the host delivers, one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// The window came up (first launch or resume).
    Load,
    /// The window is going away.
    Unload,
    /// A scheduled wake fired.
    WakeFired(TimerHandle),
}

/// Owns the plant's state and the single pending wake.
///
/// All mutation goes through [`PlantController::handle`]; every state change
/// is written through to the store before the next wake is scheduled.
pub struct PlantController<S, W> {
    state: DecayState,
    pending: TimerHandle,
    delays: DelaySchedule,
    store: S,
    scheduler: W,
}

impl<S: KeyValueStore, W: WakeScheduler> PlantController<S, W> {
    /// Restore state from `store` and schedule the first wake.
    pub fn launch(store: S, mut scheduler: W, delays: DelaySchedule, now: DateTime<Utc>) -> Self {
        let state = initialize(&store);
        let pending = scheduler.schedule(wake_time(now, &delays, state));
        info!(%state, timer = %pending, "plant launched");
        Self {
            state,
            pending,
            delays,
            store,
            scheduler,
        }
    }

    /// Handle one host event and return the asset to display afterwards.
    pub fn handle(&mut self, event: HostEvent, now: DateTime<Utc>) -> AssetId {
        match event {
            HostEvent::Load => debug!(state = %self.state, "window loaded"),
            HostEvent::Unload => debug!(state = %self.state, "window unloaded"),
            HostEvent::WakeFired(handle) if handle != self.pending => {
                debug!(timer = %handle, expected = %self.pending, "ignoring stale wake");
            }
            HostEvent::WakeFired(_) => self.on_wake(now),
        }
        self.asset()
    }

    fn on_wake(&mut self, now: DateTime<Utc>) {
        let previous = self.state;
        self.state = advance(previous);
        if self.state != previous {
            info!(from = %previous, to = %self.state, "plant decayed");
        }

        if let Err(e) = self.store.write_int(PLANT_STATE_KEY, self.state.code()) {
            warn!(error = %e, state = %self.state, "failed to persist plant state");
        }

        self.pending = self
            .scheduler
            .schedule(wake_time(now, &self.delays, self.state));
        debug!(timer = %self.pending, "next wake scheduled");
    }

    pub fn state(&self) -> DecayState {
        self.state
    }

    pub fn asset(&self) -> AssetId {
        self.state.asset()
    }

    pub fn pending_timer(&self) -> TimerHandle {
        self.pending
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn scheduler(&self) -> &W {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut W {
        &mut self.scheduler
    }

    /// Give back the store and scheduler.
    pub fn into_parts(self) -> (S, W) {
        (self.store, self.scheduler)
    }
}

fn wake_time(now: DateTime<Utc>, delays: &DelaySchedule, state: DecayState) -> DateTime<Utc> {
    let delay = Duration::from_std(delays.delay_for(state)).unwrap_or(Duration::MAX);
    now.checked_add_signed(delay).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, WiltError};
    use crate::storage::MemoryStore;
    use crate::wakeup::WakeQueue;

    /// Store whose writes always fail.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn read_int(&self, _key: u32) -> Result<Option<i32>> {
            Ok(None)
        }

        fn write_int(&mut self, _key: u32, _value: i32) -> Result<()> {
            Err(WiltError::Config("disk on fire".into()))
        }

        fn delete(&mut self, _key: u32) -> Result<()> {
            Ok(())
        }
    }

    fn fresh() -> PlantController<MemoryStore, WakeQueue> {
        PlantController::launch(
            MemoryStore::default(),
            WakeQueue::new(),
            DelaySchedule::default(),
            Utc::now(),
        )
    }

    fn fire(ctrl: &mut PlantController<MemoryStore, WakeQueue>) -> AssetId {
        let handle = ctrl.pending_timer();
        ctrl.handle(HostEvent::WakeFired(handle), Utc::now())
    }

    #[test]
    fn fresh_start_decays_to_dead() {
        let mut ctrl = fresh();
        assert_eq!(ctrl.state(), DecayState::Alive);
        assert_eq!(ctrl.handle(HostEvent::Load, Utc::now()), AssetId::Healthy);

        assert_eq!(fire(&mut ctrl), AssetId::Healthy);
        assert_eq!(ctrl.state(), DecayState::Thirsty);

        fire(&mut ctrl);
        fire(&mut ctrl);
        assert_eq!(fire(&mut ctrl), AssetId::Terminal);
        assert_eq!(ctrl.state(), DecayState::Dead);

        assert_eq!(fire(&mut ctrl), AssetId::Terminal);
        assert_eq!(ctrl.state(), DecayState::Dead);
    }

    #[test]
    fn restart_from_dying_goes_straight_to_dead() {
        let mut store = MemoryStore::default();
        store
            .write_int(PLANT_STATE_KEY, DecayState::Dying.code())
            .unwrap();

        let mut ctrl = PlantController::launch(
            store,
            WakeQueue::new(),
            DelaySchedule::default(),
            Utc::now(),
        );
        assert_eq!(ctrl.state(), DecayState::Dying);

        fire(&mut ctrl);
        assert_eq!(ctrl.state(), DecayState::Dead);
    }

    #[test]
    fn every_wake_is_written_through() {
        let mut ctrl = fresh();
        fire(&mut ctrl);
        assert_eq!(
            ctrl.store().read_int(PLANT_STATE_KEY).unwrap(),
            Some(DecayState::Thirsty.code())
        );
        fire(&mut ctrl);
        fire(&mut ctrl);
        fire(&mut ctrl);
        assert_eq!(ctrl.store().read_int(PLANT_STATE_KEY).unwrap(), Some(9));
    }

    #[test]
    fn persisted_state_survives_relaunch() {
        let mut ctrl = fresh();
        fire(&mut ctrl);
        fire(&mut ctrl);
        let (store, _) = ctrl.into_parts();

        let ctrl = PlantController::launch(
            store,
            WakeQueue::new(),
            DelaySchedule::default(),
            Utc::now(),
        );
        assert_eq!(ctrl.state(), DecayState::Parched);
    }

    #[test]
    fn launch_schedules_one_wake_after_the_delay() {
        let now = Utc::now();
        let ctrl = PlantController::launch(
            MemoryStore::default(),
            WakeQueue::new(),
            DelaySchedule::default(),
            now,
        );
        let wake = ctrl.scheduler().next_due().unwrap();
        assert_eq!(ctrl.scheduler().len(), 1);
        assert_eq!(wake.handle, ctrl.pending_timer());
        assert_eq!(wake.at, now + Duration::seconds(3));
    }

    #[test]
    fn firing_reschedules_with_the_new_states_delay() {
        let now = Utc::now();
        let delays = DelaySchedule {
            thirsty: 7,
            ..Default::default()
        };
        let mut ctrl =
            PlantController::launch(MemoryStore::default(), WakeQueue::new(), delays, now);

        let first = ctrl.scheduler_mut().pop_due(now + Duration::seconds(3));
        assert_eq!(first.len(), 1);
        ctrl.handle(HostEvent::WakeFired(first[0].handle), first[0].at);

        let next = ctrl.scheduler().next_due().unwrap();
        assert_eq!(next.handle, ctrl.pending_timer());
        assert_eq!(next.at, first[0].at + Duration::seconds(7));
    }

    #[test]
    fn stale_wake_is_ignored() {
        let mut ctrl = fresh();
        let stale = ctrl.pending_timer();
        fire(&mut ctrl);
        assert_eq!(ctrl.state(), DecayState::Thirsty);

        ctrl.handle(HostEvent::WakeFired(stale), Utc::now());
        assert_eq!(ctrl.state(), DecayState::Thirsty);
    }

    #[test]
    fn load_and_unload_leave_state_alone() {
        let mut ctrl = fresh();
        ctrl.handle(HostEvent::Load, Utc::now());
        ctrl.handle(HostEvent::Unload, Utc::now());
        assert_eq!(ctrl.state(), DecayState::Alive);
        assert_eq!(ctrl.scheduler().len(), 1);
    }

    #[test]
    fn failed_writes_do_not_stop_decay() {
        let mut ctrl = PlantController::launch(
            BrokenStore,
            WakeQueue::new(),
            DelaySchedule::default(),
            Utc::now(),
        );
        for _ in 0..4 {
            let handle = ctrl.pending_timer();
            ctrl.handle(HostEvent::WakeFired(handle), Utc::now());
        }
        assert_eq!(ctrl.state(), DecayState::Dead);
    }
}
