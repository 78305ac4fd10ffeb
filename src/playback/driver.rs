use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::editor::action::Action;
use crate::editor::state::EditorState;
use crate::playback::clock::{PlaybackClock, Tick};

/// Source of the current editor state for the playback loop.
///
/// `current` is `None` while nothing is loaded; the loop then idles instead of advancing.
pub trait StateStore {
    fn current(&self) -> Option<&EditorState>;
    fn dispatch(&mut self, action: Action);
}

impl<S: StateStore + ?Sized> StateStore for &mut S {
    fn current(&self) -> Option<&EditorState> {
        (**self).current()
    }

    fn dispatch(&mut self, action: Action) {
        (**self).dispatch(action)
    }
}

/// In-memory store that folds actions through [`EditorState::apply`].
#[derive(Clone, Debug, Default)]
pub struct EditorStore {
    state: Option<EditorState>,
}

impl EditorStore {
    pub fn new(state: EditorState) -> Self {
        Self { state: Some(state) }
    }

    /// A store with no state loaded yet.
    pub fn unloaded() -> Self {
        Self::default()
    }

    pub fn load(&mut self, state: EditorState) {
        self.state = Some(state);
    }
}

impl StateStore for EditorStore {
    fn current(&self) -> Option<&EditorState> {
        self.state.as_ref()
    }

    fn dispatch(&mut self, action: Action) {
        match &self.state {
            Some(state) => self.state = Some(state.apply(&action)),
            None => tracing::debug!(action = action.name(), "no state loaded; action dropped"),
        }
    }
}

/// Something that can block for a scheduling delay.
pub trait TimerHost {
    fn wait(&mut self, delay: Duration);
}

impl<T: TimerHost + ?Sized> TimerHost for &mut T {
    fn wait(&mut self, delay: Duration) {
        (**self).wait(delay)
    }
}

/// Sleeps the calling thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadTimer;

impl TimerHost for ThreadTimer {
    fn wait(&mut self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

/// Records requested delays without sleeping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VirtualTimer {
    waits: Vec<Duration>,
}

impl VirtualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waits(&self) -> &[Duration] {
        &self.waits
    }

    pub fn elapsed(&self) -> Duration {
        self.waits.iter().sum()
    }
}

impl TimerHost for VirtualTimer {
    fn wait(&mut self, delay: Duration) {
        self.waits.push(delay);
    }
}

/// Cloneable cancellation flag for [`PlaybackLoop::run`].
#[derive(Clone, Debug, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Self-rescheduling playback driver.
///
/// Each tick reads the store, dispatches a one-frame advance while playing, and waits for the
/// delay the clock derives from the state after the tick. Exactly one tick is pending at a time.
#[derive(Debug)]
pub struct PlaybackLoop<S, T> {
    clock: PlaybackClock,
    store: S,
    timer: T,
    stop: StopToken,
}

impl<S: StateStore, T: TimerHost> PlaybackLoop<S, T> {
    pub fn new(clock: PlaybackClock, store: S, timer: T) -> Self {
        Self {
            clock,
            store,
            timer,
            stop: StopToken::new(),
        }
    }

    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn into_parts(self) -> (S, T) {
        (self.store, self.timer)
    }

    /// Run a single tick without waiting.
    pub fn step(&mut self) -> Tick {
        let advanced = self.store.current().is_some_and(EditorState::is_playing);
        if advanced {
            self.store.dispatch(Action::IncrementFrame(1));
        }
        let (frame_index, delay) = match self.store.current() {
            Some(state) => (state.current_frame_index(), self.clock.next_delay(state)),
            None => (0, self.clock.config().idle_delay()),
        };
        Tick {
            advanced,
            frame_index,
            delay,
        }
    }

    /// Tick until the stop token fires, returning the number of ticks run.
    ///
    /// `on_tick` sees the state after each tick that had a loaded state.
    pub fn run<F>(&mut self, mut on_tick: F) -> u64
    where
        F: FnMut(&EditorState, &Tick),
    {
        let mut ticks = 0u64;
        self.timer.wait(self.clock.config().initial_delay());
        while !self.stop.is_stopped() {
            let tick = self.step();
            ticks += 1;
            tracing::debug!(
                frame = tick.frame_index,
                advanced = tick.advanced,
                delay_ms = tick.delay.as_millis() as u64,
                "playback tick"
            );
            if let Some(state) = self.store.current() {
                on_tick(state, &tick);
            }
            if self.stop.is_stopped() {
                break;
            }
            self.timer.wait(tick.delay);
        }
        ticks
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/driver.rs"]
mod tests;
