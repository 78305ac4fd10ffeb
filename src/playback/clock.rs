use std::time::Duration;

use crate::assets::frames::Frame;
use crate::editor::state::EditorState;
use crate::foundation::error::{LoopmaskError, LoopmaskResult};

/// Timing constants for the playback loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClockConfig {
    /// Real milliseconds per frame-duration unit (GIF delays are hundredths of a second).
    pub ms_per_duration_unit: u64,
    /// Delay after a frame whose duration is unspecified.
    pub fallback_delay_ms: u64,
    /// Polling delay while paused or while no state is loaded.
    pub idle_delay_ms: u64,
    /// Delay before the first tick.
    pub initial_delay_ms: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            ms_per_duration_unit: 10,
            fallback_delay_ms: 30,
            idle_delay_ms: 100,
            initial_delay_ms: 100,
        }
    }
}

impl ClockConfig {
    pub fn from_json(json: &str) -> LoopmaskResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| LoopmaskError::serde(format!("parse clock config: {e}")))
    }

    /// How long `frame` stays on screen.
    pub fn frame_delay(&self, frame: Option<&Frame>) -> Duration {
        match frame {
            Some(f) if f.duration > 0 => Duration::from_millis(
                u64::from(f.duration).saturating_mul(self.ms_per_duration_unit),
            ),
            _ => Duration::from_millis(self.fallback_delay_ms),
        }
    }

    pub fn idle_delay(&self) -> Duration {
        Duration::from_millis(self.idle_delay_ms)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }
}

/// Outcome of one scheduler tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tick {
    /// Whether the cursor moved on this tick.
    pub advanced: bool,
    /// Cursor after the tick.
    pub frame_index: usize,
    /// How long to wait before the next tick.
    pub delay: Duration,
}

/// Derives cursor advances and scheduling delays from editor state.
///
/// Playback speed follows the base layer's own frame timing: the delay after each advance is
/// the duration of the base frame that just became visible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackClock {
    config: ClockConfig,
}

impl PlaybackClock {
    pub fn new(config: ClockConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    /// Delay before the tick following `state`.
    pub fn next_delay(&self, state: &EditorState) -> Duration {
        if state.is_playing() {
            self.config.frame_delay(state.current_frame())
        } else {
            self.config.idle_delay()
        }
    }

    /// Advance `state` by one frame when playing and report the next delay.
    pub fn tick(&self, state: &EditorState) -> (EditorState, Tick) {
        let advanced = state.is_playing();
        let next = if advanced {
            state.advance_frame()
        } else {
            state.clone()
        };
        let tick = Tick {
            advanced,
            frame_index: next.current_frame_index(),
            delay: self.next_delay(&next),
        };
        (next, tick)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/clock.rs"]
mod tests;
