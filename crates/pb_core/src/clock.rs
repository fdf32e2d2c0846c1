//! Master animation clock
//!
//! One shared progress scalar drives every timeline. The clock owns no
//! platform timer: the host render loop calls [`MasterClock::tick`] with a
//! frame delta, which keeps at most one driver in flight by construction
//! and makes `play()` trivially idempotent.

use serde::Serialize;

/// Speed multiplier clamp range.
pub const MIN_SPEED: f64 = 0.1;
pub const MAX_SPEED: f64 = 5.0;

/// Clock lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockPhase {
    Idle,
    Playing,
    Paused,
    Completed,
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockUpdate {
    pub progress: f64,
    /// True exactly once, on the tick that reaches natural completion.
    pub finished: bool,
}

/// The shared playback clock.
#[derive(Debug, Clone)]
pub struct MasterClock {
    progress: f64,
    speed: f64,
    duration_ms: f64,
    phase: ClockPhase,
}

impl MasterClock {
    /// A clock over a fixed playback duration. A non-positive duration
    /// yields a permanently idle clock (zero entities animate as a no-op,
    /// never a crash).
    pub fn new(duration_ms: f64) -> Self {
        let duration_ms = if duration_ms.is_finite() { duration_ms.max(0.0) } else { 0.0 };
        Self { progress: 0.0, speed: 1.0, duration_ms, phase: ClockPhase::Idle }
    }

    #[inline]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    #[inline]
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    #[inline]
    pub fn phase(&self) -> ClockPhase {
        self.phase
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.phase == ClockPhase::Playing
    }

    /// Current playback time in milliseconds.
    #[inline]
    pub fn current_time_ms(&self) -> f64 {
        self.progress * self.duration_ms
    }

    /// Start (or resume) advancing. Idempotent: calling while already
    /// playing is a no-op, never a second concurrent driver. Playing a
    /// completed clock restarts it from zero.
    pub fn play(&mut self) {
        if self.duration_ms <= 0.0 || self.phase == ClockPhase::Playing {
            return;
        }
        if self.phase == ClockPhase::Completed || self.progress >= 1.0 {
            self.progress = 0.0;
        }
        self.phase = ClockPhase::Playing;
    }

    /// Halt the in-flight advance; progress retains its last value.
    pub fn pause(&mut self) {
        if self.phase == ClockPhase::Playing {
            self.phase = ClockPhase::Paused;
        }
    }

    /// Halt any advance and reset progress to zero.
    pub fn restart(&mut self) {
        self.progress = 0.0;
        self.phase = ClockPhase::Idle;
    }

    /// Halt any advance and jump to a progress fraction, clamped to [0,1].
    /// The clock is left paused.
    pub fn seek(&mut self, fraction: f64) {
        self.progress = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
        self.phase = ClockPhase::Paused;
    }

    /// Clamp and apply a speed multiplier. Progress is preserved: when
    /// playing, subsequent ticks advance at the new rate from the current
    /// position (rate-preserving resume).
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = if speed.is_finite() { speed.clamp(MIN_SPEED, MAX_SPEED) } else { 1.0 };
    }

    /// Advance by a frame delta. Progress only moves while playing, and is
    /// monotonically non-decreasing until completion.
    pub fn tick(&mut self, delta_ms: f64) -> ClockUpdate {
        if self.phase != ClockPhase::Playing || self.duration_ms <= 0.0 {
            return ClockUpdate { progress: self.progress, finished: false };
        }
        let delta = if delta_ms.is_finite() { delta_ms.max(0.0) } else { 0.0 };
        self.progress += delta * self.speed / self.duration_ms;
        if self.progress >= 1.0 {
            self.progress = 1.0;
            self.phase = ClockPhase::Completed;
            return ClockUpdate { progress: 1.0, finished: true };
        }
        ClockUpdate { progress: self.progress, finished: false }
    }
}
