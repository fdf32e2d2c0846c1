//! Frame-driven playback session
//!
//! Ties the play document, per-entity timelines, the master clock and the
//! trigger set into one synchronized animation. The host render loop calls
//! [`PlaybackSession::advance`] once per frame; the returned snapshot (an
//! entity-id to position map) is the only artifact crossing the render
//! boundary each tick.

use std::collections::HashMap;

use serde::Serialize;

use crate::clock::MasterClock;
use crate::field::NormPoint;
use crate::models::{PlayDocument, RouteSegment};
use crate::timeline::{build_timelines, max_timeline_duration, PlayerTimeline, TimelineConfig};
use crate::trigger::{ResponseKind, TriggerEngine};

/// Playback loop behavior at the end of the play.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoopMode {
    /// Stop at the end.
    None,
    /// Wrap to the start and keep playing.
    Full,
    /// Wrap inside a fractional progress window.
    Segment { start: f64, end: f64 },
}

/// One frame of resolved animation state.
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub time_ms: f64,
    /// Current position of every animated entity, keyed by entity id.
    pub positions: HashMap<String, NormPoint>,
    /// True on the frame that reaches natural completion (loop mode off).
    pub finished: bool,
}

/// Current playback state for UI display.
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackInfo {
    pub current_time_ms: f64,
    pub total_time_ms: f64,
    pub progress: f64,
    pub speed: f64,
    pub is_playing: bool,
}

/// A fired response route spliced onto a responder from its live position.
#[derive(Debug, Clone)]
struct ResponseOverride {
    route: RouteSegment,
    start_ms: f64,
}

/// A playback session over one play document snapshot.
pub struct PlaybackSession {
    document: PlayDocument,
    timelines: HashMap<String, PlayerTimeline>,
    clock: MasterClock,
    triggers: TriggerEngine,
    loop_mode: LoopMode,
    duration_ms: f64,
    overrides: HashMap<String, ResponseOverride>,
}

impl PlaybackSession {
    /// Build timelines for every entity (routeless entities included) and a
    /// clock sized to the longest timeline.
    pub fn new(document: PlayDocument, config: TimelineConfig) -> Self {
        Self::with_duration(document, config, None)
    }

    /// Same, with an explicit total-duration override.
    pub fn with_duration(
        document: PlayDocument,
        config: TimelineConfig,
        duration_override_ms: Option<f64>,
    ) -> Self {
        let timelines = build_timelines(&document, &config);
        let duration_ms = max_timeline_duration(&timelines, duration_override_ms);
        Self {
            document,
            timelines,
            clock: MasterClock::new(duration_ms),
            triggers: TriggerEngine::new(),
            loop_mode: LoopMode::None,
            duration_ms,
            overrides: HashMap::new(),
        }
    }

    #[inline]
    pub fn document(&self) -> &PlayDocument {
        &self.document
    }

    #[inline]
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    #[inline]
    pub fn triggers(&self) -> &TriggerEngine {
        &self.triggers
    }

    pub fn set_loop_mode(&mut self, mode: LoopMode) {
        self.loop_mode = mode;
    }

    // ------------------------------------------------------------------
    // Clock controls (delegated)
    // ------------------------------------------------------------------

    pub fn play(&mut self) {
        self.clock.play();
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    /// Reset to the start of a fresh run: clock to zero, every trigger back
    /// to pending, fired response routes discarded.
    pub fn restart(&mut self) {
        self.clock.restart();
        self.triggers.reset_all();
        self.overrides.clear();
    }

    pub fn seek(&mut self, fraction: f64) {
        self.clock.seek(fraction);
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.clock.set_speed(speed);
    }

    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    // ------------------------------------------------------------------
    // Triggers
    // ------------------------------------------------------------------

    /// Add a reactive trigger; see [`TriggerEngine::add`].
    pub fn add_trigger(&mut self, trigger: crate::trigger::ReactiveTrigger) -> bool {
        self.triggers.add(trigger)
    }

    /// Quick-response trigger with default threshold/delay; see
    /// [`TriggerEngine::create_quick_response`].
    pub fn create_quick_response(
        &mut self,
        trigger_entity_id: &str,
        responder_entity_id: &str,
        kind: ResponseKind,
    ) -> bool {
        self.triggers.create_quick_response(
            trigger_entity_id,
            responder_entity_id,
            kind,
            &self.document,
        )
    }

    // ------------------------------------------------------------------
    // Frame loop
    // ------------------------------------------------------------------

    /// Advance the session by one frame delta.
    ///
    /// Order per tick: clock advances, positions resolve against the
    /// current timelines and any fired response routes, then the trigger
    /// set observes those positions. Responses firing this tick take
    /// effect on the next resolution pass.
    pub fn advance(&mut self, delta_ms: f64) -> FrameSnapshot {
        let was_playing = self.clock.is_playing();
        let update = self.clock.tick(delta_ms);
        let mut finished = update.finished;

        if was_playing {
            match self.loop_mode {
                LoopMode::None => {}
                LoopMode::Full => {
                    if update.finished {
                        self.clock.seek(0.0);
                        self.clock.play();
                        finished = false;
                    }
                }
                LoopMode::Segment { start, end } => {
                    let end = end.clamp(0.0, 1.0);
                    let start = start.clamp(0.0, end);
                    if update.progress >= end {
                        self.clock.seek(start);
                        self.clock.play();
                        finished = false;
                    }
                }
            }
        }

        let time_ms = self.clock.current_time_ms();
        let positions = self.positions_at(time_ms);

        // Trigger evaluation observes this frame's positions; any response
        // that fires is spliced from the responder's live position and
        // applies from the next pass on.
        let fired = self.triggers.update(&positions, time_ms);
        for response in fired {
            let Some(&current) = positions.get(&response.responder_entity_id) else {
                continue;
            };
            log::debug!(
                "response '{}' fired for '{}' at {:.0}ms",
                response.trigger_id,
                response.responder_entity_id,
                time_ms
            );
            self.overrides.insert(
                response.responder_entity_id.clone(),
                ResponseOverride {
                    route: response.route.with_leading_point(current),
                    start_ms: time_ms,
                },
            );
        }

        FrameSnapshot { time_ms, positions, finished }
    }

    /// Resolve every entity's position at a global time. Never panics: a
    /// malformed entity resolves to its anchor and the rest of the play
    /// keeps animating.
    pub fn positions_at(&self, time_ms: f64) -> HashMap<String, NormPoint> {
        let mut positions = HashMap::with_capacity(self.timelines.len());
        for (id, timeline) in &self.timelines {
            let pos = match self.overrides.get(id) {
                Some(response) if time_ms >= response.start_ms => {
                    let span = (self.duration_ms - response.start_ms).max(1.0);
                    let fraction = ((time_ms - response.start_ms) / span) as f32;
                    response.route.point_at_fraction(fraction)
                }
                _ => timeline.position_at(time_ms),
            };
            positions.insert(id.clone(), pos);
        }
        positions
    }

    /// Current playback state for UI display.
    pub fn playback_info(&self) -> PlaybackInfo {
        PlaybackInfo {
            current_time_ms: self.clock.current_time_ms(),
            total_time_ms: self.duration_ms,
            progress: self.clock.progress(),
            speed: self.clock.speed(),
            is_playing: self.clock.is_playing(),
        }
    }
}
