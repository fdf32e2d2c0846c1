//! Per-entity timeline orchestration
//!
//! Converts each entity's routes into a two-phase timeline (pre-snap
//! motion, then the main play) and answers "where is entity E at global
//! time t". Timelines hold a weak `entity_id` back-reference only; both
//! collections are keyed by id and resolved via lookup each tick.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::field::NormPoint;
use crate::models::{PlayDocument, PlayerEntity, RouteSegment};

/// Shared timing configuration for every timeline of a play.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimelineConfig {
    pub pre_snap_start_ms: f64,
    pub pre_snap_duration_ms: f64,
    pub main_play_duration_ms: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self { pre_snap_start_ms: 0.0, pre_snap_duration_ms: 2000.0, main_play_duration_ms: 3000.0 }
    }
}

impl TimelineConfig {
    /// The snap instant separating the two phases.
    #[inline]
    pub fn snap_time_ms(&self) -> f64 {
        self.pre_snap_start_ms + self.pre_snap_duration_ms.max(MIN_PHASE_MS)
    }

    /// End of the main play phase.
    #[inline]
    pub fn end_time_ms(&self) -> f64 {
        self.snap_time_ms() + self.main_play_duration_ms.max(MIN_PHASE_MS)
    }
}

/// Phases are kept strictly non-degenerate so the snap time always lies
/// strictly between the timeline boundaries.
const MIN_PHASE_MS: f64 = 1.0;

/// One timeline phase: a time span and the route it animates, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseSpan {
    pub start_ms: f64,
    pub end_ms: f64,
    pub route: Option<RouteSegment>,
}

impl PhaseSpan {
    /// Elapsed fraction of this phase at `t`, clamped to [0,1] so times at
    /// the phase boundaries produce the route's endpoints exactly.
    #[inline]
    fn fraction_at(&self, t: f64) -> f32 {
        let span = self.end_ms - self.start_ms;
        if span <= 0.0 {
            return 1.0;
        }
        (((t - self.start_ms) / span).clamp(0.0, 1.0)) as f32
    }
}

/// Resolved timeline for one entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerTimeline {
    pub entity_id: String,
    pub anchor: NormPoint,
    pub pre_snap: PhaseSpan,
    pub main: PhaseSpan,
}

impl PlayerTimeline {
    /// Build a timeline from an entity. Entities with no routes at all
    /// still get a timeline and remain visible at their anchor for the
    /// full duration.
    pub fn build(entity: &PlayerEntity, config: &TimelineConfig) -> Self {
        let snap = config.snap_time_ms();
        Self {
            entity_id: entity.id.clone(),
            anchor: entity.anchor,
            pre_snap: PhaseSpan {
                start_ms: config.pre_snap_start_ms,
                end_ms: snap,
                route: entity.pre_snap_route.clone(),
            },
            main: PhaseSpan {
                start_ms: snap,
                end_ms: config.end_time_ms(),
                route: entity.main_route.clone(),
            },
        }
    }

    #[inline]
    pub fn snap_time_ms(&self) -> f64 {
        self.pre_snap.end_ms
    }

    #[inline]
    pub fn end_time_ms(&self) -> f64 {
        self.main.end_ms
    }

    /// Position at a global time.
    ///
    /// Before the snap the pre-snap route is interpolated; from the snap on
    /// the main route is. Whenever the relevant route is absent the anchor
    /// is returned unchanged, so routeless entities never disappear.
    pub fn position_at(&self, global_time_ms: f64) -> NormPoint {
        let t = if global_time_ms.is_finite() { global_time_ms } else { 0.0 };
        let phase = if t < self.snap_time_ms() { &self.pre_snap } else { &self.main };
        match &phase.route {
            Some(route) => route.point_at_fraction(phase.fraction_at(t)),
            None => self.anchor,
        }
    }
}

/// Build a timeline for every entity in the document, keyed by entity id.
pub fn build_timelines(
    doc: &PlayDocument,
    config: &TimelineConfig,
) -> HashMap<String, PlayerTimeline> {
    doc.entities()
        .iter()
        .map(|e| (e.id.clone(), PlayerTimeline::build(e, config)))
        .collect()
}

/// Total playback duration: the max over all timelines' main-phase end,
/// unless the caller supplies an explicit override.
pub fn max_timeline_duration(
    timelines: &HashMap<String, PlayerTimeline>,
    override_ms: Option<f64>,
) -> f64 {
    if let Some(ms) = override_ms {
        return ms.max(0.0);
    }
    timelines.values().map(|t| t.end_time_ms()).fold(0.0, f64::max)
}
