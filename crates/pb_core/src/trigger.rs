//! Reactive trigger engine
//!
//! Proximity-triggered state machine letting a responder entity acquire a
//! response route once it has been within a distance threshold of a trigger
//! entity for a configured delay. Evaluation is a deterministic per-tick
//! function over the current position map; there are no hidden callbacks.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::field::NormPoint;
use crate::models::{PlayDocument, RouteSegment};

/// Default proximity threshold: roughly 12% of field width.
pub const DEFAULT_DISTANCE_THRESHOLD: f32 = 0.12;

/// Default dwell delay before the response fires.
pub const DEFAULT_RESPONSE_DELAY_MS: f64 = 300.0;

/// Trigger lifecycle. Transitions run strictly forward:
/// `Pending -> Active -> Triggered`, never backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerState {
    Pending,
    Active,
    Triggered,
}

/// A proximity- and delay-gated response rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactiveTrigger {
    pub id: String,
    pub trigger_entity_id: String,
    pub responder_entity_id: String,
    /// Normalized-space distance below which the trigger arms.
    pub distance_threshold: f32,
    /// Dwell time between arming and firing.
    pub response_delay_ms: f64,
    /// Route granted to the responder once the trigger fires.
    pub response_route: RouteSegment,
    pub state: TriggerState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activated_at_ms: Option<f64>,
    /// Missing-entity references are logged once, not every tick.
    #[serde(skip)]
    missing_warned: bool,
}

impl ReactiveTrigger {
    pub fn new(
        id: impl Into<String>,
        trigger_entity_id: impl Into<String>,
        responder_entity_id: impl Into<String>,
        distance_threshold: f32,
        response_delay_ms: f64,
        response_route: RouteSegment,
    ) -> Self {
        Self {
            id: id.into(),
            trigger_entity_id: trigger_entity_id.into(),
            responder_entity_id: responder_entity_id.into(),
            distance_threshold,
            response_delay_ms,
            response_route,
            state: TriggerState::Pending,
            activated_at_ms: None,
            missing_warned: false,
        }
    }

    /// Construction-time validation; the reason string is logged by the
    /// engine when a trigger is rejected.
    fn validate(&self) -> std::result::Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("trigger id must be non-empty".to_string());
        }
        if self.trigger_entity_id.trim().is_empty() || self.responder_entity_id.trim().is_empty() {
            return Err("trigger and responder entity ids must be non-empty".to_string());
        }
        if !self.distance_threshold.is_finite() || self.distance_threshold <= 0.0 {
            return Err(format!("distance threshold must be positive: {}", self.distance_threshold));
        }
        if !self.response_delay_ms.is_finite() || self.response_delay_ms < 0.0 {
            return Err(format!("response delay must be >= 0: {}", self.response_delay_ms));
        }
        if self.response_route.is_empty() {
            return Err("response route must be non-empty".to_string());
        }
        Ok(())
    }
}

/// Built-in response shapes for the quick-response constructor. Offsets are
/// applied to the responder's anchor; defensive entities face down-field
/// (+y) after placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    /// Attack up-field toward the line.
    Press,
    /// Retreat into coverage.
    Drop,
    /// Shuffle laterally, mirroring the trigger entity.
    Shadow,
}

impl ResponseKind {
    fn route_from(&self, anchor: NormPoint) -> RouteSegment {
        let points = match self {
            ResponseKind::Press => {
                vec![anchor, NormPoint::new(anchor.x, anchor.y + 0.15)]
            }
            ResponseKind::Drop => {
                vec![anchor, NormPoint::new(anchor.x, anchor.y - 0.12)]
            }
            ResponseKind::Shadow => vec![
                anchor,
                NormPoint::new(anchor.x - 0.08, anchor.y),
                NormPoint::new(anchor.x + 0.08, anchor.y),
            ],
        };
        // Anchors are clamped, so at least one point always survives.
        RouteSegment::new(points).expect("response route points are non-empty")
    }
}

/// A fired response, ready for the playback layer to splice onto the
/// responder.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDescriptor {
    pub trigger_id: String,
    pub responder_entity_id: String,
    pub route: RouteSegment,
    pub triggered_at_ms: f64,
}

/// The per-play trigger set.
#[derive(Debug, Clone, Default)]
pub struct TriggerEngine {
    triggers: Vec<ReactiveTrigger>,
}

impl TriggerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn triggers(&self) -> &[ReactiveTrigger] {
        &self.triggers
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Add a trigger to the active set. Invalid configuration is rejected
    /// and logged; it never aborts the caller and never enters the set.
    pub fn add(&mut self, trigger: ReactiveTrigger) -> bool {
        match trigger.validate() {
            Ok(()) => {
                self.triggers.push(trigger);
                true
            }
            Err(reason) => {
                log::warn!("rejected trigger '{}': {}", trigger.id, reason);
                false
            }
        }
    }

    /// Convenience constructor with sensible defaults (~12% of field width
    /// threshold, 300ms delay). The response route is synthesized from the
    /// responder's current anchor.
    pub fn create_quick_response(
        &mut self,
        trigger_entity_id: &str,
        responder_entity_id: &str,
        kind: ResponseKind,
        doc: &PlayDocument,
    ) -> bool {
        let Some(responder) = doc.get(responder_entity_id) else {
            log::warn!("quick response: no responder entity '{}'", responder_entity_id);
            return false;
        };
        let trigger = ReactiveTrigger::new(
            uuid::Uuid::new_v4().to_string(),
            trigger_entity_id,
            responder_entity_id,
            DEFAULT_DISTANCE_THRESHOLD,
            DEFAULT_RESPONSE_DELAY_MS,
            kind.route_from(responder.anchor),
        );
        self.add(trigger)
    }

    /// Per-tick evaluation over the current position map.
    ///
    /// `Pending -> Active` the instant the trigger/responder distance drops
    /// under the threshold (recording the activation time); `Active ->
    /// Triggered` once the dwell delay has elapsed. Returns the responses
    /// that fired on this tick. Triggers referencing missing entities are
    /// skipped for the tick and logged once.
    pub fn update(
        &mut self,
        positions: &HashMap<String, NormPoint>,
        global_time_ms: f64,
    ) -> Vec<ResponseDescriptor> {
        let mut fired = Vec::new();

        for trigger in &mut self.triggers {
            if trigger.state == TriggerState::Triggered {
                continue;
            }

            let (Some(a), Some(b)) = (
                positions.get(&trigger.trigger_entity_id),
                positions.get(&trigger.responder_entity_id),
            ) else {
                if !trigger.missing_warned {
                    log::warn!(
                        "trigger '{}' references a missing entity ({} / {})",
                        trigger.id,
                        trigger.trigger_entity_id,
                        trigger.responder_entity_id
                    );
                    trigger.missing_warned = true;
                }
                continue;
            };

            if trigger.state == TriggerState::Pending
                && a.distance_to(b) < trigger.distance_threshold
            {
                trigger.state = TriggerState::Active;
                trigger.activated_at_ms = Some(global_time_ms);
            }

            if trigger.state == TriggerState::Active {
                let activated = trigger.activated_at_ms.unwrap_or(global_time_ms);
                if global_time_ms - activated >= trigger.response_delay_ms {
                    trigger.state = TriggerState::Triggered;
                    fired.push(ResponseDescriptor {
                        trigger_id: trigger.id.clone(),
                        responder_entity_id: trigger.responder_entity_id.clone(),
                        route: trigger.response_route.clone(),
                        triggered_at_ms: global_time_ms,
                    });
                }
            }
        }
        fired
    }

    /// Fired responses relevant to rendering one responder. Policy:
    /// `Triggered` state only; `Active` is an internal dwell state.
    pub fn active_triggers_for(&self, responder_id: &str) -> Vec<ResponseDescriptor> {
        self.triggers
            .iter()
            .filter(|t| t.state == TriggerState::Triggered && t.responder_entity_id == responder_id)
            .map(|t| ResponseDescriptor {
                trigger_id: t.id.clone(),
                responder_entity_id: t.responder_entity_id.clone(),
                route: t.response_route.clone(),
                triggered_at_ms: t
                    .activated_at_ms
                    .map(|a| a + t.response_delay_ms)
                    .unwrap_or(0.0),
            })
            .collect()
    }

    /// Reset every trigger to `Pending` for a fresh run.
    pub fn reset_all(&mut self) {
        for trigger in &mut self.triggers {
            trigger.state = TriggerState::Pending;
            trigger.activated_at_ms = None;
        }
    }

    /// Destroy every trigger.
    pub fn clear_all(&mut self) {
        self.triggers.clear();
    }
}
