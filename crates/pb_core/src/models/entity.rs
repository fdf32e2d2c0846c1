//! Placed entities and route segments
//!
//! Pure value types: constructors and mutators only, no geometry logic.
//! Route mutators return a new entity value instead of mutating in place so
//! the UI layer can keep an undo/redo history of whole entities.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::field::NormPoint;

// ============================================================================
// RouteSegment: ordered path of normalized points
// ============================================================================

/// An ordered sequence of normalized points describing motion over time for
/// one entity. Insertion order defines path order; never empty once
/// finalized. Serializes as a plain point array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct RouteSegment(Vec<NormPoint>);

impl RouteSegment {
    /// Finalize a drawn route. Returns `None` when `points` is empty.
    ///
    /// Points are stored as-is: live-drag input is expected to be clamped
    /// already by the geometry layer.
    pub fn new(points: Vec<NormPoint>) -> Option<Self> {
        if points.is_empty() {
            None
        } else {
            Some(Self(points))
        }
    }

    #[inline]
    pub fn points(&self) -> &[NormPoint] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn first(&self) -> NormPoint {
        self.0[0]
    }

    #[inline]
    pub fn last(&self) -> NormPoint {
        self.0[self.0.len() - 1]
    }

    /// Total path length in normalized units.
    pub fn length(&self) -> f32 {
        self.0.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
    }

    /// Position along the path at `fraction` of its total length.
    ///
    /// Linear interpolation between consecutive points, selecting the
    /// segment whose cumulative-length span bounds the requested fraction.
    /// The fraction is clamped to [0,1] so 0.0 yields exactly the first
    /// point and 1.0 exactly the last. A zero-length path yields its first
    /// point.
    pub fn point_at_fraction(&self, fraction: f32) -> NormPoint {
        // Empty routes cannot be finalized, but a hand-built document could
        // still smuggle one in; degrade instead of panicking mid-playback.
        if self.0.is_empty() {
            return NormPoint::ZERO;
        }
        let f = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
        if self.0.len() == 1 {
            return self.0[0];
        }
        if f <= 0.0 {
            return self.first();
        }
        if f >= 1.0 {
            return self.last();
        }

        let total = self.length();
        if total <= f32::EPSILON {
            return self.0[0];
        }

        let target = f * total;
        let mut walked = 0.0;
        for w in self.0.windows(2) {
            let seg = w[0].distance_to(&w[1]);
            if walked + seg >= target {
                let t = if seg > f32::EPSILON { (target - walked) / seg } else { 0.0 };
                return w[0].lerp(&w[1], t);
            }
            walked += seg;
        }
        self.last()
    }

    /// New route with `point` prepended (used when splicing a response route
    /// onto an entity's live position).
    pub fn with_leading_point(&self, point: NormPoint) -> Self {
        let mut points = Vec::with_capacity(self.0.len() + 1);
        points.push(point);
        points.extend_from_slice(&self.0);
        Self(points)
    }
}

// ============================================================================
// PlayerEntity
// ============================================================================

/// A placed entity in the play document.
///
/// Serialized shape (camelCase) is the external play-document record:
/// `{id, positionLabel, anchor, preSnapRoute?, mainRoute?, label?, group?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerEntity {
    /// Opaque unique token.
    pub id: String,
    /// Position label, e.g. "QB", "WR", "MLB".
    pub position_label: String,
    /// Resting position in normalized field space when no route applies.
    pub anchor: NormPoint,
    /// Motion path before the snap, if drawn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_snap_route: Option<RouteSegment>,
    /// Main play path, if drawn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_route: Option<RouteSegment>,
    /// Optional display label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Optional grouping tag, e.g. "offense" / "defense".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl PlayerEntity {
    /// Create an entity with a generated unique id. The anchor is clamped
    /// into [0,1] before storage.
    pub fn new(position_label: impl Into<String>, anchor: NormPoint) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), position_label, anchor)
    }

    /// Create an entity with a caller-supplied id.
    pub fn with_id(
        id: impl Into<String>,
        position_label: impl Into<String>,
        anchor: NormPoint,
    ) -> Self {
        Self {
            id: id.into(),
            position_label: position_label.into(),
            anchor: anchor.clamped(),
            pre_snap_route: None,
            main_route: None,
            label: None,
            group: None,
        }
    }

    /// New entity value with `main_route` set or replaced.
    pub fn with_main_route(mut self, route: RouteSegment) -> Self {
        self.main_route = Some(route);
        self
    }

    /// New entity value with `pre_snap_route` set or replaced.
    pub fn with_pre_snap_route(mut self, route: RouteSegment) -> Self {
        self.pre_snap_route = Some(route);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_rejects_empty() {
        assert!(RouteSegment::new(Vec::new()).is_none());
    }

    #[test]
    fn test_route_preserves_order() {
        let pts =
            vec![NormPoint::new(0.1, 0.1), NormPoint::new(0.5, 0.1), NormPoint::new(0.5, 0.9)];
        let route = RouteSegment::new(pts.clone()).unwrap();
        assert_eq!(route.points(), &pts[..]);
    }

    #[test]
    fn test_route_length() {
        let route = RouteSegment::new(vec![
            NormPoint::new(0.0, 0.0),
            NormPoint::new(0.3, 0.4),
            NormPoint::new(0.3, 0.9),
        ])
        .unwrap();
        assert!((route.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_point_at_fraction_endpoints() {
        let route =
            RouteSegment::new(vec![NormPoint::new(0.2, 0.2), NormPoint::new(0.8, 0.8)]).unwrap();
        assert_eq!(route.point_at_fraction(0.0), route.first());
        assert_eq!(route.point_at_fraction(1.0), route.last());
        assert_eq!(route.point_at_fraction(-3.0), route.first());
        assert_eq!(route.point_at_fraction(7.0), route.last());
    }

    #[test]
    fn test_point_at_fraction_uses_cumulative_length() {
        // First leg is 0.6 long, second 0.2: halfway along the total path
        // (0.4) lands inside the first leg, not at its end.
        let route = RouteSegment::new(vec![
            NormPoint::new(0.0, 0.5),
            NormPoint::new(0.6, 0.5),
            NormPoint::new(0.8, 0.5),
        ])
        .unwrap();
        let mid = route.point_at_fraction(0.5);
        assert!((mid.x - 0.4).abs() < 1e-6);
        assert!((mid.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_point_at_fraction_single_point() {
        let route = RouteSegment::new(vec![NormPoint::new(0.4, 0.6)]).unwrap();
        assert_eq!(route.point_at_fraction(0.5), NormPoint::new(0.4, 0.6));
    }

    #[test]
    fn test_entity_anchor_clamped() {
        let e = PlayerEntity::new("QB", NormPoint { x: 2.0, y: -1.0 });
        assert_eq!(e.anchor, NormPoint::new(1.0, 0.0));
    }

    #[test]
    fn test_generated_ids_unique() {
        let a = PlayerEntity::new("QB", NormPoint::CENTER);
        let b = PlayerEntity::new("QB", NormPoint::CENTER);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_with_main_route_is_value_semantics() {
        let e = PlayerEntity::with_id("e1", "WR", NormPoint::new(0.2, 0.5));
        let route =
            RouteSegment::new(vec![NormPoint::new(0.2, 0.5), NormPoint::new(0.2, 0.9)]).unwrap();
        let updated = e.clone().with_main_route(route.clone());
        assert!(e.main_route.is_none());
        assert_eq!(updated.main_route, Some(route));
        assert_eq!(updated.id, e.id);
    }

    #[test]
    fn test_serialized_shape_is_camel_case() {
        let e = PlayerEntity::with_id("e1", "TE", NormPoint::new(0.6, 0.5));
        let json = serde_json::to_value(&e).unwrap();
        assert!(json.get("positionLabel").is_some());
        assert!(json.get("preSnapRoute").is_none(), "absent route must be omitted");
        let x = json["anchor"]["x"].as_f64().unwrap();
        assert!((x - 0.6).abs() < 1e-6);
    }
}
