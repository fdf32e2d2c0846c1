//! # pb_core - Play Diagramming & Animation Engine
//!
//! This library is the diagramming/animation core of a coaching playbook
//! app: place personnel on a schematic field, draw motion/route paths, save
//! plays as formation templates, and play back a synchronized animation of
//! every entity moving along its assigned path.
//!
//! ## Features
//! - Resolution-independent normalized field space with safe edge margins
//! - Atomic formation placement with collision rejection and strong-side
//!   mirroring for defensive templates
//! - Two-phase (pre-snap / main play) per-entity timelines driven by one
//!   shared clock
//! - Proximity-triggered reactive responses for defensive entities
//! - Lossless JSON round-trip of the play document
//!
//! The engine owns no platform timer, renderer, or transport: the host
//! calls [`PlaybackSession::advance`] from its own render loop and receives
//! an entity-id to position map per frame.

pub mod clock;
pub mod error;
pub mod field;
pub mod formation;
pub mod models;
pub mod playback;
pub mod timeline;
pub mod trigger;

// Re-export the main engine surface
pub use clock::{ClockPhase, ClockUpdate, MasterClock};
pub use error::{PlayError, Result};
pub use field::{FieldBounds, NormPoint, PixelPoint};
pub use formation::{
    builtin_formations, detect_offensive_strong_side, find_formation, place_formation,
    place_formation_at_pixel, FormationKind, FormationSlot, FormationTemplate, PlacementConfig,
    StrongSide,
};
pub use models::{PlayDocError, PlayDocument, PlayerEntity, RouteSegment};
pub use playback::{FrameSnapshot, LoopMode, PlaybackInfo, PlaybackSession};
pub use timeline::{
    build_timelines, max_timeline_duration, PlayerTimeline, TimelineConfig,
};
pub use trigger::{
    ReactiveTrigger, ResponseDescriptor, ResponseKind, TriggerEngine, TriggerState,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    /// Full scenario: offense and strong-side defense at the same center,
    /// then a complete animated run.
    #[test]
    fn test_place_both_units_and_animate() {
        let mut doc = PlayDocument::new();
        let center = NormPoint::CENTER;
        let config = PlacementConfig::default();

        let offense = find_formation("I-Formation").unwrap();
        let defense = find_formation("4-3").unwrap();
        assert!(place_formation(&mut doc, offense, center, &config));
        assert!(place_formation(&mut doc, defense, center, &config));
        assert_eq!(doc.len(), 22);

        // Give the flanker a route; everyone else holds their anchor.
        let z_id = doc
            .entities()
            .iter()
            .find(|e| e.label.as_deref() == Some("Z"))
            .unwrap()
            .id
            .clone();
        let z_anchor = doc.get(&z_id).unwrap().anchor;
        let route = RouteSegment::new(vec![
            z_anchor,
            NormPoint::new(z_anchor.x, z_anchor.y - 0.3),
        ])
        .unwrap();
        doc.set_main_route(&z_id, route).unwrap();

        let mut session = PlaybackSession::new(doc, TimelineConfig::default());
        session.play();

        let mut frames = 0;
        loop {
            let snapshot = session.advance(50.0);
            assert_eq!(snapshot.positions.len(), 22, "every entity resolves every frame");
            frames += 1;
            if snapshot.finished {
                break;
            }
            assert!(frames < 1000, "playback must complete");
        }

        // The flanker finished its route; a lineman never moved.
        let positions = session.positions_at(session.duration_ms());
        assert!((positions[&z_id].y - (z_anchor.y - 0.3)).abs() < 1e-5);
    }

    /// Load -> animate -> save reproduces the external array (ids included).
    #[test]
    fn test_document_roundtrip_through_animation() {
        let json = r#"[
            {"id":"qb-1","positionLabel":"QB","anchor":{"x":0.5,"y":0.55},
             "mainRoute":[{"x":0.5,"y":0.55},{"x":0.45,"y":0.62}]},
            {"id":"wr-1","positionLabel":"WR","anchor":{"x":0.2,"y":0.5},
             "label":"X","group":"offense"}
        ]"#;
        let doc = PlayDocument::from_json(json).unwrap();
        let before = doc.to_json().unwrap();

        let mut session = PlaybackSession::new(doc, TimelineConfig::default());
        session.play();
        while !session.advance(100.0).finished {}

        let after = session.document().to_json().unwrap();
        assert_eq!(before, after, "animation must not disturb the persisted shape");
    }

    #[test]
    fn test_version_constants() {
        assert!(!VERSION.is_empty());
        assert_eq!(SCHEMA_VERSION, 1);
    }
}
