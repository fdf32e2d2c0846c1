//! Formation placement engine
//!
//! Places an entire formation as one atomic operation: strong-side
//! detection/mirroring for defensive templates, slot offset math with the
//! defensive Y-flip, clamping, and all-or-nothing collision checking
//! against both the new batch and every already-placed entity.

use rand::Rng;

use crate::field::{FieldBounds, NormPoint, PixelPoint};
use crate::models::{PlayDocument, PlayerEntity};

use super::{FormationKind, FormationTemplate, StrongSide};

/// Position labels that mark an entity as offensive personnel when no group
/// tag is present (hand-placed entities).
const OFFENSIVE_LABELS: &[&str] = &[
    "QB", "RB", "HB", "TB", "FB", "WR", "TE", "SLOT", "C", "LG", "RG", "LT", "RT",
];

/// Labels whose occupant decides a tied strong-side count.
const STRONG_SIDE_TIEBREAK_LABELS: &[&str] = &["TE", "SLOT"];

/// Placement tuning.
#[derive(Debug, Clone, Copy)]
pub struct PlacementConfig {
    /// Minimum pairwise separation between any two entities, in normalized
    /// units. Any closer pair rejects the whole batch.
    pub min_separation: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self { min_separation: 0.025 }
    }
}

/// Detect which side of `center_x` the offense is loaded on.
///
/// Counts offensive entities strictly left/right of the center line; a tie
/// falls to the side holding a designated tight-end/slot occupant. Returns
/// `None` when no offensive entities exist (placement then uses the
/// template unchanged).
pub fn detect_offensive_strong_side(
    entities: &[PlayerEntity],
    center_x: f32,
) -> Option<StrongSide> {
    let offensive: Vec<&PlayerEntity> = entities.iter().filter(|e| is_offensive(e)).collect();
    if offensive.is_empty() {
        return None;
    }

    let eps = 1e-4;
    let right = offensive.iter().filter(|e| e.anchor.x > center_x + eps).count();
    let left = offensive.iter().filter(|e| e.anchor.x < center_x - eps).count();

    if right > left {
        return Some(StrongSide::Right);
    }
    if left > right {
        return Some(StrongSide::Left);
    }

    // Tied count: the tight-end/slot occupant decides.
    for entity in &offensive {
        if STRONG_SIDE_TIEBREAK_LABELS.contains(&entity.position_label.as_str()) {
            if entity.anchor.x > center_x + eps {
                return Some(StrongSide::Right);
            }
            if entity.anchor.x < center_x - eps {
                return Some(StrongSide::Left);
            }
        }
    }
    Some(StrongSide::Right)
}

fn is_offensive(entity: &PlayerEntity) -> bool {
    match entity.group.as_deref() {
        Some("offense") => true,
        Some("defense") => false,
        _ => OFFENSIVE_LABELS.contains(&entity.position_label.as_str()),
    }
}

/// Place a formation centered on a normalized point.
///
/// Returns `true` and appends one entity per slot on success; returns
/// `false` and leaves the document untouched when any pairwise distance
/// falls under the configured minimum separation. Colliding pairs are
/// logged for diagnostics.
pub fn place_formation(
    doc: &mut PlayDocument,
    template: &FormationTemplate,
    center: NormPoint,
    config: &PlacementConfig,
) -> bool {
    // 1. Orient a defensive strong-side template toward the offense.
    let oriented;
    let working = if template.kind == FormationKind::Defense && template.has_strong_side {
        match detect_offensive_strong_side(doc.entities(), center.x) {
            Some(StrongSide::Left) => {
                log::debug!("formation '{}': mirroring to left strong side", template.name);
                oriented = template.mirrored();
                &oriented
            }
            _ => template,
        }
    } else {
        template
    };

    // 2+3. Absolute slot positions, clamped into the field.
    let positions = resolve_slot_positions(working, center);

    // 4. All-or-nothing collision check.
    let collisions = find_collisions(working, &positions, doc.entities(), config.min_separation);
    if !collisions.is_empty() {
        log::info!(
            "formation '{}' rejected at ({:.3}, {:.3}): {} colliding pair(s)",
            template.name,
            center.x,
            center.y,
            collisions.len()
        );
        for (a, b, dist) in &collisions {
            log::debug!("  collision: {} <-> {} at {:.4}", a, b, dist);
        }
        return false;
    }

    // 5. Synthesize the batch and append it in one operation.
    let batch = build_entities(working, &positions);
    log::debug!("placed formation '{}' ({} entities)", template.name, batch.len());
    doc.extend(batch);
    true
}

/// Pixel-space entry point: the target center arrives from a touch/drag in
/// device coordinates and is mapped through the field geometry first.
pub fn place_formation_at_pixel(
    doc: &mut PlayDocument,
    template: &FormationTemplate,
    bounds: &FieldBounds,
    center: PixelPoint,
    config: &PlacementConfig,
) -> bool {
    place_formation(doc, template, bounds.pixels_to_normalized(center), config)
}

/// Compute each slot's absolute normalized position.
///
/// `x = center.x + offset_x` for both units. Offense adds `offset_y`
/// (deeper into its own backfield); defense subtracts it, keeping the front
/// row nearest the line so a mirrored defensive template still faces the
/// offense.
fn resolve_slot_positions(template: &FormationTemplate, center: NormPoint) -> Vec<NormPoint> {
    let y_sign = match template.kind {
        FormationKind::Offense => 1.0,
        FormationKind::Defense => -1.0,
    };
    template
        .slots
        .iter()
        .map(|slot| NormPoint::new(center.x + slot.offset_x, center.y + y_sign * slot.offset_y))
        .collect()
}

/// Pairwise minimum-distance check of the new batch against itself and
/// against every placed entity. Returns the offending pairs.
fn find_collisions(
    template: &FormationTemplate,
    positions: &[NormPoint],
    existing: &[PlayerEntity],
    min_separation: f32,
) -> Vec<(String, String, f32)> {
    let mut collisions = Vec::new();

    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let dist = positions[i].distance_to(&positions[j]);
            if dist < min_separation {
                collisions.push((
                    slot_name(template, i),
                    slot_name(template, j),
                    dist,
                ));
            }
        }
        for entity in existing {
            let dist = positions[i].distance_to(&entity.anchor);
            if dist < min_separation {
                collisions.push((slot_name(template, i), entity.id.clone(), dist));
            }
        }
    }
    collisions
}

fn slot_name(template: &FormationTemplate, index: usize) -> String {
    format!("{}[{}:{}]", template.name, index, template.slots[index].position)
}

/// One entity per slot, ids unique even for rapid repeated placements:
/// timestamp + slot index + random suffix.
fn build_entities(template: &FormationTemplate, positions: &[NormPoint]) -> Vec<PlayerEntity> {
    let stamp = chrono::Utc::now().timestamp_millis();
    let mut rng = rand::thread_rng();

    template
        .slots
        .iter()
        .zip(positions)
        .enumerate()
        .map(|(index, (slot, &anchor))| {
            let id = format!("p{}-{}-{:08x}", stamp, index, rng.gen::<u32>());
            let mut entity = PlayerEntity::with_id(id, slot.position.clone(), anchor)
                .with_group(slot.group.clone().unwrap_or_else(|| {
                    template.kind.group_tag().to_string()
                }));
            if let Some(label) = &slot.label {
                entity = entity.with_label(label.clone());
            }
            entity
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formation::catalog::find_formation;
    use crate::formation::FormationSlot;

    fn offense_at(xs: &[f32]) -> PlayDocument {
        let entities = xs
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                PlayerEntity::with_id(format!("o{}", i), "WR", NormPoint::new(x, 0.5))
                    .with_group("offense")
            })
            .collect();
        PlayDocument::from_entities(entities)
    }

    #[test]
    fn test_strong_side_majority_right() {
        let doc = offense_at(&[0.6, 0.7, 0.4]);
        let side = detect_offensive_strong_side(doc.entities(), 0.5);
        assert_eq!(side, Some(StrongSide::Right));
    }

    #[test]
    fn test_strong_side_majority_left() {
        let doc = offense_at(&[0.3, 0.35, 0.7]);
        let side = detect_offensive_strong_side(doc.entities(), 0.5);
        assert_eq!(side, Some(StrongSide::Left));
    }

    #[test]
    fn test_strong_side_none_without_offense() {
        let doc = PlayDocument::new();
        assert_eq!(detect_offensive_strong_side(doc.entities(), 0.5), None);

        // Defensive entities alone do not establish a strong side either.
        let defense = PlayDocument::from_entities(vec![PlayerEntity::with_id(
            "d1",
            "MLB",
            NormPoint::new(0.7, 0.4),
        )
        .with_group("defense")]);
        assert_eq!(detect_offensive_strong_side(defense.entities(), 0.5), None);
    }

    #[test]
    fn test_strong_side_tie_broken_by_tight_end() {
        let mut doc = offense_at(&[0.4, 0.6]);
        doc.add(
            PlayerEntity::with_id("te", "TE", NormPoint::new(0.63, 0.5)).with_group("offense"),
        );
        // 2 right vs 1 left: majority alone decides here
        assert_eq!(detect_offensive_strong_side(doc.entities(), 0.5), Some(StrongSide::Right));

        // Exactly tied counts: the TE side decides.
        let tied = PlayDocument::from_entities(vec![
            PlayerEntity::with_id("o0", "WR", NormPoint::new(0.3, 0.5)).with_group("offense"),
            PlayerEntity::with_id("te", "TE", NormPoint::new(0.37, 0.5)).with_group("offense"),
            PlayerEntity::with_id("o1", "WR", NormPoint::new(0.7, 0.5)).with_group("offense"),
            PlayerEntity::with_id("o2", "WR", NormPoint::new(0.75, 0.5)).with_group("offense"),
        ]);
        // 2 left (WR + TE) vs 2 right: TE is on the left
        assert_eq!(detect_offensive_strong_side(tied.entities(), 0.5), Some(StrongSide::Left));
    }

    #[test]
    fn test_placement_appends_all_slots() {
        let mut doc = PlayDocument::new();
        let template = find_formation("I-Formation").unwrap();
        let ok = place_formation(&mut doc, template, NormPoint::CENTER, &PlacementConfig::default());
        assert!(ok);
        assert_eq!(doc.len(), 11);
        // label/group metadata carried from the slots
        let te = doc.entities().iter().find(|e| e.position_label == "TE").unwrap();
        assert_eq!(te.label.as_deref(), Some("Y"));
        assert_eq!(te.group.as_deref(), Some("offense"));
    }

    #[test]
    fn test_placement_is_atomic_on_collision() {
        let mut doc = PlayDocument::new();
        // An entity sitting exactly where the quarterback would land.
        doc.add(PlayerEntity::with_id("blocker", "CONE", NormPoint::new(0.5, 0.535)));
        let before = doc.len();

        let template = find_formation("I-Formation").unwrap();
        let ok = place_formation(&mut doc, template, NormPoint::CENTER, &PlacementConfig::default());
        assert!(!ok, "overlapping placement must be rejected");
        assert_eq!(doc.len(), before, "no entities may be created on rejection");
    }

    #[test]
    fn test_placement_rejects_internal_overlap() {
        let mut doc = PlayDocument::new();
        let cramped = FormationTemplate::new(
            "Cramped",
            FormationKind::Offense,
            false,
            vec![FormationSlot::new("A", 0.0, 0.0), FormationSlot::new("B", 0.01, 0.0)],
        );
        assert!(!place_formation(
            &mut doc,
            &cramped,
            NormPoint::CENTER,
            &PlacementConfig::default()
        ));
        assert!(doc.is_empty());
    }

    #[test]
    fn test_defensive_y_flip_faces_offense() {
        let mut doc = PlayDocument::new();
        let template = find_formation("4-3").unwrap();
        assert!(place_formation(&mut doc, template, NormPoint::CENTER, &PlacementConfig::default()));

        // Defense subtracts offset_y: every defender sits above the center
        // line, nearest row first.
        let le = doc.entities().iter().find(|e| e.position_label == "LE").unwrap();
        let fs = doc.entities().iter().find(|e| e.position_label == "FS").unwrap();
        assert!(le.anchor.y < 0.5);
        assert!(fs.anchor.y < le.anchor.y, "secondary sits deeper than the front");
    }

    #[test]
    fn test_strong_side_slot_lands_on_detected_side() {
        // Offense loaded left of center: the strongside backer must mirror
        // over to the left.
        let mut doc = offense_at(&[0.3, 0.35, 0.7]);
        let template = find_formation("4-3").unwrap();
        assert!(place_formation(
            &mut doc,
            template,
            NormPoint::new(0.5, 0.3),
            &PlacementConfig::default()
        ));
        let slb = doc.entities().iter().find(|e| e.position_label == "SLB").unwrap();
        assert!(slb.anchor.x < 0.5, "SLB must land on the left strong side");
        let wlb = doc.entities().iter().find(|e| e.position_label == "WLB").unwrap();
        assert!(wlb.anchor.x > 0.5, "WLB mirrors opposite");
    }

    #[test]
    fn test_positions_clamped_to_field() {
        let mut doc = PlayDocument::new();
        let template = find_formation("Shotgun Spread").unwrap();
        // Center shifted right: the split-end side would overflow the field.
        assert!(place_formation(
            &mut doc,
            template,
            NormPoint::new(0.7, 0.5),
            &PlacementConfig::default()
        ));
        let z = doc.entities().iter().find(|e| e.label.as_deref() == Some("Z")).unwrap();
        assert_eq!(z.anchor.x, 1.0, "overflowing receiver clamps to the sideline");
        assert!(doc.entities().iter().all(|e| e.anchor.is_valid()));
    }

    #[test]
    fn test_rapid_placements_yield_unique_ids() {
        let mut doc = PlayDocument::new();
        let offense = find_formation("I-Formation").unwrap();
        let defense = find_formation("Nickel").unwrap();
        assert!(place_formation(&mut doc, offense, NormPoint::CENTER, &PlacementConfig::default()));
        assert!(place_formation(&mut doc, defense, NormPoint::CENTER, &PlacementConfig::default()));
        let mut ids: Vec<_> = doc.entities().iter().map(|e| e.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 22);
    }

    #[test]
    fn test_offense_then_strong_side_defense_at_same_center() {
        let mut doc = PlayDocument::new();
        let center = NormPoint::CENTER;
        let offense = find_formation("I-Formation").unwrap();
        let defense = find_formation("4-3").unwrap();

        assert!(place_formation(&mut doc, offense, center, &PlacementConfig::default()));
        assert!(place_formation(&mut doc, defense, center, &PlacementConfig::default()));
        assert_eq!(doc.len(), 22);

        // I-Formation's tight end loads the right: SLB shades right too.
        let slb = doc.entities().iter().find(|e| e.position_label == "SLB").unwrap();
        assert!(slb.anchor.x > center.x);

        // Defensive front sits between the backers and the line.
        let front_y: Vec<f32> = doc
            .entities()
            .iter()
            .filter(|e| e.group.as_deref() == Some("front"))
            .map(|e| e.anchor.y)
            .collect();
        assert_eq!(front_y.len(), 4);
        let backer_y: Vec<f32> = doc
            .entities()
            .iter()
            .filter(|e| e.group.as_deref() == Some("backer"))
            .map(|e| e.anchor.y)
            .collect();
        for fy in &front_y {
            for by in &backer_y {
                assert!(fy > by, "front row must be nearer the line than the backers");
            }
        }
    }
}
