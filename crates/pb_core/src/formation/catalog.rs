//! Built-in formation catalog
//!
//! A named set of ready-made templates the placement engine consumes but
//! never persists. Offsets are normalized units relative to the placement
//! center; strong-side templates are authored strong-side-right.

use once_cell::sync::Lazy;
use serde::Serialize;

use super::{FormationKind, FormationSlot, FormationTemplate};

static BUILTIN: Lazy<Vec<FormationTemplate>> = Lazy::new(|| {
    vec![
        create_i_formation(),
        create_pro_set(),
        create_shotgun_spread(),
        create_43(),
        create_34(),
        create_nickel(),
    ]
});

/// Every built-in template.
pub fn builtin_formations() -> &'static [FormationTemplate] {
    &BUILTIN
}

/// Look up a built-in template by name.
pub fn find_formation(name: &str) -> Option<&'static FormationTemplate> {
    BUILTIN.iter().find(|t| t.name == name)
}

/// Catalog metadata for a formation picker.
#[derive(Debug, Clone, Serialize)]
pub struct FormationInfo {
    pub name: &'static str,
    pub kind: FormationKind,
    pub slot_count: usize,
    pub description: &'static str,
}

/// Picker metadata for every built-in template.
pub fn formation_info() -> Vec<FormationInfo> {
    BUILTIN
        .iter()
        .map(|t| FormationInfo {
            name: t.name.as_str(),
            kind: t.kind,
            slot_count: t.slot_count(),
            description: describe(&t.name),
        })
        .collect()
}

fn describe(name: &str) -> &'static str {
    match name {
        "I-Formation" => "Two-back power set with the fullback and tailback stacked behind the quarterback.",
        "Pro Set" => "Split-back set; keeps both halves of the backfield threatening either edge.",
        "Shotgun Spread" => "Quarterback off the line with four receivers stretching the field horizontally.",
        "4-3" => "Four down linemen, three linebackers; the strongside backer shades the tight end.",
        "3-4" => "Three down linemen, four linebackers; outside backers set the edge.",
        "Nickel" => "Five defensive backs against spread personnel; one linebacker leaves the box.",
        _ => "",
    }
}

// ============================================================================
// Offense
// ============================================================================

/// I-Formation (11 slots, strong side right via the tight end)
fn create_i_formation() -> FormationTemplate {
    FormationTemplate::new(
        "I-Formation",
        FormationKind::Offense,
        false,
        vec![
            FormationSlot::new("C", 0.0, 0.0),
            FormationSlot::new("LG", -0.045, 0.0),
            FormationSlot::new("RG", 0.045, 0.0),
            FormationSlot::new("LT", -0.09, 0.0),
            FormationSlot::new("RT", 0.09, 0.0),
            FormationSlot::new("TE", 0.135, 0.0).with_label("Y"),
            FormationSlot::new("QB", 0.0, 0.035),
            FormationSlot::new("FB", 0.0, 0.095),
            FormationSlot::new("TB", 0.0, 0.155),
            FormationSlot::new("WR", -0.32, 0.005).with_label("X"),
            FormationSlot::new("WR", 0.28, 0.02).with_label("Z"),
        ],
    )
}

/// Pro Set (11 slots, split backfield)
fn create_pro_set() -> FormationTemplate {
    FormationTemplate::new(
        "Pro Set",
        FormationKind::Offense,
        false,
        vec![
            FormationSlot::new("C", 0.0, 0.0),
            FormationSlot::new("LG", -0.045, 0.0),
            FormationSlot::new("RG", 0.045, 0.0),
            FormationSlot::new("LT", -0.09, 0.0),
            FormationSlot::new("RT", 0.09, 0.0),
            FormationSlot::new("TE", 0.135, 0.0).with_label("Y"),
            FormationSlot::new("QB", 0.0, 0.035),
            FormationSlot::new("HB", -0.06, 0.12),
            FormationSlot::new("FB", 0.06, 0.12),
            FormationSlot::new("WR", -0.32, 0.005).with_label("X"),
            FormationSlot::new("WR", 0.28, 0.02).with_label("Z"),
        ],
    )
}

/// Shotgun Spread (11 slots, four receivers)
fn create_shotgun_spread() -> FormationTemplate {
    FormationTemplate::new(
        "Shotgun Spread",
        FormationKind::Offense,
        false,
        vec![
            FormationSlot::new("C", 0.0, 0.0),
            FormationSlot::new("LG", -0.045, 0.0),
            FormationSlot::new("RG", 0.045, 0.0),
            FormationSlot::new("LT", -0.09, 0.0),
            FormationSlot::new("RT", 0.09, 0.0),
            FormationSlot::new("QB", 0.0, 0.11),
            FormationSlot::new("HB", -0.07, 0.11),
            FormationSlot::new("WR", -0.34, 0.005).with_label("X"),
            FormationSlot::new("WR", 0.34, 0.01).with_label("Z"),
            FormationSlot::new("SLOT", -0.21, 0.02).with_label("H"),
            FormationSlot::new("SLOT", 0.21, 0.02).with_label("Y"),
        ],
    )
}

// ============================================================================
// Defense
// ============================================================================

/// 4-3 (11 slots, strong side aware)
///
/// The defensive front carries the smallest |offset_y| so the line lands
/// nearest the offense after the placement Y-flip.
fn create_43() -> FormationTemplate {
    FormationTemplate::new(
        "4-3",
        FormationKind::Defense,
        true,
        vec![
            FormationSlot::new("LE", -0.13, 0.06).with_group("front"),
            FormationSlot::new("LDT", -0.045, 0.06).with_group("front"),
            FormationSlot::new("RDT", 0.045, 0.06).with_group("front"),
            FormationSlot::new("RE", 0.13, 0.06).with_group("front"),
            FormationSlot::new("WLB", -0.12, 0.14).with_group("backer"),
            FormationSlot::new("MLB", 0.0, 0.14).with_group("backer"),
            FormationSlot::new("SLB", 0.12, 0.14).with_group("backer"),
            FormationSlot::new("CB", -0.33, 0.10).with_label("LCB").with_group("secondary"),
            FormationSlot::new("CB", 0.33, 0.10).with_label("RCB").with_group("secondary"),
            FormationSlot::new("FS", -0.07, 0.26).with_group("secondary"),
            FormationSlot::new("SS", 0.11, 0.215).with_group("secondary"),
        ],
    )
}

/// 3-4 (11 slots, strong side aware)
fn create_34() -> FormationTemplate {
    FormationTemplate::new(
        "3-4",
        FormationKind::Defense,
        true,
        vec![
            FormationSlot::new("LE", -0.10, 0.06).with_group("front"),
            FormationSlot::new("NT", 0.0, 0.06).with_group("front"),
            FormationSlot::new("RE", 0.10, 0.06).with_group("front"),
            FormationSlot::new("WLB", -0.19, 0.12).with_group("backer"),
            FormationSlot::new("LILB", -0.05, 0.14).with_group("backer"),
            FormationSlot::new("RILB", 0.05, 0.14).with_group("backer"),
            FormationSlot::new("SLB", 0.19, 0.12).with_group("backer"),
            FormationSlot::new("CB", -0.33, 0.10).with_label("LCB").with_group("secondary"),
            FormationSlot::new("CB", 0.33, 0.10).with_label("RCB").with_group("secondary"),
            FormationSlot::new("FS", -0.07, 0.26).with_group("secondary"),
            FormationSlot::new("SS", 0.11, 0.215).with_group("secondary"),
        ],
    )
}

/// Nickel (11 slots, five defensive backs)
fn create_nickel() -> FormationTemplate {
    FormationTemplate::new(
        "Nickel",
        FormationKind::Defense,
        false,
        vec![
            FormationSlot::new("LE", -0.13, 0.06).with_group("front"),
            FormationSlot::new("LDT", -0.045, 0.06).with_group("front"),
            FormationSlot::new("RDT", 0.045, 0.06).with_group("front"),
            FormationSlot::new("RE", 0.13, 0.06).with_group("front"),
            FormationSlot::new("MLB", -0.06, 0.14).with_group("backer"),
            FormationSlot::new("WLB", 0.06, 0.14).with_group("backer"),
            FormationSlot::new("CB", -0.33, 0.10).with_label("LCB").with_group("secondary"),
            FormationSlot::new("CB", 0.33, 0.10).with_label("RCB").with_group("secondary"),
            FormationSlot::new("NB", 0.21, 0.12).with_group("secondary"),
            FormationSlot::new("FS", -0.07, 0.26).with_group("secondary"),
            FormationSlot::new("SS", 0.09, 0.22).with_group("secondary"),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lookup() {
        assert!(find_formation("I-Formation").is_some());
        assert!(find_formation("4-3").is_some());
        assert!(find_formation("5-2 Monster").is_none());
    }

    #[test]
    fn test_all_builtins_have_eleven_slots() {
        for template in builtin_formations() {
            assert_eq!(template.slot_count(), 11, "{} should field 11", template.name);
        }
    }

    #[test]
    fn test_defensive_front_has_smallest_depth() {
        for template in builtin_formations() {
            if template.kind != FormationKind::Defense {
                continue;
            }
            let front_max = template
                .slots
                .iter()
                .filter(|s| s.group.as_deref() == Some("front"))
                .map(|s| s.offset_y.abs())
                .fold(0.0f32, f32::max);
            let rest_min = template
                .slots
                .iter()
                .filter(|s| s.group.as_deref() != Some("front"))
                .map(|s| s.offset_y.abs())
                .fold(f32::INFINITY, f32::min);
            assert!(
                front_max < rest_min,
                "{}: front must sit nearest the line ({} vs {})",
                template.name,
                front_max,
                rest_min
            );
        }
    }

    #[test]
    fn test_strong_side_templates_author_strong_right() {
        let t43 = find_formation("4-3").unwrap();
        let slb = t43.slots.iter().find(|s| s.position == "SLB").unwrap();
        assert!(slb.offset_x > 0.0, "strongside backer authored on the right");
    }

    #[test]
    fn test_formation_info_covers_catalog() {
        let info = formation_info();
        assert_eq!(info.len(), builtin_formations().len());
        assert!(info.iter().all(|i| !i.description.is_empty() && !i.name.is_empty()));
    }
}
