//! Formation templates and the placement engine
//!
//! A [`FormationTemplate`] is immutable configuration: slot offsets relative
//! to a placement center in normalized units. Placement transforms a
//! template (mirroring, offset application, clamping) without ever mutating
//! it, so templates can be reused and the mirroring transform unit-tested in
//! isolation.

pub mod catalog;
pub mod placement;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use catalog::{builtin_formations, find_formation, formation_info, FormationInfo};
pub use placement::{
    detect_offensive_strong_side, place_formation, place_formation_at_pixel, PlacementConfig,
};

/// Which unit a template belongs to. Controls the Y-axis sense of slot
/// offsets at placement time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FormationKind {
    Offense,
    Defense,
}

impl FormationKind {
    pub fn group_tag(&self) -> &'static str {
        match self {
            Self::Offense => "offense",
            Self::Defense => "defense",
        }
    }
}

/// Detected strong side of the offense, left or right of the placement
/// center.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrongSide {
    Left,
    Right,
}

/// One slot of a formation template. Offsets are relative to the placement
/// center in normalized units; templates with a strong side are authored
/// strong-side-right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormationSlot {
    /// Position label carried onto the created entity, e.g. "QB", "SLB".
    pub position: String,
    pub offset_x: f32,
    pub offset_y: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl FormationSlot {
    pub fn new(position: impl Into<String>, offset_x: f32, offset_y: f32) -> Self {
        Self { position: position.into(), offset_x, offset_y, label: None, group: None }
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

/// Immutable formation template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormationTemplate {
    pub name: String,
    pub kind: FormationKind,
    /// When true, strong-side-specific slots must land on the detected
    /// offensive strong side; placement mirrors the template as needed.
    pub has_strong_side: bool,
    pub slots: Vec<FormationSlot>,
}

impl FormationTemplate {
    pub fn new(
        name: impl Into<String>,
        kind: FormationKind,
        has_strong_side: bool,
        slots: Vec<FormationSlot>,
    ) -> Self {
        Self { name: name.into(), kind, has_strong_side, slots }
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Mirrored copy across the vertical center line: every slot's
    /// horizontal offset is negated. Labels and groups are untouched.
    pub fn mirrored(&self) -> Self {
        let mut copy = self.clone();
        for slot in &mut copy.slots {
            slot.offset_x = -slot.offset_x;
        }
        copy
    }
}
