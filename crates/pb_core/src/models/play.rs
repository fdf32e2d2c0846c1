//! Play document
//!
//! The in-memory play document owns every placed entity. The external
//! collaborator (remote store, out of scope) hands the engine a serializable
//! entity array and receives the same shape back; `load -> animate -> save`
//! reproduces the array losslessly, modulo ids of newly placed entities.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{PlayError, Result};
use crate::models::entity::{PlayerEntity, RouteSegment};

/// Errors raised while parsing or validating an external play document.
#[derive(thiserror::Error, Debug)]
pub enum PlayDocError {
    #[error("invalid json: {0}")]
    InvalidJson(String),
    #[error("schema/validation error: {0}")]
    Validation(String),
    #[error("io error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for PlayDocError {
    fn from(e: serde_json::Error) -> Self {
        PlayDocError::InvalidJson(e.to_string())
    }
}

/// The play document: an ordered collection of placed entities.
///
/// Serializes transparently as the raw entity array so the external shape
/// stays exactly `[{id, positionLabel, anchor, ...}, ...]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct PlayDocument {
    entities: Vec<PlayerEntity>,
}

impl PlayDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entities(entities: Vec<PlayerEntity>) -> Self {
        Self { entities }
    }

    #[inline]
    pub fn entities(&self) -> &[PlayerEntity] {
        &self.entities
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&PlayerEntity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Append a single entity.
    pub fn add(&mut self, entity: PlayerEntity) {
        self.entities.push(entity);
    }

    /// Append a whole placement batch in one operation.
    pub fn extend(&mut self, batch: Vec<PlayerEntity>) {
        self.entities.extend(batch);
    }

    /// Remove an entity by id, returning it when present.
    pub fn remove(&mut self, id: &str) -> Option<PlayerEntity> {
        let idx = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.remove(idx))
    }

    /// Destroy every entity.
    pub fn clear(&mut self) {
        self.entities.clear();
    }

    /// Replace an entity's main route with a new entity value.
    pub fn set_main_route(&mut self, id: &str, route: RouteSegment) -> Result<()> {
        let idx = self
            .entities
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| PlayError::MissingEntity(id.to_string()))?;
        let updated = self.entities[idx].clone().with_main_route(route);
        self.entities[idx] = updated;
        Ok(())
    }

    /// Replace an entity's pre-snap route with a new entity value.
    pub fn set_pre_snap_route(&mut self, id: &str, route: RouteSegment) -> Result<()> {
        let idx = self
            .entities
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| PlayError::MissingEntity(id.to_string()))?;
        let updated = self.entities[idx].clone().with_pre_snap_route(route);
        self.entities[idx] = updated;
        Ok(())
    }

    /// Serialize to the external JSON array shape.
    pub fn to_json(&self) -> std::result::Result<String, PlayDocError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse the external JSON array shape, then sanitize and validate.
    pub fn from_json(data: &str) -> std::result::Result<Self, PlayDocError> {
        let mut doc: PlayDocument = serde_json::from_str(data)?;
        doc.sanitize();
        doc.validate()?;
        Ok(doc)
    }

    /// Clamp every stored coordinate back into [0,1]. External documents may
    /// carry out-of-range or non-finite values; geometry stays total.
    pub fn sanitize(&mut self) {
        for entity in &mut self.entities {
            entity.anchor = entity.anchor.clamped();
        }
    }

    /// Structural validation: non-empty unique ids, no empty routes.
    pub fn validate(&self) -> std::result::Result<(), PlayDocError> {
        let mut seen = std::collections::HashSet::new();
        for entity in &self.entities {
            if entity.id.trim().is_empty() {
                return Err(PlayDocError::Validation("entity id must be non-empty".to_string()));
            }
            if !seen.insert(entity.id.as_str()) {
                return Err(PlayDocError::Validation(format!(
                    "duplicate entity id '{}'",
                    entity.id
                )));
            }
            for route in [&entity.pre_snap_route, &entity.main_route].into_iter().flatten() {
                if route.is_empty() {
                    return Err(PlayDocError::Validation(format!(
                        "entity '{}' has an empty route",
                        entity.id
                    )));
                }
            }
        }
        Ok(())
    }
}
