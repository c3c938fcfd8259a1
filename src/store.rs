//! Entity load seam between the adapters and the host persistence layer.

use std::collections::HashMap;

use crate::entities::{Connectivity, Entity, Sensors, Surface, TimeSeries};
use crate::error::{AdapterError, Result};
use crate::types::Gid;

/// Host-provided lookup of stored entities by gid. The typed accessors
/// reject entities of the wrong kind so adapters never downcast by hand.
pub trait EntityStore {
    fn load(&self, gid: Gid) -> Result<&Entity>;

    fn time_series(&self, gid: Gid) -> Result<&TimeSeries> {
        match self.load(gid)? {
            Entity::TimeSeries(e) => Ok(e),
            other => Err(kind_error(gid, "time series", other)),
        }
    }

    fn connectivity(&self, gid: Gid) -> Result<&Connectivity> {
        match self.load(gid)? {
            Entity::Connectivity(e) => Ok(e),
            other => Err(kind_error(gid, "connectivity", other)),
        }
    }

    fn sensors(&self, gid: Gid) -> Result<&Sensors> {
        match self.load(gid)? {
            Entity::Sensors(e) => Ok(e),
            other => Err(kind_error(gid, "sensors", other)),
        }
    }

    fn surface(&self, gid: Gid) -> Result<&Surface> {
        match self.load(gid)? {
            Entity::Surface(e) => Ok(e),
            other => Err(kind_error(gid, "surface", other)),
        }
    }
}

fn kind_error(gid: Gid, expected: &'static str, actual: &Entity) -> AdapterError {
    AdapterError::EntityKind {
        gid: gid.to_string(),
        expected,
        actual: actual.kind(),
    }
}

/// Map-backed store for embedding and tests.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entities: HashMap<Gid, Entity>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity and return its gid.
    pub fn insert(&mut self, entity: Entity) -> Gid {
        let gid = entity.gid();
        self.entities.insert(gid, entity);
        gid
    }
}

impl EntityStore for InMemoryStore {
    fn load(&self, gid: Gid) -> Result<&Entity> {
        self.entities
            .get(&gid)
            .ok_or_else(|| AdapterError::EntityNotFound(gid.to_string()))
    }
}
