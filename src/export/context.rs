//! Per-unit export state.

use super::ids::{IdAllocator, OsmId};
use crate::error::ExportError;
use crate::geo::{LatLon, MapOrigin, OriginTable, Projector};

/// State scoped to one export unit (a map or a scene).
///
/// Built fresh for every unit and dropped once its document is written, so
/// ids and the active origin never leak between units.
#[derive(Debug)]
pub struct ExportContext {
    projector: Projector,
    ids: IdAllocator,
}

impl ExportContext {
    /// Creates a context for an origin.
    pub fn new(origin: MapOrigin) -> Self {
        Self {
            projector: Projector::new(origin),
            ids: IdAllocator::new(),
        }
    }

    /// Creates a context for a named location.
    pub fn for_location(origins: &OriginTable, location: &str) -> Result<Self, ExportError> {
        origins.get(location).map(Self::new)
    }

    /// Projects local map coordinates.
    #[inline]
    pub fn project(&self, x: f64, y: f64) -> Result<LatLon, ExportError> {
        self.projector.project(x, y)
    }

    /// Id for a dataset token.
    #[inline]
    pub fn id_for(&mut self, token: &str) -> OsmId {
        self.ids.id_for(token)
    }

    /// Id for a generated element.
    #[inline]
    pub fn new_synthetic_id(&mut self) -> OsmId {
        self.ids.new_synthetic_id()
    }

    /// Ids handed out so far in this unit.
    pub fn ids(&self) -> &IdAllocator {
        &self.ids
    }

}
