//! Token to OSM id allocation.
//!
//! Dataset records are keyed by opaque string tokens while OSM wants
//! positive integers. [`IdAllocator`] hands out ids in first-seen order,
//! starting at 1, and remembers them so repeated lookups agree.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A positive OSM element id.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OsmId(pub u64);

impl OsmId {
    /// Creates a new OsmId.
    #[inline]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying u64 value.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for OsmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OsmId({})", self.0)
    }
}

impl fmt::Display for OsmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bijective token to id table for one export unit.
///
/// Synthetic ids come from the same counter as token ids, so the two can
/// never collide. An allocator must not outlive the unit it was created
/// for; see [`ExportContext`](super::ExportContext).
#[derive(Debug, Default)]
pub struct IdAllocator {
    by_token: HashMap<String, OsmId>,
    allocated: u64,
}

impl IdAllocator {
    /// Creates an empty allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `token`, allocating the next one on first sight.
    pub fn id_for(&mut self, token: &str) -> OsmId {
        if let Some(id) = self.by_token.get(token) {
            return *id;
        }
        let id = self.next();
        self.by_token.insert(token.to_string(), id);
        id
    }

    /// Allocates an id that no token maps to.
    pub fn new_synthetic_id(&mut self) -> OsmId {
        self.next()
    }

    /// Returns the id already assigned to `token`, without allocating.
    pub fn get(&self, token: &str) -> Option<OsmId> {
        self.by_token.get(token).copied()
    }

    /// Number of ids handed out so far, token-backed and synthetic.
    pub fn allocated(&self) -> u64 {
        self.allocated
    }

    fn next(&mut self) -> OsmId {
        self.allocated += 1;
        OsmId(self.allocated)
    }
}
