//! Polygon topology encoding.
//!
//! A polygon without holes becomes one closed way. A polygon with holes
//! becomes a closed outer way, one closed way per hole and a
//! `type=multipolygon` relation tying them together; the relation carries
//! the record's identity and tags.

use super::context::ExportContext;
use super::ids::OsmId;
use super::osm::{Member, OsmSink, Relation, Role, Tag, Way};
use crate::dataset::Hole;
use crate::error::ExportError;

/// Borrowed polygon geometry of one record.
#[derive(Clone, Copy, Debug)]
pub struct PolygonShape<'a> {
    /// Token whose id the emitted way or relation takes.
    pub token: &'a str,
    pub exterior: &'a [String],
    /// `None` when the record has no `holes` field at all.
    pub holes: Option<&'a [Hole]>,
}

impl<'a> PolygonShape<'a> {
    /// A shape is hole-free with no holes field, an empty holes list, or a
    /// single hole that has no nodes.
    pub fn is_hole_free(&self) -> bool {
        match self.holes {
            None | Some([]) => true,
            Some([only]) => only.node_tokens.is_empty(),
            Some(_) => false,
        }
    }

    /// Exterior ring followed by the rings that will actually be emitted.
    fn rings(&self) -> impl Iterator<Item = &'a [String]> + 'a {
        let holes: &'a [Hole] = if self.is_hole_free() {
            &[]
        } else {
            self.holes.unwrap_or_default()
        };
        std::iter::once(self.exterior).chain(holes.iter().map(|hole| hole.node_tokens.as_slice()))
    }
}

/// Writes the ways (and relation) for one polygon record.
///
/// `extra` is appended after the `dtype` tag. Every ring must have at least
/// one node; an empty ring fails the call before anything is written.
pub fn encode_polygon<S: OsmSink + ?Sized>(
    ctx: &mut ExportContext,
    sink: &mut S,
    layer: &str,
    shape: &PolygonShape<'_>,
    extra: &[Tag],
) -> Result<(), ExportError> {
    if let Some(position) = shape.rings().position(|ring| ring.is_empty()) {
        let ring = if position == 0 {
            "exterior ring".to_string()
        } else {
            format!("hole {}", position - 1)
        };
        return Err(ExportError::MalformedGeometry {
            token: shape.token.to_string(),
            message: format!("{ring} has no nodes"),
        });
    }

    let dtype = Tag::new("dtype", layer);

    if shape.is_hole_free() {
        let id = ctx.id_for(shape.token);
        let refs = closed_ring(ctx, shape.exterior);
        let mut tags = Vec::with_capacity(extra.len() + 1);
        tags.push(dtype);
        tags.extend_from_slice(extra);
        sink.way(&Way { id, refs, tags })?;
        return Ok(());
    }

    let outer_id = ctx.new_synthetic_id();
    let outer = Way {
        id: outer_id,
        refs: closed_ring(ctx, shape.exterior),
        tags: vec![dtype.clone()],
    };
    sink.way(&outer)?;

    let holes = shape.holes.unwrap_or_default();
    let mut members = Vec::with_capacity(holes.len() + 1);
    members.push(Member {
        way: outer_id,
        role: Role::Outer,
    });

    for hole in holes {
        let inner_id = ctx.new_synthetic_id();
        let inner = Way {
            id: inner_id,
            refs: closed_ring(ctx, &hole.node_tokens),
            tags: vec![],
        };
        sink.way(&inner)?;
        members.push(Member {
            way: inner_id,
            role: Role::Inner,
        });
    }

    let mut tags = Vec::with_capacity(extra.len() + 2);
    tags.push(Tag::new("type", "multipolygon"));
    tags.push(dtype);
    tags.extend_from_slice(extra);

    sink.relation(&Relation {
        id: ctx.id_for(shape.token),
        members,
        tags,
    })?;
    Ok(())
}

/// Node refs of a non-empty ring, closed by repeating the first node.
fn closed_ring(ctx: &mut ExportContext, nodes: &[String]) -> Vec<OsmId> {
    let mut refs: Vec<OsmId> = nodes.iter().map(|token| ctx.id_for(token)).collect();
    if let Some(first) = refs.first().copied() {
        refs.push(first);
    }
    refs
}
