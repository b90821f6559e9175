//! Line encoding: one open way per line record.

use super::context::ExportContext;
use super::osm::{OsmSink, Tag, Way};
use crate::error::ExportError;

/// Borrowed line geometry of one record.
#[derive(Clone, Copy, Debug)]
pub struct LineShape<'a> {
    pub token: &'a str,
    pub nodes: &'a [String],
}

/// Writes one way following the line's nodes, without closing it.
pub fn encode_line<S: OsmSink + ?Sized>(
    ctx: &mut ExportContext,
    sink: &mut S,
    layer: &str,
    shape: &LineShape<'_>,
    extra: &[Tag],
) -> Result<(), ExportError> {
    if shape.nodes.is_empty() {
        return Err(ExportError::MalformedGeometry {
            token: shape.token.to_string(),
            message: "line has no nodes".to_string(),
        });
    }

    let id = ctx.id_for(shape.token);
    let refs = shape.nodes.iter().map(|token| ctx.id_for(token)).collect();

    let mut tags = Vec::with_capacity(extra.len() + 1);
    tags.push(Tag::new("dtype", layer));
    tags.extend_from_slice(extra);

    sink.way(&Way { id, refs, tags })?;
    Ok(())
}
