//! Encoding of dataset records into OSM and GPX documents.
//!
//! Every export unit (one map or one scene) owns an [`ExportContext`] with
//! its own projector and id allocator. Encoders stream elements into an
//! [`OsmSink`] in a fixed order; [`write_document`] makes sure a document
//! on disk is either complete or absent.
//!
//! The orchestrators [`export_maps`] and [`export_scenes`] run many units,
//! record each outcome in an [`ExportReport`], and keep going after a unit
//! fails.

pub mod attr;
mod context;
mod document;
pub mod gpx;
pub mod ids;
mod line;
pub mod map;
pub mod osm;
mod polygon;
pub mod report;
pub mod scene;
pub mod tracks;

pub use attr::{format, tag_block, AttrValue};
pub use context::ExportContext;
pub use document::write_document;
pub use gpx::{timestamp_to_utc, GpxCounts, GpxPoint, GpxWriter};
pub use ids::{IdAllocator, OsmId};
pub use line::{encode_line, LineShape};
pub use map::{encode_map, export_maps, map_output_path, write_map, MapExportOptions};
pub use osm::{
    Member, Node, OsmCounts, OsmElement, OsmSink, OsmXmlWriter, Relation, Role, Tag, Way,
};
pub use polygon::{encode_polygon, PolygonShape};
pub use report::{ExportReport, UnitOutcome, UnitReport, UnitStats};
pub use scene::{
    encode_scene_gpx, encode_scene_osm, export_scenes, scene_output_path, write_scene,
    SceneExportOptions, SceneFormat, DEFAULT_EGO_CHANNEL,
};
pub use tracks::{
    assemble_tracks, EntityKey, Observation, SampleChain, TerminalSample, TrackPoint, Tracks,
    EGO_VEHICLE,
};
