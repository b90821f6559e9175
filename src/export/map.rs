//! Map export: one OSM document per map location.

use std::fs;
use std::path::{Path, PathBuf};

use super::attr::tag_block;
use super::context::ExportContext;
use super::document::write_document;
use super::line::encode_line;
use super::osm::{Node, OsmCounts, OsmSink, OsmXmlWriter, Tag};
use super::polygon::encode_polygon;
use super::report::ExportReport;
use crate::dataset::{LayerRecord, MapDb, LINE_LAYERS, POLYGON_LAYERS};
use crate::error::ExportError;
use crate::geo::{MapOrigin, OriginTable};

/// Layer whose records also get a node at their `pose`.
const TRAFFIC_LIGHT_LAYER: &str = "traffic_light";

/// Options for [`export_maps`].
#[derive(Clone, Debug)]
pub struct MapExportOptions {
    pub dataroot: PathBuf,
    pub output_dir: PathBuf,
    /// Maps to export; empty means every location in `origins`.
    pub maps: Vec<String>,
    pub origins: OriginTable,
}

/// Output path of a map document.
pub fn map_output_path(output_dir: &Path, map_name: &str) -> PathBuf {
    output_dir.join(format!("{map_name}.osm"))
}

/// Streams a whole map into `sink`.
///
/// Order: every node, the drivable-area polygons, the polygon layers, the
/// line layers, then one node per traffic light at its pose.
pub fn encode_map<S: OsmSink + ?Sized>(
    db: &MapDb,
    ctx: &mut ExportContext,
    sink: &mut S,
) -> Result<(), ExportError> {
    for record in db.nodes() {
        sink.node(&Node {
            id: ctx.id_for(&record.token),
            position: ctx.project(record.x, record.y)?,
            tags: vec![Tag::new("token", record.token.as_str())],
        })?;
    }
    tracing::debug!(map = db.name(), count = db.nodes().len(), "nodes written");

    for area in db.drivable_areas() {
        for polygon_token in &area.polygon_tokens {
            let shape = db.polygon_record_shape(db.polygon(polygon_token)?)?;
            encode_polygon(ctx, sink, "drivable_area", &shape, &[])?;
        }
    }
    tracing::debug!(
        map = db.name(),
        count = db.drivable_areas().len(),
        "drivable areas written"
    );

    for layer in POLYGON_LAYERS {
        let records = layer_records(db, layer);
        for record in records {
            let shape = db.layer_polygon_shape(record)?;
            encode_polygon(ctx, sink, layer, &shape, &record_tags(record)?)?;
        }
    }

    for layer in LINE_LAYERS {
        let records = layer_records(db, layer);
        for record in records {
            let shape = db.layer_line_shape(record)?;
            encode_line(ctx, sink, layer, &shape, &record_tags(record)?)?;
        }
    }

    for record in db.layer(TRAFFIC_LIGHT_LAYER) {
        let pose = record.pose.ok_or_else(|| ExportError::MalformedGeometry {
            token: record.token.clone(),
            message: "traffic light has no pose".to_string(),
        })?;
        sink.node(&Node {
            id: ctx.new_synthetic_id(),
            position: ctx.project(pose.tx, pose.ty)?,
            tags: vec![Tag::new("ntype", "traffic_light")],
        })?;
    }

    Ok(())
}

fn layer_records<'a>(db: &'a MapDb, layer: &str) -> &'a [LayerRecord] {
    let records = db.layer(layer);
    if records.is_empty() {
        tracing::warn!(map = db.name(), layer, "layer is empty or absent");
    } else {
        tracing::debug!(map = db.name(), layer, count = records.len(), "encoding layer");
    }
    records
}

fn record_tags(record: &LayerRecord) -> Result<Vec<Tag>, ExportError> {
    tag_block(record).map_err(|source| ExportError::TagBlock {
        token: record.token.clone(),
        source,
    })
}

/// Writes one map document to `path`.
pub fn write_map(db: &MapDb, origin: MapOrigin, path: &Path) -> Result<OsmCounts, ExportError> {
    write_document(path, |out| {
        let mut ctx = ExportContext::new(origin);
        let mut writer = OsmXmlWriter::begin(out)?;
        encode_map(db, &mut ctx, &mut writer)?;
        let (_, counts) = writer.finish()?;
        Ok(counts)
    })
}

/// Exports every selected map, isolating failures per map.
///
/// Only an unusable output directory fails the whole call; everything else
/// is recorded in the report.
pub fn export_maps(options: &MapExportOptions) -> Result<ExportReport, ExportError> {
    fs::create_dir_all(&options.output_dir)?;

    let names: Vec<String> = if options.maps.is_empty() {
        options.origins.names().map(str::to_string).collect()
    } else {
        options.maps.clone()
    };

    let mut report = ExportReport::new();
    for name in &names {
        let path = map_output_path(&options.output_dir, name);
        tracing::info!(map = %name, "exporting map");

        match export_map(options, name, &path) {
            Ok(counts) => {
                tracing::info!(
                    map = %name,
                    path = %path.display(),
                    nodes = counts.nodes,
                    ways = counts.ways,
                    relations = counts.relations,
                    "map written"
                );
                report.written(name.as_str(), path, counts.into());
            }
            Err(err) => {
                tracing::error!(map = %name, error = %err, "map export failed");
                report.failed(name.as_str(), err.to_string());
            }
        }
    }

    Ok(report)
}

fn export_map(options: &MapExportOptions, name: &str, path: &Path) -> Result<OsmCounts, ExportError> {
    let origin = options.origins.get(name)?;
    let db = MapDb::load(&options.dataroot, name)?;
    write_map(&db, origin, path)
}
