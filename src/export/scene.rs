//! Scene export: one GPX or OSM document per scene.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::attr::tag_block;
use super::context::ExportContext;
use super::document::write_document;
use super::gpx::{timestamp_to_utc, GpxPoint, GpxWriter};
use super::osm::{Node, OsmSink, OsmXmlWriter, Tag, Way};
use super::report::{ExportReport, UnitStats};
use super::tracks::{assemble_tracks, EntityKey, Observation, TerminalSample, Tracks};
use crate::dataset::{SampleAnnotation, SceneDb};
use crate::error::ExportError;
use crate::geo::{MapOrigin, OriginTable, Projector};

/// Default channel whose key frames provide the ego pose.
pub const DEFAULT_EGO_CHANNEL: &str = "CAM_FRONT";

/// Output format of a scene document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SceneFormat {
    /// One track per entity.
    #[default]
    Gpx,
    /// One node per observation and one way per entity.
    Osm,
}

impl fmt::Display for SceneFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpx => write!(f, "gpx"),
            Self::Osm => write!(f, "osm"),
        }
    }
}

/// Options for [`export_scenes`].
#[derive(Clone, Debug)]
pub struct SceneExportOptions {
    pub dataroot: PathBuf,
    pub version: String,
    pub output_dir: PathBuf,
    pub format: SceneFormat,
    /// Scene indices to export; empty means all of them.
    pub scenes: Vec<usize>,
    pub origins: OriginTable,
    pub terminal: TerminalSample,
    pub ego_channel: String,
}

/// Output path of a scene document: `scene_<n>.gpx` or
/// `scene_<n>_<location>.osm`.
pub fn scene_output_path(
    output_dir: &Path,
    index: usize,
    location: &str,
    format: SceneFormat,
) -> PathBuf {
    match format {
        SceneFormat::Gpx => output_dir.join(format!("scene_{index}.gpx")),
        SceneFormat::Osm => output_dir.join(format!("scene_{index}_{location}.osm")),
    }
}

/// Writes one GPX track per entity.
pub fn encode_scene_gpx<W: Write>(
    tracks: &Tracks<'_>,
    projector: &Projector,
    writer: &mut GpxWriter<W>,
) -> Result<(), ExportError> {
    for (key, points) in tracks.iter() {
        let points = points
            .iter()
            .map(|point| {
                let [x, y, _] = point.observation.translation();
                Ok(GpxPoint {
                    position: projector.project(x, y)?,
                    time: timestamp_to_utc(point.timestamp)?,
                })
            })
            .collect::<Result<Vec<_>, ExportError>>()?;
        writer.track(key.name(), &points)?;
    }
    Ok(())
}

/// Writes each track as its observation nodes followed by a way linking
/// them in chain order.
pub fn encode_scene_osm<S: OsmSink + ?Sized>(
    db: &SceneDb,
    tracks: &Tracks<'_>,
    ctx: &mut ExportContext,
    sink: &mut S,
) -> Result<(), ExportError> {
    for (key, points) in tracks.iter() {
        let mut refs = Vec::with_capacity(points.len());
        for point in points {
            let observation = point.observation;
            let [x, y, _] = observation.translation();
            let id = ctx.id_for(observation.token());
            sink.node(&Node {
                id,
                position: ctx.project(x, y)?,
                tags: observation_tags(db, observation)?,
            })?;
            refs.push(id);
        }

        let mut tags = vec![Tag::new("token", key.name())];
        let id = match key {
            EntityKey::EgoVehicle => ctx.new_synthetic_id(),
            EntityKey::Instance(token) => {
                let category = points.iter().find_map(|point| match point.observation {
                    Observation::Annotation(annotation) => annotation.category_name.as_deref(),
                    Observation::Ego(_) => None,
                });
                if let Some(category) = category {
                    tags.push(Tag::new("category_name", category));
                }
                tags.extend(record_tags(token, db.instance(token)?)?);
                ctx.id_for(token)
            }
        };

        sink.way(&Way { id, refs, tags })?;
    }
    Ok(())
}

/// `token` first, then every other field, then attribute names for
/// annotations.
fn observation_tags(db: &SceneDb, observation: Observation<'_>) -> Result<Vec<Tag>, ExportError> {
    let token = observation.token();
    let mut tags = vec![Tag::new("token", token)];
    match observation {
        Observation::Ego(pose) => tags.extend(record_tags(token, pose)?),
        Observation::Annotation(annotation) => {
            tags.extend(record_tags(token, annotation)?);
            tags.push(Tag::new("attributes", attribute_names(db, annotation)?));
        }
    }
    Ok(tags)
}

/// Generic tag block without the `token` field, which callers emit first.
fn record_tags<T: Serialize>(token: &str, record: &T) -> Result<Vec<Tag>, ExportError> {
    let mut tags = tag_block(record).map_err(|source| ExportError::TagBlock {
        token: token.to_string(),
        source,
    })?;
    tags.retain(|tag| tag.key != "token");
    Ok(tags)
}

fn attribute_names(db: &SceneDb, annotation: &SampleAnnotation) -> Result<String, ExportError> {
    let names = annotation
        .attribute_tokens
        .iter()
        .map(|token| db.attribute(token).map(|attribute| attribute.name.as_str()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names.join("|"))
}

/// Exports every selected scene, isolating failures per scene.
///
/// Loading the scene tables or creating the output directory fails the
/// whole call; anything else is recorded in the report.
pub fn export_scenes(options: &SceneExportOptions) -> Result<ExportReport, ExportError> {
    let db = SceneDb::load(&options.dataroot, &options.version)?;
    tracing::info!(
        version = %options.version,
        scenes = db.scenes().len(),
        "scene tables loaded"
    );
    fs::create_dir_all(&options.output_dir)?;

    let indices: Vec<usize> = if options.scenes.is_empty() {
        (0..db.scenes().len()).collect()
    } else {
        options.scenes.clone()
    };

    let mut report = ExportReport::new();
    for index in indices {
        let unit = format!("scene {index}");
        tracing::info!(scene = index, format = %options.format, "exporting scene");

        match export_scene(&db, options, index) {
            Ok((path, stats)) => {
                tracing::info!(scene = index, path = %path.display(), %stats, "scene written");
                report.written(unit, path, stats);
            }
            Err(err) => {
                tracing::error!(scene = index, error = %err, "scene export failed");
                report.failed(unit, err.to_string());
            }
        }
    }

    Ok(report)
}

fn export_scene(
    db: &SceneDb,
    options: &SceneExportOptions,
    index: usize,
) -> Result<(PathBuf, UnitStats), ExportError> {
    let scene = db.scene(index)?;
    let location = db.location_of(scene)?;
    let origin = options.origins.get(location)?;

    let chain = db.chain(&options.ego_channel);
    let tracks = assemble_tracks(&chain, &scene.first_sample_token, options.terminal)?;
    if tracks.is_empty() {
        tracing::warn!(
            scene = index,
            name = %scene.name,
            "scene has no track points (single-sample chain?)"
        );
    }
    tracing::debug!(
        scene = index,
        tracks = tracks.len(),
        points = tracks.point_count(),
        "tracks assembled"
    );

    let path = scene_output_path(&options.output_dir, index, location, options.format);
    let stats = write_scene(db, &tracks, origin, options.format, &path)?;
    Ok((path, stats))
}

/// Writes assembled tracks as one scene document.
pub fn write_scene(
    db: &SceneDb,
    tracks: &Tracks<'_>,
    origin: MapOrigin,
    format: SceneFormat,
    path: &Path,
) -> Result<UnitStats, ExportError> {
    write_document(path, |out| match format {
        SceneFormat::Gpx => {
            let projector = Projector::new(origin);
            let mut writer = GpxWriter::begin(out)?;
            encode_scene_gpx(tracks, &projector, &mut writer)?;
            let (_, counts) = writer.finish()?;
            Ok(counts.into())
        }
        SceneFormat::Osm => {
            let mut ctx = ExportContext::new(origin);
            let mut writer = OsmXmlWriter::begin(out)?;
            encode_scene_osm(db, tracks, &mut ctx, &mut writer)?;
            let (_, counts) = writer.finish()?;
            Ok(counts.into())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::SceneTables;
    use crate::export::ids::OsmId;
    use crate::export::osm::OsmElement;
    use serde::de::DeserializeOwned;
    use serde_json::{json, Value};

    fn from_json<T: DeserializeOwned>(value: Value) -> Vec<T> {
        serde_json::from_value(value).expect("valid fixture table")
    }

    /// Three samples; instance `i1` is seen at s1 and s2, `i2` only at s3.
    fn db() -> SceneDb {
        let tables = SceneTables {
            scene: from_json(json!([{
                "token": "sc1", "name": "scene-0001", "log_token": "log1",
                "first_sample_token": "s1"
            }])),
            log: from_json(json!([{"token": "log1", "location": "singapore-onenorth"}])),
            sample: from_json(json!([
                {"token": "s1", "timestamp": 1000000, "prev": "", "next": "s2"},
                {"token": "s2", "timestamp": 1500000, "prev": "s1", "next": "s3"},
                {"token": "s3", "timestamp": 2000000, "prev": "s2", "next": ""}
            ])),
            sample_data: from_json(json!([
                {"token": "sd1", "sample_token": "s1", "ego_pose_token": "ep1", "calibrated_sensor_token": "cs1", "is_key_frame": true},
                {"token": "sd2", "sample_token": "s2", "ego_pose_token": "ep2", "calibrated_sensor_token": "cs1", "is_key_frame": true},
                {"token": "sd3", "sample_token": "s3", "ego_pose_token": "ep3", "calibrated_sensor_token": "cs1", "is_key_frame": true}
            ])),
            ego_pose: from_json(json!([
                {"token": "ep1", "translation": [0.0, 0.0, 0.0], "timestamp": 1000000},
                {"token": "ep2", "translation": [1.0, 0.0, 0.0], "timestamp": 1500000},
                {"token": "ep3", "translation": [2.0, 0.0, 0.0], "timestamp": 2000000}
            ])),
            sample_annotation: from_json(json!([
                {"token": "a1", "sample_token": "s1", "instance_token": "i1", "translation": [5.0, 5.0, 0.0], "attribute_tokens": ["at1", "at2"]},
                {"token": "a2", "sample_token": "s2", "instance_token": "i1", "translation": [6.0, 5.0, 0.0], "attribute_tokens": []},
                {"token": "a3", "sample_token": "s3", "instance_token": "i2", "translation": [7.0, 5.0, 0.0], "attribute_tokens": []}
            ])),
            instance: from_json(json!([
                {"token": "i1", "category_token": "c1", "nbr_annotations": 2},
                {"token": "i2", "category_token": "c1", "nbr_annotations": 1}
            ])),
            category: from_json(json!([{"token": "c1", "name": "vehicle.car"}])),
            attribute: from_json(json!([
                {"token": "at1", "name": "vehicle.moving"},
                {"token": "at2", "name": "vehicle.parked"}
            ])),
            sensor: from_json(json!([{"token": "se1", "channel": "CAM_FRONT"}])),
            calibrated_sensor: from_json(json!([{"token": "cs1", "sensor_token": "se1"}])),
        };
        SceneDb::from_tables(tables)
    }

    fn encode_osm(db: &SceneDb) -> Vec<OsmElement> {
        let chain = db.chain(DEFAULT_EGO_CHANNEL);
        let tracks = assemble_tracks(&chain, "s1", TerminalSample::Exclude).expect("tracks");
        let mut ctx =
            ExportContext::for_location(&OriginTable::builtin(), "singapore-onenorth").expect("ctx");
        let mut sink = Vec::new();
        encode_scene_osm(db, &tracks, &mut ctx, &mut sink).expect("encode");
        sink
    }

    #[test]
    fn osm_scene_emits_nodes_then_way_per_track() {
        let db = db();
        let elements = encode_osm(&db);

        // ego: 2 nodes + way, i1: 2 nodes + way; i2 only at the terminal sample.
        assert_eq!(elements.len(), 6);
        let OsmElement::Way(ego) = &elements[2] else {
            panic!("expected ego way: {:?}", elements[2]);
        };
        assert_eq!(ego.refs, vec![OsmId(1), OsmId(2)]);
        assert_eq!(ego.tags, vec![Tag::new("token", "egovehicle")]);
        assert_eq!(ego.id, OsmId(3));

        let OsmElement::Way(car) = &elements[5] else {
            panic!("expected instance way: {:?}", elements[5]);
        };
        assert_eq!(car.id, OsmId(6));
        assert_eq!(car.refs, vec![OsmId(4), OsmId(5)]);
        assert_eq!(car.tags[0], Tag::new("token", "i1"));
        assert_eq!(car.tags[1], Tag::new("category_name", "vehicle.car"));
        assert!(car.tags.contains(&Tag::new("nbr_annotations", "2")));
        assert!(car.tags.contains(&Tag::new("category_token", "c1")));
    }

    #[test]
    fn annotation_nodes_carry_fields_and_attribute_names() {
        let db = db();
        let elements = encode_osm(&db);
        let OsmElement::Node(first) = &elements[3] else {
            panic!("expected annotation node: {:?}", elements[3]);
        };
        assert_eq!(first.tags[0], Tag::new("token", "a1"));
        assert_eq!(
            first.tags.iter().filter(|tag| tag.key == "token").count(),
            1
        );
        assert!(first.tags.contains(&Tag::new("category_name", "vehicle.car")));
        assert!(first.tags.contains(&Tag::new("instance_token", "i1")));
        assert_eq!(
            first.tags.last(),
            Some(&Tag::new("attributes", "vehicle.moving|vehicle.parked"))
        );
    }

    #[test]
    fn ego_nodes_carry_pose_fields() {
        let db = db();
        let elements = encode_osm(&db);
        let OsmElement::Node(pose) = &elements[0] else {
            panic!("expected ego node: {:?}", elements[0]);
        };
        assert_eq!(pose.tags[0], Tag::new("token", "ep1"));
        assert!(pose.tags.contains(&Tag::new("translation", "[0.0, 0.0, 0.0]")));
        assert!(pose.tags.iter().all(|tag| tag.key != "attributes"));
    }

    #[test]
    fn gpx_scene_has_one_track_per_entity() {
        let db = db();
        let chain = db.chain(DEFAULT_EGO_CHANNEL);
        let tracks = assemble_tracks(&chain, "s1", TerminalSample::Include).expect("tracks");
        let origin = OriginTable::builtin().get("singapore-onenorth").expect("origin");

        let mut writer = GpxWriter::begin(Vec::new()).expect("begin");
        encode_scene_gpx(&tracks, &Projector::new(origin), &mut writer).expect("encode");
        let (bytes, counts) = writer.finish().expect("finish");
        let xml = String::from_utf8(bytes).expect("utf-8");

        assert_eq!(counts.tracks, 3);
        assert_eq!(counts.points, 3 + 2 + 1);
        assert!(xml.contains("<name>egovehicle</name>"));
        assert!(xml.contains("<name>i2</name>"));
        assert!(xml.contains("<time>1970-01-01T00:00:01.500000Z</time>"));
    }

    #[test]
    fn output_paths_follow_naming_scheme() {
        let dir = Path::new("out");
        assert_eq!(
            scene_output_path(dir, 3, "boston-seaport", SceneFormat::Gpx),
            PathBuf::from("out/scene_3.gpx")
        );
        assert_eq!(
            scene_output_path(dir, 3, "boston-seaport", SceneFormat::Osm),
            PathBuf::from("out/scene_3_boston-seaport.osm")
        );
    }
}
