//! JSON-backed access to the source dataset.
//!
//! Two kinds of input are read:
//!
//! - **Map expansion files** (`<dataroot>/maps/expansion/<map>.json`): node,
//!   polygon and line geometry plus the semantic layers built on top of it.
//!   See [`MapDb`].
//! - **Scene tables** (`<dataroot>/<version>/*.json`): scenes, the linked
//!   chain of samples, ego poses and object annotations. See [`SceneDb`].
//!
//! Records are typed on the fields the exporter interprets. Every other
//! field is kept in a flattened `fields` map so it can still be dumped as
//! tags.

mod map;
mod scene;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::ExportError;

pub use map::{
    from_map_json_slice, from_map_json_str, DrivableArea, Hole, LayerRecord, LineRecord,
    MapDb, MapExpansion, NodeRecord, PolygonRecord, Pose, LINE_LAYERS, POLYGON_LAYERS,
};
pub use scene::{
    Attribute, CalibratedSensor, Category, EgoPose, Instance, KeyFrameChain, Log, Sample,
    SampleAnnotation, SampleData, Scene, SceneDb, SceneTables, Sensor,
};

/// Reads one JSON document from disk.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ExportError> {
    let file = File::open(path).map_err(ExportError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| ExportError::DatasetJsonParse {
        path: path.to_path_buf(),
        source,
    })
}
