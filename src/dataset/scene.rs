//! Scene, sample and annotation tables.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::read_json;
use crate::error::ExportError;
use crate::export::SampleChain;

/// A recorded driving sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub token: String,
    #[serde(default)]
    pub name: String,
    pub log_token: String,
    pub first_sample_token: String,
    #[serde(default)]
    pub last_sample_token: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

/// Recording session metadata; `location` names the map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Log {
    pub token: String,
    pub location: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

/// One annotated instant of a scene, linked to its neighbours.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub token: String,
    /// Microseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(default)]
    pub scene_token: String,
    #[serde(default)]
    pub prev: String,
    #[serde(default)]
    pub next: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl Sample {
    /// Token of the following sample; the chain stores `""` at its end.
    pub fn next(&self) -> Option<&str> {
        Some(self.next.as_str()).filter(|token| !token.is_empty())
    }

    /// Token of the preceding sample, if any.
    pub fn prev(&self) -> Option<&str> {
        Some(self.prev.as_str()).filter(|token| !token.is_empty())
    }
}

/// One sensor reading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SampleData {
    pub token: String,
    pub sample_token: String,
    pub ego_pose_token: String,
    pub calibrated_sensor_token: String,
    #[serde(default)]
    pub is_key_frame: bool,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

/// Vehicle pose in local map metres.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EgoPose {
    pub token: String,
    pub translation: [f64; 3],
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

/// One object observation at one sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SampleAnnotation {
    pub token: String,
    pub sample_token: String,
    pub instance_token: String,
    pub translation: [f64; 3],
    #[serde(default)]
    pub attribute_tokens: Vec<String>,
    /// Filled in on load from the instance's category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

/// A tracked object across samples.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub token: String,
    pub category_token: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub token: String,
    pub name: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub token: String,
    pub name: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub token: String,
    pub channel: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibratedSensor {
    pub token: String,
    pub sensor_token: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

/// Raw scene tables, as stored in `<dataroot>/<version>/`.
#[derive(Clone, Debug, Default)]
pub struct SceneTables {
    pub scene: Vec<Scene>,
    pub log: Vec<Log>,
    pub sample: Vec<Sample>,
    pub sample_data: Vec<SampleData>,
    pub ego_pose: Vec<EgoPose>,
    pub sample_annotation: Vec<SampleAnnotation>,
    pub instance: Vec<Instance>,
    pub category: Vec<Category>,
    pub attribute: Vec<Attribute>,
    pub sensor: Vec<Sensor>,
    pub calibrated_sensor: Vec<CalibratedSensor>,
}

impl SceneTables {
    /// Reads every table from `<dataroot>/<version>/<table>.json`.
    pub fn load(dataroot: &Path, version: &str) -> Result<Self, ExportError> {
        let dir = dataroot.join(version);

        fn table<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<Vec<T>, ExportError> {
            let path = dir.join(format!("{name}.json"));
            tracing::debug!(path = %path.display(), "reading table");
            read_json(&path)
        }

        Ok(Self {
            scene: table(&dir, "scene")?,
            log: table(&dir, "log")?,
            sample: table(&dir, "sample")?,
            sample_data: table(&dir, "sample_data")?,
            ego_pose: table(&dir, "ego_pose")?,
            sample_annotation: table(&dir, "sample_annotation")?,
            instance: table(&dir, "instance")?,
            category: table(&dir, "category")?,
            attribute: table(&dir, "attribute")?,
            sensor: table(&dir, "sensor")?,
            calibrated_sensor: table(&dir, "calibrated_sensor")?,
        })
    }
}

fn by_token<T>(records: Vec<T>, token: impl Fn(&T) -> &str) -> HashMap<String, T> {
    records
        .into_iter()
        .map(|record| (token(&record).to_string(), record))
        .collect()
}

/// Indexed scene tables.
///
/// On construction this derives what the tables only store implicitly:
/// key-frame sensor data per sample, the annotations of each sample in
/// table order, and each annotation's category name. Links that do not
/// resolve are left for the lookups to report, so only the scenes that
/// reach them fail.
#[derive(Debug)]
pub struct SceneDb {
    scenes: Vec<Scene>,
    logs: HashMap<String, Log>,
    samples: HashMap<String, Sample>,
    sample_data: HashMap<String, SampleData>,
    ego_poses: HashMap<String, EgoPose>,
    annotations: HashMap<String, SampleAnnotation>,
    instances: HashMap<String, Instance>,
    categories: HashMap<String, Category>,
    attributes: HashMap<String, Attribute>,
    sensors: HashMap<String, Sensor>,
    calibrated_sensors: HashMap<String, CalibratedSensor>,
    key_frames: HashMap<String, Vec<String>>,
    sample_annotations: HashMap<String, Vec<String>>,
}

impl SceneDb {
    /// Loads and indexes `<dataroot>/<version>/`.
    pub fn load(dataroot: &Path, version: &str) -> Result<Self, ExportError> {
        Ok(Self::from_tables(SceneTables::load(dataroot, version)?))
    }

    /// Indexes tables.
    pub fn from_tables(tables: SceneTables) -> Self {
        let instances = by_token(tables.instance, |r| r.token.as_str());
        let categories = by_token(tables.category, |r| r.token.as_str());

        let mut key_frames: HashMap<String, Vec<String>> = HashMap::new();
        for data in tables.sample_data.iter().filter(|d| d.is_key_frame) {
            key_frames
                .entry(data.sample_token.clone())
                .or_default()
                .push(data.token.clone());
        }

        let mut sample_annotations: HashMap<String, Vec<String>> = HashMap::new();
        let mut annotations = tables.sample_annotation;
        for annotation in &mut annotations {
            annotation.category_name = instances
                .get(&annotation.instance_token)
                .and_then(|instance| categories.get(&instance.category_token))
                .map(|category| category.name.clone());
            sample_annotations
                .entry(annotation.sample_token.clone())
                .or_default()
                .push(annotation.token.clone());
        }

        Self {
            scenes: tables.scene,
            logs: by_token(tables.log, |r| r.token.as_str()),
            samples: by_token(tables.sample, |r| r.token.as_str()),
            sample_data: by_token(tables.sample_data, |r| r.token.as_str()),
            ego_poses: by_token(tables.ego_pose, |r| r.token.as_str()),
            annotations: by_token(annotations, |r| r.token.as_str()),
            instances,
            categories,
            attributes: by_token(tables.attribute, |r| r.token.as_str()),
            sensors: by_token(tables.sensor, |r| r.token.as_str()),
            calibrated_sensors: by_token(tables.calibrated_sensor, |r| r.token.as_str()),
            key_frames,
            sample_annotations,
        }
    }

    /// Scenes in table order.
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn scene(&self, index: usize) -> Result<&Scene, ExportError> {
        self.scenes
            .get(index)
            .ok_or_else(|| ExportError::missing("scene", index.to_string()))
    }

    pub fn log(&self, token: &str) -> Result<&Log, ExportError> {
        self.logs
            .get(token)
            .ok_or_else(|| ExportError::missing("log", token))
    }

    /// Map location a scene was recorded in.
    pub fn location_of(&self, scene: &Scene) -> Result<&str, ExportError> {
        self.log(&scene.log_token).map(|log| log.location.as_str())
    }

    pub fn sample(&self, token: &str) -> Result<&Sample, ExportError> {
        self.samples
            .get(token)
            .ok_or_else(|| ExportError::missing("sample", token))
    }

    /// Key-frame sensor data of `sample` for a channel such as `CAM_FRONT`.
    ///
    /// Key frames whose sensor does not resolve are skipped; if none matches,
    /// the first such lookup failure is returned instead of
    /// [`ExportError::MissingSensorData`].
    pub fn key_frame(&self, sample: &Sample, channel: &str) -> Result<&SampleData, ExportError> {
        let mut unresolved = None;
        for token in self.key_frames.get(&sample.token).into_iter().flatten() {
            let data = self
                .sample_data
                .get(token)
                .ok_or_else(|| ExportError::missing("sample_data", token))?;
            match self.channel_of(data) {
                Ok(found) if found == channel => return Ok(data),
                Ok(_) => {}
                Err(err) => {
                    unresolved.get_or_insert(err);
                }
            }
        }
        Err(unresolved.unwrap_or_else(|| ExportError::MissingSensorData {
            sample: sample.token.clone(),
            channel: channel.to_string(),
        }))
    }

    /// Channel name of sensor data, through its calibrated sensor.
    pub fn channel_of(&self, data: &SampleData) -> Result<&str, ExportError> {
        let calibration = self
            .calibrated_sensors
            .get(&data.calibrated_sensor_token)
            .ok_or_else(|| ExportError::missing("calibrated_sensor", &data.calibrated_sensor_token))?;
        self.sensors
            .get(&calibration.sensor_token)
            .map(|sensor| sensor.channel.as_str())
            .ok_or_else(|| ExportError::missing("sensor", &calibration.sensor_token))
    }

    pub fn ego_pose(&self, token: &str) -> Result<&EgoPose, ExportError> {
        self.ego_poses
            .get(token)
            .ok_or_else(|| ExportError::missing("ego_pose", token))
    }

    pub fn annotation(&self, token: &str) -> Result<&SampleAnnotation, ExportError> {
        self.annotations
            .get(token)
            .ok_or_else(|| ExportError::missing("sample_annotation", token))
    }

    /// Annotation tokens of a sample, in table order.
    pub fn annotation_tokens(&self, sample: &Sample) -> &[String] {
        self.sample_annotations
            .get(&sample.token)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn instance(&self, token: &str) -> Result<&Instance, ExportError> {
        self.instances
            .get(token)
            .ok_or_else(|| ExportError::missing("instance", token))
    }

    pub fn category(&self, token: &str) -> Result<&Category, ExportError> {
        self.categories
            .get(token)
            .ok_or_else(|| ExportError::missing("category", token))
    }

    /// Category of an annotation, through its instance.
    pub fn category_of(&self, annotation: &SampleAnnotation) -> Result<&Category, ExportError> {
        let instance = self.instance(&annotation.instance_token)?;
        self.category(&instance.category_token)
    }

    pub fn attribute(&self, token: &str) -> Result<&Attribute, ExportError> {
        self.attributes
            .get(token)
            .ok_or_else(|| ExportError::missing("attribute", token))
    }

    /// Walks samples through key frames of `ego_channel`.
    pub fn chain<'a>(&'a self, ego_channel: &'a str) -> KeyFrameChain<'a> {
        KeyFrameChain {
            db: self,
            ego_channel,
        }
    }
}

/// Sample chain whose ego pose is taken from one sensor channel's key frame.
#[derive(Clone, Copy, Debug)]
pub struct KeyFrameChain<'a> {
    db: &'a SceneDb,
    ego_channel: &'a str,
}

impl<'a> SampleChain<'a> for KeyFrameChain<'a> {
    fn sample(&self, token: &str) -> Result<&'a Sample, ExportError> {
        self.db.sample(token)
    }

    fn ego_pose(&self, sample: &Sample) -> Result<&'a EgoPose, ExportError> {
        let data = self.db.key_frame(sample, self.ego_channel)?;
        self.db.ego_pose(&data.ego_pose_token)
    }

    fn annotations(&self, sample: &Sample) -> Result<Vec<&'a SampleAnnotation>, ExportError> {
        self.db
            .annotation_tokens(sample)
            .iter()
            .map(|token| {
                let annotation = self.db.annotation(token)?;
                self.db.category_of(annotation)?;
                Ok(annotation)
            })
            .collect()
    }
}
