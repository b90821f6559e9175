//! Map expansion tables.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::read_json;
use crate::error::ExportError;
use crate::export::{LineShape, PolygonShape};

/// Polygon-based semantic layers, in export order.
pub const POLYGON_LAYERS: [&str; 7] = [
    "road_segment",
    "road_block",
    "lane",
    "ped_crossing",
    "walkway",
    "stop_line",
    "carpark_area",
];

/// Line-based semantic layers, in export order.
pub const LINE_LAYERS: [&str; 3] = ["road_divider", "lane_divider", "traffic_light"];

/// A point of the map geometry, in local metres.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub token: String,
    pub x: f64,
    pub y: f64,
}

/// An inner ring of a polygon.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Hole {
    #[serde(default)]
    pub node_tokens: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolygonRecord {
    pub token: String,
    pub exterior_node_tokens: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holes: Option<Vec<Hole>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    pub token: String,
    pub node_tokens: Vec<String>,
}

/// A drivable area: a set of polygons.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrivableArea {
    pub token: String,
    #[serde(default)]
    pub polygon_tokens: Vec<String>,
}

/// Position and orientation of a traffic light, in local metres/radians.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub tx: f64,
    pub ty: f64,
    #[serde(default)]
    pub tz: f64,
    #[serde(default)]
    pub rx: f64,
    #[serde(default)]
    pub ry: f64,
    #[serde(default)]
    pub rz: f64,
}

/// A record of a semantic layer (lane, walkway, road divider, ...).
///
/// Geometry is either referenced (`polygon_token`, `line_token`) or inline.
/// Fields not listed here are kept verbatim in `fields`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerRecord {
    pub token: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exterior_node_tokens: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holes: Option<Vec<Hole>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_tokens: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pose: Option<Pose>,

    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl LayerRecord {
    /// A record with only a token; convenient for building fixtures.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            polygon_token: None,
            line_token: None,
            exterior_node_tokens: None,
            holes: None,
            node_tokens: None,
            pose: None,
            fields: BTreeMap::new(),
        }
    }
}

/// The tables of one map expansion file. Missing tables read as empty.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MapExpansion {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub node: Vec<NodeRecord>,
    #[serde(default)]
    pub polygon: Vec<PolygonRecord>,
    #[serde(default)]
    pub line: Vec<LineRecord>,
    #[serde(default)]
    pub drivable_area: Vec<DrivableArea>,
    #[serde(default)]
    pub road_segment: Vec<LayerRecord>,
    #[serde(default)]
    pub road_block: Vec<LayerRecord>,
    #[serde(default)]
    pub lane: Vec<LayerRecord>,
    #[serde(default)]
    pub ped_crossing: Vec<LayerRecord>,
    #[serde(default)]
    pub walkway: Vec<LayerRecord>,
    #[serde(default)]
    pub stop_line: Vec<LayerRecord>,
    #[serde(default)]
    pub carpark_area: Vec<LayerRecord>,
    #[serde(default)]
    pub road_divider: Vec<LayerRecord>,
    #[serde(default)]
    pub lane_divider: Vec<LayerRecord>,
    #[serde(default)]
    pub traffic_light: Vec<LayerRecord>,
}

impl MapExpansion {
    /// Records of a semantic layer; unknown names yield an empty slice.
    pub fn layer(&self, name: &str) -> &[LayerRecord] {
        match name {
            "road_segment" => &self.road_segment,
            "road_block" => &self.road_block,
            "lane" => &self.lane,
            "ped_crossing" => &self.ped_crossing,
            "walkway" => &self.walkway,
            "stop_line" => &self.stop_line,
            "carpark_area" => &self.carpark_area,
            "road_divider" => &self.road_divider,
            "lane_divider" => &self.lane_divider,
            "traffic_light" => &self.traffic_light,
            _ => &[],
        }
    }
}

/// Parses a map expansion document from a string.
pub fn from_map_json_str(json: &str) -> Result<MapExpansion, serde_json::Error> {
    serde_json::from_str(json)
}

/// Parses a map expansion document from bytes.
pub fn from_map_json_slice(bytes: &[u8]) -> Result<MapExpansion, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Indexed map tables with token lookups.
#[derive(Debug)]
pub struct MapDb {
    name: String,
    tables: MapExpansion,
    node_index: HashMap<String, usize>,
    polygon_index: HashMap<String, usize>,
    line_index: HashMap<String, usize>,
}

impl MapDb {
    /// Path of a map's expansion file under the dataset root.
    pub fn path_for(dataroot: &Path, map_name: &str) -> PathBuf {
        dataroot
            .join("maps")
            .join("expansion")
            .join(format!("{map_name}.json"))
    }

    /// Loads `<dataroot>/maps/expansion/<map_name>.json`.
    pub fn load(dataroot: &Path, map_name: &str) -> Result<Self, ExportError> {
        let tables: MapExpansion = read_json(&Self::path_for(dataroot, map_name))?;
        Ok(Self::from_tables(map_name, tables))
    }

    /// Indexes already parsed tables.
    pub fn from_tables(name: impl Into<String>, tables: MapExpansion) -> Self {
        fn index<T>(records: &[T], token: impl Fn(&T) -> &str) -> HashMap<String, usize> {
            records
                .iter()
                .enumerate()
                .map(|(i, record)| (token(record).to_string(), i))
                .collect()
        }

        Self {
            name: name.into(),
            node_index: index(&tables.node, |r| r.token.as_str()),
            polygon_index: index(&tables.polygon, |r| r.token.as_str()),
            line_index: index(&tables.line, |r| r.token.as_str()),
            tables,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tables(&self) -> &MapExpansion {
        &self.tables
    }

    pub fn nodes(&self) -> &[NodeRecord] {
        &self.tables.node
    }

    pub fn drivable_areas(&self) -> &[DrivableArea] {
        &self.tables.drivable_area
    }

    pub fn layer(&self, name: &str) -> &[LayerRecord] {
        self.tables.layer(name)
    }

    pub fn node(&self, token: &str) -> Result<&NodeRecord, ExportError> {
        self.node_index
            .get(token)
            .map(|&i| &self.tables.node[i])
            .ok_or_else(|| ExportError::missing("node", token))
    }

    pub fn polygon(&self, token: &str) -> Result<&PolygonRecord, ExportError> {
        self.polygon_index
            .get(token)
            .map(|&i| &self.tables.polygon[i])
            .ok_or_else(|| ExportError::missing("polygon", token))
    }

    pub fn line(&self, token: &str) -> Result<&LineRecord, ExportError> {
        self.line_index
            .get(token)
            .map(|&i| &self.tables.line[i])
            .ok_or_else(|| ExportError::missing("line", token))
    }

    /// Geometry of a polygon record, keyed by the polygon's own token.
    pub fn polygon_record_shape<'a>(
        &self,
        polygon: &'a PolygonRecord,
    ) -> Result<PolygonShape<'a>, ExportError> {
        let shape = PolygonShape {
            token: &polygon.token,
            exterior: &polygon.exterior_node_tokens,
            holes: polygon.holes.as_deref(),
        };
        self.check_polygon_nodes(&shape)?;
        Ok(shape)
    }

    /// Geometry of a polygon-layer record, keyed by the layer record's token.
    ///
    /// Inline rings win over `polygon_token`.
    pub fn layer_polygon_shape<'a>(
        &'a self,
        record: &'a LayerRecord,
    ) -> Result<PolygonShape<'a>, ExportError> {
        let shape = match (&record.exterior_node_tokens, &record.polygon_token) {
            (Some(exterior), _) => PolygonShape {
                token: &record.token,
                exterior,
                holes: record.holes.as_deref(),
            },
            (None, Some(polygon_token)) => {
                let polygon = self.polygon(polygon_token)?;
                PolygonShape {
                    token: &record.token,
                    exterior: &polygon.exterior_node_tokens,
                    holes: polygon.holes.as_deref(),
                }
            }
            (None, None) => {
                return Err(ExportError::MalformedGeometry {
                    token: record.token.clone(),
                    message: "record has neither exterior_node_tokens nor polygon_token"
                        .to_string(),
                })
            }
        };
        self.check_polygon_nodes(&shape)?;
        Ok(shape)
    }

    /// Geometry of a line-layer record. Inline nodes win over `line_token`.
    pub fn layer_line_shape<'a>(
        &'a self,
        record: &'a LayerRecord,
    ) -> Result<LineShape<'a>, ExportError> {
        let nodes: &'a [String] = match (&record.node_tokens, &record.line_token) {
            (Some(nodes), _) => nodes,
            (None, Some(line_token)) => &self.line(line_token)?.node_tokens,
            (None, None) => {
                return Err(ExportError::MalformedGeometry {
                    token: record.token.clone(),
                    message: "record has neither node_tokens nor line_token".to_string(),
                })
            }
        };
        self.check_nodes(nodes)?;
        Ok(LineShape {
            token: &record.token,
            nodes,
        })
    }

    fn check_polygon_nodes(&self, shape: &PolygonShape<'_>) -> Result<(), ExportError> {
        self.check_nodes(shape.exterior)?;
        for hole in shape.holes.unwrap_or_default() {
            self.check_nodes(&hole.node_tokens)?;
        }
        Ok(())
    }

    fn check_nodes(&self, tokens: &[String]) -> Result<(), ExportError> {
        tokens.iter().try_for_each(|token| self.node(token).map(|_| ()))
    }
}
