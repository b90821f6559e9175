#![allow(dead_code)]

use std::fs;
use std::path::Path;

use serde_json::{json, Value};

pub const VERSION: &str = "v1.0-test";

pub fn write_json(path: &Path, value: &Value) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    let text = serde_json::to_string_pretty(value).expect("serialize fixture");
    fs::write(path, text).expect("write fixture file");
}

pub fn write_map(dataroot: &Path, name: &str, map: &Value) {
    let path = dataroot
        .join("maps")
        .join("expansion")
        .join(format!("{name}.json"));
    write_json(&path, map);
}

/// A small map exercising every hole policy branch.
///
/// - `p_plain`: no holes (`holes: []`)
/// - `p_empty_hole`: a single hole without nodes
/// - `p_two_holes`: two real holes
/// - `p_no_field`: no `holes` field at all
pub fn sample_map() -> Value {
    json!({
        "version": "1.3",
        "node": [
            {"token": "n1", "x": 0.0, "y": 0.0},
            {"token": "n2", "x": 100.0, "y": 0.0},
            {"token": "n3", "x": 100.0, "y": 100.0},
            {"token": "n4", "x": 0.0, "y": 100.0},
            {"token": "h1", "x": 10.0, "y": 10.0},
            {"token": "h2", "x": 20.0, "y": 10.0},
            {"token": "h3", "x": 20.0, "y": 20.0},
            {"token": "g1", "x": 50.0, "y": 50.0},
            {"token": "g2", "x": 60.0, "y": 50.0},
            {"token": "g3", "x": 60.0, "y": 60.0}
        ],
        "polygon": [
            {"token": "p_plain", "exterior_node_tokens": ["n1", "n2", "n3"], "holes": []},
            {"token": "p_empty_hole", "exterior_node_tokens": ["n1", "n3", "n4"],
             "holes": [{"node_tokens": []}]},
            {"token": "p_two_holes", "exterior_node_tokens": ["n1", "n2", "n3", "n4"],
             "holes": [{"node_tokens": ["h1", "h2", "h3"]}, {"node_tokens": ["g1", "g2", "g3"]}]},
            {"token": "p_no_field", "exterior_node_tokens": ["n2", "n3", "n4"]}
        ],
        "line": [
            {"token": "l1", "node_tokens": ["n1", "n2", "n3"]},
            {"token": "l2", "node_tokens": ["n3", "n4"]}
        ],
        "drivable_area": [
            {"token": "da1", "polygon_tokens": ["p_plain", "p_two_holes"]}
        ],
        "road_segment": [
            {"token": "rs1", "polygon_token": "p_no_field", "is_intersection": true, "drivable_area_token": "da1"}
        ],
        "lane": [
            {"token": "lane1", "polygon_token": "p_empty_hole", "lane_type": "CAR",
             "from_edge_line_token": "l1", "to_edge_line_token": "l2",
             "left_lane_divider_segments": [], "right_lane_divider_segments": []}
        ],
        "walkway": [
            {"token": "ww1", "polygon_token": "p_two_holes"}
        ],
        "lane_divider": [
            {"token": "ld1", "line_token": "l2",
             "lane_divider_segments": [{"node_token": "n3", "segment_type": "DOUBLE_DASHED_WHITE"}]}
        ],
        "traffic_light": [
            {"token": "tl1", "line_token": "l1", "traffic_light_type": "VERTICAL",
             "from_road_block_token": "rb1",
             "items": [{"color": "RED", "shape": "CIRCLE", "rel_pos": {"tx": 0.0, "ty": 0.0, "tz": 0.6}}],
             "pose": {"tx": 50.0, "ty": 50.0, "tz": 3.0, "rx": 0.0, "ry": 0.0, "rz": 1.5}}
        ],
        "arcline_path_3": {},
        "connectivity": {}
    })
}

pub fn write_scene_tables(dataroot: &Path) {
    let dir = dataroot.join(VERSION);
    for (name, table) in scene_tables() {
        write_json(&dir.join(format!("{name}.json")), &table);
    }
}

/// Three scenes:
///
/// 0. `singapore-onenorth`, four samples; instance `car` in the first three,
///    `ped` in the second and the terminal one.
/// 1. `boston-seaport`, a single sample.
/// 2. an unknown location.
pub fn scene_tables() -> Vec<(&'static str, Value)> {
    let mut samples = Vec::new();
    let mut sample_data = Vec::new();
    let mut ego_poses = Vec::new();
    let chain = ["s0", "s1", "s2", "s3"];
    for (i, token) in chain.iter().enumerate() {
        let prev = if i == 0 { "" } else { chain[i - 1] };
        let next = chain.get(i + 1).copied().unwrap_or("");
        let timestamp = 1_532_402_927_647_951i64 + 500_000 * i as i64;
        samples.push(json!({
            "token": token, "timestamp": timestamp, "scene_token": "sc0",
            "prev": prev, "next": next
        }));
        sample_data.push(json!({
            "token": format!("sd_{token}"), "sample_token": token,
            "ego_pose_token": format!("ep_{token}"), "calibrated_sensor_token": "cs_front",
            "timestamp": timestamp, "is_key_frame": true, "fileformat": "jpg",
            "filename": format!("samples/CAM_FRONT/{token}.jpg")
        }));
        sample_data.push(json!({
            "token": format!("sdl_{token}"), "sample_token": token,
            "ego_pose_token": format!("epl_{token}"), "calibrated_sensor_token": "cs_lidar",
            "timestamp": timestamp, "is_key_frame": true, "fileformat": "pcd",
            "filename": format!("samples/LIDAR_TOP/{token}.pcd")
        }));
        ego_poses.push(json!({
            "token": format!("ep_{token}"), "timestamp": timestamp,
            "translation": [10.0 * i as f64, 5.0, 0.0], "rotation": [1.0, 0.0, 0.0, 0.0]
        }));
        ego_poses.push(json!({
            "token": format!("epl_{token}"), "timestamp": timestamp,
            "translation": [10.0 * i as f64, 6.0, 0.0], "rotation": [1.0, 0.0, 0.0, 0.0]
        }));
    }

    // Single-sample scene in Boston.
    samples.push(json!({"token": "b0", "timestamp": 1_533_151_603_547_590i64, "prev": "", "next": ""}));
    sample_data.push(json!({
        "token": "sd_b0", "sample_token": "b0", "ego_pose_token": "ep_b0",
        "calibrated_sensor_token": "cs_front", "is_key_frame": true
    }));
    ego_poses.push(json!({"token": "ep_b0", "translation": [1.0, 1.0, 0.0], "rotation": [1.0, 0.0, 0.0, 0.0]}));

    // Scene on a map nobody knows.
    samples.push(json!({"token": "m0", "timestamp": 1, "prev": "", "next": "m1"}));
    samples.push(json!({"token": "m1", "timestamp": 2, "prev": "m0", "next": ""}));
    for token in ["m0", "m1"] {
        sample_data.push(json!({
            "token": format!("sd_{token}"), "sample_token": token, "ego_pose_token": format!("ep_{token}"),
            "calibrated_sensor_token": "cs_front", "is_key_frame": true
        }));
        ego_poses.push(json!({"token": format!("ep_{token}"), "translation": [0.0, 0.0, 0.0]}));
    }

    let annotations = json!([
        {"token": "car_0", "sample_token": "s0", "instance_token": "car", "translation": [20.0, 8.0, 1.0],
         "size": [1.9, 4.6, 1.7], "rotation": [1.0, 0.0, 0.0, 0.0], "attribute_tokens": ["moving"],
         "visibility_token": "4", "num_lidar_pts": 12, "num_radar_pts": 0, "prev": "", "next": "car_1"},
        {"token": "car_1", "sample_token": "s1", "instance_token": "car", "translation": [22.0, 8.0, 1.0],
         "size": [1.9, 4.6, 1.7], "rotation": [1.0, 0.0, 0.0, 0.0], "attribute_tokens": ["moving"],
         "visibility_token": "4", "num_lidar_pts": 15, "num_radar_pts": 1, "prev": "car_0", "next": "car_2"},
        {"token": "ped_1", "sample_token": "s1", "instance_token": "ped", "translation": [5.0, 2.0, 1.0],
         "size": [0.6, 0.6, 1.8], "rotation": [1.0, 0.0, 0.0, 0.0], "attribute_tokens": ["standing", "with_rider"],
         "visibility_token": "3", "num_lidar_pts": 4, "num_radar_pts": 0, "prev": "", "next": "ped_3"},
        {"token": "car_2", "sample_token": "s2", "instance_token": "car", "translation": [24.0, 8.0, 1.0],
         "size": [1.9, 4.6, 1.7], "rotation": [1.0, 0.0, 0.0, 0.0], "attribute_tokens": [],
         "visibility_token": "4", "num_lidar_pts": 9, "num_radar_pts": 0, "prev": "car_1", "next": ""},
        {"token": "ped_3", "sample_token": "s3", "instance_token": "ped", "translation": [6.0, 2.0, 1.0],
         "size": [0.6, 0.6, 1.8], "rotation": [1.0, 0.0, 0.0, 0.0], "attribute_tokens": ["standing"],
         "visibility_token": "3", "num_lidar_pts": 2, "num_radar_pts": 0, "prev": "ped_1", "next": ""}
    ]);

    vec![
        (
            "scene",
            json!([
                {"token": "sc0", "name": "scene-0061", "description": "Parked truck, <construction>",
                 "log_token": "log_sg", "nbr_samples": 4, "first_sample_token": "s0", "last_sample_token": "s3"},
                {"token": "sc1", "name": "scene-0103", "description": "Single frame",
                 "log_token": "log_bos", "nbr_samples": 1, "first_sample_token": "b0", "last_sample_token": "b0"},
                {"token": "sc2", "name": "scene-9999", "description": "Off the map",
                 "log_token": "log_mars", "nbr_samples": 2, "first_sample_token": "m0", "last_sample_token": "m1"}
            ]),
        ),
        (
            "log",
            json!([
                {"token": "log_sg", "logfile": "n015-2018-07-24-11-22-45+0800", "vehicle": "n015",
                 "date_captured": "2018-07-24", "location": "singapore-onenorth"},
                {"token": "log_bos", "logfile": "n008-2018-08-01-15-16-36-0400", "vehicle": "n008",
                 "date_captured": "2018-08-01", "location": "boston-seaport"},
                {"token": "log_mars", "logfile": "x", "vehicle": "x",
                 "date_captured": "2030-01-01", "location": "mars-base"}
            ]),
        ),
        ("sample", Value::Array(samples)),
        ("sample_data", Value::Array(sample_data)),
        ("ego_pose", Value::Array(ego_poses)),
        ("sample_annotation", annotations),
        (
            "instance",
            json!([
                {"token": "car", "category_token": "cat_car", "nbr_annotations": 3,
                 "first_annotation_token": "car_0", "last_annotation_token": "car_2"},
                {"token": "ped", "category_token": "cat_ped", "nbr_annotations": 2,
                 "first_annotation_token": "ped_1", "last_annotation_token": "ped_3"}
            ]),
        ),
        (
            "category",
            json!([
                {"token": "cat_car", "name": "vehicle.car", "description": "Vehicle designed primarily for personal use."},
                {"token": "cat_ped", "name": "human.pedestrian.adult", "description": "Adult subcategory."}
            ]),
        ),
        (
            "attribute",
            json!([
                {"token": "moving", "name": "vehicle.moving", "description": "Vehicle is moving."},
                {"token": "standing", "name": "pedestrian.standing", "description": "The human is standing."},
                {"token": "with_rider", "name": "cycle.with_rider", "description": "There is someone on the bicycle."}
            ]),
        ),
        (
            "sensor",
            json!([
                {"token": "sensor_front", "channel": "CAM_FRONT", "modality": "camera"},
                {"token": "sensor_lidar", "channel": "LIDAR_TOP", "modality": "lidar"}
            ]),
        ),
        (
            "calibrated_sensor",
            json!([
                {"token": "cs_front", "sensor_token": "sensor_front", "translation": [1.7, 0.0, 1.5],
                 "rotation": [0.5, -0.5, 0.5, -0.5], "camera_intrinsic": []},
                {"token": "cs_lidar", "sensor_token": "sensor_lidar", "translation": [0.9, 0.0, 1.8],
                 "rotation": [0.7, 0.0, 0.0, 0.7], "camera_intrinsic": []}
            ]),
        ),
    ]
}
