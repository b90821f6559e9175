//! Fuzz target for map expansion JSON parsing.
//!
//! Run with:
//!   cargo +nightly fuzz run map_json_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use nuscenes_osm::dataset::{from_map_json_slice, MapDb, POLYGON_LAYERS};

fuzz_target!(|data: &[u8]| {
    // Real map files are tens of megabytes; keep inputs small.
    if data.len() > 1024 * 1024 {
        return;
    }

    let Ok(tables) = from_map_json_slice(data) else {
        return;
    };

    // Shape lookups must fail cleanly on dangling tokens.
    let db = MapDb::from_tables("fuzz", tables);
    for layer in POLYGON_LAYERS {
        for record in db.layer(layer) {
            let _ = db.layer_polygon_shape(record);
        }
    }
});
