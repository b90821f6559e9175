//! Fuzz target for attribute formatting of arbitrary JSON records.

#![no_main]

use libfuzzer_sys::fuzz_target;
use nuscenes_osm::export::tag_block;

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }

    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
        let _ = tag_block(&value);
    }
});
