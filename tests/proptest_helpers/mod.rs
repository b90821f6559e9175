#![allow(dead_code)]

use nuscenes_osm::dataset::Hole;
use nuscenes_osm::export::ExportContext;
use nuscenes_osm::geo::{MapOrigin, OriginTable};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn builtin_origin() -> BoxedStrategy<(String, MapOrigin)> {
    let table = OriginTable::builtin();
    let entries: Vec<(String, MapOrigin)> = table
        .names()
        .map(|name| {
            let origin = table.get(name).expect("builtin origin");
            (name.to_string(), origin)
        })
        .collect();
    proptest::sample::select(entries).boxed()
}

pub fn context_for(location: &str) -> ExportContext {
    ExportContext::for_location(&OriginTable::builtin(), location).expect("known location")
}

/// Hex-like tokens as found in the dataset, possibly repeating.
pub fn token_strategy() -> BoxedStrategy<String> {
    proptest::string::string_regex("[0-9a-f]{1,8}")
        .expect("valid token regex")
        .boxed()
}

pub fn ring_strategy(max_len: usize) -> BoxedStrategy<Vec<String>> {
    proptest::collection::vec(token_strategy(), 1..=max_len).boxed()
}

/// `None` for a missing `holes` field, otherwise zero or more non-empty
/// holes.
pub fn holes_strategy(max_holes: usize) -> BoxedStrategy<Option<Vec<Hole>>> {
    proptest::option::of(proptest::collection::vec(
        ring_strategy(6).prop_map(|node_tokens| Hole { node_tokens }),
        0..=max_holes,
    ))
    .boxed()
}
