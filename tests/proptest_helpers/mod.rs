#![allow(dead_code)]

use std::path::PathBuf;

use bccdprep::ir::{BBox, ObjectRecord, Pixel};
use bccdprep::split::SplitRatios;
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

/// Label values are written in shortest round-trip form, so what is read
/// back differs from what was written only by the corner/center arithmetic.
pub const EPS_LABEL: f64 = 1e-12;

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

pub fn arb_image_size() -> impl Strategy<Value = (u32, u32)> {
    (1u32..=4096, 1u32..=4096)
}

pub fn arb_bbox_within(width: u32, height: u32) -> BoxedStrategy<BBox<Pixel>> {
    let w = width as f64;
    let h = height as f64;
    (0.0..=w, 0.0..=w, 0.0..=h, 0.0..=h)
        .prop_map(|(x1, x2, y1, y2)| {
            BBox::from_corners(x1.min(x2), x1.max(x2), y1.min(y2), y1.max(y2))
        })
        .boxed()
}

pub fn arb_object(width: u32, height: u32) -> BoxedStrategy<ObjectRecord> {
    (
        prop_oneof![
            Just("WBC".to_string()),
            Just("RBC".to_string()),
            Just("Platelets".to_string()),
            Just("Neutrophil".to_string()),
        ],
        any::<bool>(),
        arb_bbox_within(width, height),
    )
        .prop_map(|(class_name, difficult, bbox)| ObjectRecord {
            class_name,
            difficult,
            bbox,
        })
        .boxed()
}

/// Ratios with each component a multiple of 0.05, summing to exactly 1.
pub fn arb_ratios() -> BoxedStrategy<SplitRatios> {
    (0u32..=20)
        .prop_flat_map(|train| (Just(train), 0u32..=(20 - train)))
        .prop_map(|(train, val)| {
            let test = 20 - train - val;
            SplitRatios::new(
                train as f64 / 20.0,
                val as f64 / 20.0,
                test as f64 / 20.0,
            )
            .expect("ratios from twentieths are valid")
        })
        .boxed()
}

/// Distinct annotation paths, in no particular order.
pub fn arb_annotation_files(max: usize) -> BoxedStrategy<Vec<PathBuf>> {
    proptest::collection::btree_set(0u32..100_000, 0..=max)
        .prop_map(|ids| {
            ids.into_iter()
                .rev()
                .map(|id| PathBuf::from(format!("Annotations/BloodImage_{id:05}.xml")))
                .collect()
        })
        .boxed()
}
