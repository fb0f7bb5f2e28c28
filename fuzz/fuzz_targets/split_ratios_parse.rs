//! Fuzz target for `--split` ratio parsing.

#![no_main]

use bccdprep::split::{split_bounds, SplitRatios};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(ratios) = text.parse::<SplitRatios>() {
        let (train_end, val_end) = split_bounds(1000, &ratios);
        assert!(train_end <= val_end && val_end <= 1000);
    }
});
