use std::collections::BTreeSet;
use std::path::PathBuf;

use bccdprep::split::{plan_split, split_bounds, Split};
use proptest::prelude::*;

mod proptest_helpers;

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn split_is_a_partition(
        files in proptest_helpers::arb_annotation_files(200),
        ratios in proptest_helpers::arb_ratios(),
        seed in any::<u64>(),
    ) {
        let plan = plan_split(&files, &ratios, seed);
        prop_assert_eq!(plan.len(), files.len());

        let input: BTreeSet<PathBuf> = files.iter().cloned().collect();
        let mut seen = BTreeSet::new();
        for (_, path) in plan.iter() {
            prop_assert!(seen.insert(path.to_path_buf()), "{} assigned twice", path.display());
        }
        prop_assert_eq!(seen, input);
    }

    #[test]
    fn split_sizes_follow_floor_boundaries(
        files in proptest_helpers::arb_annotation_files(200),
        ratios in proptest_helpers::arb_ratios(),
        seed in any::<u64>(),
    ) {
        let n = files.len();
        let plan = plan_split(&files, &ratios, seed);
        let (train_end, val_end) = split_bounds(n, &ratios);

        prop_assert_eq!(plan.files(Split::Train).len(), train_end);
        prop_assert_eq!(plan.files(Split::Val).len(), val_end - train_end);
        prop_assert_eq!(plan.files(Split::Test).len(), n - val_end);
        prop_assert!(train_end <= (n as f64 * ratios.train()) as usize);
    }

    #[test]
    fn split_ignores_input_order(
        files in proptest_helpers::arb_annotation_files(100),
        ratios in proptest_helpers::arb_ratios(),
        seed in any::<u64>(),
    ) {
        let mut reversed = files.clone();
        reversed.reverse();

        prop_assert_eq!(
            plan_split(&files, &ratios, seed),
            plan_split(&reversed, &ratios, seed)
        );
    }
}
