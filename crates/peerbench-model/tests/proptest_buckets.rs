// SPDX-License-Identifier: Apache-2.0

use peerbench_model::BucketRange;
use proptest::prelude::*;
use proptest::test_runner::Config;

proptest! {
    #![proptest_config(Config::with_cases(256))]
    #[test]
    fn located_bucket_always_contains_the_value(
        value in 0_u32..5_000,
        mut bounds in proptest::collection::vec(1_u32..2_000, 0..8)
    ) {
        bounds.sort_unstable();
        bounds.dedup();
        let bucket = BucketRange::locate(value, &bounds);
        prop_assert!(bucket.contains(value));
        for other in [bucket.lower, bucket.upper].into_iter().flatten() {
            prop_assert!(bounds.contains(&other));
        }
    }
}
