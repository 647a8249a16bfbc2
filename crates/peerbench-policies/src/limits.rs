// SPDX-License-Identifier: Apache-2.0

pub const DEFAULT_MIN_COHORT_SIZE: usize = 8;
pub const MAX_MIN_COHORT_SIZE: usize = 1_000;

/// A one-value sample always ranks 50, so it is never rated.
pub const MIN_METRIC_SAMPLE_FLOOR: usize = 2;

/// Unit-count bucket edges: `..6`, `6..20`, `20..50`, `50..100`, `100..250`, `250..`.
pub const DEFAULT_UNIT_BUCKET_BOUNDS: [u32; 5] = [6, 20, 50, 100, 250];
/// Year-built bucket edges.
pub const DEFAULT_AGE_BUCKET_BOUNDS: [u32; 4] = [1900, 1940, 1970, 2000];

pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 10_000;
pub const MAX_CACHE_ENTRIES_HARD: usize = 1_000_000;
