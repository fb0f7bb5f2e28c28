//! Deterministic train/val/test partitioning.
//!
//! The input list is sorted by file name, permuted with a Fisher–Yates
//! shuffle, then cut at floor boundaries:
//!
//! ```text
//! train_end = floor(N * train)
//! val_end   = floor(N * (train + val))
//! [0, train_end) -> train, [train_end, val_end) -> val, [val_end, N) -> test
//! ```
//!
//! The shuffle is fixed down to the bit:
//!
//! - generator: [`ChaCha12Rng`] seeded with [`SeedableRng::seed_from_u64`]
//!   (PCG32 seed expansion, stream 0)
//! - for `i` from `N - 1` down to `1`, swap item `i` with item `j`, where `j`
//!   is drawn uniformly from `[0, i]`
//! - `j` is `next_u64() % (i + 1)`, redrawing while the value falls into the
//!   biased tail above the largest multiple of `i + 1`
//!
//! The same file set, ratios and seed always yield the same partition.

use std::fmt;
use std::path::{Path, PathBuf};

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};

use crate::error::BccdError;

const RATIO_SUM_TOLERANCE: f64 = 1e-6;

/// One of the three dataset partitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];

    /// Directory name used under `images/` and `labels/`.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Train/val/test fractions. Non-negative, finite, summing to 1.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 3]", into = "[f64; 3]")]
pub struct SplitRatios {
    train: f64,
    val: f64,
    test: f64,
}

impl SplitRatios {
    pub fn new(train: f64, val: f64, test: f64) -> Result<Self, BccdError> {
        for (name, value) in [("train", train), ("val", val), ("test", test)] {
            if !value.is_finite() || value < 0.0 {
                return Err(BccdError::InvalidConfig {
                    message: format!("{name} ratio must be a non-negative number, got {value}"),
                });
            }
        }

        let sum = train + val + test;
        if (sum - 1.0).abs() > RATIO_SUM_TOLERANCE {
            return Err(BccdError::InvalidConfig {
                message: format!("split ratios must sum to 1.0, got {sum}"),
            });
        }

        Ok(Self { train, val, test })
    }

    pub fn train(&self) -> f64 {
        self.train
    }

    pub fn val(&self) -> f64 {
        self.val
    }

    pub fn test(&self) -> f64 {
        self.test
    }
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train: 0.8,
            val: 0.1,
            test: 0.1,
        }
    }
}

impl TryFrom<[f64; 3]> for SplitRatios {
    type Error = BccdError;

    fn try_from([train, val, test]: [f64; 3]) -> Result<Self, Self::Error> {
        Self::new(train, val, test)
    }
}

impl From<SplitRatios> for [f64; 3] {
    fn from(ratios: SplitRatios) -> Self {
        [ratios.train, ratios.val, ratios.test]
    }
}

impl std::str::FromStr for SplitRatios {
    type Err = BccdError;

    /// Parses `"0.8,0.1,0.1"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(BccdError::InvalidConfig {
                message: format!("expected three comma-separated ratios, got '{s}'"),
            });
        }

        let mut values = [0.0f64; 3];
        for (slot, raw) in values.iter_mut().zip(&parts) {
            *slot = raw.parse::<f64>().map_err(|_| BccdError::InvalidConfig {
                message: format!("invalid split ratio '{raw}'"),
            })?;
        }

        Self::try_from(values)
    }
}

/// Files assigned to each split, in permuted order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitPlan {
    pub train: Vec<PathBuf>,
    pub val: Vec<PathBuf>,
    pub test: Vec<PathBuf>,
}

impl SplitPlan {
    pub fn files(&self, split: Split) -> &[PathBuf] {
        match split {
            Split::Train => &self.train,
            Split::Val => &self.val,
            Split::Test => &self.test,
        }
    }

    pub fn len(&self) -> usize {
        self.train.len() + self.val.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over `(split, file)` pairs: train first, then val, then test.
    pub fn iter(&self) -> impl Iterator<Item = (Split, &Path)> {
        Split::ALL.into_iter().flat_map(move |split| {
            self.files(split)
                .iter()
                .map(move |path| (split, path.as_path()))
        })
    }
}

/// Compute `(train_end, val_end)` for `n` items.
pub fn split_bounds(n: usize, ratios: &SplitRatios) -> (usize, usize) {
    let train_end = floor_count(n, ratios.train);
    let val_end = floor_count(n, ratios.train + ratios.val).max(train_end);
    (train_end, val_end)
}

fn floor_count(n: usize, fraction: f64) -> usize {
    ((n as f64 * fraction).floor() as usize).min(n)
}

/// Partition `files` into train/val/test.
///
/// `files` may be in any order; they are sorted by file name before the
/// seeded shuffle is applied.
pub fn plan_split(files: &[PathBuf], ratios: &SplitRatios, seed: u64) -> SplitPlan {
    let mut ordered = files.to_vec();
    ordered.sort_by_cached_key(|path| sort_key(path));

    shuffle_seeded(&mut ordered, seed);

    let (train_end, val_end) = split_bounds(ordered.len(), ratios);
    let test = ordered.split_off(val_end);
    let val = ordered.split_off(train_end);

    SplitPlan {
        train: ordered,
        val,
        test,
    }
}

/// Fisher–Yates over `items`, driven by ChaCha12 seeded with `seed`.
pub fn shuffle_seeded<T>(items: &mut [T], seed: u64) {
    let mut rng = ChaCha12Rng::seed_from_u64(seed);
    for i in (1..items.len()).rev() {
        let j = uniform_below(&mut rng, i as u64 + 1) as usize;
        items.swap(i, j);
    }
}

/// Uniform draw from `[0, bound)` by rejection. `bound` must be non-zero.
fn uniform_below(rng: &mut ChaCha12Rng, bound: u64) -> u64 {
    // 2^64 mod bound values at the top of the range are rejected.
    let zone = u64::MAX - (u64::MAX - bound + 1) % bound;
    loop {
        let value = rng.next_u64();
        if value <= zone {
            return value % bound;
        }
    }
}

fn sort_key(path: &Path) -> (String, PathBuf) {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    (name, path.to_path_buf())
}
