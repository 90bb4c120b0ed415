//! Pairwise distances between the series of one array.
//!
//! For `k` series the result is a `[k, k]` matrix whose strict upper triangle
//! holds the distances; the rest is zero.

use crate::array::Array;
use crate::dispatch::{invoke_one, EntryPoint};
use crate::error::Result;

pub const EUCLIDEAN: EntryPoint = EntryPoint::new("euclidean", 1, 1);
pub const DTW: EntryPoint = EntryPoint::new("dtw", 1, 1);
pub const HAMMING: EntryPoint = EntryPoint::new("hamming", 1, 1);
pub const MANHATTAN: EntryPoint = EntryPoint::new("manhattan", 1, 1);
pub const SQUARED_EUCLIDEAN: EntryPoint = EntryPoint::new("squared_euclidean", 1, 1);

pub fn euclidean(tss: &Array) -> Result<Array> {
    invoke_one(&EUCLIDEAN, &[tss], &[])
}

/// Dynamic time warping.
pub fn dtw(tss: &Array) -> Result<Array> {
    invoke_one(&DTW, &[tss], &[])
}

pub fn hamming(tss: &Array) -> Result<Array> {
    invoke_one(&HAMMING, &[tss], &[])
}

pub fn manhattan(tss: &Array) -> Result<Array> {
    invoke_one(&MANHATTAN, &[tss], &[])
}

pub fn squared_euclidean(tss: &Array) -> Result<Array> {
    invoke_one(&SQUARED_EUCLIDEAN, &[tss], &[])
}
