//! Per-series normalization, returning a new array or rewriting the input.

use crate::array::Array;
use crate::dispatch::{invoke_in_place, invoke_one, EntryPoint, Scalar};
use crate::error::Result;

pub const ZNORM: EntryPoint = EntryPoint::new("znorm", 1, 1);
pub const ZNORM_IN_PLACE: EntryPoint = EntryPoint::in_place("znorm_in_place");
pub const MAX_MIN_NORM: EntryPoint = EntryPoint::new("max_min_norm", 1, 1);
pub const MAX_MIN_NORM_IN_PLACE: EntryPoint = EntryPoint::in_place("max_min_norm_in_place");
pub const DECIMAL_SCALING_NORM: EntryPoint = EntryPoint::new("decimal_scaling_norm", 1, 1);
pub const DECIMAL_SCALING_NORM_IN_PLACE: EntryPoint = EntryPoint::in_place("decimal_scaling_norm_in_place");
pub const MEAN_NORM: EntryPoint = EntryPoint::new("mean_norm", 1, 1);
pub const MEAN_NORM_IN_PLACE: EntryPoint = EntryPoint::in_place("mean_norm_in_place");

/// Standard deviations (or ranges) below this are treated as flat.
pub const DEFAULT_EPSILON: f64 = 1e-8;
pub const DEFAULT_HIGH: f64 = 1.0;
pub const DEFAULT_LOW: f64 = 0.0;

/// Zero mean, unit standard deviation.
pub fn znorm(tss: &Array, epsilon: f64) -> Result<Array> {
    invoke_one(&ZNORM, &[tss], &[Scalar::Double(epsilon)])
}

pub fn znorm_in_place(tss: &Array, epsilon: f64) -> Result<()> {
    invoke_in_place(&ZNORM_IN_PLACE, tss, &[Scalar::Double(epsilon)])
}

fn range_params(high: f64, low: f64, epsilon: f64) -> [Scalar; 3] {
    [Scalar::Double(high), Scalar::Double(low), Scalar::Double(epsilon)]
}

/// Rescales each series into `[low, high]`.
pub fn max_min_norm(tss: &Array, high: f64, low: f64, epsilon: f64) -> Result<Array> {
    invoke_one(&MAX_MIN_NORM, &[tss], &range_params(high, low, epsilon))
}

pub fn max_min_norm_in_place(tss: &Array, high: f64, low: f64, epsilon: f64) -> Result<()> {
    invoke_in_place(&MAX_MIN_NORM_IN_PLACE, tss, &range_params(high, low, epsilon))
}

/// Divides by the power of ten that brings every value into `[-1, 1]`.
pub fn decimal_scaling_norm(tss: &Array) -> Result<Array> {
    invoke_one(&DECIMAL_SCALING_NORM, &[tss], &[])
}

pub fn decimal_scaling_norm_in_place(tss: &Array) -> Result<()> {
    invoke_in_place(&DECIMAL_SCALING_NORM_IN_PLACE, tss, &[])
}

/// `(x - mean) / (max - min)`.
pub fn mean_norm(tss: &Array) -> Result<Array> {
    invoke_one(&MEAN_NORM, &[tss], &[])
}

pub fn mean_norm_in_place(tss: &Array) -> Result<()> {
    invoke_in_place(&MEAN_NORM_IN_PLACE, tss, &[])
}
