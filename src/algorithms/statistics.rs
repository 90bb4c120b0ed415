use crate::array::Array;
use crate::dispatch::{invoke_one, EntryPoint, Scalar};
use crate::error::Result;

pub const COVARIANCE: EntryPoint = EntryPoint::new("covariance", 1, 1);
pub const KURTOSIS: EntryPoint = EntryPoint::new("kurtosis_statistics", 1, 1);
pub const LJUNG_BOX: EntryPoint = EntryPoint::new("ljung_box", 1, 1);
pub const MOMENT: EntryPoint = EntryPoint::new("moment", 1, 1);
pub const QUANTILE: EntryPoint = EntryPoint::new("quantile_statistics", 2, 1);
pub const QUANTILES_CUT: EntryPoint = EntryPoint::new("quantiles_cut", 1, 1);
pub const SAMPLE_STDEV: EntryPoint = EntryPoint::new("sample_stdev", 1, 1);
pub const SKEWNESS: EntryPoint = EntryPoint::new("skewness_statistics", 1, 1);

pub const DEFAULT_QUANTILE_PRECISION: f32 = 1e8;
pub const DEFAULT_QUANTILES_CUT_PRECISION: f32 = 1e-8;

/// `[k, k]` covariance matrix of the `k` series. `unbiased` divides by `n - 1`.
pub fn covariance(tss: &Array, unbiased: bool) -> Result<Array> {
    invoke_one(&COVARIANCE, &[tss], &[Scalar::Bool(unbiased)])
}

/// Fisher kurtosis, bias corrected.
pub fn kurtosis(tss: &Array) -> Result<Array> {
    invoke_one(&KURTOSIS, &[tss], &[])
}

/// Ljung-Box Q statistic over `lags` lags.
pub fn ljung_box(tss: &Array, lags: i64) -> Result<Array> {
    invoke_one(&LJUNG_BOX, &[tss], &[Scalar::Long(lags)])
}

/// Raw moment of order `k`.
pub fn moment(tss: &Array, k: i32) -> Result<Array> {
    invoke_one(&MOMENT, &[tss], &[Scalar::Int(k)])
}

pub fn quantile(tss: &Array, q: &Array, precision: f32) -> Result<Array> {
    invoke_one(&QUANTILE, &[tss, q], &[Scalar::Float(precision)])
}

/// Splits each series into `quantiles` equal-frequency bins, returning the
/// bin edges of every point.
pub fn quantiles_cut(tss: &Array, quantiles: f32, precision: f32) -> Result<Array> {
    invoke_one(
        &QUANTILES_CUT,
        &[tss],
        &[Scalar::Float(quantiles), Scalar::Float(precision)],
    )
}

pub fn sample_stdev(tss: &Array) -> Result<Array> {
    invoke_one(&SAMPLE_STDEV, &[tss], &[])
}

pub fn skewness(tss: &Array) -> Result<Array> {
    invoke_one(&SKEWNESS, &[tss], &[])
}
