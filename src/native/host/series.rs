//! Time-series kernels over `f32`/`f64` arrays.
//!
//! Extent 0 is time and every other extent indexes a series, so a `[n, k]`
//! array holds `k` series of length `n` stored back to back. Computation runs
//! in `f64`; results come back in the input's float type.

use super::HostArray;
use crate::error::NativeError;
use crate::native::NativeResult;
use crate::types::{Dim4, Dtype, HostData};

//==================================================================================
// 1. Series View
//==================================================================================

struct Series {
    values: Vec<f64>,
    len: usize,
    dims: Dim4,
    dtype: Dtype,
}

impl Series {
    fn of(a: &HostArray) -> NativeResult<Self> {
        let values = match &a.data {
            HostData::F32(v) => v.iter().map(|&x| f64::from(x)).collect(),
            HostData::F64(v) => v.clone(),
            other => {
                return Err(NativeError::new(
                    NativeError::TYPE,
                    format!("time-series kernels need f32 or f64 input, got {}", other.dtype()),
                ))
            }
        };
        let len = a.dims.rows() as usize;
        if len == 0 {
            return Err(NativeError::new(
                NativeError::INVALID_ARGUMENT,
                "time series must hold at least one point",
            ));
        }
        Ok(Self {
            values,
            len,
            dims: a.dims,
            dtype: a.dtype(),
        })
    }

    fn columns(&self) -> std::slice::Chunks<'_, f64> {
        self.values.chunks(self.len)
    }

    fn count(&self) -> usize {
        self.values.len() / self.len
    }

    fn output(&self, values: Vec<f64>, dims: Dim4) -> HostArray {
        let data = match self.dtype {
            Dtype::F32 => HostData::F32(values.into_iter().map(|x| x as f32).collect()),
            _ => HostData::F64(values),
        };
        HostArray::new(dims, data)
    }

    /// Transforms every series, keeping the input dims.
    fn map(&self, f: impl Fn(&[f64]) -> Vec<f64>) -> HostArray {
        let values = self.columns().flat_map(f).collect();
        self.output(values, self.dims)
    }

    /// Reduces every series to one value: dims `[1, d1, d2, d3]`.
    fn reduce(&self, f: impl Fn(&[f64]) -> f64) -> HostArray {
        let values = self.columns().map(f).collect();
        self.output(values, self.dims.reduced())
    }
}

//==================================================================================
// 2. Statistics Helpers
//==================================================================================

fn mean_of(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

fn squared_deviations(xs: &[f64]) -> f64 {
    let m = mean_of(xs);
    xs.iter().map(|x| (x - m).powi(2)).sum()
}

fn population_variance(xs: &[f64]) -> f64 {
    squared_deviations(xs) / xs.len() as f64
}

fn min_of(xs: &[f64]) -> f64 {
    xs.iter().copied().fold(f64::INFINITY, f64::min)
}

fn max_of(xs: &[f64]) -> f64 {
    xs.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn median_of(xs: &[f64]) -> f64 {
    let mut sorted = xs.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

//==================================================================================
// 3. Normalization
//==================================================================================

/// Zero mean, unit (population) standard deviation. Deviations below
/// `epsilon` are treated as 1 so flat series map to zeros.
pub(super) fn znorm(a: &HostArray, epsilon: f64) -> NativeResult<HostArray> {
    let series = Series::of(a)?;
    Ok(series.map(|xs| {
        let m = mean_of(xs);
        let sd = population_variance(xs).sqrt();
        let sd = if sd < epsilon { 1.0 } else { sd };
        xs.iter().map(|x| (x - m) / sd).collect()
    }))
}

/// Rescales each series into `[low, high]`.
pub(super) fn max_min_norm(a: &HostArray, high: f64, low: f64, epsilon: f64) -> NativeResult<HostArray> {
    let series = Series::of(a)?;
    Ok(series.map(|xs| {
        let (min, max) = (min_of(xs), max_of(xs));
        let range = if max - min < epsilon { 1.0 } else { max - min };
        xs.iter()
            .map(|x| (x - min) / range * (high - low) + low)
            .collect()
    }))
}

/// Divides by the smallest power of ten that brings every value into `[-1, 1]`.
pub(super) fn decimal_scaling_norm(a: &HostArray) -> NativeResult<HostArray> {
    let series = Series::of(a)?;
    Ok(series.map(|xs| {
        let peak = xs.iter().fold(0.0f64, |acc, x| acc.max(x.abs()));
        let scale = if peak > 0.0 {
            10f64.powf(peak.log10().ceil())
        } else {
            1.0
        };
        xs.iter().map(|x| x / scale).collect()
    }))
}

/// `(x - mean) / (max - min)`.
pub(super) fn mean_norm(a: &HostArray) -> NativeResult<HostArray> {
    let series = Series::of(a)?;
    Ok(series.map(|xs| {
        let m = mean_of(xs);
        let range = max_of(xs) - min_of(xs);
        let range = if range == 0.0 { 1.0 } else { range };
        xs.iter().map(|x| (x - m) / range).collect()
    }))
}

//==================================================================================
// 4. Statistics
//==================================================================================

/// Raw moment of order `k`: the mean of `x^k`.
pub(super) fn moment(a: &HostArray, k: i64) -> NativeResult<HostArray> {
    let k = i32::try_from(k).map_err(|_| {
        NativeError::new(NativeError::INVALID_ARGUMENT, format!("moment order {} is out of range", k))
    })?;
    let series = Series::of(a)?;
    Ok(series.reduce(|xs| xs.iter().map(|x| x.powi(k)).sum::<f64>() / xs.len() as f64))
}

/// Standard deviation with Bessel's correction.
pub(super) fn sample_stdev(a: &HostArray) -> NativeResult<HostArray> {
    let series = Series::of(a)?;
    Ok(series.reduce(|xs| (squared_deviations(xs) / (xs.len() as f64 - 1.0)).sqrt()))
}

/// Covariance matrix of the series: `[k, k]` for `k` series.
pub(super) fn covariance(a: &HostArray, unbiased: bool) -> NativeResult<HostArray> {
    let series = Series::of(a)?;
    let count = series.count();
    let n = series.len as f64;
    let divisor = if unbiased { n - 1.0 } else { n };
    let columns: Vec<&[f64]> = series.columns().collect();
    let means: Vec<f64> = columns.iter().map(|xs| mean_of(xs)).collect();
    let mut out = vec![0.0; count * count];
    for j in 0..count {
        for i in 0..count {
            let sum: f64 = columns[i]
                .iter()
                .zip(columns[j])
                .map(|(x, y)| (x - means[i]) * (y - means[j]))
                .sum();
            out[j * count + i] = sum / divisor;
        }
    }
    Ok(series.output(out, Dim4::new([count as u64, count as u64, 1, 1])))
}

//==================================================================================
// 5. Features
//==================================================================================

pub(super) fn abs_energy(a: &HostArray) -> NativeResult<HostArray> {
    Ok(Series::of(a)?.reduce(|xs| xs.iter().map(|x| x * x).sum()))
}

pub(super) fn absolute_sum_of_changes(a: &HostArray) -> NativeResult<HostArray> {
    Ok(Series::of(a)?.reduce(|xs| xs.windows(2).map(|w| (w[1] - w[0]).abs()).sum()))
}

/// Number of points strictly above (or below) the series mean, as `u32`.
pub(super) fn count_relative_to_mean(a: &HostArray, above: bool) -> NativeResult<HostArray> {
    let series = Series::of(a)?;
    let counts = series
        .columns()
        .map(|xs| {
            let m = mean_of(xs);
            xs.iter().filter(|&&x| if above { x > m } else { x < m }).count() as u32
        })
        .collect();
    Ok(HostArray::new(series.dims.reduced(), HostData::U32(counts)))
}

/// Series length as `s32`. Accepts any element type.
pub(super) fn length(a: &HostArray) -> HostArray {
    let dims = a.dims.reduced();
    let n = i32::try_from(a.dims.rows()).unwrap_or(i32::MAX);
    HostArray::new(dims, HostData::S32(vec![n; dims.elements() as usize]))
}

pub(super) fn maximum(a: &HostArray) -> NativeResult<HostArray> {
    Ok(Series::of(a)?.reduce(max_of))
}

pub(super) fn minimum(a: &HostArray) -> NativeResult<HostArray> {
    Ok(Series::of(a)?.reduce(min_of))
}

pub(super) fn mean(a: &HostArray) -> NativeResult<HostArray> {
    Ok(Series::of(a)?.reduce(mean_of))
}

pub(super) fn median(a: &HostArray) -> NativeResult<HostArray> {
    Ok(Series::of(a)?.reduce(median_of))
}

/// Population standard deviation.
pub(super) fn standard_deviation(a: &HostArray) -> NativeResult<HostArray> {
    Ok(Series::of(a)?.reduce(|xs| population_variance(xs).sqrt()))
}

pub(super) fn sum_values(a: &HostArray) -> NativeResult<HostArray> {
    Ok(Series::of(a)?.reduce(|xs| xs.iter().sum()))
}

/// Population variance.
pub(super) fn variance(a: &HostArray) -> NativeResult<HostArray> {
    Ok(Series::of(a)?.reduce(population_variance))
}

//==================================================================================
// 6. Distances
//==================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Metric {
    Euclidean,
    SquaredEuclidean,
    Manhattan,
    Hamming,
}

impl Metric {
    fn between(self, xs: &[f64], ys: &[f64]) -> f64 {
        let pairs = xs.iter().zip(ys);
        match self {
            Self::Euclidean => pairs.map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt(),
            Self::SquaredEuclidean => pairs.map(|(x, y)| (x - y).powi(2)).sum(),
            Self::Manhattan => pairs.map(|(x, y)| (x - y).abs()).sum(),
            Self::Hamming => pairs.filter(|(x, y)| x != y).count() as f64,
        }
    }
}

/// Pairwise distances between series as a `[k, k]` matrix. Only the strict
/// upper triangle (`i < j`, stored at `j * k + i`) is filled; the rest is 0.
pub(super) fn distance(a: &HostArray, metric: Metric) -> NativeResult<HostArray> {
    let series = Series::of(a)?;
    let count = series.count();
    let columns: Vec<&[f64]> = series.columns().collect();
    let mut out = vec![0.0; count * count];
    for j in 0..count {
        for i in 0..j {
            out[j * count + i] = metric.between(columns[i], columns[j]);
        }
    }
    Ok(series.output(out, Dim4::new([count as u64, count as u64, 1, 1])))
}
