//! Time-series features. Unless noted, each returns one value per input
//! series, shaped `[1, k]` for `k` series.

use super::AggregationFunction;
use crate::array::Array;
use crate::dispatch::{invoke_n, invoke_one, EntryPoint, Scalar};
use crate::error::Result;

/// Declares a parameterless single-input feature and its entry point.
macro_rules! series_feature {
    ($(#[$doc:meta])* $name:ident => $entry:ident) => {
        pub const $entry: EntryPoint = EntryPoint::new(stringify!($name), 1, 1);

        $(#[$doc])*
        pub fn $name(tss: &Array) -> Result<Array> {
            invoke_one(&$entry, &[tss], &[])
        }
    };
}

//==================================================================================
// 1. Parameterless Features
//==================================================================================

series_feature!(
    /// Sum of squares.
    abs_energy => ABS_ENERGY
);
series_feature!(absolute_sum_of_changes => ABSOLUTE_SUM_OF_CHANGES);
series_feature!(
    /// Points above the mean, as `u32`.
    count_above_mean => COUNT_ABOVE_MEAN
);
series_feature!(
    /// Points below the mean, as `u32`.
    count_below_mean => COUNT_BELOW_MEAN
);
series_feature!(
    /// Absolute value of the FFT coefficients: centroid, variance, skew and
    /// kurtosis of the spectrum, shaped `[4, k]`.
    fft_aggregated => FFT_AGGREGATED
);
series_feature!(
    /// Relative position of the first maximum.
    first_location_of_maximum => FIRST_LOCATION_OF_MAXIMUM
);
series_feature!(first_location_of_minimum => FIRST_LOCATION_OF_MINIMUM);
series_feature!(has_duplicates => HAS_DUPLICATES);
series_feature!(has_duplicate_max => HAS_DUPLICATE_MAX);
series_feature!(has_duplicate_min => HAS_DUPLICATE_MIN);
series_feature!(kurtosis => KURTOSIS);
series_feature!(last_location_of_maximum => LAST_LOCATION_OF_MAXIMUM);
series_feature!(last_location_of_minimum => LAST_LOCATION_OF_MINIMUM);
series_feature!(
    /// Series length as `s32`.
    length => LENGTH
);
series_feature!(
    /// Boolean mask of the local maxima, same shape as the input.
    local_maximals => LOCAL_MAXIMALS
);
series_feature!(longest_strike_above_mean => LONGEST_STRIKE_ABOVE_MEAN);
series_feature!(longest_strike_below_mean => LONGEST_STRIKE_BELOW_MEAN);
series_feature!(maximum => MAXIMUM);
series_feature!(mean => MEAN);
series_feature!(mean_absolute_change => MEAN_ABSOLUTE_CHANGE);
series_feature!(mean_change => MEAN_CHANGE);
series_feature!(mean_second_derivative_central => MEAN_SECOND_DERIVATIVE_CENTRAL);
series_feature!(median => MEDIAN);
series_feature!(minimum => MINIMUM);
series_feature!(ratio_value_number_to_time_series_length => RATIO_VALUE_NUMBER_TO_TIME_SERIES_LENGTH);
series_feature!(sample_entropy => SAMPLE_ENTROPY);
series_feature!(skewness => SKEWNESS);
series_feature!(
    /// Population standard deviation.
    standard_deviation => STANDARD_DEVIATION
);
series_feature!(sum_values => SUM_VALUES);
series_feature!(
    /// Population variance.
    variance => VARIANCE
);
series_feature!(variance_larger_than_standard_deviation => VARIANCE_LARGER_THAN_STANDARD_DEVIATION);

//==================================================================================
// 2. Parameterised Features
//==================================================================================

pub const AGGREGATED_AUTOCORRELATION: EntryPoint = EntryPoint::new("aggregated_autocorrelation", 1, 1);
pub const APPROXIMATE_ENTROPY: EntryPoint = EntryPoint::new("approximate_entropy", 1, 1);
pub const AUTO_COVARIANCE: EntryPoint = EntryPoint::new("auto_covariance", 1, 1);
pub const AUTO_CORRELATION: EntryPoint = EntryPoint::new("auto_correlation", 1, 1);
pub const BINNED_ENTROPY: EntryPoint = EntryPoint::new("binned_entropy", 1, 1);
pub const C3: EntryPoint = EntryPoint::new("c3", 1, 1);
pub const CID_CE: EntryPoint = EntryPoint::new("cid_ce", 1, 1);
pub const ENERGY_RATIO_BY_CHUNKS: EntryPoint = EntryPoint::new("energy_ratio_by_chunks", 1, 1);
pub const FRIEDRICH_COEFFICIENTS: EntryPoint = EntryPoint::new("friedrich_coefficients", 1, 1);
pub const INDEX_MASS_QUANTILE: EntryPoint = EntryPoint::new("index_mass_quantile", 1, 1);
pub const LARGE_STANDARD_DEVIATION: EntryPoint = EntryPoint::new("large_standard_deviation", 1, 1);
pub const MAX_LANGEVIN_FIXED_POINT: EntryPoint = EntryPoint::new("max_langevin_fixed_point", 1, 1);
pub const NUMBER_CROSSING_M: EntryPoint = EntryPoint::new("number_crossing_m", 1, 1);
pub const NUMBER_CWT_PEAKS: EntryPoint = EntryPoint::new("number_cwt_peaks", 1, 1);
pub const NUMBER_PEAKS: EntryPoint = EntryPoint::new("number_peaks", 1, 1);
pub const PERCENTAGE_OF_REOCCURRING_DATAPOINTS_TO_ALL_DATAPOINTS: EntryPoint =
    EntryPoint::new("percentage_of_reoccurring_datapoints_to_all_datapoints", 1, 1);
pub const PERCENTAGE_OF_REOCCURRING_VALUES_TO_ALL_VALUES: EntryPoint =
    EntryPoint::new("percentage_of_reoccurring_values_to_all_values", 1, 1);
pub const RANGE_COUNT: EntryPoint = EntryPoint::new("range_count", 1, 1);
pub const RATIO_BEYOND_R_SIGMA: EntryPoint = EntryPoint::new("ratio_beyond_r_sigma", 1, 1);
pub const SPKT_WELCH_DENSITY: EntryPoint = EntryPoint::new("spkt_welch_density", 1, 1);
pub const SUM_OF_REOCCURRING_DATAPOINTS: EntryPoint = EntryPoint::new("sum_of_reoccurring_datapoints", 1, 1);
pub const SUM_OF_REOCCURRING_VALUES: EntryPoint = EntryPoint::new("sum_of_reoccurring_values", 1, 1);
pub const SYMMETRY_LOOKING: EntryPoint = EntryPoint::new("symmetry_looking", 1, 1);
pub const TIME_REVERSAL_ASYMMETRY_STATISTIC: EntryPoint =
    EntryPoint::new("time_reversal_asymmetry_statistic", 1, 1);
pub const VALUE_COUNT: EntryPoint = EntryPoint::new("value_count", 1, 1);

/// Autocorrelation over all lags, aggregated with `aggregation`.
pub fn aggregated_autocorrelation(tss: &Array, aggregation: AggregationFunction) -> Result<Array> {
    invoke_one(&AGGREGATED_AUTOCORRELATION, &[tss], &[Scalar::Int(aggregation.code())])
}

pub fn approximate_entropy(tss: &Array, m: i32, r: f32) -> Result<Array> {
    invoke_one(&APPROXIMATE_ENTROPY, &[tss], &[Scalar::Int(m), Scalar::Float(r)])
}

/// `unbiased` divides by `n - lag` instead of `n`.
pub fn auto_covariance(tss: &Array, unbiased: bool) -> Result<Array> {
    invoke_one(&AUTO_COVARIANCE, &[tss], &[Scalar::Bool(unbiased)])
}

pub fn auto_correlation(tss: &Array, max_lag: i64, unbiased: bool) -> Result<Array> {
    invoke_one(
        &AUTO_CORRELATION,
        &[tss],
        &[Scalar::Long(max_lag), Scalar::Bool(unbiased)],
    )
}

pub fn binned_entropy(tss: &Array, max_bins: i64) -> Result<Array> {
    invoke_one(&BINNED_ENTROPY, &[tss], &[Scalar::Long(max_bins)])
}

/// Schreiber's non-linearity measure at `lag`.
pub fn c3(tss: &Array, lag: i64) -> Result<Array> {
    invoke_one(&C3, &[tss], &[Scalar::Long(lag)])
}

/// Complexity estimate; `z_normalize` normalises each series first.
pub fn cid_ce(tss: &Array, z_normalize: bool) -> Result<Array> {
    invoke_one(&CID_CE, &[tss], &[Scalar::Bool(z_normalize)])
}

/// Share of the energy held by chunk `segment_focus` out of `num_segments`.
pub fn energy_ratio_by_chunks(tss: &Array, num_segments: i64, segment_focus: i64) -> Result<Array> {
    invoke_one(
        &ENERGY_RATIO_BY_CHUNKS,
        &[tss],
        &[Scalar::Long(num_segments), Scalar::Long(segment_focus)],
    )
}

pub fn friedrich_coefficients(tss: &Array, m: i32, r: f32) -> Result<Array> {
    invoke_one(&FRIEDRICH_COEFFICIENTS, &[tss], &[Scalar::Int(m), Scalar::Float(r)])
}

pub fn index_mass_quantile(tss: &Array, q: f32) -> Result<Array> {
    invoke_one(&INDEX_MASS_QUANTILE, &[tss], &[Scalar::Float(q)])
}

/// Whether the standard deviation exceeds `r` times the range.
pub fn large_standard_deviation(tss: &Array, r: f32) -> Result<Array> {
    invoke_one(&LARGE_STANDARD_DEVIATION, &[tss], &[Scalar::Float(r)])
}

pub fn max_langevin_fixed_point(tss: &Array, m: i32, r: f32) -> Result<Array> {
    invoke_one(&MAX_LANGEVIN_FIXED_POINT, &[tss], &[Scalar::Int(m), Scalar::Float(r)])
}

pub fn number_crossing_m(tss: &Array, m: i32) -> Result<Array> {
    invoke_one(&NUMBER_CROSSING_M, &[tss], &[Scalar::Int(m)])
}

pub fn number_cwt_peaks(tss: &Array, max_w: i32) -> Result<Array> {
    invoke_one(&NUMBER_CWT_PEAKS, &[tss], &[Scalar::Int(max_w)])
}

/// Peaks of support at least `n`.
pub fn number_peaks(tss: &Array, n: i32) -> Result<Array> {
    invoke_one(&NUMBER_PEAKS, &[tss], &[Scalar::Int(n)])
}

pub fn percentage_of_reoccurring_datapoints_to_all_datapoints(tss: &Array, is_sorted: bool) -> Result<Array> {
    invoke_one(
        &PERCENTAGE_OF_REOCCURRING_DATAPOINTS_TO_ALL_DATAPOINTS,
        &[tss],
        &[Scalar::Bool(is_sorted)],
    )
}

pub fn percentage_of_reoccurring_values_to_all_values(tss: &Array, is_sorted: bool) -> Result<Array> {
    invoke_one(
        &PERCENTAGE_OF_REOCCURRING_VALUES_TO_ALL_VALUES,
        &[tss],
        &[Scalar::Bool(is_sorted)],
    )
}

/// Values in `[min, max)`.
pub fn range_count(tss: &Array, min: f32, max: f32) -> Result<Array> {
    invoke_one(&RANGE_COUNT, &[tss], &[Scalar::Float(min), Scalar::Float(max)])
}

pub fn ratio_beyond_r_sigma(tss: &Array, r: f32) -> Result<Array> {
    invoke_one(&RATIO_BEYOND_R_SIGMA, &[tss], &[Scalar::Float(r)])
}

pub fn spkt_welch_density(tss: &Array, coeff: i32) -> Result<Array> {
    invoke_one(&SPKT_WELCH_DENSITY, &[tss], &[Scalar::Int(coeff)])
}

pub fn sum_of_reoccurring_datapoints(tss: &Array, is_sorted: bool) -> Result<Array> {
    invoke_one(&SUM_OF_REOCCURRING_DATAPOINTS, &[tss], &[Scalar::Bool(is_sorted)])
}

pub fn sum_of_reoccurring_values(tss: &Array, is_sorted: bool) -> Result<Array> {
    invoke_one(&SUM_OF_REOCCURRING_VALUES, &[tss], &[Scalar::Bool(is_sorted)])
}

pub fn symmetry_looking(tss: &Array, r: f32) -> Result<Array> {
    invoke_one(&SYMMETRY_LOOKING, &[tss], &[Scalar::Float(r)])
}

pub fn time_reversal_asymmetry_statistic(tss: &Array, lag: i32) -> Result<Array> {
    invoke_one(&TIME_REVERSAL_ASYMMETRY_STATISTIC, &[tss], &[Scalar::Int(lag)])
}

/// Occurrences of `v`.
pub fn value_count(tss: &Array, v: f32) -> Result<Array> {
    invoke_one(&VALUE_COUNT, &[tss], &[Scalar::Float(v)])
}

//==================================================================================
// 3. Two-Input Features
//==================================================================================

pub const CROSS_COVARIANCE: EntryPoint = EntryPoint::new("cross_covariance", 2, 1);
pub const CROSS_CORRELATION: EntryPoint = EntryPoint::new("cross_correlation", 2, 1);
pub const CWT_COEFFICIENTS: EntryPoint = EntryPoint::new("cwt_coefficients", 2, 1);
pub const PARTIAL_AUTOCORRELATION: EntryPoint = EntryPoint::new("partial_autocorrelation", 2, 1);
pub const QUANTILE: EntryPoint = EntryPoint::new("quantile", 2, 1);

/// Default `precision` of [`quantile`].
pub const DEFAULT_QUANTILE_PRECISION: f32 = 1e8;

pub fn cross_covariance(xss: &Array, yss: &Array, unbiased: bool) -> Result<Array> {
    invoke_one(&CROSS_COVARIANCE, &[xss, yss], &[Scalar::Bool(unbiased)])
}

pub fn cross_correlation(xss: &Array, yss: &Array, unbiased: bool) -> Result<Array> {
    invoke_one(&CROSS_CORRELATION, &[xss, yss], &[Scalar::Bool(unbiased)])
}

/// Ricker wavelet transform coefficient `coeff` at width `w`, for the widths in `widths`.
pub fn cwt_coefficients(tss: &Array, widths: &Array, coeff: i32, w: i32) -> Result<Array> {
    invoke_one(
        &CWT_COEFFICIENTS,
        &[tss, widths],
        &[Scalar::Int(coeff), Scalar::Int(w)],
    )
}

pub fn partial_autocorrelation(tss: &Array, lags: &Array) -> Result<Array> {
    invoke_one(&PARTIAL_AUTOCORRELATION, &[tss, lags], &[])
}

/// Values at the quantiles `q`, with `precision` decimals.
pub fn quantile(tss: &Array, q: &Array, precision: f32) -> Result<Array> {
    invoke_one(&QUANTILE, &[tss, q], &[Scalar::Float(precision)])
}

//==================================================================================
// 4. Multi-Output Features
//==================================================================================

pub const AGGREGATED_LINEAR_TREND: EntryPoint = EntryPoint::new("aggregated_linear_trend", 1, 5);
pub const FFT_COEFFICIENT: EntryPoint = EntryPoint::new("fft_coefficient", 1, 4);
pub const LINEAR_TREND: EntryPoint = EntryPoint::new("linear_trend", 1, 5);

/// Regression over chunk aggregates, in native output order.
#[derive(Debug)]
pub struct AggregatedLinearTrend {
    pub slope: Array,
    pub intercept: Array,
    pub rvalue: Array,
    pub pvalue: Array,
    pub stderrest: Array,
}

/// One FFT coefficient per series.
#[derive(Debug)]
pub struct FftCoefficient {
    pub real: Array,
    pub imag: Array,
    pub abs: Array,
    pub angle: Array,
}

/// Regression of each series against `0..n`, in native output order.
#[derive(Debug)]
pub struct LinearTrend {
    pub pvalue: Array,
    pub rvalue: Array,
    pub intercept: Array,
    pub slope: Array,
    pub stderr: Array,
}

/// Aggregates chunks of `chunk_size` points with `aggregation`, then fits a line.
pub fn aggregated_linear_trend(
    tss: &Array,
    chunk_size: i64,
    aggregation: AggregationFunction,
) -> Result<AggregatedLinearTrend> {
    let [slope, intercept, rvalue, pvalue, stderrest] = invoke_n::<5>(
        &AGGREGATED_LINEAR_TREND,
        &[tss],
        &[Scalar::Long(chunk_size), Scalar::Int(aggregation.code())],
    )?;
    Ok(AggregatedLinearTrend {
        slope,
        intercept,
        rvalue,
        pvalue,
        stderrest,
    })
}

pub fn fft_coefficient(tss: &Array, coefficient: i64) -> Result<FftCoefficient> {
    let [real, imag, abs, angle] =
        invoke_n::<4>(&FFT_COEFFICIENT, &[tss], &[Scalar::Long(coefficient)])?;
    Ok(FftCoefficient {
        real,
        imag,
        abs,
        angle,
    })
}

pub fn linear_trend(tss: &Array) -> Result<LinearTrend> {
    let [pvalue, rvalue, intercept, slope, stderr] = invoke_n::<5>(&LINEAR_TREND, &[tss], &[])?;
    Ok(LinearTrend {
        pvalue,
        rvalue,
        intercept,
        slope,
        stderr,
    })
}
