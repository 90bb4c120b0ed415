mod common;

use common::{assert_close, assert_close_f32, recording_context};
use khiva::algorithms::{
    clustering, distances, features, matrix, normalization, regression, regularization, statistics,
};
use khiva::{AggregationFunction, Array, Context, Scalar};

fn value(array: &Array) -> f64 {
    array.get_data::<f64>().unwrap()[0]
}

//==================================================================================
// Normalization
//==================================================================================

#[test]
fn znorm_normalises_each_series() {
    let ctx = Context::host();
    let tss = Array::new(&ctx, &[0.0f64, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0], &[4, 2]).unwrap();

    let result = normalization::znorm(&tss, normalization::DEFAULT_EPSILON).unwrap();

    let expected = [-1.3416407865, -0.4472135955, 0.4472135955, 1.3416407865];
    let data = result.get_data::<f64>().unwrap();
    assert_close(&data[..4], &expected, 1e-9);
    assert_close(&data[4..], &expected, 1e-9);
}

#[test]
fn max_min_norm_in_place_uses_given_bounds() {
    let ctx = Context::host();
    let tss = Array::new(&ctx, &[0.0f32, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0], &[4, 2]).unwrap();

    normalization::max_min_norm_in_place(&tss, 2.0, 1.0, normalization::DEFAULT_EPSILON).unwrap();

    let data = tss.get_data::<f32>().unwrap();
    assert_close_f32(&data[..4], &[1.0, 1.333_333_4, 1.666_666_7, 2.0], 1e-5);
}

#[test]
fn decimal_scaling_norm_in_place() {
    let ctx = Context::host();
    let tss = Array::new(&ctx, &[0.0f64, 1.0, -2.0, 3.0, 40.0, 50.0, 60.0, -70.0], &[4, 2]).unwrap();

    normalization::decimal_scaling_norm_in_place(&tss).unwrap();

    assert_close(
        &tss.get_data::<f64>().unwrap(),
        &[0.0, 0.1, -0.2, 0.3, 0.4, 0.5, 0.6, -0.7],
        1e-12,
    );
}

//==================================================================================
// Statistics, Features & Distances
//==================================================================================

#[test]
fn sample_stdev_per_series() {
    let ctx = Context::host();
    let tss = Array::new(
        &ctx,
        &[0.0f64, 1.0, 2.0, 3.0, 4.0, 5.0, 2.0, 2.0, 2.0, 20.0, 30.0, 25.0],
        &[6, 2],
    )
    .unwrap();

    let result = statistics::sample_stdev(&tss).unwrap();

    assert_eq!(result.dims().unwrap().as_array(), [1, 2, 1, 1]);
    assert_close(&result.get_data::<f64>().unwrap(), &[1.8708286934, 12.9884564133], 1e-9);
}

#[test]
fn moment_and_covariance() {
    let ctx = Context::host();
    let ramp = Array::new(&ctx, &[0.0f64, 1.0, 2.0, 3.0, 4.0, 5.0], &[6]).unwrap();
    assert_close(&statistics::moment(&ramp, 2).unwrap().get_data::<f64>().unwrap(), &[9.16666667], 1e-6);
    assert_close(&statistics::moment(&ramp, 4).unwrap().get_data::<f64>().unwrap(), &[163.16666667], 1e-6);

    let tss = Array::new(
        &ctx,
        &[-2.1f32, -1.0, 4.3, 3.0, 1.1, 0.12, 3.0, 1.1, 0.12],
        &[3, 3],
    )
    .unwrap();
    let cov = statistics::covariance(&tss, true).unwrap();
    assert_close_f32(
        &cov.get_data::<f32>().unwrap(),
        &[11.71, -4.286, -4.286, -4.286, 2.144_133_3, 2.144_133_3, -4.286, 2.144_133_3, 2.144_133_3],
        1e-4,
    );
}

#[test]
fn summary_features() {
    let ctx = Context::host();
    let tss = Array::new(
        &ctx,
        &[
            20.0f64, 20.0, 20.0, 18.0, 25.0, 19.0, 20.0, 20.0, 20.0, 20.0, 40.0, 30.0, 1.0, 50.0,
            1.0, 1.0, 5.0, 1.0, 20.0, 20.0, 20.0, 20.0, 20.0, 2.0, 19.0, 1.0, 20.0, 20.0, 20.0, 1.0,
            15.0, 1.0, 30.0, 1.0, 1.0, 18.0, 4.0, 1.0, 20.0, 20.0,
        ],
        &[20, 2],
    )
    .unwrap();

    assert_close(&features::mean(&tss).unwrap().get_data::<f64>().unwrap(), &[18.55, 12.7], 1e-9);
    assert_close(&features::maximum(&tss).unwrap().get_data::<f64>().unwrap(), &[50.0, 30.0], 1e-9);
    assert_close(
        &features::standard_deviation(&tss).unwrap().get_data::<f64>().unwrap(),
        &[12.363150892875165, 9.51367436903324],
        1e-9,
    );
    assert_eq!(features::length(&tss).unwrap().get_data::<i32>().unwrap(), vec![20, 20]);
}

#[test]
fn counting_features() {
    let ctx = Context::host();
    let data: Vec<f64> = (0..12).map(f64::from).collect();
    let tss = Array::new(&ctx, &data, &[6, 2]).unwrap();

    assert_eq!(features::count_above_mean(&tss).unwrap().get_data::<u32>().unwrap(), vec![3, 3]);
    assert_eq!(features::count_below_mean(&tss).unwrap().get_data::<u32>().unwrap(), vec![3, 3]);
    assert_close(
        &features::absolute_sum_of_changes(&tss).unwrap().get_data::<f64>().unwrap(),
        &[5.0, 5.0],
        1e-12,
    );
}

#[test]
fn euclidean_distance_matrix() {
    let ctx = Context::host();
    let data: Vec<f32> = (0..12u8).map(f32::from).collect();
    let tss = Array::new(&ctx, &data, &[4, 3]).unwrap();

    let result = distances::euclidean(&tss).unwrap();

    assert_eq!(result.dims().unwrap().as_array(), [3, 3, 1, 1]);
    assert_close_f32(
        &result.get_data::<f32>().unwrap(),
        &[0.0, 0.0, 0.0, 8.0, 0.0, 0.0, 16.0, 8.0, 0.0],
        1e-5,
    );
}

//==================================================================================
// Multi-Output Entry Points
//==================================================================================

#[test]
fn k_means_reconciles_input_and_orders_outputs() {
    // Arrange
    let (ctx, layer) = recording_context();
    let tss = Array::new(&ctx, &[1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0], &[3, 2]).unwrap();
    let before = tss.handle();

    // Act
    let clusters = clustering::k_means(&tss, 2, 1e-10, 100).unwrap();

    // Assert
    let call = layer.last_call();
    assert_eq!(call.entry, clustering::K_MEANS);
    assert_eq!(call.inputs, vec![before]);
    assert_eq!(call.params, vec![Scalar::Int(2), Scalar::Float(1e-10), Scalar::Int(100)]);
    assert_eq!(tss.handle(), call.result[0]);
    assert_eq!(clusters.centroids.handle(), call.result[1]);
    assert_eq!(clusters.labels.handle(), call.result[2]);
    assert_eq!(value(&clusters.centroids), 0.0);
    assert_eq!(value(&clusters.labels), 1.0);
    assert_eq!(tss.get_data::<f64>().unwrap(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert_eq!(layer.host().live_count(), 3);
}

#[test]
fn stomp_then_motifs() {
    let (ctx, layer) = recording_context();
    let a = Array::new(&ctx, &[10.0f64, 11.0, 10.0, 11.0], &[4]).unwrap();
    let b = Array::new(&ctx, &[10.0f64, 11.0, 10.0, 10.0], &[4]).unwrap();

    let mp = matrix::stomp(&a, &b, 3).unwrap();
    let stomp_call = layer.last_call();
    assert_eq!((a.handle(), b.handle()), (stomp_call.result[0], stomp_call.result[1]));
    assert_eq!((value(&mp.profile), value(&mp.index)), (0.0, 1.0));

    let profile_before = mp.profile.handle();
    let motifs = matrix::find_best_n_motifs(&mp, 3, 1, false).unwrap();

    let call = layer.last_call();
    assert_eq!(call.entry.result_len(), 5);
    assert_eq!(call.inputs[0], profile_before);
    assert_eq!(mp.profile.handle(), call.result[0]);
    assert_eq!(mp.index.handle(), call.result[1]);
    assert_eq!(
        (value(&motifs.distances), value(&motifs.indices), value(&motifs.subsequence_indices)),
        (0.0, 1.0, 2.0)
    );
    // a, b, profile, index and three motif outputs.
    assert_eq!(layer.host().live_count(), 7);
}

#[test]
fn stomp_of_an_array_against_itself() {
    let (ctx, layer) = recording_context();
    let t = Array::new(&ctx, &[1.0f64, 2.0, 3.0, 1.0, 2.0, 3.0], &[6]).unwrap();

    let mp = matrix::stomp(&t, &t, 3).unwrap();

    let call = layer.last_call();
    assert_eq!(call.result[0], call.result[1]);
    assert_eq!(t.handle(), call.result[0]);
    assert_eq!(layer.host().live_count(), 3);
    drop(mp);
    assert_eq!(layer.host().live_count(), 1);
}

#[test]
fn linear_regression_has_five_ordered_outputs() {
    let (ctx, layer) = recording_context();
    let xss = Array::new(&ctx, &[0.0f64, 1.0, 2.0, 3.0], &[4]).unwrap();
    let yss = Array::new(&ctx, &[1.0f64, 3.0, 5.0, 7.0], &[4]).unwrap();

    let fit = regression::linear(&xss, &yss).unwrap();

    let outputs = [&fit.slope, &fit.intercept, &fit.rvalue, &fit.pvalue, &fit.stderrest];
    for (j, output) in outputs.iter().enumerate() {
        assert_eq!(value(output), j as f64);
    }
    let call = layer.last_call();
    assert_eq!(&call.result[..2], &[xss.handle(), yss.handle()]);
    assert_eq!(layer.host().live_count(), 7);
}

#[test]
fn aggregated_linear_trend_passes_aggregation_code() {
    let (ctx, layer) = recording_context();
    let tss = Array::new(&ctx, &[2.0f64, 2.0, 2.0, 3.0, 3.0, 3.0], &[6]).unwrap();

    let trend = features::aggregated_linear_trend(&tss, 3, AggregationFunction::Median).unwrap();

    let call = layer.last_call();
    assert_eq!(call.params, vec![Scalar::Long(3), Scalar::Int(1)]);
    assert_eq!(value(&trend.slope), 0.0);
    assert_eq!(value(&trend.stderrest), 4.0);
}

#[test]
fn fft_coefficient_and_linear_trend() {
    let (ctx, _layer) = recording_context();
    let tss = Array::new(&ctx, &[0.0f64, 1.0, 2.0, 3.0], &[4]).unwrap();

    let fft = features::fft_coefficient(&tss, 0).unwrap();
    assert_eq!((value(&fft.real), value(&fft.angle)), (0.0, 3.0));

    let trend = features::linear_trend(&tss).unwrap();
    assert_eq!((value(&trend.pvalue), value(&trend.slope)), (0.0, 3.0));
}

#[test]
fn group_by_forwards_its_parameters() {
    let (ctx, layer) = recording_context();
    let arr = Array::new(&ctx, &[0.0f64, 1.0, 1.0, 2.0, 3.0, 4.0], &[3, 2]).unwrap();

    regularization::group_by(&arr, AggregationFunction::Max, 1, 1).unwrap();

    assert_eq!(
        layer.last_call().params,
        vec![Scalar::Int(3), Scalar::Int(1), Scalar::Int(1)]
    );
}

#[test]
fn two_input_features_reconcile_both_inputs() {
    let (ctx, layer) = recording_context();
    let tss = Array::new(&ctx, &[1.0f64, 2.0, 3.0, 4.0], &[4]).unwrap();
    let q = Array::new(&ctx, &[0.5f64], &[1]).unwrap();

    let result = features::quantile(&tss, &q, features::DEFAULT_QUANTILE_PRECISION).unwrap();

    let call = layer.last_call();
    assert_eq!(call.entry, features::QUANTILE);
    assert_eq!((tss.handle(), q.handle()), (call.result[0], call.result[1]));
    assert_eq!(result.handle(), call.result[2]);
}
