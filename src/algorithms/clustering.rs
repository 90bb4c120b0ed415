use crate::array::Array;
use crate::dispatch::{invoke_n, EntryPoint, Scalar};
use crate::error::Result;

pub const K_MEANS: EntryPoint = EntryPoint::new("k_means", 1, 2);
pub const K_SHAPE: EntryPoint = EntryPoint::new("k_shape", 1, 2);

/// Centroids and per-series cluster labels.
#[derive(Debug)]
pub struct Clusters {
    pub centroids: Array,
    pub labels: Array,
}

fn cluster(entry: &EntryPoint, tss: &Array, k: i32, tolerance: f32, max_iterations: i32) -> Result<Clusters> {
    let [centroids, labels] = invoke_n::<2>(
        entry,
        &[tss],
        &[Scalar::Int(k), Scalar::Float(tolerance), Scalar::Int(max_iterations)],
    )?;
    Ok(Clusters { centroids, labels })
}

/// Lloyd's k-means over the series of `tss`.
pub fn k_means(tss: &Array, k: i32, tolerance: f32, max_iterations: i32) -> Result<Clusters> {
    cluster(&K_MEANS, tss, k, tolerance, max_iterations)
}

/// k-Shape clustering (Paparrizos & Gravano, 2016).
pub fn k_shape(tss: &Array, k: i32, tolerance: f32, max_iterations: i32) -> Result<Clusters> {
    cluster(&K_SHAPE, tss, k, tolerance, max_iterations)
}
