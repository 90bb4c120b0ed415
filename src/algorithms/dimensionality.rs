//! Dimensionality reduction. Point-selection methods return `[n, 2]` arrays
//! of (x, y) pairs.

use crate::array::Array;
use crate::dispatch::{invoke_one, EntryPoint, Scalar};
use crate::error::Result;

pub const PAA: EntryPoint = EntryPoint::new("paa", 1, 1);
pub const PIP: EntryPoint = EntryPoint::new("pip", 1, 1);
pub const PLA_BOTTOM_UP: EntryPoint = EntryPoint::new("pla_bottom_up", 1, 1);
pub const PLA_SLIDING_WINDOW: EntryPoint = EntryPoint::new("pla_sliding_window", 1, 1);
pub const RAMER_DOUGLAS_PEUCKER: EntryPoint = EntryPoint::new("ramer_douglas_peucker", 1, 1);
pub const SAX: EntryPoint = EntryPoint::new("sax", 1, 1);
pub const VISVALINGAM: EntryPoint = EntryPoint::new("visvalingam", 1, 1);

/// Piecewise aggregate approximation into `bins` segments.
pub fn paa(tss: &Array, bins: i32) -> Result<Array> {
    invoke_one(&PAA, &[tss], &[Scalar::Int(bins)])
}

/// The `number_ips` perceptually important points.
pub fn pip(tss: &Array, number_ips: i32) -> Result<Array> {
    invoke_one(&PIP, &[tss], &[Scalar::Int(number_ips)])
}

pub fn pla_bottom_up(ts: &Array, max_error: f32) -> Result<Array> {
    invoke_one(&PLA_BOTTOM_UP, &[ts], &[Scalar::Float(max_error)])
}

pub fn pla_sliding_window(ts: &Array, max_error: f32) -> Result<Array> {
    invoke_one(&PLA_SLIDING_WINDOW, &[ts], &[Scalar::Float(max_error)])
}

pub fn ramer_douglas_peucker(points: &Array, epsilon: f64) -> Result<Array> {
    invoke_one(&RAMER_DOUGLAS_PEUCKER, &[points], &[Scalar::Double(epsilon)])
}

/// Symbolic aggregate approximation with an alphabet of `alphabet_size` symbols.
pub fn sax(tss: &Array, alphabet_size: i32) -> Result<Array> {
    invoke_one(&SAX, &[tss], &[Scalar::Int(alphabet_size)])
}

pub fn visvalingam(points: &Array, num_points: i32) -> Result<Array> {
    invoke_one(&VISVALINGAM, &[points], &[Scalar::Int(num_points)])
}
