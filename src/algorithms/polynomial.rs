use crate::array::Array;
use crate::dispatch::{invoke_one, EntryPoint, Scalar};
use crate::error::Result;

pub const POLYFIT: EntryPoint = EntryPoint::new("polyfit", 2, 1);
pub const ROOTS: EntryPoint = EntryPoint::new("roots", 1, 1);

/// Least-squares polynomial of degree `deg` through `(x, y)`, highest power first.
pub fn polyfit(x: &Array, y: &Array, deg: i32) -> Result<Array> {
    invoke_one(&POLYFIT, &[x, y], &[Scalar::Int(deg)])
}

/// Complex roots of the polynomial with coefficients `p`.
pub fn roots(p: &Array) -> Result<Array> {
    invoke_one(&ROOTS, &[p], &[])
}
