use crate::array::Array;
use crate::dispatch::{invoke_one, EntryPoint};
use crate::error::Result;

pub const LLS: EntryPoint = EntryPoint::new("lls", 2, 1);

/// Least-squares solution `x` of `a * x = b`.
pub fn lls(a: &Array, b: &Array) -> Result<Array> {
    invoke_one(&LLS, &[a, b], &[])
}
