use super::AggregationFunction;
use crate::array::Array;
use crate::dispatch::{invoke_one, EntryPoint, Scalar};
use crate::error::Result;

pub const GROUP_BY: EntryPoint = EntryPoint::new("group_by", 1, 1);

/// Groups rows by the first `n_columns_key` columns and aggregates the next
/// `n_columns_value` columns. The keys must be sorted.
pub fn group_by(
    arr: &Array,
    aggregation: AggregationFunction,
    n_columns_key: i32,
    n_columns_value: i32,
) -> Result<Array> {
    invoke_one(
        &GROUP_BY,
        &[arr],
        &[
            Scalar::Int(aggregation.code()),
            Scalar::Int(n_columns_key),
            Scalar::Int(n_columns_value),
        ],
    )
}
