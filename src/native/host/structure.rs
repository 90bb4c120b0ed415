//! Shape-changing kernels: transposition, slicing and matrix products.
//!
//! All buffers are column-major: element `(i, j, k, l)` of dims `[d0, d1, d2, d3]`
//! lives at `i + d0 * (j + d1 * (k + d2 * l))`.

use super::HostArray;
use crate::error::NativeError;
use crate::native::NativeResult;
use crate::types::{Dim4, HostData};
use ndarray::{ArrayView2, LinalgScalar, ShapeBuilder};

/// Applies a generic slice function to whichever variant `data` holds.
macro_rules! map_all {
    ($data:expr, $xs:ident => $body:expr) => {
        match $data {
            HostData::F32($xs) => HostData::F32($body),
            HostData::C32($xs) => HostData::C32($body),
            HostData::F64($xs) => HostData::F64($body),
            HostData::C64($xs) => HostData::C64($body),
            HostData::B8($xs) => HostData::B8($body),
            HostData::S32($xs) => HostData::S32($body),
            HostData::U32($xs) => HostData::U32($body),
            HostData::U8($xs) => HostData::U8($body),
            HostData::S64($xs) => HostData::S64($body),
            HostData::U64($xs) => HostData::U64($body),
            HostData::S16($xs) => HostData::S16($body),
            HostData::U16($xs) => HostData::U16($body),
        }
    };
}

fn extent(dims: Dim4, axis: usize) -> usize {
    dims[axis] as usize
}

//==================================================================================
// 1. Transpose
//==================================================================================

fn transpose_slice<T: Copy>(values: &[T], dims: Dim4) -> Vec<T> {
    let (d0, d1) = (extent(dims, 0), extent(dims, 1));
    let plane = d0 * d1;
    let mut out = Vec::with_capacity(values.len());
    for block in values.chunks(plane.max(1)) {
        for i in 0..d0 {
            for j in 0..d1 {
                out.push(block[j * d0 + i]);
            }
        }
    }
    out
}

/// Swaps extents 0 and 1 of every plane.
pub(super) fn transpose(a: &HostArray, conjugate: bool) -> HostArray {
    let dims = a.dims.as_array();
    let out_dims = Dim4::new([dims[1], dims[0], dims[2], dims[3]]);
    let mut data = map_all!(&a.data, xs => transpose_slice(xs, a.dims));
    if conjugate {
        match &mut data {
            HostData::C32(values) => values.iter_mut().for_each(|c| *c = c.conj()),
            HostData::C64(values) => values.iter_mut().for_each(|c| *c = c.conj()),
            _ => {}
        }
    }
    HostArray::new(out_dims, data)
}

//==================================================================================
// 2. Slicing
//==================================================================================

fn check_range(what: &str, first: i64, last: i64, len: u64) -> NativeResult<(usize, usize)> {
    if first < 0 || last < first || last as u64 >= len {
        return Err(NativeError::new(
            NativeError::INVALID_ARGUMENT,
            format!("{} range {}..={} is outside 0..{}", what, first, last, len),
        ));
    }
    Ok((first as usize, last as usize))
}

fn cols_slice<T: Copy>(values: &[T], dims: Dim4, first: usize, last: usize) -> Vec<T> {
    let (d0, d1) = (extent(dims, 0), extent(dims, 1));
    let plane = d0 * d1;
    let mut out = Vec::with_capacity(d0 * (last - first + 1) * (values.len() / plane.max(1)));
    for block in values.chunks(plane.max(1)) {
        out.extend_from_slice(&block[first * d0..(last + 1) * d0]);
    }
    out
}

fn rows_slice<T: Copy>(values: &[T], dims: Dim4, first: usize, last: usize) -> Vec<T> {
    let d0 = extent(dims, 0);
    let mut out = Vec::with_capacity((last - first + 1) * (values.len() / d0.max(1)));
    for column in values.chunks(d0.max(1)) {
        out.extend_from_slice(&column[first..=last]);
    }
    out
}

/// Series `first..=last` along extent 1.
pub(super) fn cols(a: &HostArray, first: i64, last: i64) -> NativeResult<HostArray> {
    let (first, last) = check_range("column", first, last, a.dims[1])?;
    let dims = a.dims.as_array();
    let out_dims = Dim4::new([dims[0], (last - first + 1) as u64, dims[2], dims[3]]);
    let data = map_all!(&a.data, xs => cols_slice(xs, a.dims, first, last));
    Ok(HostArray::new(out_dims, data))
}

/// Time points `first..=last` along extent 0.
pub(super) fn rows(a: &HostArray, first: i64, last: i64) -> NativeResult<HostArray> {
    let (first, last) = check_range("row", first, last, a.dims[0])?;
    let dims = a.dims.as_array();
    let out_dims = Dim4::new([(last - first + 1) as u64, dims[1], dims[2], dims[3]]);
    let data = map_all!(&a.data, xs => rows_slice(xs, a.dims, first, last));
    Ok(HostArray::new(out_dims, data))
}

//==================================================================================
// 3. Matrix Product
//==================================================================================

fn product<T: LinalgScalar>(a: &[T], (m, k): (usize, usize), b: &[T], n: usize) -> NativeResult<Vec<T>> {
    let shape_error = |e: ndarray::ShapeError| NativeError::new(NativeError::INTERNAL, e.to_string());
    let lhs = ArrayView2::from_shape((m, k).f(), a).map_err(shape_error)?;
    let rhs = ArrayView2::from_shape((k, n).f(), b).map_err(shape_error)?;
    let result = lhs.dot(&rhs);
    // Walking the transposed view in logical order yields column-major order.
    Ok(result.t().iter().copied().collect())
}

pub(super) fn matmul(a: &HostArray, b: &HostArray) -> NativeResult<HostArray> {
    let (ad, bd) = (a.dims.as_array(), b.dims.as_array());
    if ad[2] != 1 || ad[3] != 1 || bd[2] != 1 || bd[3] != 1 || ad[1] != bd[0] {
        return Err(NativeError::new(
            NativeError::SIZE,
            format!("cannot multiply {} by {}", a.dims, b.dims),
        ));
    }
    let (m, k, n) = (ad[0] as usize, ad[1] as usize, bd[1] as usize);
    let data = match (&a.data, &b.data) {
        (HostData::F32(x), HostData::F32(y)) => HostData::F32(product(x, (m, k), y, n)?),
        (HostData::F64(x), HostData::F64(y)) => HostData::F64(product(x, (m, k), y, n)?),
        (HostData::C32(x), HostData::C32(y)) => HostData::C32(product(x, (m, k), y, n)?),
        (HostData::C64(x), HostData::C64(y)) => HostData::C64(product(x, (m, k), y, n)?),
        (x, y) => {
            return Err(NativeError::new(
                NativeError::TYPE,
                format!("matmul needs matching floating-point types, got {} and {}", x.dtype(), y.dtype()),
            ))
        }
    };
    Ok(HostArray::new(Dim4::new([ad[0], bd[1], 1, 1]), data))
}
