//! Element-wise kernels: arithmetic, comparison, bitwise logic and type casts.
//!
//! Binary kernels need both operands of the same element type and either the
//! same dims or one single-element operand, which is broadcast. Integer
//! arithmetic wraps; integer division or remainder by zero yields 0.

use super::HostArray;
use crate::error::NativeError;
use crate::native::NativeResult;
use crate::types::{Complex32, Complex64, Dim4, Dtype, HostData};
use num_traits::Zero;
use std::ops::{BitAnd, BitOr, BitXor};

//==================================================================================
// 1. Operators
//==================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum CmpOp {
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
}

impl CmpOp {
    fn test<T: PartialOrd>(self, x: T, y: T) -> bool {
        match self {
            Self::Lt => x < y,
            Self::Gt => x > y,
            Self::Le => x <= y,
            Self::Ge => x >= y,
            Self::Eq => x == y,
            Self::Ne => x != y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum BitOp {
    And,
    Or,
    Xor,
}

impl BitOp {
    fn apply<T>(self, x: T, y: T) -> T
    where
        T: BitAnd<Output = T> + BitOr<Output = T> + BitXor<Output = T>,
    {
        match self {
            Self::And => x & y,
            Self::Or => x | y,
            Self::Xor => x ^ y,
        }
    }
}

trait Arith: Copy {
    fn arith(self, op: ArithOp, rhs: Self) -> Self;
}

macro_rules! impl_arith_float {
    ($($t:ty),+) => {$(
        impl Arith for $t {
            fn arith(self, op: ArithOp, rhs: Self) -> Self {
                match op {
                    ArithOp::Add => self + rhs,
                    ArithOp::Sub => self - rhs,
                    ArithOp::Mul => self * rhs,
                    ArithOp::Div => self / rhs,
                    ArithOp::Rem => self % rhs,
                    ArithOp::Pow => self.powf(rhs),
                }
            }
        }
    )+};
}

macro_rules! impl_arith_complex {
    ($($t:ty),+) => {$(
        impl Arith for $t {
            fn arith(self, op: ArithOp, rhs: Self) -> Self {
                match op {
                    ArithOp::Add => self + rhs,
                    ArithOp::Sub => self - rhs,
                    ArithOp::Mul => self * rhs,
                    ArithOp::Div => self / rhs,
                    ArithOp::Rem => self % rhs,
                    ArithOp::Pow => self.powc(rhs),
                }
            }
        }
    )+};
}

macro_rules! impl_arith_int {
    ($($t:ty),+) => {$(
        impl Arith for $t {
            fn arith(self, op: ArithOp, rhs: Self) -> Self {
                match op {
                    ArithOp::Add => self.wrapping_add(rhs),
                    ArithOp::Sub => self.wrapping_sub(rhs),
                    ArithOp::Mul => self.wrapping_mul(rhs),
                    ArithOp::Div if rhs == 0 => 0,
                    ArithOp::Div => self.wrapping_div(rhs),
                    ArithOp::Rem if rhs == 0 => 0,
                    ArithOp::Rem => self.wrapping_rem(rhs),
                    // Negative exponents truncate to zero.
                    ArithOp::Pow => u32::try_from(rhs).map_or(0, |e| self.wrapping_pow(e)),
                }
            }
        }
    )+};
}

impl_arith_float!(f32, f64);
impl_arith_complex!(Complex32, Complex64);
impl_arith_int!(i16, i32, i64, u8, u16, u32, u64);

//==================================================================================
// 2. Binary Kernels
//==================================================================================

/// Applies `f` pairwise, broadcasting a single-element side.
fn zip<T: Copy, R>(a: &[T], b: &[T], f: impl Fn(T, T) -> R) -> Vec<R> {
    if a.len() != 1 && b.len() == 1 {
        a.iter().map(|&x| f(x, b[0])).collect()
    } else if a.len() == 1 && b.len() != 1 {
        b.iter().map(|&y| f(a[0], y)).collect()
    } else {
        a.iter().zip(b).map(|(&x, &y)| f(x, y)).collect()
    }
}

fn broadcast_dims(a: &HostArray, b: &HostArray) -> NativeResult<Dim4> {
    if a.dims == b.dims || b.dims.elements() == 1 {
        Ok(a.dims)
    } else if a.dims.elements() == 1 {
        Ok(b.dims)
    } else {
        Err(NativeError::new(
            NativeError::SIZE,
            format!("dims {} and {} do not match", a.dims, b.dims),
        ))
    }
}

fn type_error(what: &str, a: &HostData, b: &HostData) -> NativeError {
    if a.dtype() != b.dtype() {
        NativeError::new(
            NativeError::DIFFERENT_TYPES,
            format!("cannot {} {} and {}", what, a.dtype(), b.dtype()),
        )
    } else {
        NativeError::new(
            NativeError::TYPE,
            format!("cannot {} {} arrays", what, a.dtype()),
        )
    }
}

/// Matches two buffers of the same listed variant and zips them.
macro_rules! pairwise {
    (same; $a:expr, $b:expr, |$x:ident, $y:ident| $body:expr, [$($v:ident),+]) => {
        match ($a, $b) {
            $( (HostData::$v(xs), HostData::$v(ys)) => {
                Some(HostData::$v(zip(xs, ys, |$x, $y| $body)))
            } )+
            _ => None,
        }
    };
    (bool; $a:expr, $b:expr, |$x:ident, $y:ident| $body:expr, [$($v:ident),+]) => {
        match ($a, $b) {
            $( (HostData::$v(xs), HostData::$v(ys)) => {
                Some(HostData::B8(zip(xs, ys, |$x, $y| $body)))
            } )+
            _ => None,
        }
    };
}

pub(super) fn arithmetic(op: ArithOp, a: &HostArray, b: &HostArray) -> NativeResult<HostArray> {
    let dims = broadcast_dims(a, b)?;
    let data = pairwise!(
        same; &a.data, &b.data,
        |x, y| x.arith(op, y),
        [F32, C32, F64, C64, S32, U32, U8, S64, U64, S16, U16]
    )
    .ok_or_else(|| type_error("combine", &a.data, &b.data))?;
    Ok(HostArray::new(dims, data))
}

pub(super) fn compare(op: CmpOp, a: &HostArray, b: &HostArray) -> NativeResult<HostArray> {
    let dims = broadcast_dims(a, b)?;
    let ordered = pairwise!(
        bool; &a.data, &b.data,
        |x, y| op.test(x, y),
        [F32, F64, B8, S32, U32, U8, S64, U64, S16, U16]
    );
    let data = match ordered {
        Some(data) => data,
        // Complex values have equality but no order.
        None if matches!(op, CmpOp::Eq | CmpOp::Ne) => pairwise!(
            bool; &a.data, &b.data,
            |x, y| (x == y) == (op == CmpOp::Eq),
            [C32, C64]
        )
        .ok_or_else(|| type_error("compare", &a.data, &b.data))?,
        None => return Err(type_error("order", &a.data, &b.data)),
    };
    Ok(HostArray::new(dims, data))
}

pub(super) fn bitwise(op: BitOp, a: &HostArray, b: &HostArray) -> NativeResult<HostArray> {
    let dims = broadcast_dims(a, b)?;
    let data = pairwise!(
        same; &a.data, &b.data,
        |x, y| op.apply(x, y),
        [B8, S32, U32, U8, S64, U64, S16, U16]
    )
    .ok_or_else(|| type_error("apply bit logic to", &a.data, &b.data))?;
    Ok(HostArray::new(dims, data))
}

//==================================================================================
// 3. Unary Kernels
//==================================================================================

pub(super) fn shift(a: &HostArray, amount: i64, left: bool) -> NativeResult<HostArray> {
    let n = u32::try_from(amount).map_err(|_| {
        NativeError::new(
            NativeError::INVALID_ARGUMENT,
            format!("shift amount must be non-negative, got {}", amount),
        )
    })?;
    macro_rules! shifted {
        ($($v:ident),+) => {
            match &a.data {
                $( HostData::$v(xs) => HostData::$v(
                    xs.iter()
                        .map(|x| if left { x.wrapping_shl(n) } else { x.wrapping_shr(n) })
                        .collect(),
                ), )+
                other => {
                    return Err(NativeError::new(
                        NativeError::TYPE,
                        format!("cannot shift {} arrays", other.dtype()),
                    ))
                }
            }
        };
    }
    let data = shifted!(S32, U32, U8, S64, U64, S16, U16);
    Ok(HostArray::new(a.dims, data))
}

/// Logical negation: true where the element is zero.
pub(super) fn not(a: &HostArray) -> HostArray {
    macro_rules! is_zero {
        ($($v:ident),+) => {
            match &a.data {
                HostData::B8(xs) => xs.iter().map(|x| !x).collect(),
                $( HostData::$v(xs) => xs.iter().map(|x| x.is_zero()).collect(), )+
            }
        };
    }
    let data: Vec<bool> = is_zero!(F32, C32, F64, C64, S32, U32, U8, S64, U64, S16, U16);
    HostArray::new(a.dims, HostData::B8(data))
}

//==================================================================================
// 4. Casts
//==================================================================================

/// Converts `data` to `target` with C-style cast semantics. Integer to integer
/// casts are exact before truncation; complex to real keeps the real part.
pub(super) fn cast(data: &HostData, target: Dtype) -> HostData {
    if data.dtype() == target {
        return data.clone();
    }
    match data {
        HostData::C32(v) => from_complex(
            v.iter()
                .map(|c| Complex64::new(f64::from(c.re), f64::from(c.im)))
                .collect(),
            target,
        ),
        HostData::C64(v) => from_complex(v.clone(), target),
        HostData::F32(v) => from_reals(&v.iter().map(|&x| f64::from(x)).collect::<Vec<_>>(), target),
        HostData::F64(v) => from_reals(v, target),
        HostData::B8(v) => from_integers(&v.iter().map(|&x| i128::from(x)).collect::<Vec<_>>(), target),
        HostData::S32(v) => from_integers(&widen(v), target),
        HostData::U32(v) => from_integers(&widen(v), target),
        HostData::U8(v) => from_integers(&widen(v), target),
        HostData::S64(v) => from_integers(&widen(v), target),
        HostData::U64(v) => from_integers(&widen(v), target),
        HostData::S16(v) => from_integers(&widen(v), target),
        HostData::U16(v) => from_integers(&widen(v), target),
    }
}

fn widen<T: Copy + Into<i128>>(values: &[T]) -> Vec<i128> {
    values.iter().map(|&x| x.into()).collect()
}

fn from_integers(values: &[i128], target: Dtype) -> HostData {
    match target {
        Dtype::F32 => HostData::F32(values.iter().map(|&x| x as f32).collect()),
        Dtype::F64 => HostData::F64(values.iter().map(|&x| x as f64).collect()),
        Dtype::C32 => HostData::C32(values.iter().map(|&x| Complex32::new(x as f32, 0.0)).collect()),
        Dtype::C64 => HostData::C64(values.iter().map(|&x| Complex64::new(x as f64, 0.0)).collect()),
        Dtype::B8 => HostData::B8(values.iter().map(|&x| x != 0).collect()),
        Dtype::S32 => HostData::S32(values.iter().map(|&x| x as i32).collect()),
        Dtype::U32 => HostData::U32(values.iter().map(|&x| x as u32).collect()),
        Dtype::U8 => HostData::U8(values.iter().map(|&x| x as u8).collect()),
        Dtype::S64 => HostData::S64(values.iter().map(|&x| x as i64).collect()),
        Dtype::U64 => HostData::U64(values.iter().map(|&x| x as u64).collect()),
        Dtype::S16 => HostData::S16(values.iter().map(|&x| x as i16).collect()),
        Dtype::U16 => HostData::U16(values.iter().map(|&x| x as u16).collect()),
    }
}

fn from_reals(values: &[f64], target: Dtype) -> HostData {
    match target {
        Dtype::F32 => HostData::F32(values.iter().map(|&x| x as f32).collect()),
        Dtype::F64 => HostData::F64(values.to_vec()),
        Dtype::C32 => HostData::C32(values.iter().map(|&x| Complex32::new(x as f32, 0.0)).collect()),
        Dtype::C64 => HostData::C64(values.iter().map(|&x| Complex64::new(x, 0.0)).collect()),
        Dtype::B8 => HostData::B8(values.iter().map(|&x| x != 0.0).collect()),
        Dtype::S32 => HostData::S32(values.iter().map(|&x| x as i32).collect()),
        Dtype::U32 => HostData::U32(values.iter().map(|&x| x as u32).collect()),
        Dtype::U8 => HostData::U8(values.iter().map(|&x| x as u8).collect()),
        Dtype::S64 => HostData::S64(values.iter().map(|&x| x as i64).collect()),
        Dtype::U64 => HostData::U64(values.iter().map(|&x| x as u64).collect()),
        Dtype::S16 => HostData::S16(values.iter().map(|&x| x as i16).collect()),
        Dtype::U16 => HostData::U16(values.iter().map(|&x| x as u16).collect()),
    }
}

fn from_complex(values: Vec<Complex64>, target: Dtype) -> HostData {
    match target {
        Dtype::C64 => HostData::C64(values),
        Dtype::C32 => HostData::C32(
            values
                .iter()
                .map(|c| Complex32::new(c.re as f32, c.im as f32))
                .collect(),
        ),
        real => from_reals(&values.iter().map(|c| c.re).collect::<Vec<_>>(), real),
    }
}
