//! Host-side element buffers.
//!
//! `HostData` is a tagged buffer: exactly one variant per element type, so a
//! buffer always knows its own `Dtype`. The sealed `Element` trait ties each
//! Rust element type to its variant and gives generic code a typed view.

use crate::error::KhivaError;
use crate::types::Dtype;
use arrow::array::{Array as ArrowArray, ArrayRef, AsArray, BooleanArray, PrimitiveArray};
use arrow::datatypes::{
    ArrowPrimitiveType, DataType as ArrowDataType, Float32Type, Float64Type, Int16Type, Int32Type,
    Int64Type, UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use std::fmt;
use std::sync::Arc;

pub use num_complex::{Complex32, Complex64};

/// An owned, flat, column-major buffer of one element type.
#[derive(Debug, Clone, PartialEq)]
pub enum HostData {
    F32(Vec<f32>),
    C32(Vec<Complex32>),
    F64(Vec<f64>),
    C64(Vec<Complex64>),
    B8(Vec<bool>),
    S32(Vec<i32>),
    U32(Vec<u32>),
    U8(Vec<u8>),
    S64(Vec<i64>),
    U64(Vec<u64>),
    S16(Vec<i16>),
    U16(Vec<u16>),
}

impl HostData {
    pub fn dtype(&self) -> Dtype {
        match self {
            Self::F32(_) => Dtype::F32,
            Self::C32(_) => Dtype::C32,
            Self::F64(_) => Dtype::F64,
            Self::C64(_) => Dtype::C64,
            Self::B8(_) => Dtype::B8,
            Self::S32(_) => Dtype::S32,
            Self::U32(_) => Dtype::U32,
            Self::U8(_) => Dtype::U8,
            Self::S64(_) => Dtype::S64,
            Self::U64(_) => Dtype::U64,
            Self::S16(_) => Dtype::S16,
            Self::U16(_) => Dtype::U16,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::F32(v) => v.len(),
            Self::C32(v) => v.len(),
            Self::F64(v) => v.len(),
            Self::C64(v) => v.len(),
            Self::B8(v) => v.len(),
            Self::S32(v) => v.len(),
            Self::U32(v) => v.len(),
            Self::U8(v) => v.len(),
            Self::S64(v) => v.len(),
            Self::U64(v) => v.len(),
            Self::S16(v) => v.len(),
            Self::U16(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn from_vec<T: Element>(values: Vec<T>) -> Self {
        T::wrap(values)
    }

    /// A typed view, or `None` if `T` is not this buffer's element type.
    pub fn as_slice<T: Element>(&self) -> Option<&[T]> {
        T::view(self)
    }

    /// Unwraps the buffer into a typed vector.
    pub fn into_vec<T: Element>(self) -> Result<Vec<T>, KhivaError> {
        T::take(self)
    }

    /// Copies a non-null Arrow primitive or boolean array into a host buffer.
    pub fn from_arrow(array: &dyn ArrowArray) -> Result<Self, KhivaError> {
        if array.null_count() > 0 {
            return Err(KhivaError::UnsupportedType(format!(
                "Arrow array with {} null slots cannot be transferred",
                array.null_count()
            )));
        }
        let data = match array.data_type() {
            ArrowDataType::Float32 => Self::F32(primitive_values::<Float32Type>(array)),
            ArrowDataType::Float64 => Self::F64(primitive_values::<Float64Type>(array)),
            ArrowDataType::Int16 => Self::S16(primitive_values::<Int16Type>(array)),
            ArrowDataType::Int32 => Self::S32(primitive_values::<Int32Type>(array)),
            ArrowDataType::Int64 => Self::S64(primitive_values::<Int64Type>(array)),
            ArrowDataType::UInt8 => Self::U8(primitive_values::<UInt8Type>(array)),
            ArrowDataType::UInt16 => Self::U16(primitive_values::<UInt16Type>(array)),
            ArrowDataType::UInt32 => Self::U32(primitive_values::<UInt32Type>(array)),
            ArrowDataType::UInt64 => Self::U64(primitive_values::<UInt64Type>(array)),
            ArrowDataType::Boolean => Self::B8(array.as_boolean().values().iter().collect()),
            other => {
                // Reuse the canonical conversion for the error message.
                return Err(Dtype::from_arrow_type(other).err().unwrap_or_else(|| {
                    KhivaError::Internal(format!("Arrow type {:?} not wired", other))
                }));
            }
        };
        Ok(data)
    }

    /// Copies the buffer into a new Arrow array. Complex buffers are rejected.
    pub fn to_arrow(&self) -> Result<ArrayRef, KhivaError> {
        let array: ArrayRef = match self {
            Self::F32(v) => Arc::new(PrimitiveArray::<Float32Type>::from(v.clone())),
            Self::F64(v) => Arc::new(PrimitiveArray::<Float64Type>::from(v.clone())),
            Self::S16(v) => Arc::new(PrimitiveArray::<Int16Type>::from(v.clone())),
            Self::S32(v) => Arc::new(PrimitiveArray::<Int32Type>::from(v.clone())),
            Self::S64(v) => Arc::new(PrimitiveArray::<Int64Type>::from(v.clone())),
            Self::U8(v) => Arc::new(PrimitiveArray::<UInt8Type>::from(v.clone())),
            Self::U16(v) => Arc::new(PrimitiveArray::<UInt16Type>::from(v.clone())),
            Self::U32(v) => Arc::new(PrimitiveArray::<UInt32Type>::from(v.clone())),
            Self::U64(v) => Arc::new(PrimitiveArray::<UInt64Type>::from(v.clone())),
            Self::B8(v) => Arc::new(BooleanArray::from(v.clone())),
            Self::C32(_) | Self::C64(_) => {
                return Err(KhivaError::UnsupportedType(format!(
                    "{} has no Arrow representation",
                    self.dtype()
                )))
            }
        };
        Ok(array)
    }
}

fn primitive_values<T: ArrowPrimitiveType>(array: &dyn ArrowArray) -> Vec<T::Native> {
    array.as_primitive::<T>().values().to_vec()
}

impl fmt::Display for HostData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.dtype(), self.len())
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A Rust type that maps to exactly one native element type.
pub trait Element: Copy + Send + Sync + fmt::Debug + 'static + sealed::Sealed {
    const DTYPE: Dtype;

    fn wrap(values: Vec<Self>) -> HostData;

    fn view(data: &HostData) -> Option<&[Self]>;

    fn take(data: HostData) -> Result<Vec<Self>, KhivaError>;
}

macro_rules! impl_element {
    ($t:ty, $variant:ident) => {
        impl sealed::Sealed for $t {}

        impl Element for $t {
            const DTYPE: Dtype = Dtype::$variant;

            fn wrap(values: Vec<Self>) -> HostData {
                HostData::$variant(values)
            }

            fn view(data: &HostData) -> Option<&[Self]> {
                match data {
                    HostData::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn take(data: HostData) -> Result<Vec<Self>, KhivaError> {
                match data {
                    HostData::$variant(v) => Ok(v),
                    other => Err(KhivaError::TypeMismatch {
                        requested: Self::DTYPE,
                        actual: other.dtype(),
                    }),
                }
            }
        }
    };
}

impl_element!(f32, F32);
impl_element!(Complex32, C32);
impl_element!(f64, F64);
impl_element!(Complex64, C64);
impl_element!(bool, B8);
impl_element!(i32, S32);
impl_element!(u32, U32);
impl_element!(u8, U8);
impl_element!(i64, S64);
impl_element!(u64, U64);
impl_element!(i16, S16);
impl_element!(u16, U16);
