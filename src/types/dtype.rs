//! This module defines the canonical element-type tag of a native array.
//!
//! The native layer reports an array's element type as a small integer ordinal.
//! Those ordinals are part of the native contract and must not be renumbered.

use crate::error::KhivaError;
use arrow::datatypes::DataType as ArrowDataType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The element type of a native array.
///
/// Discriminants are the native ordinals: `f32 = 0` through `u16 = 11`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
#[repr(i32)]
pub enum Dtype {
    /// 32-bit float.
    F32 = 0,
    /// Complex with 32-bit float parts.
    C32 = 1,
    /// 64-bit float.
    F64 = 2,
    /// Complex with 64-bit float parts.
    C64 = 3,
    /// 8-bit boolean.
    B8 = 4,
    /// 32-bit signed integer.
    S32 = 5,
    /// 32-bit unsigned integer.
    U32 = 6,
    /// 8-bit unsigned integer.
    U8 = 7,
    /// 64-bit signed integer.
    S64 = 8,
    /// 64-bit unsigned integer.
    U64 = 9,
    /// 16-bit signed integer.
    S16 = 10,
    /// 16-bit unsigned integer.
    U16 = 11,
}

impl Dtype {
    /// Every element type, in ordinal order.
    pub const ALL: [Dtype; 12] = [
        Self::F32,
        Self::C32,
        Self::F64,
        Self::C64,
        Self::B8,
        Self::S32,
        Self::U32,
        Self::U8,
        Self::S64,
        Self::U64,
        Self::S16,
        Self::U16,
    ];

    /// Maps a native ordinal back to its element type.
    pub fn from_ordinal(ordinal: i32) -> Result<Self, KhivaError> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(KhivaError::UnknownDtype(ordinal))
    }

    /// The native ordinal of this element type.
    pub const fn ordinal(self) -> i32 {
        self as i32
    }

    /// The short lowercase name used by the native library (`"f32"`, `"c64"`, ...).
    pub const fn name(self) -> &'static str {
        match self {
            Self::F32 => "f32",
            Self::C32 => "c32",
            Self::F64 => "f64",
            Self::C64 => "c64",
            Self::B8 => "b8",
            Self::S32 => "s32",
            Self::U32 => "u32",
            Self::U8 => "u8",
            Self::S64 => "s64",
            Self::U64 => "u64",
            Self::S16 => "s16",
            Self::U16 => "u16",
        }
    }

    /// Size in bytes of one element.
    pub const fn size_of(self) -> usize {
        match self {
            Self::B8 | Self::U8 => 1,
            Self::S16 | Self::U16 => 2,
            Self::F32 | Self::S32 | Self::U32 => 4,
            Self::F64 | Self::C32 | Self::S64 | Self::U64 => 8,
            Self::C64 => 16,
        }
    }

    /// Returns `true` for the two complex element types.
    pub const fn is_complex(self) -> bool {
        matches!(self, Self::C32 | Self::C64)
    }

    /// Returns `true` for the two real floating-point element types.
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Returns `true` if the data type is a signed integer.
    pub const fn is_signed_int(self) -> bool {
        matches!(self, Self::S16 | Self::S32 | Self::S64)
    }

    /// Returns `true` if the data type is an unsigned integer.
    pub const fn is_unsigned_int(self) -> bool {
        matches!(self, Self::U8 | Self::U16 | Self::U32 | Self::U64)
    }

    pub const fn is_integer(self) -> bool {
        self.is_signed_int() || self.is_unsigned_int()
    }

    /// Converts an Arrow `DataType` into a `Dtype`.
    pub fn from_arrow_type(arrow_type: &ArrowDataType) -> Result<Self, KhivaError> {
        match arrow_type {
            ArrowDataType::Float32 => Ok(Self::F32),
            ArrowDataType::Float64 => Ok(Self::F64),
            ArrowDataType::Boolean => Ok(Self::B8),
            ArrowDataType::Int16 => Ok(Self::S16),
            ArrowDataType::Int32 => Ok(Self::S32),
            ArrowDataType::Int64 => Ok(Self::S64),
            ArrowDataType::UInt8 => Ok(Self::U8),
            ArrowDataType::UInt16 => Ok(Self::U16),
            ArrowDataType::UInt32 => Ok(Self::U32),
            ArrowDataType::UInt64 => Ok(Self::U64),
            dt => Err(KhivaError::UnsupportedType(format!(
                "Cannot convert Arrow type {:?} to an array element type",
                dt
            ))),
        }
    }

    /// Converts a `Dtype` into an Arrow `DataType`. Complex types have no Arrow
    /// primitive counterpart.
    pub fn to_arrow_type(self) -> Result<ArrowDataType, KhivaError> {
        match self {
            Self::F32 => Ok(ArrowDataType::Float32),
            Self::F64 => Ok(ArrowDataType::Float64),
            Self::B8 => Ok(ArrowDataType::Boolean),
            Self::S16 => Ok(ArrowDataType::Int16),
            Self::S32 => Ok(ArrowDataType::Int32),
            Self::S64 => Ok(ArrowDataType::Int64),
            Self::U8 => Ok(ArrowDataType::UInt8),
            Self::U16 => Ok(ArrowDataType::UInt16),
            Self::U32 => Ok(ArrowDataType::UInt32),
            Self::U64 => Ok(ArrowDataType::UInt64),
            Self::C32 | Self::C64 => Err(KhivaError::UnsupportedType(format!(
                "{} has no Arrow representation",
                self
            ))),
        }
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dtype {
    type Err = KhivaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|dtype| dtype.name() == lowered)
            .ok_or_else(|| KhivaError::UnknownDtypeName(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_follow_native_table() {
        let expected = [
            (Dtype::F32, 0),
            (Dtype::C32, 1),
            (Dtype::F64, 2),
            (Dtype::C64, 3),
            (Dtype::B8, 4),
            (Dtype::S32, 5),
            (Dtype::U32, 6),
            (Dtype::U8, 7),
            (Dtype::S64, 8),
            (Dtype::U64, 9),
            (Dtype::S16, 10),
            (Dtype::U16, 11),
        ];
        for (dtype, ordinal) in expected {
            assert_eq!(dtype.ordinal(), ordinal);
            assert_eq!(Dtype::from_ordinal(ordinal).unwrap(), dtype);
        }
    }

    #[test]
    fn unknown_ordinal_is_rejected() {
        assert!(matches!(
            Dtype::from_ordinal(12),
            Err(KhivaError::UnknownDtype(12))
        ));
        assert!(matches!(
            Dtype::from_ordinal(-1),
            Err(KhivaError::UnknownDtype(-1))
        ));
    }

    #[test]
    fn names_parse_back() {
        for dtype in Dtype::ALL {
            assert_eq!(dtype.to_string().parse::<Dtype>().unwrap(), dtype);
        }
        assert_eq!(" F64 ".parse::<Dtype>().unwrap(), Dtype::F64);
        assert!("f16".parse::<Dtype>().is_err());
    }

    #[test]
    fn arrow_mapping_skips_complex() {
        assert_eq!(
            Dtype::from_arrow_type(&ArrowDataType::UInt16).unwrap(),
            Dtype::U16
        );
        assert!(Dtype::C32.to_arrow_type().is_err());
        assert!(Dtype::from_arrow_type(&ArrowDataType::Int8).is_err());
    }
}
