//! The type-tag dispatch table between host buffers and native transport.
//!
//! Every element type maps to exactly one transport channel. Construction
//! encodes a `HostData` into the `Payload` for its channel, and extraction
//! decodes a `Payload` read from the channel of the array's current type.
//! Unsigned kinds share the channel of their signed twin and are bit-cast.

pub mod bitcast;

use crate::error::KhivaError;
use crate::types::{Complex32, Complex64, Dtype, HostData};
use std::fmt;

/// A native transport channel. Only these element layouts cross the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Float,
    FloatComplex,
    Double,
    DoubleComplex,
    Boolean,
    Byte,
    Short,
    Int,
    Long,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A buffer as it travels through a channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Float(Vec<f32>),
    FloatComplex(Vec<Complex32>),
    Double(Vec<f64>),
    DoubleComplex(Vec<Complex64>),
    Boolean(Vec<bool>),
    Byte(Vec<i8>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Long(Vec<i64>),
}

impl Payload {
    pub fn channel(&self) -> Channel {
        match self {
            Self::Float(_) => Channel::Float,
            Self::FloatComplex(_) => Channel::FloatComplex,
            Self::Double(_) => Channel::Double,
            Self::DoubleComplex(_) => Channel::DoubleComplex,
            Self::Boolean(_) => Channel::Boolean,
            Self::Byte(_) => Channel::Byte,
            Self::Short(_) => Channel::Short,
            Self::Int(_) => Channel::Int,
            Self::Long(_) => Channel::Long,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Float(v) => v.len(),
            Self::FloatComplex(v) => v.len(),
            Self::Double(v) => v.len(),
            Self::DoubleComplex(v) => v.len(),
            Self::Boolean(v) => v.len(),
            Self::Byte(v) => v.len(),
            Self::Short(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Long(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Dtype {
    /// The one channel that carries this element type.
    pub const fn channel(self) -> Channel {
        match self {
            Dtype::F32 => Channel::Float,
            Dtype::C32 => Channel::FloatComplex,
            Dtype::F64 => Channel::Double,
            Dtype::C64 => Channel::DoubleComplex,
            Dtype::B8 => Channel::Boolean,
            Dtype::U8 => Channel::Byte,
            Dtype::S16 | Dtype::U16 => Channel::Short,
            Dtype::S32 | Dtype::U32 => Channel::Int,
            Dtype::S64 | Dtype::U64 => Channel::Long,
        }
    }
}

/// Encodes a host buffer for its channel.
pub fn encode(data: HostData) -> Result<Payload, KhivaError> {
    let payload = match data {
        HostData::F32(v) => Payload::Float(v),
        HostData::C32(v) => Payload::FloatComplex(v),
        HostData::F64(v) => Payload::Double(v),
        HostData::C64(v) => Payload::DoubleComplex(v),
        HostData::B8(v) => Payload::Boolean(v),
        HostData::U8(v) => Payload::Byte(bitcast::to_signed(&v)?),
        HostData::S16(v) => Payload::Short(v),
        HostData::U16(v) => Payload::Short(bitcast::to_signed(&v)?),
        HostData::S32(v) => Payload::Int(v),
        HostData::U32(v) => Payload::Int(bitcast::to_signed(&v)?),
        HostData::S64(v) => Payload::Long(v),
        HostData::U64(v) => Payload::Long(bitcast::to_signed(&v)?),
    };
    Ok(payload)
}

/// Decodes a payload read from the channel of `dtype`.
///
/// A payload from any other channel is a protocol violation.
pub fn decode(payload: Payload, dtype: Dtype) -> Result<HostData, KhivaError> {
    let data = match (payload, dtype) {
        (Payload::Float(v), Dtype::F32) => HostData::F32(v),
        (Payload::FloatComplex(v), Dtype::C32) => HostData::C32(v),
        (Payload::Double(v), Dtype::F64) => HostData::F64(v),
        (Payload::DoubleComplex(v), Dtype::C64) => HostData::C64(v),
        (Payload::Boolean(v), Dtype::B8) => HostData::B8(v),
        (Payload::Byte(v), Dtype::U8) => HostData::U8(bitcast::to_unsigned(&v)?),
        (Payload::Short(v), Dtype::S16) => HostData::S16(v),
        (Payload::Short(v), Dtype::U16) => HostData::U16(bitcast::to_unsigned(&v)?),
        (Payload::Int(v), Dtype::S32) => HostData::S32(v),
        (Payload::Int(v), Dtype::U32) => HostData::U32(bitcast::to_unsigned(&v)?),
        (Payload::Long(v), Dtype::S64) => HostData::S64(v),
        (Payload::Long(v), Dtype::U64) => HostData::U64(bitcast::to_unsigned(&v)?),
        (payload, dtype) => {
            return Err(KhivaError::ChannelMismatch {
                dtype,
                channel: payload.channel(),
            })
        }
    };
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(dtype: Dtype) -> HostData {
        match dtype {
            Dtype::F32 => HostData::F32(vec![1.5, -2.0]),
            Dtype::C32 => HostData::C32(vec![Complex32::new(1.0, -1.0)]),
            Dtype::F64 => HostData::F64(vec![0.25]),
            Dtype::C64 => HostData::C64(vec![Complex64::new(3.0, 4.0)]),
            Dtype::B8 => HostData::B8(vec![true, false]),
            Dtype::S32 => HostData::S32(vec![i32::MIN, 0]),
            Dtype::U32 => HostData::U32(vec![u32::MAX, 1]),
            Dtype::U8 => HostData::U8(vec![0, 200]),
            Dtype::S64 => HostData::S64(vec![-5]),
            Dtype::U64 => HostData::U64(vec![u64::MAX]),
            Dtype::S16 => HostData::S16(vec![-300]),
            Dtype::U16 => HostData::U16(vec![65_000]),
        }
    }

    #[test]
    fn every_kind_uses_its_channel() {
        for dtype in Dtype::ALL {
            let payload = encode(sample(dtype)).unwrap();
            assert_eq!(payload.channel(), dtype.channel(), "{dtype}");
            assert_eq!(decode(payload, dtype).unwrap(), sample(dtype));
        }
    }

    #[test]
    fn unsigned_kinds_share_the_signed_channel() {
        assert_eq!(Dtype::U16.channel(), Dtype::S16.channel());
        assert_eq!(Dtype::U32.channel(), Channel::Int);
        assert_eq!(Dtype::U64.channel(), Channel::Long);
        assert_eq!(Dtype::U8.channel(), Channel::Byte);
    }

    #[test]
    fn wrong_channel_is_rejected() {
        let result = decode(Payload::Int(vec![1]), Dtype::F32);
        assert!(matches!(
            result,
            Err(KhivaError::ChannelMismatch {
                dtype: Dtype::F32,
                channel: Channel::Int
            })
        ));
    }
}
