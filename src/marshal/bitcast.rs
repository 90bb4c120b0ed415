//! Bit reinterpretation between same-width integer types.
//!
//! The native channels carry signed integers only, so unsigned buffers travel
//! as their signed twin and are reinterpreted on the way back. The bit
//! pattern is preserved exactly: `u32::MAX` crosses as `-1i32`.

use crate::error::KhivaError;
use crate::traits::{HasSigned, HasUnsigned};
use bytemuck::Pod;

//==================================================================================
// 1. Private Core Logic
//==================================================================================

/// Internal function to perform a safe bit-cast.
fn bitcast_internal<I, O>(input: &[I]) -> Result<Vec<O>, KhivaError>
where
    I: Pod,
    O: Pod,
{
    if input.is_empty() {
        return Ok(Vec::new());
    }

    if std::mem::size_of::<I>() != std::mem::size_of::<O>() {
        return Err(KhivaError::Internal(format!(
            "Bit-cast size mismatch: Cannot cast from {} ({} bytes) to {} ({} bytes)",
            std::any::type_name::<I>(),
            std::mem::size_of::<I>(),
            std::any::type_name::<O>(),
            std::mem::size_of::<O>()
        )));
    }

    let output: &[O] = bytemuck::try_cast_slice(input).map_err(|e| {
        KhivaError::Internal(format!(
            "Failed to reinterpret {} as {}: {}",
            std::any::type_name::<I>(),
            std::any::type_name::<O>(),
            e
        ))
    })?;
    Ok(output.to_vec())
}

//==================================================================================
// 2. Public API
//==================================================================================

/// Reinterprets an unsigned buffer as its signed twin for transport.
pub fn to_signed<U>(input: &[U]) -> Result<Vec<U::Signed>, KhivaError>
where
    U: HasSigned + Pod,
{
    bitcast_internal::<U, U::Signed>(input)
}

/// Reinterprets a transported signed buffer back as its unsigned twin.
pub fn to_unsigned<S>(input: &[S]) -> Result<Vec<S::Unsigned>, KhivaError>
where
    S: HasUnsigned + Pod,
{
    bitcast_internal::<S, S::Unsigned>(input)
}

//==================================================================================
// 3. Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsigned_extremes_keep_their_bits() {
        let original: Vec<u32> = vec![0, 1, u32::MAX, 1 << 31];
        let signed = to_signed(&original).unwrap();
        assert_eq!(signed, vec![0, 1, -1, i32::MIN]);
        assert_eq!(to_unsigned(&signed).unwrap(), original);

        let bytes: Vec<u8> = vec![255, 128, 7];
        assert_eq!(to_signed(&bytes).unwrap(), vec![-1i8, -128, 7]);

        let wide: Vec<u64> = vec![u64::MAX];
        assert_eq!(to_signed(&wide).unwrap(), vec![-1i64]);
    }

    #[test]
    fn test_bitcast_size_mismatch_fails() {
        let result = bitcast_internal::<u8, u32>(&[1, 2, 3, 4]);
        assert!(matches!(result, Err(KhivaError::Internal(_))));
    }

    #[test]
    fn test_empty_input() {
        let empty: Vec<u16> = Vec::new();
        assert!(to_signed(&empty).unwrap().is_empty());
    }
}
