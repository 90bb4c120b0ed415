//! The host-side owner of one native array.
//!
//! An `Array` holds the current handle of its native array behind a mutex.
//! The handle may change after any operation the array takes part in (the
//! dispatcher writes the reissued handle back), so it is never cached outside
//! the wrapper. Dropping the wrapper releases the native array.

use crate::context::Context;
use crate::dispatch::{invoke_one, EntryPoint, Scalar};
use crate::error::{KhivaError, Result};
use crate::handle::Handle;
use crate::marshal;
use crate::types::{Dim4, Dtype, Element, HostData};
use log::{debug, warn};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

//==================================================================================
// 0. Entry Points
//==================================================================================

pub const ADD: EntryPoint = EntryPoint::new("add", 2, 1);
pub const SUB: EntryPoint = EntryPoint::new("sub", 2, 1);
pub const MUL: EntryPoint = EntryPoint::new("mul", 2, 1);
pub const DIV: EntryPoint = EntryPoint::new("div", 2, 1);
pub const REM: EntryPoint = EntryPoint::new("rem", 2, 1);
pub const POW: EntryPoint = EntryPoint::new("pow", 2, 1);
pub const LT: EntryPoint = EntryPoint::new("lt", 2, 1);
pub const GT: EntryPoint = EntryPoint::new("gt", 2, 1);
pub const LE: EntryPoint = EntryPoint::new("le", 2, 1);
pub const GE: EntryPoint = EntryPoint::new("ge", 2, 1);
pub const EQ: EntryPoint = EntryPoint::new("eq", 2, 1);
pub const NE: EntryPoint = EntryPoint::new("ne", 2, 1);
pub const BIT_AND: EntryPoint = EntryPoint::new("bit_and", 2, 1);
pub const BIT_OR: EntryPoint = EntryPoint::new("bit_or", 2, 1);
pub const BIT_XOR: EntryPoint = EntryPoint::new("bit_xor", 2, 1);
pub const BIT_SHIFT_L: EntryPoint = EntryPoint::new("bit_shift_l", 1, 1);
pub const BIT_SHIFT_R: EntryPoint = EntryPoint::new("bit_shift_r", 1, 1);
pub const NOT: EntryPoint = EntryPoint::new("not", 1, 1);
pub const TRANSPOSE: EntryPoint = EntryPoint::new("transpose", 1, 1);
pub const COL: EntryPoint = EntryPoint::new("col", 1, 1);
pub const COLS: EntryPoint = EntryPoint::new("cols", 1, 1);
pub const ROW: EntryPoint = EntryPoint::new("row", 1, 1);
pub const ROWS: EntryPoint = EntryPoint::new("rows", 1, 1);
pub const MATMUL: EntryPoint = EntryPoint::new("matmul", 2, 1);
pub const COPY: EntryPoint = EntryPoint::new("copy", 1, 1);
pub const AS: EntryPoint = EntryPoint::new("as", 1, 1);

//==================================================================================
// 1. The Array Wrapper
//==================================================================================

pub struct Array {
    ctx: Context,
    handle: Mutex<Handle>,
}

#[allow(clippy::should_implement_trait)]
impl Array {
    /// Copies `data` into a new native array of shape `dims`.
    ///
    /// `dims` is right-padded to rank 4; the element count must match exactly.
    /// Nothing is allocated natively when validation fails.
    pub fn new<T: Element>(ctx: &Context, data: &[T], dims: &[u64]) -> Result<Self> {
        let dims = Dim4::normalize(dims)?;
        check_len(data.len(), dims)?;
        Self::allocate(ctx, HostData::from_vec(data.to_vec()), dims)
    }

    /// Like [`Array::new`], for callers whose buffer may be absent.
    pub fn from_optional<T: Element>(
        ctx: &Context,
        data: Option<&[T]>,
        dims: &[u64],
    ) -> Result<Self> {
        let data = data.ok_or(KhivaError::NullInput)?;
        Self::new(ctx, data, dims)
    }

    pub fn from_host_data(ctx: &Context, data: &HostData, dims: &[u64]) -> Result<Self> {
        let dims = Dim4::normalize(dims)?;
        check_len(data.len(), dims)?;
        Self::allocate(ctx, data.clone(), dims)
    }

    /// Copies a non-null Arrow array into a new rank-1 native array.
    pub fn from_arrow(ctx: &Context, array: &dyn arrow::array::Array) -> Result<Self> {
        let data = HostData::from_arrow(array)?;
        let len = data.len() as u64;
        Self::from_host_data(ctx, &data, &[len])
    }

    fn allocate(ctx: &Context, data: HostData, dims: Dim4) -> Result<Self> {
        let dtype = data.dtype();
        let payload = marshal::encode(data)?;
        let handle = ctx.native().create_array(&payload, dims, dtype)?;
        debug!("allocated {} array {} with dims {}", dtype, handle, dims);
        Ok(Self::from_handle(ctx.clone(), handle))
    }

    /// Takes ownership of a handle the native layer just produced.
    pub(crate) fn from_handle(ctx: Context, handle: Handle) -> Self {
        Self {
            ctx,
            handle: Mutex::new(handle),
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// The current handle. It may change after any operation on this array.
    pub fn handle(&self) -> Handle {
        *self.lock()
    }

    pub fn is_released(&self) -> bool {
        self.handle().is_null()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Handle> {
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn live(guard: &MutexGuard<'_, Handle>) -> Result<Handle> {
        let handle = **guard;
        if handle.is_null() {
            Err(KhivaError::Released)
        } else {
            Ok(handle)
        }
    }

    //--- Queries -----------------------------------------------------------------

    /// The element type, asked fresh from the native layer.
    pub fn dtype(&self) -> Result<Dtype> {
        let guard = self.lock();
        let handle = Self::live(&guard)?;
        Dtype::from_ordinal(self.ctx.native().array_type(handle)?)
    }

    pub fn dims(&self) -> Result<Dim4> {
        let guard = self.lock();
        let handle = Self::live(&guard)?;
        Ok(self.ctx.native().array_dims(handle)?)
    }

    /// Copies the elements out as `T`, which must match the current type.
    pub fn get_data<T: Element>(&self) -> Result<Vec<T>> {
        let guard = self.lock();
        let handle = Self::live(&guard)?;
        let actual = Dtype::from_ordinal(self.ctx.native().array_type(handle)?)?;
        if actual != T::DTYPE {
            return Err(KhivaError::TypeMismatch {
                requested: T::DTYPE,
                actual,
            });
        }
        let payload = self.ctx.native().read_array(handle, actual.channel())?;
        drop(guard);
        marshal::decode(payload, actual)?.into_vec()
    }

    /// Copies the elements out in whatever type the array currently holds.
    pub fn data(&self) -> Result<HostData> {
        let guard = self.lock();
        let handle = Self::live(&guard)?;
        let dtype = Dtype::from_ordinal(self.ctx.native().array_type(handle)?)?;
        let payload = self.ctx.native().read_array(handle, dtype.channel())?;
        drop(guard);
        marshal::decode(payload, dtype)
    }

    pub fn to_arrow(&self) -> Result<arrow::array::ArrayRef> {
        self.data()?.to_arrow()
    }

    /// The native library's rendering of the array.
    pub fn describe(&self) -> Result<String> {
        let guard = self.lock();
        let handle = Self::live(&guard)?;
        Ok(self.ctx.native().display_array(handle)?)
    }

    pub fn print(&self) -> Result<()> {
        println!("{}", self.describe()?);
        Ok(())
    }

    //--- Lifecycle ---------------------------------------------------------------

    /// A deep copy backed by a distinct native array.
    pub fn copy(&self) -> Result<Array> {
        invoke_one(&COPY, &[self], &[])
    }

    /// Frees the native array. Calling it again is a no-op.
    pub fn release(&mut self) -> Result<()> {
        let slot = self
            .handle
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        let handle = std::mem::replace(slot, Handle::NULL);
        if handle.is_null() {
            return Ok(());
        }
        debug!("releasing array {}", handle);
        self.ctx.native().delete_array(handle)?;
        Ok(())
    }

    //--- Arithmetic --------------------------------------------------------------

    pub fn add(&self, rhs: &Array) -> Result<Array> {
        invoke_one(&ADD, &[self, rhs], &[])
    }

    pub fn sub(&self, rhs: &Array) -> Result<Array> {
        invoke_one(&SUB, &[self, rhs], &[])
    }

    pub fn mul(&self, rhs: &Array) -> Result<Array> {
        invoke_one(&MUL, &[self, rhs], &[])
    }

    pub fn div(&self, rhs: &Array) -> Result<Array> {
        invoke_one(&DIV, &[self, rhs], &[])
    }

    pub fn rem(&self, rhs: &Array) -> Result<Array> {
        invoke_one(&REM, &[self, rhs], &[])
    }

    pub fn pow(&self, rhs: &Array) -> Result<Array> {
        invoke_one(&POW, &[self, rhs], &[])
    }

    //--- Comparison (results are b8) --------------------------------------------

    pub fn lt(&self, rhs: &Array) -> Result<Array> {
        invoke_one(&LT, &[self, rhs], &[])
    }

    pub fn gt(&self, rhs: &Array) -> Result<Array> {
        invoke_one(&GT, &[self, rhs], &[])
    }

    pub fn le(&self, rhs: &Array) -> Result<Array> {
        invoke_one(&LE, &[self, rhs], &[])
    }

    pub fn ge(&self, rhs: &Array) -> Result<Array> {
        invoke_one(&GE, &[self, rhs], &[])
    }

    pub fn eq(&self, rhs: &Array) -> Result<Array> {
        invoke_one(&EQ, &[self, rhs], &[])
    }

    pub fn ne(&self, rhs: &Array) -> Result<Array> {
        invoke_one(&NE, &[self, rhs], &[])
    }

    //--- Bitwise & logical -------------------------------------------------------

    pub fn bit_and(&self, rhs: &Array) -> Result<Array> {
        invoke_one(&BIT_AND, &[self, rhs], &[])
    }

    pub fn bit_or(&self, rhs: &Array) -> Result<Array> {
        invoke_one(&BIT_OR, &[self, rhs], &[])
    }

    pub fn bit_xor(&self, rhs: &Array) -> Result<Array> {
        invoke_one(&BIT_XOR, &[self, rhs], &[])
    }

    pub fn shl(&self, n: i32) -> Result<Array> {
        invoke_one(&BIT_SHIFT_L, &[self], &[Scalar::Int(n)])
    }

    pub fn shr(&self, n: i32) -> Result<Array> {
        invoke_one(&BIT_SHIFT_R, &[self], &[Scalar::Int(n)])
    }

    pub fn not(&self) -> Result<Array> {
        invoke_one(&NOT, &[self], &[])
    }

    //--- Structure ---------------------------------------------------------------

    /// Swaps the first two extents; `conjugate` also conjugates complex elements.
    pub fn transpose(&self, conjugate: bool) -> Result<Array> {
        invoke_one(&TRANSPOSE, &[self], &[Scalar::Bool(conjugate)])
    }

    /// Series `index` (extent 1).
    pub fn col(&self, index: i32) -> Result<Array> {
        invoke_one(&COL, &[self], &[Scalar::Int(index)])
    }

    /// Series `first..=last`.
    pub fn cols(&self, first: i32, last: i32) -> Result<Array> {
        invoke_one(&COLS, &[self], &[Scalar::Int(first), Scalar::Int(last)])
    }

    /// Time point `index` (extent 0) across every series.
    pub fn row(&self, index: i32) -> Result<Array> {
        invoke_one(&ROW, &[self], &[Scalar::Int(index)])
    }

    /// Time points `first..=last`.
    pub fn rows(&self, first: i32, last: i32) -> Result<Array> {
        invoke_one(&ROWS, &[self], &[Scalar::Int(first), Scalar::Int(last)])
    }

    pub fn matmul(&self, rhs: &Array) -> Result<Array> {
        invoke_one(&MATMUL, &[self, rhs], &[])
    }

    /// Converts to another element type.
    pub fn as_type(&self, dtype: Dtype) -> Result<Array> {
        invoke_one(&AS, &[self], &[Scalar::Int(dtype.ordinal())])
    }
}

fn check_len(len: usize, dims: Dim4) -> Result<()> {
    let actual = len as u64;
    if actual != dims.elements() {
        return Err(KhivaError::ShapeMismatch {
            expected: dims.elements(),
            actual,
        });
    }
    Ok(())
}

impl Drop for Array {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!("failed to release native array on drop: {}", e);
        }
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Array")
            .field("handle", &self.handle())
            .finish()
    }
}

//==================================================================================
// 2. Operator Sugar
//==================================================================================

macro_rules! impl_binary_operator {
    ($trait:ident, $method:ident, $inherent:ident) => {
        impl std::ops::$trait<&Array> for &Array {
            type Output = Result<Array>;

            fn $method(self, rhs: &Array) -> Result<Array> {
                Array::$inherent(self, rhs)
            }
        }
    };
}

impl_binary_operator!(Add, add, add);
impl_binary_operator!(Sub, sub, sub);
impl_binary_operator!(Mul, mul, mul);
impl_binary_operator!(Div, div, div);
impl_binary_operator!(Rem, rem, rem);
impl_binary_operator!(BitAnd, bitand, bit_and);
impl_binary_operator!(BitOr, bitor, bit_or);
impl_binary_operator!(BitXor, bitxor, bit_xor);

impl std::ops::Shl<i32> for &Array {
    type Output = Result<Array>;

    fn shl(self, n: i32) -> Result<Array> {
        Array::shl(self, n)
    }
}

impl std::ops::Shr<i32> for &Array {
    type Output = Result<Array>;

    fn shr(self, n: i32) -> Result<Array> {
        Array::shr(self, n)
    }
}

impl std::ops::Not for &Array {
    type Output = Result<Array>;

    fn not(self) -> Result<Array> {
        Array::not(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construct_and_read_back() {
        let ctx = Context::host();
        let a = Array::new(&ctx, &[1i16, -2, 3, 4, 5, 6], &[3, 2]).unwrap();
        assert_eq!(a.dtype().unwrap(), Dtype::S16);
        assert_eq!(a.dims().unwrap().as_array(), [3, 2, 1, 1]);
        assert_eq!(a.get_data::<i16>().unwrap(), vec![1, -2, 3, 4, 5, 6]);
        assert!(matches!(
            a.get_data::<i32>(),
            Err(KhivaError::TypeMismatch {
                requested: Dtype::S32,
                actual: Dtype::S16
            })
        ));
    }

    #[test]
    fn release_is_idempotent() {
        let ctx = Context::host();
        let mut a = Array::new(&ctx, &[1.0f64], &[1]).unwrap();
        a.release().unwrap();
        assert!(a.is_released());
        a.release().unwrap();
        assert!(matches!(a.dims(), Err(KhivaError::Released)));
        assert!(matches!(a.copy(), Err(KhivaError::Released)));
    }

    #[test]
    fn operators_forward_to_native_calls() {
        let ctx = Context::host();
        let a = Array::new(&ctx, &[6i32, 8], &[2]).unwrap();
        let b = Array::new(&ctx, &[2i32, 3], &[2]).unwrap();
        assert_eq!((&a - &b).unwrap().get_data::<i32>().unwrap(), vec![4, 5]);
        assert_eq!((&a % &b).unwrap().get_data::<i32>().unwrap(), vec![0, 2]);
        assert_eq!((&a << 1).unwrap().get_data::<i32>().unwrap(), vec![12, 16]);
        assert_eq!(
            (!&a.gt(&b).unwrap()).unwrap().get_data::<bool>().unwrap(),
            vec![false, false]
        );
    }
}
