//! The native library seam.
//!
//! Everything the binding needs from the native library is expressed by the
//! `NativeLayer` trait: array storage, the generic operation entry point, and
//! the library-level backend/device queries. A linked native library
//! implements it over its C ABI; `HostLayer` implements it in pure Rust.
//!
//! The one rule every implementation must honour: `call` may retire any of its
//! input handles and returns, in order, one handle per input (the input's
//! current handle, possibly fresh) followed by the operation's outputs.

pub mod host;

use crate::dispatch::{EntryPoint, Scalar};
use crate::error::NativeError;
use crate::handle::Handle;
use crate::marshal::{Channel, Payload};
use crate::types::{Dim4, Dtype};

pub use host::HostLayer;

pub type NativeResult<T> = Result<T, NativeError>;

pub trait NativeLayer: Send + Sync {
    //--- Array storage -----------------------------------------------------------

    /// Allocates a native array from an encoded buffer.
    fn create_array(&self, payload: &Payload, dims: Dim4, dtype: Dtype) -> NativeResult<Handle>;

    /// Reads the array's elements through `channel`.
    fn read_array(&self, handle: Handle, channel: Channel) -> NativeResult<Payload>;

    fn delete_array(&self, handle: Handle) -> NativeResult<()>;

    /// The element-type ordinal of the array.
    fn array_type(&self, handle: Handle) -> NativeResult<i32>;

    fn array_dims(&self, handle: Handle) -> NativeResult<Dim4>;

    /// A human-readable rendering of the array's contents.
    fn display_array(&self, handle: Handle) -> NativeResult<String>;

    //--- Operations --------------------------------------------------------------

    /// Runs one entry point. Returns `entry.inputs + entry.outputs` handles.
    fn call(
        &self,
        entry: &EntryPoint,
        inputs: &[Handle],
        params: &[Scalar],
    ) -> NativeResult<Vec<Handle>>;

    //--- Library state -----------------------------------------------------------

    fn set_backend(&self, backend: i32) -> NativeResult<()>;

    fn backend(&self) -> NativeResult<i32>;

    /// Bitmask of the available backends.
    fn backends(&self) -> NativeResult<i32>;

    fn set_device(&self, device: i32) -> NativeResult<()>;

    fn device_id(&self) -> NativeResult<i32>;

    fn device_count(&self) -> NativeResult<i32>;

    fn backend_info(&self) -> NativeResult<String>;

    fn version(&self) -> NativeResult<String>;
}
