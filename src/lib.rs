//! This file is the root of the `khiva` Rust crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring the top-level modules of the binding (`array`, `dispatch`,
//!     `native`, the per-feature `algorithms`, ...) and re-exporting the types
//!     most callers need.
//! 2.  Defining the `#[pymodule]` which acts as the entry point when the crate
//!     is built with the `python` feature and imported into Python.
//!
//! ```
//! use khiva::{Array, Context};
//!
//! let ctx = Context::host();
//! let a = Array::new(&ctx, &[1.0f32, 2.0, 3.0, 4.0], &[4]).unwrap();
//! let b = (&a + &a).unwrap();
//! assert_eq!(b.get_data::<f32>().unwrap(), vec![2.0, 4.0, 6.0, 8.0]);
//! ```

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
mod observability; // Make macros available throughout the crate

pub mod algorithms;
pub mod array;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod handle;
pub mod marshal;
pub mod native;
pub mod types;

mod traits;

#[cfg(feature = "python")]
mod ffi;

pub use algorithms::AggregationFunction;
pub use array::Array;
pub use config::{LibraryConfig, LogConfig, LogLevel};
pub use context::{Backend, BackendSet, Context};
pub use dispatch::{EntryPoint, Scalar};
pub use error::{KhivaError, NativeError, Result};
pub use handle::Handle;
pub use native::{HostLayer, NativeLayer};
pub use observability::init_logging;
pub use types::{Complex32, Complex64, Dim4, Dtype, Element, HostData};

//==================================================================================
// 2. Python Module Definition
//==================================================================================
#[cfg(feature = "python")]
use pyo3::prelude::*;

/// The `khiva` Python module.
#[cfg(feature = "python")]
#[pymodule]
fn khiva(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // --- Array class ---
    m.add_class::<ffi::python::PyArray>()?;

    // --- Library / backend functions ---
    m.add_function(wrap_pyfunction!(ffi::python::set_backend_py, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::python::get_backend_py, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::python::get_backends_py, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::python::set_device_py, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::python::get_device_id_py, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::python::get_device_count_py, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::python::backend_info_py, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::python::version_py, m)?)?;

    // --- Expose the custom error type ---
    m.add(
        "KhivaError",
        m.py().get_type_bound::<pyo3::exceptions::PyValueError>(),
    )?;

    // --- Expose version string as a module attribute ---
    m.add("__version__", VERSION)?;

    // --- Turn on logging of native calls ---
    m.add_function(wrap_pyfunction!(ffi::python::enable_verbose_logging_py, m)?)?;

    Ok(())
}
