// In: src/ffi/python.rs

use pyo3::basic::CompareOp;
use pyo3::prelude::*;
use pyo3::types::PyType;
use std::path::PathBuf;
use std::sync::OnceLock;

use crate::array::Array;
use crate::config::LogConfig;
use crate::context::{Backend, Context};
use crate::error::KhivaError;
use crate::observability::init_logging;
use crate::types::{Dtype, HostData};

/// The context every Python-side array is created in.
fn default_context() -> &'static Context {
    static CONTEXT: OnceLock<Context> = OnceLock::new();
    CONTEXT.get_or_init(Context::host)
}

//==================================================================================
// I. Host Data Conversion
//==================================================================================

fn host_data_from_py(data: &Bound<'_, PyAny>, dtype: Dtype) -> PyResult<HostData> {
    Ok(match dtype {
        Dtype::F32 => HostData::F32(data.extract()?),
        Dtype::C32 => HostData::C32(data.extract()?),
        Dtype::F64 => HostData::F64(data.extract()?),
        Dtype::C64 => HostData::C64(data.extract()?),
        Dtype::B8 => HostData::B8(data.extract()?),
        Dtype::S32 => HostData::S32(data.extract()?),
        Dtype::U32 => HostData::U32(data.extract()?),
        Dtype::U8 => HostData::U8(data.extract()?),
        Dtype::S64 => HostData::S64(data.extract()?),
        Dtype::U64 => HostData::U64(data.extract()?),
        Dtype::S16 => HostData::S16(data.extract()?),
        Dtype::U16 => HostData::U16(data.extract()?),
    })
}

fn host_data_to_py(py: Python<'_>, data: HostData) -> PyObject {
    match data {
        HostData::F32(v) => v.into_py(py),
        HostData::C32(v) => v.into_py(py),
        HostData::F64(v) => v.into_py(py),
        HostData::C64(v) => v.into_py(py),
        HostData::B8(v) => v.into_py(py),
        HostData::S32(v) => v.into_py(py),
        HostData::U32(v) => v.into_py(py),
        HostData::U8(v) => v.into_py(py),
        HostData::S64(v) => v.into_py(py),
        HostData::U64(v) => v.into_py(py),
        HostData::S16(v) => v.into_py(py),
        HostData::U16(v) => v.into_py(py),
    }
}

//==================================================================================
// II. The Array Class
//==================================================================================

#[pyclass(name = "Array", module = "khiva")]
pub struct PyArray {
    inner: Option<Array>,
}

impl PyArray {
    fn array(&self) -> PyResult<&Array> {
        self.inner.as_ref().ok_or_else(|| KhivaError::Released.into())
    }

    fn wrap(array: Array) -> Self {
        Self { inner: Some(array) }
    }
}

#[pymethods]
impl PyArray {
    /// Creates a native array from a flat, column-major list of values.
    ///
    /// `dims` holds up to four extents; `dtype` is one of `f32`, `c32`, `f64`,
    /// `c64`, `b8`, `s32`, `u32`, `u8`, `s64`, `u64`, `s16`, `u16`.
    #[new]
    #[pyo3(signature = (data, dims, dtype = "f64"))]
    fn new(data: Option<&Bound<'_, PyAny>>, dims: Vec<u64>, dtype: &str) -> PyResult<Self> {
        let dtype: Dtype = dtype.parse()?;
        let data = data.ok_or(KhivaError::NullInput)?;
        let host = host_data_from_py(data, dtype)?;
        let array = Array::from_host_data(default_context(), &host, &dims)?;
        Ok(Self::wrap(array))
    }

    /// The elements as a flat list in column-major order.
    fn get_data(&self, py: Python<'_>) -> PyResult<PyObject> {
        let data = self.array()?.data()?;
        Ok(host_data_to_py(py, data))
    }

    fn dims(&self) -> PyResult<Vec<u64>> {
        Ok(self.array()?.dims()?.as_array().to_vec())
    }

    fn dtype(&self) -> PyResult<String> {
        Ok(self.array()?.dtype()?.to_string())
    }

    fn copy(&self) -> PyResult<Self> {
        Ok(Self::wrap(self.array()?.copy()?))
    }

    fn astype(&self, dtype: &str) -> PyResult<Self> {
        let dtype: Dtype = dtype.parse()?;
        Ok(Self::wrap(self.array()?.as_type(dtype)?))
    }

    #[pyo3(signature = (conjugate = false))]
    fn transpose(&self, conjugate: bool) -> PyResult<Self> {
        Ok(Self::wrap(self.array()?.transpose(conjugate)?))
    }

    fn pow(&self, other: PyRef<'_, Self>) -> PyResult<Self> {
        Ok(Self::wrap(self.array()?.pow(other.array()?)?))
    }

    /// Frees the native array. Further use raises `ValueError`.
    fn release(&mut self) -> PyResult<()> {
        if let Some(mut array) = self.inner.take() {
            array.release()?;
        }
        Ok(())
    }

    fn __enter__(slf: Py<Self>) -> Py<Self> {
        slf
    }

    #[pyo3(signature = (_exc_type = None, _exc_value = None, _traceback = None))]
    fn __exit__(
        &mut self,
        _exc_type: Option<&Bound<'_, PyType>>,
        _exc_value: Option<&Bound<'_, PyAny>>,
        _traceback: Option<&Bound<'_, PyAny>>,
    ) -> PyResult<bool> {
        self.release()?;
        Ok(false)
    }

    fn __add__(&self, other: PyRef<'_, Self>) -> PyResult<Self> {
        Ok(Self::wrap(self.array()?.add(other.array()?)?))
    }

    fn __sub__(&self, other: PyRef<'_, Self>) -> PyResult<Self> {
        Ok(Self::wrap(self.array()?.sub(other.array()?)?))
    }

    fn __mul__(&self, other: PyRef<'_, Self>) -> PyResult<Self> {
        Ok(Self::wrap(self.array()?.mul(other.array()?)?))
    }

    fn __truediv__(&self, other: PyRef<'_, Self>) -> PyResult<Self> {
        Ok(Self::wrap(self.array()?.div(other.array()?)?))
    }

    fn __mod__(&self, other: PyRef<'_, Self>) -> PyResult<Self> {
        Ok(Self::wrap(self.array()?.rem(other.array()?)?))
    }

    fn __matmul__(&self, other: PyRef<'_, Self>) -> PyResult<Self> {
        Ok(Self::wrap(self.array()?.matmul(other.array()?)?))
    }

    fn __and__(&self, other: PyRef<'_, Self>) -> PyResult<Self> {
        Ok(Self::wrap(self.array()?.bit_and(other.array()?)?))
    }

    fn __or__(&self, other: PyRef<'_, Self>) -> PyResult<Self> {
        Ok(Self::wrap(self.array()?.bit_or(other.array()?)?))
    }

    fn __xor__(&self, other: PyRef<'_, Self>) -> PyResult<Self> {
        Ok(Self::wrap(self.array()?.bit_xor(other.array()?)?))
    }

    fn __lshift__(&self, n: i32) -> PyResult<Self> {
        Ok(Self::wrap(self.array()?.shl(n)?))
    }

    fn __rshift__(&self, n: i32) -> PyResult<Self> {
        Ok(Self::wrap(self.array()?.shr(n)?))
    }

    fn __invert__(&self) -> PyResult<Self> {
        Ok(Self::wrap(self.array()?.not()?))
    }

    fn __richcmp__(&self, other: PyRef<'_, Self>, op: CompareOp) -> PyResult<Self> {
        let (lhs, rhs) = (self.array()?, other.array()?);
        let result = match op {
            CompareOp::Lt => lhs.lt(rhs),
            CompareOp::Le => lhs.le(rhs),
            CompareOp::Eq => lhs.eq(rhs),
            CompareOp::Ne => lhs.ne(rhs),
            CompareOp::Gt => lhs.gt(rhs),
            CompareOp::Ge => lhs.ge(rhs),
        }?;
        Ok(Self::wrap(result))
    }

    fn __repr__(&self) -> PyResult<String> {
        match &self.inner {
            Some(array) => Ok(array.describe()?),
            None => Ok("Array(<released>)".to_string()),
        }
    }
}

//==================================================================================
// III. Library Functions
//==================================================================================

#[pyfunction]
#[pyo3(name = "set_backend")]
pub fn set_backend_py(backend: &str) -> PyResult<()> {
    let backend: Backend = backend.parse()?;
    default_context().set_backend(backend)?;
    Ok(())
}

#[pyfunction]
#[pyo3(name = "get_backend")]
pub fn get_backend_py() -> PyResult<String> {
    Ok(default_context().backend()?.to_string())
}

/// Names of every backend the native library was built with.
#[pyfunction]
#[pyo3(name = "get_backends")]
pub fn get_backends_py() -> PyResult<Vec<String>> {
    Ok(default_context()
        .backends()?
        .iter()
        .map(|b| b.to_string())
        .collect())
}

#[pyfunction]
#[pyo3(name = "set_device")]
pub fn set_device_py(device: i32) -> PyResult<()> {
    default_context().set_device(device)?;
    Ok(())
}

#[pyfunction]
#[pyo3(name = "get_device_id")]
pub fn get_device_id_py() -> PyResult<i32> {
    Ok(default_context().device_id()?)
}

#[pyfunction]
#[pyo3(name = "get_device_count")]
pub fn get_device_count_py() -> PyResult<i32> {
    Ok(default_context().device_count()?)
}

#[pyfunction]
#[pyo3(name = "backend_info")]
pub fn backend_info_py() -> PyResult<String> {
    Ok(default_context().backend_info()?)
}

#[pyfunction]
#[pyo3(name = "version")]
pub fn version_py() -> PyResult<String> {
    Ok(default_context().version()?)
}

/// Turns on trace-level logging of native calls, to stderr or appended to
/// `log_file`.
#[pyfunction]
#[pyo3(name = "enable_verbose_logging", signature = (log_file = None))]
pub fn enable_verbose_logging_py(log_file: Option<String>) -> PyResult<()> {
    init_logging(&LogConfig::verbose(log_file.map(PathBuf::from)))?;
    Ok(())
}
