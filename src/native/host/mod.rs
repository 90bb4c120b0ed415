//! A pure-Rust native layer.
//!
//! `HostLayer` keeps arrays in a handle-keyed registry and runs a reference
//! subset of the entry points on the CPU. It behaves like the real library in
//! the one way that matters to the dispatcher: every call retires all of its
//! input handles and reissues each array under a fresh handle. Handles are
//! never reused, so a stale handle can never alias a newer array.

mod elementwise;
mod series;
mod structure;

use crate::context::Backend;
use crate::dispatch::{EntryPoint, Scalar};
use crate::error::NativeError;
use crate::handle::Handle;
use crate::marshal::{self, Channel, Payload};
use crate::native::{NativeLayer, NativeResult};
use crate::types::{Dim4, Dtype, HostData};
use hashbrown::HashMap;
use log::{trace, warn};
use std::fmt::Write as _;
use std::sync::{Mutex, MutexGuard, PoisonError};

//==================================================================================
// 1. Registry
//==================================================================================

/// One stored array.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HostArray {
    pub dims: Dim4,
    pub data: HostData,
}

impl HostArray {
    pub fn new(dims: Dim4, data: HostData) -> Self {
        Self { dims, data }
    }

    pub fn dtype(&self) -> Dtype {
        self.data.dtype()
    }
}

struct HostState {
    arrays: HashMap<Handle, HostArray>,
    next_id: usize,
    backend: Backend,
    device: i32,
}

impl HostState {
    fn issue(&mut self, array: HostArray) -> Handle {
        self.next_id += 1;
        let handle = Handle::from_raw(self.next_id);
        self.arrays.insert(handle, array);
        handle
    }

    fn get(&self, handle: Handle) -> NativeResult<&HostArray> {
        self.arrays.get(&handle).ok_or_else(|| invalid_handle(handle))
    }
}

fn invalid_handle(handle: Handle) -> NativeError {
    NativeError::new(
        NativeError::INVALID_ARGUMENT,
        format!("invalid array handle {}", handle),
    )
}

pub struct HostLayer {
    state: Mutex<HostState>,
}

impl HostLayer {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HostState {
                arrays: HashMap::new(),
                next_id: 0,
                backend: Backend::Cpu,
                device: 0,
            }),
        }
    }

    /// Number of arrays currently alive.
    pub fn live_count(&self) -> usize {
        self.state().arrays.len()
    }

    pub fn is_live(&self, handle: Handle) -> bool {
        self.state().arrays.contains_key(&handle)
    }

    fn state(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for HostLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for HostLayer {
    fn drop(&mut self) {
        let live = self.live_count();
        if live > 0 {
            warn!("host layer dropped with {} live arrays", live);
        }
    }
}

//==================================================================================
// 2. Entry Point Table
//==================================================================================

fn not_available(name: &str) -> NativeError {
    NativeError::new(
        NativeError::NOT_SUPPORTED,
        format!("entry point '{}' is not available in the host backend", name),
    )
}

/// Runs a kernel and returns its freshly computed outputs.
fn run(name: &str, inputs: &[&HostArray], params: &[Scalar]) -> NativeResult<Vec<HostArray>> {
    use elementwise::{ArithOp, BitOp, CmpOp};

    let first = inputs
        .first()
        .copied()
        .ok_or_else(|| NativeError::new(NativeError::INVALID_ARGUMENT, "no input arrays"))?;
    let second = || {
        inputs.get(1).copied().ok_or_else(|| {
            NativeError::new(
                NativeError::INVALID_ARGUMENT,
                format!("entry point '{}' needs two inputs", name),
            )
        })
    };

    let output = match name {
        // --- array algebra
        "add" => elementwise::arithmetic(ArithOp::Add, first, second()?)?,
        "sub" => elementwise::arithmetic(ArithOp::Sub, first, second()?)?,
        "mul" => elementwise::arithmetic(ArithOp::Mul, first, second()?)?,
        "div" => elementwise::arithmetic(ArithOp::Div, first, second()?)?,
        "rem" => elementwise::arithmetic(ArithOp::Rem, first, second()?)?,
        "pow" => elementwise::arithmetic(ArithOp::Pow, first, second()?)?,
        "lt" => elementwise::compare(CmpOp::Lt, first, second()?)?,
        "gt" => elementwise::compare(CmpOp::Gt, first, second()?)?,
        "le" => elementwise::compare(CmpOp::Le, first, second()?)?,
        "ge" => elementwise::compare(CmpOp::Ge, first, second()?)?,
        "eq" => elementwise::compare(CmpOp::Eq, first, second()?)?,
        "ne" => elementwise::compare(CmpOp::Ne, first, second()?)?,
        "bit_and" => elementwise::bitwise(BitOp::And, first, second()?)?,
        "bit_or" => elementwise::bitwise(BitOp::Or, first, second()?)?,
        "bit_xor" => elementwise::bitwise(BitOp::Xor, first, second()?)?,
        "bit_shift_l" => elementwise::shift(first, int_param(name, params, 0)?, true)?,
        "bit_shift_r" => elementwise::shift(first, int_param(name, params, 0)?, false)?,
        "not" => elementwise::not(first),
        "as" => {
            let ordinal = i32::try_from(int_param(name, params, 0)?)
                .map_err(|_| bad_param(name, 0, "a type ordinal"))?;
            let target = Dtype::from_ordinal(ordinal)
                .map_err(|e| NativeError::new(NativeError::TYPE, e.to_string()))?;
            HostArray::new(first.dims, elementwise::cast(&first.data, target))
        }
        "copy" => first.clone(),
        "transpose" => structure::transpose(first, bool_param(name, params, 0)?),
        "col" => {
            let index = int_param(name, params, 0)?;
            structure::cols(first, index, index)?
        }
        "cols" => structure::cols(first, int_param(name, params, 0)?, int_param(name, params, 1)?)?,
        "row" => {
            let index = int_param(name, params, 0)?;
            structure::rows(first, index, index)?
        }
        "rows" => structure::rows(first, int_param(name, params, 0)?, int_param(name, params, 1)?)?,
        "matmul" => structure::matmul(first, second()?)?,

        // --- normalization
        "znorm" => series::znorm(first, float_param(name, params, 0)?)?,
        "max_min_norm" => series::max_min_norm(
            first,
            float_param(name, params, 0)?,
            float_param(name, params, 1)?,
            float_param(name, params, 2)?,
        )?,
        "decimal_scaling_norm" => series::decimal_scaling_norm(first)?,
        "mean_norm" => series::mean_norm(first)?,

        // --- statistics
        "moment" => series::moment(first, int_param(name, params, 0)?)?,
        "sample_stdev" => series::sample_stdev(first)?,
        "covariance" => series::covariance(first, bool_param(name, params, 0)?)?,

        // --- features
        "abs_energy" => series::abs_energy(first)?,
        "absolute_sum_of_changes" => series::absolute_sum_of_changes(first)?,
        "count_above_mean" => series::count_relative_to_mean(first, true)?,
        "count_below_mean" => series::count_relative_to_mean(first, false)?,
        "length" => series::length(first),
        "maximum" => series::maximum(first)?,
        "mean" => series::mean(first)?,
        "median" => series::median(first)?,
        "minimum" => series::minimum(first)?,
        "standard_deviation" => series::standard_deviation(first)?,
        "sum_values" => series::sum_values(first)?,
        "variance" => series::variance(first)?,

        // --- distances
        "euclidean" => series::distance(first, series::Metric::Euclidean)?,
        "squared_euclidean" => series::distance(first, series::Metric::SquaredEuclidean)?,
        "manhattan" => series::distance(first, series::Metric::Manhattan)?,
        "hamming" => series::distance(first, series::Metric::Hamming)?,

        other => return Err(not_available(other)),
    };
    Ok(vec![output])
}

fn bad_param(name: &str, index: usize, expected: &str) -> NativeError {
    NativeError::new(
        NativeError::INVALID_ARGUMENT,
        format!(
            "entry point '{}' expects {} as parameter {}",
            name, expected, index
        ),
    )
}

fn int_param(name: &str, params: &[Scalar], index: usize) -> NativeResult<i64> {
    params
        .get(index)
        .and_then(Scalar::as_i64)
        .ok_or_else(|| bad_param(name, index, "an integer"))
}

fn float_param(name: &str, params: &[Scalar], index: usize) -> NativeResult<f64> {
    params
        .get(index)
        .and_then(Scalar::as_f64)
        .ok_or_else(|| bad_param(name, index, "a number"))
}

fn bool_param(name: &str, params: &[Scalar], index: usize) -> NativeResult<bool> {
    params
        .get(index)
        .and_then(Scalar::as_bool)
        .ok_or_else(|| bad_param(name, index, "a boolean"))
}

//==================================================================================
// 3. NativeLayer Implementation
//==================================================================================

impl NativeLayer for HostLayer {
    fn create_array(&self, payload: &Payload, dims: Dim4, dtype: Dtype) -> NativeResult<Handle> {
        let data = marshal::decode(payload.clone(), dtype)
            .map_err(|e| NativeError::new(NativeError::TYPE, e.to_string()))?;
        if data.len() as u64 != dims.elements() {
            return Err(NativeError::new(
                NativeError::SIZE,
                format!("{} elements do not fill dims {}", data.len(), dims),
            ));
        }
        let handle = self.state().issue(HostArray::new(dims, data));
        trace!("host: created {} {} {}", handle, dtype, dims);
        Ok(handle)
    }

    fn read_array(&self, handle: Handle, channel: Channel) -> NativeResult<Payload> {
        let state = self.state();
        let array = state.get(handle)?;
        if array.dtype().channel() != channel {
            return Err(NativeError::new(
                NativeError::TYPE,
                format!(
                    "array {} holds {} and cannot be read through {}",
                    handle,
                    array.dtype(),
                    channel
                ),
            ));
        }
        marshal::encode(array.data.clone())
            .map_err(|e| NativeError::new(NativeError::INTERNAL, e.to_string()))
    }

    fn delete_array(&self, handle: Handle) -> NativeResult<()> {
        match self.state().arrays.remove(&handle) {
            Some(_) => {
                trace!("host: deleted {}", handle);
                Ok(())
            }
            None => Err(invalid_handle(handle)),
        }
    }

    fn array_type(&self, handle: Handle) -> NativeResult<i32> {
        Ok(self.state().get(handle)?.dtype().ordinal())
    }

    fn array_dims(&self, handle: Handle) -> NativeResult<Dim4> {
        Ok(self.state().get(handle)?.dims)
    }

    fn display_array(&self, handle: Handle) -> NativeResult<String> {
        let state = self.state();
        let array = state.get(handle)?;
        Ok(render(handle, array))
    }

    fn call(
        &self,
        entry: &EntryPoint,
        inputs: &[Handle],
        params: &[Scalar],
    ) -> NativeResult<Vec<Handle>> {
        if inputs.len() != entry.inputs {
            return Err(NativeError::new(
                NativeError::INVALID_ARGUMENT,
                format!(
                    "entry point '{}' takes {} arrays, got {}",
                    entry.name,
                    entry.inputs,
                    inputs.len()
                ),
            ));
        }
        let mut state = self.state();

        let kernel = if entry.is_in_place() {
            entry
                .name
                .strip_suffix("_in_place")
                .ok_or_else(|| not_available(entry.name))?
        } else {
            entry.name
        };
        let arrays = inputs
            .iter()
            .map(|&h| state.get(h))
            .collect::<NativeResult<Vec<_>>>()?;
        let mut produced = run(kernel, &arrays, params)?;

        let expected = if entry.is_in_place() { 1 } else { entry.outputs };
        if produced.len() != expected {
            return Err(NativeError::new(
                NativeError::INTERNAL,
                format!(
                    "kernel '{}' produced {} arrays, expected {}",
                    kernel,
                    produced.len(),
                    expected
                ),
            ));
        }

        // Retire every distinct input handle and reissue its array.
        let mut reissued: Vec<(Handle, Handle)> = Vec::with_capacity(inputs.len());
        let mut result = Vec::with_capacity(entry.result_len());
        for &old in inputs {
            let fresh = match reissued.iter().find(|(from, _)| *from == old) {
                Some(&(_, to)) => to,
                None => {
                    let array = state.arrays.remove(&old).ok_or_else(|| invalid_handle(old))?;
                    let to = state.issue(array);
                    reissued.push((old, to));
                    to
                }
            };
            result.push(fresh);
        }

        if entry.is_in_place() {
            if let (Some(&target), Some(updated)) = (result.first(), produced.pop()) {
                state.arrays.insert(target, updated);
            }
        } else {
            for array in produced {
                result.push(state.issue(array));
            }
        }
        trace!("host: {} {:?} -> {:?}", entry, inputs, result);
        Ok(result)
    }

    fn set_backend(&self, backend: i32) -> NativeResult<()> {
        if backend != Backend::Default.ordinal() && backend != Backend::Cpu.ordinal() {
            return Err(NativeError::new(
                NativeError::NOT_SUPPORTED,
                format!("backend {} is not available in the host backend", backend),
            ));
        }
        self.state().backend = Backend::Cpu;
        Ok(())
    }

    fn backend(&self) -> NativeResult<i32> {
        Ok(self.state().backend.ordinal())
    }

    fn backends(&self) -> NativeResult<i32> {
        Ok(Backend::Cpu.ordinal())
    }

    fn set_device(&self, device: i32) -> NativeResult<()> {
        if device != 0 {
            return Err(NativeError::new(
                NativeError::DEVICE,
                format!("device {} does not exist; the host backend has one device", device),
            ));
        }
        self.state().device = device;
        Ok(())
    }

    fn device_id(&self) -> NativeResult<i32> {
        Ok(self.state().device)
    }

    fn device_count(&self) -> NativeResult<i32> {
        Ok(1)
    }

    fn backend_info(&self) -> NativeResult<String> {
        let state = self.state();
        Ok(format!(
            "khiva host backend: {} device {} ({} arrays live)",
            state.backend,
            state.device,
            state.arrays.len()
        ))
    }

    fn version(&self) -> NativeResult<String> {
        Ok(format!("{}-host", crate::VERSION))
    }
}

//==================================================================================
// 4. Display
//==================================================================================

fn render(handle: Handle, array: &HostArray) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "array {} [{}] {}", handle, array.dtype(), array.dims);
    let rows = array.dims.rows() as usize;
    let cols = array.dims.series() as usize;
    for r in 0..rows {
        let line: Vec<String> = (0..cols)
            .map(|c| element_text(&array.data, c * rows + r))
            .collect();
        let _ = writeln!(out, "    {}", line.join("  "));
    }
    out
}

fn element_text(data: &HostData, index: usize) -> String {
    match data {
        HostData::F32(v) => format!("{:10.4}", v[index]),
        HostData::F64(v) => format!("{:10.4}", v[index]),
        HostData::C32(v) => format!("({:.4},{:.4})", v[index].re, v[index].im),
        HostData::C64(v) => format!("({:.4},{:.4})", v[index].re, v[index].im),
        HostData::B8(v) => format!("{:>6}", u8::from(v[index])),
        HostData::S32(v) => format!("{:>10}", v[index]),
        HostData::U32(v) => format!("{:>10}", v[index]),
        HostData::U8(v) => format!("{:>10}", v[index]),
        HostData::S64(v) => format!("{:>10}", v[index]),
        HostData::U64(v) => format!("{:>10}", v[index]),
        HostData::S16(v) => format!("{:>10}", v[index]),
        HostData::U16(v) => format!("{:>10}", v[index]),
    }
}
