//! Shared fixtures for the integration tests.
//!
//! `RecordingLayer` wraps a `HostLayer`, records every dispatched call, and
//! stands in for entry points the host layer lacks: it reissues their inputs
//! and fabricates outputs, where output `j` is a one-element `f64` array
//! holding `j`. It can also be told to misbehave in the ways the dispatcher
//! must survive.

#![allow(dead_code)]

use khiva::marshal::{Channel, Payload};
use khiva::{Context, Dim4, Dtype, EntryPoint, Handle, HostLayer, NativeError, NativeLayer, Scalar};
use std::sync::{Arc, Mutex};

pub type NativeResult<T> = std::result::Result<T, NativeError>;

/// A misbehaviour to inject into the next calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    None,
    /// Drop the last handle of the result set.
    Truncate,
    /// Return a distinct, freshly allocated handle in every repeated input slot.
    SplitDuplicates,
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub entry: EntryPoint,
    pub inputs: Vec<Handle>,
    pub params: Vec<Scalar>,
    pub result: Vec<Handle>,
}

pub struct RecordingLayer {
    host: Arc<HostLayer>,
    calls: Mutex<Vec<Recorded>>,
    fault: Mutex<Fault>,
    reject_deletes: Mutex<bool>,
}

impl RecordingLayer {
    pub fn new() -> Self {
        Self {
            host: Arc::new(HostLayer::new()),
            calls: Mutex::new(Vec::new()),
            fault: Mutex::new(Fault::None),
            reject_deletes: Mutex::new(false),
        }
    }

    pub fn host(&self) -> &HostLayer {
        &self.host
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> Recorded {
        self.calls().pop().expect("no call recorded")
    }

    pub fn set_fault(&self, fault: Fault) {
        *self.fault.lock().unwrap() = fault;
    }

    /// Makes every `delete_array` through this layer fail with 998.
    pub fn set_reject_deletes(&self, reject: bool) {
        *self.reject_deletes.lock().unwrap() = reject;
    }

    /// Allocates an independent copy of `handle` without retiring it.
    fn duplicate(&self, handle: Handle) -> NativeResult<Handle> {
        let dtype = Dtype::from_ordinal(self.host.array_type(handle)?)
            .map_err(|e| NativeError::new(NativeError::INTERNAL, e.to_string()))?;
        let dims = self.host.array_dims(handle)?;
        let payload = self.host.read_array(handle, dtype.channel())?;
        self.host.create_array(&payload, dims, dtype)
    }

    /// Runs an entry point the host layer does not implement.
    fn fabricate(&self, entry: &EntryPoint, inputs: &[Handle]) -> NativeResult<Vec<Handle>> {
        let mut reissued: Vec<(Handle, Handle)> = Vec::new();
        let mut result = Vec::with_capacity(entry.result_len());
        for &old in inputs {
            let fresh = match reissued.iter().find(|(from, _)| *from == old) {
                Some(&(_, to)) => to,
                None => {
                    let to = self.duplicate(old)?;
                    self.host.delete_array(old)?;
                    reissued.push((old, to));
                    to
                }
            };
            result.push(fresh);
        }
        for j in 0..entry.outputs {
            let payload = Payload::Double(vec![j as f64]);
            result.push(self.host.create_array(&payload, Dim4::new([1, 1, 1, 1]), Dtype::F64)?);
        }
        Ok(result)
    }
}

impl NativeLayer for RecordingLayer {
    fn create_array(&self, payload: &Payload, dims: Dim4, dtype: Dtype) -> NativeResult<Handle> {
        self.host.create_array(payload, dims, dtype)
    }

    fn read_array(&self, handle: Handle, channel: Channel) -> NativeResult<Payload> {
        self.host.read_array(handle, channel)
    }

    fn delete_array(&self, handle: Handle) -> NativeResult<()> {
        if *self.reject_deletes.lock().unwrap() {
            return Err(NativeError::new(NativeError::INTERNAL, "delete rejected"));
        }
        self.host.delete_array(handle)
    }

    fn array_type(&self, handle: Handle) -> NativeResult<i32> {
        self.host.array_type(handle)
    }

    fn array_dims(&self, handle: Handle) -> NativeResult<Dim4> {
        self.host.array_dims(handle)
    }

    fn display_array(&self, handle: Handle) -> NativeResult<String> {
        self.host.display_array(handle)
    }

    fn call(&self, entry: &EntryPoint, inputs: &[Handle], params: &[Scalar]) -> NativeResult<Vec<Handle>> {
        let mut result = match self.host.call(entry, inputs, params) {
            Err(e) if e.code == NativeError::NOT_SUPPORTED => self.fabricate(entry, inputs)?,
            other => other?,
        };

        match *self.fault.lock().unwrap() {
            Fault::None => {}
            Fault::Truncate => {
                if let Some(last) = result.pop() {
                    self.host.delete_array(last)?;
                }
            }
            Fault::SplitDuplicates => {
                for i in 0..inputs.len() {
                    if inputs[..i].contains(&inputs[i]) {
                        result[i] = self.duplicate(result[i])?;
                    }
                }
            }
        }

        self.calls.lock().unwrap().push(Recorded {
            entry: *entry,
            inputs: inputs.to_vec(),
            params: params.to_vec(),
            result: result.clone(),
        });
        Ok(result)
    }

    fn set_backend(&self, backend: i32) -> NativeResult<()> {
        self.host.set_backend(backend)
    }

    fn backend(&self) -> NativeResult<i32> {
        self.host.backend()
    }

    fn backends(&self) -> NativeResult<i32> {
        self.host.backends()
    }

    fn set_device(&self, device: i32) -> NativeResult<()> {
        self.host.set_device(device)
    }

    fn device_id(&self) -> NativeResult<i32> {
        self.host.device_id()
    }

    fn device_count(&self) -> NativeResult<i32> {
        self.host.device_count()
    }

    fn backend_info(&self) -> NativeResult<String> {
        self.host.backend_info()
    }

    fn version(&self) -> NativeResult<String> {
        self.host.version()
    }
}

/// A context over a host layer the test can inspect.
pub fn host_context() -> (Context, Arc<HostLayer>) {
    let host = Arc::new(HostLayer::new());
    (Context::from_shared(host.clone()), host)
}

/// A context over a recording layer.
pub fn recording_context() -> (Context, Arc<RecordingLayer>) {
    let layer = Arc::new(RecordingLayer::new());
    (Context::from_shared(layer.clone()), layer)
}

pub fn assert_close(actual: &[f64], expected: &[f64], tolerance: f64) {
    assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < tolerance, "{actual:?} vs {expected:?}");
    }
}

pub fn assert_close_f32(actual: &[f32], expected: &[f32], tolerance: f32) {
    assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < tolerance, "{actual:?} vs {expected:?}");
    }
}
