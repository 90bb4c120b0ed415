//! The operation dispatcher.
//!
//! Every array operation goes through `invoke`. The native layer is allowed to
//! retire the handles it is given, so after each call the dispatcher writes the
//! handle the native layer returned for every input back into that input's
//! wrapper, and wraps the remaining handles as new arrays.
//!
//! The wrappers' handle locks are held from the moment the input handles are
//! read until reconciliation is done, so no other thread can observe or use a
//! retired handle.

use crate::array::Array;
use crate::context::Context;
use crate::error::{KhivaError, Result};
use crate::handle::Handle;
use log::{debug, error, warn};
use std::fmt;
use std::sync::MutexGuard;

//==================================================================================
// 1. Entry Points & Parameters
//==================================================================================

/// One native operation, described by its name and handle counts.
///
/// `inputs` is N, the number of input handles (all subject to reconciliation).
/// `outputs` is M, the number of fresh result handles. In-place operations
/// have M = 0 and only mutate their input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryPoint {
    pub name: &'static str,
    pub inputs: usize,
    pub outputs: usize,
}

impl EntryPoint {
    pub const fn new(name: &'static str, inputs: usize, outputs: usize) -> Self {
        Self {
            name,
            inputs,
            outputs,
        }
    }

    pub const fn in_place(name: &'static str) -> Self {
        Self::new(name, 1, 0)
    }

    /// N + M: the exact number of handles the native layer must return.
    pub const fn result_len(&self) -> usize {
        self.inputs + self.outputs
    }

    pub const fn is_in_place(&self) -> bool {
        self.outputs == 0
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}->{})", self.name, self.inputs, self.outputs)
    }
}

/// A non-array argument passed alongside the input handles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl Scalar {
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Integer parameters widen; floating-point ones are not truncated.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Int(v) => Some(i64::from(v)),
            Self::Long(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Float(v) => Some(f64::from(v)),
            Self::Double(v) => Some(v),
            Self::Int(v) => Some(f64::from(v)),
            Self::Long(v) => Some(v as f64),
            Self::Bool(_) => None,
        }
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f32> for Scalar {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

//==================================================================================
// 2. Invocation
//==================================================================================

/// Runs `entry` on `inputs` and returns its M output arrays.
///
/// On return every input wrapper holds the handle the native layer returned
/// for it. Passing the same wrapper in several slots is allowed.
pub fn invoke(entry: &EntryPoint, inputs: &[&Array], params: &[Scalar]) -> Result<Vec<Array>> {
    if inputs.len() != entry.inputs {
        return Err(KhivaError::Arity {
            entry: entry.name,
            expected: entry.inputs,
            actual: inputs.len(),
        });
    }
    let ctx: Context = match inputs.first() {
        Some(first) => first.context().clone(),
        None => {
            return Err(KhivaError::Internal(format!(
                "entry point '{}' declared without inputs",
                entry.name
            )))
        }
    };
    if inputs.iter().any(|a| !a.context().same_as(&ctx)) {
        return Err(KhivaError::ContextMismatch);
    }

    // Lock each distinct wrapper once, in address order.
    let mut distinct: Vec<&Array> = Vec::with_capacity(inputs.len());
    for &array in inputs {
        if !distinct.iter().any(|d| std::ptr::eq(*d, array)) {
            distinct.push(array);
        }
    }
    distinct.sort_by_key(|a| *a as *const Array as usize);
    let slots: Vec<usize> = inputs
        .iter()
        .map(|&array| {
            distinct
                .iter()
                .position(|d| std::ptr::eq(*d, array))
                .unwrap_or_default()
        })
        .collect();
    let mut guards: Vec<MutexGuard<'_, Handle>> = distinct.iter().map(|a| a.lock()).collect();

    let handles: Vec<Handle> = slots.iter().map(|&slot| *guards[slot]).collect();
    if handles.iter().any(|h| h.is_null()) {
        return Err(KhivaError::Released);
    }

    log_call!(
        "event" = "invoke",
        "entry" = entry,
        "inputs" = format!("{:?}", handles),
        "params" = format!("{:?}", params),
    );
    let result = ctx.native().call(entry, &handles, params)?;

    if result.len() != entry.result_len() {
        error!(
            "entry point '{}' returned {} handles, expected {}; inputs {:?} are detached and leaked rather than freed twice",
            entry.name,
            result.len(),
            entry.result_len(),
            handles
        );
        // The sent handles may already be retired: detach every input.
        for guard in guards.iter_mut() {
            **guard = Handle::NULL;
        }
        return Err(KhivaError::MalformedResult {
            entry: entry.name,
            expected: entry.result_len(),
            actual: result.len(),
        });
    }

    // Reconcile: the first slot of each wrapper wins, later differing slots
    // hold handles nobody owns.
    let mut reconciled = vec![false; guards.len()];
    let mut surplus = Vec::new();
    for (i, &slot) in slots.iter().enumerate() {
        let returned = result[i];
        if !reconciled[slot] {
            if *guards[slot] != returned {
                debug!(
                    "{}: input {} reissued {} -> {}",
                    entry.name, i, *guards[slot], returned
                );
            }
            *guards[slot] = returned;
            reconciled[slot] = true;
        } else if returned != *guards[slot] && !surplus.contains(&returned) {
            surplus.push(returned);
        }
    }
    drop(guards);

    let outputs: Vec<Array> = result[entry.inputs..]
        .iter()
        .map(|&handle| Array::from_handle(ctx.clone(), handle))
        .collect();

    // Inputs are already reconciled, so a failed delete only leaks.
    for handle in surplus {
        debug!("{}: releasing surplus handle {}", entry.name, handle);
        if let Err(e) = ctx.native().delete_array(handle) {
            warn!("{}: failed to release surplus handle {}: {}", entry.name, handle, e);
        }
    }

    log_call!(
        "event" = "invoked",
        "entry" = entry,
        "returned" = format!("{:?}", result),
    );
    Ok(outputs)
}

/// Runs an entry point with exactly one output.
pub fn invoke_one(entry: &EntryPoint, inputs: &[&Array], params: &[Scalar]) -> Result<Array> {
    let [output] = invoke_n::<1>(entry, inputs, params)?;
    Ok(output)
}

/// Runs an entry point with exactly `M` outputs.
pub fn invoke_n<const M: usize>(
    entry: &EntryPoint,
    inputs: &[&Array],
    params: &[Scalar],
) -> Result<[Array; M]> {
    if entry.outputs != M {
        return Err(KhivaError::Internal(format!(
            "entry point '{}' declares {} outputs, caller expects {}",
            entry.name, entry.outputs, M
        )));
    }
    let outputs = invoke(entry, inputs, params)?;
    outputs.try_into().map_err(|rest: Vec<Array>| {
        KhivaError::Internal(format!(
            "entry point '{}' produced {} outputs, expected {}",
            entry.name,
            rest.len(),
            M
        ))
    })
}

/// Runs an in-place entry point: the input is mutated, nothing is returned.
pub fn invoke_in_place(entry: &EntryPoint, input: &Array, params: &[Scalar]) -> Result<()> {
    if !entry.is_in_place() {
        return Err(KhivaError::Internal(format!(
            "entry point '{}' is not in-place",
            entry.name
        )));
    }
    invoke(entry, &[input], params).map(|_| ())
}
