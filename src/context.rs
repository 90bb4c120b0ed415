//! The library context: one loaded native library plus its backend/device state.
//!
//! Every `Array` belongs to exactly one `Context` and every dispatched call
//! goes through that context's native layer. Cloning a context is cheap and
//! shares the same native layer.

use crate::config::LibraryConfig;
use crate::error::{KhivaError, Result};
use crate::native::{HostLayer, NativeLayer};
use crate::observability::init_logging;
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

//==================================================================================
// 1. Backends
//==================================================================================

/// A compute backend of the native library. Discriminants are the native
/// bit values.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    #[default]
    Default = 0,
    Cpu = 1,
    Cuda = 2,
    #[serde(rename = "opencl")]
    OpenCl = 4,
}

impl Backend {
    pub const ALL: [Backend; 4] = [Self::Default, Self::Cpu, Self::Cuda, Self::OpenCl];

    pub const fn ordinal(self) -> i32 {
        self as i32
    }

    /// Unknown values map to `Default`.
    pub fn from_ordinal(ordinal: i32) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|b| b.ordinal() == ordinal)
            .unwrap_or(Self::Default)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Cpu => "cpu",
            Self::Cuda => "cuda",
            Self::OpenCl => "opencl",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Backend {
    type Err = KhivaError;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|b| b.name() == lowered)
            .ok_or_else(|| KhivaError::Config(format!("unknown backend '{}'", s)))
    }
}

/// The set of backends a native library reports as available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendSet(i32);

impl BackendSet {
    pub const fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> i32 {
        self.0
    }

    pub fn contains(self, backend: Backend) -> bool {
        backend != Backend::Default && self.0 & backend.ordinal() != 0
    }

    pub fn iter(self) -> impl Iterator<Item = Backend> {
        Backend::ALL.into_iter().filter(move |b| self.contains(*b))
    }
}

//==================================================================================
// 2. Context
//==================================================================================

#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    native: Arc<dyn NativeLayer>,
}

impl Context {
    pub fn new<N: NativeLayer + 'static>(native: N) -> Self {
        Self::from_shared(Arc::new(native))
    }

    /// Wraps a native layer the caller also keeps a reference to.
    pub fn from_shared(native: Arc<dyn NativeLayer>) -> Self {
        Self {
            inner: Arc::new(ContextInner { native }),
        }
    }

    /// A context over the pure-Rust host layer.
    pub fn host() -> Self {
        Self::new(HostLayer::new())
    }

    /// Builds a context and applies `config`: logging first, then backend, then device.
    pub fn with_config(native: Arc<dyn NativeLayer>, config: &LibraryConfig) -> Result<Self> {
        config.validate()?;
        if config.log.enabled {
            init_logging(&config.log)?;
        }
        let ctx = Self::from_shared(native);
        if config.backend != Backend::Default {
            ctx.set_backend(config.backend)?;
        }
        ctx.set_device(config.device)?;
        info!(
            "khiva context ready: backend={} device={}",
            ctx.backend()?,
            ctx.device_id()?
        );
        Ok(ctx)
    }

    pub fn native(&self) -> &dyn NativeLayer {
        self.inner.native.as_ref()
    }

    /// True when both contexts share one native layer.
    pub fn same_as(&self, other: &Context) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn set_backend(&self, backend: Backend) -> Result<()> {
        self.native().set_backend(backend.ordinal())?;
        Ok(())
    }

    pub fn backend(&self) -> Result<Backend> {
        Ok(Backend::from_ordinal(self.native().backend()?))
    }

    pub fn backends(&self) -> Result<BackendSet> {
        Ok(BackendSet::from_bits(self.native().backends()?))
    }

    pub fn set_device(&self, device: i32) -> Result<()> {
        self.native().set_device(device)?;
        Ok(())
    }

    pub fn device_id(&self) -> Result<i32> {
        Ok(self.native().device_id()?)
    }

    pub fn device_count(&self) -> Result<i32> {
        Ok(self.native().device_count()?)
    }

    pub fn backend_info(&self) -> Result<String> {
        Ok(self.native().backend_info()?)
    }

    pub fn version(&self) -> Result<String> {
        Ok(self.native().version()?)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("native", &Arc::as_ptr(&self.inner.native))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_ordinals_and_fallback() {
        assert_eq!(Backend::OpenCl.ordinal(), 4);
        assert_eq!(Backend::from_ordinal(2), Backend::Cuda);
        assert_eq!(Backend::from_ordinal(3), Backend::Default);
        assert_eq!("CPU".parse::<Backend>().unwrap(), Backend::Cpu);
        assert!("metal".parse::<Backend>().is_err());
    }

    #[test]
    fn backend_set_membership() {
        let set = BackendSet::from_bits(0b101);
        assert!(set.contains(Backend::Cpu));
        assert!(!set.contains(Backend::Cuda));
        assert!(set.contains(Backend::OpenCl));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Backend::Cpu, Backend::OpenCl]);
    }

    #[test]
    fn host_context_reports_cpu() {
        let ctx = Context::host();
        ctx.set_backend(Backend::Cpu).unwrap();
        assert_eq!(ctx.backend().unwrap(), Backend::Cpu);
        assert!(ctx.backends().unwrap().contains(Backend::Cpu));
        assert_eq!(ctx.device_count().unwrap(), 1);
        assert_eq!(ctx.device_id().unwrap(), 0);
        assert!(ctx.set_backend(Backend::Cuda).is_err());
        assert!(ctx.set_device(3).is_err());
        assert!(!ctx.version().unwrap().is_empty());
        assert!(ctx.backend_info().unwrap().contains("cpu"));
    }

    #[test]
    fn clones_share_identity() {
        let a = Context::host();
        let b = a.clone();
        let c = Context::host();
        assert!(a.same_as(&b));
        assert!(!a.same_as(&c));
    }

    #[test]
    fn config_is_applied() {
        let config = LibraryConfig {
            backend: Backend::Cpu,
            ..LibraryConfig::default()
        };
        let ctx = Context::with_config(Arc::new(HostLayer::new()), &config).unwrap();
        assert_eq!(ctx.backend().unwrap(), Backend::Cpu);

        let bad = LibraryConfig {
            device: 7,
            ..LibraryConfig::default()
        };
        assert!(Context::with_config(Arc::new(HostLayer::new()), &bad).is_err());
    }
}
