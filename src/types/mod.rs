//! This module defines the core, strongly-typed data representations shared by
//! every layer of the binding.
//!
//! It includes the canonical `Dtype` enum (the element-type tag carried across
//! the native boundary), the rank-4 `Dim4` shape, and `HostData`, the
//! host-side buffer that a caller hands in or gets back.

pub mod dtype;
pub mod host_data;
pub mod shape;

// Re-export the main types for easier access.
pub use dtype::Dtype;
pub use host_data::{Complex32, Complex64, Element, HostData};
pub use shape::{Dim4, MAX_RANK};
