//! # qarith-core
//!
//! Data model for quantized element-wise arithmetic.
//!
//! This crate provides:
//! - [`QuantizationParams`] — scale / zero-point descriptor with validation
//! - [`QuantizedTensor`] — immutable codes + shape + descriptor
//! - [`Shape`] / [`Layout`] — shapes, broadcasting and strided index walks
//! - [`QuantDType`] / [`QuantElement`] — 8-bit signed and unsigned storage
//! - [`Error`] — the single error type shared by every qarith crate

pub mod dtype;
pub mod error;
pub mod layout;
pub mod quant;
pub mod shape;
pub mod tensor;

pub use dtype::{QuantDType, QuantElement};
pub use error::{Error, Result};
pub use layout::Layout;
pub use quant::QuantizationParams;
pub use shape::Shape;
pub use tensor::QuantizedTensor;
