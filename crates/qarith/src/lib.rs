//! # qarith
//!
//! Bit-exact element-wise arithmetic on 8-bit asymmetric quantized tensors.
//!
//! This is the facade crate: it re-exports the data model from
//! `qarith-core` and adds the kernels.
//!
//! ## Usage
//!
//! ```rust
//! use qarith::prelude::*;
//!
//! let params = QuantizationParams::new(1.0, -128);
//! let a = QuantizedTensor::<i8>::new((1, 2), vec![-28, 72], params)?;
//! let b = QuantizedTensor::<i8>::new((2, 2), vec![-127, -126, -125, -124], params)?;
//! let out = sub(&a, &b, &params)?;
//! assert_eq!(out.data(), &[-29, 70, -31, 68]);
//! # Ok::<(), qarith::Error>(())
//! ```
//!
//! ## Architecture
//!
//! | Crate | Purpose |
//! |-------|----------|
//! | `qarith-core` | QuantizationParams, QuantizedTensor, Shape, Layout, Error |
//! | `qarith` | ADD/SUB kernel, integer requantization, activations, fixtures |
//!
//! ## Modules
//!
//! - [`kernel`] — broadcasting ADD/SUB with exact integer requantization
//! - [`fixed_point`] — exact scale decomposition and rounding division
//! - [`activation`] — fused RELU-family clamps
//! - [`reference`] — real-valued oracle
//! - [`fixtures`] / [`generator`] — named test vectors and their generator

/// Re-export core types.
pub use qarith_core::{
    Error, Layout, QuantDType, QuantElement, QuantizationParams, QuantizedTensor, Result, Shape,
};

/// Fused activation codes and their quantized clamp ranges.
pub mod activation;

/// Kernel and generator configuration.
pub mod config;

/// Named fixtures, variants and the fixture runner.
pub mod fixtures;

/// Exact integer requantization.
pub mod fixed_point;

/// Conformance fixture generator.
pub mod generator;

/// Quantized element-wise ADD / SUB.
pub mod kernel;

/// Real-valued reference evaluation.
pub mod reference;

/// Prelude: import this for the most common types.
pub mod prelude {
    pub use crate::activation::FusedActivation;
    pub use crate::config::{GeneratorConfig, KernelConfig};
    pub use crate::fixtures::{Fixture, FixtureOutcome, FixtureSet, FixtureVariant};
    pub use crate::generator::{ConformanceGenerator, EquivalenceClass};
    pub use crate::kernel::{add, binary_op, sub, ArithmeticPlan, BinaryOp};
    pub use crate::reference::reference_binary_op;
    pub use crate::{
        Error, Layout, QuantDType, QuantElement, QuantizationParams, QuantizedTensor, Result,
        Shape,
    };
}
