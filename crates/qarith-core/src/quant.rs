// QuantizationParams — how a stored integer code maps to a real number
//
//   real = (code - zero_point) * scale
//   code = round(real / scale) + zero_point     (then saturated to storage)
//
// Rounding is half away from zero. A scale of exactly 0 marks a
// non-quantized auxiliary operand (for example the fused-activation scalar)
// and never validates for arithmetic.

use crate::dtype::QuantDType;
use crate::error::{Error, Result};

/// Immutable per-tensor quantization descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantizationParams {
    /// Real-value step between adjacent codes. Must be finite and > 0.
    pub scale: f32,
    /// Code that represents real 0.0. Must fit the storage type.
    pub zero_point: i32,
    /// Storage type the codes live in.
    pub dtype: QuantDType,
}

impl QuantizationParams {
    /// Create a signed 8-bit descriptor (the common case).
    pub fn new(scale: f32, zero_point: i32) -> Self {
        Self {
            scale,
            zero_point,
            dtype: QuantDType::QInt8,
        }
    }

    /// Switch the storage type.
    pub fn with_dtype(mut self, dtype: QuantDType) -> Self {
        self.dtype = dtype;
        self
    }

    /// Structural checks: positive finite scale, zero-point inside the
    /// storage range.
    pub fn validate(&self) -> Result<()> {
        if !(self.scale > 0.0 && self.scale.is_finite()) {
            return Err(Error::InvalidScale { scale: self.scale });
        }
        if !self.dtype.contains(self.zero_point) {
            return Err(Error::ZeroPointOutOfRange {
                zero_point: self.zero_point,
                dtype: self.dtype,
                min: self.dtype.qmin(),
                max: self.dtype.qmax(),
            });
        }
        Ok(())
    }

    /// Real value represented by `code`.
    pub fn dequantize(&self, code: i32) -> f64 {
        (code - self.zero_point) as f64 * self.scale as f64
    }

    /// Nearest code for `real`, rounded half away from zero. Not saturated.
    pub fn quantize(&self, real: f64) -> i32 {
        (real / self.scale as f64).round() as i32 + self.zero_point
    }
}
