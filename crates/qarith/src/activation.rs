// Fused activation for quantized ADD/SUB
//
// The arithmetic operators carry a scalar activation code next to their two
// tensor inputs. It is applied as a clamp in the output's quantized domain,
// so it costs nothing beyond the saturation the kernel does anyway.
//
//   0 NONE  → [qmin, qmax]
//   1 RELU  → [zp, qmax]
//   2 RELU1 → [zp + q(-1), zp + q(1)]
//   3 RELU6 → [zp, zp + q(6)]
//
// with q(x) = round(x / scale), every bound intersected with the storage
// range.

use qarith_core::{Error, QuantizationParams, Result};

/// Activation fused into an arithmetic op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FusedActivation {
    #[default]
    None,
    Relu,
    Relu1,
    Relu6,
}

impl FusedActivation {
    /// Decode the scalar operand code.
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            0 => Ok(FusedActivation::None),
            1 => Ok(FusedActivation::Relu),
            2 => Ok(FusedActivation::Relu1),
            3 => Ok(FusedActivation::Relu6),
            other => Err(Error::UnsupportedActivation(other)),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            FusedActivation::None => 0,
            FusedActivation::Relu => 1,
            FusedActivation::Relu1 => 2,
            FusedActivation::Relu6 => 3,
        }
    }

    /// Inclusive clamp range for the output codes.
    pub fn quantized_range(&self, out: &QuantizationParams) -> (i32, i32) {
        let qmin = out.dtype.qmin();
        let qmax = out.dtype.qmax();
        let zp = out.zero_point;
        let (lo, hi) = match self {
            FusedActivation::None => (qmin, qmax),
            FusedActivation::Relu => (zp, qmax),
            FusedActivation::Relu1 => (out.quantize(-1.0), out.quantize(1.0)),
            FusedActivation::Relu6 => (zp, out.quantize(6.0)),
        };
        (lo.max(qmin), hi.min(qmax))
    }
}
