// Real-valued reference for quantized ADD/SUB
//
// Evaluates the arithmetic literally in f64: dequantize both operands,
// combine, divide by the output scale, round half away from zero, add the
// output zero-point, clamp to the activation range and saturate. Used to
// cross-check the integer kernel and to produce expected outputs for
// generated fixtures.
//
// Each dequantized value is exact in f64 and the divide is correctly
// rounded, so this agrees with the kernel's exact integer result unless the
// two products are too far apart to add exactly (input scales more than
// about 2^20 apart) or the true quotient lies within f64 rounding of a half
// step. Power-of-two scales are exact throughout.

use qarith_core::{Layout, QuantElement, QuantizationParams, QuantizedTensor, Result};

use crate::config::KernelConfig;
use crate::kernel::{resolve_operands, BinaryOp};

/// Reference evaluation of `a op b`. Validation matches `binary_op`.
pub fn reference_binary_op<T: QuantElement>(
    a: &QuantizedTensor<T>,
    b: &QuantizedTensor<T>,
    out_params: &QuantizationParams,
    op: BinaryOp,
    config: &KernelConfig,
) -> Result<QuantizedTensor<T>> {
    let out_shape = resolve_operands(a, b, out_params, config)?;
    let (act_min, act_max) = config.activation.quantized_range(out_params);

    let real_a = a.dequantize();
    let real_b = b.dequantize();
    let la = Layout::broadcast_to(a.shape(), &out_shape)?;
    let lb = Layout::broadcast_to(b.shape(), &out_shape)?;

    let data: Vec<T> = la
        .strided_indices()
        .zip(lb.strided_indices())
        .map(|(i, j)| {
            let real = op.apply_real(real_a[i], real_b[j]);
            let q = out_params.quantize(real).clamp(act_min, act_max);
            T::saturate_from_i32(q)
        })
        .collect();

    QuantizedTensor::new(out_shape, data, *out_params)
}
