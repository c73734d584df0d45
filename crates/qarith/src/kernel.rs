// Quantized element-wise ADD / SUB
//
// Per output element:
//
//   1. map the output index to one index per input (stride 0 on stretched dims)
//   2. d = q - zp                                  for each input
//   3. raw = round((dA * sA ± dB * sB) / s_out) + zp_out
//   4. clamp to the activation range, then to the storage range
//
// Step 3 runs on integers only: each scale is split into an odd mantissa
// and a power of two once per invocation, and the per-element work is two
// multiplies, a shift and one divide by the output mantissa (see
// `fixed_point`). SUB negates the second input's mantissa. Rounding is half
// away from zero and exact for any pair of scales.
//
// All validation happens while building the plan; a plan that exists can be
// run over any index range without failing.

use std::fmt;

use rayon::prelude::*;

use qarith_core::{
    Error, Layout, QuantElement, QuantizationParams, QuantizedTensor, Result, Shape,
};

use crate::config::KernelConfig;
use crate::fixed_point::{DyadicScale, Requantizer};

/// Element-wise arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
}

impl BinaryOp {
    /// Combine two real values.
    pub fn apply_real(&self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "ADD",
            BinaryOp::Sub => "SUB",
        };
        write!(f, "{}", s)
    }
}

/// Check everything that can fail before touching any element and return
/// the broadcast output shape.
///
/// Order: input descriptors, output descriptor, output storage type, rank
/// bound, broadcast resolution.
pub fn resolve_operands<T: QuantElement>(
    a: &QuantizedTensor<T>,
    b: &QuantizedTensor<T>,
    out_params: &QuantizationParams,
    config: &KernelConfig,
) -> Result<Shape> {
    a.params().validate()?;
    b.params().validate()?;
    out_params.validate()?;
    if out_params.dtype != T::DTYPE {
        return Err(Error::DTypeMismatch {
            expected: T::DTYPE,
            got: out_params.dtype,
        });
    }
    for rank in [a.rank(), b.rank()] {
        if rank > config.max_rank {
            return Err(Error::RankMismatchUnsupported {
                rank,
                max_rank: config.max_rank,
            });
        }
    }
    Shape::broadcast_shape(a.shape(), b.shape())
}

/// Integer-only parameters for one ADD/SUB invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ArithmeticPlan {
    pub op: BinaryOp,
    pub out_shape: Shape,
    pub input1_offset: i32,
    pub input2_offset: i32,
    pub output_offset: i32,
    pub requantizer: Requantizer,
    pub act_min: i32,
    pub act_max: i32,
}

impl ArithmeticPlan {
    /// Validate the operands and derive the integer parameters.
    pub fn new<T: QuantElement>(
        a: &QuantizedTensor<T>,
        b: &QuantizedTensor<T>,
        out_params: &QuantizationParams,
        op: BinaryOp,
        config: &KernelConfig,
    ) -> Result<Self> {
        let out_shape = resolve_operands(a, b, out_params, config)?;

        let requantizer = Requantizer::new(
            DyadicScale::from_f32(a.params().scale)?,
            DyadicScale::from_f32(b.params().scale)?,
            DyadicScale::from_f32(out_params.scale)?,
            op == BinaryOp::Sub,
        );
        let (act_min, act_max) = config.activation.quantized_range(out_params);

        Ok(Self {
            op,
            out_shape,
            input1_offset: -a.params().zero_point,
            input2_offset: -b.params().zero_point,
            output_offset: out_params.zero_point,
            requantizer,
            act_min,
            act_max,
        })
    }

    /// Output code for one pair of input codes, before narrowing.
    #[inline]
    pub fn compute(&self, qa: i32, qb: i32) -> i32 {
        let raw = self
            .requantizer
            .apply(qa + self.input1_offset, qb + self.input2_offset)
            .saturating_add(self.output_offset);
        raw.clamp(self.act_min, self.act_max)
    }

    /// Fill `out` with the output elements at logical positions
    /// `start..start + out.len()`.
    fn fill<T: QuantElement>(
        &self,
        out: &mut [T],
        start: usize,
        (a, la): (&[T], &Layout),
        (b, lb): (&[T], &Layout),
    ) {
        let ia = la.strided_indices_range(start, out.len());
        let ib = lb.strided_indices_range(start, out.len());
        for ((slot, i), j) in out.iter_mut().zip(ia).zip(ib) {
            *slot = T::saturate_from_i32(self.compute(a[i].to_i32(), b[j].to_i32()));
        }
    }
}

/// Element-wise `a op b` with broadcasting, producing a fresh tensor
/// quantized with `out_params`.
pub fn binary_op<T: QuantElement>(
    a: &QuantizedTensor<T>,
    b: &QuantizedTensor<T>,
    out_params: &QuantizationParams,
    op: BinaryOp,
    config: &KernelConfig,
) -> Result<QuantizedTensor<T>> {
    let plan = ArithmeticPlan::new(a, b, out_params, op, config)?;
    let n = plan.out_shape.elem_count();
    let parallel = n >= config.parallel_threshold;

    tracing::debug!(
        op = %op,
        lhs = %a.shape(),
        rhs = %b.shape(),
        out = %plan.out_shape,
        input1_mantissa = plan.requantizer.coef1,
        input1_exponent = plan.requantizer.exp1,
        input2_mantissa = plan.requantizer.coef2,
        input2_exponent = plan.requantizer.exp2,
        output_mantissa = plan.requantizer.divisor,
        activation = config.activation.code(),
        parallel,
        "quantized binary op"
    );

    if n == 0 {
        tracing::trace!(out = %plan.out_shape, "zero-sized output, no element work");
        return QuantizedTensor::new(plan.out_shape, Vec::new(), *out_params);
    }

    let la = Layout::broadcast_to(a.shape(), &plan.out_shape)?;
    let lb = Layout::broadcast_to(b.shape(), &plan.out_shape)?;
    let mut out = vec![T::saturate_from_i32(out_params.zero_point); n];

    if parallel {
        let chunk = config.chunk_size.max(1);
        out.par_chunks_mut(chunk)
            .enumerate()
            .for_each(|(ci, slice)| {
                plan.fill(slice, ci * chunk, (a.data(), &la), (b.data(), &lb));
            });
    } else {
        plan.fill(&mut out, 0, (a.data(), &la), (b.data(), &lb));
    }

    QuantizedTensor::new(plan.out_shape, out, *out_params)
}

/// `a + b` with the default configuration.
pub fn add<T: QuantElement>(
    a: &QuantizedTensor<T>,
    b: &QuantizedTensor<T>,
    out_params: &QuantizationParams,
) -> Result<QuantizedTensor<T>> {
    binary_op(a, b, out_params, BinaryOp::Add, &KernelConfig::default())
}

/// `a - b` with the default configuration.
pub fn sub<T: QuantElement>(
    a: &QuantizedTensor<T>,
    b: &QuantizedTensor<T>,
    out_params: &QuantizationParams,
) -> Result<QuantizedTensor<T>> {
    binary_op(a, b, out_params, BinaryOp::Sub, &KernelConfig::default())
}
