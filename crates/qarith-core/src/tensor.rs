use crate::dtype::QuantElement;
use crate::error::{Error, Result};
use crate::quant::QuantizationParams;
use crate::shape::Shape;

// QuantizedTensor — flat row-major codes + shape + descriptor
//
// Tensors are immutable values: kernels read their inputs and allocate a
// fresh output. Construction is the single place where the descriptor and
// the data length are checked, so every QuantizedTensor in circulation is
// well-formed.

/// A quantized tensor: integer codes with one per-tensor descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizedTensor<T: QuantElement> {
    shape: Shape,
    data: Vec<T>,
    params: QuantizationParams,
}

impl<T: QuantElement> QuantizedTensor<T> {
    /// Build a tensor, validating the descriptor and the element count.
    pub fn new(
        shape: impl Into<Shape>,
        data: Vec<T>,
        params: QuantizationParams,
    ) -> Result<Self> {
        let shape = shape.into();
        params.validate()?;
        if params.dtype != T::DTYPE {
            return Err(Error::DTypeMismatch {
                expected: T::DTYPE,
                got: params.dtype,
            });
        }
        let expected = shape.elem_count();
        if data.len() != expected {
            return Err(Error::ElementCountMismatch {
                shape,
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            shape,
            data,
            params,
        })
    }

    /// A tensor whose every code is the zero-point, i.e. real 0.0 everywhere.
    pub fn filled_with_zero(shape: impl Into<Shape>, params: QuantizationParams) -> Result<Self> {
        let shape = shape.into();
        params.validate()?;
        let zero = T::saturate_from_i32(params.zero_point);
        let data = vec![zero; shape.elem_count()];
        Self::new(shape, data, params)
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn params(&self) -> &QuantizationParams {
        &self.params
    }

    /// Total number of elements.
    pub fn elem_count(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Real values represented by the codes.
    pub fn dequantize(&self) -> Vec<f64> {
        self.data
            .iter()
            .map(|&q| self.params.dequantize(q.to_i32()))
            .collect()
    }

    /// The same tensor with every real value negated, under the same
    /// descriptor: code `2 * zp - q`. `None` if any negated code falls
    /// outside the storage range.
    pub fn negated(&self) -> Option<Self> {
        let zp = self.params.zero_point;
        let mut data = Vec::with_capacity(self.data.len());
        for &q in &self.data {
            let n = 2 * zp - q.to_i32();
            if n < T::qmin() || n > T::qmax() {
                return None;
            }
            data.push(T::saturate_from_i32(n));
        }
        Some(Self {
            shape: self.shape.clone(),
            data,
            params: self.params,
        })
    }
}
