use crate::shape::Shape;
use crate::{Error, Result};

// Layout — how an operand is read at the output shape
//
// Operands are always stored contiguously. Broadcasting is a layout: the
// operand is viewed at the output shape with stride 0 on every stretched
// or padded dim, so a row-major walk over the output reads the matching
// operand element without materializing the stretched copy.
//
//   [1, 2] read at [2, 2]  → strides [0, 1] → indices 0, 1, 0, 1
//   [3, 1] read at [3, 2]  → strides [1, 0] → indices 0, 0, 1, 1, 2, 2

/// An operand viewed at a (possibly larger) logical shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    shape: Shape,
    strides: Vec<usize>,
}

impl Layout {
    /// Row-major layout of a contiguous operand.
    pub fn contiguous(shape: Shape) -> Self {
        let strides = shape.stride_contiguous();
        Layout { shape, strides }
    }

    /// View a contiguous operand of shape `src` at `target`.
    ///
    /// `target` must be what `src` broadcasts to, i.e. at least the same
    /// rank with every aligned dim equal or stretched from 1.
    pub fn broadcast_to(src: &Shape, target: &Shape) -> Result<Self> {
        if Shape::broadcast_shape(src, target).as_ref() != Ok(target) {
            return Err(Error::IncompatibleShapes {
                lhs: src.clone(),
                rhs: target.clone(),
            });
        }
        let lead = target.rank() - src.rank();
        let mut strides = vec![0; target.rank()];
        for (i, (&d, s)) in src
            .dims()
            .iter()
            .zip(src.stride_contiguous())
            .enumerate()
        {
            if d == target.dims()[lead + i] {
                strides[lead + i] = s;
            }
        }
        Ok(Layout {
            shape: target.clone(),
            strides,
        })
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    pub fn elem_count(&self) -> usize {
        self.shape.elem_count()
    }

    /// Storage index of every logical position, in row-major order.
    pub fn strided_indices(&self) -> StridedIter {
        StridedIter::new(self, 0, self.elem_count())
    }

    /// Storage indices of logical positions `start..start + len`, clipped
    /// to the shape. Workers walking disjoint ranges together cover the
    /// same sequence as `strided_indices`.
    pub fn strided_indices_range(&self, start: usize, len: usize) -> StridedIter {
        let end = start.saturating_add(len).min(self.elem_count());
        let start = start.min(end);
        StridedIter::new(self, start, end - start)
    }
}

/// Row-major walk over a Layout yielding storage indices.
///
/// Keeps the multi-index and the current storage index side by side, so each
/// step is one add (or one carry per wrapped dim) instead of a dot product.
pub struct StridedIter {
    index: Vec<usize>,
    dims: Vec<usize>,
    strides: Vec<usize>,
    flat: usize,
    remaining: usize,
}

impl StridedIter {
    fn new(layout: &Layout, start: usize, len: usize) -> Self {
        let dims = layout.dims().to_vec();
        let strides = layout.strides().to_vec();
        let mut index = vec![0; dims.len()];
        let mut flat = 0;
        if len > 0 {
            let mut rest = start;
            for i in (0..dims.len()).rev() {
                index[i] = rest % dims[i];
                rest /= dims[i];
                flat += index[i] * strides[i];
            }
        }
        StridedIter {
            index,
            dims,
            strides,
            flat,
            remaining: len,
        }
    }

    fn step(&mut self) {
        for i in (0..self.dims.len()).rev() {
            self.index[i] += 1;
            self.flat += self.strides[i];
            if self.index[i] < self.dims[i] {
                return;
            }
            self.flat -= self.index[i] * self.strides[i];
            self.index[i] = 0;
        }
    }
}

impl Iterator for StridedIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.flat;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.step();
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for StridedIter {}
