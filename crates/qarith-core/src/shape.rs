use std::fmt;

// Shape — dimension sizes of a quantized operand
//
//   Shape([])         — rank 0, one element
//   Shape([4])        — rank 1
//   Shape([1, 2])     — rank 2, broadcastable against [N, 2]
//   Shape([2, 0, 3])  — rank 3, no elements
//
// A 0 dimension is a real size, not a wildcard: it only matches 0 or 1 when
// broadcasting, and it makes the whole operand empty.

/// N-dimensional shape of a tensor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape(Vec<usize>);

impl Shape {
    pub fn new(dims: Vec<usize>) -> Self {
        Shape(dims)
    }

    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Product of the dims: 1 for rank 0, 0 as soon as any dim is 0.
    pub fn elem_count(&self) -> usize {
        self.0.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.elem_count() == 0
    }

    /// Row-major strides, e.g. [2, 3, 4] → [12, 4, 1].
    pub fn stride_contiguous(&self) -> Vec<usize> {
        let mut strides: Vec<usize> = self
            .0
            .iter()
            .rev()
            .scan(1usize, |acc, &d| {
                let s = *acc;
                *acc *= d;
                Some(s)
            })
            .collect();
        strides.reverse();
        strides
    }

    /// Output shape of an element-wise op on `lhs` and `rhs`.
    ///
    /// Shapes are aligned on their trailing dims; a missing leading dim
    /// counts as 1. Each aligned pair must be equal or contain a 1, which
    /// stretches to the other size.
    ///
    ///   [1, 2] and [2, 2]  → [2, 2]
    ///   [4]    and [3, 1]  → [3, 4]
    ///   [0, 3] and [1]     → [0, 3]
    ///   [2]    and [3]     → IncompatibleShapes
    pub fn broadcast_shape(lhs: &Shape, rhs: &Shape) -> crate::Result<Shape> {
        let rank = lhs.rank().max(rhs.rank());
        let padded = |s: &Shape, i: usize| {
            let lead = rank - s.rank();
            if i < lead {
                1
            } else {
                s.0[i - lead]
            }
        };

        (0..rank)
            .map(|i| match (padded(lhs, i), padded(rhs, i)) {
                (l, r) if l == r => Ok(l),
                (1, r) => Ok(r),
                (l, 1) => Ok(l),
                _ => Err(crate::Error::IncompatibleShapes {
                    lhs: lhs.clone(),
                    rhs: rhs.clone(),
                }),
            })
            .collect::<crate::Result<Vec<_>>>()
            .map(Shape)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, "]")
    }
}

impl From<usize> for Shape {
    fn from(d: usize) -> Self {
        Shape(vec![d])
    }
}

impl From<(usize, usize)> for Shape {
    fn from((d0, d1): (usize, usize)) -> Self {
        Shape(vec![d0, d1])
    }
}

impl From<(usize, usize, usize)> for Shape {
    fn from((d0, d1, d2): (usize, usize, usize)) -> Self {
        Shape(vec![d0, d1, d2])
    }
}

impl From<(usize, usize, usize, usize)> for Shape {
    fn from((d0, d1, d2, d3): (usize, usize, usize, usize)) -> Self {
        Shape(vec![d0, d1, d2, d3])
    }
}

impl From<Vec<usize>> for Shape {
    fn from(v: Vec<usize>) -> Self {
        Shape(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn bcast(l: &[usize], r: &[usize]) -> crate::Result<Vec<usize>> {
        Shape::broadcast_shape(&Shape::new(l.to_vec()), &Shape::new(r.to_vec()))
            .map(|s| s.dims().to_vec())
    }

    #[test]
    fn test_element_counts() {
        assert_eq!(Shape::new(vec![]).elem_count(), 1);
        assert_eq!(Shape::from((2, 3, 4)).elem_count(), 24);
        assert_eq!(Shape::from((2, 0, 3)).elem_count(), 0);
        assert!(Shape::from(0).is_empty());
        assert!(!Shape::new(vec![]).is_empty());
    }

    #[test]
    fn test_strides() {
        assert_eq!(Shape::from((2, 3, 4)).stride_contiguous(), vec![12, 4, 1]);
        assert_eq!(Shape::from(5).stride_contiguous(), vec![1]);
        assert!(Shape::new(vec![]).stride_contiguous().is_empty());
    }

    #[test]
    fn test_broadcast_trailing_alignment() {
        assert_eq!(bcast(&[1, 2], &[2, 2]).unwrap(), vec![2, 2]);
        assert_eq!(bcast(&[4], &[3, 1]).unwrap(), vec![3, 4]);
        assert_eq!(bcast(&[5, 3, 1], &[3, 4]).unwrap(), vec![5, 3, 4]);
        assert_eq!(bcast(&[2], &[1, 2, 1, 2]).unwrap(), vec![1, 2, 1, 2]);
        assert_eq!(bcast(&[], &[2, 2]).unwrap(), vec![2, 2]);
        assert_eq!(bcast(&[], &[]).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn test_broadcast_zero_dims() {
        assert_eq!(bcast(&[0], &[1]).unwrap(), vec![0]);
        assert_eq!(bcast(&[2, 0], &[2, 1]).unwrap(), vec![2, 0]);
        assert_eq!(bcast(&[0, 3], &[3]).unwrap(), vec![0, 3]);
        assert!(bcast(&[0], &[2]).is_err());
    }

    #[test]
    fn test_broadcast_incompatible() {
        let err = bcast(&[2], &[3]).unwrap_err();
        assert_eq!(
            err,
            Error::IncompatibleShapes {
                lhs: Shape::from(2),
                rhs: Shape::from(3),
            }
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Shape::from((1, 2)).to_string(), "[1, 2]");
        assert_eq!(Shape::new(vec![]).to_string(), "[]");
    }
}
