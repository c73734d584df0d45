use crate::dtype::QuantDType;
use crate::shape::Shape;

/// All errors that can occur within qarith.
///
/// Every variant is a caller or model-construction error detected before any
/// per-element work starts. Saturation during requantization is not an error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Scale must be a finite, strictly positive number.
    #[error("invalid scale {scale}: quantized operands need a finite scale > 0")]
    InvalidScale { scale: f32 },

    /// Zero-point does not fit the storage type of the descriptor.
    #[error("zero point {zero_point} out of range for {dtype} (expected {min}..={max})")]
    ZeroPointOutOfRange {
        zero_point: i32,
        dtype: QuantDType,
        min: i32,
        max: i32,
    },

    /// The two operand shapes cannot be broadcast together.
    #[error("shapes {lhs} and {rhs} are not broadcast-compatible")]
    IncompatibleShapes { lhs: Shape, rhs: Shape },

    /// An operand exceeds the maximum rank the kernel is configured for.
    #[error("rank {rank} is not supported (maximum rank is {max_rank})")]
    RankMismatchUnsupported { rank: usize, max_rank: usize },

    /// Element count mismatch when creating a tensor from a vec.
    #[error("element count mismatch: shape {shape} requires {expected} elements, got {got}")]
    ElementCountMismatch {
        shape: Shape,
        expected: usize,
        got: usize,
    },

    /// Descriptor storage type does not match the tensor element type.
    #[error("dtype mismatch: expected {expected}, got {got}")]
    DTypeMismatch {
        expected: QuantDType,
        got: QuantDType,
    },

    /// Fused activation code outside the known set.
    #[error("unsupported fused activation code {0}")]
    UnsupportedActivation(i32),

    /// Generic message for cases not covered above.
    #[error("{0}")]
    Msg(String),
}

impl Error {
    /// Create an error from any string message.
    pub fn msg(s: impl Into<String>) -> Self {
        Error::Msg(s.into())
    }
}

/// Convenience Result type used throughout qarith.
pub type Result<T> = std::result::Result<T, Error>;

/// Macro for early return with a formatted error message.
/// Usage: `bail!("something went wrong: {}", detail)`
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::Msg(format!($($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fails_with_msg() -> Result<()> {
        bail!("fixture {} is malformed", "sub_broadcast");
    }

    #[test]
    fn test_bail_macro() {
        let err = fails_with_msg().unwrap_err();
        assert_eq!(err, Error::msg("fixture sub_broadcast is malformed"));
    }

    #[test]
    fn test_display_messages() {
        let err = Error::IncompatibleShapes {
            lhs: Shape::from((2, 3)),
            rhs: Shape::from(4),
        };
        assert_eq!(
            err.to_string(),
            "shapes [2, 3] and [4] are not broadcast-compatible"
        );

        let err = Error::ZeroPointOutOfRange {
            zero_point: 200,
            dtype: QuantDType::QInt8,
            min: -128,
            max: 127,
        };
        assert_eq!(
            err.to_string(),
            "zero point 200 out of range for qint8 (expected -128..=127)"
        );
    }
}
