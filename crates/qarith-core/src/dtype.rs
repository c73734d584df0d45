use std::fmt;

use num_traits::{AsPrimitive, Bounded, PrimInt};

// QuantDType — Storage types for quantized operands
//
// Element-wise ADD/SUB accept two 8-bit asymmetric storage types:
//
//   QInt8  — signed codes in [-128, 127], zero-point anywhere in that range
//   QUInt8 — unsigned codes in [0, 255], zero-point anywhere in that range
//
// The signed variant is the primary target. Both are asymmetric: the
// zero-point need not be 0 (or 128 for unsigned).

/// Enum of the supported quantized storage types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuantDType {
    /// 8-bit asymmetric signed.
    QInt8,
    /// 8-bit asymmetric unsigned.
    QUInt8,
}

impl QuantDType {
    /// Smallest representable code.
    pub fn qmin(&self) -> i32 {
        match self {
            QuantDType::QInt8 => i8::MIN as i32,
            QuantDType::QUInt8 => u8::MIN as i32,
        }
    }

    /// Largest representable code.
    pub fn qmax(&self) -> i32 {
        match self {
            QuantDType::QInt8 => i8::MAX as i32,
            QuantDType::QUInt8 => u8::MAX as i32,
        }
    }

    /// Whether `code` lies inside the storage range.
    pub fn contains(&self, code: i32) -> bool {
        (self.qmin()..=self.qmax()).contains(&code)
    }
}

impl fmt::Display for QuantDType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QuantDType::QInt8 => "qint8",
            QuantDType::QUInt8 => "quint8",
        };
        write!(f, "{}", s)
    }
}

// QuantElement — Trait that connects Rust integer types to QuantDType
//
// Kernels are written once against this trait and monomorphized for i8 and
// u8. All arithmetic happens in i32; narrowing back to storage always
// saturates.

/// Trait implemented by Rust integer types that can hold quantized codes.
pub trait QuantElement:
    PrimInt + AsPrimitive<i32> + Bounded + Send + Sync + fmt::Debug + 'static
{
    /// The corresponding QuantDType variant.
    const DTYPE: QuantDType;

    /// Smallest code as i32.
    fn qmin() -> i32 {
        Self::min_value().as_()
    }

    /// Largest code as i32.
    fn qmax() -> i32 {
        Self::max_value().as_()
    }

    /// Widen to i32.
    fn to_i32(self) -> i32 {
        self.as_()
    }

    /// Clamp an i32 into the storage range and narrow. Never wraps.
    fn saturate_from_i32(v: i32) -> Self;
}

impl QuantElement for i8 {
    const DTYPE: QuantDType = QuantDType::QInt8;

    fn saturate_from_i32(v: i32) -> Self {
        v.clamp(i8::MIN as i32, i8::MAX as i32) as i8
    }
}

impl QuantElement for u8 {
    const DTYPE: QuantDType = QuantDType::QUInt8;

    fn saturate_from_i32(v: i32) -> Self {
        v.clamp(u8::MIN as i32, u8::MAX as i32) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges() {
        assert_eq!(QuantDType::QInt8.qmin(), -128);
        assert_eq!(QuantDType::QInt8.qmax(), 127);
        assert_eq!(QuantDType::QUInt8.qmin(), 0);
        assert_eq!(QuantDType::QUInt8.qmax(), 255);
        assert_eq!(i8::qmin(), QuantDType::QInt8.qmin());
        assert_eq!(u8::qmax(), QuantDType::QUInt8.qmax());
    }

    #[test]
    fn test_saturate_never_wraps() {
        assert_eq!(i8::saturate_from_i32(128), 127);
        assert_eq!(i8::saturate_from_i32(-129), -128);
        assert_eq!(i8::saturate_from_i32(1000), 127);
        assert_eq!(i8::saturate_from_i32(-42), -42);
        assert_eq!(u8::saturate_from_i32(-1), 0);
        assert_eq!(u8::saturate_from_i32(256), 255);
    }

    #[test]
    fn test_contains() {
        assert!(QuantDType::QInt8.contains(-128));
        assert!(!QuantDType::QInt8.contains(128));
        assert!(QuantDType::QUInt8.contains(255));
        assert!(!QuantDType::QUInt8.contains(-1));
    }

    #[test]
    fn test_display() {
        assert_eq!(QuantDType::QInt8.to_string(), "qint8");
        assert_eq!(QuantDType::QUInt8.to_string(), "quint8");
    }
}
