//! Dynamically typed scalar values

use crate::dtype::DType;

/// A single matrix element tagged with its element type
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Byte(u8),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
}

macro_rules! value_as {
    ($value:expr, $t:ty) => {
        match $value {
            Value::Byte(v) => v as $t,
            Value::Int8(v) => v as $t,
            Value::Int16(v) => v as $t,
            Value::Int32(v) => v as $t,
            Value::Int64(v) => v as $t,
            Value::Float32(v) => v as $t,
            Value::Float64(v) => v as $t,
        }
    };
}

pub(crate) use value_as;

impl Value {
    pub const fn dtype(&self) -> DType {
        match self {
            Value::Byte(_) => DType::Byte,
            Value::Int8(_) => DType::Int8,
            Value::Int16(_) => DType::Int16,
            Value::Int32(_) => DType::Int32,
            Value::Int64(_) => DType::Int64,
            Value::Float32(_) => DType::Float32,
            Value::Float64(_) => DType::Float64,
        }
    }

    /// The zero value of `dtype`
    pub const fn zero(dtype: DType) -> Self {
        match dtype {
            DType::Byte => Value::Byte(0),
            DType::Int8 => Value::Int8(0),
            DType::Int16 => Value::Int16(0),
            DType::Int32 => Value::Int32(0),
            DType::Int64 => Value::Int64(0),
            DType::Float32 => Value::Float32(0.0),
            DType::Float64 => Value::Float64(0.0),
        }
    }

    /// Convert to `dtype` with `as` semantics
    ///
    /// This may narrow. Implicit conversions elsewhere only call it after the
    /// casting policy has confirmed the target is at least as wide.
    pub fn cast(self, dtype: DType) -> Self {
        match dtype {
            DType::Byte => Value::Byte(value_as!(self, u8)),
            DType::Int8 => Value::Int8(value_as!(self, i8)),
            DType::Int16 => Value::Int16(value_as!(self, i16)),
            DType::Int32 => Value::Int32(value_as!(self, i32)),
            DType::Int64 => Value::Int64(value_as!(self, i64)),
            DType::Float32 => Value::Float32(value_as!(self, f32)),
            DType::Float64 => Value::Float64(value_as!(self, f64)),
        }
    }

    pub fn to_f64(self) -> f64 {
        value_as!(self, f64)
    }
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Value::Byte(v) => write!(f, "{v}"),
            Value::Int8(v) => write!(f, "{v}"),
            Value::Int16(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float32(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_widening_is_exact() {
        assert_eq!(Value::Byte(200).cast(DType::Int16), Value::Int16(200));
        assert_eq!(Value::Int8(-3).cast(DType::Float64), Value::Float64(-3.0));
        assert_eq!(
            Value::Int64(i64::MAX).cast(DType::Int64),
            Value::Int64(i64::MAX)
        );
    }

    #[test]
    fn test_zero() {
        for dtype in DType::ALL {
            assert_eq!(Value::zero(dtype).dtype(), dtype);
            assert_eq!(Value::zero(dtype).to_f64(), 0.0);
        }
    }
}
